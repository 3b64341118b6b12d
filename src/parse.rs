// SPDX: CC0-1.0

// implementation of shunting yard algorithm by dijkstra (see https://en.wikipedia.org/wiki/Shunting_yard_algorithm)

use crate::{
    eval::{Associativity, Ident, Idents, Operation, OperationTyp, OperatorTyp, Program},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, TokTyp},
    Number,
};
use core::{fmt, num::ParseFloatError};
use std::sync::Arc;

#[derive(Debug)]
pub enum ParseErrTyp {
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    ParenMismatch,
    MissingCall,
    Empty,
}

impl fmt::Display for ParseErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexErr(err) => write!(f, "{err}"),
            Self::ParseNum(err) => write!(f, "invalid number: {err}"),
            Self::ParenMismatch => write!(f, "mismatched parentheses"),
            Self::MissingCall => write!(f, "function name without an argument list"),
            Self::Empty => write!(f, "empty expression"),
        }
    }
}

#[derive(Debug)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.typ, self.loc.start())
    }
}

impl std::error::Error for ParseErr {}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShuntOpTyp {
    Operator(OperatorTyp),
    Fun,
    OpenParen,
}

#[derive(Clone, Debug)]
struct ShuntOp {
    typ: ShuntOpTyp,
    loc: SubStr,
}

impl ShuntOp {
    fn into_output(self) -> Operation {
        let typ = match self.typ {
            ShuntOpTyp::Operator(typ) => OperationTyp::Operator(typ),
            ShuntOpTyp::Fun => OperationTyp::Ident,
            ShuntOpTyp::OpenParen => unreachable!("no parentheses in the output stack"),
        };
        Operation { typ, loc: self.loc }
    }
}

/// Moves operators to the output until an open paren (or the bottom of the
/// stack) is reached. The paren itself is left in place.
fn flush_to_paren(ops: &mut Vec<ShuntOp>, out: &mut Vec<Operation>) {
    while let Some(op) = ops.pop() {
        if op.typ == ShuntOpTyp::OpenParen {
            ops.push(op);
            break;
        }
        out.push(op.into_output());
    }
}

pub fn parse(lex: Lexer<'_>, idents: &Idents) -> Result<Program, ParseErr> {
    let src = Arc::clone(lex.src());
    let mut out: Vec<Operation> = Vec::new(); // output
    let mut ops: Vec<ShuntOp> = Vec::new(); // operator stack

    // function name that still needs its open paren
    let mut callee: Option<SubStr> = None;

    for tok in lex {
        let tok = tok?;
        if let Some(loc) = callee.take() {
            if tok.typ != TokTyp::OpenParen {
                return Err(ParseErr {
                    typ: ParseErrTyp::MissingCall,
                    loc,
                });
            }
        }
        match tok.typ {
            TokTyp::Number => {
                let num: Number = tok.loc.get().parse().map_err(|err| ParseErr {
                    typ: ParseErrTyp::ParseNum(err),
                    loc: tok.loc.clone(),
                })?;
                out.push(Operation {
                    typ: OperationTyp::Val(num),
                    loc: tok.loc,
                });
            }

            TokTyp::Ident => {
                if let Some(Ident::Fun(_)) = idents.get(tok.loc.get()) {
                    callee = Some(tok.loc.clone());
                    ops.push(ShuntOp {
                        typ: ShuntOpTyp::Fun,
                        loc: tok.loc,
                    });
                } else {
                    // unknown identifiers are treated as variables and
                    // reported when the program is evaluated
                    out.push(Operation {
                        typ: OperationTyp::Ident,
                        loc: tok.loc,
                    });
                }
            }

            TokTyp::Op(o1) => {
                while let Some(ShuntOp {
                    typ: ShuntOpTyp::Operator(o2),
                    ..
                }) = ops.last()
                {
                    let o2 = *o2;
                    let pops = !o1.is_prefix()
                        && ((o2.precedence() > o1.precedence())
                            || ((o1.precedence() == o2.precedence())
                                && (o1.associativity() == Associativity::Left)));
                    if !pops {
                        break;
                    }
                    if let Some(op) = ops.pop() {
                        out.push(op.into_output());
                    }
                }
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::Operator(o1),
                    loc: tok.loc,
                });
            }

            TokTyp::Comma => flush_to_paren(&mut ops, &mut out),

            TokTyp::OpenParen => {
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::OpenParen,
                    loc: tok.loc,
                });
            }

            TokTyp::CloseParen => {
                flush_to_paren(&mut ops, &mut out);

                if ops.pop().is_none() {
                    return Err(ParseErr {
                        typ: ParseErrTyp::ParenMismatch,
                        loc: tok.loc,
                    });
                }

                // the paren closed an argument list
                if let Some(ShuntOp {
                    typ: ShuntOpTyp::Fun,
                    ..
                }) = ops.last()
                {
                    if let Some(op) = ops.pop() {
                        out.push(op.into_output());
                    }
                }
            }
        }
    }

    if let Some(loc) = callee {
        return Err(ParseErr {
            typ: ParseErrTyp::MissingCall,
            loc,
        });
    }

    while let Some(op) = ops.pop() {
        if op.typ == ShuntOpTyp::OpenParen {
            return Err(ParseErr {
                typ: ParseErrTyp::ParenMismatch,
                loc: op.loc,
            });
        }
        out.push(op.into_output());
    }

    if out.is_empty() {
        return Err(ParseErr {
            typ: ParseErrTyp::Empty,
            loc: SubStr::all(src),
        });
    }

    Ok(Program::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex::Reserved, stdlib};

    fn rpn(src: &str) -> Vec<String> {
        let src = Arc::new(String::from(src));
        let prog = parse(Lexer::new(&src), &stdlib::standard_idents()).unwrap();
        prog.ops().map(|op| op.to_string()).collect()
    }

    fn parse_err(src: &str) -> ParseErr {
        let src = Arc::new(String::from(src));
        parse(Lexer::new(&src), &stdlib::standard_idents()).unwrap_err()
    }

    #[test_log::test]
    fn power_binds_tighter_than_product() {
        assert_eq!(
            rpn("2 * cos(t)^3"),
            [
                "push 2",
                "load 't'",
                "load 'cos'",
                "push 3",
                "call 'pow'",
                "call 'mul'"
            ]
        );
    }

    #[test_log::test]
    fn power_is_right_associative() {
        assert_eq!(
            rpn("2^3^2"),
            [
                "push 2",
                "push 3",
                "push 2",
                "call 'pow'",
                "call 'pow'"
            ]
        );
    }

    #[test_log::test]
    fn negation_in_exponent() {
        assert_eq!(
            rpn("2^-t"),
            ["push 2", "load 't'", "call 'neg'", "call 'pow'"]
        );
    }

    #[test_log::test]
    fn negation_below_power() {
        assert_eq!(rpn("-t^2"), ["load 't'", "push 2", "call 'pow'", "call 'neg'"]);
    }

    #[test_log::test]
    fn unknown_ident_is_deferred_to_eval() {
        assert_eq!(rpn("foo * t"), ["load 'foo'", "load 't'", "call 'mul'"]);
    }

    #[test_log::test]
    fn mismatched_parens() {
        let err = parse_err("sin(t");
        assert!(matches!(err.typ, ParseErrTyp::ParenMismatch));
        assert_eq!(err.loc.start(), 3);

        let err = parse_err("t)");
        assert!(matches!(err.typ, ParseErrTyp::ParenMismatch));
        assert_eq!(err.loc.start(), 1);
    }

    #[test_log::test]
    fn function_needs_parens() {
        let err = parse_err("cos t + 1");
        assert!(matches!(err.typ, ParseErrTyp::MissingCall));
        assert_eq!(err.loc.get(), "cos");

        let err = parse_err("2 * sin");
        assert!(matches!(err.typ, ParseErrTyp::MissingCall));
        assert_eq!(err.loc.start(), 4);

        assert_eq!(rpn("cos (t)"), ["load 't'", "load 'cos'"]);
    }

    #[test_log::test]
    fn bad_number() {
        let err = parse_err("1.2.3");
        assert!(matches!(err.typ, ParseErrTyp::ParseNum(_)));
        assert_eq!(err.loc.get(), "1.2.3");
    }

    #[test_log::test]
    fn empty() {
        assert!(matches!(parse_err("   ").typ, ParseErrTyp::Empty));
        assert!(matches!(parse_err("()").typ, ParseErrTyp::Empty));
    }

    #[test_log::test]
    fn lex_errors_surface() {
        assert!(matches!(
            parse_err("t = 2").typ,
            ParseErrTyp::LexErr(LexErrTyp::Reserved(Reserved::Equals))
        ));
    }
}
