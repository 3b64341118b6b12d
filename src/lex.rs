// SPDX: CC0-1.0

use crate::eval::OperatorTyp;
use core::{fmt, iter::Peekable, str::CharIndices};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubStr {
    // shared with every token and op of the same expression
    src: Arc<String>,
    start: usize,
    len: usize,
}

impl SubStr {
    #[inline]
    pub const fn new(src: Arc<String>, start: usize, len: usize) -> Self {
        Self { src, start, len }
    }

    #[inline]
    pub fn all(src: Arc<String>) -> Self {
        let len = src.len();
        Self::new(src, 0, len)
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(&self.src)
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self) -> &str {
        &self.src[self.start..self.start + self.len]
    }

    pub fn extend(&mut self, by: usize) {
        self.len += by;
    }
}

impl fmt::Display for SubStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokTyp {
    Ident,
    Number,
    Op(OperatorTyp),
    Comma,
    OpenParen,
    CloseParen,
}

impl TokTyp {
    /// Whether a `-` following this token starts a new operand (negation)
    /// rather than subtracting from a finished one.
    const fn expects_operand(&self) -> bool {
        !matches!(self, Self::Ident | Self::Number | Self::CloseParen)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tok {
    pub typ: TokTyp,
    pub loc: SubStr,
}

/// Characters that look like math but have no meaning in an expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reserved {
    Comparison,
    Equals,
    Pipe,
    Bracket,
}

impl Reserved {
    const fn classify(chr: char) -> Option<Self> {
        match chr {
            '<' | '>' => Some(Self::Comparison),
            '=' => Some(Self::Equals),
            '|' => Some(Self::Pipe),
            '[' | ']' | '{' | '}' => Some(Self::Bracket),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexErrTyp {
    InvalidChar,
    Reserved(Reserved),
}

impl fmt::Display for LexErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar => write!(f, "invalid character"),
            Self::Reserved(_) => write!(f, "unsupported character"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LexErr {
    pub typ: LexErrTyp,
    pub loc: SubStr,
}

#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src Arc<String>,
    cur: Peekable<CharIndices<'src>>,
    prev: Option<TokTyp>,
    has_errored: bool, // tells iter to yield None after error
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Arc<String>) -> Self {
        Self {
            src,
            cur: src.char_indices().peekable(),
            prev: None,
            has_errored: false,
        }
    }

    pub fn src(&self) -> &'src Arc<String> {
        self.src
    }

    fn trim_whitespace(&mut self) {
        while let Some((_, chr)) = self.cur.peek() {
            if chr.is_ascii_whitespace() {
                self.cur.next();
            } else {
                break;
            }
        }
    }

    fn span(&self, start: usize, chr: char) -> SubStr {
        SubStr::new(Arc::clone(self.src), start, chr.len_utf8())
    }

    /// Single character tokens. `-` is resolved against the previous token.
    fn single(&self, chr: char) -> Option<TokTyp> {
        let typ = match chr {
            '+' => TokTyp::Op(OperatorTyp::Add),
            '*' => TokTyp::Op(OperatorTyp::Mul),
            '/' => TokTyp::Op(OperatorTyp::Div),
            '^' => TokTyp::Op(OperatorTyp::Pow),
            '-' if self.prev.map_or(true, |typ| typ.expects_operand()) => {
                TokTyp::Op(OperatorTyp::Neg)
            }
            '-' => TokTyp::Op(OperatorTyp::Sub),
            ',' => TokTyp::Comma,
            '(' => TokTyp::OpenParen,
            ')' => TokTyp::CloseParen,
            _ => return None,
        };
        Some(typ)
    }

    fn consume_by<P>(&mut self, start: usize, typ: TokTyp, predicate: P) -> Option<Tok>
    where
        P: Fn(char) -> bool,
    {
        let mut tok = Tok {
            typ,
            loc: SubStr::new(Arc::clone(self.src), start, 0),
        };
        while let Some((_, chr)) = self.cur.peek().copied() {
            if !predicate(chr) {
                break;
            }
            tok.loc.extend(chr.len_utf8());
            self.cur.next();
        }
        (!tok.loc.is_empty()).then_some(tok)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Tok, LexErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_errored {
            return None;
        }

        self.trim_whitespace();

        let (idx, chr) = self.cur.peek().copied()?;
        let tok = if let Some(typ) = self.single(chr) {
            self.cur.next();
            Ok(Tok {
                typ,
                loc: self.span(idx, chr),
            })
        } else if let Some(reserved) = Reserved::classify(chr) {
            Err(LexErrTyp::Reserved(reserved))
        } else if chr.is_ascii_alphabetic() {
            // identifiers may contain digits after the first letter, e.g. log10
            self.consume_by(idx, TokTyp::Ident, |chr| chr.is_ascii_alphanumeric())
                .ok_or(LexErrTyp::InvalidChar)
        } else {
            self.consume_by(idx, TokTyp::Number, |chr| chr.is_ascii_digit() || chr == '.')
                .ok_or(LexErrTyp::InvalidChar)
        };

        match tok {
            Ok(tok) => {
                self.prev = Some(tok.typ);
                Some(Ok(tok))
            }
            Err(typ) => {
                self.has_errored = true;
                Some(Err(LexErr {
                    typ,
                    loc: self.span(idx, chr),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(src: &str) -> Vec<TokTyp> {
        let src = Arc::new(String::from(src));
        Lexer::new(&src).map(|tok| tok.unwrap().typ).collect()
    }

    #[test_log::test]
    fn minus_after_operand_is_subtraction() {
        assert_eq!(
            types("t-1"),
            [
                TokTyp::Ident,
                TokTyp::Op(OperatorTyp::Sub),
                TokTyp::Number
            ]
        );
        assert_eq!(
            types("log(t) - sin(t)")[4],
            TokTyp::Op(OperatorTyp::Sub)
        );
    }

    #[test_log::test]
    fn minus_in_operand_position_is_negation() {
        assert_eq!(types("-1"), [TokTyp::Op(OperatorTyp::Neg), TokTyp::Number]);
        assert_eq!(
            types("2*-t"),
            [
                TokTyp::Number,
                TokTyp::Op(OperatorTyp::Mul),
                TokTyp::Op(OperatorTyp::Neg),
                TokTyp::Ident
            ]
        );
    }

    #[test_log::test]
    fn tokens_carry_their_span() {
        let src = Arc::new(String::from("  abs(t)"));
        let toks: Vec<Tok> = Lexer::new(&src).map(Result::unwrap).collect();
        assert_eq!(toks[0].loc.get(), "abs");
        assert_eq!(toks[0].loc.start(), 2);
        assert_eq!(toks[3].typ, TokTyp::CloseParen);
    }

    #[test_log::test]
    fn reserved_char_stops_lexing() {
        let src = Arc::new(String::from("|t|"));
        let mut lex = Lexer::new(&src);
        let err = lex.next().unwrap().unwrap_err();
        assert_eq!(err.typ, LexErrTyp::Reserved(Reserved::Pipe));
        assert_eq!(err.loc.start(), 0);
        assert!(lex.next().is_none());
    }

    #[test_log::test]
    fn only_ascii_whitespace_separates() {
        let src = Arc::new(String::from("t\u{a0}+ 1"));
        let err = Lexer::new(&src).find_map(Result::err).unwrap();
        assert_eq!(err.typ, LexErrTyp::InvalidChar);
        assert_eq!(err.loc.get(), "\u{a0}");
    }

    #[test_log::test]
    fn invalid_char() {
        let src = Arc::new(String::from("t # 2"));
        let err = Lexer::new(&src).find_map(Result::err).unwrap();
        assert_eq!(err.typ, LexErrTyp::InvalidChar);
        assert_eq!(err.loc.get(), "#");
    }
}
