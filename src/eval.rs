// SPDX: CC0-1.0

use crate::{lex::SubStr, stdlib, Number};
use core::fmt;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorTyp {
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

impl OperatorTyp {
    pub const fn precedence(&self) -> i8 {
        match self {
            Self::Add => 2,
            Self::Sub => 2,
            Self::Mul => 3,
            Self::Div => 3,
            Self::Neg => 4,
            Self::Pow => 5,
        }
    }

    pub const fn associativity(&self) -> Associativity {
        use Associativity::{Left, Right};
        match self {
            Self::Neg => Right,
            Self::Add => Left,
            Self::Sub => Left,
            Self::Mul => Left,
            Self::Div => Left,
            Self::Pow => Right,
        }
    }

    /// Prefix operators have no left operand, so pushing one must not pop
    /// pending operators off the shunting stack.
    pub const fn is_prefix(&self) -> bool {
        matches!(self, Self::Neg)
    }

    pub const fn fun(&self) -> (&'static str, Fun) {
        match self {
            Self::Neg => ("neg", Fun::new(1, stdlib::neg)),
            Self::Add => ("add", Fun::new(2, stdlib::add)),
            Self::Sub => ("sub", Fun::new(2, stdlib::sub)),
            Self::Mul => ("mul", Fun::new(2, stdlib::mul)),
            Self::Div => ("div", Fun::new(2, stdlib::div)),
            Self::Pow => ("pow", Fun::new(2, stdlib::pow)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum OperationTyp {
    Operator(OperatorTyp),
    Val(Number),
    Ident,
}

#[derive(Clone, Debug)]
pub struct Operation {
    pub typ: OperationTyp,
    pub loc: SubStr,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.typ {
            OperationTyp::Val(val) => write!(f, "push {val}"),
            OperationTyp::Operator(typ) => write!(f, "call '{}'", typ.fun().0),
            OperationTyp::Ident => write!(f, "load '{}'", self.loc.get()),
        }
    }
}

#[derive(Debug)]
pub enum EvalErrTyp {
    MissingArgs {
        name: &'static str,
        arity: usize,
        found: usize,
    },
    StackMismatch {
        expected: usize,
        found: usize,
    },
    UndefinedIdent {
        text: SubStr,
    },
    NullVar {
        text: SubStr,
    },
}

#[derive(Debug)]
pub struct EvalErr {
    pub typ: EvalErrTyp,
    pub op: Option<Operation>, // if none, associated with end-of-program checking
}

impl fmt::Display for EvalErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            EvalErrTyp::MissingArgs { name, arity, found } => write!(
                f,
                "function '{name}' requires {arity} argument{s}, but found {found}",
                s = if *arity == 1 { "" } else { "s" }
            ),

            EvalErrTyp::StackMismatch { expected, found } => write!(
                f,
                "expected {expected} value{s} on the stack but found {found}",
                s = if *expected == 1 { "" } else { "s" }
            ),

            EvalErrTyp::UndefinedIdent { text } => write!(f, "undefined identifier '{text}'"),

            EvalErrTyp::NullVar { text } => {
                write!(f, "variable '{text}' is declared but has no value")
            }
        }
    }
}

impl std::error::Error for EvalErr {}

#[derive(Clone, Copy, Debug)]
pub struct Fun {
    pub arity: usize,
    pub fun: fn(&[Number]) -> Number,
}

impl Fun {
    pub const fn new(arity: usize, fun: fn(&[Number]) -> Number) -> Self {
        Self { arity, fun }
    }

    /// Pops `arity` arguments off `stack` and applies the function to them.
    fn call(
        &self,
        name: &'static str,
        stack: &mut Vec<Number>,
        op: &Operation,
    ) -> Result<Number, EvalErr> {
        let found = stack.len();
        let Some(base) = found.checked_sub(self.arity) else {
            return Err(EvalErr {
                typ: EvalErrTyp::MissingArgs {
                    name,
                    arity: self.arity,
                    found,
                },
                op: Some(op.clone()),
            });
        };
        // stack: ...a, b, c, d
        //                 ^^^^ args if arity is 2
        let val = (self.fun)(&stack[base..]);
        stack.truncate(base);
        Ok(val)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Ident {
    Var(Option<Number>),
    Const(Number),
    Fun(Fun),
}

impl Ident {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Var(_) => "variable",
            Self::Const(_) => "constant",
            Self::Fun(_) => "function",
        }
    }
}

/// Every name an expression can refer to. Keys are static since the table
/// is only ever filled from the standard library.
pub type Idents = HashMap<&'static str, Ident>;

/// Compiled expression in reverse polish order.
#[derive(Debug)]
pub struct Program {
    pub(crate) ops: Vec<Operation>,
}

impl Program {
    #[inline]
    pub const fn new(ops: Vec<Operation>) -> Self {
        Self { ops }
    }

    #[inline]
    pub fn ops(&self) -> core::slice::Iter<'_, Operation> {
        self.ops.iter()
    }
}

/// Runs `prog` against `idents`. `stack` is scratch space that callers
/// reuse between evaluations so that a sweep doesn't allocate per sample.
pub fn eval(prog: &Program, idents: &Idents, stack: &mut Vec<Number>) -> Result<Number, EvalErr> {
    stack.clear();

    for op in prog.ops() {
        let val = match op.typ {
            OperationTyp::Val(num) => num,

            OperationTyp::Operator(typ) => {
                let (name, fun) = typ.fun();
                fun.call(name, stack, op)?
            }

            OperationTyp::Ident => match idents.get_key_value(op.loc.get()) {
                Some((_, Ident::Var(Some(val)) | Ident::Const(val))) => *val,
                Some((&name, Ident::Fun(fun))) => fun.call(name, stack, op)?,
                Some((_, Ident::Var(None))) => {
                    return Err(EvalErr {
                        typ: EvalErrTyp::NullVar {
                            text: op.loc.clone(),
                        },
                        op: Some(op.clone()),
                    });
                }
                None => {
                    return Err(EvalErr {
                        typ: EvalErrTyp::UndefinedIdent {
                            text: op.loc.clone(),
                        },
                        op: Some(op.clone()),
                    });
                }
            },
        };
        stack.push(val);
    }

    match stack.as_slice() {
        [val] => Ok(*val),
        _ => Err(EvalErr {
            typ: EvalErrTyp::StackMismatch {
                expected: 1,
                found: stack.len(),
            },
            op: None,
        }),
    }
}
