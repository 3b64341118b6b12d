// SPDX: CC0-1.0

use crate::{eval::*, Number};
use core::f64::consts; // assumes Number = f64

/// The free parameter of every plotted expression.
pub const T: &str = "t";

type Builtin = fn(&[Number]) -> Number;

const UNARY: [(&str, Builtin); 15] = [
    ("abs", abs),
    ("sqrt", sqrt),
    ("exp", exp),
    ("ln", ln),
    // natural log, matching what users of graphing calculators expect from `log(t)`
    ("log", ln),
    ("log10", log10),
    ("sin", sin),
    ("cos", cos),
    ("tan", tan),
    ("asin", arcsin),
    ("acos", arccos),
    ("atan", arctan),
    ("arcsin", arcsin),
    ("arccos", arccos),
    ("arctan", arctan),
];

const CONSTS: [(&str, Number); 3] = [("pi", consts::PI), ("tau", consts::TAU), ("e", consts::E)];

pub fn standard_idents() -> Idents {
    let operators = [
        OperatorTyp::Neg,
        OperatorTyp::Add,
        OperatorTyp::Sub,
        OperatorTyp::Mul,
        OperatorTyp::Div,
        OperatorTyp::Pow,
    ]
    .map(|op| {
        let (name, fun) = op.fun();
        (name, Ident::Fun(fun))
    });

    operators
        .into_iter()
        .chain(UNARY.map(|(name, fun)| (name, Ident::Fun(Fun::new(1, fun)))))
        .chain(CONSTS.map(|(name, val)| (name, Ident::Const(val))))
        .chain([(T, Ident::Var(None))])
        .collect()
}

// arity is checked by `eval` before any of these are called
#[track_caller]
fn expect_n<const N: usize>(args: &[Number]) -> [Number; N] {
    debug_assert_eq!(args.len(), N);
    let mut ret = [0.0; N];
    ret.copy_from_slice(&args[..N]);
    ret
}

pub fn neg(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    -x
}

pub fn add(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x + y
}

pub fn sub(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x - y
}

pub fn mul(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x * y
}

pub fn div(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x / y
}

pub fn pow(args: &[Number]) -> Number {
    let [x, exp] = expect_n::<2>(args);
    x.powf(exp)
}

pub fn abs(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.abs()
}

pub fn sqrt(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sqrt()
}

pub fn exp(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.exp()
}

pub fn ln(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.ln()
}

pub fn log10(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.log10()
}

pub fn sin(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sin()
}

pub fn cos(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.cos()
}

pub fn tan(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.tan()
}

pub fn arcsin(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.asin()
}

pub fn arccos(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.acos()
}

pub fn arctan(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.atan()
}
