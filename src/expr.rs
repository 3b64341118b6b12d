// SPDX: CC0-1.0

//! Compiling expression text and evaluating it for a value of `t`.

use crate::{
    eval::{self, EvalErr, Ident, Idents, Program},
    lex::Lexer,
    parse::{self, ParseErr},
    stdlib::{self, T},
    Number,
};
use std::sync::Arc;

/// An expression of `t` that parsed successfully.
#[derive(Debug)]
pub struct Expr {
    src: Arc<String>,
    prog: Program,
}

impl Expr {
    pub fn src(&self) -> &Arc<String> {
        &self.src
    }

    pub fn program(&self) -> &Program {
        &self.prog
    }
}

/// Identifier table plus a reusable operand stack.
#[derive(Debug)]
pub struct Evaluator {
    idents: Idents,
    stack: Vec<Number>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            idents: stdlib::standard_idents(),
            stack: Vec::new(),
        }
    }

    pub fn compile(&self, src: impl Into<String>) -> Result<Expr, ParseErr> {
        let src = Arc::new(src.into());
        let prog = parse::parse(Lexer::new(&src), &self.idents)?;
        Ok(Expr { src, prog })
    }

    /// Evaluates `expr` with `t` bound to the given value.
    pub fn eval(&mut self, expr: &Expr, t: Number) -> Result<Number, EvalErr> {
        if let Some(slot) = self.idents.get_mut(T) {
            *slot = Ident::Var(Some(t));
        }
        eval::eval(&expr.prog, &self.idents, &mut self.stack)
    }

    /// The known identifier most similar to `text`, if any is close enough
    /// to be worth suggesting.
    pub fn similar_ident(&self, text: &str) -> Option<(&'static str, &Ident)> {
        let text = text.to_ascii_lowercase();
        self.idents
            .iter()
            .map(|(&key, ident)| {
                let sim = strsim::normalized_damerau_levenshtein(&text, key);
                (sim, (key, ident))
            })
            .filter(|(sim, _)| *sim > 0.3)
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, kv)| kv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::EvalErrTyp;

    fn eval_at(src: &str, t: Number) -> Number {
        let mut evaluator = Evaluator::new();
        let expr = evaluator.compile(src).unwrap();
        evaluator.eval(&expr, t).unwrap()
    }

    #[test_log::test]
    fn arithmetic() {
        assert_eq!(eval_at("t/2", 3.0), 1.5);
        assert_eq!(eval_at("t-1", 3.0), 2.0);
        assert_eq!(eval_at("-t^2", 3.0), -9.0);
        assert_eq!(eval_at("2 * 3 + 4", 0.0), 10.0);
        assert_eq!(eval_at("2 * (3 + 4)", 0.0), 14.0);
        assert_eq!(eval_at("pow(2, 10)", 0.0), 1024.0);
    }

    #[test_log::test]
    fn functions_and_constants() {
        assert!((eval_at("2 * cos(t)^3", 0.0) - 2.0).abs() < 1e-12);
        assert!((eval_at("sin(pi / 2)", 0.0) - 1.0).abs() < 1e-12);
        assert!((eval_at("log(e)", 0.0) - 1.0).abs() < 1e-12);
        assert!((eval_at("log10(1000)", 0.0) - 3.0).abs() < 1e-12);
        assert_eq!(eval_at("2 + abs(t) / 3", -3.0), 3.0);
    }

    #[test_log::test]
    fn domain_errors_are_nan_not_failures() {
        assert!(eval_at("log(t)", -1.0).is_nan());
    }

    #[test_log::test]
    fn implicit_multiplication_is_a_stack_mismatch() {
        let mut evaluator = Evaluator::new();
        let expr = evaluator.compile("2 t").unwrap();
        let err = evaluator.eval(&expr, 1.0).unwrap_err();
        assert!(matches!(
            err.typ,
            EvalErrTyp::StackMismatch {
                expected: 1,
                found: 2
            }
        ));
        assert!(err.op.is_none());
    }

    #[test_log::test]
    fn missing_args() {
        let mut evaluator = Evaluator::new();
        let expr = evaluator.compile("t +").unwrap();
        let err = evaluator.eval(&expr, 1.0).unwrap_err();
        assert!(matches!(err.typ, EvalErrTyp::MissingArgs { arity: 2, found: 1, .. }));
        assert_eq!(err.op.unwrap().loc.get(), "+");
    }

    #[test_log::test]
    fn undefined_ident_suggests_similar_name() {
        let mut evaluator = Evaluator::new();
        let expr = evaluator.compile("sinn(t)").unwrap();
        let err = evaluator.eval(&expr, 1.0).unwrap_err();
        let text = match err.typ {
            EvalErrTyp::UndefinedIdent { text } => text,
            other => panic!("unexpected error {other:?}"),
        };
        assert_eq!(text.get(), "sinn");
        let (key, ident) = evaluator.similar_ident(text.get()).unwrap();
        assert_eq!(key, "sin");
        assert_eq!(ident.kind(), "function");
    }

    #[test_log::test]
    fn stack_is_reused_between_evaluations() {
        let mut evaluator = Evaluator::new();
        let expr = evaluator.compile("sin(t) * t + 1").unwrap();
        evaluator.eval(&expr, 0.0).unwrap();
        let cap = evaluator.stack.capacity();
        for i in 0..100 {
            evaluator.eval(&expr, Number::from(i)).unwrap();
        }
        assert_eq!(evaluator.stack.capacity(), cap);
    }
}
