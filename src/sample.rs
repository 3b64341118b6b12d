// SPDX: CC0-1.0

//! Sweeping the parameter and projecting each pair of evaluations to a point.

use crate::{
    eval::EvalErr,
    expr::{Evaluator, Expr},
    Number, Point,
};
use core::fmt;
use log::debug;
use serde::Deserialize;
use std::sync::Arc;

pub type Curve = Vec<Point<Number>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Projection {
    /// `(x(t), y(t))` as is.
    Cartesian,
    /// `x(t)` is the angle and `y(t)` the radius. Negative radii are dropped.
    Polar,
}

impl Projection {
    pub const fn exhaustive() -> &'static [Projection] {
        &[Self::Cartesian, Self::Polar]
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cartesian => "cartesian",
            Self::Polar => "polar",
        }
    }

    #[inline]
    pub fn project(&self, a: Number, b: Number) -> Option<Point<Number>> {
        match self {
            Self::Cartesian => Some(Point::new(a, b)),
            Self::Polar => {
                let (angle, radius) = (a, b);
                if radius < 0.0 {
                    return None;
                }
                let (sin, cos) = angle.sin_cos();
                Some(Point::new(radius * cos, radius * sin))
            }
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Most samples a single sweep may take.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Half-open range of `t`, walked in fixed steps.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Sweep {
    pub start: Number,
    pub end: Number,
    pub step: Number,
}

impl Sweep {
    pub const CARTESIAN: Sweep = Sweep {
        start: -1000.0,
        end: 1000.0,
        step: 0.05,
    };

    pub const POLAR: Sweep = Sweep {
        start: -1000.0,
        end: 1000.0,
        step: 0.01,
    };

    /// Number of values in `[start, end)`. A quotient within rounding error
    /// of an integer counts as that integer, so that `end` is never sampled.
    pub fn len(&self) -> usize {
        let n = (self.end - self.start) / self.step;
        if !n.is_finite() || n <= 0.0 {
            return 0;
        }
        let whole = n.round();
        if (n - whole).abs() <= 1e-9 * whole.max(1.0) {
            whole as usize
        } else {
            n.ceil() as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> impl Iterator<Item = Number> + '_ {
        (0..self.len()).map(move |i| self.start + self.step * i as Number)
    }
}

/// Evaluates `f` at every value of `sweep` and projects the results.
///
/// `f` returns the pair of raw evaluations for one `t`. The first error
/// aborts the sweep; no partial curve is returned.
pub fn sample<F, E>(sweep: &Sweep, projection: Projection, mut f: F) -> Result<Curve, E>
where
    F: FnMut(Number) -> Result<(Number, Number), E>,
{
    let mut curve = Curve::with_capacity(sweep.len());
    for t in sweep.values() {
        let (a, b) = f(t)?;
        if let Some(p) = projection.project(a, b) {
            curve.push(p);
        }
    }
    debug!(
        "{projection}: kept {kept} of {total} samples",
        kept = curve.len(),
        total = sweep.len()
    );
    Ok(curve)
}

/// An evaluation failure, tagged with the expression it happened in.
#[derive(Debug)]
pub struct SampleErr {
    pub src: Arc<String>,
    pub t: Number,
    pub err: EvalErr,
}

impl fmt::Display for SampleErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (in '{}' at t = {})", self.err, self.src, self.t)
    }
}

impl std::error::Error for SampleErr {}

/// [`sample`] over a pair of compiled expressions.
pub fn sample_exprs(
    evaluator: &mut Evaluator,
    x: &Expr,
    y: &Expr,
    sweep: &Sweep,
    projection: Projection,
) -> Result<Curve, SampleErr> {
    sample(sweep, projection, |t| {
        let mut eval = |expr: &Expr| {
            evaluator.eval(expr, t).map_err(|err| SampleErr {
                src: Arc::clone(expr.src()),
                t,
                err,
            })
        };
        Ok((eval(x)?, eval(y)?))
    })
}
