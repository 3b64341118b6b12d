// SPDX: CC0-1.0

/// The curve shown before the user has typed anything.
pub const DEFAULT: (&str, &str) = ("t", "t/2");

pub const EXAMPLES: [(&str, &str); 12] = [
    ("cos(t)", "sin(t)"),
    ("2 * cos(t)^3", "2 * sin(t)^3"),
    ("log(t) - sin(t)", "sin(t)"),
    ("t * 100", "t"),
    ("t", "1 + sin(t * 4)"),
    ("t", "2 + abs(sin(t * 7)) / 3"),
    ("t / 2", "tan(t)"),
    ("sin(t * 4) * t/4", "t"),
    ("t^2", "abs(t)"),
    ("100 * cos(t)", "abs(t) / 5"),
    ("cos(t)^3", "3 * sin(t)^3 + log(t)"),
    ("tan(t)^3", "5 * sin(t) + log(t)"),
];

/// Steps through [`EXAMPLES`], wrapping around at the end.
#[derive(Clone, Debug)]
pub struct Gallery {
    next: usize,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new()
    }
}

impl Gallery {
    /// The first example is skipped on the first pass.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    pub fn advance(&mut self) -> (&'static str, &'static str) {
        let example = EXAMPLES[self.next];
        self.next = (self.next + 1) % EXAMPLES.len();
        example
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expr::Evaluator,
        sample::{sample_exprs, Projection, Sweep},
    };

    #[test_log::test]
    fn wraps_around() {
        let mut gallery = Gallery::new();
        let order: Vec<usize> = (0..14)
            .map(|_| {
                let idx = gallery.next;
                gallery.advance();
                idx
            })
            .collect();
        assert_eq!(order, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 0, 1, 2]);
    }

    #[test_log::test]
    fn twelve_clicks_return_to_first() {
        let mut gallery = Gallery::new();
        let first = gallery.advance();
        for _ in 0..11 {
            gallery.advance();
        }
        assert_eq!(gallery.advance(), first);
    }

    #[test_log::test]
    fn every_example_compiles_and_samples() {
        let mut evaluator = Evaluator::new();
        let sweep = Sweep {
            start: -10.0,
            end: 10.0,
            step: 0.5,
        };
        for (x, y) in EXAMPLES.iter().chain([&DEFAULT]) {
            let x = evaluator.compile(*x).unwrap();
            let y = evaluator.compile(*y).unwrap();
            for projection in Projection::exhaustive() {
                sample_exprs(&mut evaluator, &x, &y, &sweep, *projection).unwrap();
            }
        }
    }
}
