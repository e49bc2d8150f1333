use std::fmt::Display;

use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// The most elements a range or `repeat` may produce.
pub const MAX_LENGTH: usize = 10_000_000;

/// An arithmetic range `start..end#step`.
///
/// A step of zero denotes the continuous interval between the endpoints,
/// which has no discrete elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// First value.
    pub start: f64,
    /// Last value (inclusive, if reachable by whole steps).
    pub end:   f64,
    /// Distance between consecutive values.
    pub step:  f64,
}

impl Range {
    /// Creates a range.
    #[must_use]
    pub const fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    /// The number of discrete values in the range; zero when `step` is zero or
    /// points away from `end`.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::value::range::Range;
    ///
    /// assert_eq!(Range::new(1.0, 5.0, 1.0).size(), 5);
    /// assert_eq!(Range::new(0.0, 1.0, 0.25).size(), 5);
    /// assert_eq!(Range::new(5.0, 1.0, -2.0).size(), 3);
    /// assert_eq!(Range::new(0.0, 1.0, 0.0).size(), 0);
    /// assert_eq!(Range::new(5.0, 1.0, 1.0).size(), 0);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn size(&self) -> usize {
        if self.step == 0.0 {
            return 0;
        }
        let steps = ((self.end - self.start) / self.step + 1e-10).floor();
        if steps < 0.0 || !steps.is_finite() {
            0
        } else {
            steps as usize + 1
        }
    }

    /// The `i`th value of the range, counting from zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn nth(&self, i: usize) -> f64 {
        (i as f64).mul_add(self.step, self.start)
    }

    /// The discrete values of the range, in order.
    ///
    /// # Errors
    /// `InvalidArgument` if there are more than [`MAX_LENGTH`] of them.
    pub fn values(&self, pos: usize) -> EvalResult<Vec<f64>> {
        let size = self.size();
        if size > MAX_LENGTH {
            return Err(RuntimeError::InvalidArgument { details: format!("the range {self} has more than {MAX_LENGTH} values"),
                                                       pos });
        }
        Ok((0..size).map(|i| self.nth(i)).collect())
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.step == 1.0 {
            write!(f, "{}..{}", self.start, self.end)
        } else {
            write!(f, "{}..{}#{}", self.start, self.end, self.step)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_step_from_the_start() {
        assert_eq!(Range::new(1.0, 2.0, 0.5).values(0).unwrap(), [1.0, 1.5, 2.0]);
        assert_eq!(Range::new(3.0, 1.0, -1.0).values(0).unwrap(), [3.0, 2.0, 1.0]);
        assert!(Range::new(0.0, 1.0, 0.0).values(0).unwrap().is_empty());
    }

    #[test]
    fn huge_ranges_are_refused() {
        let huge = Range::new(0.0, 1e12, 1.0);
        assert_eq!(huge.size(), 1_000_000_000_001);
        assert!(matches!(huge.values(4), Err(RuntimeError::InvalidArgument { pos: 4, .. })));
        assert_eq!(huge.nth(999_999_999_999), 999_999_999_999.0);
    }
}
