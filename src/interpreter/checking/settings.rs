use crate::util::num::{round_to_decimal_places, round_to_sig_figs};

/// How close two numbers must be to count as equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckingFunction {
    /// The difference is smaller than the tolerance.
    AbsDiff(f64),
    /// The difference is smaller than the tolerance times the expected
    /// value, or than the tolerance itself when the expected value is zero.
    RelDiff(f64),
    /// Both round to the same number of decimal places.
    DecimalPlaces(u32),
    /// Both round to the same number of significant figures.
    SigFigs(u32),
}

impl CheckingFunction {
    /// Returns `true` if `actual` is close enough to `expected`.
    ///
    /// Infinities only agree with themselves and NaN agrees with nothing.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::checking::settings::CheckingFunction;
    ///
    /// assert!(CheckingFunction::RelDiff(0.01).agree(100.5, 100.0));
    /// assert!(!CheckingFunction::AbsDiff(0.01).agree(100.5, 100.0));
    /// assert!(CheckingFunction::DecimalPlaces(2).agree(3.14159, 3.1401));
    /// assert!(CheckingFunction::SigFigs(3).agree(123_456.0, 123_000.0));
    /// assert!(!CheckingFunction::AbsDiff(1e9).agree(f64::INFINITY, 1.0));
    /// ```
    #[must_use]
    pub fn agree(self, actual: f64, expected: f64) -> bool {
        if actual.is_infinite() || expected.is_infinite() {
            return actual == expected;
        }
        match self {
            Self::AbsDiff(tolerance) => (actual - expected).abs() < tolerance.abs(),
            Self::RelDiff(tolerance) => {
                if expected == 0.0 {
                    (actual - expected).abs() < tolerance.abs()
                } else {
                    (actual - expected).abs() < (tolerance * expected).abs()
                }
            },
            Self::DecimalPlaces(places) => {
                round_to_decimal_places(actual, places) == round_to_decimal_places(expected, places)
            },
            Self::SigFigs(figures) => round_to_sig_figs(actual, figures) == round_to_sig_figs(expected, figures),
        }
    }
}

/// Parameters of [`super::equivalence::are_equivalent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckingSettings {
    /// Number of sample points.
    pub points:       usize,
    /// Interval the free variables are sampled from.
    pub range:        (f64, f64),
    /// The expressions are equivalent while fewer than this many sample
    /// points disagree.
    pub failure_rate: usize,
    /// Comparison of numbers.
    pub checking:     CheckingFunction,
}

impl Default for CheckingSettings {
    fn default() -> Self {
        Self { points:       5,
               range:        (0.0, 1.0),
               failure_rate: 1,
               checking:     CheckingFunction::RelDiff(0.0001), }
    }
}
