use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Largest integer exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_INT: f64 = 9_007_199_254_740_991.0;

/// Safely converts an `f64` to `i64` if the value is finite, within range, and
/// not fractional.
///
/// # Errors
/// Returns `TypeError` for non-finite values, `LiteralTooLarge` for values
/// outside the exactly representable range and `RealIsFractional` for values
/// with a fractional part.
///
/// # Example
/// ```
/// use algebrist::{error::RuntimeError, util::num::f64_to_i64_checked};
///
/// assert_eq!(f64_to_i64_checked(1000.0, 1).unwrap(), 1000);
///
/// let err = f64_to_i64_checked(1.5, 123).unwrap_err();
/// assert!(matches!(err, RuntimeError::RealIsFractional { pos: 123 }));
///
/// let err = f64_to_i64_checked(1e20, 5).unwrap_err();
/// assert!(matches!(err, RuntimeError::LiteralTooLarge { pos: 5 }));
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn f64_to_i64_checked(value: f64, pos: usize) -> EvalResult<i64> {
    if !value.is_finite() {
        return Err(RuntimeError::TypeError { details: format!("cannot use {value} as an integer"),
                                             pos });
    }
    if value.abs() > MAX_SAFE_INT {
        return Err(RuntimeError::LiteralTooLarge { pos });
    }
    if value.fract() != 0.0 {
        return Err(RuntimeError::RealIsFractional { pos });
    }
    Ok(value as i64)
}

/// Converts a possibly negative index into a position in a collection of
/// length `len`, counting negative indices from the end.
///
/// # Errors
/// Returns `IndexOutOfBounds` if the index does not refer to an element.
///
/// # Example
/// ```
/// use algebrist::util::num::resolve_index;
///
/// assert_eq!(resolve_index(1, 3, 0).unwrap(), 1);
/// assert_eq!(resolve_index(-1, 3, 0).unwrap(), 2);
/// assert!(resolve_index(3, 3, 0).is_err());
/// ```
pub fn resolve_index(index: i64, len: usize, pos: usize) -> EvalResult<usize> {
    let out_of_bounds = RuntimeError::IndexOutOfBounds { index,
                                                         length: len,
                                                         pos };
    let len_i64 = i64::try_from(len).map_err(|_| RuntimeError::LiteralTooLarge { pos })?;
    let resolved = if index < 0 { len_i64 + index } else { index };
    if resolved < 0 || resolved >= len_i64 {
        return Err(out_of_bounds);
    }
    usize::try_from(resolved).map_err(|_| out_of_bounds)
}

/// Rounds `value` to `places` decimal places, rounding halves away from zero.
///
/// # Example
/// ```
/// use algebrist::util::num::round_to_decimal_places;
///
/// assert_eq!(round_to_decimal_places(3.14159, 2), 3.14);
/// assert_eq!(round_to_decimal_places(-2.5, 0), -3.0);
/// ```
#[must_use]
pub fn round_to_decimal_places(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(i32::try_from(places).unwrap_or(i32::MAX));
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Rounds `value` to `figures` significant figures.
///
/// # Example
/// ```
/// use algebrist::util::num::round_to_sig_figs;
///
/// assert_eq!(round_to_sig_figs(123456.0, 3), 123000.0);
/// assert_eq!(round_to_sig_figs(0.0012345, 2), 0.0012);
/// assert_eq!(round_to_sig_figs(0.0, 4), 0.0);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_to_sig_figs(value: f64, figures: u32) -> f64 {
    if value == 0.0 || !value.is_finite() || figures == 0 {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let shift = i32::try_from(figures).unwrap_or(i32::MAX).saturating_sub(1)
                                      .saturating_sub(magnitude);
    let factor = 10f64.powi(shift.saturating_abs());
    // Past f64 precision there is nothing left to round.
    if !factor.is_finite() {
        return value;
    }
    if shift >= 0 {
        let scaled = value * factor;
        if !scaled.is_finite() {
            return value;
        }
        scaled.round() / factor
    } else {
        (value / factor).round() * factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_past_f64_precision_keeps_the_value() {
        assert_eq!(round_to_decimal_places(1.25, u32::MAX), 1.25);
        assert_eq!(round_to_decimal_places(1e300, 100), 1e300);
        assert_eq!(round_to_sig_figs(1.25, u32::MAX), 1.25);
        assert_eq!(round_to_sig_figs(1e-300, 20), 1e-300);
    }

    #[test]
    fn rounding_halves_away_from_zero() {
        assert_eq!(round_to_decimal_places(0.5, 0), 1.0);
        assert_eq!(round_to_decimal_places(-0.125, 2), -0.13);
        assert_eq!(round_to_sig_figs(-15.0, 1), -20.0);
    }
}
