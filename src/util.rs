/// Numeric conversion and rounding helpers.
///
/// This module provides safe functions for converting between integer and
/// floating-point types without silent data loss, plus the rounding routines
/// used when comparing numbers to a fixed precision.
pub mod num;
