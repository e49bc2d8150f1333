/// Complex number support.
///
/// Defines the `ComplexNumber` type with the elementary operations needed by
/// the core library: arithmetic, powers, roots, exponentials and the basic
/// trigonometric functions.
pub mod complex;
/// Real-or-complex numbers.
///
/// `Number` is the payload of numeric values and performs the widening of
/// reals to complex numbers when the two are mixed.
pub mod number;
/// Dense real matrices with a checked constructor.
pub mod matrix;
/// Arithmetic ranges such as `1..10#2`.
pub mod range;

/// The `Value` enum and its tags.
pub mod core;
