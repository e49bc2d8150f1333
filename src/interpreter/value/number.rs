use std::{fmt::Display, ops};

use crate::interpreter::value::complex::ComplexNumber;

/// A number: either real or complex.
///
/// Arithmetic between a real and a complex number widens the real operand.
/// Results of complex arithmetic stay complex even if the imaginary part
/// cancels out; use [`Number::simplified`] to narrow them back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// A real number.
    Real(f64),
    /// A complex number.
    Complex(ComplexNumber),
}

impl Number {
    /// Returns the number as a complex number, widening reals.
    #[must_use]
    pub const fn to_complex(self) -> ComplexNumber {
        match self {
            Self::Real(r) => ComplexNumber::new(r, 0.0),
            Self::Complex(c) => c,
        }
    }
    /// The real part.
    #[must_use]
    pub const fn re(self) -> f64 {
        match self {
            Self::Real(r) => r,
            Self::Complex(c) => c.real,
        }
    }
    /// The imaginary part, zero for reals.
    #[must_use]
    pub const fn im(self) -> f64 {
        match self {
            Self::Real(_) => 0.0,
            Self::Complex(c) => c.imaginary,
        }
    }
    /// Returns `true` for the complex variant, regardless of its imaginary
    /// part.
    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Complex(_))
    }
    /// Returns `true` if the real part is negative and there is no imaginary
    /// part.
    #[must_use]
    pub fn is_negative(self) -> bool {
        matches!(self, Self::Real(r) if r < 0.0)
    }
    /// Narrows a complex number with zero imaginary part to a real.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::value::{complex::ComplexNumber, number::Number};
    ///
    /// let n = Number::Complex(ComplexNumber::new(2.0, 0.0));
    /// assert_eq!(n.simplified(), Number::Real(2.0));
    /// ```
    #[must_use]
    pub const fn simplified(self) -> Self {
        match self {
            Self::Complex(c) if c.is_real() => Self::Real(c.real),
            other => other,
        }
    }
    /// Applies a binary operation, staying real when both operands are real.
    fn combine(self,
               other: Self,
               real: impl Fn(f64, f64) -> f64,
               complex: impl Fn(ComplexNumber, ComplexNumber) -> ComplexNumber)
               -> Self {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => Self::Real(real(a, b)),
            (a, b) => Self::Complex(complex(a.to_complex(), b.to_complex())),
        }
    }
    /// Raises `self` to `exp`.
    ///
    /// A negative real base with a non-integer real exponent gives the
    /// principal complex value, so `(-4)^0.5` is `2i`.
    #[must_use]
    pub fn pow(self, exp: Self) -> Self {
        match (self, exp) {
            (Self::Real(a), Self::Real(b)) if a >= 0.0 || b.fract() == 0.0 => Self::Real(a.powf(b)),
            (a, Self::Real(b)) if b.fract() == 0.0 && b.abs() <= f64::from(i32::MAX) => {
                #[allow(clippy::cast_possible_truncation)]
                let n = b as i32;
                Self::Complex(a.to_complex().powi(n))
            },
            (a, b) => Self::Complex(a.to_complex().powc(b.to_complex())),
        }
    }
    /// The principal square root, complex for negative reals.
    #[must_use]
    pub fn sqrt(self) -> Self {
        match self {
            Self::Real(r) if r >= 0.0 => Self::Real(r.sqrt()),
            other => Self::Complex(other.to_complex().sqrt()),
        }
    }
    /// The modulus.
    #[must_use]
    pub fn abs(self) -> f64 {
        match self {
            Self::Real(r) => r.abs(),
            Self::Complex(c) => c.abs(),
        }
    }
    /// Applies a function which has a real and a complex form, using the
    /// complex form only for complex input.
    #[must_use]
    pub fn map(self, real: impl Fn(f64) -> f64, complex: impl Fn(ComplexNumber) -> ComplexNumber) -> Self {
        match self {
            Self::Real(r) => Self::Real(real(r)),
            Self::Complex(c) => Self::Complex(complex(c)),
        }
    }
}

impl ops::Add for Number {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.combine(rhs, |a, b| a + b, |a, b| a + b)
    }
}

impl ops::Sub for Number {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.combine(rhs, |a, b| a - b, |a, b| a - b)
    }
}

impl ops::Mul for Number {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.combine(rhs, |a, b| a * b, |a, b| a * b)
    }
}

impl ops::Div for Number {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self.combine(rhs, |a, b| a / b, |a, b| a / b)
    }
}

impl ops::Neg for Number {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|r| -r, |c| -c)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<ComplexNumber> for Number {
    fn from(value: ComplexNumber) -> Self {
        Self::Complex(value)
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(r) if r.is_infinite() => {
                write!(f, "{}infinity", if *r < 0.0 { "-" } else { "" })
            },
            Self::Real(r) => write!(f, "{r}"),
            Self::Complex(c) => write!(f, "{c}"),
        }
    }
}
