use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
    ops,
};

use ordered_float::OrderedFloat;

/// `0` as a complex number.
pub const ZERO: ComplexNumber = ComplexNumber::new(0.0, 0.0);
/// `1` as a complex number.
pub const ONE: ComplexNumber = ComplexNumber::new(1.0, 0.0);
/// The imaginary unit.
pub const I: ComplexNumber = ComplexNumber::new(0.0, 1.0);

/// A complex number with real and imaginary parts.
#[derive(Debug, Clone, Copy)]
pub struct ComplexNumber {
    /// The real part.
    pub real:      f64,
    /// The imaginary part.
    pub imaginary: f64,
}

impl Display for ComplexNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.real, self.imaginary) {
            (real, 0.0) => write!(f, "{real}"),
            (0.0, 1.0) => write!(f, "i"),
            (0.0, -1.0) => write!(f, "-i"),
            (0.0, imaginary) => write!(f, "{imaginary}i"),
            (real, 1.0) => write!(f, "{real} + i"),
            (real, -1.0) => write!(f, "{real} - i"),
            (real, imaginary) if imaginary > 0.0 => write!(f, "{real} + {imaginary}i"),
            (real, imaginary) => write!(f, "{real} - {}i", -imaginary),
        }
    }
}

impl ComplexNumber {
    /// Constructs a complex number from its parts.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::value::complex::ComplexNumber;
    /// let c = ComplexNumber::new(5.0, -1.0);
    /// assert_eq!(c.real, 5.0);
    /// assert_eq!(c.imaginary, -1.0);
    /// ```
    #[must_use]
    pub const fn new(real: f64, imaginary: f64) -> Self {
        Self { real, imaginary }
    }

    /// Returns `true` when the imaginary part is exactly zero.
    #[must_use]
    pub const fn is_real(&self) -> bool {
        self.imaginary == 0.0
    }

    /// Returns the modulus.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::value::complex::ComplexNumber;
    /// assert_eq!(ComplexNumber::new(3.0, 4.0).abs(), 5.0);
    /// ```
    #[must_use]
    pub fn abs(&self) -> f64 {
        self.real.hypot(self.imaginary)
    }

    /// Returns `1 / z`.
    #[must_use]
    pub const fn recip(&self) -> Self {
        let norm_squared = self.real * self.real + self.imaginary * self.imaginary;

        Self { real:      self.real / norm_squared,
               imaginary: -(self.imaginary / norm_squared), }
    }

    /// Returns the argument (phase angle) in radians.
    #[must_use]
    pub fn arg(self) -> f64 {
        self.imaginary.atan2(self.real)
    }

    /// Raises the number to a real power using the principal branch.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::value::complex::ComplexNumber;
    /// let res = ComplexNumber::new(4.0, 0.0).powf(0.5);
    /// assert!((res.real - 2.0).abs() < 1e-10);
    /// assert!(res.imaginary.abs() < 1e-10);
    /// ```
    #[must_use]
    pub fn powf(self, exp: f64) -> Self {
        if self.real == 0.0 && self.imaginary == 0.0 {
            return if exp == 0.0 { ONE } else { ZERO };
        }
        let r = self.abs().powf(exp);
        let theta = self.arg() * exp;

        Self { real:      r * theta.cos(),
               imaginary: r * theta.sin(), }
    }

    /// Raises the number to a complex power, `exp(w ln z)`.
    #[must_use]
    pub fn powc(self, exp: Self) -> Self {
        if exp.is_real() {
            return self.powf(exp.real);
        }
        if self.real == 0.0 && self.imaginary == 0.0 {
            return ZERO;
        }
        (exp * self.ln()).exp()
    }

    /// Raises the number to an integer power by repeated squaring.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::value::complex::{ComplexNumber, I};
    /// assert_eq!(I.powi(2), ComplexNumber::new(-1.0, 0.0));
    /// ```
    #[must_use]
    pub fn powi(self, exp: i32) -> Self {
        let mut base = self;
        let mut result = ONE;
        let mut n = exp.unsigned_abs();

        while n > 0 {
            if n % 2 == 1 {
                result *= base;
            }
            base *= base;
            n /= 2;
        }

        if exp < 0 { result.recip() } else { result }
    }

    /// Returns the principal square root.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::value::complex::ComplexNumber;
    /// let s = ComplexNumber::new(-9.0, 0.0).sqrt();
    /// assert!(s.real.abs() < 1e-10);
    /// assert!((s.imaginary - 3.0).abs() < 1e-10);
    /// ```
    #[must_use]
    pub fn sqrt(self) -> Self {
        let a = self.real;
        let b = self.imaginary;
        let r = a.hypot(b);

        let real = f64::midpoint(r, a).sqrt();
        let imaginary = ((r - a) / 2.0).sqrt().copysign(b);

        Self { real, imaginary }
    }

    /// Sine.
    #[must_use]
    pub fn sin(self) -> Self {
        Self { real:      self.real.sin() * self.imaginary.cosh(),
               imaginary: self.real.cos() * self.imaginary.sinh(), }
    }

    /// Cosine.
    #[must_use]
    pub fn cos(self) -> Self {
        Self { real:      self.real.cos() * self.imaginary.cosh(),
               imaginary: -self.real.sin() * self.imaginary.sinh(), }
    }

    /// Tangent.
    #[must_use]
    pub fn tan(self) -> Self {
        self.sin() / self.cos()
    }

    /// The exponential function.
    #[must_use]
    pub fn exp(self) -> Self {
        let scale = self.real.exp();
        Self { real:      scale * self.imaginary.cos(),
               imaginary: scale * self.imaginary.sin(), }
    }

    /// The principal natural logarithm.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::value::complex::ComplexNumber;
    /// let ln = ComplexNumber::new(-1.0, 0.0).ln();
    /// assert!(ln.real.abs() < 1e-10);
    /// assert!((ln.imaginary - std::f64::consts::PI).abs() < 1e-10);
    /// ```
    #[must_use]
    pub fn ln(self) -> Self {
        Self { real:      self.abs().ln(),
               imaginary: self.arg(), }
    }
}

impl ops::Neg for ComplexNumber {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self { real:      -self.real,
               imaginary: -self.imaginary, }
    }
}

impl ops::Add for ComplexNumber {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self { real:      self.real + rhs.real,
               imaginary: self.imaginary + rhs.imaginary, }
    }
}

impl ops::Sub for ComplexNumber {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self { real:      self.real - rhs.real,
               imaginary: self.imaginary - rhs.imaginary, }
    }
}

impl ops::Mul for ComplexNumber {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self { real:      self.real
                              .mul_add(rhs.real, -(self.imaginary * rhs.imaginary)),
               imaginary: self.real.mul_add(rhs.imaginary, self.imaginary * rhs.real), }
    }
}

impl ops::MulAssign for ComplexNumber {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl ops::Div for ComplexNumber {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        let denom = rhs.real.mul_add(rhs.real, rhs.imaginary * rhs.imaginary);
        Self { real:      self.real.mul_add(rhs.real, self.imaginary * rhs.imaginary) / denom,
               imaginary: self.imaginary
                              .mul_add(rhs.real, -(self.real * rhs.imaginary))
                          / denom, }
    }
}

impl From<f64> for ComplexNumber {
    fn from(value: f64) -> Self {
        Self { real:      value,
               imaginary: 0.0, }
    }
}

impl PartialEq for ComplexNumber {
    fn eq(&self, other: &Self) -> bool {
        OrderedFloat(self.real) == OrderedFloat(other.real)
        && OrderedFloat(self.imaginary) == OrderedFloat(other.imaginary)
    }
}

impl Eq for ComplexNumber {}

impl Hash for ComplexNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        OrderedFloat(self.real).hash(state);
        OrderedFloat(self.imaginary).hash(state);
    }
}

impl PartialOrd for ComplexNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComplexNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(self.real).cmp(&OrderedFloat(other.real))
                               .then_with(|| {
                                   OrderedFloat(self.imaginary).cmp(&OrderedFloat(other.imaginary))
                               })
    }
}
