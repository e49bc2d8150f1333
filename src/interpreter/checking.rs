/// Tolerance policies and the settings of an equivalence check.
pub mod settings;

/// Randomised equivalence checking of two expressions.
///
/// Both expressions are evaluated at the same random sample points and the
/// results compared with a configurable tolerance.
pub mod equivalence;
