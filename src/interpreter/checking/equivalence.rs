use std::{collections::BTreeSet, rc::Rc};

use rand::Rng;
use tracing::debug;

use crate::{
    ast::Tree,
    interpreter::{
        analysis::free_vars::free_variables,
        checking::settings::{CheckingFunction, CheckingSettings},
        parser::core::compile,
        scope::core::Scope,
        value::core::Value,
    },
};

/// Prefix of variables used internally by library code; they never count
/// towards the free variables of an expression.
pub const INTERNAL_PREFIX: char = '$';

/// Compares two evaluated values, numbers up to the tolerance of
/// `checking`.
///
/// Vectors and matrices must have the same dimensions, lists the same
/// length. Any other pair of values must be exactly equal.
#[must_use]
pub fn values_agree(a: &Value, b: &Value, checking: CheckingFunction) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => checking.agree(x.re(), y.re()) && checking.agree(x.im(), y.im()),
        (Value::Vector(x), Value::Vector(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| checking.agree(*p, *q))
        },
        (Value::Matrix(x), Value::Matrix(y)) => {
            x.rows() == y.rows()
            && x.columns() == y.columns()
            && x.entries().zip(y.entries()).all(|(p, q)| checking.agree(p, q))
        },
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| values_agree(p, q, checking))
        },
        _ => a == b,
    }
}

/// The free variables of `tree` which `scope` does not bind.
fn unbound_names(tree: &Tree, scope: &Scope<'_>) -> BTreeSet<String> {
    free_variables(tree, &BTreeSet::new()).into_iter()
                                          .filter(|name| scope.get_variable(name).is_none())
                                          .collect()
}

fn visible(names: &BTreeSet<String>) -> BTreeSet<&String> {
    names.iter().filter(|name| !name.starts_with(INTERNAL_PREFIX)).collect()
}

/// Evaluates both trees in `scope` and compares the results. Evaluation
/// errors are returned as `None`.
fn agree_in(scope: &Scope<'_>, a: &Rc<Tree>, b: &Rc<Tree>, checking: CheckingFunction) -> Option<bool> {
    match (scope.evaluate(a), scope.evaluate(b)) {
        (Ok(x), Ok(y)) => Some(values_agree(&x, &y, checking)),
        (Err(e), _) | (_, Err(e)) => {
            debug!(error = %e, "evaluation failed while checking equivalence");
            None
        },
    }
}

/// Decides whether two expressions are equivalent by evaluating them at
/// random points.
///
/// Both expressions must compile and have the same free variables, ignoring
/// names bound in `scope` and names starting with `$`. Expressions without
/// free variables are evaluated once. Otherwise each of `settings.points`
/// trials samples every free variable uniformly from `settings.range` and
/// compares the two values; the expressions are equivalent if fewer than
/// `settings.failure_rate` trials disagree. Compile and evaluation errors
/// make the expressions inequivalent.
///
/// # Example
/// ```
/// use algebrist::interpreter::{
///     checking::{equivalence::are_equivalent, settings::CheckingSettings},
///     library::core::builtin_scope,
/// };
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let scope = builtin_scope();
/// let settings = CheckingSettings::default();
/// let mut rng = StdRng::seed_from_u64(7);
///
/// assert!(are_equivalent("(x + 1)^2", "x^2 + 2x + 1", &settings, &scope, &mut rng));
/// assert!(!are_equivalent("(x + 1)^2", "x^2 + 1", &settings, &scope, &mut rng));
/// ```
pub fn are_equivalent<R>(expr1: &str,
                         expr2: &str,
                         settings: &CheckingSettings,
                         scope: &Scope<'_>,
                         rng: &mut R)
                         -> bool
    where R: Rng
{
    let (Ok(Some(a)), Ok(Some(b))) = (compile(expr1), compile(expr2)) else {
        debug!(expr1, expr2, "an expression does not compile");
        return false;
    };

    let names_a = unbound_names(&a, scope);
    let names_b = unbound_names(&b, scope);
    if visible(&names_a) != visible(&names_b) {
        debug!(?names_a, ?names_b, "free variables differ");
        return false;
    }

    let names: BTreeSet<String> = names_a.union(&names_b).cloned().collect();
    if names.is_empty() {
        return agree_in(scope, &a, &b, settings.checking).unwrap_or(false);
    }

    let (low, high) = settings.range;
    let mut mismatches = 0;
    for trial in 0..settings.points {
        let sample: Vec<(&String, Value)> = names.iter()
                                                 .map(|name| {
                                                     let t: f64 = rng.r#gen();
                                                     (name, Value::from(t.mul_add(high - low, low)))
                                                 })
                                                 .collect();
        let inner = scope.with_variables(sample);
        match agree_in(&inner, &a, &b, settings.checking) {
            Some(true) => {},
            Some(false) => {
                mismatches += 1;
                debug!(trial, mismatches, "sample point disagrees");
            },
            None => return false,
        }
    }

    let equivalent = mismatches < settings.failure_rate;
    debug!(mismatches, failure_rate = settings.failure_rate, equivalent, "equivalence check finished");
    equivalent
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::interpreter::library::core::builtin_scope;

    fn check(expr1: &str, expr2: &str, settings: &CheckingSettings) -> bool {
        let scope = builtin_scope();
        let mut rng = StdRng::seed_from_u64(1);
        are_equivalent(expr1, expr2, settings, &scope, &mut rng)
    }

    #[test]
    fn equivalent_forms() {
        let settings = CheckingSettings::default();
        assert!(check("x + x", "2x", &settings));
        assert!(check("sin(x)^2 + cos(x)^2", "1 + 0x", &settings));
        assert!(check("1 + 2", "3", &settings));
        assert!(check("[x, 2x]", "[x, x + x]", &settings));
    }

    #[test]
    fn different_variables_or_values() {
        let settings = CheckingSettings::default();
        assert!(!check("x", "y", &settings));
        assert!(!check("x + 1", "x", &settings));
        assert!(!check("[x, x]", "[x]", &settings));
        assert!(!check("(x", "x", &settings));
        assert!(!check("x + \"a\" * 2", "x", &settings));
    }

    #[test]
    fn bound_and_internal_names_are_not_free() {
        let mut scope = builtin_scope();
        scope.set_variable("a", 2.0.into());
        let mut rng = StdRng::seed_from_u64(3);
        let settings = CheckingSettings::default();
        assert!(are_equivalent("a * x", "2x", &settings, &scope, &mut rng));
        assert!(are_equivalent("x + 0 * $n", "x", &settings, &scope, &mut rng));
    }

    #[test]
    fn branch_mismatches_within_the_failure_rate() {
        let settings = CheckingSettings { range: (-1.0, 1.0),
                                          failure_rate: 5,
                                          ..CheckingSettings::default() };
        assert!(check("sqrt(x)^2", "x", &settings));
    }

    #[test]
    fn failure_rate_counts_trials_not_variables() {
        // Every trial disagrees: abs(x) <> x for negative x.
        let strict = CheckingSettings { range: (-2.0, -1.0),
                                        failure_rate: 5,
                                        ..CheckingSettings::default() };
        let tolerant = CheckingSettings { failure_rate: 6,
                                          ..strict };
        assert!(!check("abs(x) + y", "x + y", &strict));
        assert!(check("abs(x) + y", "x + y", &tolerant));
    }
}
