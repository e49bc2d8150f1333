use std::{cmp::Ordering, rc::Rc};

use ordered_float::OrderedFloat;

use crate::{
    ast::{TokenKind, Tree},
    interpreter::value::{core::Value, number::Number},
};

/// A term of the shape `coefficient * base ^ degree`, where `base` is a
/// name.
struct Monomial<'a> {
    base:        &'a Tree,
    degree:      f64,
    coefficient: f64,
}

/// Strips leading unary minuses, returning the inner tree and whether an
/// odd number of them was removed.
fn strip_negation(mut tree: &Tree) -> (&Tree, bool) {
    let mut negative = false;
    while tree.is_op("-u") && tree.args.len() == 1 {
        negative = !negative;
        tree = &tree.args[0];
    }
    (tree, negative)
}

fn number(tree: &Tree) -> Option<Number> {
    match &tree.tok.kind {
        TokenKind::Literal(Value::Number(n)) => Some(*n),
        _ => None,
    }
}

/// The names occurring in `tree`, depth first, with repeats.
fn names(tree: &Tree, out: &mut Vec<String>) {
    if let Some(name) = tree.as_name() {
        out.push(name.key());
    }
    for arg in &tree.args {
        names(arg, out);
    }
}

/// A name, or a name raised to a number, with its degree.
fn power(tree: &Tree) -> Option<(&Tree, f64)> {
    if tree.as_name().is_some() {
        return Some((tree, 1.0));
    }
    if tree.is_op("^") && tree.args.len() == 2 && tree.args[0].as_name().is_some() {
        return number(&tree.args[1]).map(|n| (tree.args[0].as_ref(), n.re()));
    }
    None
}

/// Recognises `x`, `x^n`, `k*x` and `k*x^n` for a name `x` and numbers `k`
/// and `n`.
fn monomial(tree: &Tree) -> Option<Monomial<'_>> {
    if let Some((base, degree)) = power(tree) {
        return Some(Monomial { base,
                               degree,
                               coefficient: 1.0 });
    }
    if tree.is_op("*") && tree.args.len() == 2 {
        let coefficient = number(&tree.args[0])?.re();
        let (base, degree) = power(&tree.args[1])?;
        return Some(Monomial { base,
                               degree,
                               coefficient });
    }
    None
}

/// `x^n`, or a product or quotient whose right operand is a power.
fn is_power(tree: &Tree) -> bool {
    tree.is_op("^") || ((tree.is_op("*") || tree.is_op("/")) && tree.args.get(1).is_some_and(|r| r.is_op("^")))
}

/// Longer lists first when one is a prefix of the other.
fn compare_names(a: &[String], b: &[String]) -> Ordering {
    a.iter()
     .zip(b)
     .map(|(x, y)| x.cmp(y))
     .find(|o| o.is_ne())
     .unwrap_or_else(|| b.len().cmp(&a.len()))
}

fn compare_leaves(a: &Tree, b: &Tree) -> Ordering {
    match (&a.tok.kind, &b.tok.kind) {
        (TokenKind::Literal(Value::Number(x)), TokenKind::Literal(Value::Number(y))) => {
            OrderedFloat(x.re()).cmp(&OrderedFloat(y.re()))
                                .then(OrderedFloat(x.im()).cmp(&OrderedFloat(y.im())))
        },
        (TokenKind::Literal(Value::String(x)), TokenKind::Literal(Value::String(y))) => x.value.cmp(&y.value),
        (TokenKind::Literal(Value::Boolean(x)), TokenKind::Literal(Value::Boolean(y))) => x.cmp(y),
        (TokenKind::Name(x), TokenKind::Name(y)) => x.key().cmp(&y.key()),
        (TokenKind::KeyPair(x), TokenKind::KeyPair(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn compare_unsigned(a: &Tree, b: &Tree) -> Ordering {
    let mut names_a = Vec::new();
    let mut names_b = Vec::new();
    names(a, &mut names_a);
    names(b, &mut names_b);
    let by_names = compare_names(&names_a, &names_b);
    if by_names.is_ne() {
        return by_names;
    }

    match (monomial(a), monomial(b)) {
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (Some(ma), Some(mb)) if !(a.as_name().is_some() && b.as_name().is_some()) => {
            return compare_trees(ma.base, mb.base)
                   .then(OrderedFloat(mb.degree).cmp(&OrderedFloat(ma.degree)))
                   .then(OrderedFloat(ma.coefficient).cmp(&OrderedFloat(mb.coefficient)));
        },
        _ => {},
    }

    let call_a = a.tok.is_call();
    let call_b = b.tok.is_call();
    call_b.cmp(&call_a)
          .then_with(|| a.tok.tag().cmp(b.tok.tag()))
          .then_with(|| is_power(b).cmp(&is_power(a)))
          .then_with(|| a.call_name().cmp(&b.call_name()))
          .then_with(|| compare_leaves(a, b))
          .then_with(|| a.args.len().cmp(&b.args.len()))
          .then_with(|| {
              a.args
               .iter()
               .zip(&b.args)
               .map(|(x, y)| compare_trees(x, y))
               .find(|o| o.is_ne())
               .unwrap_or(Ordering::Equal)
          })
}

/// Orders two trees for display and simplification.
///
/// The order is a total preorder: trees which differ only in ways it does
/// not look at compare equal. In decreasing priority it looks at
/// - the names used, depth first, so `x*y` sorts before `x`;
/// - monomials before other terms, higher degrees first;
/// - operators and function calls before other nodes, then the kind of node;
/// - powers first, then operator names, arity and the children in turn;
/// - for numbers, the real and then the imaginary part.
///
/// Leading unary minuses are ignored except as a final tie-break, where the
/// positive term comes first.
///
/// # Example
/// ```
/// use std::cmp::Ordering;
///
/// use algebrist::{compile, interpreter::analysis::compare::compare_trees};
///
/// let square = compile("3x^2").unwrap().unwrap();
/// let linear = compile("x").unwrap().unwrap();
/// assert_eq!(compare_trees(&square, &linear), Ordering::Less);
/// ```
#[must_use]
pub fn compare_trees(a: &Tree, b: &Tree) -> Ordering {
    let (a, negative_a) = strip_negation(a);
    let (b, negative_b) = strip_negation(b);
    compare_unsigned(a, b).then(negative_a.cmp(&negative_b))
}

/// Sorts `trees` into canonical order. The sort is stable.
pub fn sort_trees(trees: &mut [Rc<Tree>]) {
    trees.sort_by(|a, b| compare_trees(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    fn tree(source: &str) -> Rc<Tree> {
        compile(source).unwrap().unwrap()
    }

    fn sorted(sources: &[&str]) -> Vec<String> {
        let mut trees: Vec<Rc<Tree>> = sources.iter().map(|s| tree(s)).collect();
        sort_trees(&mut trees);
        trees.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn higher_degrees_first() {
        assert_eq!(compare_trees(&tree("3x^2"), &tree("x")), Ordering::Less);
        assert_eq!(compare_trees(&tree("x"), &tree("x^3")), Ordering::Greater);
        assert_eq!(compare_trees(&tree("2x"), &tree("5x")), Ordering::Less);
    }

    #[test]
    fn polynomial_terms() {
        assert_eq!(sorted(&["1", "x", "3x^2"]), ["3 * x ^ 2", "x", "1"]);
        assert_eq!(sorted(&["y", "x"]), ["x", "y"]);
    }

    #[test]
    fn signs_and_numbers() {
        assert_eq!(compare_trees(&tree("x"), &tree("-x")), Ordering::Less);
        assert_eq!(compare_trees(&tree("-x"), &tree("--x")), Ordering::Greater);
        assert_eq!(compare_trees(&tree("1"), &tree("2")), Ordering::Less);
        assert_eq!(compare_trees(&tree("2"), &tree("2")), Ordering::Equal);
    }

    #[test]
    fn longer_name_lists_first() {
        assert_eq!(compare_trees(&tree("x * y"), &tree("x")), Ordering::Less);
    }

    #[test]
    fn calls_and_powers_first() {
        assert_eq!(compare_trees(&tree("sin(x)"), &tree("x + 1")), Ordering::Less);
        assert_eq!(compare_trees(&tree("(x + 1) ^ 2"), &tree("(x + 1) * 2")), Ordering::Less);
        assert_eq!(compare_trees(&tree("x + 1"), &tree("[x, 1]")), Ordering::Less);
    }
    #[test]
    fn powers_rank_after_the_kind_of_node() {
        assert_eq!(compare_trees(&tree("(1 + 2) ^ 2"), &tree("5")), Ordering::Less);
        assert_eq!(compare_trees(&tree("5"), &tree("(1 + 2) ^ 2")), Ordering::Greater);
        assert_eq!(compare_trees(&tree("sin(x)"), &tree("(x + 1) ^ 2")), Ordering::Less);
        assert_eq!(compare_trees(&tree("(1 + 2) ^ 2"), &tree("1 + 2")), Ordering::Less);
    }
}
