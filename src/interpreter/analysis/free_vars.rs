use std::collections::BTreeSet;

use crate::{
    ast::{TokenKind, Tree},
    interpreter::{
        evaluator::substitute::{bound_names, let_names},
        operators::{Binding, binding},
        parser::core::compile,
        text::{Segment, split_interpolation, tex_commands},
        value::core::Value,
    },
};

/// Collects the names used in `tree` which are not in `bound`.
///
/// Names are reported lower-cased. Strings are scanned too: every
/// `{expression}` segment, and in the plain text between them every
/// `\var{expression}` and `\simplify{expression}`, contributes its own free
/// variables. Embedded expressions which do not parse contribute nothing.
///
/// Constructs which bind names hide them from the parts of their arguments
/// where they are bound: `map(x^2, x, xs)` only depends on `xs`.
///
/// # Example
/// ```
/// use std::collections::BTreeSet;
///
/// use algebrist::{compile, interpreter::analysis::free_vars::free_variables};
///
/// let tree = compile(r#"map(x + a, x, xs) + "{b} and \\var{c}""#).unwrap().unwrap();
/// let names: Vec<String> = free_variables(&tree, &BTreeSet::new()).into_iter().collect();
/// assert_eq!(names, ["a", "b", "c", "xs"]);
/// ```
#[must_use]
pub fn free_variables(tree: &Tree, bound: &BTreeSet<String>) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    collect(tree, bound, &mut found);
    found
}

fn collect(tree: &Tree, bound: &BTreeSet<String>, found: &mut BTreeSet<String>) {
    match &tree.tok.kind {
        TokenKind::Name(name) => {
            let key = name.key();
            if !bound.contains(&key) {
                found.insert(key);
            }
        },
        TokenKind::Literal(Value::String(s)) => scan_string(&s.value, bound, found),
        _ => {},
    }

    let args = tree.args.as_slice();
    match tree.call_name().and_then(binding) {
        Some(Binding::Opaque) => {},
        Some(Binding::FirstOnly) => {
            if let Some(first) = args.first() {
                collect(first, bound, found);
            }
        },
        Some(Binding::Map) if args.len() == 3 => {
            let mut inner = bound.clone();
            inner.extend(bound_names(&args[1]));
            collect(&args[0], &inner, found);
            collect(&args[2], bound, found);
        },
        Some(Binding::Let) => {
            let Some((body, bindings)) = args.split_last() else {
                return;
            };
            let mut inner = bound.clone();
            if let [dict] = bindings {
                collect(dict, bound, found);
                inner.extend(let_names(args));
            } else {
                for pair in bindings.chunks(2) {
                    if let Some(value) = pair.get(1) {
                        collect(value, &inner, found);
                    }
                    if let Some(name) = pair[0].as_name() {
                        inner.insert(name.key());
                    }
                }
            }
            collect(body, &inner, found);
        },
        _ => {
            for arg in args {
                collect(arg, bound, found);
            }
        },
    }
}

fn scan_string(text: &str, bound: &BTreeSet<String>, found: &mut BTreeSet<String>) {
    for segment in split_interpolation(text) {
        match segment {
            Segment::Expr(source) => scan_source(&source, bound, found),
            Segment::Text(plain) => {
                for command in tex_commands(&plain) {
                    scan_source(&command.expr, bound, found);
                }
            },
        }
    }
}

fn scan_source(source: &str, bound: &BTreeSet<String>, found: &mut BTreeSet<String>) {
    if let Ok(Some(tree)) = compile(source) {
        collect(&tree, bound, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free(source: &str, bound: &[&str]) -> Vec<String> {
        let bound: BTreeSet<String> = bound.iter().map(ToString::to_string).collect();
        free_variables(&compile(source).unwrap().unwrap(), &bound).into_iter().collect()
    }

    #[test]
    fn names_and_bound_names() {
        assert_eq!(free("x + 2y - f(z)", &[]), ["x", "y", "z"]);
        assert_eq!(free("x + X", &[]), ["x"]);
        assert_eq!(free("x + y", &["y"]), ["x"]);
        assert!(free("1 + pi", &[]).is_empty());
    }

    #[test]
    fn binding_constructs() {
        assert_eq!(free("map(x * k, x, 1..n)", &[]), ["k", "n"]);
        assert_eq!(free("filter(p[0] > t, [p], ps)", &[]), ["ps", "t"]);
        assert_eq!(free("let(a, b, c, a + 1, a + c + d)", &[]), ["b", "d"]);
        assert_eq!(free("let([\"a\": y], a)", &[]), ["y"]);
        assert_eq!(free("x isa \"name\"", &[]), ["x"]);
        assert!(free("safe(\"{x}\")", &[]).is_empty());
    }

    #[test]
    fn strings() {
        assert_eq!(free(r#""{a} \\simplify[basic]{b + 1} \\{c\\}""#, &[]), ["a", "b"]);
        assert!(free(r#""{1 +}""#, &[]).is_empty());
    }
}
