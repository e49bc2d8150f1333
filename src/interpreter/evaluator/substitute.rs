use std::{collections::BTreeSet, rc::Rc};

use crate::{
    ast::{TokenKind, Tree},
    error::RuntimeError,
    interpreter::{
        analysis::free_vars::free_variables,
        evaluator::core::EvalResult,
        operators::{Binding, binding},
        scope::core::{Scope, ScopeKind},
        value::core::Value,
    },
};

/// The names bound by the name argument of `map` or `filter`: a single name,
/// a string, or a list of either.
pub(crate) fn bound_names(tree: &Tree) -> Vec<String> {
    match &tree.tok.kind {
        TokenKind::Name(name) => vec![name.key()],
        TokenKind::Literal(Value::String(s)) => vec![s.value.to_lowercase()],
        TokenKind::List => tree.args.iter().flat_map(|arg| bound_names(arg)).collect(),
        _ => Vec::new(),
    }
}

/// The names bound by `let`, paired with the argument holding each value.
///
/// `let(a, 1, b, 2, body)` binds `a` and `b`; `let([\"a\": 1], body)` binds the
/// keys of the dictionary literal.
pub(crate) fn let_names(args: &[Rc<Tree>]) -> Vec<String> {
    match args {
        [dict, _body] => dict.args
                             .iter()
                             .filter_map(|pair| match &pair.tok.kind {
                                 TokenKind::KeyPair(key) => Some(key.to_lowercase()),
                                 _ => None,
                             })
                             .collect(),
        [pairs @ .., _body] => pairs.chunks(2)
                                    .filter_map(|pair| pair[0].as_name().map(|n| n.key()))
                                    .collect(),
        [] => Vec::new(),
    }
}

/// Returns `tree` itself if every new child is the old one, or a new node
/// with the same head otherwise.
fn rebuild(tree: &Rc<Tree>, args: Vec<Rc<Tree>>) -> Rc<Tree> {
    if args.len() == tree.args.len() && args.iter().zip(&tree.args).all(|(new, old)| Rc::ptr_eq(new, old)) {
        Rc::clone(tree)
    } else {
        Rc::new(Tree::node(tree.tok.clone(), args))
    }
}

/// Byte offset of the first name leaf of `tree` called `key`.
fn name_position(tree: &Tree, key: &str) -> Option<usize> {
    if let Some(name) = tree.as_name()
       && name.key() == key
    {
        return Some(tree.tok.pos);
    }
    tree.args.iter().find_map(|arg| name_position(arg, key))
}

/// Fails with `UnboundVariable` at the first free name of `tree` which is
/// not in `allowed`.
fn require_bound(tree: &Tree, allowed: &BTreeSet<String>) -> EvalResult<()> {
    for name in free_variables(tree, allowed) {
        if let Some(pos) = name_position(tree, &name) {
            return Err(RuntimeError::UnboundVariable { name, pos });
        }
    }
    Ok(())
}

impl Scope<'_> {
    /// Replaces every bound name in `tree` with a literal of its value.
    ///
    /// The input is never modified: the result shares every untouched
    /// subtree with it, and is the very same `Rc` when nothing was bound.
    /// Constructs which bind names themselves (`map`, `filter`, `let`) only
    /// substitute into their bodies with those names hidden, `isa` only
    /// substitutes into its first argument, and `safe` not at all. Names
    /// left unbound inside such bodies are always kept.
    ///
    /// # Errors
    /// `UnboundVariable` if `allow_unbound` is off and a name has no
    /// binding.
    ///
    /// # Example
    /// ```
    /// use std::rc::Rc;
    ///
    /// use algebrist::{compile, interpreter::scope::core::Scope};
    ///
    /// let mut scope = Scope::new();
    /// scope.set_variable("x", 2.0.into());
    ///
    /// let tree = compile("x + y").unwrap().unwrap();
    /// let once = scope.substitute(&tree, true).unwrap();
    /// assert_eq!(once.to_string(), "2 + y");
    /// assert!(Rc::ptr_eq(&once.args[1], &tree.args[1]));
    ///
    /// assert!(scope.substitute(&tree, false).is_err());
    /// ```
    pub fn substitute(&self, tree: &Rc<Tree>, allow_unbound: bool) -> EvalResult<Rc<Tree>> {
        if tree.args.is_empty() {
            return self.substitute_leaf(tree, allow_unbound);
        }

        match tree.call_name().and_then(binding) {
            Some(Binding::Opaque) => Ok(Rc::clone(tree)),
            Some(Binding::FirstOnly) => {
                let mut args = tree.args.clone();
                args[0] = self.substitute(&tree.args[0], allow_unbound)?;
                Ok(rebuild(tree, args))
            },
            Some(Binding::Map) if tree.args.len() == 3 => {
                let mut inner = self.child();
                for name in bound_names(&tree.args[1]) {
                    inner.delete(ScopeKind::Variables, &name);
                }
                let body = inner.substitute(&tree.args[0], true)?;
                let collection = self.substitute(&tree.args[2], allow_unbound)?;
                Ok(rebuild(tree, vec![body, Rc::clone(&tree.args[1]), collection]))
            },
            Some(Binding::Let) => self.substitute_let(tree, allow_unbound),
            _ => {
                let args = tree.args
                               .iter()
                               .map(|arg| self.substitute(arg, allow_unbound))
                               .collect::<EvalResult<Vec<_>>>()?;
                Ok(rebuild(tree, args))
            },
        }
    }

    fn substitute_leaf(&self, tree: &Rc<Tree>, allow_unbound: bool) -> EvalResult<Rc<Tree>> {
        let TokenKind::Name(name) = &tree.tok.kind else {
            return Ok(Rc::clone(tree));
        };
        match self.get_variable(&name.name) {
            Some(value) => Ok(Rc::new(Tree::literal(value, tree.tok.pos))),
            None if allow_unbound => Ok(Rc::clone(tree)),
            None => Err(RuntimeError::UnboundVariable { name: name.name.clone(),
                                                        pos:  tree.tok.pos, }),
        }
    }

    /// Substitutes into `let`: each value sees the outer scope with the
    /// names bound before it hidden, and the body sees all of them hidden.
    /// The hidden names never count as unbound.
    fn substitute_let(&self, tree: &Rc<Tree>, allow_unbound: bool) -> EvalResult<Rc<Tree>> {
        let Some((body, bindings)) = tree.args.split_last() else {
            return Ok(Rc::clone(tree));
        };
        let mut inner = self.child();
        let mut args = Vec::with_capacity(tree.args.len());

        if let [dict] = bindings {
            args.push(self.substitute(dict, allow_unbound)?);
            for name in let_names(&tree.args) {
                inner.delete(ScopeKind::Variables, &name);
            }
        } else {
            let mut hidden = BTreeSet::new();
            for pair in bindings.chunks(2) {
                args.push(Rc::clone(&pair[0]));
                if let Some(value) = pair.get(1) {
                    let value = if allow_unbound || hidden.is_empty() {
                        inner.substitute(value, allow_unbound)?
                    } else {
                        let value = inner.substitute(value, true)?;
                        require_bound(&value, &hidden)?;
                        value
                    };
                    args.push(value);
                }
                if let Some(name) = pair[0].as_name() {
                    inner.delete(ScopeKind::Variables, &name.name);
                    hidden.insert(name.key());
                }
            }
        }

        args.push(inner.substitute(body, true)?);
        Ok(rebuild(tree, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{evaluator::core::EvalOptions, library::core::builtin_scope, parser::core::compile};

    fn tree(source: &str) -> Rc<Tree> {
        compile(source).unwrap().unwrap()
    }

    #[test]
    fn substitution_is_idempotent() {
        let mut scope = Scope::new();
        scope.set_variable("x", 1.0.into());
        scope.set_variable("y", 2.0.into());

        let once = scope.substitute(&tree("x * (y + 1) - f(x)"), false).unwrap();
        let twice = scope.substitute(&once, false).unwrap();
        assert!(Rc::ptr_eq(&once, &twice));
    }

    #[test]
    fn map_hides_its_bound_name() {
        let mut scope = Scope::new();
        scope.set_variable("x", 10.0.into());
        scope.set_variable("xs", Value::from(vec![1.0.into()]));

        let t = scope.substitute(&tree("map(x + 1, x, xs)"), true).unwrap();
        assert_eq!(t.to_string(), "map(x + 1, x, [1])");
    }

    #[test]
    fn let_binds_sequentially() {
        let mut scope = Scope::new();
        scope.set_variable("a", 10.0.into());
        scope.set_variable("b", 20.0.into());

        let t = scope.substitute(&tree("let(a, b, b, a, a + b)"), true).unwrap();
        assert_eq!(t.to_string(), "let(a, 20, b, a, a + b)");
    }

    #[test]
    fn strict_let_values_see_earlier_names() {
        let scope = builtin_scope();
        let strict = EvalOptions { substitute:    true,
                                   allow_unbound: false, };

        let t = scope.substitute(&tree("let(a, 1, b, a + 1, b)"), false).unwrap();
        assert_eq!(t.to_string(), "let(a, 1, b, a + 1, b)");
        assert_eq!(scope.evaluate_with(&tree("let(a, 1, b, a + 1, b)"), strict).unwrap(), 2.0.into());

        let err = scope.substitute(&tree("let(a, 1, b, a + c, b)"), false).unwrap_err();
        assert_eq!(err, RuntimeError::UnboundVariable { name: "c".to_string(),
                                                        pos:  17, });
    }

    #[test]
    fn isa_and_safe_overrides() {
        let mut scope = Scope::new();
        scope.set_variable("x", 1.0.into());
        assert_eq!(scope.substitute(&tree("isa(x, x)"), true).unwrap().to_string(), "isa(1, x)");
        assert_eq!(scope.substitute(&tree("safe(x)"), true).unwrap().to_string(), "safe(x)");
    }
}
