use std::{collections::BTreeMap, rc::Rc};

use crate::{
    ast::{TokenKind, Tree},
    error::RuntimeError,
    interpreter::{scope::core::Scope, value::core::Value},
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Controls what happens before a tree is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// Replace bound names with their values before evaluating.
    pub substitute:    bool,
    /// Leave names with no binding in place instead of failing.
    pub allow_unbound: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self { substitute:    true,
               allow_unbound: true, }
    }
}

impl Scope<'_> {
    /// Evaluates a tree in this scope, substituting bound variables first.
    ///
    /// This is the main entry point for evaluation. Names which are still
    /// unbound evaluate to [`Value::Name`], so the failure is deferred to
    /// whichever operation needs a concrete value.
    ///
    /// # Example
    /// ```
    /// use algebrist::{compile, interpreter::library::core::builtin_scope};
    ///
    /// let mut scope = builtin_scope();
    /// scope.set_variable("x", 5.0.into());
    ///
    /// let tree = compile("2x + 1").unwrap().unwrap();
    /// assert_eq!(scope.evaluate(&tree).unwrap(), 11.0.into());
    /// ```
    pub fn evaluate(&self, tree: &Rc<Tree>) -> EvalResult<Value> {
        self.evaluate_with(tree, EvalOptions::default())
    }

    /// Evaluates a tree with explicit options.
    ///
    /// # Errors
    /// `UnboundVariable` if `options.allow_unbound` is off and a name has no
    /// binding, as well as any error raised by a called function.
    pub fn evaluate_with(&self, tree: &Rc<Tree>, options: EvalOptions) -> EvalResult<Value> {
        let tree = if options.substitute {
            self.substitute(tree, options.allow_unbound)?
        } else {
            Rc::clone(tree)
        };
        self.eval_tree(&tree)
    }

    /// Evaluates a tree without substituting first.
    ///
    /// # Parameters
    /// - `tree`: The tree to evaluate.
    ///
    /// # Returns
    /// The value of the tree:
    /// - literals evaluate to themselves, except strings which are not yet
    ///   safe, which are interpolated and marked safe;
    /// - names evaluate to their binding, or to themselves if unbound;
    /// - list and dictionary nodes evaluate their children;
    /// - operators and functions are dispatched.
    pub fn eval_tree(&self, tree: &Rc<Tree>) -> EvalResult<Value> {
        let pos = tree.tok.pos;
        match &tree.tok.kind {
            TokenKind::Literal(Value::String(s)) if !s.safe => {
                self.interpolate(&s.value, pos).map(Value::safe_string)
            },
            TokenKind::Literal(value) => Ok(value.clone()),
            TokenKind::Name(name) => Ok(self.get_variable(&name.name).unwrap_or_else(|| Value::Name(name.clone()))),
            TokenKind::List => {
                let items = tree.args
                                .iter()
                                .map(|arg| self.eval_tree(arg))
                                .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::from(items))
            },
            TokenKind::Dict | TokenKind::KeyPair(_) => self.eval_dict(tree),
            TokenKind::Op(_) | TokenKind::Function(_) => self.eval_call(tree),
            TokenKind::Punctuation(p) => Err(RuntimeError::TypeError { details: format!("unexpected '{p}'"),
                                                                       pos }),
        }
    }

    /// Evaluates a dictionary node, or a lone key-pair as a dictionary with
    /// one entry.
    fn eval_dict(&self, tree: &Rc<Tree>) -> EvalResult<Value> {
        let pairs = if matches!(tree.tok.kind, TokenKind::KeyPair(_)) {
            std::slice::from_ref(tree)
        } else {
            tree.args.as_slice()
        };

        let mut entries = BTreeMap::new();
        for pair in pairs {
            if let TokenKind::KeyPair(key) = &pair.tok.kind
               && let Some(value) = pair.args.first()
            {
                entries.insert(key.clone(), self.eval_tree(value)?);
            }
        }
        Ok(Value::Dict(Rc::new(entries)))
    }
}
