use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

use rand::{RngCore, SeedableRng, rngs::StdRng};

use crate::{
    ast::Tree,
    error::Error,
    interpreter::{
        parser::core::compile,
        scope::descriptor::FunctionDescriptor,
        value::core::{Kind, Value},
    },
};

/// Source of registration ids. Shared by every scope so that ids keep
/// increasing across frames.
static NEXT_FUNCTION_ID: AtomicUsize = AtomicUsize::new(1);

/// A rewriting rule, kept for use by a simplifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// The pattern to match.
    pub pattern: Rc<Tree>,
    /// The replacement.
    pub result:  Rc<Tree>,
}

/// An ordered list of rules.
pub type Ruleset = Vec<Rule>;

/// The three namespaces of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Variable bindings.
    Variables,
    /// Function overloads.
    Functions,
    /// Named rulesets.
    Rulesets,
}

/// Bindings used to populate a new child scope.
#[derive(Debug, Default)]
pub struct ScopeExtras {
    /// Variables, by name.
    pub variables: HashMap<String, Value>,
    /// Functions to register, in order.
    pub functions: Vec<FunctionDescriptor>,
    /// Rulesets, by name.
    pub rulesets:  HashMap<String, Ruleset>,
}

/// A frame of the evaluation environment.
///
/// A scope holds variables, function overloads and rulesets, and optionally
/// borrows a parent. Lookups walk from the child towards the root and stop at
/// the first frame where the name is bound or deleted; deleting a name in a
/// child hides the parent's binding without touching the parent.
///
/// All names are stored lower-cased, so lookups are case-insensitive.
///
/// # Example
/// ```
/// use algebrist::interpreter::scope::core::{Scope, ScopeKind};
///
/// let mut parent = Scope::new();
/// parent.set_variable("x", 1.0.into());
///
/// let mut child = parent.child();
/// child.set_variable("X", 2.0.into());
/// assert_eq!(child.get_variable("x"), Some(2.0.into()));
///
/// child.delete(ScopeKind::Variables, "x");
/// assert_eq!(child.get_variable("x"), None);
/// assert_eq!(parent.get_variable("x"), Some(1.0.into()));
/// ```
#[derive(Debug, Default)]
pub struct Scope<'p> {
    parent:            Option<&'p Scope<'p>>,
    variables:         HashMap<String, Value>,
    functions:         HashMap<String, Vec<Rc<FunctionDescriptor>>>,
    rulesets:          HashMap<String, Ruleset>,
    deleted_variables: HashSet<String>,
    deleted_functions: HashSet<String>,
    deleted_rulesets:  HashSet<String>,
    function_cache:    RefCell<HashMap<String, Vec<Rc<FunctionDescriptor>>>>,
    pub(super) randomness: RefCell<HashMap<usize, bool>>,
    rng:               Option<RefCell<StdRng>>,
}

impl<'p> Scope<'p> {
    /// Creates an empty root scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty scope whose parent is `self`.
    #[must_use]
    pub fn child(&self) -> Scope<'_> {
        Scope { parent: Some(self),
                ..Scope::default() }
    }

    /// Creates a child scope with the given variables bound.
    #[must_use]
    pub fn with_variables<I, S>(&self, variables: I) -> Scope<'_>
        where I: IntoIterator<Item = (S, Value)>,
              S: AsRef<str>
    {
        let mut scope = self.child();
        for (name, value) in variables {
            scope.set_variable(name.as_ref(), value);
        }
        scope
    }

    /// Creates a child scope populated from `extras`.
    #[must_use]
    pub fn with_extras(&self, extras: ScopeExtras) -> Scope<'_> {
        let mut scope = self.with_variables(extras.variables);
        for descriptor in extras.functions {
            scope.add_function(descriptor);
        }
        for (name, rules) in extras.rulesets {
            scope.set_ruleset(&name, rules);
        }
        scope
    }

    /// The parent scope, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<&'p Scope<'p>> {
        self.parent
    }

    /// Iterates over this scope and its ancestors, innermost first.
    fn frames(&self) -> impl Iterator<Item = &Scope<'_>> {
        std::iter::successors(Some(self), |scope| scope.parent)
    }

    /// Makes `random` and friends draw from a generator seeded with `seed`,
    /// in this scope and every child of it.
    pub fn seed_random(&mut self, seed: u64) {
        self.rng = Some(RefCell::new(StdRng::seed_from_u64(seed)));
    }

    /// Runs `f` with the generator of the nearest seeded frame, or with the
    /// thread generator when no frame is seeded.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        match self.frames().find_map(|frame| frame.rng.as_ref()) {
            Some(rng) => f(&mut *rng.borrow_mut()),
            None => f(&mut rand::thread_rng()),
        }
    }

    /// Looks up a variable.
    #[must_use]
    pub fn get_variable(&self, name: &str) -> Option<Value> {
        let key = name.to_lowercase();
        for frame in self.frames() {
            if frame.deleted_variables.contains(&key) {
                return None;
            }
            if let Some(value) = frame.variables.get(&key) {
                return Some(value.clone());
            }
        }
        None
    }

    /// Binds a variable in this frame.
    pub fn set_variable(&mut self, name: &str, value: Value) {
        let key = name.to_lowercase();
        self.deleted_variables.remove(&key);
        self.variables.insert(key, value);
    }

    /// Registers an overload of a function in this frame and assigns its
    /// registration id.
    pub fn add_function(&mut self, mut descriptor: FunctionDescriptor) -> Rc<FunctionDescriptor> {
        descriptor.id = NEXT_FUNCTION_ID.fetch_add(1, Ordering::Relaxed);
        let key = descriptor.name.to_lowercase();
        let descriptor = Rc::new(descriptor);

        self.deleted_functions.remove(&key);
        self.functions.entry(key).or_default().push(Rc::clone(&descriptor));
        self.function_cache.get_mut().clear();
        self.randomness.get_mut().clear();
        descriptor
    }

    /// All overloads of `name` visible from this scope, in registration
    /// order.
    ///
    /// Frames are merged from the innermost outwards until a frame where the
    /// name was deleted. The result is cached in this frame.
    #[must_use]
    pub fn get_function(&self, name: &str) -> Vec<Rc<FunctionDescriptor>> {
        let key = name.to_lowercase();
        if let Some(cached) = self.function_cache.borrow().get(&key) {
            return cached.clone();
        }

        let mut found = Vec::new();
        for frame in self.frames() {
            if frame.deleted_functions.contains(&key) {
                break;
            }
            if let Some(descriptors) = frame.functions.get(&key) {
                found.extend(descriptors.iter().cloned());
            }
        }
        found.sort_by_key(|d| d.id);

        self.function_cache.borrow_mut().insert(key, found.clone());
        found
    }

    /// Looks up a ruleset.
    #[must_use]
    pub fn get_ruleset(&self, name: &str) -> Option<Ruleset> {
        let key = name.to_lowercase();
        for frame in self.frames() {
            if frame.deleted_rulesets.contains(&key) {
                return None;
            }
            if let Some(rules) = frame.rulesets.get(&key) {
                return Some(rules.clone());
            }
        }
        None
    }

    /// Stores a ruleset in this frame.
    pub fn set_ruleset(&mut self, name: &str, rules: Ruleset) {
        let key = name.to_lowercase();
        self.deleted_rulesets.remove(&key);
        self.rulesets.insert(key, rules);
    }

    /// Deletes a name from one namespace of this frame, hiding any binding
    /// of the same name in the ancestors.
    pub fn delete(&mut self, kind: ScopeKind, name: &str) {
        let key = name.to_lowercase();
        match kind {
            ScopeKind::Variables => {
                self.variables.remove(&key);
                self.deleted_variables.insert(key);
            },
            ScopeKind::Functions => {
                self.functions.remove(&key);
                self.deleted_functions.insert(key);
                self.function_cache.get_mut().clear();
                self.randomness.get_mut().clear();
            },
            ScopeKind::Rulesets => {
                self.rulesets.remove(&key);
                self.deleted_rulesets.insert(key);
            },
        }
    }

    /// Defines a function from the source of its body.
    ///
    /// Every parameter accepts any kind of value.
    ///
    /// # Errors
    /// Returns the compile error if `body` does not parse.
    ///
    /// # Example
    /// ```
    /// use algebrist::{compile, interpreter::library::core::builtin_scope};
    ///
    /// let mut scope = builtin_scope();
    /// scope.define_function("sq", &["x"], "x * x").unwrap();
    /// let tree = compile("sq(3)").unwrap().unwrap();
    /// assert_eq!(scope.evaluate(&tree).unwrap(), 9.0.into());
    /// ```
    pub fn define_function(&mut self, name: &str, params: &[&str], body: &str) -> Result<(), Error> {
        let Some(tree) = compile(body)? else {
            return Err(Error::Parse(crate::error::ParseError::EmptyInput));
        };
        let params: Vec<(&str, Kind)> = params.iter().map(|&p| (p, Kind::Any)).collect();
        self.add_function(FunctionDescriptor::expression(name, &params, tree));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(name: &str, value: f64) -> FunctionDescriptor {
        FunctionDescriptor::native(name, &[], move |_, _, _| Ok(value.into()))
    }

    #[test]
    fn child_bindings_shadow_parent() {
        let mut root = Scope::new();
        root.set_variable("x", 1.0.into());
        let child = root.with_variables([("x", Value::from(2.0))]);
        assert_eq!(child.get_variable("x"), Some(2.0.into()));
        assert_eq!(root.get_variable("x"), Some(1.0.into()));
    }

    #[test]
    fn extras_populate_a_child() {
        let root = Scope::new();
        let extras = ScopeExtras { variables: HashMap::from([("n".to_string(), Value::from(4.0))]),
                                   functions: vec![constant("k", 1.0)],
                                   rulesets:  HashMap::new(), };
        let child = root.with_extras(extras);
        assert_eq!(child.get_variable("N"), Some(4.0.into()));
        assert_eq!(child.get_function("k").len(), 1);
        assert!(root.get_function("k").is_empty());
    }

    #[test]
    fn function_lists_merge_in_registration_order() {
        let mut root = Scope::new();
        let first = root.add_function(constant("f", 1.0));
        let mut child = root.child();
        let second = child.add_function(constant("F", 2.0));

        let found = child.get_function("f");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, first.id);
        assert_eq!(found[1].id, second.id);
        assert!(first.id < second.id);
    }

    #[test]
    fn cache_is_cleared_when_functions_change() {
        let mut scope = Scope::new();
        scope.add_function(constant("f", 1.0));
        assert_eq!(scope.get_function("f").len(), 1);
        scope.add_function(constant("f", 2.0));
        assert_eq!(scope.get_function("f").len(), 2);
        scope.delete(ScopeKind::Functions, "f");
        assert!(scope.get_function("f").is_empty());
    }

    #[test]
    fn deleting_a_function_hides_ancestors() {
        let mut root = Scope::new();
        root.add_function(constant("f", 1.0));
        let mut child = root.child();
        child.delete(ScopeKind::Functions, "f");
        assert!(child.get_function("f").is_empty());
        assert_eq!(root.get_function("f").len(), 1);

        let mut grandchild = child.child();
        grandchild.add_function(constant("f", 3.0));
        assert_eq!(grandchild.get_function("f").len(), 1);
    }

    #[test]
    fn seeded_scopes_repeat_their_draws() {
        use rand::Rng;

        let draws = |seed| {
            let mut root = Scope::new();
            root.seed_random(seed);
            let child = root.child();
            (0..5).map(|_| child.with_rng(|rng| rng.gen_range(0..1000))).collect::<Vec<u32>>()
        };
        assert_eq!(draws(7), draws(7));
        assert_ne!(draws(7), draws(8));
    }

    #[test]
    fn rulesets_resolve_through_parents() {
        let mut root = Scope::new();
        let rule = Rule { pattern: compile("x + 0").unwrap().unwrap(),
                          result:  compile("x").unwrap().unwrap(), };
        root.set_ruleset("Tidy", vec![rule]);
        let mut child = root.child();
        assert_eq!(child.get_ruleset("tidy").map(|r| r.len()), Some(1));
        child.delete(ScopeKind::Rulesets, "tidy");
        assert!(child.get_ruleset("tidy").is_none());
    }
}
