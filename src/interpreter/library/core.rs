use crate::interpreter::{
    library::{arithmetic, collections, control, functions, logic},
    scope::core::Scope,
};

/// Registers the whole core library into `scope`.
///
/// The library only uses the public registration interface, so a host can
/// add, shadow or delete any of its functions afterwards.
pub fn register_core(scope: &mut Scope<'_>) {
    arithmetic::register(scope);
    logic::register(scope);
    control::register(scope);
    collections::register(scope);
    functions::register(scope);
}

/// Creates a root scope with the core library registered.
///
/// # Example
/// ```
/// use algebrist::{compile, interpreter::library::core::builtin_scope};
///
/// let scope = builtin_scope();
/// let tree = compile("1 + 2 * 3").unwrap().unwrap();
/// assert_eq!(scope.evaluate(&tree).unwrap(), 7.0.into());
/// ```
#[must_use]
pub fn builtin_scope() -> Scope<'static> {
    let mut scope = Scope::new();
    register_core(&mut scope);
    scope
}
