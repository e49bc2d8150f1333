use std::collections::HashSet;

use crate::{
    ast::Tree,
    interpreter::scope::{
        core::Scope,
        descriptor::{FunctionBody, FunctionDescriptor, Randomness},
    },
};

impl Scope<'_> {
    /// Returns `true` if evaluating `tree` may call a random function.
    ///
    /// # Example
    /// ```
    /// use algebrist::{compile, interpreter::library::core::builtin_scope};
    ///
    /// let scope = builtin_scope();
    /// assert!(scope.is_random(&compile("1 + random(1..6)").unwrap().unwrap()));
    /// assert!(!scope.is_random(&compile("1 + x").unwrap().unwrap()));
    /// ```
    #[must_use]
    pub fn is_random(&self, tree: &Tree) -> bool {
        self.tree_reaches_random(tree, &mut HashSet::new())
    }

    /// Returns `true` if calling `descriptor` may give different results for
    /// the same arguments.
    ///
    /// Functions defined by an expression are random if a random function
    /// can be reached from their body. Each search visits a function at most
    /// once, so recursive definitions terminate. Only answers which do not
    /// depend on an unfinished part of the search are memoised: every
    /// `true`, and the `false` of the function the search started from.
    #[must_use]
    pub fn is_random_function(&self, descriptor: &FunctionDescriptor) -> bool {
        self.function_reaches_random(descriptor, &mut HashSet::new())
    }

    fn tree_reaches_random(&self, tree: &Tree, visited: &mut HashSet<usize>) -> bool {
        if let Some(name) = tree.call_name()
           && self.get_function(name).iter().any(|d| self.function_reaches_random(d, visited))
        {
            return true;
        }
        tree.args.iter().any(|arg| self.tree_reaches_random(arg, visited))
    }

    fn function_reaches_random(&self, descriptor: &FunctionDescriptor, visited: &mut HashSet<usize>) -> bool {
        match descriptor.randomness {
            Randomness::Random => true,
            Randomness::Deterministic => false,
            Randomness::Inferred => {
                if let Some(&known) = self.randomness.borrow().get(&descriptor.id) {
                    return known;
                }
                let root = visited.is_empty();
                if !visited.insert(descriptor.id) {
                    return false;
                }
                let random = match &descriptor.body {
                    FunctionBody::Expression { body, .. } => self.tree_reaches_random(body, visited),
                    FunctionBody::Native(_) | FunctionBody::Lazy(_) => false,
                };
                if random || root {
                    self.randomness.borrow_mut().insert(descriptor.id, random);
                }
                random
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::library::core::builtin_scope;

    #[test]
    fn recursive_functions_terminate() {
        let mut scope = builtin_scope();
        scope.define_function("fib", &["n"], "if(n < 2, n, fib(n - 1) + fib(n - 2))").unwrap();
        scope.define_function("roll", &["n"], "if(n = 0, random(1..6), roll(n - 1))").unwrap();

        let fib = scope.get_function("fib");
        let roll = scope.get_function("roll");
        assert!(!scope.is_random_function(&fib[0]));
        assert!(scope.is_random_function(&roll[0]));
    }

    #[test]
    fn every_function_in_a_cycle_sees_the_random_call() {
        let mut scope = builtin_scope();
        scope.define_function("ping", &["n"], "pong(n) + random(2)").unwrap();
        scope.define_function("pong", &["n"], "ping(n)").unwrap();

        let ping = scope.get_function("ping");
        let pong = scope.get_function("pong");
        assert!(scope.is_random_function(&ping[0]));
        assert!(scope.is_random_function(&pong[0]));
    }

    #[test]
    fn deterministic_cycles_are_remembered_as_deterministic() {
        let mut scope = builtin_scope();
        scope.define_function("even", &["n"], "if(n = 0, true, odd(n - 1))").unwrap();
        scope.define_function("odd", &["n"], "if(n = 0, false, even(n - 1))").unwrap();

        let even = scope.get_function("even");
        let odd = scope.get_function("odd");
        assert!(!scope.is_random_function(&even[0]));
        assert!(!scope.is_random_function(&odd[0]));
        assert_eq!(scope.randomness.borrow().get(&even[0].id), Some(&false));
    }

    #[test]
    fn random_call_in_the_second_function_of_a_cycle() {
        let mut scope = builtin_scope();
        scope.define_function("ping", &["n"], "if(n = 0, 0, pong(n - 1))").unwrap();
        scope.define_function("pong", &["n"], "if(n = 0, random(2), ping(n - 1))").unwrap();

        let ping = scope.get_function("ping");
        assert!(scope.is_random_function(&ping[0]));
    }
}
