use std::rc::Rc;

use tracing::trace;

use crate::{
    ast::Tree,
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        operators::is_lazy,
        scope::{
            core::Scope,
            descriptor::{FunctionBody, FunctionDescriptor},
        },
        value::core::Value,
    },
};

impl Scope<'_> {
    /// Evaluates an operator or function node.
    ///
    /// Lazy operators receive their argument trees untouched; everything
    /// else has its arguments evaluated first and goes through
    /// [`Scope::call_function`].
    pub(crate) fn eval_call(&self, tree: &Rc<Tree>) -> EvalResult<Value> {
        let pos = tree.tok.pos;
        let Some(name) = tree.call_name() else {
            return self.eval_tree(tree);
        };

        if is_lazy(name) {
            let lazy = self.get_function(name).iter().find_map(|d| match &d.body {
                                                         FunctionBody::Lazy(f) => Some(Rc::clone(f)),
                                                         _ => None,
                                                     });
            if let Some(lazy) = lazy {
                trace!(name, "lazy call");
                return lazy(&tree.args, self, pos);
            }
        }

        let args = tree.args
                       .iter()
                       .map(|arg| self.eval_tree(arg))
                       .collect::<EvalResult<Vec<_>>>()?;
        self.call_function(name, &args, pos)
    }

    /// Calls the first overload of `name` which accepts `args`.
    ///
    /// Overloads are tried in registration order, across all frames.
    ///
    /// # Errors
    /// - `UnknownFunction` if no overload of `name` is visible.
    /// - `NoMatchingOverload` if none of them accepts the arguments.
    ///
    /// Both carry a suggestion when `name` looks like a variable multiplied
    /// by a function, as in `xtan(y)`.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::{
    ///     scope::{core::Scope, descriptor::FunctionDescriptor},
    ///     value::core::{Kind, Value},
    /// };
    ///
    /// let mut scope = Scope::new();
    /// scope.add_function(FunctionDescriptor::native("f", &[Kind::Number], |_, _, _| Ok("number".into())));
    /// scope.add_function(FunctionDescriptor::native("f", &[Kind::String], |_, _, _| Ok("string".into())));
    ///
    /// assert_eq!(scope.call_function("f", &[1.0.into()], 0).unwrap(), "number".into());
    /// assert_eq!(scope.call_function("f", &["a".into()], 0).unwrap(), "string".into());
    /// assert!(scope.call_function("f", &[true.into()], 0).is_err());
    /// ```
    pub fn call_function(&self, name: &str, args: &[Value], pos: usize) -> EvalResult<Value> {
        let descriptors = self.get_function(name);
        if descriptors.is_empty() {
            return Err(RuntimeError::UnknownFunction { name: name.to_string(),
                                                       pos,
                                                       suggestion: self.suggest(name, args) });
        }

        match descriptors.iter().find(|d| d.accepts(args)) {
            Some(descriptor) => {
                trace!(name, id = descriptor.id, "dispatch");
                self.call_descriptor(descriptor, args, pos)
            },
            None => Err(RuntimeError::NoMatchingOverload { name: name.to_string(),
                                                           arguments: args.iter()
                                                                          .map(|a| a.type_name().to_string())
                                                                          .collect(),
                                                           pos,
                                                           suggestion: self.suggest(name, args) }),
        }
    }

    /// Runs one overload with already evaluated arguments.
    pub fn call_descriptor(&self, descriptor: &FunctionDescriptor, args: &[Value], pos: usize) -> EvalResult<Value> {
        match &descriptor.body {
            FunctionBody::Native(f) => f(args, self, pos),
            FunctionBody::Lazy(_) => {
                Err(RuntimeError::TypeError { details: format!("{} takes unevaluated arguments", descriptor.name),
                                              pos })
            },
            FunctionBody::Expression { params, body } => {
                let scope = self.with_variables(params.iter().zip(args.iter().cloned()));
                scope.evaluate(body)
            },
        }
    }

    /// Suggests reading `xtan` as `x*tan` when `tan` would accept the
    /// arguments.
    fn suggest(&self, name: &str, args: &[Value]) -> Option<String> {
        let mut chars = name.chars();
        let first = chars.next()?;
        let rest = chars.as_str();
        if !first.is_alphabetic() || rest.is_empty() {
            return None;
        }
        self.get_function(rest)
            .iter()
            .any(|d| d.accepts(args))
            .then(|| format!("{first}*{rest}"))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::RuntimeError,
        interpreter::{library::core::builtin_scope, scope::descriptor::FunctionBody},
    };

    #[test]
    fn lazy_overloads_refuse_evaluated_arguments() {
        let scope = builtin_scope();
        let lazy = scope.get_function("if")
                        .into_iter()
                        .find(|d| matches!(d.body, FunctionBody::Lazy(_)))
                        .unwrap();
        let result = scope.call_descriptor(&lazy, &[true.into(), 1.0.into(), 2.0.into()], 4);
        assert!(matches!(result, Err(RuntimeError::TypeError { pos: 4, .. })));
    }
}
