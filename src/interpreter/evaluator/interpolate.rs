use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        parser::core::compile,
        scope::core::Scope,
        text::{Segment, split_interpolation},
    },
};

impl Scope<'_> {
    /// Replaces each `{expression}` in `text` with the displayed value of the
    /// expression, evaluated in this scope.
    ///
    /// `\{` and `\}` become literal braces. Empty braces contribute nothing.
    ///
    /// # Errors
    /// - `EmbeddedSyntax` if an embedded expression does not compile.
    /// - Any error raised while evaluating an embedded expression.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::library::core::builtin_scope;
    ///
    /// let mut scope = builtin_scope();
    /// scope.set_variable("n", 3.0.into());
    /// assert_eq!(scope.interpolate(r"{n} is {n + 1 - 1}, not \{n\}", 0).unwrap(),
    ///            "3 is 3, not {n}");
    /// ```
    pub fn interpolate(&self, text: &str, pos: usize) -> EvalResult<String> {
        let mut out = String::with_capacity(text.len());
        for segment in split_interpolation(text) {
            match segment {
                Segment::Text(t) => out.push_str(&t),
                Segment::Expr(source) => {
                    let tree = compile(&source).map_err(|e| {
                                                    RuntimeError::EmbeddedSyntax { message: e.to_string(),
                                                                                   source,
                                                                                   pos }
                                                })?;
                    if let Some(tree) = tree {
                        out.push_str(&self.evaluate(&tree)?.to_string());
                    }
                },
            }
        }
        Ok(out)
    }
}
