use std::{fmt, rc::Rc};

use crate::{
    ast::Tree,
    interpreter::{
        evaluator::core::EvalResult,
        scope::core::Scope,
        value::core::{Kind, Value},
    },
};

/// An eagerly evaluated function: receives the argument values, the calling
/// scope and the position of the call.
pub type NativeFn = Rc<dyn Fn(&[Value], &Scope<'_>, usize) -> EvalResult<Value>>;

/// A lazily evaluated function: receives the unevaluated argument trees.
pub type LazyFn = Rc<dyn Fn(&[Rc<Tree>], &Scope<'_>, usize) -> EvalResult<Value>>;

/// A custom predicate deciding whether a descriptor accepts some arguments.
pub type TypeCheck = Rc<dyn Fn(&[Value]) -> bool>;

/// The parameter types of a function.
///
/// # Example
/// ```
/// use algebrist::interpreter::{scope::descriptor::Signature, value::core::{Kind, Value}};
///
/// let sig = Signature::variadic(&[Kind::String], Kind::Number);
/// assert!(sig.accepts(&["a".into()]));
/// assert!(sig.accepts(&["a".into(), 1.0.into(), 2.0.into()]));
/// assert!(!sig.accepts(&[1.0.into()]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    /// Types of the leading, required parameters.
    pub fixed: Vec<Kind>,
    /// Type of any number of trailing parameters.
    pub rest:  Option<Kind>,
}

impl Signature {
    /// A signature with exactly these parameters.
    #[must_use]
    pub fn fixed(kinds: &[Kind]) -> Self {
        Self { fixed: kinds.to_vec(),
               rest:  None, }
    }
    /// A signature with these parameters followed by any number of `rest`.
    #[must_use]
    pub fn variadic(kinds: &[Kind], rest: Kind) -> Self {
        Self { fixed: kinds.to_vec(),
               rest:  Some(rest), }
    }
    /// Returns `true` if the arguments match the signature.
    #[must_use]
    pub fn accepts(&self, args: &[Value]) -> bool {
        if args.len() < self.fixed.len() || (self.rest.is_none() && args.len() != self.fixed.len()) {
            return false;
        }
        let (head, tail) = args.split_at(self.fixed.len());
        self.fixed.iter().zip(head).all(|(kind, arg)| kind.accepts(arg))
        && self.rest.is_none_or(|kind| tail.iter().all(|arg| kind.accepts(arg)))
    }
}

/// How a function computes its result.
#[derive(Clone)]
pub enum FunctionBody {
    /// Native code over evaluated arguments.
    Native(NativeFn),
    /// Native code over unevaluated arguments.
    Lazy(LazyFn),
    /// An expression evaluated with the parameters bound.
    Expression {
        /// Parameter names, lower-cased.
        params: Vec<String>,
        /// The body.
        body:   Rc<Tree>,
    },
}

/// Whether calling a function can give different results for the same
/// arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Randomness {
    /// Always the same result.
    Deterministic,
    /// Draws random numbers.
    Random,
    /// Random if its body calls something random.
    Inferred,
}

/// One overload of a named function.
///
/// Descriptors are built with [`FunctionDescriptor::native`],
/// [`FunctionDescriptor::lazy`] or [`FunctionDescriptor::expression`] and
/// refined with the builder methods. The registration id is assigned when
/// the descriptor is added to a scope.
#[derive(Clone)]
pub struct FunctionDescriptor {
    /// The function name, lower-cased.
    pub name:        String,
    /// Parameter types.
    pub signature:   Signature,
    /// The kind of value the function is expected to return.
    pub return_hint: Kind,
    /// Overrides the signature check when present.
    pub typecheck:   Option<TypeCheck>,
    /// The implementation.
    pub body:        FunctionBody,
    /// Whether the function is random.
    pub randomness:  Randomness,
    /// Registration order, used to break ties between overloads.
    pub id:          usize,
}

impl FunctionDescriptor {
    fn with_body(name: &str, signature: Signature, body: FunctionBody, randomness: Randomness) -> Self {
        Self { name: name.to_lowercase(),
               signature,
               return_hint: Kind::Any,
               typecheck: None,
               body,
               randomness,
               id: 0 }
    }

    /// A native function over evaluated arguments of the given kinds.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::{
    ///     scope::descriptor::FunctionDescriptor,
    ///     value::core::{Kind, Value},
    /// };
    ///
    /// let double = FunctionDescriptor::native("double", &[Kind::Number], |args, _, pos| {
    ///     Ok(Value::from(args[0].as_real(pos)? * 2.0))
    /// });
    /// assert!(double.accepts(&[1.0.into()]));
    /// assert!(!double.accepts(&["a".into()]));
    /// ```
    pub fn native<F>(name: &str, params: &[Kind], f: F) -> Self
        where F: Fn(&[Value], &Scope<'_>, usize) -> EvalResult<Value> + 'static
    {
        Self::with_body(name,
                        Signature::fixed(params),
                        FunctionBody::Native(Rc::new(f)),
                        Randomness::Deterministic)
    }

    /// A native function over any number of arguments of kind `rest`,
    /// after the `params`.
    pub fn variadic<F>(name: &str, params: &[Kind], rest: Kind, f: F) -> Self
        where F: Fn(&[Value], &Scope<'_>, usize) -> EvalResult<Value> + 'static
    {
        Self::with_body(name,
                        Signature::variadic(params, rest),
                        FunctionBody::Native(Rc::new(f)),
                        Randomness::Deterministic)
    }

    /// A function which receives its arguments unevaluated.
    pub fn lazy<F>(name: &str, f: F) -> Self
        where F: Fn(&[Rc<Tree>], &Scope<'_>, usize) -> EvalResult<Value> + 'static
    {
        Self::with_body(name,
                        Signature::variadic(&[], Kind::Any),
                        FunctionBody::Lazy(Rc::new(f)),
                        Randomness::Deterministic)
    }

    /// A function defined by an expression over named parameters.
    #[must_use]
    pub fn expression(name: &str, params: &[(&str, Kind)], body: Rc<Tree>) -> Self {
        let kinds: Vec<Kind> = params.iter().map(|&(_, kind)| kind).collect();
        let params = params.iter().map(|(param, _)| param.to_lowercase()).collect();
        Self::with_body(name,
                        Signature::fixed(&kinds),
                        FunctionBody::Expression { params, body },
                        Randomness::Inferred)
    }

    /// Marks the function as random.
    #[must_use]
    pub const fn random(mut self) -> Self {
        self.randomness = Randomness::Random;
        self
    }

    /// Records the kind of value the function returns.
    #[must_use]
    pub const fn returns(mut self, kind: Kind) -> Self {
        self.return_hint = kind;
        self
    }

    /// Replaces the signature check with a custom predicate.
    #[must_use]
    pub fn typecheck<F>(mut self, check: F) -> Self
        where F: Fn(&[Value]) -> bool + 'static
    {
        self.typecheck = Some(Rc::new(check));
        self
    }

    /// Returns `true` if this overload can be called with `args`.
    ///
    /// Lazy functions never accept evaluated arguments.
    #[must_use]
    pub fn accepts(&self, args: &[Value]) -> bool {
        if matches!(self.body, FunctionBody::Lazy(_)) {
            return false;
        }
        self.typecheck
            .as_ref()
            .map_or_else(|| self.signature.accepts(args), |check| check(args))
    }

    /// Returns `true` for functions which receive unevaluated arguments.
    #[must_use]
    pub const fn is_lazy(&self) -> bool {
        matches!(self.body, FunctionBody::Lazy(_))
    }
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.body {
            FunctionBody::Native(_) => "native".to_string(),
            FunctionBody::Lazy(_) => "lazy".to_string(),
            FunctionBody::Expression { body, .. } => body.to_string(),
        };
        f.debug_struct("FunctionDescriptor")
         .field("name", &self.name)
         .field("signature", &self.signature)
         .field("return_hint", &self.return_hint)
         .field("typecheck", &self.typecheck.is_some())
         .field("body", &body)
         .field("randomness", &self.randomness)
         .field("id", &self.id)
         .finish()
    }
}
