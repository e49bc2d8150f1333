use std::{collections::BTreeMap, fmt, rc::Rc};

use crate::{
    ast::{FunctionToken, NameToken, OpToken, Tree},
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        text::quote,
        value::{matrix::Matrix, number::Number, range::Range},
    },
    util::num::f64_to_i64_checked,
};

/// A runtime value.
///
/// Every value carries exactly one tag. Operations reject mismatched tags
/// except for the widening of reals to complex numbers, which [`Number`]
/// handles internally.
#[derive(Debug, Clone)]
pub enum Value {
    /// A real or complex number.
    Number(Number),
    /// A string, possibly marked safe from interpolation.
    String(StringValue),
    /// `true` or `false`.
    Boolean(bool),
    /// An ordered list of values.
    List(Rc<Vec<Self>>),
    /// A string-keyed dictionary.
    Dict(Rc<BTreeMap<String, Self>>),
    /// A collection without duplicates, compared without regard to order.
    Set(Rc<Vec<Self>>),
    /// A column vector.
    Vector(Rc<Vec<f64>>),
    /// A matrix with consistent row lengths.
    Matrix(Rc<Matrix>),
    /// An arithmetic range.
    Range(Range),
    /// An identifier which had no binding when it was evaluated.
    Name(NameToken),
    /// A function referenced by name.
    Function(FunctionToken),
    /// An operator referenced by name.
    Operator(OpToken),
    /// An unevaluated expression.
    Expression(Rc<Tree>),
    /// Rendered markup, passed through untouched.
    Html(String),
    /// The unit value.
    Nothing,
}

/// A string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue {
    /// The text.
    pub value: String,
    /// When set, the string is never interpolated again.
    pub safe:  bool,
}

/// The type of a value, as seen by function signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Matches [`Value::Number`].
    Number,
    /// Matches [`Value::String`].
    String,
    /// Matches [`Value::Boolean`].
    Boolean,
    /// Matches [`Value::List`].
    List,
    /// Matches [`Value::Dict`].
    Dict,
    /// Matches [`Value::Set`].
    Set,
    /// Matches [`Value::Vector`].
    Vector,
    /// Matches [`Value::Matrix`].
    Matrix,
    /// Matches [`Value::Range`].
    Range,
    /// Matches [`Value::Name`].
    Name,
    /// Matches [`Value::Function`].
    Function,
    /// Matches [`Value::Operator`].
    Operator,
    /// Matches [`Value::Expression`].
    Expression,
    /// Matches [`Value::Html`].
    Html,
    /// Matches [`Value::Nothing`].
    Nothing,
    /// Matches every value.
    Any,
}

impl Kind {
    /// Returns `true` if `value` has this kind.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        self == Self::Any || self == value.kind()
    }
    /// The lower-case name of the kind, as used by `isa`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Dict => "dict",
            Self::Set => "set",
            Self::Vector => "vector",
            Self::Matrix => "matrix",
            Self::Range => "range",
            Self::Name => "name",
            Self::Function => "function",
            Self::Operator => "op",
            Self::Expression => "expression",
            Self::Html => "html",
            Self::Nothing => "nothing",
            Self::Any => "?",
        }
    }
    /// Looks up a kind by its name; `complex` and `real` are accepted as
    /// synonyms of `number`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.to_lowercase().as_str() {
            "number" | "complex" | "real" => Self::Number,
            "string" => Self::String,
            "boolean" => Self::Boolean,
            "list" => Self::List,
            "dict" => Self::Dict,
            "set" => Self::Set,
            "vector" => Self::Vector,
            "matrix" => Self::Matrix,
            "range" => Self::Range,
            "name" => Self::Name,
            "function" => Self::Function,
            "op" => Self::Operator,
            "expression" => Self::Expression,
            "html" => Self::Html,
            "nothing" => Self::Nothing,
            "?" => Self::Any,
            _ => return None,
        };
        Some(kind)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(Number::Real(v))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(StringValue { value: v.to_string(),
                                   safe:  false, })
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(Rc::new(v))
    }
}

impl Value {
    /// Creates a string value that will not be interpolated.
    #[must_use]
    pub fn safe_string(value: String) -> Self {
        Self::String(StringValue { value, safe: true })
    }

    /// Creates a set, dropping duplicate elements but keeping the first
    /// occurrence of each.
    ///
    /// # Example
    /// ```
    /// use algebrist::interpreter::value::core::Value;
    ///
    /// let set = Value::set(vec![1.0.into(), 2.0.into(), 1.0.into()]);
    /// let Value::Set(items) = set else { unreachable!() };
    /// assert_eq!(items.len(), 2);
    /// ```
    #[must_use]
    pub fn set(items: Vec<Self>) -> Self {
        let mut distinct: Vec<Self> = Vec::with_capacity(items.len());
        for item in items {
            if !distinct.contains(&item) {
                distinct.push(item);
            }
        }
        Self::Set(Rc::new(distinct))
    }

    /// The tag of the value.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Number(_) => Kind::Number,
            Self::String(_) => Kind::String,
            Self::Boolean(_) => Kind::Boolean,
            Self::List(_) => Kind::List,
            Self::Dict(_) => Kind::Dict,
            Self::Set(_) => Kind::Set,
            Self::Vector(_) => Kind::Vector,
            Self::Matrix(_) => Kind::Matrix,
            Self::Range(_) => Kind::Range,
            Self::Name(_) => Kind::Name,
            Self::Function(_) => Kind::Function,
            Self::Operator(_) => Kind::Operator,
            Self::Expression(_) => Kind::Expression,
            Self::Html(_) => Kind::Html,
            Self::Nothing => Kind::Nothing,
        }
    }

    /// The name of the value's tag.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Extracts a number.
    pub fn as_number(&self, pos: usize) -> EvalResult<Number> {
        match self {
            Self::Number(n) => Ok(*n),
            other => Err(RuntimeError::TypeError { details: format!("expected a number, found {}",
                                                                    other.type_name()),
                                                   pos }),
        }
    }

    /// Extracts a real number, rejecting complex numbers with a non-zero
    /// imaginary part.
    pub fn as_real(&self, pos: usize) -> EvalResult<f64> {
        match self.as_number(pos)?.simplified() {
            Number::Real(r) => Ok(r),
            Number::Complex(c) => Err(RuntimeError::TypeError { details: format!("expected a real number, found {c}"),
                                                                pos }),
        }
    }

    /// Extracts an integer, rejecting fractional values.
    pub fn as_integer(&self, pos: usize) -> EvalResult<i64> {
        f64_to_i64_checked(self.as_real(pos)?, pos)
    }

    /// Extracts a boolean.
    pub fn as_bool(&self, pos: usize) -> EvalResult<bool> {
        match self {
            Self::Boolean(b) => Ok(*b),
            other => Err(RuntimeError::TypeError { details: format!("expected a boolean, found {}",
                                                                    other.type_name()),
                                                   pos }),
        }
    }

    /// Extracts the text of a string.
    pub fn as_str(&self, pos: usize) -> EvalResult<&str> {
        match self {
            Self::String(s) => Ok(&s.value),
            other => Err(RuntimeError::TypeError { details: format!("expected a string, found {}",
                                                                    other.type_name()),
                                                   pos }),
        }
    }

    /// Returns the elements of a list, set, or discrete range.
    pub fn to_items(&self, pos: usize) -> EvalResult<Vec<Self>> {
        match self {
            Self::List(items) | Self::Set(items) => Ok(items.as_ref().clone()),
            Self::Range(r) => Ok(r.values(pos)?.into_iter().map(Self::from).collect()),
            Self::Vector(v) => Ok(v.iter().copied().map(Self::from).collect()),
            other => Err(RuntimeError::TypeError { details: format!("expected a collection, found {}",
                                                                    other.type_name()),
                                                   pos }),
        }
    }

    /// Surface syntax which parses back to this value.
    #[must_use]
    pub fn to_source(&self) -> String {
        match self {
            Self::String(s) => quote(&s.value),
            Self::List(items) => format!("[{}]", join_source(items)),
            Self::Set(items) => format!("set({})", join_source(items)),
            Self::Dict(entries) => {
                let pairs: Vec<String> =
                    entries.iter()
                           .map(|(key, value)| format!("{}: {}", quote(key), value.to_source()))
                           .collect();
                format!("[{}]", pairs.join(", "))
            },
            Self::Vector(v) => {
                let parts: Vec<String> = v.iter().map(ToString::to_string).collect();
                format!("vector({})", parts.join(", "))
            },
            Self::Expression(tree) => format!("expression({})", quote(&tree.to_string())),
            Self::Html(html) => format!("html({})", quote(html)),
            other => other.to_string(),
        }
    }
}

fn join_source(items: &[Value]) -> String {
    items.iter().map(Value::to_source).collect::<Vec<_>>().join(", ")
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.to_complex() == b.to_complex(),
            (Self::String(a), Self::String(b)) => a.value == b.value,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            },
            (Self::Vector(a), Self::Vector(b)) => a == b,
            (Self::Matrix(a), Self::Matrix(b)) => a == b,
            (Self::Range(a), Self::Range(b)) => a == b,
            (Self::Name(a), Self::Name(b)) => a.key() == b.key(),
            (Self::Function(a), Self::Function(b)) => a == b,
            (Self::Operator(a), Self::Operator(b)) => a == b,
            (Self::Expression(a), Self::Expression(b)) => a == b,
            (Self::Html(a), Self::Html(b)) => a == b,
            (Self::Nothing, Self::Nothing) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{}", s.value),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Matrix(m) => write!(f, "{m}"),
            Self::Range(r) => write!(f, "{r}"),
            Self::Name(n) => write!(f, "{}", n.name),
            Self::Function(func) => write!(f, "{}", func.name),
            Self::Operator(op) => write!(f, "{}", op.name),
            Self::Expression(tree) => write!(f, "{tree}"),
            Self::Html(html) => write!(f, "{html}"),
            Self::Nothing => write!(f, "nothing"),
            Self::List(_) | Self::Set(_) | Self::Dict(_) | Self::Vector(_) => {
                write!(f, "{}", self.to_source())
            },
        }
    }
}
