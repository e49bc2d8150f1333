use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        scope::{core::Scope, descriptor::FunctionDescriptor},
        value::{
            core::{Kind, Value},
            number::Number,
        },
    },
};

/// A binary operator over two numbers. Complex results with no imaginary
/// part are narrowed back to reals.
fn number_op(name: &str, op: fn(Number, Number) -> Number) -> FunctionDescriptor {
    FunctionDescriptor::native(name, &[Kind::Number, Kind::Number], move |args, _, pos| {
        Ok(Value::Number(op(args[0].as_number(pos)?, args[1].as_number(pos)?).simplified()))
    }).returns(Kind::Number)
}

/// Extracts the components of a vector argument.
fn components(value: &Value, pos: usize) -> EvalResult<&[f64]> {
    match value {
        Value::Vector(v) => Ok(v),
        other => Err(RuntimeError::TypeError { details: format!("expected a vector, found {}",
                                                                other.type_name()),
                                               pos }),
    }
}

/// An element-wise operator over two vectors of the same length.
fn vector_op(name: &str, op: fn(f64, f64) -> f64) -> FunctionDescriptor {
    FunctionDescriptor::native(name, &[Kind::Vector, Kind::Vector], move |args, _, pos| {
        let a = components(&args[0], pos)?;
        let b = components(&args[1], pos)?;
        if a.len() != b.len() {
            return Err(RuntimeError::InvalidArgument { details: format!("vectors of length {} and {} can not be combined",
                                                                        a.len(),
                                                                        b.len()),
                                                       pos });
        }
        Ok(Value::Vector(Rc::new(a.iter().zip(b).map(|(x, y)| op(*x, *y)).collect())))
    }).returns(Kind::Vector)
}

/// Multiplies every component of `v` by `k`.
fn scale(v: &[f64], k: f64) -> Value {
    Value::Vector(Rc::new(v.iter().map(|x| x * k).collect()))
}

/// Concatenates the displayed forms of the arguments.
fn concat_strings(args: &[Value], _: &Scope<'_>, _: usize) -> EvalResult<Value> {
    Ok(Value::safe_string(args.iter().map(ToString::to_string).collect()))
}

/// Joins two lists, or appends a value to a list.
fn concat_lists(args: &[Value], _: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    let mut items = args[0].to_items(pos)?;
    match &args[1] {
        Value::List(more) => items.extend(more.iter().cloned()),
        other => items.push(other.clone()),
    }
    Ok(Value::from(items))
}

/// Registers `+`, `-`, `*`, `/`, `^` and the unary signs.
pub fn register(scope: &mut Scope<'_>) {
    scope.add_function(number_op("+", |a, b| a + b));
    scope.add_function(vector_op("+", |a, b| a + b));
    scope.add_function(FunctionDescriptor::native("+", &[Kind::List, Kind::Any], concat_lists).returns(Kind::List));
    scope.add_function(FunctionDescriptor::native("+", &[Kind::Any, Kind::Any], concat_strings)
                           .typecheck(|args| args.len() == 2 && args.iter().any(|a| matches!(a, Value::String(_))))
                           .returns(Kind::String));

    scope.add_function(number_op("-", |a, b| a - b));
    scope.add_function(vector_op("-", |a, b| a - b));

    scope.add_function(number_op("*", |a, b| a * b));
    scope.add_function(FunctionDescriptor::native("*", &[Kind::Number, Kind::Vector], |args, _, pos| {
                           Ok(scale(components(&args[1], pos)?, args[0].as_real(pos)?))
                       }).returns(Kind::Vector));
    scope.add_function(FunctionDescriptor::native("*", &[Kind::Vector, Kind::Number], |args, _, pos| {
                           Ok(scale(components(&args[0], pos)?, args[1].as_real(pos)?))
                       }).returns(Kind::Vector));

    scope.add_function(number_op("/", |a, b| a / b));
    scope.add_function(FunctionDescriptor::native("/", &[Kind::Vector, Kind::Number], |args, _, pos| {
                           Ok(scale(components(&args[0], pos)?, 1.0 / args[1].as_real(pos)?))
                       }).returns(Kind::Vector));

    scope.add_function(number_op("^", Number::pow));

    scope.add_function(FunctionDescriptor::native("-u", &[Kind::Number], |args, _, pos| {
                           Ok(Value::Number(-args[0].as_number(pos)?))
                       }).returns(Kind::Number));
    scope.add_function(FunctionDescriptor::native("-u", &[Kind::Vector], |args, _, pos| {
                           Ok(scale(components(&args[0], pos)?, -1.0))
                       }).returns(Kind::Vector));
    scope.add_function(FunctionDescriptor::native("+u", &[Kind::Number], |args, _, _| Ok(args[0].clone()))
                           .returns(Kind::Number));
    scope.add_function(FunctionDescriptor::native("+u", &[Kind::Vector], |args, _, _| Ok(args[0].clone()))
                           .returns(Kind::Vector));
}

#[cfg(test)]
mod tests {
    use crate::{compile, interpreter::library::core::builtin_scope, interpreter::value::core::Value};

    fn eval(source: &str) -> Value {
        builtin_scope().evaluate(&compile(source).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn numbers_and_complex_numbers() {
        assert_eq!(eval("1 + 2 * 3"), 7.0.into());
        assert_eq!(eval("2 ^ 3 ^ 2"), 512.0.into());
        assert_eq!(eval("i * i"), (-1.0).into());
        assert_eq!(eval("sqrt(-4)").to_string(), "2i");
        assert_eq!(eval("(-2) ^ 3"), (-8.0).into());
    }

    #[test]
    fn strings_lists_and_vectors() {
        assert_eq!(eval("\"a\" + 1"), "a1".into());
        assert_eq!(eval("[1] + [2, 3]"), Value::from(vec![1.0.into(), 2.0.into(), 3.0.into()]));
        assert_eq!(eval("2 * vector(1, 2) - vector(1, 1)"), eval("vector(1, 3)"));
    }
}
