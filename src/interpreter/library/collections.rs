use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        scope::{core::Scope, descriptor::FunctionDescriptor},
        value::{
            core::{Kind, Value},
            matrix::Matrix,
            range::Range,
        },
    },
    util::num::{f64_to_i64_checked, resolve_index},
};

/// Reads every element of a collection as a real number.
fn reals(value: &Value, pos: usize) -> EvalResult<Vec<f64>> {
    value.to_items(pos)?.iter().map(|item| item.as_real(pos)).collect()
}

/// The element of `collection` at `index`, counting from the end when
/// negative.
fn index_value(collection: &Value, index: &Value, pos: usize) -> EvalResult<Value> {
    let index = index.as_integer(pos)?;
    match collection {
        Value::String(s) => {
            let chars: Vec<char> = s.value.chars().collect();
            let i = resolve_index(index, chars.len(), pos)?;
            Ok(Value::safe_string(chars[i].to_string()))
        },
        Value::Matrix(m) => {
            let i = resolve_index(index, m.rows(), pos)?;
            Ok(Value::Vector(Rc::new(m.row_slices()[i].clone())))
        },
        other => {
            let items = other.to_items(pos)?;
            let i = resolve_index(index, items.len(), pos)?;
            Ok(items[i].clone())
        },
    }
}

/// `list[a..b]`: the elements from `a` up to but excluding `b`. Negative
/// endpoints count from the end and both are clamped to the list.
fn slice(items: &[Value], range: &Range, pos: usize) -> EvalResult<Value> {
    let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
    let clamp = |endpoint: f64| -> EvalResult<usize> {
        let i = f64_to_i64_checked(endpoint, pos)?;
        let i = if i < 0 { i + len } else { i };
        Ok(usize::try_from(i.clamp(0, len)).unwrap_or(0))
    };
    let start = clamp(range.start)?;
    let end = clamp(range.end)?;
    if start >= end {
        return Ok(Value::from(Vec::new()));
    }
    Ok(Value::from(items[start..end].to_vec()))
}

/// Returns `true` if `collection` contains `item`.
fn contains(item: &Value, collection: &Value, pos: usize) -> EvalResult<bool> {
    match (item, collection) {
        (Value::String(needle), Value::String(haystack)) => Ok(haystack.value.contains(needle.value.as_str())),
        (Value::String(key), Value::Dict(entries)) => Ok(entries.contains_key(&key.value)),
        (Value::Number(_), Value::Range(r)) if r.step == 0.0 => {
            let x = item.as_real(pos)?;
            Ok(r.start.min(r.end) <= x && x <= r.start.max(r.end))
        },
        (_, Value::List(items) | Value::Set(items)) => Ok(items.contains(item)),
        (_, Value::Range(_)) => Ok(collection.to_items(pos)?.contains(item)),
        (_, other) => Err(RuntimeError::TypeError { details: format!("can not look for a value in {}",
                                                                     other.type_name()),
                                                    pos }),
    }
}

/// `xs except ys`: the elements of `xs` which are not in `ys`, or which are
/// not equal to `ys` when it is not a collection.
fn except(args: &[Value], _: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    let excluded = match &args[1] {
        Value::List(_) | Value::Set(_) | Value::Range(_) => args[1].to_items(pos)?,
        single => vec![single.clone()],
    };
    let kept = args[0].to_items(pos)?
                      .into_iter()
                      .filter(|item| !excluded.contains(item))
                      .collect::<Vec<_>>();
    Ok(Value::from(kept))
}

/// Registers indexing, collection constructors, ranges and membership.
#[allow(clippy::too_many_lines)]
pub fn register(scope: &mut Scope<'_>) {
    // Indexing: `xs[i]` is parsed as `listval(xs, i)`.
    for kind in [Kind::List, Kind::String, Kind::Vector, Kind::Matrix, Kind::Range, Kind::Set] {
        scope.add_function(FunctionDescriptor::native("listval", &[kind, Kind::Number], |args, _, pos| {
                               index_value(&args[0], &args[1], pos)
                           }));
    }
    scope.add_function(FunctionDescriptor::native("listval", &[Kind::List, Kind::Range], |args, _, pos| {
                           let (Value::List(items), Value::Range(range)) = (&args[0], &args[1]) else {
                               return Err(RuntimeError::TypeError { details: "expected a list and a range".to_string(),
                                                                    pos });
                           };
                           slice(items, range, pos)
                       }).returns(Kind::List));
    scope.add_function(FunctionDescriptor::native("listval", &[Kind::Dict, Kind::String], |args, _, pos| {
                           let Value::Dict(entries) = &args[0] else {
                               return Err(RuntimeError::TypeError { details: "expected a dictionary".to_string(),
                                                                    pos });
                           };
                           let key = args[1].as_str(pos)?;
                           entries.get(key).cloned().ok_or_else(|| {
                                                         RuntimeError::InvalidArgument { details: format!("no entry with the key '{key}'"),
                                                                                         pos }
                                                     })
                       }));

    for kind in [Kind::List, Kind::Set, Kind::Range, Kind::Vector] {
        scope.add_function(FunctionDescriptor::native("list", &[kind], |args, _, pos| {
                               Ok(Value::from(args[0].to_items(pos)?))
                           }).returns(Kind::List));
    }

    scope.add_function(FunctionDescriptor::native("vector", &[Kind::List], |args, _, pos| {
                           Ok(Value::Vector(Rc::new(reals(&args[0], pos)?)))
                       }).returns(Kind::Vector));
    scope.add_function(FunctionDescriptor::variadic("vector", &[], Kind::Number, |args, _, pos| {
                           let components = args.iter().map(|a| a.as_real(pos)).collect::<EvalResult<Vec<_>>>()?;
                           Ok(Value::Vector(Rc::new(components)))
                       }).returns(Kind::Vector));

    scope.add_function(FunctionDescriptor::variadic("matrix", &[], Kind::List, |args, _, pos| {
                           // A single list of lists holds the rows itself.
                           let rows = match args {
                               [Value::List(items)] if items.iter().all(|i| matches!(i, Value::List(_))) => {
                                   items.as_ref().clone()
                               },
                               _ => args.to_vec(),
                           };
                           let rows = rows.iter().map(|row| reals(row, pos)).collect::<EvalResult<Vec<_>>>()?;
                           Ok(Value::Matrix(Rc::new(Matrix::from_rows(rows, pos)?)))
                       }).returns(Kind::Matrix));

    scope.add_function(FunctionDescriptor::native("set", &[Kind::List], |args, _, pos| {
                           Ok(Value::set(args[0].to_items(pos)?))
                       }).returns(Kind::Set));
    scope.add_function(FunctionDescriptor::variadic("set", &[], Kind::Any, |args, _, _| Ok(Value::set(args.to_vec())))
                           .returns(Kind::Set));

    scope.add_function(FunctionDescriptor::native("..", &[Kind::Number, Kind::Number], |args, _, pos| {
                           Ok(Value::Range(Range::new(args[0].as_real(pos)?, args[1].as_real(pos)?, 1.0)))
                       }).returns(Kind::Range));
    scope.add_function(FunctionDescriptor::native("#", &[Kind::Range, Kind::Number], |args, _, pos| {
                           let Value::Range(r) = &args[0] else {
                               return Err(RuntimeError::TypeError { details: "expected a range".to_string(),
                                                                    pos });
                           };
                           Ok(Value::Range(Range::new(r.start, r.end, args[1].as_real(pos)?)))
                       }).returns(Kind::Range));

    scope.add_function(FunctionDescriptor::native("in", &[Kind::Any, Kind::Any], |args, _, pos| {
                           Ok(Value::Boolean(contains(&args[0], &args[1], pos)?))
                       }).returns(Kind::Boolean));

    for kind in [Kind::List, Kind::Range] {
        scope.add_function(FunctionDescriptor::native("except", &[kind, Kind::Any], except).returns(Kind::List));
    }

    for kind in [Kind::List, Kind::Set, Kind::Dict, Kind::String, Kind::Range] {
        scope.add_function(FunctionDescriptor::native("abs", &[kind], |args, _, _| {
                               #[allow(clippy::cast_precision_loss)]
                               let len = match &args[0] {
                                   Value::List(items) | Value::Set(items) => items.len(),
                                   Value::Dict(entries) => entries.len(),
                                   Value::String(s) => s.value.chars().count(),
                                   Value::Range(r) => r.size(),
                                   _ => 0,
                               } as f64;
                               Ok(Value::from(len))
                           }).returns(Kind::Number));
    }
    scope.add_function(FunctionDescriptor::native("abs", &[Kind::Vector], |args, _, pos| {
                           let norm = reals(&args[0], pos)?.iter().map(|x| x * x).sum::<f64>().sqrt();
                           Ok(Value::from(norm))
                       }).returns(Kind::Number));
}

#[cfg(test)]
mod tests {
    use crate::{
        compile,
        error::RuntimeError,
        interpreter::{library::core::builtin_scope, value::core::Value},
    };

    fn eval(source: &str) -> Result<Value, RuntimeError> {
        builtin_scope().evaluate(&compile(source).unwrap().unwrap())
    }

    #[test]
    fn indexing() {
        assert_eq!(eval("[1, 2, 3][0]").unwrap(), 1.0.into());
        assert_eq!(eval("[1, 2, 3][-1]").unwrap(), 3.0.into());
        assert_eq!(eval("[1, 2, 3, 4][1..3]").unwrap(), eval("[2, 3]").unwrap());
        assert_eq!(eval("\"abc\"[1]").unwrap(), "b".into());
        assert_eq!(eval("[\"a\": 1][\"a\"]").unwrap(), 1.0.into());
        assert_eq!(eval("matrix([1, 2], [3, 4])[1]").unwrap(), eval("vector(3, 4)").unwrap());
        assert!(matches!(eval("[1, 2][2]"), Err(RuntimeError::IndexOutOfBounds { index: 2, length: 2, .. })));
    }

    #[test]
    fn constructors() {
        assert_eq!(eval("list(1..3)").unwrap(), eval("[1, 2, 3]").unwrap());
        assert_eq!(eval("list(0..1#0.5)").unwrap(), eval("[0, 0.5, 1]").unwrap());
        assert_eq!(eval("set(1, 2, 1)").unwrap(), eval("set([2, 1])").unwrap());
        assert_eq!(eval("matrix([[1, 2], [3, 4]])").unwrap(), eval("matrix([1, 2], [3, 4])").unwrap());
        assert!(matches!(eval("matrix([1, 2], [3])"), Err(RuntimeError::MalformedMatrix { .. })));
    }

    #[test]
    fn membership_and_lengths() {
        assert_eq!(eval("2 in [1, 2]").unwrap(), true.into());
        assert_eq!(eval("2.5 in 1..3").unwrap(), false.into());
        assert_eq!(eval("2.5 in 1..3#0").unwrap(), true.into());
        assert_eq!(eval("\"b\" in \"abc\"").unwrap(), true.into());
        assert_eq!(eval("[1, 2, 3] except 2").unwrap(), eval("[1, 3]").unwrap());
        assert_eq!(eval("len([1, 2, 3])").unwrap(), 3.0.into());
        assert_eq!(eval("abs(vector(3, 4))").unwrap(), 5.0.into());
    }
}
