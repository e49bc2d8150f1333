use std::rc::Rc;

use crate::{
    ast::{TokenKind, Tree},
    error::RuntimeError,
    interpreter::{
        evaluator::{core::EvalResult, substitute::bound_names},
        scope::{core::Scope, descriptor::FunctionDescriptor},
        value::{
            core::{Kind, Value},
            range::MAX_LENGTH,
        },
    },
};

/// Fails unless exactly `expected` argument trees were given.
fn expect_args(name: &str, args: &[Rc<Tree>], expected: usize, pos: usize) -> EvalResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::InvalidArgument { details: format!("{name} takes {expected} arguments, got {}", args.len()),
                                            pos })
    }
}

/// `if(condition, then, else)`: only the chosen branch is evaluated.
fn eval_if(args: &[Rc<Tree>], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    expect_args("if", args, 3, pos)?;
    let branch = if scope.eval_tree(&args[0])?.as_bool(pos)? { &args[1] } else { &args[2] };
    scope.eval_tree(branch)
}

/// `switch(c1, v1, c2, v2, ..., default)`: the value of the first true
/// condition, or the trailing default.
fn eval_switch(args: &[Rc<Tree>], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    for case in args.chunks(2) {
        match case {
            [condition, value] => {
                if scope.eval_tree(condition)?.as_bool(pos)? {
                    return scope.eval_tree(value);
                }
            },
            [default] => return scope.eval_tree(default),
            _ => {},
        }
    }
    Err(RuntimeError::InvalidArgument { details: "no case of switch matched and there is no default".to_string(),
                                        pos })
}

/// `a and b`: `b` is skipped when `a` is false.
fn eval_and(args: &[Rc<Tree>], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    expect_args("and", args, 2, pos)?;
    if !scope.eval_tree(&args[0])?.as_bool(pos)? {
        return Ok(Value::Boolean(false));
    }
    Ok(Value::Boolean(scope.eval_tree(&args[1])?.as_bool(pos)?))
}

/// `a or b`: `b` is skipped when `a` is true.
fn eval_or(args: &[Rc<Tree>], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    expect_args("or", args, 2, pos)?;
    if scope.eval_tree(&args[0])?.as_bool(pos)? {
        return Ok(Value::Boolean(true));
    }
    Ok(Value::Boolean(scope.eval_tree(&args[1])?.as_bool(pos)?))
}

/// `let(name1, value1, ..., body)` or `let(dict, body)`.
///
/// Names are bound one after another in a fresh child scope, so each value
/// can refer to the names before it.
fn eval_let(args: &[Rc<Tree>], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    let Some((body, bindings)) = args.split_last() else {
        return Err(RuntimeError::InvalidArgument { details: "let needs a body".to_string(),
                                                   pos });
    };

    let mut inner = scope.child();
    if let [dict] = bindings {
        let Value::Dict(entries) = scope.eval_tree(dict)? else {
            return Err(RuntimeError::TypeError { details: "the bindings of let must be a dictionary".to_string(),
                                                 pos });
        };
        for (name, value) in entries.iter() {
            inner.set_variable(name, value.clone());
        }
    } else {
        if bindings.len() % 2 != 0 {
            return Err(RuntimeError::InvalidArgument { details: "let expects pairs of names and values".to_string(),
                                                       pos });
        }
        for pair in bindings.chunks(2) {
            let Some(name) = pair[0].as_name() else {
                return Err(RuntimeError::InvalidArgument { details: format!("'{}' can not be bound by let", pair[0]),
                                                           pos });
            };
            let value = inner.evaluate(&pair[1])?;
            inner.set_variable(&name.name, value);
        }
    }
    inner.evaluate(body)
}

/// Binds `names` to `item` in a child of `scope`. With more than one name
/// the item is destructured.
fn bind_item<'s>(scope: &'s Scope<'_>, names: &[String], item: Value, pos: usize) -> EvalResult<Scope<'s>> {
    if let [name] = names {
        return Ok(scope.with_variables([(name, item)]));
    }
    let parts = item.to_items(pos)?;
    if parts.len() != names.len() {
        return Err(RuntimeError::InvalidArgument { details: format!("can not bind {} names to {item}", names.len()),
                                                   pos });
    }
    Ok(scope.with_variables(names.iter().zip(parts)))
}

/// Evaluates `expr` once per element of `collection`, returning each
/// element alongside its result.
fn each_item(name: &str, args: &[Rc<Tree>], scope: &Scope<'_>, pos: usize) -> EvalResult<Vec<(Value, Value)>> {
    expect_args(name, args, 3, pos)?;
    let names = bound_names(&args[1]);
    if names.is_empty() {
        return Err(RuntimeError::InvalidArgument { details: format!("'{}' can not be bound by {name}", args[1]),
                                                   pos });
    }

    scope.eval_tree(&args[2])?
         .to_items(pos)?
         .into_iter()
         .map(|item| {
             let inner = bind_item(scope, &names, item.clone(), pos)?;
             let result = inner.evaluate(&args[0])?;
             Ok((item, result))
         })
         .collect()
}

/// `map(expr, name, collection)`.
fn eval_map(args: &[Rc<Tree>], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    let results = each_item("map", args, scope, pos)?;
    Ok(Value::from(results.into_iter().map(|(_, result)| result).collect::<Vec<_>>()))
}

/// `filter(condition, name, collection)`.
fn eval_filter(args: &[Rc<Tree>], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    let mut kept = Vec::new();
    for (item, keep) in each_item("filter", args, scope, pos)? {
        if keep.as_bool(pos)? {
            kept.push(item);
        }
    }
    Ok(Value::from(kept))
}

/// `value isa "type"`.
fn eval_isa(args: &[Rc<Tree>], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    expect_args("isa", args, 2, pos)?;
    let value = scope.eval_tree(&args[0])?;
    let type_name = scope.eval_tree(&args[1])?;
    let type_name = type_name.as_str(pos)?;
    match Kind::from_name(type_name) {
        Some(kind) => Ok(Value::Boolean(kind.accepts(&value))),
        None => Err(RuntimeError::InvalidArgument { details: format!("unknown type '{type_name}'"),
                                                    pos }),
    }
}

/// `safe("...")`: the string as written, without interpolation.
fn eval_safe(args: &[Rc<Tree>], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    expect_args("safe", args, 1, pos)?;
    match &args[0].tok.kind {
        TokenKind::Literal(Value::String(s)) => Ok(Value::safe_string(s.value.clone())),
        _ => scope.eval_tree(&args[0]),
    }
}

/// `repeat(expr, n)`: a list of `n` independent evaluations of `expr`.
fn eval_repeat(args: &[Rc<Tree>], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    expect_args("repeat", args, 2, pos)?;
    let times = scope.eval_tree(&args[1])?.as_integer(pos)?;
    let Some(times) = usize::try_from(times).ok().filter(|&n| n <= MAX_LENGTH) else {
        return Err(RuntimeError::InvalidArgument { details: format!("can not repeat {times} times"),
                                                   pos });
    };
    let items = (0..times).map(|_| scope.eval_tree(&args[0])).collect::<EvalResult<Vec<_>>>()?;
    Ok(Value::from(items))
}

/// Registers the operators which evaluate their own arguments.
pub fn register(scope: &mut Scope<'_>) {
    scope.add_function(FunctionDescriptor::lazy("if", eval_if));
    scope.add_function(FunctionDescriptor::lazy("switch", eval_switch));
    scope.add_function(FunctionDescriptor::lazy("and", eval_and).returns(Kind::Boolean));
    scope.add_function(FunctionDescriptor::lazy("or", eval_or).returns(Kind::Boolean));
    scope.add_function(FunctionDescriptor::lazy("let", eval_let));
    scope.add_function(FunctionDescriptor::lazy("map", eval_map).returns(Kind::List));
    scope.add_function(FunctionDescriptor::lazy("filter", eval_filter).returns(Kind::List));
    scope.add_function(FunctionDescriptor::lazy("isa", eval_isa).returns(Kind::Boolean));
    scope.add_function(FunctionDescriptor::lazy("safe", eval_safe).returns(Kind::String));
    scope.add_function(FunctionDescriptor::lazy("repeat", eval_repeat).returns(Kind::List));
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
    fn untaken_branches_are_not_evaluated() {
        assert_eq!(eval("if(true, 1, 1 + \"a\" * 2)").unwrap(), 1.0.into());
        assert_eq!(eval("false and 1").unwrap(), false.into());
        assert_eq!(eval("true or [1] * [2]").unwrap(), true.into());
        assert_eq!(eval("switch(false, 1, true, 2, 3)").unwrap(), 2.0.into());
        assert_eq!(eval("switch(false, 1, 3)").unwrap(), 3.0.into());
        assert!(matches!(eval("switch(false, 1)"), Err(RuntimeError::InvalidArgument { .. })));
    }

    #[test]
    fn let_binds_sequentially() {
        assert_eq!(eval("let(a, 2, b, a * 3, a + b)").unwrap(), 8.0.into());
        assert_eq!(eval("let([\"a\": 1, \"b\": 2], a + b)").unwrap(), 3.0.into());
    }

    #[test]
    fn map_and_filter() {
        assert_eq!(eval("map(x^2, x, [1, 2, 3])").unwrap(), eval("[1, 4, 9]").unwrap());
        assert_eq!(eval("map(a + b, [a, b], [[1, 2], [3, 4]])").unwrap(), eval("[3, 7]").unwrap());
        assert_eq!(eval("filter(x > 1, x, 0..3)").unwrap(), eval("[2, 3]").unwrap());
    }

    #[test]
    fn isa_safe_and_repeat() {
        assert_eq!(eval("1 isa \"number\"").unwrap(), true.into());
        assert_eq!(eval("x isa \"name\"").unwrap(), true.into());
        assert_eq!(eval("safe(\"{x}\")").unwrap(), "{x}".into());
        assert_eq!(eval("repeat(2, 3)").unwrap(), eval("[2, 2, 2]").unwrap());
        assert!(eval("1 isa \"widget\"").is_err());
    }
    #[test]
    fn repeat_refuses_huge_counts() {
        assert!(matches!(eval("repeat(1, 1e12)"), Err(RuntimeError::InvalidArgument { .. })));
        assert!(matches!(eval("repeat(1, -1)"), Err(RuntimeError::InvalidArgument { .. })));
        assert_eq!(eval("repeat(1, 0)").unwrap(), eval("[]").unwrap());
    }
}
