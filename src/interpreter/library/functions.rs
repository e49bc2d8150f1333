use std::f64::consts::LN_10;

use rand::{Rng, seq::SliceRandom};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        parser::core::compile,
        scope::{core::Scope, descriptor::FunctionDescriptor},
        value::{
            complex::ComplexNumber,
            core::{Kind, Value},
            number::Number,
        },
    },
};

/// Defines functions of one number which have both a real and a complex
/// form.
macro_rules! elementary {
    ($scope:expr, $($name:literal => $f:ident),* $(,)?) => {
        $(
            $scope.add_function(FunctionDescriptor::native($name, &[Kind::Number], |args, _, pos| {
                                    let n = args[0].as_number(pos)?.map(f64::$f, ComplexNumber::$f);
                                    Ok(Value::Number(n.simplified()))
                                }).returns(Kind::Number));
        )*
    };
}

/// Defines functions of one real number.
macro_rules! real_functions {
    ($scope:expr, $($name:literal => $f:expr),* $(,)?) => {
        $(
            $scope.add_function(FunctionDescriptor::native($name, &[Kind::Number], |args, _, pos| {
                                    let f: fn(f64) -> f64 = $f;
                                    Ok(Value::from(f(args[0].as_real(pos)?)))
                                }).returns(Kind::Number));
        )*
    };
}

/// The principal natural logarithm, real for non-negative reals.
fn natural_log(n: Number) -> Number {
    match n {
        Number::Real(r) if r >= 0.0 => Number::Real(r.ln()),
        other => Number::Complex(other.to_complex().ln()).simplified(),
    }
}

/// The greatest common divisor of two integers; `gcd(0, 0)` is 0.
fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `n!` for a non-negative integer `n`.
fn factorial(args: &[Value], _: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    let n = args[0].as_integer(pos)?;
    if n < 0 {
        return Err(RuntimeError::InvalidArgument { details: format!("the factorial of {n} is not defined"),
                                                   pos });
    }
    // 171! is already beyond f64::MAX.
    if n > 170 {
        return Ok(Value::from(f64::INFINITY));
    }
    #[allow(clippy::cast_precision_loss)]
    let product = (2..=n).fold(1.0, |acc, k| acc * k as f64);
    Ok(Value::from(product))
}

/// Folds a non-empty list of reals with `pick`.
fn extremum(values: &[Value], pos: usize, pick: fn(f64, f64) -> f64) -> EvalResult<Value> {
    let mut reals = values.iter().map(|v| v.as_real(pos));
    let Some(first) = reals.next() else {
        return Err(RuntimeError::InvalidArgument { details: "can not pick from no values".to_string(),
                                                   pos });
    };
    reals.try_fold(first?, |acc, x| -> EvalResult<f64> { Ok(pick(acc, x?)) })
         .map(Value::from)
}

/// Picks an element of `items` uniformly.
fn choose(items: &[Value], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    scope.with_rng(|rng| items.choose(rng).cloned())
         .ok_or_else(|| RuntimeError::InvalidArgument { details: "can not pick a random element of an empty collection".to_string(),
                                                        pos })
}

/// `random(range)`: a random element of a discrete range, or a uniformly
/// distributed real in a continuous one.
fn random_in_range(args: &[Value], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    let Value::Range(range) = &args[0] else {
        return Err(RuntimeError::TypeError { details: "expected a range".to_string(),
                                             pos });
    };
    if range.step == 0.0 {
        let t: f64 = scope.with_rng(|rng| rng.r#gen());
        return Ok(Value::from(t.mul_add(range.end - range.start, range.start)));
    }
    let size = range.size();
    if size == 0 {
        return Err(RuntimeError::InvalidArgument { details: format!("can not pick a random element of the empty range {range}"),
                                                   pos });
    }
    let i = scope.with_rng(|rng| rng.gen_range(0..size));
    Ok(Value::from(range.nth(i)))
}

/// Parses a string into an expression value.
fn parse_expression(args: &[Value], _: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    let source = args[0].as_str(pos)?;
    match compile(source) {
        Ok(Some(tree)) => Ok(Value::Expression(tree)),
        Ok(None) => Err(RuntimeError::InvalidArgument { details: "can not make an expression from an empty string".to_string(),
                                                        pos }),
        Err(e) => Err(RuntimeError::EmbeddedSyntax { source: source.to_string(),
                                                     message: e.to_string(),
                                                     pos }),
    }
}

/// `eval(expression)` or `eval(expression, dict)`: evaluates an expression
/// value, optionally with extra variables bound.
fn eval_expression(args: &[Value], scope: &Scope<'_>, pos: usize) -> EvalResult<Value> {
    let Value::Expression(tree) = &args[0] else {
        return Err(RuntimeError::TypeError { details: "expected an expression".to_string(),
                                             pos });
    };
    match args.get(1) {
        Some(Value::Dict(variables)) => {
            scope.with_variables(variables.iter().map(|(name, value)| (name, value.clone())))
                 .evaluate(tree)
        },
        _ => scope.evaluate(tree),
    }
}

/// Registers the elementary functions, number theory, `random` and the
/// conversions between values and expressions.
pub fn register(scope: &mut Scope<'_>) {
    scope.add_function(FunctionDescriptor::native("sqrt", &[Kind::Number], |args, _, pos| {
                           Ok(Value::Number(args[0].as_number(pos)?.sqrt().simplified()))
                       }).returns(Kind::Number));
    scope.add_function(FunctionDescriptor::native("abs", &[Kind::Number], |args, _, pos| {
                           Ok(Value::from(args[0].as_number(pos)?.abs()))
                       }).returns(Kind::Number));

    elementary!(scope,
                "sin" => sin,
                "cos" => cos,
                "tan" => tan,
                "exp" => exp);

    scope.add_function(FunctionDescriptor::native("ln", &[Kind::Number], |args, _, pos| {
                           Ok(Value::Number(natural_log(args[0].as_number(pos)?)))
                       }).returns(Kind::Number));
    scope.add_function(FunctionDescriptor::native("log", &[Kind::Number], |args, _, pos| {
                           let n = natural_log(args[0].as_number(pos)?) / Number::Real(LN_10);
                           Ok(Value::Number(n.simplified()))
                       }).returns(Kind::Number));
    scope.add_function(FunctionDescriptor::native("log", &[Kind::Number, Kind::Number], |args, _, pos| {
                           let n = natural_log(args[0].as_number(pos)?) / natural_log(args[1].as_number(pos)?);
                           Ok(Value::Number(n.simplified()))
                       }).returns(Kind::Number));

    real_functions!(scope,
                    "sign" => |x| if x == 0.0 { 0.0 } else { x.signum() },
                    "floor" => f64::floor,
                    "ceil" => f64::ceil,
                    "round" => f64::round);

    scope.add_function(FunctionDescriptor::native("min", &[Kind::List], |args, _, pos| {
                           extremum(&args[0].to_items(pos)?, pos, f64::min)
                       }).returns(Kind::Number));
    scope.add_function(FunctionDescriptor::variadic("min", &[Kind::Number], Kind::Number, |args, _, pos| {
                           extremum(args, pos, f64::min)
                       }).returns(Kind::Number));
    scope.add_function(FunctionDescriptor::native("max", &[Kind::List], |args, _, pos| {
                           extremum(&args[0].to_items(pos)?, pos, f64::max)
                       }).returns(Kind::Number));
    scope.add_function(FunctionDescriptor::variadic("max", &[Kind::Number], Kind::Number, |args, _, pos| {
                           extremum(args, pos, f64::max)
                       }).returns(Kind::Number));

    scope.add_function(FunctionDescriptor::native("gcd", &[Kind::Number, Kind::Number], |args, _, pos| {
                           #[allow(clippy::cast_precision_loss)]
                           let d = gcd(args[0].as_integer(pos)?, args[1].as_integer(pos)?) as f64;
                           Ok(Value::from(d))
                       }).returns(Kind::Number));
    scope.add_function(FunctionDescriptor::native("|", &[Kind::Number, Kind::Number], |args, _, pos| {
                           let (a, b) = (args[0].as_integer(pos)?, args[1].as_integer(pos)?);
                           Ok(Value::Boolean(if a == 0 { b == 0 } else { b % a == 0 }))
                       }).returns(Kind::Boolean));
    scope.add_function(FunctionDescriptor::native("fact", &[Kind::Number], factorial).returns(Kind::Number));

    scope.add_function(FunctionDescriptor::native("random", &[Kind::List], |args, scope, pos| {
                           choose(&args[0].to_items(pos)?, scope, pos)
                       }).random());
    scope.add_function(FunctionDescriptor::native("random", &[Kind::Set], |args, scope, pos| {
                           choose(&args[0].to_items(pos)?, scope, pos)
                       }).random());
    scope.add_function(FunctionDescriptor::native("random", &[Kind::Range], random_in_range).random()
                                                                                             .returns(Kind::Number));
    scope.add_function(FunctionDescriptor::variadic("random", &[Kind::Any], Kind::Any, |args, scope, pos| choose(args, scope, pos))
                           .random());

    scope.add_function(FunctionDescriptor::native("expression", &[Kind::String], parse_expression)
                           .returns(Kind::Expression));
    scope.add_function(FunctionDescriptor::native("eval", &[Kind::Expression], eval_expression));
    scope.add_function(FunctionDescriptor::native("eval", &[Kind::Expression, Kind::Dict], eval_expression));
    scope.add_function(FunctionDescriptor::native("string", &[Kind::Any], |args, _, _| {
                           Ok(Value::safe_string(args[0].to_string()))
                       }).returns(Kind::String));
}

#[cfg(test)]
mod tests {
    use super::gcd;
    use crate::{
        compile,
        error::RuntimeError,
        interpreter::{library::core::builtin_scope, value::core::Value},
    };

    fn eval(source: &str) -> Result<Value, RuntimeError> {
        builtin_scope().evaluate(&compile(source).unwrap().unwrap())
    }

    fn real(source: &str) -> f64 {
        eval(source).unwrap().as_real(0).unwrap()
    }

    #[test]
    fn elementary_functions() {
        assert!((real("sin(pi / 2)") - 1.0).abs() < 1e-12);
        assert!((real("ln(e ^ 2)") - 2.0).abs() < 1e-12);
        assert!((real("log(1000)") - 3.0).abs() < 1e-12);
        assert!((real("log(8, 2)") - 3.0).abs() < 1e-12);
        assert_eq!(real("sqrt(16)"), 4.0);
        assert_eq!(real("abs(3 + 4i)"), 5.0);
        assert_eq!(real("sign(-2)"), -1.0);
        assert_eq!(eval("ln(-1)").unwrap().to_string(), format!("{}i", std::f64::consts::PI));
    }

    #[test]
    fn number_theory() {
        assert_eq!(gcd(12, -18), 6);
        assert_eq!(gcd(0, 0), 0);
        assert_eq!(real("5!"), 120.0);
        assert_eq!(real("0!"), 1.0);
        assert_eq!(eval("3 | 12").unwrap(), true.into());
        assert!(matches!(eval("(-1)!"), Err(RuntimeError::InvalidArgument { .. })));
        assert!(matches!(eval("2.5!"), Err(RuntimeError::RealIsFractional { .. })));
        assert_eq!(real("max(1, 5, 3)"), 5.0);
        assert_eq!(real("min([4, 2, 8])"), 2.0);
    }

    #[test]
    fn random_stays_in_its_collection() {
        for _ in 0..20 {
            let n = real("random(1..6)");
            assert!((1.0..=6.0).contains(&n) && n.fract() == 0.0);
            let x = real("random(0..1#0)");
            assert!((0.0..=1.0).contains(&x));
            assert_eq!(eval("random([\"a\", \"a\"])").unwrap(), "a".into());
        }
        assert!(eval("random([])").is_err());
    }

    #[test]
    fn huge_factorials_are_infinite() {
        assert_eq!(real("170!"), (2..=170).fold(1.0, |acc, k| acc * f64::from(k)));
        assert_eq!(real("171!"), f64::INFINITY);
        assert_eq!(real("2000000000!"), f64::INFINITY);
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let draw = |seed| {
            let mut scope = builtin_scope();
            scope.seed_random(seed);
            scope.evaluate(&compile("repeat(random(1..100), 5)").unwrap().unwrap()).unwrap()
        };
        assert_eq!(draw(3), draw(3));
        assert!(matches!(eval("random(1..0)"), Err(RuntimeError::InvalidArgument { .. })));
    }

    #[test]
    fn expressions_as_values() {
        assert_eq!(eval("eval(expression(\"x + 1\"), [\"x\": 2])").unwrap(), 3.0.into());
        assert_eq!(eval("string([1, 2])").unwrap(), "[1, 2]".into());
        assert!(matches!(eval("expression(\"(1 + 2\")"), Err(RuntimeError::EmbeddedSyntax { .. })));
    }
}
