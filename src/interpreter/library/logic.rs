use crate::interpreter::{
    scope::{core::Scope, descriptor::FunctionDescriptor},
    value::core::{Kind, Value},
};

/// Defines a family of comparisons between two real numbers.
macro_rules! comparisons {
    ($scope:expr, $($name:literal => $op:tt),* $(,)?) => {
        $(
            $scope.add_function(FunctionDescriptor::native($name, &[Kind::Number, Kind::Number], |args, _, pos| {
                                    Ok(Value::Boolean(args[0].as_real(pos)? $op args[1].as_real(pos)?))
                                }).returns(Kind::Boolean));
        )*
    };
}

/// Defines a family of binary boolean connectives.
macro_rules! connectives {
    ($scope:expr, $($name:literal => $f:expr),* $(,)?) => {
        $(
            $scope.add_function(FunctionDescriptor::native($name, &[Kind::Boolean, Kind::Boolean], |args, _, pos| {
                                    let f: fn(bool, bool) -> bool = $f;
                                    Ok(Value::Boolean(f(args[0].as_bool(pos)?, args[1].as_bool(pos)?)))
                                }).returns(Kind::Boolean));
        )*
    };
}

/// Registers equality, ordering and the eager boolean operators. `and` and
/// `or` short-circuit, so they live in [`super::control`].
pub fn register(scope: &mut Scope<'_>) {
    scope.add_function(FunctionDescriptor::native("=", &[Kind::Any, Kind::Any], |args, _, _| {
                           Ok(Value::Boolean(args[0] == args[1]))
                       }).returns(Kind::Boolean));
    scope.add_function(FunctionDescriptor::native("<>", &[Kind::Any, Kind::Any], |args, _, _| {
                           Ok(Value::Boolean(args[0] != args[1]))
                       }).returns(Kind::Boolean));

    comparisons!(scope,
                 "<" => <,
                 ">" => >,
                 "<=" => <=,
                 ">=" => >=);

    scope.add_function(FunctionDescriptor::native("not", &[Kind::Boolean], |args, _, pos| {
                           Ok(Value::Boolean(!args[0].as_bool(pos)?))
                       }).returns(Kind::Boolean));

    connectives!(scope,
                 "xor" => |a, b| a != b,
                 "implies" => |a, b| !a || b);
}

#[cfg(test)]
mod tests {
    use crate::{compile, interpreter::library::core::builtin_scope, interpreter::value::core::Value};

    fn eval(source: &str) -> Value {
        builtin_scope().evaluate(&compile(source).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval("1 < 2 and 2 <= 2 and 3 > 2 and 3 >= 4"), false.into());
        assert_eq!(eval("[1, 2] = [1, 2]"), true.into());
        assert_eq!(eval("\"a\" <> \"b\""), true.into());
        assert_eq!(eval("1 = 1 + 0 * i"), true.into());
    }

    #[test]
    fn connectives() {
        assert_eq!(eval("true xor false"), true.into());
        assert_eq!(eval("false implies false"), true.into());
        assert_eq!(eval("not (true implies false)"), true.into());
        assert!(builtin_scope().evaluate(&compile("not 1").unwrap().unwrap()).is_err());
    }
}
