use std::{cmp::Ordering, fs, rc::Rc};

use algebrist::{
    ast::{TokenKind, Tree},
    compile,
    error::{Error, ParseError},
    evaluate_str,
    interpreter::{
        analysis::compare::compare_trees,
        checking::{equivalence::are_equivalent, settings::CheckingSettings},
        library::core::builtin_scope,
        parser::core::{ParserOptions, compile_with},
        scope::{core::ScopeKind, descriptor::FunctionDescriptor},
        text::{escape, unescape},
        value::core::{Kind, Value},
    },
};
use rand::{SeedableRng, rngs::StdRng};
use walkdir::WalkDir;

#[test]
fn book_examples_work() {
    let mut count = 0;
    let scope = builtin_scope();

    for entry in
        WalkDir::new("book/src").into_iter()
                                .filter_map(Result::ok)
                                .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        for code in extract_blocks(&content) {
            for line in code.lines().filter(|l| !l.trim().is_empty()) {
                match evaluate_str(line, &scope) {
                    Ok(Value::Boolean(true) | Value::Nothing) => count += 1,
                    Ok(other) => panic!("Example in {path:?} is not true:\n{line}\nGot: {other}"),
                    Err(e) => panic!("Example in {path:?} failed:\n{line}\nError: {e:?}"),
                }
            }
        }
    }

    assert!(count > 0, "No examples found in book/src");
}

fn extract_blocks(content: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut inside = false;
    let mut buf = String::new();

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```algebrist") {
            inside = true;
            buf.clear();
            continue;
        }
        if inside && trimmed.starts_with("```") {
            inside = false;
            blocks.push(buf.clone());
            continue;
        }
        if inside {
            buf.push_str(line);
            buf.push('\n');
        }
    }

    blocks
}

fn assert_true(src: &str) {
    match evaluate_str(src, &builtin_scope()) {
        Ok(Value::Boolean(true)) => {},
        Ok(other) => panic!("Expression {src:?} evaluated to {other}"),
        Err(e) => panic!("Expression {src:?} failed: {e}"),
    }
}

fn assert_failure(src: &str) {
    if let Ok(value) = evaluate_str(src, &builtin_scope()) {
        panic!("Expression {src:?} succeeded with {value} but was expected to fail")
    }
}

fn tree(src: &str) -> Rc<Tree> {
    compile(src).unwrap().unwrap()
}

#[test]
fn precedence_and_associativity() {
    assert_true("1 + 2 * 3 = 7");
    assert_true("2^3^2 = 512");
    assert_true("-2^2 = -4");
    assert_true("(1 + 2) * 3 = 9");
    assert_true("10 - 4 - 3 = 3");
}

#[test]
fn implicit_multiplication() {
    let mut scope = builtin_scope();
    scope.set_variable("x", 5.0.into());
    assert_eq!(evaluate_str("2x", &scope).unwrap(), evaluate_str("2*x", &scope).unwrap());
    assert_eq!(evaluate_str("2(x + 1)", &scope).unwrap(), 12.0.into());
    assert_eq!(evaluate_str("(x)(x)", &scope).unwrap(), 25.0.into());
}

#[test]
fn escaping_round_trips() {
    for s in ["", "plain", "back\\slash", "{braces}", "\"quotes\" and 'quotes'", "two\nlines", "\\{"] {
        assert_eq!(unescape(&escape(s)), s);
    }
}

#[test]
fn substitution_is_idempotent() {
    let mut scope = builtin_scope();
    scope.set_variable("x", 2.0.into());
    scope.set_variable("y", 3.0.into());

    let once = scope.substitute(&tree("x + y * sin(x)"), false).unwrap();
    let twice = scope.substitute(&once, false).unwrap();
    assert_eq!(once, twice);
}

fn assert_arities(tree: &Tree) {
    match &tree.tok.kind {
        TokenKind::Op(op) => assert_eq!(tree.args.len(), op.arity, "operator {}", op.name),
        TokenKind::Function(f) => assert_eq!(tree.args.len(), f.arity, "function {}", f.name),
        _ => {},
    }
    tree.args.iter().for_each(|arg| assert_arities(arg));
}

#[test]
fn parsed_nodes_have_their_arity() {
    for src in ["1 + 2 * 3",
                "-x^2!",
                "f(x, y, g(z))",
                "[1, 2, [3]][0]",
                "[\"a\": 1, \"b\": -2]",
                "not a and b or c",
                "if(x > 0, x, -x)",
                "1..10#2 except 3"]
    {
        assert_arities(&tree(src));
    }
}

#[test]
fn deleting_hides_the_parent_binding() {
    let mut parent = builtin_scope();
    parent.set_variable("x", 1.0.into());
    let mut child = parent.child();
    child.set_variable("x", 2.0.into());
    assert_eq!(child.get_variable("x"), Some(2.0.into()));

    child.delete(ScopeKind::Variables, "x");
    assert_eq!(child.get_variable("x"), None);
    assert_eq!(parent.get_variable("x"), Some(1.0.into()));
    assert!(evaluate_str("x + 1", &child).is_err());
}

#[test]
fn deleting_a_function_hides_every_overload() {
    let parent = builtin_scope();
    let mut child = parent.child();
    child.delete(ScopeKind::Functions, "sin");
    assert!(evaluate_str("sin(0)", &child).is_err());
    assert_eq!(evaluate_str("sin(0)", &parent).unwrap(), 0.0.into());
}

#[test]
fn overloads_are_chosen_by_argument_type() {
    let mut scope = builtin_scope();
    scope.add_function(FunctionDescriptor::native("f", &[Kind::Number], |_, _, _| Ok("number".into())));
    scope.add_function(FunctionDescriptor::native("f", &[Kind::String], |_, _, _| Ok("string".into())));

    assert_eq!(evaluate_str("f(1)", &scope).unwrap(), "number".into());
    assert_eq!(evaluate_str("f(\"a\")", &scope).unwrap(), "string".into());
    assert!(evaluate_str("f(true)", &scope).is_err());
}

#[test]
fn first_matching_overload_wins() {
    let mut scope = builtin_scope();
    scope.add_function(FunctionDescriptor::native("g", &[Kind::Any], |_, _, _| Ok(1.0.into())));
    scope.add_function(FunctionDescriptor::native("g", &[Kind::Number], |_, _, _| Ok(2.0.into())));
    assert_eq!(evaluate_str("g(5)", &scope).unwrap(), 1.0.into());
}

#[test]
fn user_functions() {
    let mut scope = builtin_scope();
    scope.define_function("hyp", &["a", "b"], "sqrt(a^2 + b^2)").unwrap();
    assert_eq!(evaluate_str("hyp(3, 4)", &scope).unwrap(), 5.0.into());
    assert!(evaluate_str("hyp(3)", &scope).is_err());
}

#[test]
fn randomness_is_inferred_through_user_functions() {
    let mut scope = builtin_scope();
    scope.define_function("dice", &[], "random(1..6)").unwrap();
    scope.define_function("twice", &["x"], "2x").unwrap();

    assert!(scope.is_random(&tree("dice() + 1")));
    assert!(scope.is_random(&tree("twice(random(1, 2))")));
    assert!(!scope.is_random(&tree("twice(3)")));
}

#[test]
fn monomials_order_by_degree() {
    assert_eq!(compare_trees(&tree("3x^2"), &tree("x")), Ordering::Less);
    assert_eq!(compare_trees(&tree("x"), &tree("3x^2")), Ordering::Greater);
    assert_eq!(compare_trees(&tree("x"), &tree("x")), Ordering::Equal);
}

#[test]
fn equivalence_checking() {
    let scope = builtin_scope();
    let mut rng = StdRng::seed_from_u64(42);
    let settings = CheckingSettings::default();

    assert!(are_equivalent("x + x", "2x", &settings, &scope, &mut rng));
    assert!(are_equivalent("(a + b)^2", "a^2 + 2a*b + b^2", &settings, &scope, &mut rng));
    assert!(!are_equivalent("x", "y", &settings, &scope, &mut rng));
    assert!(!are_equivalent("x^2", "x^3", &settings, &scope, &mut rng));

    let lenient = CheckingSettings { range: (-1.0, 1.0),
                                     failure_rate: 5,
                                     ..CheckingSettings::default() };
    assert!(are_equivalent("sqrt(x)^2", "x", &lenient, &scope, &mut rng));
}

#[test]
fn unclosed_brackets() {
    assert!(matches!(compile("(1+2"),
                     Err(Error::Parse(ParseError::UnmatchedBracket { bracket: '(', .. }))));

    let options = ParserOptions { close_missing_brackets: true,
                                  ..ParserOptions::default() };
    let closed = compile_with("(1+2", options).unwrap().unwrap();
    assert_eq!(closed.to_string(), tree("(1+2)").to_string());
    assert_eq!(builtin_scope().evaluate(&closed).unwrap(), 3.0.into());
}

#[test]
fn collections_and_strings() {
    assert_true("[1, 2, 3][1] = 2");
    assert_true("[1, 2, 3][-1] = 3");
    assert_true("\"abc\"[0] = \"a\"");
    assert_true("2 in [1, 2, 3]");
    assert_true("list(1..4#1) = [1, 2, 3, 4]");
    assert_true("abs(vector(3, 4)) = 5");
    assert_true("\"a\" + \"b\" = \"ab\"");
    assert_true("map(x + 1, x, [1, 2]) = [2, 3]");
    assert_true("let(a, 3, a^2) = 9");
}

#[test]
fn runtime_failures() {
    assert_failure("unknown(1)");
    assert_failure("undefined_name + 1");
    assert_failure("sin(\"a\")");
    assert_failure("matrix([1, 2], [3])");
    assert_failure("(1 +");
}
