// tests/path_tests.rs

mod common;

use common::init_test_setup;
use ogdl::{Environment, EvalError, Evaluator, Node, ParseError, Value, compile_path, parse};
use rstest::{fixture, rstest};

fn eval_with(env: &Environment, tree: &Node, path: &str) -> Result<Option<Value>, EvalError> {
    let compiled = compile_path(path).unwrap();
    Evaluator::new(env).eval_path(tree, &compiled)
}

fn eval(tree: &Node, path: &str) -> Option<Value> {
    eval_with(&Environment::new(), tree, path).unwrap()
}

fn text(tree: &Node, path: &str) -> Option<String> {
    eval(tree, path).map(|v| v.to_string())
}

#[fixture]
fn repeated() -> Node {
    init_test_setup();
    parse("a\n b 1\n b 2").unwrap()
}

// ============================================================================
// Names, indexes, selectors
// ============================================================================

#[rstest]
#[case::index("a.b[0]", Some("1"))]
#[case::first_match("a.b", Some("1"))]
#[case::selector("a.b{1}", Some("2"))]
#[case::selector_first("a.b{0}", Some("1"))]
#[case::collect_all("a.b{}", Some("1\n2"))]
#[case::selector_out_of_range("a.b{5}", None)]
#[case::index_out_of_range("a.b[3]", None)]
#[case::missing_name("a.c", None)]
#[case::missing_tail("a.c.d", None)]
#[case::subtree("a", Some("b\n  1\nb\n  2"))]
fn test_repeated_names(repeated: Node, #[case] path: &str, #[case] expected: Option<&str>) {
    assert_eq!(text(&repeated, path).as_deref(), expected, "path: {}", path);
}

#[rstest]
fn test_single_value_is_a_scalar(repeated: Node) {
    assert_eq!(eval(&repeated, "a.b"), Some(Value::from("1")));
    assert!(matches!(eval(&repeated, "a.b{}"), Some(Value::Node(_))));
}

#[test]
fn test_chain() {
    let tree = parse("a b c").unwrap();
    assert_eq!(text(&tree, "a.b").as_deref(), Some("c"));
    assert_eq!(text(&tree, "a").as_deref(), Some("b\n  c"));
    assert_eq!(text(&tree, "[0]").as_deref(), Some("a\n  b\n    c"));
}

#[test]
fn test_index_is_evaluated_against_root() {
    let tree = parse("i 1\nlist\n  x\n  y").unwrap();
    assert_eq!(text(&tree, "list[i]").as_deref(), Some("y"));
    assert_eq!(text(&tree, "list[0]").as_deref(), Some("x"));
}

#[test]
fn test_dynamic_name() {
    let tree = parse("k b\na\n  b 1").unwrap();
    assert_eq!(text(&tree, "a.(k)").as_deref(), Some("1"));
    assert_eq!(text(&tree, "a.('b')").as_deref(), Some("1"));
    assert_eq!(text(&tree, "a.(missing)"), None);
}

#[test]
fn test_quoted_element() {
    let tree = parse("'a b' 1").unwrap();
    assert_eq!(text(&tree, "'a b'").as_deref(), Some("1"));
}

#[test]
fn test_invalid_index() {
    let tree = parse("list\n  x").unwrap();
    let env = Environment::new();
    assert_eq!(
        eval_with(&env, &tree, "list[-1]"),
        Err(EvalError::InvalidIndex("-1".to_string()))
    );
    assert_eq!(
        eval_with(&env, &tree, "list['x']"),
        Err(EvalError::InvalidIndex("x".to_string()))
    );
}

#[test]
fn test_invalid_selector() {
    let tree = parse("list\n  x").unwrap();
    let env = Environment::new();
    assert_eq!(eval_with(&env, &tree, "list{'x'}"), Err(EvalError::InvalidSelector));
    assert_eq!(eval_with(&env, &tree, "{0}"), Err(EvalError::InvalidSelector));
}

// ============================================================================
// Special names
// ============================================================================

#[rstest]
fn test_len(repeated: Node) {
    assert_eq!(eval(&repeated, "a._len"), Some(Value::from(2)));
    assert_eq!(eval(&repeated, "a.b._len"), Some(Value::from(1)));
    assert_eq!(eval(&repeated, "_len"), Some(Value::from(1)));
}

#[rstest]
fn test_this_and_string(repeated: Node) {
    let this = eval(&repeated, "a._this").unwrap();
    assert_eq!(this.to_string(), "a\n  b\n    1\n  b\n    2");
    assert_eq!(eval(&repeated, "a._string"), Some(Value::from("b\n  1\nb\n  2")));
}

#[rstest]
fn test_this_string_is_own_content(repeated: Node) {
    assert_eq!(eval(&repeated, "a._thisString"), Some(Value::from("a")));
    assert_eq!(eval(&repeated, "a.b._thisString"), Some(Value::from("b")));
    assert_eq!(eval(&repeated, "_thisString"), Some(Value::from("")));
}

// ============================================================================
// Callables
// ============================================================================

fn environment() -> Environment {
    let mut env = Environment::new();
    env.register_fn("sum", None, |args: &[Value]| {
        Ok(Value::from(args.iter().filter_map(Value::to_int).sum::<i64>()))
    });
    env.register_fn("one", Some(1), |args: &[Value]| Ok(args[0].clone()));
    env.register("items", |_: &[Value]| -> Result<Value, EvalError> {
        Ok(Value::Node(parse("p 1\nq 2").unwrap_or_default()))
    });
    env.register("describe", |_: &[Value]| -> Result<Value, EvalError> { Ok(Value::from("counter")) });
    env.register("fail", |_: &[Value]| -> Result<Value, EvalError> {
        Err(EvalError::Callable {
            name: "fail".to_string(),
            message: "boom".to_string(),
        })
    });
    env
}

#[test]
fn test_function_call() {
    let env = environment();
    let tree = parse("x 4").unwrap();
    assert_eq!(eval_with(&env, &tree, "sum(1, 2, 3)"), Ok(Some(Value::from(6))));
    assert_eq!(eval_with(&env, &tree, "sum(x 1)"), Ok(Some(Value::from(5))));
    assert_eq!(eval_with(&env, &tree, "sum()"), Ok(Some(Value::from(0))));
}

#[test]
fn test_call_result_continues_the_walk() {
    let env = environment();
    let tree = Node::wrapper();
    assert_eq!(eval_with(&env, &tree, "items().q"), Ok(Some(Value::from("2"))));
}

#[test]
fn test_argument_count() {
    let env = environment();
    let tree = Node::wrapper();
    assert_eq!(
        eval_with(&env, &tree, "one(1, 2)"),
        Err(EvalError::ArgumentCount {
            name: "one".to_string(),
            expected: 1,
            found: 2,
        })
    );
    assert_eq!(eval_with(&env, &tree, "one(7)"), Ok(Some(Value::from(7))));
}

#[test]
fn test_not_callable() {
    let env = environment();
    let tree = parse("a 1").unwrap();
    assert_eq!(
        eval_with(&env, &tree, "nope(1)"),
        Err(EvalError::NotCallable("nope".to_string()))
    );
    assert_eq!(eval_with(&env, &tree, "a(1)"), Err(EvalError::NotCallable("a".to_string())));
}

#[test]
fn test_callable_error_propagates() {
    let env = environment();
    let err = eval_with(&env, &Node::wrapper(), "fail()").unwrap_err();
    assert_eq!(err.to_string(), "call to 'fail' failed: boom");
}

#[test]
fn test_method_needs_type_metadata() {
    let env = environment();
    let bound = parse("obj\n  !type counter\n  n 5").unwrap();
    assert_eq!(eval_with(&env, &bound, "obj.describe"), Ok(Some(Value::from("counter"))));
    assert_eq!(eval_with(&env, &bound, "obj.n"), Ok(Some(Value::from("5"))));
    assert_eq!(eval_with(&env, &bound, "obj.unknown"), Ok(None));

    let plain = parse("obj\n  n 5").unwrap();
    assert_eq!(eval_with(&env, &plain, "obj.describe"), Ok(None));
}

// ============================================================================
// Compilation
// ============================================================================

#[test]
fn test_path_syntax_errors() {
    assert!(matches!(
        compile_path("a.b{1"),
        Err(ParseError::MissingDelimiter { delimiter: '}', .. })
    ));
    assert!(matches!(
        compile_path("f(1, 2"),
        Err(ParseError::MissingDelimiter { delimiter: ')', .. })
    ));
    assert!(matches!(compile_path("a b"), Err(ParseError::UnexpectedChar { found: 'b', .. })));
}

#[test]
fn test_compiled_path_is_a_tree() {
    let p = compile_path("a.b{}").unwrap();
    assert_eq!(p.to_string(), "!p\n  a\n  b\n  !s");
}
