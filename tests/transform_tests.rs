// tests/transform_tests.rs

mod common;

use common::init_test_setup;
use ogdl::transform::{extract_path, get_at_path};
use ogdl::{
    AbsentTarget, Environment, EvalError, Evaluator, Node, Options, PathSegment, Scalar, Value, compile_expression,
    compile_path, parse,
};
use rstest::rstest;

fn run(env: &Environment, ctx: &mut Node, text: &str) -> Result<Option<Value>, EvalError> {
    let expr = compile_expression(text).unwrap();
    Evaluator::new(env).eval_mut(ctx, &expr)
}

fn run_all(ctx: &mut Node, lines: &[&str]) {
    init_test_setup();
    let env = Environment::new();
    for line in lines {
        run(&env, ctx, line).unwrap();
    }
}

// ============================================================================
// Assignment
// ============================================================================

#[test]
fn test_assignment_sequence() {
    let mut ctx = Node::wrapper();
    run_all(&mut ctx, &["a=1", "a+=12", "a-=1", "a*=2", "a/=4", "a%=4"]);
    assert_eq!(ctx.get("a").unwrap(), Some(Value::from(2)));
    assert_eq!(ctx.to_string(), "a\n  2");
}

#[test]
fn test_assign_creates_intermediate_nodes() {
    let mut ctx = Node::wrapper();
    run_all(&mut ctx, &["config.server.port = 8080"]);
    assert_eq!(ctx.to_string(), "config\n  server\n    port\n      8080");
}

#[test]
fn test_assign_replaces_children() {
    let mut ctx = parse("a x y z").unwrap();
    run_all(&mut ctx, &["a = 'w'"]);
    assert_eq!(ctx.to_string(), "a\n  w");
}

#[test]
fn test_assign_returns_the_value() {
    let env = Environment::new();
    let mut ctx = Node::wrapper();
    assert_eq!(run(&env, &mut ctx, "x = 1 + 2"), Ok(Some(Value::from(3))));
}

#[test]
fn test_assign_subtree() {
    let mut ctx = parse("src\n  p 1\n  q 2").unwrap();
    run_all(&mut ctx, &["dst = src"]);
    assert_eq!(ctx.get_string("dst.q").unwrap().as_deref(), Some("2"));
}

#[test]
fn test_assign_through_index() {
    let mut ctx = parse("list\n  a 1\n  b 2").unwrap();
    run_all(&mut ctx, &["list[1] = 5"]);
    assert_eq!(ctx.to_string(), "list\n  a\n    1\n  b\n    5");
}

#[test]
fn test_compound_on_text_value_concatenates() {
    let mut ctx = parse("greeting hello").unwrap();
    run_all(&mut ctx, &["greeting += ' world'"]);
    assert_eq!(ctx.get_string("greeting").unwrap().as_deref(), Some("hello world"));
}

#[test]
fn test_compound_without_value_leaves_target() {
    let env = Environment::new();
    let mut ctx = parse("name bob").unwrap();
    assert_eq!(run(&env, &mut ctx, "name *= 2"), Ok(None));
    assert_eq!(ctx.to_string(), "name\n  bob");
}

// ============================================================================
// Absent targets
// ============================================================================

#[rstest]
#[case::add("b+=1", "b", Value::from(1))]
#[case::subtract("c-=1", "c", Value::from(-1))]
#[case::multiply("d*=1", "d", Value::from(0))]
#[case::divide("e/=1", "e", Value::from("infinity"))]
#[case::modulo("f%=1", "f", Value::from("undefined"))]
fn test_absent_target_sentinels(#[case] expr: &str, #[case] target: &str, #[case] expected: Value) {
    let mut ctx = Node::wrapper();
    run_all(&mut ctx, &[expr]);
    assert_eq!(ctx.get(target).unwrap().map(Value::normalize), Some(expected));
}

#[test]
fn test_absent_target_error_policy() {
    let env = Environment::with_options(Options {
        absent_target: AbsentTarget::Error,
        ..Options::default()
    });
    let mut ctx = Node::wrapper();
    assert_eq!(
        run(&env, &mut ctx, "e /= 1"),
        Err(EvalError::AbsentTarget { operator: "/=" })
    );
    assert_eq!(
        run(&env, &mut ctx, "f %= 1"),
        Err(EvalError::AbsentTarget { operator: "%=" })
    );
    assert!(ctx.is_empty());

    // additive forms still have a neutral starting value
    assert_eq!(run(&env, &mut ctx, "g += 1"), Ok(Some(Value::from(1))));
}

// ============================================================================
// Invalid targets and contexts
// ============================================================================

#[test]
fn test_read_only_context() {
    let env = Environment::new();
    let ctx = Node::wrapper();
    let expr = compile_expression("a = 1").unwrap();
    assert_eq!(Evaluator::new(&env).eval(&ctx, &expr), Err(EvalError::ReadOnlyContext));
}

#[rstest]
#[case::literal("1 = 2")]
#[case::selector("a{0} = 1")]
#[case::call("f(1) = 2")]
fn test_invalid_assignment_target(#[case] expr: &str) {
    let env = Environment::new();
    let mut ctx = parse("a 1").unwrap();
    assert_eq!(run(&env, &mut ctx, expr), Err(EvalError::InvalidAssignmentTarget));
}

#[test]
fn test_index_out_of_range_on_assign() {
    let env = Environment::new();
    let mut ctx = parse("list\n  a").unwrap();
    assert!(matches!(run(&env, &mut ctx, "list[4] = 1"), Err(EvalError::InvalidIndex(_))));
}

// ============================================================================
// Path extraction
// ============================================================================

#[test]
fn test_extract_path() {
    let env = Environment::new();
    let ev = Evaluator::new(&env);
    let root = parse("k name\ni 1").unwrap();

    let path = extract_path(&ev, &root, &compile_path("user.(k)[i]").unwrap()).unwrap();
    assert_eq!(
        path,
        vec![
            PathSegment::Field("user".into()),
            PathSegment::Field("name".into()),
            PathSegment::Index(1),
        ]
    );
}

#[test]
fn test_get_at_path() {
    let root = parse("a\n  b\n  c 7").unwrap();
    let path = vec![PathSegment::Field("a".into()), PathSegment::Index(1)];
    let node = get_at_path(&root, &path).unwrap();
    assert_eq!(node.child_at(0).and_then(Node::content), Some(&Scalar::from("7")));
    assert!(get_at_path(&root, &[PathSegment::Field("z".into())]).is_none());
}
