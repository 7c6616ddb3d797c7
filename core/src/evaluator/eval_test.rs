//! Unit tests for the evaluator.

use super::*;
use crate::{
    guards::PolicyGuard,
    parser,
    test_utils::init_test_logging,
    values::{Args, NativeFunction, Namespace},
};
use pretty_assertions::assert_eq;

fn run_in(source: &str, context: &[(&str, Value)]) -> Result<Value, ExecutionError> {
    let policy = Policy::standard();
    let expr = parser::parse(source).expect("parsing failed");
    let context: HashMap<String, Value> = context
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    eval(&expr, &PolicyGuard::new(&policy), &policy, &context)
}

fn run(source: &str) -> Result<Value, ExecutionError> {
    run_in(source, &[])
}

fn repr(source: &str) -> String {
    run(source).unwrap().repr()
}

fn error(source: &str) -> RuntimeError {
    run(source).unwrap_err().error
}

fn message(source: &str) -> String {
    error(source).to_string()
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_literals() {
    assert_eq!(run("42").unwrap(), Value::Int(42));
    assert_eq!(run("-42").unwrap(), Value::Int(-42));
    assert_eq!(run("3.5").unwrap(), Value::Float(3.5));
    assert_eq!(run("True").unwrap(), Value::Bool(true));
    assert_eq!(run("None").unwrap(), Value::None);
    assert_eq!(repr("'hello'"), "'hello'");
    assert_eq!(repr("b'\\x00ab'"), "b'\\x00ab'");
    assert_eq!(repr("2j"), "2j");
}

#[test]
fn test_containers() {
    assert_eq!(repr("[1, 'a', None]"), "[1, 'a', None]");
    assert_eq!(repr("(1,)"), "(1,)");
    assert_eq!(repr("()"), "()");
    assert_eq!(repr("{'a': 1, 'b': [2]}"), "{'a': 1, 'b': [2]}");
    assert_eq!(repr("{1, 1, 1}"), "{1}");
    // Later duplicate keys win, first position is kept.
    assert_eq!(repr("{'a': 1, 'b': 2, 'a': 3}"), "{'a': 3, 'b': 2}");
}

#[test]
fn test_unhashable_key() {
    assert_eq!(message("{[1]: 2}"), "unhashable type: 'list'");
    assert_eq!(message("{[1]}"), "unhashable type: 'list'");
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_int_arithmetic() {
    assert_eq!(run("3 + 2").unwrap(), Value::Int(5));
    assert_eq!(run("10 - 4 - 3").unwrap(), Value::Int(3));
    assert_eq!(run("2 + 3 * 4").unwrap(), Value::Int(14));
    assert_eq!(run("7 // 2").unwrap(), Value::Int(3));
    assert_eq!(run("-7 // 2").unwrap(), Value::Int(-4));
    assert_eq!(run("-7 % 3").unwrap(), Value::Int(2));
    assert_eq!(run("2 ** 10").unwrap(), Value::Int(1024));
    assert_eq!(run("2 ** 3 ** 2").unwrap(), Value::Int(512));
    assert_eq!(run("-2 ** 2").unwrap(), Value::Int(-4));
    assert_eq!(run("1 << 4 | 1").unwrap(), Value::Int(17));
}

#[test]
fn test_true_division_is_float() {
    assert_eq!(run("7 / 2").unwrap(), Value::Float(3.5));
    assert_eq!(run("6 / 2").unwrap(), Value::Float(3.0));
    assert_eq!(run("2 ** -1").unwrap(), Value::Float(0.5));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(message("1 / 0"), "division by zero");
    assert_eq!(message("1 % 0"), "integer modulo by zero");
    assert!(matches!(error("1.0 / 0"), RuntimeError::ZeroDivision(_)));
}

#[test]
fn test_integer_overflow() {
    assert_eq!(message("9223372036854775807 + 1"), "integer overflow");
    assert_eq!(message("2 ** 64"), "integer overflow");
}

#[test]
fn test_string_operators() {
    assert_eq!(repr("'a' + 'b'"), "'ab'");
    assert_eq!(repr("'ab' * 3"), "'ababab'");
    assert_eq!(repr("[0] * 3"), "[0, 0, 0]");
    assert_eq!(
        message("'a' + 2"),
        "can only concatenate str (not \"int\") to str"
    );
    assert_eq!(
        message("'a' - 2"),
        "unsupported operand type(s) for -: 'str' and 'int'"
    );
}

#[test]
fn test_long_binary_chain_does_not_recurse() {
    let source = vec!["1"; 5000].join(" + ");
    let policy = Policy::standard();
    let expr = parser::parse_with_limits(&source, 100, 10_000).unwrap();
    let result = eval(&expr, &PolicyGuard::new(&policy), &policy, &HashMap::new());
    assert_eq!(result.unwrap(), Value::Int(5000));
}

// ============================================================================
// Boolean logic and comparisons
// ============================================================================

#[test]
fn test_boolean_operators_return_operands() {
    assert_eq!(run("0 or 'x'").unwrap(), Value::from("x"));
    assert_eq!(run("1 and []").unwrap().repr(), "[]");
    assert_eq!(run("not 0").unwrap(), Value::Bool(true));
}

#[test]
fn test_short_circuit_skips_errors() {
    assert_eq!(run("False and 1 / 0").unwrap(), Value::Bool(false));
    assert_eq!(run("True or undefined").unwrap(), Value::Bool(true));
    assert_eq!(run("1 if True else 1 / 0").unwrap(), Value::Int(1));
}

#[test]
fn test_comparisons() {
    assert_eq!(run("1 < 2 < 3").unwrap(), Value::Bool(true));
    assert_eq!(run("1 < 3 < 2").unwrap(), Value::Bool(false));
    assert_eq!(run("1 == 1.0").unwrap(), Value::Bool(true));
    assert_eq!(run("'a' in 'cat'").unwrap(), Value::Bool(true));
    assert_eq!(run("3 not in [1, 2]").unwrap(), Value::Bool(true));
    assert_eq!(run("None is None").unwrap(), Value::Bool(true));
    assert_eq!(run("[1, 2] < [1, 3]").unwrap(), Value::Bool(true));
    assert_eq!(
        message("1 < 'a'"),
        "'<' not supported between instances of 'int' and 'str'"
    );
}

#[test]
fn test_chain_stops_at_first_false() {
    // The right operand of a failed link is never evaluated.
    assert_eq!(run("2 < 1 < undefined").unwrap(), Value::Bool(false));
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_context_names() {
    let context = [("a", Value::Int(3))];
    assert_eq!(run_in("a + 2", &context).unwrap(), Value::Int(5));
    assert_eq!(run_in("a", &context).unwrap(), Value::Int(3));
    let err = run_in("b", &context).unwrap_err();
    assert_eq!(err.error.to_string(), "name 'b' is not defined");
    assert_eq!(err.span, parser::Span(0..1));
}

#[test]
fn test_policy_names() {
    assert_eq!(run("len").unwrap().repr(), "<built-in function len>");
    assert_eq!(run("int").unwrap().repr(), "<class 'int'>");
    assert_eq!(run("math").unwrap().repr(), "<module 'math'>");
    for name in ["exec", "eval", "compile", "exit", "open", "__import__"] {
        assert!(
            matches!(error(name), RuntimeError::NameNotDefined { .. }),
            "{name} should not resolve"
        );
    }
}

// ============================================================================
// Attributes, subscripts, calls
// ============================================================================

fn response() -> Value {
    let data = Namespace::new("Data").with("node", "leaf");
    let json = NativeFunction::new("json", |args: Args| {
        args.check("json", 0, 0)?;
        Value::dict([(Value::from("name"), Value::from("jon"))])
    });
    Value::object(
        Namespace::new("Response")
            .with("url", "http://example.com")
            .with("data", Value::object(data))
            .with("json", json)
            .with("_secret", 1),
    )
}

#[test]
fn test_host_object_access() {
    init_test_logging();
    let context = [("resp", response())];
    assert_eq!(
        run_in("resp.url", &context).unwrap(),
        Value::from("http://example.com")
    );
    assert_eq!(run_in("resp.data.node", &context).unwrap(), Value::from("leaf"));
    assert_eq!(
        run_in("resp.json()['name'] == 'jon'", &context).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn test_guard_rejects_private_attribute_at_runtime() {
    let context = [("resp", response())];
    let err = run_in("resp._secret", &context).unwrap_err();
    assert!(matches!(err.error, RuntimeError::InvalidAttributeName { .. }));
}

#[test]
fn test_missing_attribute_and_key() {
    let context = [("resp", response())];
    assert_eq!(
        run_in("resp.status", &context).unwrap_err().error.to_string(),
        "'Response' object has no attribute 'status'"
    );
    assert_eq!(message("{'a': 1}['b']"), "'b'");
    assert_eq!(message("[1][3]"), "list index out of range");
}

#[test]
fn test_slicing() {
    assert_eq!(repr("[1, 2, 3, 4][1:3]"), "[2, 3]");
    assert_eq!(repr("'hello'[::-1]"), "'olleh'");
    assert_eq!(repr("(1, 2, 3)[-2:]"), "(2, 3)");
    assert_eq!(repr("range(10)[2:8:2]"), "range(2, 8, 2)");
    assert_eq!(
        message("[1, 2]['a':]"),
        "slice indices must be integers or None or have an __index__ method"
    );
}

#[test]
fn test_method_calls() {
    assert_eq!(repr("'a,b'.split(',')"), "['a', 'b']");
    assert_eq!(repr("{'a': 1}.get('b', 0)"), "0");
    assert_eq!(repr("str.upper('x')"), "'X'");
}

#[test]
fn test_call_non_callable() {
    assert_eq!(message("1()"), "'int' object is not callable");
}

// ============================================================================
// Comprehensions
// ============================================================================

#[test]
fn test_list_comprehension() {
    assert_eq!(repr("[i for i in range(10)]"), "[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]");
    assert_eq!(repr("[i * i for i in range(6) if i % 2]"), "[1, 9, 25]");
    assert_eq!(
        repr("[(a, b) for a in range(2) for b in 'xy']"),
        "[(0, 'x'), (0, 'y'), (1, 'x'), (1, 'y')]"
    );
}

#[test]
fn test_other_comprehensions() {
    assert_eq!(repr("{k: v for k, v in [('a', 1), ('b', 2)]}"), "{'a': 1, 'b': 2}");
    assert_eq!(repr("sorted({x % 3 for x in range(10)})"), "[0, 1, 2]");
    assert_eq!(repr("sum(i % 2 for i in range(555))"), "277");
    assert_eq!(repr("(x for x in [])"), "<generator object>");
}

#[test]
fn test_comprehension_scope_does_not_leak() {
    let context = [("x", Value::Int(100))];
    assert_eq!(
        run_in("[x for x in range(3)] + [x]", &context).unwrap().repr(),
        "[0, 1, 2, 100]"
    );
}

#[test]
fn test_outer_iterable_uses_enclosing_scope() {
    let context = [("x", Value::from(vec![1, 2]))];
    assert_eq!(run_in("[x for x in x]", &context).unwrap().repr(), "[1, 2]");
}

#[test]
fn test_unbound_comprehension_variable() {
    assert_eq!(
        message("[y for x in [1] if y for y in [2]]"),
        "cannot access local variable 'y' where it is not associated with a value"
    );
}

#[test]
fn test_unpacking_errors() {
    assert_eq!(
        message("[a for a, b in [1]]"),
        "cannot unpack non-iterable int object"
    );
    assert_eq!(
        message("[a for a, b in [(1,)]]"),
        "not enough values to unpack (expected 2, got 1)"
    );
    assert_eq!(
        message("[a for a, b in [(1, 2, 3)]]"),
        "too many values to unpack (expected 2)"
    );
    assert_eq!(repr("[c for a, (b, c) in [(1, (2, 3))]]"), "[3]");
}

#[test]
fn test_iterating_a_generator_twice() {
    assert_eq!(
        repr("[list(g) for g in [(x for x in [1, 2])] for i in [0, 1]]"),
        "[[1, 2], []]"
    );
}

// ============================================================================
// Limits
// ============================================================================

#[test]
fn test_depth_limit() {
    let policy = Policy::standard();
    let expr = parser::parse("[[[[[[1]]]]]]").unwrap();
    let context = HashMap::new();
    let guard = PolicyGuard::new(&policy);
    let err = eval_with_limits(&expr, &guard, &policy, &context, 4).unwrap_err();
    assert_eq!(err.error, RuntimeError::DepthExceeded { max_depth: 4 });
    assert!(eval_with_limits(&expr, &guard, &policy, &context, 10).is_ok());
}

#[test]
fn test_comprehension_clauses_count_towards_depth() {
    let source = format!("[1 {}]", "for x in [1] ".repeat(500));
    // Shallow enough to compile, but each clause nests one native frame.
    let err = error(&source);
    assert_eq!(err, RuntimeError::DepthExceeded { max_depth: DEFAULT_MAX_DEPTH });

    assert_eq!(repr(&format!("[1 {}]", "for x in [1] ".repeat(150))), "[1]");
}

#[test]
fn test_size_limit() {
    assert!(matches!(
        error("[0] * 100000000"),
        RuntimeError::SizeLimit { .. }
    ));
}
