/*
 * End-to-end evaluation tests
 *
 * Expressions evaluated through the public facade against the shared
 * response fixture.
 */

#[macro_use]
mod cases;

use sandeval::{Context, Engine, EngineOptions, ErrorKind, Value};

// ============================================================================
// Basics
// ============================================================================

test_case! {
    name: int_addition,
    input: "3 + 2",
    value: "5",
}

test_case! {
    name: string_concatenation,
    input: "\"a\" + \"b\"",
    value: "'ab'",
}

#[test]
fn juxtaposed_numbers_are_a_syntax_error() {
    let err = cases::eval("3 2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.exception(), "SyntaxError");
    assert!(err.message().ends_with("found '2'"), "{}", err.message());
}

test_case! {
    name: str_plus_int,
    input: "\"a\" + 2",
    error: RuntimeType,
    message: "can only concatenate str (not \"int\") to str",
}

test_case! {
    name: str_minus_int,
    input: "'a' - 2",
    error: RuntimeType,
    message: "unsupported operand type(s) for -: 'str' and 'int'",
}

// ============================================================================
// Context names
// ============================================================================

test_case! {
    name: context_name_in_expression,
    input: "a + 2",
    value: "5",
}

test_case! {
    name: context_name_alone,
    input: "a",
    value: "3",
}

test_case! {
    name: unknown_name,
    input: "b",
    error: NameResolution,
    message: "name 'b' is not defined",
}

#[test]
fn policy_names_need_no_context() {
    let empty = Context::new();
    assert_eq!(sandeval::eval("len('abc')", &empty).unwrap(), Value::Int(3));
    assert_eq!(sandeval::eval("math.floor(2.5)", &empty).unwrap(), Value::Int(2));
    assert_eq!(sandeval::eval("True", &empty).unwrap(), Value::Bool(true));
}

// ============================================================================
// Response assertions
// ============================================================================

test_case! {
    name: json_field_equality,
    input: "resp.json()[\"name\"] == \"jon\"",
    value: "True",
}

test_case! {
    name: nested_json_lookup,
    input: "resp.json()[\"config\"][\"a\"]",
    value: "4",
}

test_case! {
    name: json_null_and_bool,
    input: "resp.json()['config']['b']",
    value: "[True, None]",
}

test_case! {
    name: sum_of_json_list,
    input: "sum(resp.json()[\"values\"])",
    value: "10",
}

test_case! {
    name: plain_attribute,
    input: "resp.url",
    value: "'http://example.com/users/1'",
}

test_case! {
    name: nested_attribute,
    input: "resp.data.node",
    value: "'leaf'",
}

test_case! {
    name: status_check,
    input: "resp.status == 200 and resp.url.endswith('/1')",
    value: "True",
}

test_case! {
    name: missing_json_key,
    input: "resp.json()['missing']",
    error: Lookup,
    message: "'missing'",
}

test_case! {
    name: missing_attribute,
    input: "resp.headers",
    error: Lookup,
    message: "'Response' object has no attribute 'headers'",
}

test_case! {
    name: generator_over_context_range,
    input: "sum(i % 2 for i in values)",
    value: "277",
}

test_case! {
    name: membership_in_json_list,
    input: "'x' in resp.json()['tags'] and 5 not in resp.json()['values']",
    value: "True",
}

// ============================================================================
// Sequences and formatting
// ============================================================================

test_case! {
    name: list_repetition,
    input: "[0] * 3 + [1, 2] * 2",
    value: "[0, 0, 0, 1, 2, 1, 2]",
}

test_case! {
    name: tuple_repetition_on_the_right,
    input: "3 * (1,)",
    value: "(1, 1, 1)",
}

test_case! {
    name: negative_repetition_is_empty,
    input: "[1] * -1",
    value: "[]",
}

test_case! {
    name: percent_format_single_value,
    input: "'%s-%d' % ('a', 1) + '%s' % 1",
    value: "'a-11'",
}

test_case! {
    name: percent_format_from_json_mapping,
    input: "'hello %(name)s' % resp.json()",
    value: "'hello jon'",
}

test_case! {
    name: percent_format_missing_argument,
    input: "'%s %s' % 'a'",
    error: RuntimeType,
    message: "not enough arguments for format string",
}

test_case! {
    name: index_into_range_longer_than_i64_max,
    input: "range(-2**62 * 2, (2**62 - 1) * 2 + 1)[5]",
    value: "-9223372036854775803",
}

#[test]
fn deeply_chained_comprehension_fails_cleanly() {
    let clauses = " for a in [1]".repeat(500);
    let err = cases::eval(&format!("[1{}]", clauses)).unwrap_err();
    assert_eq!(err.exception(), "RecursionError");
}

// ============================================================================
// Compile once, evaluate many
// ============================================================================

#[test]
fn compiled_expression_is_reusable() {
    let compiled = sandeval::compile("a * 2").unwrap();
    for n in 0..5 {
        let context = Context::new().with("a", n);
        assert_eq!(sandeval::evaluate(&compiled, &context).unwrap(), Value::Int(n * 2));
    }
}

#[test]
fn evaluation_is_idempotent() {
    let compiled = sandeval::compile("resp.json()['config']['a'] + a").unwrap();
    let context = cases::context();
    let first = compiled.run(&context).unwrap();
    let second = compiled.run(&context).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, Value::Int(7));
}

#[test]
fn compilation_is_idempotent() {
    let first = sandeval::compile("[x for x in 'ab']").unwrap();
    let second = sandeval::compile("[x for x in 'ab']").unwrap();
    assert_eq!(first.expr(), second.expr());
    assert_eq!(first.source(), "[x for x in 'ab']");
}

#[test]
fn failed_evaluation_does_not_poison_the_expression() {
    let compiled = sandeval::compile("10 // a").unwrap();
    let err = compiled.run(&Context::new().with("a", 0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RuntimeType);
    assert_eq!(err.exception(), "ZeroDivisionError");
    assert_eq!(compiled.run(&Context::new().with("a", 5)).unwrap(), Value::Int(2));
}

#[test]
fn engine_can_be_shared_across_threads() {
    let engine = std::sync::Arc::new(Engine::new(EngineOptions::default()));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                let context = Context::new().with("n", i);
                engine.eval("n * n", &context).map(|v| v.repr())
            })
        })
        .collect();
    let results: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    assert_eq!(results, ["0", "1", "4", "9"]);
}

// ============================================================================
// Errors carry their location
// ============================================================================

#[test]
fn runtime_error_span_points_at_node() {
    let source = "a + resp.nope";
    let err = cases::eval(source).unwrap_err();
    let span = err.span().unwrap();
    assert_eq!(&source[span.0.clone()], "resp.nope");
    assert_eq!(err.src(), source);
}

#[test]
fn rendered_error_shows_source() {
    let err = cases::eval("1 + 'x'").unwrap_err();
    let rendered = sandeval::render_error_to_string_no_color(&err);
    assert!(rendered.contains("[R004] Error: TypeError: unsupported operand type(s) for +: 'int' and 'str'"));
    assert!(rendered.contains("1 + 'x'"));
    assert!(rendered.contains("runtime error"));
}
