/*
 * Forbidden calls, private names and invalid contexts
 *
 * Everything here must fail before (or instead of) touching any value.
 */

#[macro_use]
mod cases;

use sandeval::{Context, ErrorKind, NativeFunction, Value, values::Args};
use std::cell::Cell;
use std::rc::Rc;

// ============================================================================
// Forbidden calls are syntax errors
// ============================================================================

test_case! {
    name: exec_call,
    input: "exec(\"3\")",
    error: Syntax,
    message: "Exec calls are not allowed.",
}

test_case! {
    name: exec_call_behind_short_circuit,
    input: "False or exec(\"3\")",
    error: Syntax,
    message: "Exec calls are not allowed.",
}

test_case! {
    name: eval_call,
    input: "eval(\"3 + 4\")",
    error: Syntax,
    message: "Eval calls are not allowed.",
}

test_case! {
    name: eval_call_behind_short_circuit,
    input: "False or eval(\"3 + 4\")",
    error: Syntax,
    message: "Eval calls are not allowed.",
}

test_case! {
    name: exec_call_inside_comprehension,
    input: "[exec(x) for x in ['1']]",
    error: Syntax,
    message: "Exec calls are not allowed.",
}

test_case! {
    name: exec_call_in_untaken_branch,
    input: "1 if True else eval('2')",
    error: Syntax,
    message: "Eval calls are not allowed.",
}

#[test]
fn forbidden_call_is_rejected_before_evaluation() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let probe = NativeFunction::new("probe", move |args: Args| {
        args.check("probe", 0, 0)?;
        counter.set(counter.get() + 1);
        Ok(Value::Bool(true))
    });
    let context = Context::new().with("probe", probe);

    let err = sandeval::eval("probe() and exec('1')", &context).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(calls.get(), 0);

    sandeval::eval("probe()", &context).unwrap();
    assert_eq!(calls.get(), 1);
}

// ============================================================================
// Dangerous names are simply undefined
// ============================================================================

test_case! {
    name: exec_name,
    input: "exec",
    error: NameResolution,
    message: "name 'exec' is not defined",
}

test_case! {
    name: eval_name,
    input: "eval",
    error: NameResolution,
    message: "name 'eval' is not defined",
}

test_case! {
    name: compile_name,
    input: "compile",
    error: NameResolution,
    message: "name 'compile' is not defined",
}

test_case! {
    name: exit_name,
    input: "exit",
    error: NameResolution,
    message: "name 'exit' is not defined",
}

test_case! {
    name: exit_call,
    input: "exit()",
    error: NameResolution,
    message: "name 'exit' is not defined",
}

test_case! {
    name: open_call,
    input: "open('/etc/passwd').read()",
    error: NameResolution,
    message: "name 'open' is not defined",
}

test_case! {
    name: getattr_call,
    input: "getattr(resp, 'url')",
    error: NameResolution,
    message: "name 'getattr' is not defined",
}

test_case! {
    name: passing_a_forbidden_name_is_not_a_call_of_it,
    input: "len(eval)",
    error: NameResolution,
    message: "name 'eval' is not defined",
}

// ============================================================================
// Private names
// ============================================================================

test_case! {
    name: private_attribute,
    input: "resp._private_property",
    error: NamingPolicy,
    message: " \"_private_property\" is an invalid attribute name because it starts with \"_\".",
}

test_case! {
    name: dunder_attribute,
    input: "resp.__dunder__",
    error: NamingPolicy,
    message: " \"__dunder__\" is an invalid attribute name because it starts with \"_\".",
}

test_case! {
    name: deep_private_attribute,
    input: "a.b.c._d",
    error: NamingPolicy,
    message: " \"_d\" is an invalid attribute name because it starts with \"_\".",
}

test_case! {
    name: class_escape,
    input: "().__class__.__bases__[0].__subclasses__()",
    error: NamingPolicy,
    message: " \"__subclasses__\" is an invalid attribute name because it starts with \"_\".",
}

test_case! {
    name: private_variable,
    input: "_x + 1",
    error: NamingPolicy,
    message: " \"_x\" is an invalid variable name because it starts with \"_\".",
}

test_case! {
    name: private_comprehension_variable,
    input: "[_ for _ in range(3)]",
    error: NamingPolicy,
    message: " \"_\" is an invalid variable name because it starts with \"_\".",
}

test_case! {
    name: guard_names_are_private,
    input: "_getattr_(resp, 'url')",
    error: NamingPolicy,
    message: " \"_getattr_\" is an invalid variable name because it starts with \"_\".",
}

test_case! {
    name: private_names_are_fine_as_data,
    input: "{'_k': 1}['_k'] + len('__class__')",
    value: "10",
}

#[test]
fn naming_violation_is_reported_before_forbidden_call_after_it() {
    // Outer nodes are checked before their operands.
    let err = cases::eval("x._y or exec('1')").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NamingPolicy);
    let err = cases::eval("exec('1') or x._y").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn private_attribute_of_host_value_is_a_syntax_error() {
    let err = cases::eval("resp.data._node").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NamingPolicy);
    assert_eq!(err.exception(), "SyntaxError");
}

// ============================================================================
// Invalid contexts
// ============================================================================

fn context_error(key: &str) -> sandeval::Error {
    let context = Context::new().with(key, 1);
    sandeval::eval("1", &context).unwrap_err()
}

#[test]
fn reserved_guard_name_in_context() {
    for key in ["_getattr_", "_getitem_", "_getiter_"] {
        let err = context_error(key);
        assert_eq!(err.kind(), ErrorKind::InvalidContext);
        assert_eq!(
            err.message(),
            format!("context key \"{key}\" is not allowed because it is reserved for the access guards.")
        );
    }
}

#[test]
fn forbidden_call_name_in_context() {
    let err = context_error("exec");
    assert_eq!(err.kind(), ErrorKind::InvalidContext);
    assert_eq!(
        err.message(),
        "context key \"exec\" is not allowed because it names a forbidden call."
    );
}

#[test]
fn policy_name_in_context() {
    for key in ["len", "math", "sorted"] {
        let err = context_error(key);
        assert_eq!(err.kind(), ErrorKind::InvalidContext, "{key}");
        assert_eq!(
            err.message(),
            format!("context key \"{key}\" is not allowed because it shadows a name provided by the policy.")
        );
    }
}

#[test]
fn private_name_in_context() {
    let err = context_error("_secret");
    assert_eq!(err.kind(), ErrorKind::InvalidContext);
    assert_eq!(
        err.message(),
        "context key \"_secret\" is not allowed because it starts with \"_\"."
    );
    assert!(err.span().is_none());
}

#[test]
fn context_is_checked_even_if_unused() {
    let context = Context::new().with("ok", 1).with("_bad", 2);
    let err = sandeval::eval("ok", &context).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidContext);
}
