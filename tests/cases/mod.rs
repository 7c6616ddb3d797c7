#![allow(dead_code)]

use once_cell::sync::Lazy;
use sandeval::{Args, Context, Error, ErrorKind, Namespace, NativeFunction, Value};
use serde_json::json;

/// Body returned by `resp.json()` in the response fixture.
pub static RESPONSE_BODY: Lazy<serde_json::Value> = Lazy::new(|| {
    json!({
        "name": "jon",
        "values": [1, 2, 3, 4],
        "config": { "a": 4, "b": [true, null] },
        "tags": ["x", "y"],
    })
});

/// A response-like host object: `url`, `status`, `data.node` and `json()`.
pub fn response() -> Value {
    let json = NativeFunction::new("json", |args: Args| {
        args.check("json", 0, 0)?;
        Ok(Value::from(&*RESPONSE_BODY))
    });
    let data = Namespace::new("Data").with("node", "leaf");
    Value::object(
        Namespace::new("Response")
            .with("url", "http://example.com/users/1")
            .with("status", 200)
            .with("data", Value::object(data))
            .with("json", json)
            .with("_private_property", "hidden"),
    )
}

/// The context most tests run against.
pub fn context() -> Context {
    Context::new()
        .with("resp", response())
        .with("a", 3)
        .with("values", Value::range(0, 555, 1))
}

pub fn eval(source: &str) -> Result<Value, Error> {
    sandeval::eval(source, &context())
}

pub fn check_value(source: &str, expected: &str) {
    match eval(source) {
        Ok(value) => pretty_assertions::assert_eq!(value.repr(), expected, "for: {source}"),
        Err(e) => panic!("evaluation should succeed for: {source}\nError: {e}"),
    }
}

pub fn check_error(source: &str, kind: ErrorKind, message: &str) {
    match eval(source) {
        Ok(value) => panic!("expected {source} to fail, got {}", value.repr()),
        Err(e) => {
            pretty_assertions::assert_eq!(e.kind(), kind, "for: {source}");
            pretty_assertions::assert_eq!(e.message(), message, "for: {source}");
        }
    }
}

/// Declares a test evaluating `input` against [`context`].
///
/// `value:` compares the repr of the result; `error:` the kind and message.
macro_rules! test_case {
    (name: $name:ident, input: $input:expr, value: $value:expr $(,)?) => {
        #[test]
        fn $name() {
            $crate::cases::check_value($input, $value);
        }
    };
    (name: $name:ident, input: $input:expr, error: $kind:ident, message: $message:expr $(,)?) => {
        #[test]
        fn $name() {
            $crate::cases::check_error($input, sandeval::ErrorKind::$kind, $message);
        }
    };
}
