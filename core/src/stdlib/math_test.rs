//! Tests for the `math` library.

use super::member;
use crate::api::{self, Context, Error, ErrorKind};
use crate::values::Value;
use pretty_assertions::assert_eq;

fn eval(source: &str) -> Result<Value, Error> {
    api::eval(source, &Context::new())
}

fn repr(source: &str) -> String {
    eval(source)
        .unwrap_or_else(|e| panic!("evaluation should succeed for: {source}\nError: {e}"))
        .repr()
}

fn message(source: &str) -> String {
    match eval(source) {
        Ok(value) => panic!("expected {source} to fail, got {}", value.repr()),
        Err(err) => err.to_string(),
    }
}

#[test]
fn test_members_exist() {
    for name in ["pi", "e", "tau", "inf", "nan", "sqrt", "gcd", "hypot"] {
        assert!(member(name).is_some(), "math.{name} should exist");
    }
    assert!(member("__name__").is_none());
    assert!(member("frexp").is_none());
}

#[test]
fn test_constants() {
    assert_eq!(repr("math.pi"), "3.141592653589793");
    assert_eq!(repr("math.e"), "2.718281828459045");
    assert_eq!(repr("math.tau"), "6.283185307179586");
    assert_eq!(repr("math.inf"), "inf");
    assert_eq!(repr("math.nan == math.nan"), "False");
}

#[test]
fn test_rounding() {
    assert_eq!(repr("math.ceil(1.2)"), "2");
    assert_eq!(repr("math.floor(-1.2)"), "-2");
    assert_eq!(repr("math.trunc(-1.7)"), "-1");
    assert_eq!(repr("math.floor(5)"), "5");
    assert_eq!(
        message("math.ceil(math.inf)"),
        "cannot convert float infinity to integer"
    );
    assert_eq!(message("math.floor('a')"), "must be real number, not str");
}

#[test]
fn test_powers_and_logs() {
    assert_eq!(repr("math.sqrt(16)"), "4.0");
    assert_eq!(repr("math.exp(0)"), "1.0");
    assert_eq!(repr("math.log(math.e)"), "1.0");
    assert_eq!(repr("math.log(8, 2)"), "3.0");
    assert_eq!(repr("math.log2(1024)"), "10.0");
    assert_eq!(repr("math.log10(1000)"), "3.0");
    assert_eq!(repr("math.pow(2, 0.5) == math.sqrt(2)"), "True");
}

#[test]
fn test_domain_and_range_errors() {
    let err = eval("math.sqrt(-1)").unwrap_err();
    assert_eq!(err.exception(), "ValueError");
    assert_eq!(err.to_string(), "math domain error");
    assert_eq!(message("math.log(0)"), "math domain error");
    assert_eq!(message("math.log(10, 1)"), "float division by zero");
    assert_eq!(message("math.pow(-8, 0.5)"), "math domain error");
    assert_eq!(message("math.pow(0, -1)"), "math domain error");

    let err = eval("math.exp(1000)").unwrap_err();
    assert_eq!(err.exception(), "OverflowError");
    assert_eq!(err.kind(), ErrorKind::RuntimeType);
    assert_eq!(err.to_string(), "math range error");
}

#[test]
fn test_float_helpers() {
    assert_eq!(repr("math.fabs(-3)"), "3.0");
    assert_eq!(repr("math.fmod(-7, 3)"), "-1.0");
    assert_eq!(repr("math.isclose(0.1 + 0.2, 0.3)"), "True");
    assert_eq!(repr("math.isclose(1, 1.1)"), "False");
    assert_eq!(repr("math.isclose(1, 1.1, abs_tol=0.2)"), "True");
    assert_eq!(repr("math.isfinite(1e308)"), "True");
    assert_eq!(repr("math.isinf(-math.inf)"), "True");
    assert_eq!(repr("math.isnan(math.nan)"), "True");
    assert_eq!(message("math.fmod(1, 0)"), "math domain error");
    assert_eq!(
        message("math.isclose(1, 2, rel_tol=-1)"),
        "tolerances must be non-negative"
    );
}

#[test]
fn test_integer_functions() {
    assert_eq!(repr("math.gcd(12, 18)"), "6");
    assert_eq!(repr("math.gcd(-4, 6, 10)"), "2");
    assert_eq!(repr("math.gcd()"), "0");
    assert_eq!(repr("math.factorial(0)"), "1");
    assert_eq!(repr("math.factorial(20)"), "2432902008176640000");
    assert_eq!(message("math.factorial(21)"), "integer overflow");
    assert_eq!(
        message("math.factorial(-1)"),
        "factorial() not defined for negative values"
    );
    assert_eq!(
        message("math.gcd(1.5)"),
        "'float' object cannot be interpreted as an integer"
    );
}

#[test]
fn test_trigonometry() {
    assert_eq!(repr("math.sin(0)"), "0.0");
    assert_eq!(repr("math.cos(0)"), "1.0");
    assert_eq!(repr("math.degrees(math.pi)"), "180.0");
    assert_eq!(repr("math.radians(180) == math.pi"), "True");
    assert_eq!(repr("math.hypot(3, 4)"), "5.0");
    assert_eq!(repr("math.hypot()"), "0.0");
    assert_eq!(message("math.sin(math.inf)"), "math domain error");
}

#[test]
fn test_private_members_are_rejected() {
    let err = eval("math.__dict__").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NamingPolicy);
    let err = eval("math.frexp").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert_eq!(err.to_string(), "module 'math' has no attribute 'frexp'");
}
