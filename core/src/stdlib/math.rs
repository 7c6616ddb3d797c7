//! The `math` library.
//!
//! Constants: pi, e, tau, inf, nan
//! Functions: ceil, floor, trunc, sqrt, exp, log, log2, log10, pow, fabs, fmod,
//!            isclose, isfinite, isinf, isnan, gcd, factorial, sin, cos, tan,
//!            degrees, radians, hypot
//!
//! Domain errors raise `ValueError("math domain error")` and results too large
//! for a float raise `OverflowError("math range error")`, as CPython does.

use crate::{
    evaluator::{RuntimeError, operators::int_overflow},
    stdlib::{BuiltinFn, constructors::float_to_int, float_arg, index_arg, native},
    values::{Args, Value},
};

pub(super) fn member(name: &str) -> Option<Value> {
    let constant = |f: f64| Some(Value::Float(f));
    let (name, func): (&'static str, BuiltinFn) = match name {
        "pi" => return constant(std::f64::consts::PI),
        "e" => return constant(std::f64::consts::E),
        "tau" => return constant(std::f64::consts::TAU),
        "inf" => return constant(f64::INFINITY),
        "nan" => return constant(f64::NAN),
        "ceil" => ("ceil", math_ceil),
        "floor" => ("floor", math_floor),
        "trunc" => ("trunc", math_trunc),
        "sqrt" => ("sqrt", math_sqrt),
        "exp" => ("exp", math_exp),
        "log" => ("log", math_log),
        "log2" => ("log2", math_log2),
        "log10" => ("log10", math_log10),
        "pow" => ("pow", math_pow),
        "fabs" => ("fabs", math_fabs),
        "fmod" => ("fmod", math_fmod),
        "isclose" => ("isclose", math_isclose),
        "isfinite" => ("isfinite", math_isfinite),
        "isinf" => ("isinf", math_isinf),
        "isnan" => ("isnan", math_isnan),
        "gcd" => ("gcd", math_gcd),
        "factorial" => ("factorial", math_factorial),
        "sin" => ("sin", math_sin),
        "cos" => ("cos", math_cos),
        "tan" => ("tan", math_tan),
        "degrees" => ("degrees", math_degrees),
        "radians" => ("radians", math_radians),
        "hypot" => ("hypot", math_hypot),
        _ => return None,
    };
    Some(native(name, func))
}

fn domain_error() -> RuntimeError {
    RuntimeError::value_error("math domain error")
}

fn range_error() -> RuntimeError {
    RuntimeError::overflow("math range error")
}

/// The single float argument of `math.<name>`.
fn one_float(name: &str, args: &Args) -> Result<f64, RuntimeError> {
    args.check(name, 1, 1)?;
    float_arg(&args.positional[0])
}

/// Wraps a float result, turning an overflow from finite input into an error.
fn finite(input: f64, result: f64) -> Result<Value, RuntimeError> {
    if result.is_nan() && !input.is_nan() {
        return Err(domain_error());
    }
    if result.is_infinite() && input.is_finite() {
        return Err(range_error());
    }
    Ok(Value::Float(result))
}

// ============================================================================
// Rounding
// ============================================================================

/// Applies `op` to a float, keeping ints as they are.
fn round_with(name: &str, args: Args, op: fn(f64) -> f64) -> Result<Value, RuntimeError> {
    args.check(name, 1, 1)?;
    match &args.positional[0] {
        v @ (Value::Int(_) | Value::Bool(_)) => Ok(Value::Int(v.as_int().unwrap_or(0))),
        other => float_to_int(op(float_arg(other)?)).map(Value::Int),
    }
}

fn math_ceil(args: Args) -> Result<Value, RuntimeError> {
    round_with("ceil", args, f64::ceil)
}

fn math_floor(args: Args) -> Result<Value, RuntimeError> {
    round_with("floor", args, f64::floor)
}

fn math_trunc(args: Args) -> Result<Value, RuntimeError> {
    round_with("trunc", args, f64::trunc)
}

// ============================================================================
// Powers and logarithms
// ============================================================================

fn math_sqrt(args: Args) -> Result<Value, RuntimeError> {
    let x = one_float("sqrt", &args)?;
    if x < 0.0 {
        return Err(domain_error());
    }
    Ok(Value::Float(x.sqrt()))
}

fn math_exp(args: Args) -> Result<Value, RuntimeError> {
    let x = one_float("exp", &args)?;
    finite(x, x.exp())
}

/// Logarithm of a positive number. Ints go through `f64`, which is exact
/// enough for the `i64` range.
fn positive_log(value: &Value, log: fn(f64) -> f64) -> Result<f64, RuntimeError> {
    let x = float_arg(value)?;
    if x <= 0.0 {
        return Err(domain_error());
    }
    Ok(log(x))
}

fn math_log(args: Args) -> Result<Value, RuntimeError> {
    args.check("log", 1, 2)?;
    let num = positive_log(&args.positional[0], f64::ln)?;
    match args.positional.get(1) {
        None => Ok(Value::Float(num)),
        Some(base) => {
            let den = positive_log(base, f64::ln)?;
            if den == 0.0 {
                return Err(RuntimeError::zero_division("float division by zero"));
            }
            Ok(Value::Float(num / den))
        }
    }
}

fn math_log2(args: Args) -> Result<Value, RuntimeError> {
    args.check("log2", 1, 1)?;
    positive_log(&args.positional[0], f64::log2).map(Value::Float)
}

fn math_log10(args: Args) -> Result<Value, RuntimeError> {
    args.check("log10", 1, 1)?;
    positive_log(&args.positional[0], f64::log10).map(Value::Float)
}

fn math_pow(args: Args) -> Result<Value, RuntimeError> {
    args.check("pow", 2, 2)?;
    let x = float_arg(&args.positional[0])?;
    let y = float_arg(&args.positional[1])?;
    if x == 0.0 && y < 0.0 && y.is_finite() {
        return Err(domain_error());
    }
    if x < 0.0 && x.is_finite() && y.is_finite() && y.fract() != 0.0 {
        return Err(domain_error());
    }
    let r = x.powf(y);
    if r.is_infinite() && x.is_finite() && y.is_finite() {
        return Err(range_error());
    }
    Ok(Value::Float(r))
}

// ============================================================================
// Float helpers
// ============================================================================

fn math_fabs(args: Args) -> Result<Value, RuntimeError> {
    Ok(Value::Float(one_float("fabs", &args)?.abs()))
}

fn math_fmod(args: Args) -> Result<Value, RuntimeError> {
    args.check("fmod", 2, 2)?;
    let x = float_arg(&args.positional[0])?;
    let y = float_arg(&args.positional[1])?;
    if y == 0.0 && !x.is_nan() || x.is_infinite() {
        return Err(domain_error());
    }
    Ok(Value::Float(x % y))
}

/// `isclose(a, b, *, rel_tol=1e-09, abs_tol=0.0)`
fn math_isclose(mut args: Args) -> Result<Value, RuntimeError> {
    let rel_tol = args.take_keyword("rel_tol");
    let abs_tol = args.take_keyword("abs_tol");
    args.finish("isclose")?;
    args.check_positional("isclose", 2, 2)?;
    let a = float_arg(&args.positional[0])?;
    let b = float_arg(&args.positional[1])?;
    let rel_tol = rel_tol.as_ref().map_or(Ok(1e-9), float_arg)?;
    let abs_tol = abs_tol.as_ref().map_or(Ok(0.0), float_arg)?;
    if rel_tol < 0.0 || abs_tol < 0.0 {
        return Err(RuntimeError::value_error("tolerances must be non-negative"));
    }
    if a == b {
        return Ok(Value::Bool(true));
    }
    if a.is_infinite() || b.is_infinite() {
        return Ok(Value::Bool(false));
    }
    let diff = (b - a).abs();
    Ok(Value::Bool(
        diff <= (rel_tol * b).abs() || diff <= (rel_tol * a).abs() || diff <= abs_tol,
    ))
}

fn math_isfinite(args: Args) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(one_float("isfinite", &args)?.is_finite()))
}

fn math_isinf(args: Args) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(one_float("isinf", &args)?.is_infinite()))
}

fn math_isnan(args: Args) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(one_float("isnan", &args)?.is_nan()))
}

// ============================================================================
// Integer functions
// ============================================================================

fn math_gcd(args: Args) -> Result<Value, RuntimeError> {
    args.no_keywords("gcd")?;
    let mut acc: u64 = 0;
    for value in &args.positional {
        let mut b = index_arg(value)?.unsigned_abs();
        let mut a = acc;
        while b != 0 {
            (a, b) = (b, a % b);
        }
        acc = a;
    }
    i64::try_from(acc).map(Value::Int).map_err(|_| int_overflow())
}

fn math_factorial(args: Args) -> Result<Value, RuntimeError> {
    args.check("factorial", 1, 1)?;
    let n = index_arg(&args.positional[0])?;
    if n < 0 {
        return Err(RuntimeError::value_error(
            "factorial() not defined for negative values",
        ));
    }
    (1..=n)
        .try_fold(1i64, |acc, k| acc.checked_mul(k))
        .map(Value::Int)
        .ok_or_else(int_overflow)
}

// ============================================================================
// Trigonometry and angles
// ============================================================================

fn math_sin(args: Args) -> Result<Value, RuntimeError> {
    let x = one_float("sin", &args)?;
    finite(x, x.sin())
}

fn math_cos(args: Args) -> Result<Value, RuntimeError> {
    let x = one_float("cos", &args)?;
    finite(x, x.cos())
}

fn math_tan(args: Args) -> Result<Value, RuntimeError> {
    let x = one_float("tan", &args)?;
    finite(x, x.tan())
}

fn math_degrees(args: Args) -> Result<Value, RuntimeError> {
    Ok(Value::Float(one_float("degrees", &args)?.to_degrees()))
}

fn math_radians(args: Args) -> Result<Value, RuntimeError> {
    Ok(Value::Float(one_float("radians", &args)?.to_radians()))
}

fn math_hypot(args: Args) -> Result<Value, RuntimeError> {
    args.no_keywords("hypot")?;
    let mut acc = 0.0f64;
    for value in &args.positional {
        acc = acc.hypot(float_arg(value)?);
    }
    Ok(Value::Float(acc))
}

#[cfg(test)]
#[path = "math_test.rs"]
mod math_test;
