//! Methods of `int`, `bool`, `float` and `complex`.

use crate::{
    evaluator::RuntimeError,
    values::{Args, MethodFn, Value},
};

pub(super) fn int_method(name: &str) -> Option<(&'static str, MethodFn)> {
    let entry: (&'static str, MethodFn) = match name {
        "bit_length" => ("bit_length", bit_length),
        "bit_count" => ("bit_count", bit_count),
        "conjugate" => ("conjugate", int_conjugate),
        "is_integer" => ("is_integer", always_integer),
        _ => return None,
    };
    Some(entry)
}

pub(super) fn float_method(name: &str) -> Option<(&'static str, MethodFn)> {
    let entry: (&'static str, MethodFn) = match name {
        "is_integer" => ("is_integer", float_is_integer),
        "conjugate" => ("conjugate", float_conjugate),
        _ => return None,
    };
    Some(entry)
}

pub(super) fn complex_method(name: &str) -> Option<(&'static str, MethodFn)> {
    let entry: (&'static str, MethodFn) = match name {
        "conjugate" => ("conjugate", complex_conjugate),
        _ => return None,
    };
    Some(entry)
}

fn int(receiver: &Value) -> i64 {
    receiver.as_int().unwrap_or(0)
}

fn bit_length(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("bit_length", 0, 0)?;
    let n = int(receiver).unsigned_abs();
    Ok(Value::Int((u64::BITS - n.leading_zeros()) as i64))
}

fn bit_count(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("bit_count", 0, 0)?;
    Ok(Value::Int(int(receiver).unsigned_abs().count_ones() as i64))
}

/// `True.conjugate()` is the int `1`.
fn int_conjugate(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("conjugate", 0, 0)?;
    Ok(Value::Int(int(receiver)))
}

fn always_integer(_receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("is_integer", 0, 0)?;
    Ok(Value::Bool(true))
}

fn float_is_integer(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("is_integer", 0, 0)?;
    let f = receiver.as_float().unwrap_or(0.0);
    Ok(Value::Bool(f.is_finite() && f.fract() == 0.0))
}

fn float_conjugate(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("conjugate", 0, 0)?;
    Ok(receiver.clone())
}

fn complex_conjugate(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("conjugate", 0, 0)?;
    match receiver {
        Value::Complex { re, im } => Ok(Value::complex(*re, -im)),
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn call(receiver: Value, name: &str) -> Value {
        let method = crate::stdlib::methods::attribute(&receiver, name).unwrap();
        crate::stdlib::call(&method, Args::default()).unwrap()
    }

    #[test]
    fn test_int_methods() {
        assert_eq!(call(Value::Int(255), "bit_length"), Value::Int(8));
        assert_eq!(call(Value::Int(-8), "bit_length"), Value::Int(4));
        assert_eq!(call(Value::Int(0), "bit_length"), Value::Int(0));
        assert_eq!(call(Value::Int(i64::MIN), "bit_length"), Value::Int(64));
        assert_eq!(call(Value::Int(-7), "bit_count"), Value::Int(3));
        assert_eq!(call(Value::Bool(true), "conjugate"), Value::Int(1));
    }

    #[test]
    fn test_float_methods() {
        assert_eq!(call(Value::Float(2.0), "is_integer"), Value::Bool(true));
        assert_eq!(call(Value::Float(2.5), "is_integer"), Value::Bool(false));
        assert_eq!(call(Value::Float(f64::INFINITY), "is_integer"), Value::Bool(false));
    }

    #[test]
    fn test_complex_conjugate() {
        assert_eq!(
            call(Value::complex(1.0, 2.0), "conjugate"),
            Value::complex(1.0, -2.0)
        );
    }
}
