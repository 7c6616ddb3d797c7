//! Binary, unary and membership operators.
//!
//! Integer arithmetic is checked: results that do not fit in an `i64` raise
//! an `OverflowError` instead of wrapping.

use std::rc::Rc;

use crate::{
    evaluator::{RuntimeError, percent},
    parser::{BinaryOp, UnaryOp},
    values::{Dict, Value, ValueSet, check_len, iterate, py_eq},
};

pub(crate) fn int_overflow() -> RuntimeError {
    RuntimeError::overflow("integer overflow")
}

fn float_range_error() -> RuntimeError {
    RuntimeError::overflow("(34, 'Numerical result out of range')")
}

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

/// Evaluate `left op right`.
pub(crate) fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) if matches!(op, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor) => {
            Ok(Value::Bool(match op {
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                _ => a ^ b,
            }))
        }
        (Value::Int(_) | Value::Bool(_), Value::Int(_) | Value::Bool(_)) => {
            let (a, b) = (left.as_int().unwrap_or(0), right.as_int().unwrap_or(0));
            binary_int(op, a, b)
        }
        (Value::Complex { .. }, _) | (_, Value::Complex { .. }) => match (complex_parts(left), complex_parts(right)) {
            (Some(a), Some(b)) => binary_complex(op, a, b, left, right),
            _ => binary_sequence(op, left, right),
        },
        (Value::Float(_), _) | (_, Value::Float(_)) => match (left.as_float(), right.as_float()) {
            // A negative base with a fractional exponent has a complex result.
            (Some(a), Some(b)) if op == BinaryOp::Pow && a < 0.0 && b.fract() != 0.0 && b.is_finite() => {
                complex_pow((a, 0.0), (b, 0.0)).map(|(re, im)| Value::complex(re, im))
            }
            (Some(a), Some(b)) => binary_float(op, a, b).map(Value::Float),
            _ => binary_sequence(op, left, right),
        },
        _ => binary_sequence(op, left, right),
    }
}

fn complex_parts(value: &Value) -> Option<(f64, f64)> {
    match value {
        Value::Complex { re, im } => Some((*re, *im)),
        other => Some((other.as_float()?, 0.0)),
    }
}

pub(crate) fn binary_int(op: BinaryOp, a: i64, b: i64) -> Result<Value, RuntimeError> {
    let int = |r: Option<i64>| r.map(Value::Int).ok_or_else(int_overflow);
    match op {
        BinaryOp::Add => int(a.checked_add(b)),
        BinaryOp::Sub => int(a.checked_sub(b)),
        BinaryOp::Mul => int(a.checked_mul(b)),
        BinaryOp::Div => {
            if b == 0 {
                return Err(RuntimeError::zero_division("division by zero"));
            }
            Ok(Value::Float(a as f64 / b as f64))
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(RuntimeError::zero_division(
                    "integer division or modulo by zero",
                ));
            }
            int(floor_div(a, b))
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(RuntimeError::zero_division("integer modulo by zero"));
            }
            Ok(Value::Int(floor_mod(a, b)))
        }
        BinaryOp::Pow => int_pow(a, b),
        BinaryOp::LShift => {
            if b < 0 {
                return Err(RuntimeError::value_error("negative shift count"));
            }
            if a == 0 {
                return Ok(Value::Int(0));
            }
            if b >= 64 {
                return Err(int_overflow());
            }
            let shifted = a << b;
            if shifted >> b != a {
                return Err(int_overflow());
            }
            Ok(Value::Int(shifted))
        }
        BinaryOp::RShift => {
            if b < 0 {
                return Err(RuntimeError::value_error("negative shift count"));
            }
            Ok(Value::Int(a >> b.min(63)))
        }
        BinaryOp::BitAnd => Ok(Value::Int(a & b)),
        BinaryOp::BitOr => Ok(Value::Int(a | b)),
        BinaryOp::BitXor => Ok(Value::Int(a ^ b)),
    }
}

pub(crate) fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

pub(crate) fn floor_mod(a: i64, b: i64) -> i64 {
    // checked_rem only fails for MIN % -1, whose remainder is 0.
    let r = a.checked_rem(b).unwrap_or(0);
    if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r }
}

fn int_pow(base: i64, exp: i64) -> Result<Value, RuntimeError> {
    if exp < 0 {
        if base == 0 {
            return Err(RuntimeError::zero_division(
                "0.0 cannot be raised to a negative power",
            ));
        }
        return binary_float(BinaryOp::Pow, base as f64, exp as f64).map(Value::Float);
    }
    match base {
        0 => return Ok(Value::Int(if exp == 0 { 1 } else { 0 })),
        1 => return Ok(Value::Int(1)),
        -1 => return Ok(Value::Int(if exp % 2 == 0 { 1 } else { -1 })),
        _ => {}
    }
    let exp = u32::try_from(exp).map_err(|_| int_overflow())?;
    base.checked_pow(exp).map(Value::Int).ok_or_else(int_overflow)
}

pub(crate) fn binary_float(op: BinaryOp, a: f64, b: f64) -> Result<f64, RuntimeError> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float division by zero"));
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float floor division by zero"));
            }
            (a / b).floor()
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float modulo"));
            }
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) { r + b } else { r }
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(RuntimeError::zero_division(
                    "0.0 cannot be raised to a negative power",
                ));
            }
            let r = a.powf(b);
            if r.is_infinite() && a.is_finite() && b.is_finite() {
                return Err(float_range_error());
            }
            r
        }
        _ => {
            return Err(RuntimeError::type_error(format!(
                "unsupported operand type(s) for {}: 'float' and 'float'",
                op.symbol()
            )));
        }
    };
    Ok(result)
}

fn binary_complex(
    op: BinaryOp,
    (ar, ai): (f64, f64),
    (br, bi): (f64, f64),
    left: &Value,
    right: &Value,
) -> Result<Value, RuntimeError> {
    let (re, im) = match op {
        BinaryOp::Add => (ar + br, ai + bi),
        BinaryOp::Sub => (ar - br, ai - bi),
        BinaryOp::Mul => (ar * br - ai * bi, ar * bi + ai * br),
        BinaryOp::Div => {
            let denom = br * br + bi * bi;
            if denom == 0.0 {
                return Err(RuntimeError::zero_division("division by zero"));
            }
            ((ar * br + ai * bi) / denom, (ai * br - ar * bi) / denom)
        }
        BinaryOp::Pow => complex_pow((ar, ai), (br, bi))?,
        _ => return Err(unsupported(op, left, right)),
    };
    Ok(Value::complex(re, im))
}

fn complex_pow((ar, ai): (f64, f64), (br, bi): (f64, f64)) -> Result<(f64, f64), RuntimeError> {
    if br == 0.0 && bi == 0.0 {
        return Ok((1.0, 0.0));
    }
    if ar == 0.0 && ai == 0.0 {
        if bi != 0.0 || br < 0.0 {
            return Err(RuntimeError::zero_division(
                "0.0 to a negative or complex power",
            ));
        }
        return Ok((0.0, 0.0));
    }
    let modulus = ar.hypot(ai);
    let arg = ai.atan2(ar);
    let len = modulus.powf(br) * (-bi * arg).exp();
    let phase = arg * br + bi * modulus.ln();
    let result = (len * phase.cos(), len * phase.sin());
    if !result.0.is_finite() || !result.1.is_finite() {
        return Err(RuntimeError::overflow("complex exponentiation"));
    }
    Ok(result)
}

/// Operators on strings, bytes, sequences, sets and dicts.
fn binary_sequence(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match (op, left, right) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
            check_len(a.len() + b.len())?;
            Ok(Value::from(format!("{}{}", a, b)))
        }
        (BinaryOp::Add, Value::Bytes(a), Value::Bytes(b)) => {
            check_len(a.len() + b.len())?;
            Ok(Value::bytes([&a[..], &b[..]].concat()))
        }
        (BinaryOp::Add, Value::List(a), Value::List(b)) => {
            check_len(a.len() + b.len())?;
            Ok(Value::List(a.iter().chain(b.iter()).cloned().collect()))
        }
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            check_len(a.len() + b.len())?;
            Ok(Value::Tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        (BinaryOp::Add, Value::Str(_) | Value::List(_) | Value::Tuple(_) | Value::Bytes(_), _) => {
            let name = match left {
                Value::Bytes(_) => "bytes",
                _ => return Err(RuntimeError::type_error(format!(
                    "can only concatenate {} (not \"{}\") to {}",
                    left.type_name(),
                    right.type_name(),
                    left.type_name()
                ))),
            };
            Err(RuntimeError::type_error(format!(
                "can't concat {} to {}",
                right.type_name(),
                name
            )))
        }
        (BinaryOp::Mul, seq, Value::Int(_) | Value::Bool(_)) if is_sequence(seq) => {
            repeat(seq, right.as_int().unwrap_or(0))
        }
        (BinaryOp::Mul, Value::Int(_) | Value::Bool(_), seq) if is_sequence(seq) => {
            repeat(seq, left.as_int().unwrap_or(0))
        }
        (BinaryOp::Mod, Value::Str(template), args) => percent::format_str(template, args),
        (BinaryOp::Mod, Value::Bytes(template), args) => percent::format_bytes(template, args),
        (BinaryOp::Mul, seq, _) if is_sequence(seq) => Err(RuntimeError::type_error(format!(
            "can't multiply sequence by non-int of type '{}'",
            right.type_name()
        ))),
        (
            BinaryOp::BitOr | BinaryOp::BitAnd | BinaryOp::Sub | BinaryOp::BitXor,
            Value::Set(a) | Value::FrozenSet(a),
            Value::Set(b) | Value::FrozenSet(b),
        ) => {
            let result = match op {
                BinaryOp::BitOr => a.union(b)?,
                BinaryOp::BitAnd => a.intersection(b)?,
                BinaryOp::Sub => a.difference(b)?,
                _ => a.symmetric_difference(b)?,
            };
            Ok(match left {
                Value::FrozenSet(_) => Value::FrozenSet(Rc::new(result)),
                _ => Value::Set(Rc::new(result)),
            })
        }
        (BinaryOp::BitOr, Value::Dict(a), Value::Dict(b)) => {
            let mut merged = (**a).clone();
            for (k, v) in b.iter() {
                merged.insert(k.clone(), v.clone())?;
            }
            Ok(Value::Dict(Rc::new(merged)))
        }
        (BinaryOp::Add | BinaryOp::Sub, Value::Dict(a), Value::Dict(b))
            if a.is_counter() && b.is_counter() =>
        {
            counter_arith(op, a, b)
        }
        _ => Err(unsupported(op, left, right)),
    }
}

fn is_sequence(value: &Value) -> bool {
    matches!(
        value,
        Value::Str(_) | Value::Bytes(_) | Value::List(_) | Value::Tuple(_)
    )
}

fn repeat(seq: &Value, times: i64) -> Result<Value, RuntimeError> {
    let times = times.max(0) as usize;
    let unit = match seq {
        Value::Str(s) => s.len(),
        other => other.len().unwrap_or(0),
    };
    check_len(unit.saturating_mul(times))?;
    let cycled = |items: &[Value]| -> Vec<Value> {
        items.iter().cloned().cycle().take(items.len() * times).collect()
    };
    match seq {
        Value::Str(s) => Ok(Value::from(s.repeat(times))),
        Value::Bytes(b) => Ok(Value::bytes(b.repeat(times))),
        Value::List(items) => Ok(Value::List(cycled(items).into())),
        Value::Tuple(items) => Ok(Value::Tuple(cycled(items).into())),
        other => Err(RuntimeError::type_error(format!(
            "can't multiply sequence by non-int of type '{}'",
            other.type_name()
        ))),
    }
}

/// `Counter + Counter` and `Counter - Counter`, keeping positive counts only.
fn counter_arith(op: BinaryOp, a: &Dict, b: &Dict) -> Result<Value, RuntimeError> {
    let mut out = Dict::counter();
    let count = |d: &Dict, k: &Value| -> Result<i64, RuntimeError> {
        Ok(d.get(k)?.and_then(Value::as_int).unwrap_or(0))
    };
    for key in a.keys().chain(b.keys()) {
        if out.contains_key(key)? {
            continue;
        }
        let (x, y) = (count(a, key)?, count(b, key)?);
        let n = match op {
            BinaryOp::Add => x.checked_add(y),
            _ => x.checked_sub(y),
        }
        .ok_or_else(int_overflow)?;
        if n > 0 {
            out.insert(key.clone(), Value::Int(n))?;
        }
    }
    Ok(Value::Dict(Rc::new(out)))
}

/// Evaluate a unary operator.
pub(crate) fn unary(op: UnaryOp, operand: &Value) -> Result<Value, RuntimeError> {
    let bad = || {
        RuntimeError::type_error(format!(
            "bad operand type for {}: '{}'",
            op.symbol(),
            operand.type_name()
        ))
    };
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Neg => match operand {
            Value::Int(_) | Value::Bool(_) => operand
                .as_int()
                .and_then(i64::checked_neg)
                .map(Value::Int)
                .ok_or_else(int_overflow),
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Complex { re, im } => Ok(Value::complex(-re, -im)),
            _ => Err(bad()),
        },
        UnaryOp::Pos => match operand {
            Value::Bool(b) => Ok(Value::Int(*b as i64)),
            Value::Int(_) | Value::Float(_) | Value::Complex { .. } => Ok(operand.clone()),
            _ => Err(bad()),
        },
        UnaryOp::Invert => match operand {
            Value::Int(_) | Value::Bool(_) => Ok(Value::Int(!operand.as_int().unwrap_or(0))),
            _ => Err(bad()),
        },
    }
}

/// `item in container`.
pub(crate) fn contains(container: &Value, item: &Value) -> Result<bool, RuntimeError> {
    match container {
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(&**needle)),
            _ => Err(RuntimeError::type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                item.type_name()
            ))),
        },
        Value::Bytes(haystack) => match item {
            Value::Bytes(needle) => Ok(find_subslice(haystack, needle).is_some()),
            Value::Int(_) | Value::Bool(_) => {
                let byte = item.as_int().unwrap_or(-1);
                if !(0..256).contains(&byte) {
                    return Err(RuntimeError::value_error("byte must be in range(0, 256)"));
                }
                Ok(haystack.contains(&(byte as u8)))
            }
            _ => Err(RuntimeError::type_error(format!(
                "a bytes-like object is required, not '{}'",
                item.type_name()
            ))),
        },
        Value::List(items) | Value::Tuple(items) => Ok(items.iter().any(|x| py_eq(x, item))),
        Value::Set(set) | Value::FrozenSet(set) => set.contains(item),
        Value::Dict(dict) => dict.contains_key(item),
        Value::Range(range) => Ok(match item {
            Value::Int(_) | Value::Bool(_) => range.contains(item.as_int().unwrap_or(0)),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.2e18 => range.contains(*f as i64),
            _ => false,
        }),
        Value::Iterator(_) | Value::Object(_) => {
            let mut iter = iterate(container).map_err(|_| not_container(container))?;
            Ok(iter.any(|x| py_eq(&x, item)))
        }
        _ => Err(not_container(container)),
    }
}

fn not_container(container: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "argument of type '{}' is not iterable",
        container.type_name()
    ))
}

pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// A set built from an iterable, as `set(x)` does.
pub(crate) fn set_of(value: &Value) -> Result<ValueSet, RuntimeError> {
    let mut set = ValueSet::new();
    for item in iterate(value)? {
        set.insert(item)?;
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bin(op: BinaryOp, a: impl Into<Value>, b: impl Into<Value>) -> Result<Value, RuntimeError> {
        binary(op, &a.into(), &b.into())
    }

    #[test]
    fn test_int_arithmetic() {
        assert_eq!(bin(BinaryOp::Add, 2, 3).unwrap(), Value::Int(5));
        assert_eq!(bin(BinaryOp::Div, 7, 2).unwrap(), Value::Float(3.5));
        assert_eq!(bin(BinaryOp::FloorDiv, -7, 2).unwrap(), Value::Int(-4));
        assert_eq!(bin(BinaryOp::Mod, -7, 2).unwrap(), Value::Int(1));
        assert_eq!(bin(BinaryOp::Mod, 7, -2).unwrap(), Value::Int(-1));
        assert_eq!(bin(BinaryOp::Pow, 2, 10).unwrap(), Value::Int(1024));
        assert_eq!(bin(BinaryOp::Pow, 2, -1).unwrap(), Value::Float(0.5));
        assert_eq!(bin(BinaryOp::LShift, 1, 4).unwrap(), Value::Int(16));
        assert_eq!(bin(BinaryOp::RShift, -8, 100).unwrap(), Value::Int(-1));
    }

    #[test]
    fn test_int_overflow_is_an_error() {
        let err = bin(BinaryOp::Add, i64::MAX, 1).unwrap_err();
        assert_eq!(err.exception(), "OverflowError");
        assert!(bin(BinaryOp::Pow, 2, 64).is_err());
        assert!(bin(BinaryOp::LShift, 1, 63).is_err());
        assert!(bin(BinaryOp::FloorDiv, i64::MIN, -1).is_err());
        assert_eq!(bin(BinaryOp::Mod, i64::MIN, -1).unwrap(), Value::Int(0));
        assert_eq!(bin(BinaryOp::Pow, -1, i64::MAX).unwrap(), Value::Int(-1));
    }

    #[test]
    fn test_division_by_zero_messages() {
        assert_eq!(
            bin(BinaryOp::Div, 1, 0).unwrap_err().to_string(),
            "division by zero"
        );
        assert_eq!(
            bin(BinaryOp::FloorDiv, 1, 0).unwrap_err().to_string(),
            "integer division or modulo by zero"
        );
        assert_eq!(
            bin(BinaryOp::Div, 1.0, 0).unwrap_err().to_string(),
            "float division by zero"
        );
    }

    #[test]
    fn test_float_and_mixed() {
        assert_eq!(bin(BinaryOp::Add, 1, 0.5).unwrap(), Value::Float(1.5));
        assert_eq!(bin(BinaryOp::FloorDiv, 7.5, 2).unwrap(), Value::Float(3.0));
        assert_eq!(bin(BinaryOp::Mod, -1.0, 3).unwrap(), Value::Float(2.0));
        assert_eq!(bin(BinaryOp::Add, true, true).unwrap(), Value::Int(2));
        assert_eq!(bin(BinaryOp::BitAnd, true, false).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_complex() {
        let j = Value::complex(0.0, 1.0);
        assert_eq!(binary(BinaryOp::Mul, &j, &j).unwrap(), Value::Int(-1));
        assert_eq!(
            binary(BinaryOp::Add, &Value::Int(1), &j).unwrap().repr(),
            "(1+1j)"
        );
        assert!(binary(BinaryOp::FloorDiv, &j, &j).is_err());
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(bin(BinaryOp::Add, "a", "b").unwrap(), Value::from("ab"));
        assert_eq!(
            bin(BinaryOp::Add, "a", 2).unwrap_err().to_string(),
            "can only concatenate str (not \"int\") to str"
        );
        assert_eq!(
            bin(BinaryOp::Sub, "a", 2).unwrap_err().to_string(),
            "unsupported operand type(s) for -: 'str' and 'int'"
        );
        assert_eq!(
            bin(BinaryOp::Add, vec![1], vec![2]).unwrap().repr(),
            "[1, 2]"
        );
    }

    #[test]
    fn test_repetition() {
        assert_eq!(bin(BinaryOp::Mul, "ab", 3).unwrap(), Value::from("ababab"));
        assert_eq!(bin(BinaryOp::Mul, 2, vec![0]).unwrap().repr(), "[0, 0]");
        assert_eq!(bin(BinaryOp::Mul, "ab", -1).unwrap(), Value::from(""));
        let err = bin(BinaryOp::Mul, vec![0], 100_000_000).unwrap_err();
        assert_eq!(err.exception(), "MemoryError");
    }

    #[test]
    fn test_list_and_tuple_repetition() {
        assert_eq!(bin(BinaryOp::Mul, vec![0], 3).unwrap().repr(), "[0, 0, 0]");
        assert_eq!(bin(BinaryOp::Mul, vec![1, 2], 2).unwrap().repr(), "[1, 2, 1, 2]");
        let one = Value::tuple(vec![Value::Int(1)]);
        assert_eq!(binary(BinaryOp::Mul, &Value::Int(3), &one).unwrap().repr(), "(1, 1, 1)");
        assert_eq!(bin(BinaryOp::Mul, vec![1], -1).unwrap().repr(), "[]");
        assert_eq!(bin(BinaryOp::Mul, vec![1], true).unwrap().repr(), "[1]");
        let err = bin(BinaryOp::Mul, vec![0], 1_000_000_000_000i64).unwrap_err();
        assert_eq!(err.exception(), "MemoryError");
    }

    #[test]
    fn test_repeat_rejects_non_sequences() {
        let err = repeat(&Value::Int(1), 2).unwrap_err();
        assert_eq!(err.exception(), "TypeError");
    }

    #[test]
    fn test_percent_formatting_dispatch() {
        assert_eq!(bin(BinaryOp::Mod, "%s", 1).unwrap(), Value::from("1"));
        let args = Value::tuple(vec![Value::Int(1)]);
        assert_eq!(
            binary(BinaryOp::Mod, &Value::from("%d"), &args).unwrap(),
            Value::from("1")
        );
        assert_eq!(bin(BinaryOp::Mod, "%.1f", 0.26).unwrap(), Value::from("0.3"));
        assert!(bin(BinaryOp::Mod, 1, "%s").is_err());
    }

    #[test]
    fn test_negative_base_fractional_power_is_complex() {
        let result = bin(BinaryOp::Pow, -8, 1.0 / 3.0).unwrap();
        let Value::Complex { re, im } = result else {
            panic!("expected a complex result, got {result:?}");
        };
        assert!((re - 1.0).abs() < 1e-9);
        assert!((im - 3f64.sqrt()).abs() < 1e-9);
        assert_eq!(bin(BinaryOp::Pow, -8.0, 2).unwrap(), Value::Float(64.0));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::Neg, &Value::Bool(true)).unwrap(), Value::Int(-1));
        assert_eq!(unary(UnaryOp::Invert, &Value::Int(5)).unwrap(), Value::Int(-6));
        assert_eq!(unary(UnaryOp::Not, &Value::from("")).unwrap(), Value::Bool(true));
        assert!(unary(UnaryOp::Neg, &Value::Int(i64::MIN)).is_err());
        assert_eq!(
            unary(UnaryOp::Neg, &Value::from("a")).unwrap_err().to_string(),
            "bad operand type for unary -: 'str'"
        );
    }

    #[test]
    fn test_contains() {
        assert!(contains(&Value::from("jon"), &Value::from("o")).unwrap());
        assert!(contains(&Value::range(0, 10, 2), &Value::Int(4)).unwrap());
        assert!(!contains(&Value::range(0, 10, 2), &Value::Int(5)).unwrap());
        assert!(contains(&Value::from(vec![1, 2]), &Value::Float(2.0)).unwrap());
        assert_eq!(
            contains(&Value::Int(1), &Value::Int(1)).unwrap_err().to_string(),
            "argument of type 'int' is not iterable"
        );
    }
}
