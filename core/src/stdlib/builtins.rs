//! Builtin functions.

use std::rc::Rc;

use crate::{
    evaluator::{
        RuntimeError,
        operators::{self, int_overflow},
    },
    parser::BinaryOp,
    stdlib::{call, constructors::float_to_int, index_arg, native},
    values::{
        Args, OneShot, TypeKind, Value, ValueIter, check_len, collect, identity, iterate, less_than,
        py_hash, MAX_COLLECTION_LEN,
    },
};

/// The builtin function spelled `name`. Type objects live in
/// [`builtin_type`](super::builtin_type).
pub fn function(name: &str) -> Option<Value> {
    let (name, func): (&'static str, super::BuiltinFn) = match name {
        "sorted" => ("sorted", sorted),
        "zip" => ("zip", zip),
        "sum" => ("sum", sum),
        "any" => ("any", any),
        "all" => ("all", all),
        "id" => ("id", id),
        "issubclass" => ("issubclass", issubclass),
        "isinstance" => ("isinstance", isinstance),
        "callable" => ("callable", callable),
        "same_type" => ("same_type", same_type),
        "abs" => ("abs", abs),
        "len" => ("len", len),
        "pow" => ("pow", pow),
        "chr" => ("chr", chr),
        "ord" => ("ord", ord),
        "oct" => ("oct", oct),
        "hex" => ("hex", hex),
        "divmod" => ("divmod", divmod),
        "hash" => ("hash", hash),
        "repr" => ("repr", repr),
        "round" => ("round", round),
        _ => return None,
    };
    Some(native(name, func))
}

// ============================================================================
// Iteration
// ============================================================================

fn sorted(mut args: Args) -> Result<Value, RuntimeError> {
    let key = args.take_keyword("key");
    let reverse = args.take_keyword("reverse").is_some_and(|r| r.is_truthy());
    args.finish("sorted")?;
    args.check_positional("sorted", 1, 1)?;
    let items = collect(&args.positional[0])?;
    Ok(Value::list(sort_values(items, key.as_ref(), reverse)?))
}

/// A stable sort with Python's `sorted` semantics.
///
/// Comparisons can fail (`1 < "a"`), so this cannot use `slice::sort_by`.
pub(crate) fn sort_values(
    items: Vec<Value>,
    key: Option<&Value>,
    reverse: bool,
) -> Result<Vec<Value>, RuntimeError> {
    let keys = match key {
        Some(func) if !func.is_none() => items
            .iter()
            .map(|item| call(func, Args::new(vec![item.clone()])))
            .collect::<Result<Vec<_>, _>>()?,
        _ => items.clone(),
    };
    let mut order: Vec<usize> = (0..items.len()).collect();
    merge_sort(&mut order, |later, earlier| {
        if reverse {
            less_than(&keys[earlier], &keys[later])
        } else {
            less_than(&keys[later], &keys[earlier])
        }
    })?;
    Ok(order.into_iter().map(|i| items[i].clone()).collect())
}

/// Bottom-up merge sort of positions. `goes_before(later, earlier)` tells
/// whether an element from the right run must move ahead of one from the left.
fn merge_sort(
    order: &mut Vec<usize>,
    goes_before: impl Fn(usize, usize) -> Result<bool, RuntimeError>,
) -> Result<(), RuntimeError> {
    let n = order.len();
    let mut buf = Vec::with_capacity(n);
    let mut width = 1;
    while width < n {
        buf.clear();
        let mut start = 0;
        while start < n {
            let mid = (start + width).min(n);
            let end = (start + 2 * width).min(n);
            let (mut i, mut j) = (start, mid);
            while i < mid && j < end {
                if goes_before(order[j], order[i])? {
                    buf.push(order[j]);
                    j += 1;
                } else {
                    buf.push(order[i]);
                    i += 1;
                }
            }
            buf.extend_from_slice(&order[i..mid]);
            buf.extend_from_slice(&order[j..end]);
            start = end;
        }
        std::mem::swap(order, &mut buf);
        width *= 2;
    }
    Ok(())
}

fn zip(mut args: Args) -> Result<Value, RuntimeError> {
    let strict = args.take_keyword("strict").is_some_and(|s| s.is_truthy());
    args.finish("zip")?;
    let mut iters = args
        .positional
        .iter()
        .map(iterate)
        .collect::<Result<Vec<ValueIter>, _>>()?;
    let mut rows = Vec::new();
    if iters.is_empty() {
        return Ok(Value::Iterator(Rc::new(OneShot::new("zip", rows))));
    }
    loop {
        let mut row = Vec::with_capacity(iters.len());
        let mut exhausted = None;
        for (i, iter) in iters.iter_mut().enumerate() {
            match iter.next() {
                Some(item) => row.push(item),
                None => {
                    exhausted = Some(i);
                    break;
                }
            }
        }
        if let Some(i) = exhausted {
            if strict {
                check_strict_zip(i, &mut iters)?;
            }
            return Ok(Value::Iterator(Rc::new(OneShot::new("zip", rows))));
        }
        rows.push(Value::tuple(row));
        if rows.len() > MAX_COLLECTION_LEN {
            check_len(rows.len())?;
        }
    }
}

/// `zip(..., strict=True)` after argument `exhausted` ran out first.
fn check_strict_zip(exhausted: usize, iters: &mut [ValueIter]) -> Result<(), RuntimeError> {
    let arguments = |k: usize| {
        if k > 1 {
            format!("arguments 1-{}", k)
        } else {
            "argument 1".to_string()
        }
    };
    if exhausted > 0 {
        return Err(RuntimeError::value_error(format!(
            "zip() argument {} is shorter than {}",
            exhausted + 1,
            arguments(exhausted)
        )));
    }
    match iters[1..].iter_mut().position(|it| it.next().is_some()) {
        Some(pos) => Err(RuntimeError::value_error(format!(
            "zip() argument {} is longer than {}",
            pos + 2,
            arguments(pos + 1)
        ))),
        None => Ok(()),
    }
}

fn sum(mut args: Args) -> Result<Value, RuntimeError> {
    let start = args.take_keyword("start");
    args.finish("sum")?;
    args.check_positional("sum", 1, 2)?;
    let start = start
        .or_else(|| args.positional.get(1).cloned())
        .unwrap_or(Value::Int(0));
    match &start {
        Value::Str(_) => {
            return Err(RuntimeError::type_error(
                "sum() can't sum strings [use ''.join(seq) instead]",
            ));
        }
        Value::Bytes(_) => {
            return Err(RuntimeError::type_error(
                "sum() can't sum bytes [use b''.join(seq) instead]",
            ));
        }
        _ => {}
    }
    if let (Value::Range(range), Value::Int(base)) = (&args.positional[0], &start) {
        // Arithmetic series; ranges can be far too long to walk.
        let n = range.len() as i128;
        let total = n
            .checked_mul(n - 1)
            .and_then(|t| (t / 2).checked_mul(range.step as i128))
            .and_then(|t| t.checked_add(n * range.start as i128))
            .and_then(|t| t.checked_add(*base as i128))
            .and_then(|t| i64::try_from(t).ok());
        return total.map(Value::Int).ok_or_else(int_overflow);
    }
    let mut acc = start;
    for item in iterate(&args.positional[0])? {
        acc = operators::binary(BinaryOp::Add, &acc, &item)?;
    }
    Ok(acc)
}

fn any(args: Args) -> Result<Value, RuntimeError> {
    args.check("any", 1, 1)?;
    Ok(Value::Bool(iterate(&args.positional[0])?.any(|x| x.is_truthy())))
}

fn all(args: Args) -> Result<Value, RuntimeError> {
    args.check("all", 1, 1)?;
    Ok(Value::Bool(iterate(&args.positional[0])?.all(|x| x.is_truthy())))
}

// ============================================================================
// Introspection
// ============================================================================

fn id(args: Args) -> Result<Value, RuntimeError> {
    args.check("id", 1, 1)?;
    Ok(Value::Int(identity(&args.positional[0])))
}

/// Flattens a class or (nested) tuple of classes.
fn class_info(value: &Value, out: &mut Vec<TypeKind>) -> bool {
    match value {
        Value::Type(kind) => {
            out.push(kind.clone());
            true
        }
        Value::Tuple(items) => items.iter().all(|item| class_info(item, out)),
        _ => false,
    }
}

fn issubclass(args: Args) -> Result<Value, RuntimeError> {
    args.check("issubclass", 2, 2)?;
    let Value::Type(cls) = &args.positional[0] else {
        return Err(RuntimeError::type_error("issubclass() arg 1 must be a class"));
    };
    let mut classes = Vec::new();
    if !class_info(&args.positional[1], &mut classes) {
        return Err(RuntimeError::type_error(
            "issubclass() arg 2 must be a class, a tuple of classes, or a union",
        ));
    }
    Ok(Value::Bool(classes.iter().any(|c| cls.is_subtype_of(c))))
}

fn isinstance(args: Args) -> Result<Value, RuntimeError> {
    args.check("isinstance", 2, 2)?;
    let mut classes = Vec::new();
    if !class_info(&args.positional[1], &mut classes) {
        return Err(RuntimeError::type_error(
            "isinstance() arg 2 must be a type, a tuple of types, or a union",
        ));
    }
    let kind = args.positional[0].type_of();
    Ok(Value::Bool(classes.iter().any(|c| kind.is_subtype_of(c))))
}

fn callable(args: Args) -> Result<Value, RuntimeError> {
    args.check("callable", 1, 1)?;
    Ok(Value::Bool(args.positional[0].is_callable()))
}

/// `same_type(a, *others)`: whether every argument has exactly the type of `a`.
fn same_type(args: Args) -> Result<Value, RuntimeError> {
    args.check("same_type", 1, usize::MAX)?;
    let kind = args.positional[0].type_of();
    Ok(Value::Bool(
        args.positional[1..].iter().all(|v| v.type_of() == kind),
    ))
}

fn len(args: Args) -> Result<Value, RuntimeError> {
    args.check("len", 1, 1)?;
    let value = &args.positional[0];
    let n = value.len().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "object of type '{}' has no len()",
            value.type_name()
        ))
    })?;
    i64::try_from(n).map(Value::Int).map_err(|_| int_overflow())
}

fn hash(args: Args) -> Result<Value, RuntimeError> {
    args.check("hash", 1, 1)?;
    py_hash(&args.positional[0]).map(Value::Int)
}

fn repr(args: Args) -> Result<Value, RuntimeError> {
    args.check("repr", 1, 1)?;
    Ok(Value::from(args.positional[0].repr()))
}

// ============================================================================
// Numbers
// ============================================================================

fn abs(args: Args) -> Result<Value, RuntimeError> {
    args.check("abs", 1, 1)?;
    match &args.positional[0] {
        v @ (Value::Int(_) | Value::Bool(_)) => v
            .as_int()
            .and_then(i64::checked_abs)
            .map(Value::Int)
            .ok_or_else(int_overflow),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        Value::Complex { re, im } => Ok(Value::Float(re.hypot(*im))),
        other => Err(RuntimeError::type_error(format!(
            "bad operand type for abs(): '{}'",
            other.type_name()
        ))),
    }
}

fn pow(mut args: Args) -> Result<Value, RuntimeError> {
    let modulus = args.take_keyword("mod");
    args.finish("pow")?;
    args.check_positional("pow", 2, 3)?;
    let modulus = modulus.or_else(|| args.positional.get(2).cloned());
    let (base, exp) = (&args.positional[0], &args.positional[1]);
    match modulus {
        None | Some(Value::None) => operators::binary(BinaryOp::Pow, base, exp),
        Some(m) => match (base.as_int(), exp.as_int(), m.as_int()) {
            (Some(b), Some(e), Some(m)) => mod_pow(b, e, m).map(Value::Int),
            _ => Err(RuntimeError::type_error(
                "pow() 3rd argument not allowed unless all arguments are integers",
            )),
        },
    }
}

/// Three-argument `pow`, including negative exponents via the modular inverse.
fn mod_pow(base: i64, exp: i64, modulus: i64) -> Result<i64, RuntimeError> {
    if modulus == 0 {
        return Err(RuntimeError::value_error("pow() 3rd argument cannot be 0"));
    }
    let m = (modulus as i128).abs();
    let mut b = (base as i128).rem_euclid(m);
    if exp < 0 {
        b = mod_inverse(b, m)
            .ok_or_else(|| RuntimeError::value_error("base is not invertible for the given modulus"))?;
    }
    let mut e = (exp as i128).abs();
    let mut result = 1i128 % m;
    while e > 0 {
        if e & 1 == 1 {
            result = result * b % m;
        }
        b = b * b % m;
        e >>= 1;
    }
    if modulus < 0 && result != 0 {
        result -= m;
    }
    Ok(result as i64)
}

fn mod_inverse(a: i128, m: i128) -> Option<i128> {
    let (mut old_r, mut r) = (a, m);
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    (old_r == 1).then(|| old_s.rem_euclid(m))
}

fn divmod(args: Args) -> Result<Value, RuntimeError> {
    args.check("divmod", 2, 2)?;
    let (a, b) = (&args.positional[0], &args.positional[1]);
    if matches!(a, Value::Complex { .. }) || matches!(b, Value::Complex { .. }) {
        return Err(RuntimeError::type_error(format!(
            "unsupported operand type(s) for divmod(): '{}' and '{}'",
            a.type_name(),
            b.type_name()
        )));
    }
    let quotient = operators::binary(BinaryOp::FloorDiv, a, b)?;
    let remainder = operators::binary(BinaryOp::Mod, a, b)?;
    Ok(Value::tuple(vec![quotient, remainder]))
}

fn round(mut args: Args) -> Result<Value, RuntimeError> {
    let ndigits = args.take_keyword("ndigits");
    args.finish("round")?;
    args.check_positional("round", 1, 2)?;
    let ndigits = match ndigits.or_else(|| args.positional.get(1).cloned()) {
        None | Some(Value::None) => None,
        Some(n) => Some(index_arg(&n)?),
    };
    match (&args.positional[0], ndigits) {
        (v @ (Value::Int(_) | Value::Bool(_)), None) => Ok(Value::Int(v.as_int().unwrap_or(0))),
        (v @ (Value::Int(_) | Value::Bool(_)), Some(nd)) => {
            round_int(v.as_int().unwrap_or(0), nd).map(Value::Int)
        }
        (Value::Float(f), None) => float_to_int(f.round_ties_even()).map(Value::Int),
        (Value::Float(f), Some(nd)) => Ok(Value::Float(round_float(*f, nd))),
        (other, _) => Err(RuntimeError::type_error(format!(
            "type {} doesn't define __round__ method",
            other.type_name()
        ))),
    }
}

fn round_int(n: i64, ndigits: i64) -> Result<i64, RuntimeError> {
    if ndigits >= 0 {
        return Ok(n);
    }
    if ndigits < -18 {
        return Ok(0);
    }
    let p = 10i64.pow((-ndigits) as u32);
    let q = n.div_euclid(p);
    let twice = 2 * n.rem_euclid(p);
    let q = if twice > p || (twice == p && q % 2 != 0) { q + 1 } else { q };
    q.checked_mul(p).ok_or_else(int_overflow)
}

fn round_float(x: f64, ndigits: i64) -> f64 {
    if !x.is_finite() || ndigits > 323 {
        return x;
    }
    if ndigits >= 0 {
        // Formatting rounds the exact binary value, as Python does.
        return format!("{:.*}", ndigits as usize, x).parse().unwrap_or(x);
    }
    let p = 10f64.powi((-ndigits).min(400) as i32);
    if p.is_infinite() {
        return 0.0 * x.signum();
    }
    (x / p).round_ties_even() * p
}

// ============================================================================
// Characters and number formatting
// ============================================================================

fn chr(args: Args) -> Result<Value, RuntimeError> {
    args.check("chr", 1, 1)?;
    let code = index_arg(&args.positional[0])?;
    if !(0..0x110000).contains(&code) {
        return Err(RuntimeError::value_error("chr() arg not in range(0x110000)"));
    }
    char::from_u32(code as u32)
        .map(|c| Value::from(c.to_string()))
        .ok_or_else(|| RuntimeError::value_error("chr() arg is a surrogate code point"))
}

fn ord(args: Args) -> Result<Value, RuntimeError> {
    args.check("ord", 1, 1)?;
    match &args.positional[0] {
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Int(c as i64)),
                _ => Err(RuntimeError::type_error(format!(
                    "ord() expected a character, but string of length {} found",
                    s.chars().count()
                ))),
            }
        }
        Value::Bytes(b) if b.len() == 1 => Ok(Value::Int(b[0] as i64)),
        Value::Bytes(b) => Err(RuntimeError::type_error(format!(
            "ord() expected a character, but string of length {} found",
            b.len()
        ))),
        other => Err(RuntimeError::type_error(format!(
            "ord() expected string of length 1, but {} found",
            other.type_name()
        ))),
    }
}

fn radix(n: i64, prefix: &str, digits: fn(u64) -> String) -> Value {
    let sign = if n < 0 { "-" } else { "" };
    Value::from(format!("{}{}{}", sign, prefix, digits(n.unsigned_abs())))
}

fn oct(args: Args) -> Result<Value, RuntimeError> {
    args.check("oct", 1, 1)?;
    let n = index_arg(&args.positional[0])?;
    Ok(radix(n, "0o", |u| format!("{:o}", u)))
}

fn hex(args: Args) -> Result<Value, RuntimeError> {
    args.check("hex", 1, 1)?;
    let n = index_arg(&args.positional[0])?;
    Ok(radix(n, "0x", |u| format!("{:x}", u)))
}

#[cfg(test)]
#[path = "builtins_test.rs"]
mod builtins_test;
