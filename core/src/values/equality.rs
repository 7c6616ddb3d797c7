//! Equality, ordering, hashing and identity with Python semantics.
//!
//! Numbers compare and hash across `bool`, `int`, `float` and `complex`, so
//! `1 == 1.0 == True` and all three land in the same dict slot.

use std::cmp::Ordering;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::rc::Rc;

use crate::evaluator::RuntimeError;
use crate::parser::ComparisonOp;
use crate::values::value::{RangeValue, Value};

const MODULUS: u64 = (1 << 61) - 1;
const MODULUS_BITS: u32 = 61;
const INF_HASH: i64 = 314_159;

const XXPRIME_1: u64 = 11_400_714_785_074_694_791;
const XXPRIME_2: u64 = 14_029_467_366_897_019_727;
const XXPRIME_5: u64 = 2_870_177_450_012_600_261;

/// `a == b`.
pub fn py_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Tuple(x), Value::Tuple(y)) | (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| py_eq(a, b))
        }
        (Value::Set(x) | Value::FrozenSet(x), Value::Set(y) | Value::FrozenSet(y)) => {
            x.len() == y.len() && x.is_subset(y).unwrap_or(false)
        }
        (Value::Dict(x), Value::Dict(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| match y.get(k) {
                    Ok(Some(other)) => py_eq(v, other),
                    _ => false,
                })
        }
        (Value::Range(x), Value::Range(y)) => range_eq(x, y),
        (Value::Slice(x), Value::Slice(y)) => x == y,
        (Value::Type(x), Value::Type(y)) => x == y,
        (Value::Module(x), Value::Module(y)) => x == y,
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Iterator(x), Value::Iterator(y)) => Rc::ptr_eq(x, y),
        _ => numeric_eq(a, b).unwrap_or(false),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        py_eq(self, other)
    }
}

fn range_eq(x: &RangeValue, y: &RangeValue) -> bool {
    let len = x.len();
    if len != y.len() {
        return false;
    }
    match len {
        0 => true,
        1 => x.start == y.start,
        _ => x.start == y.start && x.step == y.step,
    }
}

/// Equality between two numbers, or `None` when either side is not a number.
fn numeric_eq(a: &Value, b: &Value) -> Option<bool> {
    match (a, b) {
        (Value::Complex { re, im }, other) | (other, Value::Complex { re, im }) => {
            let (ore, oim) = match other {
                Value::Complex { re, im } => (*re, *im),
                _ => (other.as_float()?, 0.0),
            };
            Some(*re == ore && *im == oim && real_eq(other, *re))
        }
        _ => Some(compare_real(a, b)? == Some(Ordering::Equal)),
    }
}

// An int compared with the real part of a complex must be exact, not via f64.
fn real_eq(value: &Value, re: f64) -> bool {
    match value.as_int() {
        Some(i) => int_float_cmp(i, re) == Some(Ordering::Equal),
        None => true,
    }
}

/// Orders two real numbers. The outer `None` means "not both real numbers";
/// the inner `None` means unordered (a NaN is involved).
fn compare_real(a: &Value, b: &Value) -> Option<Option<Ordering>> {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => Some(x.partial_cmp(y)),
        (Value::Float(x), other) => Some(int_float_cmp(other.as_int()?, *x).map(Ordering::reverse)),
        (other, Value::Float(y)) => Some(int_float_cmp(other.as_int()?, *y)),
        _ => Some(Some(a.as_int()?.cmp(&b.as_int()?))),
    }
}

/// Exact comparison of an integer with a float.
pub(crate) fn int_float_cmp(i: i64, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    // 2**63 is exactly representable; everything at or above it exceeds i64.
    if f >= 9_223_372_036_854_775_808.0 {
        return Some(Ordering::Less);
    }
    if f < -9_223_372_036_854_775_808.0 {
        return Some(Ordering::Greater);
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0.partial_cmp(&(f - whole)),
        other => Some(other),
    }
}

/// Evaluates an ordering comparison (`<`, `<=`, `>`, `>=`).
pub fn rich_compare(op: ComparisonOp, a: &Value, b: &Value) -> Result<bool, RuntimeError> {
    if let Some(ordering) = compare_real(a, b) {
        return Ok(ordering.is_some_and(|o| ordering_matches(op, o)));
    }
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(ordering_matches(op, x.cmp(y))),
        (Value::Bytes(x), Value::Bytes(y)) => Ok(ordering_matches(op, x.cmp(y))),
        (Value::Tuple(x), Value::Tuple(y)) | (Value::List(x), Value::List(y)) => {
            compare_sequences(op, x, y)
        }
        (Value::Set(x) | Value::FrozenSet(x), Value::Set(y) | Value::FrozenSet(y)) => match op {
            ComparisonOp::Le => x.is_subset(y),
            ComparisonOp::Lt => Ok(x.len() < y.len() && x.is_subset(y)?),
            ComparisonOp::Ge => y.is_subset(x),
            ComparisonOp::Gt => Ok(y.len() < x.len() && y.is_subset(x)?),
            _ => Err(unorderable(op, a, b)),
        },
        _ => Err(unorderable(op, a, b)),
    }
}

fn compare_sequences(op: ComparisonOp, x: &[Value], y: &[Value]) -> Result<bool, RuntimeError> {
    match x.iter().zip(y).find(|(a, b)| !py_eq(a, b)) {
        Some((a, b)) => rich_compare(op, a, b),
        None => Ok(ordering_matches(op, x.len().cmp(&y.len()))),
    }
}

fn ordering_matches(op: ComparisonOp, ordering: Ordering) -> bool {
    match op {
        ComparisonOp::Lt => ordering == Ordering::Less,
        ComparisonOp::Le => ordering != Ordering::Greater,
        ComparisonOp::Gt => ordering == Ordering::Greater,
        ComparisonOp::Ge => ordering != Ordering::Less,
        ComparisonOp::Eq => ordering == Ordering::Equal,
        ComparisonOp::Neq => ordering != Ordering::Equal,
        _ => false,
    }
}

fn unorderable(op: ComparisonOp, a: &Value, b: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "'{}' not supported between instances of '{}' and '{}'",
        op.symbol(),
        a.type_name(),
        b.type_name()
    ))
}

/// `a < b`, as used by `sorted`.
pub fn less_than(a: &Value, b: &Value) -> Result<bool, RuntimeError> {
    rich_compare(ComparisonOp::Lt, a, b)
}

/// `a is b`.
pub fn is_identical(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
        (Value::Str(x), Value::Str(y)) => Rc::ptr_eq(x, y),
        (Value::Bytes(x), Value::Bytes(y)) => Rc::ptr_eq(x, y),
        (Value::Tuple(x), Value::Tuple(y)) | (Value::List(x), Value::List(y)) => Rc::ptr_eq(x, y),
        (Value::Set(x), Value::Set(y)) | (Value::FrozenSet(x), Value::FrozenSet(y)) => {
            Rc::ptr_eq(x, y)
        }
        (Value::Dict(x), Value::Dict(y)) => Rc::ptr_eq(x, y),
        (Value::Range(x), Value::Range(y)) => x == y,
        (Value::Slice(x), Value::Slice(y)) => x == y,
        (Value::Type(x), Value::Type(y)) => x == y,
        (Value::Module(x), Value::Module(y)) => x == y,
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Iterator(x), Value::Iterator(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// `id(value)`: the address of heap values, a stable surrogate for the rest.
pub fn identity(value: &Value) -> i64 {
    let addr = match value {
        Value::Str(s) => Rc::as_ptr(s) as *const u8 as usize,
        Value::Bytes(b) => Rc::as_ptr(b) as *const u8 as usize,
        Value::Tuple(items) | Value::List(items) => Rc::as_ptr(items) as *const u8 as usize,
        Value::Set(s) | Value::FrozenSet(s) => Rc::as_ptr(s) as usize,
        Value::Dict(d) => Rc::as_ptr(d) as usize,
        Value::Function(f) => Rc::as_ptr(f) as *const u8 as usize,
        Value::Object(o) => Rc::as_ptr(o) as *const u8 as usize,
        Value::Iterator(i) => Rc::as_ptr(i) as usize,
        other => return py_hash(other).unwrap_or(0),
    };
    addr as i64
}

/// `hash(value)`. Lists, dicts, sets and slices are unhashable.
pub fn py_hash(value: &Value) -> Result<i64, RuntimeError> {
    Ok(match value {
        Value::None => 0x5f3759df,
        Value::Bool(b) => *b as i64,
        Value::Int(i) => hash_int(*i),
        Value::Float(f) => hash_float(*f),
        Value::Complex { re, im } => {
            let combined = (hash_float(*re) as u64)
                .wrapping_add(1_000_003u64.wrapping_mul(hash_float(*im) as u64))
                as i64;
            fix_minus_one(combined)
        }
        Value::Str(s) => hash_str(s),
        Value::Bytes(b) => hash_with_tag(1, b),
        Value::Tuple(items) => hash_tuple(items.iter().map(py_hash))?,
        Value::FrozenSet(set) => {
            let mut acc: u64 = 0;
            for item in set.iter() {
                let h = py_hash(item)? as u64;
                acc ^= ((h ^ 89_869_747) ^ (h << 16)).wrapping_mul(3_644_798_167);
            }
            acc ^= (set.len() as u64 + 1).wrapping_mul(1_927_868_237);
            acc ^= (acc >> 11) ^ (acc >> 25);
            acc = acc.wrapping_mul(69_069).wrapping_add(907_133_923);
            fix_minus_one(acc as i64)
        }
        Value::Range(r) => {
            let len = r.len() as i64;
            let parts = match len {
                0 => [Ok(0), Ok(hash_int(0)), Ok(hash_int(1))],
                1 => [Ok(hash_int(1)), Ok(hash_int(r.start)), Ok(hash_int(1))],
                _ => [Ok(hash_int(len)), Ok(hash_int(r.start)), Ok(hash_int(r.step))],
            };
            hash_tuple(parts.into_iter())?
        }
        Value::Type(kind) => hash_with_tag(2, kind.qualified_name().as_bytes()),
        Value::Module(name) => hash_with_tag(3, name.as_bytes()),
        Value::Function(_) | Value::Object(_) | Value::Iterator(_) => identity(value) >> 4,
        Value::List(_) | Value::Set(_) | Value::Dict(_) | Value::Slice(_) => {
            return Err(RuntimeError::type_error(format!(
                "unhashable type: '{}'",
                value.type_name()
            )));
        }
    })
}

fn fix_minus_one(h: i64) -> i64 {
    if h == -1 { -2 } else { h }
}

fn hash_int(i: i64) -> i64 {
    let reduced = (i.unsigned_abs() % MODULUS) as i64;
    fix_minus_one(if i < 0 { -reduced } else { reduced })
}

/// Splits a finite non-zero float into a mantissa in `[0.5, 1)` and an exponent.
fn frexp(x: f64) -> (f64, i32) {
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }
    let bits = x.to_bits();
    let exp = ((bits >> 52) & 0x7ff) as i32;
    if exp == 0 {
        // Subnormal: scale into the normal range first.
        let (m, e) = frexp(x * 18_446_744_073_709_551_616.0);
        return (m, e - 64);
    }
    let mantissa = f64::from_bits((bits & !(0x7ff << 52)) | (1022 << 52));
    (mantissa, exp - 1022)
}

fn hash_float(f: f64) -> i64 {
    if f.is_nan() {
        return 0;
    }
    if f.is_infinite() {
        return if f > 0.0 { INF_HASH } else { -INF_HASH };
    }
    let (mut m, mut e) = frexp(f);
    let sign = if m < 0.0 {
        m = -m;
        -1
    } else {
        1
    };
    let mut x: u64 = 0;
    while m != 0.0 {
        x = ((x << 28) & MODULUS) | (x >> (MODULUS_BITS - 28));
        m *= 268_435_456.0;
        e -= 28;
        let y = m as u64;
        m -= y as f64;
        x += y;
        if x >= MODULUS {
            x -= MODULUS;
        }
    }
    let e = if e >= 0 {
        (e % MODULUS_BITS as i32) as u32
    } else {
        MODULUS_BITS - 1 - ((-1 - e) % MODULUS_BITS as i32) as u32
    };
    x = ((x << e) & MODULUS) | (x >> (MODULUS_BITS - e));
    fix_minus_one(x as i64 * sign)
}

pub(crate) fn hash_str(s: &str) -> i64 {
    hash_with_tag(0, s.as_bytes())
}

fn hash_with_tag(tag: u8, bytes: &[u8]) -> i64 {
    let mut hasher = DefaultHasher::new();
    tag.hash(&mut hasher);
    bytes.hash(&mut hasher);
    fix_minus_one(hasher.finish() as i64)
}

fn hash_tuple(items: impl Iterator<Item = Result<i64, RuntimeError>>) -> Result<i64, RuntimeError> {
    let mut acc = XXPRIME_5;
    let mut len: u64 = 0;
    for item in items {
        let lane = item? as u64;
        acc = acc.wrapping_add(lane.wrapping_mul(XXPRIME_2));
        acc = acc.rotate_left(31);
        acc = acc.wrapping_mul(XXPRIME_1);
        len += 1;
    }
    acc = acc.wrapping_add(len ^ (XXPRIME_5 ^ 3_527_539));
    if acc == u64::MAX {
        return Ok(1_546_275_796);
    }
    Ok(acc as i64)
}
