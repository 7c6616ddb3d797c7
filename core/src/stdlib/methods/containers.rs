//! Methods of `list`, `tuple`, `dict`, `Counter`, `set`, `frozenset` and
//! `range`. Containers are immutable, so only the non-mutating half of each
//! Python type is here.

use std::rc::Rc;

use crate::{
    evaluator::{RuntimeError, operators::set_of},
    stdlib::{collections, index_arg},
    values::{Args, MethodFn, TypeKind, Value, ValueSet, py_eq},
};

pub(super) fn sequence_method(kind: &TypeKind, name: &str) -> Option<(&'static str, MethodFn)> {
    let entry: (&'static str, MethodFn) = match name {
        "index" => ("index", sequence_index),
        "count" => ("count", sequence_count),
        "copy" if *kind == TypeKind::List => ("copy", copy),
        _ => return None,
    };
    Some(entry)
}

pub(super) fn dict_method(name: &str) -> Option<(&'static str, MethodFn)> {
    let entry: (&'static str, MethodFn) = match name {
        "get" => ("get", dict_get),
        "keys" => ("keys", dict_keys),
        "values" => ("values", dict_values),
        "items" => ("items", dict_items),
        "copy" => ("copy", copy),
        _ => return None,
    };
    Some(entry)
}

pub(super) fn counter_method(name: &str) -> Option<(&'static str, MethodFn)> {
    let entry: (&'static str, MethodFn) = match name {
        "most_common" => ("most_common", collections::most_common_method),
        "elements" => ("elements", collections::elements),
        "total" => ("total", collections::total),
        _ => return None,
    };
    Some(entry)
}

pub(super) fn set_method(name: &str) -> Option<(&'static str, MethodFn)> {
    let entry: (&'static str, MethodFn) = match name {
        "union" => ("union", union),
        "intersection" => ("intersection", intersection),
        "difference" => ("difference", difference),
        "symmetric_difference" => ("symmetric_difference", symmetric_difference),
        "issubset" => ("issubset", issubset),
        "issuperset" => ("issuperset", issuperset),
        "isdisjoint" => ("isdisjoint", isdisjoint),
        "copy" => ("copy", copy),
        _ => return None,
    };
    Some(entry)
}

pub(super) fn range_method(name: &str) -> Option<(&'static str, MethodFn)> {
    let entry: (&'static str, MethodFn) = match name {
        "index" => ("index", range_index),
        "count" => ("count", range_count),
        _ => return None,
    };
    Some(entry)
}

/// Immutable values are their own copies.
fn copy(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("copy", 0, 0)?;
    Ok(receiver.clone())
}

// ============================================================================
// list and tuple
// ============================================================================

/// Resolves optional `start`/`stop` arguments against `len`, clamping like
/// slice bounds.
fn bounds(args: &Args, len: usize) -> Result<(usize, usize), RuntimeError> {
    let len = len as i64;
    let resolve = |v: Option<&Value>, default: i64| -> Result<i64, RuntimeError> {
        match v {
            None => Ok(default),
            Some(v) => {
                let i = index_arg(v)?;
                Ok(if i < 0 { (i + len).max(0) } else { i.min(len) })
            }
        }
    };
    let start = resolve(args.get(1), 0)?;
    let stop = resolve(args.get(2), len)?;
    Ok((start as usize, stop.max(start) as usize))
}

fn sequence_index(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("index", 1, 3)?;
    let items = receiver.as_sequence().unwrap_or_default();
    let needle = &args.positional[0];
    let (start, stop) = bounds(&args, items.len())?;
    items[start..stop]
        .iter()
        .position(|item| py_eq(item, needle))
        .map(|i| Value::Int((start + i) as i64))
        .ok_or_else(|| match receiver {
            Value::Tuple(_) => RuntimeError::value_error("tuple.index(x): x not in tuple"),
            _ => RuntimeError::value_error(format!("{} is not in list", needle.repr())),
        })
}

fn sequence_count(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("count", 1, 1)?;
    let needle = &args.positional[0];
    let items = receiver.as_sequence().unwrap_or_default();
    Ok(Value::Int(
        items.iter().filter(|item| py_eq(item, needle)).count() as i64,
    ))
}

// ============================================================================
// dict
// ============================================================================

fn dict_get(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("get", 1, 2)?;
    let Some(dict) = receiver.as_dict() else {
        return Ok(Value::None);
    };
    let default = args.get(1).cloned().unwrap_or(Value::None);
    Ok(dict.get(&args.positional[0])?.cloned().unwrap_or(default))
}

fn dict_keys(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("keys", 0, 0)?;
    let keys: Vec<Value> = receiver
        .as_dict()
        .map(|d| d.keys().cloned().collect())
        .unwrap_or_default();
    Ok(Value::list(keys))
}

fn dict_values(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("values", 0, 0)?;
    let values: Vec<Value> = receiver
        .as_dict()
        .map(|d| d.values().cloned().collect())
        .unwrap_or_default();
    Ok(Value::list(values))
}

fn dict_items(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("items", 0, 0)?;
    let items: Vec<Value> = receiver
        .as_dict()
        .map(|d| {
            d.iter()
                .map(|(k, v)| Value::tuple(vec![k.clone(), v.clone()]))
                .collect()
        })
        .unwrap_or_default();
    Ok(Value::list(items))
}

// ============================================================================
// set and frozenset
// ============================================================================

/// Wraps `set` in the receiver's own type.
fn same_kind(receiver: &Value, set: ValueSet) -> Value {
    match receiver {
        Value::FrozenSet(_) => Value::FrozenSet(Rc::new(set)),
        _ => Value::Set(Rc::new(set)),
    }
}

/// Folds every argument into the receiver with `op`.
fn fold_sets(
    receiver: &Value,
    args: Args,
    name: &str,
    op: fn(&ValueSet, &ValueSet) -> Result<ValueSet, RuntimeError>,
) -> Result<Value, RuntimeError> {
    args.no_keywords(name)?;
    let mut acc = set_of(receiver)?;
    for other in &args.positional {
        acc = op(&acc, &set_of(other)?)?;
    }
    Ok(same_kind(receiver, acc))
}

fn union(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    fold_sets(receiver, args, "union", ValueSet::union)
}

fn intersection(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    fold_sets(receiver, args, "intersection", ValueSet::intersection)
}

fn difference(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    fold_sets(receiver, args, "difference", ValueSet::difference)
}

fn symmetric_difference(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("symmetric_difference", 1, 1)?;
    let other = set_of(&args.positional[0])?;
    let result = set_of(receiver)?.symmetric_difference(&other)?;
    Ok(same_kind(receiver, result))
}

fn set_predicate(
    receiver: &Value,
    args: Args,
    name: &str,
    test: fn(&ValueSet, &ValueSet) -> Result<bool, RuntimeError>,
) -> Result<Value, RuntimeError> {
    args.check(name, 1, 1)?;
    let other = set_of(&args.positional[0])?;
    Ok(Value::Bool(test(&set_of(receiver)?, &other)?))
}

fn issubset(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    set_predicate(receiver, args, "issubset", ValueSet::is_subset)
}

fn issuperset(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    set_predicate(receiver, args, "issuperset", |a, b| b.is_subset(a))
}

fn isdisjoint(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    set_predicate(receiver, args, "isdisjoint", ValueSet::is_disjoint)
}

// ============================================================================
// range
// ============================================================================

/// Only exact ints (and bools) can be members of a range.
fn range_member(receiver: &Value, needle: &Value) -> Option<i64> {
    let Value::Range(range) = receiver else {
        return None;
    };
    let n = needle.as_int()?;
    range
        .contains(n)
        .then(|| ((n as i128 - range.start as i128) / range.step as i128) as i64)
}

fn range_index(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("index", 1, 1)?;
    let needle = &args.positional[0];
    range_member(receiver, needle)
        .map(Value::Int)
        .ok_or_else(|| RuntimeError::value_error(format!("{} is not in range", needle.repr())))
}

fn range_count(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("count", 1, 1)?;
    let found = range_member(receiver, &args.positional[0]).is_some();
    Ok(Value::Int(found as i64))
}
