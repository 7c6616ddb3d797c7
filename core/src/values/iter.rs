//! Iteration over values.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::evaluator::RuntimeError;
use crate::values::value::{RangeValue, Value};

/// A one-shot iterator. Iterating it drains it, so a second pass sees
/// nothing, as with Python generators.
pub struct OneShot {
    type_name: &'static str,
    items: RefCell<VecDeque<Value>>,
}

impl OneShot {
    pub fn new(type_name: &'static str, items: Vec<Value>) -> Self {
        Self {
            type_name,
            items: RefCell::new(items.into()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn next(&self) -> Option<Value> {
        self.items.borrow_mut().pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.items.borrow().len()
    }
}

/// A lazy iterator over the items of a value.
pub struct ValueIter {
    inner: Box<dyn Iterator<Item = Value>>,
}

impl ValueIter {
    pub fn new(inner: impl Iterator<Item = Value> + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    pub fn from_shared(items: Rc<[Value]>) -> Self {
        let len = items.len();
        Self::new((0..len).map(move |i| items[i].clone()))
    }

    pub fn from_range(range: RangeValue) -> Self {
        Self::new((0..range.len()).map(move |i| Value::Int(range.nth(i))))
    }

    pub fn from_one_shot(iter: Rc<OneShot>) -> Self {
        Self::new(std::iter::from_fn(move || iter.next()))
    }
}

impl From<Vec<Value>> for ValueIter {
    fn from(items: Vec<Value>) -> Self {
        Self::new(items.into_iter())
    }
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// `iter(value)`.
pub fn iterate(value: &Value) -> Result<ValueIter, RuntimeError> {
    match value {
        Value::List(items) | Value::Tuple(items) => Ok(ValueIter::from_shared(items.clone())),
        Value::Str(s) => {
            let s = s.clone();
            let mut offset = 0;
            Ok(ValueIter::new(std::iter::from_fn(move || {
                let c = s[offset..].chars().next()?;
                offset += c.len_utf8();
                Some(Value::from(c.to_string()))
            })))
        }
        Value::Bytes(b) => {
            let b = b.clone();
            Ok(ValueIter::new(
                (0..b.len()).map(move |i| Value::Int(b[i] as i64)),
            ))
        }
        Value::Set(set) | Value::FrozenSet(set) => {
            let set = set.clone();
            let len = set.len();
            Ok(ValueIter::new((0..len).filter_map(move |i| set.get_index(i).cloned())))
        }
        Value::Dict(dict) => Ok(ValueIter::from(dict.keys().cloned().collect::<Vec<_>>())),
        Value::Range(range) => Ok(ValueIter::from_range(*range)),
        Value::Iterator(iter) => Ok(ValueIter::from_one_shot(iter.clone())),
        Value::Object(obj) => obj.iter().ok_or_else(|| not_iterable(value)),
        _ => Err(not_iterable(value)),
    }
}

/// Collects every item of an iterable, enforcing the collection size limit.
pub fn collect(value: &Value) -> Result<Vec<Value>, RuntimeError> {
    if let Some(len) = value.len() {
        crate::values::check_len(len)?;
    }
    let mut out = Vec::new();
    for item in iterate(value)? {
        out.push(item);
        if out.len() > crate::values::MAX_COLLECTION_LEN {
            crate::values::check_len(out.len())?;
        }
    }
    Ok(out)
}

fn not_iterable(value: &Value) -> RuntimeError {
    RuntimeError::type_error(format!("'{}' object is not iterable", value.type_name()))
}
