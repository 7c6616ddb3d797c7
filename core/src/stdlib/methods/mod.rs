//! Methods and data attributes of builtin values.
//!
//! `"abc".upper` resolves to a bound method, `str.upper` to a method
//! descriptor taking the receiver as its first argument. Both share the
//! tables below.

use std::rc::Rc;

use crate::values::{BoundMethod, MethodDescriptor, MethodFn, TypeKind, Value};

mod binary;
mod containers;
mod numeric;
mod text;

/// The method `name` of builtin type `kind`.
fn lookup(kind: &TypeKind, name: &str) -> Option<(&'static str, MethodFn)> {
    match kind {
        TypeKind::Str => text::method(name),
        TypeKind::Bytes => binary::method(name),
        TypeKind::List | TypeKind::Tuple => containers::sequence_method(kind, name),
        TypeKind::Dict => containers::dict_method(name),
        TypeKind::Counter => {
            containers::counter_method(name).or_else(|| containers::dict_method(name))
        }
        TypeKind::Set | TypeKind::FrozenSet => containers::set_method(name),
        TypeKind::Range => containers::range_method(name),
        TypeKind::Int | TypeKind::Bool => numeric::int_method(name),
        TypeKind::Float => numeric::float_method(name),
        TypeKind::Complex => numeric::complex_method(name),
        TypeKind::NoneType | TypeKind::Slice | TypeKind::Type | TypeKind::Other(_) => None,
    }
}

/// Data attributes such as `(1+2j).imag` or `range(3).stop`.
fn data_attribute(receiver: &Value, name: &str) -> Option<Value> {
    let optional = |v: Option<i64>| v.map_or(Value::None, Value::Int);
    match (receiver, name) {
        (Value::Int(_) | Value::Bool(_), "real" | "numerator") => {
            receiver.as_int().map(Value::Int)
        }
        (Value::Int(_) | Value::Bool(_), "imag") => Some(Value::Int(0)),
        (Value::Int(_) | Value::Bool(_), "denominator") => Some(Value::Int(1)),
        (Value::Float(f), "real") => Some(Value::Float(*f)),
        (Value::Float(_), "imag") => Some(Value::Float(0.0)),
        (Value::Complex { re, .. }, "real") => Some(Value::Float(*re)),
        (Value::Complex { im, .. }, "imag") => Some(Value::Float(*im)),
        (Value::Range(r), "start") => Some(Value::Int(r.start)),
        (Value::Range(r), "stop") => Some(Value::Int(r.stop)),
        (Value::Range(r), "step") => Some(Value::Int(r.step)),
        (Value::Slice(s), "start") => Some(optional(s.start)),
        (Value::Slice(s), "stop") => Some(optional(s.stop)),
        (Value::Slice(s), "step") => Some(optional(s.step)),
        _ => None,
    }
}

/// `receiver.name` for a builtin value: a data attribute or a bound method.
pub(crate) fn attribute(receiver: &Value, name: &str) -> Option<Value> {
    if let Some(value) = data_attribute(receiver, name) {
        return Some(value);
    }
    let (name, func) = lookup(&receiver.type_of(), name)?;
    Some(Value::Function(Rc::new(BoundMethod::new(
        receiver.clone(),
        name,
        func,
    ))))
}

/// `kind.name`, e.g. `str.upper`.
pub(crate) fn unbound(kind: &TypeKind, name: &str) -> Option<Value> {
    let (name, func) = lookup(kind, name)?;
    Some(Value::Function(Rc::new(MethodDescriptor::new(
        kind.clone(),
        name,
        func,
    ))))
}
