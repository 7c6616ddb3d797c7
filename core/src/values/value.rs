//! The dynamic value model.

use std::rc::Rc;

use crate::evaluator::RuntimeError;
use crate::values::{
    collections::{Dict, ValueSet},
    host::{Callable, HostObject, NativeFunction},
    iter::OneShot,
};

/// Upper bound on the length of any collection, string or bytes value an
/// expression may build.
pub const MAX_COLLECTION_LEN: usize = 10_000_000;

/// Fails with `SizeLimit` when `len` exceeds [`MAX_COLLECTION_LEN`].
pub fn check_len(len: usize) -> Result<(), RuntimeError> {
    if len > MAX_COLLECTION_LEN {
        return Err(RuntimeError::SizeLimit {
            limit: MAX_COLLECTION_LEN,
        });
    }
    Ok(())
}

/// A runtime value.
///
/// Heap values are reference counted and never mutated after construction,
/// so cloning a `Value` is cheap and values from the host context can be
/// shared with the result without copying.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex { re: f64, im: f64 },
    Str(Rc<str>),
    Bytes(Rc<[u8]>),
    Tuple(Rc<[Value]>),
    List(Rc<[Value]>),
    Set(Rc<ValueSet>),
    FrozenSet(Rc<ValueSet>),
    /// Insertion ordered. Also represents `collections.Counter`.
    Dict(Rc<Dict>),
    Range(RangeValue),
    Slice(SliceValue),
    /// One-shot iterator produced by generator expressions, `zip` and
    /// `itertools`.
    Iterator(Rc<OneShot>),
    Type(TypeKind),
    Function(Rc<dyn Callable>),
    /// An allowed library module, by name.
    Module(&'static str),
    Object(Rc<dyn HostObject>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeValue {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl RangeValue {
    pub fn len(&self) -> usize {
        let (lo, hi, step) = if self.step > 0 {
            (self.start as i128, self.stop as i128, self.step as i128)
        } else {
            (self.stop as i128, self.start as i128, -(self.step as i128))
        };
        if lo >= hi {
            0
        } else {
            ((hi - lo - 1) / step + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th element, for `0 <= index < len`.
    pub fn nth(&self, index: usize) -> i64 {
        (self.start as i128 + self.step as i128 * index as i128) as i64
    }

    pub fn contains(&self, value: i64) -> bool {
        let in_bounds = if self.step > 0 {
            self.start <= value && value < self.stop
        } else {
            self.stop < value && value <= self.start
        };
        in_bounds && (value as i128 - self.start as i128) % self.step as i128 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceValue {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl SliceValue {
    /// Resolves the slice against a sequence of `len` elements, the way
    /// `slice.indices` does. Returns `(start, stop, step)`; the bounds are
    /// wide because a range can hold more than `i64::MAX` elements.
    pub fn indices(&self, len: usize) -> Result<(i128, i128, i64), RuntimeError> {
        let len = len as i128;
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(RuntimeError::value_error("slice step cannot be zero"));
        }
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: Option<i64>, default: i128| match bound {
            None => default,
            Some(i) if i < 0 => (i as i128 + len).max(lower),
            Some(i) => (i as i128).min(upper),
        };
        let start = clamp(self.start, if step < 0 { upper } else { lower });
        let stop = clamp(self.stop, if step < 0 { lower } else { upper });
        Ok((start, stop, step))
    }

    /// Element positions selected from a sequence of `len` elements.
    pub fn positions(&self, len: usize) -> Result<Vec<usize>, RuntimeError> {
        let (start, stop, step) = self.indices(len)?;
        let step = step as i128;
        let count = if step > 0 {
            (stop - start + step - 1).max(0) / step
        } else {
            (start - stop - step - 1).max(0) / -step
        };
        Ok((0..count).map(|i| (start + i * step) as usize).collect())
    }
}

/// A type object. Builtin types are callable as constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    NoneType,
    Bool,
    Int,
    Float,
    Complex,
    Str,
    Bytes,
    Tuple,
    List,
    Set,
    FrozenSet,
    Dict,
    Range,
    Slice,
    Type,
    Counter,
    /// Types that cannot be constructed from an expression: iterators,
    /// functions, modules and host object types.
    Other(Rc<str>),
}

impl TypeKind {
    pub fn name(&self) -> &str {
        match self {
            TypeKind::NoneType => "NoneType",
            TypeKind::Bool => "bool",
            TypeKind::Int => "int",
            TypeKind::Float => "float",
            TypeKind::Complex => "complex",
            TypeKind::Str => "str",
            TypeKind::Bytes => "bytes",
            TypeKind::Tuple => "tuple",
            TypeKind::List => "list",
            TypeKind::Set => "set",
            TypeKind::FrozenSet => "frozenset",
            TypeKind::Dict => "dict",
            TypeKind::Range => "range",
            TypeKind::Slice => "slice",
            TypeKind::Type => "type",
            TypeKind::Counter => "Counter",
            TypeKind::Other(name) => name,
        }
    }

    /// The name used in `<class '...'>`.
    pub fn qualified_name(&self) -> &str {
        match self {
            TypeKind::Counter => "collections.Counter",
            other => other.name(),
        }
    }

    /// `issubclass(self, other)` over the builtin hierarchy.
    pub fn is_subtype_of(&self, other: &TypeKind) -> bool {
        self == other
            || matches!(
                (self, other),
                (TypeKind::Bool, TypeKind::Int) | (TypeKind::Counter, TypeKind::Dict)
            )
    }

    pub fn is_constructible(&self) -> bool {
        !matches!(self, TypeKind::NoneType | TypeKind::Other(_))
    }
}

impl Value {
    pub fn str(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn bytes(b: impl Into<Rc<[u8]>>) -> Self {
        Value::Bytes(b.into())
    }

    pub fn list(items: impl Into<Rc<[Value]>>) -> Self {
        Value::List(items.into())
    }

    pub fn tuple(items: impl Into<Rc<[Value]>>) -> Self {
        Value::Tuple(items.into())
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Value::Complex { re, im }
    }

    pub fn range(start: i64, stop: i64, step: i64) -> Self {
        Value::Range(RangeValue { start, stop, step })
    }

    /// Builds a dict, failing on unhashable keys.
    pub fn dict(entries: impl IntoIterator<Item = (Value, Value)>) -> Result<Self, RuntimeError> {
        let mut dict = Dict::new();
        for (key, value) in entries {
            dict.insert(key, value)?;
        }
        Ok(Value::Dict(Rc::new(dict)))
    }

    /// Builds a set, failing on unhashable items.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Result<Self, RuntimeError> {
        Ok(Value::Set(Rc::new(ValueSet::from_values(items)?)))
    }

    pub fn frozenset(items: impl IntoIterator<Item = Value>) -> Result<Self, RuntimeError> {
        Ok(Value::FrozenSet(Rc::new(ValueSet::from_values(items)?)))
    }

    pub fn function(function: NativeFunction) -> Self {
        Value::Function(Rc::new(function))
    }

    pub fn object(object: impl HostObject + 'static) -> Self {
        Value::Object(Rc::new(object))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integers, with `bool` promoted as in arithmetic.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// Any real number as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Bool(b) => Some(*b as i64 as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Elements of a list or tuple.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&ValueSet> {
        match self {
            Value::Set(s) | Value::FrozenSet(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_of(&self) -> TypeKind {
        match self {
            Value::None => TypeKind::NoneType,
            Value::Bool(_) => TypeKind::Bool,
            Value::Int(_) => TypeKind::Int,
            Value::Float(_) => TypeKind::Float,
            Value::Complex { .. } => TypeKind::Complex,
            Value::Str(_) => TypeKind::Str,
            Value::Bytes(_) => TypeKind::Bytes,
            Value::Tuple(_) => TypeKind::Tuple,
            Value::List(_) => TypeKind::List,
            Value::Set(_) => TypeKind::Set,
            Value::FrozenSet(_) => TypeKind::FrozenSet,
            Value::Dict(d) if d.is_counter() => TypeKind::Counter,
            Value::Dict(_) => TypeKind::Dict,
            Value::Range(_) => TypeKind::Range,
            Value::Slice(_) => TypeKind::Slice,
            Value::Iterator(it) => TypeKind::Other(Rc::from(it.type_name())),
            Value::Type(_) => TypeKind::Type,
            Value::Function(_) => TypeKind::Other(Rc::from("builtin_function_or_method")),
            Value::Module(_) => TypeKind::Other(Rc::from("module")),
            Value::Object(obj) => TypeKind::Other(Rc::from(obj.type_name())),
        }
    }

    /// The type name used in error messages, e.g. `'int' object is not iterable`.
    pub fn type_name(&self) -> String {
        match self {
            Value::Object(obj) => obj.type_name().to_string(),
            Value::Iterator(it) => it.type_name().to_string(),
            other => other.type_of().name().to_string(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Complex { re, im } => *re != 0.0 || *im != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::Tuple(items) | Value::List(items) => !items.is_empty(),
            Value::Set(s) | Value::FrozenSet(s) => !s.is_empty(),
            Value::Dict(d) => !d.is_empty(),
            Value::Range(r) => !r.is_empty(),
            Value::Object(obj) => obj.is_truthy(),
            Value::Slice(_)
            | Value::Iterator(_)
            | Value::Type(_)
            | Value::Function(_)
            | Value::Module(_) => true,
        }
    }

    pub fn is_callable(&self) -> bool {
        match self {
            Value::Function(_) => true,
            Value::Type(kind) => kind.is_constructible(),
            Value::Object(obj) => obj.is_callable(),
            _ => false,
        }
    }

    /// `len(value)`, or `None` for values without a length.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Bytes(b) => Some(b.len()),
            Value::Tuple(items) | Value::List(items) => Some(items.len()),
            Value::Set(s) | Value::FrozenSet(s) => Some(s.len()),
            Value::Dict(d) => Some(d.len()),
            Value::Range(r) => Some(r.len()),
            Value::Object(obj) => obj.len(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

impl From<NativeFunction> for Value {
    fn from(function: NativeFunction) -> Self {
        Value::function(function)
    }
}

impl From<TypeKind> for Value {
    fn from(kind: TypeKind) -> Self {
        Value::Type(kind)
    }
}
