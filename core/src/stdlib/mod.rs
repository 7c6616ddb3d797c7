//! Standard library: the builtins and library modules an expression may use.
//!
//! Everything here is looked up by name. Whether a name is *reachable* from an
//! expression is decided by the [`Policy`](crate::policy::Policy); this module
//! only answers what exists and how to build it.
//!
//! - Builtins: type objects (`int`, `str`, `list`, ...) and functions
//!   (`sorted`, `sum`, `len`, ...)
//! - Libraries: `string`, `math`, `collections`, `itertools`
//! - Methods of builtin values (`"a".upper`, `{}.get`, ...)

use crate::{
    evaluator::RuntimeError,
    values::{Args, NativeFunction, TypeKind, Value},
};

pub mod builtins;
pub mod collections;
pub mod constructors;
pub mod itertools;
pub mod math;
pub(crate) mod methods;
pub mod string;

pub use constructors::construct;

/// Library modules `stdlib` implements.
const LIBRARIES: &[&str] = &["string", "math", "collections", "itertools"];

pub(crate) type BuiltinFn = fn(Args) -> Result<Value, RuntimeError>;

pub(crate) fn native(name: &'static str, func: BuiltinFn) -> Value {
    Value::function(NativeFunction::new(name, func))
}

/// The builtin type object spelled `name`, if any.
pub fn builtin_type(name: &str) -> Option<TypeKind> {
    Some(match name {
        "bool" => TypeKind::Bool,
        "int" => TypeKind::Int,
        "float" => TypeKind::Float,
        "complex" => TypeKind::Complex,
        "str" => TypeKind::Str,
        "bytes" => TypeKind::Bytes,
        "tuple" => TypeKind::Tuple,
        "list" => TypeKind::List,
        "set" => TypeKind::Set,
        "frozenset" => TypeKind::FrozenSet,
        "range" => TypeKind::Range,
        "slice" => TypeKind::Slice,
        "type" => TypeKind::Type,
        _ => return None,
    })
}

/// The builtin spelled `name`, whether or not a policy allows it.
pub fn builtin(name: &str) -> Option<Value> {
    match builtin_type(name) {
        Some(kind) => Some(Value::Type(kind)),
        None => builtins::function(name),
    }
}

pub fn has_builtin(name: &str) -> bool {
    builtin_type(name).is_some() || builtins::function(name).is_some()
}

pub fn has_library(name: &str) -> bool {
    LIBRARIES.contains(&name)
}

/// The member `member` of library `library`, whether or not a policy allows it.
pub fn library_member(library: &str, member: &str) -> Option<Value> {
    match library {
        "string" => string::member(member),
        "math" => math::member(member),
        "collections" => collections::member(member),
        "itertools" => itertools::member(member),
        _ => None,
    }
}

pub fn has_library_member(library: &str, member: &str) -> bool {
    library_member(library, member).is_some()
}

/// Calls any callable value: builtin functions, bound methods, type objects
/// and callable host objects.
pub fn call(func: &Value, args: Args) -> Result<Value, RuntimeError> {
    match func {
        Value::Function(f) => f.call(args),
        Value::Type(kind) => construct(kind, args),
        Value::Object(obj) if obj.is_callable() => obj.call(args),
        other => Err(RuntimeError::type_error(format!(
            "'{}' object is not callable",
            other.type_name()
        ))),
    }
}

/// An integer argument, as `operator.index` accepts it.
pub(crate) fn index_arg(value: &Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(value.as_int().unwrap_or(0)),
        other => Err(RuntimeError::type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            other.type_name()
        ))),
    }
}

/// A real-number argument.
pub(crate) fn float_arg(value: &Value) -> Result<f64, RuntimeError> {
    value.as_float().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "must be real number, not {}",
            value.type_name()
        ))
    })
}

/// A `str` argument of function `name`.
pub(crate) fn str_arg<'a>(name: &str, value: &'a Value) -> Result<&'a str, RuntimeError> {
    value.as_str().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "{}() argument must be str, not {}",
            name,
            value.type_name()
        ))
    })
}
