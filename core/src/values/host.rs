//! Host-provided values: callables, objects and call arguments.
//!
//! Host callables and host objects are trusted. They inherit the caller's
//! authority; the sandbox only restricts what an expression can spell. The
//! attribute names they expose still go through the underscore rule in the
//! guard, so a host object cannot leak `_private` fields by accident.

use std::borrow::Cow;
use std::fmt;

use hashbrown::HashMap;

use crate::evaluator::RuntimeError;
use crate::values::{
    iter::ValueIter,
    value::{TypeKind, Value},
};

/// Anything an expression can call.
pub trait Callable {
    fn name(&self) -> &str;

    fn call(&self, args: Args) -> Result<Value, RuntimeError>;

    fn repr(&self) -> String {
        format!("<built-in function {}>", self.name())
    }
}

type NativeFn = dyn Fn(Args) -> Result<Value, RuntimeError>;

/// A Rust closure or function exposed as a callable value.
///
/// ```ignore
/// let double = NativeFunction::new("double", |args| {
///     args.check("double", 1, 1)?;
///     let n = args.positional[0].as_int().unwrap_or(0);
///     Ok(Value::Int(n * 2))
/// });
/// ```
pub struct NativeFunction {
    name: Cow<'static, str>,
    func: Box<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        func: impl Fn(Args) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: Args) -> Result<Value, RuntimeError> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// A builtin method implementation: receiver plus call arguments.
pub type MethodFn = fn(&Value, Args) -> Result<Value, RuntimeError>;

/// A builtin method bound to its receiver, e.g. `"abc".upper`.
pub struct BoundMethod {
    receiver: Value,
    name: &'static str,
    func: MethodFn,
}

impl BoundMethod {
    pub fn new(receiver: Value, name: &'static str, func: MethodFn) -> Self {
        Self {
            receiver,
            name,
            func,
        }
    }
}

impl Callable for BoundMethod {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, args: Args) -> Result<Value, RuntimeError> {
        (self.func)(&self.receiver, args)
    }

    fn repr(&self) -> String {
        format!(
            "<built-in method {} of {} object>",
            self.name,
            self.receiver.type_name()
        )
    }
}

/// A builtin method looked up on its type, e.g. `str.lower`. The receiver is
/// the first positional argument.
pub struct MethodDescriptor {
    owner: TypeKind,
    name: &'static str,
    func: MethodFn,
}

impl MethodDescriptor {
    pub fn new(owner: TypeKind, name: &'static str, func: MethodFn) -> Self {
        Self { owner, name, func }
    }
}

impl Callable for MethodDescriptor {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, mut args: Args) -> Result<Value, RuntimeError> {
        if args.positional.is_empty() {
            return Err(RuntimeError::type_error(format!(
                "unbound method {}.{}() needs an argument",
                self.owner.name(),
                self.name
            )));
        }
        let receiver = args.positional.remove(0);
        if !receiver.type_of().is_subtype_of(&self.owner) {
            return Err(RuntimeError::type_error(format!(
                "descriptor '{}' for '{}' objects doesn't apply to a '{}' object",
                self.name,
                self.owner.name(),
                receiver.type_name()
            )));
        }
        (self.func)(&receiver, args)
    }

    fn repr(&self) -> String {
        format!("<method '{}' of '{}' objects>", self.name, self.owner.name())
    }
}

/// A host value with attributes, items, iteration or call behavior.
///
/// Every method has a default that behaves like a plain Python object without
/// the corresponding protocol.
pub trait HostObject {
    fn type_name(&self) -> &str;

    /// Attribute lookup. `None` becomes an `AttributeError`.
    fn get_attr(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    fn get_item(&self, key: &Value) -> Result<Value, RuntimeError> {
        let _ = key;
        Err(RuntimeError::type_error(format!(
            "'{}' object is not subscriptable",
            self.type_name()
        )))
    }

    fn is_callable(&self) -> bool {
        false
    }

    fn call(&self, args: Args) -> Result<Value, RuntimeError> {
        let _ = args;
        Err(RuntimeError::type_error(format!(
            "'{}' object is not callable",
            self.type_name()
        )))
    }

    fn iter(&self) -> Option<ValueIter> {
        None
    }

    fn len(&self) -> Option<usize> {
        None
    }

    fn is_truthy(&self) -> bool {
        self.len().is_none_or(|n| n > 0)
    }

    fn repr(&self) -> String {
        format!("<{} object>", self.type_name())
    }
}

/// A ready-made host object whose attributes are a fixed set of values.
///
/// ```ignore
/// let resp = Namespace::new("Response")
///     .with("url", "http://example.com")
///     .with("status_code", 200);
/// ```
#[derive(Clone)]
pub struct Namespace {
    type_name: String,
    attrs: HashMap<String, Value>,
}

impl Namespace {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attrs: HashMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(name.into(), value.into());
    }
}

impl HostObject for Namespace {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn get_attr(&self, name: &str) -> Option<Value> {
        self.attrs.get(name).cloned()
    }

    fn repr(&self) -> String {
        let mut names: Vec<&String> = self.attrs.keys().collect();
        names.sort();
        let fields: Vec<String> = names
            .into_iter()
            .map(|name| format!("{}={}", name, self.attrs[name].repr()))
            .collect();
        format!("{}({})", self.type_name, fields.join(", "))
    }
}

/// Positional and keyword arguments of one call.
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub positional: Vec<Value>,
    pub keywords: Vec<(String, Value)>,
}

impl Args {
    pub fn new(positional: Vec<Value>) -> Self {
        Self {
            positional,
            keywords: Vec::new(),
        }
    }

    pub fn with_keywords(positional: Vec<Value>, keywords: Vec<(String, Value)>) -> Self {
        Self {
            positional,
            keywords,
        }
    }

    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Checks the positional count and that no keywords were passed.
    pub fn check(&self, name: &str, min: usize, max: usize) -> Result<(), RuntimeError> {
        self.no_keywords(name)?;
        self.check_positional(name, min, max)
    }

    pub fn check_positional(&self, name: &str, min: usize, max: usize) -> Result<(), RuntimeError> {
        let given = self.positional.len();
        if given >= min && given <= max {
            return Ok(());
        }
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        let message = if min == max {
            match min {
                0 => format!("{}() takes no arguments ({} given)", name, given),
                1 => format!("{}() takes exactly one argument ({} given)", name, given),
                n => format!("{}() takes exactly {} arguments ({} given)", name, n, given),
            }
        } else if given < min {
            format!(
                "{} expected at least {} argument{}, got {}",
                name,
                min,
                plural(min),
                given
            )
        } else {
            format!(
                "{} expected at most {} argument{}, got {}",
                name,
                max,
                plural(max),
                given
            )
        };
        Err(RuntimeError::type_error(message))
    }

    pub fn no_keywords(&self, name: &str) -> Result<(), RuntimeError> {
        if self.keywords.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::type_error(format!(
                "{}() takes no keyword arguments",
                name
            )))
        }
    }

    /// Removes and returns the keyword argument `name`.
    pub fn take_keyword(&mut self, name: &str) -> Option<Value> {
        let pos = self.keywords.iter().position(|(k, _)| k == name)?;
        Some(self.keywords.remove(pos).1)
    }

    /// Fails on any keyword argument not consumed by `take_keyword`.
    pub fn finish(&self, name: &str) -> Result<(), RuntimeError> {
        match self.keywords.first() {
            None => Ok(()),
            Some((keyword, _)) => Err(RuntimeError::type_error(format!(
                "'{}' is an invalid keyword argument for {}()",
                keyword, name
            ))),
        }
    }
}
