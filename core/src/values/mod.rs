//! Runtime values and the protocols host code uses to provide its own.

pub mod collections;
mod display;
pub mod equality;
pub mod host;
pub mod iter;
#[cfg(feature = "json")]
mod json;
pub mod value;

pub use collections::{Dict, ValueSet};
pub use display::{format_complex, format_float};
pub use equality::{identity, is_identical, less_than, py_eq, py_hash, rich_compare};
pub use host::{Args, BoundMethod, Callable, HostObject, MethodDescriptor, MethodFn, NativeFunction, Namespace};
pub use iter::{OneShot, ValueIter, collect, iterate};
pub use value::{MAX_COLLECTION_LEN, RangeValue, SliceValue, TypeKind, Value, check_len};
