//! Restricted evaluation of Python-style expressions.
//!
//! An expression is parsed, validated against an immutable [`policy::Policy`]
//! and then evaluated against a caller-supplied context. Private names,
//! forbidden calls and unlisted builtins are unreachable from expression text.
//! Start with [`api`].

pub mod api;
pub mod evaluator;
pub mod guards;
pub mod parser;
pub mod policy;
pub mod scope_stack;
pub mod stdlib;
pub mod syntax;
pub mod validator;
pub mod values;

pub use api::{CompiledExpression, Context, Engine, Error, ErrorKind, compile, eval, evaluate};
pub use values::Value;
