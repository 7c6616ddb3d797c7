//! Public API for compiling and evaluating restricted expressions.
//!
//! Compilation parses the source and validates the whole tree against a
//! [`Policy`](crate::policy::Policy). Evaluation runs a compiled expression
//! against a [`Context`], routing every attribute access, subscript and
//! iteration through the policy's access guard.
//!
//! # Example
//!
//! ```
//! use sandeval_core::api::{self, Context, ErrorKind};
//!
//! let context = Context::new().with("a", 3);
//! assert_eq!(api::eval("a + 2", &context).unwrap(), 5.into());
//!
//! let err = api::eval("b", &context).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::NameResolution);
//! assert_eq!(err.to_string(), "name 'b' is not defined");
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod expression;
pub mod options;

pub use context::Context;
pub use engine::Engine;
pub use error::{Diagnostic, Error, ErrorKind, Severity};
pub use expression::CompiledExpression;
pub use options::{CompilationOptions, EngineOptions, ExecutionOptions};

use lazy_static::lazy_static;

use crate::values::Value;

lazy_static! {
    static ref DEFAULT_ENGINE: Engine = Engine::default();
}

/// The engine behind the free functions: standard policy, default options.
pub fn default_engine() -> &'static Engine {
    &DEFAULT_ENGINE
}

/// Compile `source` with the default engine.
pub fn compile(source: &str) -> Result<CompiledExpression, Error> {
    DEFAULT_ENGINE.compile(source)
}

/// Evaluate an already compiled expression with the default engine.
pub fn evaluate(compiled: &CompiledExpression, context: &Context) -> Result<Value, Error> {
    DEFAULT_ENGINE.evaluate(compiled, context)
}

/// Compile and evaluate `source` with the default engine.
pub fn eval(source: &str, context: &Context) -> Result<Value, Error> {
    DEFAULT_ENGINE.eval(source, context)
}
