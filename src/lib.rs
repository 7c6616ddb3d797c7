//! sandeval - evaluate untrusted Python-style expressions safely
//!
//! # Overview
//!
//! sandeval evaluates single expressions written in a Python subset against a
//! caller-supplied context of named values. Typical uses are assertions over
//! HTTP responses in test suites, filters and small data transformations.
//!
//! Every expression is checked against an immutable [`Policy`] before it runs:
//!
//! - names and attributes starting with `_` are rejected
//! - `exec` and `eval` cannot be called
//! - only allow-listed builtins and libraries (`math`, `string`,
//!   `itertools`, `collections`) resolve
//!
//! At runtime every attribute access, subscript and iteration goes through an
//! access guard, so host objects only expose what they choose to.
//!
//! # Quick Start
//!
//! ```
//! use sandeval::{Context, Engine, EngineOptions};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let expr = engine.compile("sum(x * 2 for x in values) > limit").unwrap();
//!
//! let context = Context::new()
//!     .with("values", vec![1, 2, 3])
//!     .with("limit", 10);
//! assert_eq!(expr.run(&context).unwrap(), true.into());
//! ```
//!
//! # Host objects
//!
//! Host data is exposed with [`Namespace`] and [`NativeFunction`]:
//!
//! ```
//! use sandeval::{Context, Namespace, NativeFunction, Value, values::Args};
//!
//! let json = NativeFunction::new("json", |args: Args| {
//!     args.check("json", 0, 0)?;
//!     Value::dict([(Value::from("name"), Value::from("jon"))])
//! });
//! let resp = Namespace::new("Response")
//!     .with("status", 200)
//!     .with("json", json);
//!
//! let context = Context::new().with("resp", Value::object(resp));
//! let ok = sandeval::eval("resp.status == 200 and resp.json()['name'] == 'jon'", &context);
//! assert_eq!(ok.unwrap(), true.into());
//! ```
//!
//! # Errors
//!
//! Every failure is an [`Error`] carrying an [`ErrorKind`], a Python-style
//! exception name and, where possible, the span of the offending node. Use
//! [`render_error_to_string`] to show it against the source.

pub use sandeval_core::api::{
    CompilationOptions, CompiledExpression, Context, Diagnostic, Engine, EngineOptions, Error,
    ErrorKind, ExecutionOptions, Severity, compile, default_engine, eval, evaluate,
};
pub use sandeval_core::policy::{self, Policy, PolicyBuilder, PolicyError};
pub use sandeval_core::evaluator::RuntimeError;
pub use sandeval_core::values::{self, Args, HostObject, Namespace, NativeFunction, Value};

mod error_renderer;
pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
