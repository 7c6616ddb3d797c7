//! Tree-walking evaluator for parsed, validated expressions.
//!
//! ## Design Principles
//!
//! - **Never panic**: all adversarial inputs are handled gracefully
//! - **Stack-safe**: depth tracking prevents stack overflow from deeply nested expressions
//! - **Guarded**: attribute access, subscripts and iteration go through an [`AccessGuard`]
//!
//! ## Example
//!
//! ```ignore
//! use sandeval_core::{evaluator, guards::PolicyGuard, parser, policy::Policy};
//!
//! let policy = Policy::standard();
//! let expr = parser::parse("1 + 2").unwrap();
//! let result = evaluator::eval(&expr, &PolicyGuard::new(&policy), &policy, &Default::default());
//! assert_eq!(result.unwrap(), 3.into());
//! ```

mod error;
mod eval;
pub(crate) mod operators;
mod percent;

#[cfg(test)]
mod eval_test;

pub use error::{ExecutionError, RuntimeError};
pub use eval::Evaluator;

use hashbrown::HashMap;

use crate::{guards::AccessGuard, parser::Expr, policy::Policy, values::Value};

/// Default limit on nested evaluation.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Evaluate `expr` with the default depth limit.
///
/// `context` binds the caller's names; it is only borrowed for the duration of
/// the call.
pub fn eval(
    expr: &Expr,
    guard: &dyn AccessGuard,
    policy: &Policy,
    context: &HashMap<String, Value>,
) -> Result<Value, ExecutionError> {
    eval_with_limits(expr, guard, policy, context, DEFAULT_MAX_DEPTH)
}

/// Evaluate `expr`, failing with `DepthExceeded` once evaluation nests deeper
/// than `max_depth`.
pub fn eval_with_limits(
    expr: &Expr,
    guard: &dyn AccessGuard,
    policy: &Policy,
    context: &HashMap<String, Value>,
    max_depth: usize,
) -> Result<Value, ExecutionError> {
    Evaluator::new(guard, policy, context, max_depth).eval(expr)
}
