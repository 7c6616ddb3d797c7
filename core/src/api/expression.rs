//! Compiled expressions.

use std::sync::Arc;

use tracing::debug;

use super::{Context, Error, ExecutionOptions};
use crate::{evaluator, guards::PolicyGuard, parser::Expr, policy::Policy, values::Value};

/// A parsed and validated expression, ready to run any number of times.
///
/// Owns its syntax tree, its source (for diagnostics) and the policy it was
/// validated against. It holds no context, so one compiled expression can be
/// shared across threads and evaluated against different contexts.
///
/// ```
/// use sandeval_core::api::{Context, Engine};
///
/// let engine = Engine::default();
/// let expr = engine.compile("a + 2").unwrap();
/// assert_eq!(expr.run(&Context::new().with("a", 3)).unwrap(), 5.into());
/// assert_eq!(expr.run(&Context::new().with("a", 40)).unwrap(), 42.into());
/// ```
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    expr: Expr,
    source: String,
    policy: Arc<Policy>,
    options: ExecutionOptions,
}

impl CompiledExpression {
    pub(crate) fn new(
        expr: Expr,
        source: &str,
        policy: Arc<Policy>,
        options: ExecutionOptions,
    ) -> Self {
        Self {
            expr,
            source: source.to_string(),
            policy,
            options,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn policy(&self) -> &Arc<Policy> {
        &self.policy
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate against `context` with the options the expression was
    /// compiled with.
    pub fn run(&self, context: &Context) -> Result<Value, Error> {
        self.run_with_options(context, &self.options)
    }

    pub fn run_with_options(
        &self,
        context: &Context,
        options: &ExecutionOptions,
    ) -> Result<Value, Error> {
        context.check(&self.policy)?;
        debug!(source_len = self.source.len(), bindings = context.len(), "evaluating expression");

        let guard = PolicyGuard::new(&self.policy);
        match evaluator::eval_with_limits(
            &self.expr,
            &guard,
            &self.policy,
            context.bindings(),
            options.max_depth,
        ) {
            Ok(value) => {
                debug!(result = %value.type_name(), "evaluation finished");
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, exception = err.error.exception(), "evaluation failed");
                Err(Error::from_execution(err, &self.source))
            }
        }
    }
}
