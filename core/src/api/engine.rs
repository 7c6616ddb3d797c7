//! The compilation engine.

use std::sync::Arc;

use tracing::debug;

use super::{CompilationOptions, CompiledExpression, Context, EngineOptions, Error};
use crate::{parser, policy::Policy, validator, values::Value};

/// Compiles expressions against a policy and evaluates them.
///
/// An engine is immutable and `Send + Sync`; share one for the life of the
/// host.
///
/// # Example
///
/// ```
/// use sandeval_core::api::{Context, Engine, EngineOptions, ErrorKind};
///
/// let engine = Engine::new(EngineOptions::default());
///
/// let value = engine.eval("a + 2", &Context::new().with("a", 3)).unwrap();
/// assert_eq!(value, 5.into());
///
/// let err = engine.compile("exec('3')").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::Syntax);
/// assert_eq!(err.message(), "Exec calls are not allowed.");
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    policy: Arc<Policy>,
    options: EngineOptions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Engine {
    /// An engine using the standard policy.
    pub fn new(options: EngineOptions) -> Self {
        Self::with_policy(Policy::standard(), options)
    }

    pub fn with_policy(policy: Arc<Policy>, options: EngineOptions) -> Self {
        Self { policy, options }
    }

    pub fn policy(&self) -> &Arc<Policy> {
        &self.policy
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Parse and validate `source` with the engine's default options.
    pub fn compile(&self, source: &str) -> Result<CompiledExpression, Error> {
        self.compile_with_options(source, &self.options.default_compilation_options)
    }

    /// Parse and validate `source`.
    ///
    /// The whole tree is checked before anything runs: a forbidden call is
    /// rejected even when evaluation would never reach it.
    pub fn compile_with_options(
        &self,
        source: &str,
        options: &CompilationOptions,
    ) -> Result<CompiledExpression, Error> {
        debug!(source_len = source.len(), "compiling expression");

        let expr = parser::parse_with_limits(source, options.max_depth, options.max_tree_depth)?;
        validator::validate(&expr, &self.policy)
            .map_err(|violation| Error::from_violation(violation, source))?;

        debug!(tree_depth = expr.depth, "compiled expression");
        Ok(CompiledExpression::new(
            expr,
            source,
            Arc::clone(&self.policy),
            self.options.default_execution_options,
        ))
    }

    /// Evaluate a compiled expression with the engine's execution options.
    pub fn evaluate(&self, compiled: &CompiledExpression, context: &Context) -> Result<Value, Error> {
        compiled.run_with_options(context, &self.options.default_execution_options)
    }

    /// Compile and evaluate in one step.
    pub fn eval(&self, source: &str, context: &Context) -> Result<Value, Error> {
        let compiled = self.compile(source)?;
        self.evaluate(&compiled, context)
    }
}
