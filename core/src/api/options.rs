//! Configuration for compiling and running expressions.

use crate::{evaluator, parser};

/// Limits applied while an expression is compiled.
///
/// # Example
///
/// ```
/// use sandeval_core::api::CompilationOptions;
///
/// let options = CompilationOptions {
///     max_depth: 20,
///     ..Default::default()
/// };
/// assert_eq!(options.max_tree_depth, 1000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilationOptions {
    /// Maximum bracket nesting in the source text.
    pub max_depth: usize,
    /// Maximum height of the syntax tree. Every later tree walk is bounded
    /// by this.
    pub max_tree_depth: usize,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            max_depth: parser::DEFAULT_MAX_DEPTH,
            max_tree_depth: parser::DEFAULT_MAX_TREE_DEPTH,
        }
    }
}

/// Limits applied while a compiled expression runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Maximum nesting of evaluation before `RecursionError` is reported.
    pub max_depth: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_depth: evaluator::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Defaults an [`Engine`](super::Engine) applies to everything it compiles
/// and runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub default_compilation_options: CompilationOptions,
    pub default_execution_options: ExecutionOptions,
}
