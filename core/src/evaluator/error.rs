//! Runtime evaluation errors.
//!
//! `RuntimeError` carries the message a Python interpreter would show for the
//! same failure, so hosts migrating existing snippets see familiar text.
//! `ExecutionError` pins a runtime error to the node that raised it.

use crate::parser::Span;

/// A failure raised while evaluating a compiled expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("name '{name}' is not defined")]
    NameNotDefined { name: String },

    #[error("cannot access local variable '{name}' where it is not associated with a value")]
    UnboundLocal { name: String },

    #[error(" \"{name}\" is an invalid attribute name because it starts with \"_\".")]
    InvalidAttributeName { name: String },

    /// `owner` is already rendered, e.g. `'int' object` or `module 'math'`.
    #[error("{owner} has no attribute '{attr}'")]
    MissingAttribute { owner: String, attr: String },

    /// Holds the repr of the missing key.
    #[error("{key}")]
    KeyError { key: String },

    #[error("{0}")]
    IndexError(String),

    #[error("{0}")]
    TypeError(String),

    #[error("{0}")]
    ValueError(String),

    #[error("{0}")]
    ZeroDivision(String),

    #[error("{0}")]
    Overflow(String),

    #[error("collection size exceeds the limit of {limit} elements")]
    SizeLimit { limit: usize },

    #[error("maximum evaluation depth of {max_depth} exceeded")]
    DepthExceeded { max_depth: usize },

    /// Raised by host callables and host objects.
    #[error("{message}")]
    Host { exception: String, message: String },
}

impl RuntimeError {
    pub fn type_error(message: impl Into<String>) -> Self {
        RuntimeError::TypeError(message.into())
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        RuntimeError::ValueError(message.into())
    }

    pub fn index_error(message: impl Into<String>) -> Self {
        RuntimeError::IndexError(message.into())
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        RuntimeError::Overflow(message.into())
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        RuntimeError::ZeroDivision(message.into())
    }

    /// An error raised by host code under its own exception name.
    pub fn host(exception: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::Host {
            exception: exception.into(),
            message: message.into(),
        }
    }

    /// The Python exception class this error corresponds to.
    pub fn exception(&self) -> &str {
        match self {
            RuntimeError::NameNotDefined { .. } => "NameError",
            RuntimeError::UnboundLocal { .. } => "UnboundLocalError",
            RuntimeError::InvalidAttributeName { .. } => "SyntaxError",
            RuntimeError::MissingAttribute { .. } => "AttributeError",
            RuntimeError::KeyError { .. } => "KeyError",
            RuntimeError::IndexError(_) => "IndexError",
            RuntimeError::TypeError(_) => "TypeError",
            RuntimeError::ValueError(_) => "ValueError",
            RuntimeError::ZeroDivision(_) => "ZeroDivisionError",
            RuntimeError::Overflow(_) => "OverflowError",
            RuntimeError::SizeLimit { .. } => "MemoryError",
            RuntimeError::DepthExceeded { .. } => "RecursionError",
            RuntimeError::Host { exception, .. } => exception,
        }
    }
}

/// A runtime error together with the span of the expression that raised it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}")]
pub struct ExecutionError {
    pub error: RuntimeError,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_messages() {
        assert_eq!(
            RuntimeError::NameNotDefined {
                name: "b".to_string()
            }
            .to_string(),
            "name 'b' is not defined"
        );
        assert_eq!(
            RuntimeError::InvalidAttributeName {
                name: "_private".to_string()
            }
            .to_string(),
            " \"_private\" is an invalid attribute name because it starts with \"_\"."
        );
        assert_eq!(
            RuntimeError::MissingAttribute {
                owner: "'int' object".to_string(),
                attr: "x".to_string()
            }
            .to_string(),
            "'int' object has no attribute 'x'"
        );
        assert_eq!(
            RuntimeError::KeyError {
                key: "'name'".to_string()
            }
            .to_string(),
            "'name'"
        );
    }

    #[test]
    fn test_exception_names() {
        assert_eq!(RuntimeError::type_error("x").exception(), "TypeError");
        assert_eq!(RuntimeError::zero_division("x").exception(), "ZeroDivisionError");
        assert_eq!(
            RuntimeError::host("ConnectionError", "refused").exception(),
            "ConnectionError"
        );
        assert_eq!(
            RuntimeError::DepthExceeded { max_depth: 3 }.exception(),
            "RecursionError"
        );
    }
}
