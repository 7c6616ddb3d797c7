//! The public error type and its rendering-friendly form.

use core::fmt;

use crate::{
    evaluator::{ExecutionError, RuntimeError},
    parser::{ParseError, Span},
    validator::{PolicyViolation, ViolationKind},
};

/// Broad category of a failure, stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed source, nesting limits, forbidden calls.
    Syntax,
    /// A name or attribute starting with `_`.
    NamingPolicy,
    /// A name that is neither in scope, in the context nor allowed by the policy.
    NameResolution,
    /// Type and value errors raised at runtime.
    RuntimeType,
    /// Missing attributes, keys and indices.
    Lookup,
    /// The caller's context binds a name it may not bind.
    InvalidContext,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::NamingPolicy => "naming policy violation",
            ErrorKind::NameResolution => "name resolution error",
            ErrorKind::RuntimeType => "runtime error",
            ErrorKind::Lookup => "lookup error",
            ErrorKind::InvalidContext => "invalid context",
        };
        f.write_str(name)
    }
}

/// A failure to compile or evaluate an expression.
///
/// `Display` shows the message only; use [`Error::to_diagnostic`] to render it
/// against the source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    span: Option<Span>,
    src: String,
    exception: String,
    code: Option<String>,
    help: Option<String>,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where in the source the failure happened, when it is tied to a node.
    pub fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }

    /// The expression source the error refers to.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Python-style exception class name, e.g. `TypeError`.
    pub fn exception(&self) -> &str {
        &self.exception
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            message: self.message.clone(),
            span: self.span.clone().unwrap_or(Span(0..0)),
            help: self.help.clone(),
            code: self.code.clone(),
        }
    }

    pub(crate) fn invalid_context(message: impl Into<String>) -> Self {
        Error {
            kind: ErrorKind::InvalidContext,
            message: message.into(),
            span: None,
            src: String::new(),
            exception: "ValueError".to_string(),
            code: Some("C001".to_string()),
            help: Some("Rename the context entry".to_string()),
        }
    }

    pub(crate) fn from_violation(violation: PolicyViolation, src: &str) -> Self {
        let diagnostic = violation.to_diagnostic();
        let kind = match violation.kind {
            ViolationKind::ForbiddenCall { .. } => ErrorKind::Syntax,
            ViolationKind::InvalidAttributeName { .. } | ViolationKind::InvalidVariableName { .. } => {
                ErrorKind::NamingPolicy
            }
        };
        Error {
            kind,
            message: diagnostic.message,
            span: Some(violation.span),
            src: src.to_string(),
            exception: "SyntaxError".to_string(),
            code: diagnostic.code,
            help: diagnostic.help,
        }
    }

    pub(crate) fn from_execution(err: ExecutionError, src: &str) -> Self {
        let kind = match &err.error {
            RuntimeError::NameNotDefined { .. } | RuntimeError::UnboundLocal { .. } => {
                ErrorKind::NameResolution
            }
            RuntimeError::InvalidAttributeName { .. } => ErrorKind::NamingPolicy,
            RuntimeError::MissingAttribute { .. }
            | RuntimeError::KeyError { .. }
            | RuntimeError::IndexError(_) => ErrorKind::Lookup,
            RuntimeError::Host { exception, .. }
                if matches!(exception.as_str(), "KeyError" | "IndexError" | "AttributeError") =>
            {
                ErrorKind::Lookup
            }
            _ => ErrorKind::RuntimeType,
        };
        let code = match kind {
            ErrorKind::NameResolution => "R001",
            ErrorKind::NamingPolicy => "R002",
            ErrorKind::Lookup => "R003",
            _ => "R004",
        };
        Error {
            kind,
            message: err.error.to_string(),
            span: Some(err.span),
            src: src.to_string(),
            exception: err.error.exception().to_string(),
            code: Some(code.to_string()),
            help: None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        let diagnostic = err.to_diagnostic();
        Error {
            kind: ErrorKind::Syntax,
            message: diagnostic.message,
            span: Some(diagnostic.span),
            src: err.src,
            exception: "SyntaxError".to_string(),
            code: diagnostic.code,
            help: diagnostic.help,
        }
    }
}

/// A renderable description of a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub help: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}
