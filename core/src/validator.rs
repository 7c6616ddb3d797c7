//! Static policy checks over a parsed expression.
//!
//! The whole tree is walked before anything is evaluated, so a forbidden
//! call hidden behind a short-circuit (`False or exec("3")`) is still
//! rejected.

use tracing::warn;

use crate::{
    api::{Diagnostic, Severity},
    parser::{Expr, ExprKind, Span, Target},
    policy::Policy,
};

/// A construct the policy rejects.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct PolicyViolation {
    pub kind: ViolationKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViolationKind {
    /// A call whose target is a forbidden name. Holds the capability label.
    #[error("{capability} calls are not allowed.")]
    ForbiddenCall { capability: &'static str },

    #[error(" \"{name}\" is an invalid attribute name because it starts with \"_\".")]
    InvalidAttributeName { name: String },

    #[error(" \"{name}\" is an invalid variable name because it starts with \"_\".")]
    InvalidVariableName { name: String },
}

impl PolicyViolation {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            ViolationKind::ForbiddenCall { .. } => ("V001", None),
            ViolationKind::InvalidAttributeName { .. } | ViolationKind::InvalidVariableName { .. } => {
                ("V002", Some("Names starting with '_' are private"))
            }
        };
        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            span: self.span.clone(),
            help: help.map(String::from),
            code: Some(code.to_string()),
        }
    }
}

/// Checks every node of `expr` against `policy`, returning the first
/// violation in source order.
pub fn validate(expr: &Expr, policy: &Policy) -> Result<(), PolicyViolation> {
    Validator { policy }.visit(expr)
}

struct Validator<'p> {
    policy: &'p Policy,
}

impl Validator<'_> {
    fn violation(&self, kind: ViolationKind, span: &Span) -> Result<(), PolicyViolation> {
        warn!(violation = %kind, start = span.0.start, "policy violation");
        Err(PolicyViolation {
            kind,
            span: span.clone(),
        })
    }

    fn visit(&self, expr: &Expr) -> Result<(), PolicyViolation> {
        match &expr.kind {
            ExprKind::Name(name) => self.check_variable(name, &expr.span)?,
            ExprKind::Attribute { attr, .. } => {
                if !self.policy.is_legal_attribute(attr) {
                    self.violation(
                        ViolationKind::InvalidAttributeName { name: attr.clone() },
                        &expr.span,
                    )?;
                }
            }
            ExprKind::Call { func, .. } => {
                if let ExprKind::Name(name) = &func.kind {
                    if let Some(capability) = self.policy.forbidden_call(name) {
                        self.violation(ViolationKind::ForbiddenCall { capability }, &expr.span)?;
                    }
                }
            }
            ExprKind::Comprehension { generators, .. } => {
                for generator in generators {
                    self.check_target(&generator.target, &generator.span)?;
                }
            }
            _ => {}
        }
        for child in expr.kind.children() {
            self.visit(child)?;
        }
        Ok(())
    }

    fn check_variable(&self, name: &str, span: &Span) -> Result<(), PolicyViolation> {
        if self.policy.is_legal_variable(name) {
            return Ok(());
        }
        self.violation(
            ViolationKind::InvalidVariableName {
                name: name.to_string(),
            },
            span,
        )
    }

    fn check_target(&self, target: &Target, span: &Span) -> Result<(), PolicyViolation> {
        for name in target.names() {
            self.check_variable(name, span)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn check(source: &str) -> Result<(), PolicyViolation> {
        let expr = parse(source).unwrap();
        validate(&expr, &Policy::standard())
    }

    fn message(source: &str) -> String {
        check(source).unwrap_err().to_string()
    }

    #[test]
    fn test_clean_expressions_pass() {
        assert!(check("3 + 2").is_ok());
        assert!(check("resp.json()['name'] == 'jon'").is_ok());
        assert!(check("[x for x in range(10) if x % 2]").is_ok());
        // Referencing a forbidden name without calling it is left to name
        // resolution at runtime.
        assert!(check("exec").is_ok());
        assert!(check("f(eval)(1)").is_ok());
    }

    #[test]
    fn test_forbidden_calls_anywhere() {
        assert_eq!(message("exec('3')"), "Exec calls are not allowed.");
        assert_eq!(message("False or exec('3')"), "Exec calls are not allowed.");
        assert_eq!(message("eval('3 + 4')"), "Eval calls are not allowed.");
        assert_eq!(message("[exec(x) for x in y]"), "Exec calls are not allowed.");
        assert_eq!(message("{'k': eval('1')}"), "Eval calls are not allowed.");
    }

    #[test]
    fn test_forbidden_call_span() {
        let err = check("1 if x else eval('2')").unwrap_err();
        assert_eq!(err.span, Span(12..21));
    }

    #[test]
    fn test_private_attributes() {
        assert_eq!(
            message("resp._private_property"),
            " \"_private_property\" is an invalid attribute name because it starts with \"_\"."
        );
        assert!(matches!(
            check("a.b.c._d").unwrap_err().kind,
            ViolationKind::InvalidAttributeName { .. }
        ));
        assert!(check("resp.__dunder__").is_err());
    }

    #[test]
    fn test_private_variables() {
        assert_eq!(
            message("_getattr_"),
            " \"_getattr_\" is an invalid variable name because it starts with \"_\"."
        );
        assert_eq!(
            message("[1 for _x in y]"),
            " \"_x\" is an invalid variable name because it starts with \"_\"."
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let err = check("a._b + exec('1')").unwrap_err();
        assert!(matches!(err.kind, ViolationKind::InvalidAttributeName { .. }));
    }
}
