pub mod error;
pub mod parsed_expr;
#[allow(clippy::module_inception)]
pub mod parser;
mod syntax;

// Re-export the parser and rule enum for external use
pub use parser::ExpressionParser;
pub use parser::Rule;
pub use parser::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_TREE_DEPTH};
pub use parser::{parse, parse_with_limits, parse_with_max_depth};

pub use error::{ParseError, ParseErrorKind};
pub use parsed_expr::{Element, Expr, ExprKind, Generator, Keyword, Literal, Target};
pub use syntax::{BinaryOp, BoolOp, ComparisonOp, ComprehensionKind, Span, UnaryOp};
