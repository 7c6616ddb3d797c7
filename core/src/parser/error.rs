use crate::api::{Diagnostic, Severity};
use crate::parser::{Rule, Span};

/// Parser error with the source it was raised for.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", self.message())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub src: String,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken { expected: String, found: String },
    /// Unclosed delimiter
    UnclosedDelimiter { delimiter: char },
    /// Closing delimiter without a matching opener
    UnmatchedDelimiter { delimiter: char },
    /// Invalid number literal
    InvalidNumber { text: String },
    /// Invalid escape sequence in a string or bytes literal
    InvalidLiteral { message: String },
    /// Maximum nesting depth exceeded
    MaxDepthExceeded { max_depth: usize },
    /// Well-formed syntax that is still not allowed in an expression
    Unsupported { message: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, src: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            src: src.into(),
            span,
        }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => {
                format!("Expected {}, found {}", expected, found)
            }
            ParseErrorKind::UnclosedDelimiter { delimiter } => {
                format!("'{}' was never closed", delimiter)
            }
            ParseErrorKind::UnmatchedDelimiter { delimiter } => {
                format!("unmatched '{}'", delimiter)
            }
            ParseErrorKind::InvalidNumber { text } => {
                format!("Invalid number literal '{}'", text)
            }
            ParseErrorKind::InvalidLiteral { message } => message.clone(),
            ParseErrorKind::MaxDepthExceeded { max_depth } => format!(
                "Expression nesting depth exceeds maximum of {} levels",
                max_depth
            ),
            ParseErrorKind::Unsupported { message } => message.clone(),
        }
    }

    /// Convert to a Diagnostic for rendering
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            ParseErrorKind::UnexpectedToken { .. } => ("P001", None),
            ParseErrorKind::UnclosedDelimiter { .. } => {
                ("P002", Some("Add the missing closing delimiter"))
            }
            ParseErrorKind::UnmatchedDelimiter { .. } => {
                ("P002", Some("Remove the extra closing delimiter"))
            }
            ParseErrorKind::InvalidNumber { .. } => ("P003", Some("Check the number format")),
            ParseErrorKind::InvalidLiteral { .. } => ("P003", None),
            ParseErrorKind::MaxDepthExceeded { .. } => {
                ("P004", Some("Reduce nesting or simplify the expression"))
            }
            ParseErrorKind::Unsupported { .. } => ("P005", None),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.message(),
            span: self.span.clone(),
            help: help.map(String::from),
            code: Some(code.to_string()),
        }
    }
}

/// Convert Pest error to human-readable ParseError
pub fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> ParseError {
    use pest::error::ErrorVariant;

    let span = match err.location {
        pest::error::InputLocation::Pos(pos) => Span(pos..pos),
        pest::error::InputLocation::Span((start, end)) => Span(start..end),
    };

    let kind = match err.variant {
        ErrorVariant::ParsingError {
            positives,
            negatives,
        } => {
            let expected = format_expected_rules(&positives);
            let found = if span.0.start >= source.len() {
                "end of input".to_string()
            } else {
                format_found(source, span.0.start, &negatives)
            };
            ParseErrorKind::UnexpectedToken { expected, found }
        }
        ErrorVariant::CustomError { message } => ParseErrorKind::Unsupported { message },
    };

    ParseError::new(kind, source, span)
}

/// Format expected rules in a human-readable way
fn format_expected_rules(rules: &[Rule]) -> String {
    if rules.is_empty() {
        return "something else".to_string();
    }

    // Group related rules into higher-level concepts
    let mut concepts: Vec<&str> = Vec::new();
    let mut push = |concept| {
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    };

    for rule in rules {
        match rule {
            Rule::integer | Rule::float | Rule::imaginary | Rule::strings => push("literal"),
            Rule::ident | Rule::name => push("identifier"),
            Rule::EOI => push("end of input"),
            Rule::eq
            | Rule::ne
            | Rule::lt
            | Rule::gt
            | Rule::le
            | Rule::ge
            | Rule::not_in
            | Rule::in_op
            | Rule::is_not
            | Rule::is_op
            | Rule::add
            | Rule::sub
            | Rule::mul
            | Rule::div
            | Rule::pow
            | Rule::floor_div
            | Rule::modulo
            | Rule::lshift
            | Rule::rshift
            | Rule::bit_or
            | Rule::bit_xor
            | Rule::bit_and
            | Rule::call_op
            | Rule::index_op
            | Rule::attr_op
            | Rule::kw_and
            | Rule::kw_or
            | Rule::kw_if => push("operator"),
            Rule::trailing_comma => push("','"),
            _ => push("expression"),
        }
    }

    match concepts.split_last() {
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        None => "something else".to_string(),
    }
}

/// Describe the token found at `pos`.
fn format_found(source: &str, pos: usize, negatives: &[Rule]) -> String {
    if let Some(rule) = negatives.first() {
        return format!("{:?}", rule);
    }
    let rest = source.get(pos..).unwrap_or("");
    let token: String = match rest.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect(),
        Some(c) => c.to_string(),
        None => return "end of input".to_string(),
    };
    format!("'{}'", token)
}

/// Rejects sources whose bracket nesting exceeds `max_depth` before the
/// recursive parser sees them, and reports unbalanced brackets precisely.
///
/// String literals and comments are skipped so brackets inside them do not
/// count.
pub fn check_nesting(source: &str, max_depth: usize) -> Result<(), ParseError> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '#' => {
                while chars.next_if(|(_, c)| *c != '\n').is_some() {}
            }
            '\'' | '"' => {
                let triple = source[pos..].starts_with(&format!("{0}{0}{0}", ch));
                if triple {
                    chars.next();
                    chars.next();
                }
                // Unterminated strings are left for the grammar to report.
                let mut run = 0;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => {
                            chars.next();
                            run = 0;
                        }
                        c if c == ch => {
                            run += 1;
                            if !triple || run == 3 {
                                break;
                            }
                        }
                        '\n' if !triple => break,
                        _ => run = 0,
                    }
                }
            }
            '(' | '[' | '{' => {
                stack.push((ch, pos));
                if stack.len() > max_depth {
                    return Err(ParseError::new(
                        ParseErrorKind::MaxDepthExceeded { max_depth },
                        source,
                        Span(pos..pos + 1),
                    ));
                }
            }
            ')' | ']' | '}' => {
                let expected_open = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected_open => {}
                    _ => {
                        return Err(ParseError::new(
                            ParseErrorKind::UnmatchedDelimiter { delimiter: ch },
                            source,
                            Span(pos..pos + 1),
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some((open, pos)) => Err(ParseError::new(
            ParseErrorKind::UnclosedDelimiter { delimiter: open },
            source,
            Span(pos..pos + 1),
        )),
        None => Ok(()),
    }
}
