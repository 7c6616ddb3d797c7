//! Error rendering using ariadne
//!
//! Renders sandeval errors with the offending source snippet, the error code
//! and any help text.

use crate::{Error, Severity};
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<expr>";

/// Render an error to stderr.
///
/// # Example
/// ```no_run
/// use sandeval::{Context, render_error};
///
/// if let Err(e) = sandeval::eval("1 + + ", &Context::new()) {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer.
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String, with color codes.
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).into_owned()
}

/// Same as [`render_error_to_string`] but without ANSI color codes.
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).into_owned()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let diag = error.to_diagnostic();
    let headline = format!("{}: {}", error.exception(), diag.message);

    // Context errors are not tied to the source.
    if error.span().is_none() {
        match &diag.code {
            Some(code) => writeln!(writer, "{}[{}]: {}", diag.severity, code, headline)?,
            None => writeln!(writer, "{}: {}", diag.severity, headline)?,
        }
        if let Some(help) = &diag.help {
            writeln!(writer, "help: {}", help)?;
        }
        return Ok(());
    }

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    let mut report = Report::build(kind, (SOURCE_ID, diag.span.0.clone()))
        .with_message(&headline)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = &diag.code {
        report = report.with_code(code);
    }

    report = report.with_label(
        Label::new((SOURCE_ID, diag.span.0.clone()))
            .with_message(error.kind().to_string())
            .with_color(Color::Red),
    );

    if let Some(help) = &diag.help {
        report = report.with_help(help);
    }

    report
        .finish()
        .write((SOURCE_ID, Source::from(error.src())), &mut *writer)
}
