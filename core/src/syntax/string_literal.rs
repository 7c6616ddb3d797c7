//! String literal escaping and unescaping.
//!
//! This module converts between:
//! - Runtime strings (e.g., "hello\n" with an actual newline character)
//! - Source string literals (e.g., 'hello\n' with a backslash-n sequence)
//!
//! The escape rules follow Python's: `repr()` of a string goes through
//! [`escape_string`], and the parser decodes literal bodies with
//! [`unescape_string`].

use std::borrow::Cow;
use std::fmt;

/// Controls which quote style to use when escaping strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteStyle {
    /// Always use single quotes: `'...'`
    AlwaysSingle,
    /// Always use double quotes: `"..."`
    AlwaysDouble,
    /// Prefer single quotes, use double if string contains single quotes but not double.
    /// This is what `repr()` does.
    #[default]
    PreferSingle,
    /// Prefer double quotes, use single if string contains double quotes but not single
    PreferDouble,
}

impl QuoteStyle {
    pub(crate) fn pick(self, has_single: bool, has_double: bool) -> char {
        match self {
            QuoteStyle::AlwaysDouble => '"',
            QuoteStyle::AlwaysSingle => '\'',
            QuoteStyle::PreferDouble if has_double && !has_single => '\'',
            QuoteStyle::PreferDouble => '"',
            QuoteStyle::PreferSingle if has_single && !has_double => '"',
            QuoteStyle::PreferSingle => '\'',
        }
    }
}

/// Errors that can occur when unescaping string literals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnescapeError {
    #[error("truncated \\{kind}XX escape at position {pos}")]
    TruncatedEscape { pos: usize, kind: char },
    #[error("invalid hex digit in '{seq}' at position {pos}")]
    InvalidHexDigit { pos: usize, seq: String },
    #[error("invalid Unicode scalar value U+{value:X} at position {pos}")]
    InvalidUnicodeScalar { pos: usize, value: u32 },
    #[error("named Unicode escapes are not supported (position {pos})")]
    NamedEscape { pos: usize },
    #[error("bytes can only contain ASCII literal characters")]
    NonAsciiBytes { pos: usize },
    #[error("invalid octal escape value {value:o} at position {pos}")]
    OctalOutOfRange { pos: usize, value: u32 },
}

/// Escape a runtime string the way `repr()` prints it, quotes included.
///
/// # Example
///
/// ```ignore
/// let mut output = String::new();
/// escape_string(&mut output, "it's", QuoteStyle::PreferSingle).unwrap();
/// assert_eq!(output, r#""it's""#);
/// ```
pub fn escape_string(f: &mut impl fmt::Write, s: &str, style: QuoteStyle) -> fmt::Result {
    let quote = style.pick(s.contains('\''), s.contains('"'));
    f.write_char(quote)?;
    for ch in s.chars() {
        match ch {
            c if c == quote => write!(f, "\\{}", c)?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if is_printable(c) => f.write_char(c)?,
            c if (c as u32) < 0x100 => write!(f, "\\x{:02x}", c as u32)?,
            c if (c as u32) < 0x10000 => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "\\U{:08x}", c as u32)?,
        }
    }
    f.write_char(quote)
}

fn is_printable(c: char) -> bool {
    !(c.is_control()
        || c == '\u{ad}'
        || matches!(c, '\u{2028}' | '\u{2029}' | '\u{200b}'..='\u{200f}' | '\u{feff}')
        || c.is_whitespace() && c != ' ')
}

/// Decode the body of a string literal (without quotes or prefix).
///
/// Raw literals are returned verbatim. Otherwise the Python escapes are
/// processed:
/// - `\\`, `\'`, `\"`, `\a`, `\b`, `\f`, `\n`, `\r`, `\t`, `\v`
/// - `\ooo` (up to three octal digits) and `\xhh`
/// - `\uXXXX` and `\UXXXXXXXX`
/// - backslash-newline is a line continuation
///
/// Unknown escapes keep their backslash, as Python does. The input is
/// borrowed back when it contains no backslash.
pub fn unescape_string(input: &str, raw: bool) -> Result<Cow<'_, str>, UnescapeError> {
    if raw || !input.contains('\\') {
        return Ok(Cow::Borrowed(input));
    }

    let mut output = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }
        match chars.next() {
            None => output.push('\\'),
            Some((_, '\n')) => {}
            Some((_, '\\')) => output.push('\\'),
            Some((_, '\'')) => output.push('\''),
            Some((_, '"')) => output.push('"'),
            Some((_, 'a')) => output.push('\x07'),
            Some((_, 'b')) => output.push('\x08'),
            Some((_, 'f')) => output.push('\x0c'),
            Some((_, 'n')) => output.push('\n'),
            Some((_, 'r')) => output.push('\r'),
            Some((_, 't')) => output.push('\t'),
            Some((_, 'v')) => output.push('\x0b'),
            Some((_, d @ '0'..='7')) => {
                let value = read_octal(d, &mut chars);
                let c = char::from_u32(value)
                    .ok_or(UnescapeError::InvalidUnicodeScalar { pos, value })?;
                output.push(c);
            }
            Some((_, 'x')) => output.push(read_scalar(&mut chars, pos, 'x', 2)?),
            Some((_, 'u')) => output.push(read_scalar(&mut chars, pos, 'u', 4)?),
            Some((_, 'U')) => output.push(read_scalar(&mut chars, pos, 'U', 8)?),
            Some((_, 'N')) => return Err(UnescapeError::NamedEscape { pos }),
            Some((_, other)) => {
                output.push('\\');
                output.push(other);
            }
        }
    }

    Ok(Cow::Owned(output))
}

/// Reads the remaining (up to two) octal digits after `first`.
pub(crate) fn read_octal(
    first: char,
    chars: &mut core::iter::Peekable<impl Iterator<Item = (usize, char)>>,
) -> u32 {
    let mut value = first.to_digit(8).unwrap_or(0);
    for _ in 0..2 {
        match chars.peek().and_then(|(_, c)| c.to_digit(8)) {
            Some(digit) => {
                value = value * 8 + digit;
                chars.next();
            }
            None => break,
        }
    }
    value
}

pub(crate) fn read_hex(
    chars: &mut impl Iterator<Item = (usize, char)>,
    pos: usize,
    kind: char,
    digits: usize,
) -> Result<u32, UnescapeError> {
    let mut value = 0u32;
    for _ in 0..digits {
        match chars.next() {
            Some((_, ch)) => match ch.to_digit(16) {
                Some(digit) => value = (value << 4) | digit,
                None => {
                    return Err(UnescapeError::InvalidHexDigit {
                        pos,
                        seq: format!("\\{}{}", kind, ch),
                    });
                }
            },
            None => return Err(UnescapeError::TruncatedEscape { pos, kind }),
        }
    }
    Ok(value)
}

fn read_scalar(
    chars: &mut impl Iterator<Item = (usize, char)>,
    pos: usize,
    kind: char,
    digits: usize,
) -> Result<char, UnescapeError> {
    let value = read_hex(chars, pos, kind, digits)?;
    char::from_u32(value).ok_or(UnescapeError::InvalidUnicodeScalar { pos, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn repr(s: &str) -> String {
        let mut out = String::new();
        escape_string(&mut out, s, QuoteStyle::PreferSingle).unwrap();
        out
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(repr(""), "''");
    }

    #[test]
    fn test_escape_common_escapes() {
        assert_eq!(repr("a\nb\tc\\d\r"), r"'a\nb\tc\\d\r'");
    }

    #[test]
    fn test_escape_quote_selection() {
        assert_eq!(repr("it's"), r#""it's""#);
        assert_eq!(repr(r#"say "hi""#), r#"'say "hi"'"#);
        assert_eq!(repr(r#"it's "x""#), r#"'it\'s "x"'"#);
    }

    #[test]
    fn test_escape_prefer_double() {
        let mut out = String::new();
        escape_string(&mut out, "plain", QuoteStyle::PreferDouble).unwrap();
        assert_eq!(out, r#""plain""#);
    }

    #[test]
    fn test_escape_control_and_unicode() {
        assert_eq!(repr("\x00\x7f"), r"'\x00\x7f'");
        assert_eq!(repr("café 🌍"), "'café 🌍'");
        assert_eq!(repr("\u{2028}"), r"'\u2028'");
    }

    #[test]
    fn test_unescape_fast_path_borrows() {
        assert!(matches!(
            unescape_string("no escapes", false).unwrap(),
            Cow::Borrowed("no escapes")
        ));
        assert!(matches!(
            unescape_string(r"raw\n", true).unwrap(),
            Cow::Borrowed(r"raw\n")
        ));
    }

    #[test]
    fn test_unescape_simple_escapes() {
        assert_eq!(
            unescape_string(r#"a\nb\tc\\d\'e\"f\a\b\f\v"#, false).unwrap(),
            "a\nb\tc\\d'e\"f\x07\x08\x0c\x0b"
        );
    }

    #[test]
    fn test_unescape_numeric_escapes() {
        assert_eq!(unescape_string(r"\x41\101\0", false).unwrap(), "AA\0");
        assert_eq!(unescape_string(r"é\U0001F30D", false).unwrap(), "é🌍");
    }

    #[test]
    fn test_unescape_line_continuation() {
        assert_eq!(unescape_string("a\\\nb", false).unwrap(), "ab");
    }

    #[test]
    fn test_unescape_unknown_escape_is_kept() {
        assert_eq!(unescape_string(r"\d+", false).unwrap(), r"\d+");
    }

    #[test]
    fn test_unescape_errors() {
        assert_eq!(
            unescape_string(r"\x4", false),
            Err(UnescapeError::TruncatedEscape { pos: 0, kind: 'x' })
        );
        assert!(matches!(
            unescape_string(r"\uZZZZ", false),
            Err(UnescapeError::InvalidHexDigit { .. })
        ));
        assert!(matches!(
            unescape_string(r"\UFFFFFFFF", false),
            Err(UnescapeError::InvalidUnicodeScalar { .. })
        ));
        assert_eq!(
            unescape_string(r"\N{DASH}", false),
            Err(UnescapeError::NamedEscape { pos: 0 })
        );
    }
}
