//! Bytes literal escaping and unescaping.
//!
//! This module converts between:
//! - Runtime bytes (e.g., `[104, 105]`)
//! - Source bytes literals (e.g., `b'hi'` or `b'\x68\x69'`)

use std::fmt;

use super::string_literal::{QuoteStyle, UnescapeError, read_hex, read_octal};

/// Write the `repr()` of a bytes value, `b` prefix and quotes included.
///
/// - Printable ASCII characters (0x20-0x7E) are shown directly
/// - `\t`, `\n`, `\r`, `\\` and the chosen quote use backslash notation
/// - Everything else uses hex notation (`\xNN`)
pub fn escape_bytes(f: &mut impl fmt::Write, bytes: &[u8]) -> fmt::Result {
    let quote = QuoteStyle::PreferSingle.pick(bytes.contains(&b'\''), bytes.contains(&b'"'));
    write!(f, "b{}", quote)?;
    for &byte in bytes {
        match byte {
            b'\\' => f.write_str("\\\\")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            b'\t' => f.write_str("\\t")?,
            b if b as char == quote => write!(f, "\\{}", quote)?,
            0x20..=0x7E => f.write_char(byte as char)?,
            _ => write!(f, "\\x{:02x}", byte)?,
        }
    }
    f.write_char(quote)
}

/// Decode the body of a bytes literal (without quotes or prefix).
///
/// Accepts the same escapes as string literals except the Unicode ones, which
/// are kept verbatim. Non-ASCII source characters are rejected.
pub fn unescape_bytes(input: &str, raw: bool) -> Result<Vec<u8>, UnescapeError> {
    if let Some(pos) = input.find(|c: char| !c.is_ascii()) {
        return Err(UnescapeError::NonAsciiBytes { pos });
    }
    if raw || !input.contains('\\') {
        return Ok(input.as_bytes().to_vec());
    }

    let mut output = Vec::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        if ch != '\\' {
            output.push(ch as u8);
            continue;
        }
        match chars.next() {
            None => output.push(b'\\'),
            Some((_, '\n')) => {}
            Some((_, '\\')) => output.push(b'\\'),
            Some((_, '\'')) => output.push(b'\''),
            Some((_, '"')) => output.push(b'"'),
            Some((_, 'a')) => output.push(0x07),
            Some((_, 'b')) => output.push(0x08),
            Some((_, 'f')) => output.push(0x0c),
            Some((_, 'n')) => output.push(b'\n'),
            Some((_, 'r')) => output.push(b'\r'),
            Some((_, 't')) => output.push(b'\t'),
            Some((_, 'v')) => output.push(0x0b),
            Some((_, d @ '0'..='7')) => {
                let value = read_octal(d, &mut chars);
                let byte =
                    u8::try_from(value).map_err(|_| UnescapeError::OctalOutOfRange { pos, value })?;
                output.push(byte);
            }
            // Two hex digits always fit in a byte.
            Some((_, 'x')) => output.push(read_hex(&mut chars, pos, 'x', 2)? as u8),
            Some((_, other)) => {
                output.push(b'\\');
                output.push(other as u8);
            }
        }
    }

    Ok(output)
}
