//! Literal escaping shared by the parser (decoding) and `repr()` (encoding).

pub mod bytes_literal;
pub mod string_literal;

pub use bytes_literal::{escape_bytes, unescape_bytes};
pub use string_literal::{QuoteStyle, UnescapeError, escape_string, unescape_string};
