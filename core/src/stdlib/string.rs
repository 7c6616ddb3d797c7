//! The `string` library: character-class constants and `capwords`.

use crate::{
    evaluator::RuntimeError,
    stdlib::{native, str_arg},
    values::{Args, Value},
};

const ASCII_LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const ASCII_UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ASCII_LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const HEXDIGITS: &str = "0123456789abcdefABCDEF";
const OCTDIGITS: &str = "01234567";
const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;
const WHITESPACE: &str = " \t\n\r\x0b\x0c";
const PRINTABLE: &str = concat!(
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ",
    r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##,
    " \t\n\r\x0b\x0c"
);

pub(super) fn member(name: &str) -> Option<Value> {
    let text = match name {
        "ascii_letters" => ASCII_LETTERS,
        "ascii_lowercase" => ASCII_LOWERCASE,
        "ascii_uppercase" => ASCII_UPPERCASE,
        "digits" => DIGITS,
        "hexdigits" => HEXDIGITS,
        "octdigits" => OCTDIGITS,
        "punctuation" => PUNCTUATION,
        "whitespace" => WHITESPACE,
        "printable" => PRINTABLE,
        "capwords" => return Some(native("capwords", capwords)),
        _ => return None,
    };
    Some(Value::from(text))
}

/// `capwords(s, sep=None)`: split, capitalize each word, join.
fn capwords(mut args: Args) -> Result<Value, RuntimeError> {
    let sep = args.take_keyword("sep");
    args.finish("capwords")?;
    args.check_positional("capwords", 1, 2)?;
    let s = str_arg("capwords", &args.positional[0])?;
    let sep = match sep.or_else(|| args.positional.get(1).cloned()) {
        None | Some(Value::None) => None,
        Some(v) => Some(str_arg("capwords", &v)?.to_string()),
    };
    let words: Vec<String> = match &sep {
        None => s.split_whitespace().map(capitalize).collect(),
        Some(sep) if sep.is_empty() => {
            return Err(RuntimeError::value_error("empty separator"));
        }
        Some(sep) => s.split(sep.as_str()).map(capitalize).collect(),
    };
    Ok(Value::from(words.join(sep.as_deref().unwrap_or(" "))))
}

/// `str.capitalize`: first character upper case, the rest lower case.
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}
