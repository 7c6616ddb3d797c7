//! `repr()` and `str()` of values, following Python's formatting.

use std::fmt::{self, Write};

use crate::syntax::{QuoteStyle, escape_bytes, escape_string};
use crate::values::value::Value;

impl Value {
    /// `repr(value)`.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_repr(&mut out, self);
        out
    }

    /// `str(value)`: strings without quotes, everything else as `repr`.
    pub fn to_str(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            other => other.repr(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            other => write_repr(f, other),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_repr(f, self)
    }
}

fn write_repr(f: &mut impl Write, value: &Value) -> fmt::Result {
    match value {
        Value::None => f.write_str("None"),
        Value::Bool(true) => f.write_str("True"),
        Value::Bool(false) => f.write_str("False"),
        Value::Int(i) => write!(f, "{}", i),
        Value::Float(x) => f.write_str(&format_float(*x)),
        Value::Complex { re, im } => f.write_str(&format_complex(*re, *im)),
        Value::Str(s) => escape_string(f, s, QuoteStyle::PreferSingle),
        Value::Bytes(b) => escape_bytes(f, b),
        Value::Tuple(items) => {
            f.write_char('(')?;
            write_items(f, items.iter())?;
            if items.len() == 1 {
                f.write_char(',')?;
            }
            f.write_char(')')
        }
        Value::List(items) => {
            f.write_char('[')?;
            write_items(f, items.iter())?;
            f.write_char(']')
        }
        Value::Set(set) if set.is_empty() => f.write_str("set()"),
        Value::Set(set) => {
            f.write_char('{')?;
            write_items(f, set.iter())?;
            f.write_char('}')
        }
        Value::FrozenSet(set) if set.is_empty() => f.write_str("frozenset()"),
        Value::FrozenSet(set) => {
            f.write_str("frozenset({")?;
            write_items(f, set.iter())?;
            f.write_str("})")
        }
        Value::Dict(dict) if dict.is_counter() => {
            if dict.is_empty() {
                return f.write_str("Counter()");
            }
            f.write_str("Counter({")?;
            let entries = crate::stdlib::collections::most_common(dict);
            write_entries(f, entries.iter().map(|(k, v)| (k, v)))?;
            f.write_str("})")
        }
        Value::Dict(dict) => {
            f.write_char('{')?;
            write_entries(f, dict.iter())?;
            f.write_char('}')
        }
        Value::Range(r) if r.step == 1 => write!(f, "range({}, {})", r.start, r.stop),
        Value::Range(r) => write!(f, "range({}, {}, {})", r.start, r.stop, r.step),
        Value::Slice(s) => {
            let part = |p: Option<i64>| p.map_or_else(|| "None".to_string(), |i| i.to_string());
            write!(
                f,
                "slice({}, {}, {})",
                part(s.start),
                part(s.stop),
                part(s.step)
            )
        }
        Value::Iterator(it) => write!(f, "<{} object>", it.type_name()),
        Value::Type(kind) => write!(f, "<class '{}'>", kind.qualified_name()),
        Value::Function(func) => f.write_str(&func.repr()),
        Value::Module(name) => write!(f, "<module '{}'>", name),
        Value::Object(obj) => f.write_str(&obj.repr()),
    }
}

fn write_items<'a>(f: &mut impl Write, items: impl Iterator<Item = &'a Value>) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_repr(f, item)?;
    }
    Ok(())
}

fn write_entries<'a>(
    f: &mut impl Write,
    entries: impl Iterator<Item = (&'a Value, &'a Value)>,
) -> fmt::Result {
    for (i, (key, value)) in entries.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_repr(f, key)?;
        f.write_str(": ")?;
        write_repr(f, value)?;
    }
    Ok(())
}

/// Shortest round-trip float formatting, with Python's switch to
/// exponent notation below `1e-4` and from `1e16` on.
pub fn format_float(x: f64) -> String {
    let mut out = format_float_digits(x);
    if x.is_finite() && !out.contains(['.', 'e']) {
        out.push_str(".0");
    }
    out
}

/// Like [`format_float`] but without forcing a `.0` suffix, as used for the
/// parts of a complex number.
fn format_float_digits(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "1.2345e-7".
    let sci = format!("{:e}", x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exp) {
        let point = exp + 1;
        let body = if point <= 0 {
            format!("0.{}{}", "0".repeat((-point) as usize), digits)
        } else if point as usize >= digits.len() {
            format!("{}{}", digits, "0".repeat(point as usize - digits.len()))
        } else {
            let (int_part, frac) = digits.split_at(point as usize);
            format!("{}.{}", int_part, frac)
        };
        format!("{}{}", sign, body)
    } else {
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{}{}e{}{:02}", sign, mantissa, exp_sign, exp.abs())
    }
}

pub fn format_complex(re: f64, im: f64) -> String {
    let imag = format_float_digits(im);
    if re == 0.0 && re.is_sign_positive() {
        return format!("{}j", imag);
    }
    let real = format_float_digits(re);
    let joiner = if imag.starts_with('-') { "" } else { "+" };
    format!("({}{}{}j)", real, joiner, imag)
}
