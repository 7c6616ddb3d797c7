//! printf-style `%` formatting for `str` and `bytes`.
//!
//! Supports `%(key)` lookups, the `-+ 0#` flags, `*` width and precision, and
//! the `s r a c d i u x X o f F e E g G %` conversions. `bytes` templates are
//! formatted through their latin-1 decoding, so every output character fits
//! in one byte again.

use crate::{
    evaluator::RuntimeError,
    values::{Value, check_len},
};

/// The right-hand side of `template % args`.
enum Operands<'v> {
    Positional { items: Vec<&'v Value>, next: usize },
    Mapping(&'v Value),
}

impl<'v> Operands<'v> {
    fn new(args: &'v Value) -> Self {
        match args {
            Value::Tuple(items) => Operands::Positional {
                items: items.iter().collect(),
                next: 0,
            },
            Value::Dict(_) => Operands::Mapping(args),
            single => Operands::Positional {
                items: vec![single],
                next: 0,
            },
        }
    }

    fn next(&mut self) -> Result<&'v Value, RuntimeError> {
        match self {
            Operands::Positional { items, next } => {
                let value = items.get(*next).copied().ok_or_else(|| {
                    RuntimeError::type_error("not enough arguments for format string")
                })?;
                *next += 1;
                Ok(value)
            }
            // A lone mapping formats as itself under `%s`.
            Operands::Mapping(mapping) => Ok(*mapping),
        }
    }

    fn lookup(&self, key: &str) -> Result<&'v Value, RuntimeError> {
        let mapping: &'v Value = match self {
            Operands::Mapping(mapping) => *mapping,
            Operands::Positional { .. } => {
                return Err(RuntimeError::type_error("format requires a mapping"));
            }
        };
        let Value::Dict(dict) = mapping else {
            return Err(RuntimeError::type_error("format requires a mapping"));
        };
        let key = Value::from(key);
        dict.get(&key)?
            .ok_or_else(|| RuntimeError::KeyError { key: key.repr() })
    }

    fn all_used(&self) -> bool {
        match self {
            Operands::Positional { items, next } => *next >= items.len(),
            Operands::Mapping(_) => true,
        }
    }
}

#[derive(Default, Clone, Copy)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alternate: bool,
    width: usize,
    precision: Option<usize>,
}

/// `template % args` for a `str` template.
pub(crate) fn format_str(template: &str, args: &Value) -> Result<Value, RuntimeError> {
    format(template, args, false).map(Value::from)
}

/// `template % args` for a `bytes` template.
pub(crate) fn format_bytes(template: &[u8], args: &Value) -> Result<Value, RuntimeError> {
    let template: String = template.iter().map(|b| *b as char).collect();
    let out = format(&template, args, true)?;
    Ok(Value::bytes(out.chars().map(|c| c as u8).collect::<Vec<u8>>()))
}

fn format(template: &str, args: &Value, binary: bool) -> Result<String, RuntimeError> {
    let chars: Vec<char> = template.chars().collect();
    let mut operands = Operands::new(args);
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        i += 1;
        if ch != '%' {
            out.push(ch);
            continue;
        }

        let mut keyed = None;
        if chars.get(i) == Some(&'(') {
            let start = i + 1;
            let mut end = start;
            let mut depth = 1;
            while depth > 0 {
                match chars.get(end) {
                    Some('(') => depth += 1,
                    Some(')') => depth -= 1,
                    Some(_) => {}
                    None => return Err(RuntimeError::value_error("incomplete format key")),
                }
                end += 1;
            }
            let key: String = chars[start..end - 1].iter().collect();
            keyed = Some(operands.lookup(&key)?);
            i = end;
        }

        let mut spec = Spec::default();
        while let Some(flag) = chars.get(i) {
            match flag {
                '-' => spec.left = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                '0' => spec.zero = true,
                '#' => spec.alternate = true,
                _ => break,
            }
            i += 1;
        }
        if let Some(width) = read_count(&chars, &mut i, &mut operands)? {
            if width < 0 {
                spec.left = true;
            }
            spec.width = width.unsigned_abs() as usize;
        }
        if chars.get(i) == Some(&'.') {
            i += 1;
            let precision = read_count(&chars, &mut i, &mut operands)?.unwrap_or(0);
            spec.precision = Some(precision.max(0) as usize);
        }
        check_len(spec.width.max(spec.precision.unwrap_or(0)))?;
        while matches!(chars.get(i), Some('h' | 'l' | 'L')) {
            i += 1;
        }

        let Some(&conversion) = chars.get(i) else {
            return Err(RuntimeError::value_error("incomplete format"));
        };
        let index = i;
        i += 1;
        if conversion == '%' {
            out.push('%');
            continue;
        }
        let value = match keyed {
            Some(value) => value,
            None => operands.next()?,
        };
        let piece = convert(conversion, index, value, &spec, binary)?;
        check_len(out.len() + piece.len())?;
        out.push_str(&piece);
    }

    if !operands.all_used() {
        return Err(RuntimeError::type_error(
            "not all arguments converted during string formatting",
        ));
    }
    Ok(out)
}

/// A width or precision: digits, `*` (taken from the operands) or nothing.
fn read_count(
    chars: &[char],
    i: &mut usize,
    operands: &mut Operands<'_>,
) -> Result<Option<i64>, RuntimeError> {
    if chars.get(*i) == Some(&'*') {
        *i += 1;
        return match operands.next()? {
            Value::Int(n) => Ok(Some(*n)),
            _ => Err(RuntimeError::type_error("* wants int")),
        };
    }
    let mut count: Option<i64> = None;
    while let Some(digit) = chars.get(*i).and_then(|c| c.to_digit(10)) {
        count = Some(count.unwrap_or(0).saturating_mul(10).saturating_add(digit as i64));
        *i += 1;
    }
    Ok(count)
}

fn convert(
    conversion: char,
    index: usize,
    value: &Value,
    spec: &Spec,
    binary: bool,
) -> Result<String, RuntimeError> {
    match conversion {
        's' => {
            let text = if binary {
                match value {
                    Value::Bytes(b) => b.iter().map(|b| *b as char).collect(),
                    other => {
                        return Err(RuntimeError::type_error(format!(
                            "%b requires a bytes-like object, or an object that implements __bytes__, not '{}'",
                            other.type_name()
                        )));
                    }
                }
            } else {
                value.to_str()
            };
            Ok(pad_text(truncate(text, spec.precision), spec))
        }
        'r' | 'a' => {
            let text = if binary || conversion == 'a' {
                ascii_escape(&value.repr())
            } else {
                value.repr()
            };
            Ok(pad_text(truncate(text, spec.precision), spec))
        }
        'c' => Ok(pad_text(character(value, binary)?, spec)),
        'd' | 'i' | 'u' => {
            let (negative, mut digits) = match value {
                Value::Int(_) | Value::Bool(_) => {
                    let n = value.as_int().unwrap_or(0);
                    (n < 0, n.unsigned_abs().to_string())
                }
                Value::Float(x) => {
                    if x.is_nan() {
                        return Err(RuntimeError::value_error(
                            "cannot convert float NaN to integer",
                        ));
                    }
                    if x.is_infinite() {
                        return Err(RuntimeError::overflow(
                            "cannot convert float infinity to integer",
                        ));
                    }
                    let t = x.trunc();
                    (t < 0.0, format!("{:.0}", t.abs()))
                }
                other => {
                    return Err(RuntimeError::type_error(format!(
                        "%{} format: a real number is required, not {}",
                        conversion,
                        other.type_name()
                    )));
                }
            };
            zero_extend(&mut digits, spec.precision);
            Ok(pad_number(negative, "", &digits, spec))
        }
        'x' | 'X' | 'o' => {
            let Some(n) = value.as_int() else {
                return Err(RuntimeError::type_error(format!(
                    "%{} format: an integer is required, not {}",
                    conversion,
                    value.type_name()
                )));
            };
            let magnitude = n.unsigned_abs();
            let (mut digits, prefix) = match conversion {
                'x' => (format!("{:x}", magnitude), "0x"),
                'X' => (format!("{:X}", magnitude), "0X"),
                _ => (format!("{:o}", magnitude), "0o"),
            };
            zero_extend(&mut digits, spec.precision);
            let prefix = if spec.alternate { prefix } else { "" };
            Ok(pad_number(n < 0, prefix, &digits, spec))
        }
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
            let Some(x) = value.as_float() else {
                return Err(RuntimeError::type_error(format!(
                    "must be real number, not {}",
                    value.type_name()
                )));
            };
            let negative = x.is_sign_negative() && !x.is_nan();
            let body = real(x.abs(), conversion, spec);
            if x.is_finite() {
                Ok(pad_number(negative, "", &body, spec))
            } else {
                // Zero padding never applies to inf and nan.
                let spec = Spec { zero: false, ..*spec };
                Ok(pad_number(negative, "", &body, &spec))
            }
        }
        other => Err(RuntimeError::value_error(format!(
            "unsupported format character '{}' (0x{:x}) at index {}",
            other, other as u32, index
        ))),
    }
}

fn character(value: &Value, binary: bool) -> Result<String, RuntimeError> {
    if binary {
        return match value {
            Value::Int(_) | Value::Bool(_) => match value.as_int().and_then(|n| u8::try_from(n).ok()) {
                Some(b) => Ok((b as char).to_string()),
                None => Err(RuntimeError::overflow("%c arg not in range(256)")),
            },
            Value::Bytes(b) if b.len() == 1 => Ok((b[0] as char).to_string()),
            _ => Err(RuntimeError::type_error(
                "%c requires an integer in range(256) or a single byte",
            )),
        };
    }
    match value {
        Value::Int(_) | Value::Bool(_) => {
            let n = value.as_int().unwrap_or(0);
            if !(0..0x110000).contains(&n) {
                return Err(RuntimeError::overflow("%c arg not in range(0x110000)"));
            }
            char::from_u32(n as u32)
                .map(String::from)
                .ok_or_else(|| RuntimeError::value_error("surrogates not allowed"))
        }
        Value::Str(s) if s.chars().count() == 1 => Ok(s.to_string()),
        _ => Err(RuntimeError::type_error("%c requires int or char")),
    }
}

/// Float conversions of a non-negative `x`.
fn real(x: f64, conversion: char, spec: &Spec) -> String {
    let body = if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        "inf".to_string()
    } else {
        let precision = spec.precision.unwrap_or(6);
        match conversion.to_ascii_lowercase() {
            'f' => {
                let mut s = format!("{:.*}", precision, x);
                if spec.alternate && precision == 0 {
                    s.push('.');
                }
                s
            }
            'e' => exponent_notation(x, precision, spec.alternate),
            _ => general(x, precision, spec.alternate),
        }
    };
    if conversion.is_ascii_uppercase() {
        body.to_ascii_uppercase()
    } else {
        body
    }
}

/// `d.dddde+XX`, with at least two exponent digits.
fn exponent_notation(x: f64, precision: usize, alternate: bool) -> String {
    let formatted = format!("{:.*e}", precision, x);
    let (mantissa, exp) = split_exponent(&formatted);
    let point = if alternate && precision == 0 { "." } else { "" };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}{}e{}{:02}", mantissa, point, sign, exp.unsigned_abs())
}

fn split_exponent(sci: &str) -> (&str, i32) {
    match sci.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (sci, 0),
    }
}

/// `%g`: fixed or exponent notation depending on the exponent, trailing zeros
/// removed unless `#` is given.
fn general(x: f64, precision: usize, alternate: bool) -> String {
    let precision = precision.max(1);
    let exp = if x == 0.0 {
        0
    } else {
        split_exponent(&format!("{:.*e}", precision - 1, x)).1
    };
    let mut s = if exp >= -4 && (exp as i64) < precision as i64 {
        format!("{:.*}", (precision as i64 - 1 - exp as i64) as usize, x)
    } else {
        exponent_notation(x, precision - 1, false)
    };
    if alternate {
        if !s.contains('.') {
            match s.find('e') {
                Some(pos) => s.insert(pos, '.'),
                None => s.push('.'),
            }
        }
        return s;
    }
    let (mantissa, suffix) = match s.find('e') {
        Some(pos) => s.split_at(pos),
        None => (s.as_str(), ""),
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{}{}", mantissa, suffix)
}

fn zero_extend(digits: &mut String, precision: Option<usize>) {
    let precision = precision.unwrap_or(0);
    if digits.len() < precision {
        digits.insert_str(0, &"0".repeat(precision - digits.len()));
    }
}

fn truncate(text: String, precision: Option<usize>) -> String {
    match precision {
        Some(n) => text.chars().take(n).collect(),
        None => text,
    }
}

fn pad_text(text: String, spec: &Spec) -> String {
    let len = text.chars().count();
    if len >= spec.width {
        return text;
    }
    let fill = " ".repeat(spec.width - len);
    if spec.left {
        text + &fill
    } else {
        fill + &text
    }
}

fn pad_number(negative: bool, prefix: &str, digits: &str, spec: &Spec) -> String {
    let sign = if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    };
    let len = sign.len() + prefix.len() + digits.len();
    if len >= spec.width {
        return format!("{}{}{}", sign, prefix, digits);
    }
    let fill = spec.width - len;
    if spec.left {
        format!("{}{}{}{}", sign, prefix, digits, " ".repeat(fill))
    } else if spec.zero {
        format!("{}{}{}{}", sign, prefix, "0".repeat(fill), digits)
    } else {
        format!("{}{}{}{}", " ".repeat(fill), sign, prefix, digits)
    }
}

fn ascii_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c as u32 {
            0..=0x7f => out.push(c),
            code @ 0x80..=0xff => out.push_str(&format!("\\x{:02x}", code)),
            code @ 0x100..=0xffff => out.push_str(&format!("\\u{:04x}", code)),
            code => out.push_str(&format!("\\U{:08x}", code)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fmt(template: &str, args: impl Into<Value>) -> String {
        match format_str(template, &args.into()) {
            Ok(Value::Str(s)) => s.to_string(),
            other => panic!("formatting {template:?} failed: {other:?}"),
        }
    }

    fn fmt_err(template: &str, args: Value) -> RuntimeError {
        format_str(template, &args).unwrap_err()
    }

    fn tuple(items: Vec<Value>) -> Value {
        Value::tuple(items)
    }

    #[test]
    fn test_strings_and_reprs() {
        assert_eq!(fmt("%s", 1), "1");
        assert_eq!(fmt("%s!", "hi"), "hi!");
        assert_eq!(fmt("%r", "hi"), "'hi'");
        assert_eq!(fmt("%a", "é"), "'\\xe9'");
        assert_eq!(fmt("[%5s|%-5s]", tuple(vec!["a".into(), "b".into()])), "[    a|b    ]");
        assert_eq!(fmt("%.2s", "abc"), "ab");
        assert_eq!(fmt("100%%", tuple(vec![])), "100%");
    }

    #[test]
    fn test_integers() {
        assert_eq!(fmt("%d", tuple(vec![1.into()])), "1");
        assert_eq!(fmt("%i|%u", tuple(vec![(-3).into(), true.into()])), "-3|1");
        assert_eq!(fmt("%05d", -42), "-0042");
        assert_eq!(fmt("%+d % d", tuple(vec![5.into(), 5.into()])), "+5  5");
        assert_eq!(fmt("%.3d", 7), "007");
        assert_eq!(fmt("%d", 3.99), "3");
        assert_eq!(fmt("%d", -1e20), "-100000000000000000000");
        assert_eq!(fmt("%x %X %o", tuple(vec![255.into(), 255.into(), 8.into()])), "ff FF 10");
        assert_eq!(fmt("%#x %#o", tuple(vec![(-255).into(), 8.into()])), "-0xff 0o10");
        assert_eq!(fmt("%#06x", 255), "0x00ff");
        assert_eq!(fmt("%*d", tuple(vec![4.into(), 1.into()])), "   1");
    }

    #[test]
    fn test_floats() {
        assert_eq!(fmt("%f", 1.5), "1.500000");
        assert_eq!(fmt("%.2f", 2.675), "2.67");
        assert_eq!(fmt("%08.3f", -3.14159), "-003.142");
        assert_eq!(fmt("%f", 2), "2.000000");
        assert_eq!(fmt("%e", 12345.678), "1.234568e+04");
        assert_eq!(fmt("%.0E", 0.00012), "1E-04");
        assert_eq!(fmt("%g", 0.0), "0");
        assert_eq!(fmt("%g", 100000.0), "100000");
        assert_eq!(fmt("%g", 1e6), "1e+06");
        assert_eq!(fmt("%g", 0.00001234), "1.234e-05");
        assert_eq!(fmt("%#g", 1.0), "1.00000");
        assert_eq!(fmt("%5f|%F", tuple(vec![f64::INFINITY.into(), f64::NAN.into()])), "  inf|NAN");
    }

    #[test]
    fn test_characters() {
        assert_eq!(fmt("%c%c", tuple(vec![72.into(), "i".into()])), "Hi");
        let err = fmt_err("%c", Value::Int(-1));
        assert_eq!(err.to_string(), "%c arg not in range(0x110000)");
        let err = fmt_err("%c", Value::from("ab"));
        assert_eq!(err.to_string(), "%c requires int or char");
    }

    #[test]
    fn test_mapping_keys() {
        let args = Value::dict([
            (Value::from("name"), Value::from("jon")),
            (Value::from("n"), Value::Int(3)),
        ])
        .unwrap();
        assert_eq!(fmt("%(name)s has %(n)03d", args.clone()), "jon has 003");
        assert_eq!(fmt("%s", args.clone()), "{'name': 'jon', 'n': 3}");
        assert_eq!(fmt("no fields", args.clone()), "no fields");

        let err = fmt_err("%(missing)s", args);
        assert_eq!(err, RuntimeError::KeyError { key: "'missing'".to_string() });
        let err = fmt_err("%(name)s", Value::Int(1));
        assert_eq!(err.to_string(), "format requires a mapping");
    }

    #[test]
    fn test_argument_count_errors() {
        let err = fmt_err("%s %s", Value::from("a"));
        assert_eq!(err.to_string(), "not enough arguments for format string");
        assert_eq!(err.exception(), "TypeError");

        let err = fmt_err("%s", tuple(vec![1.into(), 2.into()]));
        assert_eq!(err.to_string(), "not all arguments converted during string formatting");

        let err = fmt_err("abc", Value::Int(5));
        assert_eq!(err.exception(), "TypeError");
    }

    #[test]
    fn test_bad_specifiers() {
        let err = fmt_err("%d", Value::from("x"));
        assert_eq!(err.to_string(), "%d format: a real number is required, not str");
        let err = fmt_err("%x", Value::Float(1.5));
        assert_eq!(err.to_string(), "%x format: an integer is required, not float");
        let err = fmt_err("%f", Value::from("x"));
        assert_eq!(err.to_string(), "must be real number, not str");
        let err = fmt_err("%z", Value::Int(1));
        assert_eq!(err.to_string(), "unsupported format character 'z' (0x7a) at index 1");
        assert_eq!(err.exception(), "ValueError");
        let err = fmt_err("50%", Value::Int(1));
        assert_eq!(err.to_string(), "incomplete format");
    }

    #[test]
    fn test_width_is_capped() {
        let err = fmt_err("%999999999999s", Value::from("x"));
        assert_eq!(err.exception(), "MemoryError");
    }

    #[test]
    fn test_bytes_templates() {
        let out = format_bytes(b"%s=%d", &tuple(vec![Value::bytes(&b"k"[..]), 1.into()])).unwrap();
        assert_eq!(out.as_bytes(), Some(&b"k=1"[..]));
        let out = format_bytes(b"%r", &Value::from("\u{e9}")).unwrap();
        assert_eq!(out.as_bytes(), Some(&b"'\\xe9'"[..]));
        let out = format_bytes(b"%c", &Value::Int(255)).unwrap();
        assert_eq!(out.as_bytes(), Some(&[255u8][..]));

        let err = format_bytes(b"%s", &Value::from("text")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "%b requires a bytes-like object, or an object that implements __bytes__, not 'str'"
        );
    }
}
