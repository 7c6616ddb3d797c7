//! Calling a builtin type object: `int("42")`, `list(x)`, `type(x)`, ...

use std::rc::Rc;

use crate::{
    evaluator::{RuntimeError, operators::int_overflow},
    stdlib::{index_arg, str_arg},
    values::{
        Args, Dict, SliceValue, TypeKind, Value, ValueSet, check_len, collect, iterate,
    },
};

/// Constructs an instance of `kind` from call arguments.
pub fn construct(kind: &TypeKind, mut args: Args) -> Result<Value, RuntimeError> {
    match kind {
        TypeKind::Bool => {
            args.check("bool", 0, 1)?;
            Ok(Value::Bool(args.get(0).is_some_and(Value::is_truthy)))
        }
        TypeKind::Int => {
            let base = args.take_keyword("base");
            args.finish("int")?;
            args.check_positional("int", 0, 2)?;
            let base = base.or_else(|| args.positional.get(1).cloned());
            make_int(args.get(0), base.as_ref()).map(Value::Int)
        }
        TypeKind::Float => {
            args.check("float", 0, 1)?;
            args.get(0).map_or(Ok(0.0), make_float).map(Value::Float)
        }
        TypeKind::Complex => {
            let real = args.take_keyword("real");
            let imag = args.take_keyword("imag");
            args.finish("complex")?;
            args.check_positional("complex", 0, 2)?;
            let real = real.or_else(|| args.positional.first().cloned());
            let imag = imag.or_else(|| args.positional.get(1).cloned());
            make_complex(real.as_ref(), imag.as_ref())
        }
        TypeKind::Str => {
            let encoding = args.take_keyword("encoding");
            let errors = args.take_keyword("errors");
            args.finish("str")?;
            args.check_positional("str", 0, 3)?;
            let encoding = encoding.or_else(|| args.positional.get(1).cloned());
            let errors = errors.or_else(|| args.positional.get(2).cloned());
            make_str(args.get(0), encoding.as_ref(), errors.as_ref())
        }
        TypeKind::Bytes => {
            let encoding = args.take_keyword("encoding");
            let errors = args.take_keyword("errors");
            args.finish("bytes")?;
            args.check_positional("bytes", 0, 3)?;
            let encoding = encoding.or_else(|| args.positional.get(1).cloned());
            let errors = errors.or_else(|| args.positional.get(2).cloned());
            make_bytes(args.get(0), encoding.as_ref(), errors.as_ref())
        }
        TypeKind::Tuple | TypeKind::List => {
            args.check(kind.name(), 0, 1)?;
            let items = match args.get(0) {
                Some(value) => collect(value)?,
                None => Vec::new(),
            };
            Ok(match kind {
                TypeKind::Tuple => Value::tuple(items),
                _ => Value::list(items),
            })
        }
        TypeKind::Set | TypeKind::FrozenSet => {
            args.check(kind.name(), 0, 1)?;
            let mut set = ValueSet::new();
            if let Some(value) = args.get(0) {
                for item in iterate(value)? {
                    set.insert(item)?;
                }
            }
            Ok(match kind {
                TypeKind::Set => Value::Set(Rc::new(set)),
                _ => Value::FrozenSet(Rc::new(set)),
            })
        }
        TypeKind::Dict => {
            args.check_positional("dict", 0, 1)?;
            let mut dict = Dict::new();
            if let Some(source) = args.get(0) {
                update_dict(&mut dict, source)?;
            }
            for (key, value) in args.keywords {
                dict.insert(Value::from(key), value)?;
            }
            Ok(Value::Dict(Rc::new(dict)))
        }
        TypeKind::Counter => super::collections::make_counter(args),
        TypeKind::Range => {
            args.check_positional("range", 1, 3)?;
            args.no_keywords("range")?;
            let ints = args
                .positional
                .iter()
                .map(index_arg)
                .collect::<Result<Vec<_>, _>>()?;
            let (start, stop, step) = match ints[..] {
                [stop] => (0, stop, 1),
                [start, stop] => (start, stop, 1),
                [start, stop, step] => (start, stop, step),
                _ => (0, 0, 1),
            };
            if step == 0 {
                return Err(RuntimeError::value_error("range() arg 3 must not be zero"));
            }
            Ok(Value::range(start, stop, step))
        }
        TypeKind::Slice => {
            args.check_positional("slice", 1, 3)?;
            args.no_keywords("slice")?;
            let bounds = args
                .positional
                .iter()
                .map(slice_bound)
                .collect::<Result<Vec<_>, _>>()?;
            let (start, stop, step) = match bounds[..] {
                [stop] => (None, stop, None),
                [start, stop] => (start, stop, None),
                [start, stop, step] => (start, stop, step),
                _ => (None, None, None),
            };
            Ok(Value::Slice(SliceValue { start, stop, step }))
        }
        TypeKind::Type => {
            args.no_keywords("type")?;
            match &args.positional[..] {
                [value] => Ok(Value::Type(value.type_of())),
                _ => Err(RuntimeError::type_error("type() takes 1 argument")),
            }
        }
        TypeKind::NoneType | TypeKind::Other(_) => Err(RuntimeError::type_error(format!(
            "cannot create '{}' instances",
            kind.name()
        ))),
    }
}

fn slice_bound(value: &Value) -> Result<Option<i64>, RuntimeError> {
    match value {
        Value::None => Ok(None),
        Value::Int(_) | Value::Bool(_) => Ok(value.as_int()),
        _ => Err(RuntimeError::type_error(
            "slice indices must be integers or None or have an __index__ method",
        )),
    }
}

/// Adds the entries of a mapping, or of an iterable of pairs, to `dict`.
pub(crate) fn update_dict(dict: &mut Dict, source: &Value) -> Result<(), RuntimeError> {
    if let Value::Dict(other) = source {
        for (key, value) in other.iter() {
            dict.insert(key.clone(), value.clone())?;
        }
        return Ok(());
    }
    for (i, item) in iterate(source)?.enumerate() {
        let pair = match &item {
            Value::Tuple(_) | Value::List(_) | Value::Str(_) | Value::Bytes(_) => collect(&item)?,
            _ => {
                return Err(RuntimeError::type_error(format!(
                    "cannot convert dictionary update sequence element #{} to a sequence",
                    i
                )));
            }
        };
        match <[Value; 2]>::try_from(pair) {
            Ok([key, value]) => dict.insert(key, value)?,
            Err(pair) => {
                return Err(RuntimeError::value_error(format!(
                    "dictionary update sequence element #{} has length {}; 2 is required",
                    i,
                    pair.len()
                )));
            }
        }
    }
    Ok(())
}

// ============================================================================
// Numbers
// ============================================================================

/// Truncates a float to an int, as `int(x)` does.
pub(crate) fn float_to_int(f: f64) -> Result<i64, RuntimeError> {
    if f.is_nan() {
        return Err(RuntimeError::value_error("cannot convert float NaN to integer"));
    }
    if f.is_infinite() {
        return Err(RuntimeError::overflow(
            "cannot convert float infinity to integer",
        ));
    }
    let t = f.trunc();
    // 2^63 is exactly representable; anything at or past it does not fit.
    if t >= 9_223_372_036_854_775_808.0 || t < -9_223_372_036_854_775_808.0 {
        return Err(int_overflow());
    }
    Ok(t as i64)
}

fn make_int(value: Option<&Value>, base: Option<&Value>) -> Result<i64, RuntimeError> {
    let Some(value) = value else {
        return match base {
            Some(_) => Err(RuntimeError::type_error("int() missing string argument")),
            None => Ok(0),
        };
    };
    if let Some(base) = base {
        let base = index_arg(base)?;
        let text = match value {
            Value::Str(s) => s.to_string(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            _ => {
                return Err(RuntimeError::type_error(
                    "int() can't convert non-string with explicit base",
                ));
            }
        };
        return parse_int(&text, base, value);
    }
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(value.as_int().unwrap_or(0)),
        Value::Float(f) => float_to_int(*f),
        Value::Str(s) => parse_int(s, 10, value),
        Value::Bytes(b) => parse_int(&String::from_utf8_lossy(b), 10, value),
        other => Err(RuntimeError::type_error(format!(
            "int() argument must be a string, a bytes-like object or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

/// Parses an integer literal the way `int(text, base)` does, including
/// `0x`/`0o`/`0b` prefixes and `_` separators.
pub(crate) fn parse_int(text: &str, base: i64, original: &Value) -> Result<i64, RuntimeError> {
    if base != 0 && !(2..=36).contains(&base) {
        return Err(RuntimeError::value_error(
            "int() base must be >= 2 and <= 36, or 0",
        ));
    }
    let invalid = || {
        RuntimeError::value_error(format!(
            "invalid literal for int() with base {}: {}",
            base,
            original.repr()
        ))
    };
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let lower = unsigned.to_ascii_lowercase();
    let prefixed = |p: &str| lower.starts_with(p) && lower.len() > 2;
    let (radix, digits, had_prefix) = if (base == 0 || base == 16) && prefixed("0x") {
        (16, &lower[2..], true)
    } else if (base == 0 || base == 8) && prefixed("0o") {
        (8, &lower[2..], true)
    } else if (base == 0 || base == 2) && prefixed("0b") {
        (2, &lower[2..], true)
    } else if base == 0 {
        // Decimal with base 0 forbids leading zeros, as literals do.
        if lower.len() > 1 && lower.starts_with('0') && lower.chars().any(|c| c != '0' && c != '_') {
            return Err(invalid());
        }
        (10, &lower[..], false)
    } else {
        (base as u32, &lower[..], false)
    };
    let digits = if had_prefix {
        digits.strip_prefix('_').unwrap_or(digits)
    } else {
        digits
    };
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return Err(invalid());
    }
    let mut acc: i128 = 0;
    for c in digits.chars().filter(|&c| c != '_') {
        let d = c.to_digit(radix).ok_or_else(invalid)?;
        acc = acc * radix as i128 + d as i128;
        if acc > i64::MAX as i128 + 1 {
            return Err(int_overflow());
        }
    }
    let value = if negative { -acc } else { acc };
    i64::try_from(value).map_err(|_| int_overflow())
}

fn make_float(value: &Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Int(_) | Value::Bool(_) | Value::Float(_) => Ok(value.as_float().unwrap_or(0.0)),
        Value::Str(s) => parse_float(s).ok_or_else(|| float_error(value)),
        Value::Bytes(b) => std::str::from_utf8(b)
            .ok()
            .and_then(parse_float)
            .ok_or_else(|| float_error(value)),
        other => Err(RuntimeError::type_error(format!(
            "float() argument must be a string or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

fn float_error(value: &Value) -> RuntimeError {
    RuntimeError::value_error(format!(
        "could not convert string to float: {}",
        value.repr()
    ))
}

/// Parses a float the way `float(text)` does.
pub(crate) fn parse_float(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let (sign, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    match unsigned.to_ascii_lowercase().as_str() {
        "inf" | "infinity" => return Some(sign * f64::INFINITY),
        "nan" => return Some(f64::NAN),
        _ => {}
    }
    let bytes = unsigned.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let ok = match b {
            b'0'..=b'9' | b'.' | b'e' | b'E' => true,
            b'+' | b'-' => i > 0 && matches!(bytes[i - 1], b'e' | b'E'),
            b'_' => {
                i > 0
                    && bytes[i - 1].is_ascii_digit()
                    && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
            }
            _ => false,
        };
        if !ok {
            return None;
        }
    }
    if !bytes.iter().any(u8::is_ascii_digit) {
        return None;
    }
    let cleaned: String = unsigned.chars().filter(|&c| c != '_').collect();
    cleaned.parse::<f64>().ok().map(|f| sign * f)
}

fn make_complex(real: Option<&Value>, imag: Option<&Value>) -> Result<Value, RuntimeError> {
    let parts = |value: &Value, expected: &str| -> Result<(f64, f64), RuntimeError> {
        match value {
            Value::Complex { re, im } => Ok((*re, *im)),
            Value::Int(_) | Value::Bool(_) | Value::Float(_) => {
                Ok((value.as_float().unwrap_or(0.0), 0.0))
            }
            other => Err(RuntimeError::type_error(format!(
                "complex() {}, not '{}'",
                expected,
                other.type_name()
            ))),
        }
    };
    if let Some(Value::Str(s)) = real {
        if imag.is_some() {
            return Err(RuntimeError::type_error(
                "complex() can't take second arg if first is a string",
            ));
        }
        let (re, im) = parse_complex(s)
            .ok_or_else(|| RuntimeError::value_error("complex() arg is a malformed string"))?;
        return Ok(Value::complex(re, im));
    }
    if let Some(Value::Str(_)) = imag {
        return Err(RuntimeError::type_error(
            "complex() second arg can't be a string",
        ));
    }
    let (rr, ri) = real.map_or(Ok((0.0, 0.0)), |v| parts(v, "first argument must be a string or a number"))?;
    let (ir, ii) = imag.map_or(Ok((0.0, 0.0)), |v| parts(v, "second argument must be a number"))?;
    Ok(Value::complex(rr - ii, ri + ir))
}

/// Parses `"1+2j"`, `"-3j"`, `"(1-1j)"`, `"2.5"`.
fn parse_complex(text: &str) -> Option<(f64, f64)> {
    let mut s = text.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        s = inner.trim();
    }
    let Some(body) = s.strip_suffix(['j', 'J']) else {
        return parse_float_strict(s).map(|re| (re, 0.0));
    };
    let bytes = body.as_bytes();
    let split = (1..bytes.len())
        .rev()
        .find(|&i| matches!(bytes[i], b'+' | b'-') && !matches!(bytes[i - 1], b'e' | b'E'));
    let imag = |part: &str| match part {
        "" | "+" => Some(1.0),
        "-" => Some(-1.0),
        other => parse_float_strict(other),
    };
    match split {
        Some(i) => Some((parse_float_strict(&body[..i])?, imag(&body[i..])?)),
        None => Some((0.0, imag(body)?)),
    }
}

fn parse_float_strict(text: &str) -> Option<f64> {
    if text.trim() != text || text.is_empty() {
        return None;
    }
    parse_float(text)
}

// ============================================================================
// Strings and bytes
// ============================================================================

fn make_str(
    value: Option<&Value>,
    encoding: Option<&Value>,
    errors: Option<&Value>,
) -> Result<Value, RuntimeError> {
    let Some(value) = value else {
        return Ok(Value::from(""));
    };
    if encoding.is_none() && errors.is_none() {
        return Ok(match value {
            Value::Str(_) => value.clone(),
            other => Value::from(other.to_str()),
        });
    }
    let encoding = encoding.map(|e| str_arg("str", e)).transpose()?.unwrap_or("utf-8");
    let errors = errors.map(|e| str_arg("str", e)).transpose()?.unwrap_or("strict");
    match value {
        Value::Bytes(b) => decode(b, encoding, errors).map(Value::from),
        Value::Str(_) => Err(RuntimeError::type_error("decoding str is not supported")),
        other => Err(RuntimeError::type_error(format!(
            "decoding to str: need a bytes-like object, {} found",
            other.type_name()
        ))),
    }
}

fn make_bytes(
    value: Option<&Value>,
    encoding: Option<&Value>,
    errors: Option<&Value>,
) -> Result<Value, RuntimeError> {
    let Some(value) = value else {
        return Ok(Value::bytes(Vec::new()));
    };
    match value {
        Value::Str(s) => {
            let Some(encoding) = encoding else {
                return Err(RuntimeError::type_error("string argument without an encoding"));
            };
            let encoding = str_arg("bytes", encoding)?;
            let errors = errors.map(|e| str_arg("bytes", e)).transpose()?.unwrap_or("strict");
            encode(s, encoding, errors).map(Value::bytes)
        }
        _ if encoding.is_some() => Err(RuntimeError::type_error(
            "encoding without a string argument",
        )),
        Value::Bytes(_) => Ok(value.clone()),
        Value::Int(_) | Value::Bool(_) => {
            let n = value.as_int().unwrap_or(0);
            if n < 0 {
                return Err(RuntimeError::value_error("negative count"));
            }
            check_len(n as usize)?;
            Ok(Value::bytes(vec![0u8; n as usize]))
        }
        Value::Float(_) | Value::Complex { .. } | Value::None => Err(RuntimeError::type_error(
            format!("cannot convert '{}' object to bytes", value.type_name()),
        )),
        iterable => {
            let mut out = Vec::new();
            for item in iterate(iterable)? {
                let byte = index_arg(&item)?;
                if !(0..256).contains(&byte) {
                    return Err(RuntimeError::value_error("bytes must be in range(0, 256)"));
                }
                out.push(byte as u8);
                check_len(out.len())?;
            }
            Ok(Value::bytes(out))
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Codec {
    Utf8,
    Ascii,
    Latin1,
}

impl Codec {
    fn lookup(encoding: &str) -> Result<Codec, RuntimeError> {
        let normalized = encoding.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" | "u8" => Ok(Codec::Utf8),
            "ascii" | "us-ascii" => Ok(Codec::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(Codec::Latin1),
            _ => Err(RuntimeError::host(
                "LookupError",
                format!("unknown encoding: {}", encoding),
            )),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Codec::Utf8 => "utf-8",
            Codec::Ascii => "ascii",
            Codec::Latin1 => "latin-1",
        }
    }

    fn limit(self) -> u32 {
        match self {
            Codec::Utf8 => u32::MAX,
            Codec::Ascii => 0x80,
            Codec::Latin1 => 0x100,
        }
    }
}

fn check_errors(errors: &str) -> Result<(), RuntimeError> {
    match errors {
        "strict" | "ignore" | "replace" => Ok(()),
        other => Err(RuntimeError::host(
            "LookupError",
            format!("unknown error handler name '{}'", other),
        )),
    }
}

/// `str.encode(encoding, errors)`.
pub(crate) fn encode(s: &str, encoding: &str, errors: &str) -> Result<Vec<u8>, RuntimeError> {
    let codec = Codec::lookup(encoding)?;
    check_errors(errors)?;
    if codec == Codec::Utf8 {
        return Ok(s.as_bytes().to_vec());
    }
    let mut out = Vec::with_capacity(s.len());
    for (pos, c) in s.chars().enumerate() {
        if (c as u32) < codec.limit() {
            out.push(c as u32 as u8);
            continue;
        }
        match errors {
            "ignore" => {}
            "replace" => out.push(b'?'),
            _ => {
                return Err(RuntimeError::host(
                    "UnicodeEncodeError",
                    format!(
                        "'{}' codec can't encode character {} in position {}: ordinal not in range({})",
                        codec.name(),
                        escape_char(c),
                        pos,
                        codec.limit()
                    ),
                ));
            }
        }
    }
    Ok(out)
}

fn escape_char(c: char) -> String {
    let code = c as u32;
    if code <= 0xff {
        format!("'\\x{:02x}'", code)
    } else if code <= 0xffff {
        format!("'\\u{:04x}'", code)
    } else {
        format!("'\\U{:08x}'", code)
    }
}

/// `bytes.decode(encoding, errors)`.
pub(crate) fn decode(b: &[u8], encoding: &str, errors: &str) -> Result<String, RuntimeError> {
    let codec = Codec::lookup(encoding)?;
    check_errors(errors)?;
    match codec {
        Codec::Latin1 => Ok(b.iter().map(|&byte| byte as char).collect()),
        Codec::Ascii => {
            let mut out = String::with_capacity(b.len());
            for (pos, &byte) in b.iter().enumerate() {
                if byte < 0x80 {
                    out.push(byte as char);
                    continue;
                }
                match errors {
                    "ignore" => {}
                    "replace" => out.push('\u{fffd}'),
                    _ => {
                        return Err(decode_error(
                            codec,
                            byte,
                            pos,
                            "ordinal not in range(128)",
                        ));
                    }
                }
            }
            Ok(out)
        }
        Codec::Utf8 => match errors {
            "replace" => Ok(String::from_utf8_lossy(b).into_owned()),
            "ignore" => Ok(b.utf8_chunks().map(|chunk| chunk.valid()).collect()),
            _ => match std::str::from_utf8(b) {
                Ok(s) => Ok(s.to_string()),
                Err(err) => {
                    let pos = err.valid_up_to();
                    let byte = b[pos];
                    let reason = match err.error_len() {
                        None => "unexpected end of data",
                        Some(_) if (0x80..0xc0).contains(&byte) || byte >= 0xf8 => {
                            "invalid start byte"
                        }
                        Some(_) => "invalid continuation byte",
                    };
                    Err(decode_error(codec, byte, pos, reason))
                }
            },
        },
    }
}

fn decode_error(codec: Codec, byte: u8, pos: usize, reason: &str) -> RuntimeError {
    RuntimeError::host(
        "UnicodeDecodeError",
        format!(
            "'{}' codec can't decode byte 0x{:02x} in position {}: {}",
            codec.name(),
            byte,
            pos,
            reason
        ),
    )
}

#[cfg(test)]
#[path = "constructors_test.rs"]
mod constructors_test;
