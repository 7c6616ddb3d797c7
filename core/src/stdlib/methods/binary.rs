//! `bytes` methods.

use crate::{
    evaluator::{RuntimeError, operators::find_subslice},
    stdlib::{constructors::decode as decode_bytes, index_arg, str_arg},
    values::{Args, MethodFn, Value, check_len, iterate},
};

pub(super) fn method(name: &str) -> Option<(&'static str, MethodFn)> {
    let entry: (&'static str, MethodFn) = match name {
        "decode" => ("decode", decode),
        "hex" => ("hex", hex),
        "upper" => ("upper", upper),
        "lower" => ("lower", lower),
        "strip" => ("strip", strip),
        "lstrip" => ("lstrip", lstrip),
        "rstrip" => ("rstrip", rstrip),
        "startswith" => ("startswith", startswith),
        "endswith" => ("endswith", endswith),
        "find" => ("find", find),
        "index" => ("index", index),
        "count" => ("count", count),
        "split" => ("split", split),
        "join" => ("join", join),
        "replace" => ("replace", replace),
        "isdigit" => ("isdigit", isdigit),
        "isalpha" => ("isalpha", isalpha),
        "isalnum" => ("isalnum", isalnum),
        "isspace" => ("isspace", isspace),
        _ => return None,
    };
    Some(entry)
}

fn data(receiver: &Value) -> &[u8] {
    receiver.as_bytes().unwrap_or_default()
}

fn bytes_arg<'a>(value: &'a Value) -> Result<&'a [u8], RuntimeError> {
    value.as_bytes().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "a bytes-like object is required, not '{}'",
            value.type_name()
        ))
    })
}

/// Python's `bytes.isspace` byte class.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

fn decode(receiver: &Value, mut args: Args) -> Result<Value, RuntimeError> {
    let encoding = args.take_keyword("encoding");
    let errors = args.take_keyword("errors");
    args.finish("decode")?;
    args.check_positional("decode", 0, 2)?;
    let encoding = encoding.or_else(|| args.positional.first().cloned());
    let errors = errors.or_else(|| args.positional.get(1).cloned());
    let encoding = encoding
        .as_ref()
        .map(|e| str_arg("decode", e))
        .transpose()?
        .unwrap_or("utf-8");
    let errors = errors
        .as_ref()
        .map(|e| str_arg("decode", e))
        .transpose()?
        .unwrap_or("strict");
    decode_bytes(data(receiver), encoding, errors).map(Value::from)
}

fn hex(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("hex", 0, 0)?;
    let out: String = data(receiver).iter().map(|b| format!("{:02x}", b)).collect();
    Ok(Value::from(out))
}

fn upper(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("upper", 0, 0)?;
    Ok(Value::bytes(data(receiver).to_ascii_uppercase()))
}

fn lower(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("lower", 0, 0)?;
    Ok(Value::bytes(data(receiver).to_ascii_lowercase()))
}

fn strip_with(name: &str, receiver: &Value, args: Args, left: bool, right: bool) -> Result<Value, RuntimeError> {
    args.check(name, 0, 1)?;
    let set = match args.get(0) {
        None | Some(Value::None) => None,
        Some(v) => Some(bytes_arg(v)?),
    };
    let strip = |b: &u8| match set {
        None => is_space(*b),
        Some(set) => set.contains(b),
    };
    let mut s = data(receiver);
    if left {
        let n = s.iter().take_while(|b| strip(b)).count();
        s = &s[n..];
    }
    if right {
        let n = s.iter().rev().take_while(|b| strip(b)).count();
        s = &s[..s.len() - n];
    }
    Ok(Value::bytes(s.to_vec()))
}

fn strip(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    strip_with("strip", receiver, args, true, true)
}

fn lstrip(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    strip_with("lstrip", receiver, args, true, false)
}

fn rstrip(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    strip_with("rstrip", receiver, args, false, true)
}

/// Byte window `[start:end]` with `str.find`-style index adjustment.
fn window(len: usize, start: Option<&Value>, end: Option<&Value>) -> Result<Option<(usize, usize)>, RuntimeError> {
    let len = len as i64;
    let resolve = |v: Option<&Value>, default: i64| -> Result<i64, RuntimeError> {
        match v {
            None | Some(Value::None) => Ok(default),
            Some(v) => {
                let i = index_arg(v)?;
                Ok(if i < 0 { (i + len).max(0) } else { i })
            }
        }
    };
    let start = resolve(start, 0)?;
    let end = resolve(end, len)?.min(len);
    if start > len {
        return Ok(None);
    }
    Ok(Some((start as usize, end.max(start) as usize)))
}

fn affix(name: &str, receiver: &Value, args: Args, at_end: bool) -> Result<Value, RuntimeError> {
    args.check(name, 1, 3)?;
    let s = data(receiver);
    let Some((lo, hi)) = window(s.len(), args.get(1), args.get(2))? else {
        return Ok(Value::Bool(false));
    };
    let hay = &s[lo..hi];
    let test = |affix: &[u8]| {
        if at_end { hay.ends_with(affix) } else { hay.starts_with(affix) }
    };
    match &args.positional[0] {
        Value::Tuple(options) => {
            for option in options.iter() {
                if test(bytes_arg(option)?) {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        other => Ok(Value::Bool(test(bytes_arg(other)?))),
    }
}

fn startswith(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    affix("startswith", receiver, args, false)
}

fn endswith(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    affix("endswith", receiver, args, true)
}

fn search(name: &str, receiver: &Value, args: &Args) -> Result<Option<usize>, RuntimeError> {
    args.check(name, 1, 3)?;
    let needle = bytes_arg(&args.positional[0])?;
    let s = data(receiver);
    let Some((lo, hi)) = window(s.len(), args.get(1), args.get(2))? else {
        return Ok(None);
    };
    Ok(find_subslice(&s[lo..hi], needle).map(|i| lo + i))
}

fn find(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    Ok(Value::Int(search("find", receiver, &args)?.map_or(-1, |i| i as i64)))
}

fn index(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    search("index", receiver, &args)?
        .map(|i| Value::Int(i as i64))
        .ok_or_else(|| RuntimeError::value_error("subsection not found"))
}

fn count(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("count", 1, 3)?;
    let needle = bytes_arg(&args.positional[0])?;
    let s = data(receiver);
    let Some((lo, hi)) = window(s.len(), args.get(1), args.get(2))? else {
        return Ok(Value::Int(0));
    };
    let hay = &s[lo..hi];
    if needle.is_empty() {
        return Ok(Value::Int(hay.len() as i64 + 1));
    }
    let mut n = 0;
    let mut pos = 0;
    while let Some(i) = find_subslice(&hay[pos..], needle) {
        n += 1;
        pos += i + needle.len();
    }
    Ok(Value::Int(n))
}

fn split(receiver: &Value, mut args: Args) -> Result<Value, RuntimeError> {
    let sep = args.take_keyword("sep");
    let maxsplit = args.take_keyword("maxsplit");
    args.finish("split")?;
    args.check_positional("split", 0, 2)?;
    let sep = sep.or_else(|| args.positional.first().cloned());
    let maxsplit = match maxsplit.or_else(|| args.positional.get(1).cloned()) {
        Some(v) => index_arg(&v)?,
        None => -1,
    };
    let s = data(receiver);
    let mut parts: Vec<&[u8]> = Vec::new();
    let limit_hit = |parts: &Vec<&[u8]>| maxsplit >= 0 && parts.len() as i64 == maxsplit;
    match &sep {
        None | Some(Value::None) => {
            let mut rest = &s[s.iter().take_while(|b| is_space(**b)).count()..];
            while !rest.is_empty() {
                if limit_hit(&parts) {
                    parts.push(rest);
                    break;
                }
                match rest.iter().position(|b| is_space(*b)) {
                    Some(i) => {
                        parts.push(&rest[..i]);
                        let skip = rest[i..].iter().take_while(|b| is_space(**b)).count();
                        rest = &rest[i + skip..];
                    }
                    None => {
                        parts.push(rest);
                        break;
                    }
                }
            }
        }
        Some(sep) => {
            let sep = bytes_arg(sep)?;
            if sep.is_empty() {
                return Err(RuntimeError::value_error("empty separator"));
            }
            let mut rest = s;
            loop {
                if limit_hit(&parts) {
                    parts.push(rest);
                    break;
                }
                match find_subslice(rest, sep) {
                    Some(i) => {
                        parts.push(&rest[..i]);
                        rest = &rest[i + sep.len()..];
                    }
                    None => {
                        parts.push(rest);
                        break;
                    }
                }
            }
        }
    }
    Ok(Value::list(
        parts
            .into_iter()
            .map(|p| Value::bytes(p.to_vec()))
            .collect::<Vec<_>>(),
    ))
}

fn join(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("join", 1, 1)?;
    let sep = data(receiver);
    let mut out = Vec::new();
    for (i, item) in iterate(&args.positional[0])?.enumerate() {
        let Value::Bytes(part) = &item else {
            return Err(RuntimeError::type_error(format!(
                "sequence item {}: expected a bytes-like object, {} found",
                i,
                item.type_name()
            )));
        };
        if i > 0 {
            out.extend_from_slice(sep);
        }
        out.extend_from_slice(part);
        check_len(out.len())?;
    }
    Ok(Value::bytes(out))
}

fn replace(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("replace", 2, 3)?;
    let old = bytes_arg(&args.positional[0])?;
    let new = bytes_arg(&args.positional[1])?;
    let mut remaining = match args.get(2) {
        Some(v) => index_arg(v)?,
        None => -1,
    };
    let s = data(receiver);
    let mut out = Vec::with_capacity(s.len());
    let mut pos = 0;
    while remaining != 0 {
        let found = if old.is_empty() {
            (pos <= s.len()).then_some(0)
        } else {
            find_subslice(&s[pos..], old)
        };
        let Some(i) = found else { break };
        out.extend_from_slice(&s[pos..pos + i]);
        out.extend_from_slice(new);
        check_len(out.len())?;
        pos += i + old.len();
        if old.is_empty() {
            match s.get(pos) {
                Some(&b) => out.push(b),
                None => {
                    pos += 1;
                    break;
                }
            }
            pos += 1;
        }
        remaining -= 1;
    }
    if pos <= s.len() {
        out.extend_from_slice(&s[pos..]);
    }
    Ok(Value::bytes(out))
}

fn all_bytes(name: &str, receiver: &Value, args: Args, pred: fn(u8) -> bool) -> Result<Value, RuntimeError> {
    args.check(name, 0, 0)?;
    let s = data(receiver);
    Ok(Value::Bool(!s.is_empty() && s.iter().all(|&b| pred(b))))
}

fn isdigit(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    all_bytes("isdigit", receiver, args, |b| b.is_ascii_digit())
}

fn isalpha(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    all_bytes("isalpha", receiver, args, |b| b.is_ascii_alphabetic())
}

fn isalnum(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    all_bytes("isalnum", receiver, args, |b| b.is_ascii_alphanumeric())
}

fn isspace(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    all_bytes("isspace", receiver, args, is_space)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn call(receiver: &[u8], name: &str, args: Vec<Value>) -> Value {
        let (_, func) = method(name).unwrap();
        func(&Value::bytes(receiver.to_vec()), Args::new(args)).unwrap()
    }

    fn b(s: &[u8]) -> Value {
        Value::bytes(s.to_vec())
    }

    #[test]
    fn test_decode_and_hex() {
        assert_eq!(call(b"caf\xc3\xa9", "decode", vec![]), Value::from("café"));
        assert_eq!(call(b"\x01\xff", "hex", vec![]), Value::from("01ff"));
        let (_, decode) = method("decode").unwrap();
        let err = decode(&b(b"\xff"), Args::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "'utf-8' codec can't decode byte 0xff in position 0: invalid start byte"
        );
        assert_eq!(err.exception(), "UnicodeDecodeError");
    }

    #[test]
    fn test_split_and_join() {
        assert_eq!(call(b" a  b ", "split", vec![]).repr(), "[b'a', b'b']");
        assert_eq!(call(b"a,b,,c", "split", vec![b(b",")]).repr(), "[b'a', b'b', b'', b'c']");
        assert_eq!(
            call(b"-", "join", vec![Value::list(vec![b(b"x"), b(b"y")])]),
            b(b"x-y")
        );
    }

    #[test]
    fn test_replace() {
        assert_eq!(call(b"aaa", "replace", vec![b(b"a"), b(b"b"), Value::Int(2)]), b(b"bba"));
        assert_eq!(call(b"ab", "replace", vec![b(b""), b(b"-")]), b(b"-a-b-"));
    }

    #[test]
    fn test_search() {
        assert_eq!(call(b"hello", "find", vec![b(b"l")]), Value::Int(2));
        assert_eq!(call(b"hello", "count", vec![b(b"l")]), Value::Int(2));
        assert_eq!(call(b"hello", "startswith", vec![b(b"he")]), Value::Bool(true));
        assert_eq!(call(b"  x ", "strip", vec![]), b(b"x"));
    }
}
