//! `str` methods.
//!
//! Positions (`find`, `index`, the `start`/`end` arguments) count characters,
//! not bytes.

use crate::{
    evaluator::RuntimeError,
    stdlib::{
        constructors::encode as encode_str, index_arg, str_arg, string::capitalize as cap_word,
    },
    values::{Args, MethodFn, Value, check_len, iterate},
};

pub(super) fn method(name: &str) -> Option<(&'static str, MethodFn)> {
    let entry: (&'static str, MethodFn) = match name {
        "upper" => ("upper", upper),
        "lower" => ("lower", lower),
        "casefold" => ("casefold", casefold),
        "capitalize" => ("capitalize", capitalize),
        "title" => ("title", title),
        "swapcase" => ("swapcase", swapcase),
        "strip" => ("strip", strip),
        "lstrip" => ("lstrip", lstrip),
        "rstrip" => ("rstrip", rstrip),
        "split" => ("split", split),
        "rsplit" => ("rsplit", rsplit),
        "splitlines" => ("splitlines", splitlines),
        "join" => ("join", join),
        "replace" => ("replace", replace),
        "startswith" => ("startswith", startswith),
        "endswith" => ("endswith", endswith),
        "find" => ("find", find),
        "rfind" => ("rfind", rfind),
        "index" => ("index", index),
        "rindex" => ("rindex", rindex),
        "count" => ("count", count),
        "isdigit" => ("isdigit", isdigit),
        "isdecimal" => ("isdecimal", isdigit),
        "isnumeric" => ("isnumeric", isnumeric),
        "isalpha" => ("isalpha", isalpha),
        "isalnum" => ("isalnum", isalnum),
        "isspace" => ("isspace", isspace),
        "isupper" => ("isupper", isupper),
        "islower" => ("islower", islower),
        "istitle" => ("istitle", istitle),
        "isascii" => ("isascii", isascii),
        "isidentifier" => ("isidentifier", isidentifier),
        "center" => ("center", center),
        "ljust" => ("ljust", ljust),
        "rjust" => ("rjust", rjust),
        "zfill" => ("zfill", zfill),
        "partition" => ("partition", partition),
        "rpartition" => ("rpartition", rpartition),
        "encode" => ("encode", encode),
        "removeprefix" => ("removeprefix", removeprefix),
        "removesuffix" => ("removesuffix", removesuffix),
        "expandtabs" => ("expandtabs", expandtabs),
        _ => return None,
    };
    Some(entry)
}

fn text(receiver: &Value) -> &str {
    receiver.as_str().unwrap_or_default()
}

/// Python's `str.isspace` character class.
pub(crate) fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

// ============================================================================
// Case
// ============================================================================

fn upper(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("upper", 0, 0)?;
    Ok(Value::from(text(receiver).to_uppercase()))
}

fn lower(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("lower", 0, 0)?;
    Ok(Value::from(text(receiver).to_lowercase()))
}

fn casefold(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("casefold", 0, 0)?;
    Ok(Value::from(text(receiver).to_lowercase().replace('ß', "ss")))
}

fn capitalize(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("capitalize", 0, 0)?;
    Ok(Value::from(cap_word(text(receiver))))
}

fn title(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("title", 0, 0)?;
    let mut out = String::new();
    let mut prev_cased = false;
    for c in text(receiver).chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = is_cased(c);
    }
    Ok(Value::from(out))
}

fn swapcase(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("swapcase", 0, 0)?;
    let mut out = String::new();
    for c in text(receiver).chars() {
        if c.is_uppercase() {
            out.extend(c.to_lowercase());
        } else if c.is_lowercase() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    Ok(Value::from(out))
}

// ============================================================================
// Stripping and padding
// ============================================================================

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
    Both,
}

fn strip_with(name: &str, receiver: &Value, args: Args, side: Side) -> Result<Value, RuntimeError> {
    args.check(name, 0, 1)?;
    let s = text(receiver);
    let chars = match args.get(0) {
        None | Some(Value::None) => None,
        Some(v) => Some(v.as_str().ok_or_else(|| {
            RuntimeError::type_error(format!("{} arg must be None or str", name))
        })?),
    };
    let matches = |c: char| match chars {
        None => is_space(c),
        Some(set) => set.contains(c),
    };
    let stripped = match side {
        Side::Left => s.trim_start_matches(matches),
        Side::Right => s.trim_end_matches(matches),
        Side::Both => s.trim_matches(matches),
    };
    Ok(Value::from(stripped))
}

fn strip(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    strip_with("strip", receiver, args, Side::Both)
}

fn lstrip(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    strip_with("lstrip", receiver, args, Side::Left)
}

fn rstrip(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    strip_with("rstrip", receiver, args, Side::Right)
}

/// Width and fill character of `center`, `ljust` and `rjust`.
fn padding(name: &str, args: &Args) -> Result<(usize, char), RuntimeError> {
    args.check(name, 1, 2)?;
    let width = index_arg(&args.positional[0])?.max(0) as usize;
    check_len(width)?;
    let fill = match args.get(1) {
        None => ' ',
        Some(v) => {
            let s = v.as_str().ok_or_else(|| {
                RuntimeError::type_error(format!(
                    "{}() argument 2 must be str, not {}",
                    name,
                    v.type_name()
                ))
            })?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(RuntimeError::type_error(
                        "The fill character must be exactly one character long",
                    ));
                }
            }
        }
    };
    Ok((width, fill))
}

fn pad(s: &str, left: usize, right: usize, fill: char) -> Value {
    let mut out = String::with_capacity(s.len() + (left + right) * fill.len_utf8());
    out.extend(std::iter::repeat_n(fill, left));
    out.push_str(s);
    out.extend(std::iter::repeat_n(fill, right));
    Value::from(out)
}

fn center(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    let (width, fill) = padding("center", &args)?;
    let s = text(receiver);
    let len = s.chars().count();
    if width <= len {
        return Ok(receiver.clone());
    }
    let margin = width - len;
    let left = margin / 2 + (margin & width & 1);
    Ok(pad(s, left, margin - left, fill))
}

fn ljust(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    let (width, fill) = padding("ljust", &args)?;
    let s = text(receiver);
    let len = s.chars().count();
    Ok(pad(s, 0, width.saturating_sub(len), fill))
}

fn rjust(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    let (width, fill) = padding("rjust", &args)?;
    let s = text(receiver);
    let len = s.chars().count();
    Ok(pad(s, width.saturating_sub(len), 0, fill))
}

fn zfill(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("zfill", 1, 1)?;
    let width = index_arg(&args.positional[0])?.max(0) as usize;
    check_len(width)?;
    let s = text(receiver);
    let len = s.chars().count();
    if width <= len {
        return Ok(receiver.clone());
    }
    let zeros = "0".repeat(width - len);
    let out = match s.strip_prefix(['+', '-']) {
        Some(rest) => format!("{}{}{}", &s[..1], zeros, rest),
        None => format!("{}{}", zeros, s),
    };
    Ok(Value::from(out))
}

fn expandtabs(receiver: &Value, mut args: Args) -> Result<Value, RuntimeError> {
    let tabsize = args.take_keyword("tabsize");
    args.finish("expandtabs")?;
    args.check_positional("expandtabs", 0, 1)?;
    let tabsize = match tabsize.or_else(|| args.positional.first().cloned()) {
        Some(v) => index_arg(&v)?.max(0) as usize,
        None => 8,
    };
    let mut out = String::new();
    let mut column = 0usize;
    for c in text(receiver).chars() {
        match c {
            '\t' if tabsize > 0 => {
                let spaces = tabsize - column % tabsize;
                check_len(out.len() + spaces)?;
                out.extend(std::iter::repeat_n(' ', spaces));
                column += spaces;
            }
            '\t' => {}
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    Ok(Value::from(out))
}

// ============================================================================
// Splitting and joining
// ============================================================================

/// `sep` and `maxsplit` of `split`/`rsplit`.
fn split_args(name: &str, mut args: Args) -> Result<(Option<String>, i64), RuntimeError> {
    let sep = args.take_keyword("sep");
    let maxsplit = args.take_keyword("maxsplit");
    args.finish(name)?;
    args.check_positional(name, 0, 2)?;
    let sep = match sep.or_else(|| args.positional.first().cloned()) {
        None | Some(Value::None) => None,
        Some(v) => {
            let s = v.as_str().ok_or_else(|| {
                RuntimeError::type_error(format!(
                    "must be str or None, not {}",
                    v.type_name()
                ))
            })?;
            if s.is_empty() {
                return Err(RuntimeError::value_error("empty separator"));
            }
            Some(s.to_string())
        }
    };
    let maxsplit = match maxsplit.or_else(|| args.positional.get(1).cloned()) {
        None => -1,
        Some(v) => index_arg(&v)?,
    };
    Ok((sep, maxsplit))
}

fn str_list<'a>(parts: impl IntoIterator<Item = &'a str>) -> Value {
    Value::list(parts.into_iter().map(Value::from).collect::<Vec<_>>())
}

fn split(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    let (sep, maxsplit) = split_args("split", args)?;
    let s = text(receiver);
    let parts: Vec<&str> = match &sep {
        Some(sep) if maxsplit < 0 => s.split(sep.as_str()).collect(),
        Some(sep) => s.splitn(maxsplit as usize + 1, sep.as_str()).collect(),
        None => {
            let mut parts = Vec::new();
            let mut rest = s.trim_start_matches(is_space);
            while !rest.is_empty() {
                if maxsplit >= 0 && parts.len() as i64 == maxsplit {
                    parts.push(rest);
                    break;
                }
                match rest.find(is_space) {
                    Some(i) => {
                        parts.push(&rest[..i]);
                        rest = rest[i..].trim_start_matches(is_space);
                    }
                    None => {
                        parts.push(rest);
                        break;
                    }
                }
            }
            parts
        }
    };
    Ok(str_list(parts))
}

fn rsplit(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    let (sep, maxsplit) = split_args("rsplit", args)?;
    let s = text(receiver);
    let mut parts: Vec<&str> = match &sep {
        Some(sep) if maxsplit < 0 => s.rsplit(sep.as_str()).collect(),
        Some(sep) => s.rsplitn(maxsplit as usize + 1, sep.as_str()).collect(),
        None => {
            let mut parts = Vec::new();
            let mut rest = s.trim_end_matches(is_space);
            while !rest.is_empty() {
                if maxsplit >= 0 && parts.len() as i64 == maxsplit {
                    parts.push(rest);
                    break;
                }
                match rest.rfind(is_space) {
                    Some(i) => {
                        let c = rest[i..].chars().next().map_or(1, char::len_utf8);
                        parts.push(&rest[i + c..]);
                        rest = rest[..i].trim_end_matches(is_space);
                    }
                    None => {
                        parts.push(rest);
                        break;
                    }
                }
            }
            parts
        }
    };
    parts.reverse();
    Ok(str_list(parts))
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn splitlines(receiver: &Value, mut args: Args) -> Result<Value, RuntimeError> {
    let keepends = args.take_keyword("keepends");
    args.finish("splitlines")?;
    args.check_positional("splitlines", 0, 1)?;
    let keepends = keepends
        .or_else(|| args.positional.first().cloned())
        .is_some_and(|v| v.is_truthy());
    let s = text(receiver);
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        let mut end = i + c.len_utf8();
        if c == '\r' && chars.peek().is_some_and(|&(_, n)| n == '\n') {
            chars.next();
            end += 1;
        }
        lines.push(if keepends { &s[start..end] } else { &s[start..i] });
        start = end;
    }
    if start < s.len() {
        lines.push(&s[start..]);
    }
    Ok(str_list(lines))
}

fn join(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("join", 1, 1)?;
    let sep = text(receiver);
    let mut out = String::new();
    for (i, item) in iterate(&args.positional[0])?.enumerate() {
        let Value::Str(part) = &item else {
            return Err(RuntimeError::type_error(format!(
                "sequence item {}: expected str instance, {} found",
                i,
                item.type_name()
            )));
        };
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(part);
        check_len(out.len())?;
    }
    Ok(Value::from(out))
}

fn replace(receiver: &Value, mut args: Args) -> Result<Value, RuntimeError> {
    let count = args.take_keyword("count");
    args.finish("replace")?;
    args.check_positional("replace", 2, 3)?;
    let s = text(receiver);
    let old = str_arg("replace", &args.positional[0])?;
    let new = str_arg("replace", &args.positional[1])?;
    let count = match count.or_else(|| args.positional.get(2).cloned()) {
        Some(v) => index_arg(&v)?,
        None => -1,
    };
    let occurrences = if old.is_empty() {
        s.chars().count() + 1
    } else {
        s.matches(old).count()
    };
    let occurrences = if count >= 0 {
        occurrences.min(count as usize)
    } else {
        occurrences
    };
    check_len(s.len().saturating_add(occurrences.saturating_mul(new.len())))?;
    let out = if count >= 0 {
        s.replacen(old, new, count as usize)
    } else {
        s.replace(old, new)
    };
    Ok(Value::from(out))
}

fn partition_with(
    name: &str,
    receiver: &Value,
    args: Args,
    from_right: bool,
) -> Result<Value, RuntimeError> {
    args.check(name, 1, 1)?;
    let s = text(receiver);
    let sep = str_arg(name, &args.positional[0])?;
    if sep.is_empty() {
        return Err(RuntimeError::value_error("empty separator"));
    }
    let found = if from_right { s.rfind(sep) } else { s.find(sep) };
    let parts = match found {
        Some(i) => [&s[..i], sep, &s[i + sep.len()..]],
        None if from_right => ["", "", s],
        None => [s, "", ""],
    };
    Ok(Value::tuple(parts.map(Value::from).to_vec()))
}

fn partition(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    partition_with("partition", receiver, args, false)
}

fn rpartition(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    partition_with("rpartition", receiver, args, true)
}

fn removeprefix(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("removeprefix", 1, 1)?;
    let prefix = str_arg("removeprefix", &args.positional[0])?;
    let s = text(receiver);
    Ok(Value::from(s.strip_prefix(prefix).unwrap_or(s)))
}

fn removesuffix(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("removesuffix", 1, 1)?;
    let suffix = str_arg("removesuffix", &args.positional[0])?;
    let s = text(receiver);
    Ok(Value::from(s.strip_suffix(suffix).unwrap_or(s)))
}

fn encode(receiver: &Value, mut args: Args) -> Result<Value, RuntimeError> {
    let encoding = args.take_keyword("encoding");
    let errors = args.take_keyword("errors");
    args.finish("encode")?;
    args.check_positional("encode", 0, 2)?;
    let encoding = encoding.or_else(|| args.positional.first().cloned());
    let errors = errors.or_else(|| args.positional.get(1).cloned());
    let encoding = encoding
        .as_ref()
        .map(|e| str_arg("encode", e))
        .transpose()?
        .unwrap_or("utf-8");
    let errors = errors
        .as_ref()
        .map(|e| str_arg("encode", e))
        .transpose()?
        .unwrap_or("strict");
    encode_str(text(receiver), encoding, errors).map(Value::bytes)
}

// ============================================================================
// Searching
// ============================================================================

/// Resolves optional `start`/`end` character positions the way `str.find`
/// does. `None` means the window starts past the end of the string.
fn window(
    s: &str,
    start: Option<&Value>,
    end: Option<&Value>,
) -> Result<Option<(usize, usize)>, RuntimeError> {
    let len = s.chars().count() as i64;
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
    let start = start as usize;
    let end = (end.max(start as i64)) as usize;
    Ok(Some((byte_offset(s, start), byte_offset(s, end))))
}

fn byte_offset(s: &str, chars: usize) -> usize {
    if s.is_ascii() {
        return chars.min(s.len());
    }
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}

fn char_index(s: &str, byte: usize) -> usize {
    if s.is_ascii() { byte } else { s[..byte].chars().count() }
}

/// The substring argument plus optional `start` and `end`.
type SearchArgs<'a> = (&'a str, Option<&'a Value>, Option<&'a Value>);

fn search_args<'a>(name: &str, args: &'a Args) -> Result<SearchArgs<'a>, RuntimeError> {
    args.check(name, 1, 3)?;
    let needle = args.positional[0].as_str().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "must be str, not {}",
            args.positional[0].type_name()
        ))
    })?;
    Ok((needle, args.get(1), args.get(2)))
}

/// Character position of the first (or last) match, if any.
fn search(
    name: &str,
    receiver: &Value,
    args: &Args,
    from_right: bool,
) -> Result<Option<usize>, RuntimeError> {
    let (needle, start, end) = search_args(name, args)?;
    let s = text(receiver);
    let Some((lo, hi)) = window(s, start, end)? else {
        return Ok(None);
    };
    let hay = &s[lo..hi];
    let found = if from_right { hay.rfind(needle) } else { hay.find(needle) };
    Ok(found.map(|i| char_index(s, lo + i)))
}

fn to_int(position: Option<usize>) -> Value {
    position.map_or(Value::Int(-1), |p| Value::Int(p as i64))
}

fn find(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    search("find", receiver, &args, false).map(to_int)
}

fn rfind(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    search("rfind", receiver, &args, true).map(to_int)
}

fn index(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    search("index", receiver, &args, false)?
        .map(|p| Value::Int(p as i64))
        .ok_or_else(|| RuntimeError::value_error("substring not found"))
}

fn rindex(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    search("rindex", receiver, &args, true)?
        .map(|p| Value::Int(p as i64))
        .ok_or_else(|| RuntimeError::value_error("substring not found"))
}

fn count(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    let (needle, start, end) = search_args("count", &args)?;
    let s = text(receiver);
    let Some((lo, hi)) = window(s, start, end)? else {
        return Ok(Value::Int(0));
    };
    let hay = &s[lo..hi];
    let n = if needle.is_empty() {
        hay.chars().count() + 1
    } else {
        hay.matches(needle).count()
    };
    Ok(Value::Int(n as i64))
}

/// `startswith`/`endswith`: a str or a tuple of str, with optional bounds.
fn affix(name: &str, receiver: &Value, args: Args, at_end: bool) -> Result<Value, RuntimeError> {
    args.check(name, 1, 3)?;
    let s = text(receiver);
    let Some((lo, hi)) = window(s, args.get(1), args.get(2))? else {
        return Ok(Value::Bool(false));
    };
    let hay = &s[lo..hi];
    let test = |affix: &str| {
        if at_end { hay.ends_with(affix) } else { hay.starts_with(affix) }
    };
    let bad = |v: &Value| {
        RuntimeError::type_error(format!(
            "{} first arg must be str or a tuple of str, not {}",
            name,
            v.type_name()
        ))
    };
    match &args.positional[0] {
        Value::Str(affix) => Ok(Value::Bool(test(affix))),
        Value::Tuple(options) => {
            for option in options.iter() {
                let affix = option.as_str().ok_or_else(|| bad(option))?;
                if test(affix) {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        other => Err(bad(other)),
    }
}

fn startswith(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    affix("startswith", receiver, args, false)
}

fn endswith(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    affix("endswith", receiver, args, true)
}

// ============================================================================
// Classification
// ============================================================================

fn all_chars(
    name: &str,
    receiver: &Value,
    args: Args,
    pred: fn(char) -> bool,
) -> Result<Value, RuntimeError> {
    args.check(name, 0, 0)?;
    let s = text(receiver);
    Ok(Value::Bool(!s.is_empty() && s.chars().all(pred)))
}

fn isdigit(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    all_chars("isdigit", receiver, args, |c| {
        c.is_ascii_digit() || (c.is_numeric() && !is_fraction(c))
    })
}

/// Vulgar fractions and similar are numeric but not digits.
fn is_fraction(c: char) -> bool {
    matches!(c, '\u{bc}'..='\u{be}' | '\u{2150}'..='\u{218b}')
}

fn isnumeric(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    all_chars("isnumeric", receiver, args, char::is_numeric)
}

fn isalpha(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    all_chars("isalpha", receiver, args, char::is_alphabetic)
}

fn isalnum(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    all_chars("isalnum", receiver, args, char::is_alphanumeric)
}

fn isspace(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    all_chars("isspace", receiver, args, is_space)
}

fn isupper(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("isupper", 0, 0)?;
    let s = text(receiver);
    Ok(Value::Bool(
        s.chars().any(is_cased) && !s.chars().any(char::is_lowercase),
    ))
}

fn islower(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("islower", 0, 0)?;
    let s = text(receiver);
    Ok(Value::Bool(
        s.chars().any(is_cased) && !s.chars().any(char::is_uppercase),
    ))
}

fn istitle(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("istitle", 0, 0)?;
    let mut prev_cased = false;
    let mut any_cased = false;
    for c in text(receiver).chars() {
        if c.is_uppercase() {
            if prev_cased {
                return Ok(Value::Bool(false));
            }
            prev_cased = true;
            any_cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return Ok(Value::Bool(false));
            }
            prev_cased = true;
            any_cased = true;
        } else {
            prev_cased = false;
        }
    }
    Ok(Value::Bool(any_cased))
}

fn isascii(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("isascii", 0, 0)?;
    Ok(Value::Bool(text(receiver).is_ascii()))
}

fn isidentifier(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("isidentifier", 0, 0)?;
    let mut chars = text(receiver).chars();
    let ok = chars.next().is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric());
    Ok(Value::Bool(ok))
}

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;
