//! The `itertools` library.
//!
//! Every function evaluates eagerly into a one-shot iterator. Output sizes are
//! checked against the collection limit before anything is generated, so
//! `product(range(1000), repeat=10)` fails fast instead of allocating.

use std::rc::Rc;

use crate::{
    evaluator::{RuntimeError, operators},
    parser::BinaryOp,
    stdlib::{BuiltinFn, call, index_arg, native},
    values::{Args, MAX_COLLECTION_LEN, OneShot, Value, check_len, collect, iterate},
};

pub(super) fn member(name: &str) -> Option<Value> {
    let (name, func): (&'static str, BuiltinFn) = match name {
        "chain" => ("chain", chain),
        "product" => ("product", product),
        "permutations" => ("permutations", permutations),
        "combinations" => ("combinations", combinations),
        "islice" => ("islice", islice),
        "accumulate" => ("accumulate", accumulate),
        "zip_longest" => ("zip_longest", zip_longest),
        _ => return None,
    };
    Some(native(name, func))
}

fn one_shot(type_name: &'static str, items: Vec<Value>) -> Value {
    Value::Iterator(Rc::new(OneShot::new(type_name, items)))
}

/// Fails unless `count` (possibly astronomically large) fits the limit.
fn check_count(count: Option<usize>) -> Result<usize, RuntimeError> {
    let count = count.unwrap_or(usize::MAX);
    check_len(count)?;
    Ok(count)
}

fn chain(args: Args) -> Result<Value, RuntimeError> {
    args.no_keywords("chain")?;
    let mut items = Vec::new();
    for iterable in &args.positional {
        for item in iterate(iterable)? {
            items.push(item);
            if items.len() > MAX_COLLECTION_LEN {
                check_len(items.len())?;
            }
        }
    }
    Ok(one_shot("itertools.chain", items))
}

/// `product(*iterables, repeat=1)`
fn product(mut args: Args) -> Result<Value, RuntimeError> {
    let repeat = args.take_keyword("repeat");
    args.finish("product")?;
    let repeat = match repeat {
        Some(r) => index_arg(&r)?,
        None => 1,
    };
    if repeat < 0 {
        return Err(RuntimeError::value_error("repeat argument cannot be negative"));
    }
    let mut pools = Vec::new();
    for iterable in &args.positional {
        pools.push(collect(iterable)?);
    }
    let pools: Vec<&Vec<Value>> = (0..repeat).flat_map(|_| pools.iter()).collect();
    let count = pools
        .iter()
        .try_fold(1usize, |acc, pool| acc.checked_mul(pool.len()));
    let count = check_count(count)?;
    let mut rows = Vec::with_capacity(count);
    if count == 0 {
        return Ok(one_shot("itertools.product", rows));
    }
    // Odometer over the pool indices, rightmost fastest.
    let mut index = vec![0usize; pools.len()];
    loop {
        rows.push(Value::tuple(
            index
                .iter()
                .zip(&pools)
                .map(|(&i, pool)| pool[i].clone())
                .collect::<Vec<_>>(),
        ));
        let mut pos = pools.len();
        loop {
            if pos == 0 {
                return Ok(one_shot("itertools.product", rows));
            }
            pos -= 1;
            index[pos] += 1;
            if index[pos] < pools[pos].len() {
                break;
            }
            index[pos] = 0;
        }
    }
}

fn optional_r(value: Option<&Value>, default: usize) -> Result<usize, RuntimeError> {
    match value {
        None | Some(Value::None) => Ok(default),
        Some(v) => {
            let r = index_arg(v)?;
            if r < 0 {
                return Err(RuntimeError::value_error("r must be non-negative"));
            }
            Ok(r as usize)
        }
    }
}

/// `permutations(iterable, r=None)`
fn permutations(mut args: Args) -> Result<Value, RuntimeError> {
    let r = args.take_keyword("r");
    args.finish("permutations")?;
    args.check_positional("permutations", 1, 2)?;
    let pool = collect(&args.positional[0])?;
    let n = pool.len();
    let r = optional_r(r.as_ref().or(args.positional.get(1)), n)?;
    if r > n {
        return Ok(one_shot("itertools.permutations", Vec::new()));
    }
    let count = (n - r + 1..=n).try_fold(1usize, |acc, k| acc.checked_mul(k));
    check_count(count)?;

    let mut rows = Vec::new();
    let mut used = vec![false; n];
    let mut current = Vec::with_capacity(r);
    permute(&pool, r, &mut used, &mut current, &mut rows);
    Ok(one_shot("itertools.permutations", rows))
}

fn permute(
    pool: &[Value],
    r: usize,
    used: &mut [bool],
    current: &mut Vec<Value>,
    rows: &mut Vec<Value>,
) {
    if current.len() == r {
        rows.push(Value::tuple(current.clone()));
        return;
    }
    for i in 0..pool.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        current.push(pool[i].clone());
        permute(pool, r, used, current, rows);
        current.pop();
        used[i] = false;
    }
}

/// `combinations(iterable, r)`
fn combinations(mut args: Args) -> Result<Value, RuntimeError> {
    let r = args.take_keyword("r");
    args.finish("combinations")?;
    let r = r.or_else(|| args.positional.get(1).cloned());
    args.check_positional("combinations", 1, 2)?;
    let Some(r) = r else {
        return Err(RuntimeError::type_error(
            "combinations() missing required argument 'r' (pos 2)",
        ));
    };
    let pool = collect(&args.positional[0])?;
    let n = pool.len();
    let r = optional_r(Some(&r), 0)?;
    if r > n {
        return Ok(one_shot("itertools.combinations", Vec::new()));
    }
    // C(n, r) computed incrementally; each partial product is itself a
    // binomial coefficient, so the division is exact.
    let count = (0..r).try_fold(1usize, |acc, i| {
        acc.checked_mul(n - i).map(|x| x / (i + 1))
    });
    check_count(count)?;

    let mut rows = Vec::new();
    let mut index: Vec<usize> = (0..r).collect();
    loop {
        rows.push(Value::tuple(
            index.iter().map(|&i| pool[i].clone()).collect::<Vec<_>>(),
        ));
        // Rightmost index that can still advance.
        let Some(pos) = (0..r).rev().find(|&i| index[i] != i + n - r) else {
            return Ok(one_shot("itertools.combinations", rows));
        };
        index[pos] += 1;
        for j in pos + 1..r {
            index[j] = index[j - 1] + 1;
        }
    }
}

/// `islice(iterable, stop)` or `islice(iterable, start, stop[, step])`.
fn islice(args: Args) -> Result<Value, RuntimeError> {
    args.check("islice", 2, 4)?;
    let bound = |v: &Value, what: &str| -> Result<Option<usize>, RuntimeError> {
        match v {
            Value::None => Ok(None),
            Value::Int(_) | Value::Bool(_) => match v.as_int() {
                Some(i) if i >= 0 => Ok(Some(i as usize)),
                _ => Err(RuntimeError::value_error(format!(
                    "{} for islice() must be None or an integer: 0 <= x <= sys.maxsize.",
                    what
                ))),
            },
            _ => Err(RuntimeError::value_error(format!(
                "{} for islice() must be None or an integer: 0 <= x <= sys.maxsize.",
                what
            ))),
        }
    };
    let rest = &args.positional[1..];
    let (start, stop, step) = match rest {
        [stop] => (0, bound(stop, "Stop argument")?, 1),
        [start, stop] => (
            bound(start, "Indices")?.unwrap_or(0),
            bound(stop, "Stop argument")?,
            1,
        ),
        [start, stop, step] => (
            bound(start, "Indices")?.unwrap_or(0),
            bound(stop, "Stop argument")?,
            bound(step, "Step")?.unwrap_or(1),
        ),
        _ => (0, None, 1),
    };
    if step == 0 {
        return Err(RuntimeError::value_error(
            "Step for islice() must be a positive integer or None.",
        ));
    }
    let mut items = Vec::new();
    let mut iter = iterate(&args.positional[0])?.enumerate();
    loop {
        let Some((i, item)) = iter.next() else { break };
        if stop.is_some_and(|stop| i >= stop) {
            break;
        }
        if i >= start && (i - start) % step == 0 {
            items.push(item);
            if items.len() > MAX_COLLECTION_LEN {
                check_len(items.len())?;
            }
        }
    }
    Ok(one_shot("itertools.islice", items))
}

/// `accumulate(iterable, func=None, *, initial=None)`
fn accumulate(mut args: Args) -> Result<Value, RuntimeError> {
    let func = args.take_keyword("func");
    let initial = args.take_keyword("initial");
    args.finish("accumulate")?;
    args.check_positional("accumulate", 1, 2)?;
    let func = func
        .or_else(|| args.positional.get(1).cloned())
        .filter(|f| !f.is_none());
    let mut items = Vec::new();
    let mut acc = initial.filter(|v| !v.is_none());
    if let Some(first) = &acc {
        items.push(first.clone());
    }
    for item in iterate(&args.positional[0])? {
        let next = match (acc.take(), &func) {
            (None, _) => item,
            (Some(prev), None) => operators::binary(BinaryOp::Add, &prev, &item)?,
            (Some(prev), Some(f)) => call(f, Args::new(vec![prev, item]))?,
        };
        items.push(next.clone());
        acc = Some(next);
        if items.len() > MAX_COLLECTION_LEN {
            check_len(items.len())?;
        }
    }
    Ok(one_shot("itertools.accumulate", items))
}

/// `zip_longest(*iterables, fillvalue=None)`
fn zip_longest(mut args: Args) -> Result<Value, RuntimeError> {
    let fill = args.take_keyword("fillvalue").unwrap_or(Value::None);
    args.finish("zip_longest")?;
    let mut iters = args
        .positional
        .iter()
        .map(iterate)
        .collect::<Result<Vec<_>, _>>()?;
    let mut rows = Vec::new();
    if iters.is_empty() {
        return Ok(one_shot("itertools.zip_longest", rows));
    }
    loop {
        let mut live = false;
        let row: Vec<Value> = iters
            .iter_mut()
            .map(|it| match it.next() {
                Some(v) => {
                    live = true;
                    v
                }
                None => fill.clone(),
            })
            .collect();
        if !live {
            return Ok(one_shot("itertools.zip_longest", rows));
        }
        rows.push(Value::tuple(row));
        if rows.len() > MAX_COLLECTION_LEN {
            check_len(rows.len())?;
        }
    }
}

#[cfg(test)]
#[path = "itertools_test.rs"]
mod itertools_test;
