//! The `collections` library: `Counter`.
//!
//! A `Counter` is a [`Dict`] flagged as a counter. Missing keys read as `0`
//! (see the item guard) and it reprs as `Counter({...})`, most common first.

use std::rc::Rc;

use crate::{
    evaluator::{RuntimeError, operators::int_overflow},
    stdlib::index_arg,
    values::{Args, Dict, TypeKind, Value, iterate},
};

pub(super) fn member(name: &str) -> Option<Value> {
    match name {
        "Counter" => Some(Value::Type(TypeKind::Counter)),
        _ => None,
    }
}

/// `Counter(iterable_or_mapping, **counts)`.
pub(crate) fn make_counter(args: Args) -> Result<Value, RuntimeError> {
    args.check_positional("Counter", 0, 1)?;
    let mut counter = Dict::counter();
    match args.get(0) {
        None | Some(Value::None) => {}
        Some(Value::Dict(mapping)) => {
            for (key, count) in mapping.iter() {
                counter.insert(key.clone(), count.clone())?;
            }
        }
        Some(iterable) => {
            for item in iterate(iterable)? {
                add_count(&mut counter, item, 1)?;
            }
        }
    }
    for (key, count) in args.keywords {
        counter.insert(Value::from(key), count)?;
    }
    Ok(Value::Dict(Rc::new(counter)))
}

fn add_count(counter: &mut Dict, key: Value, n: i64) -> Result<(), RuntimeError> {
    let current = counter.get(&key)?.and_then(Value::as_int).unwrap_or(0);
    let updated = current.checked_add(n).ok_or_else(int_overflow)?;
    counter.insert(key, Value::Int(updated))
}

/// Entries ordered by count, highest first. Ties keep insertion order.
pub fn most_common(counter: &Dict) -> Vec<(Value, Value)> {
    let mut entries: Vec<(Value, Value)> = counter
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    // Counts are normally ints; anything else sorts as if it were zero.
    let count = |v: &Value| v.as_float().unwrap_or(0.0);
    entries.sort_by(|a, b| count(&b.1).total_cmp(&count(&a.1)));
    entries
}

/// `Counter.most_common(n=None)`.
pub(crate) fn most_common_method(receiver: &Value, mut args: Args) -> Result<Value, RuntimeError> {
    let n = args.take_keyword("n");
    args.finish("most_common")?;
    args.check_positional("most_common", 0, 1)?;
    let Value::Dict(counter) = receiver else {
        return Ok(Value::list(Vec::new()));
    };
    let mut entries = most_common(counter);
    if let Some(n) = n.or_else(|| args.positional.first().cloned()) {
        if !n.is_none() {
            let n = index_arg(&n)?.max(0) as usize;
            entries.truncate(n);
        }
    }
    Ok(Value::list(
        entries
            .into_iter()
            .map(|(k, v)| Value::tuple(vec![k, v]))
            .collect::<Vec<_>>(),
    ))
}

/// `Counter.elements()`: each key repeated by its (positive) count.
pub(crate) fn elements(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("elements", 0, 0)?;
    let Value::Dict(counter) = receiver else {
        return Ok(Value::list(Vec::new()));
    };
    let mut total = 0usize;
    let mut items = Vec::new();
    for (key, count) in counter.iter() {
        let n = count.as_int().unwrap_or(0).max(0) as usize;
        total = total.saturating_add(n);
        crate::values::check_len(total)?;
        items.extend(std::iter::repeat_n(key.clone(), n));
    }
    Ok(Value::Iterator(Rc::new(crate::values::OneShot::new(
        "itertools.chain",
        items,
    ))))
}

/// `Counter.total()`.
pub(crate) fn total(receiver: &Value, args: Args) -> Result<Value, RuntimeError> {
    args.check("total", 0, 0)?;
    let Value::Dict(counter) = receiver else {
        return Ok(Value::Int(0));
    };
    let mut acc = Value::Int(0);
    for count in counter.values() {
        acc = crate::evaluator::operators::binary(crate::parser::BinaryOp::Add, &acc, count)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn counter_of(items: &str) -> Value {
        make_counter(Args::new(vec![Value::from(items)])).unwrap()
    }

    #[test]
    fn test_counts_iterable() {
        let counter = counter_of("abracadabra");
        let dict = counter.as_dict().unwrap();
        assert_eq!(dict.get(&Value::from("a")).unwrap().unwrap().as_int(), Some(5));
        assert_eq!(dict.get(&Value::from("z")).unwrap(), None);
        assert_eq!(counter.type_name(), "Counter");
    }

    #[test]
    fn test_most_common_orders_by_count_then_insertion() {
        let counter = counter_of("abracadabra");
        let result = most_common_method(&counter, Args::new(vec![Value::Int(3)])).unwrap();
        assert_eq!(result.repr(), "[('a', 5), ('b', 2), ('r', 2)]");
    }

    #[test]
    fn test_repr() {
        assert_eq!(counter_of("aab").repr(), "Counter({'a': 2, 'b': 1})");
        assert_eq!(
            make_counter(Args::default()).unwrap().repr(),
            "Counter()"
        );
    }

    #[test]
    fn test_total_and_elements() {
        let counter = counter_of("aab");
        assert_eq!(total(&counter, Args::default()).unwrap(), Value::Int(3));
        let items = crate::values::collect(&elements(&counter, Args::default()).unwrap()).unwrap();
        assert_eq!(Value::list(items).repr(), "['a', 'a', 'b']");
    }

    #[test]
    fn test_keyword_counts() {
        let counter = make_counter(Args::with_keywords(
            vec![],
            vec![("x".to_string(), Value::Int(4))],
        ))
        .unwrap();
        assert_eq!(counter.repr(), "Counter({'x': 4})");
    }
}
