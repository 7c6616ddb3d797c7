//! Runtime access guards.
//!
//! Every attribute access, subscript and `for` clause of an expression goes
//! through an [`AccessGuard`]. The evaluator never touches a value's fields
//! directly, so the guard is the single place that decides what an
//! expression can reach.

use tracing::{trace, warn};

use crate::{
    evaluator::{RuntimeError, operators::int_overflow},
    policy::Policy,
    stdlib::{self, methods},
    values::{RangeValue, SliceValue, Value, ValueIter, iterate},
};

pub trait AccessGuard {
    /// `object.name`
    fn getattr(&self, object: &Value, name: &str) -> Result<Value, RuntimeError>;

    /// `object[key]`
    fn getitem(&self, object: &Value, key: &Value) -> Result<Value, RuntimeError>;

    /// `for _ in object`
    fn getiter(&self, object: &Value) -> Result<ValueIter, RuntimeError>;
}

/// The guard enforcing a [`Policy`].
#[derive(Debug, Clone, Copy)]
pub struct PolicyGuard<'p> {
    policy: &'p Policy,
}

impl<'p> PolicyGuard<'p> {
    pub fn new(policy: &'p Policy) -> Self {
        Self { policy }
    }
}

impl AccessGuard for PolicyGuard<'_> {
    fn getattr(&self, object: &Value, name: &str) -> Result<Value, RuntimeError> {
        trace!(attr = name, owner = %object.type_name(), "getattr");
        if !self.policy.is_legal_attribute(name) {
            warn!(attr = name, "blocked private attribute access");
            return Err(RuntimeError::InvalidAttributeName {
                name: name.to_string(),
            });
        }
        let found = match object {
            Value::Module(library) => {
                if self.policy.is_member_allowed(library, name) {
                    stdlib::library_member(library, name)
                } else {
                    None
                }
            }
            Value::Object(obj) => obj.get_attr(name),
            Value::Type(kind) => methods::unbound(kind, name),
            other => methods::attribute(other, name),
        };
        found.ok_or_else(|| RuntimeError::MissingAttribute {
            owner: attribute_owner(object),
            attr: name.to_string(),
        })
    }

    fn getitem(&self, object: &Value, key: &Value) -> Result<Value, RuntimeError> {
        trace!(owner = %object.type_name(), "getitem");
        match (object, key) {
            (Value::Dict(dict), _) => match dict.get(key)? {
                Some(value) => Ok(value.clone()),
                // Missing counts are zero.
                None if dict.is_counter() => Ok(Value::Int(0)),
                None => Err(RuntimeError::KeyError { key: key.repr() }),
            },
            (Value::List(items), Value::Slice(slice)) => {
                Ok(Value::List(select(items, slice)?.into()))
            }
            (Value::Tuple(items), Value::Slice(slice)) => {
                Ok(Value::Tuple(select(items, slice)?.into()))
            }
            (Value::List(items) | Value::Tuple(items), _) => {
                let i = sequence_index(object, key, items.len())?;
                Ok(items[i].clone())
            }
            (Value::Str(s), Value::Slice(slice)) => {
                let chars: Vec<char> = s.chars().collect();
                Ok(Value::from(select(&chars, slice)?.into_iter().collect::<String>()))
            }
            (Value::Str(s), _) => {
                let len = s.chars().count();
                let i = sequence_index(object, key, len)?;
                Ok(s.chars().nth(i).map(|c| Value::from(c.to_string())).unwrap_or(Value::None))
            }
            (Value::Bytes(b), Value::Slice(slice)) => Ok(Value::bytes(select(b, slice)?)),
            (Value::Bytes(b), _) => {
                let i = sequence_index(object, key, b.len())?;
                Ok(Value::Int(b[i] as i64))
            }
            (Value::Range(range), Value::Slice(slice)) => slice_range(range, slice),
            (Value::Range(range), _) => {
                let i = sequence_index(object, key, range.len())?;
                Ok(Value::Int(range.nth(i)))
            }
            (Value::Object(obj), _) => obj.get_item(key),
            (Value::Type(kind), _) => Err(RuntimeError::type_error(format!(
                "type '{}' is not subscriptable",
                kind.name()
            ))),
            _ => Err(RuntimeError::type_error(format!(
                "'{}' object is not subscriptable",
                object.type_name()
            ))),
        }
    }

    fn getiter(&self, object: &Value) -> Result<ValueIter, RuntimeError> {
        trace!(owner = %object.type_name(), "getiter");
        iterate(object)
    }
}

/// How a missing attribute's owner reads in the error message.
fn attribute_owner(object: &Value) -> String {
    match object {
        Value::Module(name) => format!("module '{}'", name),
        Value::Type(kind) => format!("type object '{}'", kind.name()),
        other => format!("'{}' object", other.type_name()),
    }
}

/// Resolves `key` to a position in a sequence of `len` elements.
fn sequence_index(object: &Value, key: &Value, len: usize) -> Result<usize, RuntimeError> {
    let noun = match object {
        Value::Str(_) => "string",
        Value::Bytes(_) => "byte",
        other => return index_in(other, key, len, &other.type_name()),
    };
    index_in(object, key, len, noun)
}

fn index_in(object: &Value, key: &Value, len: usize, noun: &str) -> Result<usize, RuntimeError> {
    let index = match key {
        Value::Int(i) => *i,
        Value::Bool(b) => *b as i64,
        _ => {
            let message = match object {
                Value::Str(_) => format!(
                    "string indices must be integers, not '{}'",
                    key.type_name()
                ),
                _ => format!(
                    "{} indices must be integers or slices, not {}",
                    noun,
                    key.type_name()
                ),
            };
            return Err(RuntimeError::type_error(message));
        }
    };
    let len = len as i128;
    let resolved = if index < 0 { index as i128 + len } else { index as i128 };
    if (0..len).contains(&resolved) {
        return Ok(resolved as usize);
    }
    let what = match object {
        Value::Bytes(_) => "index".to_string(),
        Value::Range(_) => "range object index".to_string(),
        _ => format!("{} index", noun),
    };
    Err(RuntimeError::index_error(format!("{} out of range", what)))
}

fn select<T: Clone>(items: &[T], slice: &SliceValue) -> Result<Vec<T>, RuntimeError> {
    Ok(slice
        .positions(items.len())?
        .into_iter()
        .map(|i| items[i].clone())
        .collect())
}

/// `range(...)[a:b:c]` is again a range.
fn slice_range(range: &RangeValue, slice: &SliceValue) -> Result<Value, RuntimeError> {
    let (start, stop, step) = slice.indices(range.len())?;
    let at = |i: i128| range.start as i128 + i * range.step as i128;
    let fit = |v: i128| i64::try_from(v).map_err(|_| int_overflow());
    Ok(Value::Range(RangeValue {
        start: fit(at(start))?,
        stop: fit(at(stop))?,
        step: fit(range.step as i128 * step as i128)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Namespace;
    use pretty_assertions::assert_eq;

    fn with_guard<R>(f: impl FnOnce(&PolicyGuard<'_>) -> R) -> R {
        let policy = Policy::standard();
        let guard = PolicyGuard::new(&policy);
        f(&guard)
    }

    fn ints(items: &[i64]) -> Value {
        Value::list(items.iter().map(|&i| Value::Int(i)).collect::<Vec<_>>())
    }

    fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Value {
        Value::Slice(SliceValue { start, stop, step })
    }

    #[test]
    fn test_private_attributes_blocked() {
        with_guard(|guard| {
            let resp = Value::object(Namespace::new("Response").with("_secret", 1));
            let err = guard.getattr(&resp, "_secret").unwrap_err();
            assert_eq!(
                err.to_string(),
                " \"_secret\" is an invalid attribute name because it starts with \"_\"."
            );
            let err = guard.getattr(&Value::Int(1), "__class__").unwrap_err();
            assert!(matches!(err, RuntimeError::InvalidAttributeName { .. }));
        });
    }

    #[test]
    fn test_host_attributes() {
        with_guard(|guard| {
            let resp = Value::object(Namespace::new("Response").with("url", "http://x"));
            assert_eq!(guard.getattr(&resp, "url").unwrap(), Value::from("http://x"));
            let err = guard.getattr(&resp, "missing").unwrap_err();
            assert_eq!(err.to_string(), "'Response' object has no attribute 'missing'");
        });
    }

    #[test]
    fn test_module_members_follow_policy() {
        with_guard(|guard| {
            let pi = guard.getattr(&Value::Module("math"), "pi").unwrap();
            assert_eq!(pi, Value::Float(std::f64::consts::PI));
            let err = guard.getattr(&Value::Module("math"), "system").unwrap_err();
            assert_eq!(err.to_string(), "module 'math' has no attribute 'system'");
        });

        let narrow = Policy::builder()
            .standard_builtins()
            .allow_library("math", &["sqrt"])
            .build()
            .unwrap();
        let guard = PolicyGuard::new(&narrow);
        assert!(guard.getattr(&Value::Module("math"), "sqrt").is_ok());
        assert!(guard.getattr(&Value::Module("math"), "pi").is_err());
    }

    #[test]
    fn test_builtin_methods_and_types() {
        with_guard(|guard| {
            let upper = guard.getattr(&Value::from("ab"), "upper").unwrap();
            assert_eq!(upper.repr(), "<built-in method upper of str object>");
            let err = guard.getattr(&Value::Type(crate::values::TypeKind::Int), "x").unwrap_err();
            assert_eq!(err.to_string(), "type object 'int' has no attribute 'x'");
        });
    }

    #[test]
    fn test_sequence_items() {
        with_guard(|guard| {
            let list = ints(&[10, 20, 30]);
            assert_eq!(guard.getitem(&list, &Value::Int(-1)).unwrap(), Value::Int(30));
            assert_eq!(guard.getitem(&list, &Value::Bool(true)).unwrap(), Value::Int(20));
            let err = guard.getitem(&list, &Value::Int(3)).unwrap_err();
            assert_eq!(err.to_string(), "list index out of range");
            let err = guard.getitem(&list, &Value::from("a")).unwrap_err();
            assert_eq!(err.to_string(), "list indices must be integers or slices, not str");
            assert_eq!(
                guard.getitem(&list, &slice(None, None, Some(-1))).unwrap(),
                ints(&[30, 20, 10])
            );

            let text = Value::from("héllo");
            assert_eq!(guard.getitem(&text, &Value::Int(1)).unwrap(), Value::from("é"));
            assert_eq!(
                guard.getitem(&text, &slice(Some(1), Some(3), None)).unwrap(),
                Value::from("él")
            );
            let err = guard.getitem(&text, &Value::Int(9)).unwrap_err();
            assert_eq!(err.to_string(), "string index out of range");

            let bytes = Value::bytes(b"ab".to_vec());
            assert_eq!(guard.getitem(&bytes, &Value::Int(0)).unwrap(), Value::Int(97));
        });
    }

    #[test]
    fn test_range_items() {
        with_guard(|guard| {
            let range = Value::range(0, 10, 2);
            assert_eq!(guard.getitem(&range, &Value::Int(-1)).unwrap(), Value::Int(8));
            assert_eq!(
                guard.getitem(&range, &slice(Some(1), None, Some(2))).unwrap(),
                Value::range(2, 10, 4)
            );
            let err = guard.getitem(&range, &Value::Int(5)).unwrap_err();
            assert_eq!(err.to_string(), "range object index out of range");
        });
    }

    #[test]
    fn test_ranges_longer_than_i64_max() {
        with_guard(|guard| {
            let range = Value::range(i64::MIN, i64::MAX, 1);
            assert_eq!(
                guard.getitem(&range, &Value::Int(5)).unwrap(),
                Value::Int(i64::MIN + 5)
            );
            assert_eq!(
                guard.getitem(&range, &Value::Int(-1)).unwrap(),
                Value::Int(i64::MAX - 1)
            );
            assert_eq!(
                guard.getitem(&range, &slice(Some(-3), None, None)).unwrap(),
                Value::range(i64::MAX - 3, i64::MAX, 1)
            );
        });
    }

    #[test]
    fn test_dict_items() {
        with_guard(|guard| {
            let dict = Value::dict(vec![(Value::from("a"), Value::Int(1))]).unwrap();
            assert_eq!(guard.getitem(&dict, &Value::from("a")).unwrap(), Value::Int(1));
            let err = guard.getitem(&dict, &Value::from("name")).unwrap_err();
            assert_eq!(err, RuntimeError::KeyError { key: "'name'".to_string() });
            let err = guard.getitem(&dict, &ints(&[])).unwrap_err();
            assert_eq!(err.to_string(), "unhashable type: 'list'");

            let counter = crate::stdlib::collections::make_counter(crate::values::Args::new(
                vec![Value::from("aab")],
            ))
            .unwrap();
            assert_eq!(guard.getitem(&counter, &Value::from("z")).unwrap(), Value::Int(0));
        });
    }

    #[test]
    fn test_not_subscriptable() {
        with_guard(|guard| {
            let err = guard.getitem(&Value::Int(1), &Value::Int(0)).unwrap_err();
            assert_eq!(err.to_string(), "'int' object is not subscriptable");
            let err = guard.getitem(&Value::None, &Value::Int(0)).unwrap_err();
            assert_eq!(err.to_string(), "'NoneType' object is not subscriptable");
        });
    }

    #[test]
    fn test_getiter() {
        with_guard(|guard| {
            let items: Vec<Value> = guard.getiter(&Value::from("ab")).unwrap().collect();
            assert_eq!(items, vec![Value::from("a"), Value::from("b")]);
            let err = guard.getiter(&Value::Int(3)).err().unwrap();
            assert_eq!(err.to_string(), "'int' object is not iterable");
        });
    }
}
