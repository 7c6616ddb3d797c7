//! Conversion from `serde_json` values, for response bodies and fixtures.

use std::rc::Rc;

use crate::values::{
    collections::Dict,
    equality::hash_str,
    value::Value,
};

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                let mut dict = Dict::new();
                for (key, value) in map {
                    // String keys always hash; the size limit is far above
                    // anything serde_json will have parsed.
                    let _ = dict.insert_hashed(hash_str(&key), Value::from(key), Value::from(value));
                }
                Value::Dict(Rc::new(dict))
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from(json.clone())
    }
}
