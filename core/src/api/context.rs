//! Caller-supplied bindings for one evaluation.

use hashbrown::HashMap;
use tracing::warn;

use super::Error;
use crate::{policy::Policy, values::Value};

/// Names an expression may read, mapped to their values.
///
/// A context is borrowed for a single evaluation and never retained.
///
/// ```
/// use sandeval_core::api::Context;
///
/// let context = Context::new().with("a", 3).with("name", "jon");
/// assert_eq!(context.len(), 2);
/// assert_eq!(context.get("a"), Some(&3.into()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    bindings: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, returning the value it replaces.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.bindings.insert(name.into(), value.into())
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn bindings(&self) -> &HashMap<String, Value> {
        &self.bindings
    }

    /// Rejects bindings that would shadow or impersonate something the policy
    /// controls.
    pub(crate) fn check(&self, policy: &Policy) -> Result<(), Error> {
        // Sorted so the reported key does not depend on hash order.
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        for name in names {
            let reason = if policy.is_reserved(name) {
                "it is reserved for the access guards"
            } else if policy.forbidden_call(name).is_some() {
                "it names a forbidden call"
            } else if policy.claims_name(name) {
                "it shadows a name provided by the policy"
            } else if !policy.is_legal_variable(name) {
                "it starts with \"_\""
            } else {
                continue;
            };
            warn!(name, reason, "rejected context key");
            return Err(Error::invalid_context(format!(
                "context key \"{name}\" is not allowed because {reason}."
            )));
        }
        Ok(())
    }
}

impl From<HashMap<String, Value>> for Context {
    fn from(bindings: HashMap<String, Value>) -> Self {
        Self { bindings }
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            bindings: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Context
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}
