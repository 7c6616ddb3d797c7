//! The policy deciding which names, attributes and calls an expression may use.
//!
//! A [`Policy`] is immutable once built. Every compiled expression keeps an
//! `Arc<Policy>` and every guard borrows it; there is no way to widen a policy
//! after construction. The process-wide standard policy is built lazily on
//! first use.
//!
//! ```ignore
//! use sandeval_core::policy::Policy;
//!
//! // Standard policy without any library modules.
//! let narrow = Policy::builder()
//!     .standard_builtins()
//!     .build()
//!     .unwrap();
//! assert!(!narrow.is_library_allowed("math"));
//! ```

mod error;
mod standard;

pub use error::PolicyError;

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use lazy_static::lazy_static;
use tracing::debug;

use crate::stdlib;

/// Names the guards would have been bound to. They are never resolvable and
/// may not be supplied through a context.
pub const RESERVED_NAMES: [&str; 3] = ["_getattr_", "_getitem_", "_getiter_"];

lazy_static! {
    static ref STANDARD_POLICY: Arc<Policy> = Arc::new(
        // The standard lists are checked by the policy tests; failing here
        // would mean the crate itself is inconsistent.
        PolicyBuilder::standard()
            .build()
            .unwrap_or_else(|err| panic!("standard policy is inconsistent: {err}"))
    );
}

#[derive(Debug, Clone)]
pub struct Policy {
    allowed_builtins: HashSet<&'static str>,
    allowed_libraries: HashMap<&'static str, HashSet<&'static str>>,
    forbidden_calls: HashMap<&'static str, &'static str>,
}

impl Policy {
    /// The shared standard policy.
    pub fn standard() -> Arc<Policy> {
        STANDARD_POLICY.clone()
    }

    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    pub fn is_builtin_allowed(&self, name: &str) -> bool {
        self.allowed_builtins.contains(name)
    }

    pub fn is_library_allowed(&self, name: &str) -> bool {
        self.allowed_libraries.contains_key(name)
    }

    pub fn is_member_allowed(&self, library: &str, member: &str) -> bool {
        self.allowed_libraries
            .get(library)
            .is_some_and(|members| members.contains(member))
    }

    pub fn builtins(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.allowed_builtins.iter().copied()
    }

    pub fn libraries(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.allowed_libraries.keys().copied()
    }

    pub fn library_members(&self, library: &str) -> impl Iterator<Item = &'static str> + '_ {
        self.allowed_libraries
            .get(library)
            .into_iter()
            .flat_map(|members| members.iter().copied())
    }

    /// The capability label if calling `name` is forbidden.
    pub fn forbidden_call(&self, name: &str) -> Option<&'static str> {
        self.forbidden_calls.get(name).copied()
    }

    /// Attribute names starting with `_` are never legal.
    pub fn is_legal_attribute(&self, name: &str) -> bool {
        !name.starts_with('_')
    }

    /// Variable names follow the same underscore rule as attributes.
    pub fn is_legal_variable(&self, name: &str) -> bool {
        !name.starts_with('_')
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        RESERVED_NAMES.contains(&name)
    }

    /// Whether `name` is claimed by the policy itself (allowed, forbidden or
    /// reserved) and therefore cannot be bound by a caller.
    pub fn claims_name(&self, name: &str) -> bool {
        self.is_builtin_allowed(name)
            || self.is_library_allowed(name)
            || self.forbidden_calls.contains_key(name)
            || self.is_reserved(name)
    }
}

/// Builds a [`Policy`], checking it for consistency.
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    allowed_builtins: Vec<&'static str>,
    allowed_libraries: Vec<(&'static str, Vec<&'static str>)>,
    forbidden_calls: Vec<(&'static str, &'static str)>,
}

impl PolicyBuilder {
    /// The standard builtins, libraries and forbidden calls.
    pub fn standard() -> Self {
        Self::default().standard_builtins().standard_libraries()
    }

    /// Adds the standard builtins and forbidden calls.
    pub fn standard_builtins(mut self) -> Self {
        self.allowed_builtins.extend(standard::BUILTINS);
        self.forbidden_calls.extend(standard::FORBIDDEN_CALLS);
        self
    }

    /// Adds every standard library with all of its standard members.
    pub fn standard_libraries(mut self) -> Self {
        for &(library, members) in standard::LIBRARIES {
            self.allowed_libraries.push((library, members.to_vec()));
        }
        self
    }

    pub fn allow_builtin(mut self, name: &'static str) -> Self {
        self.allowed_builtins.push(name);
        self
    }

    pub fn deny_builtin(mut self, name: &str) -> Self {
        self.allowed_builtins.retain(|b| *b != name);
        self
    }

    pub fn allow_library(mut self, name: &'static str, members: &[&'static str]) -> Self {
        self.allowed_libraries.push((name, members.to_vec()));
        self
    }

    pub fn deny_library(mut self, name: &str) -> Self {
        self.allowed_libraries.retain(|(library, _)| *library != name);
        self
    }

    pub fn forbid_call(mut self, name: &'static str, capability: &'static str) -> Self {
        self.forbidden_calls.push((name, capability));
        self
    }

    /// Runs the consistency check and freezes the policy.
    pub fn build(self) -> Result<Policy, PolicyError> {
        let forbidden_calls: HashMap<_, _> = self.forbidden_calls.into_iter().collect();
        let allowed_builtins: HashSet<_> = self.allowed_builtins.into_iter().collect();

        for &name in &allowed_builtins {
            check_allowable(name, &forbidden_calls)?;
            if !stdlib::has_builtin(name) {
                return Err(PolicyError::UnknownBuiltin(name.to_string()));
            }
        }

        let mut allowed_libraries: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
        for (library, members) in self.allowed_libraries {
            check_allowable(library, &forbidden_calls)?;
            if allowed_builtins.contains(library) {
                return Err(PolicyError::LibraryShadowsBuiltin(library.to_string()));
            }
            if !stdlib::has_library(library) {
                return Err(PolicyError::UnknownLibrary(library.to_string()));
            }
            let entry = allowed_libraries.entry(library).or_default();
            for member in members {
                if member.starts_with('_') {
                    return Err(PolicyError::PrivateName(format!("{library}.{member}")));
                }
                if !stdlib::has_library_member(library, member) {
                    return Err(PolicyError::UnknownLibraryMember {
                        library: library.to_string(),
                        member: member.to_string(),
                    });
                }
                entry.insert(member);
            }
        }

        debug!(
            builtins = allowed_builtins.len(),
            libraries = allowed_libraries.len(),
            forbidden = forbidden_calls.len(),
            "Policy built"
        );

        Ok(Policy {
            allowed_builtins,
            allowed_libraries,
            forbidden_calls,
        })
    }
}

fn check_allowable(
    name: &'static str,
    forbidden_calls: &HashMap<&'static str, &'static str>,
) -> Result<(), PolicyError> {
    if forbidden_calls.contains_key(name) {
        return Err(PolicyError::ForbiddenNameAllowed(name.to_string()));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(PolicyError::ReservedNameAllowed(name.to_string()));
    }
    if name.starts_with('_') {
        return Err(PolicyError::PrivateName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_policy_is_consistent() {
        let policy = PolicyBuilder::standard().build().unwrap();
        assert!(policy.is_builtin_allowed("sorted"));
        assert!(policy.is_builtin_allowed("same_type"));
        assert!(policy.is_member_allowed("math", "sqrt"));
        assert!(policy.is_member_allowed("collections", "Counter"));
        assert!(!policy.is_member_allowed("math", "sqrtx"));
        assert_eq!(policy.forbidden_call("exec"), Some("Exec"));
        assert_eq!(policy.forbidden_call("eval"), Some("Eval"));
        assert_eq!(policy.forbidden_call("compile"), None);
    }

    #[test]
    fn test_dangerous_names_are_absent() {
        let policy = Policy::standard();
        for name in [
            "exec", "eval", "compile", "exit", "quit", "open", "getattr", "setattr", "globals",
            "vars", "__import__", "dict", "input", "print",
        ] {
            assert!(!policy.is_builtin_allowed(name), "{name} must not be allowed");
        }
    }

    #[test]
    fn test_underscore_rule() {
        let policy = Policy::standard();
        assert!(policy.is_legal_attribute("json"));
        assert!(!policy.is_legal_attribute("_private"));
        assert!(!policy.is_legal_attribute("__class__"));
        assert!(!policy.is_legal_variable("_"));
    }

    #[test]
    fn test_claims_name() {
        let policy = Policy::standard();
        assert!(policy.claims_name("len"));
        assert!(policy.claims_name("math"));
        assert!(policy.claims_name("exec"));
        assert!(policy.claims_name("_getattr_"));
        assert!(!policy.claims_name("resp"));
    }

    #[test]
    fn test_forbidden_name_cannot_be_allowed() {
        let err = PolicyBuilder::standard()
            .allow_builtin("exec")
            .build()
            .unwrap_err();
        assert_eq!(err, PolicyError::ForbiddenNameAllowed("exec".to_string()));
    }

    #[test]
    fn test_reserved_and_private_names_cannot_be_allowed() {
        assert_eq!(
            Policy::builder().allow_builtin("_getitem_").build().unwrap_err(),
            PolicyError::ReservedNameAllowed("_getitem_".to_string())
        );
        assert_eq!(
            Policy::builder().allow_builtin("_secret").build().unwrap_err(),
            PolicyError::PrivateName("_secret".to_string())
        );
        assert_eq!(
            Policy::builder()
                .allow_library("math", &["_private"])
                .build()
                .unwrap_err(),
            PolicyError::PrivateName("math._private".to_string())
        );
    }

    #[test]
    fn test_unimplemented_names_are_rejected() {
        assert_eq!(
            Policy::builder().allow_builtin("open").build().unwrap_err(),
            PolicyError::UnknownBuiltin("open".to_string())
        );
        assert_eq!(
            Policy::builder().allow_library("os", &["system"]).build().unwrap_err(),
            PolicyError::UnknownLibrary("os".to_string())
        );
        assert_eq!(
            Policy::builder()
                .allow_library("math", &["frexp"])
                .build()
                .unwrap_err(),
            PolicyError::UnknownLibraryMember {
                library: "math".to_string(),
                member: "frexp".to_string()
            }
        );
    }

    #[test]
    fn test_narrowed_policy() {
        let policy = PolicyBuilder::standard()
            .deny_library("itertools")
            .deny_builtin("sorted")
            .build()
            .unwrap();
        assert!(!policy.is_library_allowed("itertools"));
        assert!(!policy.is_builtin_allowed("sorted"));
        assert!(policy.is_builtin_allowed("len"));
        assert_eq!(policy.library_members("itertools").count(), 0);
    }

    #[test]
    fn test_builtins_only() {
        let policy = Policy::builder().standard_builtins().build().unwrap();
        assert_eq!(policy.libraries().count(), 0);
        assert_eq!(policy.forbidden_call("exec"), Some("Exec"));
    }
}
