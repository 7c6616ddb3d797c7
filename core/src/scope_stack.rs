//! Scope stack for variable bindings.
//!
//! The evaluator keeps the caller's context at the bottom of the stack and
//! pushes one scope per comprehension. Two kinds of scopes share the `Scope`
//! trait:
//! - **Complete scopes**: immutable, pre-populated (the evaluation context)
//! - **Incomplete scopes**: names declared up front, values bound as the
//!   comprehension's `for` clauses run
//!
//! A name declared in an incomplete scope shadows outer bindings even before
//! it has a value, which gives comprehensions Python's local scoping:
//! ```text
//! [x for y in [1] if x for x in [2]]   # x is local, read before bound
//! ```

use std::fmt;

use hashbrown::HashMap;

/// Result of looking a name up in a scope.
#[derive(Debug, PartialEq)]
pub enum Lookup<'s, T> {
    Bound(&'s T),
    /// Declared in this scope but not assigned yet.
    Unbound,
    NotFound,
}

/// Trait for scopes that can be pushed onto the ScopeStack.
pub trait Scope<T> {
    fn lookup(&self, name: &str) -> Lookup<'_, T>;

    /// Bind (or rebind) a declared name.
    ///
    /// Complete scopes return `BindError::ScopeIsImmutable`.
    fn bind(&mut self, name: &str, value: T) -> Result<(), BindError>;
}

/// A complete, immutable scope borrowing its bindings.
pub struct CompleteScope<'a, T>(&'a HashMap<String, T>);

impl<'a, T> CompleteScope<'a, T> {
    pub fn new(bindings: &'a HashMap<String, T>) -> Self {
        CompleteScope(bindings)
    }
}

impl<T> Scope<T> for CompleteScope<'_, T> {
    fn lookup(&self, name: &str) -> Lookup<'_, T> {
        match self.0.get(name) {
            Some(value) => Lookup::Bound(value),
            None => Lookup::NotFound,
        }
    }

    fn bind(&mut self, _name: &str, _value: T) -> Result<(), BindError> {
        Err(BindError::ScopeIsImmutable)
    }
}

/// An incomplete, mutable scope.
///
/// Names are declared and sorted at creation; values start unbound and are
/// filled in (and overwritten) as iteration proceeds.
pub struct IncompleteScope<T>(Vec<(String, Option<T>)>);

impl<T> IncompleteScope<T> {
    /// Declares `names`. A name may appear more than once, as in
    /// `for x in a for x in b`.
    pub fn new<'n>(names: impl IntoIterator<Item = &'n str>) -> Self {
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_unstable();
        names.dedup();
        Self(names.into_iter().map(|name| (name.to_string(), None)).collect())
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.0.binary_search_by(|(n, _)| n.as_str().cmp(name))
    }
}

impl<T> Scope<T> for IncompleteScope<T> {
    fn lookup(&self, name: &str) -> Lookup<'_, T> {
        match self.position(name) {
            Ok(idx) => match &self.0[idx].1 {
                Some(value) => Lookup::Bound(value),
                None => Lookup::Unbound,
            },
            Err(_) => Lookup::NotFound,
        }
    }

    fn bind(&mut self, name: &str, value: T) -> Result<(), BindError> {
        match self.position(name) {
            Ok(idx) => {
                self.0[idx].1 = Some(value);
                Ok(())
            }
            Err(_) => Err(BindError::NameNotDeclared(name.to_string())),
        }
    }
}

/// A stack of scopes, searched from innermost to outermost.
pub struct ScopeStack<'a, T> {
    scopes: Vec<Box<dyn Scope<T> + 'a>>,
}

impl<T> Default for ScopeStack<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> ScopeStack<'a, T> {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push<S: Scope<T> + 'a>(&mut self, scope: S) {
        self.scopes.push(Box::new(scope));
    }

    /// Pop the topmost scope from the stack.
    pub fn pop(&mut self) -> Result<(), PopError> {
        self.scopes.pop().ok_or(PopError::EmptyStack)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Look up a name, stopping at the innermost scope that declares it.
    pub fn lookup(&self, name: &str) -> Lookup<'_, T> {
        for scope in self.scopes.iter().rev() {
            match scope.lookup(name) {
                Lookup::NotFound => continue,
                found => return found,
            }
        }
        Lookup::NotFound
    }

    /// Bind a value in the topmost scope.
    pub fn bind_in_current(&mut self, name: &str, value: T) -> Result<(), BindError> {
        self.scopes
            .last_mut()
            .ok_or(BindError::NoScope)?
            .bind(name, value)
    }
}

/// Error when trying to bind a value in a scope.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    #[error("No scope to bind in")]
    NoScope,
    #[error("Cannot bind in immutable scope")]
    ScopeIsImmutable,
    #[error("Name '{0}' not declared in current scope")]
    NameNotDeclared(String),
}

/// Error when trying to pop a scope.
#[derive(Debug, Clone, PartialEq)]
pub enum PopError {
    EmptyStack,
}

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopError::EmptyStack => write!(f, "Cannot pop from empty scope stack"),
        }
    }
}

impl std::error::Error for PopError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bindings(pairs: &[(&str, i32)]) -> HashMap<String, i32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_complete_scope_lookup() {
        let globals = bindings(&[("a", 1), ("b", 2)]);
        let mut stack = ScopeStack::new();
        stack.push(CompleteScope::new(&globals));

        assert_eq!(stack.lookup("a"), Lookup::Bound(&1));
        assert_eq!(stack.lookup("b"), Lookup::Bound(&2));
        assert_eq!(stack.lookup("c"), Lookup::NotFound);
    }

    #[test]
    fn test_declared_name_shadows_before_binding() {
        let globals = bindings(&[("x", 1)]);
        let mut stack = ScopeStack::new();
        stack.push(CompleteScope::new(&globals));
        stack.push(IncompleteScope::new(["x", "y"]));

        assert_eq!(stack.lookup("x"), Lookup::Unbound);
        stack.bind_in_current("x", 10).unwrap();
        assert_eq!(stack.lookup("x"), Lookup::Bound(&10));
        assert_eq!(stack.lookup("y"), Lookup::Unbound);

        stack.pop().unwrap();
        assert_eq!(stack.lookup("x"), Lookup::Bound(&1));
    }

    #[test]
    fn test_rebinding_overwrites() {
        let mut stack = ScopeStack::new();
        stack.push(IncompleteScope::new(["i", "i"]));
        for i in 0..3 {
            stack.bind_in_current("i", i).unwrap();
        }
        assert_eq!(stack.lookup("i"), Lookup::Bound(&2));
    }

    #[test]
    fn test_bind_errors() {
        let globals = bindings(&[("a", 1)]);
        let mut stack = ScopeStack::new();
        assert_eq!(stack.bind_in_current("a", 1), Err(BindError::NoScope));

        stack.push(CompleteScope::new(&globals));
        assert_eq!(stack.bind_in_current("a", 10), Err(BindError::ScopeIsImmutable));

        stack.push(IncompleteScope::new(["a"]));
        assert_eq!(
            stack.bind_in_current("b", 1),
            Err(BindError::NameNotDeclared("b".to_string()))
        );
    }

    #[test]
    fn test_pop_empty() {
        let mut stack: ScopeStack<'_, i32> = ScopeStack::new();
        assert_eq!(stack.pop(), Err(PopError::EmptyStack));
        assert!(stack.is_empty());
    }
}
