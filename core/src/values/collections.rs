//! Insertion-ordered hash containers keyed by Python hash and equality.

use hashbrown::HashMap;

use crate::evaluator::RuntimeError;
use crate::values::{
    equality::{py_eq, py_hash},
    value::{Value, check_len},
};

/// Maps a hash to the positions of the entries carrying it.
#[derive(Debug, Clone, Default)]
struct HashIndex(HashMap<i64, Vec<usize>>);

impl HashIndex {
    fn find<'a, T>(
        &self,
        hash: i64,
        entries: &'a [T],
        key_of: impl Fn(&'a T) -> &'a Value,
        key: &Value,
    ) -> Option<usize> {
        self.0
            .get(&hash)?
            .iter()
            .copied()
            .find(|&pos| py_eq(key_of(&entries[pos]), key))
    }

    fn add(&mut self, hash: i64, pos: usize) {
        self.0.entry(hash).or_default().push(pos);
    }
}

#[derive(Clone, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
    index: HashIndex,
    counter: bool,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty `collections.Counter`.
    pub fn counter() -> Self {
        Self {
            counter: true,
            ..Self::default()
        }
    }

    pub fn is_counter(&self) -> bool {
        self.counter
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or replaces. A replaced entry keeps its original position and key.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<(), RuntimeError> {
        let hash = py_hash(&key)?;
        self.insert_hashed(hash, key, value)
    }

    pub(crate) fn insert_hashed(
        &mut self,
        hash: i64,
        key: Value,
        value: Value,
    ) -> Result<(), RuntimeError> {
        match self.index.find(hash, &self.entries, |(k, _)| k, &key) {
            Some(pos) => self.entries[pos].1 = value,
            None => {
                check_len(self.entries.len() + 1)?;
                self.index.add(hash, self.entries.len());
                self.entries.push((key, value));
            }
        }
        Ok(())
    }

    /// Looks up `key`. Unhashable keys fail with a `TypeError`.
    pub fn get(&self, key: &Value) -> Result<Option<&Value>, RuntimeError> {
        let hash = py_hash(key)?;
        Ok(self
            .index
            .find(hash, &self.entries, |(k, _)| k, key)
            .map(|pos| &self.entries[pos].1))
    }

    pub fn contains_key(&self, key: &Value) -> Result<bool, RuntimeError> {
        Ok(self.get(key)?.is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

#[derive(Clone, Default)]
pub struct ValueSet {
    items: Vec<Value>,
    index: HashIndex,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(items: impl IntoIterator<Item = Value>) -> Result<Self, RuntimeError> {
        let mut set = Self::new();
        for item in items {
            set.insert(item)?;
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns whether the item was newly added.
    pub fn insert(&mut self, item: Value) -> Result<bool, RuntimeError> {
        let hash = py_hash(&item)?;
        if self.index.find(hash, &self.items, |v| v, &item).is_some() {
            return Ok(false);
        }
        check_len(self.items.len() + 1)?;
        self.index.add(hash, self.items.len());
        self.items.push(item);
        Ok(true)
    }

    pub fn contains(&self, item: &Value) -> Result<bool, RuntimeError> {
        let hash = py_hash(item)?;
        Ok(self.index.find(hash, &self.items, |v| v, item).is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// The item at insertion position `index`.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn is_subset(&self, other: &ValueSet) -> Result<bool, RuntimeError> {
        if self.len() > other.len() {
            return Ok(false);
        }
        for item in &self.items {
            if !other.contains(item)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn union(&self, other: &ValueSet) -> Result<ValueSet, RuntimeError> {
        let mut out = self.clone();
        for item in &other.items {
            out.insert(item.clone())?;
        }
        Ok(out)
    }

    pub fn intersection(&self, other: &ValueSet) -> Result<ValueSet, RuntimeError> {
        let mut out = ValueSet::new();
        for item in &self.items {
            if other.contains(item)? {
                out.insert(item.clone())?;
            }
        }
        Ok(out)
    }

    pub fn difference(&self, other: &ValueSet) -> Result<ValueSet, RuntimeError> {
        let mut out = ValueSet::new();
        for item in &self.items {
            if !other.contains(item)? {
                out.insert(item.clone())?;
            }
        }
        Ok(out)
    }

    pub fn symmetric_difference(&self, other: &ValueSet) -> Result<ValueSet, RuntimeError> {
        let mut out = self.difference(other)?;
        for item in &other.items {
            if !self.contains(item)? {
                out.insert(item.clone())?;
            }
        }
        Ok(out)
    }

    pub fn is_disjoint(&self, other: &ValueSet) -> Result<bool, RuntimeError> {
        for item in &self.items {
            if other.contains(item)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
