//! Container payloads for tuple, table and set values.
//!
//! All three are thin wrappers around the `im` crate's persistent structures so
//! that cloning a value out of the value store is O(1). Tables and sets keep an
//! insertion-ordered entry list next to their hash index: iteration, `at` and
//! serialization follow insertion order while equality and hashing ignore it.

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::iter::FromIterator;

use crate::capability::{Appendable, Iterable, Rejected};
use crate::error::ErrorCode;
use crate::value::Value;

/// Hashes one item in isolation so that unordered containers can combine
/// member hashes commutatively.
fn isolated_hash<T: Hash + ?Sized>(item: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    item.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// Tuple
// =============================================================================

/// Ordered, append-only sequence of values.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Tuple(im::Vector<Value>);

impl Tuple {
    /// Creates an empty tuple.
    #[must_use]
    pub fn new() -> Self {
        Self(im::Vector::new())
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the tuple has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets an element by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Direct indexing: out-of-bounds reads yield `Value::Empty`.
    #[must_use]
    pub fn element(&self, index: usize) -> Value {
        self.get(index).cloned().unwrap_or(Value::Empty)
    }

    /// Appends an element.
    pub fn push(&mut self, value: Value) {
        self.0.push_back(value);
    }

    /// Returns an iterator over the elements.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Value> {
        self.0.iter()
    }

    /// Returns the elements as a pair if this is a 2-tuple.
    #[must_use]
    pub fn as_pair(&self) -> Option<(&Value, &Value)> {
        match (self.len(), self.get(0), self.get(1)) {
            (2, Some(first), Some(second)) => Some((first, second)),
            _ => None,
        }
    }

    /// Builds a 2-tuple.
    #[must_use]
    pub fn pair(first: Value, second: Value) -> Self {
        [first, second].into_iter().collect()
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(im::Vector::from_iter(iter))
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        values.into_iter().collect()
    }
}

impl IntoIterator for Tuple {
    type Item = Value;
    type IntoIter = im::vector::ConsumingIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Value;
    type IntoIter = im::vector::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Iterable for Tuple {
    fn size(&self) -> usize {
        self.len()
    }

    fn at(&self, index: usize) -> Option<Value> {
        self.get(index).cloned()
    }
}

impl Appendable for Tuple {
    fn append(&mut self, value: Value) -> Result<(), Rejected> {
        self.push(value);
        Ok(())
    }

    fn new_empty_of_same_type(&self) -> Self {
        Self::new()
    }
}

// =============================================================================
// Table
// =============================================================================

/// Map from value to value where the first insertion of a key wins.
#[derive(Clone, Default)]
pub struct Table {
    entries: im::Vector<(Value, Value)>,
    index: im::HashMap<Value, usize>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets a value by key.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        let position = *self.index.get(key)?;
        self.entries.get(position).map(|(_, value)| value)
    }

    /// Returns true if the table contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts a pair unless the key is already present.
    ///
    /// Returns `false` (leaving the existing entry untouched) on a duplicate key.
    pub fn insert(&mut self, key: Value, value: Value) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push_back((key, value));
        true
    }

    /// Returns the entry at an insertion-order position.
    #[must_use]
    pub fn entry_at(&self, position: usize) -> Option<(&Value, &Value)> {
        self.entries.get(position).map(|(k, v)| (k, v))
    }

    /// Returns an iterator over key/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for Table {}

impl Hash for Table {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        let combined = self
            .iter()
            .fold(0u64, |acc, entry| acc.wrapping_add(isolated_hash(&entry)));
        combined.hash(state);
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(Value, Value)> for Table {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}

impl Iterable for Table {
    fn size(&self) -> usize {
        self.len()
    }

    fn at(&self, index: usize) -> Option<Value> {
        self.entry_at(index)
            .map(|(k, v)| Value::Tuple(Tuple::pair(k.clone(), v.clone())))
    }
}

impl Appendable for Table {
    fn append(&mut self, value: Value) -> Result<(), Rejected> {
        let pair = match &value {
            Value::Tuple(tuple) => tuple.as_pair().map(|(k, v)| (k.clone(), v.clone())),
            _ => None,
        };
        match pair {
            Some((key, item)) => {
                self.insert(key, item);
                Ok(())
            }
            None => Err(Rejected::new(value, ErrorCode::TypeMismatch)),
        }
    }

    fn new_empty_of_same_type(&self) -> Self {
        Self::new()
    }
}

// =============================================================================
// Set
// =============================================================================

/// Unordered collection of distinct values where the first insertion wins.
#[derive(Clone, Default)]
pub struct Set {
    items: im::Vector<Value>,
    index: im::HashSet<Value>,
}

impl Set {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if the set contains the value.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.index.contains(value)
    }

    /// Inserts a value, returning `false` if it was already present.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.index.contains(&value) {
            return false;
        }
        self.index.insert(value.clone());
        self.items.push_back(value);
        true
    }

    /// Returns the element at an insertion-order position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.items.get(position)
    }

    /// Returns an iterator over the elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl Eq for Set {}

impl Hash for Set {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        let combined = self
            .iter()
            .fold(0u64, |acc, item| acc.wrapping_add(isolated_hash(item)));
        combined.hash(state);
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Value> for Set {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl Iterable for Set {
    fn size(&self) -> usize {
        self.len()
    }

    fn at(&self, index: usize) -> Option<Value> {
        self.get(index).cloned()
    }
}

impl Appendable for Set {
    fn append(&mut self, value: Value) -> Result<(), Rejected> {
        self.insert(value);
        Ok(())
    }

    fn new_empty_of_same_type(&self) -> Self {
        Self::new()
    }
}
