//! The global value store.
//!
//! Names map to values with insert-if-absent semantics by default. Entries are
//! kept sorted by name so that serialized images are reproducible.

use std::collections::BTreeMap;

use cairn_foundation::{Encode, Serializer, Value};

/// Global name to value table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValueStore {
    values: BTreeMap<String, Value>,
}

impl ValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Looks up a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Binds `name` unless it is already bound.
    ///
    /// Returns false, leaving the existing binding, on collision.
    pub fn define(&mut self, name: impl Into<String>, value: Value) -> bool {
        match self.values.entry(name.into()) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Binds `name`, replacing and returning any previous value.
    pub fn redefine(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    /// Removes a binding.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Iterates bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Writes every binding as identifier + value.
    pub fn serialize_into(&self, out: &mut Serializer) {
        for (name, value) in &self.values {
            out.write_identifier(name);
            value.encode(out);
        }
    }
}
