//! Block-local slot tables.
//!
//! Every block activation pushes one table and pops it on exit, so a block
//! that re-enters itself gets an independent set of bindings per level.

use std::collections::HashMap;

use cairn_foundation::Value;

/// Stack of slot tables, innermost last.
#[derive(Clone, Debug, Default)]
pub struct SlotStack {
    frames: Vec<HashMap<String, Value>>,
}

impl SlotStack {
    /// Creates an empty slot stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live activations.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Enters a new activation with the given bindings.
    pub fn push_frame(&mut self, bindings: impl IntoIterator<Item = (String, Value)>) {
        self.frames.push(bindings.into_iter().collect());
    }

    /// Leaves the innermost activation.
    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Reads a slot of the innermost activation.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.last()?.get(name)
    }

    /// Writes a slot of the innermost activation.
    ///
    /// Returns false when no activation is live.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> bool {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.insert(name.into(), value);
                true
            }
            None => false,
        }
    }
}
