//! The data stack.

use cairn_foundation::{ErrorCode, Value};

use crate::exec::Fault;

/// LIFO of values shared by every operation of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    values: Vec<Value>,
}

impl Stack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty stack with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the stack holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Pushes a value on top.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Removes and returns the top value.
    pub fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    /// Returns the top value.
    #[must_use]
    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    /// Drops everything above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.values.truncate(depth);
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Removes the top `count` values, returning them deepest first.
    ///
    /// Returns `None` and leaves the stack untouched when it is too shallow.
    pub fn take_top(&mut self, count: usize) -> Option<Vec<Value>> {
        let split = self.values.len().checked_sub(count)?;
        Some(self.values.split_off(split))
    }

    /// Pops `N` values, top first.
    ///
    /// # Errors
    /// Fails with `INSUFFICIENT_ARGUMENTS`, leaving the stack untouched, when
    /// fewer than `N` values are present.
    pub(crate) fn pop_operands<const N: usize>(&mut self) -> Result<[Value; N], Fault> {
        if self.values.len() < N {
            return Err(Fault::bare(ErrorCode::InsufficientArguments));
        }
        Ok(std::array::from_fn(|_| self.values.pop().unwrap_or(Value::Empty)))
    }

    /// Values from bottom to top.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Iterates from bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Value> {
        self.values.iter()
    }

    /// Consumes the stack, returning values bottom to top.
    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}
