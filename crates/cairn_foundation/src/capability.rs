//! Cross-cutting container capabilities.
//!
//! Tuples, tables, sets and strings are unrelated variants that share two
//! behaviours: positional reading ([`Iterable`]) and growth ([`Appendable`]).
//! Keyed lookup is deliberately not a capability; the `at`/`find` operations
//! apply their own failure policy per container.

use crate::error::ErrorCode;
use crate::value::Value;

/// Positional read access.
pub trait Iterable {
    /// Number of elements.
    fn size(&self) -> usize;

    /// Element at `index`, or `None` when out of bounds.
    ///
    /// Tables yield `(key, value)` 2-tuples; strings yield characters.
    fn at(&self, index: usize) -> Option<Value>;
}

/// In-place growth by one value.
pub trait Appendable {
    /// Appends `value`, handing it back inside [`Rejected`] when the container
    /// cannot hold it.
    ///
    /// # Errors
    /// Returns [`Rejected`] with the untouched value when it has the wrong shape.
    fn append(&mut self, value: Value) -> Result<(), Rejected>;

    /// A fresh zero-length container of the same variant.
    #[must_use]
    fn new_empty_of_same_type(&self) -> Self
    where
        Self: Sized;
}

/// A value refused by [`Appendable::append`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejected {
    /// The value that was not appended.
    pub value: Value,
    /// Why it was refused.
    pub code: ErrorCode,
}

impl Rejected {
    /// Creates a rejection.
    #[must_use]
    pub fn new(value: Value, code: ErrorCode) -> Self {
        Self { value, code }
    }
}

impl Iterable for String {
    fn size(&self) -> usize {
        self.chars().count()
    }

    fn at(&self, index: usize) -> Option<Value> {
        self.chars().nth(index).map(|c| Value::Character(u32::from(c)))
    }
}

impl Appendable for String {
    fn append(&mut self, value: Value) -> Result<(), Rejected> {
        match &value {
            Value::String(s) => {
                self.push_str(s);
                Ok(())
            }
            Value::Character(code) => match char::from_u32(*code) {
                Some(c) => {
                    self.push(c);
                    Ok(())
                }
                None => Err(Rejected::new(value, ErrorCode::TypeMismatch)),
            },
            _ => Err(Rejected::new(value, ErrorCode::TypeMismatch)),
        }
    }

    fn new_empty_of_same_type(&self) -> Self {
        String::new()
    }
}
