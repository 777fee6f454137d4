//! Core value type for all Cairn data.

use std::fmt;

use crate::capability::{Appendable, Iterable, Rejected};
use crate::collections::{Set, Table, Tuple};
use crate::error::ErrorCode;
use crate::operation::{Block, Operation, PartialBind};
use crate::types::ValueType;

/// Core value type for all Cairn data.
///
/// Values are immutable from the program's point of view: every operation that
/// "changes" a container works on a clone, and the persistent collections make
/// those clones cheap.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// The unit value.
    Empty,
    /// Unsigned 64-bit integer.
    Number(u64),
    /// Boolean.
    Boolean(bool),
    /// A 32-bit code point. Not every code point is a valid `char`.
    Character(u32),
    /// A string of code points.
    String(String),
    /// A textual tag compared by value.
    Atom(String),
    /// An in-program error.
    Error(ErrorCode),
    /// A type tag.
    Type(ValueType),
    /// An ordered sequence.
    Tuple(Tuple),
    /// A key/value map.
    Table(Table),
    /// A collection of distinct values.
    Set(Set),
    /// Executable code, including blocks and partial binds.
    Operation(Box<Operation>),
}

impl Value {
    /// Wraps an operation as a value.
    #[must_use]
    pub fn operation(op: impl Into<Operation>) -> Self {
        Self::Operation(Box::new(op.into()))
    }

    /// Builds a block value.
    #[must_use]
    pub fn block(slots: Vec<String>, operations: Vec<Operation>) -> Self {
        Self::operation(Block::with_slots(slots, operations))
    }

    /// Builds a partial bind value.
    #[must_use]
    pub fn bind(value: Value, callable: Operation) -> Self {
        Self::operation(PartialBind::new(value, callable))
    }

    /// Creates an atom.
    #[must_use]
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(name.into())
    }

    /// Returns the type of this value.
    ///
    /// Operations report the most specific of `Block`, `Bind` and `Operation`.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Empty => ValueType::Empty,
            Self::Number(_) => ValueType::Number,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Character(_) => ValueType::Character,
            Self::String(_) => ValueType::String,
            Self::Atom(_) => ValueType::Atom,
            Self::Error(_) => ValueType::Error,
            Self::Type(_) => ValueType::Type,
            Self::Tuple(_) => ValueType::Tuple,
            Self::Table(_) => ValueType::Table,
            Self::Set(_) => ValueType::Set,
            Self::Operation(op) => match op.as_ref() {
                Operation::Block(_) => ValueType::Block,
                Operation::PartialBind(_) => ValueType::Bind,
                _ => ValueType::Operation,
            },
        }
    }

    /// Returns true if this is the empty value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns true if this is an error value.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the number if this is one.
    #[must_use]
    pub const fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text of a string or atom.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Atom(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the tuple if this is one.
    #[must_use]
    pub const fn as_tuple(&self) -> Option<&Tuple> {
        match self {
            Self::Tuple(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the table if this is one.
    #[must_use]
    pub const fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the error code if this is an error value.
    #[must_use]
    pub const fn as_error(&self) -> Option<ErrorCode> {
        match self {
            Self::Error(code) => Some(*code),
            _ => None,
        }
    }

    /// Returns the executable operation if this value is callable.
    #[must_use]
    pub fn as_callable(&self) -> Option<&Operation> {
        match self {
            Self::Operation(op) => Some(op),
            _ => None,
        }
    }

    /// Returns true if this value can be executed.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.as_callable().is_some()
    }

    /// Returns positional read access for tuples, tables, sets and strings.
    #[must_use]
    pub fn as_iterable(&self) -> Option<&dyn Iterable> {
        match self {
            Self::Tuple(t) => Some(t),
            Self::Table(t) => Some(t),
            Self::Set(s) => Some(s),
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Appends `value` in place.
    ///
    /// # Errors
    /// Returns [`Rejected`] with the untouched value when this variant is not
    /// appendable or the value has the wrong shape.
    pub fn append(&mut self, value: Value) -> Result<(), Rejected> {
        match self {
            Self::Tuple(t) => t.append(value),
            Self::Table(t) => t.append(value),
            Self::Set(s) => s.append(value),
            Self::String(s) => s.append(value),
            _ => Err(Rejected::new(value, ErrorCode::TypeMismatch)),
        }
    }

    /// Returns a fresh zero-length container of the same variant.
    #[must_use]
    pub fn new_empty_of_same_type(&self) -> Option<Value> {
        match self {
            Self::Tuple(t) => Some(Self::Tuple(t.new_empty_of_same_type())),
            Self::Table(t) => Some(Self::Table(t.new_empty_of_same_type())),
            Self::Set(s) => Some(Self::Set(s.new_empty_of_same_type())),
            Self::String(s) => Some(Self::String(s.new_empty_of_same_type())),
            _ => None,
        }
    }

    /// Human-readable rendering, as used by Boolean to String casts.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Character(code) => match char::from_u32(*code) {
                Some(c) => write!(f, "{c:?}"),
                None => write!(f, "\\u{code:04X}"),
            },
            Self::String(s) => write!(f, "{s:?}"),
            Self::Atom(name) => write!(f, "{name}"),
            Self::Error(code) => write!(f, "error({code})"),
            Self::Type(t) => write!(f, "type({t})"),
            Self::Tuple(t) => {
                write!(f, "(")?;
                for (i, v) in t.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Self::Table(t) => {
                write!(f, "[")?;
                for (i, (k, v)) in t.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k} -> {v}")?;
                }
                write!(f, "]")
            }
            Self::Set(s) => {
                write!(f, "set[")?;
                for (i, v) in s.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Self::Operation(op) => write!(f, "{op}"),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Self::Character(u32::from(c))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<ErrorCode> for Value {
    fn from(code: ErrorCode) -> Self {
        Self::Error(code)
    }
}

impl From<ValueType> for Value {
    fn from(t: ValueType) -> Self {
        Self::Type(t)
    }
}

impl From<Tuple> for Value {
    fn from(t: Tuple) -> Self {
        Self::Tuple(t)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Self::Table(t)
    }
}

impl From<Set> for Value {
    fn from(s: Set) -> Self {
        Self::Set(s)
    }
}

impl From<Operation> for Value {
    fn from(op: Operation) -> Self {
        Self::Operation(Box::new(op))
    }
}
