//! Type tags for values and operations.
//!
//! [`ValueType`] is both the reflection target of `typeof`/`typecast` and the
//! source of the single-byte wire markers. [`OperationType`] carries the stable
//! numeric tag written before every encoded operation together with the
//! keyword used by the textual grammar.

use std::fmt;

/// Type tag of a [`crate::Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ValueType {
    /// The empty value.
    Empty = 1,
    /// Unsigned 64-bit integer.
    Number = 2,
    /// Boolean.
    Boolean = 3,
    /// 32-bit code point.
    Character = 4,
    /// Sequence of code points.
    String = 5,
    /// Textual tag compared by value.
    Atom = 6,
    /// In-program error code.
    Error = 7,
    /// A type tag as a value.
    Type = 8,
    /// Ordered sequence.
    Tuple = 9,
    /// Key/value map.
    Table = 10,
    /// Unordered collection of distinct values.
    Set = 11,
    /// Any executable operation.
    Operation = 12,
    /// An operation block.
    Block = 13,
    /// A partial application.
    Bind = 14,
}

impl ValueType {
    /// Every value type, in code order.
    pub const ALL: [ValueType; 14] = [
        Self::Empty,
        Self::Number,
        Self::Boolean,
        Self::Character,
        Self::String,
        Self::Atom,
        Self::Error,
        Self::Type,
        Self::Tuple,
        Self::Table,
        Self::Set,
        Self::Operation,
        Self::Block,
        Self::Bind,
    ];

    /// Returns the byte used when a type is itself serialized as a value.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a type code byte.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Returns the wire marker that introduces a value of this type.
    ///
    /// Blocks and binds are encoded as operations and have no marker of
    /// their own.
    #[must_use]
    pub const fn marker(self) -> Option<u8> {
        match self {
            Self::Empty => Some(b'E'),
            Self::Number => Some(b'#'),
            Self::Boolean => Some(b'?'),
            Self::Character => Some(b'c'),
            Self::String => Some(b'$'),
            Self::Atom => Some(b'\''),
            Self::Error => Some(b'@'),
            Self::Type => Some(b'T'),
            Self::Tuple => Some(b'('),
            Self::Table => Some(b'['),
            Self::Set => Some(b'U'),
            Self::Operation => Some(b'O'),
            Self::Block | Self::Bind => None,
        }
    }

    /// Finds the type introduced by a wire marker.
    #[must_use]
    pub fn from_marker(marker: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.marker() == Some(marker))
    }

    /// Returns the grammar keyword for this type.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Character => "character",
            Self::String => "string",
            Self::Atom => "atom",
            Self::Error => "error",
            Self::Type => "type",
            Self::Tuple => "tuple",
            Self::Table => "table",
            Self::Set => "set",
            Self::Operation => "operation",
            Self::Block => "block",
            Self::Bind => "bind",
        }
    }

    /// Finds the type named by a grammar keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.keyword() == keyword)
    }

    /// Returns true for the executable kinds.
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Operation | Self::Block | Self::Bind)
    }

    /// Returns true for kinds that support `size`/`at`.
    #[must_use]
    pub const fn is_iterable(self) -> bool {
        matches!(self, Self::Tuple | Self::Table | Self::Set | Self::String)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Declares [`OperationType`] with its numeric tag and keyword tables.
macro_rules! operation_types {
    ($($(#[$meta:meta])* $name:ident = $tag:literal => $keyword:literal,)*) => {
        /// Stable tag of an [`crate::Operation`] variant.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum OperationType {
            $($(#[$meta])* $name,)*
        }

        impl OperationType {
            /// Every operation type.
            pub const ALL: &'static [OperationType] = &[$(Self::$name,)*];

            /// Returns the numeric tag written before the encoded payload.
            #[must_use]
            pub const fn tag(self) -> u32 {
                match self {
                    $(Self::$name => $tag,)*
                }
            }

            /// Returns the grammar keyword.
            #[must_use]
            pub const fn keyword(self) -> &'static str {
                match self {
                    $(Self::$name => $keyword,)*
                }
            }
        }
    };
}

operation_types! {
    /// `nop`
    Nop = 1 => "nop",
    /// `push <value>`
    Push = 2 => "push",
    /// `pop`
    Pop = 3 => "pop",
    /// `dup`
    Dup = 4 => "dup",
    /// `swap`
    Swap = 5 => "swap",
    /// `resetstack`
    ResetStack = 6 => "resetstack",
    /// `add`
    Add = 10 => "add",
    /// `sub`
    Sub = 11 => "sub",
    /// `mul`
    Mul = 12 => "mul",
    /// `div`
    Div = 13 => "div",
    /// `mod`
    Mod = 14 => "mod",
    /// `and`
    And = 20 => "and",
    /// `or`
    Or = 21 => "or",
    /// `xor`
    Xor = 22 => "xor",
    /// `not`
    Not = 23 => "not",
    /// `eq`
    Eq = 24 => "eq",
    /// `iftrue <op>`
    IfTrue = 30 => "iftrue",
    /// `loop`
    Loop = 31 => "loop",
    /// `break`
    Break = 32 => "break",
    /// `halt`
    Halt = 33 => "halt",
    /// `select <table> [else <op>]`
    Select = 34 => "select",
    /// `load <id>`
    Load = 40 => "load",
    /// `store <id>`
    Store = 41 => "store",
    /// `clear <id>`
    Clear = 42 => "clear",
    /// `loadslot <id>`
    LoadSlot = 43 => "loadslot",
    /// `storeslot <id>`
    StoreSlot = 44 => "storeslot",
    /// `call <id> (args)`
    Call = 50 => "call",
    /// `exec`
    Exec = 51 => "exec",
    /// `bind`
    Bind = 52 => "bind",
    /// `map`
    Map = 53 => "map",
    /// `filter`
    Filter = 54 => "filter",
    /// `reduce`
    Reduce = 55 => "reduce",
    /// `typeof`
    TypeOf = 60 => "typeof",
    /// `typecast`
    TypeCast = 61 => "typecast",
    /// `pack`
    Pack = 70 => "pack",
    /// `unpack`
    Unpack = 71 => "unpack",
    /// `at`
    At = 72 => "at",
    /// `find`
    Find = 73 => "find",
    /// `append`
    Append = 74 => "append",
    /// `size`
    Size = 75 => "size",
    /// `parse`
    Parse = 80 => "parse",
    /// `loadnative "<path>"`
    LoadNative = 90 => "loadnative",
    /// `native <bucket> <name>`
    Native = 91 => "native",
    /// `block [slots a, b] { ... }`
    Block = 100 => "block",
    /// `partial <value> <callable>`
    PartialBind = 101 => "partial",
}

impl OperationType {
    /// Finds the operation type with the given numeric tag.
    #[must_use]
    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.tag() == tag)
    }

    /// Finds the operation type named by a grammar keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.keyword() == keyword)
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
