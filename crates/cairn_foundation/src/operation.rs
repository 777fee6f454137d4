//! The instruction tree.
//!
//! An [`Operation`] is plain data: a closed enum whose composite variants own
//! their children. Execution lives in `cairn_machine`, which keeps all
//! per-activation state (slot tables) in the machine so that an operation tree
//! can be shared, cloned and compared freely.

use std::fmt;

use crate::collections::{Table, Tuple};
use crate::types::OperationType;
use crate::value::Value;

/// A single instruction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    // === Stack ===
    /// Does nothing.
    Nop,
    /// Pushes a copy of the carried value.
    Push(Value),
    /// Discards the top value.
    Pop,
    /// Duplicates the top value.
    Dup,
    /// Exchanges the two top values.
    Swap,
    /// Empties the data stack.
    ResetStack,

    // === Arithmetic (wrapping u64) ===
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`
    Div,
    /// `a % b`
    Mod,

    // === Logic ===
    /// Logical or bitwise and.
    And,
    /// Logical or bitwise or.
    Or,
    /// Logical or bitwise xor.
    Xor,
    /// Logical or bitwise not.
    Not,
    /// Structural equality of the two top values.
    Eq,

    // === Control flow ===
    /// Runs the inner operation when the popped Boolean is true.
    IfTrue(Box<Operation>),
    /// Restarts the enclosing block.
    Loop,
    /// Leaves the enclosing block successfully.
    Break,
    /// Stops the whole program.
    Halt,
    /// Dispatches on the popped value through a table of callables.
    Select {
        /// Key to callable.
        cases: Table,
        /// Runs on a miss; without it a miss is a `NOT_FOUND` error.
        otherwise: Option<Box<Operation>>,
    },

    // === Value store and slots ===
    /// Pushes a copy of a global value.
    Load(String),
    /// Binds the popped value to a new global name.
    Store(String),
    /// Removes a global binding.
    Clear(String),
    /// Pushes a copy of a slot of the innermost block activation.
    LoadSlot(String),
    /// Writes the popped value into a slot of the innermost activation.
    StoreSlot(String),

    // === Higher order ===
    /// Late-bound call of a global callable with literal arguments.
    Call {
        /// Name resolved in the value store at execution time.
        target: String,
        /// Arguments, pushed in reverse so the first ends on top.
        args: Tuple,
    },
    /// Executes the popped callable.
    Exec,
    /// Builds a partial bind from a value and a callable.
    Bind,
    /// Applies a callable to every element of a container.
    Map,
    /// Keeps the elements for which a callable answers true.
    Filter,
    /// Folds a tuple or table through a callable.
    Reduce,

    // === Types ===
    /// Replaces a value with its type.
    TypeOf,
    /// Converts a value to a target type.
    TypeCast,

    // === Containers ===
    /// Collects `n` values into a tuple.
    Pack,
    /// Spreads a tuple onto the stack.
    Unpack,
    /// Positional or keyed read.
    At,
    /// Search by value.
    Find,
    /// Grows a container by one value.
    Append,
    /// Number of elements of an iterable.
    Size,

    // === Metaprogramming and extension ===
    /// Parses the popped string as a value payload.
    Parse,
    /// Activates the native library provided under a path.
    LoadNative(String),
    /// Calls an operation exported by an activated native library.
    Native {
        /// Library bucket name.
        bucket: String,
        /// Operation name inside the bucket.
        name: String,
    },

    // === Composite callables ===
    /// A sequence of operations with its own local slots.
    Block(Block),
    /// A callable with one argument already supplied.
    PartialBind(PartialBind),
}

impl Operation {
    /// Returns the stable type tag of this operation.
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::Nop => OperationType::Nop,
            Self::Push(_) => OperationType::Push,
            Self::Pop => OperationType::Pop,
            Self::Dup => OperationType::Dup,
            Self::Swap => OperationType::Swap,
            Self::ResetStack => OperationType::ResetStack,
            Self::Add => OperationType::Add,
            Self::Sub => OperationType::Sub,
            Self::Mul => OperationType::Mul,
            Self::Div => OperationType::Div,
            Self::Mod => OperationType::Mod,
            Self::And => OperationType::And,
            Self::Or => OperationType::Or,
            Self::Xor => OperationType::Xor,
            Self::Not => OperationType::Not,
            Self::Eq => OperationType::Eq,
            Self::IfTrue(_) => OperationType::IfTrue,
            Self::Loop => OperationType::Loop,
            Self::Break => OperationType::Break,
            Self::Halt => OperationType::Halt,
            Self::Select { .. } => OperationType::Select,
            Self::Load(_) => OperationType::Load,
            Self::Store(_) => OperationType::Store,
            Self::Clear(_) => OperationType::Clear,
            Self::LoadSlot(_) => OperationType::LoadSlot,
            Self::StoreSlot(_) => OperationType::StoreSlot,
            Self::Call { .. } => OperationType::Call,
            Self::Exec => OperationType::Exec,
            Self::Bind => OperationType::Bind,
            Self::Map => OperationType::Map,
            Self::Filter => OperationType::Filter,
            Self::Reduce => OperationType::Reduce,
            Self::TypeOf => OperationType::TypeOf,
            Self::TypeCast => OperationType::TypeCast,
            Self::Pack => OperationType::Pack,
            Self::Unpack => OperationType::Unpack,
            Self::At => OperationType::At,
            Self::Find => OperationType::Find,
            Self::Append => OperationType::Append,
            Self::Size => OperationType::Size,
            Self::Parse => OperationType::Parse,
            Self::LoadNative(_) => OperationType::LoadNative,
            Self::Native { .. } => OperationType::Native,
            Self::Block(_) => OperationType::Block,
            Self::PartialBind(_) => OperationType::PartialBind,
        }
    }

    /// Builds the operation for a tag that carries no payload.
    ///
    /// Returns `None` for tags whose operations need arguments.
    #[must_use]
    pub fn nullary(op_type: OperationType) -> Option<Self> {
        let op = match op_type {
            OperationType::Nop => Self::Nop,
            OperationType::Pop => Self::Pop,
            OperationType::Dup => Self::Dup,
            OperationType::Swap => Self::Swap,
            OperationType::ResetStack => Self::ResetStack,
            OperationType::Add => Self::Add,
            OperationType::Sub => Self::Sub,
            OperationType::Mul => Self::Mul,
            OperationType::Div => Self::Div,
            OperationType::Mod => Self::Mod,
            OperationType::And => Self::And,
            OperationType::Or => Self::Or,
            OperationType::Xor => Self::Xor,
            OperationType::Not => Self::Not,
            OperationType::Eq => Self::Eq,
            OperationType::Loop => Self::Loop,
            OperationType::Break => Self::Break,
            OperationType::Halt => Self::Halt,
            OperationType::Exec => Self::Exec,
            OperationType::Bind => Self::Bind,
            OperationType::Map => Self::Map,
            OperationType::Filter => Self::Filter,
            OperationType::Reduce => Self::Reduce,
            OperationType::TypeOf => Self::TypeOf,
            OperationType::TypeCast => Self::TypeCast,
            OperationType::Pack => Self::Pack,
            OperationType::Unpack => Self::Unpack,
            OperationType::At => Self::At,
            OperationType::Find => Self::Find,
            OperationType::Append => Self::Append,
            OperationType::Size => Self::Size,
            OperationType::Parse => Self::Parse,
            OperationType::Push
            | OperationType::IfTrue
            | OperationType::Select
            | OperationType::Load
            | OperationType::Store
            | OperationType::Clear
            | OperationType::LoadSlot
            | OperationType::StoreSlot
            | OperationType::Call
            | OperationType::LoadNative
            | OperationType::Native
            | OperationType::Block
            | OperationType::PartialBind => return None,
        };
        Some(op)
    }

    /// Returns the block if this operation is one.
    #[must_use]
    pub const fn as_block(&self) -> Option<&Block> {
        match self {
            Self::Block(block) => Some(block),
            _ => None,
        }
    }
}

impl From<Block> for Operation {
    fn from(block: Block) -> Self {
        Self::Block(block)
    }
}

impl From<PartialBind> for Operation {
    fn from(bind: PartialBind) -> Self {
        Self::PartialBind(bind)
    }
}

/// An ordered list of operations with named local slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    slots: Vec<String>,
    operations: Vec<Operation>,
}

impl Block {
    /// Creates a block without slots.
    #[must_use]
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            slots: Vec::new(),
            operations,
        }
    }

    /// Creates a block that binds `slots` from the stack on entry.
    #[must_use]
    pub fn with_slots(slots: Vec<String>, operations: Vec<Operation>) -> Self {
        Self { slots, operations }
    }

    /// Declared slot names, in declaration order.
    #[must_use]
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Number of values consumed from the stack on entry.
    #[must_use]
    pub fn num_slot_values(&self) -> usize {
        self.slots.len()
    }

    /// The operation sequence.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true if the block has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Operation at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Operation> {
        self.operations.get(index)
    }
}

/// A callable with one argument already supplied.
///
/// Executing it pushes the bound value and then runs the callable; binds nest
/// to any depth.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PartialBind {
    value: Box<Value>,
    callable: Box<Operation>,
}

impl PartialBind {
    /// Binds `value` in front of `callable`.
    #[must_use]
    pub fn new(value: Value, callable: Operation) -> Self {
        Self {
            value: Box::new(value),
            callable: Box::new(callable),
        }
    }

    /// The bound value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The wrapped callable.
    #[must_use]
    pub fn callable(&self) -> &Operation {
        &self.callable
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = self.operation_type().keyword();
        match self {
            Self::Push(value) => write!(f, "{keyword} {value}"),
            Self::IfTrue(inner) => write!(f, "{keyword} {inner}"),
            Self::Select { cases, otherwise } => {
                write!(f, "{keyword} {}", Value::Table(cases.clone()))?;
                if let Some(otherwise) = otherwise {
                    write!(f, " else {otherwise}")?;
                }
                Ok(())
            }
            Self::Load(name)
            | Self::Store(name)
            | Self::Clear(name)
            | Self::LoadSlot(name)
            | Self::StoreSlot(name) => write!(f, "{keyword} {name}"),
            Self::Call { target, args } => {
                write!(f, "{keyword} {target} {}", Value::Tuple(args.clone()))
            }
            Self::LoadNative(path) => write!(f, "{keyword} {path:?}"),
            Self::Native { bucket, name } => write!(f, "{keyword} {bucket} {name}"),
            Self::Block(block) => write!(f, "{block}"),
            Self::PartialBind(bind) => write!(f, "{bind}"),
            _ => f.write_str(keyword),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block ")?;
        if !self.slots.is_empty() {
            write!(f, "slots {} ", self.slots.join(", "))?;
        }
        write!(f, "{{")?;
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, " {op}")?;
        }
        write!(f, " }}")
    }
}

impl fmt::Display for PartialBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bind({}, {})", self.value, self.callable)
    }
}
