//! Operation execution.
//!
//! Every operation runs through [`Execute::execute`], which reports one of six
//! [`ExecResult`]s to the enclosing block. Operations that fail return a
//! [`Fault`]; the dispatcher then restores the consumed operands in their
//! original order and pushes one `Error` value on top, so a failed operation
//! leaves exactly its inputs plus the error behind.

mod basic;
mod containers;
mod control;
mod higher_order;
mod names;
mod reflect;

use cairn_foundation::{Block, ErrorCode, Operation, Value};

use crate::state::MachineState;

pub use reflect::typecast;

/// Outcome of executing one operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecResult {
    /// Continue with the next operation.
    Success,
    /// The operation failed and left an `Error` on top of the stack.
    Error,
    /// Stop the whole run.
    Halt,
    /// Jump back to the first operation of the enclosing block.
    RestartBlock,
    /// Leave the enclosing block successfully.
    ExitBlock,
    /// Run the same operation again without advancing.
    Again,
}

impl ExecResult {
    /// Returns true for [`ExecResult::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// A failed operation: the error to raise plus the operands it consumed,
/// top first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    /// Error pushed after the operands are restored.
    pub code: ErrorCode,
    /// Operands in pop order.
    pub operands: Vec<Value>,
}

impl Fault {
    /// Creates a fault that restores `operands` (given in pop order).
    #[must_use]
    pub fn new(code: ErrorCode, operands: impl IntoIterator<Item = Value>) -> Self {
        Self {
            code,
            operands: operands.into_iter().collect(),
        }
    }

    /// Creates a fault that consumed nothing.
    #[must_use]
    pub fn bare(code: ErrorCode) -> Self {
        Self {
            code,
            operands: Vec::new(),
        }
    }
}

/// Result type used by individual operation handlers.
pub(crate) type OpResult = Result<ExecResult, Fault>;

/// Something the machine can run.
pub trait Execute {
    /// Runs against `machine`.
    fn execute(&self, machine: &mut MachineState) -> ExecResult;
}

impl Execute for Operation {
    fn execute(&self, machine: &mut MachineState) -> ExecResult {
        match dispatch(self, machine) {
            Ok(result) => result,
            Err(fault) => {
                machine.raise(fault);
                ExecResult::Error
            }
        }
    }
}

impl Execute for Block {
    fn execute(&self, machine: &mut MachineState) -> ExecResult {
        control::run_block(self, machine)
    }
}

fn dispatch(op: &Operation, machine: &mut MachineState) -> OpResult {
    match op {
        Operation::Nop => Ok(ExecResult::Success),
        Operation::Push(value) => {
            machine.push(value.clone());
            Ok(ExecResult::Success)
        }
        Operation::Pop => basic::pop(machine),
        Operation::Dup => basic::dup(machine),
        Operation::Swap => basic::swap(machine),
        Operation::ResetStack => {
            machine.stack_mut().clear();
            Ok(ExecResult::Success)
        }
        Operation::Add => basic::arithmetic(machine, basic::Arith::Add),
        Operation::Sub => basic::arithmetic(machine, basic::Arith::Sub),
        Operation::Mul => basic::arithmetic(machine, basic::Arith::Mul),
        Operation::Div => basic::arithmetic(machine, basic::Arith::Div),
        Operation::Mod => basic::arithmetic(machine, basic::Arith::Mod),
        Operation::And => basic::logic(machine, basic::Logic::And),
        Operation::Or => basic::logic(machine, basic::Logic::Or),
        Operation::Xor => basic::logic(machine, basic::Logic::Xor),
        Operation::Not => basic::not(machine),
        Operation::Eq => basic::eq(machine),

        Operation::IfTrue(inner) => control::if_true(machine, inner),
        Operation::Loop => Ok(ExecResult::RestartBlock),
        Operation::Break => Ok(ExecResult::ExitBlock),
        Operation::Halt => Ok(ExecResult::Halt),
        Operation::Select { cases, otherwise } => {
            control::select(machine, cases, otherwise.as_deref())
        }
        Operation::Call { target, args } => control::call(machine, target, args),
        Operation::Exec => control::exec(machine),
        Operation::Block(block) => Ok(control::run_block(block, machine)),
        Operation::PartialBind(bind) => {
            machine.push(bind.value().clone());
            Ok(bind.callable().execute(machine))
        }

        Operation::Load(name) => names::load(machine, name),
        Operation::Store(name) => names::store(machine, name),
        Operation::Clear(name) => names::clear(machine, name),
        Operation::LoadSlot(name) => names::load_slot(machine, name),
        Operation::StoreSlot(name) => names::store_slot(machine, name),
        Operation::LoadNative(path) => names::load_native(machine, path),
        Operation::Native { bucket, name } => names::native(machine, bucket, name),

        Operation::Bind => higher_order::bind(machine),
        Operation::Map => higher_order::map(machine),
        Operation::Filter => higher_order::filter(machine),
        Operation::Reduce => higher_order::reduce(machine),

        Operation::Pack => containers::pack(machine),
        Operation::Unpack => containers::unpack(machine),
        Operation::At => containers::at(machine),
        Operation::Find => containers::find(machine),
        Operation::Append => containers::append(machine),
        Operation::Size => containers::size(machine),

        Operation::TypeOf => reflect::type_of(machine),
        Operation::TypeCast => reflect::type_cast(machine),
        Operation::Parse => reflect::parse(machine),
    }
}

/// Outcome of running a callable for exactly one result.
#[derive(Debug)]
pub(crate) enum Step {
    /// The callable left one new value, which has been popped.
    Produced(Value),
    /// The callable halted the machine.
    Halted,
    /// The callable did not leave exactly one value; the stack was restored
    /// to its depth before the inputs were pushed.
    Unexpected,
}

/// Pushes `inputs`, runs `callable`, and takes its single result.
pub(crate) fn apply(
    machine: &mut MachineState,
    callable: &Operation,
    inputs: impl IntoIterator<Item = Value>,
) -> Step {
    let base = machine.stack().len();
    for input in inputs {
        machine.push(input);
    }
    match callable.execute(machine) {
        ExecResult::Halt => Step::Halted,
        ExecResult::Success if machine.stack().len() == base + 1 => {
            machine.pop().map_or(Step::Unexpected, Step::Produced)
        }
        _ => {
            machine.stack_mut().truncate(base);
            Step::Unexpected
        }
    }
}
