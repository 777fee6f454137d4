//! Blocks, branching and invocation.

use cairn_foundation::{Block, ErrorCode, Operation, Table, Tuple, Value};

use super::{Execute, ExecResult, Fault, OpResult};
use crate::state::MachineState;

/// Runs a block activation.
///
/// Listeners see exactly one entering and one leaving notification per
/// activation, whatever the exit path.
pub(crate) fn run_block(block: &Block, machine: &mut MachineState) -> ExecResult {
    machine.notify_entering(block);
    let result = activate(block, machine);
    machine.notify_leaving(block);
    result
}

fn activate(block: &Block, machine: &mut MachineState) -> ExecResult {
    // Slot values are popped in reverse declaration order, so the deepest
    // value binds the first slot.
    let Some(values) = machine.stack_mut().take_top(block.num_slot_values()) else {
        machine.raise(Fault::bare(ErrorCode::InsufficientArguments));
        return ExecResult::Error;
    };
    machine
        .slots_mut()
        .push_frame(block.slots().iter().cloned().zip(values));
    let result = run_operations(block, machine);
    machine.slots_mut().pop_frame();
    result
}

fn run_operations(block: &Block, machine: &mut MachineState) -> ExecResult {
    let mut index = 0;
    while let Some(op) = block.get(index) {
        machine.notify_executing(block, index);
        match op.execute(machine) {
            ExecResult::Success => index += 1,
            ExecResult::Again => {}
            ExecResult::RestartBlock => index = 0,
            ExecResult::ExitBlock => return ExecResult::Success,
            result @ (ExecResult::Error | ExecResult::Halt) => return result,
        }
    }
    ExecResult::Success
}

pub(super) fn if_true(machine: &mut MachineState, inner: &Operation) -> OpResult {
    let [condition] = machine.stack_mut().pop_operands::<1>()?;
    match condition {
        Value::Boolean(true) => Ok(inner.execute(machine)),
        Value::Boolean(false) => Ok(ExecResult::Success),
        other => Err(Fault::new(ErrorCode::TypeMismatch, [other])),
    }
}

/// Consumes a key and runs the matching case, or `otherwise` on a miss.
pub(super) fn select(
    machine: &mut MachineState,
    cases: &Table,
    otherwise: Option<&Operation>,
) -> OpResult {
    let [key] = machine.stack_mut().pop_operands::<1>()?;
    match cases.get(&key) {
        Some(case) => match case.as_callable() {
            Some(op) => Ok(op.execute(machine)),
            None => Err(Fault::new(ErrorCode::TypeMismatch, [key])),
        },
        None => match otherwise {
            Some(op) => Ok(op.execute(machine)),
            None => Err(Fault::new(ErrorCode::NotFound, [key])),
        },
    }
}

/// Resolves `target` in the store, pushes `args` so the first argument ends
/// on top, and executes it.
pub(super) fn call(machine: &mut MachineState, target: &str, args: &Tuple) -> OpResult {
    let Some(value) = machine.store().get(target) else {
        return Err(Fault::bare(ErrorCode::NotFound));
    };
    let Some(callee) = value.as_callable().cloned() else {
        return Err(Fault::bare(ErrorCode::TypeMismatch));
    };
    for arg in args.iter().rev() {
        machine.push(arg.clone());
    }
    Ok(callee.execute(machine))
}

pub(super) fn exec(machine: &mut MachineState) -> OpResult {
    let [callable] = machine.stack_mut().pop_operands::<1>()?;
    match callable.as_callable() {
        Some(op) => Ok(op.execute(machine)),
        None => Err(Fault::new(ErrorCode::TypeMismatch, [callable])),
    }
}
