//! Global names, block slots and native operations.

use cairn_foundation::ErrorCode;

use super::{ExecResult, Fault, OpResult};
use crate::state::MachineState;

pub(super) fn load(machine: &mut MachineState, name: &str) -> OpResult {
    let value = machine
        .store()
        .get(name)
        .cloned()
        .ok_or_else(|| Fault::bare(ErrorCode::NotFound))?;
    machine.push(value);
    Ok(ExecResult::Success)
}

/// Binds the top value to `name` unless the name is taken.
pub(super) fn store(machine: &mut MachineState, name: &str) -> OpResult {
    let [value] = machine.stack_mut().pop_operands::<1>()?;
    if machine.store().contains(name) {
        return Err(Fault::new(ErrorCode::AlreadyExisting, [value]));
    }
    machine.define(name, value);
    Ok(ExecResult::Success)
}

pub(super) fn clear(machine: &mut MachineState, name: &str) -> OpResult {
    match machine.store_mut().remove(name) {
        Some(_) => Ok(ExecResult::Success),
        None => Err(Fault::bare(ErrorCode::NotFound)),
    }
}

pub(super) fn load_slot(machine: &mut MachineState, name: &str) -> OpResult {
    let value = machine
        .slots()
        .get(name)
        .cloned()
        .ok_or_else(|| Fault::bare(ErrorCode::NotFound))?;
    machine.push(value);
    Ok(ExecResult::Success)
}

pub(super) fn store_slot(machine: &mut MachineState, name: &str) -> OpResult {
    let [value] = machine.stack_mut().pop_operands::<1>()?;
    if machine.slots().depth() == 0 {
        return Err(Fault::new(ErrorCode::NotFound, [value]));
    }
    machine.slots_mut().set(name, value);
    Ok(ExecResult::Success)
}

pub(super) fn load_native(machine: &mut MachineState, path: &str) -> OpResult {
    if machine.activate_native(path) {
        Ok(ExecResult::Success)
    } else {
        Err(Fault::bare(ErrorCode::NotFound))
    }
}

pub(super) fn native(machine: &mut MachineState, bucket: &str, name: &str) -> OpResult {
    match machine.native(bucket, name) {
        Some(function) => Ok(function(machine)),
        None => Err(Fault::bare(ErrorCode::NotFound)),
    }
}
