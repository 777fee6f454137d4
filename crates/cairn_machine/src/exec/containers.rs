//! Container construction and access.
//!
//! `at` and `find` each apply their own miss policy per container:
//!
//! | container | `at` miss      | `find` miss         |
//! |-----------|----------------|---------------------|
//! | tuple     | `OUT_OF_BOUNDS`| `NOT_FOUND`         |
//! | string    | `OUT_OF_BOUNDS`| `NOT_FOUND`         |
//! | set       | `OUT_OF_BOUNDS`| pushes `false`      |
//! | table     | `NOT_FOUND`    | pushes `empty`      |

use cairn_foundation::{ErrorCode, Tuple, Value};

use super::{ExecResult, Fault, OpResult};
use crate::state::MachineState;

/// Pops a count, then that many values, and pushes them as a tuple with the
/// deepest value first.
pub(super) fn pack(machine: &mut MachineState) -> OpResult {
    let [count] = machine.stack_mut().pop_operands::<1>()?;
    let Some(n) = count.as_number().and_then(|n| usize::try_from(n).ok()) else {
        return Err(Fault::new(ErrorCode::TypeMismatch, [count]));
    };
    match machine.stack_mut().take_top(n) {
        Some(values) => {
            machine.push(Value::Tuple(Tuple::from(values)));
            Ok(ExecResult::Success)
        }
        None => Err(Fault::new(ErrorCode::InsufficientArguments, [count])),
    }
}

/// Pushes a tuple's elements in order, so the last element ends on top.
pub(super) fn unpack(machine: &mut MachineState) -> OpResult {
    let [tuple] = machine.stack_mut().pop_operands::<1>()?;
    let Value::Tuple(elements) = tuple else {
        return Err(Fault::new(ErrorCode::TypeMismatch, [tuple]));
    };
    for element in elements {
        machine.push(element);
    }
    Ok(ExecResult::Success)
}

/// Pops a key (position, or table key) and a container; pushes the element.
pub(super) fn at(machine: &mut MachineState) -> OpResult {
    let [key, container] = machine.stack_mut().pop_operands::<2>()?;
    let found = match &container {
        Value::Table(table) => table.get(&key).cloned().ok_or(ErrorCode::NotFound),
        Value::Tuple(_) | Value::Set(_) | Value::String(_) => match key.as_number() {
            Some(index) => usize::try_from(index)
                .ok()
                .and_then(|i| container.as_iterable().and_then(|c| c.at(i)))
                .ok_or(ErrorCode::OutOfBounds),
            None => Err(ErrorCode::TypeMismatch),
        },
        _ => Err(ErrorCode::TypeMismatch),
    };
    match found {
        Ok(element) => {
            machine.push(element);
            Ok(ExecResult::Success)
        }
        Err(code) => Err(Fault::new(code, [key, container])),
    }
}

/// Pops a needle and a container; pushes a position, a table value, or set
/// membership.
pub(super) fn find(machine: &mut MachineState) -> OpResult {
    let [needle, container] = machine.stack_mut().pop_operands::<2>()?;
    let position = |found: Option<usize>| {
        found
            .map(|p| Value::Number(p as u64))
            .ok_or(ErrorCode::NotFound)
    };
    let found = match (&container, &needle) {
        (Value::Tuple(tuple), _) => position(tuple.iter().position(|item| *item == needle)),
        (Value::String(text), Value::Character(code)) => {
            position(text.chars().position(|c| u32::from(c) == *code))
        }
        (Value::Table(table), _) => Ok(table.get(&needle).cloned().unwrap_or(Value::Empty)),
        (Value::Set(set), _) => Ok(Value::Boolean(set.contains(&needle))),
        _ => Err(ErrorCode::TypeMismatch),
    };
    match found {
        Ok(value) => {
            machine.push(value);
            Ok(ExecResult::Success)
        }
        Err(code) => Err(Fault::new(code, [needle, container])),
    }
}

/// Pops a value and a container; pushes the container with the value added.
pub(super) fn append(machine: &mut MachineState) -> OpResult {
    let [value, mut container] = machine.stack_mut().pop_operands::<2>()?;
    match container.append(value) {
        Ok(()) => {
            machine.push(container);
            Ok(ExecResult::Success)
        }
        Err(rejected) => Err(Fault::new(rejected.code, [rejected.value, container])),
    }
}

pub(super) fn size(machine: &mut MachineState) -> OpResult {
    let [container] = machine.stack_mut().pop_operands::<1>()?;
    let Some(size) = container.as_iterable().map(|c| c.size()) else {
        return Err(Fault::new(ErrorCode::TypeMismatch, [container]));
    };
    machine.push(Value::Number(size as u64));
    Ok(ExecResult::Success)
}
