//! Binding and the container combinators `map`, `filter` and `reduce`.
//!
//! Every step runs the callable through [`apply`], which insists on exactly
//! one new value. A step that leaves anything else aborts the combinator with
//! `UNEXPECTED_RESULT`; a halt inside a step halts the run.

use cairn_foundation::{ErrorCode, Operation, Value};

use super::{ExecResult, Fault, OpResult, Step, apply};
use crate::state::MachineState;

/// Pops a callable and a value, pushing a callable that supplies the value
/// first.
pub(super) fn bind(machine: &mut MachineState) -> OpResult {
    let [callable, value] = machine.stack_mut().pop_operands::<2>()?;
    let Some(op) = callable.as_callable().cloned() else {
        return Err(Fault::new(ErrorCode::TypeMismatch, [callable, value]));
    };
    machine.push(Value::bind(value, op));
    Ok(ExecResult::Success)
}

/// Splits a popped `[callable, container]` pair, checking both shapes.
fn callable_and_iterable(
    callable: Value,
    container: Value,
) -> Result<(Operation, Value, Value), Fault> {
    match callable.as_callable().cloned() {
        Some(op) if container.as_iterable().is_some() => Ok((op, callable, container)),
        _ => Err(Fault::new(ErrorCode::TypeMismatch, [callable, container])),
    }
}

/// Replaces every element with the callable's result, keeping the container
/// variant.
pub(super) fn map(machine: &mut MachineState) -> OpResult {
    let [callable, container] = machine.stack_mut().pop_operands::<2>()?;
    let (op, callable, container) = callable_and_iterable(callable, container)?;
    let mut out = container.new_empty_of_same_type().unwrap_or(Value::Empty);
    let size = container.as_iterable().map_or(0, |c| c.size());

    for index in 0..size {
        let Some(element) = container.as_iterable().and_then(|c| c.at(index)) else {
            break;
        };
        match apply(machine, &op, [element]) {
            Step::Produced(result) => {
                if let Err(rejected) = out.append(result) {
                    return Err(Fault::new(rejected.code, [callable, container]));
                }
            }
            Step::Halted => return Ok(ExecResult::Halt),
            Step::Unexpected => {
                return Err(Fault::new(ErrorCode::UnexpectedResult, [callable, container]));
            }
        }
    }
    machine.push(out);
    Ok(ExecResult::Success)
}

/// Keeps the elements for which the callable yields `true`.
pub(super) fn filter(machine: &mut MachineState) -> OpResult {
    let [callable, container] = machine.stack_mut().pop_operands::<2>()?;
    let (op, callable, container) = callable_and_iterable(callable, container)?;
    let mut out = container.new_empty_of_same_type().unwrap_or(Value::Empty);
    let size = container.as_iterable().map_or(0, |c| c.size());

    for index in 0..size {
        let Some(element) = container.as_iterable().and_then(|c| c.at(index)) else {
            break;
        };
        match apply(machine, &op, [element.clone()]) {
            Step::Produced(Value::Boolean(true)) => {
                if let Err(rejected) = out.append(element) {
                    return Err(Fault::new(rejected.code, [callable, container]));
                }
            }
            Step::Produced(Value::Boolean(false)) => {}
            Step::Produced(_) => {
                return Err(Fault::new(ErrorCode::TypeMismatch, [callable, container]));
            }
            Step::Halted => return Ok(ExecResult::Halt),
            Step::Unexpected => {
                return Err(Fault::new(ErrorCode::UnexpectedResult, [callable, container]));
            }
        }
    }
    machine.push(out);
    Ok(ExecResult::Success)
}

/// Folds a tuple or table into one value.
///
/// Each step sees the element below the accumulator; tables supply
/// `(key, value)` pairs.
pub(super) fn reduce(machine: &mut MachineState) -> OpResult {
    let [callable, seed, container] = machine.stack_mut().pop_operands::<3>()?;
    let op = match callable.as_callable().cloned() {
        Some(op) if matches!(container, Value::Tuple(_) | Value::Table(_)) => op,
        _ => return Err(Fault::new(ErrorCode::TypeMismatch, [callable, seed, container])),
    };
    let size = container.as_iterable().map_or(0, |c| c.size());

    let mut accumulator = seed.clone();
    for index in 0..size {
        let Some(element) = container.as_iterable().and_then(|c| c.at(index)) else {
            break;
        };
        match apply(machine, &op, [element, accumulator]) {
            Step::Produced(result) => accumulator = result,
            Step::Halted => return Ok(ExecResult::Halt),
            Step::Unexpected => {
                return Err(Fault::new(
                    ErrorCode::UnexpectedResult,
                    [callable, seed, container],
                ));
            }
        }
    }
    machine.push(accumulator);
    Ok(ExecResult::Success)
}
