//! Stack shuffling, arithmetic and logic.
//!
//! Binary operations pop the first operand from the top: `sub` computes
//! `top - second`. Arithmetic wraps on overflow.

use cairn_foundation::{ErrorCode, Value};

use super::{ExecResult, Fault, OpResult};
use crate::state::MachineState;

pub(super) fn pop(machine: &mut MachineState) -> OpResult {
    machine.stack_mut().pop_operands::<1>()?;
    Ok(ExecResult::Success)
}

pub(super) fn dup(machine: &mut MachineState) -> OpResult {
    let [top] = machine.stack_mut().pop_operands::<1>()?;
    machine.push(top.clone());
    machine.push(top);
    Ok(ExecResult::Success)
}

pub(super) fn swap(machine: &mut MachineState) -> OpResult {
    let [a, b] = machine.stack_mut().pop_operands::<2>()?;
    machine.push(a);
    machine.push(b);
    Ok(ExecResult::Success)
}

#[derive(Clone, Copy, Debug)]
pub(super) enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

pub(super) fn arithmetic(machine: &mut MachineState, op: Arith) -> OpResult {
    let [a, b] = machine.stack_mut().pop_operands::<2>()?;
    let (Value::Number(x), Value::Number(y)) = (&a, &b) else {
        return Err(Fault::new(ErrorCode::TypeMismatch, [a, b]));
    };
    let (x, y) = (*x, *y);
    let result = match op {
        Arith::Add => x.wrapping_add(y),
        Arith::Sub => x.wrapping_sub(y),
        Arith::Mul => x.wrapping_mul(y),
        Arith::Div | Arith::Mod if y == 0 => {
            return Err(Fault::new(ErrorCode::DivByZero, [a, b]));
        }
        Arith::Div => x / y,
        Arith::Mod => x % y,
    };
    machine.push(Value::Number(result));
    Ok(ExecResult::Success)
}

#[derive(Clone, Copy, Debug)]
pub(super) enum Logic {
    And,
    Or,
    Xor,
}

/// Logical on Booleans, bitwise on Numbers.
pub(super) fn logic(machine: &mut MachineState, op: Logic) -> OpResult {
    let [a, b] = machine.stack_mut().pop_operands::<2>()?;
    let result = match (&a, &b) {
        (Value::Boolean(x), Value::Boolean(y)) => Value::Boolean(match op {
            Logic::And => *x && *y,
            Logic::Or => *x || *y,
            Logic::Xor => x ^ y,
        }),
        (Value::Number(x), Value::Number(y)) => Value::Number(match op {
            Logic::And => x & y,
            Logic::Or => x | y,
            Logic::Xor => x ^ y,
        }),
        _ => return Err(Fault::new(ErrorCode::TypeMismatch, [a, b])),
    };
    machine.push(result);
    Ok(ExecResult::Success)
}

pub(super) fn not(machine: &mut MachineState) -> OpResult {
    let [a] = machine.stack_mut().pop_operands::<1>()?;
    let result = match a {
        Value::Boolean(x) => Value::Boolean(!x),
        Value::Number(x) => Value::Number(!x),
        other => return Err(Fault::new(ErrorCode::TypeMismatch, [other])),
    };
    machine.push(result);
    Ok(ExecResult::Success)
}

pub(super) fn eq(machine: &mut MachineState) -> OpResult {
    let [a, b] = machine.stack_mut().pop_operands::<2>()?;
    machine.push(Value::Boolean(a == b));
    Ok(ExecResult::Success)
}
