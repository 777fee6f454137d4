//! Integration tests for error discipline
//!
//! A failing operation leaves its operands where they were with an `Error`
//! value on top, and the failure stops every enclosing block.

use cairn_foundation::{ErrorCode, Tuple, Value};
use cairn_machine::{ExecResult, MachineState, NativeFn, NativeLibrary};

use crate::support::{machine, numbers, run};

fn err(code: ErrorCode) -> Value {
    Value::Error(code)
}

// =============================================================================
// Operand Restoration
// =============================================================================

#[test]
fn division_by_zero_restores_operands() {
    let (result, stack) = run("value main block { push number 0; push number 12; div; push number 99 }");
    assert_eq!(result, ExecResult::Error);
    assert_eq!(
        stack,
        vec![Value::Number(0), Value::Number(12), err(ErrorCode::DivByZero)]
    );
}

#[test]
fn insufficient_arguments_leaves_stack_alone() {
    let (result, stack) = run("value main block { push number 5; add }");
    assert_eq!(result, ExecResult::Error);
    assert_eq!(stack, vec![Value::Number(5), err(ErrorCode::InsufficientArguments)]);
}

#[test]
fn store_over_existing_name() {
    let (_, stack) = run(
        "value taken number 1
        value main block { push number 2; store taken }",
    );
    assert_eq!(stack, vec![Value::Number(2), err(ErrorCode::AlreadyExisting)]);
}

#[test]
fn at_out_of_bounds() {
    let (_, stack) = run("value main block { push tuple (number 1); push number 4; at }");
    assert_eq!(
        stack,
        vec![
            Value::Tuple(Tuple::from(vec![Value::Number(1)])),
            Value::Number(4),
            err(ErrorCode::OutOfBounds),
        ]
    );
}

#[test]
fn find_misses_by_container() {
    let (result, stack) = run(
        "value main block {
            push table [atom a -> number 1]; push atom b; find
            push set [number 1]; push number 2; find
        }",
    );
    assert_eq!(result, ExecResult::Success);
    assert_eq!(stack, vec![Value::Empty, Value::Boolean(false)]);

    let (result, stack) = run("value main block { push string \"abc\"; push character 'z'; find }");
    assert_eq!(result, ExecResult::Error);
    assert_eq!(stack.last(), Some(&err(ErrorCode::NotFound)));
}

#[test]
fn unsupported_typecast() {
    let (_, stack) = run("value main block { push number 1; push type table; typecast }");
    assert_eq!(
        stack,
        vec![
            Value::Number(1),
            Value::Type(cairn_foundation::ValueType::Table),
            err(ErrorCode::TypeMismatch),
        ]
    );
}

#[test]
fn parse_failure_restores_text() {
    let (_, stack) = run("value main block { push string \"tuple (\"; parse }");
    assert_eq!(stack, vec![Value::from("tuple ("), err(ErrorCode::SyntaxError)]);
}

// =============================================================================
// Propagation
// =============================================================================

#[test]
fn errors_stop_callers() {
    let (result, stack) = run(
        "value inner block { push number 1; push number 0; swap; mod }
        value main block { call inner (); push number 7 }",
    );
    assert_eq!(result, ExecResult::Error);
    assert_eq!(stack.last(), Some(&err(ErrorCode::DivByZero)));
    assert!(!stack.contains(&Value::Number(7)));
}

#[test]
fn call_to_unknown_name() {
    let (result, stack) = run("value main block { call missing (number 1) }");
    assert_eq!(result, ExecResult::Error);
    assert_eq!(stack, vec![err(ErrorCode::NotFound)]);
}

#[test]
fn iftrue_needs_a_boolean() {
    let (_, stack) = run("value main block { push number 1; iftrue halt }");
    assert_eq!(stack, vec![Value::Number(1), err(ErrorCode::TypeMismatch)]);
}

#[test]
fn select_miss_without_otherwise() {
    let (_, stack) = run(
        "value main block { push atom nope; select [atom yes -> operation dup] }",
    );
    assert_eq!(stack, vec![Value::atom("nope"), err(ErrorCode::NotFound)]);
}

#[test]
fn block_slots_need_values() {
    let (result, stack) = run(
        "value pair block slots a, b { loadslot a }
        value main block { push number 1; call pair () }",
    );
    assert_eq!(result, ExecResult::Error);
    assert_eq!(stack, vec![Value::Number(1), err(ErrorCode::InsufficientArguments)]);
}

// =============================================================================
// Combinators
// =============================================================================

#[test]
fn map_step_with_two_results() {
    let (result, stack) = run(
        "value main block {
            push tuple (number 1, number 2)
            push operation dup
            map
        }",
    );
    assert_eq!(result, ExecResult::Error);
    assert_eq!(stack.len(), 3);
    assert_eq!(stack[1], Value::operation(cairn_foundation::Operation::Dup));
    assert_eq!(stack[2], err(ErrorCode::UnexpectedResult));
}

#[test]
fn filter_needs_booleans() {
    let (_, stack) = run(
        "value main block { push tuple (number 1); push block { }; filter }",
    );
    assert_eq!(stack.last(), Some(&err(ErrorCode::TypeMismatch)));
}

#[test]
fn reduce_rejects_sets() {
    let (_, stack) = run(
        "value main block { push set [number 1]; push number 0; push operation add; reduce }",
    );
    assert_eq!(stack.len(), 4);
    assert_eq!(stack[1], Value::Number(0));
    assert_eq!(stack[3], err(ErrorCode::TypeMismatch));
}

#[test]
fn halt_inside_map_halts_the_run() {
    let (result, stack) = run(
        "value main block { push tuple (number 1); push operation halt; map; push number 5 }",
    );
    assert_eq!(result, ExecResult::Halt);
    assert!(!stack.contains(&Value::Number(5)));
}

// =============================================================================
// Natives
// =============================================================================

struct Counter;

fn count(machine: &mut MachineState) -> ExecResult {
    let size = machine.stack().len() as u64;
    machine.push(Value::Number(size));
    ExecResult::Success
}

impl NativeLibrary for Counter {
    fn bucket(&self) -> &str {
        "counter"
    }

    fn operations(&self) -> Vec<(&'static str, NativeFn)> {
        vec![("depth", count as NativeFn)]
    }
}

#[test]
fn natives_need_loading() {
    let source = "value main block {
        push number 1
        native counter depth
    }";
    let mut machine = machine(source);
    machine.provide_native("test/counter", &Counter);
    assert_eq!(machine.run(), Some(ExecResult::Error));
    assert_eq!(
        machine.stack().iter().cloned().collect::<Vec<_>>(),
        vec![Value::Number(1), err(ErrorCode::NotFound)]
    );
}

#[test]
fn loaded_natives_run() {
    let mut machine = machine(
        "value main block {
            loadnative \"test/counter\"
            push number 1; push number 1
            native counter depth
        }",
    );
    machine.provide_native("test/counter", &Counter);
    assert_eq!(machine.run(), Some(ExecResult::Success));
    assert_eq!(
        machine.stack().iter().cloned().collect::<Vec<_>>(),
        numbers(&[1, 1, 2])
    );
}
