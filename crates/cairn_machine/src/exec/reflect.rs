//! Type inspection, conversion and runtime parsing.

use cairn_foundation::{Block, ErrorCode, Table, Tuple, Value, ValueType};
use cairn_language::{lexer::is_identifier, parse_payload};

use super::{ExecResult, Fault, OpResult};
use crate::state::MachineState;

pub(super) fn type_of(machine: &mut MachineState) -> OpResult {
    let [value] = machine.stack_mut().pop_operands::<1>()?;
    machine.push(Value::Type(value.value_type()));
    Ok(ExecResult::Success)
}

pub(super) fn type_cast(machine: &mut MachineState) -> OpResult {
    let [target, source] = machine.stack_mut().pop_operands::<2>()?;
    let converted = match &target {
        Value::Type(to) => typecast(&source, *to),
        _ => None,
    };
    match converted {
        Some(value) => {
            machine.push(value);
            Ok(ExecResult::Success)
        }
        None => Err(Fault::new(ErrorCode::TypeMismatch, [target, source])),
    }
}

/// Converts `source` to type `to`, or returns `None` when the pair is not a
/// supported conversion.
///
/// Supported conversions:
/// - any value to its own type;
/// - any callable to `operation`;
/// - Boolean and Character to String;
/// - Atom to String, and String to Atom when the text is an identifier;
/// - Number to Character when it fits in 32 bits;
/// - Tuple of callables to Block;
/// - Tuple of 2-tuples to Table, and Table to a Tuple of 2-tuples.
#[must_use]
pub fn typecast(source: &Value, to: ValueType) -> Option<Value> {
    if source.value_type() == to || (to == ValueType::Operation && source.is_callable()) {
        return Some(source.clone());
    }
    match (source, to) {
        (Value::Boolean(_), ValueType::String) => Some(Value::String(source.describe())),
        (Value::Character(code), ValueType::String) => {
            char::from_u32(*code).map(|c| Value::String(c.to_string()))
        }
        (Value::Atom(name), ValueType::String) => Some(Value::String(name.clone())),
        (Value::String(text), ValueType::Atom) if is_identifier(text) => {
            Some(Value::atom(text.clone()))
        }
        (Value::Number(n), ValueType::Character) => u32::try_from(*n).ok().map(Value::Character),
        (Value::Tuple(items), ValueType::Block) => {
            let operations = items
                .iter()
                .map(|item| item.as_callable().cloned())
                .collect::<Option<Vec<_>>>()?;
            Some(Value::operation(Block::new(operations)))
        }
        (Value::Tuple(items), ValueType::Table) => {
            let mut table = Table::new();
            for item in items {
                let (key, value) = item.as_tuple()?.as_pair()?;
                table.insert(key.clone(), value.clone());
            }
            Some(Value::Table(table))
        }
        (Value::Table(table), ValueType::Tuple) => Some(Value::Tuple(
            table
                .iter()
                .map(|(k, v)| Value::Tuple(Tuple::pair(k.clone(), v.clone())))
                .collect(),
        )),
        _ => None,
    }
}

/// Parses a String as a value payload using the machine's registry.
pub(super) fn parse(machine: &mut MachineState) -> OpResult {
    let [text] = machine.stack_mut().pop_operands::<1>()?;
    let Value::String(source) = &text else {
        return Err(Fault::new(ErrorCode::TypeMismatch, [text]));
    };
    match parse_payload(source, machine.registry()) {
        Ok(value) => {
            machine.push(value);
            Ok(ExecResult::Success)
        }
        Err(_) => Err(Fault::new(ErrorCode::SyntaxError, [text])),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use cairn_foundation::Operation;

    fn cast(source: Value, to: ValueType) -> (MachineState, ExecResult) {
        run_with(vec![source, Value::Type(to)], vec![Operation::TypeCast])
    }

    #[test]
    fn typeof_reports_variant() {
        let (machine, _) = run_with(vec![Value::from("s")], vec![Operation::TypeOf]);
        assert_eq!(stack(&machine), vec![Value::Type(ValueType::String)]);
        let (machine, _) = run_with(
            vec![Value::block(vec![], vec![])],
            vec![Operation::TypeOf],
        );
        assert_eq!(stack(&machine), vec![Value::Type(ValueType::Block)]);
    }

    #[test]
    fn boolean_to_string() {
        let (machine, result) = cast(Value::Boolean(true), ValueType::String);
        assert_eq!(result, ExecResult::Success);
        assert_eq!(stack(&machine), vec![Value::from("true")]);
    }

    #[test]
    fn tuple_of_operations_to_block() {
        let ops = Value::Tuple(Tuple::from(vec![
            Value::operation(Operation::Dup),
            Value::operation(Operation::Add),
        ]));
        let (machine, _) = cast(ops, ValueType::Block);
        assert_eq!(
            stack(&machine),
            vec![Value::block(vec![], vec![Operation::Dup, Operation::Add])]
        );
    }

    #[test]
    fn tuple_with_non_operation_is_not_a_block() {
        let mixed = Value::Tuple(Tuple::from(vec![Value::operation(Operation::Dup), n(1)]));
        let (machine, result) = cast(mixed.clone(), ValueType::Block);
        assert_eq!(result, ExecResult::Error);
        assert_eq!(
            stack(&machine),
            vec![mixed, Value::Type(ValueType::Block), err(ErrorCode::TypeMismatch)]
        );
    }

    #[test]
    fn tuple_table_conversions() {
        let pairs = Value::Tuple(Tuple::from(vec![Value::Tuple(Tuple::pair(n(1), n(2)))]));
        let (machine, _) = cast(pairs.clone(), ValueType::Table);
        let mut expected = Table::new();
        expected.insert(n(1), n(2));
        assert_eq!(stack(&machine), vec![Value::Table(expected.clone())]);

        let (machine, _) = cast(Value::Table(expected), ValueType::Tuple);
        assert_eq!(stack(&machine), vec![pairs]);

        let (machine, _) = cast(Value::Tuple(Tuple::new()), ValueType::Table);
        assert_eq!(stack(&machine), vec![Value::Table(Table::new())]);

        let bad = Value::Tuple(Tuple::from(vec![n(1)]));
        let (_, result) = cast(bad, ValueType::Table);
        assert_eq!(result, ExecResult::Error);
    }

    #[test]
    fn identity_and_operation_casts() {
        assert_eq!(typecast(&n(3), ValueType::Number), Some(n(3)));
        let block = Value::block(vec![], vec![]);
        assert_eq!(typecast(&block, ValueType::Operation), Some(block));
        assert_eq!(typecast(&n(3), ValueType::String), None);
    }

    #[test]
    fn scalar_casts() {
        assert_eq!(typecast(&Value::from('x'), ValueType::String), Some(Value::from("x")));
        assert_eq!(typecast(&Value::atom("ok"), ValueType::String), Some(Value::from("ok")));
        assert_eq!(typecast(&Value::from("ok"), ValueType::Atom), Some(Value::atom("ok")));
        assert_eq!(typecast(&Value::from("not ok"), ValueType::Atom), None);
        assert_eq!(typecast(&n(65), ValueType::Character), Some(Value::from('A')));
        assert_eq!(typecast(&n(u64::MAX), ValueType::Character), None);
    }

    #[test]
    fn cast_target_must_be_a_type() {
        let (machine, _) = run_with(vec![n(1), n(2)], vec![Operation::TypeCast]);
        assert_eq!(stack(&machine), vec![n(1), n(2), err(ErrorCode::TypeMismatch)]);
    }

    #[test]
    fn parse_reads_payloads() {
        let (machine, result) = run_with(
            vec![Value::from("tuple (number 1, boolean true)")],
            vec![Operation::Parse],
        );
        assert_eq!(result, ExecResult::Success);
        assert_eq!(
            stack(&machine),
            vec![Value::Tuple(Tuple::from(vec![n(1), Value::Boolean(true)]))]
        );
    }

    #[test]
    fn parse_failure_restores_text() {
        let (machine, result) = run_with(vec![Value::from("tuple (")], vec![Operation::Parse]);
        assert_eq!(result, ExecResult::Error);
        assert_eq!(
            stack(&machine),
            vec![Value::from("tuple ("), err(ErrorCode::SyntaxError)]
        );
    }

    #[test]
    fn parse_of_runaway_nesting_is_a_syntax_error() {
        let text = Value::String(format!(
            "{}number 1{}",
            "tuple (".repeat(50_000),
            ")".repeat(50_000)
        ));
        let (machine, result) = run_with(vec![text.clone()], vec![Operation::Parse]);
        assert_eq!(result, ExecResult::Error);
        assert_eq!(stack(&machine), vec![text, err(ErrorCode::SyntaxError)]);
    }
}
