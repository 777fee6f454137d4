//! Integration tests for Value types
//!
//! Tests construction, structural equality and hashing, display, and the
//! Iterable/Appendable capabilities.

use cairn_foundation::{
    Block, ErrorCode, Operation, Set, Table, Tuple, Value, ValueType,
};
use std::collections::HashSet;

// =============================================================================
// Value Construction
// =============================================================================

#[test]
fn scalar_types() {
    assert_eq!(Value::Empty.value_type(), ValueType::Empty);
    assert_eq!(Value::from(5u64).value_type(), ValueType::Number);
    assert_eq!(Value::from(true).value_type(), ValueType::Boolean);
    assert_eq!(Value::from('a').value_type(), ValueType::Character);
    assert_eq!(Value::from("s").value_type(), ValueType::String);
    assert_eq!(Value::atom("a").value_type(), ValueType::Atom);
    assert_eq!(Value::from(ErrorCode::NotFound).value_type(), ValueType::Error);
}

#[test]
fn callable_types() {
    let op = Value::operation(Operation::Dup);
    let block = Value::block(vec![], vec![Operation::Dup]);
    let bind = Value::bind(Value::Number(1), Operation::Add);
    assert_eq!(op.value_type(), ValueType::Operation);
    assert_eq!(block.value_type(), ValueType::Block);
    assert_eq!(bind.value_type(), ValueType::Bind);
    assert!(op.is_callable() && block.is_callable() && bind.is_callable());
    assert!(!Value::Number(1).is_callable());
}

#[test]
fn strings_and_atoms_differ() {
    assert_ne!(Value::from("a"), Value::atom("a"));
    assert_eq!(Value::from("a").as_str(), Value::atom("a").as_str());
}

// =============================================================================
// Equality and Hashing
// =============================================================================

#[test]
fn tables_compare_by_content() {
    let mut a = Table::new();
    a.insert(Value::Number(1), Value::from("one"));
    a.insert(Value::Number(2), Value::from("two"));
    let mut b = Table::new();
    b.insert(Value::Number(2), Value::from("two"));
    b.insert(Value::Number(1), Value::from("one"));
    assert_eq!(Value::Table(a.clone()), Value::Table(b.clone()));

    let mut seen = HashSet::new();
    seen.insert(Value::Table(a));
    assert!(seen.contains(&Value::Table(b)));
}

#[test]
fn table_insert_keeps_first_value() {
    let mut table = Table::new();
    assert!(table.insert(Value::Number(1), Value::from("first")));
    assert!(!table.insert(Value::Number(1), Value::from("second")));
    assert_eq!(table.get(&Value::Number(1)), Some(&Value::from("first")));
}

#[test]
fn nested_values_as_keys() {
    let key = Value::Tuple(Tuple::from(vec![Value::Number(1), Value::from("x")]));
    let mut table = Table::new();
    table.insert(key.clone(), Value::Boolean(true));
    assert_eq!(table.get(&key), Some(&Value::Boolean(true)));
}

#[test]
fn sets_ignore_duplicates() {
    let set: Set = [Value::Number(1), Value::Number(1), Value::Number(2)]
        .into_iter()
        .collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn blocks_compare_structurally() {
    let a = Block::with_slots(vec!["x".into()], vec![Operation::LoadSlot("x".into())]);
    let b = Block::with_slots(vec!["x".into()], vec![Operation::LoadSlot("x".into())]);
    assert_eq!(Value::operation(a), Value::operation(b));
}

// =============================================================================
// Capabilities
// =============================================================================

#[test]
fn iterable_containers() {
    let tuple = Value::Tuple(Tuple::from(vec![Value::Number(7)]));
    assert_eq!(tuple.as_iterable().map(|t| t.size()), Some(1));
    let text = Value::from("ab");
    assert_eq!(
        text.as_iterable().and_then(|t| t.at(1)),
        Some(Value::from('b'))
    );
    assert!(Value::Number(1).as_iterable().is_none());
}

#[test]
fn append_by_variant() {
    let mut tuple = Value::Tuple(Tuple::new());
    tuple.append(Value::Number(1)).unwrap();
    assert_eq!(tuple.as_iterable().map(|t| t.size()), Some(1));

    let mut table = Value::Table(Table::new());
    let rejected = table.append(Value::Number(1)).unwrap_err();
    assert_eq!(rejected.code, ErrorCode::TypeMismatch);
    assert_eq!(rejected.value, Value::Number(1));
    table
        .append(Value::Tuple(Tuple::pair(Value::Number(1), Value::Empty)))
        .unwrap();

    let mut number = Value::Number(1);
    assert!(number.append(Value::Empty).is_err());
}

#[test]
fn new_empty_keeps_variant() {
    let set = Value::Set([Value::Number(1)].into_iter().collect());
    assert_eq!(set.new_empty_of_same_type(), Some(Value::Set(Set::new())));
    assert_eq!(Value::Boolean(true).new_empty_of_same_type(), None);
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn display_forms() {
    assert_eq!(Value::Empty.to_string(), "empty");
    assert_eq!(Value::Number(5).to_string(), "5");
    assert_eq!(Value::Boolean(true).to_string(), "true");
    assert_eq!(Value::from("a").to_string(), "\"a\"");
    assert_eq!(Value::Error(ErrorCode::NotFound).to_string(), "error(not_found)");
    assert_eq!(Value::Type(ValueType::Number).to_string(), "type(number)");
}

#[test]
fn error_codes_round_trip() {
    for code in ErrorCode::ALL {
        assert_eq!(ErrorCode::from_byte(code.to_byte()), Some(code));
        assert_eq!(code.token().parse::<ErrorCode>().ok(), Some(code));
    }
    assert_eq!(ErrorCode::from_byte(0), None);
}
