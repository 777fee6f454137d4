//! Integration tests for the assembly grammar
//!
//! Parses whole programs and checks the printed form parses back to the
//! same values.

use cairn_foundation::{Block, ErrorCode, Operation, PartialBind, Table, Tuple, Value};
use cairn_language::{
    Lexer, Parser, PrettyConfig, Registry, TokenKind, parse_payload, pretty_program, pretty_value,
};

fn parse(source: &str) -> Vec<(String, Value)> {
    let registry = Registry::standard();
    let mut parser = Parser::new(source, &registry);
    let entries = parser.parse_program();
    assert!(!parser.has_errors(), "{:?}", parser.errors());
    entries
}

const COUNTDOWN: &str = r#"
# Counts down from the number on the stack.
value countdown block slots n {
    loadslot n
    push number 0
    eq
    iftrue break
    loadslot n
    push number 1
    loadslot n
    sub
    call countdown ()
}

value main block { push number 3; call countdown () }
"#;

// =============================================================================
// Programs
// =============================================================================

#[test]
fn parses_multi_statement_program() {
    let entries = parse(COUNTDOWN);
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["countdown", "main"]);

    let countdown = entries[0].1.as_callable().and_then(Operation::as_block).unwrap();
    assert_eq!(countdown.slots(), ["n".to_string()]);
    assert_eq!(countdown.len(), 9);
    assert_eq!(countdown.get(3), Some(&Operation::IfTrue(Box::new(Operation::Break))));
}

#[test]
fn comments_are_trivia() {
    let tokens = Lexer::tokenize_all("# header\nvalue");
    assert!(matches!(tokens[0].kind, TokenKind::Comment(_)));
    assert!(tokens[1].kind.is_word("value"));
    assert!(parse("# only a comment\n").is_empty());
}

#[test]
fn nested_callables() {
    let value = parse_payload(
        "block { push bind number 2 operation mul; partial number 1 add; exec }",
        &Registry::standard(),
    )
    .unwrap();
    let expected = Value::block(
        vec![],
        vec![
            Operation::Push(Value::bind(Value::Number(2), Operation::Mul)),
            Operation::PartialBind(PartialBind::new(Value::Number(1), Operation::Add)),
            Operation::Exec,
        ],
    );
    assert_eq!(value, expected);
}

#[test]
fn select_with_otherwise() {
    let value = parse_payload(
        "operation select [atom a -> operation dup, atom b -> block { pop }] else halt",
        &Registry::standard(),
    )
    .unwrap();
    let Some(Operation::Select { cases, otherwise }) = value.as_callable() else {
        panic!("expected select, got {value}");
    };
    assert_eq!(cases.len(), 2);
    assert_eq!(
        cases.get(&Value::atom("b")),
        Some(&Value::operation(Block::new(vec![Operation::Pop])))
    );
    assert_eq!(otherwise.as_deref(), Some(&Operation::Halt));
}

#[test]
fn call_and_native_forms() {
    let value = parse_payload(
        r#"block { call f (number 1, string "two"); loadnative "cairn/io"; native io print }"#,
        &Registry::standard(),
    )
    .unwrap();
    let block = value.as_callable().and_then(Operation::as_block).unwrap();
    assert_eq!(
        block.get(0),
        Some(&Operation::Call {
            target: "f".into(),
            args: Tuple::from(vec![Value::Number(1), Value::from("two")]),
        })
    );
    assert_eq!(block.get(1), Some(&Operation::LoadNative("cairn/io".into())));
    assert_eq!(
        block.get(2),
        Some(&Operation::Native {
            bucket: "io".into(),
            name: "print".into(),
        })
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn errors_report_line() {
    let registry = Registry::standard();
    let mut parser = Parser::new("value a number 1\nvalue b tuple (number 1 number 2)", &registry);
    let entries = parser.parse_program();
    assert_eq!(entries.len(), 1);
    let errors = parser.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].position.line, 2);
    assert!(!parser.has_errors());
}

#[test]
fn unknown_keywords_fail() {
    let registry = Registry::standard();
    assert!(parse_payload("widget 3", &registry).is_err());
    assert!(parse_payload("block { frobnicate }", &registry).is_err());
    assert!(parse_payload("error no_such_code", &registry).is_err());
}

// =============================================================================
// Printing
// =============================================================================

#[test]
fn listing_reparses_to_same_program() {
    let entries = parse(COUNTDOWN);
    let listing = pretty_program(
        entries.iter().map(|(n, v)| (n.as_str(), v)),
        &PrettyConfig::listing(),
    );
    assert!(listing.starts_with("value countdown block slots n {\n    loadslot n\n"));
    assert_eq!(parse(&listing), entries);
}

#[test]
fn single_line_values_reparse() {
    let registry = Registry::standard();
    let mut table = Table::new();
    table.insert(Value::from("k"), Value::Error(ErrorCode::OutOfBounds));
    table.insert(Value::Number(2), Value::from('x'));
    let values = [
        Value::Table(table),
        Value::from("quote \" and \\ backslash\n"),
        Value::from('\''),
        Value::Set([Value::atom("a"), Value::Empty].into_iter().collect()),
        Value::bind(Value::Number(4), Operation::Sub),
    ];
    for value in values {
        let text = pretty_value(&value);
        assert_eq!(parse_payload(&text, &registry).unwrap(), value, "{text}");
    }
}

proptest::proptest! {
    #[test]
    fn printed_scalars_reparse(text in "\\PC*", number in proptest::num::u64::ANY, flag: bool) {
        let registry = Registry::standard();
        let value = Value::Tuple(Tuple::from(vec![
            Value::from(text.as_str()),
            Value::Number(number),
            Value::Boolean(flag),
        ]));
        let parsed = parse_payload(&pretty_value(&value), &registry).unwrap();
        proptest::prop_assert_eq!(parsed, value);
    }
}
