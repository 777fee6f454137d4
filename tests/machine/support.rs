//! Shared helpers for machine integration tests.

use cairn_foundation::Value;
use cairn_language::{Parser, Registry};
use cairn_machine::{ExecResult, MachineState};

/// Loads `source` into a fresh machine, failing the test on any parse error.
pub fn machine(source: &str) -> MachineState {
    let registry = Registry::standard();
    let mut parser = Parser::new(source, &registry);
    let mut machine = MachineState::new();
    machine.load_parser(&mut parser);
    assert!(!parser.has_errors(), "{:?}", parser.errors());
    assert!(parser.is_at_end(), "source was not fully loaded");
    machine
}

/// Runs `main` from `source` and returns the result and the stack, bottom
/// first.
pub fn run(source: &str) -> (ExecResult, Vec<Value>) {
    let mut machine = machine(source);
    let result = machine.run().expect("main is callable");
    (result, machine.stack().iter().cloned().collect())
}

pub fn numbers(values: &[u64]) -> Vec<Value> {
    values.iter().copied().map(Value::Number).collect()
}
