//! Integration tests for running programs
//!
//! Each test loads assembly source and runs its `main`.

use cairn_foundation::{Block, ByteStream, Table, Tuple, Value, ValueType};
use cairn_machine::{ExecResult, Listener, MachineState};

use crate::support::{machine, numbers, run};

// =============================================================================
// Control Flow
// =============================================================================

#[test]
fn recursive_countdown() {
    let (result, stack) = run(
        "value countdown block slots n {
            loadslot n; push number 0; eq; iftrue break
            loadslot n
            push number 1; loadslot n; sub
            call countdown ()
        }
        value main block { push number 5; call countdown () }",
    );
    assert_eq!(result, ExecResult::Success);
    assert_eq!(stack, numbers(&[5, 4, 3, 2, 1]));
}

#[test]
fn loop_restarts_without_reloading_slots() {
    let (result, stack) = run(
        "value count block slots i {
            loadslot i; push number 3; eq; iftrue break
            loadslot i
            push number 1; loadslot i; add; storeslot i
            loop
        }
        value main block { push number 0; call count () }",
    );
    assert_eq!(result, ExecResult::Success);
    assert_eq!(stack, numbers(&[0, 1, 2]));
}

#[test]
fn halt_stops_every_level() {
    let (result, stack) = run(
        "value inner block { push number 1; halt; push number 2 }
        value main block { call inner (); push number 3 }",
    );
    assert_eq!(result, ExecResult::Halt);
    assert_eq!(stack, numbers(&[1]));
}

#[test]
fn select_dispatches_on_atoms() {
    let source = "value dispatch operation select [
            atom inc -> operation partial number 1 add,
            atom dbl -> bind number 2 operation mul,
        ] else halt
        value main block {
            push number 5; push atom inc; call dispatch ()
            push atom dbl; call dispatch ()
        }";
    let (result, stack) = run(source);
    assert_eq!(result, ExecResult::Success);
    assert_eq!(stack, numbers(&[12]));
}

#[test]
fn call_arguments_first_on_top() {
    let (_, stack) = run(
        "value main block { call diff (number 10, number 3) }
        value diff operation sub",
    );
    assert_eq!(stack, numbers(&[7]));
}

#[test]
fn globals_store_and_clear() {
    let mut machine = machine(
        "value main block {
            push number 42; store answer
            load answer; load answer; add
            clear answer
        }",
    );
    assert_eq!(machine.run(), Some(ExecResult::Success));
    assert_eq!(machine.stack().iter().cloned().collect::<Vec<_>>(), numbers(&[84]));
    assert!(!machine.store().contains("answer"));
}

// =============================================================================
// Combinators
// =============================================================================

#[test]
fn map_filter_reduce_pipeline() {
    let (result, stack) = run(
        "value main block {
            push tuple (number 1, number 2, number 3, number 4, number 5, number 6)
            push block { push number 2; swap; mod; push number 0; eq }
            filter
            push bind number 10 operation mul
            map
            push number 0
            push operation add
            reduce
        }",
    );
    assert_eq!(result, ExecResult::Success);
    assert_eq!(stack, numbers(&[120]));
}

#[test]
fn map_over_set_and_string() {
    let (_, stack) = run(
        "value main block {
            push set [number 1, number 2, number 3]
            push block { pop; push number 0 }
            map
            push string \"abc\"
            push operation dup
            push operation pop
            bind
            map
        }",
    );
    assert_eq!(stack[0], Value::Set([Value::Number(0)].into_iter().collect()));
    assert_eq!(stack[1], Value::from("abc"));
}

#[test]
fn map_and_reduce_small_tuple() {
    let (result, stack) = run(
        "value main block {
            push tuple (number 3, number 12, number 0)
            push block { push number 2 add push number 2 mul }
            map
            push tuple (number 3, number 12, number 0)
            push number 1
            push block { add }
            reduce
        }",
    );
    assert_eq!(result, ExecResult::Success);
    assert_eq!(
        stack,
        vec![Value::Tuple(Tuple::from(numbers(&[10, 28, 4]))), Value::Number(16)]
    );
}

#[test]
fn filter_keeps_numbers_by_type() {
    let (result, stack) = run(
        "value main block {
            push tuple (number 3, string \"three\", atom three, number 7, empty, tuple (number 1))
            push block { typeof push type number eq }
            filter
        }",
    );
    assert_eq!(result, ExecResult::Success);
    assert_eq!(stack, vec![Value::Tuple(Tuple::from(numbers(&[3, 7])))]);
}

#[test]
fn reduce_table_pairs() {
    let (_, stack) = run(
        "value main block {
            push table [atom a -> number 4, atom b -> number 5]
            push number 0
            push block slots pair, acc { loadslot pair; push number 1; at; loadslot acc; add }
            reduce
        }",
    );
    assert_eq!(stack, numbers(&[9]));
}

// =============================================================================
// Containers and Types
// =============================================================================

#[test]
fn pack_and_unpack() {
    let (_, stack) = run(
        "value main block {
            push number 1; push number 2; push number 3
            push number 3; pack
            dup; size
            swap; unpack
        }",
    );
    assert_eq!(stack, numbers(&[3, 1, 2, 3]));
}

#[test]
fn table_building_and_lookup() {
    let (_, stack) = run(
        "value main block {
            push table []
            push tuple (atom k, number 7)
            append
            dup; push atom k; at
        }",
    );
    let mut table = Table::new();
    table.insert(Value::atom("k"), Value::Number(7));
    assert_eq!(stack, vec![Value::Table(table), Value::Number(7)]);
}

#[test]
fn typecasts() {
    let (_, stack) = run(
        "value main block {
            push number 65; push type character; typecast
            push string \"name\"; push type atom; typecast
            push tuple (tuple (number 1, boolean true)); push type table; typecast
            push tuple (operation dup, operation add); push type block; typecast
            typeof
        }",
    );
    let mut table = Table::new();
    table.insert(Value::Number(1), Value::Boolean(true));
    assert_eq!(
        stack,
        vec![
            Value::Character(65),
            Value::atom("name"),
            Value::Table(table),
            Value::Type(ValueType::Block),
        ]
    );
}

#[test]
fn parse_then_exec() {
    let (result, stack) = run(
        "value main block {
            push number 4
            push string \"block { dup; mul }\"; parse
            exec
        }",
    );
    assert_eq!(result, ExecResult::Success);
    assert_eq!(stack, numbers(&[16]));
}

// =============================================================================
// Listeners and Persistence
// =============================================================================

#[derive(Default)]
struct Depth {
    current: usize,
    deepest: usize,
    operations: usize,
}

struct Shared(std::rc::Rc<std::cell::RefCell<Depth>>);

impl Listener for Shared {
    fn entering_block(&mut self, _: &Block, _: &MachineState) {
        let mut depth = self.0.borrow_mut();
        depth.current += 1;
        depth.deepest = depth.deepest.max(depth.current);
    }

    fn leaving_block(&mut self, _: &Block, _: &MachineState) {
        self.0.borrow_mut().current -= 1;
    }

    fn executing(&mut self, _: &Block, _: usize, _: &MachineState) {
        self.0.borrow_mut().operations += 1;
    }
}

#[test]
fn listener_sees_balanced_nesting() {
    let depth = std::rc::Rc::new(std::cell::RefCell::new(Depth::default()));
    let mut machine = machine(
        "value countdown block slots n {
            loadslot n; push number 0; eq; iftrue break
            push number 1; loadslot n; sub
            call countdown ()
        }
        value main block { push number 3; call countdown () }",
    );
    machine.add_listener(Box::new(Shared(depth.clone())));
    assert_eq!(machine.run(), Some(ExecResult::Success));

    let depth = depth.borrow();
    assert_eq!(depth.current, 0);
    assert_eq!(depth.deepest, 5);
    assert!(depth.operations > 0);
}

#[test]
fn image_round_trip_runs_the_same() {
    let source = "value main block { call twice (number 21) }
        value twice block slots x { loadslot x; loadslot x; add }
        value data tuple (string \"s\", character 'c', error not_found)";
    let original = machine(source);
    let image = original.serialize();

    let mut restored = MachineState::new();
    let loaded = restored.load_stream(&mut ByteStream::new(&image));
    assert_eq!(loaded, 3);
    assert_eq!(restored.serialize(), image);
    assert_eq!(restored.run(), Some(ExecResult::Success));
    assert_eq!(restored.stack().iter().cloned().collect::<Vec<_>>(), numbers(&[42]));
    assert_eq!(
        restored.store().get("data").and_then(Value::as_tuple).map(Tuple::len),
        Some(3)
    );
}
