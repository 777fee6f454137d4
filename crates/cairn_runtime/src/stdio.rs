//! Standard output natives.
//!
//! Programs reach these with `loadnative "cairn/io"` followed by
//! `native io print` or `native io write`.

use cairn_foundation::{ErrorCode, Value};
use cairn_machine::{ExecResult, Fault, MachineState, NativeFn, NativeLibrary};

/// Path under which [`StdIo`] is provided by the runner.
pub const STDIO_PATH: &str = "cairn/io";

/// Natives that write values to standard output.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdIo;

impl NativeLibrary for StdIo {
    fn bucket(&self) -> &str {
        "io"
    }

    fn operations(&self) -> Vec<(&'static str, NativeFn)> {
        vec![("print", print), ("write", write)]
    }
}

/// Text written for a value: strings and atoms raw, everything else as
/// displayed.
#[must_use]
pub fn render(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}

/// Pops a value and prints it followed by a newline.
fn print(machine: &mut MachineState) -> ExecResult {
    match machine.pop() {
        Some(value) => {
            println!("{}", render(&value));
            ExecResult::Success
        }
        None => missing_operand(machine),
    }
}

/// Pops a value and prints it without a newline.
fn write(machine: &mut MachineState) -> ExecResult {
    match machine.pop() {
        Some(value) => {
            print!("{}", render(&value));
            ExecResult::Success
        }
        None => missing_operand(machine),
    }
}

fn missing_operand(machine: &mut MachineState) -> ExecResult {
    machine.raise(Fault::bare(ErrorCode::InsufficientArguments));
    ExecResult::Error
}
