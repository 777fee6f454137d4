//! Loading and running binary images.

use std::fmt::Write as _;

use cairn_foundation::{ByteStream, Error, Result, Value};
use cairn_language::{PrettyConfig, Registry, pretty_program};
use cairn_machine::{ExecResult, MachineConfig, MachineState};
use tracing::info;

use crate::stdio::{STDIO_PATH, StdIo};

/// What a run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Values loaded from the image.
    pub loaded: usize,
    /// How the entry point finished.
    pub result: ExecResult,
    /// Final data stack, bottom first.
    pub stack: Vec<Value>,
}

impl RunOutcome {
    /// Returns true unless the entry point ended in an error.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !matches!(self.result, ExecResult::Error)
    }
}

/// Creates a machine for `config` with the standard natives provided.
#[must_use]
pub fn prepare_machine(config: MachineConfig) -> MachineState {
    let mut machine = MachineState::with_config(config);
    machine.provide_native(STDIO_PATH, &StdIo);
    machine
}

/// Loads `image` and executes the configured entry point.
///
/// # Errors
///
/// Returns an error if the entry point is missing from the image or is not
/// callable. Program errors are reported through [`RunOutcome::result`].
pub fn run_image(image: &[u8], config: MachineConfig) -> Result<RunOutcome> {
    let mut machine = prepare_machine(config);
    let loaded = machine.load_stream(&mut ByteStream::new(image));
    info!(loaded, "image loaded");

    let entry = machine.config().entry_point.clone();
    let Some(value) = machine.store().get(&entry) else {
        return Err(Error::undefined_value(entry));
    };
    if !value.is_callable() {
        return Err(Error::not_callable(entry));
    }
    let result = machine
        .run()
        .ok_or_else(|| Error::not_callable(entry.as_str()))?;

    let stack = std::mem::take(machine.stack_mut()).into_vec();
    Ok(RunOutcome {
        loaded,
        result,
        stack,
    })
}

/// Renders an image back to source, one `value` statement per entry.
///
/// # Errors
///
/// Returns an error if the image has the wrong version or fails to decode.
pub fn disassemble(image: &[u8]) -> Result<String> {
    let registry = Registry::standard();
    let mut stream = ByteStream::new(image);
    registry.read_header(&mut stream)?;
    let mut entries = Vec::new();
    while !stream.is_at_end() {
        entries.push(registry.decode_entry(&mut stream)?);
    }
    Ok(pretty_program(
        entries.iter().map(|(name, value)| (name.as_str(), value)),
        &PrettyConfig::listing(),
    ))
}

/// Formats a stack bottom first, one value per line.
#[must_use]
pub fn format_stack(stack: &[Value]) -> String {
    let mut out = String::new();
    for value in stack {
        let _ = writeln!(out, "{value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::Assembly;
    use cairn_foundation::ErrorCode;

    fn image(source: &str) -> Vec<u8> {
        let mut assembly = Assembly::new();
        assembly.add_source("test", source);
        assert!(!assembly.has_errors(), "{:?}", assembly.diagnostics());
        assembly.image()
    }

    #[test]
    fn runs_main() {
        let image = image("value main block { push number 2 push number 3 mul }");
        let outcome = run_image(&image, MachineConfig::default()).unwrap();
        assert_eq!(outcome.loaded, 1);
        assert_eq!(outcome.result, ExecResult::Success);
        assert_eq!(outcome.stack, vec![Value::Number(6)]);
    }

    #[test]
    fn alternate_entry_point() {
        let image = image("value start operation push number 9");
        let config = MachineConfig::default().with_entry_point("start");
        let outcome = run_image(&image, config).unwrap();
        assert_eq!(outcome.stack, vec![Value::Number(9)]);
    }

    #[test]
    fn missing_or_data_entry_is_an_error() {
        let image = image("value main number 1");
        assert!(run_image(&image, MachineConfig::default()).is_err());
        let config = MachineConfig::default().with_entry_point("nope");
        assert!(run_image(&image, config).is_err());
    }

    #[test]
    fn program_errors_are_outcomes() {
        let image = image("value main block { pop }");
        let outcome = run_image(&image, MachineConfig::default()).unwrap();
        assert!(!outcome.succeeded());
        assert_eq!(
            outcome.stack,
            vec![Value::Error(ErrorCode::InsufficientArguments)]
        );
    }

    #[test]
    fn natives_are_provided() {
        let image = image(r#"value main block { loadnative "cairn/io" push number 1 native io write }"#);
        let outcome = run_image(&image, MachineConfig::default()).unwrap();
        assert_eq!(outcome.result, ExecResult::Success);
        assert!(outcome.stack.is_empty());
    }

    #[test]
    fn disassembly_reparses_to_same_image() {
        let original = image("value a tuple (number 1, string \"x\")\nvalue main block slots n { loadslot n }");
        let listing = disassemble(&original).unwrap();
        assert_eq!(image(&listing), original);
    }

    #[test]
    fn disassemble_rejects_wrong_version() {
        assert!(disassemble(&[0xFF]).is_err());
    }

    #[test]
    fn disassemble_names_the_broken_entry() {
        let mut bytes = image("value a number 1");
        bytes.extend_from_slice(b"'b'Z");
        let err = disassemble(&bytes).unwrap_err();
        assert_eq!(err.offset(), Some(bytes.len() - 1));
        assert!(err.to_string().ends_with("(value b)"), "{err}");

        let err = err.in_source("prog.cbin");
        assert!(err.to_string().ends_with("in prog.cbin (value b)"), "{err}");
    }

    #[test]
    fn stack_format() {
        assert_eq!(
            format_stack(&[Value::Number(1), Value::from("a")]),
            "1\n\"a\"\n"
        );
    }
}
