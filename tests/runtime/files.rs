//! Integration tests for assembling and running image files

use std::fs;

use cairn_foundation::{ErrorCode, Value};
use cairn_machine::{ExecResult, MachineConfig};
use cairn_runtime::{Assembly, disassemble, format_stack, run_image};
use tempfile::TempDir;

const LIBRARY: &str = "# helpers
value square block slots x { loadslot x; loadslot x; mul }
value greeting string \"hello\"
";

const PROGRAM: &str = "value main block {
    call square (number 7)
    loadnative \"cairn/io\"
    load greeting
    native io print
}
";

fn write_sources(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let library = dir.path().join("library.cairn-asm");
    let program = dir.path().join("program.cairn-asm");
    fs::write(&library, LIBRARY).unwrap();
    fs::write(&program, PROGRAM).unwrap();
    (library, program)
}

#[test]
fn assemble_write_and_run() {
    let dir = TempDir::new().unwrap();
    let (library, program) = write_sources(&dir);

    let mut assembly = Assembly::new();
    assert_eq!(assembly.add_file(&library).unwrap().loaded, 2);
    assert_eq!(assembly.add_file(&program).unwrap().loaded, 1);
    assert!(!assembly.has_errors());

    let image_path = dir.path().join("out.cairn");
    assembly.write_to(&image_path).unwrap();
    let image = fs::read(&image_path).unwrap();
    assert_eq!(image, assembly.image());

    let outcome = run_image(&image, MachineConfig::default()).unwrap();
    assert_eq!(outcome.loaded, 3);
    assert_eq!(outcome.result, ExecResult::Success);
    assert_eq!(outcome.stack, vec![Value::Number(49)]);
    assert_eq!(format_stack(&outcome.stack), "49\n");
}

#[test]
fn traced_run_gives_same_outcome() {
    let mut assembly = Assembly::new();
    assembly.add_source("inline", "value main block { push number 2; dup; add }");
    let image = assembly.image();
    let plain = run_image(&image, MachineConfig::default()).unwrap();
    let traced = run_image(&image, MachineConfig::traced()).unwrap();
    assert_eq!(plain, traced);
}

#[test]
fn errors_report_their_source() {
    let dir = TempDir::new().unwrap();
    let (library, _) = write_sources(&dir);
    let broken = dir.path().join("broken.cairn-asm");
    fs::write(&broken, "value square number 1\nvalue ok number 2").unwrap();

    let mut assembly = Assembly::new();
    assembly.add_file(&library).unwrap();
    let report = assembly.add_file(&broken).unwrap().clone();
    assert_eq!(report.loaded, 1);
    assert_eq!(report.errors, 1);
    let diagnostic = &assembly.diagnostics()[0];
    assert!(diagnostic.source.ends_with("broken.cairn-asm"));
    assert!(diagnostic.message.contains("square"));
}

#[test]
fn failing_program_outcome() {
    let mut assembly = Assembly::new();
    assembly.add_source("inline", "value main block { load nowhere }");
    let outcome = run_image(&assembly.image(), MachineConfig::default()).unwrap();
    assert!(!outcome.succeeded());
    assert_eq!(outcome.stack, vec![Value::Error(ErrorCode::NotFound)]);
}

#[test]
fn disassembled_file_reassembles() {
    let dir = TempDir::new().unwrap();
    let (library, program) = write_sources(&dir);
    let mut assembly = Assembly::new();
    assembly.add_file(&library).unwrap();
    assembly.add_file(&program).unwrap();
    let image = assembly.image();

    let listing = disassemble(&image).unwrap();
    let listing_path = dir.path().join("listing.cairn-asm");
    fs::write(&listing_path, &listing).unwrap();

    let mut again = Assembly::new();
    again.add_file(&listing_path).unwrap();
    assert!(!again.has_errors(), "{:?}", again.diagnostics());
    assert_eq!(again.image(), image);
}

#[test]
fn truncated_image_loads_a_prefix() {
    let mut assembly = Assembly::new();
    assembly.add_source("inline", "value a number 1\nvalue main block { push number 3 }");
    let image = assembly.image();
    let outcome = run_image(&image[..image.len() - 2], MachineConfig::default());
    assert!(outcome.is_err(), "main was cut off, so it cannot run");
}
