//! Assembler and runner front ends for Cairn.
//!
//! This crate provides:
//! - [`Assembly`] - Assembly of text sources into one binary image
//! - [`run_image`] - Loading and execution of an image
//! - [`disassemble`] - Rendering of an image back to source
//! - [`StdIo`] - Standard output natives provided to every run
//! - [`init_logging`] - `tracing` setup shared by the binaries

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod assembler;
pub mod logging;
pub mod runner;
pub mod stdio;

pub use assembler::{Assembly, Diagnostic, SourceReport};
pub use logging::{LOG_ENV, init_logging};
pub use runner::{RunOutcome, disassemble, format_stack, prepare_machine, run_image};
pub use stdio::{STDIO_PATH, StdIo};
