//! Stack machine for Cairn.
//!
//! This crate provides:
//! - [`MachineState`] - Data stack, value store, slot tables and natives
//! - [`Execute`] - Execution of operations and blocks
//! - [`Listener`] - Observation of block execution, with [`TraceListener`]
//! - [`NativeLibrary`] - Host-provided operations
//! - [`MachineConfig`] - Run configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod exec;
pub mod listener;
pub mod native;
pub mod slots;
pub mod stack;
pub mod state;
pub mod store;

pub use config::MachineConfig;
pub use exec::{ExecResult, Execute, Fault, typecast};
pub use listener::{Listener, TraceListener};
pub use native::{NativeFn, NativeLibrary};
pub use slots::SlotStack;
pub use stack::Stack;
pub use state::MachineState;
pub use store::ValueStore;
