//! Host-provided native operations.
//!
//! Hosts register a [`NativeLibrary`] under a path with
//! [`MachineState::provide_native`]. A program activates it with
//! `loadnative "<path>"`, after which `native <bucket> <name>` calls into it.

use std::collections::HashMap;

use crate::exec::ExecResult;
use crate::state::MachineState;

/// A native operation. It manages the stack itself and reports its outcome
/// like any other operation.
pub type NativeFn = fn(&mut MachineState) -> ExecResult;

/// A named group of native operations.
pub trait NativeLibrary {
    /// Bucket name used by `native <bucket> <name>`.
    fn bucket(&self) -> &str;

    /// The operations this library exports.
    fn operations(&self) -> Vec<(&'static str, NativeFn)>;
}

/// Snapshot of a library's exports, keyed by operation name.
#[derive(Clone, Debug, Default)]
pub(crate) struct Bucket {
    pub(crate) name: String,
    pub(crate) operations: HashMap<String, NativeFn>,
}

impl Bucket {
    pub(crate) fn from_library(library: &dyn NativeLibrary) -> Self {
        Self {
            name: library.bucket().to_string(),
            operations: library
                .operations()
                .into_iter()
                .map(|(name, function)| (name.to_string(), function))
                .collect(),
        }
    }
}
