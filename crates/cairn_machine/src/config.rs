//! Configuration for a machine run.

/// Entry point executed when no other name is given.
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Configuration for a [`crate::MachineState`].
#[derive(Clone, Debug)]
pub struct MachineConfig {
    /// Install a [`crate::TraceListener`] that logs every executed operation.
    pub trace: bool,
    /// Initial capacity reserved for the data stack.
    pub stack_capacity: usize,
    /// Name of the value executed by [`crate::MachineState::run`].
    pub entry_point: String,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            trace: false,
            stack_capacity: 256,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }
}

impl MachineConfig {
    /// Creates a configuration with tracing enabled.
    #[must_use]
    pub fn traced() -> Self {
        Self {
            trace: true,
            ..Self::default()
        }
    }

    /// Builder method to set tracing.
    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Builder method to set the initial stack reservation.
    #[must_use]
    pub fn with_stack_capacity(mut self, capacity: usize) -> Self {
        self.stack_capacity = capacity;
        self
    }

    /// Builder method to set the entry point.
    #[must_use]
    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }
}
