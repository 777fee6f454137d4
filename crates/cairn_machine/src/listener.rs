//! Execution observers.
//!
//! A [`Listener`] is told when a block activation starts and ends and before
//! each operation runs. Listeners observe only; they cannot alter the run.

use cairn_foundation::Block;
use tracing::trace;

use crate::state::MachineState;

/// Observer of block execution. Every method defaults to doing nothing.
pub trait Listener {
    /// A block activation is starting.
    fn entering_block(&mut self, _block: &Block, _machine: &MachineState) {}

    /// A block activation has ended, whatever the exit path.
    fn leaving_block(&mut self, _block: &Block, _machine: &MachineState) {}

    /// The operation at `index` of `block` is about to run.
    fn executing(&mut self, _block: &Block, _index: usize, _machine: &MachineState) {}
}

/// Logs block entry/exit and every executed operation at `trace` level.
#[derive(Debug, Default)]
pub struct TraceListener {
    depth: usize,
}

impl TraceListener {
    /// Creates a trace listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current block nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Listener for TraceListener {
    fn entering_block(&mut self, block: &Block, machine: &MachineState) {
        self.depth += 1;
        trace!(
            depth = self.depth,
            slots = block.slots().len(),
            stack = machine.stack().len(),
            "entering block"
        );
    }

    fn leaving_block(&mut self, _block: &Block, machine: &MachineState) {
        trace!(depth = self.depth, stack = machine.stack().len(), "leaving block");
        self.depth = self.depth.saturating_sub(1);
    }

    fn executing(&mut self, block: &Block, index: usize, machine: &MachineState) {
        if let Some(op) = block.get(index) {
            trace!(
                depth = self.depth,
                index,
                stack = machine.stack().len(),
                top = ?machine.stack().peek(),
                "{op}"
            );
        }
    }
}
