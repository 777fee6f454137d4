//! The machine: stack, value store, slot tables, natives and listeners.
//!
//! # Example
//!
//! ```
//! use cairn_language::{Parser, Registry};
//! use cairn_machine::{ExecResult, MachineState};
//!
//! let mut machine = MachineState::new();
//! let registry = Registry::standard();
//! let mut parser = Parser::new("value main block { push number 2 push number 3 add }", &registry);
//! assert_eq!(machine.load_parser(&mut parser), 1);
//! assert_eq!(machine.run(), Some(ExecResult::Success));
//! assert_eq!(machine.stack().peek(), Some(&cairn_foundation::Value::Number(5)));
//! ```

use std::collections::HashMap;

use cairn_foundation::{Block, ByteStream, FORMAT_VERSION, Serializer, Value};
use cairn_language::{Parser, Registry};
use tracing::{debug, warn};

use crate::config::MachineConfig;
use crate::exec::{Execute, ExecResult, Fault};
use crate::listener::{Listener, TraceListener};
use crate::native::{Bucket, NativeFn, NativeLibrary};
use crate::slots::SlotStack;
use crate::stack::Stack;
use crate::store::ValueStore;

/// All state a program runs against.
pub struct MachineState {
    stack: Stack,
    store: ValueStore,
    slots: SlotStack,
    registry: Registry,
    listeners: Vec<Box<dyn Listener>>,
    provided: HashMap<String, Bucket>,
    active: HashMap<String, HashMap<String, NativeFn>>,
    config: MachineConfig,
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineState")
            .field("stack", &self.stack)
            .field("store", &self.store.len())
            .field("slot_depth", &self.slots.depth())
            .field("listeners", &self.listeners.len())
            .field("active_natives", &self.active.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl MachineState {
    /// Creates a machine with the default configuration and standard registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    /// Creates a machine from `config`.
    #[must_use]
    pub fn with_config(config: MachineConfig) -> Self {
        let mut machine = Self {
            stack: Stack::with_capacity(config.stack_capacity),
            store: ValueStore::new(),
            slots: SlotStack::new(),
            registry: Registry::standard(),
            listeners: Vec::new(),
            provided: HashMap::new(),
            active: HashMap::new(),
            config,
        };
        if machine.config.trace {
            machine.add_listener(Box::new(TraceListener::new()));
        }
        machine
    }

    /// Replaces the registry used for loading and runtime parsing.
    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// The registry used for loading and runtime parsing.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // =========================================================================
    // Stack
    // =========================================================================

    /// The data stack.
    #[must_use]
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Mutable access to the data stack.
    pub fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    /// Pushes a value.
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pops the top value.
    pub fn pop(&mut self) -> Option<Value> {
        self.stack.pop()
    }

    /// Restores a fault's operands in their original order and pushes its
    /// error.
    pub fn raise(&mut self, fault: Fault) {
        for operand in fault.operands.into_iter().rev() {
            self.stack.push(operand);
        }
        self.stack.push(Value::Error(fault.code));
    }

    // =========================================================================
    // Names and slots
    // =========================================================================

    /// The global value store.
    #[must_use]
    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    /// Mutable access to the global value store.
    pub fn store_mut(&mut self) -> &mut ValueStore {
        &mut self.store
    }

    /// Binds `name` if it is free. Returns false on collision.
    pub fn define(&mut self, name: impl Into<String>, value: Value) -> bool {
        self.store.define(name, value)
    }

    /// Binds `name`, replacing any previous value.
    pub fn redefine(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.store.redefine(name, value)
    }

    /// Slot tables of the live block activations.
    #[must_use]
    pub fn slots(&self) -> &SlotStack {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut SlotStack {
        &mut self.slots
    }

    // =========================================================================
    // Loading and saving
    // =========================================================================

    /// Loads named values from a binary image.
    ///
    /// Stops at the first entry that fails to decode or whose name is already
    /// bound, keeping everything loaded before it. An image with a different
    /// format version loads nothing. Returns the number of values loaded.
    pub fn load_stream(&mut self, stream: &mut ByteStream<'_>) -> usize {
        if let Err(err) = self.registry.read_header(stream) {
            warn!(%err, "image rejected");
            return 0;
        }
        let mut loaded = 0;
        while !stream.is_at_end() {
            let (name, value) = match self.registry.decode_entry(stream) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(%err, loaded, "decode failed, stopping load");
                    break;
                }
            };
            if !self.store.define(name.as_str(), value) {
                warn!(name = %name, loaded, "name already bound, stopping load");
                break;
            }
            loaded += 1;
        }
        debug!(loaded, "image loaded");
        loaded
    }

    /// Loads `value <name> <payload>` statements from a parser.
    ///
    /// Stops at the first statement that fails to parse or whose name is
    /// already bound. Parse errors stay in the parser. Returns the number of
    /// values loaded.
    pub fn load_parser(&mut self, parser: &mut Parser<'_>) -> usize {
        let mut loaded = 0;
        while !parser.is_at_end() {
            let Some((name, value)) = parser.parse_value() else {
                break;
            };
            if !self.store.define(name.as_str(), value) {
                warn!(name = %name, loaded, "name already bound, stopping load");
                break;
            }
            loaded += 1;
        }
        debug!(loaded, "source loaded");
        loaded
    }

    /// Writes the format version followed by every named value, in name order.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Serializer::new();
        out.write_byte(FORMAT_VERSION);
        self.store.serialize_into(&mut out);
        out.into_bytes()
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Executes the named value if it is callable.
    ///
    /// Returns `None` when the name is unbound or not callable.
    pub fn execute(&mut self, name: &str) -> Option<ExecResult> {
        let callable = self.store.get(name)?.as_callable()?.clone();
        debug!(name, "executing");
        let result = callable.execute(self);
        debug!(name, ?result, depth = self.stack.len(), "finished");
        Some(result)
    }

    /// Executes the configured entry point.
    pub fn run(&mut self) -> Option<ExecResult> {
        let entry = self.config.entry_point.clone();
        self.execute(&entry)
    }

    // =========================================================================
    // Natives
    // =========================================================================

    /// Makes `library` loadable under `path`.
    pub fn provide_native(&mut self, path: impl Into<String>, library: &dyn NativeLibrary) {
        self.provided.insert(path.into(), Bucket::from_library(library));
    }

    /// Activates the library provided under `path`. Returns false if none is.
    pub fn activate_native(&mut self, path: &str) -> bool {
        let Some(bucket) = self.provided.get(path) else {
            return false;
        };
        debug!(path, bucket = %bucket.name, "native library loaded");
        self.active
            .entry(bucket.name.clone())
            .or_default()
            .extend(bucket.operations.iter().map(|(k, v)| (k.clone(), *v)));
        true
    }

    /// Looks up an activated native operation.
    #[must_use]
    pub fn native(&self, bucket: &str, name: &str) -> Option<NativeFn> {
        self.active.get(bucket)?.get(name).copied()
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Registers an execution observer.
    pub fn add_listener(&mut self, listener: Box<dyn Listener>) {
        self.listeners.push(listener);
    }

    pub(crate) fn notify_entering(&mut self, block: &Block) {
        self.notify(|listener, machine| listener.entering_block(block, machine));
    }

    pub(crate) fn notify_leaving(&mut self, block: &Block) {
        self.notify(|listener, machine| listener.leaving_block(block, machine));
    }

    pub(crate) fn notify_executing(&mut self, block: &Block, index: usize) {
        self.notify(|listener, machine| listener.executing(block, index, machine));
    }

    fn notify(&mut self, mut event: impl FnMut(&mut dyn Listener, &Self)) {
        if self.listeners.is_empty() {
            return;
        }
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            event(listener.as_mut(), self);
        }
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }
}
