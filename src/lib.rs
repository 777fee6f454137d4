//! Cairn - stack machine with a textual assembly language and a binary image
//! format.
//!
//! This crate re-exports all layers of the Cairn system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: cairn_runtime     - Assembler and runner front ends, logging setup
//! Layer 2: cairn_machine     - Machine state, operation execution, natives
//! Layer 1: cairn_language    - Lexer, parser, loader registry, pretty-printer
//! Layer 0: cairn_foundation  - Values, operations, errors, byte streams
//! ```

pub use cairn_foundation as foundation;
pub use cairn_language as language;
pub use cairn_machine as machine;
pub use cairn_runtime as runtime;
