//! Integration tests for Layer 3: Runtime
//!
//! Tests the assembler and runner working through files on disk.

mod files;
