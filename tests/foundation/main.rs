//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, the container capabilities, error codes and
//! the byte-level stream primitives.

mod streams;
mod values;
