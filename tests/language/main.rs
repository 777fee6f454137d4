//! Integration tests for Layer 1: Language
//!
//! Tests for the assembly grammar, the pretty-printer and the registry
//! decoders working together.

mod grammar;
mod images;
