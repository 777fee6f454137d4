//! Integration tests for Layer 2: Machine
//!
//! Tests whole programs loaded from source: control flow, combinators, error
//! discipline, natives and image persistence.

mod errors;
mod programs;
mod support;
