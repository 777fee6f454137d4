//! Lexer, parser, loader registry and pretty-printer for Cairn assembly.
//!
//! This crate provides:
//! - [`Lexer`] - Tokenization of Cairn assembly source
//! - [`Parser`] - Error-collecting parser for values and operations
//! - [`Registry`] - Marker, tag and keyword tables that decode binary images
//!   and parse text through the same loaders
//! - [`pretty`] - Rendering of values back to source

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod registry;
pub mod token;

pub use lexer::Lexer;
pub use parser::{ParseError, Parser, parse_payload};
pub use pretty::{PrettyConfig, pretty_operation, pretty_program, pretty_value};
pub use registry::{OperationLoader, Registry, ValueLoader};
pub use token::{Position, Token, TokenKind};
