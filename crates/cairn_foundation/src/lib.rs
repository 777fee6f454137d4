//! Core types, values, and persistent collections for Cairn.
//!
//! This crate provides:
//! - [`Value`] - The core value type for all Cairn data
//! - [`Operation`] - The instruction tree, including [`Block`] and [`PartialBind`]
//! - [`ValueType`] / [`OperationType`] - Type tags, wire markers and keywords
//! - [`Error`] / [`ErrorCode`] - Host errors and in-program error values
//! - Persistent collections ([`Tuple`], [`Table`], [`Set`])
//! - [`ByteStream`] / [`Serializer`] and [`Encode`] for the binary image format

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod capability;
pub mod collections;
pub mod encode;
pub mod error;
pub mod operation;
pub mod stream;
pub mod types;
pub mod value;

pub use capability::{Appendable, Iterable, Rejected};
pub use collections::{Set, Table, Tuple};
pub use encode::{Encode, FORMAT_VERSION};
pub use error::{Error, ErrorCode, ErrorContext, ErrorKind, Result, UnknownErrorCode};
pub use operation::{Block, Operation, PartialBind};
pub use stream::{ByteStream, Serializer, MAX_NESTING};
pub use types::{OperationType, ValueType};
pub use value::Value;
