//! Binary encoding of values and operations.
//!
//! Every value starts with the marker byte of its [`ValueType`]; atoms reuse
//! the identifier delimiter as their marker. Every operation starts with its
//! 4-byte [`OperationType`] tag. Decoding is table driven and lives with the
//! registry in `cairn_language`.
//!
//! [`OperationType`]: crate::types::OperationType

use crate::collections::{Set, Table, Tuple};
use crate::operation::Operation;
use crate::stream::Serializer;
use crate::value::Value;

/// Version byte written at the start of every image.
pub const FORMAT_VERSION: u8 = 1;

/// Width in bytes of an encoded number.
pub const NUMBER_WIDTH: usize = 8;

/// Width in bytes of an encoded character.
pub const CHARACTER_WIDTH: usize = 4;

/// Width in bytes of an operation tag.
pub const TAG_WIDTH: usize = 4;

/// Types that can write themselves into an image.
pub trait Encode {
    /// Appends the encoding of `self` to `out`.
    fn encode(&self, out: &mut Serializer);

    /// Encodes `self` into a fresh buffer.
    #[must_use]
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Serializer::new();
        self.encode(&mut out);
        out.into_bytes()
    }
}

impl Encode for Value {
    fn encode(&self, out: &mut Serializer) {
        match self {
            Self::Atom(name) => {
                out.write_identifier(name);
                return;
            }
            // Blocks and binds are written under the operation marker.
            _ => out.write_byte(self.value_type().marker().unwrap_or(b'O')),
        }
        match self {
            Self::Empty | Self::Atom(_) => {}
            Self::Number(n) => out.write_number(*n, NUMBER_WIDTH),
            Self::Boolean(b) => out.write_boolean(*b),
            Self::Character(c) => out.write_number(u64::from(*c), CHARACTER_WIDTH),
            Self::String(s) => out.write_data(s),
            Self::Error(code) => out.write_byte(code.to_byte()),
            Self::Type(t) => out.write_byte(t.code()),
            Self::Tuple(t) => encode_tuple_payload(t, out),
            Self::Table(t) => encode_table_payload(t, out),
            Self::Set(s) => encode_set_payload(s, out),
            Self::Operation(op) => op.encode(out),
        }
    }
}

/// Writes a tuple without its marker.
pub fn encode_tuple_payload(tuple: &Tuple, out: &mut Serializer) {
    out.write_length(tuple.len());
    for value in tuple {
        value.encode(out);
    }
}

/// Writes a table without its marker.
pub fn encode_table_payload(table: &Table, out: &mut Serializer) {
    out.write_length(table.len());
    for (key, value) in table.iter() {
        key.encode(out);
        value.encode(out);
    }
}

/// Writes a set without its marker.
pub fn encode_set_payload(set: &Set, out: &mut Serializer) {
    out.write_length(set.len());
    for value in set.iter() {
        value.encode(out);
    }
}

impl Encode for Operation {
    fn encode(&self, out: &mut Serializer) {
        out.write_number(u64::from(self.operation_type().tag()), TAG_WIDTH);
        match self {
            Self::Push(value) => value.encode(out),
            Self::IfTrue(inner) => inner.encode(out),
            Self::Select { cases, otherwise } => {
                encode_table_payload(cases, out);
                out.write_boolean(otherwise.is_some());
                if let Some(otherwise) = otherwise {
                    otherwise.encode(out);
                }
            }
            Self::Load(name)
            | Self::Store(name)
            | Self::Clear(name)
            | Self::LoadSlot(name)
            | Self::StoreSlot(name) => out.write_identifier(name),
            Self::Call { target, args } => {
                out.write_identifier(target);
                encode_tuple_payload(args, out);
            }
            Self::LoadNative(path) => out.write_data(path),
            Self::Native { bucket, name } => {
                out.write_identifier(bucket);
                out.write_identifier(name);
            }
            Self::Block(block) => {
                out.write_length(block.num_slot_values());
                for slot in block.slots() {
                    out.write_identifier(slot);
                }
                out.write_length(block.len());
                for op in block.operations() {
                    op.encode(out);
                }
            }
            Self::PartialBind(bind) => {
                bind.value().encode(out);
                bind.callable().encode(out);
            }
            _ => {}
        }
    }
}
