//! Byte-level input and output for the binary image format.
//!
//! [`ByteStream`] is a forward-only cursor over either a borrowed slice or a
//! file read into memory. [`Serializer`] is the matching append-only writer.
//! Multi-byte numbers are big-endian; identifiers are delimited by `'`.

use std::borrow::Cow;
use std::path::Path;

use crate::error::{Error, Result};

/// Delimiter that opens and closes an identifier.
pub const IDENTIFIER_DELIMITER: u8 = b'\'';

/// Deepest nesting of values and operations a reader will follow.
///
/// The binary decoder and the text parser share this bound.
pub const MAX_NESTING: usize = 128;

/// Forward-only reader over an image.
#[derive(Debug, Clone)]
pub struct ByteStream<'a> {
    bytes: Cow<'a, [u8]>,
    position: usize,
    depth: usize,
}

impl<'a> ByteStream<'a> {
    /// Creates a stream that borrows `bytes`.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes: Cow::Borrowed(bytes),
            position: 0,
            depth: 0,
        }
    }

    /// Creates a stream that owns `bytes`.
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> ByteStream<'static> {
        ByteStream {
            bytes: Cow::Owned(bytes),
            position: 0,
            depth: 0,
        }
    }

    /// Reads a whole file into a new stream.
    ///
    /// The file is read into memory in one go and closed before this returns.
    /// It is not memory-mapped, so the stream holds no handle on the file.
    ///
    /// # Errors
    /// Returns an I/O error when the file cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<ByteStream<'static>> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::io(format!("{}: {e}", path.display())))?;
        Ok(ByteStream::from_vec(bytes))
    }

    /// Enters one level of nesting.
    ///
    /// Pair every successful call with [`ByteStream::leave`].
    ///
    /// # Errors
    /// Returns a decode error once [`MAX_NESTING`] levels are open.
    pub fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return Err(Error::decode(self.position, "nesting too deep"));
        }
        self.depth += 1;
        Ok(())
    }

    /// Leaves a level opened by [`ByteStream::enter`].
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Current read offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.position
    }

    /// Number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Returns true once every byte has been consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.bytes.len()
    }

    /// Returns true if at least `count` bytes remain.
    #[must_use]
    pub fn has_at_least(&self, count: usize) -> bool {
        self.remaining() >= count
    }

    /// Returns the next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    /// Consumes one byte.
    ///
    /// # Errors
    /// Returns a decode error at end of stream.
    pub fn next_byte(&mut self) -> Result<u8> {
        let byte = self
            .peek()
            .ok_or_else(|| Error::decode(self.position, "unexpected end of stream"))?;
        self.position += 1;
        Ok(byte)
    }

    /// Consumes `count` bytes.
    ///
    /// # Errors
    /// Returns a decode error if fewer bytes remain.
    pub fn read_bytes(&mut self, count: usize) -> Result<&[u8]> {
        if !self.has_at_least(count) {
            return Err(Error::decode(
                self.position,
                format!("needed {count} bytes, {} remain", self.remaining()),
            ));
        }
        let start = self.position;
        self.position += count;
        Ok(&self.bytes[start..self.position])
    }

    /// Reads a big-endian unsigned integer of `width` bytes (at most 8).
    ///
    /// # Errors
    /// Returns a decode error on a bad width or truncated input.
    pub fn read_number(&mut self, width: usize) -> Result<u64> {
        if width == 0 || width > 8 {
            return Err(Error::decode(
                self.position,
                format!("invalid number width {width}"),
            ));
        }
        Ok(self
            .read_bytes(width)?
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    /// Reads an 8-byte length or count and checks it fits in memory.
    ///
    /// # Errors
    /// Returns a decode error on truncated input.
    pub fn read_length(&mut self) -> Result<usize> {
        let offset = self.position;
        let length = self.read_number(8)?;
        usize::try_from(length).map_err(|_| Error::decode(offset, "length exceeds address space"))
    }

    /// Reads a single-byte boolean.
    ///
    /// # Errors
    /// Returns a decode error at end of stream.
    pub fn read_boolean(&mut self) -> Result<bool> {
        Ok(self.next_byte()? != 0)
    }

    /// Reads bytes up to (not including) `delimiter`, consuming the delimiter.
    ///
    /// # Errors
    /// Returns a decode error if the delimiter never appears.
    pub fn read_until(&mut self, delimiter: u8) -> Result<&[u8]> {
        let start = self.position;
        let Some(length) = self.bytes[start..].iter().position(|b| *b == delimiter) else {
            return Err(Error::decode(start, "unterminated field"));
        };
        self.position = start + length + 1;
        Ok(&self.bytes[start..start + length])
    }

    /// Reads a `'name'` identifier.
    ///
    /// # Errors
    /// Returns a decode error on a missing delimiter or invalid UTF-8.
    pub fn read_identifier(&mut self) -> Result<String> {
        let offset = self.position;
        let opening = self.next_byte()?;
        if opening != IDENTIFIER_DELIMITER {
            return Err(Error::decode(offset, "expected identifier"));
        }
        self.read_identifier_body()
    }

    /// Reads the rest of an identifier whose opening `'` was already consumed.
    ///
    /// # Errors
    /// Returns a decode error on a missing delimiter or invalid UTF-8.
    pub fn read_identifier_body(&mut self) -> Result<String> {
        let offset = self.position;
        let raw = self.read_until(IDENTIFIER_DELIMITER)?;
        String::from_utf8(raw.to_vec()).map_err(|_| Error::decode(offset, "identifier is not UTF-8"))
    }

    /// Reads an 8-byte length followed by that many UTF-8 bytes.
    ///
    /// # Errors
    /// Returns a decode error on truncated input or invalid UTF-8.
    pub fn read_data(&mut self) -> Result<String> {
        let length = self.read_length()?;
        let offset = self.position;
        let raw = self.read_bytes(length)?;
        String::from_utf8(raw.to_vec()).map_err(|_| Error::decode(offset, "string is not UTF-8"))
    }
}

/// Append-only writer for the binary image format.
#[derive(Debug, Default, Clone)]
pub struct Serializer {
    bytes: Vec<u8>,
}

impl Serializer {
    /// Creates an empty serializer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one raw byte.
    pub fn write_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Appends the low `width` bytes of `value`, big-endian.
    pub fn write_number(&mut self, value: u64, width: usize) {
        debug_assert!((1..=8).contains(&width));
        let be = value.to_be_bytes();
        self.bytes.extend_from_slice(&be[8 - width..]);
    }

    /// Appends a length or count as 8 bytes.
    pub fn write_length(&mut self, length: usize) {
        self.write_number(length as u64, 8);
    }

    /// Appends a single-byte boolean.
    pub fn write_boolean(&mut self, value: bool) {
        self.bytes.push(u8::from(value));
    }

    /// Appends a `'name'` identifier.
    pub fn write_identifier(&mut self, name: &str) {
        self.bytes.push(IDENTIFIER_DELIMITER);
        self.bytes.extend_from_slice(name.as_bytes());
        self.bytes.push(IDENTIFIER_DELIMITER);
    }

    /// Appends an 8-byte length followed by the UTF-8 bytes of `data`.
    pub fn write_data(&mut self, data: &str) {
        self.write_length(data.len());
        self.bytes.extend_from_slice(data.as_bytes());
    }

    /// Bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the serializer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
