//! Error types for the Cairn system.
//!
//! Two families live here:
//! - [`Error`] / [`ErrorKind`] are host-level failures (I/O, decoding, parsing)
//!   reported to the embedding program through `Result`.
//! - [`ErrorCode`] is the closed taxonomy of in-program errors. These are
//!   first-class values pushed on the data stack, never Rust errors.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Result type for Cairn host operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Cairn host operations.
#[derive(Debug, Error)]
#[error("{kind}{}", .context.as_ref().map(|c| format!(" {c}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Records the file or image the error came from, keeping any value name
    /// already attached.
    #[must_use]
    pub fn in_source(mut self, source: impl Into<String>) -> Self {
        self.context.get_or_insert_with(ErrorContext::new).source = Some(source.into());
        self
    }

    /// Creates a binary decode error at the given stream offset.
    #[must_use]
    pub fn decode(offset: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode {
            offset,
            message: message.into(),
        })
    }

    /// Creates a format version mismatch error.
    #[must_use]
    pub fn version_mismatch(expected: u8, found: u8) -> Self {
        Self::new(ErrorKind::VersionMismatch { expected, found })
    }

    /// Creates a textual parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse {
            message: message.into(),
            context: context.into(),
        })
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io(message.into()))
    }

    /// Creates an undefined value error.
    #[must_use]
    pub fn undefined_value(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedValue(name.into()))
    }

    /// Creates a not-callable error.
    #[must_use]
    pub fn not_callable(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotCallable(name.into()))
    }

    /// Returns the stream offset for decode errors.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match &self.kind {
            ErrorKind::Decode { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Malformed or truncated binary input.
    #[error("decode error at offset {offset}: {message}")]
    Decode {
        /// Byte offset where decoding failed.
        offset: usize,
        /// Description of the failure.
        message: String,
    },

    /// The binary image was written by an incompatible format version.
    #[error("format version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// The version this build understands.
        expected: u8,
        /// The version found in the stream.
        found: u8,
    },

    /// Parse error in textual source.
    #[error("parse error: {message} (near `{context}`)")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// The trailing tokens consumed before the error.
        context: String,
    },

    /// File system or stream failure.
    #[error("i/o error: {0}")]
    Io(String),

    /// A named value was not present in the value store.
    #[error("undefined value: {0}")]
    UndefinedValue(String),

    /// A named value exists but cannot be executed.
    #[error("value is not callable: {0}")]
    NotCallable(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file or image name.
    pub source: Option<String>,
    /// Name of the top-level value being processed.
    pub value: Option<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source file.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the top-level value name.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
        }
        if let Some(value) = &self.value {
            if self.source.is_some() {
                write!(f, " ")?;
            }
            write!(f, "(value {value})")?;
        }
        Ok(())
    }
}

/// In-program error codes carried by `Value::Error`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ErrorCode {
    /// A name, key or element was not found.
    NotFound = 1,
    /// An operand had the wrong type.
    TypeMismatch = 2,
    /// Fewer operands on the stack than the operation needs.
    InsufficientArguments = 3,
    /// Index outside the container.
    OutOfBounds = 4,
    /// Name already bound.
    AlreadyExisting = 5,
    /// Division or modulo by zero.
    DivByZero = 6,
    /// A callable produced an unusable result.
    UnexpectedResult = 7,
    /// Text could not be parsed.
    SyntaxError = 8,
    /// The requested behaviour is not available.
    NotImplemented = 9,
}

impl ErrorCode {
    /// Every error code, in numeric order.
    pub const ALL: [ErrorCode; 9] = [
        Self::NotFound,
        Self::TypeMismatch,
        Self::InsufficientArguments,
        Self::OutOfBounds,
        Self::AlreadyExisting,
        Self::DivByZero,
        Self::UnexpectedResult,
        Self::SyntaxError,
        Self::NotImplemented,
    ];

    /// Returns the wire byte for this code.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Decodes a wire byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.to_byte() == byte)
    }

    /// Returns the textual token for this code.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::TypeMismatch => "type_mismatch",
            Self::InsufficientArguments => "insufficient_arguments",
            Self::OutOfBounds => "out_of_bounds",
            Self::AlreadyExisting => "already_existing",
            Self::DivByZero => "div_by_zero",
            Self::UnexpectedResult => "unexpected_result",
            Self::SyntaxError => "syntax_error",
            Self::NotImplemented => "not_implemented",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Returned when a token names no known error code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.token().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}
