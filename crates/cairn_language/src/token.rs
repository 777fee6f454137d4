//! Token types for Cairn assembly source.
//!
//! Tokens are the output of the lexer and input to the parser.

use std::fmt;

/// Where a token starts in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset.
    pub offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Position {
    /// The first character of the input.
    #[must_use]
    pub const fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub position: Position,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// Token types for Cairn assembly source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `->`
    Arrow,

    // Literals
    /// Keyword or name, like `value`, `push` or `$a`.
    Identifier(String),
    /// Decimal or `0x` hexadecimal integer.
    Integer(u64),
    /// Quoted string with escapes resolved.
    String(String),
    /// `'c'` or `\uXXXX` character literal.
    Character(u32),

    // Meta
    /// `#` comment up to the end of the line.
    Comment(String),
    /// End of input
    Eof,
    /// Lexer error
    Error(String),
}

impl TokenKind {
    /// Returns true if this token kind should be ignored during parsing.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::Comment(_))
    }

    /// Returns true if this is the identifier `word`.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Self::Identifier(name) if name == word)
    }

    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Comma => "','",
            Self::Semicolon => "';'",
            Self::Arrow => "'->'",
            Self::Identifier(_) => "identifier",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::Character(_) => "character",
            Self::Comment(_) => "comment",
            Self::Eof => "end of input",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::LBracket => f.write_str("["),
            Self::RBracket => f.write_str("]"),
            Self::LBrace => f.write_str("{"),
            Self::RBrace => f.write_str("}"),
            Self::Comma => f.write_str(","),
            Self::Semicolon => f.write_str(";"),
            Self::Arrow => f.write_str("->"),
            Self::Identifier(name) => f.write_str(name),
            Self::Integer(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Character(c) => write!(f, "\\u{c:04X}"),
            Self::Comment(text) => f.write_str(text),
            Self::Eof => f.write_str("<eof>"),
            Self::Error(msg) => write!(f, "<error: {msg}>"),
        }
    }
}
