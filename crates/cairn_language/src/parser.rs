//! Parser for Cairn assembly source.
//!
//! The parser drives the lexer with one token of lookahead and hands every
//! payload to the [`Registry`], which owns the grammar of each value kind and
//! operation. Errors are collected rather than returned: a failing parse
//! function records a [`ParseError`] and yields `None`, leaving the caller to
//! decide whether to continue with the next top-level statement.

use std::collections::VecDeque;
use std::fmt;

use cairn_foundation::{Error, MAX_NESTING, Operation, Value};

use crate::lexer::Lexer;
use crate::registry::Registry;
use crate::token::{Position, Token, TokenKind};

/// Number of consumed tokens kept for error context.
const CONTEXT_TOKENS: usize = 8;

/// A recorded parse failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// The last few tokens consumed before the failure, space separated.
    pub context: String,
    /// Where the offending token starts.
    pub position: Position,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (after `{}`)", self.position, self.message, self.context)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::parse(format!("{}: {}", err.position, err.message), err.context)
    }
}

/// Parser for Cairn assembly source.
pub struct Parser<'a> {
    /// The lexer providing tokens.
    lexer: Lexer<'a>,
    /// Grammar for values and operations.
    registry: &'a Registry,
    /// Current token (lookahead).
    current: Token,
    /// Text of the most recently consumed tokens.
    history: VecDeque<String>,
    /// Errors recorded so far.
    errors: Vec<ParseError>,
    /// Payloads and operations currently open.
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'a str, registry: &'a Registry) -> Self {
        let mut lexer = Lexer::new(source);
        let current = next_significant(&mut lexer);
        Self {
            lexer,
            registry,
            current,
            history: VecDeque::with_capacity(CONTEXT_TOKENS),
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// The registry this parser dispatches through.
    #[must_use]
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Parses one `value <identifier> <payload>` statement.
    pub fn parse_value(&mut self) -> Option<(String, Value)> {
        if !self.next_if_word("value") {
            return self.fail(format!(
                "expected 'value', found {}",
                self.current.kind.name()
            ));
        }
        let name = self.expect_identifier("value name")?;
        let value = self.parse_value_payload()?;
        Some((name, value))
    }

    /// Parses a value payload such as `number 5` or `tuple (empty,)`.
    ///
    /// Fails with "nesting too deep" past [`MAX_NESTING`] open payloads and
    /// operations.
    pub fn parse_value_payload(&mut self) -> Option<Value> {
        self.enter()?;
        let value = self.value_payload();
        self.depth -= 1;
        value
    }

    fn value_payload(&mut self) -> Option<Value> {
        let keyword = self.expect_identifier("value type")?;
        let Some(loader) = self.registry.value_by_keyword(&keyword) else {
            return self.fail(format!("unknown value type '{keyword}'"));
        };
        (loader.parse)(self)
    }

    /// Parses an operation such as `push number 1` or `block { dup }`.
    ///
    /// Shares the nesting bound of [`Parser::parse_value_payload`].
    pub fn parse_operation(&mut self) -> Option<Operation> {
        self.enter()?;
        let operation = self.operation();
        self.depth -= 1;
        operation
    }

    fn operation(&mut self) -> Option<Operation> {
        let keyword = self.expect_identifier("operation")?;
        let Some(loader) = self.registry.operation_by_keyword(&keyword) else {
            return self.fail(format!("unknown operation '{keyword}'"));
        };
        (loader.parse)(self, loader.op_type)
    }

    fn enter(&mut self) -> Option<()> {
        if self.depth >= MAX_NESTING {
            return self.fail("nesting too deep");
        }
        self.depth += 1;
        Some(())
    }

    /// Parses every statement up to the end of input.
    ///
    /// After a failed statement, tokens are skipped up to the next `value`
    /// keyword so that later statements are still read.
    pub fn parse_program(&mut self) -> Vec<(String, Value)> {
        let mut entries = Vec::new();
        while !self.is_at_end() {
            if let Some(entry) = self.parse_value() {
                entries.push(entry);
            } else {
                self.recover();
            }
        }
        entries
    }

    /// Skips to the next `value` keyword, consuming at least one token.
    fn recover(&mut self) {
        if !self.is_at_end() {
            self.advance();
        }
        while !self.is_at_end() && !self.current.kind.is_word("value") {
            self.advance();
        }
    }

    // =========================================================================
    // Token access
    // =========================================================================

    /// Returns the lookahead token.
    #[must_use]
    pub fn peek(&self) -> &TokenKind {
        &self.current.kind
    }

    /// Returns true once all input has been consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    /// Consumes the lookahead token.
    pub fn advance(&mut self) -> Token {
        let next = next_significant(&mut self.lexer);
        let token = std::mem::replace(&mut self.current, next);
        if self.history.len() == CONTEXT_TOKENS {
            self.history.pop_front();
        }
        self.history.push_back(token.kind.to_string());
        token
    }

    /// Consumes the lookahead token if it equals `kind`.
    pub fn next_if(&mut self, kind: &TokenKind) -> bool {
        if &self.current.kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the lookahead token if it is the identifier `word`.
    pub fn next_if_word(&mut self, word: &str) -> bool {
        if self.current.kind.is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of exactly `kind` or records an error.
    pub fn expect(&mut self, kind: &TokenKind) -> Option<()> {
        if self.next_if(kind) {
            Some(())
        } else {
            self.unexpected(kind.name())
        }
    }

    /// Consumes an identifier.
    pub fn expect_identifier(&mut self, what: &str) -> Option<String> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => self.unexpected(what),
        }
    }

    /// Consumes an integer literal.
    pub fn expect_integer(&mut self) -> Option<u64> {
        match self.current.kind {
            TokenKind::Integer(n) => {
                self.advance();
                Some(n)
            }
            _ => self.unexpected("integer"),
        }
    }

    /// Consumes a string literal.
    pub fn expect_string(&mut self) -> Option<String> {
        match &self.current.kind {
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance();
                Some(s)
            }
            _ => self.unexpected("string"),
        }
    }

    // =========================================================================
    // Errors
    // =========================================================================

    /// Records an error at the lookahead token and yields `None`.
    pub fn fail<T>(&mut self, message: impl Into<String>) -> Option<T> {
        let context = self.history.iter().cloned().collect::<Vec<_>>().join(" ");
        self.errors.push(ParseError {
            message: message.into(),
            context,
            position: self.current.position,
        });
        None
    }

    /// Records an "expected X, found Y" error.
    fn unexpected<T>(&mut self, expected: &str) -> Option<T> {
        let found = match &self.current.kind {
            TokenKind::Error(msg) => msg.clone(),
            kind => kind.name().to_string(),
        };
        self.fail(format!("expected {expected}, found {found}"))
    }

    /// Errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Returns true if any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Takes the recorded errors, leaving the log empty.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }
}

/// Pulls the next token that is not a comment.
fn next_significant(lexer: &mut Lexer<'_>) -> Token {
    loop {
        let token = lexer.next_token();
        if !token.kind.is_trivia() {
            return token;
        }
    }
}

/// Parses a single value payload from a string.
///
/// # Errors
/// Returns the first recorded parse error, or an error if input remains
/// after the payload.
pub fn parse_payload(source: &str, registry: &Registry) -> cairn_foundation::Result<Value> {
    let mut parser = Parser::new(source, registry);
    let value = parser.parse_value_payload();
    if let Some(err) = parser.take_errors().into_iter().next() {
        return Err(err.into());
    }
    match value {
        Some(value) if parser.is_at_end() => Ok(value),
        Some(_) => Err(Error::parse("trailing input after value", source)),
        None => Err(Error::parse("invalid value", source)),
    }
}
