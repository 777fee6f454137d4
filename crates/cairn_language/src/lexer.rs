//! Lexer for Cairn assembly source.
//!
//! The lexer converts source text into a stream of tokens. It never fails:
//! malformed input becomes a [`TokenKind::Error`] token and scanning resumes
//! after the offending character.

use crate::token::{Position, Token, TokenKind};

/// Lexer for Cairn assembly source.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = Position {
            offset: self.position,
            line: self.line,
            column: self.column,
        };

        let Some(c) = self.peek_char() else {
            return Token::new(TokenKind::Eof, start);
        };

        let kind = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '-' => {
                self.advance();
                if self.peek_char() == Some('>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Error("expected '->'".into())
                }
            }
            '#' => self.scan_comment(),
            '"' => self.scan_string(),
            '\'' => self.scan_quoted_character(),
            '\\' => self.scan_escaped_character(),
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_identifier_start(c) => self.scan_identifier(),
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {c}"))
            }
        };

        Token::new(kind, start)
    }

    /// Tokenizes all source and returns a vector of tokens.
    ///
    /// Comments are included in the output.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Consumes one character and yields `kind`.
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Scans a comment starting with `#`.
    fn scan_comment(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(|c| c != '\n') {
            self.advance();
        }
        TokenKind::Comment(self.source[start..self.position].to_string())
    }

    /// Scans a string literal.
    fn scan_string(&mut self) -> TokenKind {
        self.advance(); // consume opening '"'
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.scan_escape() {
                        Ok(c) => text.push(c),
                        Err(msg) => return TokenKind::Error(msg),
                    }
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
                None => {
                    return TokenKind::Error("unterminated string literal".into());
                }
            }
        }
        TokenKind::String(text)
    }

    /// Resolves the escape after a consumed backslash.
    fn scan_escape(&mut self) -> Result<char, String> {
        let c = self
            .peek_char()
            .ok_or_else(|| "unexpected end of input in escape".to_string())?;
        self.advance();
        match c {
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            '0' => Ok('\0'),
            '\\' | '"' | '\'' => Ok(c),
            'u' => {
                let code = self.scan_hex_digits()?;
                char::from_u32(code).ok_or_else(|| format!("invalid code point: {code:#x}"))
            }
            c => Err(format!("invalid escape sequence: \\{c}")),
        }
    }

    /// Scans 1 to 8 hexadecimal digits.
    fn scan_hex_digits(&mut self) -> Result<u32, String> {
        let start = self.position;
        while self.position - start < 8 && self.peek_char().is_some_and(|c| c.is_ascii_hexdigit())
        {
            self.advance();
        }
        let digits = &self.source[start..self.position];
        if digits.is_empty() {
            return Err("expected hexadecimal digits".into());
        }
        u32::from_str_radix(digits, 16).map_err(|e| format!("invalid code point: {e}"))
    }

    /// Scans a `'c'` character literal.
    fn scan_quoted_character(&mut self) -> TokenKind {
        self.advance(); // consume opening '\''
        let c = match self.peek_char() {
            Some('\\') => {
                self.advance();
                match self.scan_escape() {
                    Ok(c) => c,
                    Err(msg) => return TokenKind::Error(msg),
                }
            }
            Some('\'') | None => return TokenKind::Error("empty character literal".into()),
            Some(c) => {
                self.advance();
                c
            }
        };
        if self.peek_char() != Some('\'') {
            return TokenKind::Error("unterminated character literal".into());
        }
        self.advance();
        TokenKind::Character(u32::from(c))
    }

    /// Scans a `\uXXXX` character literal.
    ///
    /// Unlike escapes inside strings, any 32-bit code may be written here.
    fn scan_escaped_character(&mut self) -> TokenKind {
        self.advance(); // consume '\\'
        if self.peek_char() != Some('u') {
            return TokenKind::Error("expected '\\u' character literal".into());
        }
        self.advance();
        match self.scan_hex_digits() {
            Ok(code) => TokenKind::Character(code),
            Err(msg) => TokenKind::Error(msg),
        }
    }

    /// Scans a decimal or `0x` hexadecimal integer.
    fn scan_number(&mut self) -> TokenKind {
        let start = self.position;
        let hex = self.rest.starts_with("0x") || self.rest.starts_with("0X");
        if hex {
            self.advance();
            self.advance();
        }
        let digits_start = self.position;
        while self.peek_char().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let digits: String = self.source[digits_start..self.position]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let parsed = if hex {
            u64::from_str_radix(&digits, 16)
        } else {
            digits.parse::<u64>()
        };
        match parsed {
            Ok(n) => TokenKind::Integer(n),
            Err(e) => TokenKind::Error(format!(
                "invalid integer {}: {e}",
                &self.source[start..self.position]
            )),
        }
    }

    /// Scans an identifier.
    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(is_identifier_char) {
            self.advance();
        }
        TokenKind::Identifier(self.source[start..self.position].to_string())
    }
}

/// Returns true if `c` can start an identifier.
#[must_use]
pub fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '$' | '.' | ':' | '/')
}

/// Returns true if `c` can appear in an identifier after the first character.
#[must_use]
pub fn is_identifier_char(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

/// Returns true if `name` lexes back as exactly one identifier.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_char)
}
