//! Token definitions for the Kaleidoscope lexer

use kal_common::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token kinds. Anything that is not a keyword, identifier or number is
/// handed to the parser verbatim as `Char`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    Eof,

    // Keywords
    Def,
    Extern,
    If,
    Then,
    Else,
    For,
    In,
    Binary,
    Unary,
    Var,

    Identifier(String),
    Number(f64),

    /// Malformed numeric literal (the offending text)
    Error(String),

    /// Punctuation and operator characters
    Char(char),
}

impl TokenKind {
    /// The operator character carried by this token, if it is ASCII punctuation
    pub fn as_ascii_char(&self) -> Option<char> {
        match self {
            TokenKind::Char(c) if c.is_ascii() => Some(*c),
            _ => None,
        }
    }

    pub fn is_char(&self, expected: char) -> bool {
        matches!(self, TokenKind::Char(c) if *c == expected)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Def => write!(f, "'def'"),
            TokenKind::Extern => write!(f, "'extern'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Then => write!(f, "'then'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::For => write!(f, "'for'"),
            TokenKind::In => write!(f, "'in'"),
            TokenKind::Binary => write!(f, "'binary'"),
            TokenKind::Unary => write!(f, "'unary'"),
            TokenKind::Var => write!(f, "'var'"),
            TokenKind::Identifier(name) => write!(f, "identifier '{name}'"),
            TokenKind::Number(value) => write!(f, "number {value}"),
            TokenKind::Error(text) => write!(f, "malformed number '{text}'"),
            TokenKind::Char(c) => write!(f, "'{c}'"),
        }
    }
}

/// A token with the location of its first character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
