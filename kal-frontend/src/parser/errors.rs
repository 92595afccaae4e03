//! Parse error types for the Kaleidoscope parser

use crate::lexer::{Token, TokenKind};
use kal_common::{CompilerError, SourceLocation};

/// Parse error types specific to the parser
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    UnexpectedToken {
        expected: String,
        found: Token,
    },
    UnexpectedEndOfInput {
        expected: String,
        location: SourceLocation,
    },
    InvalidOperator {
        message: String,
        location: SourceLocation,
    },
    /// A malformed literal reached the parser as an error token
    LexicalError {
        text: String,
        location: SourceLocation,
    },
}

impl ParseError {
    /// Classify an offending token against what the parser wanted
    pub fn unexpected(found: Token, expected: impl Into<String>) -> Self {
        let expected = expected.into();
        match found.kind {
            TokenKind::Eof => ParseError::UnexpectedEndOfInput {
                expected,
                location: found.location,
            },
            TokenKind::Error(text) => ParseError::LexicalError {
                text,
                location: found.location,
            },
            _ => ParseError::UnexpectedToken { expected, found },
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseError::UnexpectedToken { found, .. } => &found.location,
            ParseError::UnexpectedEndOfInput { location, .. }
            | ParseError::InvalidOperator { location, .. }
            | ParseError::LexicalError { location, .. } => location,
        }
    }
}

impl From<ParseError> for CompilerError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnexpectedToken { expected, found } => CompilerError::parse_error(
                format!("expected {}, found {}", expected, found.kind),
                found.location,
            ),
            ParseError::UnexpectedEndOfInput { expected, location } => CompilerError::parse_error(
                format!("unexpected end of input, expected {}", expected),
                location,
            ),
            ParseError::InvalidOperator { message, location } => {
                CompilerError::parse_error(message, location)
            }
            ParseError::LexicalError { text, location } => CompilerError::lexer_error(
                format!("invalid number literal '{}'", text),
                location,
            ),
        }
    }
}
