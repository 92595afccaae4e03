//! Kaleidoscope Recursive Descent Parser
//!
//! Parses one top-level construct per call. Binary expressions use
//! precedence climbing over an operator table that `binary` prototypes
//! extend while parsing; `unary` prototypes extend the prefix operator set
//! the same way. Both tables live for as long as the parser does.

pub mod declarations;
pub mod errors;
pub mod expressions;

use crate::ast::Unit;
use crate::lexer::{CharSource, Lexer, StrSource, Token, TokenKind};
use kal_common::CompilerError;
use log::debug;
use std::collections::{HashMap, HashSet};

pub use errors::ParseError;

/// Built-in binary operators and their precedence
pub const DEFAULT_BINARY_PRECEDENCE: [(char, i32); 8] = [
    (':', 1),
    ('=', 2),
    ('<', 10),
    ('>', 10),
    ('+', 20),
    ('-', 20),
    ('*', 40),
    ('/', 40),
];

/// Kaleidoscope Parser
pub struct Parser<S: CharSource> {
    pub(crate) lexer: Lexer<S>,
    /// Lookahead token; filled on demand so a consumed terminator never
    /// forces the lexer to read further
    current: Option<Token>,
    binary_precedence: HashMap<char, i32>,
    unary_operators: HashSet<char>,
}

impl Parser<StrSource> {
    /// Parser over an in-memory string
    pub fn from_text(input: &str) -> Self {
        Self::new(StrSource::new(input))
    }
}

impl<S: CharSource> Parser<S> {
    /// Create a new parser with the built-in operator table
    pub fn new(source: S) -> Self {
        Self::with_lexer(Lexer::new(source))
    }

    /// Create a parser whose diagnostics name `filename`
    pub fn with_filename(source: S, filename: &str) -> Self {
        Self::with_lexer(Lexer::with_filename(source, filename))
    }

    pub fn with_lexer(lexer: Lexer<S>) -> Self {
        Self {
            lexer,
            current: None,
            binary_precedence: DEFAULT_BINARY_PRECEDENCE.into_iter().collect(),
            unary_operators: HashSet::new(),
        }
    }

    /// Pre-register (or override) a binary operator
    pub fn with_binary_operator(mut self, op: char, precedence: i32) -> Self {
        self.binary_precedence.insert(op, precedence);
        self
    }

    /// Pre-register a prefix unary operator
    pub fn with_unary_operator(mut self, op: char) -> Self {
        self.unary_operators.insert(op);
        self
    }

    /// Precedence of `op`, or -1 when it is not a binary operator
    pub fn binary_precedence(&self, op: char) -> i32 {
        self.binary_precedence.get(&op).copied().unwrap_or(-1)
    }

    pub fn is_unary_operator(&self, op: char) -> bool {
        self.unary_operators.contains(&op)
    }

    pub(crate) fn register_binary_operator(&mut self, op: char, precedence: i32) {
        debug!("registering binary operator '{op}' with precedence {precedence}");
        self.binary_precedence.insert(op, precedence);
    }

    pub(crate) fn register_unary_operator(&mut self, op: char) {
        debug!("registering unary operator '{op}'");
        self.unary_operators.insert(op);
    }

    /// Lookahead token, reading it from the lexer if necessary
    pub fn current_token(&mut self) -> &Token {
        let lexer = &mut self.lexer;
        self.current.get_or_insert_with(|| lexer.next_token())
    }

    pub(crate) fn peek(&mut self) -> &TokenKind {
        &self.current_token().kind
    }

    pub(crate) fn check_char(&mut self, expected: char) -> bool {
        self.peek().is_char(expected)
    }

    /// Consume and return the lookahead token
    pub(crate) fn advance(&mut self) -> Token {
        match self.current.take() {
            Some(token) => token,
            None => self.lexer.next_token(),
        }
    }

    /// Drop the lookahead token. Callers use this to resynchronise after
    /// an error; the parser itself never skips input.
    pub fn skip_token(&mut self) {
        self.advance();
    }

    /// Consume `expected` or fail without consuming anything
    pub(crate) fn expect_char(&mut self, expected: char, context: &str) -> Result<Token, ParseError> {
        if self.check_char(expected) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("'{expected}' {context}")))
        }
    }

    /// Error describing the lookahead token, which is left in place
    pub(crate) fn error_here(&mut self, expected: impl Into<String>) -> ParseError {
        ParseError::unexpected(self.current_token().clone(), expected)
    }

    /// Ascii precedence of the lookahead token, -1 for anything else
    pub(crate) fn current_precedence(&mut self) -> i32 {
        match self.peek().as_ascii_char() {
            Some(op) => self.binary_precedence(op),
            None => -1,
        }
    }

    /// Parse one top-level construct: a definition, an extern, or a bare
    /// expression, terminated by `;` or end of input.
    pub fn parse_unit(&mut self) -> Result<Unit, CompilerError> {
        while self.check_char(';') {
            self.advance();
        }

        let unit = match self.peek() {
            TokenKind::Eof => return Ok(Unit::EndOfInput),
            TokenKind::Def => Unit::Definition(self.parse_definition()?),
            TokenKind::Extern => Unit::Extern(self.parse_extern()?),
            _ => Unit::Expression(self.parse_expression()?),
        };

        self.expect_terminator()?;

        match &unit {
            Unit::Definition(function) => debug!("parsed definition of '{}'", function.proto.name),
            Unit::Extern(proto) => debug!("parsed extern '{}'", proto.name),
            Unit::Expression(expr) => debug!("parsed top-level {} expression", expr.kind_name()),
            Unit::EndOfInput => {}
        }

        Ok(unit)
    }

    /// A unit ends at `;` (consumed) or end of input (left in place)
    fn expect_terminator(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            TokenKind::Char(';') => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.error_here("';' after top-level construct")),
        }
    }
}
