//! Kaleidoscope Lexer
//!
//! Produces one token per call from a pluggable character source.
//! Handles keywords, identifiers, numeric literals and `#` comments; every
//! other character is passed through as a punctuation token.

pub mod source;
pub mod token;

pub use source::{CharSource, ReaderSource, StrSource};
pub use token::{Token, TokenKind};

use kal_common::{SourceLocation, SourceTracker};
use log::trace;
use std::collections::HashMap;

/// Kaleidoscope Lexer
pub struct Lexer<S: CharSource> {
    source: S,
    /// One-character lookahead; `None` means nothing has been pulled yet
    lookahead: Option<Option<char>>,
    tracker: SourceTracker,
    keywords: HashMap<&'static str, TokenKind>,
}

impl Lexer<StrSource> {
    /// Lexer over an in-memory string
    pub fn from_text(input: &str) -> Self {
        Self::new(StrSource::new(input))
    }
}

impl<S: CharSource> Lexer<S> {
    /// Create a new lexer
    pub fn new(source: S) -> Self {
        Self::with_filename(source, "<input>")
    }

    /// Create a lexer whose locations name `filename`
    pub fn with_filename(source: S, filename: &str) -> Self {
        let mut lexer = Self {
            source,
            lookahead: None,
            tracker: SourceTracker::new(filename),
            keywords: HashMap::new(),
        };

        lexer.initialize_keywords();
        lexer
    }

    /// Initialize keyword map
    fn initialize_keywords(&mut self) {
        let keywords = [
            ("def", TokenKind::Def),
            ("extern", TokenKind::Extern),
            ("if", TokenKind::If),
            ("then", TokenKind::Then),
            ("else", TokenKind::Else),
            ("for", TokenKind::For),
            ("in", TokenKind::In),
            ("binary", TokenKind::Binary),
            ("unary", TokenKind::Unary),
            ("var", TokenKind::Var),
        ];

        for (keyword, kind) in keywords {
            self.keywords.insert(keyword, kind);
        }
    }

    /// Get current character, pulling it from the source on first use
    fn current_char(&mut self) -> Option<char> {
        match self.lookahead {
            Some(ch) => ch,
            None => {
                let ch = self.source.next_char();
                self.lookahead = Some(ch);
                ch
            }
        }
    }

    /// Consume the current character. The next one is only read on demand.
    fn advance(&mut self) -> Option<char> {
        let ch = self.current_char();
        if let Some(c) = ch {
            self.tracker.advance(c);
            self.lookahead = None;
        }
        ch
    }

    /// Location of the next unread character
    pub fn current_location(&self) -> SourceLocation {
        self.tracker.location()
    }

    /// Skip whitespace and `#` comments
    fn skip_trivia(&mut self) {
        loop {
            match self.current_char() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('#') => {
                    while !matches!(self.current_char(), None | Some('\n') | Some('\r')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn tokenize_identifier(&mut self) -> TokenKind {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match self.keywords.get(identifier.as_str()) {
            Some(keyword) => keyword.clone(),
            None => TokenKind::Identifier(identifier),
        }
    }

    fn tokenize_number(&mut self) -> TokenKind {
        let mut text = String::new();

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() || ch == '.' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match text.parse::<f64>() {
            Ok(value) => TokenKind::Number(value),
            Err(_) => TokenKind::Error(text),
        }
    }

    /// Get next token. Returns `Eof` repeatedly once the source is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let location = self.current_location();

        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.tokenize_identifier(),
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.tokenize_number(),
            Some(ch) => {
                self.advance();
                TokenKind::Char(ch)
            }
        };

        trace!("token {kind} at {location}");
        Token::new(kind, location)
    }

    /// Tokenize the whole source, including the final `Eof`
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::from_text(input)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("def extern if then else for in binary unary var foo _bar9"),
            vec![
                TokenKind::Def,
                TokenKind::Extern,
                TokenKind::If,
                TokenKind::Then,
                TokenKind::Else,
                TokenKind::For,
                TokenKind::In,
                TokenKind::Binary,
                TokenKind::Unary,
                TokenKind::Var,
                TokenKind::Identifier("foo".to_string()),
                TokenKind::Identifier("_bar9".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("4.20 17 .5"),
            vec![
                TokenKind::Number(4.2),
                TokenKind::Number(17.0),
                TokenKind::Number(0.5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_malformed_number_is_error_token() {
        assert_eq!(
            kinds("1.2.3 x"),
            vec![
                TokenKind::Error("1.2.3".to_string()),
                TokenKind::Identifier("x".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_punctuation_passes_through() {
        assert_eq!(
            kinds("a|b ~ (:)"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Char('|'),
                TokenKind::Identifier("b".to_string()),
                TokenKind::Char('~'),
                TokenKind::Char('('),
                TokenKind::Char(':'),
                TokenKind::Char(')'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("# leading\nx # trailing\r\ny # to end of input"),
            vec![
                TokenKind::Identifier("x".to_string()),
                TokenKind::Identifier("y".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_eof_is_repeated() {
        let mut lexer = Lexer::from_text("");
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_token_locations() {
        let tokens = Lexer::from_text("def\n  foo").tokenize();
        assert_eq!(tokens[0].location, SourceLocation::new("<input>", 1, 1));
        assert_eq!(tokens[1].location, SourceLocation::new("<input>", 2, 3));
    }

    /// Counts how many characters were pulled from the source
    struct CountingSource {
        inner: StrSource,
        pulled: usize,
    }

    impl CharSource for CountingSource {
        fn next_char(&mut self) -> Option<char> {
            self.pulled += 1;
            self.inner.next_char()
        }
    }

    #[test]
    fn test_punctuation_does_not_read_ahead() {
        let mut lexer = Lexer::new(CountingSource {
            inner: StrSource::new(";x"),
            pulled: 0,
        });

        assert_eq!(lexer.next_token().kind, TokenKind::Char(';'));
        assert_eq!(lexer.source.pulled, 1);
    }
}
