//! Prototype, definition and extern parsing

use crate::ast::{Function, Prototype, PrototypeKind};
use crate::lexer::{CharSource, TokenKind};
use crate::parser::{ParseError, Parser};

/// Precedence given to a `binary` prototype that does not declare one
pub const DEFAULT_USER_PRECEDENCE: i32 = 30;

const MIN_PRECEDENCE: f64 = 1.0;
const MAX_PRECEDENCE: f64 = 100.0;

impl<S: CharSource> Parser<S> {
    /// `def prototype expression`
    pub fn parse_definition(&mut self) -> Result<Function, ParseError> {
        self.advance(); // eat 'def'
        let proto = self.parse_prototype()?;
        let body = self.parse_expression()?;
        Ok(Function::new(proto, body))
    }

    /// `extern prototype`
    pub fn parse_extern(&mut self) -> Result<Prototype, ParseError> {
        self.advance(); // eat 'extern'
        self.parse_prototype()
    }

    /// Parse a prototype:
    ///
    /// ```text
    /// name ( params )
    /// unary <op> ( operand )
    /// binary <op> [precedence] ( lhs rhs )
    /// ```
    ///
    /// Operator prototypes register their operator before returning, so
    /// the rest of the unit (and every later unit) can use it.
    pub fn parse_prototype(&mut self) -> Result<Prototype, ParseError> {
        let location = self.current_token().location.clone();

        let (name, kind) = match self.peek().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                (name, PrototypeKind::Function)
            }
            TokenKind::Unary => {
                self.advance();
                let op = self.parse_operator_char("unary")?;
                (format!("unary{op}"), PrototypeKind::Unary(op))
            }
            TokenKind::Binary => {
                self.advance();
                let op = self.parse_operator_char("binary")?;
                let precedence = self.parse_operator_precedence()?;
                (format!("binary{op}"), PrototypeKind::Binary { op, precedence })
            }
            _ => return Err(self.error_here("function name in prototype")),
        };

        self.expect_char('(', "in prototype")?;

        let mut params = Vec::new();
        while let TokenKind::Identifier(param) = self.peek() {
            params.push(param.clone());
            self.advance();
        }

        self.expect_char(')', "in prototype")?;

        let expected_arity = match kind {
            PrototypeKind::Function => None,
            PrototypeKind::Unary(_) => Some(1),
            PrototypeKind::Binary { .. } => Some(2),
        };
        if let Some(arity) = expected_arity {
            if params.len() != arity {
                return Err(ParseError::InvalidOperator {
                    message: format!(
                        "operator '{}' expects {} operand{}, found {}",
                        name,
                        arity,
                        if arity == 1 { "" } else { "s" },
                        params.len()
                    ),
                    location,
                });
            }
        }

        match kind {
            PrototypeKind::Function => {}
            PrototypeKind::Unary(op) => self.register_unary_operator(op),
            PrototypeKind::Binary { op, precedence } => self.register_binary_operator(op, precedence),
        }

        Ok(Prototype { name, params, kind })
    }

    /// The single ASCII character naming a user operator
    fn parse_operator_char(&mut self, which: &str) -> Result<char, ParseError> {
        match self.peek().as_ascii_char() {
            Some(op) => {
                self.advance();
                Ok(op)
            }
            None => Err(self.error_here(format!("operator character after '{which}'"))),
        }
    }

    /// Optional precedence literal, which must lie in 1..=100
    fn parse_operator_precedence(&mut self) -> Result<i32, ParseError> {
        let value = match self.peek() {
            TokenKind::Number(value) => *value,
            _ => return Ok(DEFAULT_USER_PRECEDENCE),
        };

        let token = self.advance();
        if !(MIN_PRECEDENCE..=MAX_PRECEDENCE).contains(&value) {
            return Err(ParseError::InvalidOperator {
                message: format!("invalid precedence {value}: must be 1..100"),
                location: token.location,
            });
        }

        Ok(value as i32)
    }
}
