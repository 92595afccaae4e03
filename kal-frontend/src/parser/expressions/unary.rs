//! Prefix unary operator parsing

use crate::ast::Expr;
use crate::lexer::CharSource;
use crate::parser::{ParseError, Parser};

impl<S: CharSource> Parser<S> {
    /// A registered prefix operator applies to a whole expression, so
    /// `!a + b` is `!(a + b)`. Anything else is a primary.
    pub(crate) fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().as_ascii_char() {
            Some(op) if op != '(' && op != ',' && self.is_unary_operator(op) => op,
            _ => return self.parse_primary(),
        };

        self.advance();
        let operand = self.parse_expression()?;
        Ok(Expr::unary(op, operand))
    }
}
