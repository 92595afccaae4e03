//! Binary expression parsing with operator precedence

use crate::ast::Expr;
use crate::lexer::CharSource;
use crate::parser::{ParseError, Parser};
use log::trace;

impl<S: CharSource> Parser<S> {
    /// Precedence climbing. Consumes operators binding at least as tightly
    /// as `min_precedence`; an operator that binds strictly tighter than the
    /// one just consumed takes the right operand as its own left operand.
    /// Equal precedence associates to the left.
    pub(crate) fn parse_binary_rhs(&mut self, min_precedence: i32, mut lhs: Expr) -> Result<Expr, ParseError> {
        loop {
            let precedence = self.current_precedence();
            if precedence < min_precedence {
                return Ok(lhs);
            }

            let op = match self.advance().kind.as_ascii_char() {
                Some(op) => op,
                None => return Ok(lhs),
            };
            trace!("binary operator '{op}' at precedence {precedence}");

            let mut rhs = self.parse_unary()?;

            let next_precedence = self.current_precedence();
            if precedence < next_precedence {
                rhs = self.parse_binary_rhs(precedence + 1, rhs)?;
            }

            lhs = Expr::binary(op, lhs, rhs);
        }
    }
}
