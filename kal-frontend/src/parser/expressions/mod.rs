//! Expression parsing for Kaleidoscope
//!
//! Operands are unary expressions; binary operators are combined by
//! precedence climbing in `binary`.

mod binary;
mod primary;
mod unary;

use crate::ast::Expr;
use crate::lexer::CharSource;
use crate::parser::{ParseError, Parser};

impl<S: CharSource> Parser<S> {
    /// Parse expression (top level)
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_unary()?;
        self.parse_binary_rhs(0, lhs)
    }
}
