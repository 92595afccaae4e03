//! Primary expression parsing

use crate::ast::Expr;
use crate::lexer::{CharSource, TokenKind};
use crate::parser::{ParseError, Parser};

impl<S: CharSource> Parser<S> {
    pub(crate) fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            TokenKind::Identifier(_) => self.parse_identifier_expression(),
            TokenKind::Number(value) => {
                let value = *value;
                self.advance();
                Ok(Expr::Number(value))
            }
            TokenKind::Char('(') => self.parse_paren_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::For => self.parse_for_expression(),
            TokenKind::Var => self.parse_var_expression(),
            _ => Err(self.error_here("expression")),
        }
    }

    /// Identifier token text, consuming it
    fn expect_identifier(&mut self, context: &str) -> Result<String, ParseError> {
        match self.peek() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_here(format!("identifier {context}"))),
        }
    }

    fn expect_keyword(&mut self, keyword: TokenKind, context: &str) -> Result<(), ParseError> {
        if *self.peek() == keyword {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(format!("{keyword} {context}")))
        }
    }

    /// `( expression )`
    fn parse_paren_expression(&mut self) -> Result<Expr, ParseError> {
        self.advance(); // eat '('
        let expr = self.parse_expression()?;
        self.expect_char(')', "to close parenthesised expression")?;
        Ok(expr)
    }

    /// Variable reference or call
    fn parse_identifier_expression(&mut self) -> Result<Expr, ParseError> {
        let name = self.expect_identifier("")?;

        if !self.check_char('(') {
            return Ok(Expr::Variable(name));
        }
        self.advance(); // eat '('

        let mut args = Vec::new();
        if !self.check_char(')') {
            loop {
                args.push(self.parse_expression()?);

                if self.check_char(')') {
                    break;
                }
                if !self.check_char(',') {
                    return Err(self.error_here("')' or ',' in argument list"));
                }
                self.advance();
            }
        }
        self.advance(); // eat ')'

        Ok(Expr::Call { callee: name, args })
    }

    /// `if cond then expr else expr`
    fn parse_if_expression(&mut self) -> Result<Expr, ParseError> {
        self.advance(); // eat 'if'
        let cond = self.parse_expression()?;

        self.expect_keyword(TokenKind::Then, "after if condition")?;
        let then_branch = self.parse_expression()?;

        self.expect_keyword(TokenKind::Else, "after then branch")?;
        let else_branch = self.parse_expression()?;

        Ok(Expr::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// `for name = start, end [, step] in body`
    fn parse_for_expression(&mut self) -> Result<Expr, ParseError> {
        self.advance(); // eat 'for'
        let var = self.expect_identifier("after 'for'")?;

        self.expect_char('=', "after for-loop variable")?;
        let start = self.parse_expression()?;

        self.expect_char(',', "after for-loop start value")?;
        let end = self.parse_expression()?;

        let step = if self.check_char(',') {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.expect_keyword(TokenKind::In, "after for-loop header")?;
        let body = self.parse_expression()?;

        Ok(Expr::For {
            var,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
        })
    }

    /// `var name [= init] (, name [= init])* in body`; a missing
    /// initializer is 0.0
    fn parse_var_expression(&mut self) -> Result<Expr, ParseError> {
        self.advance(); // eat 'var'

        let mut bindings = Vec::new();
        loop {
            let name = self.expect_identifier("after 'var'")?;

            let init = if self.check_char('=') {
                self.advance();
                self.parse_expression()?
            } else {
                Expr::Number(0.0)
            };
            bindings.push((name, init));

            if !self.check_char(',') {
                break;
            }
            self.advance();
        }

        self.expect_keyword(TokenKind::In, "after var bindings")?;
        let body = self.parse_expression()?;

        Ok(Expr::Var {
            bindings,
            body: Box::new(body),
        })
    }
}
