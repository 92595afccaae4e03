//! Source printer for the AST
//!
//! Output is valid Kaleidoscope that parses back to the same tree, given a
//! parser that knows the same user operators. Binary, unary and compound
//! expressions are fully parenthesised so precedence never matters.

use crate::ast::visitor::{walk_expr, ExprVisitor};
use crate::ast::{Expr, Function, Prototype, PrototypeKind, Unit};
use std::fmt;

struct SourcePrinter<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
}

impl SourcePrinter<'_, '_> {
    fn print(&mut self, expr: &Expr) -> fmt::Result {
        walk_expr(self, expr)
    }
}

impl ExprVisitor for SourcePrinter<'_, '_> {
    type Output = fmt::Result;

    fn visit_number(&mut self, value: f64) -> fmt::Result {
        write!(self.f, "{value}")
    }

    fn visit_variable(&mut self, name: &str) -> fmt::Result {
        write!(self.f, "{name}")
    }

    fn visit_unary(&mut self, op: char, operand: &Expr) -> fmt::Result {
        write!(self.f, "({op}")?;
        self.print(operand)?;
        write!(self.f, ")")
    }

    fn visit_binary(&mut self, op: char, lhs: &Expr, rhs: &Expr) -> fmt::Result {
        write!(self.f, "(")?;
        self.print(lhs)?;
        write!(self.f, " {op} ")?;
        self.print(rhs)?;
        write!(self.f, ")")
    }

    fn visit_call(&mut self, callee: &str, args: &[Expr]) -> fmt::Result {
        write!(self.f, "{callee}(")?;
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                write!(self.f, ", ")?;
            }
            self.print(arg)?;
        }
        write!(self.f, ")")
    }

    fn visit_if(&mut self, cond: &Expr, then_branch: &Expr, else_branch: &Expr) -> fmt::Result {
        write!(self.f, "(if ")?;
        self.print(cond)?;
        write!(self.f, " then ")?;
        self.print(then_branch)?;
        write!(self.f, " else ")?;
        self.print(else_branch)?;
        write!(self.f, ")")
    }

    fn visit_for(&mut self, var: &str, start: &Expr, end: &Expr, step: Option<&Expr>, body: &Expr) -> fmt::Result {
        write!(self.f, "(for {var} = ")?;
        self.print(start)?;
        write!(self.f, ", ")?;
        self.print(end)?;
        if let Some(step) = step {
            write!(self.f, ", ")?;
            self.print(step)?;
        }
        write!(self.f, " in ")?;
        self.print(body)?;
        write!(self.f, ")")
    }

    fn visit_var(&mut self, bindings: &[(String, Expr)], body: &Expr) -> fmt::Result {
        write!(self.f, "(var ")?;
        for (i, (name, init)) in bindings.iter().enumerate() {
            if i > 0 {
                write!(self.f, ", ")?;
            }
            write!(self.f, "{name} = ")?;
            self.print(init)?;
        }
        write!(self.f, " in ")?;
        self.print(body)?;
        write!(self.f, ")")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SourcePrinter { f }.print(self)
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PrototypeKind::Function => write!(f, "{}", self.name)?,
            PrototypeKind::Unary(op) => write!(f, "unary{op} ")?,
            PrototypeKind::Binary { op, precedence } => write!(f, "binary{op} {precedence} ")?,
        }
        write!(f, "({})", self.params.join(" "))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def {} {}", self.proto, self.body)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Definition(function) => write!(f, "{function}"),
            Unit::Extern(proto) => write!(f, "extern {proto}"),
            Unit::Expression(expr) => write!(f, "{expr}"),
            Unit::EndOfInput => Ok(()),
        }
    }
}
