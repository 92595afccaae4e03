//! Visitor traits over the closed AST node set
//!
//! `walk_expr` and `walk_unit` are the only places that match on node
//! kinds for dispatch. Every visitor must implement a method per kind, so
//! adding a kind is a build error until all visitors handle it.

use crate::ast::{Expr, Function, Prototype, Unit};

/// Per-kind expression handlers
pub trait ExprVisitor {
    type Output;

    fn visit_number(&mut self, value: f64) -> Self::Output;
    fn visit_variable(&mut self, name: &str) -> Self::Output;
    fn visit_unary(&mut self, op: char, operand: &Expr) -> Self::Output;
    fn visit_binary(&mut self, op: char, lhs: &Expr, rhs: &Expr) -> Self::Output;
    fn visit_call(&mut self, callee: &str, args: &[Expr]) -> Self::Output;
    fn visit_if(&mut self, cond: &Expr, then_branch: &Expr, else_branch: &Expr) -> Self::Output;
    fn visit_for(
        &mut self,
        var: &str,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &Expr,
    ) -> Self::Output;
    fn visit_var(&mut self, bindings: &[(String, Expr)], body: &Expr) -> Self::Output;
}

/// Dispatch `expr` to the matching handler of `visitor`
pub fn walk_expr<V: ExprVisitor + ?Sized>(visitor: &mut V, expr: &Expr) -> V::Output {
    match expr {
        Expr::Number(value) => visitor.visit_number(*value),
        Expr::Variable(name) => visitor.visit_variable(name),
        Expr::Unary { op, operand } => visitor.visit_unary(*op, operand),
        Expr::Binary { op, lhs, rhs } => visitor.visit_binary(*op, lhs, rhs),
        Expr::Call { callee, args } => visitor.visit_call(callee, args),
        Expr::If {
            cond,
            then_branch,
            else_branch,
        } => visitor.visit_if(cond, then_branch, else_branch),
        Expr::For {
            var,
            start,
            end,
            step,
            body,
        } => visitor.visit_for(var, start, end, step.as_deref(), body),
        Expr::Var { bindings, body } => visitor.visit_var(bindings, body),
    }
}

/// Top-level handlers. Expressions arrive whole through `visit_expression`;
/// implementors that care about the subkind call [`walk_expr`] themselves.
pub trait UnitVisitor {
    type Output;

    fn visit_expression(&mut self, expr: &Expr) -> Self::Output;
    fn visit_definition(&mut self, function: &Function) -> Self::Output;
    fn visit_extern(&mut self, proto: &Prototype) -> Self::Output;
    fn visit_end_of_input(&mut self) -> Self::Output;
}

/// Dispatch a top-level unit
pub fn walk_unit<V: UnitVisitor + ?Sized>(visitor: &mut V, unit: &Unit) -> V::Output {
    match unit {
        Unit::Definition(function) => visitor.visit_definition(function),
        Unit::Extern(proto) => visitor.visit_extern(proto),
        Unit::Expression(expr) => visitor.visit_expression(expr),
        Unit::EndOfInput => visitor.visit_end_of_input(),
    }
}
