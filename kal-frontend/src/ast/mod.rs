//! Abstract Syntax Tree definitions for Kaleidoscope
//!
//! The node set is closed: expressions are a single enum, and the visitor
//! traits in [`visitor`] match on it exhaustively.

pub mod display;
pub mod visitor;

pub use visitor::{walk_expr, walk_unit, ExprVisitor, UnitVisitor};

use serde::{Deserialize, Serialize};

/// Expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(f64),

    Variable(String),

    /// Prefix application of a user-defined unary operator
    Unary { op: char, operand: Box<Expr> },

    /// `=` is assignment and `:` is sequencing; both are given meaning by
    /// the code generator, not the parser
    Binary {
        op: char,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    Call { callee: String, args: Vec<Expr> },

    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// `for var = start, end[, step] in body`; a missing step means 1.0
    For {
        var: String,
        start: Box<Expr>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Box<Expr>,
    },

    /// `var a = 1, b = a in body`; bindings are visible to later initializers
    Var {
        bindings: Vec<(String, Expr)>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn number(value: f64) -> Self {
        Expr::Number(value)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn binary(op: char, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: char, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: callee.into(),
            args,
        }
    }

    /// Short name of the node kind, for diagnostics and logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Number(_) => "number",
            Expr::Variable(_) => "variable",
            Expr::Unary { .. } => "unary",
            Expr::Binary { .. } => "binary",
            Expr::Call { .. } => "call",
            Expr::If { .. } => "if",
            Expr::For { .. } => "for",
            Expr::Var { .. } => "var",
        }
    }
}

/// What a prototype declares
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PrototypeKind {
    Function,
    Unary(char),
    Binary { op: char, precedence: i32 },
}

/// Function signature: name and parameter names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
    pub kind: PrototypeKind,
}

impl Prototype {
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
            kind: PrototypeKind::Function,
        }
    }

    /// `unary<op>(operand)`
    pub fn unary(op: char, operand: impl Into<String>) -> Self {
        Self {
            name: format!("unary{op}"),
            params: vec![operand.into()],
            kind: PrototypeKind::Unary(op),
        }
    }

    /// `binary<op>(lhs rhs)` with the declared precedence
    pub fn binary(op: char, precedence: i32, lhs: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self {
            name: format!("binary{op}"),
            params: vec![lhs.into(), rhs.into()],
            kind: PrototypeKind::Binary { op, precedence },
        }
    }

    /// Zero-argument wrapper used for top-level expressions
    pub fn anonymous() -> Self {
        Self::new(kal_common::ANON_EXPR_NAME, Vec::new())
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub proto: Prototype,
    pub body: Expr,
}

impl Function {
    pub fn new(proto: Prototype, body: Expr) -> Self {
        Self { proto, body }
    }

    /// Wrap a top-level expression in the anonymous zero-argument function
    pub fn anonymous(body: Expr) -> Self {
        Self::new(Prototype::anonymous(), body)
    }
}

/// One top-level construct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Unit {
    Definition(Function),
    Extern(Prototype),
    Expression(Expr),
    /// Input exhausted; distinct from a parse failure
    EndOfInput,
}

impl Unit {
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Unit::EndOfInput)
    }
}
