//! IR Operations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Floating-point arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrBinaryOp {
    FAdd,
    FSub,
    FMul,
    FDiv,
}

impl IrBinaryOp {
    /// Built-in arithmetic operator for a source character
    pub fn from_char(op: char) -> Option<Self> {
        match op {
            '+' => Some(IrBinaryOp::FAdd),
            '-' => Some(IrBinaryOp::FSub),
            '*' => Some(IrBinaryOp::FMul),
            '/' => Some(IrBinaryOp::FDiv),
            _ => None,
        }
    }

    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            IrBinaryOp::FAdd => lhs + rhs,
            IrBinaryOp::FSub => lhs - rhs,
            IrBinaryOp::FMul => lhs * rhs,
            IrBinaryOp::FDiv => lhs / rhs,
        }
    }
}

impl fmt::Display for IrBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            IrBinaryOp::FAdd => "fadd",
            IrBinaryOp::FSub => "fsub",
            IrBinaryOp::FMul => "fmul",
            IrBinaryOp::FDiv => "fdiv",
        };
        write!(f, "{op_str}")
    }
}

/// Floating-point comparison predicates (result is i1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FCmpPredicate {
    /// Unordered or less than
    Ult,
    /// Unordered or greater than
    Ugt,
    /// Ordered and not equal
    One,
}

impl FCmpPredicate {
    /// Built-in comparison operator for a source character
    pub fn from_char(op: char) -> Option<Self> {
        match op {
            '<' => Some(FCmpPredicate::Ult),
            '>' => Some(FCmpPredicate::Ugt),
            _ => None,
        }
    }

    pub fn evaluate(self, lhs: f64, rhs: f64) -> bool {
        let unordered = lhs.is_nan() || rhs.is_nan();
        match self {
            FCmpPredicate::Ult => unordered || lhs < rhs,
            FCmpPredicate::Ugt => unordered || lhs > rhs,
            FCmpPredicate::One => !unordered && lhs != rhs,
        }
    }
}

impl fmt::Display for FCmpPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pred = match self {
            FCmpPredicate::Ult => "ult",
            FCmpPredicate::Ugt => "ugt",
            FCmpPredicate::One => "one",
        };
        write!(f, "{pred}")
    }
}
