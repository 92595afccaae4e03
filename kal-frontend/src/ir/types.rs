//! IR Type System

use serde::{Deserialize, Serialize};
use std::fmt;

/// IR types. Every language value is a double; `I1` only exists between
/// a comparison and its conversion or branch, and `Ptr` is an alloca slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrType {
    Double,
    I1,
    Ptr,
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Double => write!(f, "double"),
            IrType::I1 => write!(f, "i1"),
            IrType::Ptr => write!(f, "ptr"),
        }
    }
}
