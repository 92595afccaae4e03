//! Common types used throughout the compiler
//! 
//! Identifier aliases shared by the IR builder, the code generator and
//! the execution backend.

/// Label identifier for basic blocks
pub type LabelId = u32;

/// Temporary value identifier for IR
pub type TempId = u32;

/// Name of the zero-argument wrapper synthesized for top-level expressions
pub const ANON_EXPR_NAME: &str = "__anon_expr";
