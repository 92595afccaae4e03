//! Code generation error types

use kal_common::CompilerError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    #[error("Unknown variable name '{name}'")]
    UnknownVariable { name: String },

    #[error("Unknown function referenced '{name}'")]
    UnknownFunction { name: String },

    #[error("Unknown binary operator '{op}'")]
    UnknownBinaryOperator { op: char },

    #[error("Unknown unary operator '{op}'")]
    UnknownUnaryOperator { op: char },

    #[error("Incorrect # arguments passed to '{name}': expected {expected}, found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Function '{name}' cannot be redefined")]
    Redefinition { name: String },

    #[error("arg names do not match prototype for '{name}': expected ({}), found ({})", .expected.join(" "), .found.join(" "))]
    ParameterMismatch {
        name: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Declaration of '{name}' with {found} parameters conflicts with existing {expected}")]
    ConflictingDeclaration {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("'{name}' is reserved for top-level expressions")]
    ReservedName { name: String },

    #[error("destination of '=' must be a variable")]
    InvalidAssignmentTarget,

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Builder failures are internal errors
impl From<String> for CodegenError {
    fn from(message: String) -> Self {
        CodegenError::InternalError { message }
    }
}

impl From<CodegenError> for CompilerError {
    fn from(err: CodegenError) -> Self {
        CompilerError::codegen_error(err.to_string())
    }
}
