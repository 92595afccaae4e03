//! Execution errors

use kal_common::{CompilerError, LabelId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    #[error("unresolved symbol '{name}'")]
    UnresolvedSymbol { name: String },

    #[error("'{name}' called with {found} arguments, expects {expected}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("'{name}' takes {arity} arguments and cannot be an entry point")]
    NotAnEntryPoint { name: String, arity: usize },

    #[error("module {key} is not loaded")]
    UnknownModule { key: u64 },

    #[error("call depth exceeded {limit}")]
    CallDepthExceeded { limit: usize },

    #[error("block L{block} of '{function}' has no terminator")]
    MissingTerminator { function: String, block: LabelId },

    #[error("malformed IR in '{function}': {message}")]
    MalformedIr { function: String, message: String },

    #[error("host output failed: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for VmError {
    fn from(err: std::io::Error) -> Self {
        VmError::Io {
            message: err.to_string(),
        }
    }
}

impl From<VmError> for CompilerError {
    fn from(err: VmError) -> Self {
        CompilerError::execution_error(err.to_string())
    }
}
