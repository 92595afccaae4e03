//! Kaleidoscope Compiler - Execution Engine
//!
//! Loads IR modules produced by the frontend and interprets them. Calls
//! are resolved by name when they execute, so a module may refer to
//! functions that only a later-loaded module defines.

pub mod constants;
pub mod engine;
pub mod errors;
pub mod host;

pub use engine::{EntryPoint, ExecutionEngine, ModuleKey};
pub use errors::VmError;
