//! Execution engine limits and host primitive names

/// Frames the interpreter's call stack may hold before a call fails.
/// Frames live on the heap, so raising this does not risk the host stack.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

/// Writes its argument as a single byte
pub const HOST_PUTCHARD: &str = "putchard";

/// Writes its argument with six decimals and a newline
pub const HOST_PRINTD: &str = "printd";
