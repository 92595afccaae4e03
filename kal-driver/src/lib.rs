//! Kaleidoscope Compiler Driver
//!
//! Runs the parse, lower, execute loop over a source one top-level unit at
//! a time, the way an interactive session does.

pub mod session;

pub use session::{Outcome, Session, SessionOptions};
