//! Host primitives callable from Kaleidoscope code
//!
//! Everything the primitives write is kept in an output buffer. With echo
//! enabled it is also written straight to stdout.

use crate::constants::{HOST_PRINTD, HOST_PUTCHARD};
use crate::errors::VmError;
use log::trace;
use std::collections::VecDeque;
use std::io::Write;

/// A primitive provided by the engine rather than by a loaded module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFunction {
    PutChar,
    PrintDouble,
}

impl HostFunction {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            HOST_PUTCHARD => Some(HostFunction::PutChar),
            HOST_PRINTD => Some(HostFunction::PrintDouble),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HostFunction::PutChar => HOST_PUTCHARD,
            HostFunction::PrintDouble => HOST_PRINTD,
        }
    }

    pub fn arity(self) -> usize {
        1
    }
}

#[derive(Debug, Default)]
pub struct HostIo {
    pub output_buffer: VecDeque<u8>,
    echo: bool,
}

impl HostIo {
    pub fn new(echo: bool) -> Self {
        Self {
            output_buffer: VecDeque::new(),
            echo,
        }
    }

    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    /// Run a primitive; both return 0.0
    pub fn call(&mut self, function: HostFunction, arg: f64) -> Result<f64, VmError> {
        trace!("host call {}({arg})", function.name());
        match function {
            HostFunction::PutChar => {
                // Saturating conversion: out-of-range values clamp to 0 or 255
                self.write(&[arg as u8])?;
            }
            HostFunction::PrintDouble => {
                self.write(format!("{arg:.6}\n").as_bytes())?;
            }
        }
        Ok(0.0)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), VmError> {
        self.output_buffer.extend(bytes);
        if self.echo {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
        Ok(())
    }

    /// Everything written since the last call
    pub fn take_output(&mut self) -> String {
        let bytes: Vec<u8> = self.output_buffer.drain(..).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
