//! Execution engine: the set of loaded modules and the entry-point API

mod execution;

use crate::constants::DEFAULT_MAX_CALL_DEPTH;
use crate::errors::VmError;
use crate::host::HostIo;
use execution::Interpreter;
use kal_frontend::ir::{Function, Module};
use log::debug;
use std::fmt;

/// Handle for a loaded module, used to unload it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleKey(u64);

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A zero-argument function found by [`ExecutionEngine::lookup`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    module: ModuleKey,
    name: String,
}

impl EntryPoint {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> ModuleKey {
        self.module
    }
}

struct LoadedModule {
    key: ModuleKey,
    module: Module,
}

pub struct ExecutionEngine {
    /// In load order; later modules win symbol lookups
    modules: Vec<LoadedModule>,
    next_key: u64,
    host: HostIo,
    max_call_depth: usize,
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionEngine {
    /// Engine whose host output is only buffered
    pub fn new() -> Self {
        Self::with_echo(false)
    }

    /// Engine that also writes host output to stdout when `echo` is set
    pub fn with_echo(echo: bool) -> Self {
        Self {
            modules: Vec::new(),
            next_key: 0,
            host: HostIo::new(echo),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn set_echo(&mut self, echo: bool) {
        self.host.set_echo(echo);
    }

    pub fn add_module(&mut self, module: Module) -> ModuleKey {
        let key = ModuleKey(self.next_key);
        self.next_key += 1;
        debug!(
            "loaded module '{}' as {key} ({} definitions)",
            module.name,
            module.definitions().count()
        );
        self.modules.push(LoadedModule { key, module });
        key
    }

    /// Unload a module, returning it if it was loaded
    pub fn remove_module(&mut self, key: ModuleKey) -> Option<Module> {
        let index = self.modules.iter().position(|loaded| loaded.key == key)?;
        let loaded = self.modules.remove(index);
        debug!("removed module '{}' ({key})", loaded.module.name);
        Some(loaded.module)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Find the newest loaded definition of `name` as an entry point
    pub fn lookup(&self, name: &str) -> Result<EntryPoint, VmError> {
        let loaded = self
            .modules
            .iter()
            .rev()
            .find(|loaded| {
                loaded
                    .module
                    .get_function(name)
                    .is_some_and(|function| !function.is_declaration())
            })
            .ok_or_else(|| VmError::UnresolvedSymbol {
                name: name.to_string(),
            })?;

        Ok(EntryPoint {
            module: loaded.key,
            name: name.to_string(),
        })
    }

    /// Run a zero-argument entry point and return its result
    pub fn invoke(&mut self, entry: &EntryPoint) -> Result<f64, VmError> {
        let function = entry_function(&self.modules, entry)?;
        if function.arity() != 0 {
            return Err(VmError::NotAnEntryPoint {
                name: entry.name.clone(),
                arity: function.arity(),
            });
        }

        debug!("invoking {} in module {}", entry.name, entry.module);
        let mut interpreter = Interpreter::new(&self.modules, &mut self.host, self.max_call_depth);
        interpreter.run(function, &[])
    }

    /// Host output produced since the last call
    pub fn take_output(&mut self) -> String {
        self.host.take_output()
    }
}

/// The body an entry point refers to, if its module is still loaded
fn entry_function<'m>(modules: &'m [LoadedModule], entry: &EntryPoint) -> Result<&'m Function, VmError> {
    let loaded = modules
        .iter()
        .find(|loaded| loaded.key == entry.module)
        .ok_or(VmError::UnknownModule { key: entry.module.0 })?;

    loaded
        .module
        .get_function(&entry.name)
        .filter(|function| !function.is_declaration())
        .ok_or_else(|| VmError::UnresolvedSymbol {
            name: entry.name.clone(),
        })
}
