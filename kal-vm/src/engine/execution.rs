//! IR interpreter
//!
//! Calls push a frame onto an explicit call stack instead of recursing on
//! the host stack, so the depth limit is the only bound on nesting. Each
//! frame owns its temporaries and alloca slots and runs its current block
//! until a terminator; phis pick the incoming value for the block that
//! branched here.

use super::LoadedModule;
use crate::errors::VmError;
use crate::host::{HostFunction, HostIo};
use kal_common::{LabelId, TempId};
use kal_frontend::ir::{BasicBlock, Function, Instruction, Value};
use log::trace;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
enum RtValue {
    F64(f64),
    Bool(bool),
    /// Index of an alloca slot in the current frame
    Ptr(usize),
}

enum Callee<'a> {
    Ir(&'a Function),
    Host(HostFunction),
}

/// Outcome of a call instruction
enum Invocation<'a> {
    /// Host primitive, already run
    Done(f64),
    /// IR function, to run in a new frame
    Enter(Frame<'a>),
}

/// What the interpreter does after one instruction
enum Step<'a> {
    Next,
    Enter(Frame<'a>),
    Return(f64),
}

struct Frame<'a> {
    function: &'a Function,
    block: &'a BasicBlock,
    /// Index of the next instruction in `block`
    ip: usize,
    predecessor: Option<LabelId>,
    temps: HashMap<TempId, RtValue>,
    slots: Vec<f64>,
    /// Temp that receives the result of the call this frame is waiting on
    pending: Option<TempId>,
}

impl<'a> Frame<'a> {
    fn enter(function: &'a Function, args: &[f64]) -> Result<Self, VmError> {
        let block = function.entry_block().ok_or_else(|| VmError::MalformedIr {
            function: function.name.clone(),
            message: "function has no body".to_string(),
        })?;

        let temps = function
            .parameters
            .iter()
            .zip(args)
            .map(|(&(id, _), &arg)| (id, RtValue::F64(arg)))
            .collect();

        Ok(Self {
            function,
            block,
            ip: 0,
            predecessor: None,
            temps,
            slots: Vec::new(),
            pending: None,
        })
    }

    fn malformed(&self, message: impl Into<String>) -> VmError {
        VmError::MalformedIr {
            function: self.function.name.clone(),
            message: message.into(),
        }
    }

    fn get(&self, value: &Value) -> Result<RtValue, VmError> {
        match value {
            Value::Constant(c) => Ok(RtValue::F64(*c)),
            Value::Temp(id) => self
                .temps
                .get(id)
                .copied()
                .ok_or_else(|| self.malformed(format!("%{id} used before definition"))),
        }
    }

    fn set(&mut self, id: TempId, value: RtValue) {
        self.temps.insert(id, value);
    }

    fn double(&self, value: &Value) -> Result<f64, VmError> {
        match self.get(value)? {
            RtValue::F64(v) => Ok(v),
            other => Err(self.malformed(format!("{value} is {other:?}, expected double"))),
        }
    }

    fn flag(&self, value: &Value) -> Result<bool, VmError> {
        match self.get(value)? {
            RtValue::Bool(b) => Ok(b),
            other => Err(self.malformed(format!("{value} is {other:?}, expected i1"))),
        }
    }

    fn slot(&self, ptr: &Value) -> Result<usize, VmError> {
        match self.get(ptr)? {
            RtValue::Ptr(slot) if slot < self.slots.len() => Ok(slot),
            other => Err(self.malformed(format!("{ptr} is {other:?}, expected ptr"))),
        }
    }

    fn jump(&mut self, target: LabelId) -> Result<(), VmError> {
        let function = self.function;
        let block = function
            .get_block(target)
            .ok_or_else(|| self.malformed(format!("branch to unknown block L{target}")))?;
        self.predecessor = Some(self.block.id);
        self.block = block;
        self.ip = 0;
        Ok(())
    }

    /// Deliver the result of the call this frame made
    fn resume(&mut self, value: f64) -> Result<(), VmError> {
        let result = self
            .pending
            .take()
            .ok_or_else(|| self.malformed("returned into a frame with no pending call"))?;
        self.set(result, RtValue::F64(value));
        Ok(())
    }
}

pub(super) struct Interpreter<'a> {
    modules: &'a [LoadedModule],
    host: &'a mut HostIo,
    max_call_depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(modules: &'a [LoadedModule], host: &'a mut HostIo, max_call_depth: usize) -> Self {
        Self {
            modules,
            host,
            max_call_depth,
        }
    }

    /// Execute `function` with `args` and return what it returns
    pub fn run(&mut self, function: &'a Function, args: &[f64]) -> Result<f64, VmError> {
        let mut stack = Vec::new();
        self.push(&mut stack, Frame::enter(function, args)?)?;

        loop {
            let frame = stack
                .last_mut()
                .ok_or_else(|| VmError::MalformedIr {
                    function: function.name.clone(),
                    message: "call stack emptied without a return".to_string(),
                })?;

            match self.step(frame)? {
                Step::Next => {}
                Step::Enter(callee) => self.push(&mut stack, callee)?,
                Step::Return(value) => {
                    stack.pop();
                    match stack.last_mut() {
                        Some(caller) => caller.resume(value)?,
                        None => return Ok(value),
                    }
                }
            }
        }
    }

    fn push(&self, stack: &mut Vec<Frame<'a>>, frame: Frame<'a>) -> Result<(), VmError> {
        if stack.len() >= self.max_call_depth {
            return Err(VmError::CallDepthExceeded {
                limit: self.max_call_depth,
            });
        }
        stack.push(frame);
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<Callee<'a>, VmError> {
        let modules = self.modules;
        let definition = modules.iter().rev().find_map(|loaded| {
            loaded
                .module
                .get_function(name)
                .filter(|function| !function.is_declaration())
        });

        if let Some(function) = definition {
            return Ok(Callee::Ir(function));
        }
        HostFunction::lookup(name)
            .map(Callee::Host)
            .ok_or_else(|| VmError::UnresolvedSymbol {
                name: name.to_string(),
            })
    }

    /// Run host calls in place; IR calls hand back a frame to push
    fn call(&mut self, name: &str, args: &[f64]) -> Result<Invocation<'a>, VmError> {
        let callee = self.resolve(name)?;
        let expected = match &callee {
            Callee::Ir(function) => function.arity(),
            Callee::Host(host) => host.arity(),
        };

        if expected != args.len() {
            return Err(VmError::ArityMismatch {
                name: name.to_string(),
                expected,
                found: args.len(),
            });
        }

        match callee {
            Callee::Ir(function) => Ok(Invocation::Enter(Frame::enter(function, args)?)),
            Callee::Host(host) => self.host.call(host, args[0]).map(Invocation::Done),
        }
    }

    fn step(&mut self, frame: &mut Frame<'a>) -> Result<Step<'a>, VmError> {
        let block = frame.block;
        let inst = block.instructions.get(frame.ip).ok_or_else(|| VmError::MissingTerminator {
            function: frame.function.name.clone(),
            block: block.id,
        })?;
        frame.ip += 1;
        trace!("{}: {inst}", frame.function.name);

        match inst {
            Instruction::Binary { result, op, lhs, rhs } => {
                let value = op.apply(frame.double(lhs)?, frame.double(rhs)?);
                frame.set(*result, RtValue::F64(value));
            }
            Instruction::Compare {
                result,
                predicate,
                lhs,
                rhs,
            } => {
                let value = predicate.evaluate(frame.double(lhs)?, frame.double(rhs)?);
                frame.set(*result, RtValue::Bool(value));
            }
            Instruction::UIToFP { result, value } => {
                let value = if frame.flag(value)? { 1.0 } else { 0.0 };
                frame.set(*result, RtValue::F64(value));
            }
            Instruction::Alloca { result } => {
                frame.slots.push(0.0);
                let slot = frame.slots.len() - 1;
                frame.set(*result, RtValue::Ptr(slot));
            }
            Instruction::Load { result, ptr } => {
                let value = frame.slots[frame.slot(ptr)?];
                frame.set(*result, RtValue::F64(value));
            }
            Instruction::Store { value, ptr } => {
                let value = frame.double(value)?;
                let slot = frame.slot(ptr)?;
                frame.slots[slot] = value;
            }
            Instruction::Call { result, callee, args } => {
                let values = args
                    .iter()
                    .map(|arg| frame.double(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                match self.call(callee, &values)? {
                    Invocation::Done(value) => frame.set(*result, RtValue::F64(value)),
                    Invocation::Enter(callee_frame) => {
                        frame.pending = Some(*result);
                        return Ok(Step::Enter(callee_frame));
                    }
                }
            }
            Instruction::Phi { result, incoming, .. } => {
                let from = frame
                    .predecessor
                    .ok_or_else(|| frame.malformed("phi in entry block"))?;
                let (value, _) = incoming
                    .iter()
                    .find(|(_, label)| *label == from)
                    .ok_or_else(|| frame.malformed(format!("phi has no value for L{from}")))?;
                let value = frame.double(value)?;
                frame.set(*result, RtValue::F64(value));
            }
            Instruction::Return(value) => return Ok(Step::Return(frame.double(value)?)),
            Instruction::Branch(label) => frame.jump(*label)?,
            Instruction::BranchCond {
                condition,
                true_label,
                false_label,
            } => {
                let target = if frame.flag(condition)? { *true_label } else { *false_label };
                frame.jump(target)?;
            }
        }

        Ok(Step::Next)
    }
}
