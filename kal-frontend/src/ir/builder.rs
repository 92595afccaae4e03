//! IR Builder
//!
//! Provides utilities for constructing IR one function at a time.

use crate::ir::{BasicBlock, FCmpPredicate, Function, Instruction, IrBinaryOp, IrType, Value};
use kal_common::{LabelId, TempId};

/// Builder for constructing IR
pub struct IrBuilder {
    current_function: Option<Function>,
    current_block: Option<LabelId>,
    next_temp_id: TempId,
    next_label_id: LabelId,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self {
            current_function: None,
            current_block: None,
            next_temp_id: 0,
            next_label_id: 0,
        }
    }

    pub fn new_temp(&mut self) -> TempId {
        let temp = self.next_temp_id;
        self.next_temp_id += 1;
        temp
    }

    pub fn new_label(&mut self) -> LabelId {
        let label = self.next_label_id;
        self.next_label_id += 1;
        label
    }

    /// Start a new function. Any function still under construction is dropped.
    pub fn create_function(&mut self, name: String) -> &mut Function {
        self.next_temp_id = 0;
        self.next_label_id = 0;
        self.current_block = None;
        self.current_function.insert(Function::new(name))
    }

    /// Add the next parameter; parameters take temporaries 0..n in order
    pub fn add_parameter(&mut self, name: String) -> Result<TempId, String> {
        let param_id = self.new_temp();
        match self.current_function {
            Some(ref mut function) => {
                function.add_parameter(param_id, name);
                Ok(param_id)
            }
            None => Err("No current function".to_string()),
        }
    }

    /// Append a block and make it the insertion point
    pub fn create_block(&mut self, label_id: LabelId) -> Result<(), String> {
        match self.current_function {
            Some(ref mut function) => {
                function.add_block(BasicBlock::new(label_id));
                self.current_block = Some(label_id);
                Ok(())
            }
            None => Err("No current function".to_string()),
        }
    }

    /// Block that instructions are currently appended to
    pub fn current_block(&self) -> Option<LabelId> {
        self.current_block
    }

    pub fn build_binary(&mut self, op: IrBinaryOp, lhs: Value, rhs: Value) -> Result<TempId, String> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Binary { result, op, lhs, rhs })?;
        Ok(result)
    }

    pub fn build_compare(&mut self, predicate: FCmpPredicate, lhs: Value, rhs: Value) -> Result<TempId, String> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Compare { result, predicate, lhs, rhs })?;
        Ok(result)
    }

    pub fn build_uitofp(&mut self, value: Value) -> Result<TempId, String> {
        let result = self.new_temp();
        self.add_instruction(Instruction::UIToFP { result, value })?;
        Ok(result)
    }

    /// Allocate a double slot in the entry block, whichever block is current
    pub fn build_entry_alloca(&mut self) -> Result<TempId, String> {
        let result = self.new_temp();
        let entry = self
            .current_function
            .as_mut()
            .ok_or_else(|| "No current function".to_string())?
            .entry_block_mut()
            .ok_or_else(|| "Function has no entry block".to_string())?;
        entry.add_alloca(Instruction::Alloca { result });
        Ok(result)
    }

    pub fn build_load(&mut self, ptr: Value) -> Result<TempId, String> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Load { result, ptr })?;
        Ok(result)
    }

    pub fn build_store(&mut self, value: Value, ptr: Value) -> Result<(), String> {
        self.add_instruction(Instruction::Store { value, ptr })
    }

    pub fn build_call(&mut self, callee: String, args: Vec<Value>) -> Result<TempId, String> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Call { result, callee, args })?;
        Ok(result)
    }

    pub fn build_return(&mut self, value: Value) -> Result<(), String> {
        self.add_instruction(Instruction::Return(value))
    }

    pub fn build_branch(&mut self, label: LabelId) -> Result<(), String> {
        self.add_instruction(Instruction::Branch(label))
    }

    pub fn build_branch_cond(&mut self, condition: Value, true_label: LabelId, false_label: LabelId) -> Result<(), String> {
        self.add_instruction(Instruction::BranchCond { condition, true_label, false_label })
    }

    pub fn build_phi(&mut self, incoming: Vec<(Value, LabelId)>) -> Result<TempId, String> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Phi {
            result,
            incoming,
            result_type: IrType::Double,
        })?;
        Ok(result)
    }

    fn add_instruction(&mut self, instr: Instruction) -> Result<(), String> {
        if let Some(ref mut function) = self.current_function {
            if let Some(block_id) = self.current_block {
                if let Some(block) = function.get_block_mut(block_id) {
                    block.add_instruction(instr);
                    Ok(())
                } else {
                    Err("Current block not found".to_string())
                }
            } else {
                Err("No current block".to_string())
            }
        } else {
            Err("No current function".to_string())
        }
    }

    pub fn current_block_has_terminator(&self) -> bool {
        if let Some(ref function) = self.current_function {
            if let Some(block_id) = self.current_block {
                if let Some(block) = function.get_block(block_id) {
                    return block.has_terminator();
                }
            }
        }
        false
    }

    pub fn finish_function(&mut self) -> Option<Function> {
        self.current_block = None;
        self.current_function.take()
    }
}

impl Default for IrBuilder {
    fn default() -> Self {
        Self::new()
    }
}
