//! IR Instructions

use crate::ir::{FCmpPredicate, IrBinaryOp, IrType, Value};
use kal_common::{LabelId, TempId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// IR Instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Arithmetic: result = op double lhs, rhs
    Binary {
        result: TempId,
        op: IrBinaryOp,
        lhs: Value,
        rhs: Value,
    },

    /// Comparison: result = fcmp pred double lhs, rhs (i1)
    Compare {
        result: TempId,
        predicate: FCmpPredicate,
        lhs: Value,
        rhs: Value,
    },

    /// Boolean to double: result = uitofp i1 value to double
    UIToFP {
        result: TempId,
        value: Value,
    },

    /// Stack slot for one double: result = alloca double
    Alloca {
        result: TempId,
    },

    /// Load from slot: result = load double, ptr
    Load {
        result: TempId,
        ptr: Value,
    },

    /// Store to slot: store double value, ptr
    Store {
        value: Value,
        ptr: Value,
    },

    /// Direct call by name: result = call double @callee(args...)
    Call {
        result: TempId,
        callee: String,
        args: Vec<Value>,
    },

    /// Return: ret double value
    Return(Value),

    /// Unconditional branch: br label
    Branch(LabelId),

    /// Conditional branch on an i1
    BranchCond {
        condition: Value,
        true_label: LabelId,
        false_label: LabelId,
    },

    /// Phi node: result = phi [val1, label1], [val2, label2], ...
    Phi {
        result: TempId,
        incoming: Vec<(Value, LabelId)>,
        result_type: IrType,
    },
}

impl Instruction {
    /// Temporary defined by this instruction, if any
    pub fn result(&self) -> Option<TempId> {
        match self {
            Instruction::Binary { result, .. }
            | Instruction::Compare { result, .. }
            | Instruction::UIToFP { result, .. }
            | Instruction::Alloca { result }
            | Instruction::Load { result, .. }
            | Instruction::Call { result, .. }
            | Instruction::Phi { result, .. } => Some(*result),
            Instruction::Store { .. }
            | Instruction::Return(_)
            | Instruction::Branch(_)
            | Instruction::BranchCond { .. } => None,
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Return(_) | Instruction::Branch(_) | Instruction::BranchCond { .. }
        )
    }
}

const DOUBLE: IrType = IrType::Double;
const I1: IrType = IrType::I1;
const PTR: IrType = IrType::Ptr;

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Binary { result, op, lhs, rhs } => {
                write!(f, "%{result} = {op} {DOUBLE} {lhs}, {rhs}")
            }
            Instruction::Compare { result, predicate, lhs, rhs } => {
                write!(f, "%{result} = fcmp {predicate} {DOUBLE} {lhs}, {rhs}")
            }
            Instruction::UIToFP { result, value } => {
                write!(f, "%{result} = uitofp {I1} {value} to {DOUBLE}")
            }
            Instruction::Alloca { result } => write!(f, "%{result} = alloca {DOUBLE}"),
            Instruction::Load { result, ptr } => write!(f, "%{result} = load {DOUBLE}, {PTR} {ptr}"),
            Instruction::Store { value, ptr } => write!(f, "store {DOUBLE} {value}, {PTR} {ptr}"),
            Instruction::Call { result, callee, args } => {
                write!(f, "%{result} = call {DOUBLE} @{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{DOUBLE} {arg}")?;
                }
                write!(f, ")")
            }
            Instruction::Return(value) => write!(f, "ret {DOUBLE} {value}"),
            Instruction::Branch(label) => write!(f, "br label %L{label}"),
            Instruction::BranchCond { condition, true_label, false_label } => {
                write!(f, "br {I1} {condition}, label %L{true_label}, label %L{false_label}")
            }
            Instruction::Phi { result, incoming, result_type } => {
                write!(f, "%{result} = phi {result_type} ")?;
                for (i, (value, label)) in incoming.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{value}, %L{label}]")?;
                }
                Ok(())
            }
        }
    }
}
