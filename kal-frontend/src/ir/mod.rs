//! Intermediate Representation for Kaleidoscope
//!
//! A small SSA-flavoured IR over doubles, shaped after LLVM IR so the
//! lowering rules read the same way: allocas for mutable variables,
//! explicit loads and stores, phis at control-flow joins.
//!
//! ## Architecture
//!
//! - `types` - IrType
//! - `values` - Value representations
//! - `ops` - arithmetic operations and comparison predicates
//! - `instructions` - IR instructions
//! - `blocks` - Basic block management
//! - `function` - Function definitions and declarations
//! - `module` - Module (the compilation unit)
//! - `builder` - IR construction utilities

pub use self::blocks::BasicBlock;
pub use self::builder::IrBuilder;
pub use self::function::Function;
pub use self::instructions::Instruction;
pub use self::module::Module;
pub use self::ops::{FCmpPredicate, IrBinaryOp};
pub use self::types::IrType;
pub use self::values::Value;

mod blocks;
mod builder;
mod function;
mod instructions;
mod module;
mod ops;
mod types;
mod values;
