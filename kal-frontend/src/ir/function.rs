//! Function Definitions
//!
//! A function without blocks is a declaration: an extern, or a function
//! that is called before its body has been seen in this module.

use crate::ir::BasicBlock;
use kal_common::{LabelId, TempId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Function in IR. Takes and returns doubles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    /// Parameter temporaries with their source names
    pub parameters: Vec<(TempId, String)>,
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn new(name: String) -> Self {
        Self {
            name,
            parameters: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Body-less declaration with parameters numbered 0..n
    pub fn declaration(name: String, param_names: &[String]) -> Self {
        let mut function = Self::new(name);
        for (i, param) in param_names.iter().enumerate() {
            function.add_parameter(i as TempId, param.clone());
        }
        function
    }

    pub fn add_parameter(&mut self, param_id: TempId, name: String) {
        self.parameters.push((param_id, name));
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|(_, name)| name.as_str())
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn add_block(&mut self, block: BasicBlock) {
        self.blocks.push(block);
    }

    pub fn get_block(&self, id: LabelId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn get_block_mut(&mut self, id: LabelId) -> Option<&mut BasicBlock> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    pub fn entry_block_mut(&mut self) -> Option<&mut BasicBlock> {
        self.blocks.first_mut()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_declaration() {
            write!(f, "declare double @{}(", self.name)?;
            for (i, (_, name)) in self.parameters.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "double %{name}")?;
            }
            return writeln!(f, ")");
        }

        write!(f, "define double @{}(", self.name)?;
        for (i, (id, _)) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "double %{id}")?;
        }
        writeln!(f, ") {{")?;
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        writeln!(f, "}}")
    }
}
