//! Kaleidoscope Compiler - Frontend
//!
//! This crate provides the frontend components for the Kaleidoscope
//! compiler:
//! - Lexer: turns a character stream into tokens
//! - Parser: builds one top-level AST unit at a time
//! - AST: expression, prototype and function definitions
//! - IR: a small SSA-style module format with textual display
//! - Codegen: lowers AST units into IR modules

pub mod ast;
pub mod codegen;
pub mod ir;
pub mod lexer;
pub mod parser;

pub use ast::{Expr, ExprVisitor, Function, Prototype, PrototypeKind, Unit, UnitVisitor};
pub use codegen::{CodeGenerator, CodegenError};
pub use lexer::{CharSource, Lexer, ReaderSource, StrSource, Token, TokenKind};
pub use parser::{ParseError, Parser};

use crate::ir::Module;
use kal_common::CompilerError;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Parse every top-level unit in `source`
    pub fn parse_source(source: &str) -> Result<Vec<Unit>, CompilerError> {
        let mut parser = Parser::from_text(source);
        let mut units = Vec::new();

        loop {
            let unit = parser.parse_unit()?;
            if unit.is_end_of_input() {
                break;
            }
            units.push(unit);
        }

        Ok(units)
    }

    /// Parse and lower `source` into a single IR module
    pub fn compile_to_ir(source: &str, module_name: &str) -> Result<Module, CompilerError> {
        let units = Self::parse_source(source)?;

        let mut codegen = CodeGenerator::new(module_name);
        for unit in &units {
            codegen.lower_unit(unit)?;
        }

        Ok(codegen.take_module())
    }

    /// Tokenize source code, ending with the end-of-input token
    pub fn tokenize_source(source: &str) -> Vec<Token> {
        Lexer::from_text(source).tokenize()
    }
}
