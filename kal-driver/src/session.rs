//! Top-level session: parser, code generator and execution engine
//!
//! Each definition is lowered into its own module and handed to the engine
//! for good. Each top-level expression is lowered into a module that is
//! loaded, run once and unloaded again.

use kal_common::{CompilerError, ErrorReporter, ANON_EXPR_NAME};
use kal_frontend::ast::walk_unit;
use kal_frontend::{CharSource, CodeGenerator, Expr, Function, Parser, Prototype, TokenKind, UnitVisitor};
use kal_vm::ExecutionEngine;
use log::debug;
use std::io::Write;

pub const PROMPT: &str = "ready> ";

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Print each lowered function's IR
    pub print_ir: bool,
    /// Print each parsed unit as JSON
    pub emit_ast: bool,
    /// Print a prompt before reading each unit
    pub prompt: bool,
}

/// Result of handling one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error,
    EndOfInput,
}

/// Diagnostics, prompts and evaluation results go to `W`; program output
/// goes wherever the engine sends it.
pub struct Session<S: CharSource, W: Write> {
    parser: Parser<S>,
    codegen: CodeGenerator,
    engine: ExecutionEngine,
    reporter: ErrorReporter,
    diagnostics: W,
    options: SessionOptions,
}

impl<S: CharSource, W: Write> Session<S, W> {
    pub fn new(parser: Parser<S>, engine: ExecutionEngine, diagnostics: W, options: SessionOptions) -> Self {
        Self {
            parser,
            codegen: CodeGenerator::new("kal"),
            engine,
            reporter: ErrorReporter::new(),
            diagnostics,
            options,
        }
    }

    /// Handle units until end of input, then print the error summary if
    /// anything failed. Only a failure to write diagnostics is an `Err`.
    pub fn run(&mut self) -> Result<(), CompilerError> {
        while self.step()? != Outcome::EndOfInput {}

        if self.options.print_ir && !self.codegen.module().is_empty() {
            write!(self.diagnostics, "{}", self.codegen.module())?;
        }
        if self.reporter.has_errors() {
            writeln!(self.diagnostics, "{}", self.reporter.summary())?;
        }
        self.diagnostics.flush()?;
        Ok(())
    }

    /// Read and handle a single unit
    pub fn step(&mut self) -> Result<Outcome, CompilerError> {
        if self.options.prompt {
            write!(self.diagnostics, "{PROMPT}")?;
            self.diagnostics.flush()?;
        }

        let unit = match self.parser.parse_unit() {
            Ok(unit) => unit,
            Err(err) => {
                let outcome = self.report(err)?;
                self.synchronize();
                return Ok(outcome);
            }
        };

        if self.options.emit_ast && !unit.is_end_of_input() {
            let json = serde_json::to_string(&unit).map_err(|e| CompilerError::from(e.to_string()))?;
            writeln!(self.diagnostics, "{json}")?;
        }

        walk_unit(self, &unit)
    }

    /// Skip input through the next `;` so the following unit parses cleanly
    fn synchronize(&mut self) {
        loop {
            let token = self.parser.current_token();
            let at_end = token.kind == TokenKind::Eof;
            let at_terminator = token.kind.is_char(';');
            if at_end {
                return;
            }
            self.parser.skip_token();
            if at_terminator {
                return;
            }
        }
    }

    fn report(&mut self, err: CompilerError) -> Result<Outcome, CompilerError> {
        writeln!(self.diagnostics, "Error: {err}")?;
        self.reporter.report(&err);
        Ok(Outcome::Error)
    }

    /// Print the IR of `name` from the module still being filled
    fn print_function(&mut self, heading: &str, name: &str) -> Result<(), CompilerError> {
        if !self.options.print_ir {
            return Ok(());
        }
        writeln!(self.diagnostics, "{heading}")?;
        if let Some(function) = self.codegen.module().get_function(name) {
            writeln!(self.diagnostics, "{function}")?;
        }
        Ok(())
    }

    fn evaluate(&mut self) -> Result<f64, CompilerError> {
        let key = self.engine.add_module(self.codegen.take_module());
        let result = self
            .engine
            .lookup(ANON_EXPR_NAME)
            .and_then(|entry| self.engine.invoke(&entry));
        self.engine.remove_module(key);
        result.map_err(CompilerError::from)
    }

    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    pub fn has_errors(&self) -> bool {
        self.reporter.has_errors()
    }

    pub fn engine_mut(&mut self) -> &mut ExecutionEngine {
        &mut self.engine
    }

    pub fn diagnostics(&self) -> &W {
        &self.diagnostics
    }
}

impl<S: CharSource, W: Write> UnitVisitor for Session<S, W> {
    type Output = Result<Outcome, CompilerError>;

    fn visit_expression(&mut self, expr: &Expr) -> Self::Output {
        if let Err(err) = self.codegen.visit_expression(expr) {
            return self.report(err.into());
        }
        self.print_function("Read top-level expression:", ANON_EXPR_NAME)?;

        match self.evaluate() {
            Ok(value) => {
                writeln!(self.diagnostics, "Evaluated to {value}")?;
                Ok(Outcome::Success)
            }
            Err(err) => self.report(err),
        }
    }

    fn visit_definition(&mut self, function: &Function) -> Self::Output {
        if let Err(err) = self.codegen.visit_definition(function) {
            return self.report(err.into());
        }
        self.print_function("Read function definition:", &function.proto.name)?;

        let module = self.codegen.take_module();
        self.engine.add_module(module);
        debug!("function {} is now callable", function.proto.name);
        Ok(Outcome::Success)
    }

    fn visit_extern(&mut self, proto: &Prototype) -> Self::Output {
        if let Err(err) = self.codegen.visit_extern(proto) {
            return self.report(err.into());
        }
        self.print_function("Read extern:", &proto.name)?;
        Ok(Outcome::Success)
    }

    fn visit_end_of_input(&mut self) -> Self::Output {
        Ok(Outcome::EndOfInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kal_frontend::StrSource;
    use pretty_assertions::assert_eq;

    fn session(source: &str, options: SessionOptions) -> Session<StrSource, Vec<u8>> {
        Session::new(Parser::from_text(source), ExecutionEngine::new(), Vec::new(), options)
    }

    fn transcript(session: &Session<StrSource, Vec<u8>>) -> String {
        String::from_utf8_lossy(session.diagnostics()).into_owned()
    }

    #[test]
    fn test_evaluates_expressions() {
        let mut s = session("def double(x) x * 2; double(21);", SessionOptions::default());
        s.run().unwrap();
        assert_eq!(transcript(&s), "Evaluated to 42\n");
        assert!(!s.has_errors());
    }

    #[test]
    fn test_step_outcomes() {
        let mut s = session("1; foo(); 2", SessionOptions::default());
        assert_eq!(s.step().unwrap(), Outcome::Success);
        assert_eq!(s.step().unwrap(), Outcome::Error);
        assert_eq!(s.step().unwrap(), Outcome::Success);
        assert_eq!(s.step().unwrap(), Outcome::EndOfInput);
        assert_eq!(s.step().unwrap(), Outcome::EndOfInput);
    }

    #[test]
    fn test_prompt_before_each_unit() {
        let options = SessionOptions {
            prompt: true,
            ..SessionOptions::default()
        };
        let mut s = session("1;", options);
        s.run().unwrap();
        assert_eq!(transcript(&s), "ready> Evaluated to 1\nready> ");
    }

    #[test]
    fn test_parse_error_resynchronises() {
        let mut s = session("def (x) x; 1 + 2;", SessionOptions::default());
        s.run().unwrap();
        let text = transcript(&s);
        assert!(text.starts_with("Error: Parse error at <input>:1:5"), "{text}");
        assert!(text.contains("Evaluated to 3\n"));
        assert!(text.ends_with("1 error\n"));
        assert_eq!(s.reporter().error_count(), 1);
    }

    #[test]
    fn test_codegen_error_continues() {
        let mut s = session("def f(x) y; def f(x) x + 1; f(1);", SessionOptions::default());
        s.run().unwrap();
        let text = transcript(&s);
        assert!(text.contains("Error: Code generation error: Unknown variable name 'y'"));
        assert!(text.contains("Evaluated to 2\n"));
    }

    #[test]
    fn test_execution_error_reported() {
        let mut s = session("extern nowhere(x); nowhere(1);", SessionOptions::default());
        s.run().unwrap();
        let text = transcript(&s);
        assert!(text.contains("Error: Execution error: unresolved symbol 'nowhere'"), "{text}");
        assert!(s.has_errors());
    }

    #[test]
    fn test_print_ir() {
        let options = SessionOptions {
            print_ir: true,
            ..SessionOptions::default()
        };
        let mut s = session("def id(x) x; extern sin(x);", options);
        s.run().unwrap();
        let text = transcript(&s);
        assert!(text.starts_with("Read function definition:\ndefine double @id(double %0) {\n"));
        assert!(text.contains("Read extern:\ndeclare double @sin(double %x)\n"));
        // The extern is still in the unfinished module at the end
        assert!(text.ends_with("; ModuleID = 'kal'\n\ndeclare double @sin(double %x)\n"), "{text}");
    }

    #[test]
    fn test_emit_ast() {
        let options = SessionOptions {
            emit_ast: true,
            ..SessionOptions::default()
        };
        let mut s = session("x;", options);
        s.run().unwrap();
        let text = transcript(&s);
        let first_line = text.lines().next().unwrap();
        let value: serde_json::Value = serde_json::from_str(first_line).unwrap();
        assert_eq!(value["Expression"]["Variable"], "x");
    }

    #[test]
    fn test_program_output_stays_in_engine() {
        let mut s = session("extern putchard(c); putchard(33);", SessionOptions::default());
        s.run().unwrap();
        assert_eq!(s.engine_mut().take_output(), "!");
        assert_eq!(transcript(&s), "Evaluated to 0\n");
    }
}
