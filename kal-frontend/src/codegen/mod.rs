//! Lowering from the AST to IR
//!
//! The generator owns the module being filled and a registry of every
//! prototype it has seen. The registry outlives modules: once the caller
//! takes a finished module with [`CodeGenerator::take_module`], calls in
//! later units are resolved by re-declaring the callee in the new module.

mod errors;
mod expressions;
mod functions;
mod scope;

pub use errors::CodegenError;

use crate::ast::{Expr, Function, Prototype, Unit, UnitVisitor};
use crate::ir::{IrBuilder, Module};
use kal_common::{CompilerError, LabelId};
use log::debug;
use scope::ScopeStack;
use std::collections::{HashMap, HashSet};

pub struct CodeGenerator {
    module: Module,
    builder: IrBuilder,
    scopes: ScopeStack,
    prototypes: HashMap<String, Prototype>,
    /// Names with a body in this or an earlier module
    defined: HashSet<String>,
}

impl CodeGenerator {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module: Module::new(module_name.into()),
            builder: IrBuilder::new(),
            scopes: ScopeStack::new(),
            prototypes: HashMap::new(),
            defined: HashSet::new(),
        }
    }

    /// The module currently being filled
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Hand off the current module and start an empty one of the same name
    pub fn take_module(&mut self) -> Module {
        let fresh = Module::new(self.module.name.clone());
        debug!("taking module '{}' ({} functions)", self.module.name, self.module.functions.len());
        std::mem::replace(&mut self.module, fresh)
    }

    /// Prototype registered for `name` by an extern or definition
    pub fn prototype(&self, name: &str) -> Option<&Prototype> {
        self.prototypes.get(name)
    }

    /// Lower one top-level unit. Returns the name of the function added
    /// to the module, or `None` at end of input.
    pub fn lower_unit(&mut self, unit: &Unit) -> Result<Option<String>, CompilerError> {
        crate::ast::walk_unit(self, unit).map_err(CompilerError::from)
    }

    /// Run `f` with a fresh innermost scope frame
    fn in_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, CodegenError>) -> Result<T, CodegenError> {
        self.scopes.push_frame();
        let result = f(self);
        self.scopes.pop_frame();
        result
    }

    fn current_block(&self) -> Result<LabelId, CodegenError> {
        self.builder
            .current_block()
            .ok_or_else(|| CodegenError::from("no current block".to_string()))
    }
}

impl UnitVisitor for CodeGenerator {
    type Output = Result<Option<String>, CodegenError>;

    fn visit_expression(&mut self, expr: &Expr) -> Self::Output {
        self.lower_top_level(expr)
    }

    fn visit_definition(&mut self, function: &Function) -> Self::Output {
        self.lower_definition(&function.proto, &function.body)
    }

    fn visit_extern(&mut self, proto: &Prototype) -> Self::Output {
        self.lower_extern(proto)
    }

    fn visit_end_of_input(&mut self) -> Self::Output {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Instruction;
    use crate::parser::Parser;
    use kal_common::types::ANON_EXPR_NAME;
    use pretty_assertions::assert_eq;

    /// Parse and lower every unit, returning each unit's result
    fn lower_all(cg: &mut CodeGenerator, source: &str) -> Vec<Result<Option<String>, CompilerError>> {
        let mut parser = Parser::from_text(source);
        let mut results = Vec::new();
        loop {
            let unit = parser.parse_unit().unwrap();
            if unit.is_end_of_input() {
                break;
            }
            results.push(cg.lower_unit(&unit));
        }
        results
    }

    fn lower_ok(source: &str) -> CodeGenerator {
        let mut cg = CodeGenerator::new("test");
        for result in lower_all(&mut cg, source) {
            result.unwrap();
        }
        cg
    }

    fn lower_err(source: &str) -> CompilerError {
        let mut cg = CodeGenerator::new("test");
        lower_all(&mut cg, source)
            .into_iter()
            .find_map(Result::err)
            .expect("expected a lowering error")
    }

    fn calls_in(cg: &CodeGenerator, function: &str) -> Vec<String> {
        cg.module()
            .get_function(function)
            .unwrap()
            .blocks
            .iter()
            .flat_map(|b| &b.instructions)
            .filter_map(|inst| match inst {
                Instruction::Call { callee, .. } => Some(callee.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_simple_definition() {
        let cg = lower_ok("def add(a b) a + b;");
        let add = cg.module().get_function("add").unwrap();
        assert_eq!(add.arity(), 2);
        assert!(!add.is_declaration());
        assert_eq!(add.param_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_top_level_expression_is_anonymous() {
        let mut cg = CodeGenerator::new("test");
        let results = lower_all(&mut cg, "1 + 2; 3;");
        assert_eq!(results[1], Ok(Some(ANON_EXPR_NAME.to_string())));
        // The second wrapper replaced the first
        let anon: Vec<_> = cg
            .module()
            .functions
            .iter()
            .filter(|f| f.name == ANON_EXPR_NAME)
            .collect();
        assert_eq!(anon.len(), 1);
    }

    #[test]
    fn test_extern_adds_declaration() {
        let cg = lower_ok("extern sin(x);");
        let sin = cg.module().get_function("sin").unwrap();
        assert!(sin.is_declaration());
        assert_eq!(sin.to_string(), "declare double @sin(double %x)\n");
    }

    #[test]
    fn test_call_across_modules_redeclares_callee() {
        let mut cg = CodeGenerator::new("test");
        lower_all(&mut cg, "def sq(x) x * x;");
        let first = cg.take_module();
        assert!(first.get_function("sq").is_some());
        assert!(cg.module().is_empty());

        lower_all(&mut cg, "sq(3);");
        let sq = cg.module().get_function("sq").unwrap();
        assert!(sq.is_declaration());
        assert_eq!(calls_in(&cg, ANON_EXPR_NAME), vec!["sq"]);
    }

    #[test]
    fn test_recursive_definition() {
        let cg = lower_ok("def fib(n) if n < 2 then n else fib(n - 1) + fib(n - 2);");
        let fib = cg.module().get_function("fib").unwrap();
        assert!(!fib.is_declaration());
        assert_eq!(calls_in(&cg, "fib"), vec!["fib", "fib"]);
        assert_eq!(cg.module().functions.len(), 1);
    }

    #[test]
    fn test_unknown_variable() {
        let err = lower_err("def f(x) y;");
        assert_eq!(err.to_string(), "Code generation error: Unknown variable name 'y'");
    }

    #[test]
    fn test_unknown_function() {
        let err = lower_err("nothere(1);");
        assert_eq!(
            err.to_string(),
            "Code generation error: Unknown function referenced 'nothere'"
        );
    }

    #[test]
    fn test_arity_mismatch() {
        let err = lower_err("extern f(a b); f(1);");
        assert_eq!(
            err.to_string(),
            "Code generation error: Incorrect # arguments passed to 'f': expected 2, found 1"
        );
    }

    #[test]
    fn test_redefinition_keeps_first_body() {
        let mut cg = CodeGenerator::new("test");
        let results = lower_all(&mut cg, "def f(x) x; def f(x) x + 1;");
        assert!(results[0].is_ok());
        assert_eq!(
            results[1].as_ref().unwrap_err().to_string(),
            "Code generation error: Function 'f' cannot be redefined"
        );
        let f = cg.module().get_function("f").unwrap();
        let has_add = f
            .blocks
            .iter()
            .flat_map(|b| &b.instructions)
            .any(|inst| matches!(inst, Instruction::Binary { .. }));
        assert!(!has_add);
    }

    #[test]
    fn test_redefinition_rejected_after_module_handoff() {
        let mut cg = CodeGenerator::new("test");
        lower_all(&mut cg, "def f(x) x;");
        cg.take_module();
        let results = lower_all(&mut cg, "def f(x) x;");
        assert!(results[0].is_err());
    }

    #[test]
    fn test_parameter_names_must_match_extern() {
        let err = lower_err("extern foo(a b); def foo(x y) x;");
        assert_eq!(
            err.to_string(),
            "Code generation error: arg names do not match prototype for 'foo': expected (a b), found (x y)"
        );
    }

    #[test]
    fn test_definition_matching_extern() {
        let cg = lower_ok("extern foo(a b); def foo(a b) a;");
        assert!(!cg.module().get_function("foo").unwrap().is_declaration());
    }

    #[test]
    fn test_conflicting_extern() {
        let err = lower_err("extern foo(a); extern foo(a b);");
        assert!(err.to_string().contains("conflicts"));
    }

    #[test]
    fn test_failed_definition_leaves_no_trace() {
        let mut cg = CodeGenerator::new("test");
        let results = lower_all(&mut cg, "def g(x) g(x) + y;");
        assert!(results[0].is_err());
        assert!(cg.module().get_function("g").is_none());
        assert!(cg.prototype("g").is_none());

        // The name is still free to define
        let results = lower_all(&mut cg, "def g(x) x;");
        assert!(results[0].is_ok());
    }

    #[test]
    fn test_assignment_requires_variable() {
        let err = lower_err("def f(x) (x + 1) = 2;");
        assert_eq!(
            err.to_string(),
            "Code generation error: destination of '=' must be a variable"
        );
    }

    #[test]
    fn test_assignment_to_unknown_variable() {
        let err = lower_err("def f(x) y = 2;");
        assert!(err.to_string().contains("Unknown variable name 'y'"));
    }

    #[test]
    fn test_for_loop_variable_shadows_parameter() {
        // After the loop `i` refers to the parameter's slot again
        let cg = lower_ok("extern putchard(c); def f(i) (for i = 0, i < 3 in putchard(i)) : i;");
        let f = cg.module().get_function("f").unwrap();
        let entry = f.entry_block().unwrap();
        let allocas = entry
            .instructions
            .iter()
            .filter(|inst| matches!(inst, Instruction::Alloca { .. }))
            .count();
        assert_eq!(allocas, 2);

        let param_slot = entry
            .instructions
            .iter()
            .find_map(|inst| match inst {
                Instruction::Alloca { result } => Some(*result),
                _ => None,
            })
            .unwrap();
        let last_block = f.blocks.last().unwrap();
        let last_load = last_block
            .instructions
            .iter()
            .rev()
            .find_map(|inst| match inst {
                Instruction::Load { ptr, .. } => Some(*ptr),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_load, crate::ir::Value::Temp(param_slot));
    }

    #[test]
    fn test_loop_variable_not_visible_after_loop() {
        let err = lower_err("extern putchard(c); def f() (for k = 0, k < 3 in putchard(k)) : k;");
        assert!(err.to_string().contains("Unknown variable name 'k'"));
    }

    #[test]
    fn test_var_initializer_sees_outer_binding() {
        let cg = lower_ok("def f(a) var a = a + 1 in a;");
        assert!(cg.module().get_function("f").is_some());
    }

    #[test]
    fn test_var_binding_not_visible_in_own_initializer() {
        let err = lower_err("def f() var z = z in z;");
        assert!(err.to_string().contains("Unknown variable name 'z'"));
    }

    #[test]
    fn test_user_binary_operator_lowers_to_call() {
        let cg = lower_ok("def binary| 5 (a b) if a then 1 else if b then 1 else 0; def f(x y) x | y;");
        assert_eq!(calls_in(&cg, "f"), vec!["binary|"]);
    }

    #[test]
    fn test_user_unary_operator_lowers_to_call() {
        let cg = lower_ok("def unary!(v) if v then 0 else 1; def f(x) !x;");
        assert_eq!(calls_in(&cg, "f"), vec!["unary!"]);
    }

    #[test]
    fn test_builtin_operators_stay_instructions() {
        let cg = lower_ok("def f(a b) a < b;");
        let f = cg.module().get_function("f").unwrap();
        let text = f.to_string();
        assert!(text.contains("fcmp ult"));
        assert!(text.contains("uitofp"));
        assert!(calls_in(&cg, "f").is_empty());
    }

    #[test]
    fn test_if_uses_phi_in_merge_block() {
        let cg = lower_ok("def f(x) if x then 1 else 2;");
        let f = cg.module().get_function("f").unwrap();
        let merge = f.blocks.last().unwrap();
        assert!(matches!(merge.instructions[0], Instruction::Phi { .. }));
        assert!(f.to_string().contains("fcmp one"));
    }

    #[test]
    fn test_bad_call_leaves_no_wrapper() {
        let mut cg = CodeGenerator::new("test");
        let results = lower_all(&mut cg, "extern f(a b); f(1); f(2, nothere(3));");
        assert!(results[1].is_err());
        assert_eq!(
            results[2].as_ref().unwrap_err().to_string(),
            "Code generation error: Unknown function referenced 'nothere'"
        );
        assert!(cg.module().get_function(ANON_EXPR_NAME).is_none());
    }

    #[test]
    fn test_undefined_operators() {
        let mut cg = CodeGenerator::new("test");
        let binary = Unit::Expression(Expr::binary('|', Expr::number(1.0), Expr::number(2.0)));
        assert_eq!(
            cg.lower_unit(&binary).unwrap_err().to_string(),
            "Code generation error: Unknown binary operator '|'"
        );

        let unary = Unit::Expression(Expr::unary('!', Expr::number(1.0)));
        assert_eq!(
            cg.lower_unit(&unary).unwrap_err().to_string(),
            "Code generation error: Unknown unary operator '!'"
        );
    }

    #[test]
    fn test_wrapper_name_is_reserved() {
        let mut cg = CodeGenerator::new("test");
        let results = lower_all(&mut cg, "1; def __anon_expr() 2; extern __anon_expr();");
        for result in &results[1..] {
            assert_eq!(
                result.as_ref().unwrap_err().to_string(),
                "Code generation error: '__anon_expr' is reserved for top-level expressions"
            );
        }
        // The wrapper from the first unit is untouched
        assert_eq!(calls_in(&cg, ANON_EXPR_NAME), Vec::<String>::new());
        assert!(cg.prototype(ANON_EXPR_NAME).is_none());
    }

    #[test]
    fn test_sequence_operator() {
        let cg = lower_ok("extern putchard(c); def f() putchard(65) : putchard(66);");
        assert_eq!(calls_in(&cg, "f"), vec!["putchard", "putchard"]);
    }
}
