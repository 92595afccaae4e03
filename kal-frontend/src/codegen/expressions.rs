//! Expression lowering
//!
//! Every expression produces a double-typed `Value`. Mutable variables
//! live in entry-block allocas and are read with a load at each use.

use crate::ast::{walk_expr, Expr, ExprVisitor};
use crate::codegen::{CodeGenerator, CodegenError};
use crate::ir::{FCmpPredicate, IrBinaryOp, Value};
use log::trace;

impl CodeGenerator {
    pub(crate) fn lower_expr(&mut self, expr: &Expr) -> Result<Value, CodegenError> {
        walk_expr(self, expr)
    }

    /// Non-zero test used by `if` and loop conditions
    fn lower_condition(&mut self, expr: &Expr) -> Result<Value, CodegenError> {
        let value = self.lower_expr(expr)?;
        let flag = self
            .builder
            .build_compare(FCmpPredicate::One, value, Value::Constant(0.0))?;
        Ok(Value::Temp(flag))
    }

    /// Fail unless `callee` resolves to a function taking `found` arguments
    fn check_callee(&mut self, callee: &str, found: usize) -> Result<(), CodegenError> {
        let expected = self
            .resolve_function(callee)
            .ok_or_else(|| CodegenError::UnknownFunction {
                name: callee.to_string(),
            })?;

        if expected != found {
            return Err(CodegenError::ArityMismatch {
                name: callee.to_string(),
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Call an operator function on already-lowered operands; `unknown`
    /// is reported when no such operator was defined
    fn lower_operator_call(&mut self, callee: &str, args: Vec<Value>, unknown: CodegenError) -> Result<Value, CodegenError> {
        match self.check_callee(callee, args.len()) {
            Err(CodegenError::UnknownFunction { .. }) => return Err(unknown),
            checked => checked?,
        }
        let result = self.builder.build_call(callee.to_string(), args)?;
        Ok(Value::Temp(result))
    }

    /// `name = value`: store into the variable's slot and yield the value
    fn lower_assignment(&mut self, target: &Expr, value: &Expr) -> Result<Value, CodegenError> {
        let Expr::Variable(name) = target else {
            return Err(CodegenError::InvalidAssignmentTarget);
        };

        let value = self.lower_expr(value)?;
        let slot = self
            .scopes
            .lookup(name)
            .ok_or_else(|| CodegenError::UnknownVariable { name: name.clone() })?;

        self.builder.build_store(value, Value::Temp(slot))?;
        Ok(value)
    }
}

impl ExprVisitor for CodeGenerator {
    type Output = Result<Value, CodegenError>;

    fn visit_number(&mut self, value: f64) -> Self::Output {
        Ok(Value::Constant(value))
    }

    fn visit_variable(&mut self, name: &str) -> Self::Output {
        let slot = self
            .scopes
            .lookup(name)
            .ok_or_else(|| CodegenError::UnknownVariable {
                name: name.to_string(),
            })?;
        let value = self.builder.build_load(Value::Temp(slot))?;
        Ok(Value::Temp(value))
    }

    fn visit_unary(&mut self, op: char, operand: &Expr) -> Self::Output {
        let operand = self.lower_expr(operand)?;

        let callee = format!("unary{op}");
        self.lower_operator_call(&callee, vec![operand], CodegenError::UnknownUnaryOperator { op })
    }

    fn visit_binary(&mut self, op: char, lhs: &Expr, rhs: &Expr) -> Self::Output {
        match op {
            '=' => return self.lower_assignment(lhs, rhs),
            ':' => {
                self.lower_expr(lhs)?;
                return self.lower_expr(rhs);
            }
            _ => {}
        }

        let l = self.lower_expr(lhs)?;
        let r = self.lower_expr(rhs)?;

        if let Some(ir_op) = IrBinaryOp::from_char(op) {
            let result = self.builder.build_binary(ir_op, l, r)?;
            return Ok(Value::Temp(result));
        }

        if let Some(predicate) = FCmpPredicate::from_char(op) {
            let flag = self.builder.build_compare(predicate, l, r)?;
            let result = self.builder.build_uitofp(Value::Temp(flag))?;
            return Ok(Value::Temp(result));
        }

        let callee = format!("binary{op}");
        trace!("lowering user operator '{op}' as call to {callee}");
        self.lower_operator_call(&callee, vec![l, r], CodegenError::UnknownBinaryOperator { op })
    }

    fn visit_call(&mut self, callee: &str, args: &[Expr]) -> Self::Output {
        // Checked before the arguments so a bad call lowers no code
        self.check_callee(callee, args.len())?;

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.lower_expr(arg)?);
        }
        let result = self.builder.build_call(callee.to_string(), values)?;
        Ok(Value::Temp(result))
    }

    fn visit_if(&mut self, cond: &Expr, then_branch: &Expr, else_branch: &Expr) -> Self::Output {
        let condition = self.lower_condition(cond)?;

        let then_label = self.builder.new_label();
        let else_label = self.builder.new_label();
        let merge_label = self.builder.new_label();

        self.builder.build_branch_cond(condition, then_label, else_label)?;

        // Lowering a branch may leave us in a different block than the one
        // it started in; the phi must name the block that actually jumps
        // to the merge point.
        self.builder.create_block(then_label)?;
        let then_value = self.lower_expr(then_branch)?;
        self.builder.build_branch(merge_label)?;
        let then_end = self.current_block()?;

        self.builder.create_block(else_label)?;
        let else_value = self.lower_expr(else_branch)?;
        self.builder.build_branch(merge_label)?;
        let else_end = self.current_block()?;

        self.builder.create_block(merge_label)?;
        let result = self
            .builder
            .build_phi(vec![(then_value, then_end), (else_value, else_end)])?;
        Ok(Value::Temp(result))
    }

    fn visit_for(&mut self, var: &str, start: &Expr, end: &Expr, step: Option<&Expr>, body: &Expr) -> Self::Output {
        // Start is evaluated before the loop variable is in scope
        let start_value = self.lower_expr(start)?;
        let slot = self.builder.build_entry_alloca()?;
        self.builder.build_store(start_value, Value::Temp(slot))?;

        let loop_label = self.builder.new_label();
        let after_label = self.builder.new_label();
        self.builder.build_branch(loop_label)?;
        self.builder.create_block(loop_label)?;

        self.in_scope(|cg| {
            cg.scopes.bind(var, slot);

            cg.lower_expr(body)?;

            let step_value = match step {
                Some(step) => cg.lower_expr(step)?,
                None => Value::Constant(1.0),
            };
            let current = cg.builder.build_load(Value::Temp(slot))?;
            let next = cg
                .builder
                .build_binary(IrBinaryOp::FAdd, Value::Temp(current), step_value)?;
            cg.builder.build_store(Value::Temp(next), Value::Temp(slot))?;

            let condition = cg.lower_condition(end)?;
            cg.builder.build_branch_cond(condition, loop_label, after_label)?;
            Ok(())
        })?;

        self.builder.create_block(after_label)?;
        Ok(Value::Constant(0.0))
    }

    fn visit_var(&mut self, bindings: &[(String, Expr)], body: &Expr) -> Self::Output {
        self.in_scope(|cg| {
            for (name, init) in bindings {
                // The initializer sees earlier bindings but not this one
                let value = cg.lower_expr(init)?;
                let slot = cg.builder.build_entry_alloca()?;
                cg.builder.build_store(value, Value::Temp(slot))?;
                cg.scopes.bind(name, slot);
            }
            cg.lower_expr(body)
        })
    }
}
