//! Function, extern and call-target lowering

use crate::ast::{Expr, Prototype};
use crate::codegen::{CodeGenerator, CodegenError};
use crate::ir::{Function, Value};
use kal_common::types::ANON_EXPR_NAME;
use log::{debug, trace};

impl CodeGenerator {
    /// Arity of the function `name`, adding a declaration to the current
    /// module when it is only known from an earlier unit's prototype
    pub(crate) fn resolve_function(&mut self, name: &str) -> Option<usize> {
        if let Some(function) = self.module.get_function(name) {
            return Some(function.arity());
        }

        let proto = self.prototypes.get(name)?;
        trace!("declaring {} in module '{}' from prototype", name, self.module.name);
        self.module
            .add_function(Function::declaration(proto.name.clone(), &proto.params));
        Some(proto.params.len())
    }

    /// Parameter names previously declared for `name`, if any
    fn declared_parameters(&self, name: &str) -> Option<Vec<String>> {
        if let Some(function) = self.module.get_function(name) {
            return Some(function.param_names().map(String::from).collect());
        }
        self.prototypes.get(name).map(|proto| proto.params.clone())
    }

    pub(crate) fn lower_extern(&mut self, proto: &Prototype) -> Result<Option<String>, CodegenError> {
        reject_reserved(&proto.name)?;

        let known_arity = self
            .module
            .get_function(&proto.name)
            .map(Function::arity)
            .or_else(|| self.prototypes.get(&proto.name).map(Prototype::arity));

        if let Some(expected) = known_arity {
            if expected != proto.arity() {
                return Err(CodegenError::ConflictingDeclaration {
                    name: proto.name.clone(),
                    expected,
                    found: proto.arity(),
                });
            }
        }

        let has_body = self
            .module
            .get_function(&proto.name)
            .is_some_and(|function| !function.is_declaration());
        if !has_body {
            self.module
                .define_function(Function::declaration(proto.name.clone(), &proto.params));
        }

        if !self.defined.contains(&proto.name) {
            self.prototypes.insert(proto.name.clone(), proto.clone());
        }

        debug!("declared extern {}", proto.name);
        Ok(Some(proto.name.clone()))
    }

    /// Wrap a top-level expression in the zero-argument `__anon_expr`,
    /// replacing the wrapper of an earlier expression still in the module
    pub(crate) fn lower_top_level(&mut self, body: &Expr) -> Result<Option<String>, CodegenError> {
        self.module.remove_function(ANON_EXPR_NAME);

        match self.build_function(&Prototype::anonymous(), body) {
            Ok(function) => {
                self.module.define_function(function);
                Ok(Some(ANON_EXPR_NAME.to_string()))
            }
            Err(err) => {
                self.abandon_function();
                Err(err)
            }
        }
    }

    /// Lower `def proto body` into the current module
    ///
    /// On failure nothing the attempt introduced survives: the partial
    /// function is dropped, a declaration synthesised for it is removed
    /// and any earlier prototype for the name is restored.
    pub(crate) fn lower_definition(&mut self, proto: &Prototype, body: &Expr) -> Result<Option<String>, CodegenError> {
        let name = proto.name.clone();
        reject_reserved(&name)?;

        if self.defined.contains(&name) {
            return Err(CodegenError::Redefinition { name });
        }
        if let Some(expected) = self.declared_parameters(&name) {
            if expected != proto.params {
                return Err(CodegenError::ParameterMismatch {
                    name,
                    expected,
                    found: proto.params.clone(),
                });
            }
        }

        let had_declaration = self.module.get_function(&name).is_some();
        // Registered before the body so the function can call itself
        let previous = self.prototypes.insert(name.clone(), proto.clone());

        match self.build_function(proto, body) {
            Ok(function) => {
                self.module.define_function(function);
                self.defined.insert(name.clone());
                debug!("defined function {name}");
                Ok(Some(name))
            }
            Err(err) => {
                self.abandon_function();
                if !had_declaration {
                    self.module.remove_function(&name);
                }
                match previous {
                    Some(proto) => {
                        self.prototypes.insert(name, proto);
                    }
                    None => {
                        self.prototypes.remove(&name);
                    }
                }
                Err(err)
            }
        }
    }

    /// Drop the function under construction after a failed body
    fn abandon_function(&mut self) {
        self.builder.finish_function();
        self.scopes.clear();
    }

    fn build_function(&mut self, proto: &Prototype, body: &Expr) -> Result<Function, CodegenError> {
        self.builder.create_function(proto.name.clone());

        let mut params = Vec::with_capacity(proto.params.len());
        for name in &proto.params {
            params.push(self.builder.add_parameter(name.clone())?);
        }

        let entry = self.builder.new_label();
        self.builder.create_block(entry)?;

        let result = self.in_scope(|cg| {
            for (name, &param) in proto.params.iter().zip(&params) {
                let slot = cg.builder.build_entry_alloca()?;
                cg.builder.build_store(Value::Temp(param), Value::Temp(slot))?;
                cg.scopes.bind(name, slot);
            }
            cg.lower_expr(body)
        })?;

        self.builder.build_return(result)?;
        self.builder
            .finish_function()
            .ok_or_else(|| CodegenError::from(format!("no function under construction for {}", proto.name)))
    }
}

fn reject_reserved(name: &str) -> Result<(), CodegenError> {
    if name == ANON_EXPR_NAME {
        return Err(CodegenError::ReservedName { name: name.to_string() });
    }
    Ok(())
}
