use crate::error::CompileError;
use crate::ir::ast;

use super::Emitter;

#[derive(Debug, Default)]
pub struct JsonEmitter;

impl JsonEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Emitter for JsonEmitter {
    fn emit(&mut self, program: &ast::Program) -> Result<String, CompileError> {
        Ok(serde_json::to_string_pretty(program)?)
    }
}
