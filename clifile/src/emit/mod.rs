pub mod json;
pub mod tree;

use crate::error::CompileError;
use crate::ir::ast;

pub trait Emitter {
    fn emit(&mut self, program: &ast::Program) -> Result<String, CompileError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterType {
    Json,
    Tree,
}

impl EmitterType {
    pub fn all() -> Vec<Self> {
        vec![Self::Json, Self::Tree]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Tree => "tree",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Json => "Program structure as JSON",
            Self::Tree => "Command outline with documentation",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|emitter| emitter.name() == name)
    }

    pub fn create(&self) -> Box<dyn Emitter> {
        match self {
            Self::Json => Box::new(json::JsonEmitter::new()),
            Self::Tree => Box::new(tree::TreeEmitter::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        for emitter in EmitterType::all() {
            assert_eq!(EmitterType::from_name(emitter.name()), Some(emitter));
        }
        assert_eq!(EmitterType::from_name("yaml"), None);
    }
}
