use crate::error::CompileError;
use crate::ir::ast::{Program, Rule};

use super::Emitter;

/// Renders the program as a help-like outline, two spaces per level.
#[derive(Debug, Default)]
pub struct TreeEmitter {
    out: String,
}

impl TreeEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit_rule(&mut self, rule: &Rule, depth: usize) {
        let mut label = format!("{}{}", "  ".repeat(depth), rule.name());
        for param in rule.positional() {
            label.push_str(&format!(" <{param}>"));
        }
        match rule.summary() {
            "" => self.out.push_str(&label),
            summary => self.out.push_str(&format!("{label:<24} {summary}")),
        }
        self.out.push('\n');

        for child in rule.children() {
            self.emit_rule(child, depth + 1);
        }
    }
}

impl Emitter for TreeEmitter {
    fn emit(&mut self, program: &Program) -> Result<String, CompileError> {
        self.out.clear();
        self.out.push_str(program.doc().trim_end());
        self.out.push('\n');

        if !program.rules().is_empty() {
            self.out.push_str("\nCommands:\n");
            for rule in program.rules() {
                self.emit_rule(rule, 1);
            }
        }

        Ok(std::mem::take(&mut self.out))
    }
}
