use std::collections::BTreeMap;
use std::mem;

use tracing::debug;

use super::lexer::{Match, TokenKind, Tokenizer};
use crate::error::CompileError;
use crate::ir::ast::{Call, Program, Rule, Variable};

pub fn parse_tokens(tokens: Vec<Match>) -> Result<Program, CompileError> {
    if tokens.is_empty() {
        return Err(CompileError::NoTokens);
    }
    let mut parser = Parser::new();
    let consumed = parser.parse_doc(&tokens);
    parser.parse_body(&tokens[consumed..])?;
    let program = parser.finish()?;
    debug!(
        rules = program.rules().len(),
        variables = program.variables().len(),
        calls = program.calls().len(),
        "parsed program"
    );
    Ok(program)
}

struct Parser {
    program: Program,
    /// Open rules, outermost first; its length is the current nesting depth.
    branch: Vec<Rule>,
    indent: usize,
    pending_doc: String,
}

impl Parser {
    fn new() -> Self {
        Self {
            program: Program::new(),
            branch: Vec::new(),
            indent: 0,
            pending_doc: String::new(),
        }
    }

    /// Reads the leading doc block into the program doc and returns how many
    /// tokens it used. Two or more newlines between docstrings end the block.
    fn parse_doc(&mut self, tokens: &[Match]) -> usize {
        if tokens.first().map(|m| m.kind) != Some(TokenKind::Docstring) {
            return 0;
        }

        let mut doc = String::new();
        let mut consumed = 0;
        let mut newlines = 0;
        for (i, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::Docstring if newlines <= 1 => {
                    doc.push_str(token.get(1));
                    doc.push('\n');
                    newlines = 0;
                    consumed = i + 1;
                }
                TokenKind::Line => newlines = token.text().matches('\n').count(),
                _ => break,
            }
        }

        if doc.is_empty() {
            return 0;
        }
        self.program.set_doc(doc);
        consumed
    }

    fn parse_body(&mut self, tokens: &[Match]) -> Result<(), CompileError> {
        for token in tokens {
            // Assignments inside a rule body are shell statements.
            let kind = match token.kind {
                TokenKind::Variable | TokenKind::Call if self.indent > 0 => TokenKind::Action,
                kind => kind,
            };

            match kind {
                TokenKind::Line => self.indent = 0,
                TokenKind::Comment => {}
                TokenKind::Indent => self.indent = token.text().chars().count(),
                TokenKind::Variable => self.program.add_variable(parse_variable(token)),
                TokenKind::Call => self.program.add_call(parse_call(token)?),
                TokenKind::Docstring => self.parse_docstring(token)?,
                TokenKind::Rule => self.parse_rule(token)?,
                TokenKind::Action => self.parse_action(token)?,
            }
        }
        Ok(())
    }

    fn parse_docstring(&mut self, token: &Match) -> Result<(), CompileError> {
        if self.indent > self.branch.len() {
            return Err(CompileError::OverlyIndentedDocstring {
                span: token.span,
                near: token.text().to_string(),
            });
        }
        self.pending_doc.push_str(token.get(1));
        self.pending_doc.push('\n');
        Ok(())
    }

    fn parse_rule(&mut self, token: &Match) -> Result<(), CompileError> {
        if self.indent > self.branch.len() {
            return Err(CompileError::OverlyIndentedRule {
                span: token.span,
                near: token.text().to_string(),
            });
        }
        self.close_rules(self.indent)?;

        let name = token.get(1);
        if let Some(parent) = self.branch.last().filter(|parent| parent.has_actions()) {
            return Err(CompileError::NestedRuleUnderActions {
                span: token.span,
                parent: parent.name().to_string(),
                child: name.to_string(),
            });
        }

        let positional = token.get(2).split_whitespace().map(str::to_string).collect();
        let doc = mem::take(&mut self.pending_doc);
        self.branch.push(Rule::new(name, positional, doc));
        Ok(())
    }

    fn parse_action(&mut self, token: &Match) -> Result<(), CompileError> {
        if self.indent < self.branch.len() {
            return Err(CompileError::BadIndentation {
                span: token.span,
                near: token.text().to_string(),
            });
        }
        let Some(current) = self.branch.last_mut() else {
            return Err(CompileError::ActionOutsideRule {
                span: token.span,
                near: token.text().to_string(),
            });
        };
        current.append_action(token.text())
    }

    /// Pops open rules down to `depth`, attaching each to its parent or to
    /// the program.
    fn close_rules(&mut self, depth: usize) -> Result<(), CompileError> {
        while self.branch.len() > depth {
            let Some(rule) = self.branch.pop() else {
                break;
            };
            match self.branch.last_mut() {
                Some(parent) => parent.add_child(rule)?,
                None => self.program.add_rule(rule),
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Program, CompileError> {
        self.close_rules(0)?;
        Ok(self.program)
    }
}

fn parse_variable(token: &Match) -> Variable {
    let quoted = token.get(2);
    let value = if quoted.is_empty() {
        token.get(3).trim()
    } else {
        quoted
    };
    Variable::new(token.get(1), value)
}

/// Builds a call, tokenizing its argument text as a flat keyword list.
fn parse_call(token: &Match) -> Result<Call, CompileError> {
    let name = token.get(1);
    let arguments = token.get(3);

    // The argument text always ends right before the closing brace.
    let offset = token.text().len() - 1 - arguments.len();
    let origin = token.span.advance(&token.text()[..offset]);

    let mut keywords = BTreeMap::new();
    for submatch in Tokenizer::starting_at(arguments, origin) {
        let submatch = submatch?;
        match submatch.kind {
            TokenKind::Variable => {
                let variable = parse_variable(&submatch);
                keywords.insert(variable.name, variable.value);
            }
            TokenKind::Line | TokenKind::Comment | TokenKind::Indent => {}
            TokenKind::Docstring | TokenKind::Call | TokenKind::Rule | TokenKind::Action => {
                return Err(CompileError::UnexpectedCallSyntax {
                    span: submatch.span,
                    call: name.to_string(),
                    near: submatch.text().to_string(),
                });
            }
        }
    }

    Ok(Call::new(name, token.get(2), keywords))
}
