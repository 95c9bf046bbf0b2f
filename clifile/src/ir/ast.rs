use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CompileError;

/// Documentation used when the source does not open with a doc block.
pub const DEFAULT_DOC: &str = "Software Command Line Interface (CLI)
Use this as shortcut for user-defined commands";

/// Whole compiled source: documentation, top-level declarations and rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    doc: String,
    variables: BTreeMap<String, Variable>,
    calls: BTreeMap<String, Call>,
    rules: Vec<Rule>,
}

impl Default for Program {
    fn default() -> Self {
        Self {
            doc: DEFAULT_DOC.to_string(),
            variables: BTreeMap::new(),
            calls: BTreeMap::new(),
            rules: Vec::new(),
        }
    }
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn set_doc(&mut self, doc: impl Into<String>) {
        self.doc = doc.into();
    }

    pub fn variables(&self) -> &BTreeMap<String, Variable> {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Registers a variable, replacing any earlier one with the same name.
    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Overwrites the value of `name`, creating the variable if needed.
    pub fn set_variable(&mut self, name: &str, value: impl Into<String>) {
        match self.variables.get_mut(name) {
            Some(variable) => variable.value = value.into(),
            None => self.add_variable(Variable::new(name, value)),
        }
    }

    pub fn calls(&self) -> &BTreeMap<String, Call> {
        &self.calls
    }

    pub fn call(&self, name: &str) -> Option<&Call> {
        self.calls.get(name)
    }

    pub fn add_call(&mut self, call: Call) {
        self.calls.insert(call.name.clone(), call);
    }

    /// Top-level rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Follows `path` from the top level down through nested rules.
    pub fn find_rule<S: AsRef<str>>(&self, path: &[S]) -> Option<&Rule> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.rule(first.as_ref())?, |rule, name| rule.child(name.as_ref()))
    }

    pub fn add_rule(&mut self, rule: Rule) {
        upsert(&mut self.rules, rule);
    }
}

/// Named value declared at the top level as `NAME=value` or `NAME="value"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// `name=${function key="value" ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call {
    pub name: String,
    pub function: String,
    pub arguments: BTreeMap<String, String>,
}

impl Call {
    pub fn new(
        name: impl Into<String>,
        function: impl Into<String>,
        arguments: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            function: function.into(),
            arguments,
        }
    }

    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).map(String::as_str)
    }
}

/// A command: either a leaf holding shell actions or a group holding
/// nested rules, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    name: String,
    positional: Vec<String>,
    doc: String,
    actions: String,
    children: Vec<Rule>,
}

impl Rule {
    pub fn new(name: impl Into<String>, positional: Vec<String>, doc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positional,
            doc: doc.into(),
            actions: String::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// First line of the documentation.
    pub fn summary(&self) -> &str {
        self.doc.lines().next().unwrap_or("")
    }

    pub fn actions(&self) -> &str {
        &self.actions
    }

    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Appends one action line, newline-terminated.
    pub fn append_action(&mut self, action: &str) -> Result<(), CompileError> {
        if self.is_group() {
            return Err(CompileError::ActionsOnGroup {
                rule: self.name.clone(),
            });
        }
        self.actions.push_str(action);
        self.actions.push('\n');
        Ok(())
    }

    /// Nested rules in declaration order.
    pub fn children(&self) -> &[Rule] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Rule> {
        self.children.iter().find(|rule| rule.name == name)
    }

    pub fn add_child(&mut self, rule: Rule) -> Result<(), CompileError> {
        if self.has_actions() {
            return Err(CompileError::NestedRuleUnderActions {
                span: Default::default(),
                parent: self.name.clone(),
                child: rule.name,
            });
        }
        upsert(&mut self.children, rule);
        Ok(())
    }

    /// Number of rule levels below this one, counting itself.
    pub fn height(&self) -> usize {
        1 + self.children.iter().map(Rule::height).max().unwrap_or(0)
    }
}

// Same name replaces in place so declaration order survives redefinition.
fn upsert(rules: &mut Vec<Rule>, rule: Rule) {
    match rules.iter_mut().find(|existing| existing.name == rule.name) {
        Some(existing) => *existing = rule,
        None => rules.push(rule),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_default_doc() {
        let program = Program::new();
        assert_eq!(program.doc(), DEFAULT_DOC);
        assert!(program.rules().is_empty());
    }

    #[test]
    fn test_set_variable_overwrites_or_creates() {
        let mut program = Program::new();
        program.add_variable(Variable::new("NAME", "old"));
        program.set_variable("NAME", "new");
        program.set_variable("OTHER", "x");
        assert_eq!(program.variable("NAME").map(|v| v.value.as_str()), Some("new"));
        assert_eq!(program.variable("OTHER").map(|v| v.value.as_str()), Some("x"));
    }

    #[test]
    fn test_leaf_rule_rejects_children() {
        let mut rule = Rule::new("build", vec![], "");
        rule.append_action("cargo build").unwrap();
        let err = rule.add_child(Rule::new("sub", vec![], "")).unwrap_err();
        assert!(matches!(err, CompileError::NestedRuleUnderActions { ref parent, .. } if parent == "build"));
        assert!(rule.children().is_empty());
    }

    #[test]
    fn test_group_rule_rejects_actions() {
        let mut rule = Rule::new("db", vec![], "");
        rule.add_child(Rule::new("migrate", vec![], "")).unwrap();
        let err = rule.append_action("echo").unwrap_err();
        assert!(matches!(err, CompileError::ActionsOnGroup { ref rule } if rule == "db"));
        assert_eq!(rule.actions(), "");
    }

    #[test]
    fn test_redefined_rule_keeps_position() {
        let mut program = Program::new();
        program.add_rule(Rule::new("a", vec![], "first"));
        program.add_rule(Rule::new("b", vec![], ""));
        program.add_rule(Rule::new("a", vec![], "second"));
        let names: Vec<_> = program.rules().iter().map(Rule::name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(program.rule("a").map(Rule::doc), Some("second"));
    }

    #[test]
    fn test_find_rule_by_path() {
        let mut group = Rule::new("db", vec![], "");
        let mut leaf = Rule::new("migrate", vec![], "");
        leaf.append_action("run").unwrap();
        group.add_child(leaf).unwrap();
        let mut program = Program::new();
        program.add_rule(group);

        assert_eq!(program.find_rule(&["db", "migrate"]).map(Rule::actions), Some("run\n"));
        assert!(program.find_rule(&["db", "seed"]).is_none());
        assert!(program.find_rule::<&str>(&[]).is_none());
        assert_eq!(program.rule("db").map(Rule::height), Some(2));
    }
}
