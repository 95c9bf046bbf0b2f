pub mod flag;
pub mod substitute;

use tracing::debug;

use crate::error::CompileError;
use crate::ir::ast::Program;

use flag::Flag;

/// Binds run-time values into a compiled program and turns rules into the
/// scripts a shell would run.
pub struct Interpreter {
    program: Program,
}

impl Interpreter {
    pub fn new(program: Program) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Every flag definition, in name order.
    pub fn flags(&self) -> Result<Vec<Flag>, CompileError> {
        self.program
            .calls()
            .values()
            .filter(|call| call.function == Flag::FUNCTION)
            .map(Flag::from_call)
            .collect()
    }

    /// Records a value for `name`. Values for flags are validated first.
    pub fn bind(&mut self, name: &str, value: &str) -> Result<(), CompileError> {
        if let Some(call) = self.program.call(name) {
            Flag::from_call(call)?.validate(value)?;
        }
        debug!(name, "bound value");
        self.program.set_variable(name, value);
        Ok(())
    }

    /// Actions of the leaf rule at `path` with every reference substituted.
    /// Unbound flags fall back to their default, which must pass the flag's
    /// validation (an empty default passes when there is none).
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Result<String, CompileError> {
        let rule = self
            .program
            .find_rule(path)
            .ok_or_else(|| CompileError::UnknownRule {
                path: path.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" "),
            })?;
        if rule.is_group() {
            return Err(CompileError::GroupRule {
                rule: rule.name().to_string(),
            });
        }

        substitute::substitute(rule.actions(), |name| self.lookup(name))
    }

    fn lookup(&self, name: &str) -> Result<String, CompileError> {
        if let Some(variable) = self.program.variable(name) {
            return Ok(variable.value.clone());
        }
        match self.program.call(name) {
            Some(call) if call.function == Flag::FUNCTION => {
                let flag = Flag::from_call(call)?;
                let default = flag.default_value();
                if flag.validate(default).is_err() {
                    return Err(CompileError::MissingFlagValue {
                        flag: flag.cli_name(),
                    });
                }
                Ok(default.to_string())
            }
            _ => Err(CompileError::UnresolvedVariable {
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const SOURCE: &str = r#"
GREETING=hello
TARGET=${flag default="dev" validation="^(dev|prod)$" doc="Where to deploy"}
TOKEN=${flag type="password" validation=".+"}
SUFFIX=${flag}
deploy:
	echo "${GREETING} ${TARGET}"
login:
	echo ${TOKEN}
tag:
	echo v1${SUFFIX}
db:
	migrate:
		echo migrate
"#;

    fn interpreter() -> Interpreter {
        Interpreter::new(parse(SOURCE).unwrap())
    }

    #[test]
    fn test_flags_listed() {
        let flags = interpreter().flags().unwrap();
        let names: Vec<_> = flags.iter().map(Flag::name).collect();
        assert_eq!(names, ["SUFFIX", "TARGET", "TOKEN"]);
    }

    #[test]
    fn test_resolve_uses_flag_default() {
        let script = interpreter().resolve(&["deploy"]).unwrap();
        assert_eq!(script, "echo \"hello dev\"\n");
    }

    #[test]
    fn test_bound_value_wins() {
        let mut interpreter = interpreter();
        interpreter.bind("TARGET", "prod").unwrap();
        assert_eq!(interpreter.resolve(&["deploy"]).unwrap(), "echo \"hello prod\"\n");
        assert_eq!(
            interpreter.program().variable("TARGET").map(|v| v.value.as_str()),
            Some("prod")
        );
    }

    #[test]
    fn test_bind_rejects_invalid_flag_value() {
        let mut interpreter = interpreter();
        let err = interpreter.bind("TARGET", "staging").unwrap_err();
        assert!(matches!(err, CompileError::InvalidFlagValue { .. }));
        assert!(interpreter.program().variable("TARGET").is_none());
    }

    #[test]
    fn test_flag_without_default_needs_value() {
        let err = interpreter().resolve(&["login"]).unwrap_err();
        assert!(matches!(err, CompileError::MissingFlagValue { ref flag } if flag == "token"));
    }

    #[test]
    fn test_empty_default_without_validation() {
        assert_eq!(interpreter().resolve(&["tag"]).unwrap(), "echo v1\n");
    }

    #[test]
    fn test_nested_rule_path() {
        assert_eq!(interpreter().resolve(&["db", "migrate"]).unwrap(), "echo migrate\n");
    }

    #[test]
    fn test_group_cannot_be_resolved() {
        let err = interpreter().resolve(&["db"]).unwrap_err();
        assert!(matches!(err, CompileError::GroupRule { ref rule } if rule == "db"));
    }

    #[test]
    fn test_unknown_rule_path() {
        let err = interpreter().resolve(&["db", "seed"]).unwrap_err();
        assert_eq!(err.to_string(), "rule 'db seed' not found");
    }
}
