use crate::error::CompileError;
use crate::ir::ast::Program;

/// Expands `${name}` references in `text` through `lookup`; `$$` yields a
/// literal `$` without any lookup and any other `$` is kept as is.
pub fn substitute<F>(text: &str, mut lookup: F) -> Result<String, CompileError>
where
    F: FnMut(&str) -> Result<String, CompileError>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("$$") {
            out.push('$');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("${") {
            let Some(end) = after.find('}') else {
                return Err(CompileError::UnterminatedSubstitution {
                    near: tail.to_string(),
                });
            };
            out.push_str(&lookup(after[..end].trim())?);
            rest = &after[end + 1..];
        } else {
            out.push('$');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Substitution against the program's variables only.
pub fn substitute_variables(text: &str, program: &Program) -> Result<String, CompileError> {
    substitute(text, |name| {
        program
            .variable(name)
            .map(|variable| variable.value.clone())
            .ok_or_else(|| CompileError::UnresolvedVariable {
                name: name.to_string(),
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ast::Variable;

    fn program() -> Program {
        let mut program = Program::new();
        program.add_variable(Variable::new("NAME", "world"));
        program.add_variable(Variable::new("DIR", "/tmp"));
        program
    }

    #[test]
    fn test_replaces_references() {
        let text = substitute_variables("echo hello ${NAME} > ${ DIR }/out", &program()).unwrap();
        assert_eq!(text, "echo hello world > /tmp/out");
    }

    #[test]
    fn test_double_dollar_skips_lookup() {
        let mut lookups = 0;
        let text = substitute("echo $$HOME $${NAME}", |_| {
            lookups += 1;
            Ok(String::new())
        })
        .unwrap();
        assert_eq!(text, "echo $HOME ${NAME}");
        assert_eq!(lookups, 0);
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        let text = substitute_variables("echo $1 costs 5$", &program()).unwrap();
        assert_eq!(text, "echo $1 costs 5$");
    }

    #[test]
    fn test_unknown_variable() {
        let err = substitute_variables("echo ${MISSING}", &program()).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedVariable { ref name } if name == "MISSING"));
    }

    #[test]
    fn test_unterminated_reference() {
        let err = substitute_variables("echo ${NAME", &program()).unwrap_err();
        assert!(matches!(err, CompileError::UnterminatedSubstitution { ref near } if near == "${NAME"));
    }
}
