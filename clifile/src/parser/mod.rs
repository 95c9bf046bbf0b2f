//! Source text to [`Program`]: the lexer splits the text into ranked
//! tokens, the parser folds them into rules, variables and calls.

pub mod lexer;
pub mod parser;

use std::fs;
use std::path::Path;

use tracing::instrument;

use crate::error::CompileError;
use crate::ir::ast::Program;

#[instrument(level = "debug", skip(source), fields(bytes = source.len()))]
pub fn parse(source: &str) -> Result<Program, CompileError> {
    parser::parse_tokens(lexer::tokenize(source)?)
}

/// Reads and compiles a source file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Program, CompileError> {
    let source = fs::read_to_string(path)?;
    parse(&source)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_blank_source_has_nothing_to_parse() {
        assert!(matches!(parse(""), Err(CompileError::NoTokens)));
        assert!(matches!(parse("   "), Err(CompileError::NoTokens)));
    }

    #[test]
    fn test_parse_matches_token_pipeline() {
        let source = "## Tool\nX=1\nbuild:\n\tmake ${X}\n";
        let tokens = lexer::tokenize(source).unwrap();
        assert_eq!(parse(source).unwrap(), parser::parse_tokens(tokens).unwrap());
    }

    #[test]
    fn test_parse_file_reads_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "run:\n\techo hi\n").unwrap();
        let program = parse_file(file.path()).unwrap();
        assert_eq!(program.rule("run").map(|r| r.actions()), Some("echo hi\n"));
    }

    #[test]
    fn test_parse_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_file(dir.path().join("Clifile")).unwrap_err();
        assert!(matches!(err, CompileError::Io { .. }));
    }
}
