use thiserror::Error;

use crate::span::Span;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("invalid syntax at {span} near '{near}'")]
    InvalidSyntax { span: Span, near: String },

    #[error("no tokens to parse")]
    NoTokens,

    #[error("overly indented docstring at {span} near '{near}'")]
    OverlyIndentedDocstring { span: Span, near: String },

    #[error("overly indented rule at {span} near '{near}'")]
    OverlyIndentedRule { span: Span, near: String },

    #[error("cannot add nested rule '{child}' at {span}: parent '{parent}' already has actions")]
    NestedRuleUnderActions {
        span: Span,
        parent: String,
        child: String,
    },

    #[error("cannot add actions to rule '{rule}' because it has nested rules")]
    ActionsOnGroup { rule: String },

    #[error("bad indentation at {span} near '{near}'")]
    BadIndentation { span: Span, near: String },

    #[error("action outside of rule at {span} near '{near}'")]
    ActionOutsideRule { span: Span, near: String },

    #[error("unexpected syntax inside function call '{call}' at {span} near '{near}'")]
    UnexpectedCallSyntax {
        span: Span,
        call: String,
        near: String,
    },

    #[error("variable '{name}' not found")]
    UnresolvedVariable { name: String },

    #[error("unterminated substitution near '{near}'")]
    UnterminatedSubstitution { near: String },

    #[error("rule '{path}' not found")]
    UnknownRule { path: String },

    #[error("rule '{rule}' only groups other rules and has no actions")]
    GroupRule { rule: String },

    #[error("call '{name}' is not a flag")]
    NotAFlag { name: String },

    #[error("invalid flag type '{kind}' for flag '{flag}'")]
    InvalidFlagType { flag: String, kind: String },

    #[error("invalid validation pattern for flag '{flag}': {source}")]
    InvalidFlagPattern {
        flag: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid value '{value}' for flag '{flag}'")]
    InvalidFlagValue { flag: String, value: String },

    #[error("flag '{flag}' needs a value")]
    MissingFlagValue { flag: String },

    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
