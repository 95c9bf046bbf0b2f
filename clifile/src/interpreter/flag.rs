use regex::Regex;

use crate::error::CompileError;
use crate::ir::ast::Call;

/// Kind of input a flag asks for when it has to be prompted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagType {
    Input,
    Multiline,
    Confirm,
    Password,
    Select,
    Editor,
    MultiSelect,
}

impl FlagType {
    pub fn all() -> Vec<Self> {
        vec![
            Self::Input,
            Self::Multiline,
            Self::Confirm,
            Self::Password,
            Self::Select,
            Self::Editor,
            Self::MultiSelect,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Multiline => "multiline",
            Self::Confirm => "confirm",
            Self::Password => "password",
            Self::Select => "select",
            Self::Editor => "editor",
            Self::MultiSelect => "multiselect",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|kind| kind.name() == name)
    }
}

/// Flag described by a `NAME=${flag ...}` call.
#[derive(Debug, Clone)]
pub struct Flag {
    name: String,
    default: String,
    kind: FlagType,
    doc: String,
    question: String,
    validation: Option<Regex>,
    init: String,
}

impl Flag {
    /// Function name that marks a call as a flag definition.
    pub const FUNCTION: &'static str = "flag";

    pub fn from_call(call: &Call) -> Result<Self, CompileError> {
        if call.function != Self::FUNCTION {
            return Err(CompileError::NotAFlag {
                name: call.name.clone(),
            });
        }

        let argument = |key: &str| call.argument(key).unwrap_or("").to_string();

        let kind = match call.argument("type").filter(|kind| !kind.is_empty()) {
            None => FlagType::Input,
            Some(kind) => FlagType::from_name(kind).ok_or_else(|| CompileError::InvalidFlagType {
                flag: call.name.clone(),
                kind: kind.to_string(),
            })?,
        };

        let validation = match call.argument("validation").filter(|p| !p.is_empty()) {
            None => None,
            Some(pattern) => {
                Some(
                    Regex::new(pattern).map_err(|source| CompileError::InvalidFlagPattern {
                        flag: call.name.clone(),
                        source,
                    })?,
                )
            }
        };

        let question = call
            .argument("question")
            .or_else(|| call.argument("prompt"))
            .unwrap_or("")
            .to_string();

        Ok(Self {
            name: call.name.clone(),
            default: argument("default"),
            kind,
            doc: argument("doc"),
            question,
            validation,
            init: argument("init"),
        })
    }

    /// Name as written in the source; this is what `${...}` refers to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name used on the command line: lower-case, dashes for underscores.
    pub fn cli_name(&self) -> String {
        self.name.replace('_', "-").to_lowercase()
    }

    pub fn kind(&self) -> FlagType {
        self.kind
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    pub fn doc(&self) -> String {
        if self.default.is_empty() {
            self.doc.clone()
        } else {
            format!("{} (default: {})", self.doc, self.default)
        }
    }

    pub fn question(&self) -> String {
        if self.question.is_empty() {
            self.cli_name()
        } else {
            self.question.clone()
        }
    }

    /// Choices offered by select flags, taken from `init`.
    pub fn options(&self) -> Vec<&str> {
        match self.kind {
            FlagType::Select | FlagType::MultiSelect if !self.init.is_empty() => {
                self.init.split(", ").collect()
            }
            _ => Vec::new(),
        }
    }

    /// Editor flags use `init` as the file name to edit.
    pub fn init(&self) -> &str {
        &self.init
    }

    pub fn validate(&self, value: &str) -> Result<(), CompileError> {
        match &self.validation {
            Some(pattern) if !pattern.is_match(value) => Err(CompileError::InvalidFlagValue {
                flag: self.cli_name(),
                value: value.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
