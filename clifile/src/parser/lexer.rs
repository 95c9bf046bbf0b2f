use std::iter::FusedIterator;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::CompileError;
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Line,      // newlines and spaces
    Indent,    // leading tabs
    Docstring, // ## text
    Comment,   // # text
    Call,      // NAME=${function args}
    Variable,  // NAME=value | NAME="value"
    Rule,      // name: params
    Action,    // anything else up to the end of the line
}

/// A matched token: `captures[0]` is the full text, the rest are the
/// pattern's groups (empty when a group did not take part).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub kind: TokenKind,
    pub captures: Vec<String>,
    pub span: Span,
}

impl Match {
    pub fn new(kind: TokenKind, captures: Vec<String>, span: Span) -> Self {
        Self {
            kind,
            captures,
            span,
        }
    }

    pub fn text(&self) -> &str {
        self.get(0)
    }

    pub fn get(&self, index: usize) -> &str {
        self.captures.get(index).map(String::as_str).unwrap_or("")
    }
}

struct Matcher {
    kind: TokenKind,
    pattern: Regex,
}

impl Matcher {
    fn new(kind: TokenKind, pattern: &str) -> Self {
        let pattern = Regex::new(&format!("^(?:{pattern})")).expect("token pattern must compile");
        Self { kind, pattern }
    }

    fn find(&self, code: &str) -> Option<Vec<String>> {
        let captures = self.pattern.captures(code)?;
        let full = captures.get(0)?;
        if full.is_empty() {
            return None;
        }
        Some(
            captures
                .iter()
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }
}

// Priority order: the first matcher that accepts a prefix wins.
// Identifiers and blanks are ASCII-only.
static MATCHERS: LazyLock<[Matcher; 8]> = LazyLock::new(|| {
    [
        Matcher::new(TokenKind::Line, r"[\n ]+"),
        Matcher::new(TokenKind::Indent, r"\t+"),
        Matcher::new(TokenKind::Docstring, r"##[ ]?([^\n]*)"),
        Matcher::new(TokenKind::Comment, r"#([^\n]*)"),
        Matcher::new(
            TokenKind::Call,
            r"((?-u:\w)+)[ \t]*=[ \t]*\$\{(?-u:\s)*((?-u:\w)+)(?-u:\s)*([^}]+)?\}",
        ),
        Matcher::new(
            TokenKind::Variable,
            r#"((?-u:\w)+)[ \t]*=[ \t]*(?:"([^"]*)"|([^"\n]*))"#,
        ),
        Matcher::new(TokenKind::Rule, r"((?-u:\w)+):((?-u:[\w ])*)"),
        Matcher::new(TokenKind::Action, r"[^\n]+"),
    ]
});

/// Lazy, forward-only token stream over a source fragment.
///
/// Yields at most one error, after which it is exhausted.
pub struct Tokenizer<'a> {
    rest: &'a str,
    cursor: Span,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(code: &'a str) -> Self {
        Self::starting_at(code, Span::default())
    }

    /// Tokenizes a fragment that begins at `origin` in a larger source, so
    /// reported spans stay absolute.
    pub fn starting_at(code: &'a str, origin: Span) -> Self {
        Self {
            rest: code,
            cursor: Span {
                end: origin.start,
                ..origin
            },
            done: false,
        }
    }

    fn skip_spaces(&mut self) {
        let trimmed = self.rest.trim_start_matches(' ');
        let skipped = &self.rest[..self.rest.len() - trimmed.len()];
        self.cursor = self.cursor.advance(skipped);
        self.rest = trimmed;
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Match, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.skip_spaces();
        if self.rest.is_empty() {
            self.done = true;
            return None;
        }

        for matcher in MATCHERS.iter() {
            if let Some(captures) = matcher.find(self.rest) {
                let (text, rest) = self.rest.split_at(captures[0].len());
                let span = self.cursor.covering(text);
                self.cursor = self.cursor.advance(text);
                self.rest = rest;
                trace!(kind = ?matcher.kind, %span, "token");
                return Some(Ok(Match::new(matcher.kind, captures, span)));
            }
        }

        self.done = true;
        Some(Err(CompileError::InvalidSyntax {
            span: self.cursor.covering(self.rest),
            near: self.rest.to_string(),
        }))
    }
}

impl FusedIterator for Tokenizer<'_> {}

/// Splits source text into tokens, failing on the first fragment no
/// pattern accepts.
pub fn tokenize(code: &str) -> Result<Vec<Match>, CompileError> {
    let tokens = Tokenizer::new(code).collect::<Result<Vec<_>, _>>()?;
    debug!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}
