//! Compiler for `Clifile` sources: a small Makefile-like language of
//! documented rules, variables and flag declarations.
//!
//! Source text goes through [`parser::lexer::tokenize`] and
//! [`parser::parser::parse_tokens`] (both behind [`parser::parse`]) and comes
//! out as an [`ir::ast::Program`]. [`interpreter::Interpreter`] binds values
//! into a program and resolves rules into shell scripts, [`emit`] renders a
//! program for inspection.

pub mod emit;
pub mod error;
pub mod interpreter;
pub mod ir;
pub mod parser;
pub mod span;

pub use error::CompileError;
pub use parser::parse;
