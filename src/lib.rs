#![forbid(unsafe_code)]
//! BT-DSL Compiler Front-End
//!
//! BT-DSL is a small language for declaring behavior trees: extern node and type declarations,
//! blackboard globals, and `tree` definitions composed from node calls. This crate loads a program
//! and its imports, reports diagnostics, and binds every name to its declaration. The single-file
//! pieces (source management, lexer, parser, AST, diagnostics) live in `btdsl_syntax`.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. Malformed input is
//!   never a panic; it is a diagnostic. The `cli` module enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod frontend;

pub use frontend::ast;
pub use frontend::compile::{CompileOptions, CompileResult, compile};
pub use frontend::diagnostics;
pub use frontend::lexer;
pub use frontend::parser;
pub use frontend::source;
pub use frontend::symbols;
