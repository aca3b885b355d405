//! Shared syntax frontend for BT-DSL: sources, lexer, parser, AST and diagnostics.
//!
//! This crate is intended for reuse across the compiler driver, the language server and test tooling.
//!
//! ## Notes
//! - This crate is "syntax-only": it does not resolve imports or names. See the `btdsl` crate's `frontend`
//!   module for module and name resolution.
//! - Vocabulary identity (keywords/operators/punctuation) comes from `btdsl_core::lang` registries.
//! - Nothing here aborts on bad input. Lexing and parsing are total; problems are reported into a
//!   [`diagnostics::DiagnosticBag`] and the AST stays structurally complete.
//!
//! ## Examples
//! ```rust
//! use btdsl_syntax::ast::AstArena;
//! use btdsl_syntax::diagnostics::DiagnosticBag;
//! use btdsl_syntax::parser;
//! use btdsl_syntax::source::SourceManager;
//!
//! let mut sources = SourceManager::new();
//! let file = sources.add_file("main.bt", "tree Main() { AlwaysSuccess(); }\n");
//! let mut arena = AstArena::new();
//! let mut bag = DiagnosticBag::new();
//! let program = parser::parse_source(sources.text(file), file, &mut arena, &mut bag);
//! assert_eq!(program.decls.len(), 1);
//! assert!(!bag.has_errors());
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod token_helpers;
