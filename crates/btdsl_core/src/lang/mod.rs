//! BT-DSL language vocabulary registries.
//!
//! This module is the "front door" for language-level vocabulary: reserved keywords, operators,
//! punctuation, builtin types and the small closed sets used by attributes and preconditions.
//!
//! The design goal is to avoid stringly-typed checks scattered across the lexer, parser and
//! resolver. Callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`) and look up
//! spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are **pure**: no AST types, no IO, no side effects.
//! - The lexer/parser enforce syntax; registries provide spellings and metadata for shared use
//!   (diagnostics, recovery, highlighting).
//!
//! ## Examples
//! ```rust
//! use btdsl_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("tree"), Some(KeywordId::Tree));
//! assert_eq!(keywords::as_str(KeywordId::Tree), "tree");
//! ```

pub mod foreign;
pub mod keywords;
pub mod operators;
pub mod policies;
pub mod punctuation;
pub mod registry;
pub mod types;
