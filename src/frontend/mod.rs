//! BT-DSL compiler front-end
//!
//! - `source`, `lexer`, `parser`, `ast`, `diagnostics`: single-file syntax, from `btdsl_syntax`
//! - `resolver`: import path rules and loading of the module graph
//! - `module`: the module graph and per-module resolution results
//! - `symbols`, `registry`: value scopes and the type/node namespaces
//! - `name_resolver`: binds every name use to its declaration
//! - `passes`: hook for later semantic analyses
//! - `compile`: the driver tying the above together

// Syntax components are provided by the btdsl_syntax crate.
pub use btdsl_syntax::{ast, diagnostics, lexer, parser, source};

pub mod compile;
pub mod module;
pub mod name_resolver;
pub mod passes;
pub mod registry;
pub mod resolver;
pub mod symbols;
