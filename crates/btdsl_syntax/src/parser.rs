//! Parser for BT-DSL.
//!
//! Converts a token stream into an arena-allocated [`Program`]. Parsing is total: syntax errors are
//! reported into the [`DiagnosticBag`] and the parser recovers at the nearest statement or
//! declaration boundary, inserting `Missing` nodes where a required construct is absent.
//!
//! ## Examples
//!
//! ```rust
//! use btdsl_syntax::ast::{AstArena, DeclKind};
//! use btdsl_syntax::diagnostics::DiagnosticBag;
//! use btdsl_syntax::parser;
//! use btdsl_syntax::source::FileId;
//!
//! let mut arena = AstArena::new();
//! let mut bag = DiagnosticBag::new();
//! let program = parser::parse_source("tree Main() { Sequence { Wait(ms: 10); } }", FileId::DETACHED, &mut arena, &mut bag);
//! assert!(bag.is_empty());
//! assert!(matches!(arena.decl(program.decls[0]).kind, DeclKind::Tree(_)));
//! ```

use std::borrow::Cow;

use crate::ast::*;
use crate::diagnostics::{DiagnosticBag, codes};
use crate::lexer::{self, Token, TokenKind};
use crate::source::{FileId, SourceRange};
use btdsl_core::lang::foreign::{self, ForeignKeywordInfo, ForeignShape};
use btdsl_core::lang::keywords::{self, KeywordId};
use btdsl_core::lang::operators::{self, Associativity, OperatorId};
use btdsl_core::lang::policies::{self, DataPolicy, FlowPolicy};
use btdsl_core::lang::punctuation::{self, PunctuationId};

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/recovery.rs");
include!("parser/decl.rs");
include!("parser/types.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
