//! Token types for the BT-DSL lexer.
//!
//! The lexer uses **registry-backed IDs** for language vocabulary:
//! - `Keyword(KeywordId)` for reserved words
//! - `Operator(OperatorId)` for operators
//! - `Punctuation(PunctuationId)` for punctuation tokens
//!
//! ## Notes
//! - Tokens borrow their text from the source buffer; only decoded literals own data.
//! - Use `crate::token_helpers` for ergonomic token matching at call sites.

use crate::source::SourceRange;
use btdsl_core::lang::keywords::{self, KeywordId};
use btdsl_core::lang::operators::OperatorId;
use btdsl_core::lang::punctuation::PunctuationId;

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Keyword / operator / punctuation (ID-based) ==========
    Keyword(KeywordId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    // ========== Identifiers and literals ==========
    Ident,
    /// The `_` wildcard.
    Infer,
    Int(i64),
    Float(f64),
    /// Decoded string contents (escapes already applied).
    String(String),

    // ========== Documentation ==========
    /// `/// text`
    DocComment(String),
    /// `//! text`
    ModuleDoc(String),

    // ========== Special ==========
    /// A run of characters the lexer could not classify. A diagnostic was already reported.
    Error,
    Eof,
}

/// A token with its kind, source text and byte range.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub range: SourceRange,
    /// A line break separates this token from the previous one.
    pub newline_before: bool,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, range: SourceRange) -> Self {
        Self {
            kind,
            text,
            range,
            newline_before: false,
        }
    }
}

/// Resolve an identifier spelling to a keyword id, if reserved.
pub fn keyword_id(name: &str) -> Option<KeywordId> {
    keywords::from_str(name)
}
