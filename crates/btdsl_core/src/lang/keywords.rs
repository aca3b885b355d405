//! Define the reserved keyword vocabulary for BT-DSL.
//!
//! This module is the single source of truth for reserved words: a stable identifier
//! ([`KeywordId`]) plus a const metadata table ([`KEYWORDS`]) that records canonical spellings,
//! categories and provenance.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive** and exact; there are no keyword aliases.
//! - `_` is reserved: the lexer turns it into the infer-type wildcard rather than an identifier.
//! - [`RECOVERY_KEYWORDS`] is the one place that decides which keywords start a new top-level
//!   construct for error recovery. Every recovery path in the parser consults it.
//!
//! ## Examples
//! ```rust
//! use btdsl_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("extern"), Some(KeywordId::Extern));
//! assert_eq!(keywords::from_str("Extern"), None);
//! assert_eq!(keywords::as_str(KeywordId::Infer), "_");
//! ```

use super::registry::{SinceVersion, Stability, V0_1};

/// Stable identifier for every reserved keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Declarations
    Import,
    Extern,
    Type,
    Var,
    Const,
    Tree,

    // Literals
    True,
    False,
    Null,

    // Node categories
    Action,
    Condition,
    Control,
    Decorator,
    Subtree,

    // Port directions
    In,
    Out,
    Ref,
    Mut,

    // Casts and types
    As,
    String,
    Vec,
    Infer,
}

/// High-level grouping for documentation and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    Declaration,
    Literal,
    NodeCategory,
    Direction,
    Type,
    Operator,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
    pub since: SinceVersion,
    pub stability: Stability,
}

/// Registry of all keywords.
///
/// ## Notes
/// - The ordering is not semantically meaningful, but is grouped for readability.
pub const KEYWORDS: &[KeywordInfo] = &[
    info(KeywordId::Import, "import", KeywordCategory::Declaration),
    info(KeywordId::Extern, "extern", KeywordCategory::Declaration),
    info(KeywordId::Type, "type", KeywordCategory::Declaration),
    info(KeywordId::Var, "var", KeywordCategory::Declaration),
    info(KeywordId::Const, "const", KeywordCategory::Declaration),
    info(KeywordId::Tree, "tree", KeywordCategory::Declaration),
    info(KeywordId::True, "true", KeywordCategory::Literal),
    info(KeywordId::False, "false", KeywordCategory::Literal),
    info(KeywordId::Null, "null", KeywordCategory::Literal),
    info(KeywordId::Action, "action", KeywordCategory::NodeCategory),
    info(KeywordId::Condition, "condition", KeywordCategory::NodeCategory),
    info(KeywordId::Control, "control", KeywordCategory::NodeCategory),
    info(KeywordId::Decorator, "decorator", KeywordCategory::NodeCategory),
    info(KeywordId::Subtree, "subtree", KeywordCategory::NodeCategory),
    info(KeywordId::In, "in", KeywordCategory::Direction),
    info(KeywordId::Out, "out", KeywordCategory::Direction),
    info(KeywordId::Ref, "ref", KeywordCategory::Direction),
    info(KeywordId::Mut, "mut", KeywordCategory::Direction),
    info(KeywordId::As, "as", KeywordCategory::Operator),
    info(KeywordId::String, "string", KeywordCategory::Type),
    info(KeywordId::Vec, "vec", KeywordCategory::Type),
    info(KeywordId::Infer, "_", KeywordCategory::Type),
];

/// Keywords that begin a new top-level construct.
///
/// Error recovery stops in front of any of these: they are the most reliable "the broken
/// construct is over" signal we get from the token stream.
pub const RECOVERY_KEYWORDS: &[KeywordId] = &[
    KeywordId::Var,
    KeywordId::Const,
    KeywordId::Type,
    KeywordId::Tree,
    KeywordId::Import,
    KeywordId::Extern,
];

/// Return `true` if `id` starts a new top-level construct (see [`RECOVERY_KEYWORDS`]).
pub fn is_recovery_keyword(id: KeywordId) -> bool {
    RECOVERY_KEYWORDS.contains(&id)
}

/// Canonical spelling for a keyword id.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Metadata for a keyword id.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (a registry bug, guarded by tests).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

/// Lookup by exact spelling.
pub fn from_str(s: &str) -> Option<KeywordId> {
    KEYWORDS.iter().find(|k| k.canonical == s).map(|k| k.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(id: KeywordId, canonical: &'static str, category: KeywordCategory) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        category,
        since: V0_1,
        stability: Stability::Stable,
    }
}
