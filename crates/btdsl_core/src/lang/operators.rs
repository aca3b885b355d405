//! Operator vocabulary.
//!
//! This module defines the canonical operator set along with basic metadata such as precedence,
//! associativity, and fixity.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Equality and relational operators are **non-associative** ([`Associativity::None`]): the
//!   parser rejects `a == b == c` instead of silently grouping it.
//! - `!` and `-` appear both as prefix operators and (for `-`) as an infix operator; the
//!   registry records the infix/prefix role the parser relies on.
//!
//! ## Examples
//! ```rust
//! use btdsl_core::lang::operators::{self, Associativity, OperatorId};
//!
//! assert_eq!(operators::from_str("&&"), Some(OperatorId::AndAnd));
//! assert_eq!(operators::info_for(OperatorId::EqEq).associativity, Associativity::None);
//! ```

use super::registry::{SinceVersion, Stability, V0_1};

/// Define how operators associate when chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    None,
}

/// Define whether an operator is infix (binary), prefix (unary) or an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
    Assign,
}

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Bitwise
    Amp,
    Pipe,
    Caret,

    // Logical
    AndAnd,
    OrOr,
    Bang,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Assignment
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
}

/// Metadata for an operator.
///
/// ## Notes
/// - `precedence` is a relative ordering where higher binds tighter. Prefix operators bind
///   tighter than every infix operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spelling: &'static str,
    pub precedence: u8,
    pub associativity: Associativity,
    pub fixity: Fixity,
    pub since: SinceVersion,
    pub stability: Stability,
}

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    // Logical / bitwise, loosest first
    op(OperatorId::OrOr, "||", 10, Associativity::Left, Fixity::Infix),
    op(OperatorId::AndAnd, "&&", 20, Associativity::Left, Fixity::Infix),
    op(OperatorId::Pipe, "|", 30, Associativity::Left, Fixity::Infix),
    op(OperatorId::Caret, "^", 40, Associativity::Left, Fixity::Infix),
    op(OperatorId::Amp, "&", 50, Associativity::Left, Fixity::Infix),
    // Equality / comparison
    op(OperatorId::EqEq, "==", 60, Associativity::None, Fixity::Infix),
    op(OperatorId::NotEq, "!=", 60, Associativity::None, Fixity::Infix),
    op(OperatorId::Lt, "<", 70, Associativity::None, Fixity::Infix),
    op(OperatorId::LtEq, "<=", 70, Associativity::None, Fixity::Infix),
    op(OperatorId::Gt, ">", 70, Associativity::None, Fixity::Infix),
    op(OperatorId::GtEq, ">=", 70, Associativity::None, Fixity::Infix),
    // Arithmetic
    op(OperatorId::Plus, "+", 80, Associativity::Left, Fixity::Infix),
    op(OperatorId::Minus, "-", 80, Associativity::Left, Fixity::Infix),
    op(OperatorId::Star, "*", 90, Associativity::Left, Fixity::Infix),
    op(OperatorId::Slash, "/", 90, Associativity::Left, Fixity::Infix),
    op(OperatorId::Percent, "%", 90, Associativity::Left, Fixity::Infix),
    // Prefix
    op(OperatorId::Bang, "!", 100, Associativity::Right, Fixity::Prefix),
    // Assignment
    op(OperatorId::Eq, "=", 0, Associativity::Right, Fixity::Assign),
    op(OperatorId::PlusEq, "+=", 0, Associativity::Right, Fixity::Assign),
    op(OperatorId::MinusEq, "-=", 0, Associativity::Right, Fixity::Assign),
    op(OperatorId::StarEq, "*=", 0, Associativity::Right, Fixity::Assign),
    op(OperatorId::SlashEq, "/=", 0, Associativity::Right, Fixity::Assign),
    op(OperatorId::PercentEq, "%=", 0, Associativity::Right, Fixity::Assign),
];

/// Canonical spelling for an operator id.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spelling
}

/// Metadata for an operator id.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (a registry bug, guarded by tests).
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS.iter().find(|o| o.id == id).expect("operator info missing")
}

/// Lookup by exact spelling.
pub fn from_str(s: &str) -> Option<OperatorId> {
    OPERATORS.iter().find(|o| o.spelling == s).map(|o| o.id)
}

/// Return `true` for `=` and the compound assignment operators.
pub fn is_assignment(id: OperatorId) -> bool {
    info_for(id).fixity == Fixity::Assign
}

// --- helpers -----------------------------------------------------------------

const fn op(
    id: OperatorId,
    spelling: &'static str,
    precedence: u8,
    associativity: Associativity,
    fixity: Fixity,
) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        precedence,
        associativity,
        fixity,
        since: V0_1,
        stability: Stability::Stable,
    }
}
