//! Shareable metadata for `btdsl_core::lang` registries.
//!
//! The registries are **const tables**: every entry carries a stable id, its spellings and a
//! little provenance metadata. This submodule holds the dependency-free metadata types that are
//! reused across all of them.
//!
//! ## Notes
//! - These types are `Copy` so registries can live in `const` tables.
//! - Metadata is meant for tooling/docs/diagnostics; enforcement of syntax rules lives in the
//!   lexer/parser.

/// Identify the language version a vocabulary item is available since.
///
/// ## Examples
/// ```rust
/// use btdsl_core::lang::registry::SinceVersion;
///
/// let since: SinceVersion = "0.1.0";
/// assert!(!since.is_empty());
/// ```
pub type SinceVersion = &'static str;

/// The first published grammar.
pub const V0_1: SinceVersion = "0.1.0";

/// Describe the lifecycle status of a language vocabulary item.
///
/// ## Notes
/// - Intended for docs/tooling (e.g. warning on deprecated spellings), not for feature-gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Stable,
    Draft,
    Deprecated,
}
