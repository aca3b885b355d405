//! Provide the canonical language vocabulary for the BT-DSL compiler and its tooling.
//!
//! This crate is intentionally small and dependency-light. Both the syntax frontend and the
//! resolution passes consult it instead of hard-coding spellings.
//!
//! ## Notes
//!
//! - This is a "vocabulary core" crate: **no IO**, no global state, and no compiler-specific types.
//! - Current scope: reserved keywords, operators, punctuation, builtin types, precondition kinds,
//!   behavior-attribute policies, and the foreign keywords we recognize only to produce better errors.

pub mod lang;
