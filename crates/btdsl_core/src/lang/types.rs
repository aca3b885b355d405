//! Builtin type vocabulary.
//!
//! Builtin scalar types are not keywords: they are ordinary identifiers that name resolution
//! finds before any user-declared type. `string` is the exception and is reserved, because it
//! takes an optional `<N>` length bound.
//!
//! ## Examples
//! ```rust
//! use btdsl_core::lang::types::{self, BuiltinTypeId};
//!
//! assert_eq!(types::from_str("int32"), Some(BuiltinTypeId::Int32));
//! assert_eq!(types::from_str("int"), Some(BuiltinTypeId::Int32));
//! assert_eq!(types::as_str(BuiltinTypeId::Float64), "float64");
//! ```

/// Stable identifier for every builtin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTypeId {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Bool,
    String,
}

/// Metadata for a builtin type.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTypeInfo {
    pub id: BuiltinTypeId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

/// Registry of builtin types.
pub const BUILTIN_TYPES: &[BuiltinTypeInfo] = &[
    info(BuiltinTypeId::Int8, "int8", &[]),
    info(BuiltinTypeId::Int16, "int16", &[]),
    info(BuiltinTypeId::Int32, "int32", &["int"]),
    info(BuiltinTypeId::Int64, "int64", &[]),
    info(BuiltinTypeId::Uint8, "uint8", &[]),
    info(BuiltinTypeId::Uint16, "uint16", &[]),
    info(BuiltinTypeId::Uint32, "uint32", &[]),
    info(BuiltinTypeId::Uint64, "uint64", &[]),
    info(BuiltinTypeId::Float32, "float32", &[]),
    info(BuiltinTypeId::Float64, "float64", &["float", "double"]),
    info(BuiltinTypeId::Bool, "bool", &[]),
    info(BuiltinTypeId::String, "string", &[]),
];

/// Canonical spelling for a builtin type id.
pub fn as_str(id: BuiltinTypeId) -> &'static str {
    BUILTIN_TYPES
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.canonical)
        .expect("builtin type info missing")
}

/// Lookup by spelling (canonical or alias).
pub fn from_str(s: &str) -> Option<BuiltinTypeId> {
    BUILTIN_TYPES
        .iter()
        .find(|t| t.canonical == s || t.aliases.contains(&s))
        .map(|t| t.id)
}

const fn info(id: BuiltinTypeId, canonical: &'static str, aliases: &'static [&'static str]) -> BuiltinTypeInfo {
    BuiltinTypeInfo { id, canonical, aliases }
}
