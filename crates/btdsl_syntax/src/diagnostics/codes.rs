//! Stable diagnostic codes.
//!
//! Codes are grouped by stage: `E00xx` lexical, `E01xx` syntax, `E02xx` modules/imports,
//! `E03xx` names. Warnings use the `W` prefix.

// Lexical
pub const UNEXPECTED_CHARACTER: &str = "E0001";
pub const UNTERMINATED_STRING: &str = "E0002";
pub const INVALID_ESCAPE: &str = "E0003";
pub const INVALID_NUMBER: &str = "E0004";
pub const UNTERMINATED_COMMENT: &str = "E0005";

// Syntax
pub const EXPECTED_TOKEN: &str = "E0100";
pub const UNSUPPORTED_KEYWORD: &str = "E0101";
pub const NON_ASSOCIATIVE_CHAIN: &str = "E0102";
pub const UNKNOWN_PRECONDITION: &str = "E0103";
pub const UNKNOWN_ATTRIBUTE: &str = "E0104";
pub const INVALID_NODE_SHAPE: &str = "E0105";

// Modules and imports
pub const INVALID_IMPORT_PATH: &str = "E0200";
pub const MODULE_NOT_FOUND: &str = "E0201";
pub const IMPORT_CYCLE: &str = "E0202";
pub const UNREADABLE_SOURCE: &str = "E0203";

// Names
pub const UNDECLARED_NAME: &str = "E0300";
pub const AMBIGUOUS_NAME: &str = "E0301";
pub const PRIVATE_NAME: &str = "E0302";
pub const DUPLICATE_DEFINITION: &str = "E0303";

// Warnings
pub const UNUSED_IMPORT: &str = "W0001";
pub const DANGLING_DOC_COMMENT: &str = "W0002";
pub const DUPLICATE_IMPORT: &str = "W0003";
