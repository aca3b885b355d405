//! Keywords from other languages that BT-DSL deliberately does not support.
//!
//! Users coming from general-purpose languages reach for `if`, `let` or `fn`. These words are not
//! reserved (they lex as ordinary identifiers), but the parser recognizes them in statement and
//! declaration position and reports a single targeted error with the help text below instead of a
//! cascade of "unexpected token" errors.
//!
//! ## Examples
//! ```rust
//! use btdsl_core::lang::foreign;
//!
//! let info = foreign::lookup("let").unwrap();
//! assert!(info.help.contains("var"));
//! assert!(foreign::lookup("tree").is_none());
//! ```

/// Shape of the construct a foreign keyword usually introduces.
///
/// Recovery uses this to decide whether trailing `else` continuations should be skipped together
/// with the first block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignShape {
    /// `if cond { .. } else { .. }`
    Conditional,
    /// Loop or match header followed by a block.
    Block,
    /// A statement ending in `;` (e.g. `return x;`, `let x = 1;`).
    Statement,
    /// A declaration with a body (`fn`, `class`, `struct`, ...).
    Definition,
}

#[derive(Debug, Clone, Copy)]
pub struct ForeignKeywordInfo {
    pub spelling: &'static str,
    pub shape: ForeignShape,
    pub help: &'static str,
}

const CONTROL_FLOW_HELP: &str =
    "behavior trees express control flow with control nodes such as `Sequence`, `Fallback` or `Repeat`, or with preconditions like `@guard(...)`";

pub const FOREIGN_KEYWORDS: &[ForeignKeywordInfo] = &[
    info(
        "if",
        ForeignShape::Conditional,
        "use a precondition such as `@guard(cond)` or `@skip_if(cond)` on the statement instead",
    ),
    info("else", ForeignShape::Conditional, "`else` branches can be modeled with a `Fallback` control node"),
    info("while", ForeignShape::Block, "use `@run_while(cond)` or a `Repeat`/`RetryUntilSuccessful` decorator"),
    info("for", ForeignShape::Block, CONTROL_FLOW_HELP),
    info("loop", ForeignShape::Block, CONTROL_FLOW_HELP),
    info("match", ForeignShape::Block, "use a `Fallback` node whose children carry `@guard(...)` preconditions"),
    info(
        "return",
        ForeignShape::Statement,
        "trees finish with the status of their root node; use `AlwaysSuccess()` or `AlwaysFailure()` to force a result",
    ),
    info("let", ForeignShape::Statement, "declare blackboard variables with `var` or constants with `const`"),
    info("fn", ForeignShape::Definition, "define reusable behavior with `tree Name(params) { ... }`"),
    info("def", ForeignShape::Definition, "define reusable behavior with `tree Name(params) { ... }`"),
    info("function", ForeignShape::Definition, "define reusable behavior with `tree Name(params) { ... }`"),
    info("class", ForeignShape::Definition, "declare runtime nodes with `extern action Name(...);`"),
    info("struct", ForeignShape::Definition, "declare opaque runtime types with `extern type Name;`"),
    info("enum", ForeignShape::Definition, "declare opaque runtime types with `extern type Name;`"),
];

/// Look up a foreign keyword by its exact spelling.
pub fn lookup(s: &str) -> Option<&'static ForeignKeywordInfo> {
    FOREIGN_KEYWORDS.iter().find(|k| k.spelling == s)
}

const fn info(spelling: &'static str, shape: ForeignShape, help: &'static str) -> ForeignKeywordInfo {
    ForeignKeywordInfo { spelling, shape, help }
}
