//! Abstract syntax tree for BT-DSL.
//!
//! Nodes are stored in an [`AstArena`] and refer to each other through typed ids. Each category
//! (declarations, statements, expressions, types) is a closed sum type, matched exhaustively.
//!
//! ## Notes
//! - Every node carries the [`SourceRange`] of its own text. Parent ranges are computed bottom-up
//!   while parsing, never by a later traversal.
//! - Lists preserve source order.
//! - When a required construct is missing, the parser inserts a `Missing` node, so passes can walk
//!   the tree without checking for holes.

mod arena;
pub mod visit;

pub use arena::{AstArena, DeclId, ExprId, Name, NodeId, StmtId, TypeId};

use std::fmt;

use crate::source::{FileId, SourceRange};
use btdsl_core::lang::policies::{DataPolicy, FlowPolicy, PreconditionKind};

/// An interned name together with where it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: Name,
    pub range: SourceRange,
}

/// Root of one parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub file: FileId,
    /// Leading `//!` lines.
    pub docs: Vec<String>,
    pub decls: Vec<DeclId>,
    pub range: SourceRange,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub kind: DeclKind,
    pub docs: Vec<String>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    /// `import "./path.bt";`
    Import(ImportDecl),
    /// `extern action Name(ports);`
    Extern(ExternDecl),
    /// `extern type Name;`
    ExternType { name: Ident },
    /// `type Name = Type;`
    TypeAlias { name: Ident, ty: TypeId },
    /// `var name: Type = init;`
    GlobalVar {
        name: Ident,
        ty: Option<TypeId>,
        init: Option<ExprId>,
    },
    /// `const NAME: Type = value;`
    GlobalConst {
        name: Ident,
        ty: Option<TypeId>,
        value: ExprId,
    },
    /// `tree Name(params) { body }`
    Tree(TreeDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// The path exactly as written (escapes decoded).
    pub path: Name,
    pub path_range: SourceRange,
}

/// Node category of an extern declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Action,
    Condition,
    Control,
    Decorator,
    Subtree,
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeCategory::Action => write!(f, "action"),
            NodeCategory::Condition => write!(f, "condition"),
            NodeCategory::Control => write!(f, "control"),
            NodeCategory::Decorator => write!(f, "decorator"),
            NodeCategory::Subtree => write!(f, "subtree"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternDecl {
    pub category: NodeCategory,
    pub name: Ident,
    pub ports: Vec<Param>,
    pub behavior: Option<BehaviorAttr>,
}

/// `#[behavior(DataPolicy[, FlowPolicy])]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorAttr {
    pub data: DataPolicy,
    pub flow: FlowPolicy,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Vec<StmtId>,
}

/// Data-flow direction of a port, parameter or argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    In,
    Out,
    Ref,
    Mut,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::In => write!(f, "in"),
            PortDirection::Out => write!(f, "out"),
            PortDirection::Ref => write!(f, "ref"),
            PortDirection::Mut => write!(f, "mut"),
        }
    }
}

/// A port of an extern node or a parameter of a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub docs: Vec<String>,
    pub direction: Option<PortDirection>,
    pub name: Ident,
    pub ty: TypeId,
    pub default: Option<ExprId>,
    pub range: SourceRange,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub docs: Vec<String>,
    pub preconditions: Vec<Precondition>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `var name: Type = init;` inside a tree.
    BlackboardDecl {
        name: Ident,
        ty: Option<TypeId>,
        init: Option<ExprId>,
    },
    /// `const NAME: Type = value;` inside a tree.
    ConstDecl {
        name: Ident,
        ty: Option<TypeId>,
        value: ExprId,
    },
    /// `target[i][j] op= value;`
    Assignment {
        target: Ident,
        indices: Vec<ExprId>,
        op: AssignOp,
        value: ExprId,
    },
    /// A node invocation. A leaf has `args` and no `children`; a compound always has `children`.
    Node(NodeStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStmt {
    pub callee: Ident,
    pub args: Option<Vec<Argument>>,
    pub children: Option<Vec<StmtId>>,
}

impl NodeStmt {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// `[name:] [direction] value` inside a node call.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<Ident>,
    pub direction: Option<PortDirection>,
    pub value: ExprId,
    pub range: SourceRange,
}

/// `@kind(condition)` attached to a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Precondition {
    pub kind: PreconditionKind,
    pub condition: ExprId,
    pub range: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignOp::Assign => write!(f, "="),
            AssignOp::Add => write!(f, "+="),
            AssignOp::Sub => write!(f, "-="),
            AssignOp::Mul => write!(f, "*="),
            AssignOp::Div => write!(f, "/="),
            AssignOp::Rem => write!(f, "%="),
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    /// Decoded, interned string literal.
    String(Name),
    Bool(bool),
    Null,
    VarRef(Ident),
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Index {
        base: ExprId,
        index: ExprId,
    },
    Cast {
        expr: ExprId,
        ty: TypeId,
    },
    /// `[a, b, c]`
    ArrayLit(Vec<ExprId>),
    /// `[value; count]`
    ArrayRepeat {
        value: ExprId,
        count: ExprId,
    },
    /// `vec![...]`, wrapping an `ArrayLit` or `ArrayRepeat`.
    VecMacro(ExprId),
    /// Placeholder for an expression that failed to parse.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// A builtin, extern or alias name.
    Named(Ident),
    /// `_`
    Infer,
    /// `string` or `string<N>`
    String { max_len: Option<u64> },
    /// `[T; N]`
    StaticArray { elem: TypeId, len: ExprId },
    /// `[T; <=N]`
    BoundedArray { elem: TypeId, max_len: ExprId },
    /// `vec<T>`
    Vec(TypeId),
    /// `T?`
    Nullable(TypeId),
    /// Placeholder for a type that failed to parse.
    Missing,
}
