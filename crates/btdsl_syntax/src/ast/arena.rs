//! Index arena owning every AST node of a compile invocation.
//!
//! Nodes live in one contiguous vector per category and refer to each other through typed
//! [`NodeId`]s. Nothing is freed individually, so an id handed out by an arena stays valid for the
//! arena's whole lifetime. Identifiers and string literals are interned in a deduplicating pool.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Index;

use lasso::{Rodeo, Spur};

use super::{Decl, Expr, Stmt, TypeNode};
use crate::source::SourceRange;

/// Interned string handle.
pub type Name = Spur;

/// Typed index of a node of kind `T` in an [`AstArena`].
pub struct NodeId<T> {
    index: u32,
    _kind: PhantomData<fn() -> T>,
}

impl<T> NodeId<T> {
    fn new(index: usize) -> Self {
        Self {
            index: index as u32,
            _kind: PhantomData,
        }
    }

    pub fn index(self) -> usize {
        self.index as usize
    }
}

// Manual impls: derives would require `T: Clone` etc.
impl<T> Clone for NodeId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeId<T> {}

impl<T> PartialEq for NodeId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for NodeId<T> {}

impl<T> PartialOrd for NodeId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for NodeId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for NodeId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for NodeId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = std::any::type_name::<T>().rsplit("::").next().unwrap_or("Node");
        write!(f, "{kind}#{}", self.index)
    }
}

pub type ExprId = NodeId<Expr>;
pub type StmtId = NodeId<Stmt>;
pub type DeclId = NodeId<Decl>;
pub type TypeId = NodeId<TypeNode>;

/// Sole owner of all AST nodes and interned strings.
#[derive(Debug, Default)]
pub struct AstArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    decls: Vec<Decl>,
    types: Vec<TypeNode>,
    strings: Rodeo,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.push(expr);
        NodeId::new(self.exprs.len() - 1)
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        self.stmts.push(stmt);
        NodeId::new(self.stmts.len() - 1)
    }

    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        self.decls.push(decl);
        NodeId::new(self.decls.len() - 1)
    }

    pub fn alloc_type(&mut self, ty: TypeNode) -> TypeId {
        self.types.push(ty);
        NodeId::new(self.types.len() - 1)
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn ty(&self, id: TypeId) -> &TypeNode {
        &self.types[id.index()]
    }

    pub fn expr_range(&self, id: ExprId) -> SourceRange {
        self.expr(id).range
    }

    pub fn stmt_range(&self, id: StmtId) -> SourceRange {
        self.stmt(id).range
    }

    pub fn type_range(&self, id: TypeId) -> SourceRange {
        self.ty(id).range
    }

    /// Widen an expression's range, e.g. to cover surrounding parentheses.
    pub(crate) fn set_expr_range(&mut self, id: ExprId, range: SourceRange) {
        self.exprs[id.index()].range = range;
    }

    /// Intern `s`, returning the existing handle if it was seen before.
    pub fn intern(&mut self, s: &str) -> Name {
        self.strings.get_or_intern(s)
    }

    /// Look up a string without interning it.
    pub fn lookup(&self, s: &str) -> Option<Name> {
        self.strings.get(s)
    }

    pub fn resolve(&self, name: Name) -> &str {
        self.strings.resolve(&name)
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

impl Index<ExprId> for AstArena {
    type Output = Expr;

    fn index(&self, id: ExprId) -> &Expr {
        self.expr(id)
    }
}

impl Index<StmtId> for AstArena {
    type Output = Stmt;

    fn index(&self, id: StmtId) -> &Stmt {
        self.stmt(id)
    }
}

impl Index<DeclId> for AstArena {
    type Output = Decl;

    fn index(&self, id: DeclId) -> &Decl {
        self.decl(id)
    }
}

impl Index<TypeId> for AstArena {
    type Output = TypeNode;

    fn index(&self, id: TypeId) -> &TypeNode {
        self.ty(id)
    }
}
