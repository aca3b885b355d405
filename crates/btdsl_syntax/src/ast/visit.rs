//! Read-only traversal over the arena AST.
//!
//! Implement [`Visitor`] and override the `visit_*` hooks you care about; call the matching `walk_*`
//! function from an override to keep descending.

use super::{AstArena, DeclId, DeclKind, ExprId, ExprKind, Param, Program, StmtId, StmtKind, TypeId, TypeKind};

pub trait Visitor {
    fn visit_decl(&mut self, arena: &AstArena, id: DeclId) {
        walk_decl(self, arena, id);
    }

    fn visit_stmt(&mut self, arena: &AstArena, id: StmtId) {
        walk_stmt(self, arena, id);
    }

    fn visit_expr(&mut self, arena: &AstArena, id: ExprId) {
        walk_expr(self, arena, id);
    }

    fn visit_type(&mut self, arena: &AstArena, id: TypeId) {
        walk_type(self, arena, id);
    }
}

pub fn walk_program<V: Visitor + ?Sized>(visitor: &mut V, arena: &AstArena, program: &Program) {
    for &decl in &program.decls {
        visitor.visit_decl(arena, decl);
    }
}

pub fn walk_params<V: Visitor + ?Sized>(visitor: &mut V, arena: &AstArena, params: &[Param]) {
    for param in params {
        visitor.visit_type(arena, param.ty);
        if let Some(default) = param.default {
            visitor.visit_expr(arena, default);
        }
    }
}

pub fn walk_decl<V: Visitor + ?Sized>(visitor: &mut V, arena: &AstArena, id: DeclId) {
    match &arena.decl(id).kind {
        DeclKind::Import(_) | DeclKind::ExternType { .. } => {}
        DeclKind::Extern(ext) => walk_params(visitor, arena, &ext.ports),
        DeclKind::TypeAlias { ty, .. } => visitor.visit_type(arena, *ty),
        DeclKind::GlobalVar { ty, init, .. } => {
            if let Some(ty) = ty {
                visitor.visit_type(arena, *ty);
            }
            if let Some(init) = init {
                visitor.visit_expr(arena, *init);
            }
        }
        DeclKind::GlobalConst { ty, value, .. } => {
            if let Some(ty) = ty {
                visitor.visit_type(arena, *ty);
            }
            visitor.visit_expr(arena, *value);
        }
        DeclKind::Tree(tree) => {
            walk_params(visitor, arena, &tree.params);
            for &stmt in &tree.body {
                visitor.visit_stmt(arena, stmt);
            }
        }
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, arena: &AstArena, id: StmtId) {
    let stmt = arena.stmt(id);
    for precondition in &stmt.preconditions {
        visitor.visit_expr(arena, precondition.condition);
    }
    match &stmt.kind {
        StmtKind::BlackboardDecl { ty, init, .. } => {
            if let Some(ty) = ty {
                visitor.visit_type(arena, *ty);
            }
            if let Some(init) = init {
                visitor.visit_expr(arena, *init);
            }
        }
        StmtKind::ConstDecl { ty, value, .. } => {
            if let Some(ty) = ty {
                visitor.visit_type(arena, *ty);
            }
            visitor.visit_expr(arena, *value);
        }
        StmtKind::Assignment { indices, value, .. } => {
            for &index in indices {
                visitor.visit_expr(arena, index);
            }
            visitor.visit_expr(arena, *value);
        }
        StmtKind::Node(node) => {
            for arg in node.args.iter().flatten() {
                visitor.visit_expr(arena, arg.value);
            }
            for &child in node.children.iter().flatten() {
                visitor.visit_stmt(arena, child);
            }
        }
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, arena: &AstArena, id: ExprId) {
    match &arena.expr(id).kind {
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::String(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::VarRef(_)
        | ExprKind::Missing => {}
        ExprKind::Binary { lhs, rhs, .. } => {
            visitor.visit_expr(arena, *lhs);
            visitor.visit_expr(arena, *rhs);
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr(arena, *operand),
        ExprKind::Index { base, index } => {
            visitor.visit_expr(arena, *base);
            visitor.visit_expr(arena, *index);
        }
        ExprKind::Cast { expr, ty } => {
            visitor.visit_expr(arena, *expr);
            visitor.visit_type(arena, *ty);
        }
        ExprKind::ArrayLit(elems) => {
            for &elem in elems {
                visitor.visit_expr(arena, elem);
            }
        }
        ExprKind::ArrayRepeat { value, count } => {
            visitor.visit_expr(arena, *value);
            visitor.visit_expr(arena, *count);
        }
        ExprKind::VecMacro(inner) => visitor.visit_expr(arena, *inner),
    }
}

pub fn walk_type<V: Visitor + ?Sized>(visitor: &mut V, arena: &AstArena, id: TypeId) {
    match &arena.ty(id).kind {
        TypeKind::Named(_) | TypeKind::Infer | TypeKind::String { .. } | TypeKind::Missing => {}
        TypeKind::StaticArray { elem, len } => {
            visitor.visit_type(arena, *elem);
            visitor.visit_expr(arena, *len);
        }
        TypeKind::BoundedArray { elem, max_len } => {
            visitor.visit_type(arena, *elem);
            visitor.visit_expr(arena, *max_len);
        }
        TypeKind::Vec(elem) | TypeKind::Nullable(elem) => visitor.visit_type(arena, *elem),
    }
}
