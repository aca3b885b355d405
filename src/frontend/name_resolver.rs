//! Name resolution across a [`ModuleGraph`].
//!
//! Resolution runs in two phases over every module:
//!
//! 1. **Collection** fills each module's tables from its top-level declarations: globals go into the
//!    module scope of the [`SymbolTable`], extern types and aliases into the [`TypeTable`](crate::frontend::registry::TypeTable),
//!    externs and trees into the [`NodeRegistry`](crate::frontend::registry::NodeRegistry).
//! 2. **Resolution** walks every declaration and records what each name refers to in
//!    [`ModuleInfo::resolutions`].
//!
//! ## Lookup order
//! - Values: enclosing block scopes, the tree scope, module globals, then direct imports.
//! - Nodes: the module's registry, then direct imports.
//! - Types: builtins, the module's type table, then direct imports.
//!
//! Only direct imports are searched. A name declared by two of them is ambiguous and is never
//! settled by import order. Names starting with `_` are not visible to importers.

use crate::frontend::ast::visit::{self, Visitor};
use crate::frontend::ast::{AstArena, DeclId, DeclKind, ExprId, ExprKind, Ident, StmtId, StmtKind, TypeId, TypeKind};
use crate::frontend::diagnostics::{DiagnosticBag, codes};
use crate::frontend::module::{ModuleGraph, ModuleId, ModuleInfo, NodeRef, Resolutions, SymbolRef, TypeTarget};
use crate::frontend::registry::{NodeEntry, NodeEntryKind, TypeEntry, TypeEntryKind, TypeTable};
use crate::frontend::source::SourceRange;
use crate::frontend::symbols::{ScopeKind, Symbol, SymbolKind, SymbolTable, is_private};
use btdsl_core::lang::types::{self as builtin_types, BuiltinTypeId};

/// Collect declarations into every module's tables.
///
/// Call once per graph; a second call reports every declaration as a duplicate.
pub fn collect_symbols(graph: &mut ModuleGraph, arena: &AstArena, diagnostics: &mut DiagnosticBag) {
    for id in graph.ids() {
        if let Some(info) = graph.get_mut(id) {
            collect_module(info, arena, diagnostics);
        }
    }
}

/// Collect symbols, then resolve every name in every module.
#[tracing::instrument(skip_all, fields(modules = graph.len()))]
pub fn resolve_names(graph: &mut ModuleGraph, arena: &AstArena, diagnostics: &mut DiagnosticBag) {
    collect_symbols(graph, arena, diagnostics);

    for id in graph.ids() {
        // The module's own table is moved out so it can grow scopes while other modules are read.
        let Some(info) = graph.get_mut(id) else {
            continue;
        };
        let symbols = std::mem::take(&mut info.symbols);

        let (symbols, resolutions) = {
            let Some(info) = graph.get(id) else {
                continue;
            };
            let mut resolver = NameResolver::new(graph, info, arena, symbols, diagnostics);
            resolver.run();
            resolver.finish()
        };

        if let Some(info) = graph.get_mut(id) {
            tracing::debug!(
                module = ?id,
                values = resolutions.values.len(),
                nodes = resolutions.nodes.len(),
                types = resolutions.types.len(),
                "resolved names"
            );
            info.symbols = symbols;
            info.resolutions = resolutions;
        }
    }
}

fn collect_module(info: &mut ModuleInfo, arena: &AstArena, diagnostics: &mut DiagnosticBag) {
    for &decl in &info.program.decls {
        match &arena.decl(decl).kind {
            DeclKind::Import(_) => {}
            DeclKind::Extern(ext) => {
                let name = arena.resolve(ext.name.name);
                let entry = NodeEntry {
                    name: name.to_string(),
                    kind: NodeEntryKind::Extern {
                        category: ext.category,
                        behavior: ext.behavior,
                    },
                    decl,
                    range: ext.name.range,
                };
                if let Err(previous) = info.nodes.define(entry) {
                    report_duplicate(diagnostics, previous.kind.describe(), name, ext.name.range, previous.range);
                }
            }
            DeclKind::Tree(tree) => {
                let name = arena.resolve(tree.name.name);
                let entry = NodeEntry {
                    name: name.to_string(),
                    kind: NodeEntryKind::Tree,
                    decl,
                    range: tree.name.range,
                };
                if let Err(previous) = info.nodes.define(entry) {
                    report_duplicate(diagnostics, previous.kind.describe(), name, tree.name.range, previous.range);
                }
            }
            DeclKind::ExternType { name } => {
                collect_type(&mut info.types, arena, diagnostics, decl, *name, TypeEntryKind::Extern)
            }
            DeclKind::TypeAlias { name, ty } => {
                collect_type(&mut info.types, arena, diagnostics, decl, *name, TypeEntryKind::Alias(*ty))
            }
            DeclKind::GlobalVar { name, .. } => {
                collect_global(&mut info.symbols, arena, diagnostics, *name, SymbolKind::GlobalVar(decl))
            }
            DeclKind::GlobalConst { name, .. } => {
                collect_global(&mut info.symbols, arena, diagnostics, *name, SymbolKind::GlobalConst(decl))
            }
        }
    }
}

fn collect_type(
    types: &mut TypeTable,
    arena: &AstArena,
    diagnostics: &mut DiagnosticBag,
    decl: DeclId,
    name: Ident,
    kind: TypeEntryKind,
) {
    let text = arena.resolve(name.name);
    if builtin_types::from_str(text).is_some() {
        diagnostics
            .report_error(name.range, format!("`{text}` is a builtin type and cannot be redeclared"))
            .with_code(codes::DUPLICATE_DEFINITION)
            .with_label("builtin type name")
            .with_help("pick a different name for this type");
        return;
    }
    let entry = TypeEntry {
        name: text.to_string(),
        kind,
        decl,
        range: name.range,
    };
    if let Err(previous) = types.define(entry) {
        report_duplicate(diagnostics, "type", text, name.range, previous.range);
    }
}

fn collect_global(
    symbols: &mut SymbolTable,
    arena: &AstArena,
    diagnostics: &mut DiagnosticBag,
    name: Ident,
    kind: SymbolKind,
) {
    let text = arena.resolve(name.name);
    if let Err(previous) = symbols.define(Symbol::new(text, kind, name.range)) {
        let previous = symbols.get(previous).map_or(SourceRange::NONE, |symbol| symbol.range);
        report_duplicate(diagnostics, kind.describe(), text, name.range, previous);
    }
}

fn report_duplicate(diagnostics: &mut DiagnosticBag, what: &str, name: &str, range: SourceRange, previous: SourceRange) {
    diagnostics
        .report_error(range, format!("duplicate definition of {what} `{name}`"))
        .with_code(codes::DUPLICATE_DEFINITION)
        .with_label(format!("`{name}` redefined here"))
        .with_secondary(previous, "previous definition here");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
    Value,
    Node,
    Type,
}

/// Outcome of searching the direct imports for a name.
enum Imported<T> {
    Found(ModuleId, T),
    /// Ambiguous or private; a diagnostic was already reported.
    Reported,
    Missing,
}

/// Resolves the names of one module.
struct NameResolver<'a> {
    graph: &'a ModuleGraph,
    info: &'a ModuleInfo,
    arena: &'a AstArena,
    symbols: SymbolTable,
    resolutions: Resolutions,
    used_imports: Vec<bool>,
    diagnostics: &'a mut DiagnosticBag,
}

impl<'a> NameResolver<'a> {
    fn new(
        graph: &'a ModuleGraph,
        info: &'a ModuleInfo,
        arena: &'a AstArena,
        symbols: SymbolTable,
        diagnostics: &'a mut DiagnosticBag,
    ) -> Self {
        Self {
            graph,
            info,
            arena,
            symbols,
            resolutions: Resolutions::default(),
            used_imports: vec![false; info.imports.len()],
            diagnostics,
        }
    }

    fn run(&mut self) {
        let arena = self.arena;
        for &decl in &self.info.program.decls {
            self.visit_decl(arena, decl);
        }
        self.report_unused_imports();
    }

    fn finish(self) -> (SymbolTable, Resolutions) {
        (self.symbols, self.resolutions)
    }

    fn report_unused_imports(&mut self) {
        let info = self.info;
        for (edge, used) in info.imports.iter().zip(&self.used_imports) {
            if *used {
                continue;
            }
            self.diagnostics
                .report_warning(edge.range, format!("unused import `{}`", edge.path))
                .with_code(codes::UNUSED_IMPORT)
                .with_label("nothing from this module is used")
                .with_fixit(self.arena.decl(edge.decl).range, "");
        }
    }

    /// Define a local or parameter in the current scope.
    fn declare(&mut self, ident: Ident, kind: SymbolKind) {
        let arena = self.arena;
        let name = arena.resolve(ident.name);
        if let Err(previous) = self.symbols.define(Symbol::new(name, kind, ident.range)) {
            let previous = self.symbols.get(previous).map_or(SourceRange::NONE, |symbol| symbol.range);
            report_duplicate(self.diagnostics, kind.describe(), name, ident.range, previous);
        }
    }

    fn resolve_value(&mut self, ident: Ident) -> Option<SymbolRef> {
        let arena = self.arena;
        let name = arena.resolve(ident.name);
        if let Some(symbol) = self.symbols.lookup(name) {
            return Some(SymbolRef {
                module: self.info.id,
                symbol,
            });
        }
        match self.lookup_imported(ident, name, |module| module.symbols.lookup_global(name)) {
            Imported::Found(module, symbol) => Some(SymbolRef { module, symbol }),
            Imported::Reported => None,
            Imported::Missing => {
                self.report_undeclared(ident, name, Namespace::Value);
                None
            }
        }
    }

    fn resolve_node(&mut self, ident: Ident) -> Option<NodeRef> {
        let arena = self.arena;
        let name = arena.resolve(ident.name);
        if let Some((index, _)) = self.info.nodes.lookup(name) {
            return Some(NodeRef {
                module: self.info.id,
                index,
            });
        }
        match self.lookup_imported(ident, name, |module| module.nodes.lookup(name).map(|(index, _)| index)) {
            Imported::Found(module, index) => Some(NodeRef { module, index }),
            Imported::Reported => None,
            Imported::Missing => {
                self.report_undeclared(ident, name, Namespace::Node);
                None
            }
        }
    }

    fn resolve_type(&mut self, ident: Ident) -> Option<TypeTarget> {
        let arena = self.arena;
        let name = arena.resolve(ident.name);
        if let Some(builtin) = builtin_types::from_str(name) {
            return Some(TypeTarget::Builtin(builtin));
        }
        if let Some((index, _)) = self.info.types.lookup(name) {
            return Some(TypeTarget::Declared {
                module: self.info.id,
                index,
            });
        }
        match self.lookup_imported(ident, name, |module| module.types.lookup(name).map(|(index, _)| index)) {
            Imported::Found(module, index) => Some(TypeTarget::Declared { module, index }),
            Imported::Reported => None,
            Imported::Missing => {
                self.report_undeclared(ident, name, Namespace::Type);
                None
            }
        }
    }

    /// Search the direct imports for `name`, reporting ambiguity and privacy violations.
    fn lookup_imported<T>(&mut self, ident: Ident, name: &str, find: impl Fn(&ModuleInfo) -> Option<T>) -> Imported<T> {
        let info = self.info;
        let mut hits: Vec<(usize, ModuleId, T)> = info
            .imports
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let target = self.graph.get(edge.target)?;
                find(target).map(|found| (index, edge.target, found))
            })
            .collect();
        for &(index, ..) in &hits {
            self.used_imports[index] = true;
        }

        match hits.len() {
            0 => Imported::Missing,
            _ if is_private(name) => {
                let edge = &info.imports[hits[0].0];
                self.diagnostics
                    .report_error(ident.range, format!("`{name}` is private to `{}`", edge.path))
                    .with_code(codes::PRIVATE_NAME)
                    .with_label("private name")
                    .with_secondary(edge.range, "imported here")
                    .with_help("names starting with `_` are only visible inside the module that declares them");
                Imported::Reported
            }
            1 => match hits.pop() {
                Some((_, module, found)) => Imported::Found(module, found),
                None => Imported::Missing,
            },
            _ => {
                let sources: Vec<String> = hits.iter().map(|(index, ..)| format!("`{}`", info.imports[*index].path)).collect();
                let mut builder = self
                    .diagnostics
                    .report_error(ident.range, format!("`{name}` is ambiguous: it is declared in {}", join_names(&sources)))
                    .with_code(codes::AMBIGUOUS_NAME)
                    .with_label("ambiguous name")
                    .with_help("rename one of the declarations or drop one of the imports");
                for (index, ..) in &hits {
                    builder = builder.with_secondary(info.imports[*index].range, format!("`{name}` imported from here"));
                }
                Imported::Reported
            }
        }
    }

    fn report_undeclared(&mut self, ident: Ident, name: &str, namespace: Namespace) {
        let (message, label) = match namespace {
            Namespace::Value => (format!("undeclared identifier `{name}`"), "not found in this scope"),
            Namespace::Node => (format!("undeclared identifier `{name}`"), "no node with this name is declared or imported"),
            Namespace::Type => (format!("undeclared type `{name}`"), "not found in this scope"),
        };
        let owner = self.declared_elsewhere(name, namespace);
        let builder = self
            .diagnostics
            .report_error(ident.range, message)
            .with_code(codes::UNDECLARED_NAME)
            .with_label(label);
        if let Some(owner) = owner {
            builder.with_help(format!("`{name}` is declared in `{owner}`, which is not imported directly here"));
        }
    }

    /// A module outside the direct imports that exports `name`, for a hint.
    fn declared_elsewhere(&self, name: &str, namespace: Namespace) -> Option<String> {
        if is_private(name) {
            return None;
        }
        self.graph
            .iter()
            .filter(|module| module.id != self.info.id && !self.info.imports_module(module.id))
            .find(|module| match namespace {
                Namespace::Value => module.symbols.lookup_global(name).is_some(),
                Namespace::Node => module.nodes.lookup(name).is_some(),
                Namespace::Type => module.types.lookup(name).is_some(),
            })
            .map(ModuleInfo::display_name)
    }
}

impl Visitor for NameResolver<'_> {
    fn visit_decl(&mut self, arena: &AstArena, id: DeclId) {
        let DeclKind::Tree(tree) = &arena.decl(id).kind else {
            visit::walk_decl(self, arena, id);
            return;
        };
        self.symbols.enter_scope(ScopeKind::Tree);
        for (index, param) in tree.params.iter().enumerate() {
            self.visit_type(arena, param.ty);
            if let Some(default) = param.default {
                self.visit_expr(arena, default);
            }
            let kind = SymbolKind::Param {
                tree: id,
                index,
                direction: param.direction,
            };
            self.declare(param.name, kind);
        }
        for &stmt in &tree.body {
            self.visit_stmt(arena, stmt);
        }
        self.symbols.exit_scope();
    }

    fn visit_stmt(&mut self, arena: &AstArena, id: StmtId) {
        let stmt = arena.stmt(id);
        for precondition in &stmt.preconditions {
            self.visit_expr(arena, precondition.condition);
        }
        match &stmt.kind {
            StmtKind::BlackboardDecl { name, ty, init } => {
                if let Some(ty) = ty {
                    self.visit_type(arena, *ty);
                }
                if let Some(init) = init {
                    self.visit_expr(arena, *init);
                }
                // Declared after its initializer: `var x = x;` refers to an outer `x`.
                self.declare(*name, SymbolKind::LocalVar(id));
            }
            StmtKind::ConstDecl { name, ty, value } => {
                if let Some(ty) = ty {
                    self.visit_type(arena, *ty);
                }
                self.visit_expr(arena, *value);
                self.declare(*name, SymbolKind::LocalConst(id));
            }
            StmtKind::Assignment {
                target, indices, value, ..
            } => {
                if let Some(symbol) = self.resolve_value(*target) {
                    self.resolutions.assignments.insert(id, symbol);
                }
                for &index in indices {
                    self.visit_expr(arena, index);
                }
                self.visit_expr(arena, *value);
            }
            StmtKind::Node(node) => {
                if let Some(target) = self.resolve_node(node.callee) {
                    self.resolutions.nodes.insert(id, target);
                }
                for arg in node.args.iter().flatten() {
                    self.visit_expr(arena, arg.value);
                }
                if let Some(children) = &node.children {
                    self.symbols.enter_scope(ScopeKind::Block);
                    for &child in children {
                        self.visit_stmt(arena, child);
                    }
                    self.symbols.exit_scope();
                }
            }
        }
    }

    fn visit_expr(&mut self, arena: &AstArena, id: ExprId) {
        if let ExprKind::VarRef(ident) = &arena.expr(id).kind {
            if let Some(symbol) = self.resolve_value(*ident) {
                self.resolutions.values.insert(id, symbol);
            }
            return;
        }
        visit::walk_expr(self, arena, id);
    }

    fn visit_type(&mut self, arena: &AstArena, id: TypeId) {
        match &arena.ty(id).kind {
            TypeKind::Named(ident) => {
                if let Some(target) = self.resolve_type(*ident) {
                    self.resolutions.types.insert(id, target);
                }
            }
            TypeKind::String { .. } => {
                self.resolutions.types.insert(id, TypeTarget::Builtin(BuiltinTypeId::String));
            }
            _ => visit::walk_type(self, arena, id),
        }
    }
}

/// "`a`", "`a` and `b`", "`a`, `b` and `c`".
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}
