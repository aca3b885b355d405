//! Module graph for multi-file BT-DSL programs.
//!
//! Every file reachable from the entry through `import` becomes one [`ModuleInfo`], keyed by its
//! canonical path. The graph owns the per-module tables that name resolution fills in and the
//! resolution results later passes read.
//!
//! ## Notes
//! - Modules are stored in load order, so [`ModuleId`]s are stable indices.
//! - Import edges are direct only; visibility never follows an edge transitively.
//! - The graph is a DAG. The resolver refuses to add the edge that would close a cycle.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::frontend::ast::{DeclId, ExprId, Program, StmtId, TypeId};
use crate::frontend::registry::{NodeRegistry, TypeTable};
use crate::frontend::source::{FileId, SourceRange};
use crate::frontend::symbols::{SymbolId, SymbolTable};
use btdsl_core::lang::types::BuiltinTypeId;

/// Index of a module in its [`ModuleGraph`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

/// Per-compile resolution state of a module.
///
/// A module starts `Unvisited`, is `Resolving` while its imports are being followed, and ends up
/// `Resolved`, or `Failed` if it or anything it imports reported an error while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Unvisited,
    Resolving,
    Resolved,
    Failed,
}

/// A resolved `import` of one module by another.
#[derive(Debug, Clone)]
pub struct ImportEdge {
    pub target: ModuleId,
    /// The path as written in the import.
    pub path: String,
    /// Range of the path literal.
    pub range: SourceRange,
    /// The import declaration.
    pub decl: DeclId,
}

/// A value symbol in a specific module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolRef {
    pub module: ModuleId,
    pub symbol: SymbolId,
}

/// A node (extern or tree) in a specific module's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub module: ModuleId,
    pub index: usize,
}

/// What a type name resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTarget {
    Builtin(BuiltinTypeId),
    /// An extern type or alias in a specific module's type table.
    Declared { module: ModuleId, index: usize },
}

/// Results of name resolution for one module.
#[derive(Debug, Clone, Default)]
pub struct Resolutions {
    /// `VarRef` expressions.
    pub values: HashMap<ExprId, SymbolRef>,
    /// Assignment targets.
    pub assignments: HashMap<StmtId, SymbolRef>,
    /// Node statement callees.
    pub nodes: HashMap<StmtId, NodeRef>,
    pub types: HashMap<TypeId, TypeTarget>,
}

/// One loaded module.
#[derive(Debug)]
pub struct ModuleInfo {
    pub id: ModuleId,
    /// Canonical path on disk.
    pub path: PathBuf,
    pub file: FileId,
    pub program: Program,
    /// Globals in the module scope, plus tree and block scopes once names are resolved.
    pub symbols: SymbolTable,
    pub types: TypeTable,
    pub nodes: NodeRegistry,
    pub imports: Vec<ImportEdge>,
    pub state: ModuleState,
    pub resolutions: Resolutions,
}

impl ModuleInfo {
    /// File name used when a diagnostic needs to refer to this module.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn imports_module(&self, target: ModuleId) -> bool {
        self.imports.iter().any(|edge| edge.target == target)
    }
}

/// All modules loaded by one compile, keyed by canonical path.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: IndexMap<PathBuf, ModuleInfo>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly parsed module as `Unvisited`, or return the id it already has.
    pub fn insert(&mut self, path: PathBuf, file: FileId, program: Program) -> ModuleId {
        if let Some(id) = self.by_path(&path) {
            return id;
        }
        let id = ModuleId(self.modules.len() as u32);
        let info = ModuleInfo {
            id,
            path: path.clone(),
            file,
            program,
            symbols: SymbolTable::new(),
            types: TypeTable::new(),
            nodes: NodeRegistry::new(),
            imports: Vec::new(),
            state: ModuleState::Unvisited,
            resolutions: Resolutions::default(),
        };
        self.modules.insert(path, info);
        id
    }

    pub fn by_path(&self, path: &Path) -> Option<ModuleId> {
        self.modules.get_index_of(path).map(|index| ModuleId(index as u32))
    }

    pub fn get(&self, id: ModuleId) -> Option<&ModuleInfo> {
        self.modules.get_index(id.index()).map(|(_, info)| info)
    }

    pub fn get_mut(&mut self, id: ModuleId) -> Option<&mut ModuleInfo> {
        self.modules.get_index_mut(id.index()).map(|(_, info)| info)
    }

    pub fn state(&self, id: ModuleId) -> ModuleState {
        self.get(id).map_or(ModuleState::Unvisited, |info| info.state)
    }

    pub fn set_state(&mut self, id: ModuleId, state: ModuleState) {
        if let Some(info) = self.get_mut(id) {
            info.state = state;
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ModuleId> + use<> {
        (0..self.modules.len() as u32).map(ModuleId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules `id` imports directly.
    pub fn direct_imports(&self, id: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        self.get(id).into_iter().flat_map(|info| info.imports.iter().map(|edge| edge.target))
    }

    /// Every module, dependencies before their importers.
    pub fn topological_order(&self) -> Vec<ModuleId> {
        let mut order = Vec::with_capacity(self.len());
        let mut visited = vec![false; self.len()];
        for id in self.ids() {
            self.visit_postorder(id, &mut visited, &mut order);
        }
        order
    }

    fn visit_postorder(&self, id: ModuleId, visited: &mut [bool], order: &mut Vec<ModuleId>) {
        if visited[id.index()] {
            return;
        }
        visited[id.index()] = true;
        for dep in self.direct_imports(id) {
            self.visit_postorder(dep, visited, order);
        }
        order.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::{AstArena, Decl, DeclKind, ImportDecl};

    fn empty_program() -> Program {
        Program {
            file: FileId::DETACHED,
            docs: Vec::new(),
            decls: Vec::new(),
            range: SourceRange::NONE,
        }
    }

    fn edge(target: ModuleId) -> ImportEdge {
        let mut arena = AstArena::new();
        let path = arena.intern("./dep.bt");
        let decl = arena.alloc_decl(Decl {
            kind: DeclKind::Import(ImportDecl {
                path,
                path_range: SourceRange::NONE,
            }),
            docs: Vec::new(),
            range: SourceRange::NONE,
        });
        ImportEdge {
            target,
            path: "./dep.bt".to_string(),
            range: SourceRange::NONE,
            decl,
        }
    }

    #[test]
    fn insert_is_keyed_by_path() {
        let mut graph = ModuleGraph::new();
        let a = graph.insert(PathBuf::from("/p/a.bt"), FileId::DETACHED, empty_program());
        let again = graph.insert(PathBuf::from("/p/a.bt"), FileId::DETACHED, empty_program());
        assert_eq!(a, again);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.state(a), ModuleState::Unvisited);
        assert_eq!(graph.get(a).unwrap().display_name(), "a.bt");
    }

    #[test]
    fn topological_order_puts_dependencies_first() {
        let mut graph = ModuleGraph::new();
        let a = graph.insert(PathBuf::from("/p/a.bt"), FileId::DETACHED, empty_program());
        let b = graph.insert(PathBuf::from("/p/b.bt"), FileId::DETACHED, empty_program());
        let c = graph.insert(PathBuf::from("/p/c.bt"), FileId::DETACHED, empty_program());
        graph.get_mut(a).unwrap().imports.push(edge(b));
        graph.get_mut(b).unwrap().imports.push(edge(c));
        assert_eq!(graph.topological_order(), vec![c, b, a]);
        assert!(graph.get(a).unwrap().imports_module(b));
        assert!(!graph.get(a).unwrap().imports_module(c));
    }
}
