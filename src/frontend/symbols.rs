//! Symbol table and scope management for BT-DSL values.
//!
//! Tracks blackboard variables, constants and tree parameters. Nodes and types live in their own
//! namespaces (see [`crate::frontend::registry`]).
//!
//! Scope 0 is the module scope. Name resolution opens a tree scope per `tree` (parameters and
//! top-level body declarations) and a block scope per children block. Scopes are kept after they
//! are exited, so later passes can still walk every declaration.

use indexmap::IndexMap;

use crate::frontend::ast::{DeclId, PortDirection, StmtId};
use crate::frontend::source::SourceRange;

/// Unique identifier for symbols
pub type SymbolId = usize;

/// Index of a scope in its [`SymbolTable`].
pub type ScopeId = usize;

/// Names starting with `_` are private to the module that declares them.
pub fn is_private(name: &str) -> bool {
    name.starts_with('_')
}

/// Symbol table managing all value names of one module
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
    current_scope: ScopeId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub const MODULE_SCOPE: ScopeId = 0;

    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            scopes: vec![Scope::new(None, ScopeKind::Module)],
            current_scope: Self::MODULE_SCOPE,
        }
    }

    /// Enter a new scope nested in the current one
    pub fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let new_scope = Scope::new(Some(self.current_scope), kind);
        self.scopes.push(new_scope);
        self.current_scope = self.scopes.len() - 1;
        self.current_scope
    }

    /// Exit the current scope
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current_scope].parent {
            self.current_scope = parent;
        }
    }

    /// Define a new symbol in the current scope.
    ///
    /// ## Errors
    /// Returns the id of the earlier symbol if the name is already defined in this scope.
    pub fn define(&mut self, mut symbol: Symbol) -> Result<SymbolId, SymbolId> {
        if let Some(previous) = self.lookup_local(&symbol.name) {
            return Err(previous);
        }
        symbol.scope = self.current_scope;
        let id = self.symbols.len();
        self.scopes[self.current_scope].symbols.insert(symbol.name.clone(), id);
        self.symbols.push(symbol);
        Ok(id)
    }

    /// Look up a symbol by name in the current scope chain
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        let mut scope_idx = self.current_scope;
        loop {
            if let Some(&id) = self.scopes[scope_idx].symbols.get(name) {
                return Some(id);
            }
            scope_idx = self.scopes[scope_idx].parent?;
        }
    }

    /// Look up a symbol only in the current scope (no parent lookup)
    pub fn lookup_local(&self, name: &str) -> Option<SymbolId> {
        self.scopes[self.current_scope].symbols.get(name).copied()
    }

    /// Look up a module-level symbol, regardless of the current scope.
    pub fn lookup_global(&self, name: &str) -> Option<SymbolId> {
        self.scopes[Self::MODULE_SCOPE].symbols.get(name).copied()
    }

    /// Get a symbol by ID
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// Module-level symbols in declaration order.
    pub fn globals(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.scopes[Self::MODULE_SCOPE]
            .symbols
            .values()
            .map(|&id| (id, &self.symbols[id]))
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current_scope
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    /// Number of symbols across all scopes.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A scope containing symbol definitions
#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub symbols: IndexMap<String, SymbolId>,
}

impl Scope {
    pub fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            kind,
            symbols: IndexMap::new(),
        }
    }
}

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    /// Parameters and top-level body of a tree.
    Tree,
    /// Children block of a compound node.
    Block,
}

/// A symbol in the symbol table
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Range of the declaring name.
    pub range: SourceRange,
    pub scope: ScopeId,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, range: SourceRange) -> Self {
        Self {
            name: name.into(),
            kind,
            range,
            scope: SymbolTable::MODULE_SCOPE,
        }
    }
}

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Module-level `var`
    GlobalVar(DeclId),
    /// Module-level `const`
    GlobalConst(DeclId),
    /// Tree parameter
    Param {
        tree: DeclId,
        index: usize,
        direction: Option<PortDirection>,
    },
    /// `var` inside a tree
    LocalVar(StmtId),
    /// `const` inside a tree
    LocalConst(StmtId),
}

impl SymbolKind {
    /// Short noun used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::GlobalVar(_) => "global variable",
            SymbolKind::GlobalConst(_) => "global constant",
            SymbolKind::Param { .. } => "parameter",
            SymbolKind::LocalVar(_) => "variable",
            SymbolKind::LocalConst(_) => "constant",
        }
    }
}
