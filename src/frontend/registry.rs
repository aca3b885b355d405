//! Per-module tables for the type and node namespaces.
//!
//! Values go through [`crate::frontend::symbols::SymbolTable`]; types (extern types and aliases)
//! and nodes (externs and trees) are flat, module-level namespaces with no nesting, so they are
//! plain insertion-ordered maps.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::frontend::ast::{BehaviorAttr, DeclId, NodeCategory, TypeId};
use crate::frontend::source::SourceRange;

/// A declared type name.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub name: String,
    pub kind: TypeEntryKind,
    pub decl: DeclId,
    /// Range of the declaring name.
    pub range: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeEntryKind {
    /// `extern type Name;`
    Extern,
    /// `type Name = Target;`
    Alias(TypeId),
}

/// A declared node name.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    pub name: String,
    pub kind: NodeEntryKind,
    pub decl: DeclId,
    /// Range of the declaring name.
    pub range: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEntryKind {
    Extern {
        category: NodeCategory,
        behavior: Option<BehaviorAttr>,
    },
    Tree,
}

impl NodeEntryKind {
    pub fn describe(&self) -> &'static str {
        match self {
            NodeEntryKind::Extern { .. } => "extern node",
            NodeEntryKind::Tree => "tree",
        }
    }
}

/// Types declared by one module.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    entries: IndexMap<String, TypeEntry>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type.
    ///
    /// ## Errors
    /// Returns the earlier entry if the name is already taken in this module.
    pub fn define(&mut self, entry: TypeEntry) -> Result<usize, &TypeEntry> {
        define(&mut self.entries, entry.name.clone(), entry)
    }

    /// Index and entry for `name`.
    pub fn lookup(&self, name: &str) -> Option<(usize, &TypeEntry)> {
        self.entries.get_full(name).map(|(index, _, entry)| (index, entry))
    }

    pub fn get(&self, index: usize) -> Option<&TypeEntry> {
        self.entries.get_index(index).map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Nodes (externs and trees) declared by one module.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    entries: IndexMap<String, NodeEntry>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.
    ///
    /// ## Errors
    /// Returns the earlier entry if the name is already taken in this module.
    pub fn define(&mut self, entry: NodeEntry) -> Result<usize, &NodeEntry> {
        define(&mut self.entries, entry.name.clone(), entry)
    }

    /// Index and entry for `name`.
    pub fn lookup(&self, name: &str) -> Option<(usize, &NodeEntry)> {
        self.entries.get_full(name).map(|(index, _, entry)| (index, entry))
    }

    pub fn get(&self, index: usize) -> Option<&NodeEntry> {
        self.entries.get_index(index).map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeEntry> {
        self.entries.values()
    }

    /// Trees declared in this module, in source order.
    pub fn trees(&self) -> impl Iterator<Item = &NodeEntry> {
        self.iter().filter(|entry| entry.kind == NodeEntryKind::Tree)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn define<T>(entries: &mut IndexMap<String, T>, name: String, entry: T) -> Result<usize, &T> {
    match entries.entry(name) {
        Entry::Occupied(occupied) => Err(&*occupied.into_mut()),
        Entry::Vacant(vacant) => {
            let index = vacant.index();
            vacant.insert(entry);
            Ok(index)
        }
    }
}
