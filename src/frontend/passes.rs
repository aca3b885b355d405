//! Hook for semantic passes that run after name resolution.
//!
//! Type checking, constant evaluation and init/null/recursion analysis are implemented outside this
//! crate. They plug in through [`SemanticPass`] and read everything they need from an explicit
//! [`AnalysisContext`]; there is no ambient "current program".

use crate::frontend::ast::AstArena;
use crate::frontend::diagnostics::DiagnosticBag;
use crate::frontend::module::{ModuleGraph, ModuleId, ModuleInfo};
use crate::frontend::source::SourceManager;

/// Read-only view of a resolved compile, handed to every pass.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub graph: &'a ModuleGraph,
    pub arena: &'a AstArena,
    pub sources: &'a SourceManager,
    pub entry: ModuleId,
}

impl<'a> AnalysisContext<'a> {
    pub fn entry_module(&self) -> Option<&'a ModuleInfo> {
        self.graph.get(self.entry)
    }

    /// Modules with dependencies before their importers.
    pub fn modules_in_dependency_order(&self) -> impl Iterator<Item = &'a ModuleInfo> + use<'a> {
        let graph = self.graph;
        graph.topological_order().into_iter().filter_map(move |id| graph.get(id))
    }
}

/// A semantic analysis over the resolved AST.
///
/// Passes receive a structurally complete tree: parse failures show up as `Missing` nodes, never as
/// holes.
pub trait SemanticPass {
    fn name(&self) -> &'static str;

    /// Run the pass, appending diagnostics. Returns `false` if the pass found errors.
    fn run(&self, cx: &AnalysisContext<'_>, diagnostics: &mut DiagnosticBag) -> bool;
}

/// Run `passes` in order, stopping after the first one that fails.
pub fn run_passes(passes: &[Box<dyn SemanticPass>], cx: &AnalysisContext<'_>, diagnostics: &mut DiagnosticBag) -> bool {
    for pass in passes {
        let _span = tracing::debug_span!("pass", name = pass.name()).entered();
        if !pass.run(cx, diagnostics) {
            tracing::debug!(pass = pass.name(), "pass failed");
            return false;
        }
    }
    true
}
