//! The compile driver: one entry file in, a resolved module graph and diagnostics out.
//!
//! ## Examples
//! ```rust,no_run
//! use btdsl::frontend::compile::{CompileOptions, compile};
//!
//! let options = CompileOptions::new().stdlib("/opt/btdsl/std");
//! let result = compile("main.bt".as_ref(), &options);
//! if !result.success {
//!     eprint!("{}", result.render_diagnostics(false));
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::frontend::ast::AstArena;
use crate::frontend::diagnostics::{DiagnosticBag, DiagnosticPrinter};
use crate::frontend::module::{ModuleGraph, ModuleId, ModuleInfo};
use crate::frontend::name_resolver;
use crate::frontend::passes::{AnalysisContext, SemanticPass, run_passes};
use crate::frontend::resolver::ModuleResolver;
use crate::frontend::source::SourceManager;

/// Package name that `CompileOptions::stdlib` registers.
pub const STDLIB_PACKAGE: &str = "std";

/// Everything one compile invocation owns while it runs.
#[derive(Debug, Default)]
pub struct Session {
    pub sources: SourceManager,
    pub arena: AstArena,
    pub diagnostics: DiagnosticBag,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Inputs to [`compile`] besides the entry path.
#[derive(Default)]
pub struct CompileOptions {
    packages: Vec<(String, PathBuf)>,
    passes: Vec<Box<dyn SemanticPass>>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package root for bare imports.
    pub fn package(mut self, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.packages.push((name.into(), dir.into()));
        self
    }

    /// Register the standard library root as the `std` package.
    pub fn stdlib(self, dir: impl Into<PathBuf>) -> Self {
        self.package(STDLIB_PACKAGE, dir)
    }

    /// Append a semantic pass to run after name resolution.
    pub fn pass(mut self, pass: impl SemanticPass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn packages(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.packages.iter().map(|(name, dir)| (name.as_str(), dir.as_path()))
    }

    fn resolver(&self) -> ModuleResolver {
        let mut resolver = ModuleResolver::new();
        for (name, dir) in &self.packages {
            resolver.register_package(name.clone(), dir.clone());
        }
        resolver
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passes: Vec<&str> = self.passes.iter().map(|pass| pass.name()).collect();
        f.debug_struct("CompileOptions")
            .field("packages", &self.packages)
            .field("passes", &passes)
            .finish()
    }
}

/// Outcome of [`compile`]. Owns the graph and everything its ids point into.
#[derive(Debug)]
pub struct CompileResult {
    /// `true` when no error was reported. Warnings do not fail a compile.
    pub success: bool,
    pub diagnostics: DiagnosticBag,
    pub graph: ModuleGraph,
    pub sources: SourceManager,
    pub arena: AstArena,
    /// `None` when the entry file could not be read.
    pub entry: Option<ModuleId>,
}

impl CompileResult {
    pub fn entry_module(&self) -> Option<&ModuleInfo> {
        self.entry.and_then(|id| self.graph.get(id))
    }

    /// Human-readable diagnostics in display order.
    pub fn render_diagnostics(&self, color: bool) -> String {
        DiagnosticPrinter::new(&self.sources)
            .with_color(color)
            .render_all(&self.diagnostics)
    }
}

/// Compile `entry` and everything it imports.
///
/// Never panics on bad input: problems are reported in [`CompileResult::diagnostics`]. Semantic
/// passes run only if nothing before them reported an error.
#[tracing::instrument(skip_all, fields(entry = %entry.display()))]
pub fn compile(entry: &Path, options: &CompileOptions) -> CompileResult {
    let mut session = Session::new();
    let mut graph = ModuleGraph::new();

    let entry_id = options.resolver().resolve(entry, &mut session, &mut graph);
    if let Some(entry_id) = entry_id {
        name_resolver::resolve_names(&mut graph, &session.arena, &mut session.diagnostics);

        if !session.diagnostics.has_errors() && !options.passes.is_empty() {
            let cx = AnalysisContext {
                graph: &graph,
                arena: &session.arena,
                sources: &session.sources,
                entry: entry_id,
            };
            run_passes(&options.passes, &cx, &mut session.diagnostics);
        }
    }

    let Session {
        sources,
        arena,
        diagnostics,
    } = session;
    let success = entry_id.is_some() && !diagnostics.has_errors();
    tracing::debug!(
        success,
        modules = graph.len(),
        errors = diagnostics.error_count(),
        warnings = diagnostics.warning_count(),
        "compile finished"
    );
    CompileResult {
        success,
        diagnostics,
        graph,
        sources,
        arena,
        entry: entry_id,
    }
}
