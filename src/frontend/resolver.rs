//! Module resolution for multi-file BT-DSL programs
//!
//! Starting from an entry file, this follows every `import "path.bt";` and loads each file into the
//! [`ModuleGraph`] exactly once.
//!
//! ## Import paths
//!
//! - Relative paths (`./x.bt`, `../lib/x.bt`) resolve against the importing file's directory.
//! - Bare paths (`std/nodes.bt`) resolve only when their first segment names a package registered
//!   with [`ModuleResolver::register_package`].
//! - Absolute paths and paths without an extension are rejected.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use btdsl::frontend::compile::Session;
//! use btdsl::frontend::module::ModuleGraph;
//! use btdsl::frontend::resolver::ModuleResolver;
//!
//! let mut resolver = ModuleResolver::new();
//! resolver.register_package("std", "/opt/btdsl/std");
//! let mut session = Session::new();
//! let mut graph = ModuleGraph::new();
//! let entry = resolver.resolve("main.bt".as_ref(), &mut session, &mut graph);
//! ```

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

use crate::frontend::ast::{DeclId, DeclKind};
use crate::frontend::compile::Session;
use crate::frontend::diagnostics::codes;
use crate::frontend::module::{ImportEdge, ModuleGraph, ModuleId, ModuleState};
use crate::frontend::parser;
use crate::frontend::source::{SourceError, SourceRange};

/// Extension of BT-DSL source files.
pub const SOURCE_EXTENSION: &str = "bt";

/// Why an import path was rejected before touching the file system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportPathError {
    #[error("import path is empty")]
    Empty,
    #[error("import path `{0}` is absolute")]
    Absolute(String),
    #[error("import path `{0}` has no file extension")]
    MissingExtension(String),
    #[error("import path `{path}` must start with `./` or `../`")]
    NotRelative { path: String, first_segment: String },
}

impl ImportPathError {
    fn help(&self) -> String {
        match self {
            ImportPathError::Empty => "write the path of a `.bt` file, like `import \"./nodes.bt\";`".to_string(),
            ImportPathError::Absolute(_) => {
                "imports are relative to the importing file; use a path starting with `./` or `../`".to_string()
            }
            ImportPathError::MissingExtension(path) => {
                format!("write the extension explicitly: `{path}.{SOURCE_EXTENSION}`")
            }
            ImportPathError::NotRelative { path, first_segment } => format!(
                "use `./{path}` for a file next to this one, or register a package named `{first_segment}`"
            ),
        }
    }
}

/// Module resolver for multi-file programs
///
/// Holds the registered package roots. The graph and diagnostics it writes into belong to the
/// caller, so one resolver can serve several independent compiles.
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    packages: IndexMap<String, PathBuf>,
}

impl ModuleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make bare imports whose first segment is `name` resolve under `dir`.
    ///
    /// Registering a name twice replaces the earlier directory.
    pub fn register_package(&mut self, name: impl Into<String>, dir: impl Into<PathBuf>) {
        self.packages.insert(name.into(), dir.into());
    }

    pub fn packages(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.packages.iter().map(|(name, dir)| (name.as_str(), dir.as_path()))
    }

    /// Load `entry` and everything it imports into `graph`.
    ///
    /// Problems are reported into `session.diagnostics`. Returns `None` only when the entry file
    /// itself cannot be read; that case produces a single diagnostic with no location.
    #[tracing::instrument(skip_all, fields(entry = %entry.display()))]
    pub fn resolve(&self, entry: &Path, session: &mut Session, graph: &mut ModuleGraph) -> Option<ModuleId> {
        let canonical = match entry.canonicalize() {
            Ok(path) => path,
            Err(source) => {
                let error = SourceError::Io {
                    path: entry.to_path_buf(),
                    source,
                };
                report_unreadable_entry(session, &error);
                return None;
            }
        };

        let mut loader = Loader {
            resolver: self,
            session,
            graph,
            stack: Vec::new(),
        };
        match loader.load(canonical) {
            Ok(id) => Some(id),
            Err(error) => {
                report_unreadable_entry(loader.session, &error);
                None
            }
        }
    }

    /// Check the shape of an import path and turn it into a file path.
    ///
    /// ## Errors
    /// Returns the rule the path breaks. Whether the file exists is not checked here.
    pub fn resolve_import_path(&self, importer_dir: &Path, raw: &str) -> Result<PathBuf, ImportPathError> {
        if raw.is_empty() {
            return Err(ImportPathError::Empty);
        }
        let path = Path::new(raw);
        if path.has_root() || path.is_absolute() {
            return Err(ImportPathError::Absolute(raw.to_string()));
        }
        if path.extension().is_none() {
            return Err(ImportPathError::MissingExtension(raw.to_string()));
        }

        let mut components = path.components();
        match components.next() {
            Some(Component::CurDir | Component::ParentDir) => Ok(importer_dir.join(path)),
            Some(Component::Normal(first)) => {
                let first = first.to_string_lossy();
                match self.packages.get(first.as_ref()) {
                    Some(dir) => Ok(dir.join(components.as_path())),
                    None => Err(ImportPathError::NotRelative {
                        path: raw.to_string(),
                        first_segment: first.into_owned(),
                    }),
                }
            }
            _ => Err(ImportPathError::Absolute(raw.to_string())),
        }
    }
}

fn report_unreadable_entry(session: &mut Session, error: &SourceError) {
    session
        .diagnostics
        .report_error(SourceRange::NONE, format!("cannot open entry file: {error}"))
        .with_code(codes::UNREADABLE_SOURCE);
}

/// One import declaration of a module, copied out of the arena before loading its target.
struct PendingImport {
    path: String,
    range: SourceRange,
    decl: DeclId,
}

/// Depth-first loader for one `resolve` call.
struct Loader<'a> {
    resolver: &'a ModuleResolver,
    session: &'a mut Session,
    graph: &'a mut ModuleGraph,
    /// Modules currently `Resolving`, outermost first.
    stack: Vec<ModuleId>,
}

impl Loader<'_> {
    /// Parse `path` (already canonical) and follow its imports.
    fn load(&mut self, path: PathBuf) -> Result<ModuleId, SourceError> {
        if let Some(id) = self.graph.by_path(&path) {
            return Ok(id);
        }

        let file = self.session.sources.load_file(&path)?;
        let errors_before = self.session.diagnostics.error_count();
        let program = parser::parse_source(
            self.session.sources.text(file),
            file,
            &mut self.session.arena,
            &mut self.session.diagnostics,
        );
        let imports: Vec<PendingImport> = program
            .decls
            .iter()
            .filter_map(|&decl| match &self.session.arena.decl(decl).kind {
                DeclKind::Import(import) => Some(PendingImport {
                    path: self.session.arena.resolve(import.path).to_string(),
                    range: import.path_range,
                    decl,
                }),
                _ => None,
            })
            .collect();

        let id = self.graph.insert(path.clone(), file, program);
        tracing::debug!(module = ?id, path = %path.display(), imports = imports.len(), "loaded module");

        self.graph.set_state(id, ModuleState::Resolving);
        self.stack.push(id);

        let importer_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut seen: HashMap<ModuleId, SourceRange> = HashMap::new();
        for import in imports {
            let Some(target) = self.follow(&importer_dir, &import) else {
                continue;
            };
            if let Some(&first) = seen.get(&target) {
                self.session
                    .diagnostics
                    .report_warning(import.range, format!("`{}` is imported more than once", import.path))
                    .with_code(codes::DUPLICATE_IMPORT)
                    .with_label("duplicate import")
                    .with_secondary(first, "first imported here")
                    .with_fixit(self.session.arena.decl(import.decl).range, "");
                continue;
            }
            seen.insert(target, import.range);
            if let Some(info) = self.graph.get_mut(id) {
                info.imports.push(ImportEdge {
                    target,
                    path: import.path,
                    range: import.range,
                    decl: import.decl,
                });
            }
        }

        self.stack.pop();
        let state = if self.session.diagnostics.error_count() > errors_before {
            ModuleState::Failed
        } else {
            ModuleState::Resolved
        };
        self.graph.set_state(id, state);
        Ok(id)
    }

    /// Resolve and load one import, reporting why it failed if it did.
    fn follow(&mut self, importer_dir: &Path, import: &PendingImport) -> Option<ModuleId> {
        let candidate = match self.resolver.resolve_import_path(importer_dir, &import.path) {
            Ok(candidate) => candidate,
            Err(error) => {
                self.report_path_rule(import, &error);
                return None;
            }
        };

        let canonical = match candidate.canonicalize() {
            Ok(canonical) => canonical,
            Err(_) => {
                self.session
                    .diagnostics
                    .report_error(import.range, format!("cannot find module `{}`", import.path))
                    .with_code(codes::MODULE_NOT_FOUND)
                    .with_label("no such file")
                    .with_note(format!("looked for `{}`", candidate.display()));
                return None;
            }
        };

        if let Some(target) = self.graph.by_path(&canonical) {
            if self.graph.state(target) == ModuleState::Resolving {
                self.report_cycle(import, target);
                return None;
            }
            return Some(target);
        }

        match self.load(canonical) {
            Ok(target) => Some(target),
            Err(error) => {
                self.session
                    .diagnostics
                    .report_error(import.range, format!("cannot read module `{}`", import.path))
                    .with_code(codes::UNREADABLE_SOURCE)
                    .with_label("imported here")
                    .with_note(error.to_string());
                None
            }
        }
    }

    fn report_path_rule(&mut self, import: &PendingImport, error: &ImportPathError) {
        let builder = self
            .session
            .diagnostics
            .report_error(import.range, error.to_string())
            .with_code(codes::INVALID_IMPORT_PATH)
            .with_label("invalid import path")
            .with_help(error.help());
        if let ImportPathError::MissingExtension(path) = error {
            builder.with_fixit(import.range, format!("\"{path}.{SOURCE_EXTENSION}\""));
        }
    }

    /// Report the import that would close a cycle back to `target`.
    fn report_cycle(&mut self, import: &PendingImport, target: ModuleId) {
        let start = self.stack.iter().position(|&id| id == target).unwrap_or(0);
        let chain: Vec<String> = self.stack[start..]
            .iter()
            .chain(std::iter::once(&target))
            .filter_map(|&id| self.graph.get(id).map(|info| format!("`{}`", info.display_name())))
            .collect();
        self.session
            .diagnostics
            .report_error(import.range, format!("import of `{}` creates a cycle", import.path))
            .with_code(codes::IMPORT_CYCLE)
            .with_label("this import closes the cycle")
            .with_note(format!("import chain: {}", chain.join(" -> ")))
            .with_help("move the shared declarations into a module that both files can import");
    }
}
