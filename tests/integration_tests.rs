//! End-to-end tests: multi-file programs on disk through `compile`.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use btdsl::frontend::compile::{CompileOptions, CompileResult, compile};
use btdsl::frontend::diagnostics::{Diagnostic, DiagnosticBag, Severity, codes, json};
use btdsl::frontend::module::ModuleState;
use btdsl::frontend::passes::{AnalysisContext, SemanticPass};
use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn file(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(&path, text).expect("write source");
        path
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    fn compile(&self, entry: &str) -> CompileResult {
        self.compile_with(entry, &CompileOptions::new())
    }

    fn compile_with(&self, entry: &str, options: &CompileOptions) -> CompileResult {
        compile(&self.path(entry), options)
    }
}

fn errors(result: &CompileResult) -> Vec<&Diagnostic> {
    result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect()
}

fn codes_of(result: &CompileResult) -> Vec<&str> {
    result.diagnostics.iter().filter_map(|d| d.code.as_deref()).collect()
}

// ============================================================================
// Module loading
// ============================================================================

#[test]
fn sibling_import_resolves_cleanly() {
    let project = Project::new();
    project.file("dep.bt", "extern action Ping();\n");
    project.file("main.bt", "import \"./dep.bt\";\ntree Main() {\n    Ping();\n}\n");

    let result = project.compile("main.bt");
    assert!(result.diagnostics.is_empty(), "{}", result.render_diagnostics(false));
    assert!(result.success);
    assert_eq!(result.graph.len(), 2);

    let entry = result.entry_module().expect("entry module");
    assert_eq!(entry.state, ModuleState::Resolved);
    assert_eq!(entry.imports.len(), 1);

    let dep = result
        .graph
        .by_path(&project.path("dep.bt").canonicalize().unwrap())
        .expect("dep loaded");
    assert_eq!(entry.imports[0].target, dep);
    let node = entry.resolutions.nodes.values().next().expect("Ping resolved");
    assert_eq!(node.module, dep);
}

#[test]
fn dependencies_come_before_importers() {
    let project = Project::new();
    project.file("c.bt", "extern action Deep();\n");
    project.file("b.bt", "import \"./c.bt\";\ntree Mid() {\n    Deep();\n}\n");
    project.file("main.bt", "import \"./b.bt\";\ntree Main() {\n    Mid();\n}\n");

    let result = project.compile("main.bt");
    assert!(result.success, "{}", result.render_diagnostics(false));
    let order: Vec<String> = result
        .graph
        .topological_order()
        .into_iter()
        .filter_map(|id| result.graph.get(id).map(|m| m.display_name()))
        .collect();
    assert_eq!(order, ["c.bt", "b.bt", "main.bt"]);
}

#[test]
fn absolute_import_path_is_rejected() {
    let project = Project::new();
    project.file("main.bt", "import \"/abs.bt\";\n");

    let result = project.compile("main.bt");
    assert!(!result.success);
    let errors = errors(&result);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code.as_deref(), Some(codes::INVALID_IMPORT_PATH));
    assert_eq!(errors[0].message, "import path `/abs.bt` is absolute");
    assert_eq!(
        result.entry_module().map(|m| m.state),
        Some(ModuleState::Failed)
    );
}

#[test]
fn path_rule_error_renders_with_source_excerpt() {
    let project = Project::new();
    project.file("main.bt", "import \"/abs.bt\";\n");

    let result = project.compile("main.bt");
    let entry = result.entry_module().expect("entry module");
    let shown = result.sources.display_path(entry.file);
    let rendered = result.render_diagnostics(false).replace(&shown, "main.bt");
    insta::assert_snapshot!(rendered.trim_end(), @r#"
    error[E0200]: import path `/abs.bt` is absolute
      --> main.bt:1:8
       |
     1 | import "/abs.bt";
       |        ^^^^^^^^^ invalid import path
       |
       = help: imports are relative to the importing file; use a path starting with `./` or `../`
    "#);
}

#[test]
fn missing_extension_offers_fixit() {
    let project = Project::new();
    project.file("dep.bt", "extern action Ping();\n");
    project.file("main.bt", "import \"./dep\";\n");

    let result = project.compile("main.bt");
    let errors = errors(&result);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code.as_deref(), Some(codes::INVALID_IMPORT_PATH));
    assert_eq!(errors[0].fixits.len(), 1);
    assert_eq!(errors[0].fixits[0].replacement, "\"./dep.bt\"");
}

#[test]
fn bare_import_needs_a_registered_package() {
    let project = Project::new();
    project.file("vendor/nav/move.bt", "extern action MoveTo();\n");
    project.file("main.bt", "import \"nav/move.bt\";\ntree Main() {\n    MoveTo();\n}\n");

    let rejected = project.compile("main.bt");
    assert!(!rejected.success);
    assert_eq!(codes_of(&rejected)[0], codes::INVALID_IMPORT_PATH);
    assert!(
        rejected.diagnostics.iter().any(|d| d.message == "undeclared identifier `MoveTo`"),
        "{}",
        rejected.render_diagnostics(false)
    );

    let options = CompileOptions::new().package("nav", project.path("vendor/nav"));
    let accepted = project.compile_with("main.bt", &options);
    assert!(accepted.diagnostics.is_empty(), "{}", accepted.render_diagnostics(false));
    assert_eq!(accepted.graph.len(), 2);
}

#[test]
fn stdlib_is_importable_as_std() {
    let project = Project::new();
    project.file("lib/std/nodes.bt", "extern control Sequence();\nextern action Wait(in ms: int32);\n");
    project.file(
        "main.bt",
        "import \"std/nodes.bt\";\ntree Main() {\n    Sequence {\n        Wait(ms: 100);\n    }\n}\n",
    );

    let options = CompileOptions::new().stdlib(project.path("lib/std"));
    let result = project.compile_with("main.bt", &options);
    assert!(result.diagnostics.is_empty(), "{}", result.render_diagnostics(false));
}

#[test]
fn missing_module_is_reported() {
    let project = Project::new();
    project.file("main.bt", "import \"./nowhere.bt\";\n");

    let result = project.compile("main.bt");
    let errors = errors(&result);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code.as_deref(), Some(codes::MODULE_NOT_FOUND));
    assert_eq!(errors[0].message, "cannot find module `./nowhere.bt`");
    assert_eq!(result.graph.len(), 1);
}

#[test]
fn import_cycle_is_reported_once() {
    let project = Project::new();
    project.file("a.bt", "import \"./b.bt\";\nextern action A();\n");
    project.file("b.bt", "import \"./a.bt\";\nextern action B();\n");

    let result = project.compile("a.bt");
    assert!(!result.success);
    let cycles: Vec<&Diagnostic> = result
        .diagnostics
        .iter()
        .filter(|d| d.code.as_deref() == Some(codes::IMPORT_CYCLE))
        .collect();
    assert_eq!(cycles.len(), 1, "{}", result.render_diagnostics(false));
    assert_eq!(cycles[0].message, "import of `./a.bt` creates a cycle");
    assert_eq!(
        cycles[0].note.as_deref(),
        Some("import chain: `a.bt` -> `b.bt` -> `a.bt`")
    );
    assert_eq!(result.graph.len(), 2);
}

#[test]
fn diamond_imports_load_each_module_once() {
    let project = Project::new();
    project.file("base.bt", "extern action Base();\n");
    project.file("left.bt", "import \"./base.bt\";\ntree Left() {\n    Base();\n}\n");
    project.file("right.bt", "import \"./base.bt\";\ntree Right() {\n    Base();\n}\n");
    project.file(
        "main.bt",
        "import \"./left.bt\";\nimport \"./right.bt\";\ntree Main() {\n    Left();\n    Right();\n}\n",
    );

    let result = project.compile("main.bt");
    assert!(result.diagnostics.is_empty(), "{}", result.render_diagnostics(false));
    assert_eq!(result.graph.len(), 4);
}

#[test]
fn duplicate_import_is_a_warning() {
    let project = Project::new();
    project.file("dep.bt", "extern action Ping();\n");
    project.file(
        "main.bt",
        "import \"./dep.bt\";\nimport \"./dep.bt\";\ntree Main() {\n    Ping();\n}\n",
    );

    let result = project.compile("main.bt");
    assert!(result.success);
    assert_eq!(codes_of(&result), [codes::DUPLICATE_IMPORT]);
    let warning = result.diagnostics.iter().next().expect("warning");
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.fixits[0].replacement, "");
}

// ============================================================================
// Name resolution across modules
// ============================================================================

#[test]
fn imports_are_not_transitive() {
    let project = Project::new();
    project.file("c.bt", "extern action Deep();\n");
    project.file("b.bt", "import \"./c.bt\";\ntree Mid() {\n    Deep();\n}\n");
    project.file("a.bt", "import \"./b.bt\";\ntree Main() {\n    Mid();\n    Deep();\n}\n");

    let result = project.compile("a.bt");
    let errors = errors(&result);
    assert_eq!(errors.len(), 1, "{}", result.render_diagnostics(false));
    assert_eq!(errors[0].code.as_deref(), Some(codes::UNDECLARED_NAME));
    assert_eq!(errors[0].message, "undeclared identifier `Deep`");
}

#[test]
fn name_from_two_imports_is_ambiguous() {
    let project = Project::new();
    project.file("x.bt", "extern action Foo();\n");
    project.file("y.bt", "extern action Foo();\n");
    project.file(
        "a.bt",
        "import \"./x.bt\";\nimport \"./y.bt\";\ntree Main() {\n    Foo();\n}\n",
    );

    let result = project.compile("a.bt");
    let errors = errors(&result);
    assert_eq!(errors.len(), 1, "{}", result.render_diagnostics(false));
    assert_eq!(errors[0].code.as_deref(), Some(codes::AMBIGUOUS_NAME));
    assert!(errors[0].message.contains("./x.bt"), "{}", errors[0].message);
    assert!(errors[0].message.contains("./y.bt"), "{}", errors[0].message);
}

#[test]
fn unused_import_is_a_warning() {
    let project = Project::new();
    project.file("dep.bt", "extern action Ping();\n");
    project.file("main.bt", "import \"./dep.bt\";\nextern action Pong();\ntree Main() {\n    Pong();\n}\n");

    let result = project.compile("main.bt");
    assert!(result.success);
    assert_eq!(codes_of(&result), [codes::UNUSED_IMPORT]);
}

// ============================================================================
// Entry handling and output forms
// ============================================================================

#[test]
fn unreadable_entry_is_one_location_less_error() {
    let project = Project::new();
    let result = project.compile("absent.bt");

    assert!(!result.success);
    assert!(result.entry.is_none());
    assert!(result.graph.is_empty());
    assert_eq!(result.diagnostics.len(), 1);
    let diagnostic = result.diagnostics.iter().next().expect("diagnostic");
    assert_eq!(diagnostic.code.as_deref(), Some(codes::UNREADABLE_SOURCE));
    assert!(!diagnostic.primary_range().is_valid());
}

#[test]
fn json_output_carries_one_indexed_ranges() {
    let project = Project::new();
    project.file("main.bt", "extern action Ping();\ntree Main() {\n    Pong();\n}\n");

    let result = project.compile("main.bt");
    let text = json::to_json_string(&result.diagnostics, &result.sources).expect("json");
    let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
    let first = &value[0];
    assert_eq!(first["severity"], "error");
    assert_eq!(first["code"], codes::UNDECLARED_NAME);
    assert_eq!(first["range"]["startLine"], 3);
    assert_eq!(first["range"]["startColumn"], 5);
}

// ============================================================================
// Semantic passes
// ============================================================================

struct CountingPass {
    runs: Arc<AtomicUsize>,
    succeed: bool,
}

impl SemanticPass for CountingPass {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn run(&self, cx: &AnalysisContext<'_>, diagnostics: &mut DiagnosticBag) -> bool {
        self.runs.fetch_add(1, Ordering::SeqCst);
        assert!(cx.entry_module().is_some());
        if !self.succeed {
            diagnostics.report_error(btdsl::source::SourceRange::NONE, "pass failed");
        }
        self.succeed
    }
}

fn counting(succeed: bool) -> (CountingPass, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    (
        CountingPass {
            runs: Arc::clone(&runs),
            succeed,
        },
        runs,
    )
}

#[test]
fn passes_run_after_clean_resolution() {
    let project = Project::new();
    project.file("main.bt", "extern action Ping();\ntree Main() {\n    Ping();\n}\n");

    let (pass, runs) = counting(true);
    let result = project.compile_with("main.bt", &CompileOptions::new().pass(pass));
    assert!(result.success);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn passes_are_skipped_when_resolution_failed() {
    let project = Project::new();
    project.file("main.bt", "tree Main() {\n    Missing();\n}\n");

    let (pass, runs) = counting(true);
    let result = project.compile_with("main.bt", &CompileOptions::new().pass(pass));
    assert!(!result.success);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn failing_pass_stops_later_passes() {
    let project = Project::new();
    project.file("main.bt", "extern action Ping();\ntree Main() {\n    Ping();\n}\n");

    let (first, first_runs) = counting(false);
    let (second, second_runs) = counting(true);
    let options = CompileOptions::new().pass(first).pass(second);
    let result = project.compile_with("main.bt", &options);
    assert!(!result.success);
    assert_eq!(first_runs.load(Ordering::SeqCst), 1);
    assert_eq!(second_runs.load(Ordering::SeqCst), 0);
}
