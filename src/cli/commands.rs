//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io::{self, Write};
use std::path::Path;

use crate::frontend::ast::AstArena;
use crate::frontend::compile::{CompileOptions, compile};
use crate::frontend::diagnostics::{DiagnosticBag, DiagnosticPrinter, fancy, json};
use crate::frontend::lexer::{self, TokenKind};
use crate::frontend::parser;
use crate::frontend::resolver::SOURCE_EXTENSION;
use crate::frontend::source::{FileId, SourceManager};

use super::{CliError, CliResult, DiagnosticFormat, ExitCode, PackageArg};

/// Output settings shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub format: DiagnosticFormat,
    pub color: bool,
}

/// Where JSON diagnostics go. `check` owns stdout; `lex` and `parse` print their dump there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonTarget {
    Stdout,
    Stderr,
}

// ============================================================================
// Commands
// ============================================================================

/// Tokenize and display tokens.
pub fn lex_file(path: &Path, output: Output) -> CliResult<ExitCode> {
    let (sources, file) = load_single(path)?;
    let mut bag = DiagnosticBag::new();
    let text = sources.text(file);
    let tokens = lexer::lex_all(text, file, &mut bag);

    let mut stdout = io::stdout().lock();
    for token in &tokens {
        if token.kind == TokenKind::Eof {
            break;
        }
        let (line, col) = sources.line_col(file, token.range.start);
        writeln!(stdout, "{line}:{col}\t{:?}\t{:?}", token.kind, token.text).map_err(write_error)?;
    }
    drop(stdout);

    emit_diagnostics(&bag, &sources, output, JsonTarget::Stderr)?;
    Ok(exit_code(&bag))
}

/// Parse and display AST.
pub fn parse_file(path: &Path, output: Output) -> CliResult<ExitCode> {
    let (sources, file) = load_single(path)?;
    let mut bag = DiagnosticBag::new();
    let mut arena = AstArena::new();
    let program = parser::parse_source(sources.text(file), file, &mut arena, &mut bag);

    println!("{:#?}", program);
    for &decl in &program.decls {
        println!("{:#?}", arena.decl(decl));
    }

    emit_diagnostics(&bag, &sources, output, JsonTarget::Stderr)?;
    Ok(exit_code(&bag))
}

/// Load a program with its imports and resolve names.
pub fn check_file(
    path: &Path,
    packages: &[PackageArg],
    stdlib: Option<&Path>,
    output: Output,
) -> CliResult<ExitCode> {
    if path.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXTENSION) {
        tracing::warn!(
            "entry file {} does not have the .{} extension",
            path.display(),
            SOURCE_EXTENSION
        );
    }

    let mut options = CompileOptions::new();
    for package in packages {
        warn_if_not_dir(&package.name, &package.dir);
        options = options.package(package.name.clone(), package.dir.clone());
    }
    if let Some(dir) = stdlib {
        warn_if_not_dir("std", dir);
        options = options.stdlib(dir);
    }

    let result = compile(path, &options);
    emit_diagnostics(&result.diagnostics, &result.sources, output, JsonTarget::Stdout)?;

    if output.format != DiagnosticFormat::Json {
        let errors = result.diagnostics.error_count();
        let warnings = result.diagnostics.warning_count();
        if result.success {
            eprintln!(
                "✓ checked {} module{}{}",
                result.graph.len(),
                plural(result.graph.len()),
                warning_suffix(warnings)
            );
        } else {
            eprintln!("✗ {errors} error{}{}", plural(errors), warning_suffix(warnings));
        }
    }

    Ok(if result.success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

// ============================================================================
// Helpers
// ============================================================================

/// Read one file into a fresh source manager.
fn load_single(path: &Path) -> CliResult<(SourceManager, FileId)> {
    let mut sources = SourceManager::new();
    let file = sources
        .load_file(path)
        .map_err(|e| CliError::failure(format!("error: {e}")))?;
    Ok((sources, file))
}

fn emit_diagnostics(bag: &DiagnosticBag, sources: &SourceManager, output: Output, target: JsonTarget) -> CliResult<()> {
    match output.format {
        DiagnosticFormat::Human => {
            let printer = DiagnosticPrinter::new(sources).with_color(output.color);
            printer.print_all(bag, &mut io::stderr().lock()).map_err(write_error)
        }
        DiagnosticFormat::Json => {
            let text = json::to_json_string(bag, sources)
                .map_err(|e| CliError::failure(format!("error: cannot serialize diagnostics: {e}")))?;
            match target {
                JsonTarget::Stdout => writeln!(io::stdout().lock(), "{text}").map_err(write_error),
                JsonTarget::Stderr => writeln!(io::stderr().lock(), "{text}").map_err(write_error),
            }
        }
        DiagnosticFormat::Fancy => {
            let color = output.color;
            // Fails only if a hook is already installed, which keeps the first choice.
            let _ = miette::set_hook(Box::new(move |_| {
                Box::new(miette::MietteHandlerOpts::new().color(color).build())
            }));
            let mut stderr = io::stderr().lock();
            for report in fancy::to_reports(bag, sources) {
                writeln!(stderr, "{report:?}").map_err(write_error)?;
            }
            Ok(())
        }
    }
}

fn exit_code(bag: &DiagnosticBag) -> ExitCode {
    if bag.has_errors() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn warn_if_not_dir(package: &str, dir: &Path) {
    if !dir.is_dir() {
        tracing::warn!("package `{}` root {} is not a directory", package, dir.display());
    }
}

fn write_error(e: io::Error) -> CliError {
    CliError::failure(format!("error: cannot write output: {e}"))
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn warning_suffix(warnings: usize) -> String {
    match warnings {
        0 => String::new(),
        n => format!(", {n} warning{}", plural(n)),
    }
}
