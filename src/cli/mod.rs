//! CLI module for the BT-DSL compiler
//!
//! ## Commands
//!
//! - `check <file>` - Load a program and its imports, resolve names, report diagnostics
//! - `lex <file>` - Print the token stream of one file
//! - `parse <file>` - Print the AST of one file
//!
//! `btdsl <file>` with no subcommand is the same as `btdsl check <file>`.
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::env;
use std::fmt;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create an error with a custom exit code.
    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self::new(message, ExitCode(code))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code for invalid command-line usage.
const USAGE_EXIT_CODE: i32 = 2;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// How diagnostics are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DiagnosticFormat {
    /// Plain text with source excerpts, on stderr
    #[default]
    Human,
    /// One JSON array on stdout
    Json,
    /// Graphical output through miette, on stderr
    Fancy,
}

/// Whether to use ANSI colors in human output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolve `auto` against the terminal and `NO_COLOR`.
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::stderr().is_terminal() && env::var_os("NO_COLOR").is_none(),
        }
    }
}

/// A `NAME=DIR` package root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArg {
    pub name: String,
    pub dir: PathBuf,
}

fn parse_package(raw: &str) -> Result<PackageArg, String> {
    let Some((name, dir)) = raw.split_once('=') else {
        return Err(format!("expected NAME=DIR, got `{raw}`"));
    };
    if name.is_empty() || dir.is_empty() {
        return Err(format!("expected NAME=DIR, got `{raw}`"));
    }
    if name.contains(['/', '\\']) {
        return Err(format!("package name `{name}` must not contain a path separator"));
    }
    Ok(PackageArg {
        name: name.to_string(),
        dir: PathBuf::from(dir),
    })
}

/// The BT-DSL compiler front-end
#[derive(Parser, Debug)]
#[command(name = "btdsl")]
#[command(version = VERSION)]
#[command(about = "Check BT-DSL behavior tree programs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// File to check (default action when no subcommand given)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Diagnostic output format
    #[arg(long, value_enum, global = true, default_value_t = DiagnosticFormat::Human)]
    pub format: DiagnosticFormat,

    /// Colorize human-readable diagnostics
    #[arg(long, value_enum, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a program and its imports and resolve every name
    Check {
        /// Entry source file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Package root for bare imports (repeatable)
        #[arg(long = "package", value_name = "NAME=DIR", value_parser = parse_package)]
        packages: Vec<PackageArg>,
        /// Standard library root, importable as `std/...`
        #[arg(long, value_name = "DIR")]
        stdlib: Option<PathBuf>,
    },

    /// Tokenize one file and print the tokens (debug)
    Lex {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Parse one file and print its AST (debug)
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let output = commands::Output {
        format: cli.format,
        color: cli.color.enabled(),
    };

    match cli.command {
        Some(Command::Check {
            file,
            packages,
            stdlib,
        }) => commands::check_file(&file, &packages, stdlib.as_deref(), output),
        Some(Command::Lex { file }) => commands::lex_file(&file, output),
        Some(Command::Parse { file }) => commands::parse_file(&file, output),
        None => {
            // Default: check the file if provided
            if let Some(file) = cli.file {
                commands::check_file(&file, &[], None, output)
            } else {
                Err(CliError::with_code(
                    "no input file; run `btdsl --help` for usage",
                    USAGE_EXIT_CODE,
                ))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
