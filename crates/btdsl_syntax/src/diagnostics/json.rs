//! JSON form of diagnostics for IDE tooling.
//!
//! Byte ranges are converted to 1-indexed line/column pairs at this boundary. Consumers that speak
//! LSP convert further with [`SourceManager::lsp_position`].

use serde::Serialize;

use super::{Diagnostic, DiagnosticBag, Severity};
use crate::source::SourceManager;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRange {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDiagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<JsonRange>,
    /// Display path of the file the diagnostic points into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diagnostic: &Diagnostic, sources: &SourceManager) -> Self {
        let primary = diagnostic.primary_range();
        let located = primary.is_valid() && sources.file(primary.file).is_some();
        let range = located.then(|| {
            let (start_line, start_column) = sources.line_col(primary.file, primary.start);
            let (end_line, end_column) = sources.line_col(primary.file, primary.end);
            JsonRange {
                start_line,
                start_column,
                end_line,
                end_column,
            }
        });
        Self {
            severity: diagnostic.severity,
            message: diagnostic.message.clone(),
            code: diagnostic.code.clone(),
            range,
            source: located.then(|| sources.display_path(primary.file)),
            help: diagnostic.help.clone(),
            note: diagnostic.note.clone(),
        }
    }
}

/// Convert a bag to JSON records, in display order.
pub fn to_json(bag: &DiagnosticBag, sources: &SourceManager) -> Vec<JsonDiagnostic> {
    bag.sorted()
        .into_iter()
        .map(|d| JsonDiagnostic::from_diagnostic(d, sources))
        .collect()
}

/// Serialize a bag as a pretty-printed JSON array.
pub fn to_json_string(bag: &DiagnosticBag, sources: &SourceManager) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&to_json(bag, sources))
}
