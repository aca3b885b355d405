//! Structured diagnostics shared by every compiler stage.
//!
//! A [`DiagnosticBag`] is an ordered multiset of [`Diagnostic`]s owned by a single compile invocation.
//! Stages report into it through a [`DiagnosticBuilder`], which is committed to the bag when it is
//! dropped or explicitly [`emit`](DiagnosticBuilder::emit)ted:
//!
//! ```rust
//! use btdsl_syntax::diagnostics::DiagnosticBag;
//! use btdsl_syntax::source::{FileId, SourceRange};
//!
//! let mut bag = DiagnosticBag::new();
//! bag.report_error(SourceRange::NONE, "something went wrong")
//!     .with_code("E0000")
//!     .with_help("try something else");
//! assert!(bag.has_errors());
//! assert_eq!(bag.iter().next().unwrap().help.as_deref(), Some("try something else"));
//! ```
//!
//! ## Notes
//! - Reporting never fails and never aborts; every stage keeps going after an error.
//! - The bag is never partially cleared. Each compile starts with a fresh one.

pub mod codes;
pub mod fancy;
pub mod json;
mod printer;

pub use printer::DiagnosticPrinter;

use std::fmt;

use serde::Serialize;

use crate::source::SourceRange;

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Primary,
    Secondary,
}

/// A message attached to a source range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub range: SourceRange,
    pub style: LabelStyle,
    pub message: String,
}

/// A suggested textual edit: replace `range` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixIt {
    pub range: SourceRange,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub code: Option<String>,
    pub labels: Vec<Label>,
    pub fixits: Vec<FixIt>,
    pub help: Option<String>,
    pub note: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic whose primary label (with no message) covers `range`.
    ///
    /// A detached range produces a location-less diagnostic.
    pub fn new(severity: Severity, range: SourceRange, message: impl Into<String>) -> Self {
        let labels = if range.is_valid() {
            vec![Label {
                range,
                style: LabelStyle::Primary,
                message: String::new(),
            }]
        } else {
            Vec::new()
        };
        Self {
            severity,
            message: message.into(),
            code: None,
            labels,
            fixits: Vec::new(),
            help: None,
            note: None,
        }
    }

    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.iter().find(|l| l.style == LabelStyle::Primary)
    }

    /// Range of the primary label, or [`SourceRange::NONE`].
    pub fn primary_range(&self) -> SourceRange {
        self.primary_label().map_or(SourceRange::NONE, |l| l.range)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Ordered collection of diagnostics for one compile invocation.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a diagnostic of the given severity.
    pub fn report(&mut self, severity: Severity, range: SourceRange, message: impl Into<String>) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            bag: self,
            diagnostic: Some(Diagnostic::new(severity, range, message)),
        }
    }

    pub fn report_error(&mut self, range: SourceRange, message: impl Into<String>) -> DiagnosticBuilder<'_> {
        self.report(Severity::Error, range, message)
    }

    pub fn report_warning(&mut self, range: SourceRange, message: impl Into<String>) -> DiagnosticBuilder<'_> {
        self.report(Severity::Warning, range, message)
    }

    pub fn report_info(&mut self, range: SourceRange, message: impl Into<String>) -> DiagnosticBuilder<'_> {
        self.report(Severity::Info, range, message)
    }

    pub fn report_hint(&mut self, range: SourceRange, message: impl Into<String>) -> DiagnosticBuilder<'_> {
        self.report(Severity::Hint, range, message)
    }

    /// Add an already built diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Move all diagnostics of `other` to the end of this bag.
    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Diagnostics in display order: stable-sorted by `(file, primary start)`.
    ///
    /// Ties keep insertion order. Diagnostics without a location sort last.
    pub fn sorted(&self) -> Vec<&Diagnostic> {
        let mut sorted: Vec<&Diagnostic> = self.diagnostics.iter().collect();
        sorted.sort_by_key(|d| {
            let range = d.primary_range();
            (range.file, range.start)
        });
        sorted
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl<'a> IntoIterator for &'a DiagnosticBag {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

/// In-flight diagnostic. Committed to its bag on drop or [`emit`](Self::emit).
pub struct DiagnosticBuilder<'a> {
    bag: &'a mut DiagnosticBag,
    diagnostic: Option<Diagnostic>,
}

impl DiagnosticBuilder<'_> {
    fn edit(mut self, f: impl FnOnce(&mut Diagnostic)) -> Self {
        if let Some(diagnostic) = self.diagnostic.as_mut() {
            f(diagnostic);
        }
        self
    }

    pub fn with_code(self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.edit(|d| d.code = Some(code))
    }

    /// Set the message shown next to the primary label's underline.
    pub fn with_label(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.edit(|d| {
            if let Some(label) = d.labels.iter_mut().find(|l| l.style == LabelStyle::Primary) {
                label.message = message;
            }
        })
    }

    /// Attach a secondary label; ignored when `range` is detached.
    pub fn with_secondary(self, range: SourceRange, message: impl Into<String>) -> Self {
        let message = message.into();
        self.edit(|d| {
            if range.is_valid() {
                d.labels.push(Label {
                    range,
                    style: LabelStyle::Secondary,
                    message,
                });
            }
        })
    }

    pub fn with_help(self, help: impl Into<String>) -> Self {
        let help = help.into();
        self.edit(|d| d.help = Some(help))
    }

    pub fn with_note(self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.edit(|d| d.note = Some(note))
    }

    pub fn with_fixit(self, range: SourceRange, replacement: impl Into<String>) -> Self {
        let replacement = replacement.into();
        self.edit(|d| d.fixits.push(FixIt { range, replacement }))
    }

    /// Commit the diagnostic now.
    pub fn emit(mut self) {
        self.commit();
    }

    fn commit(&mut self) {
        if let Some(diagnostic) = self.diagnostic.take() {
            self.bag.diagnostics.push(diagnostic);
        }
    }
}

impl Drop for DiagnosticBuilder<'_> {
    fn drop(&mut self) {
        self.commit();
    }
}
