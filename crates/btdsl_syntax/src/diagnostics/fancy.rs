//! Graphical rendering through `miette`.
//!
//! [`DiagnosticPrinter`](super::DiagnosticPrinter) is the canonical, snapshot-stable format. This
//! adapter exists for interactive use (`btdsl check --format fancy`), where miette's graphical
//! handler gives nicer output.

use miette::{LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

use super::{Diagnostic, LabelStyle, Severity};
use crate::source::SourceManager;

/// A [`Diagnostic`] bundled with the source text it points into.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FancyDiagnostic {
    message: String,
    code: Option<String>,
    severity: miette::Severity,
    src: Option<NamedSource<String>>,
    labels: Vec<LabeledSpan>,
    help: Option<String>,
}

impl FancyDiagnostic {
    pub fn new(diagnostic: &Diagnostic, sources: &SourceManager) -> Self {
        let primary = diagnostic.primary_range();
        let file = sources.file(primary.file);
        let src = file.map(|f| NamedSource::new(sources.display_path(f.id()), f.text().to_string()));

        // miette can only show one source per diagnostic; labels in other files are dropped.
        let labels = diagnostic
            .labels
            .iter()
            .filter(|l| file.is_some() && l.range.file == primary.file)
            .map(|l| {
                let span = SourceSpan::from((l.range.start, l.range.len()));
                let text = (!l.message.is_empty()).then(|| l.message.clone());
                match l.style {
                    LabelStyle::Primary => LabeledSpan::new_primary_with_span(text, span),
                    LabelStyle::Secondary => LabeledSpan::new_with_span(text, span),
                }
            })
            .collect();

        let help = match (&diagnostic.help, &diagnostic.note) {
            (Some(help), Some(note)) => Some(format!("{help}\nnote: {note}")),
            (Some(help), None) => Some(help.clone()),
            (None, Some(note)) => Some(format!("note: {note}")),
            (None, None) => None,
        };

        Self {
            message: diagnostic.message.clone(),
            code: diagnostic.code.clone(),
            severity: match diagnostic.severity {
                Severity::Error => miette::Severity::Error,
                Severity::Warning => miette::Severity::Warning,
                Severity::Info | Severity::Hint => miette::Severity::Advice,
            },
            src,
            labels,
            help,
        }
    }
}

impl miette::Diagnostic for FancyDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.code.as_ref().map(|c| Box::new(c) as Box<dyn std::fmt::Display + 'a>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src.as_ref().map(|s| s as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            return None;
        }
        Some(Box::new(self.labels.iter().cloned()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.help.as_ref().map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }
}

/// Convert every diagnostic of `bag` into a `miette::Report`, in display order.
pub fn to_reports(bag: &super::DiagnosticBag, sources: &SourceManager) -> Vec<miette::Report> {
    bag.sorted()
        .into_iter()
        .map(|d| miette::Report::new(FancyDiagnostic::new(d, sources)))
        .collect()
}
