//! Rust-style terminal rendering of a [`DiagnosticBag`].
//!
//! ```text
//! error[E0100]: expected `;` after node call
//!   --> main.bt:2:18
//!    |
//!  2 |   AlwaysSuccess()
//!    |                  ^ expected `;`
//!    |
//!    = help: terminate the statement with `;`
//!
//! ```

use std::fmt::Write as _;
use std::io;

use super::{Diagnostic, DiagnosticBag, Label, LabelStyle, Severity};
use crate::source::{FileId, SourceManager};

const TAB_WIDTH: usize = 4;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const BLUE: &str = "\x1b[34m";

/// Renders diagnostics with source context.
pub struct DiagnosticPrinter<'a> {
    sources: &'a SourceManager,
    color: bool,
}

impl<'a> DiagnosticPrinter<'a> {
    pub fn new(sources: &'a SourceManager) -> Self {
        Self { sources, color: false }
    }

    /// Enable or disable ANSI colors (off by default).
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write every diagnostic in display order (see [`DiagnosticBag::sorted`]).
    pub fn print_all(&self, bag: &DiagnosticBag, out: &mut impl io::Write) -> io::Result<()> {
        out.write_all(self.render_all(bag).as_bytes())?;
        out.flush()
    }

    pub fn render_all(&self, bag: &DiagnosticBag) -> String {
        bag.sorted().into_iter().map(|d| self.render(d)).collect()
    }

    /// Render a single diagnostic, including its trailing blank line.
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        let severity_color = match diagnostic.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Info => GREEN,
            Severity::Hint => CYAN,
        };

        let head = match &diagnostic.code {
            Some(code) => format!("{}[{code}]", diagnostic.severity),
            None => diagnostic.severity.to_string(),
        };
        let _ = writeln!(
            out,
            "{}{}",
            self.paint(&head, &[BOLD, severity_color]),
            self.paint(&format!(": {}", diagnostic.message), &[BOLD])
        );

        let groups = self.group_labels(diagnostic);
        let width = groups
            .iter()
            .flat_map(|(_, lines)| lines.iter().map(|(line, _)| *line))
            .max()
            .map_or(1, |line| line.to_string().len());
        let pad = " ".repeat(width);
        let gutter = self.paint("|", &[BOLD, BLUE]);

        for (index, (file, lines)) in groups.iter().enumerate() {
            let anchor = match diagnostic.primary_label() {
                Some(primary) if index == 0 => Some(primary),
                _ => lines.first().and_then(|(_, labels)| labels.first().copied()),
            };
            let Some(anchor) = anchor else {
                continue;
            };
            let (line, col) = self.sources.line_col(*file, anchor.range.start);
            let arrow = if index == 0 { "-->" } else { ":::" };
            let _ = writeln!(
                out,
                "{pad} {} {}:{line}:{col}",
                self.paint(arrow, &[BOLD, BLUE]),
                self.sources.display_path(*file)
            );
            let _ = writeln!(out, " {pad} {gutter}");

            for (line, labels) in lines {
                let text = self.sources.line_text(*file, *line).unwrap_or("");
                let expanded = expand_tabs(text);
                let number = self.paint(&format!("{line:>width$}"), &[BOLD, BLUE]);
                if expanded.is_empty() {
                    let _ = writeln!(out, " {number} {gutter}");
                } else {
                    let _ = writeln!(out, " {number} {gutter} {expanded}");
                }

                for label in labels {
                    let (offset, len) = self.underline(*file, *line, label);
                    let (mark, color) = match label.style {
                        LabelStyle::Primary => ('^', severity_color),
                        LabelStyle::Secondary => ('-', BLUE),
                    };
                    let marks = mark.to_string().repeat(len);
                    let mut caret_line = format!("{}{}", " ".repeat(offset), marks);
                    if !label.message.is_empty() {
                        caret_line.push(' ');
                        caret_line.push_str(&label.message);
                    }
                    let _ = writeln!(out, " {pad} {gutter} {}", self.paint(&caret_line, &[BOLD, color]));
                }
            }
        }

        let has_location = !groups.is_empty();
        if diagnostic.help.is_some() || diagnostic.note.is_some() {
            if has_location {
                let _ = writeln!(out, " {pad} {gutter}");
            }
            if let Some(help) = &diagnostic.help {
                let _ = writeln!(out, " {pad} {} {help}", self.paint("= help:", &[BOLD]));
            }
            if let Some(note) = &diagnostic.note {
                let _ = writeln!(out, " {pad} {} {note}", self.paint("= note:", &[BOLD]));
            }
        }
        out.push('\n');
        out
    }

    /// Group labels by file (primary file first) and then by line, both in display order.
    fn group_labels<'d>(&self, diagnostic: &'d Diagnostic) -> Vec<(FileId, Vec<(usize, Vec<&'d Label>)>)> {
        let mut ordered: Vec<&Label> = diagnostic
            .labels
            .iter()
            .filter(|l| l.range.is_valid() && self.sources.file(l.range.file).is_some())
            .collect();
        // Primary label first so its file leads.
        ordered.sort_by_key(|l| l.style != LabelStyle::Primary);

        let mut groups: Vec<(FileId, Vec<(usize, Vec<&Label>)>)> = Vec::new();
        for label in ordered {
            let file = label.range.file;
            let (line, _) = self.sources.line_col(file, label.range.start);
            let index = match groups.iter().position(|(f, _)| *f == file) {
                Some(index) => index,
                None => {
                    groups.push((file, Vec::new()));
                    groups.len() - 1
                }
            };
            let group = &mut groups[index].1;
            match group.iter_mut().find(|(l, _)| *l == line) {
                Some((_, labels)) => labels.push(label),
                None => group.push((line, vec![label])),
            }
        }
        for (_, lines) in &mut groups {
            lines.sort_by_key(|(line, _)| *line);
            for (_, labels) in lines.iter_mut() {
                labels.sort_by_key(|l| l.range.start);
            }
        }
        groups
    }

    /// Display column and width of a label's underline on `line`.
    fn underline(&self, file: FileId, line: usize, label: &Label) -> (usize, usize) {
        let text = self.sources.text(file);
        let line_start = self.sources.line_start(file, line).unwrap_or(0);
        let line_text = self.sources.line_text(file, line).unwrap_or("");
        let line_end = line_start + line_text.len();

        let start = clamp_to_boundary(text, label.range.start.clamp(line_start, line_end));
        let end = clamp_to_boundary(text, label.range.end.clamp(start, line_end));
        let offset = display_width(&text[line_start..start]);
        let len = display_width(&text[start..end]).max(1);
        (offset, len)
    }

    fn paint(&self, text: &str, styles: &[&str]) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("{}{text}{RESET}", styles.concat())
    }
}

fn expand_tabs(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
}

fn display_width(text: &str) -> usize {
    text.chars().map(|c| if c == '\t' { TAB_WIDTH } else { 1 }).sum()
}

fn clamp_to_boundary(text: &str, mut offset: usize) -> usize {
    offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceRange;

    fn setup(text: &str) -> (SourceManager, FileId) {
        let mut sm = SourceManager::new();
        let file = sm.add_file("main.bt", text);
        (sm, file)
    }

    #[test]
    fn renders_primary_label_with_help() {
        let (sm, file) = setup("tree T() {\n  AlwaysSuccess()\n}\n");
        let mut bag = DiagnosticBag::new();
        bag.report_error(SourceRange::empty_at(file, 28), "expected `;` after node call")
            .with_code("E0100")
            .with_label("expected `;`")
            .with_help("terminate the statement with `;`");
        let out = DiagnosticPrinter::new(&sm).render_all(&bag);
        insta::assert_snapshot!(out.trim_end(), @r"
        error[E0100]: expected `;` after node call
          --> main.bt:2:18
           |
         2 |   AlwaysSuccess()
           |                  ^ expected `;`
           |
           = help: terminate the statement with `;`
        ");
    }

    #[test]
    fn secondary_labels_use_dashes() {
        let (sm, file) = setup("var a: int32;\nvar a: int32;\n");
        let mut bag = DiagnosticBag::new();
        bag.report_error(SourceRange::new(file, 18, 19), "duplicate definition of `a`")
            .with_label("redefined here")
            .with_secondary(SourceRange::new(file, 4, 5), "first defined here");
        let out = DiagnosticPrinter::new(&sm).render_all(&bag);
        insta::assert_snapshot!(out.trim_end(), @r"
        error: duplicate definition of `a`
          --> main.bt:2:5
           |
         1 | var a: int32;
           |     - first defined here
         2 | var a: int32;
           |     ^ redefined here
        ");
    }

    #[test]
    fn gutters_and_carets_line_up_with_source() {
        let (sm, file) = setup("tree T() {\n  AlwaysSuccess()\n}\n");
        let mut bag = DiagnosticBag::new();
        bag.report_error(SourceRange::new(file, 13, 26), "e")
            .with_label("here")
            .with_note("n");
        let out = DiagnosticPrinter::new(&sm).render_all(&bag);
        let lines: Vec<&str> = out.lines().collect();
        let source = lines.iter().find(|l| l.contains("AlwaysSuccess")).unwrap();
        let caret = lines.iter().find(|l| l.contains('^')).unwrap();
        let note = lines.iter().find(|l| l.contains("= note:")).unwrap();

        let bar = source.find('|');
        assert!(lines.iter().filter(|l| l.contains('|')).all(|l| l.find('|') == bar), "{out}");
        assert_eq!(caret.find('^'), source.find("AlwaysSuccess"), "{out}");
        assert_eq!(note.find('='), bar, "{out}");
    }

    #[test]
    fn location_less_diagnostic_has_only_header() {
        let (sm, _) = setup("");
        let mut bag = DiagnosticBag::new();
        bag.report_error(SourceRange::NONE, "cannot read `missing.bt`");
        assert_eq!(DiagnosticPrinter::new(&sm).render_all(&bag), "error: cannot read `missing.bt`\n\n");
    }

    #[test]
    fn tabs_are_expanded_consistently() {
        let (sm, file) = setup("\tfoo;\n");
        let mut bag = DiagnosticBag::new();
        bag.report_warning(SourceRange::new(file, 1, 4), "w");
        let out = DiagnosticPrinter::new(&sm).render_all(&bag);
        assert!(out.contains(" 1 |     foo;\n"));
        assert!(out.contains("   |     ^^^\n"));
    }

    #[test]
    fn color_output_wraps_in_ansi_codes() {
        let (sm, file) = setup("x\n");
        let mut bag = DiagnosticBag::new();
        bag.report_error(SourceRange::new(file, 0, 1), "e");
        let out = DiagnosticPrinter::new(&sm).with_color(true).render_all(&bag);
        assert!(out.contains(RESET));
    }
}
