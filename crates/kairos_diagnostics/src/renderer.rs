//! Human-readable rendering of diagnostics.

use crate::diagnostic::Diagnostic;
use crate::label::Label;
use kairos_source::{SourceDb, Span};
use std::fmt::Write;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const BLUE: &str = "\x1b[1;34m";

/// Formats a diagnostic into a printable string.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in rustc style:
///
/// ```text
/// warning[N003]: wire `n7` has no driver
///   --> top.v:12:6
///    |
/// 12 | wire n7;
///    |      ^^
///    = note: ...
/// ```
pub struct TerminalRenderer {
    /// Emit ANSI color escapes.
    pub color: bool,
    /// Terminal width; messages longer than this are not wrapped, but
    /// underlines are clipped to it.
    pub width: u16,
}

impl TerminalRenderer {
    /// Creates a renderer.
    pub fn new(color: bool, width: u16) -> Self {
        Self { color, width }
    }

    fn paint<'a>(&self, code: &'a str) -> &'a str {
        if self.color {
            code
        } else {
            ""
        }
    }

    fn render_snippet(&self, out: &mut String, label: &Label, source_db: &SourceDb) {
        let Some(file) = source_db.try_get_file(label.span.file) else {
            return;
        };
        let (line, col) = file.line_col(label.span.start);
        let line_num = line.to_string();
        let pad = " ".repeat(line_num.len());
        let text = file.line_text(label.span.start);
        let blue = self.paint(BLUE);
        let reset = self.paint(RESET);

        // Multi-line spans are underlined to the end of their first line.
        let avail = text.len().saturating_sub(col as usize - 1).max(1);
        let width = (label.span.len() as usize).clamp(1, avail);
        let width = width.min((self.width as usize).saturating_sub(pad.len() + 3).max(1));
        let underline: String = std::iter::repeat(label.underline_char())
            .take(width)
            .collect();
        let message = if label.message.is_empty() {
            String::new()
        } else {
            format!(" {}", label.message)
        };

        let _ = writeln!(out, "{blue}{pad} |{reset}");
        let _ = writeln!(out, "{blue}{line_num} |{reset} {text}");
        let _ = writeln!(
            out,
            "{blue}{pad} |{reset} {}{underline}{message}",
            " ".repeat(col as usize - 1)
        );
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();
        let sev = self.paint(diag.severity.ansi());
        let bold = self.paint(BOLD);
        let blue = self.paint(BLUE);
        let reset = self.paint(RESET);

        let _ = writeln!(
            out,
            "{sev}{}[{}]{reset}{bold}: {}{reset}",
            diag.severity, diag.code, diag.message
        );

        if let Some(resolved) = source_db.resolve_span(diag.primary_span) {
            let _ = writeln!(out, "  {blue}-->{reset} {resolved}");
            let primary_message = diag
                .labels
                .iter()
                .find(|l| l.span == diag.primary_span)
                .map(|l| l.message.clone())
                .unwrap_or_default();
            self.render_snippet(
                &mut out,
                &Label::primary(diag.primary_span, primary_message),
                source_db,
            );
        }

        for label in diag
            .labels
            .iter()
            .filter(|l| l.span != diag.primary_span && l.span != Span::DUMMY)
        {
            if let Some(resolved) = source_db.resolve_span(label.span) {
                let _ = writeln!(out, "  {blue}::>{reset} {resolved}");
                self.render_snippet(&mut out, label, source_db);
            }
        }

        for note in &diag.notes {
            let _ = writeln!(out, "   {blue}={reset} {bold}note{reset}: {note}");
        }
        for help in &diag.help {
            let _ = writeln!(out, "   {blue}={reset} {bold}help{reset}: {help}");
        }
        out
    }
}
