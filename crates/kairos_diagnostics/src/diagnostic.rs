//! The diagnostic record and its builder methods.

use crate::code::DiagnosticCode;
use crate::label::Label;
use crate::severity::Severity;
use kairos_source::Span;
use serde::{Deserialize, Serialize};

/// One reported problem: severity, code, message, and where it happened.
///
/// Built with [`warning`](Self::warning) or [`error`](Self::error) and
/// refined with the `with_*` methods:
///
/// ```
/// # use kairos_diagnostics::{Category, Diagnostic, DiagnosticCode};
/// # use kairos_source::Span;
/// let diag = Diagnostic::warning(
///     DiagnosticCode::new(Category::Netlist, 3),
///     "wire `n7` has no driver",
///     Span::DUMMY,
/// )
/// .with_note("the wire is kept but nothing propagates through it");
/// assert_eq!(diag.notes.len(), 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level.
    pub severity: Severity,
    /// The code identifying the kind of problem.
    pub code: DiagnosticCode,
    /// The main message.
    pub message: String,
    /// Where the problem was detected; [`Span::DUMMY`] if nowhere in particular.
    pub primary_span: Span,
    /// Additional annotated locations.
    pub labels: Vec<Label>,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
    /// Suggestions for the user.
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            primary_span: span,
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates an error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Error, code, message, span)
    }

    /// Creates a warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Warning, code, message, span)
    }

    /// Creates an informational note.
    pub fn note(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Note, code, message, span)
    }

    /// Adds a label.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}
