//! Diagnostic severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is, ordered from least (`Help`) to most
/// (`Error`) severe.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// A suggestion.
    Help,
    /// Additional context.
    Note,
    /// A problem the run recovered from.
    Warning,
    /// A problem that invalidates the result.
    Error,
}

impl Severity {
    /// Returns `true` for [`Severity::Error`].
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    /// ANSI color escape used by the terminal renderer.
    pub(crate) fn ansi(self) -> &'static str {
        match self {
            Severity::Help => "\x1b[1;36m",
            Severity::Note => "\x1b[1;34m",
            Severity::Warning => "\x1b[1;33m",
            Severity::Error => "\x1b[1;31m",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Help => "help",
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}
