//! Diagnostic codes with a per-stage prefix letter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The pipeline stage a diagnostic originates from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Cell-library parsing, prefixed with `L`.
    Library,
    /// Netlist parsing and wiring, prefixed with `N`.
    Netlist,
    /// Constraint and annotation documents, prefixed with `C`.
    Constraint,
    /// Timing analysis, prefixed with `T`.
    Timing,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Library => 'L',
            Category::Netlist => 'N',
            Category::Constraint => 'C',
            Category::Timing => 'T',
        }
    }
}

/// A category prefix plus a number, displayed as e.g. `N003`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The originating stage.
    pub category: Category,
    /// The number within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
