//! Secondary annotations attached to a diagnostic.

use kairos_source::Span;
use serde::{Deserialize, Serialize};

/// Whether a label marks the problem itself or related context.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LabelStyle {
    /// Underlined with `^`.
    Primary,
    /// Underlined with `-`.
    Secondary,
}

/// A span with a short message, e.g. "first declared here".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    /// The annotated location.
    pub span: Span,
    /// Text printed after the underline.
    pub message: String,
    /// Primary or secondary.
    pub style: LabelStyle,
}

impl Label {
    /// Creates a primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Creates a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }

    pub(crate) fn underline_char(&self) -> char {
        match self.style {
            LabelStyle::Primary => '^',
            LabelStyle::Secondary => '-',
        }
    }
}
