//! Input text management and source locations for diagnostics.
//!
//! Liberty libraries, netlists and constraint documents are loaded into a
//! [`SourceDb`]. Parsers report problems as [`Span`]s (byte ranges into the
//! original text), which the renderer resolves to `file:line:col`.
//! [`mask`] blanks out comments and attribute annotations without moving
//! any byte, so spans computed on the masked text stay valid.

#![warn(missing_docs)]

pub mod mask;
pub mod source_db;
pub mod source_file;
pub mod span;

pub use mask::{mask_attributes, mask_comments};
pub use source_db::{ResolvedSpan, SourceDb};
pub use source_file::{SourceFile, SourceKind};
pub use span::{FileId, Span};
