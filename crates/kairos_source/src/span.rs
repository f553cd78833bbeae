//! File handles and byte-offset ranges.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a text loaded into the [`SourceDb`](crate::SourceDb).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// Placeholder for synthesized entities (pseudo-cells, pseudo-instances).
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// A half-open byte range `[start, end)` within one source text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The text this span points into.
    pub file: FileId,
    /// Start byte offset (inclusive).
    pub start: u32,
    /// End byte offset (exclusive).
    pub end: u32,
}

impl Span {
    /// Span used when no source location exists.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a span in `file`.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Creates a span from `usize` offsets, as produced by byte scanners.
    pub fn from_range(file: FileId, range: std::ops::Range<usize>) -> Self {
        Self {
            file,
            start: range.start as u32,
            end: range.end as u32,
        }
    }

    /// Returns the length in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` for a zero-length span.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if this span carries no location.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}
