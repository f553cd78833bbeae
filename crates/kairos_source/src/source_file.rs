//! A loaded text with a line index.

use crate::span::FileId;
use std::path::PathBuf;

/// The kind of document a source file holds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SourceKind {
    /// A Liberty-style cell library.
    Library,
    /// A structural gate-level netlist.
    Netlist,
    /// A JSON constraint or annotation document.
    Constraints,
}

/// One input text plus precomputed line starts for line/column lookup.
pub struct SourceFile {
    /// Handle of this file in its [`SourceDb`](crate::SourceDb).
    pub id: FileId,
    /// Path on disk, or a synthetic name for in-memory text.
    pub path: PathBuf,
    /// What the text contains.
    pub kind: SourceKind,
    /// The full text.
    pub content: String,
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Creates a source file and indexes its line starts.
    pub fn new(id: FileId, path: PathBuf, kind: SourceKind, content: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                content
                    .bytes()
                    .enumerate()
                    .filter(|&(_, b)| b == b'\n')
                    .map(|(i, _)| (i + 1) as u32),
            )
            .collect();
        Self {
            id,
            path,
            kind,
            content,
            line_starts,
        }
    }

    /// Converts a byte offset into 1-indexed `(line, column)`.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let col = byte_offset - self.line_starts[line_idx] + 1;
        (line_idx as u32 + 1, col)
    }

    /// Returns the full line containing `byte_offset`, without its newline.
    pub fn line_text(&self, byte_offset: u32) -> &str {
        let offset = (byte_offset as usize).min(self.content.len());
        let start = self.content[..offset].rfind('\n').map_or(0, |p| p + 1);
        let end = self.content[offset..]
            .find('\n')
            .map_or(self.content.len(), |p| offset + p);
        &self.content[start..end]
    }
}
