//! The set of texts taking part in one analysis run.

use crate::source_file::{SourceFile, SourceKind};
use crate::span::{FileId, Span};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// A span resolved to 1-indexed line/column coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    /// Path of the file the span points into.
    pub file_path: PathBuf,
    /// Starting line.
    pub start_line: u32,
    /// Starting column.
    pub start_col: u32,
    /// Ending line.
    pub end_line: u32,
    /// Ending column.
    pub end_col: u32,
}

impl fmt::Display for ResolvedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file_path.display(),
            self.start_line,
            self.start_col
        )
    }
}

/// Owns every loaded text and resolves spans for diagnostics.
#[derive(Default)]
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a file from disk.
    pub fn load_file(&mut self, path: &Path, kind: SourceKind) -> Result<FileId, io::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_source(path, kind, content))
    }

    /// Adds an in-memory text; `name` is what diagnostics print as its path.
    pub fn add_source(
        &mut self,
        name: impl Into<PathBuf>,
        kind: SourceKind,
        content: String,
    ) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name.into(), kind, content));
        id
    }

    /// Returns the file for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is [`FileId::DUMMY`] or was not issued by this database.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Returns the file for `id`, or `None` for dummy/foreign ids.
    pub fn try_get_file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.as_raw() as usize)
    }

    /// Resolves a span to line/column coordinates.
    pub fn resolve_span(&self, span: Span) -> Option<ResolvedSpan> {
        let file = self.try_get_file(span.file)?;
        let (start_line, start_col) = file.line_col(span.start);
        let (end_line, end_col) = file.line_col(span.end.saturating_sub(1).max(span.start));
        Some(ResolvedSpan {
            file_path: file.path.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        })
    }

    /// Returns the number of loaded files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
