//! Input units handed to the scanner.

use std::path::{Path, PathBuf};

use crate::span::SourceSpan;

/// One input file: its identity and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File identity, relative to the project root when read from disk.
    pub path: PathBuf,
    /// File contents.
    pub content: String,
}

impl SourceFile {
    /// Creates a source file from an identity and its text.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Reads a file and stores it under its path relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the file cannot be read.
    pub fn read(path: &Path, root: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let relative = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);
        Ok(Self::new(relative, content))
    }

    /// File extension with a leading dot, or an empty string.
    #[must_use]
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default()
    }

    /// 1-indexed line and column of a byte offset.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.content.len());
        let before = &self.content.as_bytes()[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        (line, offset - line_start + 1)
    }

    /// Builds a span for a byte range of this file.
    #[must_use]
    pub fn span(&self, start: usize, end: usize) -> SourceSpan {
        let (line, column) = self.line_col(start);
        SourceSpan::new(self.path.clone(), start, end, line, column)
    }

    /// Calculates byte offset for a given 1-indexed line and column.
    ///
    /// Returns 0 if the line is out of bounds.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        if line == 0 {
            return 0;
        }

        let mut offset = 0;
        for (i, line_content) in self.content.split('\n').enumerate() {
            if i + 1 == line {
                return offset + column.saturating_sub(1);
            }
            offset += line_content.len() + 1;
        }

        0
    }
}
