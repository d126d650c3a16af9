//! Source locations attached to every model entity and diagnostic.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A byte range inside one source file.
///
/// `line` and `column` are derived from `start` and kept alongside the
/// offsets so reports do not need the file contents to print a position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceSpan {
    /// File path relative to the project root.
    pub file: PathBuf,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl SourceSpan {
    /// Creates a span with explicit values.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            start,
            end,
            line,
            column,
        }
    }

    /// A zero-length span at the start of `file`.
    ///
    /// Used for synthesized entities that have no syntax of their own.
    #[must_use]
    pub fn file_start(file: impl Into<PathBuf>) -> Self {
        Self::new(file, 0, 0, 1, 1)
    }

    /// Length of the span in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true for zero-length spans.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_line_and_column() {
        let span = SourceSpan::new("src/foo.js", 10, 20, 2, 5);
        assert_eq!(span.to_string(), "src/foo.js:2:5");
        assert_eq!(span.len(), 10);
    }

    #[test]
    fn file_start_is_empty() {
        let span = SourceSpan::file_start("a.js");
        assert!(span.is_empty());
        assert_eq!(span.line, 1);
    }
}
