//! Language-agnostic scan result and the scanner trait.
//!
//! `LanguageScanner` is the extension point for source languages. A scanner
//! turns one [`SourceFile`] into a [`ScannedFile`]: entities numbered from
//! zero, alias assignments still to be verified, literal dynamic imports,
//! and the diagnostics raised while scanning. Scanning one file never looks
//! at another, so files can be scanned in any order or in parallel.

use std::path::PathBuf;

use polyscan_core::{
    DynamicImport, Diagnostics, Entity, LexicalTarget, ScannerConfig, SourceFile, SourceSpan,
};

/// `Target = Source` where the right-hand side is a plain reference.
///
/// Recorded so the namespace resolver can bind `Target` as a second name
/// of whatever entity `Source` names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasBinding {
    /// Assignment target.
    pub target: LexicalTarget,
    /// Dotted path on the right-hand side.
    pub source: String,
    /// Location of the assignment.
    pub span: SourceSpan,
}

/// Result of scanning a single source file.
#[derive(Debug, Clone, Default)]
pub struct ScannedFile {
    /// File identity.
    pub file: PathBuf,
    /// Entities with file-local ids `0..n`.
    pub entities: Vec<Entity>,
    /// Alias assignments in source order.
    pub aliases: Vec<AliasBinding>,
    /// Literal `import()` calls.
    pub imports: Vec<DynamicImport>,
    /// Diagnostics raised while scanning.
    pub diagnostics: Diagnostics,
}

impl ScannedFile {
    /// Creates an empty result for `file`.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }
}

/// Errors raised before any syntax is walked.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The grammar could not be loaded into the parser.
    #[error("incompatible grammar for {language}: {message}")]
    Language {
        /// Language identifier.
        language: &'static str,
        /// Parser message.
        message: String,
    },

    /// The parser gave up without producing a tree.
    #[error("parser produced no syntax tree")]
    NoTree,
}

/// Trait for language-specific declaration scanning.
///
/// Implement this to add support for a new source language.
pub trait LanguageScanner: Send + Sync {
    /// Language identifier (e.g., `"javascript"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this scanner handles (e.g., `&[".js", ".mjs"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Whether this scanner handles `file`.
    fn handles(&self, file: &SourceFile) -> bool {
        let ext = file.extension();
        self.extensions().iter().any(|e| *e == ext)
    }

    /// Scans one file.
    ///
    /// Never fails: problems are reported through the result's diagnostics.
    fn scan(&self, file: &SourceFile, config: &ScannerConfig) -> ScannedFile;
}
