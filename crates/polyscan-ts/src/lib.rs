//! # polyscan-ts
//!
//! Tree-sitter based declaration scanner for Polymer-style JavaScript.
//!
//! Each file is scanned on its own into a [`ScannedFile`]: entities with
//! file-local ids, alias assignments and dynamic imports. Cross-file work
//! (namespace placement, composition) happens later in `polyscan`.
//!
//! - [`LanguageScanner`] trait for pluggable source languages
//! - [`JavaScriptScanner`] for `.js`/`.mjs` sources

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod javascript;
mod members;
pub mod scanner;
mod syntax;

pub use javascript::JavaScriptScanner;
pub use scanner::{AliasBinding, LanguageScanner, ScanError, ScannedFile};
