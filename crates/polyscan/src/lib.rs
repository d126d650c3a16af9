//! # polyscan
//!
//! Static analyzer for Polymer-style JavaScript component libraries.
//!
//! This is the main facade crate: it drives the scanner from
//! `polyscan-ts`, resolves namespaces and composition into a frozen
//! [`SemanticModel`], runs model rules and emits `.d.ts` declarations.
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use polyscan::{Config, Pipeline, SourceFile};
//!
//! let pipeline = Pipeline::builder()
//!     .config(Config::default())
//!     .rules(polyscan::rules::all_rules(&Config::default()))
//!     .build()?;
//!
//! let analysis = pipeline.analyze(vec![SourceFile::new(
//!     "my-mixin.js",
//!     "/** @mixinFunction */\nconst M = (base) => class extends base { go() {} };",
//! )]);
//!
//! for (file, text) in pipeline.emit(&analysis.model) {
//!     println!("// {}\n{text}", file.display());
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. every file is scanned on its own into entities, aliases and imports
//! 2. at the barrier ids are rebased into one space
//! 3. [`namespace::resolve`] places entities and binds aliases
//! 4. [`composition::resolve`] records edges and linearizes members
//! 5. the model is frozen; rules read it and the emitter renders it

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use polyscan_core::*;

/// Built-in model rules.
pub mod rules {
    pub use polyscan_rules::*;
}

pub mod composition;
pub mod emitter;
pub mod namespace;
mod pipeline;

pub use emitter::{ts_type, Emitter};
pub use pipeline::{declaration_path, Analysis, Pipeline, PipelineBuilder, PipelineError};
pub use polyscan_ts::{JavaScriptScanner, LanguageScanner, ScannedFile};
