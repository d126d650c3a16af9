//! Subcommand implementations.

pub mod analyze;
pub mod emit;
pub mod init;
pub mod list_rules;
pub mod output;

use polyscan::{Config, Pipeline, PipelineBuilder};
use std::path::Path;

/// Starts a pipeline builder rooted at `path`.
///
/// A relative `[analyzer] root` in the config is taken relative to `path`.
pub fn builder(path: &Path, config: Config, exclude: Vec<String>) -> PipelineBuilder {
    let root = if config.analyzer.root.is_absolute() {
        config.analyzer.root.clone()
    } else {
        path.join(&config.analyzer.root)
    };
    let mut builder = Pipeline::builder().root(root).config(config);
    for pattern in exclude {
        builder = builder.exclude(pattern);
    }
    builder
}
