//! Emit command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config_resolver::ConfigSource;

/// Runs the emit command.
///
/// With `out_dir`, writes one `.d.ts` per source; otherwise prints every
/// document to stdout under a path comment.
pub fn run(
    path: &Path,
    out_dir: Option<&Path>,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<()> {
    let config = source.load()?;
    let pipeline = super::builder(path, config, exclude)
        .build()
        .context("Failed to build pipeline")?;

    let analysis = pipeline.analyze_project().context("Analysis failed")?;
    let (errors, warnings, _) = analysis.report.count_by_severity();
    if errors + warnings > 0 {
        tracing::warn!(
            "{} error(s) and {} warning(s); run `polyscan analyze` for details",
            errors,
            warnings
        );
    }

    match out_dir {
        Some(dir) => {
            let written = pipeline
                .write_declarations(&analysis.model, dir)
                .with_context(|| format!("Failed to write declarations to {}", dir.display()))?;
            println!("Wrote {} declaration file(s) to {}", written.len(), dir.display());
        }
        None => {
            for (file, text) in pipeline.emit(&analysis.model) {
                println!("// {}", polyscan::declaration_path(&file).display());
                print!("{text}");
                println!();
            }
        }
    }
    Ok(())
}
