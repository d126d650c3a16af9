//! Analyze command implementation.

use anyhow::{Context, Result};
use polyscan::rules::all_rules;
use polyscan::{Config, ModelRuleBox};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the analyze command. Returns whether the run failed the
/// configured `fail_on` threshold.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<bool> {
    let config = source.load()?;
    let fail_on = config.fail_on();

    let rules = match rules_filter {
        Some(filter) => {
            let names: Vec<&str> = filter.split(',').map(str::trim).collect();
            filter_rules(&config, &names)
        }
        None => all_rules(&config),
    };

    let pipeline = super::builder(path, config, exclude)
        .rules(rules)
        .build()
        .context("Failed to build pipeline")?;

    tracing::info!(
        "Analyzing {:?} with {} rules",
        pipeline.root(),
        pipeline.rule_count()
    );

    let files = pipeline.load().context("Failed to load sources")?;
    let sources: HashMap<PathBuf, String> = files
        .iter()
        .map(|f| (f.path.clone(), f.content.clone()))
        .collect();
    let analysis = pipeline.analyze(files);

    super::output::print(&analysis.report, &sources, format)?;

    Ok(analysis.report.has_violations_at(fail_on))
}

fn filter_rules(config: &Config, names: &[&str]) -> Vec<ModelRuleBox> {
    let selected: Vec<ModelRuleBox> = all_rules(config)
        .into_iter()
        .filter(|r| names.iter().any(|n| *n == r.name() || *n == r.code()))
        .collect();
    for name in names {
        if !selected.iter().any(|r| r.name() == *name || r.code() == *name) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_name_or_code() {
        let config = Config::default();
        let rules = filter_rules(&config, &["PSL001", "no-unplaced-entity", "nope"]);
        let names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["no-unresolved-composition", "no-unplaced-entity"]);
    }
}
