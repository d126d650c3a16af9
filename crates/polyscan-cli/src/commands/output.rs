//! Shared output formatting for analysis reports.

use anyhow::Result;
use miette::{NamedSource, Report};
use polyscan::{AnalysisReport, DiagnosticReport};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(
    report: &AnalysisReport,
    sources: &HashMap<PathBuf, String>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report, sources),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &AnalysisReport, sources: &HashMap<PathBuf, String>) {
    let (errors, warnings, _) = report.count_by_severity();

    for diagnostic in &report.diagnostics {
        println!(
            "{} at {}:{}:{}",
            diagnostic.code,
            diagnostic.span.file.display(),
            diagnostic.span.line,
            diagnostic.span.column,
        );
        let rendered = Report::new(DiagnosticReport::from(diagnostic));
        let rendered = match sources.get(&diagnostic.span.file) {
            Some(content) => rendered.with_source_code(NamedSource::new(
                diagnostic.span.file.display().to_string(),
                content.clone(),
            )),
            None => rendered,
        };
        println!("{rendered:?}");
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!("{summary_color}{}\x1b[0m", report.summary());
}

fn print_json(report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &AnalysisReport) {
    for diagnostic in &report.diagnostics {
        println!("{diagnostic}");
    }
}
