//! Diagnostics accumulated by the analysis pipeline.
//!
//! Nothing in the core throws: every recoverable problem becomes a
//! [`Diagnostic`] and the pipeline keeps going with reduced precision.

use miette::SourceSpan as MietteSpan;
use serde::{Deserialize, Serialize};

use crate::span::SourceSpan;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message.
    Info,
    /// Analysis precision was reduced.
    Warning,
    /// The input contradicts itself or cannot be modelled faithfully.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Malformed documentation tag; the tag was dropped.
    AnnotationSyntax,
    /// Annotation and syntax (or two annotations) disagree on entity kind.
    KindConflict,
    /// A composition or placement reference could not be located.
    UnresolvedReference,
    /// Computed member, non-literal import specifier or non-static element.
    DynamicConstruct,
    /// Composition chain revisits an entity already on the chain.
    CompositionCycle,
    /// A sibling with the same name already exists in the namespace.
    Redefinition,
    /// An alias assignment could not be matched to a declaration.
    UnverifiedAlias,
    /// A mixin function returns more than one candidate class.
    AmbiguousMixin,
    /// Documented and syntactic composition lists disagree.
    CompositionDiscrepancy,
    /// The source text could not be parsed.
    ParseFailure,
    /// Reported by a model rule.
    Lint,
}

impl DiagnosticKind {
    /// Stable diagnostic code for this category.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::AnnotationSyntax => "PS001",
            Self::KindConflict => "PS002",
            Self::UnresolvedReference => "PS003",
            Self::DynamicConstruct => "PS004",
            Self::CompositionCycle => "PS005",
            Self::Redefinition => "PS006",
            Self::UnverifiedAlias => "PS007",
            Self::AmbiguousMixin => "PS008",
            Self::CompositionDiscrepancy => "PS009",
            Self::ParseFailure => "PS010",
            Self::Lint => "PSL000",
        }
    }

    /// Severity used when a diagnostic of this category is created.
    #[must_use]
    pub fn default_severity(self) -> Severity {
        match self {
            Self::AnnotationSyntax | Self::CompositionDiscrepancy => Severity::Info,
            Self::KindConflict
            | Self::UnresolvedReference
            | Self::DynamicConstruct
            | Self::Redefinition
            | Self::UnverifiedAlias
            | Self::AmbiguousMixin
            | Self::Lint => Severity::Warning,
            Self::CompositionCycle | Self::ParseFailure => Severity::Error,
        }
    }
}

/// A single finding with its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic code (e.g. "PS003", or a rule code for lint findings).
    pub code: String,
    /// Category.
    pub kind: DiagnosticKind,
    /// Severity.
    pub severity: Severity,
    /// Primary location.
    pub span: SourceSpan,
    /// Human-readable message.
    pub message: String,
    /// Optional hint for fixing the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with the category's default code and severity.
    #[must_use]
    pub fn new(kind: DiagnosticKind, span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            code: kind.code().to_string(),
            kind,
            severity: kind.default_severity(),
            span,
            message: message.into(),
            help: None,
        }
    }

    /// Creates a lint finding reported by a model rule.
    #[must_use]
    pub fn lint(
        code: impl Into<String>,
        severity: Severity,
        span: SourceSpan,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            kind: DiagnosticKind::Lint,
            severity,
            span,
            message: message.into(),
            help: None,
        }
    }

    /// Overrides the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Adds a help line.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Formats the diagnostic for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        let mut output = format!("{} at {}\n", self.code, self.span);
        output.push_str(&format!("  {}: {}\n", self.severity, self.message));
        if let Some(help) = &self.help {
            output.push_str(&format!("  = help: {help}\n"));
        }
        output
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.span, self.severity, self.code, self.message
        )
    }
}

/// Append-only diagnostic sink handed to each pipeline phase.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(code = %diagnostic.code, "{}", diagnostic.message);
        self.items.push(diagnostic);
    }

    /// Shorthand for [`Diagnostic::new`] followed by [`Self::push`].
    pub fn report(&mut self, kind: DiagnosticKind, span: SourceSpan, message: impl Into<String>) {
        self.push(Diagnostic::new(kind, span, message));
    }

    /// Moves all diagnostics out of `other`.
    pub fn append(&mut self, other: &mut Self) {
        self.items.append(&mut other.items);
    }

    /// Number of diagnostics recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the recorded diagnostics.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Consumes the sink.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        for d in iter {
            self.push(d);
        }
    }
}

/// Converts a [`Diagnostic`] into a miette diagnostic for rich display.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("[{code}] {message}")]
pub struct DiagnosticReport {
    code: String,
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: MietteSpan,
    label_message: String,
    severity_level: Severity,
}

impl DiagnosticReport {
    /// Severity of the wrapped diagnostic.
    #[must_use]
    pub fn severity_level(&self) -> Severity {
        self.severity_level
    }
}

impl From<&Diagnostic> for DiagnosticReport {
    fn from(d: &Diagnostic) -> Self {
        Self {
            code: d.code.clone(),
            message: d.message.clone(),
            help: d.help.clone(),
            span: MietteSpan::from((d.span.start, d.span.len())),
            label_message: d.severity.to_string(),
            severity_level: d.severity,
        }
    }
}

/// Aggregated diagnostics for a whole analysis run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// All diagnostics, sorted by location.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of files analyzed.
    pub files_analyzed: usize,
}

impl AnalysisReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Checks if any diagnostic meets or exceeds the given severity.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= severity)
    }

    /// Returns diagnostics filtered by code.
    #[must_use]
    pub fn by_code(&self, code: &str) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.code == code).collect()
    }

    /// Returns diagnostics filtered by category.
    #[must_use]
    pub fn by_kind(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.kind == kind).collect()
    }

    /// Counts diagnostics by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |s: Severity| self.diagnostics.iter().filter(|d| d.severity == s).count();
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Sorts diagnostics by file, then position, then code.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.span
                .file
                .cmp(&b.span.file)
                .then(a.span.start.cmp(&b.span.start))
                .then(a.code.cmp(&b.code))
        });
    }

    /// Formats a one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let (errors, warnings, infos) = self.count_by_severity();
        format!(
            "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)",
            self.files_analyzed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(kind: DiagnosticKind) -> Diagnostic {
        Diagnostic::new(kind, SourceSpan::new("a.js", 4, 9, 1, 5), "something")
    }

    #[test]
    fn kind_supplies_code_and_severity() {
        let d = make(DiagnosticKind::CompositionCycle);
        assert_eq!(d.code, "PS005");
        assert_eq!(d.severity, Severity::Error);

        let d = make(DiagnosticKind::AnnotationSyntax);
        assert_eq!(d.severity, Severity::Info);
    }

    #[test]
    fn display_is_compact() {
        let d = make(DiagnosticKind::UnresolvedReference);
        assert_eq!(d.to_string(), "a.js:1:5: warning [PS003] something");
    }

    #[test]
    fn format_includes_help() {
        let d = make(DiagnosticKind::DynamicConstruct).with_help("use a literal key");
        assert!(d.format().contains("= help: use a literal key"));
    }

    #[test]
    fn severity_parses_from_config_strings() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("Error".parse::<Severity>(), Ok(Severity::Error));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn report_threshold() {
        let mut report = AnalysisReport::new();
        report.diagnostics.push(make(DiagnosticKind::UnresolvedReference));
        assert!(!report.has_errors());
        assert!(report.has_violations_at(Severity::Warning));
        assert_eq!(report.count_by_severity(), (0, 1, 0));
        assert_eq!(report.by_code("PS003").len(), 1);
    }

    #[test]
    fn miette_report_carries_span() {
        let d = make(DiagnosticKind::KindConflict);
        let report = DiagnosticReport::from(&d);
        assert_eq!(report.severity_level(), Severity::Warning);
        assert!(report.to_string().contains("[PS002]"));
    }
}
