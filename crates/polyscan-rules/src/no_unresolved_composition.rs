//! Rule to flag composition edges that did not resolve.
//!
//! # Rationale
//!
//! An unresolved `extends`, mixin or behavior reference means the emitted
//! declarations are missing inherited members. Cycles are already reported
//! by the resolver and are not repeated here.
//!
//! # Configuration
//!
//! - `ignore`: targets that are expected to be external (default:
//!   `["HTMLElement"]`)

use polyscan_core::{
    Diagnostic, ModelRule, Resolution, SemanticModel, Severity, UnresolvedReason,
};

/// Rule code for no-unresolved-composition.
pub const CODE: &str = "PSL001";

/// Rule name for no-unresolved-composition.
pub const NAME: &str = "no-unresolved-composition";

/// Flags unresolved composition edges.
#[derive(Debug, Clone)]
pub struct NoUnresolvedComposition {
    /// Targets that are never reported.
    pub ignore: Vec<String>,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoUnresolvedComposition {
    fn default() -> Self {
        Self::new()
    }
}

impl NoUnresolvedComposition {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ignore: vec!["HTMLElement".to_string()],
            severity: Severity::Warning,
        }
    }

    /// Adds targets to ignore.
    #[must_use]
    pub fn ignore<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(targets.into_iter().map(Into::into));
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl ModelRule for NoUnresolvedComposition {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags extends, mixin and behavior references that cannot be resolved"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, model: &SemanticModel) -> Vec<Diagnostic> {
        model
            .edges()
            .iter()
            .filter_map(|edge| {
                let Resolution::Unresolved(reason) = &edge.state else {
                    return None;
                };
                if *reason == UnresolvedReason::Cyclic || self.ignore.contains(&edge.target) {
                    return None;
                }
                let subject = model.entity(edge.subject)?;
                let help = match reason {
                    UnresolvedReason::NotFound => {
                        format!("declare '{}' or add it to `ignore`", edge.target)
                    }
                    UnresolvedReason::Dynamic => {
                        "replace the expression with a static reference".to_string()
                    }
                    UnresolvedReason::WrongKind { .. } | UnresolvedReason::Cyclic => {
                        "check the documented kind of the target".to_string()
                    }
                };
                Some(
                    Diagnostic::lint(
                        CODE,
                        self.severity,
                        edge.span.clone(),
                        format!(
                            "'{}' {} '{}' is unresolved ({reason})",
                            subject.name, edge.relation, edge.target
                        ),
                    )
                    .with_help(help),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use polyscan_core::{
        ClassData, CompositionEdge, Entity, EntityId, EntityKind, LexicalTarget, Relation,
        SourceSpan,
    };

    fn model(targets: &[(&str, Resolution)]) -> SemanticModel {
        let span = SourceSpan::file_start("a.js");
        let entity = Entity::new(
            EntityId(0),
            "X",
            EntityKind::Class(ClassData::default()),
            span.clone(),
            LexicalTarget::Binding { name: "X".into() },
        );
        let edges = targets
            .iter()
            .map(|(target, state)| CompositionEdge {
                subject: EntityId(0),
                relation: Relation::Extends,
                target: (*target).to_string(),
                state: state.clone(),
                span: span.clone(),
            })
            .collect();
        SemanticModel::new(vec![entity], edges, IndexMap::new(), vec![], vec![])
    }

    #[test]
    fn reports_missing_targets() {
        let m = model(&[("Base", Resolution::Unresolved(UnresolvedReason::NotFound))]);
        let found = NoUnresolvedComposition::new().check(&m);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, CODE);
        assert!(found[0].message.contains("'X' extends 'Base'"));
    }

    #[test]
    fn skips_resolved_cyclic_and_ignored() {
        let m = model(&[
            ("A", Resolution::Resolved(EntityId(0))),
            ("B", Resolution::Unresolved(UnresolvedReason::Cyclic)),
            ("HTMLElement", Resolution::Unresolved(UnresolvedReason::NotFound)),
            ("Polymer.Element", Resolution::Unresolved(UnresolvedReason::NotFound)),
        ]);
        let rule = NoUnresolvedComposition::new().ignore(["Polymer.Element"]);
        assert!(rule.check(&m).is_empty());
    }
}
