//! Rule to flag entities whose namespace placement is unknown.
//!
//! # Rationale
//!
//! An entity assigned through a computed key or a redefinition exists in
//! the model but is never emitted, so its API silently disappears from the
//! declarations.

use polyscan_core::{Diagnostic, ModelRule, Placement, SemanticModel, Severity};

/// Rule code for no-unplaced-entity.
pub const CODE: &str = "PSL003";

/// Rule name for no-unplaced-entity.
pub const NAME: &str = "no-unplaced-entity";

/// Flags entities that were scanned but could not be placed.
#[derive(Debug, Clone)]
pub struct NoUnplacedEntity {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoUnplacedEntity {
    fn default() -> Self {
        Self::new()
    }
}

impl NoUnplacedEntity {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl ModelRule for NoUnplacedEntity {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags entities that will not be emitted because their placement is unknown"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, model: &SemanticModel) -> Vec<Diagnostic> {
        model
            .entities()
            .iter()
            .filter(|e| e.as_class().map_or(true, |c| c.inner_of.is_none()))
            .filter_map(|e| {
                let Placement::Unknown(written) = &e.placement else {
                    return None;
                };
                Some(
                    Diagnostic::lint(
                        CODE,
                        self.severity,
                        e.span.clone(),
                        format!(
                            "{} '{}' assigned to '{written}' will not be emitted",
                            e.kind.label(),
                            e.name
                        ),
                    )
                    .with_help("assign it to a static path or add `@memberof`"),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use polyscan_core::{ClassData, Entity, EntityId, EntityKind, LexicalTarget, SourceSpan};

    fn class(id: u32, placement: Placement, inner_of: Option<EntityId>) -> Entity {
        let mut e = Entity::new(
            EntityId(id),
            format!("C{id}"),
            EntityKind::Class(ClassData {
                inner_of,
                ..ClassData::default()
            }),
            SourceSpan::file_start("a.js"),
            LexicalTarget::None,
        );
        e.placement = placement;
        e
    }

    #[test]
    fn reports_unknown_placements_only() {
        let model = SemanticModel::new(
            vec![
                class(0, Placement::Root, None),
                class(1, Placement::Unknown("NS[key]".into()), None),
                class(2, Placement::Pending, Some(EntityId(0))),
            ],
            vec![],
            IndexMap::new(),
            vec![],
            vec![],
        );
        let found = NoUnplacedEntity::new().check(&model);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("class 'C1' assigned to 'NS[key]'"));
    }
}
