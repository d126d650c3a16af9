//! Rule presets.

use crate::{NoUnplacedEntity, NoUnresolvedComposition, RequireMemberTypes};
use polyscan_core::{Config, ModelRuleBox};

/// Preset configurations for polyscan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Composition and placement problems only.
    Recommended,
    /// Everything, including missing member types.
    Strict,
}

impl Preset {
    /// Returns the rules for this preset with default options.
    #[must_use]
    pub fn rules(self) -> Vec<ModelRuleBox> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => all_rules(&Config::default()),
        }
    }
}

/// Returns the recommended set of rules.
///
/// Includes:
/// - `no-unresolved-composition` (PSL001)
/// - `no-unplaced-entity` (PSL003)
#[must_use]
pub fn recommended_rules() -> Vec<ModelRuleBox> {
    vec![
        Box::new(NoUnresolvedComposition::new()),
        Box::new(NoUnplacedEntity::new()),
    ]
}

/// Returns all available rules, with options read from `config`.
#[must_use]
pub fn all_rules(config: &Config) -> Vec<ModelRuleBox> {
    let options = |name: &str| config.rules.get(name);

    let mut unresolved = NoUnresolvedComposition::new();
    if let Some(rule) = options(crate::no_unresolved_composition::NAME) {
        unresolved = unresolved.ignore(rule.get_str_array("ignore"));
    }

    let mut member_types = RequireMemberTypes::new();
    if let Some(rule) = options(crate::require_member_types::NAME) {
        member_types = member_types.include_protected(rule.get_bool("include_protected", false));
    }

    let rules: Vec<ModelRuleBox> = vec![
        Box::new(unresolved),
        Box::new(member_types),
        Box::new(NoUnplacedEntity::new()),
    ];
    tracing::debug!("Loaded {} model rules", rules.len());
    rules
}
