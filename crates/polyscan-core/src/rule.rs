//! Rule trait for linting a frozen semantic model.

use crate::diagnostic::{Diagnostic, Severity};
use crate::model::SemanticModel;

/// A lint rule evaluated against the whole [`SemanticModel`].
///
/// Rules only read the model; they run after composition resolution and
/// report through ordinary [`Diagnostic`]s.
///
/// # Example
///
/// ```ignore
/// use polyscan_core::{Diagnostic, ModelRule, SemanticModel, Severity};
///
/// pub struct NoEmptyBehaviors;
///
/// impl ModelRule for NoEmptyBehaviors {
///     fn name(&self) -> &'static str { "no-empty-behaviors" }
///     fn code(&self) -> &'static str { "PSL100" }
///
///     fn check(&self, model: &SemanticModel) -> Vec<Diagnostic> {
///         Vec::new()
///     }
/// }
/// ```
pub trait ModelRule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "require-member-types").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "PSL002").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for findings from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Checks the model and returns any findings.
    fn check(&self, model: &SemanticModel) -> Vec<Diagnostic>;
}

/// Type alias for boxed `ModelRule` trait objects.
pub type ModelRuleBox = Box<dyn ModelRule>;
