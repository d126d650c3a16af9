//! Rule to require documented types on public members.
//!
//! # Rationale
//!
//! Untyped members are emitted as `any`, which silently weakens the
//! declarations downstream clients compile against.
//!
//! # Detected Patterns
//!
//! - properties and accessors with no `@type` and no inferable literal
//! - method parameters with no `@param {T}`
//!
//! # Configuration
//!
//! - `include_protected`: also check protected members (default: false)

use polyscan_core::{
    Diagnostic, Entity, EntityKind, Member, MemberKind, ModelRule, Privacy, SemanticModel,
    Severity,
};

/// Rule code for require-member-types.
pub const CODE: &str = "PSL002";

/// Rule name for require-member-types.
pub const NAME: &str = "require-member-types";

/// Requires types on public members of public entities.
#[derive(Debug, Clone)]
pub struct RequireMemberTypes {
    /// Check protected members too.
    pub include_protected: bool,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for RequireMemberTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl RequireMemberTypes {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            include_protected: false,
            severity: Severity::Info,
        }
    }

    /// Sets whether protected members are checked.
    #[must_use]
    pub fn include_protected(mut self, include: bool) -> Self {
        self.include_protected = include;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn checked(&self, member: &Member) -> bool {
        match member.privacy {
            Privacy::Public => true,
            Privacy::Protected => self.include_protected,
            Privacy::Private => false,
        }
    }

    fn check_member(&self, owner: &Entity, member: &Member, out: &mut Vec<Diagnostic>) {
        match member.kind {
            MemberKind::Property | MemberKind::Getter => {
                if member.declared_type.is_none() {
                    out.push(Diagnostic::lint(
                        CODE,
                        self.severity,
                        member.span.clone(),
                        format!("'{}.{}' has no declared type", owner.name, member.name),
                    ).with_help("add a `@type {T}` annotation"));
                }
            }
            MemberKind::Method | MemberKind::Setter => {
                for param in member.signature.params.iter().filter(|p| p.ty.is_none()) {
                    out.push(Diagnostic::lint(
                        CODE,
                        self.severity,
                        member.span.clone(),
                        format!(
                            "parameter '{}' of '{}.{}' has no declared type",
                            param.name, owner.name, member.name
                        ),
                    ).with_help(format!("add `@param {{T}} {}`", param.name)));
                }
            }
        }
    }
}

impl ModelRule for RequireMemberTypes {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires declared types on public properties and method parameters"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, model: &SemanticModel) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for entity in model.entities() {
            if !entity.is_public() || entity.canonical_path().is_none() {
                continue;
            }
            let members: &[Member] = match &entity.kind {
                EntityKind::Class(_) | EntityKind::Behavior(_) => &entity.members,
                EntityKind::MixinFactory(mixin) => mixin
                    .inner
                    .and_then(|id| model.entity(id))
                    .map_or(&[], |inner| inner.members.as_slice()),
                EntityKind::Namespace(_) | EntityKind::FreeFunction(_) => continue,
            };
            for member in members.iter().filter(|m| self.checked(m)) {
                self.check_member(entity, member, &mut out);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use polyscan_core::{
        BehaviorData, EntityId, LexicalTarget, Param, Placement, Signature, SourceSpan,
    };

    fn member(name: &str, kind: MemberKind, ty: Option<&str>) -> Member {
        Member {
            name: name.into(),
            kind,
            is_static: false,
            signature: Signature::default(),
            declared_type: ty.map(String::from),
            privacy: Privacy::from_name(name),
            description: None,
            span: SourceSpan::file_start("a.js"),
        }
    }

    fn model(members: Vec<Member>) -> SemanticModel {
        let mut e = Entity::new(
            EntityId(0),
            "B",
            EntityKind::Behavior(BehaviorData::Object),
            SourceSpan::file_start("a.js"),
            LexicalTarget::Binding { name: "B".into() },
        );
        e.placement = Placement::Root;
        e.members = members;
        SemanticModel::new(vec![e], vec![], IndexMap::new(), vec![], vec![])
    }

    #[test]
    fn flags_untyped_properties_and_params() {
        let mut method = member("go", MemberKind::Method, None);
        let mut typed = Param::new("a");
        typed.ty = Some("string".into());
        method.signature.params = vec![typed, Param::new("b")];
        let m = model(vec![
            member("typed", MemberKind::Property, Some("number")),
            member("loose", MemberKind::Property, None),
            method,
        ]);
        let found = RequireMemberTypes::new().check(&m);
        assert_eq!(found.len(), 2);
        assert!(found[0].message.contains("'B.loose'"));
        assert!(found[1].message.contains("parameter 'b'"));
    }

    #[test]
    fn protected_members_are_opt_in() {
        let m = model(vec![member("_internal", MemberKind::Property, None)]);
        assert!(RequireMemberTypes::new().check(&m).is_empty());
        assert_eq!(
            RequireMemberTypes::new()
                .include_protected(true)
                .check(&m)
                .len(),
            1
        );
    }
}
