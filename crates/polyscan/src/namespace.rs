//! Namespace resolution.
//!
//! Places every scanned entity into a tree of dotted paths. Two sources
//! decide the path, in precedence order:
//!
//! 1. `@namespace <path>` / `@polymerBehavior <path>` / `@memberof <path>`
//! 2. the static member chain of the assignment target
//!
//! Missing intermediate namespaces are synthesized as implicit namespaces.
//! Computed targets leave the entity in place with an unknown placement.

use indexmap::IndexMap;
use polyscan_core::{
    DeclaredKind, DiagnosticKind, Diagnostics, Entity, EntityId, EntityKind, LexicalTarget,
    NamespaceData, Placement, SourceSpan,
};
use polyscan_ts::AliasBinding;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The resolved root scope and lookup over the namespace tree.
#[derive(Debug, Clone, Default)]
pub struct NamespaceTree {
    root: IndexMap<String, EntityId>,
    /// Top-level bindings per file. These shadow `root` for references
    /// made from the same file.
    locals: HashMap<(PathBuf, String), EntityId>,
}

impl NamespaceTree {
    /// Resolves a dotted path against the tree.
    #[must_use]
    pub fn lookup(&self, entities: &[Entity], path: &str) -> Option<EntityId> {
        let mut segments = path.split('.');
        let first = *self.root.get(segments.next()?)?;
        descend(entities, first, segments)
    }

    /// Resolves a dotted path as seen from `file`: the file's own
    /// top-level bindings first, then the global tree.
    #[must_use]
    pub fn resolve_from(&self, entities: &[Entity], file: &Path, path: &str) -> Option<EntityId> {
        let mut segments = path.split('.');
        let head = segments.next()?;
        let first = self
            .locals
            .get(&(file.to_path_buf(), head.to_string()))
            .or_else(|| self.root.get(head))
            .copied()?;
        descend(entities, first, segments)
    }

    /// Root-level names.
    #[must_use]
    pub fn root(&self) -> &IndexMap<String, EntityId> {
        &self.root
    }

    /// Consumes the tree, returning the root map.
    #[must_use]
    pub fn into_root(self) -> IndexMap<String, EntityId> {
        self.root
    }
}

/// Where an entity asks to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Desired {
    /// Under `parent` (root when `None`) with local name `name`.
    At { parent: Option<String>, name: String },
    /// Placement cannot be determined; carries a description of the target.
    Unknown(String),
    /// Not placed at all (classes returned by mixin factories).
    Skip,
}

/// Resolves placements for all entities.
///
/// Appends implicit namespaces to `entities` and reports redefinitions,
/// computed targets and unverified aliases to `diagnostics`.
pub fn resolve(
    entities: &mut Vec<Entity>,
    aliases: &[AliasBinding],
    diagnostics: &mut Diagnostics,
) -> NamespaceTree {
    let mut resolver = Resolver {
        entities,
        tree: NamespaceTree::default(),
        diagnostics,
    };
    resolver.run(aliases);
    resolver.tree
}

struct Resolver<'a> {
    entities: &'a mut Vec<Entity>,
    tree: NamespaceTree,
    diagnostics: &'a mut Diagnostics,
}

impl Resolver<'_> {
    fn run(&mut self, aliases: &[AliasBinding]) {
        let count = self.entities.len();

        // Namespaces first, shallowest path first, so parents exist before
        // their members and implicit namespaces are only made for paths
        // nobody declares.
        let mut namespaces: Vec<(usize, usize)> = (0..count)
            .filter(|&i| self.entities[i].as_namespace().is_some())
            .map(|i| (self.depth(i), i))
            .collect();
        namespaces.sort_unstable();
        for (_, index) in namespaces {
            self.place(index);
        }

        for index in 0..count {
            if self.entities[index].as_namespace().is_none() {
                self.place(index);
            }
        }

        for alias in aliases {
            self.bind_alias(alias);
        }

        tracing::debug!(
            roots = self.tree.root.len(),
            implicit = self.entities.len() - count,
            "namespace tree built"
        );
    }

    /// Number of enclosing namespaces the entity asks for.
    fn depth(&self, index: usize) -> usize {
        let mut depth = 0;
        let mut current = index;
        loop {
            let entity = &self.entities[current];
            let annotated = entity.annotation.as_ref().and_then(|a| {
                let full = match a.kind {
                    Some(DeclaredKind::Namespace | DeclaredKind::Behavior) => {
                        a.kind_name().filter(|p| is_dotted_path(p))
                    }
                    _ => None,
                };
                full.map(|p| p.split('.').count() - 1)
                    .or_else(|| a.memberof().map(|p| p.split('.').count()))
            });
            if let Some(d) = annotated {
                return depth + d;
            }
            match &entity.target {
                LexicalTarget::Chain { segments } => return depth + segments.len() - 1,
                LexicalTarget::Owned { owner, .. } if owner.index() < self.entities.len() => {
                    depth += 1;
                    current = owner.index();
                }
                _ => return depth,
            }
        }
    }

    /// Placement request for an entity, annotation first.
    fn desired(&self, index: usize) -> Desired {
        let entity = &self.entities[index];
        if entity.as_class().is_some_and(|c| c.inner_of.is_some()) {
            return Desired::Skip;
        }
        if let Some(annotation) = &entity.annotation {
            let full_path = match annotation.kind {
                Some(DeclaredKind::Namespace | DeclaredKind::Behavior) => annotation.kind_name(),
                _ => None,
            };
            if let Some(path) = full_path.filter(|p| is_dotted_path(p)) {
                return split_path(path);
            }
            if let Some(parent) = annotation.memberof() {
                return Desired::At {
                    parent: Some(parent.to_string()),
                    name: entity.name.clone(),
                };
            }
        }
        match &entity.target {
            LexicalTarget::Binding { name } => Desired::At {
                parent: None,
                name: name.clone(),
            },
            LexicalTarget::Chain { segments } => split_path(&segments.join(".")),
            LexicalTarget::Owned { owner, name } => {
                match self.entities.get(owner.index()).map(|o| &o.placement) {
                    Some(Placement::Root) => Desired::At {
                        parent: Some(self.entities[owner.index()].name.clone()),
                        name: name.clone(),
                    },
                    Some(Placement::Namespace(ns)) => Desired::At {
                        parent: Some(format!("{ns}.{}", self.entities[owner.index()].name)),
                        name: name.clone(),
                    },
                    Some(Placement::Unknown(p)) => Desired::Unknown(format!("{p}.{name}")),
                    _ => Desired::Unknown(name.clone()),
                }
            }
            LexicalTarget::Computed { object, key, rest } => {
                let mut target = format!("{object}[{key}]");
                for segment in rest {
                    target.push('.');
                    target.push_str(segment);
                }
                Desired::Unknown(target)
            }
            LexicalTarget::None => Desired::At {
                parent: None,
                name: entity.name.clone(),
            },
        }
    }

    fn place(&mut self, index: usize) {
        match self.desired(index) {
            Desired::Skip => {}
            Desired::Unknown(target) => {
                let entity = &mut self.entities[index];
                entity.placement = Placement::Unknown(target.clone());
                let message = format!(
                    "namespace placement of '{}' is unknown: '{target}' is not a static path",
                    entity.name
                );
                let span = entity.span.clone();
                tracing::warn!("{message}");
                self.diagnostics
                    .report(DiagnosticKind::DynamicConstruct, span, message);
            }
            Desired::At { parent, name } => {
                let span = self.entities[index].span.clone();
                let parent_id = match parent.as_deref() {
                    Some(path) => match self.ensure_namespace(path, &span) {
                        Some(id) => Some(id),
                        None => {
                            self.entities[index].placement = Placement::Unknown(path.to_string());
                            return;
                        }
                    },
                    None => None,
                };
                if name != self.entities[index].name {
                    self.entities[index].name.clone_from(&name);
                }
                let id = self.entities[index].id;
                self.insert(parent_id, &name, id, &span);
            }
        }
    }

    /// Binds `name` in the root or in namespace `parent`.
    fn insert(&mut self, parent: Option<EntityId>, name: &str, id: EntityId, span: &SourceSpan) {
        let existing = match parent {
            None => self.tree.root.get(name).copied(),
            Some(ns) => self.children(ns).and_then(|c| c.get(name).copied()),
        };
        let placement = match parent {
            None => Placement::Root,
            Some(ns) => Placement::Namespace(self.path_of(ns)),
        };

        if let Some(existing) = existing {
            if existing == id {
                return;
            }
            if parent.is_none() && self.shadows_locally(existing, id, name) {
                let file = self.entities[id.index()].file().to_path_buf();
                tracing::debug!("'{name}' in {} shadows a global binding", file.display());
                self.tree.locals.insert((file, name.to_string()), id);
                self.entities[id.index()].placement = Placement::Root;
                return;
            }
            let old = &self.entities[existing.index()];
            let new = &self.entities[id.index()];
            match (old.as_namespace(), new.as_namespace()) {
                // Reopening a declared namespace is not a redefinition.
                (Some(o), Some(_)) if !o.implicit => {
                    let path = o.path.clone();
                    let entity = &mut self.entities[id.index()];
                    entity.placement = placement;
                    if let EntityKind::Namespace(ns) = &mut entity.kind {
                        ns.path = path;
                    }
                    return;
                }
                // An explicit declaration takes over an implicit namespace.
                (Some(_), Some(_)) => {
                    self.take_over(existing, id, parent, name, placement);
                    return;
                }
                _ => {
                    let where_ = match parent {
                        None => "the global scope".to_string(),
                        Some(ns) => format!("namespace '{}'", self.path_of(ns)),
                    };
                    let message = format!(
                        "'{name}' is already defined in {where_} (first defined at {})",
                        old.span
                    );
                    let target = placement_path(&placement, name);
                    self.entities[id.index()].placement = Placement::Unknown(target);
                    self.diagnostics
                        .report(DiagnosticKind::Redefinition, span.clone(), message);
                    return;
                }
            }
        }

        match parent {
            None => {
                self.tree.root.insert(name.to_string(), id);
                let entity = &self.entities[id.index()];
                if matches!(entity.target, LexicalTarget::Binding { .. }) {
                    self.tree
                        .locals
                        .entry((entity.file().to_path_buf(), name.to_string()))
                        .or_insert(id);
                }
            }
            Some(ns) => {
                if let EntityKind::Namespace(data) = &mut self.entities[ns.index()].kind {
                    data.children.insert(name.to_string(), id);
                }
            }
        }
        let path = placement_path(&placement, name);
        let entity = &mut self.entities[id.index()];
        entity.placement = placement;
        if let EntityKind::Namespace(data) = &mut entity.kind {
            data.path = path;
            data.parent = parent;
        }
    }

    /// A top-level binding may reuse a global name first bound in another
    /// file, once per file.
    fn shadows_locally(&self, existing: EntityId, id: EntityId, name: &str) -> bool {
        let new = &self.entities[id.index()];
        matches!(new.target, LexicalTarget::Binding { .. })
            && self.entities[existing.index()].file() != new.file()
            && !self
                .tree
                .locals
                .contains_key(&(new.file().to_path_buf(), name.to_string()))
    }

    fn take_over(
        &mut self,
        implicit: EntityId,
        explicit: EntityId,
        parent: Option<EntityId>,
        name: &str,
        placement: Placement,
    ) {
        let (path, children) = match &mut self.entities[implicit.index()].kind {
            EntityKind::Namespace(data) => (data.path.clone(), std::mem::take(&mut data.children)),
            _ => return,
        };
        for child in children.values() {
            if let Some(EntityKind::Namespace(data)) =
                self.entities.get_mut(child.index()).map(|e| &mut e.kind)
            {
                data.parent = Some(explicit);
            }
        }
        self.entities[implicit.index()].placement = Placement::Unknown(path.clone());
        match parent {
            None => {
                self.tree.root.insert(name.to_string(), explicit);
            }
            Some(ns) => {
                if let EntityKind::Namespace(data) = &mut self.entities[ns.index()].kind {
                    data.children.insert(name.to_string(), explicit);
                }
            }
        }
        let entity = &mut self.entities[explicit.index()];
        entity.placement = placement;
        if let EntityKind::Namespace(data) = &mut entity.kind {
            data.path = path;
            data.parent = parent;
            data.children = children;
        }
    }

    /// Finds or synthesizes the namespace at `path`.
    ///
    /// Returns `None` when a segment names something that is not a namespace.
    fn ensure_namespace(&mut self, path: &str, span: &SourceSpan) -> Option<EntityId> {
        let mut parent: Option<EntityId> = None;
        let mut prefix = String::new();
        for segment in path.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);

            let existing = match parent {
                None => self.tree.root.get(segment).copied(),
                Some(ns) => self.children(ns).and_then(|c| c.get(segment).copied()),
            };
            let id = match existing {
                Some(id) if self.entities[id.index()].as_namespace().is_some() => id,
                Some(id) => {
                    let message = format!(
                        "'{prefix}' is a {}, not a namespace; cannot place members under '{path}'",
                        self.entities[id.index()].kind.label()
                    );
                    self.diagnostics
                        .report(DiagnosticKind::UnresolvedReference, span.clone(), message);
                    return None;
                }
                None => {
                    let id = EntityId(id_of(self.entities.len()));
                    tracing::debug!("synthesizing implicit namespace {prefix}");
                    self.entities.push(Entity::new(
                        id,
                        segment,
                        EntityKind::Namespace(NamespaceData {
                            path: prefix.clone(),
                            parent,
                            children: IndexMap::new(),
                            implicit: true,
                        }),
                        span.clone(),
                        LexicalTarget::None,
                    ));
                    self.insert(parent, segment, id, span);
                    id
                }
            };
            parent = Some(id);
        }
        parent
    }

    fn bind_alias(&mut self, alias: &AliasBinding) {
        let LexicalTarget::Chain { segments } = &alias.target else {
            return;
        };
        let Some((name, parents)) = segments.split_last() else {
            return;
        };
        if parents.is_empty() {
            return;
        }
        let target_path = segments.join(".");

        let source = self
            .entities
            .iter()
            .find(|e| {
                e.file() == alias.span.file
                    && matches!(&e.target, LexicalTarget::Binding { name: n } if *n == alias.source)
            })
            .map(|e| e.id)
            .or_else(|| self.tree.lookup(self.entities.as_slice(), &alias.source))
            .or_else(|| self.declare_alias_source(alias, &target_path));
        let Some(source) = source else {
            return;
        };
        if self.tree.lookup(self.entities.as_slice(), &target_path) == Some(source) {
            return;
        }

        let Some(parent) = self.ensure_namespace(&parents.join("."), &alias.span) else {
            return;
        };
        match self.children(parent).and_then(|c| c.get(name.as_str()).copied()) {
            Some(existing) => {
                let message = format!(
                    "alias '{target_path}' conflicts with '{}' already defined at {}",
                    self.entities[existing.index()].name,
                    self.entities[existing.index()].span
                );
                self.diagnostics
                    .report(DiagnosticKind::Redefinition, alias.span.clone(), message);
                return;
            }
            None => {
                if let EntityKind::Namespace(data) = &mut self.entities[parent.index()].kind {
                    data.children.insert(name.clone(), source);
                }
            }
        }

        let parent_path = self.path_of(parent);
        let entity = &mut self.entities[source.index()];
        tracing::debug!("'{target_path}' is an alias of '{}'", entity.name);
        if !entity.aliases.contains(&target_path) {
            entity.aliases.push(target_path);
        }
        // A root binding republished under its own name moves into the
        // namespace; the root name stays bound.
        if entity.placement == Placement::Root
            && entity.name == *name
            && entity.as_namespace().is_none()
        {
            entity.placement = Placement::Namespace(parent_path);
        }
    }

    /// Declares the unmatched source of an alias as a namespace so that
    /// both names resolve. The alias stays reported as unverified.
    fn declare_alias_source(&mut self, alias: &AliasBinding, target_path: &str) -> Option<EntityId> {
        self.diagnostics.report(
            DiagnosticKind::UnverifiedAlias,
            alias.span.clone(),
            format!(
                "cannot verify alias '{target_path}' = '{}': no declaration named '{}'",
                alias.source, alias.source
            ),
        );
        if !is_dotted_path(&alias.source) {
            return None;
        }
        let Desired::At { parent, name } = split_path(&alias.source) else {
            return None;
        };
        let (parent_id, target) = match parent.as_deref() {
            Some(path) => (
                Some(self.ensure_namespace(path, &alias.span)?),
                LexicalTarget::Chain {
                    segments: alias.source.split('.').map(String::from).collect(),
                },
            ),
            None => (None, LexicalTarget::Binding { name: name.clone() }),
        };
        let id = EntityId(id_of(self.entities.len()));
        tracing::debug!("declaring alias source '{}' as a namespace", alias.source);
        self.entities.push(Entity::new(
            id,
            name.as_str(),
            EntityKind::Namespace(NamespaceData::default()),
            alias.span.clone(),
            target,
        ));
        self.insert(parent_id, &name, id, &alias.span);
        Some(id)
    }

    fn children(&self, ns: EntityId) -> Option<&IndexMap<String, EntityId>> {
        self.entities
            .get(ns.index())
            .and_then(Entity::as_namespace)
            .map(|n| &n.children)
    }

    fn path_of(&self, ns: EntityId) -> String {
        self.entities
            .get(ns.index())
            .and_then(Entity::as_namespace)
            .map(|n| n.path.clone())
            .unwrap_or_default()
    }
}

fn descend<'p>(
    entities: &[Entity],
    mut current: EntityId,
    segments: impl Iterator<Item = &'p str>,
) -> Option<EntityId> {
    for segment in segments {
        current = *entities
            .get(current.index())?
            .as_namespace()?
            .children
            .get(segment)?;
    }
    Some(current)
}

fn id_of(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn is_dotted_path(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|s| {
            !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

fn split_path(path: &str) -> Desired {
    match path.rsplit_once('.') {
        Some((parent, name)) => Desired::At {
            parent: Some(parent.to_string()),
            name: name.to_string(),
        },
        None => Desired::At {
            parent: None,
            name: path.to_string(),
        },
    }
}

fn placement_path(placement: &Placement, name: &str) -> String {
    match placement {
        Placement::Namespace(ns) => format!("{ns}.{name}"),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyscan_core::{Annotation, ClassData, EntityKind};

    fn span() -> SourceSpan {
        SourceSpan::file_start("a.js")
    }

    fn class(id: u32, name: &str, target: LexicalTarget) -> Entity {
        Entity::new(
            EntityId(id),
            name,
            EntityKind::Class(ClassData::default()),
            span(),
            target,
        )
    }

    fn chain(path: &str) -> LexicalTarget {
        LexicalTarget::Chain {
            segments: path.split('.').map(String::from).collect(),
        }
    }

    fn annotated(mut entity: Entity, doc: &str) -> Entity {
        entity.annotation = Annotation::parse(doc, &span(), &mut Diagnostics::new());
        entity
    }

    #[test]
    fn chains_synthesize_implicit_namespaces() {
        let mut entities = vec![class(0, "C", chain("A.B.C"))];
        let mut diags = Diagnostics::new();
        let tree = resolve(&mut entities, &[], &mut diags);

        assert_eq!(tree.lookup(&entities, "A.B.C"), Some(EntityId(0)));
        assert_eq!(entities[0].placement, Placement::Namespace("A.B".into()));
        let b = &entities[tree.lookup(&entities, "A.B").unwrap().index()];
        assert!(b.as_namespace().unwrap().implicit);
        assert!(diags.is_empty());
    }

    #[test]
    fn memberof_beats_lexical_chain() {
        let mut entities = vec![annotated(
            class(0, "C", chain("Other.C")),
            "/** @memberof A.B */",
        )];
        let mut diags = Diagnostics::new();
        let tree = resolve(&mut entities, &[], &mut diags);
        assert_eq!(tree.lookup(&entities, "A.B.C"), Some(EntityId(0)));
        assert_eq!(tree.lookup(&entities, "Other.C"), None);
    }

    #[test]
    fn explicit_namespace_declared_after_member_is_reused() {
        let mut ns = Entity::new(
            EntityId(1),
            "B",
            EntityKind::Namespace(NamespaceData::default()),
            span(),
            chain("A.B"),
        );
        ns = annotated(ns, "/** @namespace */");
        let mut entities = vec![class(0, "C", chain("A.B.C")), ns];
        let mut diags = Diagnostics::new();
        let tree = resolve(&mut entities, &[], &mut diags);

        assert_eq!(tree.lookup(&entities, "A.B"), Some(EntityId(1)));
        assert_eq!(tree.lookup(&entities, "A.B.C"), Some(EntityId(0)));
        assert!(!entities[1].as_namespace().unwrap().implicit);
    }

    #[test]
    fn redefinition_keeps_first() {
        let mut entities = vec![class(0, "Foo", chain("A.Foo")), class(1, "Foo", chain("A.Foo"))];
        let mut diags = Diagnostics::new();
        let tree = resolve(&mut entities, &[], &mut diags);
        assert_eq!(tree.lookup(&entities, "A.Foo"), Some(EntityId(0)));
        assert!(matches!(entities[1].placement, Placement::Unknown(_)));
        assert_eq!(diags.iter().next().unwrap().kind, DiagnosticKind::Redefinition);
    }

    #[test]
    fn computed_target_is_unknown() {
        let mut entities = vec![class(
            0,
            "k",
            LexicalTarget::Computed {
                object: "NS".into(),
                key: "k".into(),
                rest: vec![],
            },
        )];
        let mut diags = Diagnostics::new();
        resolve(&mut entities, &[], &mut diags);
        assert_eq!(entities[0].placement, Placement::Unknown("NS[k]".into()));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().kind, DiagnosticKind::DynamicConstruct);
    }

    #[test]
    fn alias_binds_second_name() {
        let mut entities = vec![class(
            0,
            "Foo",
            LexicalTarget::Binding { name: "Foo".into() },
        )];
        let aliases = vec![
            AliasBinding {
                target: chain("Polymer.Foo"),
                source: "Foo".into(),
                span: span(),
            },
            AliasBinding {
                target: chain("Polymer.Bar"),
                source: "Missing".into(),
                span: span(),
            },
        ];
        let mut diags = Diagnostics::new();
        let tree = resolve(&mut entities, &aliases, &mut diags);

        assert_eq!(tree.lookup(&entities, "Foo"), Some(EntityId(0)));
        assert_eq!(tree.lookup(&entities, "Polymer.Foo"), Some(EntityId(0)));
        assert_eq!(entities[0].placement, Placement::Namespace("Polymer".into()));
        assert_eq!(entities[0].aliases, vec!["Polymer.Foo".to_string()]);

        // The unmatched source still gets a root-level entity.
        let missing = tree.lookup(&entities, "Missing").expect("declared at root");
        assert_eq!(entities[missing.index()].placement, Placement::Root);
        assert!(entities[missing.index()].as_namespace().is_some());
        assert_eq!(tree.lookup(&entities, "Polymer.Bar"), Some(missing));
        assert_eq!(entities[missing.index()].aliases, vec!["Polymer.Bar".to_string()]);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().kind, DiagnosticKind::UnverifiedAlias);
    }

    #[test]
    fn file_bindings_shadow_other_files() {
        let mut a = class(0, "Base", LexicalTarget::Binding { name: "Base".into() });
        a.span = SourceSpan::file_start("a.js");
        let mut b = class(1, "Base", LexicalTarget::Binding { name: "Base".into() });
        b.span = SourceSpan::file_start("b.js");
        let mut entities = vec![a, b];
        let mut diags = Diagnostics::new();
        let tree = resolve(&mut entities, &[], &mut diags);

        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(entities[1].placement, Placement::Root);
        assert_eq!(tree.lookup(&entities, "Base"), Some(EntityId(0)));
        assert_eq!(
            tree.resolve_from(&entities, Path::new("b.js"), "Base"),
            Some(EntityId(1))
        );
        assert_eq!(
            tree.resolve_from(&entities, Path::new("c.js"), "Base"),
            Some(EntityId(0))
        );
    }

    #[test]
    fn inner_classes_are_not_placed() {
        let mut inner = class(0, "Inner", LexicalTarget::None);
        inner.kind = EntityKind::Class(ClassData {
            inner_of: Some(EntityId(1)),
            ..ClassData::default()
        });
        let mut entities = vec![inner];
        let tree = resolve(&mut entities, &[], &mut Diagnostics::new());
        assert!(tree.root().is_empty());
        assert_eq!(entities[0].placement, Placement::Pending);
    }
}
