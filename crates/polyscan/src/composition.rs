//! Composition resolution.
//!
//! Turns heritage expressions, `@mixes`/`@extends` documentation, legacy
//! `behaviors` lists and composite behaviors into [`CompositionEdge`]s,
//! then linearizes members along those edges.
//!
//! Edges of one subject are recorded in a fixed order: extends, then
//! applied mixins outer-to-inner, then included behaviors. Members merge
//! from the base outward: base, then mixins innermost first, then
//! behaviors in list order, then the entity's own members. A later
//! definition of the same name replaces an earlier one in place.
//!
//! The dependency walk is an explicit-stack DFS. An edge that points back
//! onto the current chain becomes `Unresolved(Cyclic)` and each distinct
//! cycle is reported once.

use std::collections::HashSet;

use indexmap::IndexMap;
use polyscan_core::{
    BehaviorData, BehaviorRef, CompositionEdge, DiagnosticKind, Diagnostics, Entity, EntityId,
    EntityKind, HeritageExpr, Member, Relation, Resolution, SourceSpan, UnresolvedReason,
};

use crate::namespace::NamespaceTree;

/// One step of a heritage chain.
#[derive(Debug, Clone)]
enum Layer {
    Mixin(usize),
    Behaviors(Vec<usize>),
}

/// Edge indices for one subject, grouped by how they contribute members.
#[derive(Debug, Clone, Default)]
struct Plan {
    base: Option<usize>,
    /// Outer-to-inner.
    layers: Vec<Layer>,
    behaviors: Vec<usize>,
}

impl Plan {
    fn edge_indices(&self) -> Vec<usize> {
        let mut all: Vec<usize> = self.base.into_iter().collect();
        for layer in &self.layers {
            match layer {
                Layer::Mixin(e) => all.push(*e),
                Layer::Behaviors(list) => all.extend(list),
            }
        }
        all.extend(&self.behaviors);
        all
    }
}

/// Heritage unwrapped into its parts.
#[derive(Debug, Default)]
struct Unwrapped {
    base: Option<(String, SourceSpan, bool)>,
    layers: Vec<UnwrappedLayer>,
}

#[derive(Debug)]
enum UnwrappedLayer {
    Mixin(String, SourceSpan),
    Behaviors(Vec<BehaviorRef>),
}

/// Unwraps nested calls from the outside in; the innermost argument is the base.
fn unwrap(heritage: &HeritageExpr) -> Unwrapped {
    let mut out = Unwrapped::default();
    let mut current = heritage;
    loop {
        match current {
            HeritageExpr::MixinCall {
                callee,
                argument,
                span,
            } => {
                out.layers
                    .push(UnwrappedLayer::Mixin(callee.clone(), span.clone()));
                current = argument;
            }
            HeritageExpr::BehaviorMix {
                behaviors, base, ..
            } => {
                out.layers.push(UnwrappedLayer::Behaviors(behaviors.clone()));
                current = base;
            }
            HeritageExpr::Reference { path, span } => {
                out.base = Some((path.clone(), span.clone(), false));
                break;
            }
            HeritageExpr::Dynamic { text, span } => {
                out.base = Some((text.clone(), span.clone(), true));
                break;
            }
            HeritageExpr::Parameter { .. } => break,
        }
    }
    out
}

/// Flattens behavior references depth-first, keeping first occurrences.
///
/// Object behaviors are kept as-is; composite behaviors contribute their
/// own (already flattened) lists.
#[must_use]
pub fn flatten(entities: &[Entity], targets: &[EntityId]) -> Vec<EntityId> {
    let mut out: Vec<EntityId> = Vec::new();
    for target in targets {
        let Some(entity) = entities.get(target.index()) else {
            continue;
        };
        let expanded: Vec<EntityId> = match &entity.kind {
            EntityKind::Behavior(BehaviorData::Composite { .. }) => {
                entity.flattened_behaviors.clone()
            }
            _ => vec![*target],
        };
        for id in expanded {
            if !out.contains(&id) {
                out.push(id);
            }
        }
    }
    out
}

/// Merges member lists; later lists replace earlier members of the same
/// slot. Getter and setter of one name travel together.
#[derive(Debug, Default)]
struct Slots {
    slots: IndexMap<(bool, String), Vec<Member>>,
}

impl Slots {
    fn merge(&mut self, members: &[Member]) {
        let mut grouped: IndexMap<(bool, String), Vec<Member>> = IndexMap::new();
        for member in members {
            let (is_static, name) = member.merge_key();
            grouped
                .entry((is_static, name.to_string()))
                .or_default()
                .push(member.clone());
        }
        for (key, group) in grouped {
            self.slots.insert(key, group);
        }
    }

    fn into_members(self) -> Vec<Member> {
        self.slots.into_values().flatten().collect()
    }
}

/// Resolves composition for all entities, filling `composed_members` and
/// `flattened_behaviors`, and returns the edges in subject order.
pub fn resolve(
    entities: &mut [Entity],
    tree: &NamespaceTree,
    diagnostics: &mut Diagnostics,
) -> Vec<CompositionEdge> {
    let mut resolver = Resolver {
        tree,
        diagnostics,
        edges: Vec::new(),
    };
    let plans: Vec<Plan> = (0..entities.len())
        .map(|index| resolver.plan(entities, index))
        .collect();
    resolver.linearize(entities, &plans);
    tracing::debug!(edges = resolver.edges.len(), "composition resolved");
    resolver.edges
}

struct Resolver<'a> {
    tree: &'a NamespaceTree,
    diagnostics: &'a mut Diagnostics,
    edges: Vec<CompositionEdge>,
}

impl Resolver<'_> {
    /// Records the edges of one entity.
    fn plan(&mut self, entities: &[Entity], index: usize) -> Plan {
        let entity = &entities[index];
        let subject = entity.id;
        let mut plan = Plan::default();
        match &entity.kind {
            EntityKind::Class(class) if class.inner_of.is_none() => {
                let unwrapped = class.heritage.as_ref().map(unwrap).unwrap_or_default();
                let documented_base = entity.annotation.as_ref().and_then(|a| a.extends());
                match (&unwrapped.base, documented_base) {
                    (Some((path, span, dynamic)), documented) => {
                        plan.base = Some(self.edge(
                            entities,
                            subject,
                            Relation::Extends,
                            path,
                            span,
                            *dynamic,
                        ));
                        if let Some(documented) = documented {
                            self.check_documented_base(entities, entity, path, documented);
                        }
                    }
                    (None, Some(documented)) if class.heritage.is_none() => {
                        let span = entity.span.clone();
                        plan.base = Some(self.edge(
                            entities,
                            subject,
                            Relation::Extends,
                            documented,
                            &span,
                            false,
                        ));
                    }
                    _ => {}
                }
                let documented: Vec<&str> = entity
                    .annotation
                    .as_ref()
                    .map(|a| a.mixes())
                    .unwrap_or_default();
                plan.layers = self.layers(entities, entity, unwrapped.layers, &documented);
                plan.behaviors = class
                    .behaviors
                    .iter()
                    .map(|b| self.behavior_edge(entities, subject, b))
                    .collect();
            }
            EntityKind::MixinFactory(mixin) => {
                let inner = mixin.inner.and_then(|id| entities.get(id.index()));
                let unwrapped = inner
                    .and_then(Entity::as_class)
                    .and_then(|c| c.heritage.as_ref())
                    .map(unwrap)
                    .unwrap_or_default();
                let mut documented: Vec<&str> = entity
                    .annotation
                    .as_ref()
                    .map(|a| a.mixes())
                    .unwrap_or_default();
                for extra in inner
                    .and_then(|i| i.annotation.as_ref())
                    .map(|a| a.mixes())
                    .unwrap_or_default()
                {
                    if !documented.contains(&extra) {
                        documented.push(extra);
                    }
                }
                plan.layers = self.layers(entities, entity, unwrapped.layers, &documented);
            }
            EntityKind::Behavior(BehaviorData::Composite { elements }) => {
                plan.behaviors = elements
                    .iter()
                    .map(|b| self.behavior_edge(entities, subject, b))
                    .collect();
            }
            _ => {}
        }
        plan
    }

    /// Builds mixin and behavior layers, unioning the documented mixin list
    /// with the syntactic chain.
    fn layers(
        &mut self,
        entities: &[Entity],
        entity: &Entity,
        syntactic: Vec<UnwrappedLayer>,
        documented: &[&str],
    ) -> Vec<Layer> {
        let subject = entity.id;
        let mut layers = Vec::new();
        let mut applied: Vec<(String, Option<EntityId>)> = Vec::new();
        for layer in syntactic {
            match layer {
                UnwrappedLayer::Mixin(callee, span) => {
                    let e = self.edge(entities, subject, Relation::AppliesMixin, &callee, &span, false);
                    applied.push((callee, self.edges[e].state.entity()));
                    layers.push(Layer::Mixin(e));
                }
                UnwrappedLayer::Behaviors(list) => {
                    let edges = list
                        .iter()
                        .map(|b| self.behavior_edge(entities, subject, b))
                        .collect();
                    layers.push(Layer::Behaviors(edges));
                }
            }
        }

        let same = |path: &str, resolved: Option<EntityId>, other: &(String, Option<EntityId>)| {
            match (resolved, other.1) {
                (Some(a), Some(b)) => a == b,
                _ => path == other.0,
            }
        };
        let mut missing_in_docs: Vec<&str> = Vec::new();
        let mut missing_in_syntax: Vec<&str> = Vec::new();
        let documented_ids: Vec<(String, Option<EntityId>)> = documented
            .iter()
            .map(|d| ((*d).to_string(), self.tree.resolve_from(entities, entity.file(), d)))
            .collect();
        for (path, id) in &documented_ids {
            if !applied.iter().any(|a| same(path.as_str(), *id, a)) {
                missing_in_syntax.push(path.as_str());
            }
        }
        for (path, id) in &applied {
            if !documented_ids.iter().any(|d| same(path.as_str(), *id, d)) {
                missing_in_docs.push(path.as_str());
            }
        }

        if !applied.is_empty()
            && !documented.is_empty()
            && !(missing_in_docs.is_empty() && missing_in_syntax.is_empty())
        {
            let message = format!(
                "documented mixins [{}] differ from applied mixins [{}]; using both",
                documented.join(", "),
                applied
                    .iter()
                    .map(|(p, _)| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            self.diagnostics.report(
                DiagnosticKind::CompositionDiscrepancy,
                entity.span.clone(),
                message,
            );
        }

        let span = entity.span.clone();
        for path in missing_in_syntax {
            let e = self.edge(entities, subject, Relation::AppliesMixin, path, &span, false);
            layers.push(Layer::Mixin(e));
        }
        layers
    }

    fn check_documented_base(
        &mut self,
        entities: &[Entity],
        entity: &Entity,
        syntactic: &str,
        documented: &str,
    ) {
        let agree = match (
            self.tree.resolve_from(entities, entity.file(), syntactic),
            self.tree.resolve_from(entities, entity.file(), documented),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => syntactic == documented,
        };
        if !agree {
            self.diagnostics.report(
                DiagnosticKind::CompositionDiscrepancy,
                entity.span.clone(),
                format!(
                    "'{}' is documented to extend '{documented}' but extends '{syntactic}'",
                    entity.name
                ),
            );
        }
    }

    fn behavior_edge(&mut self, entities: &[Entity], subject: EntityId, reference: &BehaviorRef) -> usize {
        match reference {
            BehaviorRef::Static { path, span } => {
                self.edge(entities, subject, Relation::IncludesBehavior, path, span, false)
            }
            BehaviorRef::Dynamic { text, span } => {
                self.edge(entities, subject, Relation::IncludesBehavior, text, span, true)
            }
        }
    }

    /// Resolves one reference and records the edge.
    fn edge(
        &mut self,
        entities: &[Entity],
        subject: EntityId,
        relation: Relation,
        target: &str,
        span: &SourceSpan,
        dynamic: bool,
    ) -> usize {
        let state = if dynamic {
            self.diagnostics.report(
                DiagnosticKind::DynamicConstruct,
                span.clone(),
                format!("{relation} target '{target}' is not a static reference"),
            );
            Resolution::Unresolved(UnresolvedReason::Dynamic)
        } else {
            match self.tree.resolve_from(entities, &span.file, target) {
                Some(id) => {
                    let kind = &entities[id.index()].kind;
                    let fits = match relation {
                        Relation::Extends => matches!(kind, EntityKind::Class(_)),
                        Relation::AppliesMixin => matches!(kind, EntityKind::MixinFactory(_)),
                        Relation::IncludesBehavior => matches!(kind, EntityKind::Behavior(_)),
                    };
                    if fits {
                        Resolution::Resolved(id)
                    } else {
                        self.diagnostics.report(
                            DiagnosticKind::UnresolvedReference,
                            span.clone(),
                            format!("{relation} target '{target}' is a {}", kind.label()),
                        );
                        Resolution::Unresolved(UnresolvedReason::WrongKind {
                            found: kind.label().to_string(),
                        })
                    }
                }
                None => {
                    self.diagnostics.report(
                        DiagnosticKind::UnresolvedReference,
                        span.clone(),
                        format!("cannot resolve {relation} target '{target}'"),
                    );
                    Resolution::Unresolved(UnresolvedReason::NotFound)
                }
            }
        };
        self.edges.push(CompositionEdge {
            subject,
            relation,
            target: target.to_string(),
            state,
            span: span.clone(),
        });
        self.edges.len() - 1
    }

    /// Walks dependencies depth-first and composes each entity after all of
    /// its dependencies.
    fn linearize(&mut self, entities: &mut [Entity], plans: &[Plan]) {
        const UNVISITED: u8 = 0;
        const ON_STACK: u8 = 1;
        const DONE: u8 = 2;

        let deps: Vec<Vec<(EntityId, Option<usize>)>> = entities
            .iter()
            .zip(plans)
            .map(|(entity, plan)| {
                let mut d: Vec<(EntityId, Option<usize>)> = plan
                    .edge_indices()
                    .into_iter()
                    .filter_map(|e| self.edges[e].state.entity().map(|t| (t, Some(e))))
                    .collect();
                if let Some(mixin) = entity.as_class().and_then(|c| c.inner_of) {
                    d.push((mixin, None));
                }
                d
            })
            .collect();

        let mut state = vec![UNVISITED; entities.len()];
        let mut reported: HashSet<Vec<EntityId>> = HashSet::new();
        for start in 0..entities.len() {
            if state[start] != UNVISITED {
                continue;
            }
            state[start] = ON_STACK;
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            while let Some(top) = stack.last_mut() {
                let (node, next) = *top;
                if let Some(&(target, edge)) = deps[node].get(next) {
                    top.1 += 1;
                    let t = target.index();
                    match state.get(t).copied() {
                        Some(UNVISITED) => {
                            state[t] = ON_STACK;
                            stack.push((t, 0));
                        }
                        Some(ON_STACK) => {
                            let from = stack.iter().position(|(n, _)| *n == t).unwrap_or(0);
                            let cycle: Vec<EntityId> =
                                stack[from..].iter().map(|(n, _)| entities[*n].id).collect();
                            self.break_cycle(entities, edge, cycle, &mut reported);
                        }
                        _ => {}
                    }
                } else {
                    stack.pop();
                    state[node] = DONE;
                    self.compose(entities, node, &plans[node]);
                }
            }
        }
    }

    fn break_cycle(
        &mut self,
        entities: &[Entity],
        edge: Option<usize>,
        cycle: Vec<EntityId>,
        reported: &mut HashSet<Vec<EntityId>>,
    ) {
        let Some(edge) = edge else {
            return;
        };
        self.edges[edge].state = Resolution::Unresolved(UnresolvedReason::Cyclic);
        let mut key = cycle.clone();
        key.sort_unstable();
        if !reported.insert(key) {
            return;
        }
        let mut names: Vec<&str> = cycle
            .iter()
            .map(|id| entities[id.index()].name.as_str())
            .collect();
        if let Some(first) = names.first().copied() {
            names.push(first);
        }
        let message = format!("composition cycle: {}", names.join(" -> "));
        tracing::warn!("{message}");
        self.diagnostics.report(
            DiagnosticKind::CompositionCycle,
            self.edges[edge].span.clone(),
            message,
        );
    }

    /// Composes one entity whose dependencies are all done.
    fn compose(&self, entities: &mut [Entity], index: usize, plan: &Plan) {
        let resolved = |e: usize| self.edges[e].state.entity();
        let mut slots = Slots::default();
        let mut flattened: Vec<EntityId> = Vec::new();
        let mut include = |entities: &[Entity], slots: &mut Slots, edges: &[usize]| {
            let targets: Vec<EntityId> = edges.iter().filter_map(|e| resolved(*e)).collect();
            for id in flatten(entities, &targets) {
                slots.merge(&entities[id.index()].members);
                if !flattened.contains(&id) {
                    flattened.push(id);
                }
            }
        };

        let entity = &entities[index];
        let composed = match &entity.kind {
            EntityKind::Class(class) if class.inner_of.is_some() => class
                .inner_of
                .and_then(|m| entities.get(m.index()))
                .map(|m| m.composed_members.clone())
                .unwrap_or_default(),
            EntityKind::Class(_) | EntityKind::MixinFactory(_) => {
                if let Some(base) = plan.base.and_then(resolved) {
                    slots.merge(&entities[base.index()].composed_members);
                }
                for layer in plan.layers.iter().rev() {
                    match layer {
                        Layer::Mixin(e) => {
                            if let Some(mixin) = resolved(*e) {
                                slots.merge(&entities[mixin.index()].composed_members);
                            }
                        }
                        Layer::Behaviors(list) => include(entities, &mut slots, list),
                    }
                }
                include(entities, &mut slots, &plan.behaviors);
                let own = match entity.as_mixin().and_then(|m| m.inner) {
                    Some(inner) => entities
                        .get(inner.index())
                        .map(|i| i.members.as_slice())
                        .unwrap_or_default(),
                    None => entity.members.as_slice(),
                };
                slots.merge(own);
                slots.into_members()
            }
            EntityKind::Behavior(BehaviorData::Composite { .. }) => {
                include(entities, &mut slots, &plan.behaviors);
                slots.into_members()
            }
            EntityKind::Behavior(BehaviorData::Object) => entity.members.clone(),
            EntityKind::Namespace(_) | EntityKind::FreeFunction(_) => Vec::new(),
        };

        let entity = &mut entities[index];
        entity.composed_members = composed;
        entity.flattened_behaviors = flattened;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyscan_core::{
        ClassData, LexicalTarget, MemberKind, MixinData, Placement, Privacy, Signature,
    };

    fn span() -> SourceSpan {
        SourceSpan::file_start("a.js")
    }

    fn member(name: &str, ty: &str) -> Member {
        Member {
            name: name.into(),
            kind: MemberKind::Property,
            is_static: false,
            signature: Signature::default(),
            declared_type: Some(ty.into()),
            privacy: Privacy::Public,
            description: None,
            span: span(),
        }
    }

    fn entity(id: u32, name: &str, kind: EntityKind, members: Vec<Member>) -> Entity {
        let mut e = Entity::new(
            EntityId(id),
            name,
            kind,
            span(),
            LexicalTarget::Binding { name: name.into() },
        );
        e.members = members;
        e
    }

    fn behavior_list(paths: &[&str]) -> EntityKind {
        EntityKind::Behavior(BehaviorData::Composite {
            elements: paths
                .iter()
                .map(|p| BehaviorRef::Static {
                    path: (*p).into(),
                    span: span(),
                })
                .collect(),
        })
    }

    fn run(entities: &mut Vec<Entity>) -> (Vec<CompositionEdge>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let tree = crate::namespace::resolve(entities, &[], &mut diags);
        let edges = resolve(entities, &tree, &mut diags);
        for e in entities.iter() {
            assert_ne!(e.placement, Placement::Pending, "{} not placed", e.name);
        }
        (edges, diags)
    }

    #[test]
    fn flattening_dedupes_and_is_idempotent() {
        let object = || EntityKind::Behavior(BehaviorData::Object);
        let mut entities = vec![
            entity(0, "B1", object(), vec![member("a", "string")]),
            entity(1, "B2", object(), vec![member("a", "number")]),
            entity(2, "Foo", behavior_list(&["B1", "B2", "B1"]), vec![]),
            entity(3, "Bar", behavior_list(&["Foo", "Foo"]), vec![]),
        ];
        let (_, diags) = run(&mut entities);
        assert!(diags.is_empty());

        assert_eq!(entities[2].flattened_behaviors, vec![EntityId(0), EntityId(1)]);
        assert_eq!(entities[3].flattened_behaviors, vec![EntityId(0), EntityId(1)]);
        let again = flatten(&entities, &entities[2].flattened_behaviors);
        assert_eq!(again, entities[2].flattened_behaviors);
        // later behavior wins
        assert_eq!(
            entities[2].composed_members[0].declared_type.as_deref(),
            Some("number")
        );
    }

    #[test]
    fn behavior_cycle_reports_once() {
        let mut entities = vec![
            entity(0, "A", behavior_list(&["B"]), vec![]),
            entity(1, "B", behavior_list(&["A"]), vec![]),
        ];
        let (edges, diags) = run(&mut entities);
        let cycles: Vec<_> = diags
            .iter()
            .filter(|d| d.kind == DiagnosticKind::CompositionCycle)
            .collect();
        assert_eq!(cycles.len(), 1);
        assert!(edges
            .iter()
            .any(|e| e.state == Resolution::Unresolved(UnresolvedReason::Cyclic)));
    }

    #[test]
    fn class_extends_itself() {
        let mut entities = vec![entity(
            0,
            "A",
            EntityKind::Class(ClassData {
                heritage: Some(HeritageExpr::Reference {
                    path: "A".into(),
                    span: span(),
                }),
                ..ClassData::default()
            }),
            vec![member("x", "string")],
        )];
        let (edges, diags) = run(&mut entities);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].state, Resolution::Unresolved(UnresolvedReason::Cyclic));
        assert_eq!(diags.len(), 1);
        assert_eq!(entities[0].composed_members.len(), 1);
    }

    #[test]
    fn mixin_members_override_base() {
        let mut inner = entity(
            1,
            "MClass",
            EntityKind::Class(ClassData {
                heritage: Some(HeritageExpr::Parameter {
                    name: "base".into(),
                }),
                inner_of: Some(EntityId(0)),
                ..ClassData::default()
            }),
            vec![member("shared", "number"), member("fromMixin", "string")],
        );
        inner.target = LexicalTarget::None;
        let mut entities = vec![
            entity(
                0,
                "M",
                EntityKind::MixinFactory(MixinData {
                    inner: Some(EntityId(1)),
                    ambiguous: false,
                }),
                vec![],
            ),
            inner,
            entity(
                2,
                "Base",
                EntityKind::Class(ClassData::default()),
                vec![member("shared", "string"), member("fromBase", "string")],
            ),
            entity(
                3,
                "Sub",
                EntityKind::Class(ClassData {
                    heritage: Some(HeritageExpr::MixinCall {
                        callee: "M".into(),
                        argument: Box::new(HeritageExpr::Reference {
                            path: "Base".into(),
                            span: span(),
                        }),
                        span: span(),
                    }),
                    synthesized: true,
                    ..ClassData::default()
                }),
                vec![],
            ),
        ];
        // the inner class is never placed
        let mut diags = Diagnostics::new();
        let tree = crate::namespace::resolve(&mut entities, &[], &mut diags);
        let edges = resolve(&mut entities, &tree, &mut diags);
        assert!(diags.is_empty());

        let relations: Vec<Relation> = edges.iter().map(|e| e.relation).collect();
        assert_eq!(relations, vec![Relation::Extends, Relation::AppliesMixin]);
        let members: Vec<(&str, Option<&str>)> = entities[3]
            .composed_members
            .iter()
            .map(|m| (m.name.as_str(), m.declared_type.as_deref()))
            .collect();
        assert_eq!(
            members,
            vec![
                ("shared", Some("number")),
                ("fromBase", Some("string")),
                ("fromMixin", Some("string")),
            ]
        );
        assert_eq!(entities[1].composed_members, entities[0].composed_members);
    }

    #[test]
    fn getter_and_setter_share_a_slot() {
        let mut getter = member("value", "string");
        getter.kind = MemberKind::Getter;
        let mut setter = member("value", "string");
        setter.kind = MemberKind::Setter;
        let mut slots = Slots::default();
        slots.merge(&[member("value", "number")]);
        slots.merge(&[getter, setter]);
        let merged = slots.into_members();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].kind, MemberKind::Getter);
    }

    #[test]
    fn unresolved_and_wrong_kind_targets() {
        let mut entities = vec![
            entity(0, "Ns", EntityKind::Namespace(Default::default()), vec![]),
            entity(1, "X", behavior_list(&["Ns", "Nowhere"]), vec![]),
        ];
        let (edges, diags) = run(&mut entities);
        assert_eq!(
            edges[0].state,
            Resolution::Unresolved(UnresolvedReason::WrongKind {
                found: "namespace".into()
            })
        );
        assert_eq!(edges[1].state, Resolution::Unresolved(UnresolvedReason::NotFound));
        assert_eq!(diags.len(), 2);
    }
}
