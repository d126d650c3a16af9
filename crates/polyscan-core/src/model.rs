//! Semantic model types.
//!
//! Entities are created by the scanner, get their placement from the
//! namespace resolver and their edges and composed members from the
//! composition resolver. [`SemanticModel`] is the frozen, read-only result.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::annotation::{Annotation, Visibility};
use crate::span::SourceSpan;

/// Identity of an entity inside one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Index into the entity table.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Member privacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    /// Part of the public API.
    Public,
    /// `_name` or `@protected`.
    Protected,
    /// `__name` or `@private`.
    Private,
}

impl Privacy {
    /// Privacy implied by a member name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("__") || name.starts_with('#') {
            Self::Private
        } else if name.starts_with('_') {
            Self::Protected
        } else {
            Self::Public
        }
    }

    /// Applies an explicit visibility marker on top of the name-derived default.
    #[must_use]
    pub fn with_visibility(self, visibility: Option<Visibility>) -> Self {
        match visibility {
            Some(Visibility::Public | Visibility::Global) => Self::Public,
            Some(Visibility::Protected) => Self::Protected,
            Some(Visibility::Private) => Self::Private,
            None => self,
        }
    }
}

/// Kind of declared member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// Callable member.
    Method,
    /// `get name()`.
    Getter,
    /// `set name(v)`.
    Setter,
    /// Field or object property.
    Property,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Declared type, as documented.
    pub ty: Option<String>,
    /// Has a default value or is documented optional.
    pub optional: bool,
    /// `...name`.
    pub rest: bool,
}

impl Param {
    /// An untyped, required parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            optional: false,
            rest: false,
        }
    }
}

/// Callable signature shared by methods and free functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Parameters in order.
    pub params: Vec<Param>,
    /// Documented return type.
    pub return_type: Option<String>,
    /// Whether the body contains `return <expr>` (or is an expression body).
    pub returns_value: bool,
}

/// A declared member of a class, mixin or behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member name.
    pub name: String,
    /// Member kind.
    pub kind: MemberKind,
    /// Declared on the constructor rather than the instance.
    pub is_static: bool,
    /// Signature for methods and accessors.
    pub signature: Signature,
    /// Declared value type for properties and accessors.
    pub declared_type: Option<String>,
    /// Privacy.
    pub privacy: Privacy,
    /// Documentation text.
    pub description: Option<String>,
    /// Location.
    pub span: SourceSpan,
}

impl Member {
    /// Number of declared parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.signature.params.len()
    }

    /// Key used when members are merged: static and instance namespaces are
    /// distinct, and a getter/setter pair shares one slot.
    #[must_use]
    pub fn merge_key(&self) -> (bool, &str) {
        (self.is_static, self.name.as_str())
    }
}

/// Reference to a behavior inside an array literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BehaviorRef {
    /// Identifier or static member chain.
    Static {
        /// Dotted path.
        path: String,
        /// Location.
        span: SourceSpan,
    },
    /// Any other element expression.
    Dynamic {
        /// Source text.
        text: String,
        /// Location.
        span: SourceSpan,
    },
}

impl BehaviorRef {
    /// Location of the element.
    #[must_use]
    pub fn span(&self) -> &SourceSpan {
        match self {
            Self::Static { span, .. } | Self::Dynamic { span, .. } => span,
        }
    }
}

/// Syntactic superclass expression, recorded as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HeritageExpr {
    /// `extends Name` or `extends A.B.C`.
    Reference {
        /// Dotted path.
        path: String,
        /// Location.
        span: SourceSpan,
    },
    /// `extends Mixin(<argument>)`.
    MixinCall {
        /// Dotted path of the called function.
        callee: String,
        /// Wrapped superclass expression.
        argument: Box<HeritageExpr>,
        /// Location of the call.
        span: SourceSpan,
    },
    /// `extends mixinBehaviors([A, B], <base>)`.
    BehaviorMix {
        /// Behaviors in list order.
        behaviors: Vec<BehaviorRef>,
        /// Wrapped superclass expression.
        base: Box<HeritageExpr>,
        /// Location of the call.
        span: SourceSpan,
    },
    /// The parameter of an enclosing mixin function.
    Parameter {
        /// Parameter name.
        name: String,
    },
    /// Anything that cannot be followed statically.
    Dynamic {
        /// Source text.
        text: String,
        /// Location.
        span: SourceSpan,
    },
}

/// Class-specific data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassData {
    /// Superclass expression from syntax.
    pub heritage: Option<HeritageExpr>,
    /// Behaviors listed in a legacy registration call.
    pub behaviors: Vec<BehaviorRef>,
    /// Produced by `Sub = Mixin(Base)` rather than class syntax.
    pub synthesized: bool,
    /// Custom element tag from a legacy registration `is` property.
    pub tag_name: Option<String>,
    /// Mixin factory that returns this class.
    pub inner_of: Option<EntityId>,
}

/// Mixin-factory-specific data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixinData {
    /// The single class the factory returns.
    pub inner: Option<EntityId>,
    /// More than one candidate class was returned.
    pub ambiguous: bool,
}

/// Behavior-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "kebab-case")]
pub enum BehaviorData {
    /// Object literal; members live on the entity.
    Object,
    /// Array literal of other behaviors.
    Composite {
        /// Elements in list order.
        elements: Vec<BehaviorRef>,
    },
}

/// Namespace-specific data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceData {
    /// Canonical dotted path.
    pub path: String,
    /// Enclosing namespace.
    pub parent: Option<EntityId>,
    /// Local name to child entity; names are unique.
    pub children: IndexMap<String, EntityId>,
    /// Synthesized because something referenced the path.
    pub implicit: bool,
}

/// Tagged entity variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EntityKind {
    /// A class.
    Class(ClassData),
    /// A function returning a class that extends its argument.
    MixinFactory(MixinData),
    /// A reusable bundle of members.
    Behavior(BehaviorData),
    /// A dotted grouping of entities.
    Namespace(NamespaceData),
    /// A function.
    FreeFunction(Signature),
}

impl EntityKind {
    /// Short label used in messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Class(_) => "class",
            Self::MixinFactory(_) => "mixin",
            Self::Behavior(_) => "behavior",
            Self::Namespace(_) => "namespace",
            Self::FreeFunction(_) => "function",
        }
    }
}

/// Where the assignment or declaration put the entity, as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LexicalTarget {
    /// Declaration or assignment to a bare identifier.
    Binding {
        /// Bound name.
        name: String,
    },
    /// Assignment to a static member chain; includes the final name.
    Chain {
        /// Path segments.
        segments: Vec<String>,
    },
    /// Member `name` of the object literal that declares entity `owner`.
    Owned {
        /// Entity whose object literal contains this one.
        owner: EntityId,
        /// Property key.
        name: String,
    },
    /// Assignment through a non-literal computed member.
    Computed {
        /// Object path text.
        object: String,
        /// Key expression text.
        key: String,
        /// Static segments after the computed member, if any.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        rest: Vec<String>,
    },
    /// No assignment target (anonymous registration, inner class).
    None,
}

/// Resolved namespace placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "path", rename_all = "kebab-case")]
pub enum Placement {
    /// Not yet resolved.
    Pending,
    /// Global scope.
    Root,
    /// Inside the namespace with this path.
    Namespace(String),
    /// The entity exists but its placement could not be determined.
    Unknown(String),
}

/// A recovered declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Identity.
    pub id: EntityId,
    /// Local name (last path segment), possibly synthesized.
    pub name: String,
    /// Other names bound to this entity.
    pub aliases: Vec<String>,
    /// Variant data.
    pub kind: EntityKind,
    /// Own members in declaration order.
    pub members: Vec<Member>,
    /// Members after composition, in merge order.
    pub composed_members: Vec<Member>,
    /// Object-form behaviors this entity includes, flattened.
    pub flattened_behaviors: Vec<EntityId>,
    /// Location.
    pub span: SourceSpan,
    /// Attached documentation.
    pub annotation: Option<Annotation>,
    /// Assignment target as written.
    pub target: LexicalTarget,
    /// Namespace placement.
    pub placement: Placement,
}

impl Entity {
    /// Creates an entity with no members and pending placement.
    #[must_use]
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        kind: EntityKind,
        span: SourceSpan,
        target: LexicalTarget,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            aliases: Vec::new(),
            kind,
            members: Vec::new(),
            composed_members: Vec::new(),
            flattened_behaviors: Vec::new(),
            span,
            annotation: None,
            target,
            placement: Placement::Pending,
        }
    }

    /// Source file this entity was scanned from.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.span.file
    }

    /// Namespace data, for namespace entities.
    #[must_use]
    pub fn as_namespace(&self) -> Option<&NamespaceData> {
        match &self.kind {
            EntityKind::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    /// Class data, for class entities.
    #[must_use]
    pub fn as_class(&self) -> Option<&ClassData> {
        match &self.kind {
            EntityKind::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Mixin data, for mixin factories.
    #[must_use]
    pub fn as_mixin(&self) -> Option<&MixinData> {
        match &self.kind {
            EntityKind::MixinFactory(m) => Some(m),
            _ => None,
        }
    }

    /// Dotted path of the entity, when its placement is known.
    #[must_use]
    pub fn canonical_path(&self) -> Option<String> {
        match &self.placement {
            Placement::Root => Some(self.name.clone()),
            Placement::Namespace(ns) => Some(format!("{ns}.{}", self.name)),
            Placement::Pending | Placement::Unknown(_) => None,
        }
    }

    /// Whether the entity belongs to the public API surface.
    ///
    /// Explicit markers win. Free functions are private unless they live in
    /// a namespace; everything else is public.
    #[must_use]
    pub fn is_public(&self) -> bool {
        match self.annotation.as_ref().and_then(Annotation::visibility) {
            Some(Visibility::Public | Visibility::Global) => true,
            Some(Visibility::Private | Visibility::Protected) => false,
            None => match self.kind {
                EntityKind::FreeFunction(_) => matches!(self.placement, Placement::Namespace(_)),
                _ => true,
            },
        }
    }

    /// Shifts this entity's id and internal references by `offset`.
    ///
    /// Scanners number entities per file; the pipeline rebases them into one
    /// id space at the barrier.
    pub fn rebase(&mut self, offset: u32) {
        let shift = |id: &mut EntityId| id.0 += offset;
        shift(&mut self.id);
        match &mut self.kind {
            EntityKind::Class(c) => {
                if let Some(id) = c.inner_of.as_mut() {
                    shift(id);
                }
            }
            EntityKind::MixinFactory(m) => {
                if let Some(id) = m.inner.as_mut() {
                    shift(id);
                }
            }
            EntityKind::Namespace(ns) => {
                if let Some(id) = ns.parent.as_mut() {
                    shift(id);
                }
                for id in ns.children.values_mut() {
                    shift(id);
                }
            }
            EntityKind::Behavior(_) | EntityKind::FreeFunction(_) => {}
        }
        if let LexicalTarget::Owned { owner, .. } = &mut self.target {
            shift(owner);
        }
        for id in &mut self.flattened_behaviors {
            shift(id);
        }
    }
}

/// Composition relation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relation {
    /// Superclass.
    Extends,
    /// Mixin application.
    AppliesMixin,
    /// Behavior inclusion.
    IncludesBehavior,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Extends => "extends",
            Self::AppliesMixin => "applies-mixin",
            Self::IncludesBehavior => "includes-behavior",
        };
        f.write_str(s)
    }
}

/// Why an edge target could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum UnresolvedReason {
    /// No entity with that path.
    NotFound,
    /// Resolving the target would revisit an entity on the current chain.
    Cyclic,
    /// The reference is not a static expression.
    Dynamic,
    /// The target exists but has the wrong kind for the relation.
    WrongKind {
        /// Kind that was found.
        found: String,
    },
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Cyclic => write!(f, "cyclic"),
            Self::Dynamic => write!(f, "dynamic"),
            Self::WrongKind { found } => write!(f, "target is a {found}"),
        }
    }
}

/// Resolution state of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "kebab-case")]
pub enum Resolution {
    /// Target entity found.
    Resolved(EntityId),
    /// Target could not be resolved.
    Unresolved(UnresolvedReason),
}

impl Resolution {
    /// The resolved target, if any.
    #[must_use]
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Self::Resolved(id) => Some(*id),
            Self::Unresolved(_) => None,
        }
    }
}

/// Directed composition relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionEdge {
    /// Entity that extends/applies/includes.
    pub subject: EntityId,
    /// Relation kind.
    pub relation: Relation,
    /// Target reference as written.
    pub target: String,
    /// Resolution state.
    pub state: Resolution,
    /// Location of the reference.
    pub span: SourceSpan,
}

/// `import('...')` with a literal specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicImport {
    /// Import specifier.
    pub specifier: String,
    /// Location of the call.
    pub span: SourceSpan,
}

/// Frozen result graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticModel {
    entities: Vec<Entity>,
    edges: Vec<CompositionEdge>,
    root: IndexMap<String, EntityId>,
    imports: Vec<DynamicImport>,
    files: Vec<PathBuf>,
    #[serde(skip)]
    edge_index: HashMap<EntityId, Vec<usize>>,
}

impl SemanticModel {
    /// Freezes resolved parts into a model.
    #[must_use]
    pub fn new(
        entities: Vec<Entity>,
        edges: Vec<CompositionEdge>,
        root: IndexMap<String, EntityId>,
        imports: Vec<DynamicImport>,
        files: Vec<PathBuf>,
    ) -> Self {
        let mut edge_index: HashMap<EntityId, Vec<usize>> = HashMap::new();
        for (i, edge) in edges.iter().enumerate() {
            edge_index.entry(edge.subject).or_default().push(i);
        }
        Self {
            entities,
            edges,
            root,
            imports,
            files,
            edge_index,
        }
    }

    /// All entities in id order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Entity by id.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    /// First entity with the given local name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Resolves a dotted path through the namespace tree.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<EntityId> {
        let mut segments = path.split('.');
        let mut current = *self.root.get(segments.next()?)?;
        for segment in segments {
            current = self.namespace_child(current, segment)?;
        }
        Some(current)
    }

    /// Child `name` of namespace `ns`.
    #[must_use]
    pub fn namespace_child(&self, ns: EntityId, name: &str) -> Option<EntityId> {
        self.entity(ns)?.as_namespace()?.children.get(name).copied()
    }

    /// Root-level names.
    #[must_use]
    pub fn root(&self) -> &IndexMap<String, EntityId> {
        &self.root
    }

    /// All composition edges.
    #[must_use]
    pub fn edges(&self) -> &[CompositionEdge] {
        &self.edges
    }

    /// Edges whose subject is `id`, in resolution order.
    #[must_use]
    pub fn edges_of(&self, id: EntityId) -> Vec<&CompositionEdge> {
        self.edge_index
            .get(&id)
            .map(|ix| ix.iter().map(|&i| &self.edges[i]).collect())
            .unwrap_or_default()
    }

    /// Members of `id` after composition.
    #[must_use]
    pub fn effective_members(&self, id: EntityId) -> &[Member] {
        self.entity(id).map_or(&[], |e| e.composed_members.as_slice())
    }

    /// Flattened object-form behaviors included by `id`.
    #[must_use]
    pub fn flattened_behaviors(&self, id: EntityId) -> &[EntityId] {
        self.entity(id).map_or(&[], |e| e.flattened_behaviors.as_slice())
    }

    /// Literal dynamic imports.
    #[must_use]
    pub fn dynamic_imports(&self) -> &[DynamicImport] {
        &self.imports
    }

    /// Analyzed files in input order.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Entities scanned from `file`, in scan order.
    pub fn entities_in_file<'a>(&'a self, file: &'a Path) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities.iter().filter(move |e| e.file() == file)
    }
}
