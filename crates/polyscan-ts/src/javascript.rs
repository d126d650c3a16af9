//! JavaScript declaration scanner using Tree-sitter.
//!
//! Walks one syntax tree and records classes, mixin factories, behaviors,
//! namespaces and free functions. Each declaration is classified from its
//! syntactic shape and its documentation comment; when the two disagree the
//! annotation wins and a [`DiagnosticKind::KindConflict`] is reported.

use std::collections::HashSet;

use polyscan_core::{
    Annotation, BehaviorData, BehaviorRef, ClassData, DeclaredKind, Diagnostic, DiagnosticKind,
    DynamicImport, Entity, EntityId, EntityKind, HeritageExpr, LexicalTarget, MixinData,
    NamespaceData, ScannerConfig, Signature, SourceFile, SourceSpan,
};
use tree_sitter::{Language, Node, Parser, Tree};

use crate::scanner::{AliasBinding, LanguageScanner, ScanError, ScannedFile};
use crate::syntax::{
    doc_owner, dotted, is_function, is_function_scope, leading_doc, named_children, path_of,
    property_name, return_value, returns, string_value, text, unwrap_parens, Path,
};

/// Scans JavaScript sources for Polymer-style declarations.
pub struct JavaScriptScanner {
    language: Language,
}

impl JavaScriptScanner {
    /// Creates a new JavaScript scanner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_javascript::LANGUAGE.into(),
        }
    }

    fn parse(&self, source: &str) -> Result<Tree, ScanError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ScanError::Language {
                language: "javascript",
                message: e.to_string(),
            })?;
        parser.parse(source, None).ok_or(ScanError::NoTree)
    }
}

impl Default for JavaScriptScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageScanner for JavaScriptScanner {
    fn language_id(&self) -> &'static str {
        "javascript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".js", ".mjs", ".cjs", ".jsx"]
    }

    fn scan(&self, file: &SourceFile, config: &ScannerConfig) -> ScannedFile {
        let _span = tracing::debug_span!("scan", file = %file.path.display()).entered();

        let tree = match self.parse(&file.content) {
            Ok(tree) => tree,
            Err(e) => {
                let mut out = ScannedFile::new(&file.path);
                out.diagnostics.report(
                    DiagnosticKind::ParseFailure,
                    SourceSpan::file_start(&file.path),
                    e.to_string(),
                );
                return out;
            }
        };

        let mut scan = FileScan::new(file, config);
        let root = tree.root_node();
        if root.has_error() {
            let at = first_error(root).unwrap_or(root);
            scan.out.diagnostics.report(
                DiagnosticKind::ParseFailure,
                scan.span(&at),
                "syntax error; declarations after this point may be incomplete",
            );
        }
        scan.visit(root);
        let out = scan.finish();
        tracing::debug!(
            entities = out.entities.len(),
            aliases = out.aliases.len(),
            imports = out.imports.len(),
            "scanned {}",
            out.file.display()
        );
        out
    }
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let mut children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            children.reverse();
            stack.extend(children);
        }
    }
    None
}

/// Syntactic shape of a declared value.
enum Shape<'t> {
    Class(Node<'t>),
    Mixin {
        function: Node<'t>,
        params: Vec<String>,
        candidates: Vec<Node<'t>>,
    },
    Function(Node<'t>),
    Registration(Node<'t>),
    Application(Node<'t>),
    Object(Node<'t>),
    Array(Node<'t>),
    Other,
}

impl Shape<'_> {
    fn guess(&self) -> Option<DeclaredKind> {
        match self {
            Self::Class(_) | Self::Registration(_) | Self::Application(_) => {
                Some(DeclaredKind::Class)
            }
            Self::Mixin { .. } => Some(DeclaredKind::MixinFactory),
            Self::Function(_) => Some(DeclaredKind::FreeFunction),
            Self::Object(_) | Self::Array(_) | Self::Other => None,
        }
    }
}

/// Why an un-annotated object literal was held back until the end of the
/// file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Held {
    /// Named like a behavior; kept only in legacy files.
    NamingConvention,
    /// Bound to a bare name; kept only when the file republishes that name.
    AliasSource,
}

/// State for scanning one file.
pub(crate) struct FileScan<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) src: &'a [u8],
    pub(crate) config: &'a ScannerConfig,
    pub(crate) out: ScannedFile,
    next_id: u32,
    deferred: Vec<(Held, Entity)>,
    consumed: HashSet<usize>,
    local_mixins: HashSet<String>,
    legacy: bool,
    depth: usize,
}

impl<'a> FileScan<'a> {
    fn new(file: &'a SourceFile, config: &'a ScannerConfig) -> Self {
        Self {
            file,
            src: file.content.as_bytes(),
            config,
            out: ScannedFile::new(&file.path),
            next_id: 0,
            deferred: Vec::new(),
            consumed: HashSet::new(),
            local_mixins: HashSet::new(),
            legacy: false,
            depth: 0,
        }
    }

    pub(crate) fn span(&self, node: &Node<'_>) -> SourceSpan {
        self.file.span(node.start_byte(), node.end_byte())
    }

    pub(crate) fn text(&self, node: &Node<'_>) -> &'a str {
        text(node, self.src)
    }

    pub(crate) fn annotation(&mut self, owner: &Node<'_>) -> Option<Annotation> {
        let doc = leading_doc(owner, self.src)?;
        let span = self.span(&doc);
        Annotation::parse(text(&doc, self.src), &span, &mut self.out.diagnostics)
    }

    fn alloc(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn finish(mut self) -> ScannedFile {
        let republished: HashSet<String> = self
            .out
            .aliases
            .iter()
            .filter_map(|a| a.source.split('.').next())
            .map(String::from)
            .collect();
        for (held, mut entity) in std::mem::take(&mut self.deferred) {
            let keep = (held == Held::NamingConvention && self.legacy)
                || republished.contains(&entity.name);
            if !keep {
                continue;
            }
            entity.id = self.alloc();
            self.out.entities.push(entity);
        }
        self.out.entities.sort_by_key(|e| e.id);
        self.out
    }

    fn visit(&mut self, node: Node<'_>) {
        if !self.consumed.contains(&node.id()) {
            match node.kind() {
                "class_declaration" => self.class_declaration(node),
                "function_declaration" | "generator_function_declaration" => {
                    self.function_declaration(node);
                }
                "variable_declarator" => self.variable_declarator(node),
                "assignment_expression" => self.assignment(node),
                "call_expression" => self.call(node),
                _ => {}
            }
        }

        let scoped = is_function_scope(&node) && !is_iife(node);
        if scoped {
            self.depth += 1;
        }
        for child in named_children(&node) {
            self.visit(child);
        }
        if scoped {
            self.depth -= 1;
        }
    }

    fn class_declaration(&mut self, node: Node<'_>) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(&name).to_string();
        let annotation = self.annotation(&doc_owner(node));
        self.declare(
            LexicalTarget::Binding { name: name.clone() },
            name,
            node,
            annotation,
            node,
            false,
        );
    }

    fn function_declaration(&mut self, node: Node<'_>) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(&name).to_string();
        let annotation = self.annotation(&doc_owner(node));
        self.declare(
            LexicalTarget::Binding { name: name.clone() },
            name,
            node,
            annotation,
            node,
            true,
        );
    }

    fn variable_declarator(&mut self, node: Node<'_>) {
        let (Some(name), Some(value)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("value"),
        ) else {
            return;
        };
        if name.kind() != "identifier" {
            return;
        }
        let name = self.text(&name).to_string();
        let annotation = self.annotation(&doc_owner(node));
        self.declare(
            LexicalTarget::Binding { name: name.clone() },
            name,
            value,
            annotation,
            node,
            true,
        );
    }

    fn assignment(&mut self, node: Node<'_>) {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };
        let (target, name) = match path_of(&left, self.src, &self.config.strip_global_prefixes) {
            Path::Static(segments) => {
                let name = segments.last().cloned().unwrap_or_default();
                if segments.len() == 1 {
                    (LexicalTarget::Binding { name: name.clone() }, name)
                } else {
                    (LexicalTarget::Chain { segments }, name)
                }
            }
            Path::Computed { object, key, rest } => {
                let name = rest.last().cloned().unwrap_or_else(|| key.clone());
                (LexicalTarget::Computed { object, key, rest }, name)
            }
            Path::NotStatic => return,
        };

        let right = unwrap_parens(right);
        if let Path::Static(source) = path_of(&right, self.src, &self.config.strip_global_prefixes)
        {
            if matches!(target, LexicalTarget::Chain { .. }) && self.depth == 0 {
                let span = self.span(&node);
                self.out.aliases.push(AliasBinding {
                    target,
                    source: source.join("."),
                    span,
                });
            }
            return;
        }

        let annotation = self.annotation(&doc_owner(node));
        self.declare(target, name, right, annotation, node, true);
    }

    fn call(&mut self, node: Node<'_>) {
        let Some(callee) = node.child_by_field_name("function") else {
            return;
        };
        if callee.kind() == "import" {
            self.dynamic_import(node);
            return;
        }
        let Some(path) = dotted(&callee, self.src, &self.config.strip_global_prefixes) else {
            return;
        };
        if !self.config.registration_functions.contains(&path) {
            return;
        }
        let annotation = self.annotation(&doc_owner(node));
        self.declare(
            LexicalTarget::None,
            String::new(),
            node,
            annotation,
            node,
            false,
        );
    }

    fn dynamic_import(&mut self, node: Node<'_>) {
        let span = self.span(&node);
        let specifier = node
            .child_by_field_name("arguments")
            .and_then(|args| named_children(&args).into_iter().next())
            .and_then(|arg| string_value(&arg, self.src));
        match specifier {
            Some(specifier) => self.out.imports.push(DynamicImport { specifier, span }),
            None => self.out.diagnostics.report(
                DiagnosticKind::DynamicConstruct,
                span,
                "dynamic import specifier is not a string literal",
            ),
        }
    }

    /// Classifies `value` and records the entity it declares, if any.
    ///
    /// `gated` marks un-annotated functions that are only recorded at the
    /// top level of the file.
    fn declare(
        &mut self,
        target: LexicalTarget,
        name: String,
        value: Node<'_>,
        annotation: Option<Annotation>,
        at: Node<'_>,
        gated: bool,
    ) -> Option<EntityId> {
        let value = unwrap_parens(value);
        let declared = annotation.as_ref().and_then(|a| a.kind);
        let mut shape = self.shape(value);
        if let Shape::Application(call) = shape {
            if declared != Some(DeclaredKind::Class) && !self.is_mixin_application(call) {
                shape = Shape::Other;
            }
        }

        let mut held = None;
        let kind = match (declared, shape.guess()) {
            (Some(declared), Some(found)) if declared != found => {
                self.out.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::KindConflict,
                        self.span(&at),
                        format!("'{name}' is documented as a {declared} but declared as a {found}"),
                    )
                    .with_help("the documented kind is used"),
                );
                declared
            }
            (Some(declared), _) => declared,
            (None, Some(found)) => found,
            // Un-annotated literals default to behaviors.
            (None, None) => match shape {
                Shape::Object(_) | Shape::Array(_)
                    if matches!(target, LexicalTarget::Computed { .. }) =>
                {
                    DeclaredKind::Behavior
                }
                Shape::Object(_) | Shape::Array(_)
                    if name.ends_with(self.config.behavior_suffix.as_str()) =>
                {
                    held = Some(Held::NamingConvention);
                    DeclaredKind::Behavior
                }
                Shape::Object(_)
                    if self.depth == 0 && matches!(target, LexicalTarget::Binding { .. }) =>
                {
                    held = Some(Held::AliasSource);
                    DeclaredKind::Behavior
                }
                _ => return None,
            },
        };
        if kind == DeclaredKind::FreeFunction && gated && self.depth > 0 && annotation.is_none() {
            return None;
        }
        if let Shape::Registration(_) | Shape::Application(_) = shape {
            self.consumed.insert(value.id());
        }

        let name = match (&target, &shape) {
            (LexicalTarget::None, Shape::Registration(config)) => self.registration_name(*config),
            _ => name,
        };
        let span = self.span(&at);
        let id = if held.is_some() { EntityId(0) } else { self.alloc() };
        let mut entity = Entity::new(id, name, EntityKind::FreeFunction(Signature::default()), span, target);

        match kind {
            DeclaredKind::Class => self.build_class(&mut entity, &shape, annotation.as_ref()),
            DeclaredKind::MixinFactory => self.build_mixin(&mut entity, &shape),
            DeclaredKind::Behavior => self.build_behavior(&mut entity, &shape),
            DeclaredKind::Namespace => {
                entity.kind = EntityKind::Namespace(NamespaceData::default());
            }
            DeclaredKind::FreeFunction => {
                let signature = match &shape {
                    Shape::Function(f) | Shape::Mixin { function: f, .. } => {
                        self.signature(*f, annotation.as_ref())
                    }
                    _ => self.signature_from_doc(annotation.as_ref()),
                };
                entity.kind = EntityKind::FreeFunction(signature);
            }
        }
        entity.annotation = annotation;

        if let Some(held) = held {
            self.deferred.push((held, entity));
            return None;
        }
        self.out.entities.push(entity);

        if kind == DeclaredKind::Namespace {
            if let Shape::Object(object) = shape {
                self.namespace_members(id, object);
            }
        }
        Some(id)
    }

    fn shape<'t>(&self, value: Node<'t>) -> Shape<'t> {
        match value.kind() {
            "class" | "class_declaration" => Shape::Class(value),
            "object" => Shape::Object(value),
            "array" => Shape::Array(value),
            "call_expression" => self.call_shape(value),
            _ if is_function(&value)
                || matches!(
                    value.kind(),
                    "function_declaration" | "generator_function_declaration"
                ) =>
            {
                self.mixin_shape(value).unwrap_or(Shape::Function(value))
            }
            _ => Shape::Other,
        }
    }

    fn call_shape<'t>(&self, call: Node<'t>) -> Shape<'t> {
        let callee = call
            .child_by_field_name("function")
            .and_then(|f| dotted(&f, self.src, &self.config.strip_global_prefixes));
        let args = call
            .child_by_field_name("arguments")
            .map(|a| named_children(&a))
            .unwrap_or_default();
        let Some(callee) = callee else {
            return Shape::Other;
        };
        if self.config.mixin_wrappers.contains(&callee) {
            if let Some(function) = args.last().map(|a| unwrap_parens(*a)) {
                if let Some(shape) = self.mixin_shape(function) {
                    return shape;
                }
            }
        }
        if self.config.registration_functions.contains(&callee) {
            if let Some(object) = args.first().filter(|a| a.kind() == "object") {
                return Shape::Registration(*object);
            }
        }
        if args.is_empty() {
            Shape::Other
        } else {
            Shape::Application(call)
        }
    }

    /// Whether a call expression applies a known mixin to a base class.
    fn is_mixin_application(&self, call: Node<'_>) -> bool {
        let Some(callee) = call
            .child_by_field_name("function")
            .and_then(|f| dotted(&f, self.src, &self.config.strip_global_prefixes))
        else {
            return false;
        };
        let last = callee.rsplit('.').next().unwrap_or(&callee);
        self.config.mixin_behaviors_functions.contains(&callee)
            || self.local_mixins.contains(&callee)
            || last.ends_with(self.config.mixin_suffix.as_str())
    }

    /// Recognizes a function that returns a class extending its parameter.
    fn mixin_shape<'t>(&self, function: Node<'t>) -> Option<Shape<'t>> {
        let params = param_names(function, self.src);
        if params.is_empty() {
            return None;
        }
        let body = function.child_by_field_name("body")?;
        let mut candidates: Vec<Node<'t>> = Vec::new();
        if body.kind() == "statement_block" {
            for ret in returns(&body) {
                let Some(value) = return_value(&ret).map(unwrap_parens) else {
                    continue;
                };
                let class = match value.kind() {
                    "class" => Some(value),
                    "identifier" => {
                        let wanted = self.text(&value);
                        named_children(&body).into_iter().find(|c| {
                            c.kind() == "class_declaration"
                                && c.child_by_field_name("name")
                                    .is_some_and(|n| self.text(&n) == wanted)
                        })
                    }
                    _ => None,
                };
                if let Some(class) = class {
                    if self.extends_parameter(class, &params)
                        && !candidates.iter().any(|c| c.id() == class.id())
                    {
                        candidates.push(class);
                    }
                }
            }
        } else {
            let value = unwrap_parens(body);
            if value.kind() == "class" && self.extends_parameter(value, &params) {
                candidates.push(value);
            }
        }
        if candidates.is_empty() {
            return None;
        }
        Some(Shape::Mixin {
            function,
            params,
            candidates,
        })
    }

    fn extends_parameter(&self, class: Node<'_>, params: &[String]) -> bool {
        let mut current = self.class_heritage(class, params);
        loop {
            match current {
                Some(HeritageExpr::Parameter { .. }) => return true,
                Some(HeritageExpr::MixinCall { argument, .. }) => current = Some(*argument),
                Some(HeritageExpr::BehaviorMix { base, .. }) => current = Some(*base),
                _ => return false,
            }
        }
    }

    /// Superclass expression of a class node, if it has one.
    pub(crate) fn class_heritage(&self, class: Node<'_>, params: &[String]) -> Option<HeritageExpr> {
        let heritage = named_children(&class)
            .into_iter()
            .find(|c| c.kind() == "class_heritage")?;
        let expr = named_children(&heritage).into_iter().next()?;
        Some(self.heritage(expr, params))
    }

    fn heritage(&self, node: Node<'_>, params: &[String]) -> HeritageExpr {
        let node = unwrap_parens(node);
        let span = self.span(&node);
        if let Path::Static(segments) = path_of(&node, self.src, &self.config.strip_global_prefixes)
        {
            if segments.len() == 1 && params.contains(&segments[0]) {
                return HeritageExpr::Parameter {
                    name: segments[0].clone(),
                };
            }
            return HeritageExpr::Reference {
                path: segments.join("."),
                span,
            };
        }
        if node.kind() == "call_expression" {
            let callee = node
                .child_by_field_name("function")
                .and_then(|f| dotted(&f, self.src, &self.config.strip_global_prefixes));
            let args = node
                .child_by_field_name("arguments")
                .map(|a| named_children(&a))
                .unwrap_or_default();
            if let Some(callee) = callee {
                if self.config.mixin_behaviors_functions.contains(&callee)
                    && args.len() >= 2
                    && args[0].kind() == "array"
                {
                    return HeritageExpr::BehaviorMix {
                        behaviors: self.behavior_refs(args[0]),
                        base: Box::new(self.heritage(args[1], params)),
                        span,
                    };
                }
                if let Some(argument) = args.first() {
                    return HeritageExpr::MixinCall {
                        callee,
                        argument: Box::new(self.heritage(*argument, params)),
                        span,
                    };
                }
            }
        }
        HeritageExpr::Dynamic {
            text: self.text(&node).to_string(),
            span,
        }
    }

    /// Elements of a behavior array literal.
    pub(crate) fn behavior_refs(&self, array: Node<'_>) -> Vec<BehaviorRef> {
        named_children(&array)
            .into_iter()
            .map(|element| {
                let span = self.span(&element);
                match dotted(&element, self.src, &self.config.strip_global_prefixes) {
                    Some(path) => BehaviorRef::Static { path, span },
                    None => BehaviorRef::Dynamic {
                        text: self.text(&element).to_string(),
                        span,
                    },
                }
            })
            .collect()
    }

    fn build_class(&mut self, entity: &mut Entity, shape: &Shape<'_>, annotation: Option<&Annotation>) {
        let mut data = ClassData::default();
        match shape {
            Shape::Class(node) => {
                data.heritage = self.class_heritage(*node, &[]);
                entity.members = self.class_members(*node);
            }
            Shape::Registration(config) => {
                self.legacy = true;
                data.tag_name = self.config_string(*config, "is");
                data.behaviors = self
                    .config_value(*config, "behaviors")
                    .filter(|v| v.kind() == "array")
                    .map(|v| self.behavior_refs(v))
                    .unwrap_or_default();
                entity.members = self.object_members(*config, true);
            }
            Shape::Application(call) => {
                data.heritage = Some(self.heritage(*call, &[]));
                data.synthesized = true;
            }
            Shape::Object(object) => entity.members = self.object_members(*object, true),
            _ => {}
        }
        if data.tag_name.is_none() {
            data.tag_name = annotation
                .and_then(|a| a.tag("customElement"))
                .map(|t| t.raw.clone())
                .filter(|t| t.contains('-'));
        }
        entity.kind = EntityKind::Class(data);
    }

    fn build_mixin(&mut self, entity: &mut Entity, shape: &Shape<'_>) {
        let mut data = MixinData::default();
        if let Shape::Mixin {
            params, candidates, ..
        } = shape
        {
            for candidate in candidates {
                self.consumed.insert(candidate.id());
            }
            if let [class] = candidates.as_slice() {
                let inner_id = self.alloc();
                let inner_name = class
                    .child_by_field_name("name")
                    .map_or_else(|| entity.name.clone(), |n| self.text(&n).to_string());
                let mut inner = Entity::new(
                    inner_id,
                    inner_name,
                    EntityKind::Class(ClassData {
                        heritage: self.class_heritage(*class, params),
                        inner_of: Some(entity.id),
                        ..ClassData::default()
                    }),
                    self.span(class),
                    LexicalTarget::None,
                );
                inner.members = self.class_members(*class);
                if class.kind() == "class_declaration" {
                    inner.annotation = self.annotation(class);
                }
                self.out.entities.push(inner);
                data.inner = Some(inner_id);
            } else {
                data.ambiguous = true;
                self.out.diagnostics.report(
                    DiagnosticKind::AmbiguousMixin,
                    entity.span.clone(),
                    format!(
                        "mixin '{}' returns {} different classes; its members cannot be determined",
                        entity.name,
                        candidates.len()
                    ),
                );
            }
        }
        self.local_mixins.insert(entity.name.clone());
        if let LexicalTarget::Chain { segments } = &entity.target {
            self.local_mixins.insert(segments.join("."));
        }
        entity.kind = EntityKind::MixinFactory(data);
    }

    fn build_behavior(&mut self, entity: &mut Entity, shape: &Shape<'_>) {
        entity.kind = match shape {
            Shape::Array(array) => EntityKind::Behavior(BehaviorData::Composite {
                elements: self.behavior_refs(*array),
            }),
            Shape::Object(object) => {
                entity.members = self.object_members(*object, true);
                EntityKind::Behavior(BehaviorData::Object)
            }
            Shape::Class(class) => {
                entity.members = self.class_members(*class);
                EntityKind::Behavior(BehaviorData::Object)
            }
            _ => EntityKind::Behavior(BehaviorData::Object),
        };
    }

    /// Records the entities declared inside a namespace object literal.
    fn namespace_members(&mut self, owner: EntityId, object: Node<'_>) {
        for child in named_children(&object) {
            let (key, value) = match child.kind() {
                "pair" => match (
                    child.child_by_field_name("key"),
                    child.child_by_field_name("value"),
                ) {
                    (Some(key), Some(value)) => (key, value),
                    _ => continue,
                },
                "method_definition" => match child.child_by_field_name("name") {
                    Some(key) => (key, child),
                    None => continue,
                },
                _ => continue,
            };
            let name = match property_name(&key, self.src) {
                Ok(name) => name,
                Err(raw) => {
                    let span = self.span(&key);
                    self.out.diagnostics.report(
                        DiagnosticKind::DynamicConstruct,
                        span,
                        format!("computed namespace member {raw} cannot be resolved statically"),
                    );
                    continue;
                }
            };
            let annotation = self.annotation(&child);
            let target = LexicalTarget::Owned {
                owner,
                name: name.clone(),
            };
            if child.kind() == "method_definition" {
                let span = self.span(&child);
                let signature = self.signature(child, annotation.as_ref());
                let id = self.alloc();
                let mut entity =
                    Entity::new(id, name, EntityKind::FreeFunction(signature), span, target);
                entity.annotation = annotation;
                self.out.entities.push(entity);
            } else {
                self.declare(target, name, value, annotation, child, false);
            }
        }
    }

    fn config_value<'t>(&self, object: Node<'t>, key: &str) -> Option<Node<'t>> {
        named_children(&object).into_iter().find_map(|pair| {
            if pair.kind() != "pair" {
                return None;
            }
            let k = pair.child_by_field_name("key")?;
            if property_name(&k, self.src).ok()? == key {
                pair.child_by_field_name("value").map(unwrap_parens)
            } else {
                None
            }
        })
    }

    fn config_string(&self, object: Node<'_>, key: &str) -> Option<String> {
        self.config_value(object, key)
            .and_then(|v| string_value(&v, self.src))
    }

    /// `x-foo-bar` becomes `XFooBarElement`.
    fn registration_name(&self, config: Node<'_>) -> String {
        let tag = self.config_string(config, "is").unwrap_or_default();
        let mut name: String = tag
            .split(|c: char| c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect();
        if name.is_empty() {
            name.push_str("Anonymous");
        }
        name.push_str("Element");
        name
    }
}

/// Whether a function node is immediately invoked.
fn is_iife(node: Node<'_>) -> bool {
    if !is_function(&node) {
        return false;
    }
    let mut current = node;
    while let Some(parent) = current.parent() {
        if parent.kind() == "parenthesized_expression" {
            current = parent;
            continue;
        }
        return parent.kind() == "call_expression"
            && parent
                .child_by_field_name("function")
                .is_some_and(|f| f.id() == current.id());
    }
    false
}

/// Plain identifier parameters of a function.
fn param_names(function: Node<'_>, src: &[u8]) -> Vec<String> {
    if let Some(single) = function.child_by_field_name("parameter") {
        return vec![text(&single, src).to_string()];
    }
    function
        .child_by_field_name("parameters")
        .map(|params| {
            named_children(&params)
                .into_iter()
                .filter_map(|p| match p.kind() {
                    "identifier" => Some(text(&p, src).to_string()),
                    "assignment_pattern" => p
                        .child_by_field_name("left")
                        .filter(|l| l.kind() == "identifier")
                        .map(|l| text(&l, src).to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyscan_core::{BehaviorRef, Placement, Severity};

    fn scan(src: &str) -> ScannedFile {
        JavaScriptScanner::new().scan(
            &SourceFile::new("lib.js", src),
            &ScannerConfig::default(),
        )
    }

    fn named<'a>(result: &'a ScannedFile, name: &str) -> &'a Entity {
        result
            .entities
            .iter()
            .find(|e| e.name == name)
            .unwrap_or_else(|| panic!("no entity named {name}"))
    }

    fn codes(result: &ScannedFile) -> Vec<String> {
        result.diagnostics.iter().map(|d| d.code.clone()).collect()
    }

    #[test]
    fn plain_class_with_heritage() {
        let r = scan("class Foo extends Bar.Base {\n  run(a, b = 1) { return a; }\n}\n");
        assert_eq!(r.entities.len(), 1);
        let foo = named(&r, "Foo");
        let class = foo.as_class().unwrap();
        assert!(matches!(
            &class.heritage,
            Some(HeritageExpr::Reference { path, .. }) if path == "Bar.Base"
        ));
        assert_eq!(foo.members[0].name, "run");
        assert!(foo.members[0].signature.params[1].optional);
        assert!(foo.members[0].signature.returns_value);
        assert_eq!(foo.placement, Placement::Pending);
    }

    #[test]
    fn arrow_mixin_with_inner_class() {
        let r = scan(
            "/** @mixinFunction */\nconst M = (base) => class extends base {\n  m() {}\n};\n",
        );
        let m = named(&r, "M");
        let data = m.as_mixin().unwrap();
        let inner = &r.entities[data.inner.unwrap().index()];
        assert_eq!(inner.as_class().unwrap().inner_of, Some(m.id));
        assert!(matches!(
            inner.as_class().unwrap().heritage,
            Some(HeritageExpr::Parameter { .. })
        ));
        assert_eq!(inner.members[0].name, "m");
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn wrapped_mixin_returning_declared_class() {
        let r = scan(
            "Polymer.ElementMixin = Polymer.dedupingMixin(base => {\n  class PolymerElement extends base { ready() {} }\n  return PolymerElement;\n});\n",
        );
        let m = named(&r, "ElementMixin");
        assert!(m.as_mixin().unwrap().inner.is_some());
        assert_eq!(
            m.target,
            LexicalTarget::Chain {
                segments: vec!["Polymer".into(), "ElementMixin".into()]
            }
        );
        // the inner declaration is not a separate top-level class
        assert_eq!(
            r.entities
                .iter()
                .filter(|e| e.name == "PolymerElement")
                .count(),
            1
        );
    }

    #[test]
    fn ambiguous_mixin() {
        let r = scan(
            "function M(base) {\n  if (x) { return class extends base {}; }\n  return class extends base { b() {} };\n}\n",
        );
        let m = named(&r, "M");
        assert!(m.as_mixin().unwrap().ambiguous);
        assert!(m.as_mixin().unwrap().inner.is_none());
        assert_eq!(codes(&r), vec!["PS008"]);
    }

    #[test]
    fn annotation_overrides_syntax() {
        let r = scan("/** @polymerBehavior */\nclass NotAClass { a() {} }\n");
        let e = named(&r, "NotAClass");
        assert!(matches!(e.kind, EntityKind::Behavior(BehaviorData::Object)));
        assert_eq!(e.members.len(), 1);
        assert_eq!(codes(&r), vec!["PS002"]);
    }

    #[test]
    fn composite_behavior_keeps_order_and_dynamic_elements() {
        let r = scan(
            "/** @polymerBehavior */\nPolymer.FooBehavior = [Polymer.B1, Polymer.B2, make(), Polymer.B1];\n",
        );
        let e = named(&r, "FooBehavior");
        let EntityKind::Behavior(BehaviorData::Composite { elements }) = &e.kind else {
            panic!("expected composite behavior");
        };
        assert_eq!(elements.len(), 4);
        assert!(matches!(&elements[2], BehaviorRef::Dynamic { text, .. } if text == "make()"));
    }

    #[test]
    fn behavior_naming_convention_needs_legacy_file() {
        let plain = scan("const FooBehavior = { a: 1 };\n");
        assert!(plain.entities.is_empty());

        let legacy = scan(
            "const FooBehavior = { go() {} };\nPolymer({ is: 'x-foo', behaviors: [FooBehavior] });\n",
        );
        assert_eq!(legacy.entities.len(), 2);
        let behavior = named(&legacy, "FooBehavior");
        assert_eq!(behavior.id, EntityId(1));
        assert_eq!(behavior.members[0].name, "go");
    }

    #[test]
    fn legacy_registration() {
        let r = scan(
            "Polymer({\n  is: 'paper-button',\n  behaviors: [Polymer.IronButtonState],\n  properties: {\n    raised: { type: Boolean, readOnly: true },\n    label: String\n  },\n  tap() {}\n});\n",
        );
        let e = named(&r, "PaperButtonElement");
        let class = e.as_class().unwrap();
        assert_eq!(class.tag_name.as_deref(), Some("paper-button"));
        assert_eq!(class.behaviors.len(), 1);
        let names: Vec<&str> = e.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["raised", "label", "tap"]);
        assert_eq!(e.members[0].declared_type.as_deref(), Some("boolean"));
        assert_eq!(e.target, LexicalTarget::None);
    }

    #[test]
    fn namespace_object_members() {
        let r = scan(
            "/** @namespace */\nPolymer.Async = {\n  run(fn, delay) {},\n  /** @namespace */\n  timeOut: { after(d) { return d; } },\n  x: 1\n};\n",
        );
        let ns = named(&r, "Async");
        assert!(ns.as_namespace().is_some());
        let run = named(&r, "run");
        assert_eq!(
            run.target,
            LexicalTarget::Owned {
                owner: ns.id,
                name: "run".into()
            }
        );
        let timeout = named(&r, "timeOut");
        assert!(timeout.as_namespace().is_some());
        let after = named(&r, "after");
        assert!(matches!(&after.target, LexicalTarget::Owned { owner, .. } if *owner == timeout.id));
        assert!(r.entities.iter().all(|e| e.name != "x"));
    }

    #[test]
    fn computed_assignment_target() {
        let r = scan("/** @polymerBehavior */\nNS[key] = { a() {} };\n");
        let e = &r.entities[0];
        assert!(matches!(&e.target, LexicalTarget::Computed { object, key, .. } if object == "NS" && key == "key"));
    }

    #[test]
    fn computed_target_without_annotation() {
        let r = scan("Namespace[key] = { go() {} };\n");
        assert_eq!(r.entities.len(), 1);
        let e = &r.entities[0];
        assert!(matches!(e.kind, EntityKind::Behavior(BehaviorData::Object)));
        assert_eq!(e.members[0].name, "go");
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn computed_key_inside_chain() {
        let r = scan("/** @polymerBehavior */\nNS[key].Foo = { go() {} };\n");
        assert_eq!(r.entities.len(), 1);
        let e = named(&r, "Foo");
        assert_eq!(
            e.target,
            LexicalTarget::Computed {
                object: "NS".into(),
                key: "key".into(),
                rest: vec!["Foo".into()]
            }
        );
    }

    #[test]
    fn republished_binding_is_kept() {
        let r = scan("aliasToNamespace = { go() {} };\nPolymer.X = aliasToNamespace;\nconst unused = { a: 1 };\n");
        assert_eq!(r.entities.len(), 1);
        let e = named(&r, "aliasToNamespace");
        assert!(matches!(e.kind, EntityKind::Behavior(BehaviorData::Object)));
        assert_eq!(
            e.target,
            LexicalTarget::Binding {
                name: "aliasToNamespace".into()
            }
        );
        assert_eq!(r.aliases[0].source, "aliasToNamespace");
    }

    #[test]
    fn bare_mixin_application() {
        let r = scan("Polymer.Element = Polymer.ElementMixin(HTMLElement);\nconst x = compute(1);\n");
        assert_eq!(r.entities.len(), 1);
        let e = named(&r, "Element");
        let class = e.as_class().unwrap();
        assert!(class.synthesized);
        assert!(matches!(
            &class.heritage,
            Some(HeritageExpr::MixinCall { callee, .. }) if callee == "Polymer.ElementMixin"
        ));
    }

    #[test]
    fn aliases_and_global_prefix() {
        let r = scan("window.Polymer.Foo = Foo;\n(function() { function helper() {} })();\n");
        assert_eq!(r.aliases.len(), 1);
        assert_eq!(r.aliases[0].source, "Foo");
        assert_eq!(
            r.aliases[0].target,
            LexicalTarget::Chain {
                segments: vec!["Polymer".into(), "Foo".into()]
            }
        );
        // functions in an immediately invoked wrapper still count as top level
        assert!(r.entities.iter().any(|e| e.name == "helper"));
    }

    #[test]
    fn nested_helpers_are_skipped() {
        let r = scan("function outer() { function inner() {} const f = () => 1; }\n");
        let names: Vec<&str> = r.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["outer"]);
    }

    #[test]
    fn dynamic_imports() {
        let r = scan("import('./a.js');\nimport(path);\n");
        assert_eq!(r.imports.len(), 1);
        assert_eq!(r.imports[0].specifier, "./a.js");
        assert_eq!(codes(&r), vec!["PS004"]);
    }

    #[test]
    fn syntax_errors_are_reported_not_fatal() {
        let r = scan("class A {}\nclass {{{\n");
        assert!(r
            .diagnostics
            .iter()
            .any(|d| d.code == "PS010" && d.severity == Severity::Error));
    }

    #[test]
    fn empty_source() {
        let r = scan("");
        assert!(r.entities.is_empty());
        assert!(r.diagnostics.is_empty());
    }
}
