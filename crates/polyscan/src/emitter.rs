//! Declaration emitter.
//!
//! Projects a frozen [`SemanticModel`] into ambient TypeScript
//! declarations, one document per analyzed file. Output depends only on
//! the model, so emitting the same model twice is byte-identical.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use polyscan_core::{
    BehaviorData, EmitterConfig, Entity, EntityKind, Member, MemberKind, Placement, Privacy,
    Relation, Resolution, SemanticModel, Signature, UnresolvedReason,
};

/// Renders declaration documents from a model.
pub struct Emitter<'a> {
    model: &'a SemanticModel,
    config: &'a EmitterConfig,
}

/// Where an item is rendered; changes the keywords used.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    Namespace,
}

impl Scope {
    fn declare(self) -> &'static str {
        match self {
            Self::Root => "declare ",
            Self::Namespace => "",
        }
    }
}

/// Member rendering context.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Container {
    Class,
    Interface,
}

impl<'a> Emitter<'a> {
    /// Creates an emitter over a frozen model.
    #[must_use]
    pub fn new(model: &'a SemanticModel, config: &'a EmitterConfig) -> Self {
        Self { model, config }
    }

    /// Emits every analyzed file in path order.
    #[must_use]
    pub fn emit_all(&self) -> Vec<(PathBuf, String)> {
        let mut files: Vec<&PathBuf> = self.model.files().iter().collect();
        files.sort();
        files
            .into_iter()
            .map(|file| (file.clone(), self.emit_file(file)))
            .collect()
    }

    /// Emits the declarations of one file.
    #[must_use]
    pub fn emit_file(&self, file: &Path) -> String {
        let mut entities: Vec<&Entity> = self
            .model
            .entities_in_file(file)
            .filter(|e| self.is_emitted(e))
            .collect();
        entities.sort_by_key(|e| (e.span.start, e.id));

        let mut root: Vec<&Entity> = Vec::new();
        let mut namespaces: IndexMap<String, Vec<&Entity>> = IndexMap::new();
        for entity in entities {
            match (&entity.kind, &entity.placement) {
                (EntityKind::Namespace(ns), _) => {
                    namespaces.entry(ns.path.clone()).or_default();
                }
                (_, Placement::Root) => root.push(entity),
                (_, Placement::Namespace(path)) => {
                    namespaces.entry(path.clone()).or_default().push(entity);
                }
                _ => {}
            }
        }
        let mut blocks: Vec<(String, Vec<&Entity>)> = namespaces.into_iter().collect();
        blocks.sort_by_key(|(path, _)| path.matches('.').count());

        let mut out = String::new();
        out.push_str(&self.config.header);
        out.push('\n');
        for entity in root {
            out.push('\n');
            self.entity(&mut out, entity, Scope::Root, 0);
        }
        for (path, items) in blocks {
            out.push('\n');
            if items.is_empty() {
                out.push_str(&format!("declare namespace {path} {{}}\n"));
                continue;
            }
            out.push_str(&format!("declare namespace {path} {{\n"));
            for (i, entity) in items.into_iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                self.entity(&mut out, entity, Scope::Namespace, 1);
            }
            out.push_str("}\n");
        }
        out
    }

    fn is_emitted(&self, entity: &Entity) -> bool {
        let placed = matches!(entity.placement, Placement::Root | Placement::Namespace(_));
        let inner = entity.as_class().is_some_and(|c| c.inner_of.is_some());
        let implicit = entity.as_namespace().is_some_and(|ns| ns.implicit);
        placed && entity.is_public() && !inner && !implicit
    }

    fn pad(&self, level: usize) -> String {
        " ".repeat(self.config.indent * level)
    }

    fn entity(&self, out: &mut String, entity: &Entity, scope: Scope, level: usize) {
        match &entity.kind {
            EntityKind::Class(class) => {
                let synthesized = class.synthesized || !class.behaviors.is_empty();
                let mut head = format!("{}{}class {}", self.pad(level), scope.declare(), entity.name);
                let members = if synthesized {
                    entity.composed_members.as_slice()
                } else {
                    if let Some(base) = self.base(entity) {
                        head.push_str(&format!(" extends {base}"));
                    }
                    let implemented = self.targets(entity, &[Relation::AppliesMixin, Relation::IncludesBehavior]);
                    if !implemented.is_empty() {
                        head.push_str(&format!(" implements {}", implemented.join(", ")));
                    }
                    entity.members.as_slice()
                };
                self.body(out, &head, members, Container::Class, level);
            }
            EntityKind::MixinFactory(mixin) => {
                let name = &entity.name;
                let pad = self.pad(level);
                out.push_str(&format!(
                    "{pad}{}function {name}<T extends new (...args: any[]) => {{}}>(base: T): T & {name}Constructor;\n",
                    scope.declare()
                ));
                let members: &[Member] = mixin
                    .inner
                    .and_then(|id| self.model.entity(id))
                    .map_or(entity.members.as_slice(), |inner| inner.members.as_slice());
                let (statics, instance): (Vec<Member>, Vec<Member>) =
                    members.iter().cloned().partition(|m| m.is_static);

                out.push('\n');
                let mut ctor = vec![format!("{}new(...args: any[]): {name};", self.pad(level + 1))];
                ctor.extend(self.members(&statics, Container::Interface, level + 1));
                out.push_str(&format!("{pad}interface {name}Constructor {{\n"));
                for line in ctor {
                    out.push_str(&line);
                    out.push('\n');
                }
                out.push_str(&format!("{pad}}}\n"));

                out.push('\n');
                let mut head = format!("{pad}interface {name}");
                let parents = self.targets(entity, &[Relation::AppliesMixin, Relation::IncludesBehavior]);
                if !parents.is_empty() {
                    head.push_str(&format!(" extends {}", parents.join(", ")));
                }
                self.body(out, &head, &instance, Container::Interface, level);
            }
            EntityKind::Behavior(form) => {
                let pad = self.pad(level);
                let mut head = format!("{pad}interface {}", entity.name);
                let members: &[Member] = match form {
                    BehaviorData::Object => &entity.members,
                    BehaviorData::Composite { .. } => {
                        let parents = self.targets(entity, &[Relation::IncludesBehavior]);
                        if !parents.is_empty() {
                            head.push_str(&format!(" extends {}", parents.join(", ")));
                        }
                        &[]
                    }
                };
                self.body(out, &head, members, Container::Interface, level);
                out.push('\n');
                out.push_str(&format!("{pad}{}const {}: object;\n", scope.declare(), entity.name));
            }
            EntityKind::FreeFunction(signature) => {
                out.push_str(&format!(
                    "{}{}function {}{};\n",
                    self.pad(level),
                    scope.declare(),
                    entity.name,
                    callable(signature)
                ));
            }
            EntityKind::Namespace(_) => {}
        }
    }

    fn body(&self, out: &mut String, head: &str, members: &[Member], container: Container, level: usize) {
        let lines = self.members(members, container, level + 1);
        if lines.is_empty() {
            out.push_str(&format!("{head} {{}}\n"));
            return;
        }
        out.push_str(&format!("{head} {{\n"));
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&format!("{}}}\n", self.pad(level)));
    }

    /// Superclass text: the canonical path when resolved, the written
    /// reference when it simply was not found, nothing otherwise.
    fn base(&self, entity: &Entity) -> Option<String> {
        self.model
            .edges_of(entity.id)
            .into_iter()
            .find(|e| e.relation == Relation::Extends)
            .and_then(|edge| match &edge.state {
                Resolution::Resolved(id) => self.reference(*id),
                Resolution::Unresolved(UnresolvedReason::NotFound) => Some(edge.target.clone()),
                Resolution::Unresolved(_) => None,
            })
    }

    /// Resolved targets of the given relations, deduplicated, in edge order.
    fn targets(&self, entity: &Entity, relations: &[Relation]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for edge in self.model.edges_of(entity.id) {
            if !relations.contains(&edge.relation) {
                continue;
            }
            if let Some(name) = edge.state.entity().and_then(|id| self.reference(id)) {
                if !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        out
    }

    fn reference(&self, id: polyscan_core::EntityId) -> Option<String> {
        let target = self.model.entity(id)?;
        target.canonical_path().or_else(|| Some(target.name.clone()))
    }

    fn members(&self, members: &[Member], container: Container, level: usize) -> Vec<String> {
        let pad = self.pad(level);
        let mut lines = Vec::new();
        let mut accessors: Vec<(bool, &str)> = Vec::new();
        for member in members {
            if member.privacy == Privacy::Private {
                continue;
            }
            let mut modifiers = String::new();
            if container == Container::Class {
                if member.privacy == Privacy::Protected {
                    modifiers.push_str("protected ");
                }
                if member.is_static {
                    modifiers.push_str("static ");
                }
            }
            let name = property_key(&member.name);
            let line = match member.kind {
                MemberKind::Method => {
                    format!("{pad}{modifiers}{name}{};", callable(&member.signature))
                }
                MemberKind::Getter | MemberKind::Setter => {
                    let key = member.merge_key();
                    if accessors.contains(&key) {
                        continue;
                    }
                    accessors.push(key);
                    let has_setter = members.iter().any(|m| {
                        m.kind == MemberKind::Setter && m.merge_key() == key
                    });
                    let readonly = if has_setter { "" } else { "readonly " };
                    let ty = accessor_type(members, key);
                    format!("{pad}{modifiers}{readonly}{name}: {ty};")
                }
                MemberKind::Property => {
                    let ty = member.declared_type.as_deref().map_or_else(|| "any".to_string(), ts_type);
                    format!("{pad}{modifiers}{name}: {ty};")
                }
            };
            lines.push(line);
        }
        lines
    }
}

/// Type of a getter/setter pair: the getter's, else the setter's parameter.
fn accessor_type(members: &[Member], key: (bool, &str)) -> String {
    let pair: Vec<&Member> = members.iter().filter(|m| m.merge_key() == key).collect();
    pair.iter()
        .find_map(|m| m.declared_type.clone())
        .or_else(|| {
            pair.iter()
                .filter(|m| m.kind == MemberKind::Setter)
                .find_map(|m| m.signature.params.first().and_then(|p| p.ty.clone()))
        })
        .map_or_else(|| "any".to_string(), |t| ts_type(&t))
}

/// `(a: T, b?: U): R` for a signature.
fn callable(signature: &Signature) -> String {
    let params: Vec<String> = signature
        .params
        .iter()
        .map(|p| {
            let ty = p.ty.as_deref().map_or_else(|| "any".to_string(), ts_type);
            if p.rest {
                let ty = if p.ty.is_some() { format!("{}[]", array_element(&ty)) } else { "any[]".to_string() };
                format!("...{}: {ty}", p.name)
            } else if p.optional {
                format!("{}?: {ty}", p.name)
            } else {
                format!("{}: {ty}", p.name)
            }
        })
        .collect();
    let ret = match (&signature.return_type, signature.returns_value) {
        (Some(t), _) => ts_type(t),
        (None, true) => "any".to_string(),
        (None, false) => "void".to_string(),
    };
    format!("({}): {ret}", params.join(", "))
}

fn array_element(ty: &str) -> String {
    if ty.contains('|') {
        format!("({ty})")
    } else {
        ty.to_string()
    }
}

fn property_key(name: &str) -> String {
    let plain = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "\\'"))
    }
}

/// Converts a Closure-style documented type to TypeScript.
///
/// `?T` becomes `T|null`, `!T` is `T`, `*` and `?` are `any`, boxed
/// primitives are lowered, `Array.<T>` is `Array<T>`, `Object.<K, V>` is an
/// index signature and `function(...)` is `Function`. Unknown names pass
/// through.
#[must_use]
pub fn ts_type(closure: &str) -> String {
    let ty = closure.trim();
    let ty = ty.strip_prefix("...").unwrap_or(ty);
    let ty = ty.strip_suffix('=').unwrap_or(ty).trim();
    if ty.is_empty() || ty == "*" || ty == "?" {
        return "any".to_string();
    }
    if let Some(inner) = ty.strip_prefix('!') {
        return ts_type(inner);
    }
    if let Some(inner) = ty.strip_prefix('?') {
        let inner = ts_type(inner);
        return if inner == "any" { inner } else { format!("{inner}|null") };
    }
    if ty.starts_with('(') && ty.ends_with(')') && balanced(&ty[1..ty.len() - 1]) {
        return ts_type(&ty[1..ty.len() - 1]);
    }
    let alternatives = split_top(ty, '|');
    if alternatives.len() > 1 {
        return alternatives.iter().map(|a| ts_type(a)).collect::<Vec<_>>().join("|");
    }
    if ty.starts_with("function(") || ty.starts_with("function (") {
        return "Function".to_string();
    }
    if ty.starts_with('{') {
        return ty.to_string();
    }
    if let Some(open) = ty.find('<') {
        if ty.ends_with('>') {
            let name = ty[..open].trim_end_matches('.');
            let args: Vec<String> = split_top(&ty[open + 1..ty.len() - 1], ',')
                .iter()
                .map(|a| ts_type(a))
                .collect();
            return match (name, args.as_slice()) {
                ("Array", [element]) => format!("{}[]", array_element(element)),
                ("Object", [key, value]) if key == "string" || key == "number" => {
                    format!("{{[key: {key}]: {value}}}")
                }
                _ => format!("{name}<{}>", args.join(", ")),
            };
        }
    }
    match ty {
        "String" => "string".to_string(),
        "Number" => "number".to_string(),
        "Boolean" => "boolean".to_string(),
        "Object" => "object".to_string(),
        "Array" => "any[]".to_string(),
        other => other.to_string(),
    }
}

fn balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '(' | '<' | '{' => depth += 1,
            ')' | '>' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Splits on `sep` outside any brackets.
fn split_top(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '<' | '{' | '[' => depth += 1,
            ')' | '>' | '}' | ']' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}
