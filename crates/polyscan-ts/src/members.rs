//! Member and signature extraction.
//!
//! Members come from class bodies, from object literals (behaviors and
//! legacy registrations) and from legacy `properties` descriptor blocks.

use polyscan_core::{
    Annotation, DiagnosticKind, Member, MemberKind, Param, Privacy, Signature, SourceSpan,
};
use tree_sitter::Node;

use crate::javascript::FileScan;
use crate::syntax::{
    has_token, is_function, named_children, property_name, return_value, returns, unwrap_parens,
};

/// Registration keys that configure an element rather than declare API.
const CONFIG_KEYS: &[&str] = &[
    "is",
    "extends",
    "behaviors",
    "properties",
    "observers",
    "listeners",
    "hostAttributes",
    "keyBindings",
];

/// Closure type of a `properties` descriptor constructor.
fn descriptor_type(constructor: &str) -> Option<&'static str> {
    match constructor {
        "String" => Some("string"),
        "Number" => Some("number"),
        "Boolean" => Some("boolean"),
        "Array" => Some("Array"),
        "Object" => Some("Object"),
        "Date" => Some("Date"),
        "Function" => Some("Function"),
        _ => None,
    }
}

/// Closure type of a literal initializer.
fn literal_type(value: &Node<'_>) -> Option<&'static str> {
    match value.kind() {
        "string" | "template_string" => Some("string"),
        "number" => Some("number"),
        "true" | "false" => Some("boolean"),
        _ => None,
    }
}

impl FileScan<'_> {
    /// Members declared in a class body, in source order.
    pub(crate) fn class_members(&mut self, class: Node<'_>) -> Vec<Member> {
        let Some(body) = class.child_by_field_name("body") else {
            return Vec::new();
        };
        let mut members = Vec::new();
        for child in named_children(&body) {
            match child.kind() {
                "method_definition" => members.extend(self.method_member(child, false)),
                "field_definition" | "public_field_definition" => {
                    members.extend(self.field_member(child));
                }
                _ => {}
            }
        }
        members
    }

    /// Members declared in an object literal.
    ///
    /// With `config_keys`, registration keys are skipped and a `properties`
    /// block is expanded into property members.
    pub(crate) fn object_members(&mut self, object: Node<'_>, config_keys: bool) -> Vec<Member> {
        let mut members = Vec::new();
        for child in named_children(&object) {
            match child.kind() {
                "pair" => {
                    let (Some(key), Some(value)) = (
                        child.child_by_field_name("key"),
                        child.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    let Some(name) = self.member_name(&key) else {
                        continue;
                    };
                    let value = unwrap_parens(value);
                    if config_keys && CONFIG_KEYS.contains(&name.as_str()) {
                        if name == "properties" && value.kind() == "object" {
                            members.extend(self.property_members(value));
                        }
                        continue;
                    }
                    let annotation = self.annotation(&child);
                    let span = self.span(&child);
                    let entry = if is_function(&value) {
                        let signature = self.signature(value, annotation.as_ref());
                        member(name, MemberKind::Method, signature, annotation, span)
                    } else {
                        let mut m = member(
                            name,
                            MemberKind::Property,
                            Signature::default(),
                            annotation,
                            span,
                        );
                        if m.declared_type.is_none() {
                            m.declared_type = literal_type(&value).map(String::from);
                        }
                        m
                    };
                    members.push(entry);
                }
                "method_definition" => members.extend(self.method_member(child, true)),
                "shorthand_property_identifier" => {
                    let name = self.text(&child).to_string();
                    let annotation = self.annotation(&child);
                    let span = self.span(&child);
                    members.push(member(
                        name,
                        MemberKind::Property,
                        Signature::default(),
                        annotation,
                        span,
                    ));
                }
                _ => {}
            }
        }
        members
    }

    /// Expands a legacy `properties: { name: Type | { type: Type, ... } }` block.
    pub(crate) fn property_members(&mut self, block: Node<'_>) -> Vec<Member> {
        let mut members = Vec::new();
        for pair in named_children(&block) {
            if pair.kind() != "pair" {
                continue;
            }
            let (Some(key), Some(value)) = (
                pair.child_by_field_name("key"),
                pair.child_by_field_name("value"),
            ) else {
                continue;
            };
            let Some(name) = self.member_name(&key) else {
                continue;
            };
            let value = unwrap_parens(value);
            let mut kind = MemberKind::Property;
            let constructor = match value.kind() {
                "identifier" => Some(self.text(&value)),
                "object" => {
                    let mut found = None;
                    for field in named_children(&value) {
                        if field.kind() != "pair" {
                            continue;
                        }
                        let (Some(k), Some(v)) = (
                            field.child_by_field_name("key"),
                            field.child_by_field_name("value"),
                        ) else {
                            continue;
                        };
                        match self.text(&k) {
                            "type" => found = Some(self.text(&v)),
                            "readOnly" if v.kind() == "true" => kind = MemberKind::Getter,
                            _ => {}
                        }
                    }
                    found
                }
                _ => None,
            };
            let annotation = self.annotation(&pair);
            let span = self.span(&pair);
            let mut m = member(name, kind, Signature::default(), annotation, span);
            if m.declared_type.is_none() {
                m.declared_type = constructor
                    .and_then(descriptor_type)
                    .map(String::from);
            }
            members.push(m);
        }
        members
    }

    fn method_member(&mut self, node: Node<'_>, in_object: bool) -> Vec<Member> {
        let Some(key) = node.child_by_field_name("name") else {
            return Vec::new();
        };
        let Some(name) = self.member_name(&key) else {
            return Vec::new();
        };
        let is_static = has_token(&node, "static") || has_token(&node, "static get");
        let kind = if has_token(&node, "get") || has_token(&node, "static get") {
            MemberKind::Getter
        } else if has_token(&node, "set") {
            MemberKind::Setter
        } else {
            MemberKind::Method
        };
        if !in_object && !is_static && name == "constructor" {
            return Vec::new();
        }
        if !in_object && is_static && kind == MemberKind::Getter && name == "properties" {
            if let Some(block) = self.returned_object(node) {
                return self.property_members(block);
            }
        }

        let annotation = self.annotation(&node);
        let span = self.span(&node);
        let signature = self.signature(node, annotation.as_ref());
        let mut m = member(name, kind, signature, annotation, span);
        m.is_static = is_static;
        if kind == MemberKind::Getter && m.declared_type.is_none() {
            m.declared_type = m.signature.return_type.clone();
        }
        vec![m]
    }

    fn field_member(&mut self, node: Node<'_>) -> Option<Member> {
        let key = node
            .child_by_field_name("property")
            .or_else(|| node.child_by_field_name("name"))?;
        let name = self.member_name(&key)?;
        let annotation = self.annotation(&node);
        let span = self.span(&node);
        let value = node.child_by_field_name("value").map(unwrap_parens);
        let mut m = match value {
            Some(value) if is_function(&value) => {
                let signature = self.signature(value, annotation.as_ref());
                member(name, MemberKind::Method, signature, annotation, span)
            }
            _ => {
                let mut m = member(
                    name,
                    MemberKind::Property,
                    Signature::default(),
                    annotation,
                    span,
                );
                if m.declared_type.is_none() {
                    m.declared_type = value.as_ref().and_then(literal_type).map(String::from);
                }
                m
            }
        };
        m.is_static = has_token(&node, "static");
        Some(m)
    }

    /// Member name of a key; computed keys that are not literals are reported.
    fn member_name(&mut self, key: &Node<'_>) -> Option<String> {
        match property_name(key, self.src) {
            Ok(name) => Some(name),
            Err(raw) => {
                let span = self.span(key);
                self.out.diagnostics.report(
                    DiagnosticKind::DynamicConstruct,
                    span,
                    format!("computed member name {raw} cannot be resolved statically"),
                );
                None
            }
        }
    }

    /// Object literal returned directly by a method body.
    fn returned_object<'t>(&self, method: Node<'t>) -> Option<Node<'t>> {
        let body = method.child_by_field_name("body")?;
        returns(&body)
            .iter()
            .filter_map(return_value)
            .map(unwrap_parens)
            .find(|v| v.kind() == "object")
    }

    /// Signature of a function, method or arrow, typed from its documentation.
    pub(crate) fn signature(&self, function: Node<'_>, annotation: Option<&Annotation>) -> Signature {
        Signature {
            params: self.params(function, annotation),
            return_type: annotation.and_then(Annotation::returns).map(String::from),
            returns_value: returns_value(function),
        }
    }

    /// Signature built only from `@param` and `@return` tags.
    pub(crate) fn signature_from_doc(&self, annotation: Option<&Annotation>) -> Signature {
        let params = annotation
            .map(|a| {
                a.params()
                    .into_iter()
                    .map(|doc| Param {
                        name: doc.name.clone(),
                        ty: doc.ty.clone(),
                        optional: doc.optional,
                        rest: doc.rest,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Signature {
            params,
            return_type: annotation.and_then(Annotation::returns).map(String::from),
            returns_value: false,
        }
    }

    fn params(&self, function: Node<'_>, annotation: Option<&Annotation>) -> Vec<Param> {
        let documented = annotation.map(Annotation::params).unwrap_or_default();
        let mut params = Vec::new();
        if let Some(single) = function.child_by_field_name("parameter") {
            params.push(Param::new(self.text(&single)));
        } else if let Some(list) = function.child_by_field_name("parameters") {
            for (index, p) in named_children(&list).into_iter().enumerate() {
                let fallback = || {
                    documented
                        .get(index)
                        .map_or_else(|| format!("arg{index}"), |d| d.name.clone())
                };
                let param = match p.kind() {
                    "identifier" => Param::new(self.text(&p)),
                    "assignment_pattern" => {
                        let name = p
                            .child_by_field_name("left")
                            .filter(|l| l.kind() == "identifier")
                            .map_or_else(fallback, |l| self.text(&l).to_string());
                        Param {
                            optional: true,
                            ..Param::new(name)
                        }
                    }
                    "rest_pattern" => {
                        let name = named_children(&p)
                            .into_iter()
                            .find(|c| c.kind() == "identifier")
                            .map_or_else(fallback, |c| self.text(&c).to_string());
                        Param {
                            rest: true,
                            ..Param::new(name)
                        }
                    }
                    _ => Param::new(fallback()),
                };
                params.push(param);
            }
        }

        for param in &mut params {
            if let Some(doc) = documented.iter().find(|d| d.name == param.name) {
                param.ty.clone_from(&doc.ty);
                param.optional |= doc.optional;
                param.rest |= doc.rest;
            }
        }
        params
    }
}

/// Whether a function produces a value: an expression body, or a
/// `return <expr>` in its own body.
fn returns_value(function: Node<'_>) -> bool {
    let Some(body) = function.child_by_field_name("body") else {
        return false;
    };
    if body.kind() != "statement_block" {
        return true;
    }
    returns(&body).iter().any(|r| return_value(r).is_some())
}

fn member(
    name: String,
    kind: MemberKind,
    signature: Signature,
    annotation: Option<Annotation>,
    span: SourceSpan,
) -> Member {
    let visibility = annotation.as_ref().and_then(Annotation::visibility);
    let declared_type = annotation
        .as_ref()
        .and_then(Annotation::declared_type)
        .map(String::from);
    let description = annotation
        .as_ref()
        .and_then(|a| a.description.clone().or_else(|| a.summary.clone()));
    Member {
        privacy: Privacy::from_name(&name).with_visibility(visibility),
        name,
        kind,
        is_static: false,
        signature,
        declared_type,
        description,
        span,
    }
}
