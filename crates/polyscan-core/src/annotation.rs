//! Structured documentation comment parsing.
//!
//! Turns the raw text of a `/** ... */` comment into an [`Annotation`]:
//! free text, `@summary`/`@description`, and a list of tags. Unknown tags
//! are preserved verbatim. A malformed tag is reported as a low-severity
//! [`DiagnosticKind::AnnotationSyntax`] diagnostic and dropped; the rest of
//! the comment is still parsed.

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
use crate::span::SourceSpan;

/// Entity kind declared by a kind-marker tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclaredKind {
    /// `@customElement`, `@class`
    Class,
    /// `@mixinFunction`, `@mixin`
    MixinFactory,
    /// `@polymerBehavior`
    Behavior,
    /// `@namespace`
    Namespace,
    /// `@function`
    FreeFunction,
}

impl std::fmt::Display for DeclaredKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Class => "class",
            Self::MixinFactory => "mixin",
            Self::Behavior => "behavior",
            Self::Namespace => "namespace",
            Self::FreeFunction => "function",
        };
        f.write_str(s)
    }
}

/// Visibility marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// `@public`
    Public,
    /// `@global`
    Global,
    /// `@protected`
    Protected,
    /// `@private`
    Private,
}

/// A documented parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDoc {
    /// Parameter name.
    pub name: String,
    /// Declared type with optional/rest markers removed.
    pub ty: Option<String>,
    /// `{T=}` or `[name]`.
    pub optional: bool,
    /// `{...T}`.
    pub rest: bool,
    /// Free text after the name.
    pub description: String,
}

/// Parsed value of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum TagValue {
    /// Kind marker, optionally naming the entity or path.
    Kind {
        /// Declared kind.
        kind: DeclaredKind,
        /// Name or dotted path given after the tag.
        name: Option<String>,
    },
    /// Single dotted reference (`@extends`, `@memberof`).
    Reference(String),
    /// Ordered references (`@mixes`, `@appliesMixin`).
    References(Vec<String>),
    /// Visibility marker.
    Visibility(Visibility),
    /// `@param`.
    Param(ParamDoc),
    /// `@return` / `@returns` type.
    Returns(String),
    /// `@type`.
    Type(String),
    /// Free text, used for prose and unknown tags.
    Text(String),
}

/// One `@tag value` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name as written, without `@`.
    pub name: String,
    /// Raw value text, trimmed.
    pub raw: String,
    /// Parsed value.
    pub value: TagValue,
}

/// Parsed documentation comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// `@summary` text.
    pub summary: Option<String>,
    /// Leading free text or `@description` text.
    pub description: Option<String>,
    /// Tags in source order.
    pub tags: Vec<Tag>,
    /// First kind marker found.
    pub kind: Option<DeclaredKind>,
    /// Location of the comment.
    pub span: SourceSpan,
}

impl Annotation {
    /// Parses a documentation comment.
    ///
    /// Returns `None` for comments that are not `/** ... */` blocks.
    pub fn parse(text: &str, span: &SourceSpan, diagnostics: &mut Diagnostics) -> Option<Self> {
        if text.starts_with("/***") {
            return None;
        }
        let body = text.strip_prefix("/**")?.strip_suffix("*/").unwrap_or("");

        let mut lines: Vec<(usize, String)> = Vec::new();
        for (index, line) in body.lines().enumerate() {
            let trimmed = line.trim_start();
            let trimmed = trimmed.strip_prefix('*').unwrap_or(trimmed);
            let trimmed = trimmed.strip_prefix(' ').unwrap_or(trimmed);
            lines.push((index, trimmed.trim_end().to_string()));
        }

        let mut free_text: Vec<String> = Vec::new();
        let mut pending: Vec<(usize, String, String)> = Vec::new();
        for (index, line) in lines {
            if let Some(rest) = line.strip_prefix('@') {
                let name_len = rest
                    .char_indices()
                    .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
                    .map_or(rest.len(), |(i, _)| i);
                let (name, value) = rest.split_at(name_len);
                pending.push((index, name.to_string(), value.trim().to_string()));
            } else if let Some(last) = pending.last_mut() {
                if !line.is_empty() {
                    if !last.2.is_empty() {
                        last.2.push(' ');
                    }
                    last.2.push_str(line.trim());
                }
            } else {
                free_text.push(line);
            }
        }

        let mut annotation = Self {
            summary: None,
            description: join_paragraph(&free_text),
            tags: Vec::new(),
            kind: None,
            span: span.clone(),
        };

        for (index, name, raw) in pending {
            let tag_span = line_span(span, index);
            match parse_tag(&name, &raw) {
                Ok(tag) => annotation.push_tag(tag, &tag_span, diagnostics),
                Err(reason) => diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::AnnotationSyntax,
                        tag_span,
                        format!("malformed tag '@{name}': {reason}"),
                    )
                    .with_severity(Severity::Info),
                ),
            }
        }

        Some(annotation)
    }

    fn push_tag(&mut self, tag: Tag, span: &SourceSpan, diagnostics: &mut Diagnostics) {
        match &tag.value {
            TagValue::Kind { kind, .. } => match self.kind {
                None => self.kind = Some(*kind),
                Some(existing) if existing != *kind => diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::KindConflict,
                        span.clone(),
                        format!("conflicting kind markers: {existing} and {kind} (@{})", tag.name),
                    )
                    .with_severity(Severity::Error),
                ),
                Some(_) => {}
            },
            TagValue::Text(text) if tag.name == "summary" => self.summary = Some(text.clone()),
            TagValue::Text(text) if tag.name == "description" && !text.is_empty() => {
                self.description = Some(text.clone());
            }
            _ => {}
        }
        self.tags.push(tag);
    }

    /// Returns the first tag with the given name (case-insensitive).
    #[must_use]
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Returns true if a tag with the given name is present.
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tag(name).is_some()
    }

    /// Name or path given alongside the kind marker, if any.
    #[must_use]
    pub fn kind_name(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| match &t.value {
            TagValue::Kind { name: Some(n), .. } => Some(n.as_str()),
            _ => None,
        })
    }

    /// `@memberof` path.
    #[must_use]
    pub fn memberof(&self) -> Option<&str> {
        self.reference("memberof")
    }

    /// `@extends` / `@augments` target.
    #[must_use]
    pub fn extends(&self) -> Option<&str> {
        self.reference("extends").or_else(|| self.reference("augments"))
    }

    fn reference(&self, name: &str) -> Option<&str> {
        self.tags.iter().find_map(|t| match &t.value {
            TagValue::Reference(r) if t.name.eq_ignore_ascii_case(name) => Some(r.as_str()),
            _ => None,
        })
    }

    /// Mixins listed with `@mixes` / `@appliesMixin`, in documentation order.
    #[must_use]
    pub fn mixes(&self) -> Vec<&str> {
        self.tags
            .iter()
            .filter_map(|t| match &t.value {
                TagValue::References(r) => Some(r.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Explicit visibility marker, if any. The last marker wins.
    #[must_use]
    pub fn visibility(&self) -> Option<Visibility> {
        self.tags.iter().rev().find_map(|t| match t.value {
            TagValue::Visibility(v) => Some(v),
            _ => None,
        })
    }

    /// Documented parameters in order.
    #[must_use]
    pub fn params(&self) -> Vec<&ParamDoc> {
        self.tags
            .iter()
            .filter_map(|t| match &t.value {
                TagValue::Param(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Documented parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamDoc> {
        self.params().into_iter().find(|p| p.name == name)
    }

    /// `@return` type.
    #[must_use]
    pub fn returns(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| match &t.value {
            TagValue::Returns(r) => Some(r.as_str()),
            _ => None,
        })
    }

    /// `@type` type.
    #[must_use]
    pub fn declared_type(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| match &t.value {
            TagValue::Type(r) => Some(r.as_str()),
            _ => None,
        })
    }
}

fn join_paragraph(lines: &[String]) -> Option<String> {
    let text = lines
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn line_span(span: &SourceSpan, line_index: usize) -> SourceSpan {
    if line_index == 0 {
        return span.clone();
    }
    SourceSpan {
        line: span.line + line_index,
        column: 1,
        ..span.clone()
    }
}

fn parse_tag(name: &str, raw: &str) -> Result<Tag, String> {
    if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err("tag name must start with a letter".into());
    }

    let lower = name.to_ascii_lowercase();
    let value = match lower.as_str() {
        "customelement" | "class" => kind(DeclaredKind::Class, raw),
        "mixinfunction" | "mixin" => kind(DeclaredKind::MixinFactory, raw),
        "polymerbehavior" => kind(DeclaredKind::Behavior, raw),
        "namespace" => kind(DeclaredKind::Namespace, raw),
        "function" => kind(DeclaredKind::FreeFunction, raw),
        "memberof" | "extends" | "augments" => {
            let (_, rest) = split_type(raw)?;
            let target = first_word(rest).ok_or("missing target")?;
            TagValue::Reference(target.to_string())
        }
        "mixes" | "appliesmixin" => {
            let names: Vec<String> = raw
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if names.is_empty() {
                return Err("missing mixin name".into());
            }
            TagValue::References(names)
        }
        "public" => TagValue::Visibility(Visibility::Public),
        "global" => TagValue::Visibility(Visibility::Global),
        "protected" => TagValue::Visibility(Visibility::Protected),
        "private" => TagValue::Visibility(Visibility::Private),
        "param" | "arg" | "argument" => TagValue::Param(parse_param(raw)?),
        "return" | "returns" => {
            let (ty, _) = split_type(raw)?;
            TagValue::Returns(ty.ok_or("missing return type")?)
        }
        "type" => {
            let (ty, _) = split_type(raw)?;
            TagValue::Type(ty.ok_or("missing type")?)
        }
        _ => TagValue::Text(raw.to_string()),
    };

    Ok(Tag {
        name: name.to_string(),
        raw: raw.to_string(),
        value,
    })
}

fn kind(kind: DeclaredKind, raw: &str) -> TagValue {
    TagValue::Kind {
        kind,
        name: first_word(raw).map(String::from),
    }
}

fn first_word(s: &str) -> Option<&str> {
    s.split_whitespace().next()
}

/// Splits a leading `{type}` from the rest of the tag value.
fn split_type(raw: &str) -> Result<(Option<String>, &str), String> {
    let raw = raw.trim_start();
    if !raw.starts_with('{') {
        return Ok((None, raw));
    }
    let mut depth = 0usize;
    for (i, c) in raw.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let ty = raw[1..i].trim().to_string();
                    if ty.is_empty() {
                        return Err("empty type expression".into());
                    }
                    return Ok((Some(ty), raw[i + 1..].trim_start()));
                }
            }
            _ => {}
        }
    }
    Err("unbalanced braces in type expression".into())
}

fn parse_param(raw: &str) -> Result<ParamDoc, String> {
    let (ty, rest) = split_type(raw)?;
    let word = first_word(rest).ok_or("missing parameter name")?;
    let description = rest[word.len()..].trim().trim_start_matches('-').trim().to_string();

    let mut optional = false;
    let mut rest_param = false;
    let name = if let Some(inner) = word.strip_prefix('[') {
        optional = true;
        let inner = inner.trim_end_matches(']');
        inner.split('=').next().unwrap_or(inner).to_string()
    } else {
        word.to_string()
    };
    if name.is_empty() {
        return Err("missing parameter name".into());
    }

    let ty = ty.map(|t| {
        let mut t = t.as_str();
        if let Some(stripped) = t.strip_prefix("...") {
            rest_param = true;
            t = stripped;
        }
        if let Some(stripped) = t.strip_suffix('=') {
            optional = true;
            t = stripped;
        }
        t.to_string()
    });

    Ok(ParamDoc {
        name,
        ty,
        optional,
        rest: rest_param,
        description,
    })
}
