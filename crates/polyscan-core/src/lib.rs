//! # polyscan-core
//!
//! Core types for static analysis of JavaScript component libraries.
//!
//! This crate holds everything the pipeline stages share:
//!
//! - [`Annotation`] parsing of `/** ... */` documentation comments
//! - the [`SemanticModel`] and its [`Entity`] variants
//! - [`Diagnostic`]s and the aggregated [`AnalysisReport`]
//! - [`Config`] loaded from `polyscan.toml`
//! - the [`ModelRule`] trait for linting a frozen model

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod annotation;
mod config;
mod context;
mod diagnostic;
pub mod model;
mod rule;
mod span;

pub use annotation::{Annotation, DeclaredKind, ParamDoc, Tag, TagValue, Visibility};
pub use config::{AnalyzerConfig, Config, ConfigError, EmitterConfig, RuleConfig, ScannerConfig};
pub use context::SourceFile;
pub use diagnostic::{
    AnalysisReport, Diagnostic, DiagnosticKind, DiagnosticReport, Diagnostics, Severity,
};
pub use model::{
    BehaviorData, BehaviorRef, ClassData, CompositionEdge, DynamicImport, Entity, EntityId,
    EntityKind, HeritageExpr, LexicalTarget, Member, MemberKind, MixinData, NamespaceData, Param,
    Placement, Privacy, Relation, Resolution, SemanticModel, Signature, UnresolvedReason,
};
pub use rule::{ModelRule, ModelRuleBox};
pub use span::SourceSpan;
