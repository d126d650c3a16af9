//! Integration test: whole-project analysis and declaration output.
//!
//! Uses the fixture project under `tests/fixtures/project/` to drive the
//! pipeline from discovery through emission.

use polyscan::{
    Analysis, Config, DiagnosticKind, EntityId, EntityKind, Pipeline, Placement, Relation,
    Resolution, SemanticModel, SourceFile, UnresolvedReason,
};
use std::path::{Path, PathBuf};

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/project")
}

fn pipeline() -> Pipeline {
    Pipeline::builder()
        .root(fixture_root())
        .rules(polyscan::rules::all_rules(&Config::default()))
        .build()
        .expect("pipeline should build")
}

fn analyze() -> Analysis {
    pipeline()
        .analyze_project()
        .expect("fixture project should analyze")
}

fn id(model: &SemanticModel, path: &str) -> EntityId {
    model
        .lookup(path)
        .unwrap_or_else(|| panic!("{path} should resolve"))
}

fn member_names(model: &SemanticModel, path: &str) -> Vec<String> {
    model
        .effective_members(id(model, path))
        .iter()
        .map(|m| m.name.clone())
        .collect()
}

// ── Discovery ──

#[test]
fn discovers_sources_in_path_order() {
    let files = pipeline().discover().expect("discovery should succeed");
    let relative: Vec<&Path> = files
        .iter()
        .map(|f| f.strip_prefix(fixture_root()).expect("under the root"))
        .collect();
    assert_eq!(
        relative,
        vec![
            Path::new("behaviors.js"),
            Path::new("documented.js"),
            Path::new("lib/namespaces.js"),
            Path::new("mixins.js"),
        ],
        "node_modules should be excluded"
    );
    assert_eq!(analyze().report.files_analyzed, 4);
}

// ── Composition ──

#[test]
fn mixin_application_records_base_and_mixin() {
    let analysis = analyze();
    let model = &analysis.model;

    let m = model.entity(id(model, "M")).expect("M exists");
    let inner = m
        .as_mixin()
        .and_then(|data| data.inner)
        .and_then(|inner| model.entity(inner))
        .expect("M wraps an inner class");
    let inner_members: Vec<&str> = inner.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(inner_members, vec!["method"]);

    let x = id(model, "X");
    let edges: Vec<(Relation, Option<EntityId>)> = model
        .edges_of(x)
        .iter()
        .map(|e| (e.relation, e.state.entity()))
        .collect();
    assert_eq!(
        edges,
        vec![
            (Relation::Extends, Some(id(model, "Base"))),
            (Relation::AppliesMixin, Some(m.id)),
        ]
    );
}

#[test]
fn documented_mixes_matches_applied_chain() {
    let analysis = analyze();
    let model = &analysis.model;

    assert_eq!(member_names(model, "X"), vec!["label", "method", "is", "_bump"]);
    assert_eq!(member_names(model, "Y"), vec!["label", "method"]);
    assert!(
        analysis
            .report
            .by_kind(DiagnosticKind::CompositionDiscrepancy)
            .is_empty(),
        "a documentation-only chain is not a discrepancy"
    );
}

#[test]
fn duplicate_behaviors_flatten_once() {
    let analysis = analyze();
    let model = &analysis.model;

    let foo = id(model, "Polymer.Foo");
    assert_eq!(
        model.flattened_behaviors(foo),
        &[id(model, "Polymer.Behavior1"), id(model, "Polymer.Behavior2")]
    );
    let names: Vec<&str> = model
        .effective_members(foo)
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["one", "two"]);
}

#[test]
fn behavior_cycle_reported_once() {
    let analysis = analyze();
    let model = &analysis.model;

    let cycles = analysis.report.by_kind(DiagnosticKind::CompositionCycle);
    assert_eq!(cycles.len(), 1, "{cycles:#?}");
    assert!(cycles[0].message.contains("CycleA -> CycleB"));

    let cyclic = model
        .edges()
        .iter()
        .filter(|e| e.state == Resolution::Unresolved(UnresolvedReason::Cyclic))
        .count();
    assert_eq!(cyclic, 1);
    assert!(analysis.report.by_code("PSL001").is_empty());
}

// ── Precedence ──

fn typed_members(model: &SemanticModel, path: &str) -> Vec<(String, Option<String>)> {
    model
        .effective_members(id(model, path))
        .iter()
        .map(|m| (m.name.clone(), m.declared_type.clone()))
        .collect()
}

const TWO_MIXINS: &str = r"
/** @mixinFunction */
const M1 = (superclass) => class extends superclass {
  /** @return {string} */
  get shared() { return ''; }
};

/** @mixinFunction */
const M2 = (superclass) => class extends superclass {
  /** @return {number} */
  get shared() { return 0; }
};

class Base extends HTMLElement {
  base() {}
}

class X extends M1(M2(Base)) {}

/**
 * @mixes M1
 * @mixes M2
 */
class Y extends Base {}
";

#[test]
fn outer_mixin_wins_in_chain_and_documentation() {
    let analysis = pipeline().analyze(vec![SourceFile::new("two.js", TWO_MIXINS)]);
    let model = &analysis.model;

    for path in ["X", "Y"] {
        let members = typed_members(model, path);
        let names: Vec<&str> = members.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["base", "shared"], "{path}");
        assert_eq!(members[1].1.as_deref(), Some("string"), "{path}: M1 applies last");
    }
}

#[test]
fn later_legacy_behavior_wins() {
    let analysis = pipeline().analyze(vec![SourceFile::new(
        "legacy.js",
        "/** @polymerBehavior */\nconst B1 = { v: 'one' };\n\n\
         /** @polymerBehavior */\nconst B2 = { v: 2 };\n\n\
         Polymer({ is: 'x-widget', behaviors: [B1, B2], a() {} });\n",
    )]);
    let model = &analysis.model;

    let members = typed_members(model, "XWidgetElement");
    let names: Vec<&str> = members.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["v", "a"]);
    assert_eq!(members[0].1.as_deref(), Some("number"));

    let v = model
        .effective_members(id(model, "XWidgetElement"))
        .first()
        .map(|m| m.span.clone())
        .expect("v is composed");
    assert_eq!(v.line, 5, "B2's declaration is the one kept");
}

// ── Namespaces ──

#[test]
fn memberof_and_dotted_reference_share_identity() {
    let analysis = analyze();
    let model = &analysis.model;

    let c = id(model, "A.B.C");
    let ns = id(model, "A.B");
    assert_eq!(model.namespace_child(ns, "C"), Some(c));
    assert!(model.lookup("C").is_none(), "annotation placement wins");

    let d = id(model, "D");
    let extends = model.edges_of(d)[0];
    assert_eq!(extends.target, "A.B.C");
    assert_eq!(extends.state, Resolution::Resolved(c));
}

#[test]
fn computed_namespace_key_is_unplaced() {
    let analysis = analyze();
    let model = &analysis.model;
    let file = Path::new("lib/namespaces.js");

    let unplaced: Vec<_> = model
        .entities_in_file(file)
        .filter(|e| matches!(e.kind, EntityKind::Behavior(_)))
        .collect();
    assert_eq!(unplaced.len(), 1);
    assert!(matches!(unplaced[0].placement, Placement::Unknown(_)));

    let dynamic: Vec<_> = analysis
        .report
        .by_kind(DiagnosticKind::DynamicConstruct)
        .into_iter()
        .filter(|d| d.span.file == file)
        .collect();
    assert_eq!(dynamic.len(), 1);
    assert_eq!(analysis.report.by_code("PSL003").len(), 1);
}

// ── Emission ──

#[test]
fn emits_mixin_and_class_declarations() {
    let analysis = analyze();
    let documents = pipeline().emit(&analysis.model);
    let (_, text) = documents
        .iter()
        .find(|(file, _)| file == Path::new("mixins.js"))
        .expect("mixins.js is emitted");

    insta::assert_snapshot!(text, @r"
    // Generated by polyscan. DO NOT EDIT.

    declare function M<T extends new (...args: any[]) => {}>(base: T): T & MConstructor;

    interface MConstructor {
      new(...args: any[]): M;
    }

    interface M {
      method(): void;
    }

    declare class Base extends HTMLElement {
      readonly label: string;
    }

    declare class X extends Base implements M {
      static readonly is: any;
      protected _bump(n: number): any;
    }
    ");
}

#[test]
fn unplaced_entities_are_not_emitted() {
    let analysis = analyze();
    let documents = pipeline().emit(&analysis.model);
    let (_, text) = documents
        .iter()
        .find(|(file, _)| file == Path::new("lib/namespaces.js"))
        .expect("namespaces.js is emitted");

    assert!(text.contains("declare class D extends A.B.C {}"));
    assert!(text.contains("declare namespace A.B {\n  class C {\n    render(): void;\n  }\n}"));
    assert!(!text.contains("attached"));
}

#[test]
fn emission_is_stable_across_runs_and_input_order() {
    let pipeline = pipeline();
    let files = pipeline.load().expect("fixture sources load");
    let mut reversed = files.clone();
    reversed.reverse();

    let first = pipeline.analyze(files);
    let second = pipeline.analyze(reversed);

    let once = pipeline.emit(&first.model);
    assert_eq!(once, pipeline.emit(&first.model));
    assert_eq!(once, pipeline.emit(&second.model));
}

#[test]
fn writes_declaration_tree() {
    let out = tempfile::TempDir::new().expect("temp dir");
    let pipeline = pipeline();
    let analysis = pipeline.analyze_project().expect("analysis");

    let written = pipeline
        .write_declarations(&analysis.model, out.path())
        .expect("declarations written");
    assert_eq!(written.len(), 4);
    assert!(out.path().join("lib/namespaces.d.ts").is_file());
    assert!(out.path().join("mixins.d.ts").is_file());
}

#[test]
fn model_serializes_to_json() {
    let analysis = analyze();
    let json = serde_json::to_value(&analysis.model).expect("model serializes");
    assert!(json["entities"].as_array().is_some_and(|e| !e.is_empty()));
    assert_eq!(json["files"].as_array().map(Vec::len), Some(4));
}

#[test]
fn inline_sources_skip_discovery() {
    let analysis = pipeline().analyze(vec![SourceFile::new(
        "inline.js",
        "/** @polymerBehavior */\nconst Solo = { a() {} };\n",
    )]);
    assert_eq!(analysis.model.files(), &[PathBuf::from("inline.js")]);
    assert!(analysis.model.lookup("Solo").is_some());
}
