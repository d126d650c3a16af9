//! Two-phase analysis driver.
//!
//! Phase one scans every file independently. At the barrier the per-file
//! entity sets are rebased into one id space; phase two places entities
//! into namespaces, resolves composition and freezes the model. Model
//! rules run last, against the frozen model.

use std::path::{Path, PathBuf};

use polyscan_core::{
    AnalysisReport, Config, ConfigError, Diagnostic, Diagnostics, ModelRule, ModelRuleBox,
    SemanticModel, SourceFile,
};
use polyscan_ts::{AliasBinding, JavaScriptScanner, LanguageScanner, ScannedFile};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::emitter::Emitter;
use crate::{composition, namespace};

/// Errors from the I/O around analysis. Analysis itself never fails.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading an input file failed.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Walking the project directory failed.
    #[error("directory walk failed: {0}")]
    Walk(#[from] ignore::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Writing a declaration file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// A finished run: the frozen model and every diagnostic raised.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// The frozen semantic model.
    pub model: SemanticModel,
    /// Scanner, resolver and rule diagnostics, sorted by location.
    pub report: AnalysisReport,
}

/// Builder for configuring a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    root: Option<PathBuf>,
    config: Option<Config>,
    scanners: Vec<Box<dyn LanguageScanner>>,
    rules: Vec<ModelRuleBox>,
    exclude_patterns: Vec<String>,
}

impl PipelineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project root used for file discovery.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn config_file(self, path: &Path) -> Result<Self, PipelineError> {
        Ok(self.config(Config::from_file(path)?))
    }

    /// Adds a language scanner. Without one, JavaScript is used.
    #[must_use]
    pub fn scanner<S: LanguageScanner + 'static>(mut self, scanner: S) -> Self {
        self.scanners.push(Box::new(scanner));
        self
    }

    /// Adds a model rule.
    #[must_use]
    pub fn rule<R: ModelRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed model rule.
    #[must_use]
    pub fn rule_box(mut self, rule: ModelRuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed model rules.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = ModelRuleBox>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is not a valid glob.
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        let config = self.config.unwrap_or_default();
        let root = self.root.unwrap_or_else(|| config.analyzer.root.clone());

        let mut patterns = self.exclude_patterns;
        patterns.extend(config.analyzer.exclude.iter().cloned());
        let exclude = patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut scanners = self.scanners;
        if scanners.is_empty() {
            scanners.push(Box::new(JavaScriptScanner::new()));
        }

        Ok(Pipeline {
            root,
            config,
            scanners,
            rules: self.rules,
            exclude,
        })
    }
}

/// Runs scanning, resolution, model rules and emission.
///
/// Use [`Pipeline::builder()`] to construct an instance.
pub struct Pipeline {
    root: PathBuf,
    config: Config,
    scanners: Vec<Box<dyn LanguageScanner>>,
    rules: Vec<ModelRuleBox>,
    exclude: Vec<glob::Pattern>,
}

impl Pipeline {
    /// Creates a new builder for configuring a pipeline.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the effective configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Finds the files under the root that a scanner handles, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory walk fails.
    pub fn discover(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let extensions = &self.config.analyzer.extensions;
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.config.analyzer.respect_gitignore);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{e}"))
                .unwrap_or_default();
            if !extensions.iter().any(|e| *e == ext) {
                continue;
            }
            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }
        files.sort();
        Ok(files)
    }

    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.exclude
            .iter()
            .any(|p| p.matches_path(path) || p.matches_path(relative))
    }

    /// Discovers and reads the project's files.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or reading fails.
    pub fn load(&self) -> Result<Vec<SourceFile>, PipelineError> {
        self.discover()?
            .into_iter()
            .map(|path| {
                SourceFile::read(&path, &self.root).map_err(|source| PipelineError::Io {
                    path: path.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Discovers, reads and analyzes the project.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures.
    pub fn analyze_project(&self) -> Result<Analysis, PipelineError> {
        info!("Starting analysis at {:?}", self.root);
        let files = self.load()?;
        Ok(self.analyze(files))
    }

    /// Analyzes in-memory sources.
    ///
    /// Files are processed in path order; a path given twice keeps its
    /// first contents.
    #[must_use]
    pub fn analyze(&self, mut files: Vec<SourceFile>) -> Analysis {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|later, earlier| later.path == earlier.path);
        info!("Scanning {} files", files.len());

        let scanned: Vec<ScannedFile> = files.iter().filter_map(|f| self.scan(f)).collect();

        let mut entities = Vec::new();
        let mut aliases: Vec<AliasBinding> = Vec::new();
        let mut imports = Vec::new();
        let mut paths = Vec::new();
        let mut diagnostics = Diagnostics::new();
        for mut file in scanned {
            let offset = u32::try_from(entities.len()).unwrap_or(u32::MAX);
            for entity in &mut file.entities {
                entity.rebase(offset);
            }
            entities.append(&mut file.entities);
            aliases.append(&mut file.aliases);
            imports.append(&mut file.imports);
            diagnostics.append(&mut file.diagnostics);
            paths.push(file.file);
        }

        info!("Resolving namespaces for {} entities", entities.len());
        let tree = namespace::resolve(&mut entities, &aliases, &mut diagnostics);
        info!("Resolving composition");
        let edges = composition::resolve(&mut entities, &tree, &mut diagnostics);
        let model = SemanticModel::new(entities, edges, tree.into_root(), imports, paths);

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }
            let found = rule.check(&model);
            diagnostics.extend(self.apply_severity_override(rule.name(), found));
        }

        let mut report = AnalysisReport {
            diagnostics: diagnostics.into_vec(),
            files_analyzed: model.files().len(),
        };
        report.sort();
        info!("Analysis complete: {}", report.summary());
        Analysis { model, report }
    }

    fn scan(&self, file: &SourceFile) -> Option<ScannedFile> {
        let Some(scanner) = self.scanners.iter().find(|s| s.handles(file)) else {
            warn!("No scanner for {}", file.path.display());
            return None;
        };
        debug!("Scanning {} as {}", file.path.display(), scanner.language_id());
        Some(scanner.scan(file, &self.config.scanner))
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for d in &mut diagnostics {
                d.severity = severity;
            }
        }
        diagnostics
    }

    /// Renders declaration documents for every analyzed file.
    #[must_use]
    pub fn emit(&self, model: &SemanticModel) -> Vec<(PathBuf, String)> {
        Emitter::new(model, &self.config.emitter).emit_all()
    }

    /// Writes one `.d.ts` file per analyzed file under `out_dir`, mirroring
    /// the input layout, and returns the written paths.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or file cannot be written.
    pub fn write_declarations(
        &self,
        model: &SemanticModel,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, PipelineError> {
        let mut written = Vec::new();
        for (file, text) in self.emit(model) {
            let target = out_dir.join(declaration_path(&file));
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|source| PipelineError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&target, text).map_err(|source| PipelineError::Write {
                path: target.clone(),
                source,
            })?;
            debug!("Wrote {}", target.display());
            written.push(target);
        }
        info!("Wrote {} declaration files", written.len());
        Ok(written)
    }
}

/// `src/foo.js` becomes `src/foo.d.ts`.
#[must_use]
pub fn declaration_path(source: &Path) -> PathBuf {
    let relative: PathBuf = source
        .components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .collect();
    relative.with_extension("d.ts")
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyscan_core::{DiagnosticKind, Entity, Placement, Severity};

    struct EveryEntity;

    impl ModelRule for EveryEntity {
        fn name(&self) -> &'static str {
            "every-entity"
        }
        fn code(&self) -> &'static str {
            "PSL900"
        }
        fn check(&self, model: &SemanticModel) -> Vec<Diagnostic> {
            model
                .entities()
                .iter()
                .map(|e| Diagnostic::lint(self.code(), Severity::Info, e.span.clone(), "seen"))
                .collect()
        }
    }

    fn pipeline(config: &str) -> Pipeline {
        Pipeline::builder()
            .config(Config::parse(config).unwrap())
            .rule(EveryEntity)
            .build()
            .unwrap()
    }

    #[test]
    fn ids_are_rebased_across_files() {
        let analysis = pipeline("").analyze(vec![
            SourceFile::new("b.js", "class B extends A {}"),
            SourceFile::new("a.js", "class A { x() {} }"),
        ]);
        let model = &analysis.model;
        assert_eq!(model.files(), &[PathBuf::from("a.js"), PathBuf::from("b.js")]);
        for (i, e) in model.entities().iter().enumerate() {
            assert_eq!(e.id.index(), i);
        }
        let b = model.lookup("B").unwrap();
        let a = model.lookup("A").unwrap();
        assert_eq!(model.edges_of(b)[0].state.entity(), Some(a));
        assert_eq!(model.effective_members(b).len(), 1);
    }

    #[test]
    fn same_name_in_two_files_resolves_locally() {
        let analysis = pipeline("").analyze(vec![
            SourceFile::new("a.js", "class Base {}\nclass A extends Base { a() {} }\n"),
            SourceFile::new("b.js", "class Base { b() {} }\nclass B extends Base {}\n"),
        ]);
        let model = &analysis.model;
        assert!(analysis.report.by_kind(DiagnosticKind::Redefinition).is_empty());

        let bases: Vec<&Entity> = model.entities().iter().filter(|e| e.name == "Base").collect();
        assert_eq!(bases.len(), 2);
        assert!(bases.iter().all(|e| e.placement == Placement::Root));
        let local_base = bases
            .iter()
            .find(|e| e.file() == Path::new("b.js"))
            .map(|e| e.id)
            .unwrap();

        let b = model.lookup("B").unwrap();
        assert_eq!(model.edges_of(b)[0].state.entity(), Some(local_base));
        let names: Vec<&str> = model.effective_members(b).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);

        let a = model.lookup("A").unwrap();
        let names: Vec<&str> = model.effective_members(a).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn computed_assignments_are_kept_unplaced() {
        let analysis = pipeline("").analyze(vec![SourceFile::new(
            "c.js",
            "Namespace[key] = { go() {} };\n/** @polymerBehavior */\nNS[key].Foo = { run() {} };\n",
        )]);
        let placements: Vec<&Placement> =
            analysis.model.entities().iter().map(|e| &e.placement).collect();
        assert_eq!(
            placements,
            vec![
                &Placement::Unknown("Namespace[key]".into()),
                &Placement::Unknown("NS[key].Foo".into()),
            ]
        );
        assert_eq!(analysis.report.by_kind(DiagnosticKind::DynamicConstruct).len(), 2);
    }

    #[test]
    fn rules_honor_enable_and_severity() {
        let src = vec![SourceFile::new("a.js", "class A {}")];
        let analysis = pipeline("").analyze(src.clone());
        assert_eq!(analysis.report.by_code("PSL900").len(), 1);

        let analysis = pipeline("[rules.every-entity]\nenabled = false\n").analyze(src.clone());
        assert!(analysis.report.by_code("PSL900").is_empty());

        let analysis = pipeline("[rules.every-entity]\nseverity = \"error\"\n").analyze(src);
        assert!(analysis.report.has_errors());
    }

    #[test]
    fn unknown_extensions_are_skipped() {
        let analysis = pipeline("").analyze(vec![SourceFile::new("README.md", "# hi")]);
        assert!(analysis.model.files().is_empty());
        assert_eq!(analysis.report.files_analyzed, 0);
    }

    #[test]
    fn cross_file_unresolved_reference() {
        let analysis = pipeline("").analyze(vec![SourceFile::new(
            "a.js",
            "class A extends Missing {}",
        )]);
        let unresolved = analysis.report.by_kind(DiagnosticKind::UnresolvedReference);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].span.file, PathBuf::from("a.js"));
    }

    #[test]
    fn declaration_paths() {
        assert_eq!(
            declaration_path(Path::new("src/x-foo.js")),
            PathBuf::from("src/x-foo.d.ts")
        );
        assert_eq!(
            declaration_path(Path::new("../lib/a.mjs")),
            PathBuf::from("lib/a.d.ts")
        );
    }

    #[test]
    fn excludes_are_globs() {
        let p = Pipeline::builder()
            .root("/project")
            .exclude("**/node_modules/**")
            .build()
            .unwrap();
        assert!(p.should_exclude(Path::new("/project/node_modules/x/index.js")));
        assert!(!p.should_exclude(Path::new("/project/src/index.js")));
    }

    #[test]
    fn bad_glob_is_an_error() {
        let result = Pipeline::builder().exclude("[").build();
        assert!(matches!(result, Err(PipelineError::Glob(_))));
    }
}
