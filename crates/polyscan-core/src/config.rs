//! Configuration types for polyscan.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::diagnostic::Severity;

/// Top-level configuration, loaded from `polyscan.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Severity threshold at which a run is considered failed (default: "error").
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// File discovery settings.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Declaration scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Declaration emitter settings.
    #[serde(default)]
    pub emitter: EmitterConfig,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Effective failure threshold.
    #[must_use]
    pub fn fail_on(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }
}

/// File discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,

    /// File extensions to analyze, with leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_excludes(),
            extensions: default_extensions(),
            respect_gitignore: true,
        }
    }
}

/// Declaration scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Legacy factory-registration functions (`Polymer({...})`).
    #[serde(default = "default_registration_functions")]
    pub registration_functions: Vec<String>,

    /// Name suffix identifying un-annotated behaviors in legacy files.
    #[serde(default = "default_behavior_suffix")]
    pub behavior_suffix: String,

    /// Name suffix identifying un-annotated mixin factories in bare applications.
    #[serde(default = "default_mixin_suffix")]
    pub mixin_suffix: String,

    /// Functions that wrap a mixin factory and return it unchanged in shape.
    #[serde(default = "default_mixin_wrappers")]
    pub mixin_wrappers: Vec<String>,

    /// Functions that apply a behavior list to a base class.
    #[serde(default = "default_mixin_behaviors_functions")]
    pub mixin_behaviors_functions: Vec<String>,

    /// Global object prefixes stripped from member chains (`window.A` is `A`).
    #[serde(default = "default_global_prefixes")]
    pub strip_global_prefixes: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            registration_functions: default_registration_functions(),
            behavior_suffix: default_behavior_suffix(),
            mixin_suffix: default_mixin_suffix(),
            mixin_wrappers: default_mixin_wrappers(),
            mixin_behaviors_functions: default_mixin_behaviors_functions(),
            strip_global_prefixes: default_global_prefixes(),
        }
    }
}

/// Declaration emitter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// First line of every emitted document.
    #[serde(default = "default_header")]
    pub header: String,

    /// Spaces per indentation level.
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            indent: default_indent(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_excludes() -> Vec<String> {
    vec!["**/node_modules/**".to_string()]
}

fn default_extensions() -> Vec<String> {
    vec![".js".to_string(), ".mjs".to_string()]
}

fn default_registration_functions() -> Vec<String> {
    vec!["Polymer".to_string()]
}

fn default_behavior_suffix() -> String {
    "Behavior".to_string()
}

fn default_mixin_suffix() -> String {
    "Mixin".to_string()
}

fn default_mixin_wrappers() -> Vec<String> {
    vec![
        "dedupingMixin".to_string(),
        "Polymer.dedupingMixin".to_string(),
    ]
}

fn default_mixin_behaviors_functions() -> Vec<String> {
    vec![
        "mixinBehaviors".to_string(),
        "Polymer.mixinBehaviors".to_string(),
    ]
}

fn default_global_prefixes() -> Vec<String> {
    vec!["window".to_string()]
}

fn default_header() -> String {
    "// Generated by polyscan. DO NOT EDIT.".to_string()
}

fn default_indent() -> usize {
    2
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert_eq!(config.fail_on(), Severity::Error);
        assert_eq!(config.scanner.registration_functions, vec!["Polymer"]);
        assert_eq!(config.emitter.indent, 2);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
fail_on = "warning"

[analyzer]
root = "./src"
exclude = ["**/generated/**"]

[scanner]
registration_functions = ["Polymer", "LegacyElement"]
behavior_suffix = "Mixinish"

[emitter]
indent = 4

[rules.require-member-types]
enabled = false

[rules.no-unresolved-composition]
severity = "error"
ignore = ["HTMLElement"]
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.fail_on(), Severity::Warning);
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.analyzer.extensions, vec![".js", ".mjs"]);
        assert_eq!(config.scanner.registration_functions.len(), 2);
        assert_eq!(config.scanner.behavior_suffix, "Mixinish");
        assert_eq!(config.scanner.mixin_suffix, "Mixin");
        assert_eq!(config.emitter.indent, 4);
        assert!(!config.is_rule_enabled("require-member-types"));
        assert!(config.is_rule_enabled("no-unplaced-entity"));
        assert_eq!(
            config.rule_severity("no-unresolved-composition"),
            Some(Severity::Error)
        );
        let rule = config.rules.get("no-unresolved-composition").unwrap();
        assert_eq!(rule.get_str_array("ignore"), vec!["HTMLElement"]);
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::parse("fail_on = 3").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config"));
    }
}
