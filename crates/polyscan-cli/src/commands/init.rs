//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# polyscan configuration

# Severity at which `polyscan analyze` exits non-zero: "info", "warning" or "error"
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/bower_components/**",
]

extensions = [".js", ".mjs"]

# Respect .gitignore files
respect_gitignore = true

[scanner]
# Legacy factory-registration calls: Polymer({ is: 'x-foo', ... })
registration_functions = ["Polymer"]
# Un-annotated objects named *Behavior are behaviors in legacy files
behavior_suffix = "Behavior"
# Un-annotated `X = FooMixin(Base)` is treated as a class
mixin_suffix = "Mixin"
mixin_wrappers = ["dedupingMixin", "Polymer.dedupingMixin"]
mixin_behaviors_functions = ["mixinBehaviors", "Polymer.mixinBehaviors"]
strip_global_prefixes = ["window"]

[emitter]
header = "// Generated by polyscan. DO NOT EDIT."
indent = 2

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.no-unresolved-composition]
enabled = true
ignore = ["Polymer.Element", "PolymerElement"]

[rules.require-member-types]
enabled = true
# severity = "warning"
include_protected = false

[rules.no-unplaced-entity]
enabled = true
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("polyscan.toml"), force)?;

    println!("Created polyscan.toml");
    println!("\nNext steps:");
    println!("  1. Edit polyscan.toml to configure the scanner and rules");
    println!("  2. Run: polyscan analyze");
    println!("  3. Run: polyscan emit --out-dir types");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }
    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyscan::Config;
    use tempfile::TempDir;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.scanner.registration_functions, vec!["Polymer"]);
        assert_eq!(
            config.rules["no-unresolved-composition"].get_str_array("ignore"),
            vec!["Polymer.Element", "PolymerElement"]
        );
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("polyscan.toml");
        write_config(&path, false).unwrap();
        assert!(write_config(&path, false).is_err());
        write_config(&path, true).unwrap();
    }
}
