//! List rules command implementation.

use polyscan::rules::{all_rules, Preset};
use polyscan::Config;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<10} {:<28} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for rule in all_rules(&Config::default()) {
        println!(
            "{:<10} {:<28} {}",
            rule.code(),
            rule.name(),
            rule.description()
        );
    }

    let codes = |preset: Preset| {
        preset
            .rules()
            .iter()
            .map(|r| r.code())
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("\nPresets:");
    println!("  recommended  - {}", codes(Preset::Recommended));
    println!("  strict       - {} (default)", codes(Preset::Strict));

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  polyscan analyze --rules no-unresolved-composition");
    println!("  polyscan analyze --rules PSL001,PSL003");
}
