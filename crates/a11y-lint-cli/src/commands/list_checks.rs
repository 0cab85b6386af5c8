//! List checks command implementation.

use anyhow::Result;
use a11y_lint_core::Registry;
use a11y_lint_rules::builtin_registry;

use super::exit_config_error;
use crate::config_resolver::ConfigSource;

/// Runs the list-checks command.
pub fn run(source: &ConfigSource) -> Result<()> {
    let config = match source.load() {
        Ok(config) => config,
        Err(e) => exit_config_error(&miette::miette!("{e:#}")),
    };
    let registry = match builtin_registry(&config) {
        Ok(registry) => registry,
        Err(e) => exit_config_error(&miette::Report::new(e)),
    };
    print!("{}", render(&registry));

    println!("\nUse --tier or --check to choose what runs, e.g.:");
    println!("  a11y-lint scan --tier quick");
    println!("  a11y-lint scan --check AX101");
    Ok(())
}

fn render(registry: &Registry) -> String {
    let mut out = String::from("Available checks:\n\n");
    out.push_str(&format!(
        "{:<7} {:<25} {:<6} {:<7} {:<16} Description\n",
        "Code", "Id", "Type", "Weight", "Tiers"
    ));
    out.push_str(&"-".repeat(100));
    out.push('\n');

    for def in registry.definitions() {
        let tiers = if def.is_enabled() {
            registry.tiers_of(def.id()).join(",")
        } else {
            "(disabled)".to_string()
        };
        out.push_str(&format!(
            "{:<7} {:<25} {:<6} {:<7} {:<16} {}\n",
            def.code(),
            def.id(),
            def.content_type().to_string(),
            def.weight(),
            tiers,
            def.description()
        ));
    }

    out.push_str("\nTiers:\n");
    for tier in registry.tier_names() {
        let members = registry
            .definitions()
            .iter()
            .filter(|d| registry.tiers_of(d.id()).contains(&tier))
            .count();
        out.push_str(&format!("  {tier:<10} {members} check(s)\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use a11y_lint_core::Config;

    #[test]
    fn lists_every_check_and_tier() {
        let registry = builtin_registry(&Config::default()).unwrap();
        let text = render(&registry);
        assert!(text.contains("AX101   color-contrast"));
        assert!(text.contains("AX102   color-contrast-enhanced   style  3       full "));
        assert!(text.contains("  full       9 check(s)"));
        assert!(text.contains("  quick      3 check(s)"));
        assert!(text.contains("  standard   8 check(s)"));
    }

    #[test]
    fn disabled_checks_are_marked() {
        let config = Config::parse("[checks.aria-role]\nenabled = false\n").unwrap();
        let registry = builtin_registry(&config).unwrap();
        assert!(render(&registry).contains("AX005   aria-role                 html   6       (disabled)"));
    }
}
