//! Init command: writes a starter configuration file.

use anyhow::{bail, Result};
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# layer-guard configuration
# Pick a preset or define [[layers]] inline to override it.
# Presets: layered, hexagonal, atomic, cqrs, composite

preset = "layered"
src_dir = "src"

# Globs excluded from analysis (relative to the project root).
exclude = ["**/node_modules/**", "**/dist/**", "**/*.test.*", "**/*.spec.*"]

# Import specifiers that are never checked.
# ignore_imports = ["react", "react-dom/*"]

# Per-rule severity overrides.
# [severity]
# "cross-slice" = "error"
# "deep-nesting" = "info"

# Watch-mode behavior.
# debounce_ms = 100
# realtime_format = "console"   # console | agent | json

# Inline layer definitions (replace the preset's layers).
# First matching pattern wins, so put narrower patterns first.
# [[layers]]
# name = "features"
# pattern = "features/**"
# allowed_imports = ["entities", "shared"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("layer-guard.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, CONFIG_TEMPLATE)?;

    println!("Created layer-guard.toml");
    println!();
    println!("Next steps:");
    println!("  1. Pick a preset (layer-guard list-presets shows the shipped topologies)");
    println!("  2. Run: layer-guard check");
    println!("  3. Run: layer-guard watch for live feedback while editing");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_guard_core::GuardConfig;

    #[test]
    fn template_parses_and_validates() {
        let config = GuardConfig::parse(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.preset, "layered");
        assert!(config.validate().is_ok());
    }
}
