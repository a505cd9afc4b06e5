//! Configuration file resolution.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/layer-guard.toml` or `.layer-guard.toml`
//! 3. No config found → defaults

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use layer_guard_core::GuardConfig;

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["layer-guard.toml", ".layer-guard.toml"];

/// Resolves the configuration file path.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.is_file() {
            return ConfigSource::Project(candidate);
        }
    }
    ConfigSource::Default
}

/// Resolves and loads the configuration, falling back to defaults.
pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<GuardConfig> {
    match resolve(project_dir, explicit) {
        ConfigSource::Default => {
            tracing::info!("no layer-guard.toml found, using the layered preset defaults");
            Ok(GuardConfig::default())
        }
        source => {
            let path = source.path().context("resolved config has no path")?;
            tracing::debug!("using config: {}", path.display());
            GuardConfig::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins_over_project_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("layer-guard.toml"), "preset = \"layered\"\n").unwrap();
        let explicit = dir.path().join("other.toml");
        let source = resolve(dir.path(), Some(&explicit));
        assert_eq!(source, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn project_file_found_by_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".layer-guard.toml"), "preset = \"atomic\"\n").unwrap();
        let source = resolve(dir.path(), None);
        assert_eq!(
            source,
            ConfigSource::Project(dir.path().join(".layer-guard.toml"))
        );
        let config = load(dir.path(), None).unwrap();
        assert_eq!(config.preset, "atomic");
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve(dir.path(), None), ConfigSource::Default);
        let config = load(dir.path(), None).unwrap();
        assert_eq!(config.preset, "layered");
    }
}
