//! Guard configuration: TOML model with per-field defaults.
//!
//! All fallbacks are resolved here at load time, so downstream code reads
//! plain fields instead of sprinkling defaults at use sites.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::preset::{LayerDef, Preset};
use crate::types::{Severity, ViolationKind};

/// Output format for realtime (watch-mode) violation rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RealtimeFormat {
    /// Human-readable colored console lines.
    #[default]
    Console,
    /// Structured plain text aimed at coding agents.
    Agent,
    /// One JSON object per violation.
    Json,
}

/// Route-convention sub-config: import allow-lists for page/layout/route
/// entry files under an app-router style convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Whether route-aware checks run at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Layers a `page` entry file may import from.
    #[serde(default = "default_page_layers")]
    pub page_allowed_layers: Vec<String>,
    /// Layers a `layout` entry file may import from.
    #[serde(default = "default_layout_layers")]
    pub layout_allowed_layers: Vec<String>,
    /// Layers a `route` handler file may import from.
    #[serde(default = "default_route_layers")]
    pub route_allowed_layers: Vec<String>,
    /// Whether a page file importing another page file is flagged
    /// regardless of layer.
    #[serde(default = "default_true")]
    pub forbid_page_imports: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            page_allowed_layers: default_page_layers(),
            layout_allowed_layers: default_layout_layers(),
            route_allowed_layers: default_route_layers(),
            forbid_page_imports: true,
        }
    }
}

/// Top-level configuration for the conformance engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Built-in preset name. Ignored when `layers` is non-empty.
    pub preset: String,
    /// Inline custom layers; overrides `preset` when non-empty.
    pub layers: Vec<LayerDef>,
    /// Server-only layer name for custom topologies.
    pub server_only_layer: Option<String>,
    /// Source directory relative to the project root.
    pub src_dir: String,
    /// Glob patterns excluded from analysis.
    pub exclude: Vec<String>,
    /// Import-path globs that are never validated.
    pub ignore_imports: Vec<String>,
    /// Per-kind severity overrides.
    pub severity: HashMap<ViolationKind, Severity>,
    /// Whether the watcher keeps per-file analyses cached.
    pub cache_enabled: bool,
    /// Debounce window for watch-mode re-analysis, in milliseconds.
    pub debounce_ms: u64,
    /// Realtime output format for watch mode.
    pub realtime_format: RealtimeFormat,
    /// Ban `.js`/`.jsx` sources.
    pub ts_only: bool,
    /// File extensions analyzed and watched (without dots).
    pub watched_extensions: Vec<String>,
    /// Route-convention checks; `None` disables them.
    pub routing: Option<RoutingConfig>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            preset: "layered".to_owned(),
            layers: Vec::new(),
            server_only_layer: None,
            src_dir: "src".to_owned(),
            exclude: vec![
                "**/node_modules/**".to_owned(),
                "**/dist/**".to_owned(),
                "**/*.test.*".to_owned(),
                "**/*.spec.*".to_owned(),
            ],
            ignore_imports: Vec::new(),
            severity: HashMap::new(),
            cache_enabled: true,
            debounce_ms: 100,
            realtime_format: RealtimeFormat::Console,
            ts_only: false,
            watched_extensions: vec![
                "ts".to_owned(),
                "tsx".to_owned(),
                "js".to_owned(),
                "jsx".to_owned(),
                "mts".to_owned(),
                "cts".to_owned(),
            ],
            routing: None,
        }
    }
}

impl GuardConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
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

    /// Resolves the active layer topology.
    ///
    /// Inline `layers` take priority; otherwise the named preset is looked
    /// up. An unknown preset name is a hard error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPreset`] for unrecognized names.
    pub fn resolve_preset(&self) -> Result<Preset, ConfigError> {
        if self.layers.is_empty() {
            Preset::by_name(&self.preset)
        } else {
            Ok(Preset::custom(
                self.layers.clone(),
                self.server_only_layer.clone(),
            ))
        }
    }

    /// Severity for a violation kind, honoring config overrides.
    #[must_use]
    pub fn severity_for(&self, kind: ViolationKind) -> Severity {
        self.severity
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_severity())
    }

    /// Validates config consistency.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: malformed globs, unknown layer
    /// references in custom topologies, or an unknown preset name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let preset = self.resolve_preset()?;

        for pattern in self.exclude.iter().chain(&self.ignore_imports) {
            glob::Pattern::new(pattern).map_err(|e| {
                ConfigError::Validation(format!("invalid glob '{pattern}': {e}"))
            })?;
        }

        let names: std::collections::HashSet<&str> =
            preset.layers.iter().map(|l| l.name.as_str()).collect();
        for layer in &preset.layers {
            glob::Pattern::new(&layer.pattern).map_err(|e| {
                ConfigError::Validation(format!(
                    "layer '{}': invalid glob '{}': {e}",
                    layer.name, layer.pattern
                ))
            })?;
            for dep in &layer.allowed_imports {
                if !names.contains(dep.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "layer '{}': unknown allowed import '{dep}'",
                        layer.name
                    )));
                }
            }
        }

        if let Some(server) = &preset.server_only_layer {
            if !names.contains(server.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "server_only_layer '{server}' is not a defined layer"
                )));
            }
        }

        Ok(())
    }

    /// Whether this extension (without dot) is analyzed.
    #[must_use]
    pub fn watches_extension(&self, ext: &str) -> bool {
        self.watched_extensions.iter().any(|e| e == ext)
    }
}

fn default_true() -> bool {
    true
}

fn default_page_layers() -> Vec<String> {
    vec![
        "widgets".to_owned(),
        "features".to_owned(),
        "entities".to_owned(),
        "shared".to_owned(),
    ]
}

fn default_layout_layers() -> Vec<String> {
    vec!["widgets".to_owned(), "shared".to_owned()]
}

fn default_route_layers() -> Vec<String> {
    vec!["entities".to_owned(), "shared".to_owned(), "server".to_owned()]
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Config is structurally invalid.
    #[error("config validation: {0}")]
    Validation(String),

    /// Preset name does not match any built-in topology.
    #[error("unknown preset '{name}' (available: layered, hexagonal, atomic, cqrs, composite)")]
    UnknownPreset {
        /// The unrecognized name.
        name: String,
    },
}
