//! Layer topologies: layer definitions and built-in presets.
//!
//! A preset is an ordered list of layers. Order is authoritative: when a
//! path matches more than one layer glob, the first declared layer wins.
//! That tie-break is deliberate and not diagnosed as ambiguity.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Name of the reserved marker layer for the unsafe shared segment.
///
/// Files resolving to this layer get an `invalid-shared-segment` violation.
pub const SHARED_INTERNAL_LAYER: &str = "shared-internal";

/// A named architecture layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDef {
    /// Layer name (e.g. `"features"`, `"shared"`).
    pub name: String,
    /// Glob pattern matched against paths relative to the source root
    /// (e.g. `"features/**"`).
    pub pattern: String,
    /// Names of layers this layer may import from. Same-layer same-slice
    /// imports are always allowed and need not be listed.
    #[serde(default)]
    pub allowed_imports: Vec<String>,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Whether files in this layer run client-side. Client-side layers
    /// must not import the preset's server-only layer.
    #[serde(default)]
    pub client_side: bool,
}

impl LayerDef {
    fn new(name: &str, pattern: &str, allowed: &[&str], description: &str) -> Self {
        Self {
            name: name.to_owned(),
            pattern: pattern.to_owned(),
            allowed_imports: allowed.iter().map(|s| (*s).to_owned()).collect(),
            description: description.to_owned(),
            client_side: false,
        }
    }

    fn client(mut self) -> Self {
        self.client_side = true;
        self
    }
}

/// A complete, named layer topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    /// Preset name.
    pub name: String,
    /// Layers in declaration order; first glob match wins.
    pub layers: Vec<LayerDef>,
    /// Human-readable hierarchy string (top layer first).
    pub hierarchy: String,
    /// Layer that only server-side code may import, if the topology has one.
    #[serde(default)]
    pub server_only_layer: Option<String>,
}

impl Preset {
    /// Names of all built-in presets.
    pub const BUILTIN: [&'static str; 5] =
        ["layered", "hexagonal", "atomic", "cqrs", "composite"];

    /// Looks up a built-in preset.
    ///
    /// # Errors
    ///
    /// Unknown names are a hard error: no analysis can proceed without a
    /// layer topology.
    pub fn by_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "layered" => Ok(Self::layered()),
            "hexagonal" => Ok(Self::hexagonal()),
            "atomic" => Ok(Self::atomic()),
            "cqrs" => Ok(Self::cqrs()),
            "composite" => Ok(Self::composite()),
            other => Err(ConfigError::UnknownPreset {
                name: other.to_owned(),
            }),
        }
    }

    /// Builds a custom preset from explicit layers.
    #[must_use]
    pub fn custom(layers: Vec<LayerDef>, server_only_layer: Option<String>) -> Self {
        let hierarchy = layers
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>()
            .join(" -> ");
        Self {
            name: "custom".to_owned(),
            layers,
            hierarchy,
            server_only_layer,
        }
    }

    /// Finds a layer by name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&LayerDef> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Layer names this layer may import from.
    #[must_use]
    pub fn allowed_imports(&self, layer_name: &str) -> Vec<String> {
        self.layer(layer_name)
            .map(|l| l.allowed_imports.clone())
            .unwrap_or_default()
    }

    /// Feature-Sliced-Design style layered topology.
    #[must_use]
    pub fn layered() -> Self {
        Self {
            name: "layered".to_owned(),
            hierarchy: "app -> pages -> widgets -> features -> entities -> shared".to_owned(),
            server_only_layer: None,
            layers: vec![
                LayerDef::new(
                    "app",
                    "app/**",
                    &["pages", "widgets", "features", "entities", "shared"],
                    "application shell: providers, global styles, entry point",
                ),
                LayerDef::new(
                    "pages",
                    "pages/**",
                    &["widgets", "features", "entities", "shared"],
                    "route-level screens composed from widgets and features",
                ),
                LayerDef::new(
                    "widgets",
                    "widgets/**",
                    &["features", "entities", "shared"],
                    "self-contained UI blocks",
                ),
                LayerDef::new(
                    "features",
                    "features/**",
                    &["entities", "shared"],
                    "user interactions carrying business value",
                ),
                LayerDef::new(
                    "entities",
                    "entities/**",
                    &["shared"],
                    "business entities and their state",
                ),
                LayerDef::new("shared", "shared/**", &[], "reusable layer-agnostic code"),
            ],
        }
    }

    /// Hexagonal (ports and adapters) topology.
    #[must_use]
    pub fn hexagonal() -> Self {
        Self {
            name: "hexagonal".to_owned(),
            hierarchy: "adapters -> application -> ports -> domain".to_owned(),
            server_only_layer: None,
            layers: vec![
                LayerDef::new(
                    "adapters",
                    "adapters/**",
                    &["application", "ports", "domain"],
                    "framework and I/O adapters",
                ),
                LayerDef::new(
                    "application",
                    "application/**",
                    &["ports", "domain"],
                    "use cases orchestrating the domain",
                ),
                LayerDef::new("ports", "ports/**", &["domain"], "boundary interfaces"),
                LayerDef::new("domain", "domain/**", &[], "pure business logic"),
            ],
        }
    }

    /// Atomic design topology.
    #[must_use]
    pub fn atomic() -> Self {
        Self {
            name: "atomic".to_owned(),
            hierarchy: "pages -> templates -> organisms -> molecules -> atoms -> shared"
                .to_owned(),
            server_only_layer: None,
            layers: vec![
                LayerDef::new(
                    "pages",
                    "pages/**",
                    &["templates", "organisms", "molecules", "atoms", "shared"],
                    "concrete screens",
                ),
                LayerDef::new(
                    "templates",
                    "templates/**",
                    &["organisms", "molecules", "atoms", "shared"],
                    "page-level layout skeletons",
                ),
                LayerDef::new(
                    "organisms",
                    "organisms/**",
                    &["molecules", "atoms", "shared"],
                    "complex composed components",
                ),
                LayerDef::new(
                    "molecules",
                    "molecules/**",
                    &["atoms", "shared"],
                    "simple component groups",
                ),
                LayerDef::new("atoms", "atoms/**", &["shared"], "basic building blocks"),
                LayerDef::new("shared", "shared/**", &[], "shared utilities"),
            ],
        }
    }

    /// Command/query-segregated topology.
    #[must_use]
    pub fn cqrs() -> Self {
        Self {
            name: "cqrs".to_owned(),
            hierarchy: "api -> commands | queries -> domain -> shared".to_owned(),
            server_only_layer: None,
            layers: vec![
                LayerDef::new(
                    "api",
                    "api/**",
                    &["commands", "queries", "domain", "shared"],
                    "transport endpoints",
                ),
                LayerDef::new(
                    "commands",
                    "commands/**",
                    &["domain", "shared"],
                    "state-mutating handlers",
                ),
                LayerDef::new(
                    "queries",
                    "queries/**",
                    &["domain", "shared"],
                    "read-side handlers",
                ),
                LayerDef::new("domain", "domain/**", &["shared"], "domain model"),
                LayerDef::new("shared", "shared/**", &[], "shared kernel"),
            ],
        }
    }

    /// Layered topology extended with a server-only layer and the reserved
    /// internal shared segment.
    #[must_use]
    pub fn composite() -> Self {
        let layers = vec![
            LayerDef::new(
                "app",
                "app/**",
                &["pages", "widgets", "features", "entities", "shared"],
                "application shell",
            )
            .client(),
            LayerDef::new(
                "pages",
                "pages/**",
                &["widgets", "features", "entities", "shared"],
                "route-level screens",
            )
            .client(),
            LayerDef::new(
                "widgets",
                "widgets/**",
                &["features", "entities", "shared"],
                "self-contained UI blocks",
            )
            .client(),
            LayerDef::new(
                "features",
                "features/**",
                &["entities", "shared"],
                "user interactions",
            )
            .client(),
            LayerDef::new("entities", "entities/**", &["shared"], "business entities").client(),
            // Must precede "shared": first-match-wins catches the reserved
            // segment before the broader shared glob does.
            LayerDef::new(
                SHARED_INTERNAL_LAYER,
                "shared/internal/**",
                &[],
                "reserved segment, not for project code",
            ),
            LayerDef::new("shared", "shared/**", &[], "reusable layer-agnostic code"),
            LayerDef::new(
                "server",
                "server/**",
                &["entities", "shared"],
                "server-only code: env access, secrets, data sources",
            ),
        ];
        Self {
            name: "composite".to_owned(),
            hierarchy: "app -> pages -> widgets -> features -> entities -> shared | server"
                .to_owned(),
            server_only_layer: Some("server".to_owned()),
            layers,
        }
    }
}
