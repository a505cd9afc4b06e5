//! # layer-guard-core
//!
//! Core types for the layer-guard architecture conformance engine:
//!
//! - [`Violation`] / [`ViolationReport`] for representing findings
//! - [`ViolationKind`] tagged union with exhaustive severity/rule mapping
//! - [`GuardConfig`] TOML configuration with load-time defaults
//! - [`Preset`] layer topologies provided as data
//!
//! The analysis engine itself lives in `layer-guard-engine`; this crate
//! only defines the vocabulary shared between the engine, the CLI, and
//! external consumers of the JSON report.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod preset;
pub mod types;

pub use config::{ConfigError, GuardConfig, RealtimeFormat, RoutingConfig};
pub use preset::{LayerDef, Preset, SHARED_INTERNAL_LAYER};
pub use types::{
    Severity, SeverityCounts, Violation, ViolationDiagnostic, ViolationKind, ViolationReport,
};
