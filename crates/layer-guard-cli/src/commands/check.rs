//! One-shot scan command.

use anyhow::{Context, Result};
use std::path::Path;

use layer_guard_engine::watch::Watcher;

use crate::OutputFormat;

/// Runs the check command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    preset: Option<String>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = crate::config_resolver::load(path, config_path)?;
    if let Some(preset) = preset {
        config.preset = preset;
    }

    let mut watcher =
        Watcher::new(path, config).context("configuration rejected")?;
    let report = watcher.scan_all();

    super::output::print(&report, format)?;

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
