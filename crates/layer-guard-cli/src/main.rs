//! layer-guard CLI tool.
//!
//! Usage:
//! ```bash
//! layer-guard check [OPTIONS] [PATH]
//! layer-guard watch [PATH]
//! layer-guard heal [OPTIONS] [PATH]
//! layer-guard list-presets
//! layer-guard init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Architecture conformance checker for JavaScript/TypeScript layer topologies
#[derive(Parser)]
#[command(name = "layer-guard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a one-shot conformance scan
    Check {
        /// Project root to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Preset override (layered, hexagonal, atomic, cqrs, composite)
        #[arg(short, long)]
        preset: Option<String>,
    },

    /// Watch the project and recheck changed files
    Watch {
        /// Project root to watch (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show remediation options for current violations
    Heal {
        /// Project root to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Apply the primary auto-fix for each fixable violation
        #[arg(long)]
        apply: bool,
    },

    /// List built-in layer presets
    ListPresets,

    /// Initialize a configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for scan results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            preset,
        } => commands::check::run(&path, format, preset, cli.config.as_deref()),
        Commands::Watch { path } => commands::watch::run(&path, cli.config.as_deref()),
        Commands::Heal { path, apply } => commands::heal::run(&path, apply, cli.config.as_deref()),
        Commands::ListPresets => {
            commands::list_presets::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
