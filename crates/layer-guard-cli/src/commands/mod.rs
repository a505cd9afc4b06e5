//! CLI subcommand implementations.

pub mod check;
pub mod heal;
pub mod init;
pub mod list_presets;
pub mod output;
pub mod watch;
