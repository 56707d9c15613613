// CLI module for spexdemux
//
// Command-line front end over the spexdemux library. Only the binary builds it.

pub mod commands;
pub mod config;
pub mod output;

pub use config::{Commands, Config, OutputFormat};
pub use output::OutputFormatter;

/// Result type for CLI commands; library errors gain context on the way up
pub type CliResult<T> = anyhow::Result<T>;
