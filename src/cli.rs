//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// covidsync - pandemic statistics synchronizer
///
/// Fetches global, per-country and German regional COVID-19 figures and
/// writes them into a persisted state tree. Performs one run and exits;
/// schedule it externally.
///
/// Examples:
///   covidsync
///   covidsync --config ./covidsync.toml --no-delay
///   covidsync --store /var/lib/covidsync/state.json --delete-unused
///   covidsync --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .covidsync.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "COVIDSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path of the persisted state tree
    ///
    /// Overrides `general.store_path` from the config file.
    #[arg(short, long, value_name = "FILE", env = "COVIDSYNC_STORE")]
    pub store: Option<PathBuf>,

    /// Delete entries of countries and regions that are no longer selected
    #[arg(long)]
    pub delete_unused: bool,

    /// Skip the random startup delay
    #[arg(long)]
    pub no_delay: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .covidsync.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        if let Some(ref store) = self.store {
            if store.is_dir() {
                return Err(format!("Store path is a directory: {}", store.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
