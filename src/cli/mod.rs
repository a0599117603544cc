//! Command-line interface for scriptdeps.
//!
//! The binary is a thin caller around [`crate::resolver::ScriptResolver`]. Each
//! subcommand lives in its own module and shares project loading through
//! [`common::ProjectContext`].
//!
//! # Commands
//!
//! - `resolve` - print the load order for a set of files or a configured bundle
//! - `header` - show the declarations parsed from one file
//! - `check` - report unresolved, malformed and cyclic declarations
//! - `bundle` - concatenate the resolved files in load order
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - only warnings and errors
//! - `--config` / `-c` - explicit `scriptdeps.toml` (also `SCRIPTDEPS_CONFIG`)
//! - `--root` - script root, overriding the configuration
//!
//! `RUST_LOG` takes precedence over `--verbose` and `--quiet` when set.
//!
//! # Example
//!
//! ```bash
//! scriptdeps resolve app.js
//! scriptdeps --root public/js resolve --bundle admin --format json
//! scriptdeps check
//! scriptdeps bundle app.js -o dist/app.js
//! ```

mod bundle;
mod check;
pub mod common;
mod header;
mod resolve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::constants::CONFIG_ENV_VAR;

/// Settings derived from the global flags, passed to every subcommand.
///
/// Building this separately from [`Cli`] lets tests drive commands without
/// going through argument parsing.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: Option<String>,

    /// Explicit configuration file
    pub config_path: Option<PathBuf>,

    /// Script root override
    pub root: Option<PathBuf>,
}

impl CliConfig {
    /// Default settings: info logging, configuration found by search.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(self.log_level.as_deref().unwrap_or("info"))
        });

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .try_init()
            .ok();
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "scriptdeps",
    about = "Resolve comment-declared script dependencies into a load order",
    version,
    long_about = "scriptdeps reads `using` declarations from the leading comments of client-side \
                  scripts, resolves versioned file names and prints or bundles the files in \
                  dependency order."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to scriptdeps.toml
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Script root directory, overriding the configuration
    #[arg(long, global = true)]
    root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the load order of files and their dependencies
    Resolve(resolve::ResolveCommand),

    /// Show the declarations in one file's header
    Header(header::HeaderCommand),

    /// Report dependency problems in bundles
    Check(check::CheckCommand),

    /// Concatenate files in load order
    Bundle(bundle::BundleCommand),
}

impl Cli {
    /// Run the selected command with settings taken from the global flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Map the global flags to a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            config_path: self.config.clone(),
            root: self.root.clone(),
        }
    }

    /// Run the selected command with explicit settings.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&config).await,
            Commands::Header(cmd) => cmd.execute().await,
            Commands::Check(cmd) => cmd.execute(&config).await,
            Commands::Bundle(cmd) => cmd.execute(&config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_log_levels() {
        let cli = Cli::try_parse_from(["scriptdeps", "check"]).unwrap();
        assert_eq!(cli.build_config().log_level.as_deref(), Some("info"));

        let cli = Cli::try_parse_from(["scriptdeps", "-v", "check"]).unwrap();
        assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

        let cli = Cli::try_parse_from(["scriptdeps", "check", "--quiet"]).unwrap();
        assert_eq!(cli.build_config().log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["scriptdeps", "-v", "-q", "check"]).is_err());
    }

    #[test]
    fn test_global_paths_after_subcommand() {
        let cli = Cli::try_parse_from([
            "scriptdeps",
            "resolve",
            "app.js",
            "--root",
            "public/js",
            "--config",
            "conf/scriptdeps.toml",
        ])
        .unwrap();
        let config = cli.build_config();
        assert_eq!(config.root, Some(PathBuf::from("public/js")));
        assert_eq!(config.config_path, Some(PathBuf::from("conf/scriptdeps.toml")));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
