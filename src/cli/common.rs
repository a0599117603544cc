//! Project loading and output helpers shared by the subcommands.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::CliConfig;
use crate::config::{ProjectConfig, find_config_with_optional};
use crate::core::ScriptDepsError;
use crate::resolver::{FsScriptSource, Resolution, ScriptResolver};

/// Output format for commands that can emit machine-readable results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored where it helps
    #[default]
    Text,
    /// Pretty-printed JSON on stdout
    Json,
}

/// Configuration and script root for one command invocation.
#[derive(Debug)]
pub struct ProjectContext {
    /// Loaded configuration, or defaults when no file exists
    pub config: ProjectConfig,
    /// Where the configuration came from
    pub config_path: Option<PathBuf>,
    /// Directory all script paths are relative to
    pub root: PathBuf,
}

impl ProjectContext {
    /// Locate and load the configuration, then settle the script root.
    ///
    /// A missing `scriptdeps.toml` is only an error when one was named
    /// explicitly; otherwise the current directory is used with defaults.
    pub async fn load(cli: &CliConfig) -> Result<Self> {
        let config_path = match find_config_with_optional(cli.config_path.clone()) {
            Ok(path) => Some(path),
            Err(e)
                if cli.config_path.is_none()
                    && matches!(
                        e.downcast_ref::<ScriptDepsError>(),
                        Some(ScriptDepsError::ConfigNotFound)
                    ) =>
            {
                None
            }
            Err(e) => return Err(e),
        };

        let config = match &config_path {
            Some(path) => ProjectConfig::load_from(path).await?,
            None => {
                let cwd = std::env::current_dir()
                    .context("Cannot determine current working directory")?;
                debug!("No configuration found, using {} with defaults", cwd.display());
                ProjectConfig::for_directory(cwd)
            }
        };

        let root = cli.root.clone().unwrap_or_else(|| config.script_root());
        if !root.is_dir() {
            return Err(ScriptDepsError::ConfigError {
                message: format!("script root {} is not a directory", root.display()),
            }
            .into());
        }
        debug!("Script root: {}", root.display());

        Ok(Self {
            config,
            config_path,
            root,
        })
    }

    /// Resolver reading from the script root.
    #[must_use]
    pub fn resolver(&self) -> ScriptResolver<FsScriptSource> {
        ScriptResolver::new(FsScriptSource::new(&self.root), self.config.resolver_options())
    }

    /// Requested names: the named bundle's files followed by `files`.
    pub fn requests(&self, files: &[String], bundle: Option<&str>) -> Result<Vec<String>> {
        let mut requests = match bundle {
            Some(name) => self.config.bundle(name)?.to_vec(),
            None => Vec::new(),
        };
        requests.extend(files.iter().cloned());

        if requests.is_empty() {
            return Err(ScriptDepsError::Other {
                message: "No files requested. Pass file names or --bundle <NAME>".to_string(),
            }
            .into());
        }
        Ok(requests)
    }

    /// Strict when asked on the command line or in the configuration.
    #[must_use]
    pub const fn is_strict(&self, flag: bool) -> bool {
        flag || self.config.strict
    }
}

/// Print every problem in `resolution` to stderr.
pub fn print_issues(resolution: &Resolution) {
    for cycle in &resolution.cycles {
        eprintln!("{} Circular dependency: {cycle}", "⚠".yellow());
    }

    for missing in &resolution.unresolved {
        eprintln!(
            "{} Cannot resolve '{}' from {}: {}",
            "✗".red(),
            missing.name,
            missing.from,
            missing.reason
        );
        if let Some(suggestion) = &missing.suggestion {
            eprintln!("  did you mean '{}'?", suggestion.to_string().green());
        }
    }

    for bad in &resolution.malformed {
        eprintln!("{} {}:{}: {}", "✗".red(), bad.file, bad.line, bad.reason);
        eprintln!("  {}", bad.text.trim().dimmed());
    }
}
