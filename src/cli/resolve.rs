//! Print the load order for a request.
//!
//! ```bash
//! # One file and everything it declares
//! scriptdeps resolve app.js
//!
//! # A configured bundle plus an extra file, as JSON
//! scriptdeps resolve --bundle admin extra.js --format json
//!
//! # Fail instead of warning when a declaration cannot be resolved
//! scriptdeps resolve app.js --strict
//! ```
//!
//! Text output is one root-relative path per line, dependencies first, so it
//! can be piped into other tools. Problems are written to stderr.

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::cli::CliConfig;
use crate::cli::common::{OutputFormat, ProjectContext, print_issues};

/// Arguments for `scriptdeps resolve`.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Files to resolve, relative to the script root (globs allowed in the file name)
    files: Vec<String>,

    /// Resolve a bundle from scriptdeps.toml
    #[arg(short, long)]
    bundle: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Fail on unresolved or malformed declarations
    #[arg(long)]
    strict: bool,

    /// Show the dependency tree below each requested file (text format only)
    #[arg(long)]
    tree: bool,
}

impl ResolveCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let project = ProjectContext::load(cli).await?;
        let requests = project.requests(&self.files, self.bundle.as_deref())?;

        let resolution = project.resolver().resolve(&requests);
        if project.is_strict(self.strict) {
            resolution.ensure_resolved()?;
        }

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            }
            OutputFormat::Text => {
                print_issues(&resolution);
                if self.tree {
                    print!("{}", resolution.to_tree_string());
                } else {
                    for file in &resolution.files {
                        println!("{}", file.path);
                    }
                }
                info!(
                    "Resolved {} file(s) from {} request(s)",
                    resolution.files.len(),
                    requests.len()
                );
            }
        }

        Ok(())
    }
}
