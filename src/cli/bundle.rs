//! Concatenate resolved files in load order.
//!
//! Files flagged `nocombine` (by their own `using-options` line or by the
//! declaring `using` line) keep their place in the order but are left out of
//! the concatenation and listed instead, so the caller can serve them
//! separately. The bundle fingerprint is printed to stderr.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use crate::cli::CliConfig;
use crate::cli::common::{ProjectContext, print_issues};
use crate::resolver::Resolution;

/// Arguments for `scriptdeps bundle`.
#[derive(Args, Debug)]
pub struct BundleCommand {
    /// Files to bundle, relative to the script root
    files: Vec<String>,

    /// Bundle from scriptdeps.toml
    #[arg(short, long)]
    bundle: Option<String>,

    /// Write the bundle here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail on unresolved or malformed declarations
    #[arg(long)]
    strict: bool,
}

impl BundleCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let project = ProjectContext::load(cli).await?;
        let requests = project.requests(&self.files, self.bundle.as_deref())?;

        let resolution = project.resolver().resolve(&requests);
        if project.is_strict(self.strict) {
            resolution.ensure_resolved()?;
        }
        print_issues(&resolution);

        let (bundle, separate) = concatenate(&resolution);

        match &self.output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                tokio::fs::write(path, &bundle)
                    .await
                    .with_context(|| format!("Failed to write bundle to {}", path.display()))?;
                info!("Wrote {} byte(s) to {}", bundle.len(), path.display());
            }
            None => print!("{bundle}"),
        }

        for path in &separate {
            eprintln!("{} {path} (nocombine, serve separately)", "→".cyan());
        }
        eprintln!(
            "{} Bundled {} of {} file(s), fingerprint {}",
            "✓".green(),
            resolution.files.len() - separate.len(),
            resolution.files.len(),
            resolution.fingerprint()
        );

        Ok(())
    }
}

/// Concatenated text of every combinable file, plus the paths left out.
fn concatenate(resolution: &Resolution) -> (String, Vec<String>) {
    let mut bundle = String::new();
    let mut separate = Vec::new();

    for file in &resolution.files {
        if file.no_combine() {
            separate.push(file.path.to_string());
            continue;
        }
        bundle.push_str(&format!("/* {} */\n", file.path));
        bundle.push_str(&file.content);
        if !file.content.ends_with('\n') {
            bundle.push('\n');
        }
    }

    (bundle, separate)
}
