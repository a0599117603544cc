//! Report dependency problems without producing output files.
//!
//! `check` resolves the named bundle, or every bundle in `scriptdeps.toml`, or,
//! when none are configured, every script under the root. It exits non-zero if
//! any cycle, unresolved name or malformed declaration was found, which makes it
//! suitable as a CI gate.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use crate::cli::CliConfig;
use crate::cli::common::{OutputFormat, ProjectContext, print_issues};
use crate::core::ScriptDepsError;
use crate::resolver::Resolution;

/// Arguments for `scriptdeps check`.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Check only this bundle
    #[arg(short, long)]
    bundle: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Result for one checked target.
#[derive(Serialize)]
struct CheckReport {
    target: String,
    clean: bool,
    #[serde(flatten)]
    resolution: Resolution,
}

impl CheckCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let project = ProjectContext::load(cli).await?;
        let targets = self.targets(&project)?;
        if targets.is_empty() {
            println!("No scripts found under {}", project.root.display());
            return Ok(());
        }

        let resolver = project.resolver();
        let reports: Vec<CheckReport> = targets
            .into_iter()
            .map(|(target, requests)| {
                debug!("Checking {target} ({} request(s))", requests.len());
                let resolution = resolver.resolve(&requests);
                CheckReport {
                    target,
                    clean: resolution.is_clean(),
                    resolution,
                }
            })
            .collect();

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
            OutputFormat::Text => {
                for report in &reports {
                    if report.clean {
                        println!(
                            "{} {}: {} file(s)",
                            "✓".green(),
                            report.target,
                            report.resolution.files.len()
                        );
                    } else {
                        println!(
                            "{} {}: {} issue(s)",
                            "✗".red(),
                            report.target,
                            report.resolution.issue_count()
                        );
                        print_issues(&report.resolution);
                    }
                }
            }
        }

        let issues: usize = reports.iter().map(|r| r.resolution.issue_count()).sum();
        if issues > 0 {
            return Err(ScriptDepsError::Other {
                message: format!("Dependency check found {issues} issue(s)"),
            }
            .into());
        }
        Ok(())
    }

    /// Named request lists to check.
    fn targets(&self, project: &ProjectContext) -> Result<Vec<(String, Vec<String>)>> {
        if let Some(name) = &self.bundle {
            return Ok(vec![(name.clone(), project.config.bundle(name)?.to_vec())]);
        }

        if project.config.bundles.is_empty() {
            let scripts =
                project.resolver().source().discover_scripts(&project.config.extensions);
            return Ok(scripts
                .into_iter()
                .map(|path| (path.to_string(), vec![path.to_string()]))
                .collect());
        }

        Ok(project
            .config
            .bundles
            .iter()
            .map(|(name, files)| (name.clone(), files.clone()))
            .collect())
    }
}
