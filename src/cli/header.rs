//! Show the parsed header of a single file.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::cli::common::OutputFormat;
use crate::header::parse_header;

/// Arguments for `scriptdeps header`.
#[derive(Args, Debug)]
pub struct HeaderCommand {
    /// Script file to inspect
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl HeaderCommand {
    pub async fn execute(self) -> Result<()> {
        let bytes = tokio::fs::read(&self.file)
            .await
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let header = parse_header(&String::from_utf8_lossy(&bytes));

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&header)?);
            }
            OutputFormat::Text => {
                for bad in &header.malformed {
                    eprintln!(
                        "{} line {}: {} ({})",
                        "✗".red(),
                        bad.line,
                        bad.reason,
                        bad.text.trim().dimmed()
                    );
                }

                if header.is_empty() {
                    println!("{} declares no dependencies", self.file.display());
                } else {
                    for dependency in &header.dependencies {
                        println!("{dependency}");
                    }
                    if !header.options.is_empty() {
                        println!("{}", header.options);
                    }
                }
            }
        }

        Ok(())
    }
}
