//! Project configuration for scriptdeps
//!
//! A project is described by an optional `scriptdeps.toml`. It is found by
//! searching the current directory and each parent, or named explicitly with
//! `--config` / `SCRIPTDEPS_CONFIG`. Every field is optional:
//!
//! ```toml
//! # Script root, relative to this file
//! root = "scripts"
//!
//! # Searched, in order, after the declaring file's own directory
//! library_paths = ["lib", "vendor"]
//!
//! # Recognized script extensions; the first is appended to bare names
//! extensions = ["js"]
//!
//! # Fail on unresolved or malformed declarations instead of warning
//! strict = false
//!
//! [bundles]
//! app = ["app.js", "admin/panel.js"]
//! widgets = ["widgets/*.js"]
//! ```
//!
//! Without a configuration file the current directory is the script root and
//! all defaults apply.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_EXTENSION};
use crate::core::ScriptDepsError;
use crate::resolver::ResolverOptions;
use crate::utils::paths::ScriptPath;

fn default_extensions() -> Vec<String> {
    vec![DEFAULT_EXTENSION.to_string()]
}

/// Contents of `scriptdeps.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Script root, relative to the configuration file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Root-relative library directories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub library_paths: Vec<String>,

    /// Script extensions without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Treat unresolved and malformed declarations as errors.
    #[serde(default)]
    pub strict: bool,

    /// Named lists of requested files.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bundles: BTreeMap<String, Vec<String>>,

    /// Directory the configuration was loaded from.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: None,
            library_paths: Vec::new(),
            extensions: default_extensions(),
            strict: false,
            bundles: BTreeMap::new(),
            base_dir: None,
        }
    }
}

impl ProjectConfig {
    /// Defaults anchored at `dir`, for projects without a configuration file.
    #[must_use]
    pub fn for_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, has
    /// unknown keys, or fails [`validate`](Self::validate).
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let config = Self::parse(&content, path, base_dir)?;
        debug!(
            "Loaded {} ({} library path(s), {} bundle(s))",
            path.display(),
            config.library_paths.len(),
            config.bundles.len()
        );
        Ok(config)
    }

    /// Parse configuration text. `file` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptDepsError::ConfigParseError`] for TOML problems and
    /// [`ScriptDepsError::ConfigError`] for invalid values.
    pub fn parse(content: &str, file: &Path, base_dir: PathBuf) -> Result<Self> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| ScriptDepsError::ConfigParseError {
                file: file.display().to_string(),
                reason: e.to_string(),
            })?;
        config.base_dir = Some(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn normalize(&mut self) {
        for ext in &mut self.extensions {
            *ext = ext.trim().trim_start_matches('.').to_string();
        }
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptDepsError::ConfigError`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| ScriptDepsError::ConfigError {
            message,
        };

        if self.extensions.is_empty() {
            return Err(invalid("'extensions' must list at least one extension".to_string()).into());
        }
        if let Some(ext) = self.extensions.iter().find(|e| e.is_empty() || e.contains(['/', '\\'])) {
            return Err(invalid(format!("'{ext}' is not a valid file extension")).into());
        }

        for library in &self.library_paths {
            if ScriptPath::parse(library).is_none() {
                return Err(invalid(format!(
                    "library path '{library}' points outside the script root"
                ))
                .into());
            }
        }

        for (name, files) in &self.bundles {
            if files.is_empty() {
                return Err(invalid(format!("bundle '{name}' lists no files")).into());
            }
        }

        Ok(())
    }

    /// The directory script paths are relative to.
    #[must_use]
    pub fn script_root(&self) -> PathBuf {
        let base = self.base_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        match &self.root {
            Some(root) => base.join(root),
            None => base,
        }
    }

    /// Search settings for the resolver.
    #[must_use]
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            library_paths: self.library_paths.iter().filter_map(|p| ScriptPath::parse(p)).collect(),
            extensions: self.extensions.clone(),
        }
    }

    /// Files of a named bundle.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptDepsError::BundleNotFound`] for unknown names.
    pub fn bundle(&self, name: &str) -> Result<&[String]> {
        self.bundles.get(name).map(Vec::as_slice).ok_or_else(|| {
            ScriptDepsError::BundleNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }
}

/// Find `scriptdeps.toml` in the current directory or a parent.
///
/// # Errors
///
/// Returns [`ScriptDepsError::ConfigNotFound`] when no file exists up to the
/// filesystem root.
pub fn find_config() -> Result<PathBuf> {
    let current = std::env::current_dir()
        .context("Cannot determine current working directory. This may indicate a permission issue or corrupted filesystem")?;
    find_config_from(current)
}

/// Use `explicit_path` when given, otherwise search from the current directory.
///
/// # Errors
///
/// Returns [`ScriptDepsError::ConfigNotFound`] when the explicit file does not
/// exist or the search finds nothing.
pub fn find_config_with_optional(explicit_path: Option<PathBuf>) -> Result<PathBuf> {
    match explicit_path {
        Some(path) => {
            if path.exists() {
                Ok(path)
            } else {
                Err(ScriptDepsError::ConfigNotFound.into())
            }
        }
        None => find_config(),
    }
}

/// Search `current` and its ancestors for `scriptdeps.toml`.
///
/// # Errors
///
/// Returns [`ScriptDepsError::ConfigNotFound`] when nothing is found.
pub fn find_config_from(mut current: PathBuf) -> Result<PathBuf> {
    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(ScriptDepsError::ConfigNotFound.into());
        }
    }
}
