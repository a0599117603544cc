//! Root-relative script paths.
//!
//! Every file the resolver touches is identified by a [`ScriptPath`]: a
//! `/`-separated path relative to the script root with `.` segments removed and
//! `..` segments collapsed. Two spellings of the same file (`lib/../app.js`,
//! `./app.js`, `app.js`) therefore map to the same graph node.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A normalized path relative to the script root.
///
/// The empty path denotes the root directory itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptPath(String);

impl ScriptPath {
    /// The script root directory.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Normalize a raw path string.
    ///
    /// Backslashes are treated as separators, leading `/` and `~/` mark the root,
    /// `.` is dropped and `..` pops the previous segment. Returns `None` when the
    /// path would escape the root.
    ///
    /// ```rust
    /// use scriptdeps_cli::utils::paths::ScriptPath;
    ///
    /// let path = ScriptPath::parse("./lib/../app.js").unwrap();
    /// assert_eq!(path.as_str(), "app.js");
    /// assert!(ScriptPath::parse("../outside.js").is_none());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let unified = raw.trim().replace('\\', "/");
        let relative = unified.strip_prefix("~/").unwrap_or(&unified);
        Self::root().join(relative)
    }

    /// Join a relative path onto this directory path, normalizing the result.
    #[must_use]
    pub fn join(&self, relative: &str) -> Option<Self> {
        let mut segments: Vec<&str> = if self.0.is_empty() {
            Vec::new()
        } else {
            self.0.split('/').collect()
        };

        for segment in relative.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop()?;
                }
                s => segments.push(s),
            }
        }

        Some(Self(segments.join("/")))
    }

    /// The containing directory (the root for top-level files).
    #[must_use]
    pub fn parent(&self) -> Self {
        match self.0.rfind('/') {
            Some(pos) => Self(self.0[..pos].to_string()),
            None => Self::root(),
        }
    }

    /// The final path segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Whether this is the root directory.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The normalized string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute filesystem location below `root`.
    #[must_use]
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        self.0.split('/').filter(|s| !s.is_empty()).fold(root.to_path_buf(), |acc, s| acc.join(s))
    }

    /// Build a script path from a filesystem path below `root`.
    ///
    /// Returns `None` if `path` is not inside `root` or is not valid UTF-8.
    #[must_use]
    pub fn from_fs_path(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                std::path::Component::Normal(part) => parts.push(part.to_str()?),
                std::path::Component::CurDir => {}
                _ => return None,
            }
        }
        Some(Self(parts.join("/")))
    }
}

impl fmt::Display for ScriptPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Whether a request identifier is a glob pattern rather than a single file.
#[must_use]
pub fn is_glob_pattern(identifier: &str) -> bool {
    identifier.contains(['*', '?', '['])
}
