//! File access for the resolver.
//!
//! The resolver never touches the filesystem directly; it asks a
//! [`ScriptSource`] to read a file or list a directory. Two implementations are
//! provided:
//!
//! - [`FsScriptSource`] reads from a script root on disk
//! - [`MemoryScriptSource`] holds files in memory, for tests and for callers that
//!   already have the contents loaded

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

use crate::utils::paths::ScriptPath;

/// Read-only access to script files below a root.
pub trait ScriptSource {
    /// Read a file's full text.
    ///
    /// # Errors
    ///
    /// Returns an error when the file does not exist or cannot be read.
    fn read_file(&self, path: &ScriptPath) -> Result<String>;

    /// File names (not paths) directly inside `dir`, sorted.
    ///
    /// A directory that does not exist lists as empty.
    ///
    /// # Errors
    ///
    /// Returns an error when an existing directory cannot be read.
    fn list_candidates(&self, dir: &ScriptPath) -> Result<Vec<String>>;
}

impl<S: ScriptSource + ?Sized> ScriptSource for &S {
    fn read_file(&self, path: &ScriptPath) -> Result<String> {
        (**self).read_file(path)
    }

    fn list_candidates(&self, dir: &ScriptPath) -> Result<Vec<String>> {
        (**self).list_candidates(dir)
    }
}

/// Scripts stored on disk below a root directory.
#[derive(Debug, Clone)]
pub struct FsScriptSource {
    root: PathBuf,
}

impl FsScriptSource {
    /// Serve scripts from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// The script root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every script below the root whose extension is in `extensions`, sorted.
    ///
    /// Symlinks are not followed and unreadable entries are skipped.
    #[must_use]
    pub fn discover_scripts(&self, extensions: &[String]) -> Vec<ScriptPath> {
        let mut scripts: Vec<ScriptPath> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            })
            .filter_map(|entry| ScriptPath::from_fs_path(&self.root, entry.path()))
            .collect();

        scripts.sort();
        trace!("Discovered {} script(s) under {}", scripts.len(), self.root.display());
        scripts
    }
}

impl ScriptSource for FsScriptSource {
    fn read_file(&self, path: &ScriptPath) -> Result<String> {
        let fs_path = path.to_fs_path(&self.root);
        let bytes = std::fs::read(&fs_path)
            .with_context(|| format!("Failed to read {}", fs_path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn list_candidates(&self, dir: &ScriptPath) -> Result<Vec<String>> {
        let fs_dir = dir.to_fs_path(&self.root);
        if !fs_dir.is_dir() {
            trace!("Search directory {} does not exist", fs_dir.display());
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&fs_dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry =
                entry.with_context(|| format!("Failed to list directory {}", fs_dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}

/// Scripts held in memory, keyed by root-relative path.
#[derive(Debug, Clone, Default)]
pub struct MemoryScriptSource {
    files: BTreeMap<ScriptPath, String>,
}

impl MemoryScriptSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file. Paths that escape the root are ignored.
    pub fn insert(&mut self, path: &str, contents: impl Into<String>) -> &mut Self {
        if let Some(path) = ScriptPath::parse(path) {
            self.files.insert(path, contents.into());
        }
        self
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_file(mut self, path: &str, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Number of files held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ScriptSource for MemoryScriptSource {
    fn read_file(&self, path: &ScriptPath) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No such file: {path}"))
    }

    fn list_candidates(&self, dir: &ScriptPath) -> Result<Vec<String>> {
        // BTreeMap iteration is already sorted
        Ok(self
            .files
            .keys()
            .filter(|path| &path.parent() == dir)
            .map(|path| path.file_name().to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn p(name: &str) -> ScriptPath {
        ScriptPath::parse(name).unwrap()
    }

    #[test]
    fn test_memory_source_read_and_list() {
        let source = MemoryScriptSource::new()
            .with_file("app.js", "using lib/a;")
            .with_file("lib/b.js", "")
            .with_file("lib/a.js", "")
            .with_file("lib/deep/c.js", "");

        assert_eq!(source.read_file(&p("app.js")).unwrap(), "using lib/a;");
        assert!(source.read_file(&p("missing.js")).is_err());
        assert_eq!(source.list_candidates(&p("lib")).unwrap(), ["a.js", "b.js"]);
        assert_eq!(source.list_candidates(&ScriptPath::root()).unwrap(), ["app.js"]);
        assert!(source.list_candidates(&p("nowhere")).unwrap().is_empty());
    }

    #[test]
    fn test_fs_source_read_and_list() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("lib/nested")).unwrap();
        std::fs::write(temp.path().join("app.js"), "run();").unwrap();
        std::fs::write(temp.path().join("lib/b.js"), "").unwrap();
        std::fs::write(temp.path().join("lib/a.js"), "").unwrap();
        std::fs::write(temp.path().join("lib/nested/c.js"), "").unwrap();

        let source = FsScriptSource::new(temp.path());
        assert_eq!(source.read_file(&p("app.js")).unwrap(), "run();");
        assert!(source.read_file(&p("missing.js")).is_err());
        assert_eq!(source.list_candidates(&p("lib")).unwrap(), ["a.js", "b.js"]);
        assert!(source.list_candidates(&p("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_fs_discover_scripts_filters_extensions() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("widgets")).unwrap();
        std::fs::write(temp.path().join("app.js"), "").unwrap();
        std::fs::write(temp.path().join("readme.md"), "").unwrap();
        std::fs::write(temp.path().join("widgets/grid.JS"), "").unwrap();

        let source = FsScriptSource::new(temp.path());
        let found = source.discover_scripts(&["js".to_string()]);
        let names: Vec<_> = found.iter().map(ScriptPath::as_str).collect();
        assert_eq!(names, ["app.js", "widgets/grid.JS"]);
    }

    #[test]
    fn test_source_by_reference() {
        let source = MemoryScriptSource::new().with_file("a.js", "x");
        let by_ref = &source;
        assert_eq!(by_ref.read_file(&p("a.js")).unwrap(), "x");
    }
}
