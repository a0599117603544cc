//! The outcome of one resolution request.
//!
//! Resolution is best-effort: problems that only affect part of the bundle are
//! collected here next to the load order instead of aborting it. Callers that
//! want all-or-nothing behavior call [`Resolution::ensure_resolved`].

use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::constants::NO_COMBINE_FLAG;
use crate::core::ScriptDepsError;
use crate::header::OptionsRecord;
use crate::resolver::dependency_graph::{DependencyCycle, DependencyGraph};
use crate::utils::paths::ScriptPath;

/// One file in load order.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedFile {
    /// Root-relative path
    pub path: ScriptPath,
    /// Flags from the file's own `using-options` lines
    #[serde(skip_serializing_if = "OptionsRecord::is_empty")]
    pub options: OptionsRecord,
    /// Option tokens other files attached when declaring this one
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference_options: Vec<String>,
    /// Direct dependencies in declaration order
    pub dependencies: Vec<ScriptPath>,
    /// File contents as read during resolution
    #[serde(skip)]
    pub content: String,
}

impl ResolvedFile {
    /// Whether the file must be served on its own, either because it says so or
    /// because a declaring file asked for it.
    #[must_use]
    pub fn no_combine(&self) -> bool {
        self.options.no_combine()
            || self.reference_options.iter().any(|o| o.eq_ignore_ascii_case(NO_COMBINE_FLAG))
    }
}

/// A declared or requested name that did not become a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedDependency {
    /// The name as written
    pub name: String,
    /// Declaring file, or `<request>`
    pub from: String,
    /// What went wrong
    pub reason: String,
    /// Closest existing file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<ScriptPath>,
}

/// A skipped declaration line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedDeclaration {
    /// File containing the line
    pub file: ScriptPath,
    /// 1-based line number
    pub line: usize,
    /// The line as written
    pub text: String,
    /// Why it was rejected
    pub reason: String,
}

/// Load order plus every problem found on the way.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Files named by the request, after resolution, in request order
    pub requested: Vec<ScriptPath>,
    /// All files in load order, dependencies first
    pub files: Vec<ResolvedFile>,
    /// Dependency cycles, which are ordered by discovery among their members
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cycles: Vec<DependencyCycle>,
    /// Names that matched no readable file
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<UnresolvedDependency>,
    /// Declaration lines that were skipped
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub malformed: Vec<MalformedDeclaration>,
    #[serde(skip)]
    pub(crate) graph: DependencyGraph,
}

impl Resolution {
    /// Paths in load order.
    #[must_use]
    pub fn paths(&self) -> Vec<&ScriptPath> {
        self.files.iter().map(|f| &f.path).collect()
    }

    /// Look up a resolved file.
    #[must_use]
    pub fn get(&self, path: &ScriptPath) -> Option<&ResolvedFile> {
        self.files.iter().find(|f| &f.path == path)
    }

    /// Number of recorded problems of any kind.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.cycles.len() + self.unresolved.len() + self.malformed.len()
    }

    /// Whether resolution found no problems at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }

    /// Fail on the first unresolved name or malformed declaration.
    ///
    /// Cycles are not an error here: the load order already accounts for them.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptDepsError::UnresolvedDependency`] or
    /// [`ScriptDepsError::MalformedDeclaration`].
    pub fn ensure_resolved(&self) -> Result<()> {
        if let Some(missing) = self.unresolved.first() {
            let reason = match &missing.suggestion {
                Some(suggestion) => format!("{} (did you mean '{suggestion}'?)", missing.reason),
                None => missing.reason.clone(),
            };
            return Err(ScriptDepsError::UnresolvedDependency {
                name: missing.name.clone(),
                from: missing.from.clone(),
                reason,
            }
            .into());
        }

        if let Some(bad) = self.malformed.first() {
            return Err(ScriptDepsError::MalformedDeclaration {
                file: bad.file.to_string(),
                line: bad.line,
                reason: bad.reason.clone(),
            }
            .into());
        }

        Ok(())
    }

    /// SHA-256 over the ordered paths and contents, as `sha256:<hex>`.
    ///
    /// Two resolutions with the same fingerprint produce byte-identical bundles,
    /// so the value can key an external bundle cache.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for file in &self.files {
            hasher.update(file.path.as_str().as_bytes());
            hasher.update([0u8]);
            hasher.update(file.content.as_bytes());
            hasher.update([0u8]);
        }
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }

    /// Dependency tree below each requested file.
    #[must_use]
    pub fn to_tree_string(&self) -> String {
        self.requested.iter().map(|root| self.graph.to_tree_string(root)).collect()
    }

    /// The underlying graph.
    #[must_use]
    pub const fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> ResolvedFile {
        ResolvedFile {
            path: ScriptPath::parse(path).unwrap(),
            options: OptionsRecord::new(),
            reference_options: Vec::new(),
            dependencies: Vec::new(),
            content: content.to_string(),
        }
    }

    fn resolution(files: Vec<ResolvedFile>) -> Resolution {
        Resolution {
            requested: Vec::new(),
            files,
            cycles: Vec::new(),
            unresolved: Vec::new(),
            malformed: Vec::new(),
            graph: DependencyGraph::new(),
        }
    }

    #[test]
    fn test_fingerprint_depends_on_order_and_content() {
        let a = resolution(vec![file("a.js", "1"), file("b.js", "2")]);
        let same = resolution(vec![file("a.js", "1"), file("b.js", "2")]);
        let swapped = resolution(vec![file("b.js", "2"), file("a.js", "1")]);
        let edited = resolution(vec![file("a.js", "1"), file("b.js", "3")]);
        // Moving bytes across the path/content boundary changes the hash
        let shifted = resolution(vec![file("a.js", "1b.js"), file("b.js", "2")]);

        assert!(a.fingerprint().starts_with("sha256:"));
        assert_eq!(a.fingerprint().len(), "sha256:".len() + 64);
        assert_eq!(a.fingerprint(), same.fingerprint());
        assert_ne!(a.fingerprint(), swapped.fingerprint());
        assert_ne!(a.fingerprint(), edited.fingerprint());
        assert_ne!(a.fingerprint(), shifted.fingerprint());
    }

    #[test]
    fn test_ensure_resolved_reports_unresolved_first() {
        let mut result = resolution(vec![file("a.js", "")]);
        assert!(result.ensure_resolved().is_ok());
        assert!(result.is_clean());

        result.malformed.push(MalformedDeclaration {
            file: ScriptPath::parse("a.js").unwrap(),
            line: 2,
            text: "using;".to_string(),
            reason: "'using' declaration has no dependency name".to_string(),
        });
        result.unresolved.push(UnresolvedDependency {
            name: "utill".to_string(),
            from: "a.js".to_string(),
            reason: "no file matching 'utill.js'".to_string(),
            suggestion: ScriptPath::parse("util.js"),
        });

        let err = result.ensure_resolved().unwrap_err();
        let Some(ScriptDepsError::UnresolvedDependency {
            reason,
            ..
        }) = err.downcast_ref::<ScriptDepsError>()
        else {
            panic!("expected unresolved dependency error");
        };
        assert!(reason.contains("did you mean 'util.js'"));
        assert_eq!(result.issue_count(), 2);

        result.unresolved.clear();
        let err = result.ensure_resolved().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_no_combine_from_either_side() {
        let mut own = file("a.js", "");
        assert!(!own.no_combine());
        own.options.insert("nocombine");
        assert!(own.no_combine());

        let mut referenced = file("b.js", "");
        referenced.reference_options.push("NoCombine".to_string());
        assert!(referenced.no_combine());
    }

    #[test]
    fn test_json_omits_content_and_empty_sections() {
        let result = resolution(vec![file("a.js", "secret")]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["files"][0]["path"], "a.js");
        assert!(json["files"][0].get("content").is_none());
        assert!(json.get("cycles").is_none());
        assert!(json.get("graph").is_none());
    }
}
