//! Picking the newest of several versioned file names.
//!
//! ```rust
//! use scriptdeps_cli::version::comparison::{VersionComparator, VersionedCandidate};
//!
//! let candidates: Vec<_> = [("lib-1.2.js", "1.2"), ("lib-1.10.js", "1.10"), ("lib-1.10-beta.js", "1.10-beta")]
//!     .into_iter()
//!     .map(|(name, version)| VersionedCandidate::new(name, version.parse().unwrap()))
//!     .collect();
//! let best = VersionComparator::select_best(&candidates).unwrap();
//! assert_eq!(best.file_name, "lib-1.10.js");
//! ```

use tracing::trace;

use crate::version::VersionToken;

/// A file name that matched a `{version}` template, with its parsed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedCandidate {
    /// The file name as listed in its directory
    pub file_name: String,
    /// The token that took the place of `{version}`
    pub version: VersionToken,
}

impl VersionedCandidate {
    /// Pair a file name with its version token.
    pub fn new(file_name: impl Into<String>, version: VersionToken) -> Self {
        Self {
            file_name: file_name.into(),
            version,
        }
    }
}

/// Version comparison helpers.
pub struct VersionComparator;

impl VersionComparator {
    /// Choose the candidate with the greatest version.
    ///
    /// Candidates whose tokens compare equal (`1.02` and `1.2`) are broken by
    /// file name, smallest first, so the choice never depends on listing order.
    #[must_use]
    pub fn select_best(candidates: &[VersionedCandidate]) -> Option<&VersionedCandidate> {
        let best = candidates.iter().max_by(|a, b| {
            a.version.cmp(&b.version).then_with(|| b.file_name.cmp(&a.file_name))
        });

        if let Some(best) = best {
            trace!(
                "Selected '{}' (version {}) from {} candidate(s)",
                best.file_name,
                best.version,
                candidates.len()
            );
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(file_name: &str, version: &str) -> VersionedCandidate {
        VersionedCandidate::new(file_name, version.parse().unwrap())
    }

    #[test]
    fn test_select_best_prefers_numeric_ordering() {
        let candidates = vec![
            candidate("lib-1.2.js", "1.2"),
            candidate("lib-1.10.js", "1.10"),
            candidate("lib-1.2-beta.js", "1.2-beta"),
        ];
        let best = VersionComparator::select_best(&candidates).unwrap();
        assert_eq!(best.file_name, "lib-1.10.js");
    }

    #[test]
    fn test_select_best_breaks_ties_by_file_name() {
        let forward = vec![candidate("lib-1.02.js", "1.02"), candidate("lib-1.2.js", "1.2")];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();
        assert_eq!(VersionComparator::select_best(&forward).unwrap().file_name, "lib-1.02.js");
        assert_eq!(VersionComparator::select_best(&reversed).unwrap().file_name, "lib-1.02.js");
    }

    #[test]
    fn test_select_best_empty() {
        assert!(VersionComparator::select_best(&[]).is_none());
    }
}
