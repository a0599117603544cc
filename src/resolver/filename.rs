//! Mapping declared dependency names to concrete files.
//!
//! A `using` name is resolved in three steps:
//!
//! 1. The default extension is appended when the last segment has none of the
//!    configured extensions (`jquery` becomes `jquery.js`).
//! 2. The search directories are chosen. Names starting with `~/` or `/` are
//!    looked up from the script root only. Other names are tried relative to the
//!    declaring file's directory and then relative to each library path.
//! 3. In each directory the file name is matched against the directory listing,
//!    exactly, or with a version token in place of `{version}`. The first
//!    directory with a match wins.
//!
//! Directory listings are cached for the lifetime of a [`FilenameResolver`],
//! which the resolver creates once per request.

use glob::Pattern;
use regex::Regex;
use std::collections::HashMap;
use strsim::levenshtein;
use thiserror::Error;
use tracing::{debug, trace};

use crate::constants::{DEFAULT_EXTENSION, MAX_SUGGESTION_DISTANCE, VERSION_PLACEHOLDER};
use crate::resolver::source::ScriptSource;
use crate::utils::paths::{ScriptPath, is_glob_pattern};
use crate::version::{VERSION_PATTERN, VersionComparator, VersionToken, VersionedCandidate};

/// Why a name could not be mapped to a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
    /// The name climbs above the script root.
    #[error("'{name}' points outside the script root")]
    OutsideRoot {
        /// The name as declared
        name: String,
    },

    /// `{version}` appears in a directory segment.
    #[error("'{name}' uses {{version}} outside the file name")]
    PlaceholderInDirectory {
        /// The name as declared
        name: String,
    },

    /// A glob request is malformed or globs a directory segment.
    #[error("'{pattern}' is not a supported pattern: {reason}")]
    InvalidPattern {
        /// The pattern as requested
        pattern: String,
        /// What is wrong with it
        reason: String,
    },

    /// No directory listing contained a matching file.
    #[error("no file matching '{file_name}' in {}", format_dirs(.searched))]
    NoMatch {
        /// The file name that was looked for, extension included
        file_name: String,
        /// Directories that were searched, in order
        searched: Vec<ScriptPath>,
        /// Closest existing file, if one is close enough
        suggestion: Option<ScriptPath>,
    },

    /// A directory could not be listed.
    #[error("cannot list '{dir}': {reason}")]
    ListFailed {
        /// Directory that failed
        dir: ScriptPath,
        /// Underlying failure
        reason: String,
    },
}

impl FilenameError {
    /// The "did you mean" candidate, if any.
    #[must_use]
    pub fn suggestion(&self) -> Option<&ScriptPath> {
        match self {
            Self::NoMatch {
                suggestion,
                ..
            } => suggestion.as_ref(),
            _ => None,
        }
    }
}

fn format_dirs(dirs: &[ScriptPath]) -> String {
    dirs.iter().map(|d| format!("'{d}'")).collect::<Vec<_>>().join(", ")
}

/// Pick the file in `candidates` that satisfies `template`.
///
/// `template` is a bare file name. Without `{version}` it must appear verbatim.
/// With it, every candidate carrying the same literal prefix and suffix around
/// a version token qualifies and the greatest version wins.
///
/// ```rust
/// use scriptdeps_cli::resolver::filename::match_filename;
///
/// let candidates = ["lib-1.2.js", "lib-1.10.js", "lib-1.2-beta.js"].map(String::from);
/// assert_eq!(match_filename("lib-{version}.js", &candidates).as_deref(), Some("lib-1.10.js"));
/// assert_eq!(match_filename("lib-1.2.js", &candidates).as_deref(), Some("lib-1.2.js"));
/// assert_eq!(match_filename("other.js", &candidates), None);
/// ```
#[must_use]
pub fn match_filename(template: &str, candidates: &[String]) -> Option<String> {
    let Some((prefix, suffix)) = template.split_once(VERSION_PLACEHOLDER) else {
        return candidates.iter().find(|c| c.as_str() == template).cloned();
    };

    let pattern = format!(
        "^{}(?P<version>{VERSION_PATTERN}){}$",
        regex::escape(prefix),
        regex::escape(suffix)
    );
    let regex = Regex::new(&pattern).ok()?;

    let matches: Vec<VersionedCandidate> = candidates
        .iter()
        .filter_map(|candidate| {
            let caps = regex.captures(candidate)?;
            let version = caps["version"].parse::<VersionToken>().ok()?;
            Some(VersionedCandidate::new(candidate.clone(), version))
        })
        .collect();

    trace!("Template '{}' matched {} candidate(s)", template, matches.len());
    VersionComparator::select_best(&matches).map(|best| best.file_name.clone())
}

/// Resolves declared names against a [`ScriptSource`], caching listings.
pub struct FilenameResolver<'a, S: ScriptSource + ?Sized> {
    source: &'a S,
    library_paths: &'a [ScriptPath],
    extensions: &'a [String],
    listings: HashMap<ScriptPath, Vec<String>>,
}

impl<'a, S: ScriptSource + ?Sized> FilenameResolver<'a, S> {
    /// Create a resolver. An empty `extensions` list means `js`.
    pub fn new(source: &'a S, library_paths: &'a [ScriptPath], extensions: &'a [String]) -> Self {
        Self {
            source,
            library_paths,
            extensions,
            listings: HashMap::new(),
        }
    }

    fn default_extension(&self) -> &str {
        self.extensions.first().map_or(DEFAULT_EXTENSION, String::as_str)
    }

    fn has_known_extension(&self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        if self.extensions.is_empty() {
            return lower.ends_with(&format!(".{DEFAULT_EXTENSION}"));
        }
        self.extensions.iter().any(|ext| lower.ends_with(&format!(".{}", ext.to_ascii_lowercase())))
    }

    /// Append the default extension when the last segment lacks a known one.
    #[must_use]
    pub fn with_extension(&self, name: &str) -> String {
        let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
        if self.has_known_extension(last) {
            name.to_string()
        } else {
            format!("{name}.{}", self.default_extension())
        }
    }

    /// Directory listing, fetched at most once per directory.
    fn listing(&mut self, dir: &ScriptPath) -> Result<&[String], FilenameError> {
        if !self.listings.contains_key(dir) {
            let names = self.source.list_candidates(dir).map_err(|e| FilenameError::ListFailed {
                dir: dir.clone(),
                reason: format!("{e:#}"),
            })?;
            trace!("Listed {} file(s) in '{}'", names.len(), dir);
            self.listings.insert(dir.clone(), names);
        }
        Ok(self.listings.get(dir).map(Vec::as_slice).unwrap_or_default())
    }

    /// Directories to try for `name`, in priority order, without duplicates.
    fn search_dirs(&self, name: &str, from_dir: Option<&ScriptPath>) -> Vec<ScriptPath> {
        let trimmed = name.trim_start();
        if trimmed.starts_with("~/") || trimmed.starts_with('/') || trimmed.starts_with('\\') {
            return vec![ScriptPath::root()];
        }

        let mut dirs = vec![from_dir.cloned().unwrap_or_else(ScriptPath::root)];
        for library in self.library_paths {
            if !dirs.contains(library) {
                dirs.push(library.clone());
            }
        }
        dirs
    }

    /// Resolve a declared name.
    ///
    /// `from_dir` is the declaring file's directory, or `None` for names
    /// requested directly (which are relative to the script root).
    ///
    /// # Errors
    ///
    /// Returns a [`FilenameError`] describing what was tried when nothing
    /// matches.
    pub fn resolve(
        &mut self,
        name: &str,
        from_dir: Option<&ScriptPath>,
    ) -> Result<ScriptPath, FilenameError> {
        let with_ext = self.with_extension(name);
        let relative = with_ext.trim().trim_start_matches("~/").trim_start_matches(['/', '\\']);

        let (dir_part, file_name) = match relative.rfind(['/', '\\']) {
            Some(pos) => (&relative[..pos], &relative[pos + 1..]),
            None => ("", relative),
        };
        if dir_part.contains(VERSION_PLACEHOLDER) {
            return Err(FilenameError::PlaceholderInDirectory {
                name: name.to_string(),
            });
        }

        let mut searched = Vec::new();
        for base in self.search_dirs(name, from_dir) {
            let Some(dir) = base.join(dir_part) else {
                continue;
            };
            if searched.contains(&dir) {
                continue;
            }

            let candidates = self.listing(&dir)?;
            if let Some(found) = match_filename(file_name, candidates) {
                if let Some(path) = dir.join(&found) {
                    debug!("Resolved '{}' to '{}'", name, path);
                    return Ok(path);
                }
            }
            searched.push(dir);
        }

        if searched.is_empty() {
            return Err(FilenameError::OutsideRoot {
                name: name.to_string(),
            });
        }

        let suggestion = self.suggest(file_name, &searched);
        Err(FilenameError::NoMatch {
            file_name: file_name.to_string(),
            searched,
            suggestion,
        })
    }

    /// Closest cached candidate to `file_name` across `dirs`.
    fn suggest(&self, file_name: &str, dirs: &[ScriptPath]) -> Option<ScriptPath> {
        let target = file_name.to_ascii_lowercase();
        dirs.iter()
            .filter_map(|dir| self.listings.get(dir).map(|names| (dir, names)))
            .flat_map(|(dir, names)| names.iter().map(move |name| (dir, name)))
            .map(|(dir, name)| (levenshtein(&target, &name.to_ascii_lowercase()), dir, name))
            .filter(|(distance, _, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _, _)| *distance)
            .and_then(|(_, dir, name)| dir.join(name))
    }

    /// Expand a glob request such as `widgets/*.js` against the listing of its
    /// directory. Only the last segment may contain wildcards.
    ///
    /// Matches are restricted to the configured extensions and sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid patterns and for patterns that match nothing.
    pub fn expand_pattern(&mut self, pattern: &str) -> Result<Vec<ScriptPath>, FilenameError> {
        let Some(path) = ScriptPath::parse(pattern) else {
            return Err(FilenameError::OutsideRoot {
                name: pattern.to_string(),
            });
        };

        let dir = path.parent();
        if is_glob_pattern(dir.as_str()) {
            return Err(FilenameError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "wildcards are only supported in the file name".to_string(),
            });
        }

        let matcher = Pattern::new(path.file_name()).map_err(|e| FilenameError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let names: Vec<String> = self
            .listing(&dir)?
            .iter()
            .filter(|name| matcher.matches(name))
            .cloned()
            .collect();
        let matches: Vec<ScriptPath> = names
            .iter()
            .filter(|name| self.has_known_extension(name))
            .filter_map(|name| dir.join(name))
            .collect();

        if matches.is_empty() {
            return Err(FilenameError::NoMatch {
                file_name: path.file_name().to_string(),
                searched: vec![dir],
                suggestion: None,
            });
        }

        debug!("Pattern '{}' matched {} file(s)", pattern, matches.len());
        Ok(matches)
    }
}
