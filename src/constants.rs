//! Constants shared across the scriptdeps codebase.
//!
//! Wire-format literals live here so the classifier, the filename resolver and
//! the CLI agree on them.

/// Placeholder inside a dependency name that stands for a version token.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "scriptdeps.toml";

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV_VAR: &str = "SCRIPTDEPS_CONFIG";

/// Extension appended to dependency names that have none.
pub const DEFAULT_EXTENSION: &str = "js";

/// Options flag marking a file that must be served on its own rather than
/// concatenated into the bundle.
pub const NO_COMBINE_FLAG: &str = "nocombine";

/// Declaring-file label used for files named directly in a request.
pub const REQUEST_ORIGIN: &str = "<request>";

/// Largest edit distance for which an unresolved name gets a "did you mean" hint.
pub const MAX_SUGGESTION_DISTANCE: usize = 3;
