//! Error handling for scriptdeps
//!
//! This module provides the error types and user-friendly error reporting used by
//! the resolver and the `scriptdeps` command line. The error system follows two
//! principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`ScriptDepsError`] - Enumerated error kinds for every failure in scriptdeps
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! Resolution problems that only affect part of a bundle (an unresolved `using`
//! line, a malformed declaration, a cycle) are collected in the resolver's report
//! rather than raised. They only become a [`ScriptDepsError`] when a caller asks
//! for strict behavior.
//!
//! # Examples
//!
//! ```rust,no_run
//! use scriptdeps_cli::core::{ScriptDepsError, user_friendly_error};
//!
//! let error = ScriptDepsError::UnresolvedDependency {
//!     name: "jquery-{version}.js".to_string(),
//!     from: "app.js".to_string(),
//!     reason: "no candidate matched".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for scriptdeps operations.
///
/// # Error Categories
///
/// ## Declarations and resolution
/// - [`MalformedDeclaration`] - A `using`/`using-options` line failed its grammar
/// - [`UnresolvedDependency`] - A declared name matched no file
/// - [`CyclicDependency`] - Files depend on each other in a loop
///
/// ## Configuration
/// - [`ConfigNotFound`] - No `scriptdeps.toml` could be located
/// - [`ConfigParseError`] - The configuration file is not valid TOML
/// - [`ConfigError`] - The configuration is valid TOML but unusable
/// - [`BundleNotFound`] - A named bundle is not defined in the configuration
///
/// [`MalformedDeclaration`]: ScriptDepsError::MalformedDeclaration
/// [`UnresolvedDependency`]: ScriptDepsError::UnresolvedDependency
/// [`CyclicDependency`]: ScriptDepsError::CyclicDependency
/// [`ConfigNotFound`]: ScriptDepsError::ConfigNotFound
/// [`ConfigParseError`]: ScriptDepsError::ConfigParseError
/// [`ConfigError`]: ScriptDepsError::ConfigError
/// [`BundleNotFound`]: ScriptDepsError::BundleNotFound
#[derive(Error, Debug)]
pub enum ScriptDepsError {
    /// A declaration line matched the `using` keyword but not its grammar.
    ///
    /// The offending line is skipped; the rest of the file is still scanned.
    #[error("Malformed declaration in '{file}' at line {line}: {reason}")]
    MalformedDeclaration {
        /// File containing the declaration
        file: String,
        /// 1-based line number
        line: usize,
        /// Why the declaration was rejected
        reason: String,
    },

    /// A declared dependency name could not be matched to a file.
    #[error("Cannot resolve dependency '{name}' declared in '{from}'")]
    UnresolvedDependency {
        /// The symbolic name as declared
        name: String,
        /// The declaring file, or `<request>` for requested files
        from: String,
        /// What was tried
        reason: String,
    },

    /// Files depend on each other in a loop.
    #[error("Circular dependency detected: {chain}")]
    CyclicDependency {
        /// Cycle path rendered as `a.js → b.js → a.js`
        chain: String,
    },

    /// No configuration file found.
    #[error("Configuration file scriptdeps.toml not found in current directory or any parent directory")]
    ConfigNotFound,

    /// Configuration file is not valid TOML or does not match the schema.
    #[error("Invalid configuration file syntax in {file}")]
    ConfigParseError {
        /// Path to the configuration file
        file: String,
        /// Parser message
        reason: String,
    },

    /// Configuration is structurally valid but unusable.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// Requested bundle name is not configured.
    #[error("Bundle '{name}' is not defined in scriptdeps.toml")]
    BundleNotFound {
        /// The requested bundle name
        name: String,
    },

    /// Standard I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Anything else, carried as a message.
    #[error("{message}")]
    Other {
        /// The error message
        message: String,
    },
}

/// Error wrapper that adds user-facing details and a suggestion.
///
/// ```rust,no_run
/// use scriptdeps_cli::core::{ErrorContext, ScriptDepsError};
///
/// let context = ErrorContext::new(ScriptDepsError::ConfigNotFound)
///     .with_suggestion("Create a scriptdeps.toml or pass --root")
///     .with_details("scriptdeps searches the current directory and its parents");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ScriptDepsError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ScriptDepsError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach additional details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] for CLI display.
///
/// Recognizes [`ScriptDepsError`], [`std::io::Error`] and [`toml::de::Error`];
/// everything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<ScriptDepsError>() {
        Ok(script_error) => return create_error_context(script_error),
        Err(other) => other,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(ScriptDepsError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check the permissions of the script root and its files");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(ScriptDepsError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(ScriptDepsError::ConfigParseError {
            file: "scriptdeps.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in scriptdeps.toml. Verify quotes, brackets, and keys");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ScriptDepsError::Other {
        message,
    })
}

fn create_error_context(error: ScriptDepsError) -> ErrorContext {
    match &error {
        ScriptDepsError::MalformedDeclaration { .. } => {
            let details = "Declarations have the form 'using <name> [option...];' or \
                           'using-options <flag> [flag...];'"
                .to_string();
            ErrorContext::new(error)
                .with_suggestion("Give the declaration a name, or turn the line into a plain comment")
                .with_details(details)
        }
        ScriptDepsError::UnresolvedDependency { reason, .. } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_suggestion(
                    "Check the file name, add its directory to 'library_paths', or rerun without --strict",
                )
                .with_details(details)
        }
        ScriptDepsError::CyclicDependency { .. } => ErrorContext::new(error)
            .with_suggestion("Remove one of the 'using' lines on the cycle path")
            .with_details("Files on a cycle are emitted in the order they were first discovered"),
        ScriptDepsError::ConfigNotFound => ErrorContext::new(error)
            .with_suggestion("Create a scriptdeps.toml, or pass --root to point at the script directory")
            .with_details("scriptdeps looks for scriptdeps.toml in the current directory and every parent"),
        ScriptDepsError::ConfigParseError { reason, .. } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_suggestion("Check the TOML syntax in scriptdeps.toml")
                .with_details(details)
        }
        ScriptDepsError::BundleNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Add the bundle under [bundles] in scriptdeps.toml or list files explicitly"),
        _ => ErrorContext::new(error),
    }
}
