//! Structured declarations parsed from header lines.
//!
//! A classified [`LineKind::Dependency`] becomes a [`DependencyReference`]; a
//! [`LineKind::Options`] line contributes flags to the file's [`OptionsRecord`].
//! Both serialize back to the exact wire grammar via [`fmt::Display`]:
//!
//! ```text
//! using <name> [<option>...];
//! using-options <flag> [<flag>...];
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::constants::{NO_COMBINE_FLAG, VERSION_PLACEHOLDER};
use crate::header::patterns::LineKind;

/// Why a declaration line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// `using` with no dependency name.
    #[error("'using' declaration has no dependency name")]
    EmptyName,
    /// `using-options` with no flags.
    #[error("'using-options' declaration has no flags")]
    EmptyOptions,
    /// A token outside the declaration grammar.
    #[error("'{0}' is not a valid token in a declaration")]
    InvalidToken(String),
}

/// A dependency named by a `using` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyReference {
    /// Symbolic name, possibly containing `{version}`.
    pub name: String,
    /// Modifier tokens following the name, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl DependencyReference {
    /// Create a reference with no options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Add an option token.
    #[must_use]
    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Whether the name contains the `{version}` placeholder.
    #[must_use]
    pub fn is_versioned(&self) -> bool {
        self.name.contains(VERSION_PLACEHOLDER)
    }

    /// Whether the given option token was declared.
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o.eq_ignore_ascii_case(option))
    }
}

impl fmt::Display for DependencyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "using {}", self.name)?;
        for option in &self.options {
            write!(f, " {option}")?;
        }
        write!(f, ";")
    }
}

/// File-scoped flags set by `using-options` lines.
///
/// Flags keep the order they were first declared in; repeated flags collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionsRecord {
    flags: Vec<String>,
}

impl OptionsRecord {
    /// Create an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            flags: Vec::new(),
        }
    }

    /// Set a flag. Returns `false` if it was already present.
    pub fn insert(&mut self, flag: impl Into<String>) -> bool {
        let flag = flag.into();
        if self.contains(&flag) {
            return false;
        }
        self.flags.push(flag);
        true
    }

    /// Whether a flag is set (case-insensitive).
    #[must_use]
    pub fn contains(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f.eq_ignore_ascii_case(flag))
    }

    /// Whether the file asked to be served outside the concatenated bundle.
    #[must_use]
    pub fn no_combine(&self) -> bool {
        self.contains(NO_COMBINE_FLAG)
    }

    /// Flags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    /// Number of flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether no flags are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl fmt::Display for OptionsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "using-options")?;
        for flag in &self.flags {
            write!(f, " {flag}")?;
        }
        write!(f, ";")
    }
}

/// One parsed declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// A `using` line.
    Dependency(DependencyReference),
    /// A `using-options` line.
    Options(Vec<String>),
}

/// Turn a classified line into a declaration.
///
/// Returns `None` for lines that are not declarations and `Some(Err(_))` for
/// declarations that fail their grammar.
///
/// ```rust
/// use scriptdeps_cli::header::declaration::{parse_declaration, Declaration, DependencyReference};
/// use scriptdeps_cli::header::patterns::classify;
///
/// let parsed = parse_declaration(&classify("using foo opt1 opt2;")).unwrap().unwrap();
/// assert_eq!(
///     parsed,
///     Declaration::Dependency(DependencyReference::new("foo").with_option("opt1").with_option("opt2"))
/// );
/// ```
#[must_use]
pub fn parse_declaration(kind: &LineKind) -> Option<Result<Declaration, DeclarationError>> {
    match kind {
        LineKind::Dependency {
            name,
            options,
        } => {
            let name = name.trim().trim_end_matches(';');
            if name.is_empty() {
                return Some(Err(DeclarationError::EmptyName));
            }
            Some(Ok(Declaration::Dependency(DependencyReference {
                name: name.to_string(),
                options: options.iter().map(|o| o.trim_end_matches(';').to_string()).collect(),
            })))
        }
        LineKind::Options(flags) => {
            if flags.is_empty() {
                return Some(Err(DeclarationError::EmptyOptions));
            }
            Some(Ok(Declaration::Options(flags.clone())))
        }
        LineKind::InvalidDeclaration {
            token,
        } => Some(Err(DeclarationError::InvalidToken(token.clone()))),
        _ => None,
    }
}
