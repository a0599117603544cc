//! Version tokens embedded in script file names.
//!
//! Script libraries are usually shipped with their version in the file name:
//! `jquery-1.10.2.js`, `knockout-3.0-beta.js`. A dependency can ask for "the
//! newest one" with the `{version}` placeholder (`using jquery-{version}`), and
//! the [`comparison`] module picks it.
//!
//! # Grammar
//!
//! ```text
//! version = digits ("." digits)* ["-" letter alnum*]
//! ```
//!
//! # Ordering
//!
//! - Numeric segments compare as integers, left to right (`1.10` > `1.2`).
//!   Missing trailing segments count as zero (`1.2` == `1.2.0` numerically).
//! - At an equal numeric prefix, a release without a suffix ranks above one with
//!   a suffix (`1.2` > `1.2-beta`); suffixes compare as ASCII strings.
//! - Remaining ties go to the token with more segments, so the order is total.
//!
//! This is deliberately not semver: file names routinely carry two or four
//! numeric segments.

pub mod comparison;

pub use comparison::{VersionComparator, VersionedCandidate};

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Regex fragment for a version token, without anchors.
///
/// Exposed so filename templates can embed it.
pub const VERSION_PATTERN: &str = r"\d+(?:\.\d+)*(?:-[A-Za-z][A-Za-z0-9]*)?";

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<numbers>\d+(?:\.\d+)*)(?:-(?P<pre>[A-Za-z][A-Za-z0-9]*))?$")
        .expect("version pattern is a valid regex")
});

/// Why a string is not a version token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    /// Does not match the version grammar.
    #[error("'{0}' is not a version token")]
    InvalidFormat(String),
    /// A numeric segment does not fit in 64 bits.
    #[error("version segment '{0}' is too large")]
    SegmentOverflow(String),
}

/// A parsed version token such as `1.10.2` or `3.0-beta`.
#[derive(Debug, Clone)]
pub struct VersionToken {
    segments: Vec<u64>,
    pre_release: Option<String>,
    raw: String,
}

impl VersionToken {
    /// Numeric segments, left to right.
    #[must_use]
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Suffix after `-`, if any.
    #[must_use]
    pub fn pre_release(&self) -> Option<&str> {
        self.pre_release.as_deref()
    }

    /// The token exactly as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn compare_numbers(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| {
                let left = self.segments.get(i).copied().unwrap_or(0);
                let right = other.segments.get(i).copied().unwrap_or(0);
                left.cmp(&right)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl FromStr for VersionToken {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps =
            VERSION_REGEX.captures(s).ok_or_else(|| VersionParseError::InvalidFormat(s.to_string()))?;

        let segments = caps["numbers"]
            .split('.')
            .map(|segment| {
                segment
                    .parse::<u64>()
                    .map_err(|_| VersionParseError::SegmentOverflow(segment.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            segments,
            pre_release: caps.name("pre").map(|m| m.as_str().to_string()),
            raw: s.to_string(),
        })
    }
}

impl Ord for VersionToken {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_numbers(other)
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
            .then_with(|| self.segments.len().cmp(&other.segments.len()))
    }
}

impl PartialOrd for VersionToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionToken {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionToken {}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> VersionToken {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_valid_tokens() {
        assert_eq!(v("1").segments(), &[1]);
        assert_eq!(v("1.10.2").segments(), &[1, 10, 2]);
        let beta = v("3.0-beta2");
        assert_eq!(beta.segments(), &[3, 0]);
        assert_eq!(beta.pre_release(), Some("beta2"));
        assert_eq!(beta.to_string(), "3.0-beta2");
    }

    #[test]
    fn test_parse_invalid_tokens() {
        for bad in ["", "v1.2", "1.", ".1", "1..2", "1.2-", "1.2-3rc", "1.2-beta-1", "abc"] {
            assert!(bad.parse::<VersionToken>().is_err(), "{bad} should not parse");
        }
        assert!(matches!(
            "99999999999999999999999".parse::<VersionToken>(),
            Err(VersionParseError::SegmentOverflow(_))
        ));
    }

    #[test]
    fn test_numeric_segments_compare_as_integers() {
        assert!(v("1.10") > v("1.2"));
        assert!(v("2") > v("1.99.99"));
        assert!(v("1.2.1") > v("1.2"));
    }

    #[test]
    fn test_release_ranks_above_pre_release() {
        assert!(v("1.2") > v("1.2-beta"));
        assert!(v("1.2-rc") > v("1.2-beta"));
        assert!(v("1.3-alpha") > v("1.2"));
    }

    #[test]
    fn test_total_order_on_trailing_zeros() {
        assert!(v("1.2.0") > v("1.2"));
        assert_ne!(v("1.2.0"), v("1.2"));
        assert_eq!(v("1.2"), v("1.2"));
    }

    #[test]
    fn test_pattern_constant_matches_grammar() {
        let re = Regex::new(&format!("^{VERSION_PATTERN}$")).unwrap();
        assert!(re.is_match("1.2.3-beta"));
        assert!(!re.is_match("1.2.3-"));
    }
}
