//! Header region extraction.
//!
//! The header region is everything before the first line of real code: blank
//! lines, comments and declarations. [`HeaderExtractor`] walks a file's lines once,
//! front to back, with an explicit two-state machine:
//!
//! ```text
//!             CommentStart
//!   Outside ───────────────▶ InsideComment
//!      ▲                          │
//!      └──────── CommentEnd ──────┘
//! ```
//!
//! Declarations are recognized both as plain lines and as the text of comments,
//! so all of these declare `jquery`:
//!
//! ```text
//! using jquery;
//! // using jquery
//! /* using jquery */
//! /*
//!  * using jquery
//!  */
//! ```
//!
//! Scanning stops for good at the first [`LineKind::Code`] line.

use serde::Serialize;
use tracing::trace;

use crate::header::declaration::{Declaration, DependencyReference, OptionsRecord, parse_declaration};
use crate::header::patterns::{LineKind, LinePatterns};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    InsideComment,
}

/// A declaration line that failed its grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedLine {
    /// 1-based line number
    pub line: usize,
    /// The line as written
    pub text: String,
    /// Why it was rejected
    pub reason: String,
}

/// Declarations found in a file's header region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Dependencies in first-declaration order, one per distinct name.
    pub dependencies: Vec<DependencyReference>,
    /// File-scoped flags.
    pub options: OptionsRecord,
    /// Declaration lines that were skipped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub malformed: Vec<MalformedLine>,
}

impl Header {
    /// Whether the header declared nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.options.is_empty()
    }

    /// Record a dependency. A name that was already declared is ignored.
    pub fn add_dependency(&mut self, reference: DependencyReference) -> bool {
        if self.dependencies.iter().any(|d| d.name == reference.name) {
            trace!("Ignoring repeated declaration of '{}'", reference.name);
            return false;
        }
        self.dependencies.push(reference);
        true
    }

    /// Render the declarations as a block comment that parses back to an
    /// equivalent header.
    ///
    /// ```rust
    /// use scriptdeps_cli::header::extractor::parse_header;
    ///
    /// let header = parse_header("// using a\nusing b opt;\nusing-options nocombine\ngo();");
    /// let text = header.to_header_string();
    /// assert_eq!(parse_header(&text).dependencies, header.dependencies);
    /// ```
    #[must_use]
    pub fn to_header_string(&self) -> String {
        let mut out = String::from("/*\n");
        for dependency in &self.dependencies {
            out.push_str(&format!("{dependency}\n"));
        }
        if !self.options.is_empty() {
            out.push_str(&format!("{}\n", self.options));
        }
        out.push_str("*/\n");
        out
    }
}

/// Single-pass header scanner.
pub struct HeaderExtractor<'p> {
    patterns: &'p LinePatterns,
    state: ScanState,
    header: Header,
}

impl HeaderExtractor<'static> {
    /// Create an extractor using the shared pattern set.
    #[must_use]
    pub fn new() -> Self {
        Self::with_patterns(LinePatterns::shared())
    }
}

impl Default for HeaderExtractor<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p> HeaderExtractor<'p> {
    /// Create an extractor over a specific pattern set.
    #[must_use]
    pub fn with_patterns(patterns: &'p LinePatterns) -> Self {
        Self {
            patterns,
            state: ScanState::Outside,
            header: Header::default(),
        }
    }

    /// Scan `text` and return its header.
    #[must_use]
    pub fn extract(mut self, text: &str) -> Header {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        for (index, line) in text.lines().enumerate() {
            if !self.step(index + 1, line) {
                trace!("Header region ends at line {}", index + 1);
                break;
            }
        }

        self.header
    }

    /// Feed one line. Returns `false` once the header region has ended.
    fn step(&mut self, number: usize, line: &str) -> bool {
        match self.state {
            ScanState::InsideComment => {
                match self.patterns.comment_end(line) {
                    Some(inner) => {
                        self.scan_comment_text(number, &inner);
                        self.state = ScanState::Outside;
                    }
                    None => self.scan_comment_text(number, line),
                }
                true
            }
            ScanState::Outside => match self.patterns.classify(line) {
                LineKind::Blank => true,
                LineKind::OneLineComment(inner) | LineKind::FullLineComment(inner) => {
                    self.scan_comment_text(number, &inner);
                    true
                }
                LineKind::CommentStart(inner) => {
                    self.scan_comment_text(number, &inner);
                    self.state = ScanState::InsideComment;
                    true
                }
                LineKind::CommentEnd(_) => {
                    // A stray `*/` only continues the header inside a `//` comment.
                    self.patterns.full_line_comment(line).is_some()
                }
                kind @ (LineKind::Dependency { .. }
                | LineKind::Options(_)
                | LineKind::InvalidDeclaration { .. }) => {
                    self.record(number, line, &kind);
                    true
                }
                LineKind::Code => false,
            },
        }
    }

    /// Test comment text against the declaration grammar, one comment per line.
    fn scan_comment_text(&mut self, number: usize, text: &str) {
        for text in text.lines() {
            let text = text.trim_start().trim_start_matches('*');
            if let Some(kind) = self.patterns.declaration(text) {
                self.record(number, text, &kind);
            }
        }
    }

    fn record(&mut self, number: usize, text: &str, kind: &LineKind) {
        match parse_declaration(kind) {
            Some(Ok(Declaration::Dependency(reference))) => {
                self.header.add_dependency(reference);
            }
            Some(Ok(Declaration::Options(flags))) => {
                for flag in flags {
                    self.header.options.insert(flag);
                }
            }
            Some(Err(e)) => self.header.malformed.push(MalformedLine {
                line: number,
                text: text.trim().to_string(),
                reason: e.to_string(),
            }),
            None => {}
        }
    }
}

/// Parse the header region of a script.
///
/// A file without a header yields an empty [`Header`]; this never fails.
///
/// ```rust
/// use scriptdeps_cli::header::extractor::parse_header;
///
/// let header = parse_header("/* using a */\ncode();\nusing b;");
/// let names: Vec<_> = header.dependencies.iter().map(|d| d.name.as_str()).collect();
/// assert_eq!(names, ["a"]);
/// ```
#[must_use]
pub fn parse_header(text: &str) -> Header {
    HeaderExtractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(header: &Header) -> Vec<&str> {
        header.dependencies.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_stops_at_first_code_line() {
        let header = parse_header("/* using a */\ncode();\nusing b;");
        assert_eq!(names(&header), ["a"]);
    }

    #[test]
    fn test_plain_declarations_and_comments() {
        let text = "\
// Widget bootstrapper
using jquery;

using widgets/core opt1 opt2;
using-options nocombine;
(function () {})();
using never;
";
        let header = parse_header(text);
        assert_eq!(names(&header), ["jquery", "widgets/core"]);
        assert_eq!(header.dependencies[1].options, vec!["opt1", "opt2"]);
        assert!(header.options.no_combine());
    }

    #[test]
    fn test_declarations_inside_block_comment() {
        let text = "\
/*
 * Grid widget
 * using jquery-{version}
 using util.js;
 using-options debug
 */
var grid = {};
";
        let header = parse_header(text);
        assert_eq!(names(&header), ["jquery-{version}", "util.js"]);
        assert!(header.options.contains("debug"));
    }

    #[test]
    fn test_declarations_on_comment_boundaries() {
        let header = parse_header("/* using first\nusing middle\nusing last */\ncode();");
        assert_eq!(names(&header), ["first", "middle", "last"]);
    }

    #[test]
    fn test_code_inside_comment_does_not_end_header() {
        let header = parse_header("/*\nvar example = 1;\n*/\nusing after;\nrun();");
        assert_eq!(names(&header), ["after"]);
    }

    #[test]
    fn test_full_line_comment_declarations() {
        let header = parse_header("// using a\n/// using b\nrun();");
        assert_eq!(names(&header), ["a", "b"]);
    }

    #[test]
    fn test_duplicates_are_idempotent() {
        let header = parse_header("/* using a opt1 */\nusing a opt2;\nusing b;\nx();");
        assert_eq!(names(&header), ["a", "b"]);
        assert_eq!(header.dependencies[0].options, vec!["opt1"]);
        assert!(header.malformed.is_empty());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let header = parse_header("using a;\nusing;\nusing-options\nusing b;\nx();");
        assert_eq!(names(&header), ["a", "b"]);
        assert_eq!(header.malformed.len(), 2);
        assert_eq!(header.malformed[0].line, 2);
        assert_eq!(header.malformed[1].line, 3);
    }

    #[test]
    fn test_invalid_tokens_do_not_end_header() {
        let header = parse_header("using-options 9;\nusing a;\nx();");
        assert_eq!(names(&header), ["a"]);
        assert_eq!(header.malformed.len(), 1);
        assert_eq!(header.malformed[0].line, 1);
        assert!(header.malformed[0].reason.contains("'9'"));

        let header = parse_header("using a opt=1;\nusing b;\nx();");
        assert_eq!(names(&header), ["b"]);
        assert_eq!(header.malformed.len(), 1);
        assert!(header.malformed[0].reason.contains("'opt=1'"));

        let header = parse_header("/* using-options 9 */\n// using the API below\nusing c;\nx();");
        assert_eq!(names(&header), ["c"]);
        assert_eq!(header.malformed.len(), 1);
    }

    #[test]
    fn test_several_comments_on_one_line() {
        let header = parse_header("/* using a */ /* using b */\nusing c;\nx();");
        assert_eq!(names(&header), ["a", "b", "c"]);
    }

    #[test]
    fn test_resource_declaration_ends_header() {
        let header = parse_header("using a;\nusing res = open();\nusing b;");
        assert_eq!(names(&header), ["a"]);
        assert!(header.malformed.is_empty());
    }

    #[test]
    fn test_no_header_region() {
        assert!(parse_header("").is_empty());
        assert!(parse_header("var x = 1;\nusing a;").is_empty());
        assert!(parse_header("\n\n// just a note\n").is_empty());
    }

    #[test]
    fn test_stray_comment_end_is_code() {
        let header = parse_header("x */\nusing a;");
        assert!(header.is_empty());

        let header = parse_header("// odd */\nusing a;\nrun();");
        assert_eq!(names(&header), ["a"]);
    }

    #[test]
    fn test_crlf_and_bom() {
        let header = parse_header("\u{feff}using a;\r\n/* using b */\r\nrun();\r\n");
        assert_eq!(names(&header), ["a", "b"]);
    }

    #[test]
    fn test_unterminated_comment_scans_to_end() {
        let header = parse_header("/*\nusing a\nvar x;\nusing b");
        assert_eq!(names(&header), ["a", "b"]);
    }

    #[test]
    fn test_header_string_round_trip() {
        let text = "// using a\nusing b opt1 opt2;\nusing-options nocombine debug\n/* using c */\ngo();";
        let header = parse_header(text);
        let regenerated = parse_header(&header.to_header_string());
        assert_eq!(regenerated, header);
        assert_eq!(names(&regenerated), ["a", "b", "c"]);
        assert_eq!(regenerated.options.iter().collect::<Vec<_>>(), ["nocombine", "debug"]);
    }
}
