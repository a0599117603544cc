//! Line classification for script headers.
//!
//! Each line of a script is classified on its own, without any knowledge of the
//! lines around it. Multi-line comment state is tracked one level up, in
//! [`crate::header::extractor`].
//!
//! Classification is order-sensitive. The rules are tried in this order and the
//! first match wins:
//!
//! | # | Kind | Example |
//! |---|------|---------|
//! | 1 | [`LineKind::Blank`] | `   ` |
//! | 2 | [`LineKind::OneLineComment`] | `/* using jquery */` |
//! | 3 | [`LineKind::CommentStart`] | `/* header` |
//! | 4 | [`LineKind::CommentEnd`] | `end of header */` |
//! | 5 | [`LineKind::FullLineComment`] | `// using jquery` |
//! | 6 | [`LineKind::Dependency`] | `using jquery-{version} nocombine;` |
//! | 7 | [`LineKind::Options`] | `using-options nocombine;` |
//! | 8 | [`LineKind::Code`] | `var x = 1;` |
//!
//! Rule 2 runs before rule 3 so that a comment closed on its own line is never
//! mistaken for an open block. A line made only of closed comments, such as
//! `/* using a */ /* using b */`, is also rule 2; its payload holds one line per
//! comment.
//!
//! A plain line that starts like a declaration but breaks its grammar, such as
//! `using-options 9;` or `using a opt=1;`, is a [`LineKind::InvalidDeclaration`]
//! rather than code, so it is reported and skipped without ending the header.
//! `using name = value;` stays code. Inside comments only `using-options` lines
//! are held to the grammar; prose that happens to start with "using" is ignored.

use regex::Regex;
use std::sync::LazyLock;

static PATTERNS: LazyLock<LinePatterns> = LazyLock::new(LinePatterns::compile);

/// Classification of a single line, with its captured payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace-only line.
    Blank,
    /// `/* text */` opened and closed on one line; payload is the inner text,
    /// one line per comment when several share the line.
    OneLineComment(String),
    /// `/* text` with no closing marker; payload is the text after `/*`.
    CommentStart(String),
    /// `text */`; payload is the text before `*/`.
    CommentEnd(String),
    /// `// text`; payload is the text after the slashes.
    FullLineComment(String),
    /// `using <name> [<option>...]`. An empty name marks a bare `using` keyword.
    Dependency {
        /// Symbolic dependency name
        name: String,
        /// Option tokens following the name
        options: Vec<String>,
    },
    /// `using-options <flag>...`. Empty for a bare `using-options` keyword.
    Options(Vec<String>),
    /// A `using` or `using-options` line with a token outside the grammar.
    InvalidDeclaration {
        /// The first offending token
        token: String,
    },
    /// Anything else. Ends the header region.
    Code,
}

impl LineKind {
    /// Whether this line is a `using` or `using-options` declaration.
    #[must_use]
    pub const fn is_declaration(&self) -> bool {
        matches!(self, Self::Dependency { .. } | Self::Options(_) | Self::InvalidDeclaration { .. })
    }
}

/// Precompiled line patterns.
///
/// The patterns are immutable once compiled; [`LinePatterns::shared`] hands out
/// a process-wide read-only instance.
#[derive(Debug)]
pub struct LinePatterns {
    closed_comments: Regex,
    comment_body: Regex,
    comment_start: Regex,
    comment_end: Regex,
    full_line_comment: Regex,
    dependency: Regex,
    bare_dependency: Regex,
    options: Regex,
    bare_options: Regex,
    loose_dependency: Regex,
    loose_options: Regex,
    js_using: Regex,
}

impl LinePatterns {
    fn compile() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("line pattern is a valid regex");

        Self {
            // One or more C comments and nothing else.
            closed_comments: compile(r"^\s*(?:/\*[^*]*\*+(?:[^/*][^*]*\*+)*/\s*)+$"),
            comment_body: compile(r"/\*(?P<body>[^*]*\*+(?:[^/*][^*]*\*+)*)/"),
            comment_start: compile(r"^\s*/\*(?P<comment>.*)$"),
            comment_end: compile(r"^(?P<comment>.*?)\*+/\s*$"),
            full_line_comment: compile(r"^\s*//+\s*(?P<comment>.*?)\s*$"),
            dependency: compile(
                r"^\s*using\s+(?P<body>[%/~_\-A-Za-z0-9{}.]+(?:\s+[A-Za-z0-9./_\-]+)*)\s*;*\s*$",
            ),
            bare_dependency: compile(r"^\s*using\s*;*\s*$"),
            options: compile(
                r"^\s*using-options\s+(?P<body>[A-Za-z][A-Za-z0-9_\-]*(?:\s+[A-Za-z][A-Za-z0-9_\-]*)*)\s*;*\s*$",
            ),
            bare_options: compile(r"^\s*using-options\s*;*\s*$"),
            loose_dependency: compile(r"^\s*using\s+(?P<body>\S.*?)\s*$"),
            loose_options: compile(r"^\s*using-options(?:\s+(?P<body>.*?))?\s*$"),
            // `using x = ...` resource declarations in script code
            js_using: compile(r"^\s*using\s+[A-Za-z_$][\w$]*\s*="),
        }
    }

    /// The shared, lazily compiled pattern set.
    #[must_use]
    pub fn shared() -> &'static Self {
        &PATTERNS
    }

    /// Classify one line.
    #[must_use]
    pub fn classify(&self, line: &str) -> LineKind {
        if line.trim().is_empty() {
            return LineKind::Blank;
        }

        if self.closed_comments.is_match(line) {
            let bodies: Vec<String> = self
                .comment_body
                .captures_iter(line)
                .map(|caps| comment_text(&caps["body"]))
                .collect();
            return LineKind::OneLineComment(bodies.join("\n"));
        }

        if let Some(caps) = self.comment_start.captures(line) {
            // A comment that closes mid-line is followed by code.
            if caps["comment"].contains("*/") {
                return LineKind::Code;
            }
            return LineKind::CommentStart(comment_text(&caps["comment"]));
        }

        if let Some(comment) = self.comment_end(line) {
            return LineKind::CommentEnd(comment);
        }

        if let Some(comment) = self.full_line_comment(line) {
            return LineKind::FullLineComment(comment);
        }

        self.declaration(line)
            .or_else(|| self.invalid_dependency(line))
            .unwrap_or(LineKind::Code)
    }

    /// Match a line that closes a block comment; returns the text before `*/`.
    #[must_use]
    pub fn comment_end(&self, line: &str) -> Option<String> {
        self.comment_end.captures(line).map(|caps| comment_text(&caps["comment"]))
    }

    /// Match a `//` comment; returns the text after the slashes.
    #[must_use]
    pub fn full_line_comment(&self, line: &str) -> Option<String> {
        self.full_line_comment.captures(line).map(|caps| caps["comment"].to_string())
    }

    /// Match `text` against the declaration grammar only (rules 6 and 7).
    ///
    /// Used both for plain lines and for text captured inside comments. A
    /// `using-options` line with a bad flag is an [`LineKind::InvalidDeclaration`].
    #[must_use]
    pub fn declaration(&self, text: &str) -> Option<LineKind> {
        if let Some(caps) = self.dependency.captures(text) {
            let mut tokens = caps["body"].split_whitespace().map(str::to_string);
            let name = tokens.next().unwrap_or_default();
            return Some(LineKind::Dependency {
                name,
                options: tokens.collect(),
            });
        }

        if self.bare_dependency.is_match(text) {
            return Some(LineKind::Dependency {
                name: String::new(),
                options: Vec::new(),
            });
        }

        if let Some(caps) = self.options.captures(text) {
            return Some(LineKind::Options(
                caps["body"].split_whitespace().map(str::to_string).collect(),
            ));
        }

        if self.bare_options.is_match(text) {
            return Some(LineKind::Options(Vec::new()));
        }

        self.loose_options.captures(text).map(|caps| LineKind::InvalidDeclaration {
            token: first_invalid(caps.name("body").map_or("", |m| m.as_str()), is_flag, is_flag),
        })
    }

    /// A plain `using` line that is not script code but breaks the grammar.
    fn invalid_dependency(&self, line: &str) -> Option<LineKind> {
        if self.js_using.is_match(line) {
            return None;
        }
        self.loose_dependency.captures(line).map(|caps| LineKind::InvalidDeclaration {
            token: first_invalid(&caps["body"], is_name, is_option),
        })
    }
}

fn is_name(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(|c| c.is_ascii_alphanumeric() || "%/~_-{}.".contains(c))
}

fn is_option(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric() || "./_-".contains(c))
}

fn is_flag(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// The first token of `body` that fails its check; the whole body if none does.
fn first_invalid(body: &str, first: fn(&str) -> bool, rest: fn(&str) -> bool) -> String {
    let trimmed = body.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    trimmed
        .split_whitespace()
        .enumerate()
        .find(|&(i, token)| !(if i == 0 { first } else { rest })(token))
        .map_or_else(|| body.trim().to_string(), |(_, token)| token.to_string())
}

/// Trim comment text and any `*` decoration left at either end.
fn comment_text(raw: &str) -> String {
    raw.trim().trim_matches('*').trim().to_string()
}

/// Classify one line with the shared pattern set.
///
/// ```rust
/// use scriptdeps_cli::header::patterns::{classify, LineKind};
///
/// assert_eq!(classify("/* hello */"), LineKind::OneLineComment("hello".into()));
/// assert_eq!(classify("// hello"), LineKind::FullLineComment("hello".into()));
/// assert_eq!(classify("var x = 1;"), LineKind::Code);
/// ```
#[must_use]
pub fn classify(line: &str) -> LineKind {
    LinePatterns::shared().classify(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(name: &str, options: &[&str]) -> LineKind {
        LineKind::Dependency {
            name: name.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_blank_lines() {
        for line in ["", "   ", "\t", " \t  "] {
            assert_eq!(classify(line), LineKind::Blank);
            assert!(line.trim().is_empty());
        }
    }

    #[test]
    fn test_comment_payloads_are_trimmed() {
        assert_eq!(classify("// hello"), LineKind::FullLineComment("hello".to_string()));
        assert_eq!(classify("/* hello */"), LineKind::OneLineComment("hello".to_string()));
        assert_eq!(classify("   ///  hello  "), LineKind::FullLineComment("hello".to_string()));
        assert_eq!(classify("/** hello **/"), LineKind::OneLineComment("hello".to_string()));
    }

    #[test]
    fn test_one_line_comment_checked_before_comment_start() {
        assert_eq!(classify("/* using a */"), LineKind::OneLineComment("using a".to_string()));
        assert_eq!(classify("/* using a"), LineKind::CommentStart("using a".to_string()));
        assert_eq!(classify("/*"), LineKind::CommentStart(String::new()));
    }

    #[test]
    fn test_comment_closed_mid_line_is_code() {
        assert_eq!(classify("/* a */ init();"), LineKind::Code);
        assert_eq!(classify("/* a */ /* b"), LineKind::Code);
    }

    #[test]
    fn test_several_closed_comments_on_one_line() {
        assert_eq!(
            classify("/* using a */ /** using b **/"),
            LineKind::OneLineComment("using a\nusing b".to_string())
        );
    }

    #[test]
    fn test_comment_end() {
        assert_eq!(classify("using b */"), LineKind::CommentEnd("using b".to_string()));
        assert_eq!(classify(" */"), LineKind::CommentEnd(String::new()));
        assert_eq!(classify("end **/  "), LineKind::CommentEnd("end".to_string()));
    }

    #[test]
    fn test_dependency_lines() {
        assert_eq!(classify("using foo.js;"), dep("foo.js", &[]));
        assert_eq!(classify("using foo opt1 opt2"), dep("foo", &["opt1", "opt2"]));
        assert_eq!(classify("  using lib-{version}.js ;;  "), dep("lib-{version}.js", &[]));
        assert_eq!(classify("using ~/shared/util_v2"), dep("~/shared/util_v2", &[]));
        assert_eq!(classify("using %APP%/boot.js"), dep("%APP%/boot.js", &[]));
    }

    #[test]
    fn test_bare_keywords_are_declarations_with_empty_payload() {
        assert_eq!(classify("using"), dep("", &[]));
        assert_eq!(classify("using ;"), dep("", &[]));
        assert_eq!(classify("using-options;"), LineKind::Options(Vec::new()));
    }

    #[test]
    fn test_options_lines() {
        assert_eq!(
            classify("using-options nocombine debug;"),
            LineKind::Options(vec!["nocombine".to_string(), "debug".to_string()])
        );
        assert_eq!(classify("using-options   x"), LineKind::Options(vec!["x".to_string()]));
    }

    #[test]
    fn test_invalid_declarations() {
        let invalid = |token: &str| LineKind::InvalidDeclaration {
            token: token.to_string(),
        };
        assert_eq!(classify("using-options 9;"), invalid("9"));
        assert_eq!(classify("using-options debug x=1"), invalid("x=1"));
        assert_eq!(classify("using a opt=1;"), invalid("opt=1"));
        assert_eq!(classify("using lib(1).js"), invalid("lib(1).js"));
        assert!(classify("using-options 9").is_declaration());

        let patterns = LinePatterns::shared();
        assert_eq!(patterns.declaration("using-options 9"), Some(invalid("9")));
        assert_eq!(patterns.declaration("using the API, call init()"), None);
    }

    #[test]
    fn test_code_lines() {
        assert_eq!(classify("var using = 1;"), LineKind::Code);
        assert_eq!(classify("using res = getResource();"), LineKind::Code);
        assert_eq!(classify("using $conn=open();"), LineKind::Code);
        assert_eq!(classify("usingfoo"), LineKind::Code);
        assert_eq!(classify("(function () {"), LineKind::Code);
    }

    #[test]
    fn test_declaration_only_matching() {
        let patterns = LinePatterns::shared();
        assert_eq!(patterns.declaration("using a"), Some(dep("a", &[])));
        assert_eq!(patterns.declaration("hello world"), None);
        assert!(patterns.declaration("using-options a").unwrap().is_declaration());
    }
}
