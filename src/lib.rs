//! scriptdeps - comment-driven dependency resolution for client-side scripts
//!
//! Script files declare what they need in their leading comments:
//!
//! ```javascript
//! /*
//!  * using lib/jquery-{version}
//!  * using widgets/grid nocombine
//!  * using-options debug
//!  */
//! ```
//!
//! scriptdeps reads those declarations, resolves each name to a file (picking the
//! newest release for `{version}` names), and produces a load order in which every
//! file comes after the files it declares. Cycles never abort a request; their
//! members are ordered by discovery and reported.
//!
//! # Architecture Overview
//!
//! Resolution is a pipeline of small pure stages over a pluggable file source:
//!
//! 1. [`header`] classifies lines and extracts the declaration block
//! 2. [`resolver::filename`] maps declared names to files, using [`version`]
//!    ordering for `{version}` placeholders
//! 3. [`resolver::dependency_graph`] orders the discovered files and finds cycles
//! 4. [`resolver::Resolution`] carries the load order and every problem found
//!
//! # Core Modules
//!
//! - [`cli`] - the `scriptdeps` command line
//! - [`config`] - `scriptdeps.toml` discovery and validation
//! - [`constants`] - literals shared across modules
//! - [`core`] - error types and user-facing error reporting
//! - [`header`] - line classification and header extraction
//! - [`resolver`] - request resolution, filename lookup and ordering
//! - [`utils`] - root-relative script paths
//! - [`version`] - version tokens and latest-version selection
//!
//! # Example
//!
//! ```rust
//! use scriptdeps_cli::resolver::{ResolverOptions, ScriptResolver};
//! use scriptdeps_cli::resolver::source::MemoryScriptSource;
//!
//! let source = MemoryScriptSource::new()
//!     .with_file("app.js", "// using util\nrun();")
//!     .with_file("util.js", "var util = {};");
//!
//! let resolution = ScriptResolver::new(source, ResolverOptions::default()).resolve(["app.js"]);
//! assert!(resolution.is_clean());
//! assert_eq!(resolution.files[0].path.as_str(), "util.js");
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod header;
pub mod resolver;
pub mod utils;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
