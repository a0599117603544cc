//! Dependency resolution for script bundles.
//!
//! [`ScriptResolver::resolve`] turns a list of requested files into a
//! [`Resolution`]: every file the request needs, transitively, in an order where
//! each file comes after everything it declares with `using`.
//!
//! # Resolution Process
//!
//! 1. **Requests**: each requested identifier is resolved relative to the script
//!    root. Identifiers containing `*`, `?` or `[` are expanded against the
//!    directory listing. Files are read and their headers parsed as soon as they
//!    are discovered.
//! 2. **Discovery**: a worklist pops files in discovery order, resolves each
//!    declared name through the [`filename`] resolver and queues every newly
//!    found file. A visited set makes each file enter the worklist once, however
//!    many files declare it.
//! 3. **Ordering**: the [`dependency_graph`] produces the load order and the
//!    list of cycles.
//!
//! # Failure Scope
//!
//! Nothing in a request aborts it:
//!
//! - a malformed declaration skips that line
//! - an unresolved or unreadable dependency drops that edge
//! - a cycle orders its members by discovery
//!
//! Each is recorded in the [`Resolution`] so the caller can decide whether to
//! fail (see [`Resolution::ensure_resolved`]).
//!
//! # Example
//!
//! ```rust
//! use scriptdeps_cli::resolver::{ResolverOptions, ScriptResolver};
//! use scriptdeps_cli::resolver::source::MemoryScriptSource;
//!
//! let source = MemoryScriptSource::new()
//!     .with_file("app.js", "using lib/jquery-{version};\nstart();")
//!     .with_file("lib/jquery-1.9.js", "")
//!     .with_file("lib/jquery-1.10.js", "");
//!
//! let resolver = ScriptResolver::new(source, ResolverOptions::default());
//! let resolution = resolver.resolve(["app.js"]);
//! let order: Vec<_> = resolution.paths().iter().map(|p| p.as_str()).collect();
//! assert_eq!(order, ["lib/jquery-1.10.js", "app.js"]);
//! ```

pub mod dependency_graph;
pub mod filename;
pub mod report;
pub mod source;

pub use dependency_graph::{DependencyCycle, DependencyGraph};
pub use filename::{FilenameError, FilenameResolver, match_filename};
pub use report::{MalformedDeclaration, Resolution, ResolvedFile, UnresolvedDependency};
pub use source::{FsScriptSource, MemoryScriptSource, ScriptSource};

use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

use crate::constants::{DEFAULT_EXTENSION, REQUEST_ORIGIN};
use crate::header::{Header, parse_header};
use crate::utils::paths::{ScriptPath, is_glob_pattern};

/// Search settings shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Directories searched after the declaring file's own directory.
    pub library_paths: Vec<ScriptPath>,
    /// Recognized script extensions; the first is appended to bare names.
    pub extensions: Vec<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            library_paths: Vec::new(),
            extensions: vec![DEFAULT_EXTENSION.to_string()],
        }
    }
}

/// A discovered file and what its header says.
struct ScriptNode {
    content: String,
    header: Header,
    reference_options: Vec<String>,
}

/// State for a single request. Dropped when the request completes.
struct ResolveRun<'a, S: ScriptSource + ?Sized> {
    filenames: FilenameResolver<'a, S>,
    source: &'a S,
    graph: DependencyGraph,
    nodes: HashMap<ScriptPath, ScriptNode>,
    unreadable: HashMap<ScriptPath, String>,
    worklist: VecDeque<ScriptPath>,
    requested: Vec<ScriptPath>,
    unresolved: Vec<UnresolvedDependency>,
    malformed: Vec<MalformedDeclaration>,
}

impl<'a, S: ScriptSource + ?Sized> ResolveRun<'a, S> {
    fn new(source: &'a S, options: &'a ResolverOptions) -> Self {
        Self {
            filenames: FilenameResolver::new(source, &options.library_paths, &options.extensions),
            source,
            graph: DependencyGraph::new(),
            nodes: HashMap::new(),
            unreadable: HashMap::new(),
            worklist: VecDeque::new(),
            requested: Vec::new(),
            unresolved: Vec::new(),
            malformed: Vec::new(),
        }
    }

    /// Read and parse `path` the first time it is seen.
    ///
    /// Returns the read failure when the file cannot be loaded.
    fn discover(&mut self, path: &ScriptPath) -> Result<(), String> {
        if self.nodes.contains_key(path) {
            return Ok(());
        }
        if let Some(reason) = self.unreadable.get(path) {
            return Err(reason.clone());
        }

        match self.source.read_file(path) {
            Ok(content) => {
                let header = parse_header(&content);
                debug!(
                    "Discovered '{}' ({} dependencies, {} options)",
                    path,
                    header.dependencies.len(),
                    header.options.len()
                );
                self.graph.add_node(path.clone());
                self.nodes.insert(
                    path.clone(),
                    ScriptNode {
                        content,
                        header,
                        reference_options: Vec::new(),
                    },
                );
                self.worklist.push_back(path.clone());
                Ok(())
            }
            Err(e) => {
                let reason = format!("cannot read '{path}': {e:#}");
                self.unreadable.insert(path.clone(), reason.clone());
                Err(reason)
            }
        }
    }

    fn unresolved(&mut self, name: &str, from: &str, reason: String, suggestion: Option<ScriptPath>) {
        debug!("Unresolved '{}' from '{}': {}", name, from, reason);
        self.unresolved.push(UnresolvedDependency {
            name: name.to_string(),
            from: from.to_string(),
            reason,
            suggestion,
        });
    }

    fn request(&mut self, identifier: &str) {
        let targets = if is_glob_pattern(identifier) {
            self.filenames.expand_pattern(identifier)
        } else {
            self.filenames.resolve(identifier, None).map(|path| vec![path])
        };

        let targets = match targets {
            Ok(targets) => targets,
            Err(e) => {
                let suggestion = e.suggestion().cloned();
                self.unresolved(identifier, REQUEST_ORIGIN, e.to_string(), suggestion);
                return;
            }
        };

        for target in targets {
            match self.discover(&target) {
                Ok(()) => {
                    if !self.requested.contains(&target) {
                        self.requested.push(target);
                    }
                }
                Err(reason) => self.unresolved(identifier, REQUEST_ORIGIN, reason, None),
            }
        }
    }

    /// Resolve the declarations of one discovered file.
    fn expand(&mut self, path: &ScriptPath) {
        let Some(node) = self.nodes.get(path) else {
            return;
        };
        let dependencies = node.header.dependencies.clone();
        let malformed = node.header.malformed.clone();

        self.malformed.extend(malformed.into_iter().map(|line| MalformedDeclaration {
            file: path.clone(),
            line: line.line,
            text: line.text,
            reason: line.reason,
        }));

        let from_dir = path.parent();
        let from = path.to_string();
        for reference in dependencies {
            let target = match self.filenames.resolve(&reference.name, Some(&from_dir)) {
                Ok(target) => target,
                Err(e) => {
                    let suggestion = e.suggestion().cloned();
                    self.unresolved(&reference.name, &from, e.to_string(), suggestion);
                    continue;
                }
            };

            if let Err(reason) = self.discover(&target) {
                self.unresolved(&reference.name, &from, reason, None);
                continue;
            }

            if let Some(node) = self.nodes.get_mut(&target) {
                for option in &reference.options {
                    if !node.reference_options.iter().any(|o| o.eq_ignore_ascii_case(option)) {
                        node.reference_options.push(option.clone());
                    }
                }
            }
            self.graph.add_dependency(path.clone(), target);
        }
    }

    fn finish(mut self) -> Resolution {
        while let Some(path) = self.worklist.pop_front() {
            self.expand(&path);
        }

        let cycles = self.graph.detect_cycles();
        for cycle in &cycles {
            warn!("Circular dependency detected: {}", cycle);
        }

        let files = self
            .graph
            .build_order()
            .into_iter()
            .filter_map(|path| {
                let node = self.nodes.remove(&path)?;
                Some(ResolvedFile {
                    dependencies: self.graph.get_direct_deps(&path),
                    path,
                    options: node.header.options,
                    reference_options: node.reference_options,
                    content: node.content,
                })
            })
            .collect::<Vec<_>>();

        debug!(
            "Resolved {} file(s): {} cycle(s), {} unresolved, {} malformed",
            files.len(),
            cycles.len(),
            self.unresolved.len(),
            self.malformed.len()
        );

        Resolution {
            requested: self.requested,
            files,
            cycles,
            unresolved: self.unresolved,
            malformed: self.malformed,
            graph: self.graph,
        }
    }
}

/// Resolves requests against a [`ScriptSource`].
///
/// The resolver holds no per-request state, so one instance can serve any
/// number of requests, from several threads when the source allows it.
#[derive(Debug, Clone)]
pub struct ScriptResolver<S> {
    source: S,
    options: ResolverOptions,
}

impl<S: ScriptSource> ScriptResolver<S> {
    /// Create a resolver over `source`.
    pub const fn new(source: S, options: ResolverOptions) -> Self {
        Self {
            source,
            options,
        }
    }

    /// The file source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The search settings.
    pub const fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve `requested` and everything it depends on.
    ///
    /// Requests are root-relative. Repeated requests for the same file collapse
    /// into one entry.
    pub fn resolve<I, T>(&self, requested: I) -> Resolution
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut run = ResolveRun::new(&self.source, &self.options);
        for identifier in requested {
            run.request(identifier.as_ref());
        }
        run.finish()
    }
}
