//! Shared utilities.

pub mod paths;

pub use paths::{ScriptPath, is_glob_pattern};
