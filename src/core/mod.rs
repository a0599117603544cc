//! Core types shared across scriptdeps.
//!
//! Currently this is the error system: [`ScriptDepsError`] for typed failures and
//! [`ErrorContext`] / [`user_friendly_error`] for presenting them at the CLI
//! boundary.

pub mod error;

pub use error::{ErrorContext, ScriptDepsError, user_friendly_error};
