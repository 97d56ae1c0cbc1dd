//! Error handling for tabtab.
//!
//! A single [`TabtabError`] type covers the whole crate:
//! - Validation failures on missing inputs (no side effects happen first)
//! - Permission failures, carrying a remediation hint for the user
//! - Other filesystem, configuration and prompt failures
//!
//! Discovery failures and missing uninstall traces are recovered from by
//! their callers and only logged.

pub mod kinds;

pub use kinds::{ConfigError, Result, TabtabError, ValidationError};
