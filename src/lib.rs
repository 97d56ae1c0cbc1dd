//! Tabtab Library
//!
//! Shell tab-completion plumbing for command line programs.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `installer`: Installation and removal of completion scripts
//! - `protocol`: Completion-request parsing and candidate formatting
//! - `shell`: Shell detection
//!
//! # Example
//!
//! A program answering its own completion requests:
//!
//! ```no_run
//! use tabtab::{CompletionState, ShellKind, protocol};
//!
//! fn main() -> tabtab::Result<()> {
//!     let state = CompletionState::from_process_env();
//!     if !state.is_complete() {
//!         return Ok(());
//!     }
//!
//!     let candidates = match state.prev() {
//!         Some("--color") => vec!["always", "never", "auto"],
//!         _ => vec!["--color:Colorize output", "--help:Print help"],
//!     };
//!     protocol::log(&mut std::io::stdout(), candidates, ShellKind::detect(), &state)
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod installer;
pub mod protocol;
pub mod shell;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TabtabError};
pub use installer::{InstallRequest, Installer};
pub use protocol::{CompletionState, Match, MatchInput};
pub use shell::ShellKind;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}
