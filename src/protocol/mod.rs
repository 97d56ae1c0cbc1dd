//! Completion protocol
//!
//! Decoding of completion requests and rendering of candidates.

pub mod formatter;
pub mod matches;
pub mod state;

pub use formatter::{format_line, format_matches, log};
pub use matches::{Match, MatchInput};
pub use state::CompletionState;
