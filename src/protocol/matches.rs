//! Completion candidates
//!
//! Programs hand candidates over either as bare strings (`"name"` or
//! `"name:description"`) or as structured records. Both normalize to
//! [`Match`] before formatting.

use serde::{Deserialize, Serialize};

use crate::shell::ShellKind;

/// A completion candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Text inserted on the command line
    pub name: String,

    /// Optional help text shown by shells that support it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Candidate as supplied by the calling program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchInput {
    /// `name`, `name:description` or `name\:description`
    Plain(String),

    /// Already structured candidate, used as is
    Record(Match),
}

impl Match {
    /// Candidate without a description
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Candidate with a description
    pub fn with_description(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
        }
    }

    /// Description, treating an empty one as absent
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

impl MatchInput {
    /// Normalize into a [`Match`] for the given shell
    ///
    /// A plain string is split on its first `:`. A backslash directly in
    /// front of that colon is dropped from the name. For zsh, whose own
    /// parser treats `\:` specially, a string containing any backslash gets
    /// a trailing backslash appended to the name.
    pub fn normalize(self, shell: ShellKind) -> Match {
        match self {
            MatchInput::Record(m) => m,
            MatchInput::Plain(item) => split_plain(&item, shell),
        }
    }
}

fn split_plain(item: &str, shell: ShellKind) -> Match {
    let (mut name, description) = match item.split_once(':') {
        Some((left, right)) => {
            let left = left.strip_suffix('\\').unwrap_or(left);
            (left.to_string(), Some(right.to_string()))
        }
        None => (item.to_string(), None),
    };

    if shell == ShellKind::Zsh && item.contains('\\') {
        name.push('\\');
    }

    Match { name, description }
}

impl From<&str> for MatchInput {
    fn from(item: &str) -> Self {
        MatchInput::Plain(item.to_string())
    }
}

impl From<String> for MatchInput {
    fn from(item: String) -> Self {
        MatchInput::Plain(item)
    }
}

impl From<Match> for MatchInput {
    fn from(m: Match) -> Self {
        MatchInput::Record(m)
    }
}
