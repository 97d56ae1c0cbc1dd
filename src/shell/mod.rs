//! Shell detection
//!
//! The active shell selects how completion candidates are rendered and which
//! script template an installation uses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shells with a dedicated completion wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
    /// Any other or unknown shell. Candidates are printed as bare names.
    #[default]
    Other,
}

impl ShellKind {
    /// Parse a shell name or path (`/usr/bin/zsh`, `bash`, ...)
    ///
    /// Only the final path component is considered. Unknown names map to
    /// [`ShellKind::Other`].
    pub fn from_name(name: &str) -> Self {
        let base = name.rsplit('/').next().unwrap_or(name);
        match base.to_lowercase().as_str() {
            "bash" => ShellKind::Bash,
            "zsh" => ShellKind::Zsh,
            "fish" => ShellKind::Fish,
            _ => ShellKind::Other,
        }
    }

    /// Detect the shell from the current process environment (`$SHELL`)
    pub fn detect() -> Self {
        Self::from_env_value(std::env::var("SHELL").ok().as_deref())
    }

    /// Detect the shell from an explicit `$SHELL` value
    pub fn from_env_value(value: Option<&str>) -> Self {
        value.map(Self::from_name).unwrap_or_default()
    }

    /// Lowercase identifier of the shell
    pub fn as_str(&self) -> &'static str {
        match self {
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
            ShellKind::Fish => "fish",
            ShellKind::Other => "other",
        }
    }

    /// Directive used to load a script file from a profile
    pub fn source_command(&self) -> &'static str {
        match self {
            ShellKind::Fish => "source",
            _ => ".",
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
