//! Discovery of platform completion directories
//!
//! bash-completion publishes its directories through pkg-config:
//!
//! ```text
//! pkg-config --variable=completionsdir bash-completion
//! pkg-config --variable=compatdir bash-completion
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Result, TabtabError};

/// pkg-config variable naming the modern completions directory
pub const COMPLETIONS_DIR: &str = "completionsdir";
/// pkg-config variable naming the legacy completions directory
pub const COMPAT_DIR: &str = "compatdir";

/// Looks up a completion directory by variable name
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Value of `variable`, `None` when it is unset or empty
    async fn lookup(&self, variable: &str) -> Result<Option<String>>;
}

/// [`DirectoryLookup`] backed by the `pkg-config` utility
#[derive(Debug, Clone)]
pub struct PkgConfigLookup {
    program: String,
    package: String,
}

impl PkgConfigLookup {
    /// Create a lookup running `program` against the pkg-config `package`
    pub fn new(program: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            package: package.into(),
        }
    }
}

impl Default for PkgConfigLookup {
    fn default() -> Self {
        Self::new("pkg-config", "bash-completion")
    }
}

#[async_trait]
impl DirectoryLookup for PkgConfigLookup {
    async fn lookup(&self, variable: &str) -> Result<Option<String>> {
        debug!("Asking {} for {}", self.program, variable);

        let output = Command::new(&self.program)
            .arg(format!("--variable={variable}"))
            .arg(&self.package)
            .output()
            .await
            .map_err(|e| TabtabError::Discovery {
                variable: variable.to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(TabtabError::Discovery {
                variable: variable.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("Got {:?} for {}", value, variable);

        Ok((!value.is_empty()).then_some(value))
    }
}

/// Query every known completion directory variable
///
/// Lookup failures are logged and the candidate is omitted. Duplicate
/// directories are reported once.
pub async fn discover_directories(lookup: &dyn DirectoryLookup) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    for variable in [COMPLETIONS_DIR, COMPAT_DIR] {
        match lookup.lookup(variable).await {
            Ok(Some(dir)) => {
                let dir = PathBuf::from(dir);
                if !dirs.contains(&dir) {
                    dirs.push(dir);
                }
            }
            Ok(None) => debug!("No value for {}", variable),
            Err(e) => warn!("Skipping {} candidate: {}", variable, e),
        }
    }

    dirs
}
