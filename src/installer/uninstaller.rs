//! Removal of installed completions
//!
//! Where a package was registered is not recorded, so every place an
//! install could have written to is searched for its marker block.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::discovery::{DirectoryLookup, discover_directories};
use super::fs::FileSystem;
use super::marker;
use super::planner::{profile_path, validate_name};
use crate::error::{Result, TabtabError};
use crate::shell::ShellKind;

/// What an uninstall removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallReport {
    /// Files a marker block was stripped from
    pub cleaned: Vec<PathBuf>,

    /// Whether the managed script existed and was deleted
    pub script_removed: bool,

    /// Whether the last package was gone and the tool itself was torn down
    pub teardown: bool,
}

impl UninstallReport {
    /// True when no trace of the package was found
    pub fn is_noop(&self) -> bool {
        self.cleaned.is_empty() && !self.script_removed
    }
}

/// Reverses what the script writer did
pub struct Uninstaller {
    fs: Arc<dyn FileSystem>,
    lookup: Arc<dyn DirectoryLookup>,
    home: PathBuf,
    managed_dir: PathBuf,
    tool: String,
}

impl Uninstaller {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        lookup: Arc<dyn DirectoryLookup>,
        home: PathBuf,
        managed_dir: PathBuf,
        tool: impl Into<String>,
    ) -> Self {
        Self {
            fs,
            lookup,
            home,
            managed_dir,
            tool: tool.into(),
        }
    }

    /// Remove completion for `name`
    ///
    /// Uninstalling a package that is not installed is a no-op. When this
    /// call removed the last package of the managed directory, the directory
    /// and the tool's own registration are removed as well.
    pub async fn uninstall(&self, name: &str) -> Result<UninstallReport> {
        validate_name(name)?;

        let mut report = UninstallReport::default();
        let dirs = discover_directories(self.lookup.as_ref()).await;

        report.cleaned = self.strip_everywhere(name, &dirs)?;
        if report.cleaned.is_empty() {
            warn!("No completion marker found for {}", name);
        }

        let script = self.managed_dir.join(name);
        report.script_removed = self
            .fs
            .remove_file(&script)
            .map_err(|e| TabtabError::from_io_at(e, &script))?;
        if report.script_removed {
            debug!("Removed {}", script.display());
        } else {
            warn!("No managed script for {} at {}", name, script.display());
        }

        if !report.is_noop() && self.remaining_packages()?.is_empty() {
            self.teardown(&dirs)?;
            report.teardown = true;
        }

        info!("Uninstalled completion for {}", name);
        Ok(report)
    }

    /// Packages other than the tool itself with a managed script
    pub fn remaining_packages(&self) -> Result<Vec<String>> {
        let names = self
            .fs
            .list_dir(&self.managed_dir)
            .map_err(|e| TabtabError::from_io_at(e, &self.managed_dir))?;
        Ok(names.into_iter().filter(|n| *n != self.tool).collect())
    }

    /// Every file an install of `name` could have appended to
    fn locations(&self, name: &str, dirs: &[PathBuf]) -> Vec<PathBuf> {
        [ShellKind::Bash, ShellKind::Zsh, ShellKind::Fish]
            .into_iter()
            .filter_map(|shell| profile_path(&self.home, shell))
            .chain(dirs.iter().map(|dir| dir.join(name)))
            .collect()
    }

    fn strip_everywhere(&self, name: &str, dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut cleaned = Vec::new();
        for path in self.locations(name, dirs) {
            if self.strip_from(&path, name, dirs)? {
                cleaned.push(path);
            }
        }
        Ok(cleaned)
    }

    /// Strip the block of `name` from `path`, returning whether one was found
    fn strip_from(&self, path: &Path, name: &str, dirs: &[PathBuf]) -> Result<bool> {
        let Some(content) = self.fs.read_to_string(path)? else {
            return Ok(false);
        };
        let Some(stripped) = marker::strip(&content, name) else {
            return Ok(false);
        };

        let in_completions_dir = path.parent().is_some_and(|p| dirs.iter().any(|d| d == p));
        if in_completions_dir && stripped.trim().is_empty() {
            debug!("Removing {}", path.display());
            self.fs
                .remove_file(path)
                .map_err(|e| TabtabError::from_io_at(e, path))?;
        } else {
            debug!("Removing completion block for {} from {}", name, path.display());
            self.fs
                .write(path, &stripped)
                .map_err(|e| TabtabError::from_io_at(e, path))?;
        }
        Ok(true)
    }

    fn teardown(&self, dirs: &[PathBuf]) -> Result<()> {
        info!("No packages left, removing {} completion", self.tool);
        self.strip_everywhere(&self.tool, dirs)?;
        self.fs
            .remove_dir_all(&self.managed_dir)
            .map_err(|e| TabtabError::from_io_at(e, &self.managed_dir))?;
        Ok(())
    }
}
