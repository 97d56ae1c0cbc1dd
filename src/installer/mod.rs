//! Installation of completion scripts
//!
//! An installation moves through three states:
//!
//! 1. `Uninstalled` - nothing chosen yet; aborting the prompt stays here
//! 2. `Planned` - a destination was chosen ([`InstallationPlanner`])
//! 3. `Written` - the script was printed or registered ([`ScriptWriter`])
//!
//! [`Uninstaller`] reverses a written installation.

pub mod discovery;
pub mod fs;
pub mod marker;
pub mod planner;
pub mod prompt;
pub mod script;
pub mod uninstaller;
pub mod writer;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

pub use discovery::{DirectoryLookup, PkgConfigLookup};
pub use fs::{FileSystem, OsFileSystem};
pub use planner::{InstallPlan, InstallRequest, InstallTarget, InstallationPlanner};
pub use prompt::{Prompter, TerminalPrompter};
pub use uninstaller::{UninstallReport, Uninstaller};
pub use writer::{Installation, ScriptWriter};

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::shell::ShellKind;

/// State of one installation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    Uninstalled,
    Planned(InstallPlan),
    Written(Installation),
}

/// Collaborators an [`Installer`] is built from
pub struct Collaborators {
    pub prompter: Arc<dyn Prompter>,
    pub lookup: Arc<dyn DirectoryLookup>,
    pub fs: Arc<dyn FileSystem>,
}

/// Installs and uninstalls completion scripts
pub struct Installer {
    planner: InstallationPlanner,
    writer: ScriptWriter,
    uninstaller: Uninstaller,
}

impl Installer {
    /// Create an installer from explicit collaborators
    ///
    /// # Arguments
    /// * `config` - Managed directory and tool name
    /// * `home` - Home directory holding the shell profiles
    /// * `shell` - Shell of the current process
    /// * `collaborators` - Prompt, discovery and filesystem implementations
    pub fn new(config: &Config, home: PathBuf, shell: ShellKind, collaborators: Collaborators) -> Self {
        let Collaborators { prompter, lookup, fs } = collaborators;
        let install = &config.install;

        Self {
            planner: InstallationPlanner::new(prompter, lookup.clone(), home.clone(), shell),
            writer: ScriptWriter::new(fs.clone(), install.managed_dir.clone(), &install.tool_name),
            uninstaller: Uninstaller::new(
                fs,
                lookup,
                home,
                install.managed_dir.clone(),
                &install.tool_name,
            ),
        }
    }

    /// Create an installer on the real system: terminal prompt, pkg-config
    /// discovery and the local filesystem
    pub fn from_config(config: &Config) -> Result<Self> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        let collaborators = Collaborators {
            prompter: Arc::new(TerminalPrompter),
            lookup: Arc::new(PkgConfigLookup::new(
                &config.install.pkg_config,
                &config.install.pkg_config_package,
            )),
            fs: Arc::new(OsFileSystem),
        };
        Ok(Self::new(config, home, ShellKind::detect(), collaborators))
    }

    /// Ask for a destination, then print or register the completion script
    ///
    /// Printed scripts go to `out`. Returns [`InstallState::Uninstalled`]
    /// when the prompt was aborted.
    pub async fn install<W: Write>(&self, request: InstallRequest, out: &mut W) -> Result<InstallState> {
        let state = self.plan(request).await?;
        self.write(state, out)
    }

    /// Validate the request and ask for its destination
    pub async fn plan(&self, request: InstallRequest) -> Result<InstallState> {
        Ok(match self.planner.plan(request).await? {
            Some(plan) => InstallState::Planned(plan),
            None => InstallState::Uninstalled,
        })
    }

    /// Carry out a planned installation
    ///
    /// States other than [`InstallState::Planned`] are returned unchanged.
    pub fn write<W: Write>(&self, state: InstallState, out: &mut W) -> Result<InstallState> {
        let InstallState::Planned(plan) = state else {
            return Ok(state);
        };

        let installation = if writer::writes_files(&plan) {
            self.writer.write(&plan)?
        } else {
            self.writer.emit(&plan, out)?
        };

        info!("Installed completion for {}", plan.request.name);
        Ok(InstallState::Written(installation))
    }

    /// Remove the completion of `name` from every place it could be
    pub async fn uninstall(&self, name: &str) -> Result<UninstallReport> {
        self.uninstaller.uninstall(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TabtabError, ValidationError};
    use crate::installer::fs::memory::MemoryFileSystem;
    use crate::installer::planner::tests::{ScriptedPrompter, StubLookup};

    fn installer(answer: Option<&str>, fs: Arc<MemoryFileSystem>) -> (Installer, Arc<ScriptedPrompter>) {
        let prompter = Arc::new(match answer {
            Some(a) => ScriptedPrompter::answering(a),
            None => ScriptedPrompter::default(),
        });
        let mut config = Config::default();
        config.install.managed_dir = PathBuf::from("/home/me/.config/tabtab/completions");

        let installer = Installer::new(
            &config,
            PathBuf::from("/home/me"),
            ShellKind::Bash,
            Collaborators {
                prompter: prompter.clone(),
                lookup: Arc::new(StubLookup(Vec::new())),
                fs,
            },
        );
        (installer, prompter)
    }

    #[tokio::test]
    async fn test_install_to_profile() {
        let fs = Arc::new(MemoryFileSystem::new());
        let (installer, _) = installer(Some("zshrc"), fs.clone());
        let mut out = Vec::new();

        let state = installer
            .install(InstallRequest::new("foo", "foo"), &mut out)
            .await
            .unwrap();

        assert!(matches!(state, InstallState::Written(Installation::Registered { .. })));
        assert!(out.is_empty());
        assert!(marker::contains(&fs.get("/home/me/.zshrc").unwrap(), "foo"));
        assert!(
            fs.get("/home/me/.config/tabtab/completions/foo")
                .unwrap()
                .contains("compdef _foo_completion foo")
        );
    }

    #[tokio::test]
    async fn test_install_to_stdout_writes_nothing() {
        let fs = Arc::new(MemoryFileSystem::new());
        let (installer, _) = installer(Some("stdout"), fs.clone());
        let mut out = Vec::new();

        let state = installer
            .install(InstallRequest::new("foo", "foo"), &mut out)
            .await
            .unwrap();

        assert_eq!(state, InstallState::Written(Installation::Printed));
        assert!(String::from_utf8(out).unwrap().contains("complete -o default -F _foo_completion foo"));
        assert_eq!(fs.get("/home/me/.config/tabtab/completions/foo"), None);
    }

    #[tokio::test]
    async fn test_aborted_install_stays_uninstalled() {
        let fs = Arc::new(MemoryFileSystem::new());
        let (installer, _) = installer(None, fs.clone());
        let mut out = Vec::new();

        let state = installer
            .install(InstallRequest::new("foo", "foo"), &mut out)
            .await
            .unwrap();

        assert_eq!(state, InstallState::Uninstalled);
        assert_eq!(fs.get("/home/me/.bashrc"), None);
    }

    #[tokio::test]
    async fn test_install_validates_before_prompting() {
        let fs = Arc::new(MemoryFileSystem::new());
        let (installer, prompter) = installer(Some("bashrc"), fs);
        let mut out = Vec::new();

        let err = installer
            .install(InstallRequest::new("foo", ""), &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, TabtabError::Validation(ValidationError::MissingCompleter)));

        let err = installer
            .install(InstallRequest::new("../../.bashrc", "foo"), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, TabtabError::Validation(ValidationError::InvalidName(_))));
        assert!(prompter.asked.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_planned_state_can_be_dropped() {
        let fs = Arc::new(MemoryFileSystem::new());
        let (installer, _) = installer(Some("bashrc"), fs.clone());

        let state = installer.plan(InstallRequest::new("foo", "foo")).await.unwrap();
        let InstallState::Planned(plan) = &state else {
            panic!("Expected Planned state");
        };
        assert_eq!(plan.target, InstallTarget::ShellProfile(PathBuf::from("/home/me/.bashrc")));
        // nothing is written until the plan is carried out
        assert_eq!(fs.get("/home/me/.bashrc"), None);

        let mut out = Vec::new();
        let written = installer.write(state, &mut out).unwrap();
        assert!(matches!(written, InstallState::Written(_)));
        assert!(installer.write(InstallState::Uninstalled, &mut out).unwrap() == InstallState::Uninstalled);
    }

    #[tokio::test]
    async fn test_install_then_uninstall() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("/home/me/.bashrc", "PS1='$ '\n");
        let (installer, _) = installer(Some("bashrc"), fs.clone());
        let mut out = Vec::new();

        installer
            .install(InstallRequest::new("foo", "foo"), &mut out)
            .await
            .unwrap();
        let report = installer.uninstall("foo").await.unwrap();

        assert!(report.script_removed);
        assert_eq!(fs.get("/home/me/.bashrc").unwrap(), "PS1='$ '\n");
        assert_eq!(fs.get("/home/me/.config/tabtab/completions/foo"), None);
    }
}
