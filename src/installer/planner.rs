//! Installation planning
//!
//! Asks the user where a completion script should go and turns the answer
//! into a concrete [`InstallPlan`]. Nothing is written here.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::discovery::{DirectoryLookup, discover_directories};
use super::prompt::{Choice, Prompter, Question};
use crate::error::{Result, TabtabError, ValidationError};
use crate::shell::ShellKind;

const STDOUT: &str = "stdout";
const BASHRC: &str = "bashrc";
const ZSHRC: &str = "zshrc";
const FISH_CONFIG: &str = "fish";

/// A request to install completion for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Package (command) name completion is registered for
    pub name: String,

    /// Command invoked by the script to produce candidates
    pub completer: String,
}

impl InstallRequest {
    pub fn new(name: impl Into<String>, completer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            completer: completer.into(),
        }
    }

    /// Reject empty completers and names that are not plain file names
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.completer.trim().is_empty() {
            return Err(ValidationError::MissingCompleter.into());
        }
        Ok(())
    }
}

/// Check that a package name can be used as a file name
///
/// The name is joined onto the managed directory and onto completions
/// directories, so it must not be able to point anywhere else.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingName.into());
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) || Path::new(name).is_absolute() {
        return Err(ValidationError::InvalidName(name.to_string()).into());
    }
    Ok(())
}

/// Destination as chosen by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    /// The home-directory profile of a shell
    Profile(ShellKind),
    /// A completions directory
    Directory(PathBuf),
}

impl Destination {
    /// Map a prompt answer back to a destination
    ///
    /// Anything that is not a known alias is a directory.
    pub fn from_value(value: &str) -> Self {
        match value {
            STDOUT => Destination::Stdout,
            BASHRC => Destination::Profile(ShellKind::Bash),
            ZSHRC => Destination::Profile(ShellKind::Zsh),
            FISH_CONFIG => Destination::Profile(ShellKind::Fish),
            dir => Destination::Directory(PathBuf::from(dir)),
        }
    }
}

/// Where the installation writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallTarget {
    Stdout,
    /// A shell profile receiving the marker block
    ShellProfile(PathBuf),
    /// A file inside a completions directory receiving the marker block
    CompletionsDir(PathBuf),
}

impl InstallTarget {
    /// File receiving the marker block
    pub fn path(&self) -> Option<&Path> {
        match self {
            InstallTarget::Stdout => None,
            InstallTarget::ShellProfile(path) | InstallTarget::CompletionsDir(path) => Some(path),
        }
    }
}

/// A planned installation: what to write and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub request: InstallRequest,
    pub target: InstallTarget,
    /// Shell the generated script is written for
    pub shell: ShellKind,
}

/// Home-directory profile of `shell`
pub fn profile_path(home: &Path, shell: ShellKind) -> Option<PathBuf> {
    match shell {
        ShellKind::Bash => Some(home.join(".bashrc")),
        ShellKind::Zsh => Some(home.join(".zshrc")),
        ShellKind::Fish => Some(home.join(".config").join("fish").join("config.fish")),
        ShellKind::Other => None,
    }
}

/// Chooses the installation destination
pub struct InstallationPlanner {
    prompter: Arc<dyn Prompter>,
    lookup: Arc<dyn DirectoryLookup>,
    home: PathBuf,
    shell: ShellKind,
}

impl InstallationPlanner {
    /// Create a planner
    ///
    /// # Arguments
    /// * `prompter` - Asks the user for the destination
    /// * `lookup` - Discovers extra completion directories
    /// * `home` - Home directory holding the shell profiles
    /// * `shell` - Shell of the current process, used for stdout output
    pub fn new(
        prompter: Arc<dyn Prompter>,
        lookup: Arc<dyn DirectoryLookup>,
        home: PathBuf,
        shell: ShellKind,
    ) -> Self {
        Self {
            prompter,
            lookup,
            home,
            shell,
        }
    }

    /// Build the destination question, including discovered directories
    pub async fn question(&self) -> Question {
        let mut question = Question::new("Where do you want to setup the completion script");
        question.push(Choice::new("Nowhere. Just output to STDOUT", STDOUT));
        question.push(Choice::new("~/.bashrc", BASHRC));
        question.push(Choice::new("~/.zshrc", ZSHRC));
        question.push(Choice::new("~/.config/fish/config.fish", FISH_CONFIG));

        for dir in discover_directories(self.lookup.as_ref()).await {
            let dir = dir.display().to_string();
            question.push(Choice::new(dir.clone(), dir));
        }

        question
    }

    /// Ask for a destination and plan the installation
    ///
    /// Returns `None` when the user aborted the prompt.
    pub async fn plan(&self, request: InstallRequest) -> Result<Option<InstallPlan>> {
        request.validate()?;

        let question = self.question().await;
        debug!("Asking destination among {} choice(s)", question.choices.len());

        let Some(answer) = self.prompter.ask(&question).await? else {
            debug!("Destination prompt aborted for {}", request.name);
            return Ok(None);
        };

        let destination = Destination::from_value(&answer);
        debug!("Installing completion script to {:?}", destination);

        self.resolve(request, destination).map(Some)
    }

    /// Turn a destination into an absolute target
    pub fn resolve(&self, request: InstallRequest, destination: Destination) -> Result<InstallPlan> {
        let (target, shell) = match destination {
            Destination::Stdout => (InstallTarget::Stdout, self.shell),
            Destination::Profile(shell) => {
                let path = profile_path(&self.home, shell).ok_or_else(|| {
                    TabtabError::Generic(format!("No profile known for shell {shell}"))
                })?;
                (InstallTarget::ShellProfile(path), shell)
            }
            Destination::Directory(dir) => {
                let dir = std::path::absolute(&dir).map_err(|e| TabtabError::from_io_at(e, &dir))?;
                (
                    InstallTarget::CompletionsDir(dir.join(&request.name)),
                    ShellKind::Bash,
                )
            }
        };

        Ok(InstallPlan {
            request,
            target,
            shell,
        })
    }
}
