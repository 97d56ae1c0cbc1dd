//! Writing planned installations
//!
//! The completion script itself lives in a managed directory, one file per
//! package. The chosen target only receives a marker block sourcing it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::fs::{FileSystem, OpenMode};
use super::marker;
use super::planner::{InstallPlan, InstallTarget};
use super::script;
use crate::error::{Result, TabtabError};

/// Outcome of a finished installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installation {
    /// The script was printed, nothing was written to disk
    Printed,

    /// The script was written and registered in `target`
    Registered {
        target: PathBuf,
        script: PathBuf,
        mode: OpenMode,
        /// Whether an earlier block for the package was replaced
        replaced: bool,
    },
}

/// Performs the file mutations of an installation
pub struct ScriptWriter {
    fs: Arc<dyn FileSystem>,
    managed_dir: PathBuf,
    tool: String,
}

impl ScriptWriter {
    /// Create a writer
    ///
    /// # Arguments
    /// * `fs` - Filesystem to write through
    /// * `managed_dir` - Directory holding one script per package
    /// * `tool` - Name of this tool, quoted in the uninstall hint
    pub fn new(fs: Arc<dyn FileSystem>, managed_dir: PathBuf, tool: impl Into<String>) -> Self {
        Self {
            fs,
            managed_dir,
            tool: tool.into(),
        }
    }

    /// Path of the managed script of `name`
    pub fn script_path(&self, name: &str) -> PathBuf {
        self.managed_dir.join(name)
    }

    /// Render the script of a plan
    pub fn render(&self, plan: &InstallPlan) -> String {
        script::render(&plan.request.name, &plan.request.completer, plan.shell)
    }

    /// Write the script of a plan to `out`
    pub fn emit<W: Write>(&self, plan: &InstallPlan, out: &mut W) -> Result<Installation> {
        out.write_all(self.render(plan).as_bytes())?;
        out.flush()?;
        Ok(Installation::Printed)
    }

    /// Carry out a plan: open the target, write the script, append the block
    ///
    /// A plan targeting stdout has nothing to write and is rejected. A target
    /// file created here is removed again when a later step fails.
    pub fn write(&self, plan: &InstallPlan) -> Result<Installation> {
        let Some(target) = plan.target.path() else {
            return Err(TabtabError::Generic(
                "Stdout installations have no file to write".to_string(),
            ));
        };

        let mode = self.open_target(target)?;
        debug!(
            "Writing to {} in {} mode",
            target.display(),
            if mode == OpenMode::Append { "append" } else { "write" }
        );

        self.register(plan, target, mode).inspect_err(|_| {
            if mode == OpenMode::Create {
                self.discard_target(target);
            }
        })
    }

    /// Write the managed script and append the block loading it
    fn register(&self, plan: &InstallPlan, target: &Path, mode: OpenMode) -> Result<Installation> {
        let name = plan.request.name.as_str();

        let script_path = self.script_path(name);
        debug!("Writing actual completion script to {}", script_path.display());
        self.fs
            .create_dir_all(&self.managed_dir)
            .map_err(|e| TabtabError::from_io_at(e, &self.managed_dir))?;
        self.fs
            .write(&script_path, &self.render(plan))
            .map_err(|e| TabtabError::from_io_at(e, &script_path))?;

        let replaced = self.remove_existing_block(target, name)?;

        info!("Adding source line to load {} in {}", script_path.display(), target.display());
        let block = marker::render(name, &self.tool, &script_path, plan.shell);
        self.fs
            .append(target, &block)
            .map_err(|e| TabtabError::from_io_at(e, target))?;

        Ok(Installation::Registered {
            target: target.to_path_buf(),
            script: script_path,
            mode,
            replaced,
        })
    }

    /// Remove a target created by a failed installation
    fn discard_target(&self, target: &Path) {
        debug!("Removing {} created by the failed installation", target.display());
        if let Err(e) = self.fs.remove_file(target) {
            warn!("Could not remove {}: {}", target.display(), e);
        }
    }

    fn open_target(&self, target: &Path) -> Result<OpenMode> {
        if let Some(parent) = target.parent() {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| TabtabError::from_io_at(e, parent))?;
        }
        self.fs
            .open_append(target)
            .map_err(|e| TabtabError::from_io_at(e, target))
    }

    /// Strip a block left by an earlier install so the new one is the only one
    fn remove_existing_block(&self, target: &Path, name: &str) -> Result<bool> {
        let Some(content) = self.fs.read_to_string(target)? else {
            return Ok(false);
        };
        let Some(stripped) = marker::strip(&content, name) else {
            return Ok(false);
        };

        debug!("Replacing existing block for {} in {}", name, target.display());
        self.fs
            .write(target, &stripped)
            .map_err(|e| TabtabError::from_io_at(e, target))?;
        Ok(true)
    }
}

/// Whether a plan needs file mutations
pub fn writes_files(plan: &InstallPlan) -> bool {
    !matches!(plan.target, InstallTarget::Stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::fs::OsFileSystem;
    use crate::installer::fs::memory::MemoryFileSystem;
    use crate::installer::planner::InstallRequest;
    use crate::shell::ShellKind;

    fn plan(target: InstallTarget, shell: ShellKind) -> InstallPlan {
        InstallPlan {
            request: InstallRequest::new("foo", "foo-complete"),
            target,
            shell,
        }
    }

    #[test]
    fn test_write_profile() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        std::fs::write(&rc, "export PATH=$PATH:~/bin\n").unwrap();

        let managed = dir.path().join("managed");
        let writer = ScriptWriter::new(Arc::new(OsFileSystem), managed.clone(), "tabtab");
        let result = writer
            .write(&plan(InstallTarget::ShellProfile(rc.clone()), ShellKind::Bash))
            .unwrap();

        let script = managed.join("foo");
        assert_eq!(
            result,
            Installation::Registered {
                target: rc.clone(),
                script: script.clone(),
                mode: OpenMode::Append,
                replaced: false,
            }
        );

        let content = std::fs::read_to_string(&rc).unwrap();
        assert!(content.starts_with("export PATH=$PATH:~/bin\n\n# tabtab source for foo package\n"));
        assert!(content.ends_with(&format!(". {}\n", script.display())));

        let script_text = std::fs::read_to_string(&script).unwrap();
        assert!(script_text.contains("foo-complete completion --"));
    }

    #[test]
    fn test_write_creates_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("completions").join("foo");
        let writer = ScriptWriter::new(Arc::new(OsFileSystem), dir.path().join("managed"), "tabtab");

        let result = writer
            .write(&plan(InstallTarget::CompletionsDir(target.clone()), ShellKind::Bash))
            .unwrap();

        assert!(matches!(result, Installation::Registered { mode: OpenMode::Create, .. }));
        assert!(marker::contains(&std::fs::read_to_string(&target).unwrap(), "foo"));
    }

    #[test]
    fn test_reinstall_does_not_duplicate_block() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("/home/me/.zshrc", "setopt autocd\n");
        let writer = ScriptWriter::new(fs.clone(), PathBuf::from("/home/me/.config/tabtab/completions"), "tabtab");
        let plan = plan(InstallTarget::ShellProfile(PathBuf::from("/home/me/.zshrc")), ShellKind::Zsh);

        writer.write(&plan).unwrap();
        let first = fs.get("/home/me/.zshrc").unwrap();
        let second_result = writer.write(&plan).unwrap();
        let second = fs.get("/home/me/.zshrc").unwrap();

        assert_eq!(first, second);
        assert_eq!(second.matches("# tabtab source for foo package").count(), 1);
        assert!(matches!(second_result, Installation::Registered { replaced: true, .. }));
    }

    #[test]
    fn test_permission_denied_on_target() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.deny("/usr/share/bash-completion");
        let writer = ScriptWriter::new(fs.clone(), PathBuf::from("/home/me/.config/tabtab/completions"), "tabtab");

        let err = writer
            .write(&plan(
                InstallTarget::CompletionsDir(PathBuf::from("/usr/share/bash-completion/completions/foo")),
                ShellKind::Bash,
            ))
            .unwrap_err();

        assert!(matches!(err, TabtabError::PermissionDenied { .. }));
        assert!(err.hint().unwrap().contains("sudo"));
        // aborted before the managed script was written
        assert_eq!(fs.get("/home/me/.config/tabtab/completions/foo"), None);
    }

    #[test]
    fn test_failed_script_write_removes_created_target() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.deny("/home/me/.config/tabtab");
        let writer = ScriptWriter::new(fs.clone(), PathBuf::from("/home/me/.config/tabtab/completions"), "tabtab");

        let err = writer
            .write(&plan(InstallTarget::ShellProfile(PathBuf::from("/home/me/.zshrc")), ShellKind::Zsh))
            .unwrap_err();

        assert!(matches!(err, TabtabError::PermissionDenied { .. }));
        assert_eq!(fs.get("/home/me/.zshrc"), None);
    }

    #[test]
    fn test_failed_script_write_keeps_existing_target() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("/home/me/.zshrc", "setopt autocd\n");
        fs.deny("/home/me/.config/tabtab");
        let writer = ScriptWriter::new(fs.clone(), PathBuf::from("/home/me/.config/tabtab/completions"), "tabtab");

        assert!(
            writer
                .write(&plan(InstallTarget::ShellProfile(PathBuf::from("/home/me/.zshrc")), ShellKind::Zsh))
                .is_err()
        );
        assert_eq!(fs.get("/home/me/.zshrc").unwrap(), "setopt autocd\n");
    }

    #[test]
    fn test_emit_prints_script() {
        let writer = ScriptWriter::new(Arc::new(MemoryFileSystem::new()), PathBuf::from("/m"), "tabtab");
        let plan = plan(InstallTarget::Stdout, ShellKind::Fish);
        let mut out = Vec::new();

        assert_eq!(writer.emit(&plan, &mut out).unwrap(), Installation::Printed);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("complete -f -d 'foo' -c foo"));
        assert!(!writes_files(&plan));
    }

    #[test]
    fn test_write_rejects_stdout_plan() {
        let writer = ScriptWriter::new(Arc::new(MemoryFileSystem::new()), PathBuf::from("/m"), "tabtab");
        assert!(writer.write(&plan(InstallTarget::Stdout, ShellKind::Bash)).is_err());
    }
}
