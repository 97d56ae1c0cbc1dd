//! Filesystem access used by the installer
//!
//! All mutations of profiles, completion directories and managed scripts go
//! through [`FileSystem`] so they can be redirected in tests.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// How a target file was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// The file existed and will be appended to
    Append,
    /// The file did not exist and was created
    Create,
}

/// Minimal set of file operations needed to install and uninstall scripts
pub trait FileSystem: Send + Sync {
    /// Open `path` for appending, creating it when absent
    fn open_append(&self, path: &Path) -> io::Result<OpenMode>;

    /// Append `content` to `path` in a single write
    fn append(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Replace the contents of `path`
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Read `path`, `None` when it does not exist
    fn read_to_string(&self, path: &Path) -> io::Result<Option<String>>;

    /// Remove a file, returning whether it existed
    fn remove_file(&self, path: &Path) -> io::Result<bool>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything below it, returning whether it existed
    fn remove_dir_all(&self, path: &Path) -> io::Result<bool>;

    /// Names of the entries of a directory; empty when it does not exist
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// [`FileSystem`] backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn open_append(&self, path: &Path) -> io::Result<OpenMode> {
        let mode = if path.exists() {
            OpenMode::Append
        } else {
            OpenMode::Create
        };
        OpenOptions::new().append(true).create(true).open(path)?;
        Ok(mode)
    }

    fn append(&self, path: &Path, content: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).create(true).open(path)?;
        file.write_all(content.as_bytes())?;
        file.flush()
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        fs::write(path, content)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<bool> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut names = Vec::new();
        for entry in entries {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory [`FileSystem`] for tests

    use std::collections::{BTreeMap, BTreeSet};
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use super::{FileSystem, OpenMode};

    #[derive(Debug, Default)]
    pub struct MemoryFileSystem {
        files: Mutex<BTreeMap<PathBuf, String>>,
        dirs: Mutex<BTreeSet<PathBuf>>,
        read_only: Mutex<BTreeSet<PathBuf>>,
    }

    impl MemoryFileSystem {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every write below `path` fail with `PermissionDenied`
        pub fn deny(&self, path: impl Into<PathBuf>) {
            self.read_only.lock().unwrap().insert(path.into());
        }

        pub fn insert(&self, path: impl Into<PathBuf>, content: &str) {
            self.files
                .lock()
                .unwrap()
                .insert(path.into(), content.to_string());
        }

        pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
            self.files.lock().unwrap().get(path.as_ref()).cloned()
        }

        pub fn has_dir(&self, path: impl AsRef<Path>) -> bool {
            self.dirs.lock().unwrap().contains(path.as_ref())
        }

        fn check(&self, path: &Path) -> io::Result<()> {
            let denied = self
                .read_only
                .lock()
                .unwrap()
                .iter()
                .any(|p| path.starts_with(p));
            if denied {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
            } else {
                Ok(())
            }
        }
    }

    impl FileSystem for MemoryFileSystem {
        fn open_append(&self, path: &Path) -> io::Result<OpenMode> {
            self.check(path)?;
            let mut files = self.files.lock().unwrap();
            if files.contains_key(path) {
                Ok(OpenMode::Append)
            } else {
                files.insert(path.to_path_buf(), String::new());
                Ok(OpenMode::Create)
            }
        }

        fn append(&self, path: &Path, content: &str) -> io::Result<()> {
            self.check(path)?;
            self.files
                .lock()
                .unwrap()
                .entry(path.to_path_buf())
                .or_default()
                .push_str(content);
            Ok(())
        }

        fn write(&self, path: &Path, content: &str) -> io::Result<()> {
            self.check(path)?;
            self.insert(path, content);
            Ok(())
        }

        fn read_to_string(&self, path: &Path) -> io::Result<Option<String>> {
            Ok(self.get(path))
        }

        fn remove_file(&self, path: &Path) -> io::Result<bool> {
            self.check(path)?;
            Ok(self.files.lock().unwrap().remove(path).is_some())
        }

        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            self.check(path)?;
            self.dirs.lock().unwrap().insert(path.to_path_buf());
            Ok(())
        }

        fn remove_dir_all(&self, path: &Path) -> io::Result<bool> {
            self.check(path)?;
            self.files.lock().unwrap().retain(|p, _| !p.starts_with(path));
            let mut dirs = self.dirs.lock().unwrap();
            let existed = dirs.contains(path);
            dirs.retain(|p| !p.starts_with(path));
            Ok(existed)
        }

        fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
            Ok(self
                .files
                .lock()
                .unwrap()
                .keys()
                .filter(|p| p.parent() == Some(path))
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect())
        }
    }
}
