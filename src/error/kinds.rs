use std::path::PathBuf;
use std::{fmt, io};

/// Crate-wide `Result` type using [`TabtabError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, TabtabError>;

/// Top-level error type for tabtab operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum TabtabError {
    /// Missing or empty required input. Raised before any side effect.
    Validation(ValidationError),

    /// External completions-directory lookup failed.
    ///
    /// The planner recovers from this by omitting the candidate.
    Discovery { variable: String, reason: String },

    /// A file could not be opened or written because of its permissions.
    PermissionDenied { path: PathBuf, hint: String },

    /// Other I/O errors.
    Io(io::Error),

    /// Configuration errors.
    Config(ConfigError),

    /// The interactive prompt failed.
    Prompt(String),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Validation-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Package name is missing or empty.
    MissingName,

    /// Completer invocation is missing or empty.
    MissingCompleter,

    /// Package name is not a plain file name (`/`, `..`, absolute path).
    InvalidName(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Unreadable { path: PathBuf, reason: String },

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Home directory could not be resolved.
    NoHomeDirectory,
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for TabtabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabtabError::Validation(e) => write!(f, "Validation error: {e}"),
            TabtabError::Discovery { variable, reason } => {
                write!(f, "Failed to look up '{variable}': {reason}")
            }
            TabtabError::PermissionDenied { path, .. } => {
                write!(f, "Permission denied: {}", path.display())
            }
            TabtabError::Io(e) => write!(f, "I/O error: {e}"),
            TabtabError::Config(e) => write!(f, "Configuration error: {e}"),
            TabtabError::Prompt(msg) => write!(f, "Prompt failed: {msg}"),
            TabtabError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingName => write!(f, "package name is required"),
            ValidationError::MissingCompleter => write!(f, "completer is required"),
            ValidationError::InvalidName(name) => {
                write!(f, "invalid package name '{name}': must be a plain file name")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Unreadable { path, reason } => {
                write!(f, "Cannot read {}: {reason}", path.display())
            }
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::NoHomeDirectory => write!(f, "Cannot determine home directory"),
        }
    }
}

impl std::error::Error for TabtabError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TabtabError::Io(e) => Some(e),
            TabtabError::Validation(e) => Some(e),
            TabtabError::Config(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ValidationError {}
impl std::error::Error for ConfigError {}

impl TabtabError {
    /// Remediation hint for the user, when one exists.
    pub fn hint(&self) -> Option<&str> {
        match self {
            TabtabError::PermissionDenied { hint, .. } => Some(hint),
            _ => None,
        }
    }

    /// Build the error for a failed open/write on `path`.
    ///
    /// Permission failures become [`TabtabError::PermissionDenied`] carrying
    /// a hint to rerun the current command with elevated privileges.
    pub fn from_io_at(err: io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            let path = path.into();
            let command: Vec<String> = std::env::args_os()
                .map(|a| a.to_string_lossy().into_owned())
                .collect();
            let hint = format!(
                "You don't have permission to write to {}.\nTry running with sudo instead:\n\n  sudo {}\n",
                path.display(),
                command.join(" ")
            );
            TabtabError::PermissionDenied { path, hint }
        } else {
            TabtabError::Io(err)
        }
    }
}

/* ========================= Conversions to TabtabError ========================= */

impl From<io::Error> for TabtabError {
    fn from(err: io::Error) -> Self {
        TabtabError::Io(err)
    }
}

impl From<ValidationError> for TabtabError {
    fn from(err: ValidationError) -> Self {
        TabtabError::Validation(err)
    }
}

impl From<ConfigError> for TabtabError {
    fn from(err: ConfigError) -> Self {
        TabtabError::Config(err)
    }
}

impl From<serde_json::Error> for TabtabError {
    fn from(err: serde_json::Error) -> Self {
        TabtabError::Generic(format!("JSON error: {err}"))
    }
}

impl From<String> for TabtabError {
    fn from(msg: String) -> Self {
        TabtabError::Generic(msg)
    }
}

impl From<&str> for TabtabError {
    fn from(msg: &str) -> Self {
        TabtabError::Generic(msg.to_owned())
    }
}
