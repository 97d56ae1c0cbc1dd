//! Configuration management for tabtab
//!
//! Configuration is read from a TOML file and adjusted by environment
//! variables and command-line arguments.
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables (`TABTAB_DEBUG`)
//! 3. Configuration file (`TABTAB_CONFIG` or `~/.config/tabtab/config.toml`)
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Variable naming an alternative configuration file
pub const CONFIG_ENV: &str = "TABTAB_CONFIG";

/// Variable naming a file receiving debug logs
pub const DEBUG_ENV: &str = "TABTAB_DEBUG";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Installation configuration
    #[serde(default)]
    pub install: InstallConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Installation-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Directory holding one completion script per package
    #[serde(default = "default_managed_dir")]
    pub managed_dir: PathBuf,

    /// Name this tool registers its own completion under
    #[serde(default = "default_tool_name")]
    pub tool_name: String,

    /// Program used to discover completion directories
    #[serde(default = "default_pkg_config")]
    pub pkg_config: String,

    /// pkg-config package publishing the completion directories
    #[serde(default = "default_pkg_config_package")]
    pub pkg_config_package: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Path to log file (None for stderr)
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn config_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tabtab")
}

// Default value functions
fn default_managed_dir() -> PathBuf {
    config_root().join("completions")
}

fn default_tool_name() -> String {
    "tabtab".to_string()
}

fn default_pkg_config() -> String {
    "pkg-config".to_string()
}

fn default_pkg_config_package() -> String {
    "bash-completion".to_string()
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            managed_dir: default_managed_dir(),
            tool_name: default_tool_name(),
            pkg_config: default_pkg_config(),
            pkg_config_package: default_pkg_config_package(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        config_root().join("config.toml")
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Explicit path; falls back to `TABTAB_CONFIG`, then the
    ///   default path
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration, defaults when the file
    ///   does not exist
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var_os(CONFIG_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(Self::default_path),
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::Unreadable {
                    path,
                    reason: e.to_string(),
                }
                .into());
            }
        };

        Self::from_toml_str(&text)
    }

    /// Apply environment overrides
    ///
    /// `TABTAB_DEBUG=<file>` sends debug-level logs to that file.
    pub fn apply_env<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            if key.as_ref() == DEBUG_ENV {
                let value: String = value.into();
                if !value.is_empty() {
                    self.logging.file_path = Some(PathBuf::from(value));
                    self.logging.level = LogLevel::Debug;
                }
            }
        }
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.install.tool_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "install.tool_name".to_string(),
                value: self.install.tool_name.clone(),
            }
            .into());
        }
        if self.install.managed_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "install.managed_dir".to_string(),
                value: String::new(),
            }
            .into());
        }
        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
