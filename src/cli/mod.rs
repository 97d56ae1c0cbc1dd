//! Command-line interface for tabtab
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Subcommand dispatch

pub mod completion;

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;

use crate::config::{Config, LogLevel};
use crate::error::{Result, TabtabError};
use crate::installer::{InstallRequest, InstallState, Installation, Installer};
use crate::protocol::{self, CompletionState, MatchInput};
use crate::shell::ShellKind;

/// Tab completion for any command line program
#[derive(Parser, Debug)]
#[command(
    name = "tabtab",
    version,
    about = "Shell completion for command line programs",
    long_about = "Installs completion scripts for bash, zsh and fish, and formats
completion candidates for the shell asking for them."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for tabtab
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install the completion script of a package
    Install {
        /// Package to complete (defaults to tabtab itself)
        #[arg(long, value_name = "NAME")]
        name: Option<String>,

        /// Program answering completion requests (defaults to the name)
        #[arg(long, value_name = "PROGRAM")]
        completer: Option<String>,
    },

    /// Remove the completion script of a package
    Uninstall {
        /// Package to remove (defaults to tabtab itself)
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },

    /// Answer a completion request for tabtab itself
    Completion {
        /// Words passed by the completion script
        #[arg(last = true)]
        words: Vec<String>,
    },

    /// Format completion candidates for the current shell
    Log {
        /// Candidates, as `name` or `name:description` (read from stdin when empty)
        #[arg(value_name = "MATCH")]
        matches: Vec<String>,

        /// Read a JSON array of strings or {name, description} records from stdin
        #[arg(long)]
        json: bool,
    },

    /// Print the decoded completion request as JSON
    State,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with environment and arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        config.apply_env(std::env::vars());
        Self::apply_logging_args(&mut config, args);

        Ok(config)
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Run the selected subcommand
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    pub async fn handle_subcommand(&self) -> Result<()> {
        match &self.args.command {
            Commands::Install { name, completer } => {
                self.install(name.as_deref(), completer.as_deref()).await
            }
            Commands::Uninstall { name } => {
                self.uninstall(name.as_deref()).await;
                Ok(())
            }
            Commands::Completion { words } => completion::complete(&mut io::stdout().lock(), words),
            Commands::Log { matches, json } => self.log(matches, *json),
            Commands::State => self.print_state(),
        }
    }

    /// Package name, or the tool itself when none was given
    fn package_name(&self, name: Option<&str>) -> String {
        name.map_or_else(|| self.config.install.tool_name.clone(), str::to_string)
    }

    async fn install(&self, name: Option<&str>, completer: Option<&str>) -> Result<()> {
        let name = self.package_name(name);
        let completer = completer.map_or_else(|| name.clone(), str::to_string);

        let installer = Installer::from_config(&self.config)?;
        let request = InstallRequest::new(&name, completer);

        let state = match installer.install(request, &mut io::stdout()).await {
            Ok(state) => state,
            Err(e) => {
                if let Some(hint) = e.hint() {
                    eprintln!("{}", hint);
                }
                return Err(e);
            }
        };

        match state {
            InstallState::Written(Installation::Registered { target, .. }) => {
                eprintln!("=> Tabtab source line added to {} for {} package.", target.display(), name);
                eprintln!();
                eprintln!("Make sure to reload your SHELL.");
            }
            InstallState::Uninstalled => eprintln!("Installation aborted."),
            _ => {}
        }

        Ok(())
    }

    /// Uninstall never fails the process; errors are only reported
    async fn uninstall(&self, name: Option<&str>) {
        let name = self.package_name(name);

        let result = match Installer::from_config(&self.config) {
            Ok(installer) => installer.uninstall(&name).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(report) if report.is_noop() => {
                eprintln!("Nothing to uninstall for {}.", name);
            }
            Ok(report) => {
                for path in &report.cleaned {
                    eprintln!("=> Removed tabtab source lines from {}", path.display());
                }
                if report.teardown {
                    eprintln!("=> No completion left, removed {} completion", self.config.install.tool_name);
                }
            }
            Err(e) => {
                eprintln!("ERROR while uninstalling {}: {}", name, e);
                if let Some(hint) = e.hint() {
                    eprintln!("{}", hint);
                }
            }
        }
    }

    fn log(&self, matches: &[String], json: bool) -> Result<()> {
        let candidates = if json {
            read_json_matches(io::stdin().lock())?
        } else if !matches.is_empty() {
            matches.iter().cloned().map(MatchInput::from).collect()
        } else if !io::stdin().is_terminal() {
            read_line_matches(io::stdin().lock())?
        } else {
            Vec::new()
        };

        let state = CompletionState::from_process_env();
        protocol::log(&mut io::stdout().lock(), candidates, ShellKind::detect(), &state)
    }

    fn print_state(&self) -> Result<()> {
        let state = CompletionState::from_process_env();
        let mut out = io::stdout().lock();
        writeln!(out, "{}", serde_json::to_string_pretty(&state)?)?;
        Ok(())
    }
}

/// Candidates from a JSON array of strings or records
fn read_json_matches<R: Read>(reader: R) -> Result<Vec<MatchInput>> {
    serde_json::from_reader(reader)
        .map_err(|e| TabtabError::Generic(format!("Invalid JSON candidates: {}", e)))
}

/// Candidates from non-empty input lines
fn read_line_matches<R: BufRead>(reader: R) -> Result<Vec<MatchInput>> {
    let mut candidates = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            candidates.push(MatchInput::from(line));
        }
    }
    Ok(candidates)
}
