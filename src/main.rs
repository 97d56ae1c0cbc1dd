//! Tabtab - shell completion for command line programs
//!
//! # Usage
//!
//! ```bash
//! # Install completion for a program
//! tabtab install --name mytool --completer mytool
//!
//! # Remove it again
//! tabtab uninstall --name mytool
//! ```

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use tabtab::cli::CliInterface;
use tabtab::config::LoggingConfig;
use tabtab::error::Result;

/// Variable holding an `EnvFilter` directive overriding the log level
const LOG_ENV: &str = "TABTAB_LOG";

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Run the subcommand
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli.config().logging)?;

    cli.handle_subcommand().await
}

/// Initialize logging system
///
/// Logs go to stderr, or to `logging.file_path` when set, since stdout
/// carries completion candidates.
///
/// # Arguments
/// * `logging` - Logging configuration with CLI overrides applied
fn initialize_logging(logging: &LoggingConfig) -> Result<()> {
    let level = LevelFilter::from_level(logging.level.to_tracing_level());
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let writer = match &logging.file_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(logging.file_path.is_none())
        .with_target(false);

    if logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }

    Ok(())
}
