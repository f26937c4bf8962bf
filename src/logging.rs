// File: ./src/logging.rs
//! Logger bootstrap.
//!
//! Installs a `simplelog` pair once per process: everything at the configured
//! level goes to `pantry.log` in the context's log directory, warnings and
//! errors are echoed on stderr. Calling `init_logging` again is a no-op.

use crate::config::Config;
use crate::context::AppContext;
use anyhow::{Context, Result, anyhow};
use log::LevelFilter;
use once_cell::sync::OnceCell;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::OpenOptions;
use std::path::PathBuf;

const LOG_FILE_NAME: &str = "pantry.log";

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

#[derive(Debug)]
struct LoggingState {
    level: LevelFilter,
    log_file: PathBuf,
}

pub fn parse_level(level: &str) -> Result<LevelFilter> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| anyhow!("Unsupported log level '{}'", level))
}

pub fn init_logging(level: &str, ctx: &dyn AppContext) -> Result<()> {
    let level = parse_level(level)?;

    LOGGING_STATE
        .get_or_try_init(|| -> Result<LoggingState> {
            let log_file = ctx.get_log_dir()?.join(LOG_FILE_NAME);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)
                .with_context(|| format!("Failed to open log file: {:?}", log_file))?;

            let config = ConfigBuilder::new().set_time_format_rfc3339().build();
            let loggers: Vec<Box<dyn SharedLogger>> = vec![
                WriteLogger::new(level, config.clone(), file),
                TermLogger::new(
                    LevelFilter::Warn,
                    config,
                    TerminalMode::Stderr,
                    ColorChoice::Auto,
                ),
            ];
            CombinedLogger::init(loggers).map_err(|e| anyhow!("Failed to install logger: {}", e))?;

            log::info!("Logging initialized at {} ({:?})", level, log_file);
            Ok(LoggingState { level, log_file })
        })
        .map(|state| {
            if state.level != level {
                log::debug!(
                    "Logging already initialized at {}; ignoring request for {}",
                    state.level,
                    level
                );
            }
        })
}

/// `init_logging` at the level named by `config.log_level`.
pub fn init_logging_from_config(config: &Config, ctx: &dyn AppContext) -> Result<()> {
    init_logging(&config.log_level, ctx)
        .with_context(|| format!("Invalid log_level in config: '{}'", config.log_level))
}

/// Path of the active log file, if logging has been initialized.
pub fn log_file_path() -> Option<PathBuf> {
    LOGGING_STATE.get().map(|state| state.log_file.clone())
}
