// File: src/logging.rs
use anyhow::{Context, Result};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::OpenOptions;
use std::path::Path;

/// Warnings and errors go to stderr; everything up to `level` is appended
/// to `log_file` when one is given.
///
/// Only the first call installs a logger. Later calls log a warning and
/// return `Ok`.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn.min(level),
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file
        && level != LevelFilter::Off
    {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        loggers.push(WriteLogger::new(level, config, file));
    }

    if CombinedLogger::init(loggers).is_err() {
        log::warn!("Logger already initialised; keeping the existing one");
    }
    Ok(())
}
