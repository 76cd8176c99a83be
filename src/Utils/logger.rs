//! Logger setup shared by the demo binary and by callers that want to see what the reducer
//! and the editing field are doing.
//!
//! Terminal output is always on; a log file is added on request. A file name of `"auto"`
//! produces a timestamped `log_YYYY-MM-DD_HH-MM-SS.txt`.

use crate::errors::{CalcError, Result};
use chrono::Local;
use simplelog::*;
use std::fs::File;

/// Level filter from its name (`off`, `error`, `warn`, `info`, `debug`, `trace`).
pub fn level_from_name(name: &str) -> Result<LevelFilter> {
    match name.to_ascii_lowercase().as_str() {
        "off" | "none" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(CalcError::Config(format!(
            "log level must be off, error, warn, info, debug or trace, not '{}'",
            other
        ))),
    }
}

pub fn timestamped_log_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Installs the global logger. Fails if a logger is already installed or the file cannot be
/// created.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(name) = log_file {
        let name = if name == "auto" {
            timestamped_log_name()
        } else {
            name.to_string()
        };
        let file = File::create(&name)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}
