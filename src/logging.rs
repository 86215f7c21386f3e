//! Logging configuration for retag
//!
//! Diagnostics go to the terminal (without timestamps, so a dry run and a
//! real run print identical text) and, unless disabled, to a file at:
//! `<local data dir>/retag/logs/retag.log`

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

const LOG_FILE_NAME: &str = "retag.log";
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Get the log directory path
pub fn get_log_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("retag").join("logs"))
}

/// Get the current log file path
pub fn get_log_file_path() -> Option<PathBuf> {
    get_log_directory().map(|d| d.join(LOG_FILE_NAME))
}

fn terminal_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn terminal_config() -> Config {
    ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build()
}

fn terminal_logger(verbose: bool) -> Box<dyn SharedLogger> {
    TermLogger::new(
        terminal_level(verbose),
        terminal_config(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
}

/// Initialize the logging system
///
/// Returns the path to the log file when file logging is active
pub fn init_logging(verbose: bool, log_file: bool) -> Option<PathBuf> {
    if !log_file {
        init_terminal_only(verbose);
        return None;
    }

    let log_dir = match get_log_directory() {
        Some(d) => d,
        None => {
            eprintln!("Warning: Could not determine log directory");
            init_terminal_only(verbose);
            return None;
        }
    };

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        init_terminal_only(verbose);
        return None;
    }

    let log_path = log_dir.join(LOG_FILE_NAME);

    // Rotate old log if it's too large
    if let Ok(metadata) = fs::metadata(&log_path) {
        if metadata.len() > MAX_LOG_SIZE {
            let backup_path = log_dir.join(format!("{}.old", LOG_FILE_NAME));
            let _ = fs::rename(&log_path, &backup_path);
        }
    }

    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            init_terminal_only(verbose);
            return None;
        }
    };

    let file_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();

    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        terminal_logger(verbose),
        // File logger always captures debug output
        WriteLogger::new(LevelFilter::Debug, file_config, file),
    ];

    if CombinedLogger::init(loggers).is_err() {
        eprintln!("Warning: Logger already initialized");
    }

    log::debug!("=== retag session started ===");
    log::debug!("Log file: {}", log_path.display());

    Some(log_path)
}

/// Terminal-only logging (`--no-log-file`, or fallback if file logging fails)
fn init_terminal_only(verbose: bool) {
    let _ = CombinedLogger::init(vec![terminal_logger(verbose)]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_directory_returns_path() {
        let dir = get_log_directory();
        assert!(dir.is_some(), "Should return a log directory path");
        assert!(dir.unwrap().ends_with("retag/logs"));
    }

    #[test]
    fn test_log_file_path_is_inside_log_directory() {
        let dir = get_log_directory().unwrap();
        let file = get_log_file_path().unwrap();

        assert!(file.starts_with(&dir), "Log file should be inside log directory");
        assert!(file.ends_with(LOG_FILE_NAME));
    }

    #[test]
    fn test_verbose_raises_terminal_level() {
        assert_eq!(terminal_level(false), LevelFilter::Info);
        assert_eq!(terminal_level(true), LevelFilter::Debug);
    }
}
