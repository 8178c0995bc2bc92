//! Logging initialization for the multistep CLI.
//!
//! Logs go to stderr, or to `<logs dir>/multistep-{datetime}.log` when
//! `logging.to_file` is enabled.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Keeps the file writer alive; dropping it flushes pending lines
pub struct LoggingHandle {
    pub _guard: Option<WorkerGuard>,
    /// Set only when logging to a file
    pub log_file_path: Option<PathBuf>,
}

/// Log level to use, with `--debug` taking precedence over the config
pub fn effective_level(config: &Config, debug_override: bool) -> String {
    if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

/// Name of the log file for a session started now
pub fn log_file_name() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    format!("multistep-{}.log", timestamp)
}

/// Install the global subscriber: stderr by default, a timestamped file under
/// [`Config::logs_path`] when `logging.to_file` is set. `RUST_LOG` wins over
/// both the config and `--debug`.
///
/// Keep the returned handle alive until exit so buffered file output is flushed.
pub fn init_logging(config: &Config, debug_override: bool) -> Result<LoggingHandle> {
    let level = effective_level(config, debug_override);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (writer, handle) = if config.logging.to_file {
        let logs_dir = config.logs_path();
        std::fs::create_dir_all(&logs_dir).context("Failed to create logs directory")?;

        let file_name = log_file_name();
        let appender = tracing_appender::rolling::never(&logs_dir, &file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        (
            BoxMakeWriter::new(non_blocking),
            LoggingHandle {
                _guard: Some(guard),
                log_file_path: Some(logs_dir.join(file_name)),
            },
        )
    } else {
        (
            BoxMakeWriter::new(std::io::stderr),
            LoggingHandle {
                _guard: None,
                log_file_path: None,
            },
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(!config.logging.to_file)
                .with_writer(writer),
        )
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.logging.directory = Some(temp_dir.path().to_string_lossy().to_string());
        config
    }

    #[test]
    fn test_logs_path_uses_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        assert_eq!(config.logs_path(), temp_dir.path());
    }

    #[test]
    fn test_log_file_name_format() {
        let name = log_file_name();
        assert!(name.starts_with("multistep-"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn test_debug_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        assert_eq!(effective_level(&config, false), "info");
        assert_eq!(effective_level(&config, true), "debug");
    }

    #[test]
    fn test_file_logging_disabled_by_default() {
        // init_logging installs a global subscriber, so only the condition is checked
        let config = Config::default();
        assert!(!config.logging.to_file);
    }
}
