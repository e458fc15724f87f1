use std::path::Path;
#[cfg(test)]
use std::sync::LazyLock;

use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::format::FmtSpan;

pub const TUI_PREFIX: &str = "tui";
pub const CLI_PREFIX: &str = "cli";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log appender: {0}")]
    AppenderError(#[from] tracing_appender::rolling::InitError),
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
    #[error("Failed to install log subscriber: {0}")]
    SubscriberError(String),
}

/// Write logs to a daily rolling file under `<data_dir>/logs`. Never to stdout,
/// the terminal belongs to the TUI or to command output.
pub fn enable_logging(prefix: &str, data_dir: &Path, log_level: &str) -> Result<(), LoggingError> {
    let level: LevelFilter = log_level
        .parse()
        .map_err(|_| LoggingError::InvalidLevel(log_level.to_string()))?;

    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(data_dir.join("logs"))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        )))
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .with_writer(appender)
        .try_init()
        .map_err(|e| LoggingError::SubscriberError(e.to_string()))
}

#[cfg(test)]
pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_levels() {
        let dir = tempfile::tempdir().unwrap();
        let err = enable_logging(TUI_PREFIX, dir.path(), "loud").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidLevel(level) if level == "loud"));
        assert!(!dir.path().join("logs").exists());
    }
}
