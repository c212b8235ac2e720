//! Logging setup.
//!
//! Console output through `tracing-subscriber`, plus an optional daily
//! rolling file through `tracing-appender`. `RUST_LOG` overrides the
//! configured level.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// File name prefix of the rolling application log
const LOG_FILE_NAME: &str = "crsf-telemetry.log";

/// Build the filter for `level`, letting `RUST_LOG` take precedence
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the logging system
///
/// Call once at startup. When `file_dir` is configured the returned guard
/// must be kept alive for buffered file output to be flushed.
///
/// A subscriber that is already installed is left in place.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let console = fmt::layer().with_target(true);

    match config.file_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let _ = tracing_subscriber::registry()
                .with(env_filter(&config.level))
                .with(console)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init();

            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(env_filter(&config.level))
                .with(console)
                .try_init();

            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_console_only() {
        let guard = init_logging(&LoggingConfig::default());
        assert!(guard.is_none());
    }

    #[test]
    fn test_init_logging_with_file_returns_guard() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = LoggingConfig {
            level: "debug".to_string(),
            file_dir: Some(dir.path().to_string_lossy().into_owned()),
        };

        // A subscriber may already be installed by another test; the guard is still returned
        let guard = init_logging(&config);
        assert!(guard.is_some());
    }
}
