use crate::config::LoggingConfig;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default log directory, `~/.lodestar/logs`.
pub fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lodestar/logs")
}

/// Install the global subscriber; keep the guard alive for as long as logs should flush.
///
/// A subscriber installed earlier (by the host or another test) wins; the
/// returned guard is still valid in that case.
pub fn init_logging(component: &str, config: &LoggingConfig) -> WorkerGuard {
    let log_dir = config.dir.clone().unwrap_or_else(default_log_dir);
    let _ = std::fs::create_dir_all(&log_dir);

    // Roll daily, with the component name as the prefix
    // This will create files like loader.log.2024-01-21
    let file_appender = tracing_appender::rolling::daily(&log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // File layer: no ANSI colors, output to file
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if config.to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        let _ = registry.with(stderr_layer).try_init();
    } else {
        let _ = registry.try_init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        let temp = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            dir: Some(temp.path().to_path_buf()),
            ..LoggingConfig::default()
        };

        let _first = init_logging("loader", &config);
        let _second = init_logging("loader", &config);
        tracing::info!("logging initialized");
        assert!(temp.path().exists());
    }
}
