use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::core::config::{AppPaths, LogRotation, LoggingConfig};

const FALLBACK_LEVEL: &str = "info";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber: stdout plus a rolling file in
/// `logging.directory`. Stdout-only when the directory cannot be created.
pub fn init(paths: &AppPaths, config: &LoggingConfig) {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env_directives.as_deref(), &config.level);

    let log_dir = paths.resolve(&config.directory);
    let (file_layer, dir_error) = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = rolling_appender(&log_dir, config);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = LOG_GUARD.set(guard);
            let layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), None)
        }
        Err(err) => (None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    match dir_error {
        Some(err) => tracing::warn!(
            "File logging disabled, cannot create {}: {}",
            log_dir.display(),
            err
        ),
        None => tracing::debug!("Writing logs to {}", log_dir.join(&config.file_name).display()),
    }
}

/// `RUST_LOG` when it is set and parses, else the configured level, else `info`.
pub fn build_filter(env_directives: Option<&str>, configured: &str) -> EnvFilter {
    env_directives
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(configured).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_LEVEL))
}

pub fn rolling_appender(dir: &Path, config: &LoggingConfig) -> RollingFileAppender {
    let rotation = match config.rotation {
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Never => Rotation::NEVER,
    };
    RollingFileAppender::new(rotation, dir, &config.file_name)
}
