//! Logging utilities for the Optibook application.
//!
//! All crates log through `tracing`; this module installs the subscriber once at
//! startup. Console output is always on, a daily rolling file is added when the
//! logging config names a directory.

use optibook_config::LoggingConfig;
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "optibook.log";

/// Initialize the tracing subscriber at INFO.
///
/// # Examples
///
/// ```
/// use optibook_common::logging;
///
/// logging::init();
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_with_level(level: Level) {
    // Console only, no guard to hold on to
    let _ = install(&level.to_string().to_lowercase(), None);
}

/// Initialize logging from the `[logging]` config section.
///
/// The returned guard flushes the file writer on drop and must be kept alive for
/// the lifetime of the process.
pub fn init_from_config(config: Option<&LoggingConfig>) -> Option<WorkerGuard> {
    match config {
        Some(logging) => install(&logging.level, logging.directory.as_deref()),
        None => install("info", None),
    }
}

fn install(level: &str, directory: Option<&str>) -> Option<WorkerGuard> {
    let filter = match format!("optibook={}", level).parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env().add_directive(Level::INFO.into()),
    };

    let (file_layer, guard) = match directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // try_init: a global subscriber may already be set (tests, repeated init)
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(file_layer)
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!(
            "Logging initialized at level: {} (file output: {})",
            level,
            directory.unwrap_or("off")
        );
    }
    guard
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so the call can sit in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
