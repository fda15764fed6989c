use crate::config::LoggingConfig;
use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system: a console layer on stderr and, when a log
/// directory is configured, a daily-rotated JSON file.
///
/// Stdout is left to command output so `--json` results can be piped.
pub fn init_logging(config: &LoggingConfig) {
    // Respect RUST_LOG if set; otherwise fall back to the configured filter
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let file_layer = config.log_dir.as_ref().and_then(|dir| {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("[logging] could not create log directory {}: {}", dir.display(), e);
            return None;
        }
        // Non-blocking file appender with daily rotation
        let file_appender = tracing_appender::rolling::daily(dir, "runit.log");
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
        // The guard flushes on drop; keep it for the life of the process
        std::mem::forget(guard);
        Some(fmt::layer().json().with_writer(non_blocking_writer))
    });

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
    {
        eprintln!("[logging] subscriber already installed, keeping it: {}", e);
    }
}
