use std::path::Path;

use anyhow::{Context, Result};
use time::macros::format_description;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, fmt, fmt::time::LocalTime, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Installs the global subscriber: a console layer on stderr and a daily
/// rotated file in `logs_dir`. `RUST_LOG` overrides the default `info` filter.
///
/// The returned guard flushes the file writer on drop and must be kept alive.
pub fn setup_logging(logs_dir: &Path) -> Result<WorkerGuard> {
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(logs_dir)?);

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_filter(env_filter());
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_timer(timer)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to set global subscriber")?;
    Ok(guard)
}

fn file_appender(logs_dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(logs_dir).context("Failed to create logs directory")?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("movie_hub")
        .filename_suffix("log")
        .build(logs_dir)
        .context("Failed to initialize file appender")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
