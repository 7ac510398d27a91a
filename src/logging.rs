//! Log file setup.
//!
//! Everything at `info` and above (or whatever `RUST_LOG` selects) goes to
//! `<data-dir>/rss-bot.log`. Warnings and errors are also printed to stderr
//! so a cron mail shows why a run failed.

use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub const LOG_FILE: &str = "rss-bot.log";

/// Install the global subscriber. Keep the returned guard alive until the
/// end of `main`, or buffered lines are lost.
pub fn init(data_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(data_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    guard
}
