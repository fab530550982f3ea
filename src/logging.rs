//! File-based logging setup.
//!
//! Logs go to a file rather than stdout so command output stays clean for
//! piping; the level is controlled via the `RUST_LOG` environment variable.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_FILE_PREFIX: &str = "tubefeed";

/// Initialize the logging system.
///
/// Logs are written to `<data dir>/logs/tubefeed.YYYY-MM-DD.log` with daily
/// rotation. Defaults to DEBUG for this crate and WARN for everything else.
pub fn init_logging(data_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let log_dir = data_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logs");
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    // Non-blocking writer so logging never stalls the async runtime; the
    // guard must outlive the process, hence the leak.
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    Box::leak(Box::new(guard));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tubefeed=debug,warn"));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::debug!(dir = %log_dir.display(), "logging initialized");
    Ok(())
}
