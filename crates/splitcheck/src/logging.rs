use std::path::Path;

use color_eyre::eyre::eyre;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging.
///
/// Logs go to stderr, or to `log_file` through a non-blocking writer when one
/// is given; stdout stays reserved for the report. The level can be
/// overridden with the `RUST_LOG` environment variable. The returned guard
/// must be held until exit so buffered file output is flushed.
pub fn init_logging(
    level: &str,
    log_file: Option<&Path>,
) -> color_eyre::Result<Option<WorkerGuard>> {
    let default_filter = format!("splitcheck={level},splitcheck_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));
    let registry = tracing_subscriber::registry().with(env_filter);

    let Some(path) = log_file else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()?;
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("log file path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    registry
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()?;

    tracing::info!(log_path = %path.display(), "splitcheck logging initialized");
    Ok(Some(guard))
}
