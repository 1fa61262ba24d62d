use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;

const LOG_FILE_PREFIX: &str = "cattle-management.log";

/// Installs the global subscriber. `RUST_LOG` wins over `CATTLE_LOG_LEVEL`.
///
/// With a log directory configured, output goes to a daily rolling file and
/// the returned guard must be kept alive until shutdown.
pub fn init_tracing(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer)
                .try_init()
                .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;
            Ok(Some(guard))
        }
        None => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .try_init()
                .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;
            Ok(None)
        }
    }
}
