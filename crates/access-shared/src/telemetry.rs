//! Telemetry setup

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogSettings;
use crate::error::AppError;

/// Installs the global JSON subscriber. `RUST_LOG` wins over the configured level.
/// Without a log directory, lines go to stderr so stdout stays free for output.
///
/// When a log directory is configured the returned guard must be held for the
/// lifetime of the process so buffered lines are flushed.
pub fn init_telemetry(settings: &LogSettings) -> Result<Option<WorkerGuard>, AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "access-control.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().json().with_writer(writer))
                .try_init()
                .map_err(|e| AppError::TelemetryError(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| AppError::TelemetryError(e.to_string()))?;
            Ok(None)
        }
    }
}
