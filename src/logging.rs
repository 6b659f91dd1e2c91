//! Logging setup and the log sink used for normalized errors.

use serde_json::Value;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Reads the `RUST_LOG` environment variable (defaults to "info" level).
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

/// The sink could not record an event.
#[derive(Debug, thiserror::Error)]
#[error("log sink failed: {0}")]
pub struct SinkError(pub String);

/// Destination for normalized error payloads.
///
/// Called once per failure, before the error response is sent. A returned
/// error is reported and otherwise ignored.
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, payload: &Value) -> Result<(), SinkError>;
}

/// Default sink: one `tracing` event per payload at the requested level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, payload: &Value) -> Result<(), SinkError> {
        // tracing macros need a constant level
        match level {
            Level::ERROR => tracing::error!(%payload, "request failed"),
            Level::WARN => tracing::warn!(%payload, "request failed"),
            Level::INFO => tracing::info!(%payload, "request failed"),
            Level::DEBUG => tracing::debug!(%payload, "request failed"),
            Level::TRACE => tracing::trace!(%payload, "request failed"),
        }
        Ok(())
    }
}
