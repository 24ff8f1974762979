//! ## autobrake-telemetry::logging
//! **Structured logging with tracing**
//!
//! One global `fmt` subscriber, filtered by `RUST_LOG` when set and by the
//! configured level otherwise. Notable controller events go through
//! [`EventLogger::log_event`] so they share a span and carry OpenTelemetry
//! style key/value metadata.

use opentelemetry::KeyValue;
use tracing::info_span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

use crate::TelemetryError;

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. A no-op when one is already installed.
    pub fn init(level: &str, json: bool) -> Result<(), TelemetryError> {
        if tracing::dispatcher::has_been_set() {
            tracing::debug!("Global subscriber already installed, keeping it");
            return Ok(());
        }

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let result = if json {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_thread_names(true)
                .with_span_events(FmtSpan::ENTER)
                .try_init()
        } else {
            fmt()
                .with_env_filter(filter)
                .with_thread_names(true)
                .with_span_events(FmtSpan::ENTER)
                .try_init()
        };

        match result {
            Ok(()) => Ok(()),
            // Another thread won the race to install one.
            Err(_) if tracing::dispatcher::has_been_set() => Ok(()),
            Err(e) => Err(TelemetryError::LoggerInit(e.to_string())),
        }
    }

    #[inline]
    pub fn log_event(event_type: &str, metadata: &[KeyValue]) {
        let span = info_span!(
            "controller_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );
        let _entered = span.enter();

        tracing::info!(metadata = ?metadata, "Controller event occurred");
    }
}
