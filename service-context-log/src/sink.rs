//! Sinks receive rendered [LogRecord]s from loggers. The default [TracingSink] forwards them to
//! `tracing`, so any subscriber can be used to actually write them out.

use crate::field::Fields;
use crate::severity::Severity;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use tracing::{event, Level};
use tracing_subscriber::EnvFilter;

/// Target used for all events emitted by the [TracingSink].
pub const TRACING_TARGET: &str = "service_context";

/// A single rendered log entry.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    pub severity: Severity,
    pub prefix: Arc<str>,
    pub message: String,
    pub fields: Fields,
}

/// Destination for log records. Sinks are shared by all loggers derived from one facility and
/// can be written to from many threads.
#[cfg_attr(test, automock)]
pub trait LogSink: Send + Sync {
    fn write(&self, record: &LogRecord);
}

pub type LogSinkPtr = Arc<dyn LogSink>;

/// Sink forwarding records as `tracing` events. Filtering is done by the logger, so every record
/// reaching the sink is forwarded.
#[derive(Default, Clone, Copy, Debug)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, record: &LogRecord) {
        let prefix = &*record.prefix;
        let severity = record.severity.as_str();
        let fields = &record.fields;
        let message = &record.message;

        match record.severity {
            Severity::Trace => {
                event!(target: TRACING_TARGET, Level::TRACE, prefix, %fields, "{message}")
            }
            Severity::Debug => {
                event!(target: TRACING_TARGET, Level::DEBUG, prefix, %fields, "{message}")
            }
            Severity::Info => {
                event!(target: TRACING_TARGET, Level::INFO, prefix, %fields, "{message}")
            }
            Severity::Warn => {
                event!(target: TRACING_TARGET, Level::WARN, prefix, %fields, "{message}")
            }
            Severity::Error | Severity::Fatal | Severity::Panic => event!(
                target: TRACING_TARGET,
                Level::ERROR,
                prefix,
                severity,
                %fields,
                "{message}"
            ),
        }
    }
}

/// Installs a global `fmt` subscriber letting through everything at or above `threshold`, unless
/// overridden by `RUST_LOG`. Returns false if a global subscriber was already installed.
pub fn install_tracing_subscriber(threshold: Severity) -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(threshold.level_filter().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
