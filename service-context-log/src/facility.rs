//! Root of every logger family. A [LogFacility] owns the sink and the severity threshold, and hands
//! out prefixed [Logger]s.

use crate::logger::{join_prefix, Logger};
use crate::severity::Severity;
use crate::sink::{LogSinkPtr, TracingSink};
use derivative::Derivative;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Base prefix of the process-wide facility.
pub const DEFAULT_BASE_PREFIX: &str = "core";

/// Threshold of the process-wide facility.
pub const DEFAULT_LEVEL: Severity = Severity::Debug;

static GLOBAL: Lazy<LogFacility> =
    Lazy::new(|| LogFacility::new(&LogConfig::new(DEFAULT_LEVEL, DEFAULT_BASE_PREFIX)));

/// Facility configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogConfig {
    /// Minimum severity which gets emitted.
    pub level: Severity,
    /// Prefix prepended to every logger prefix.
    pub base_prefix: String,
}

impl LogConfig {
    pub fn new(level: Severity, base_prefix: impl Into<String>) -> Self {
        Self {
            level,
            base_prefix: base_prefix.into(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Severity::Info,
            base_prefix: String::new(),
        }
    }
}

/// Source of [Logger]s sharing a sink and a threshold. Cloning is cheap and clones share the sink.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct LogFacility {
    #[derivative(Debug = "ignore")]
    sink: LogSinkPtr,
    threshold: Severity,
    base_prefix: Arc<str>,
}

impl LogFacility {
    /// Creates a facility writing to `tracing`.
    pub fn new(config: &LogConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(config: &LogConfig, sink: LogSinkPtr) -> Self {
        Self {
            sink,
            threshold: config.level,
            base_prefix: join_prefix(&config.base_prefix, "").into(),
        }
    }

    /// Returns a logger scoped to `base_prefix.prefix`.
    pub fn logger(&self, prefix: &str) -> Logger {
        Logger::new(
            self.sink.clone(),
            self.threshold,
            join_prefix(&self.base_prefix, prefix).into(),
        )
    }

    #[inline]
    pub fn level(&self) -> Severity {
        self.threshold
    }

    #[inline]
    pub fn base_prefix(&self) -> &str {
        &self.base_prefix
    }
}

/// Process-wide facility, created on first use with [DEFAULT_LEVEL] and [DEFAULT_BASE_PREFIX].
pub fn global() -> &'static LogFacility {
    &GLOBAL
}
