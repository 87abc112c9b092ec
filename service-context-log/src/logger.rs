//! Prefix-scoped, field-carrying loggers.

use crate::field::{FieldValue, Fields};
use crate::severity::Severity;
use crate::sink::{LogRecord, LogSinkPtr};
use derivative::Derivative;
use itertools::Itertools;
use std::fmt::{Arguments, Display};
use std::panic::Location;
use std::sync::Arc;

/// Name of the field holding call site information.
pub const SOURCE_FIELD: &str = "source";

/// A logger bound to a sink, a fixed severity threshold and a prefix.
///
/// Loggers are immutable values: deriving a child, attaching fields or a source location always
/// returns a new logger, so a single logger can be freely shared between threads and call sites.
///
/// Records below the threshold are dropped before any message rendering happens. Use the crate
/// macros ([info!](crate::info) and friends) to also skip evaluating format arguments.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Logger {
    #[derivative(Debug = "ignore")]
    sink: LogSinkPtr,
    threshold: Severity,
    prefix: Arc<str>,
    fields: Fields,
}

impl Logger {
    pub(crate) fn new(sink: LogSinkPtr, threshold: Severity, prefix: Arc<str>) -> Self {
        Self {
            sink,
            threshold,
            prefix,
            fields: Default::default(),
        }
    }

    /// Current threshold. Fixed for the whole logger family.
    #[inline]
    pub fn level(&self) -> Severity {
        self.threshold
    }

    /// Dot-separated scope of this logger.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[inline]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Checks if records with given severity would reach the sink.
    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.threshold
    }

    /// Creates a child logger with `prefix` appended to the current one. Fields are inherited.
    pub fn logger(&self, prefix: &str) -> Logger {
        Self {
            sink: self.sink.clone(),
            threshold: self.threshold,
            prefix: join_prefix(&self.prefix, prefix).into(),
            fields: self.fields.clone(),
        }
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Logger {
        Self {
            fields: self.fields.with(key, value),
            ..self.clone()
        }
    }

    pub fn with_fields<K, V>(&self, fields: impl IntoIterator<Item = (K, V)>) -> Logger
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            fields: fields
                .into_iter()
                .fold(self.fields.clone(), |fields, (key, value)| {
                    fields.with(key, value)
                }),
            ..self.clone()
        }
    }

    /// Attaches the `file:line` of the caller as the [SOURCE_FIELD] field. The location is
    /// captured here, not when emitting.
    #[track_caller]
    pub fn with_source_location(&self) -> Logger {
        let location = Location::caller();
        let file = location
            .file()
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_else(|| location.file());

        self.with_field(SOURCE_FIELD, format!("{}:{}", file, location.line()))
    }

    /// Emits preformatted arguments. See [Logger::log] for terminal severities.
    #[track_caller]
    pub fn emit(&self, severity: Severity, message: Arguments<'_>) {
        self.log(severity, message)
    }

    /// Emits a record if `severity` passes the threshold. Terminal severities behave like
    /// [Logger::fatal] and [Logger::panic], regardless of the threshold.
    #[track_caller]
    pub fn log(&self, severity: Severity, message: impl Display) {
        match severity {
            Severity::Fatal => self.fatal(message),
            Severity::Panic => self.panic(message),
            Severity::Debug => self.debug(message),
            _ => {
                if self.enabled(severity) {
                    self.write(severity, message.to_string());
                }
            }
        }
    }

    /// Builds the message only if it would be emitted, or if `severity` is terminal.
    #[track_caller]
    pub fn log_with<M: Display>(&self, severity: Severity, message: impl FnOnce() -> M) {
        if self.enabled(severity) || severity.is_terminal() {
            self.log(severity, message());
        }
    }

    pub fn trace(&self, message: impl Display) {
        self.log(Severity::Trace, message)
    }

    /// Debug records always carry the call site.
    #[track_caller]
    pub fn debug(&self, message: impl Display) {
        if self.enabled(Severity::Debug) {
            self.with_source_location()
                .write(Severity::Debug, message.to_string());
        }
    }

    pub fn info(&self, message: impl Display) {
        self.log(Severity::Info, message)
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Severity::Warn, message)
    }

    pub fn error(&self, message: impl Display) {
        self.log(Severity::Error, message)
    }

    /// Logs and exits the process with status 1.
    pub fn fatal(&self, message: impl Display) -> ! {
        if self.enabled(Severity::Fatal) {
            self.write(Severity::Fatal, message.to_string());
        }

        std::process::exit(1)
    }

    /// Logs and panics with the rendered message as the payload.
    pub fn panic(&self, message: impl Display) -> ! {
        let message = message.to_string();
        if self.enabled(Severity::Panic) {
            self.write(Severity::Panic, message.clone());
        }

        std::panic::panic_any(message)
    }

    fn write(&self, severity: Severity, message: String) {
        self.sink.write(&LogRecord {
            severity,
            prefix: self.prefix.clone(),
            message,
            fields: self.fields.clone(),
        });
    }
}

/// Joins prefixes with dots, dropping empty segments.
pub(crate) fn join_prefix(parent: &str, child: &str) -> String {
    parent
        .split('.')
        .chain(child.split('.'))
        .filter(|segment| !segment.is_empty())
        .join(".")
}
