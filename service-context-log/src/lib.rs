//! Leveled, prefix-scoped structured logging.
//!
//! A [LogFacility] owns a [sink](sink::LogSink) and a fixed severity threshold. Every [Logger]
//! obtained from it inherits both, and carries a dot-separated prefix identifying its scope.
//! Loggers never change: attaching [fields](Logger::with_field) or deriving
//! [children](Logger::logger) creates new loggers, which makes sharing them between threads
//! trivial.
//!
//! ```
//! use service_context_log::{info, LogConfig, LogFacility, Severity};
//!
//! let facility = LogFacility::new(&LogConfig::new(Severity::Info, "app"));
//! let logger = facility.logger("db").with_field("sql_type", "select");
//!
//! // arguments are not evaluated, since debug is below the threshold
//! service_context_log::debug!(logger, "{:?}", std::thread::current());
//! info!(logger, "Connected to {}", "localhost");
//! ```
//!
//! A process-wide facility is available through [global()], writing to `tracing` with the
//! [DEFAULT_LEVEL] threshold.

pub mod facility;
pub mod field;
pub mod logger;
mod macros;
pub mod severity;
pub mod sink;

pub use facility::{global, LogConfig, LogFacility, DEFAULT_BASE_PREFIX, DEFAULT_LEVEL};
pub use field::{FieldValue, Fields};
pub use logger::Logger;
pub use severity::{must_parse_severity, ParseSeverityError, Severity};
pub use sink::{install_tracing_subscriber, LogRecord, LogSink, LogSinkPtr, TracingSink};
