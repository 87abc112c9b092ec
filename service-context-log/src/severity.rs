//! Severity levels understood by the logging facility, from the most verbose [Severity::Trace] to
//! the process-aborting [Severity::Panic].

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// Severity of a log record. Severities are strictly ordered, so a logger with a given threshold
/// emits only records with severity greater or equal to it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    /// Logs and then terminates the process.
    Fatal,
    /// Logs and then panics with the rendered message.
    Panic,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Severity; 7] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
        Severity::Panic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Panic => "panic",
        }
    }

    /// Checks if emitting with this severity ends the current flow of execution: [Severity::Fatal]
    /// exits the process and [Severity::Panic] panics.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        *self >= Severity::Fatal
    }

    /// Closest `tracing` level. `tracing` has no levels above error, so both [Severity::Fatal] and
    /// [Severity::Panic] map to [Level::ERROR].
    pub fn tracing_level(&self) -> Level {
        match self {
            Severity::Trace => Level::TRACE,
            Severity::Debug => Level::DEBUG,
            Severity::Info => Level::INFO,
            Severity::Warn => Level::WARN,
            Severity::Error | Severity::Fatal | Severity::Panic => Level::ERROR,
        }
    }

    /// Filter letting through everything this severity lets through.
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_level(self.tracing_level())
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name any [Severity].
#[derive(Error, Clone, Debug, Eq, PartialEq)]
#[error("Invalid log level: {0}")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| ParseSeverityError(value.to_string()))
    }
}

/// Parses a severity, panicking on unknown values. Meant for configuration read once at startup,
/// where running with an ambiguous level is worse than not running at all.
pub fn must_parse_severity(value: &str) -> Severity {
    match value.parse() {
        Ok(severity) => severity,
        Err(error) => panic!("{error}"),
    }
}

#[cfg(test)]
mod tests {
    use crate::severity::{must_parse_severity, ParseSeverityError, Severity};
    use tracing::Level;

    #[test]
    fn should_order_severities() {
        assert!(Severity::ALL.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(Severity::Trace < Severity::Panic);
        assert!(Severity::Fatal > Severity::Error);
    }

    #[test]
    fn should_mark_fatal_and_panic_as_terminal() {
        assert_eq!(
            Severity::ALL
                .into_iter()
                .filter(Severity::is_terminal)
                .collect::<Vec<_>>(),
            vec![Severity::Fatal, Severity::Panic]
        );
    }

    #[test]
    fn should_parse_case_insensitive() {
        assert_eq!("WARN".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("panic".parse::<Severity>().unwrap(), Severity::Panic);
        assert_eq!(
            "verbose".parse::<Severity>().unwrap_err(),
            ParseSeverityError("verbose".to_string())
        );
    }

    #[test]
    fn should_round_trip_names() {
        for severity in Severity::ALL {
            assert_eq!(must_parse_severity(&severity.to_string()), severity);
        }
    }

    #[test]
    #[should_panic(expected = "Invalid log level: verbose")]
    fn should_panic_on_unknown_level() {
        must_parse_severity("verbose");
    }

    #[test]
    fn should_map_to_tracing_levels() {
        assert_eq!(Severity::Debug.tracing_level(), Level::DEBUG);
        assert_eq!(Severity::Fatal.tracing_level(), Level::ERROR);
        assert_eq!(Severity::Panic.tracing_level(), Level::ERROR);
    }
}
