// Emission macros. The threshold is checked before the format arguments are evaluated.

/// Logs with a runtime severity: `log!(logger, Severity::Info, "{} items", count)`. Terminal
/// severities behave like [fatal!](crate::fatal) and [panic!](crate::panic).
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        let severity: $crate::Severity = $severity;
        if logger.enabled(severity) || severity.is_terminal() {
            logger.emit(severity, ::std::format_args!($($arg)+));
        }
    }};
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Trace, $($arg)+)
    };
}

/// Like [log!], but also attaches the call site as the `source` field.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        if logger.enabled($crate::Severity::Debug) {
            logger
                .with_source_location()
                .emit($crate::Severity::Debug, ::std::format_args!($($arg)+));
        }
    }};
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Error, $($arg)+)
    };
}

/// Logs and terminates the process. Never returns.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        logger.fatal(::std::format_args!($($arg)+))
    }};
}

/// Logs and panics with the rendered message as the payload. Never returns.
#[macro_export]
macro_rules! panic {
    ($logger:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        logger.panic(::std::format_args!($($arg)+))
    }};
}
