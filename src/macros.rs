//! Logging macros taking any number of arguments.
//!
//! Each argument is converted with `LogValue::from`, so strings, numbers,
//! objects and errors can be mixed freely. The record's caller is the macro
//! call site.
//!
//! # Examples
//!
//! ```
//! use hierlog::prelude::*;
//! use hierlog::{info, warn};
//!
//! let logger = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true)).unwrap();
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! let record = info!(logger, "listening on port", port);
//! assert_eq!(record.arguments_array.len(), 2);
//!
//! warn!(logger, "slow request", LogValue::object([("path", "/orders"), ("ms", "1200")]));
//! ```

/// Log at an explicit level.
///
/// # Examples
///
/// ```
/// # use hierlog::prelude::*;
/// # let logger = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true)).unwrap();
/// use hierlog::log_at;
/// log_at!(logger, LogLevel::Info, "Simple message");
/// log_at!(logger, LogLevel::Error, "Error code:", 500);
/// ```
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($arg:expr),+ $(,)?) => {{
        let args: ::std::vec::Vec<$crate::LogValue> =
            ::std::vec![$($crate::LogValue::from($arg)),+];
        $logger.log($level, args)
    }};
}

/// Log a silly-level message.
#[macro_export]
macro_rules! silly {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::LogLevel::Silly, $($arg),+)
    };
}

/// Log a trace-level message; the record carries the call stack.
///
/// # Examples
///
/// ```
/// # use hierlog::prelude::*;
/// # let logger = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true)).unwrap();
/// use hierlog::trace;
/// let record = trace!(logger, "Entering function:", "calculate()");
/// assert!(record.stack.is_some());
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::LogLevel::Trace, $($arg),+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::LogLevel::Debug, $($arg),+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::LogLevel::Info, $($arg),+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::LogLevel::Warn, $($arg),+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use hierlog::prelude::*;
/// # let logger = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true)).unwrap();
/// use hierlog::error;
/// let failure = ErrorValue::new("DbError", "connection refused").with_property("host", "db-1");
/// let record = error!(logger, "query failed", failure);
/// assert_eq!(record.errors().next().unwrap().name, "DbError");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::LogLevel::Error, $($arg),+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log_at!($logger, $crate::LogLevel::Fatal, $($arg),+)
    };
}
