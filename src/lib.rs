//! # hierlog
//!
//! A hierarchical, structured logger.
//!
//! Every logging call becomes a [`LogRecord`]: the caller's location, the
//! logged arguments and, for errors, a normalized [`ErrorRecord`] with stack
//! and source code frame. Records are printed in a pretty or JSON layout and
//! handed to any attached [`Transport`].
//!
//! ## Features
//!
//! - **Logger trees**: child loggers inherit their parent's settings and follow
//!   later changes to them
//! - **Call-site capture**: file, line and `Type.method` of the caller
//! - **Error reports**: stacks, details and code frames for logged errors
//! - **Masking**: sensitive keys and regex matches are replaced before output
//! - **Transports**: forward full records to other sinks, each with its own level
//! - **`log` bridge**: optionally route the `log` facade through a logger
//!
//! ## Example
//!
//! ```
//! use hierlog::prelude::*;
//! use std::sync::Arc;
//!
//! let out = Arc::new(MemoryStream::new());
//! let root = Logger::with_settings(
//!     SettingsOverrides::new()
//!         .name("app")
//!         .colorize_pretty_logs(false)
//!         .std_streams(out.clone()),
//! )
//! .unwrap();
//! let db = root.child(SettingsOverrides::new().name("db").prefix(["[db]"])).unwrap();
//!
//! db.info(("connected", LogValue::object([("host", "db-1"), ("password", "hunter2")])));
//!
//! let printed = out.contents();
//! assert!(printed.contains("[db] connected"));
//! assert!(printed.contains("password: '[***]'"));
//! assert!(!printed.contains("hunter2"));
//! ```

pub mod core;
pub mod macros;
pub mod render;
pub mod transports;

pub mod prelude {
    pub use crate::core::{
        DisplayFilePath, ErrorRecord, ErrorValue, IntoLogArgs, LogLevel, LogRecord, LogValue,
        Logger, LoggerBuilder, LoggerError, LoggerMetrics, LoggerSettings, LoggerType,
        MemoryStream, ObjectRef, OutputStream, PrettyErrorOptions, RequestId, Result,
        SettingsOverrides, Transport,
    };
    pub use crate::transports::{ChannelTransport, MemoryTransport};
}

#[cfg(feature = "console-bridge")]
pub use core::console;
pub use core::{
    as_error_value, format_timestamp, inspect, is_dependency_path, AttachedTransport,
    BacktraceCapture, CallSiteFrame, CallSiteResolver, CallerLocation, CodeFrame, DateTimeZone,
    DisplayFilePath, ErrorRecord, ErrorRecordOptions, ErrorValue, FsSourceReader, InspectOptions,
    IntoLogArgs, LevelColors, LogArgument, LogLevel, LogRecord, LogValue, Logger, LoggerBuilder,
    LoggerError, LoggerMetrics, LoggerSettings, LoggerType, Masker, MemoryStream, ObjectRef,
    OutputStream, PrettyErrorOptions, RawCallSite, RequestId, Result, SettingsOverrides,
    SourceReader, StackCapture, StderrStream, StdoutStream, Transport,
};
pub use render::{JsonRenderer, PrettyRenderer};
pub use transports::{ChannelTransport, MemoryTransport};
