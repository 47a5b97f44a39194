//! Core logger types and traits

pub mod call_site;
pub mod code_frame;
#[cfg(feature = "console-bridge")]
pub mod console;
pub mod error;
pub mod error_record;
pub mod inspect;
pub mod log_level;
pub mod log_record;
pub mod log_value;
pub mod logger;
pub mod masking;
pub mod metrics;
pub mod output;
pub mod record_builder;
pub mod settings;
pub mod timestamp;
pub mod transport;

pub use call_site::{
    is_dependency_path, BacktraceCapture, CallSiteFrame, CallSiteResolver, RawCallSite,
    StackCapture,
};
pub use code_frame::{CodeFrame, FsSourceReader, SourceReader, DEFAULT_CONTEXT_LINES};
pub use error::{LoggerError, Result};
pub use error_record::{
    as_error_value, is_error_instance, is_error_shaped, is_native_error, ErrorRecord,
    ErrorRecordOptions, ErrorValue,
};
pub use inspect::{format_value, inspect, InspectOptions};
pub use log_level::LogLevel;
pub use log_record::{CallerLocation, IntoLogArgs, LogArgument, LogRecord};
pub use log_value::{LogValue, ObjectRef, WeakObjectRef};
pub use logger::{Logger, LoggerBuilder, PrettyErrorOptions};
pub use masking::Masker;
pub use metrics::LoggerMetrics;
pub use output::{MemoryStream, OutputStream, StderrStream, StdoutStream};
pub use record_builder::RecordBuilder;
pub use settings::{
    DisplayFilePath, LevelColors, LoggerSettings, LoggerType, RequestId, SettingsOverrides,
};
pub use timestamp::{format_timestamp, DateTimeZone};
pub use transport::{AttachedTransport, Transport};
