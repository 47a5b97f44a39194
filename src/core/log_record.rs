//! The record produced by one logging call

use super::call_site::{CallSiteFrame, RawCallSite};
use super::error_record::{ErrorRecord, ErrorValue};
use super::log_level::LogLevel;
use super::log_value::{LogValue, ObjectRef};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::panic::Location;

/// One entry of a record's argument list
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LogArgument {
    Value(LogValue),
    Error(ErrorRecord),
}

impl LogArgument {
    pub fn as_value(&self) -> Option<&LogValue> {
        match self {
            LogArgument::Value(value) => Some(value),
            LogArgument::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorRecord> {
        match self {
            LogArgument::Error(record) => Some(record),
            LogArgument::Value(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LogArgument::Error(_))
    }
}

/// A finished log record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub instance_name: Option<String>,
    pub logger_name: Option<String>,
    pub hostname: String,
    pub request_id: Option<String>,
    pub date: DateTime<Utc>,
    pub log_level: LogLevel,
    pub log_level_id: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_constructor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    pub arguments_array: Vec<LogArgument>,
    /// Call stack at the logging call, when stack exposure is on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<CallSiteFrame>>,
}

impl LogRecord {
    /// Empty record stamped with a level and the current time
    pub fn new(log_level: LogLevel, hostname: impl Into<String>) -> Self {
        Self {
            instance_name: None,
            logger_name: None,
            hostname: hostname.into(),
            request_id: None,
            date: Utc::now(),
            log_level,
            log_level_id: log_level.rank(),
            file_path: None,
            full_file_path: None,
            file_name: None,
            line_number: None,
            column_number: None,
            is_constructor: None,
            function_name: None,
            type_name: None,
            method_name: None,
            arguments_array: Vec::new(),
            stack: None,
        }
    }

    /// Mirror the caller fields of `frame`
    pub fn set_caller(&mut self, frame: &CallSiteFrame) {
        self.file_path = Some(frame.file_path.clone());
        self.full_file_path = Some(frame.full_file_path.clone());
        self.file_name = Some(frame.file_name.clone());
        self.line_number = frame.line_number;
        self.column_number = frame.column_number;
        self.is_constructor = frame.is_constructor;
        self.function_name = frame.function_name.clone();
        self.type_name = frame.type_name.clone();
        self.method_name = frame.method_name.clone();
    }

    pub fn errors(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.arguments_array.iter().filter_map(LogArgument::as_error)
    }

    /// String arguments joined by a space; handy for assertions and simple sinks
    pub fn message(&self) -> String {
        self.arguments_array
            .iter()
            .filter_map(|arg| arg.as_value().and_then(LogValue::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Source location of a logging call, taken from `#[track_caller]` or a `log` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerLocation {
    pub file: String,
    pub line: u32,
    pub column: Option<u32>,
}

impl CallerLocation {
    pub fn new(file: impl Into<String>, line: u32, column: Option<u32>) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line(), Some(location.column()))
    }

    /// The location of the caller of the calling `#[track_caller]` function
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn to_raw(&self) -> RawCallSite {
        RawCallSite {
            file_name: Some(self.file.clone()),
            line_number: Some(self.line),
            column_number: self.column,
            ..RawCallSite::default()
        }
    }
}

/// Conversion into the argument list of a logging call
///
/// # Examples
///
/// ```
/// use hierlog::{IntoLogArgs, LogValue};
///
/// assert_eq!(("user", 42).into_log_args().len(), 2);
/// assert_eq!("only".into_log_args().len(), 1);
/// assert_eq!(vec![1, 2, 3].into_log_args().len(), 3);
/// ```
pub trait IntoLogArgs {
    fn into_log_args(self) -> Vec<LogValue>;
}

impl IntoLogArgs for () {
    fn into_log_args(self) -> Vec<LogValue> {
        Vec::new()
    }
}

impl<T: Into<LogValue>> IntoLogArgs for Vec<T> {
    fn into_log_args(self) -> Vec<LogValue> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<LogValue>, const N: usize> IntoLogArgs for [T; N] {
    fn into_log_args(self) -> Vec<LogValue> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! single_arg {
    ($($t:ty),*) => {
        $(
            impl IntoLogArgs for $t {
                fn into_log_args(self) -> Vec<LogValue> {
                    vec![self.into()]
                }
            }
        )*
    };
}

single_arg!(
    &str,
    String,
    &String,
    bool,
    i32,
    i64,
    u32,
    u64,
    usize,
    f64,
    LogValue,
    ErrorValue,
    ObjectRef
);

macro_rules! tuple_args {
    ($($name:ident),+) => {
        impl<$($name: Into<LogValue>),+> IntoLogArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_log_args(self) -> Vec<LogValue> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

tuple_args!(A);
tuple_args!(A, B);
tuple_args!(A, B, C);
tuple_args!(A, B, C, D);
tuple_args!(A, B, C, D, E);
tuple_args!(A, B, C, D, E, F);
