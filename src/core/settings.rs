//! Logger configuration
//!
//! [`LoggerSettings`] is the effective configuration of one logger node, every
//! field concrete. [`SettingsOverrides`] carries the fields a node sets itself;
//! the effective settings are always the parent's (or the defaults) with the
//! node's overrides laid on top.

use super::error::Result;
use super::log_level::LogLevel;
use super::log_value::LogValue;
use super::output::{OutputStream, StderrStream, StdoutStream};
use super::timestamp::DateTimeZone;
use super::transport::AttachedTransport;
use colored::Color;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// How a logger prints records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerType {
    #[default]
    Pretty,
    Json,
    /// Records are built and forwarded to transports but never printed
    Hidden,
}

impl FromStr for LoggerType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LoggerType::Pretty),
            "json" => Ok(LoggerType::Json),
            "hidden" => Ok(LoggerType::Hidden),
            _ => Err(format!("Invalid logger type: '{}'", s)),
        }
    }
}

/// When the pretty renderer shows the caller's file path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayFilePath {
    /// Show it unless the file lives in a downloaded dependency
    #[default]
    #[serde(alias = "hideNodeModulesOnly")]
    HideDependenciesOnly,
    DisplayAll,
    Hidden,
}

/// Badge color per level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelColors([Color; 7]);

impl LevelColors {
    pub fn get(&self, level: LogLevel) -> Color {
        self.0[level.rank() as usize]
    }

    #[must_use]
    pub fn with(mut self, level: LogLevel, color: Color) -> Self {
        self.0[level.rank() as usize] = color;
        self
    }
}

impl Default for LevelColors {
    fn default() -> Self {
        Self(LogLevel::ALL.map(|level| level.default_color()))
    }
}

type RequestIdProducer = dyn Fn() -> Option<String> + Send + Sync;

/// Request id: a fixed value, or a producer evaluated for every record
#[derive(Clone)]
pub enum RequestId {
    Value(String),
    Producer(Arc<RequestIdProducer>),
}

impl RequestId {
    pub fn producer<F>(producer: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        RequestId::Producer(Arc::new(producer))
    }

    /// Current value; a producer is called again on every use
    pub fn resolve(&self) -> Option<String> {
        match self {
            RequestId::Value(value) => Some(value.clone()),
            RequestId::Producer(producer) => producer(),
        }
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Value(value) => f.debug_tuple("Value").field(value).finish(),
            RequestId::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        RequestId::Value(value.to_string())
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        RequestId::Value(value)
    }
}

/// Host name of this machine, resolved once per process
pub fn system_hostname() -> String {
    static HOSTNAME: OnceLock<String> = OnceLock::new();
    HOSTNAME
        .get_or_init(|| {
            std::env::var("HOSTNAME")
                .ok()
                .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "localhost".to_string())
        })
        .clone()
}

/// Effective configuration of a logger
#[derive(Clone)]
pub struct LoggerSettings {
    pub logger_type: LoggerType,
    pub instance_name: Option<String>,
    pub name: Option<String>,
    pub hostname: String,
    pub set_caller_as_logger_name: bool,
    pub request_id: Option<RequestId>,
    pub min_level: LogLevel,
    pub expose_stack: bool,
    pub expose_error_code_frame: bool,
    pub expose_error_code_frame_lines_before_and_after: usize,
    /// Leading call-stack frames skipped before the caller is chosen
    pub ignore_stack_levels: usize,
    pub suppress_std_output: bool,
    pub overwrite_console: bool,
    pub colorize_pretty_logs: bool,
    pub log_levels_colors: LevelColors,
    pub date_time_pattern: Option<String>,
    pub date_time_timezone: Option<DateTimeZone>,
    pub delimiter: String,
    /// Arguments put in front of every call's arguments
    pub prefix: Vec<LogValue>,
    pub mask_values_of_keys: Vec<String>,
    pub mask_any_regex: Vec<String>,
    pub mask_placeholder: String,
    pub print_log_message_in_new_line: bool,
    pub display_date_time: bool,
    pub display_log_level: bool,
    pub display_instance_name: bool,
    pub display_logger_name: bool,
    pub display_request_id: bool,
    pub display_file_path: DisplayFilePath,
    pub display_function_name: bool,
    pub display_types: bool,
    pub std_out: Arc<dyn OutputStream>,
    pub std_err: Arc<dyn OutputStream>,
    pub attached_transports: Vec<AttachedTransport>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            logger_type: LoggerType::Pretty,
            instance_name: None,
            name: None,
            hostname: system_hostname(),
            set_caller_as_logger_name: false,
            request_id: None,
            min_level: LogLevel::Silly,
            expose_stack: false,
            expose_error_code_frame: true,
            expose_error_code_frame_lines_before_and_after: super::code_frame::DEFAULT_CONTEXT_LINES,
            ignore_stack_levels: 0,
            suppress_std_output: false,
            overwrite_console: false,
            colorize_pretty_logs: true,
            log_levels_colors: LevelColors::default(),
            date_time_pattern: None,
            date_time_timezone: None,
            delimiter: " ".to_string(),
            prefix: Vec::new(),
            mask_values_of_keys: vec!["password".to_string()],
            mask_any_regex: Vec::new(),
            mask_placeholder: "[***]".to_string(),
            print_log_message_in_new_line: false,
            display_date_time: true,
            display_log_level: true,
            display_instance_name: false,
            display_logger_name: true,
            display_request_id: true,
            display_file_path: DisplayFilePath::HideDependenciesOnly,
            display_function_name: true,
            display_types: false,
            std_out: Arc::new(StdoutStream),
            std_err: Arc::new(StderrStream),
            attached_transports: Vec::new(),
        }
    }
}

impl LoggerSettings {
    /// These settings with `own` laid on top.
    ///
    /// Prefixes and attached transports accumulate (inherited entries first);
    /// every other field is replaced when `own` sets it. An instance name that
    /// is not set explicitly follows a hostname set in `own`.
    #[must_use]
    pub fn merged(&self, own: &SettingsOverrides) -> LoggerSettings {
        let mut settings = self.clone();
        settings.apply(own);
        settings.prefix.extend(own.prefix.iter().flatten().cloned());
        settings
            .attached_transports
            .extend(own.attached_transports.iter().cloned());
        if own.instance_name.is_none() {
            if let Some(hostname) = &own.hostname {
                settings.instance_name = Some(hostname.clone());
            }
        }
        settings
    }

    /// Stream a record of `level` is written to
    pub fn stream_for(&self, level: LogLevel) -> &Arc<dyn OutputStream> {
        if level.is_error_stream() {
            &self.std_err
        } else {
            &self.std_out
        }
    }
}

impl fmt::Debug for LoggerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerSettings")
            .field("logger_type", &self.logger_type)
            .field("instance_name", &self.instance_name)
            .field("name", &self.name)
            .field("hostname", &self.hostname)
            .field("request_id", &self.request_id)
            .field("min_level", &self.min_level)
            .field("expose_stack", &self.expose_stack)
            .field("expose_error_code_frame", &self.expose_error_code_frame)
            .field("ignore_stack_levels", &self.ignore_stack_levels)
            .field("suppress_std_output", &self.suppress_std_output)
            .field("overwrite_console", &self.overwrite_console)
            .field("prefix", &self.prefix)
            .field("mask_values_of_keys", &self.mask_values_of_keys)
            .field("mask_any_regex", &self.mask_any_regex)
            .field("std_out", &self.std_out.name())
            .field("std_err", &self.std_err.name())
            .field("attached_transports", &self.attached_transports)
            .finish_non_exhaustive()
    }
}

/// The fields one logger node sets itself
///
/// # Examples
///
/// ```
/// use hierlog::{LogLevel, LoggerType, SettingsOverrides};
///
/// let overrides = SettingsOverrides::new()
///     .name("api")
///     .min_level(LogLevel::Info)
///     .mask_values_of_keys(["password", "token"]);
///
/// let from_file = SettingsOverrides::from_json(r#"{"type": "json", "minLevel": "warn"}"#).unwrap();
/// assert_eq!(from_file.logger_type, Some(LoggerType::Json));
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsOverrides {
    #[serde(rename = "type")]
    pub logger_type: Option<LoggerType>,
    pub instance_name: Option<String>,
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub set_caller_as_logger_name: Option<bool>,
    #[serde(deserialize_with = "request_id_value")]
    pub request_id: Option<RequestId>,
    pub min_level: Option<LogLevel>,
    pub expose_stack: Option<bool>,
    pub expose_error_code_frame: Option<bool>,
    pub expose_error_code_frame_lines_before_and_after: Option<usize>,
    pub ignore_stack_levels: Option<usize>,
    pub suppress_std_output: Option<bool>,
    pub overwrite_console: Option<bool>,
    pub colorize_pretty_logs: Option<bool>,
    #[serde(skip)]
    pub log_levels_colors: Option<LevelColors>,
    pub date_time_pattern: Option<String>,
    pub date_time_timezone: Option<DateTimeZone>,
    pub delimiter: Option<String>,
    #[serde(deserialize_with = "prefix_values")]
    pub prefix: Option<Vec<LogValue>>,
    pub mask_values_of_keys: Option<Vec<String>>,
    #[serde(rename = "maskAnyRegEx", alias = "maskAnyRegex")]
    pub mask_any_regex: Option<Vec<String>>,
    pub mask_placeholder: Option<String>,
    pub print_log_message_in_new_line: Option<bool>,
    pub display_date_time: Option<bool>,
    pub display_log_level: Option<bool>,
    pub display_instance_name: Option<bool>,
    pub display_logger_name: Option<bool>,
    pub display_request_id: Option<bool>,
    pub display_file_path: Option<DisplayFilePath>,
    pub display_function_name: Option<bool>,
    pub display_types: Option<bool>,
    #[serde(skip)]
    pub std_out: Option<Arc<dyn OutputStream>>,
    #[serde(skip)]
    pub std_err: Option<Arc<dyn OutputStream>>,
    /// Transports attached to this node; inherited by its children
    #[serde(skip)]
    pub attached_transports: Vec<AttachedTransport>,
}

fn request_id_value<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<RequestId>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(RequestId::Value))
}

fn prefix_values<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Vec<LogValue>>, D::Error> {
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(values.map(|items| items.into_iter().map(LogValue::from).collect()))
}

/// Fields replaced wholesale when set: `plain` ones hold a value in
/// [`LoggerSettings`], `optional` ones an `Option`.
macro_rules! settings_fields {
    (plain { $($p:ident),* $(,)? } optional { $($o:ident),* $(,)? }) => {
        impl SettingsOverrides {
            /// Lay `other` over these overrides; a field set in `other` wins.
            /// Attached transports are appended.
            pub fn merge(&mut self, other: SettingsOverrides) {
                $( if other.$p.is_some() { self.$p = other.$p; } )*
                $( if other.$o.is_some() { self.$o = other.$o; } )*
                if other.prefix.is_some() {
                    self.prefix = other.prefix;
                }
                self.attached_transports.extend(other.attached_transports);
            }
        }

        impl LoggerSettings {
            fn apply(&mut self, own: &SettingsOverrides) {
                $( if let Some(value) = &own.$p { self.$p = value.clone(); } )*
                $( if let Some(value) = &own.$o { self.$o = Some(value.clone()); } )*
            }
        }
    };
}

settings_fields! {
    plain {
        logger_type,
        hostname,
        set_caller_as_logger_name,
        min_level,
        expose_stack,
        expose_error_code_frame,
        expose_error_code_frame_lines_before_and_after,
        ignore_stack_levels,
        suppress_std_output,
        overwrite_console,
        colorize_pretty_logs,
        log_levels_colors,
        delimiter,
        mask_values_of_keys,
        mask_any_regex,
        mask_placeholder,
        print_log_message_in_new_line,
        display_date_time,
        display_log_level,
        display_instance_name,
        display_logger_name,
        display_request_id,
        display_file_path,
        display_function_name,
        display_types,
        std_out,
        std_err,
    }
    optional {
        instance_name,
        name,
        request_id,
        date_time_pattern,
        date_time_timezone,
    }
}

macro_rules! setters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        impl SettingsOverrides {
            $(
                #[must_use]
                pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*
        }
    };
}

setters! {
    logger_type: LoggerType,
    instance_name: String,
    name: String,
    hostname: String,
    set_caller_as_logger_name: bool,
    request_id: RequestId,
    min_level: LogLevel,
    expose_stack: bool,
    expose_error_code_frame: bool,
    suppress_std_output: bool,
    overwrite_console: bool,
    colorize_pretty_logs: bool,
    log_levels_colors: LevelColors,
    date_time_pattern: String,
    date_time_timezone: DateTimeZone,
    delimiter: String,
    mask_placeholder: String,
    print_log_message_in_new_line: bool,
    display_date_time: bool,
    display_log_level: bool,
    display_instance_name: bool,
    display_logger_name: bool,
    display_request_id: bool,
    display_file_path: DisplayFilePath,
    display_function_name: bool,
    display_types: bool,
}

impl SettingsOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse overrides from a JSON document with camelCase keys
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn expose_error_code_frame_lines_before_and_after(mut self, lines: usize) -> Self {
        self.expose_error_code_frame_lines_before_and_after = Some(lines);
        self
    }

    #[must_use]
    pub fn ignore_stack_levels(mut self, levels: usize) -> Self {
        self.ignore_stack_levels = Some(levels);
        self
    }

    #[must_use]
    pub fn prefix<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<LogValue>,
    {
        self.prefix = Some(values.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn mask_values_of_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mask_values_of_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn mask_any_regex<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mask_any_regex = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn std_out(mut self, stream: Arc<dyn OutputStream>) -> Self {
        self.std_out = Some(stream);
        self
    }

    #[must_use]
    pub fn std_err(mut self, stream: Arc<dyn OutputStream>) -> Self {
        self.std_err = Some(stream);
        self
    }

    /// Send both streams to the same sink
    #[must_use]
    pub fn std_streams(self, stream: Arc<dyn OutputStream>) -> Self {
        self.std_out(Arc::clone(&stream)).std_err(stream)
    }

    #[must_use]
    pub fn attach_transport(mut self, transport: AttachedTransport) -> Self {
        self.attached_transports.push(transport);
        self
    }
}

impl fmt::Debug for SettingsOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsOverrides")
            .field("logger_type", &self.logger_type)
            .field("instance_name", &self.instance_name)
            .field("name", &self.name)
            .field("hostname", &self.hostname)
            .field("request_id", &self.request_id)
            .field("min_level", &self.min_level)
            .field("prefix", &self.prefix)
            .field("mask_values_of_keys", &self.mask_values_of_keys)
            .field("mask_any_regex", &self.mask_any_regex)
            .field("attached_transports", &self.attached_transports)
            .finish_non_exhaustive()
    }
}
