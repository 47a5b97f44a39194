//! Error values and their normalized record form
//!
//! [`ErrorValue`] is the error-shaped argument a caller hands to the logger.
//! [`ErrorRecord`] is what the record builder turns it into: name, message,
//! details, a cleaned stack and an optional [`CodeFrame`].

use super::call_site::{BacktraceCapture, CallSiteFrame, RawCallSite, StackCapture};
use super::code_frame::CodeFrame;
use super::log_value::{LogValue, ObjectRef};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Name used when an error does not declare one
pub const DEFAULT_ERROR_NAME: &str = "Error";

#[derive(Debug, Clone)]
struct ErrorInner {
    name: Option<String>,
    message: String,
    properties: Vec<(String, LogValue)>,
    frames: Option<Vec<RawCallSite>>,
    stack_text: Option<String>,
}

/// A logged error: name, message, extra properties and the stack where it was created
///
/// # Examples
///
/// ```
/// use hierlog::ErrorValue;
///
/// let err = ErrorValue::new("ValidationError", "email is required")
///     .with_property("field", "email");
/// assert_eq!(err.name(), Some("ValidationError"));
/// assert_eq!(err.to_string(), "ValidationError: email is required");
/// ```
#[derive(Debug, Clone)]
pub struct ErrorValue(Arc<ErrorInner>);

impl ErrorValue {
    /// Create an error and capture the current stack
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_capture(Some(name.into()), message.into(), &BacktraceCapture)
    }

    /// Create an error without a name; it is reported as `Error`
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_capture(None, message.into(), &BacktraceCapture)
    }

    /// Wrap any `std::error::Error`, capturing the current stack.
    ///
    /// The name is the type's own name; a source error becomes the `source` property.
    pub fn from_error<E: std::error::Error + ?Sized>(error: &E) -> Self {
        let type_name = std::any::type_name::<E>();
        let base = type_name.split('<').next().unwrap_or(type_name);
        let name = base.rsplit("::").next().unwrap_or(base).to_string();

        let value = Self::with_capture(Some(name), error.to_string(), &BacktraceCapture);
        match error.source() {
            Some(source) => value.with_property("source", source.to_string()),
            None => value,
        }
    }

    /// Create an error using a specific stack source
    pub fn with_capture(
        name: Option<String>,
        message: String,
        capture: &dyn StackCapture,
    ) -> Self {
        Self(Arc::new(ErrorInner {
            name,
            message,
            properties: Vec::new(),
            frames: capture.capture(),
            stack_text: None,
        }))
    }

    /// An error that arrived from outside, described only by its parts
    pub fn foreign(
        name: Option<String>,
        message: impl Into<String>,
        stack_text: Option<String>,
    ) -> Self {
        Self(Arc::new(ErrorInner {
            name,
            message: message.into(),
            properties: Vec::new(),
            frames: None,
            stack_text,
        }))
    }

    /// Convert an error-shaped object (string `message` and `stack`) into an error.
    ///
    /// `name`, `message` and `stack` become the error's own fields; every other
    /// property is kept.
    pub fn from_object(object: &ObjectRef) -> Self {
        let text = |key: &str| object.get(key).and_then(|v| v.as_str().map(str::to_string));
        let mut inner = ErrorInner {
            name: text("name"),
            message: text("message").unwrap_or_default(),
            properties: Vec::new(),
            frames: None,
            stack_text: text("stack"),
        };
        inner.properties = object
            .entries()
            .into_iter()
            .filter(|(key, _)| !matches!(key.as_str(), "name" | "message" | "stack"))
            .collect();
        Self(Arc::new(inner))
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<LogValue>) -> Self {
        let key = key.into();
        let value = value.into();
        let inner = Arc::make_mut(&mut self.0);
        match inner.properties.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => inner.properties.push((key, value)),
        }
        self
    }

    /// Replace the captured stack
    #[must_use]
    pub fn with_frames(mut self, frames: Option<Vec<RawCallSite>>) -> Self {
        Arc::make_mut(&mut self.0).frames = frames;
        self
    }

    pub(crate) fn with_properties(&self, properties: Vec<(String, LogValue)>) -> Self {
        let mut inner = (*self.0).clone();
        inner.properties = properties;
        Self(Arc::new(inner))
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// Declared name, or `Error`
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(DEFAULT_ERROR_NAME)
    }

    pub fn message_text(&self) -> &str {
        &self.0.message
    }

    pub fn properties(&self) -> &[(String, LogValue)] {
        &self.0.properties
    }

    pub fn frames(&self) -> Option<&[RawCallSite]> {
        self.0.frames.as_deref()
    }

    /// Stack text as received, for errors that carry no frames
    pub fn stack_text(&self) -> Option<&str> {
        self.0.stack_text.as_deref()
    }

    /// `Name: message` followed by one `    at` line per frame
    pub fn stack(&self) -> String {
        if let Some(text) = self.stack_text() {
            return text.to_string();
        }
        let mut out = self.to_string();
        for frame in self.frames().unwrap_or_default() {
            push_at_line(
                &mut out,
                frame.function_name.as_deref(),
                frame.file_name.as_deref(),
                frame.line_number,
                frame.column_number,
            );
        }
        out
    }

    /// Like [`ErrorValue::stack`], but listing already cleaned frames
    pub fn stack_with(&self, frames: &[CallSiteFrame]) -> String {
        if let Some(text) = self.stack_text() {
            return text.to_string();
        }
        let mut out = self.to_string();
        for frame in frames {
            push_at_line(
                &mut out,
                frame.function_name.as_deref(),
                Some(frame.file_path.as_str()).filter(|path| !path.is_empty()),
                frame.line_number,
                frame.column_number,
            );
        }
        out
    }

    pub(crate) fn json_with_path(&self, path: &mut Vec<usize>) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("name".into(), self.display_name().into());
        map.insert("message".into(), self.message_text().into());
        for (key, value) in self.properties() {
            map.insert(key.clone(), value.json_with_path(path));
        }
        serde_json::Value::Object(map)
    }
}

fn push_at_line(
    out: &mut String,
    function: Option<&str>,
    file: Option<&str>,
    line: Option<u32>,
    column: Option<u32>,
) {
    out.push_str(&format!(
        "\n    at {} ({}",
        function.unwrap_or("<anonymous>"),
        file.unwrap_or("<unknown>")
    ));
    if let Some(line) = line {
        out.push_str(&format!(":{}", line));
    }
    if let Some(column) = column {
        out.push_str(&format!(":{}", column));
    }
    out.push(')');
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.display_name(), self.message_text())
    }
}

impl Serialize for ErrorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.json_with_path(&mut Vec::new()).serialize(serializer)
    }
}

/// The runtime's own error representation
pub fn is_native_error(value: &LogValue) -> bool {
    matches!(value, LogValue::Error(_))
}

/// Structural fallback: an object that carries a string `message` and `stack`
pub fn is_error_instance(value: &LogValue) -> bool {
    match value {
        LogValue::Object(object) => ["message", "stack"]
            .iter()
            .all(|key| matches!(object.get(key), Some(LogValue::String(_)))),
        _ => false,
    }
}

/// Error checks, tried in order
pub const ERROR_CHECKS: [fn(&LogValue) -> bool; 2] = [is_native_error, is_error_instance];

pub fn is_error_shaped(value: &LogValue) -> bool {
    ERROR_CHECKS.iter().any(|check| check(value))
}

/// The error carried by an error-shaped value
pub fn as_error_value(value: &LogValue) -> Option<ErrorValue> {
    match value {
        LogValue::Error(error) => Some(error.clone()),
        LogValue::Object(object) if is_error_instance(value) => Some(ErrorValue::from_object(object)),
        _ => None,
    }
}

/// Normalized form of an error argument
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    #[serde(skip)]
    pub native_error: ErrorValue,
    #[serde(serialize_with = "serialize_details")]
    pub details: ObjectRef,
    pub name: String,
    pub is_error: bool,
    pub message: String,
    pub stack: Vec<CallSiteFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_frame: Option<CodeFrame>,
    /// `Name: message` and the `stack` frames as text
    #[serde(skip)]
    pub error_string: String,
}

fn serialize_details<S: Serializer>(
    details: &ObjectRef,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    LogValue::Object(details.clone()).serialize(serializer)
}

/// Options for turning an error into an [`ErrorRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorRecordOptions {
    pub expose_code_frame: bool,
    pub code_frame_lines: usize,
    /// Frames to skip from the top; negative values count as 0
    pub stack_offset: i64,
    /// Frames to keep; `None` keeps all, negative values count as 0
    pub stack_limit: Option<i64>,
}

impl Default for ErrorRecordOptions {
    fn default() -> Self {
        Self {
            expose_code_frame: true,
            code_frame_lines: super::code_frame::DEFAULT_CONTEXT_LINES,
            stack_offset: 0,
            stack_limit: None,
        }
    }
}

impl ErrorRecordOptions {
    /// Apply offset then limit to a stack
    pub fn slice<T>(&self, mut frames: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.stack_offset.max(0)).unwrap_or(usize::MAX);
        let skip = offset.min(frames.len());
        frames.drain(..skip);
        if let Some(limit) = self.stack_limit {
            let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
            frames.truncate(limit);
        }
        frames
    }
}
