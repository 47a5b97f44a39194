//! Human-readable rendering of logged values
//!
//! Objects print as `{ key: 'value' }`, arrays as `[ 1, 2 ]`. In multi-line
//! mode every property goes on its own line, indented by two spaces per level.

use super::error_record::ErrorValue;
use super::log_value::{LogValue, ObjectRef, CIRCULAR_MARKER};
use chrono::SecondsFormat;
use colored::{ColoredString, Colorize};

const INDENT: &str = "  ";

/// Apply `paint` to `text` when colors are enabled
pub(crate) fn styled(text: &str, enabled: bool, paint: impl FnOnce(&str) -> ColoredString) -> String {
    if enabled {
        paint(text).to_string()
    } else {
        text.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectOptions {
    pub colors: bool,
    /// Keep everything on one line
    pub compact: bool,
}

impl InspectOptions {
    /// Multi-line layout used by the pretty renderer
    pub const fn pretty(colors: bool) -> Self {
        Self {
            colors,
            compact: false,
        }
    }

    /// Single-line, uncolored layout used by the JSON renderer
    pub const fn json() -> Self {
        Self {
            colors: false,
            compact: true,
        }
    }
}

/// Render `value`; strings are quoted
///
/// # Examples
///
/// ```
/// use hierlog::{inspect, InspectOptions, LogValue};
///
/// let value = LogValue::object([("user", LogValue::from("ann")), ("id", LogValue::from(7))]);
/// assert_eq!(inspect(&value, InspectOptions::json()), "{ user: 'ann', id: 7 }");
/// ```
pub fn inspect(value: &LogValue, options: InspectOptions) -> String {
    Inspector { options }.value(value, 0, &mut Vec::new())
}

/// Render `value` as message text; a string is returned as is
pub fn format_value(value: &LogValue, options: InspectOptions) -> String {
    match value {
        LogValue::String(s) => s.clone(),
        other => inspect(other, options),
    }
}

struct Inspector {
    options: InspectOptions,
}

impl Inspector {
    fn value(&self, value: &LogValue, depth: usize, path: &mut Vec<usize>) -> String {
        let colors = self.options.colors;
        match value {
            LogValue::Null => styled("null", colors, |t| t.red()),
            LogValue::Bool(b) => styled(&b.to_string(), colors, |t| t.yellow()),
            LogValue::Int(i) => styled(&i.to_string(), colors, |t| t.green()),
            LogValue::Float(f) => styled(&format_float(*f), colors, |t| t.green()),
            LogValue::String(s) => styled(&quote(s), colors, |t| t.red()),
            LogValue::Date(date) => styled(
                &date.to_rfc3339_opts(SecondsFormat::Millis, true),
                colors,
                |t| t.magenta(),
            ),
            LogValue::Circular(_) => styled(CIRCULAR_MARKER, colors, |t| t.cyan()),
            LogValue::Error(error) => self.error(error, depth, path),
            LogValue::Array(items) => {
                let parts = items
                    .iter()
                    .map(|item| self.value(item, depth + 1, path))
                    .collect();
                self.wrap("[", "]", parts, depth)
            }
            LogValue::Object(object) => self.object(object, depth, path),
        }
    }

    fn object(&self, object: &ObjectRef, depth: usize, path: &mut Vec<usize>) -> String {
        if path.contains(&object.id()) {
            return styled(CIRCULAR_MARKER, self.options.colors, |t| t.cyan());
        }
        path.push(object.id());
        let parts = self.properties(&object.entries(), depth, path);
        path.pop();
        self.wrap("{", "}", parts, depth)
    }

    fn properties(
        &self,
        entries: &[(String, LogValue)],
        depth: usize,
        path: &mut Vec<usize>,
    ) -> Vec<String> {
        entries
            .iter()
            .map(|(key, value)| format!("{}: {}", format_key(key), self.value(value, depth + 1, path)))
            .collect()
    }

    fn error(&self, error: &ErrorValue, depth: usize, path: &mut Vec<usize>) -> String {
        let head = format!("[{}]", error);
        if error.properties().is_empty() {
            return head;
        }
        let parts = self.properties(error.properties(), depth, path);
        format!("{} {}", head, self.wrap("{", "}", parts, depth))
    }

    fn wrap(&self, open: &str, close: &str, parts: Vec<String>, depth: usize) -> String {
        if parts.is_empty() {
            return format!("{}{}", open, close);
        }
        if self.options.compact {
            return format!("{} {} {}", open, parts.join(", "), close);
        }
        let inner_indent = INDENT.repeat(depth + 1);
        let body = parts
            .iter()
            .map(|part| format!("{}{}", inner_indent, part))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("{}\n{}\n{}{}", open, body, INDENT.repeat(depth), close)
    }
}

fn format_float(f: f64) -> String {
    if f.is_infinite() {
        let text = if f > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else {
        f.to_string()
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn format_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        key.to_string()
    } else {
        quote(key)
    }
}
