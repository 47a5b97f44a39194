//! Redaction of sensitive values
//!
//! Two independent stages:
//! - key masking replaces the value of every object property whose key is in
//!   the configured list (case-insensitive) by the placeholder; it works on a
//!   fresh clone of the value
//! - pattern masking replaces every match of the configured regexes in the
//!   final formatted text

use super::error::Result;
use super::error_record::ErrorValue;
use super::log_value::{LogValue, ObjectRef, WeakObjectRef};
use regex::Regex;
use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct Masker {
    keys: Vec<String>,
    pattern: Option<Regex>,
    placeholder: String,
}

impl Masker {
    /// Build a masker. Empty key or pattern lists disable that stage.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidPattern`](super::error::LoggerError::InvalidPattern)
    /// when a pattern does not compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use hierlog::{LogValue, Masker};
    ///
    /// let masker = Masker::new(
    ///     &["password".to_string()],
    ///     &[r"\d{4}-\d{4}".to_string()],
    ///     "[***]",
    /// ).unwrap();
    ///
    /// let masked = masker.mask_value(&LogValue::object([("Password", "hunter2")]));
    /// assert_eq!(masked.as_object().unwrap().get("Password").unwrap().as_str(), Some("[***]"));
    /// assert_eq!(masker.mask_text("card 1234-5678"), "card [***]");
    /// ```
    pub fn new(keys: &[String], patterns: &[String], placeholder: &str) -> Result<Self> {
        let pattern = if patterns.is_empty() {
            None
        } else {
            let joined = patterns
                .iter()
                .map(|p| format!("(?:{})", p))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&joined)?)
        };

        Ok(Self {
            keys: keys.iter().map(|k| k.to_lowercase()).collect(),
            pattern,
            placeholder: placeholder.to_string(),
        })
    }

    /// A masker that leaves everything untouched
    pub fn disabled() -> Self {
        Self {
            keys: Vec::new(),
            pattern: None,
            placeholder: String::new(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn masks_key(&self, key: &str) -> bool {
        !self.keys.is_empty() && self.keys.contains(&key.to_lowercase())
    }

    /// Replace every pattern match in `text` with the placeholder
    pub fn mask_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(text, regex::NoExpand(&self.placeholder)),
            None => Cow::Borrowed(text),
        }
    }

    /// Key-masked clone of `value`. The input is never modified.
    pub fn mask_value(&self, value: &LogValue) -> LogValue {
        if self.keys.is_empty() {
            return value.clone();
        }
        match value {
            LogValue::Object(object) => LogValue::Object(self.clone_object(object, &mut Vec::new())),
            LogValue::Array(items) => {
                LogValue::Array(self.clone_array(items, &mut Vec::new(), None))
            }
            LogValue::Error(error) => LogValue::Error(self.mask_error(error)),
            other => other.clone(),
        }
    }

    /// Error with its properties key-masked
    pub fn mask_error(&self, error: &ErrorValue) -> ErrorValue {
        if self.keys.is_empty() {
            return error.clone();
        }
        let clone = ObjectRef::new();
        let properties = self.clone_entries(error.properties().to_vec(), &clone, &mut Vec::new());
        error.with_properties(properties)
    }

    /// Clone an object property by property.
    ///
    /// `path` holds the identities of the source objects being cloned above this
    /// one. A property that points back at one of them is linked to the clone of
    /// the enclosing object instead of being walked again.
    fn clone_object(&self, object: &ObjectRef, path: &mut Vec<usize>) -> ObjectRef {
        path.push(object.id());
        let clone = ObjectRef::new();
        for (key, value) in self.clone_entries(object.entries(), &clone, path) {
            clone.insert(key, value);
        }
        path.pop();
        clone
    }

    fn clone_entries(
        &self,
        entries: Vec<(String, LogValue)>,
        enclosing: &ObjectRef,
        path: &mut Vec<usize>,
    ) -> Vec<(String, LogValue)> {
        entries
            .into_iter()
            .map(|(key, value)| {
                let cloned = match &value {
                    LogValue::Null => LogValue::Null,
                    LogValue::Object(child) if path.contains(&child.id()) => {
                        LogValue::Circular(enclosing.downgrade())
                    }
                    LogValue::Object(child) => LogValue::Object(self.clone_object(child, path)),
                    LogValue::Array(items) => {
                        LogValue::Array(self.clone_array(items, path, Some(enclosing)))
                    }
                    LogValue::Date(date) => LogValue::Date(*date),
                    LogValue::Error(error) => LogValue::Error(self.mask_error(error)),
                    LogValue::Circular(link) => LogValue::Circular(link.clone()),
                    _ if self.masks_key(&key) => LogValue::String(self.placeholder.clone()),
                    primitive => primitive.clone(),
                };
                (key, cloned)
            })
            .collect()
    }

    /// Arrays recurse into structured elements only; primitives have no key to match
    fn clone_array(
        &self,
        items: &[LogValue],
        path: &mut Vec<usize>,
        enclosing: Option<&ObjectRef>,
    ) -> Vec<LogValue> {
        items
            .iter()
            .map(|item| match item {
                LogValue::Object(child) if path.contains(&child.id()) => LogValue::Circular(
                    enclosing.map(ObjectRef::downgrade).unwrap_or_else(WeakObjectRef::default),
                ),
                LogValue::Object(child) => LogValue::Object(self.clone_object(child, path)),
                LogValue::Array(nested) => LogValue::Array(self.clone_array(nested, path, enclosing)),
                LogValue::Date(date) => LogValue::Date(*date),
                LogValue::Error(error) => LogValue::Error(self.mask_error(error)),
                other => other.clone(),
            })
            .collect()
    }
}

impl Default for Masker {
    fn default() -> Self {
        Self::disabled()
    }
}
