//! Structured output: one JSON document per record

use crate::core::error::Result;
use crate::core::error_record::ErrorRecord;
use crate::core::inspect::{format_value, inspect, InspectOptions};
use crate::core::log_record::{LogArgument, LogRecord};
use crate::core::log_value::LogValue;
use crate::core::masking::Masker;
use serde_json::{Map, Value};

pub struct JsonRenderer<'a> {
    masker: &'a Masker,
}

impl<'a> JsonRenderer<'a> {
    pub fn new(masker: &'a Masker) -> Self {
        Self { masker }
    }

    /// JSON projection of a record.
    ///
    /// Plain arguments become their masked text. Error arguments keep their
    /// record fields, gain `errorString` and never carry the native error.
    pub fn to_value(&self, record: &LogRecord) -> Result<Value> {
        let mut value = serde_json::to_value(record)?;
        let arguments = record
            .arguments_array
            .iter()
            .map(|argument| match argument {
                LogArgument::Error(error) => self.error_value(error),
                LogArgument::Value(value) => Ok(Value::String(self.argument_text(value))),
            })
            .collect::<Result<Vec<_>>>()?;

        if let Value::Object(map) = &mut value {
            map.insert("argumentsArray".to_string(), Value::Array(arguments));
        }
        Ok(value)
    }

    /// The record as a single line, newline included
    pub fn render(&self, record: &LogRecord) -> Result<String> {
        let mut line = serde_json::to_string(&self.to_value(record)?)?;
        line.push('\n');
        Ok(line)
    }

    fn argument_text(&self, value: &LogValue) -> String {
        let options = InspectOptions::json();
        let text = if value.is_structured() {
            inspect(&self.masker.mask_value(value), options)
        } else {
            format_value(value, options)
        };
        self.masker.mask_text(&text).into_owned()
    }

    fn error_value(&self, error: &ErrorRecord) -> Result<Value> {
        let masked = ErrorRecord {
            details: match self.masker.mask_value(&LogValue::Object(error.details.clone())) {
                LogValue::Object(details) => details,
                _ => error.details.clone(),
            },
            ..error.clone()
        };
        let mut map = match serde_json::to_value(&masked)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let error_string = self.masker.mask_text(&error.error_string).into_owned();
        map.insert("errorString".to_string(), Value::String(error_string));
        Ok(Value::Object(map))
    }
}
