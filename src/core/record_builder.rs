//! Turning a logging call into a [`LogRecord`]

use super::call_site::{is_dependency_path, CallSiteResolver, RawCallSite, StackCapture};
use super::code_frame::{read_code_frame, SourceReader};
use super::error_record::{as_error_value, ErrorRecord, ErrorRecordOptions, ErrorValue};
use super::log_level::LogLevel;
use super::log_record::{CallerLocation, LogArgument, LogRecord};
use super::log_value::{LogValue, ObjectRef};
use super::settings::LoggerSettings;
use std::path::Path;

/// Builds records and error records against one snapshot of settings
pub struct RecordBuilder<'a> {
    pub settings: &'a LoggerSettings,
    pub capture: &'a dyn StackCapture,
    pub resolver: &'a CallSiteResolver,
    pub reader: &'a dyn SourceReader,
}

impl RecordBuilder<'_> {
    /// Build the record for one call.
    ///
    /// The first stack frame left after cleaning and the `ignore_stack_levels`
    /// cut is the caller. Without one, `fallback` is used. Never fails: missing
    /// introspection data only leaves fields empty.
    pub fn build_record(
        &self,
        level: LogLevel,
        arguments: Vec<LogValue>,
        expose_stack: bool,
        fallback: &CallerLocation,
    ) -> LogRecord {
        let settings = self.settings;
        let frames = self.relevant_frames();

        let mut record = LogRecord::new(level, settings.hostname.clone());
        record.instance_name = settings.instance_name.clone();
        record.logger_name = settings.name.clone();
        record.request_id = settings.request_id.as_ref().and_then(|id| id.resolve());

        let caller = match frames.first() {
            Some(raw) => self.resolver.to_frame(raw),
            None => self.resolver.to_frame(&fallback.to_raw()),
        };
        record.set_caller(&caller);

        let options = ErrorRecordOptions {
            expose_code_frame: settings.expose_error_code_frame,
            code_frame_lines: settings.expose_error_code_frame_lines_before_and_after,
            ..ErrorRecordOptions::default()
        };
        record.arguments_array = settings
            .prefix
            .iter()
            .cloned()
            .chain(arguments)
            .map(|argument| match as_error_value(&argument) {
                Some(error) => LogArgument::Error(self.build_error_record(&error, &options)),
                None => LogArgument::Value(argument),
            })
            .collect();

        if expose_stack {
            record.stack = Some(self.resolver.to_frames(&frames));
        }
        record
    }

    /// Normalize an error: cleaned and sliced stack, details, optional code frame
    pub fn build_error_record(&self, error: &ErrorValue, options: &ErrorRecordOptions) -> ErrorRecord {
        let raw = self
            .resolver
            .clean(error.frames().map(<[RawCallSite]>::to_vec))
            .unwrap_or_default();
        let stack = self.resolver.to_frames(&options.slice(raw));

        let code_frame = stack
            .first()
            .filter(|_| options.expose_code_frame)
            .filter(|top| !is_dependency_path(&top.full_file_path))
            .and_then(|top| {
                let line = top.line_number?;
                read_code_frame(
                    self.reader,
                    Path::new(&top.full_file_path),
                    line as usize,
                    top.column_number,
                    options.code_frame_lines,
                )
            });

        let error_string = error.stack_with(&stack);
        ErrorRecord {
            native_error: error.clone(),
            details: ObjectRef::from_pairs(error.properties().iter().cloned()),
            name: error.display_name().to_string(),
            is_error: true,
            message: error.message_text().to_string(),
            stack,
            code_frame,
            error_string,
        }
    }

    /// Logger name taken from the first caller frame: its type, else its function
    pub fn caller_name(&self) -> Option<String> {
        let frame = self.relevant_frames().into_iter().next()?;
        frame.type_name.or(frame.function_name)
    }

    fn relevant_frames(&self) -> Vec<RawCallSite> {
        self.resolver
            .clean(self.capture.capture())
            .unwrap_or_default()
            .into_iter()
            .skip(self.settings.ignore_stack_levels)
            .collect()
    }
}
