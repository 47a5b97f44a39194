//! Human-oriented output
//!
//! One record renders as: date, level badge, the meta block
//! `[name@instance:requestId path:line Type.method]`, then every argument.
//! Structured values go on their own line; errors get a badge, their details,
//! their stack and a code frame.

use crate::core::call_site::{is_dependency_path, CallSiteFrame};
use crate::core::code_frame::CodeFrame;
use crate::core::error_record::ErrorRecord;
use crate::core::inspect::{format_value, inspect, styled, InspectOptions};
use crate::core::log_level::LogLevel;
use crate::core::log_record::{LogArgument, LogRecord};
use crate::core::log_value::LogValue;
use crate::core::masking::Masker;
use crate::core::settings::{DisplayFilePath, LoggerSettings};
use crate::core::timestamp::format_timestamp;
use colored::Colorize;

pub struct PrettyRenderer<'a> {
    settings: &'a LoggerSettings,
    masker: &'a Masker,
}

impl<'a> PrettyRenderer<'a> {
    pub fn new(settings: &'a LoggerSettings, masker: &'a Masker) -> Self {
        Self { settings, masker }
    }

    fn colors(&self) -> bool {
        self.settings.colorize_pretty_logs
    }

    fn inspect_options(&self) -> InspectOptions {
        InspectOptions::pretty(self.colors())
    }

    pub fn render(&self, record: &LogRecord) -> String {
        let settings = self.settings;
        let mut out = String::new();

        if settings.display_date_time {
            let date = format_timestamp(
                &record.date,
                settings.date_time_pattern.as_deref(),
                settings.date_time_timezone,
            );
            let text = format!("{}{}", date, settings.delimiter);
            out.push_str(&styled(&text, self.colors(), |t| t.bright_black()));
        }

        if settings.display_log_level {
            let color = settings.log_levels_colors.get(record.log_level);
            out.push_str(&styled(record.log_level.label(), self.colors(), |t| {
                t.color(color).bold()
            }));
            let padding = if record.log_level == LogLevel::Info { 2 } else { 1 };
            out.push_str(&settings.delimiter.repeat(padding));
        }

        let meta = self.meta_line(record);
        if !meta.is_empty() {
            out.push_str(&styled(&format!("[{}]", meta), self.colors(), |t| t.bright_black()));
            if settings.print_log_message_in_new_line {
                out.push('\n');
            } else {
                out.push_str(&settings.delimiter);
            }
        }

        for argument in &record.arguments_array {
            match argument {
                LogArgument::Error(error) => out.push_str(&self.render_error(error, true)),
                LogArgument::Value(value) => self.push_value(&mut out, value),
            }
        }
        out.push('\n');

        if let Some(stack) = &record.stack {
            out.push_str(&styled("log stack:\n", self.colors(), |t| t.underline().bold()));
            out.push_str(&self.stack(stack));
        }
        out
    }

    fn push_value(&self, out: &mut String, value: &LogValue) {
        let settings = self.settings;
        let type_prefix = if settings.display_types {
            let label = format!("{}:", value.type_name());
            format!(
                "{}{}",
                styled(&label, self.colors(), |t| t.bright_black().bold()),
                settings.delimiter
            )
        } else {
            String::new()
        };

        if value.is_null() {
            out.push_str(&type_prefix);
            out.push_str(&self.inspect_masked(value));
            out.push(' ');
        } else if value.is_structured() {
            out.push('\n');
            out.push_str(&type_prefix);
            out.push_str(&self.inspect_masked(value));
        } else {
            out.push_str(&type_prefix);
            out.push_str(&self.format_masked(value));
            out.push_str(&settings.delimiter);
        }
    }

    /// `name@instance:requestId path:line function`, empty parts left out
    fn meta_line(&self, record: &LogRecord) -> String {
        let settings = self.settings;
        let mut name = String::new();
        if settings.display_logger_name {
            if let Some(logger_name) = &record.logger_name {
                name.push_str(logger_name);
            }
        }
        if settings.display_instance_name {
            if let Some(instance) = &record.instance_name {
                name.push('@');
                name.push_str(instance);
            }
        }
        if settings.display_request_id {
            if let Some(request_id) = &record.request_id {
                name.push(':');
                name.push_str(request_id);
            }
        }

        let show_path = match settings.display_file_path {
            DisplayFilePath::DisplayAll => true,
            DisplayFilePath::HideDependenciesOnly => record
                .file_path
                .as_deref()
                .is_some_and(|path| !is_dependency_path(path)),
            DisplayFilePath::Hidden => false,
        };
        let file_location = if show_path {
            format!(
                "{}:{}",
                record.file_path.as_deref().unwrap_or_default(),
                record
                    .line_number
                    .map(|line| line.to_string())
                    .unwrap_or_default()
            )
        } else {
            String::new()
        };

        let function = if settings.display_function_name {
            function_label(record)
        } else {
            String::new()
        };

        [name, file_location, function]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render one error record; `with_stack` controls the `error stack:` part
    pub fn render_error(&self, error: &ErrorRecord, with_stack: bool) -> String {
        let settings = self.settings;
        let mut out = String::from("\n");

        let badge = format!(" {}{}", error.name, settings.delimiter);
        out.push_str(&styled(&badge, self.colors(), |t| {
            t.on_red().bright_white().bold()
        }));
        out.push_str(&settings.delimiter);
        out.push_str(&self.masker.mask_text(&error.message));

        if !error.details.is_empty() {
            out.push_str(&styled("\ndetails:", self.colors(), |t| t.underline().bold()));
            out.push('\n');
            out.push_str(&self.inspect_masked(&LogValue::Object(error.details.clone())));
        }

        if with_stack {
            if !error.stack.is_empty() {
                out.push_str(&styled("\nerror stack:", self.colors(), |t| t.underline().bold()));
                out.push_str(&self.stack(&error.stack));
            } else if let Some(text) = error.native_error.stack_text() {
                out.push_str(&styled("\nerror stack:", self.colors(), |t| t.underline().bold()));
                out.push('\n');
                out.push_str(&self.masker.mask_text(text));
                out.push_str("\n\n");
            }
        }

        if let Some(frame) = &error.code_frame {
            out.push_str(&self.code_frame(frame));
        }
        out
    }

    fn stack(&self, frames: &[CallSiteFrame]) -> String {
        let colors = self.colors();
        let mut out = String::from("\n");
        for frame in frames {
            out.push_str(&styled("• ", colors, |t| t.bright_black()));
            out.push_str(&styled(&frame.file_name, colors, |t| t.bright_yellow()));
            if let Some(line) = frame.line_number {
                out.push_str(&styled(":", colors, |t| t.bright_black()));
                out.push_str(&styled(&line.to_string(), colors, |t| t.yellow()));
            }
            let function = frame.function_name.as_deref().unwrap_or("<anonymous>");
            out.push_str(&styled(&format!(" {}", function), colors, |t| t.white()));
            if let (Some(line), Some(column)) = (frame.line_number, frame.column_number) {
                out.push_str("\n    ");
                let location = format!("{}:{}:{}", frame.file_path, line, column);
                out.push_str(&styled(&location, colors, |t| t.bright_black()));
            }
            out.push_str("\n\n");
        }
        out
    }

    fn code_frame(&self, frame: &CodeFrame) -> String {
        let colors = self.colors();
        let mut out = styled("code frame:\n", colors, |t| t.underline().bold());
        let mut line_number = frame.first_line_number;

        for line in &frame.lines_before {
            out.push_str(&format!("  {} | {}\n", three_digits(line_number), line));
            line_number += 1;
        }

        out.push_str(&styled(">", colors, |t| t.red()));
        out.push(' ');
        out.push_str(&styled(&three_digits(line_number), colors, |t| {
            t.on_red().bright_white()
        }));
        out.push_str(" | ");
        out.push_str(&styled(&frame.relevant_line, colors, |t| t.yellow()));
        out.push('\n');
        line_number += 1;

        if let Some(column) = frame.column_number {
            let marker = format!("{}^", " ".repeat(column as usize + 7));
            out.push_str(&styled(&marker, colors, |t| t.red()));
            out.push('\n');
        }

        for line in &frame.lines_after {
            out.push_str(&format!("  {} | {}\n", three_digits(line_number), line));
            line_number += 1;
        }
        out
    }

    fn inspect_masked(&self, value: &LogValue) -> String {
        let masked = self.masker.mask_value(value);
        let text = inspect(&masked, self.inspect_options());
        self.masker.mask_text(&text).into_owned()
    }

    fn format_masked(&self, value: &LogValue) -> String {
        let text = format_value(value, self.inspect_options());
        self.masker.mask_text(&text).into_owned()
    }
}

fn function_label(record: &LogRecord) -> String {
    let type_name = record.type_name.as_deref();
    if record.is_constructor == Some(true) {
        format!("{}.constructor", type_name.unwrap_or_default())
    } else if let Some(method) = &record.method_name {
        match type_name {
            Some(type_name) => format!("{}.{}", type_name, method),
            None => method.clone(),
        }
    } else if let Some(function) = &record.function_name {
        function.clone()
    } else if let Some(type_name) = type_name {
        format!("{}.<anonymous>", type_name)
    } else {
        String::new()
    }
}

fn three_digits(line_number: usize) -> String {
    format!("{:03}", line_number)
}
