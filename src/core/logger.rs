//! Main logger implementation
//!
//! A [`Logger`] is a cheap handle to one node of a logger tree. Each node keeps
//! the overrides it was given and the effective settings of its parent (or the
//! defaults for a root); its own effective settings are the two merged. A
//! settings change on a node is pushed down to every live descendant before
//! the call returns.

use super::{
    call_site::{BacktraceCapture, CallSiteResolver, StackCapture},
    code_frame::{FsSourceReader, SourceReader},
    error::Result,
    error_record::{ErrorRecord, ErrorRecordOptions, ErrorValue},
    log_level::LogLevel,
    log_record::{CallerLocation, IntoLogArgs, LogRecord},
    log_value::LogValue,
    masking::Masker,
    metrics::LoggerMetrics,
    output::OutputStream,
    record_builder::RecordBuilder,
    settings::{LoggerSettings, LoggerType, SettingsOverrides},
    transport::{deliver, panic_message, AttachedTransport, Transport},
};
use crate::render::{JsonRenderer, PrettyRenderer};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

/// Collaborators shared by every node of one tree
#[derive(Clone)]
struct Collaborators {
    capture: Arc<dyn StackCapture>,
    reader: Arc<dyn SourceReader>,
    resolver: Arc<CallSiteResolver>,
    metrics: Arc<LoggerMetrics>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            capture: Arc::new(BacktraceCapture),
            reader: Arc::new(FsSourceReader),
            resolver: Arc::new(CallSiteResolver::new()),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }
}

struct NodeState {
    own: SettingsOverrides,
    parent_or_default: LoggerSettings,
    /// `parent_or_default` merged with `own`, rebuilt on every change
    effective: Arc<LoggerSettings>,
    masker: Arc<Masker>,
    children: Vec<Weak<LoggerNode>>,
}

struct LoggerNode {
    state: RwLock<NodeState>,
    /// Held from a recompute until its result reached every child, so pushes
    /// arrive in the order they were computed. Taken parent before child.
    cascade: Mutex<()>,
    tools: Collaborators,
}

fn masker_for(settings: &LoggerSettings) -> Result<Masker> {
    Masker::new(
        &settings.mask_values_of_keys,
        &settings.mask_any_regex,
        &settings.mask_placeholder,
    )
}

/// Handle to one logger node
///
/// Cloning the handle does not create a new logger; use [`Logger::child`].
///
/// # Example
///
/// ```
/// use hierlog::{LogLevel, Logger, MemoryStream, SettingsOverrides};
/// use std::sync::Arc;
///
/// let out = Arc::new(MemoryStream::new());
/// let logger = Logger::with_settings(
///     SettingsOverrides::new()
///         .name("api")
///         .colorize_pretty_logs(false)
///         .std_streams(out.clone()),
/// )
/// .unwrap();
///
/// logger.info(("user signed in", 42));
/// assert!(out.contents().contains("user signed in 42"));
/// ```
#[derive(Clone)]
pub struct Logger {
    node: Arc<LoggerNode>,
}

impl Logger {
    /// Root logger with default settings
    #[must_use]
    pub fn new() -> Self {
        let tools = Collaborators::default();
        let settings = LoggerSettings::default();
        let masker = masker_for(&settings).unwrap_or_default();
        Self::from_node(SettingsOverrides::new(), settings, masker, tools)
    }

    /// Root logger with `overrides` laid over the defaults
    ///
    /// # Errors
    ///
    /// Returns an error when a mask pattern does not compile.
    pub fn with_settings(overrides: SettingsOverrides) -> Result<Self> {
        Self::create(overrides, LoggerSettings::default(), Collaborators::default())
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use hierlog::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Debug)
    ///     .name("worker")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(logger.settings().name.as_deref(), Some("worker"));
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    fn create(
        mut own: SettingsOverrides,
        parent_or_default: LoggerSettings,
        tools: Collaborators,
    ) -> Result<Self> {
        let provisional = parent_or_default.merged(&own);
        if own.set_caller_as_logger_name == Some(true) && own.name.is_none() {
            let builder = RecordBuilder {
                settings: &provisional,
                capture: tools.capture.as_ref(),
                resolver: &tools.resolver,
                reader: tools.reader.as_ref(),
            };
            own.name = builder.caller_name();
        }

        let effective = parent_or_default.merged(&own);
        let masker = masker_for(&effective)?;
        let manages_console = own.overwrite_console.is_some();
        let logger = Self::from_node(own, parent_or_default, masker, tools);
        if manages_console {
            logger.sync_console(&logger.settings());
        }
        Ok(logger)
    }

    fn from_node(
        own: SettingsOverrides,
        parent_or_default: LoggerSettings,
        masker: Masker,
        tools: Collaborators,
    ) -> Self {
        let effective = Arc::new(parent_or_default.merged(&own));
        let state = NodeState {
            own,
            parent_or_default,
            effective,
            masker: Arc::new(masker),
            children: Vec::new(),
        };
        Self {
            node: Arc::new(LoggerNode {
                state: RwLock::new(state),
                cascade: Mutex::new(()),
                tools,
            }),
        }
    }

    /// Effective settings of this node
    pub fn settings(&self) -> LoggerSettings {
        (*self.node.state.read().effective).clone()
    }

    /// The overrides this node sets itself
    pub fn own_settings(&self) -> SettingsOverrides {
        self.node.state.read().own.clone()
    }

    /// Lay `overrides` over this node's own overrides and push the new
    /// effective settings to every descendant.
    ///
    /// # Errors
    ///
    /// Returns an error when a mask pattern does not compile; nothing changes
    /// in that case.
    pub fn set_settings(&self, overrides: SettingsOverrides) -> Result<LoggerSettings> {
        let manages_console = overrides.overwrite_console.is_some();
        let _cascade = self.node.cascade.lock();
        let (effective, children) = {
            let mut state = self.node.state.write();
            let mut own = state.own.clone();
            own.merge(overrides);
            let effective = state.parent_or_default.merged(&own);
            let masker = masker_for(&effective)?;

            state.own = own;
            state.effective = Arc::new(effective);
            state.masker = Arc::new(masker);
            (Arc::clone(&state.effective), Self::live_children(&mut state))
        };

        if manages_console {
            self.sync_console(&effective);
        }
        for child in &children {
            child.inherit(&effective);
        }
        Ok((*effective).clone())
    }

    /// Take `parent` as the new inherited settings and pass the result on
    fn inherit(&self, parent: &LoggerSettings) {
        let _cascade = self.node.cascade.lock();
        let (effective, children) = {
            let mut state = self.node.state.write();
            state.parent_or_default = parent.clone();
            let effective = state.parent_or_default.merged(&state.own);
            match masker_for(&effective) {
                Ok(masker) => state.masker = Arc::new(masker),
                Err(e) => eprintln!(
                    "[LOGGER ERROR] Inherited masking rules rejected, keeping previous ones: {}",
                    e
                ),
            }
            state.effective = Arc::new(effective);
            (Arc::clone(&state.effective), Self::live_children(&mut state))
        };

        for child in &children {
            child.inherit(&effective);
        }
    }

    fn live_children(state: &mut NodeState) -> Vec<Logger> {
        state.children.retain(|child| child.strong_count() > 0);
        state
            .children
            .iter()
            .filter_map(Weak::upgrade)
            .map(|node| Logger { node })
            .collect()
    }

    /// New logger whose inherited settings are this node's current effective
    /// settings. Future changes to this node reach the child while the child
    /// is alive.
    ///
    /// # Errors
    ///
    /// Returns an error when a mask pattern in `overrides` does not compile.
    pub fn child(&self, overrides: SettingsOverrides) -> Result<Logger> {
        let inherited = Arc::clone(&self.node.state.read().effective);
        let child = Self::create(overrides, (*inherited).clone(), self.node.tools.clone())?;
        let _cascade = self.node.cascade.lock();
        let current = {
            let mut state = self.node.state.write();
            state.children.retain(|existing| existing.strong_count() > 0);
            state.children.push(Arc::downgrade(&child.node));
            Arc::clone(&state.effective)
        };
        // Settings changed while the child was being created
        if !Arc::ptr_eq(&inherited, &current) {
            child.inherit(&current);
        }
        Ok(child)
    }

    /// Live children of this node, oldest first
    pub fn children(&self) -> Vec<Logger> {
        Self::live_children(&mut self.node.state.write())
    }

    /// Forward every record of at least `min_level` to `transport`.
    /// Children inherit the transport.
    pub fn attach_transport(&self, transport: Arc<dyn Transport>, min_level: LogLevel) {
        let overrides =
            SettingsOverrides::new().attach_transport(AttachedTransport::new(transport, min_level));
        if let Err(e) = self.set_settings(overrides) {
            eprintln!("[LOGGER ERROR] Failed to attach transport: {}", e);
        }
    }

    /// Whether both handles point at the same node
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Health counters, shared with every logger of this tree
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.node.tools.metrics
    }

    #[cfg(feature = "console-bridge")]
    fn sync_console(&self, settings: &LoggerSettings) {
        if settings.overwrite_console {
            if let Err(e) = super::console::install(self) {
                eprintln!("[LOGGER ERROR] {}", e);
            }
        } else {
            super::console::uninstall_for(self);
        }
    }

    #[cfg(not(feature = "console-bridge"))]
    fn sync_console(&self, settings: &LoggerSettings) {
        if settings.overwrite_console {
            eprintln!("[LOGGER ERROR] overwriteConsole needs the console-bridge feature");
        }
    }

    fn snapshot(&self) -> (Arc<LoggerSettings>, Arc<Masker>) {
        let state = self.node.state.read();
        (Arc::clone(&state.effective), Arc::clone(&state.masker))
    }

    fn record_builder<'a>(&'a self, settings: &'a LoggerSettings) -> RecordBuilder<'a> {
        let tools = &self.node.tools;
        RecordBuilder {
            settings,
            capture: tools.capture.as_ref(),
            resolver: &tools.resolver,
            reader: tools.reader.as_ref(),
        }
    }

    /// Build, print and forward one record
    pub(crate) fn dispatch(
        &self,
        level: LogLevel,
        arguments: Vec<LogValue>,
        caller: CallerLocation,
    ) -> LogRecord {
        let (settings, masker) = self.snapshot();
        let expose_stack = settings.expose_stack || level == LogLevel::Trace;
        let record =
            self.record_builder(&settings)
                .build_record(level, arguments, expose_stack, &caller);
        self.metrics().record_built();

        self.print(&settings, &masker, &record);
        self.forward(&settings, &record);
        record
    }

    fn print(&self, settings: &LoggerSettings, masker: &Masker, record: &LogRecord) {
        let metrics = self.metrics();
        if settings.suppress_std_output || !record.log_level.meets(settings.min_level) {
            metrics.record_suppressed();
            return;
        }

        let rendered = match settings.logger_type {
            LoggerType::Pretty => Ok(PrettyRenderer::new(settings, masker).render(record)),
            LoggerType::Json => JsonRenderer::new(masker).render(record),
            LoggerType::Hidden => {
                metrics.record_suppressed();
                return;
            }
        };

        let stream = settings.stream_for(record.log_level);
        match rendered.and_then(|text| stream.write(&text)) {
            Ok(()) => {
                metrics.record_written();
            }
            Err(e) => {
                metrics.record_write_failure();
                eprintln!("[LOGGER ERROR] Writing to {} failed: {}", stream.name(), e);
            }
        }
    }

    /// Hand the record to every transport that accepts its level.
    ///
    /// Each transport is isolated with `catch_unwind`: one that fails or
    /// panics does not keep the record from the others.
    fn forward(&self, settings: &LoggerSettings, record: &LogRecord) {
        let metrics = self.metrics();
        for attached in settings
            .attached_transports
            .iter()
            .filter(|attached| attached.accepts(record.log_level))
        {
            let transport = attached.transport.as_ref();
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                deliver(transport, record)
            }));

            match result {
                Ok(Ok(())) => {
                    metrics.record_transport_delivery();
                }
                Ok(Err(e)) => {
                    metrics.record_transport_failure();
                    eprintln!("[LOGGER ERROR] Transport '{}' failed: {}", transport.name(), e);
                }
                Err(panic_info) => {
                    metrics.record_transport_failure();
                    eprintln!(
                        "[LOGGER CRITICAL] Transport '{}' panicked: {}. \
                         Other transports continue to function.",
                        transport.name(),
                        panic_message(panic_info.as_ref())
                    );
                }
            }
        }
    }

    /// Log at `level`
    #[track_caller]
    pub fn log(&self, level: LogLevel, args: impl IntoLogArgs) -> LogRecord {
        self.dispatch(level, args.into_log_args(), CallerLocation::caller())
    }

    #[track_caller]
    pub fn silly(&self, args: impl IntoLogArgs) -> LogRecord {
        self.dispatch(LogLevel::Silly, args.into_log_args(), CallerLocation::caller())
    }

    /// Log at trace level; the record always carries the call stack
    #[track_caller]
    pub fn trace(&self, args: impl IntoLogArgs) -> LogRecord {
        self.dispatch(LogLevel::Trace, args.into_log_args(), CallerLocation::caller())
    }

    #[track_caller]
    pub fn debug(&self, args: impl IntoLogArgs) -> LogRecord {
        self.dispatch(LogLevel::Debug, args.into_log_args(), CallerLocation::caller())
    }

    #[track_caller]
    pub fn info(&self, args: impl IntoLogArgs) -> LogRecord {
        self.dispatch(LogLevel::Info, args.into_log_args(), CallerLocation::caller())
    }

    #[track_caller]
    pub fn warn(&self, args: impl IntoLogArgs) -> LogRecord {
        self.dispatch(LogLevel::Warn, args.into_log_args(), CallerLocation::caller())
    }

    #[track_caller]
    pub fn error(&self, args: impl IntoLogArgs) -> LogRecord {
        self.dispatch(LogLevel::Error, args.into_log_args(), CallerLocation::caller())
    }

    #[track_caller]
    pub fn fatal(&self, args: impl IntoLogArgs) -> LogRecord {
        self.dispatch(LogLevel::Fatal, args.into_log_args(), CallerLocation::caller())
    }

    /// Normalize `error` and, unless `options.print` is off, print it in the
    /// pretty layout without logging a record.
    ///
    /// # Example
    ///
    /// ```
    /// use hierlog::{ErrorValue, Logger, PrettyErrorOptions};
    ///
    /// let logger = Logger::new();
    /// let error = ErrorValue::new("ConfigError", "missing key").with_property("key", "port");
    /// let record = logger.pretty_error(&error, PrettyErrorOptions { print: false, ..Default::default() });
    ///
    /// assert_eq!(record.name, "ConfigError");
    /// assert_eq!(record.details.get("key").unwrap().as_str(), Some("port"));
    /// ```
    pub fn pretty_error(&self, error: &ErrorValue, options: PrettyErrorOptions) -> ErrorRecord {
        let (settings, masker) = self.snapshot();
        let record_options = ErrorRecordOptions {
            expose_code_frame: options.expose_code_frame,
            code_frame_lines: settings.expose_error_code_frame_lines_before_and_after,
            stack_offset: options.stack_offset,
            stack_limit: options.stack_limit,
        };
        let record = self
            .record_builder(&settings)
            .build_error_record(error, &record_options);

        if options.print {
            let mut text =
                PrettyRenderer::new(&settings, &masker).render_error(&record, options.expose_stack);
            text.push('\n');
            let stream = options.std.unwrap_or_else(|| Arc::clone(&settings.std_err));
            if let Err(e) = stream.write(&text) {
                self.metrics().record_write_failure();
                eprintln!("[LOGGER ERROR] Writing to {} failed: {}", stream.name(), e);
            }
        }
        record
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.node.state.read();
        f.debug_struct("Logger")
            .field("name", &state.effective.name)
            .field("min_level", &state.effective.min_level)
            .field("children", &state.children.len())
            .finish_non_exhaustive()
    }
}

/// Options for [`Logger::pretty_error`]
#[derive(Clone)]
pub struct PrettyErrorOptions {
    /// Write the rendered error; when off the record is only returned
    pub print: bool,
    pub expose_code_frame: bool,
    pub expose_stack: bool,
    /// Frames to skip from the top; negative values count as 0
    pub stack_offset: i64,
    /// Frames to keep; `None` keeps all, negative values count as 0
    pub stack_limit: Option<i64>,
    /// Target stream; the logger's error stream when unset
    pub std: Option<Arc<dyn OutputStream>>,
}

impl Default for PrettyErrorOptions {
    fn default() -> Self {
        Self {
            print: true,
            expose_code_frame: true,
            expose_stack: true,
            stack_offset: 0,
            stack_limit: None,
            std: None,
        }
    }
}

impl fmt::Debug for PrettyErrorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrettyErrorOptions")
            .field("print", &self.print)
            .field("expose_code_frame", &self.expose_code_frame)
            .field("expose_stack", &self.expose_stack)
            .field("stack_offset", &self.stack_offset)
            .field("stack_limit", &self.stack_limit)
            .field("std", &self.std.as_ref().map(|stream| stream.name().to_string()))
            .finish()
    }
}

/// Builder for a root [`Logger`]
///
/// Besides settings, the builder chooses the collaborators the logger tree
/// uses: how stacks are captured, how source files are read and which
/// directory paths are made relative to.
///
/// # Example
/// ```
/// use hierlog::prelude::*;
/// use std::sync::Arc;
///
/// let transport = Arc::new(MemoryTransport::new());
/// let logger = Logger::builder()
///     .logger_type(LoggerType::Json)
///     .min_level(LogLevel::Info)
///     .suppress_std_output(true)
///     .transport(transport.clone(), LogLevel::Error)
///     .working_dir("/srv/app")
///     .build()
///     .unwrap();
///
/// logger.error("disk full");
/// assert_eq!(transport.len(), 1);
/// ```
pub struct LoggerBuilder {
    overrides: SettingsOverrides,
    capture: Option<Arc<dyn StackCapture>>,
    reader: Option<Arc<dyn SourceReader>>,
    working_dir: Option<PathBuf>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            overrides: SettingsOverrides::new(),
            capture: None,
            reader: None,
            working_dir: None,
        }
    }

    /// Lay `overrides` over everything set so far
    #[must_use = "builder methods return a new value"]
    pub fn settings(mut self, overrides: SettingsOverrides) -> Self {
        self.overrides.merge(overrides);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.overrides.min_level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn logger_type(mut self, logger_type: LoggerType) -> Self {
        self.overrides.logger_type = Some(logger_type);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.overrides.name = Some(name.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn suppress_std_output(mut self, suppress: bool) -> Self {
        self.overrides.suppress_std_output = Some(suppress);
        self
    }

    /// Send both output streams to `stream`
    #[must_use = "builder methods return a new value"]
    pub fn std_streams(mut self, stream: Arc<dyn OutputStream>) -> Self {
        self.overrides.std_out = Some(Arc::clone(&stream));
        self.overrides.std_err = Some(stream);
        self
    }

    /// Attach a transport receiving records of at least `min_level`
    #[must_use = "builder methods return a new value"]
    pub fn transport(mut self, transport: Arc<dyn Transport>, min_level: LogLevel) -> Self {
        self.overrides
            .attached_transports
            .push(AttachedTransport::new(transport, min_level));
        self
    }

    /// Replace the stack capture (defaults to [`BacktraceCapture`])
    #[must_use = "builder methods return a new value"]
    pub fn stack_capture(mut self, capture: Arc<dyn StackCapture>) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Replace the source reader used for code frames (defaults to [`FsSourceReader`])
    #[must_use = "builder methods return a new value"]
    pub fn source_reader(mut self, reader: Arc<dyn SourceReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Directory file paths are made relative to (defaults to the process
    /// working directory)
    #[must_use = "builder methods return a new value"]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Build the Logger
    ///
    /// # Errors
    ///
    /// Returns an error when a mask pattern does not compile.
    pub fn build(self) -> Result<Logger> {
        let defaults = Collaborators::default();
        let tools = Collaborators {
            capture: self.capture.unwrap_or(defaults.capture),
            reader: self.reader.unwrap_or(defaults.reader),
            resolver: match self.working_dir {
                Some(dir) => Arc::new(CallSiteResolver::with_cwd(dir)),
                None => defaults.resolver,
            },
            metrics: defaults.metrics,
        };
        Logger::create(self.overrides, LoggerSettings::default(), tools)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::call_site::RawCallSite;
    use crate::core::output::MemoryStream;
    use crate::core::record_builder::tests::{FixedStack, MapReader};
    use crate::core::settings::RequestId;
    use crate::transports::MemoryTransport;
    use std::collections::HashMap;

    struct Quiet {
        out: Arc<MemoryStream>,
        err: Arc<MemoryStream>,
    }

    impl Quiet {
        fn new() -> Self {
            Self {
                out: Arc::new(MemoryStream::new()),
                err: Arc::new(MemoryStream::new()),
            }
        }

        fn overrides(&self) -> SettingsOverrides {
            SettingsOverrides::new()
                .colorize_pretty_logs(false)
                .display_date_time(false)
                .std_out(self.out.clone())
                .std_err(self.err.clone())
        }
    }

    #[test]
    fn test_streams_follow_level_rank() {
        let quiet = Quiet::new();
        let logger = Logger::with_settings(quiet.overrides()).unwrap();

        logger.debug("to stdout");
        logger.warn("to stderr");

        assert!(quiet.out.contents().contains("to stdout"));
        assert!(quiet.err.contents().contains("to stderr"));
        assert!(!quiet.out.contents().contains("to stderr"));
        assert_eq!(logger.metrics().records_written(), 2);
    }

    #[test]
    fn test_min_level_filters_output_but_not_transports() {
        let quiet = Quiet::new();
        let transport = Arc::new(MemoryTransport::new());
        let logger =
            Logger::with_settings(quiet.overrides().min_level(LogLevel::Error)).unwrap();
        logger.attach_transport(transport.clone(), LogLevel::Silly);

        let record = logger.info("quiet");

        assert_eq!(record.log_level_id, 3);
        assert!(quiet.out.contents().is_empty());
        assert_eq!(transport.len(), 1);
        assert_eq!(logger.metrics().records_suppressed(), 1);
    }

    #[test]
    fn test_children_follow_parent_updates() {
        let quiet = Quiet::new();
        let parent = Logger::with_settings(quiet.overrides().prefix(["[app]"])).unwrap();
        let child = parent.child(SettingsOverrides::new().prefix(["[db]"])).unwrap();
        let grandchild = child.child(SettingsOverrides::new().name("pool")).unwrap();

        parent
            .set_settings(SettingsOverrides::new().min_level(LogLevel::Error))
            .unwrap();

        assert_eq!(child.settings().min_level, LogLevel::Error);
        assert_eq!(grandchild.settings().min_level, LogLevel::Error);

        let record = grandchild.fatal("down");
        assert_eq!(record.message(), "[app] [db] down");
        assert_eq!(record.logger_name.as_deref(), Some("pool"));
    }

    #[test]
    fn test_child_override_survives_parent_update() {
        let parent = Logger::with_settings(Quiet::new().overrides()).unwrap();
        let child = parent
            .child(SettingsOverrides::new().min_level(LogLevel::Debug))
            .unwrap();

        parent
            .set_settings(SettingsOverrides::new().min_level(LogLevel::Fatal).name("root"))
            .unwrap();

        let settings = child.settings();
        assert_eq!(settings.min_level, LogLevel::Debug);
        assert_eq!(settings.name.as_deref(), Some("root"));
    }

    #[test]
    fn test_dropped_children_are_forgotten() {
        let parent = Logger::new();
        let kept = parent.child(SettingsOverrides::new()).unwrap();
        drop(parent.child(SettingsOverrides::new()).unwrap());

        let children = parent.children();
        assert_eq!(children.len(), 1);
        assert!(children[0].ptr_eq(&kept));
    }

    #[test]
    fn test_invalid_mask_pattern_keeps_previous_settings() {
        let logger = Logger::with_settings(SettingsOverrides::new().min_level(LogLevel::Info)).unwrap();
        let result = logger.set_settings(
            SettingsOverrides::new()
                .min_level(LogLevel::Fatal)
                .mask_any_regex(["(unclosed"]),
        );

        assert!(result.is_err());
        assert_eq!(logger.settings().min_level, LogLevel::Info);
        assert!(Logger::with_settings(SettingsOverrides::new().mask_any_regex(["["])).is_err());
    }

    #[test]
    fn test_hidden_and_suppressed_still_forward() {
        let quiet = Quiet::new();
        let transport = Arc::new(MemoryTransport::new());
        let logger = Logger::with_settings(quiet.overrides().logger_type(LoggerType::Hidden)).unwrap();
        logger.attach_transport(transport.clone(), LogLevel::Error);

        logger.info("not forwarded");
        logger.error("forwarded");
        logger
            .set_settings(
                SettingsOverrides::new()
                    .logger_type(LoggerType::Pretty)
                    .suppress_std_output(true),
            )
            .unwrap();
        logger.fatal("forwarded too");

        assert!(quiet.out.contents().is_empty());
        assert!(quiet.err.contents().is_empty());
        let levels: Vec<_> = transport.records().iter().map(|r| r.log_level).collect();
        assert_eq!(levels, vec![LogLevel::Error, LogLevel::Fatal]);
    }

    struct Failing;

    impl Transport for Failing {
        fn log(&self, _record: &LogRecord) -> Result<()> {
            Err(crate::core::error::LoggerError::transport("failing", "offline"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct Panicking;

    impl Transport for Panicking {
        fn log(&self, _record: &LogRecord) -> Result<()> {
            panic!("transport exploded");
        }
    }

    #[test]
    fn test_failing_transports_are_isolated() {
        let transport = Arc::new(MemoryTransport::new());
        let logger = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true)).unwrap();
        logger.attach_transport(Arc::new(Panicking), LogLevel::Silly);
        logger.attach_transport(Arc::new(Failing), LogLevel::Silly);
        logger.attach_transport(transport.clone(), LogLevel::Silly);

        logger.info("still delivered");

        assert_eq!(transport.len(), 1);
        assert_eq!(logger.metrics().transport_failures(), 2);
        assert_eq!(logger.metrics().transport_deliveries(), 1);
    }

    #[test]
    fn test_json_output() {
        let quiet = Quiet::new();
        let logger = Logger::with_settings(
            quiet
                .overrides()
                .logger_type(LoggerType::Json)
                .request_id(RequestId::from("req-9")),
        )
        .unwrap();

        logger.info(("paid", LogValue::object([("password", "pw")])));

        let parsed: serde_json::Value = serde_json::from_str(&quiet.out.contents()).unwrap();
        assert_eq!(parsed["requestId"], "req-9");
        assert_eq!(parsed["argumentsArray"][0], "paid");
        assert_eq!(parsed["argumentsArray"][1], "{ password: '[***]' }");
    }

    #[test]
    fn test_trace_always_exposes_stack() {
        let logger = Logger::with_settings(Quiet::new().overrides()).unwrap();
        assert!(logger.trace("t").stack.is_some());
        assert!(logger.debug("d").stack.is_none());
    }

    #[test]
    fn test_caller_location_falls_back_to_call_site() {
        let logger = Logger::with_settings(Quiet::new().overrides()).unwrap();
        let line = line!() + 1;
        let record = logger.info("here");

        assert_eq!(record.line_number, Some(line));
        assert_eq!(record.file_name.as_deref(), Some("logger.rs"));
    }

    fn app_frames() -> Vec<RawCallSite> {
        vec![
            RawCallSite::new("/srv/app/src/jobs.rs", 2, 5).with_symbol("app::jobs::Worker::run"),
            RawCallSite::new("/srv/app/src/main.rs", 9, 1).with_symbol("app::main"),
        ]
    }

    #[test]
    fn test_builder_collaborators_and_caller_name() {
        let quiet = Quiet::new();
        let logger = Logger::builder()
            .settings(quiet.overrides().set_caller_as_logger_name(true))
            .stack_capture(Arc::new(FixedStack(Some(app_frames()))))
            .working_dir("/srv/app")
            .build()
            .unwrap();

        assert_eq!(logger.settings().name.as_deref(), Some("Worker"));

        let record = logger.warn("slow");
        assert_eq!(record.file_path.as_deref(), Some("src/jobs.rs"));
        assert!(quiet.err.contents().contains("[Worker src/jobs.rs:2 Worker.run] slow"));
    }

    #[test]
    fn test_caller_name_applies_to_the_flagged_node_only() {
        let quiet = Quiet::new();
        let root = Logger::builder()
            .settings(quiet.overrides().name("root").set_caller_as_logger_name(true))
            .stack_capture(Arc::new(FixedStack(Some(app_frames()))))
            .working_dir("/srv/app")
            .build()
            .unwrap();
        assert_eq!(root.settings().name.as_deref(), Some("root"));

        let child = root.child(SettingsOverrides::new()).unwrap();
        assert!(child.settings().set_caller_as_logger_name);
        assert_eq!(child.settings().name.as_deref(), Some("root"));
        assert_eq!(child.own_settings().name, None);

        let flagged = root
            .child(SettingsOverrides::new().set_caller_as_logger_name(true))
            .unwrap();
        assert_eq!(flagged.settings().name.as_deref(), Some("Worker"));
    }

    #[test]
    fn test_pretty_error_prints_code_frame() {
        let quiet = Quiet::new();
        let source = "fn run() {\n    fail()\n}\n".to_string();
        let logger = Logger::builder()
            .settings(quiet.overrides())
            .source_reader(Arc::new(MapReader(HashMap::from([(
                "/srv/app/src/jobs.rs".to_string(),
                source,
            )]))))
            .working_dir("/srv/app")
            .build()
            .unwrap();

        let error = ErrorValue::new("JobError", "failed").with_frames(Some(app_frames()));
        let record = logger.pretty_error(&error, PrettyErrorOptions::default());

        let frame = record.code_frame.expect("code frame");
        assert_eq!(frame.relevant_line, "    fail()");
        assert_eq!(record.stack.len(), 2);

        let printed = quiet.err.contents();
        assert!(printed.contains(" JobError  failed"));
        assert!(printed.contains("> 002 |     fail()"));
        assert!(printed.contains("error stack:"));

        let limited = logger.pretty_error(
            &error,
            PrettyErrorOptions {
                print: false,
                stack_offset: 1,
                stack_limit: Some(5),
                ..Default::default()
            },
        );
        assert_eq!(limited.stack.len(), 1);
        assert_eq!(limited.stack[0].file_name, "main.rs");
    }
}
