//! Integration tests for hierlog
//!
//! These tests verify:
//! - Stream routing and level filtering
//! - Settings propagation through logger trees
//! - Masking of keys and patterns, including cyclic values
//! - Error records with code frames read from disk
//! - JSON output
//! - Transports and the `log` bridge

use hierlog::prelude::*;
use hierlog::{CallSiteResolver, Masker, RawCallSite};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct Captured {
    out: Arc<MemoryStream>,
    err: Arc<MemoryStream>,
}

impl Captured {
    fn new() -> Self {
        Self {
            out: Arc::new(MemoryStream::new()),
            err: Arc::new(MemoryStream::new()),
        }
    }

    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides::new()
            .colorize_pretty_logs(false)
            .std_out(self.out.clone())
            .std_err(self.err.clone())
    }
}

#[test]
fn test_levels_route_to_streams() {
    let captured = Captured::new();
    let logger = Logger::with_settings(captured.overrides()).expect("Failed to create logger");

    logger.silly("s");
    logger.debug("d");
    logger.info("i");
    logger.warn("w");
    logger.error("e");
    logger.fatal("f");

    assert_eq!(captured.out.writes().len(), 3);
    assert_eq!(captured.err.writes().len(), 3);
    assert!(captured.err.contents().contains("WARN"));
    assert!(captured.err.contents().contains("FATAL"));
    assert!(!captured.out.contents().contains("ERROR"));
}

#[test]
fn test_min_level_filters_primary_output() {
    let captured = Captured::new();
    let logger = Logger::with_settings(captured.overrides().min_level(LogLevel::Warn))
        .expect("Failed to create logger");

    for level in LogLevel::ALL {
        logger.log(level, level.to_str());
    }

    let written = captured.out.writes().len() + captured.err.writes().len();
    assert_eq!(written, 3);
    assert_eq!(logger.metrics().records_built(), 7);
    assert_eq!(logger.metrics().records_suppressed(), 4);
}

#[test]
fn test_parent_update_reaches_descendants() {
    let root = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true))
        .expect("Failed to create logger");
    let child = root
        .child(SettingsOverrides::new().name("child"))
        .expect("Failed to create child");
    let grandchild = child
        .child(SettingsOverrides::new().prefix(["[gc]"]))
        .expect("Failed to create grandchild");

    root.set_settings(SettingsOverrides::new().min_level(LogLevel::Error))
        .expect("Failed to update settings");

    assert_eq!(child.settings().min_level, LogLevel::Error);
    assert_eq!(grandchild.settings().min_level, LogLevel::Error);
    assert_eq!(grandchild.settings().name.as_deref(), Some("child"));
}

#[test]
fn test_transport_attached_to_parent_reaches_children() {
    let transport = Arc::new(MemoryTransport::new());
    let root = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true))
        .expect("Failed to create logger");
    let child = root
        .child(SettingsOverrides::new().name("worker"))
        .expect("Failed to create child");

    root.attach_transport(transport.clone(), LogLevel::Info);
    child.debug("below transport level");
    child.info("delivered");

    let records = transport.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].logger_name.as_deref(), Some("worker"));
}

#[test]
fn test_transport_min_level_ignores_suppression() {
    let transport = Arc::new(MemoryTransport::new());
    let logger = Logger::builder()
        .suppress_std_output(true)
        .transport(transport.clone(), LogLevel::Error)
        .build()
        .expect("Failed to create logger");

    logger.info("info");
    logger.error("error");
    logger.fatal("fatal");

    let levels: Vec<_> = transport.records().iter().map(|r| r.log_level).collect();
    assert_eq!(levels, vec![LogLevel::Error, LogLevel::Fatal]);
}

#[test]
fn test_password_never_printed() {
    let captured = Captured::new();
    let logger = Logger::with_settings(captured.overrides()).expect("Failed to create logger");

    let credentials = LogValue::object([("user", "ann"), ("password", "secret123")]);
    logger.info(("login", credentials.clone()));

    let printed = captured.out.contents();
    assert!(printed.contains("password: '[***]'"));
    assert!(!printed.contains("secret123"));

    // The logged value itself is untouched
    let original = credentials.as_object().unwrap().get("password").unwrap();
    assert_eq!(original.as_str(), Some("secret123"));
}

#[test]
fn test_custom_mask_keys_and_patterns() {
    let captured = Captured::new();
    let logger = Logger::with_settings(
        captured
            .overrides()
            .mask_values_of_keys(["token"])
            .mask_any_regex([r"\b\d{4}-\d{4}-\d{4}-\d{4}\b"])
            .mask_placeholder("<hidden>"),
    )
    .expect("Failed to create logger");

    logger.info((
        "card 4111-1111-1111-1111 charged",
        LogValue::object([("TOKEN", "abc"), ("password", "kept")]),
    ));

    let printed = captured.out.contents();
    assert!(printed.contains("card <hidden> charged"));
    assert!(printed.contains("TOKEN: '<hidden>'"));
    assert!(printed.contains("password: 'kept'"));
}

#[test]
fn test_self_referencing_value_is_printed() {
    let captured = Captured::new();
    let logger = Logger::with_settings(captured.overrides()).expect("Failed to create logger");

    let node = ObjectRef::new();
    node.insert("name", "loop");
    node.insert("me", node.clone());
    logger.info(LogValue::Object(node.clone()));

    assert!(captured.out.contents().contains("me: [Circular]"));

    let masked = Masker::new(&["password".to_string()], &[], "[***]")
        .unwrap()
        .mask_value(&LogValue::Object(node.clone()));
    let clone = masked.as_object().unwrap();
    assert!(!clone.ptr_eq(&node));

    node.remove("me");
}

#[test]
fn test_error_code_frame_from_source_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("service.rs");
    let text = (1..=10).map(|n| format!("source line {}", n)).collect::<Vec<_>>();
    fs::write(&source, text.join("\n")).expect("Failed to write source");

    let logger = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true))
        .expect("Failed to create logger");
    let error = ErrorValue::new("ServiceError", "unavailable").with_frames(Some(vec![
        RawCallSite::new(source.to_string_lossy(), 4, 3).with_symbol("app::service::start"),
    ]));

    let record = logger.error(("start failed", error));
    let error_record = record.errors().next().expect("error record");
    let frame = error_record.code_frame.as_ref().expect("code frame");

    assert_eq!(frame.relevant_line, "source line 4");
    assert_eq!(frame.lines_before.len(), 3);
    assert_eq!(frame.lines_after.len(), 5);
    assert_eq!(frame.first_line_number, 1);
    assert_eq!(error_record.name, "ServiceError");
}

#[test]
fn test_unreadable_source_leaves_code_frame_out() {
    let logger = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true))
        .expect("Failed to create logger");
    let error = ErrorValue::message("gone").with_frames(Some(vec![RawCallSite::new(
        "/nonexistent/dir/missing.rs",
        1,
        1,
    )]));

    let record = logger.error(error);
    let error_record = record.errors().next().expect("error record");
    assert_eq!(error_record.name, "Error");
    assert!(error_record.code_frame.is_none());
    assert_eq!(error_record.stack.len(), 1);
}

#[test]
fn test_json_mode_error_projection() {
    let captured = Captured::new();
    let logger = Logger::with_settings(captured.overrides().logger_type(LoggerType::Json))
        .expect("Failed to create logger");

    let error = ErrorValue::new("PaymentError", "declined")
        .with_property("password", "pw")
        .with_property("amount", 12);
    logger.error(("charge failed", error));

    let line = captured.err.contents();
    let parsed: serde_json::Value = serde_json::from_str(&line).expect("valid JSON");
    let argument = &parsed["argumentsArray"][1];

    assert!(!line.contains("nativeError"));
    assert!(argument["errorString"]
        .as_str()
        .unwrap()
        .starts_with("PaymentError: declined"));
    assert_eq!(argument["details"]["password"], "[***]");
    assert_eq!(argument["details"]["amount"], 12);
    assert_eq!(parsed["logLevel"], "error");
    assert_eq!(parsed["logLevelId"], 5);
}

#[test]
fn test_json_error_string_lists_only_user_frames() {
    let captured = Captured::new();
    let logger = Logger::with_settings(captured.overrides().logger_type(LoggerType::Json))
        .expect("Failed to create logger");

    let record = logger.error(ErrorValue::new("DbError", "timeout"));
    let error_record = record.errors().next().expect("error record");

    let parsed: serde_json::Value =
        serde_json::from_str(&captured.err.contents()).expect("valid JSON");
    let error_string = parsed["argumentsArray"][0]["errorString"]
        .as_str()
        .expect("errorString");

    assert!(error_string.starts_with("DbError: timeout"));
    for internal in ["call_site.rs", "error_record.rs", "/rustc/"] {
        assert!(
            !error_string.contains(internal),
            "internal frame {} in {}",
            internal,
            error_string
        );
    }
    assert_eq!(
        error_string.matches("\n    at ").count(),
        error_record.stack.len()
    );
}

#[test]
fn test_error_string_honours_stack_offset_and_limit() {
    let logger = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true))
        .expect("Failed to create logger");
    let error = ErrorValue::new("DbError", "timeout").with_frames(Some(vec![
        RawCallSite::new("/srv/app/src/db.rs", 2, 3).with_symbol("app::db::query"),
        RawCallSite::new("/srv/app/src/jobs.rs", 8, 1).with_symbol("app::jobs::run"),
        RawCallSite::new("/srv/app/src/main.rs", 9, 1).with_symbol("app::main"),
    ]));
    let quiet = || PrettyErrorOptions {
        print: false,
        expose_code_frame: false,
        ..PrettyErrorOptions::default()
    };

    let limited = logger.pretty_error(
        &error,
        PrettyErrorOptions {
            stack_limit: Some(1),
            ..quiet()
        },
    );
    assert_eq!(limited.stack.len(), 1);
    assert!(limited.error_string.contains("\n    at query ("));
    assert!(limited.error_string.ends_with("src/db.rs:2:3)"));
    assert_eq!(limited.error_string.matches("\n    at ").count(), 1);

    let offset = logger.pretty_error(
        &error,
        PrettyErrorOptions {
            stack_offset: 2,
            ..quiet()
        },
    );
    assert_eq!(offset.stack.len(), 1);
    assert!(offset.error_string.contains("\n    at main ("));
    assert!(offset.error_string.ends_with("src/main.rs:9:1)"));
    assert!(!offset.error_string.contains("query"));
}

#[test]
fn test_std_error_is_converted() {
    let logger = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true))
        .expect("Failed to create logger");
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");

    let record = logger.warn(ErrorValue::from_error(&io_error));
    let error_record = record.errors().next().expect("error record");
    assert_eq!(error_record.name, "Error");
    assert_eq!(error_record.message, "config.toml");
}

#[test]
fn test_settings_from_json_document() {
    let overrides = SettingsOverrides::from_json(
        r#"{
            "type": "json",
            "name": "from-file",
            "minLevel": "info",
            "maskValuesOfKeys": ["apiKey"]
        }"#,
    )
    .expect("Failed to parse settings");

    let captured = Captured::new();
    let logger = Logger::with_settings(captured.overrides())
        .expect("Failed to create logger")
        .child(overrides)
        .expect("Failed to create child");

    logger.debug("filtered");
    logger.info(LogValue::object([("apiKey", "k-1")]));

    let parsed: serde_json::Value =
        serde_json::from_str(&captured.out.contents()).expect("valid JSON");
    assert_eq!(parsed["loggerName"], "from-file");
    assert_eq!(parsed["argumentsArray"][0], "{ apiKey: '[***]' }");
}

#[test]
fn test_channel_transport_across_threads() {
    let (transport, receiver) = ChannelTransport::unbounded();
    let logger = Logger::builder()
        .suppress_std_output(true)
        .transport(Arc::new(transport), LogLevel::Silly)
        .build()
        .expect("Failed to create logger");

    let consumer = std::thread::spawn(move || receiver.iter().take(3).count());
    for i in 0..3 {
        logger.info(("message", i));
    }

    assert_eq!(consumer.join().expect("consumer panicked"), 3);
}

#[test]
fn test_path_relativization() {
    let resolver = CallSiteResolver::with_cwd("/a/b");
    assert_eq!(resolver.clean_file_path("/a/b/c/d.rs"), "c/d.rs");

    let frame = resolver.to_frame(&RawCallSite::new("file:///a/b/src/lib.rs", 1, 1));
    assert_eq!(frame.file_path, "src/lib.rs");
    assert_eq!(frame.full_file_path, "/a/b/src/lib.rs");
    assert_eq!(frame.file_name, "lib.rs");
}

#[cfg(feature = "console-bridge")]
#[test]
fn test_log_facade_bridge() {
    let transport = Arc::new(MemoryTransport::new());
    let logger = Logger::builder()
        .suppress_std_output(true)
        .transport(transport.clone(), LogLevel::Silly)
        .settings(SettingsOverrides::new().overwrite_console(true))
        .build()
        .expect("Failed to create logger");
    assert!(hierlog::console::installed().is_some_and(|current| current.ptr_eq(&logger)));

    log::warn!("disk at {}%", 91);
    log::trace!("fine grained");

    logger
        .set_settings(SettingsOverrides::new().overwrite_console(false))
        .expect("Failed to update settings");
    log::error!("not routed");

    let records = transport.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].log_level, LogLevel::Warn);
    assert_eq!(records[0].message(), "disk at 91%");
    assert_eq!(records[1].log_level, LogLevel::Trace);
    assert!(hierlog::console::installed().is_none());
}
