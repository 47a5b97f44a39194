//! Error reporting example
//!
//! Demonstrates logged errors with details, stacks and code frames, and
//! standalone error reports with `pretty_error`.
//!
//! Run with: cargo run --example error_reporting

use hierlog::prelude::*;
use std::fs;

#[derive(Debug)]
struct ConfigError {
    path: String,
    source: std::io::Error,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot load {}", self.path)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

fn load_config(path: &str) -> std::result::Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError {
        path: path.to_string(),
        source,
    })
}

fn main() -> Result<()> {
    println!("=== hierlog - Error Reporting Example ===\n");

    let logger = Logger::with_settings(
        SettingsOverrides::new()
            .name("errors")
            .expose_error_code_frame_lines_before_and_after(3),
    )?;

    println!("1. Logging an error with details:");
    let declined = ErrorValue::new("PaymentError", "card declined")
        .with_property("orderId", 1042)
        .with_property("password", "never printed");
    logger.error(("checkout failed", declined.clone()));

    println!("\n2. Logging a std::error::Error:");
    if let Err(e) = load_config("/nonexistent/app.toml") {
        logger.warn(("falling back to defaults", ErrorValue::from_error(&e)));
    }

    println!("\n3. A standalone report without the log line:");
    let report = logger.pretty_error(
        &declined,
        PrettyErrorOptions {
            expose_code_frame: false,
            stack_limit: Some(3),
            ..PrettyErrorOptions::default()
        },
    );
    println!("   report for {} with {} frames", report.name, report.stack.len());

    println!("\n4. The same error in JSON:");
    logger.set_settings(SettingsOverrides::new().logger_type(LoggerType::Json))?;
    logger.error(declined);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
