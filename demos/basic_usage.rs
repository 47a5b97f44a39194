//! Basic logger usage example
//!
//! Demonstrates the pretty and JSON layouts, level filtering and masking.
//!
//! Run with: cargo run --example basic_usage

use hierlog::prelude::*;
use hierlog::{info, warn};

fn main() -> Result<()> {
    println!("=== hierlog - Basic Usage Example ===\n");

    let logger = Logger::with_settings(SettingsOverrides::new().name("basic"))?;

    println!("1. Logging at different levels:");
    logger.silly("This is a silly message");
    logger.trace("This is a trace message, it carries the call stack");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("\n2. Several arguments and structured values:");
    info!(logger, "listening on port", 8080);
    warn!(
        logger,
        "slow request",
        LogValue::object([("path", LogValue::from("/orders")), ("ms", LogValue::from(1200))])
    );

    println!("\n3. Minimum level set to INFO - silly, trace and debug won't show:");
    logger.set_settings(SettingsOverrides::new().min_level(LogLevel::Info))?;
    logger.debug("Debug message (hidden)");
    logger.info("Info message (visible)");

    println!("\n4. Masking sensitive values:");
    logger.set_settings(
        SettingsOverrides::new()
            .mask_values_of_keys(["password", "apiKey"])
            .mask_any_regex([r"\b\d{4}-\d{4}-\d{4}-\d{4}\b"]),
    )?;
    logger.info((
        "login",
        LogValue::object([("user", "ann"), ("password", "hunter2"), ("apiKey", "k-123")]),
    ));
    logger.info("charged card 4111-1111-1111-1111");

    println!("\n5. JSON layout:");
    logger.set_settings(SettingsOverrides::new().logger_type(LoggerType::Json))?;
    logger.info(("order placed", LogValue::object([("id", 17), ("items", 3)])));

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
