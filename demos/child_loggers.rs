//! Logger tree example
//!
//! Demonstrates child loggers inheriting settings, prefixes and transports,
//! and parent changes reaching every descendant.
//!
//! Run with: cargo run --example child_loggers

use hierlog::prelude::*;
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== hierlog - Child Loggers Example ===\n");

    let audit = Arc::new(MemoryTransport::new());
    let root = Logger::builder()
        .name("app")
        .transport(audit.clone(), LogLevel::Warn)
        .build()?;

    let db = root.child(SettingsOverrides::new().name("db").prefix(["[db]"]))?;
    let pool = db.child(SettingsOverrides::new().prefix(["[pool]"]))?;

    println!("1. Children carry their own names and prefixes:");
    root.info("starting up");
    db.info(("connected to", "db-1"));
    pool.debug(("connections open:", 4));

    println!("\n2. Raising the root's minimum level reaches every descendant:");
    root.set_settings(SettingsOverrides::new().min_level(LogLevel::Warn))?;
    pool.debug("hidden now");
    pool.warn("pool exhausted");

    println!("\n3. Children logging from worker threads:");
    let (channel, receiver) = ChannelTransport::unbounded();
    root.attach_transport(Arc::new(channel), LogLevel::Error);

    let workers: Vec<_> = (0..3)
        .map(|id| -> Result<_> {
            let worker = root.child(SettingsOverrides::new().name(format!("worker-{}", id)))?;
            Ok(thread::spawn(move || {
                worker.error(("job failed", id));
            }))
        })
        .collect::<Result<_>>()?;
    for worker in workers {
        if worker.join().is_err() {
            eprintln!("worker panicked");
        }
    }

    println!("\n4. Records received by transports:");
    for record in receiver.try_iter() {
        println!(
            "   channel: {} from {}",
            record.log_level,
            record.logger_name.as_deref().unwrap_or("-")
        );
    }
    println!("   audit transport kept {} records", audit.len());

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
