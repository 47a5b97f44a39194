//! Stress tests for concurrent use of logger trees
//!
//! These tests verify:
//! - Every record reaches its transports when many threads log at once
//! - Settings updates racing with logging never lose or corrupt records
//! - Children created and dropped concurrently are handled safely
//! - Metrics stay consistent under load

use hierlog::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 250;

fn quiet_root(transport: Arc<MemoryTransport>) -> Logger {
    Logger::builder()
        .suppress_std_output(true)
        .transport(transport, LogLevel::Silly)
        .build()
        .expect("Failed to create logger")
}

/// Counts records without keeping them
struct CountingTransport {
    count: AtomicUsize,
}

impl Transport for CountingTransport {
    fn log(&self, _record: &LogRecord) -> hierlog::Result<()> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[test]
fn test_concurrent_logging_delivers_every_record() {
    let transport = Arc::new(MemoryTransport::new());
    let logger = quiet_root(transport.clone());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.info(("thread", t, "message", i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(transport.len(), THREADS * PER_THREAD);
    assert_eq!(logger.metrics().records_built(), (THREADS * PER_THREAD) as u64);
    assert_eq!(
        logger.metrics().transport_deliveries(),
        (THREADS * PER_THREAD) as u64
    );
    assert_eq!(logger.metrics().transport_failures(), 0);
}

#[test]
fn test_children_log_through_shared_transport() {
    let transport = Arc::new(MemoryTransport::new());
    let root = quiet_root(transport.clone());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let root = root.clone();
            thread::spawn(move || {
                let child = root
                    .child(SettingsOverrides::new().name(format!("worker-{}", t)))
                    .expect("Failed to create child");
                for i in 0..PER_THREAD {
                    child.debug(("job", i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let records = transport.records();
    assert_eq!(records.len(), THREADS * PER_THREAD);
    for t in 0..THREADS {
        let name = format!("worker-{}", t);
        let count = records
            .iter()
            .filter(|r| r.logger_name.as_deref() == Some(name.as_str()))
            .count();
        assert_eq!(count, PER_THREAD, "records from {}", name);
    }

    // Dropped children are pruned from the tree
    root.set_settings(SettingsOverrides::new().min_level(LogLevel::Info))
        .expect("Failed to update settings");
    assert!(root.children().is_empty());
}

#[test]
fn test_settings_updates_race_with_logging() {
    let counter = Arc::new(CountingTransport {
        count: AtomicUsize::new(0),
    });
    let root = Logger::builder()
        .suppress_std_output(true)
        .transport(counter.clone(), LogLevel::Silly)
        .build()
        .expect("Failed to create logger");
    let child = root
        .child(SettingsOverrides::new().name("child"))
        .expect("Failed to create child");

    let writers: Vec<_> = (0..THREADS / 2)
        .map(|_| {
            let child = child.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    child.warn(("update race", i));
                }
            })
        })
        .collect();

    let updater = {
        let root = root.clone();
        thread::spawn(move || {
            for i in 0..PER_THREAD {
                let prefix = format!("[round {}]", i);
                root.set_settings(SettingsOverrides::new().prefix([prefix]))
                    .expect("Failed to update settings");
            }
        })
    };

    for handle in writers {
        handle.join().expect("Thread panicked");
    }
    updater.join().expect("Updater panicked");

    // Transport levels are fixed, so every warning is delivered
    assert_eq!(counter.count.load(Ordering::Relaxed), THREADS / 2 * PER_THREAD);
    assert_eq!(
        child.settings().prefix.len(),
        1,
        "child follows the last parent update"
    );
}

#[test]
fn test_min_level_change_is_observed_by_all_threads() {
    let out = Arc::new(MemoryStream::new());
    let logger = Logger::with_settings(
        SettingsOverrides::new()
            .colorize_pretty_logs(false)
            .min_level(LogLevel::Fatal)
            .std_streams(out.clone()),
    )
    .expect("Failed to create logger");

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let logger = logger.clone();
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    logger.info("filtered");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(out.writes().is_empty());
    assert_eq!(
        logger.metrics().records_suppressed(),
        (THREADS * PER_THREAD) as u64
    );

    logger
        .set_settings(SettingsOverrides::new().min_level(LogLevel::Info))
        .expect("Failed to update settings");
    logger.info("visible");
    assert_eq!(out.writes().len(), 1);
}

#[test]
fn test_concurrent_settings_writers_leave_descendants_in_sync() {
    let root = Logger::builder()
        .suppress_std_output(true)
        .build()
        .expect("Failed to create logger");
    let child = root
        .child(SettingsOverrides::new().name("child"))
        .expect("Failed to create child");
    let grandchild = child
        .child(SettingsOverrides::new().prefix(["[leaf]"]))
        .expect("Failed to create grandchild");

    let levels = [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error];
    let updaters: Vec<_> = (0..THREADS)
        .map(|t| {
            let root = root.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let prefix = format!("[writer {} round {}]", t, i);
                    root.set_settings(
                        SettingsOverrides::new()
                            .min_level(levels[(t + i) % levels.len()])
                            .prefix([prefix]),
                    )
                    .expect("Failed to update settings");
                }
            })
        })
        .collect();
    for handle in updaters {
        handle.join().expect("Updater panicked");
    }

    let texts = |settings: &LoggerSettings| -> Vec<String> {
        settings
            .prefix
            .iter()
            .map(|value| value.as_str().unwrap_or_default().to_string())
            .collect()
    };
    let expected = root.settings();
    let expected_prefix = texts(&expected);
    assert_eq!(expected_prefix.len(), 1);

    let inherited = child.settings();
    assert_eq!(inherited.min_level, expected.min_level);
    assert_eq!(texts(&inherited), expected_prefix);

    let leaf = grandchild.settings();
    assert_eq!(leaf.min_level, expected.min_level);
    assert_eq!(texts(&leaf), [expected_prefix[0].clone(), "[leaf]".to_string()]);
}
