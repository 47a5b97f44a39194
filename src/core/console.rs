//! Bridge from the `log` facade
//!
//! Once installed, every `log::error!`, `log::info!` and friends in the process
//! is routed through one [`Logger`]. The bridge registers itself with `log` the
//! first time it is installed; afterwards installing only swaps the target
//! logger, and uninstalling leaves the facade registered but inert.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::log_record::CallerLocation;
use super::logger::Logger;
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::RwLock;
use std::cell::Cell;
use std::sync::OnceLock;

struct ConsoleBridge {
    target: RwLock<Option<Logger>>,
}

static BRIDGE: ConsoleBridge = ConsoleBridge {
    target: parking_lot::const_rwlock(None),
};

thread_local! {
    static FORWARDING: Cell<bool> = const { Cell::new(false) };
}

/// Clears the re-entrancy flag when dropped
struct ForwardGuard;

impl ForwardGuard {
    fn enter() -> Option<Self> {
        FORWARDING.with(|active| {
            if active.get() {
                None
            } else {
                active.set(true);
                Some(ForwardGuard)
            }
        })
    }
}

impl Drop for ForwardGuard {
    fn drop(&mut self) {
        FORWARDING.with(|active| active.set(false));
    }
}

fn map_level(level: Level) -> LogLevel {
    match level {
        Level::Error => LogLevel::Error,
        Level::Warn => LogLevel::Warn,
        Level::Info => LogLevel::Info,
        Level::Debug => LogLevel::Debug,
        Level::Trace => LogLevel::Trace,
    }
}

impl Log for ConsoleBridge {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        self.target.read().is_some()
    }

    fn log(&self, record: &Record<'_>) {
        let Some(logger) = self.target.read().clone() else {
            return;
        };
        // A transport that logs through `log` itself would loop forever
        let Some(_guard) = ForwardGuard::enter() else {
            return;
        };

        let caller = CallerLocation::new(
            record.file().unwrap_or_else(|| record.target()),
            record.line().unwrap_or_default(),
            None,
        );
        let level = map_level(record.level());
        let _ = logger.dispatch(level, vec![record.args().to_string().into()], caller);
    }

    fn flush(&self) {}
}

fn register() -> Result<()> {
    static REGISTRATION: OnceLock<std::result::Result<(), String>> = OnceLock::new();
    REGISTRATION
        .get_or_init(|| {
            log::set_logger(&BRIDGE)
                .map(|()| log::set_max_level(LevelFilter::Trace))
                .map_err(|e| e.to_string())
        })
        .clone()
        .map_err(LoggerError::console_bridge)
}

/// Route the `log` facade to `logger`, replacing any logger routed before.
/// Taking the bridge from a different logger is reported on stderr.
///
/// # Errors
///
/// Fails when another `log` implementation was registered first.
pub fn install(logger: &Logger) -> Result<()> {
    register()?;
    if let Some(previous) = replace_target(logger) {
        eprintln!(
            "[LOGGER ERROR] Console bridge taken over by logger '{}'; logger '{}' no longer receives `log` records",
            logger.settings().name.as_deref().unwrap_or("<unnamed>"),
            previous.settings().name.as_deref().unwrap_or("<unnamed>")
        );
    }
    Ok(())
}

/// Make `logger` the target; returns the displaced target when it was another logger
fn replace_target(logger: &Logger) -> Option<Logger> {
    let previous = BRIDGE.target.write().replace(logger.clone());
    previous.filter(|previous| !previous.ptr_eq(logger))
}

/// Stop routing `log` records; they are dropped until the next [`install`]
pub fn uninstall() {
    BRIDGE.target.write().take();
}

/// The logger currently receiving `log` records
pub fn installed() -> Option<Logger> {
    BRIDGE.target.read().clone()
}

/// Uninstall, but only when `logger` is the current target
pub(crate) fn uninstall_for(logger: &Logger) -> bool {
    let removed = {
        let mut target = BRIDGE.target.write();
        if target.as_ref().is_some_and(|current| current.ptr_eq(logger)) {
            target.take()
        } else {
            None
        }
    };
    removed.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping_is_one_to_one() {
        assert_eq!(map_level(Level::Error), LogLevel::Error);
        assert_eq!(map_level(Level::Warn), LogLevel::Warn);
        assert_eq!(map_level(Level::Info), LogLevel::Info);
        assert_eq!(map_level(Level::Debug), LogLevel::Debug);
        assert_eq!(map_level(Level::Trace), LogLevel::Trace);
    }

    #[test]
    fn test_target_handover() {
        let first = Logger::new();
        let second = Logger::new();

        assert!(replace_target(&first).is_none());
        assert!(replace_target(&first).is_none());
        let displaced = replace_target(&second).expect("first logger displaced");
        assert!(displaced.ptr_eq(&first));

        assert!(!uninstall_for(&first));
        assert!(installed().is_some_and(|current| current.ptr_eq(&second)));
        assert!(uninstall_for(&second));
        assert!(installed().is_none());
    }

    #[test]
    fn test_guard_blocks_nested_forwarding() {
        let outer = ForwardGuard::enter();
        assert!(outer.is_some());
        assert!(ForwardGuard::enter().is_none());
        drop(outer);
        assert!(ForwardGuard::enter().is_some());
    }
}
