//! Transport that keeps every record it receives

use crate::core::error::Result;
use crate::core::log_level::LogLevel;
use crate::core::log_record::LogRecord;
use crate::core::transport::Transport;
use parking_lot::Mutex;

/// Collects records in memory
///
/// # Examples
///
/// ```
/// use hierlog::{LogLevel, Logger, MemoryTransport, SettingsOverrides};
/// use std::sync::Arc;
///
/// let transport = Arc::new(MemoryTransport::new());
/// let logger = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true)).unwrap();
/// logger.attach_transport(transport.clone(), LogLevel::Warn);
///
/// logger.info("skipped");
/// logger.error("kept");
///
/// assert_eq!(transport.len(), 1);
/// assert_eq!(transport.records()[0].message(), "kept");
/// ```
#[derive(Debug, Default)]
pub struct MemoryTransport {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Records of exactly `level`
    pub fn records_at(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.log_level == level)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Remove and return everything collected so far
    pub fn take(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl Transport for MemoryTransport {
    fn log(&self, record: &LogRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
