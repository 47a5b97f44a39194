//! Attached transports
//!
//! A transport receives every finished [`LogRecord`] that meets its own minimum
//! level, whether or not the logger printed it. Each level has its own method;
//! all of them default to [`Transport::log`].

use super::error::Result;
use super::log_level::LogLevel;
use super::log_record::LogRecord;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub trait Transport: Send + Sync {
    fn log(&self, record: &LogRecord) -> Result<()>;

    fn silly(&self, record: &LogRecord) -> Result<()> {
        self.log(record)
    }

    fn trace(&self, record: &LogRecord) -> Result<()> {
        self.log(record)
    }

    fn debug(&self, record: &LogRecord) -> Result<()> {
        self.log(record)
    }

    fn info(&self, record: &LogRecord) -> Result<()> {
        self.log(record)
    }

    fn warn(&self, record: &LogRecord) -> Result<()> {
        self.log(record)
    }

    fn error(&self, record: &LogRecord) -> Result<()> {
        self.log(record)
    }

    fn fatal(&self, record: &LogRecord) -> Result<()> {
        self.log(record)
    }

    fn name(&self) -> &str {
        "transport"
    }
}

/// Call the method of `transport` named after the record's level
pub fn deliver(transport: &dyn Transport, record: &LogRecord) -> Result<()> {
    match record.log_level {
        LogLevel::Silly => transport.silly(record),
        LogLevel::Trace => transport.trace(record),
        LogLevel::Debug => transport.debug(record),
        LogLevel::Info => transport.info(record),
        LogLevel::Warn => transport.warn(record),
        LogLevel::Error => transport.error(record),
        LogLevel::Fatal => transport.fatal(record),
    }
}

/// A transport together with the lowest level it receives
#[derive(Clone)]
pub struct AttachedTransport {
    pub min_level: LogLevel,
    pub transport: Arc<dyn Transport>,
}

impl AttachedTransport {
    pub fn new(transport: Arc<dyn Transport>, min_level: LogLevel) -> Self {
        Self {
            min_level,
            transport,
        }
    }

    #[inline]
    pub fn accepts(&self, level: LogLevel) -> bool {
        level.meets(self.min_level)
    }
}

impl fmt::Debug for AttachedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedTransport")
            .field("name", &self.transport.name())
            .field("min_level", &self.min_level)
            .finish()
    }
}

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
