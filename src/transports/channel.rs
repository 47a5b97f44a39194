//! Transport that hands records to another thread

use crate::core::error::{LoggerError, Result};
use crate::core::log_record::LogRecord;
use crate::core::transport::Transport;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

/// Sends every record into a crossbeam channel
///
/// The receiving side decides what shipping means: a file, a socket, a
/// remote collector. Once the receiver is gone, sends fail and the logger
/// counts them as transport failures.
///
/// # Examples
///
/// ```
/// use hierlog::{ChannelTransport, LogLevel, Logger, SettingsOverrides};
/// use std::sync::Arc;
///
/// let (transport, receiver) = ChannelTransport::unbounded();
/// let logger = Logger::with_settings(SettingsOverrides::new().suppress_std_output(true)).unwrap();
/// logger.attach_transport(Arc::new(transport), LogLevel::Silly);
///
/// logger.info("shipped");
/// assert_eq!(receiver.recv().unwrap().message(), "shipped");
/// ```
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: Sender<LogRecord>,
}

impl ChannelTransport {
    pub fn new(sender: Sender<LogRecord>) -> Self {
        Self { sender }
    }

    pub fn unbounded() -> (Self, Receiver<LogRecord>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender), receiver)
    }

    /// A full channel blocks the logging call until the receiver catches up
    pub fn bounded(capacity: usize) -> (Self, Receiver<LogRecord>) {
        let (sender, receiver) = bounded(capacity);
        (Self::new(sender), receiver)
    }
}

impl Transport for ChannelTransport {
    fn log(&self, record: &LogRecord) -> Result<()> {
        self.sender
            .send(record.clone())
            .map_err(|_| LoggerError::transport(self.name(), "receiver disconnected"))
    }

    fn name(&self) -> &str {
        "channel"
    }
}
