//! Output streams for rendered records

use super::error::{LoggerError, Result};
use parking_lot::Mutex;
use std::io::Write;

/// Write-only text sink. One call receives one complete rendered record.
pub trait OutputStream: Send + Sync {
    fn write(&self, text: &str) -> Result<()>;
    fn name(&self) -> &str;
}

/// The process standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutStream;

impl OutputStream for StdoutStream {
    fn write(&self, text: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(text.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| LoggerError::io_operation("writing to stdout", "write failed", e))
    }

    fn name(&self) -> &str {
        "stdout"
    }
}

/// The process standard error
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrStream;

impl OutputStream for StderrStream {
    fn write(&self, text: &str) -> Result<()> {
        let mut err = std::io::stderr().lock();
        err.write_all(text.as_bytes())
            .map_err(|e| LoggerError::io_operation("writing to stderr", "write failed", e))
    }

    fn name(&self) -> &str {
        "stderr"
    }
}

/// Collects everything written to it
///
/// # Examples
///
/// ```
/// use hierlog::{MemoryStream, OutputStream};
///
/// let stream = MemoryStream::new();
/// stream.write("hello\n").unwrap();
/// assert_eq!(stream.contents(), "hello\n");
/// ```
#[derive(Debug, Default)]
pub struct MemoryStream {
    buffer: Mutex<String>,
    writes: Mutex<Vec<String>>,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    /// One entry per `write` call
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
        self.writes.lock().clear();
    }
}

impl OutputStream for MemoryStream {
    fn write(&self, text: &str) -> Result<()> {
        self.buffer.lock().push_str(text);
        self.writes.lock().push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_stream_records_writes() {
        let stream = MemoryStream::new();
        stream.write("a").unwrap();
        stream.write("b\n").unwrap();

        assert_eq!(stream.contents(), "ab\n");
        assert_eq!(stream.writes(), vec!["a", "b\n"]);

        stream.clear();
        assert!(stream.contents().is_empty());
        assert!(stream.writes().is_empty());
    }

    #[test]
    fn test_stream_names() {
        assert_eq!(StdoutStream.name(), "stdout");
        assert_eq!(StderrStream.name(), "stderr");
        assert_eq!(MemoryStream::new().name(), "memory");
    }
}
