//! Logger metrics for observability
//!
//! Counters for monitoring logger health: how many records were built,
//! printed or filtered, and how often streams and transports failed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// One instance is shared by a logger and all of its children.
///
/// # Example
///
/// ```
/// use hierlog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_built();
/// metrics.record_written();
/// metrics.record_transport_failure();
///
/// assert_eq!(metrics.records_built(), 1);
/// assert_eq!(metrics.records_written(), 1);
/// assert_eq!(metrics.transport_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records produced by logging calls
    records_built: AtomicU64,

    /// Records rendered to an output stream
    records_written: AtomicU64,

    /// Records not printed because of the level threshold, suppression or the hidden type
    records_suppressed: AtomicU64,

    /// Successful transport calls
    transport_deliveries: AtomicU64,

    /// Transport calls that returned an error or panicked
    transport_failures: AtomicU64,

    /// Output stream writes that failed
    write_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_built: AtomicU64::new(0),
            records_written: AtomicU64::new(0),
            records_suppressed: AtomicU64::new(0),
            transport_deliveries: AtomicU64::new(0),
            transport_failures: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_built(&self) -> u64 {
        self.records_built.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_suppressed(&self) -> u64 {
        self.records_suppressed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn transport_deliveries(&self) -> u64 {
        self.transport_deliveries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn transport_failures(&self) -> u64 {
        self.transport_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Record a built log record; returns the previous count
    #[inline]
    pub fn record_built(&self) -> u64 {
        self.records_built.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.records_written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_suppressed(&self) -> u64 {
        self.records_suppressed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_transport_delivery(&self) -> u64 {
        self.transport_deliveries.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_transport_failure(&self) -> u64 {
        self.transport_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of transport calls that failed, as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no transport was called.
    pub fn transport_failure_rate(&self) -> f64 {
        let failed = self.transport_failures() as f64;
        let total = self.transport_deliveries() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.records_built.store(0, Ordering::Relaxed);
        self.records_written.store(0, Ordering::Relaxed);
        self.records_suppressed.store(0, Ordering::Relaxed);
        self.transport_deliveries.store(0, Ordering::Relaxed);
        self.transport_failures.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            records_built: AtomicU64::new(self.records_built()),
            records_written: AtomicU64::new(self.records_written()),
            records_suppressed: AtomicU64::new(self.records_suppressed()),
            transport_deliveries: AtomicU64::new(self.transport_deliveries()),
            transport_failures: AtomicU64::new(self.transport_failures()),
            write_failures: AtomicU64::new(self.write_failures()),
        }
    }
}
