//! Log level definitions
//!
//! Levels form one ordered sequence, `silly < trace < debug < info < warn < error < fatal`.
//! [`LogLevel::rank`] is the only ordering used for threshold checks, both for the
//! primary output and for attached transports.

use colored::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Records with a rank at or above this value go to the error stream.
pub const MIN_RANK_TO_STDERR: u8 = 4;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Silly = 0,
    Trace = 1,
    Debug = 2,
    Info = 3,
    Warn = 4,
    Error = 5,
    Fatal = 6,
}

impl LogLevel {
    /// Every level, ordered by rank.
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Silly,
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Fixed index of this level in [`LogLevel::ALL`].
    #[inline]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(rank as usize).copied()
    }

    /// Whether a record at this level passes a `min_level` threshold.
    #[inline]
    pub const fn meets(self, min_level: LogLevel) -> bool {
        self.rank() >= min_level.rank()
    }

    /// Whether records at this level route to the error stream.
    #[inline]
    pub const fn is_error_stream(self) -> bool {
        self.rank() >= MIN_RANK_TO_STDERR
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Silly => "silly",
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Upper-case badge used by the pretty renderer
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Silly => "SILLY",
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    pub fn default_color(&self) -> Color {
        use colored::Color::*;
        match self {
            LogLevel::Silly => BrightWhite,
            LogLevel::Trace => White,
            LogLevel::Debug => BrightGreen,
            LogLevel::Info => BrightBlue,
            LogLevel::Warn => BrightYellow,
            LogLevel::Error => BrightRed,
            LogLevel::Fatal => BrightMagenta,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silly" => Ok(LogLevel::Silly),
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_is_index_in_sequence() {
        for (index, level) in LogLevel::ALL.iter().enumerate() {
            assert_eq!(level.rank() as usize, index);
            assert_eq!(LogLevel::from_rank(index as u8), Some(*level));
        }
        assert_eq!(LogLevel::from_rank(7), None);
        assert_eq!(LogLevel::default(), LogLevel::Silly);
    }

    #[test]
    fn test_stream_routing() {
        assert!(!LogLevel::Debug.is_error_stream());
        assert!(!LogLevel::Info.is_error_stream());
        assert!(LogLevel::Warn.is_error_stream());
        assert!(LogLevel::Error.is_error_stream());
        assert!(LogLevel::Fatal.is_error_stream());
    }

    #[test]
    fn test_meets_threshold() {
        assert!(LogLevel::Error.meets(LogLevel::Error));
        assert!(LogLevel::Fatal.meets(LogLevel::Error));
        assert!(!LogLevel::Info.meets(LogLevel::Error));
        assert!(LogLevel::Silly.meets(LogLevel::Silly));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("silly".parse::<LogLevel>(), Ok(LogLevel::Silly));
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Fatal.to_string(), "fatal");
        assert_eq!(LogLevel::Info.label(), "INFO");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&LogLevel::Debug).unwrap();
        assert_eq!(json, "\"debug\"");
        let level: LogLevel = serde_json::from_str("\"fatal\"").unwrap();
        assert_eq!(level, LogLevel::Fatal);
    }
}
