//! Timestamp formatting utilities
//!
//! The pretty renderer prints the record date either in the default
//! `YYYY-MM-DD HH:MM:SS.mmm ` form or through a word pattern such as
//! `day.month.year hour:minute`, evaluated in a configurable time zone.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pattern used when only a time zone is configured
pub const DEFAULT_DATE_TIME_PATTERN: &str = "year-month-day hour:minute:second.millisecond";

/// Time zone in which a date-time pattern is evaluated
///
/// # Examples
///
/// ```
/// use hierlog::DateTimeZone;
///
/// let zone: DateTimeZone = "+02:00".parse().unwrap();
/// assert_eq!(zone.to_string(), "+02:00");
/// assert_eq!("utc".parse::<DateTimeZone>().unwrap(), DateTimeZone::Utc);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DateTimeZone {
    #[default]
    Utc,
    Local,
    Fixed(FixedOffset),
}

impl fmt::Display for DateTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeZone::Utc => write!(f, "utc"),
            DateTimeZone::Local => write!(f, "local"),
            DateTimeZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

impl FromStr for DateTimeZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utc" | "z" | "gmt" => Ok(DateTimeZone::Utc),
            "local" => Ok(DateTimeZone::Local),
            _ => s
                .parse::<FixedOffset>()
                .map(DateTimeZone::Fixed)
                .map_err(|_| format!("Invalid time zone: '{}'", s)),
        }
    }
}

impl TryFrom<String> for DateTimeZone {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateTimeZone> for String {
    fn from(zone: DateTimeZone) -> Self {
        zone.to_string()
    }
}

/// Format `date` for the pretty renderer.
///
/// With neither a pattern nor a zone the result is the ISO form with `T` and
/// `Z` replaced by spaces. Otherwise each token of the pattern (`year`,
/// `month`, `day`, `hour`, `minute`, `second`, `millisecond`) is replaced once,
/// using zero-padded values in the given zone (UTC when unset).
#[must_use]
pub fn format_timestamp(
    date: &DateTime<Utc>,
    pattern: Option<&str>,
    zone: Option<DateTimeZone>,
) -> String {
    if pattern.is_none() && zone.is_none() {
        return date.format("%Y-%m-%d %H:%M:%S%.3f ").to_string();
    }

    let pattern = pattern.unwrap_or(DEFAULT_DATE_TIME_PATTERN);
    match zone.unwrap_or_default() {
        DateTimeZone::Utc => apply_pattern(pattern, date),
        DateTimeZone::Local => apply_pattern(pattern, &date.with_timezone(&Local)),
        DateTimeZone::Fixed(offset) => apply_pattern(pattern, &date.with_timezone(&offset)),
    }
}

fn apply_pattern<Tz: TimeZone>(pattern: &str, date: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    let parts = [
        ("month", "%m"),
        ("day", "%d"),
        ("year", "%Y"),
        ("hour", "%H"),
        ("minute", "%M"),
        ("second", "%S"),
        ("millisecond", "%3f"),
    ];
    parts
        .iter()
        .fold(pattern.to_string(), |text, (token, spec)| {
            text.replacen(token, &date.format(spec).to_string(), 1)
        })
}
