//! Timestamp layouts for the timestamp resolver
//!
//! Provides the layouts a [`timestamp`](crate::core::value::timestamp)
//! valuer can render: RFC 3339, ISO 8601 with milliseconds, Unix epochs and
//! custom strftime layouts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// strftime layout of the default timestamp: `2025-01-08T10:30:45+00:00`
pub const DEFAULT_TIMESTAMP_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use rust_log_context::core::TimestampFormat;
/// use chrono::Utc;
///
/// let format = TimestampFormat::Iso8601;
/// let timestamp = format.format(&Utc::now());
/// assert!(timestamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// RFC 3339 with offset, second precision: `2025-01-08T10:30:45+00:00`
    #[default]
    Rfc3339,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime layout, e.g. `"%d/%b/%Y:%H:%M:%S %z"`
    Custom(String),
}

impl TimestampFormat {
    /// Format a `DateTime<Utc>` according to this format
    ///
    /// A custom layout chrono cannot render is returned verbatim rather
    /// than failing the record.
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Rfc3339 => render(datetime, DEFAULT_TIMESTAMP_LAYOUT),
            TimestampFormat::Iso8601 => render(datetime, "%Y-%m-%dT%H:%M:%S%.3fZ"),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(layout) => render(datetime, layout),
        }
    }

    /// Format the current wall-clock time
    #[must_use]
    pub fn now(&self) -> String {
        self.format(&Utc::now())
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::Unix | TimestampFormat::UnixMillis)
    }
}

impl From<&str> for TimestampFormat {
    fn from(layout: &str) -> Self {
        TimestampFormat::Custom(layout.to_string())
    }
}

impl From<String> for TimestampFormat {
    fn from(layout: String) -> Self {
        TimestampFormat::Custom(layout)
    }
}

fn render(datetime: &DateTime<Utc>, layout: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", datetime.format(layout)).is_err() {
        return layout.to_string();
    }
    out
}
