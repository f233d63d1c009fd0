//! Log level definitions

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Key under which sinks that emit structured records store the level
pub const LEVEL_KEY: &str = "level";

/// Severity of a record.
///
/// The discriminants are the underlying ordering, so `level < threshold`
/// reads as "suppressed". Debug sits below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(i8)]
pub enum Level {
    Debug = -1,
    #[default]
    Info = 0,
    Warn = 1,
    Error = 2,
    Fatal = 3,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Raw integer representation
    pub fn as_i8(self) -> i8 {
        self as i8
    }

    /// Map a raw integer back to a level, if it names one
    pub fn from_i8(raw: i8) -> Option<Self> {
        Level::ALL.into_iter().find(|level| level.as_i8() == raw)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Level::Debug => Blue,
            Level::Info => Green,
            Level::Warn => Yellow,
            Level::Error => Red,
            Level::Fatal => BrightRed,
        }
    }
}

/// Name of a raw level value; unknown values map to the empty string.
pub fn level_name(raw: i8) -> &'static str {
    Level::from_i8(raw).map(|level| level.to_str()).unwrap_or("")
}

/// Parse a level name, case-insensitively. Anything unrecognised is `Info`.
pub fn parse_level(s: &str) -> Level {
    match s.to_uppercase().as_str() {
        "DEBUG" => Level::Debug,
        "INFO" => Level::Info,
        "WARN" => Level::Warn,
        "ERROR" => Level::Error,
        "FATAL" => Level::Fatal,
        _ => Level::Info,
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Level {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_level(s))
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(parse_level(&s))
    }
}
