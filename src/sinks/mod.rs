//! Reference sinks
//!
//! Each sink implements [`Logger`](crate::core::Logger) directly and is
//! meant to sit at the bottom of a composed logger chain.

#[cfg(feature = "console")]
pub mod console;
pub mod json;
pub mod std_logger;

#[cfg(feature = "console")]
pub use console::ConsoleLogger;
pub use json::JsonLogger;
pub use std_logger::{default_logger, StdLogger};

use crate::core::{Level, Value};
use std::fmt::Write;

/// Written in place of the value of a trailing key without a value
pub const UNPAIRED: &str = "KEYVALS UNPAIRED";

/// Escape line breaks and tabs so one record stays on one line
pub(crate) fn sanitize(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Render `keyvals` as ` key=value` pairs
pub(crate) fn format_pairs(keyvals: &[Value]) -> String {
    let mut out = String::new();
    for pair in keyvals.chunks(2) {
        let key = sanitize(&pair[0].to_string());
        let value = match pair.get(1) {
            Some(value) => sanitize(&value.to_string()),
            None => UNPAIRED.to_string(),
        };
        let _ = write!(out, " {}={}", key, value);
    }
    out
}

/// Render a whole record as `LEVEL key=value ...`
pub(crate) fn format_line(level: Level, keyvals: &[Value]) -> String {
    format!("{}{}", level, format_pairs(keyvals))
}
