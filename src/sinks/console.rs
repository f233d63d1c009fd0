//! Console sink with coloured levels

use super::format_pairs;
use crate::core::{Level, Logger, Result, Value};
use colored::Colorize;
use std::io::Write;

/// Writes `LEVEL key=value ...` lines to the terminal.
///
/// Error and Fatal records go to stderr, everything else to stdout.
pub struct ConsoleLogger {
    use_colors: bool,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn format_line(&self, level: Level, keyvals: &[Value]) -> String {
        let level_str = if self.use_colors {
            format!("{:5}", level.to_str())
                .color(level.color_code())
                .to_string()
        } else {
            format!("{:5}", level.to_str())
        };
        format!("{}{}", level_str, format_pairs(keyvals))
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: Level, keyvals: &[Value]) -> Result<()> {
        let line = self.format_line(level, keyvals);
        match level {
            Level::Error | Level::Fatal => {
                let mut stderr = std::io::stderr().lock();
                writeln!(stderr, "{}", line)?;
            }
            _ => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", line)?;
            }
        }
        Ok(())
    }
}
