//! Plain-text sink over any writer

use super::format_line;
use crate::core::{Level, Logger, Result, SharedLogger, Value};
use parking_lot::{Mutex, MutexGuard};
use std::io::{self, Write};
use std::sync::Arc;

/// Writes each record as one `LEVEL key=value ...` line.
///
/// # Example
///
/// ```
/// use rust_log_context::prelude::*;
///
/// let sink = StdLogger::new(Vec::new());
/// sink.log(Level::Info, &kv!["msg", "ready"]).unwrap();
/// assert_eq!(String::from_utf8_lossy(&sink.writer()), "INFO msg=ready\n");
/// ```
pub struct StdLogger<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> StdLogger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Locked access to the underlying writer
    pub fn writer(&self) -> MutexGuard<'_, W> {
        self.writer.lock()
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl StdLogger<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> Logger for StdLogger<W> {
    fn log(&self, level: Level, keyvals: &[Value]) -> Result<()> {
        let line = format_line(level, keyvals);
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

/// A fresh stderr sink, for composition roots without a preference
pub fn default_logger() -> SharedLogger {
    Arc::new(StdLogger::stderr())
}
