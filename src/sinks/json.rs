//! JSON lines sink for structured logging

use super::UNPAIRED;
use crate::core::{FieldValue, Level, Logger, Result, Value, LEVEL_KEY};
use parking_lot::Mutex;
use std::io::Write;

/// Writes each record as a single-line JSON object (JSONL format).
///
/// The level is stored under [`LEVEL_KEY`]. When a key repeats, the later
/// pair wins. Deferred values that reach the sink unresolved are written
/// as their placeholder text.
pub struct JsonLogger<W: Write + Send> {
    writer: Mutex<W>,
    pretty: bool,
}

impl<W: Write + Send> JsonLogger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            pretty: false,
        }
    }

    /// Create a new JSON sink with pretty printing
    pub fn new_pretty(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            pretty: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn to_json(level: Level, keyvals: &[Value]) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert(
            LEVEL_KEY.to_string(),
            serde_json::Value::String(level.to_str().to_string()),
        );
        for pair in keyvals.chunks(2) {
            let key = pair[0].to_string();
            let value = match pair.get(1) {
                Some(Value::Concrete(v)) => v.to_json_value(),
                Some(deferred) => serde_json::Value::String(deferred.to_string()),
                None => FieldValue::from(UNPAIRED).to_json_value(),
            };
            object.insert(key, value);
        }
        serde_json::Value::Object(object)
    }
}

impl<W: Write + Send> Logger for JsonLogger<W> {
    fn log(&self, level: Level, keyvals: &[Value]) -> Result<()> {
        let record = Self::to_json(level, keyvals);
        let json = if self.pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        Ok(())
    }
}
