//! Level threshold, predicate suppression and redaction in front of a logger

use super::{
    error::Result,
    log_level::Level,
    logger::{Logger, SharedLogger},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub(crate) const SOURCE_FILE: &str = file!();

/// Marker that replaces redacted values
pub const REDACTED: &str = "***";

/// Suppression predicate: returning `true` drops the record
pub type FilterPredicate = Arc<dyn Fn(Level, &[Value]) -> bool + Send + Sync>;

/// Declarative filter settings, suitable for a host's config file.
///
/// # Example
///
/// ```
/// use rust_log_context::core::FilterConfig;
///
/// let config: FilterConfig =
///     serde_json::from_str(r#"{"level":"warn","keys":["password"]}"#).unwrap();
/// assert_eq!(config.keys, vec!["password".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum level to forward; `None` forwards everything
    pub level: Option<Level>,
    /// Keys whose values are redacted
    pub keys: Vec<String>,
    /// Values that are redacted wherever they appear
    pub values: Vec<String>,
}

/// Decorates a logger with a level threshold, an optional suppression
/// predicate and key/value denylists.
///
/// Redaction works on a copy of the record; the caller's slice is never
/// modified.
pub struct Filter {
    logger: SharedLogger,
    level: Option<Level>,
    keys: HashSet<String>,
    values: HashSet<String>,
    predicate: Option<FilterPredicate>,
}

impl Filter {
    /// Create a builder for a filter in front of `logger`
    ///
    /// # Example
    /// ```
    /// use rust_log_context::prelude::*;
    /// use std::sync::Arc;
    ///
    /// let sink: SharedLogger = Arc::new(StdLogger::new(Vec::new()));
    /// let filter = Filter::builder(sink)
    ///     .min_level(Level::Warn)
    ///     .keys(["password"])
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder(logger: SharedLogger) -> FilterBuilder {
        FilterBuilder::new(logger)
    }

    /// Filter that forwards everything unchanged
    pub fn new(logger: SharedLogger) -> Self {
        FilterBuilder::new(logger).build()
    }

    pub fn min_level(&self) -> Option<Level> {
        self.level
    }

    fn redact(&self, keyvals: &[Value]) -> Vec<Value> {
        let mut kvs = keyvals.to_vec();
        for pair in kvs.chunks_exact_mut(2) {
            let key_hit = pair[0].as_str().is_some_and(|k| self.keys.contains(k));
            let value_hit = pair[1].as_str().is_some_and(|v| self.values.contains(v));
            if key_hit || value_hit {
                pair[1] = Value::from(REDACTED);
            }
        }
        kvs
    }
}

impl Logger for Filter {
    fn log(&self, level: Level, keyvals: &[Value]) -> Result<()> {
        if self.level.is_some_and(|min| level < min) {
            return Ok(());
        }
        if let Some(predicate) = &self.predicate {
            if predicate(level, keyvals) {
                return Ok(());
            }
        }
        if self.keys.is_empty() && self.values.is_empty() {
            return self.logger.log(level, keyvals);
        }
        let redacted = self.redact(keyvals);
        self.logger.log(level, &redacted)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("level", &self.level)
            .field("keys", &self.keys)
            .field("values", &self.values)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Builder for [`Filter`]
pub struct FilterBuilder {
    logger: SharedLogger,
    level: Option<Level>,
    keys: HashSet<String>,
    values: HashSet<String>,
    predicate: Option<FilterPredicate>,
}

impl FilterBuilder {
    pub fn new(logger: SharedLogger) -> Self {
        Self {
            logger,
            level: None,
            keys: HashSet::new(),
            values: HashSet::new(),
            predicate: None,
        }
    }

    /// Seed the builder from declarative settings
    #[must_use = "builder methods return a new value"]
    pub fn from_config(logger: SharedLogger, config: FilterConfig) -> Self {
        let mut builder = Self::new(logger).keys(config.keys).values(config.values);
        builder.level = config.level;
        builder
    }

    /// Drop records below `level`
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Redact the value paired with any of these keys
    #[must_use = "builder methods return a new value"]
    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Redact any of these values, whatever their key
    #[must_use = "builder methods return a new value"]
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    /// Drop records for which `predicate` returns `true`
    #[must_use = "builder methods return a new value"]
    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(Level, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn build(self) -> Filter {
        Filter {
            logger: self.logger,
            level: self.level,
            keys: self.keys,
            values: self.values,
            predicate: self.predicate,
        }
    }
}
