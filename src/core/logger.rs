//! Composable logger nodes
//!
//! Every logger in this crate is an `Arc<dyn Logger>`. A sink is any type
//! that accepts a level and a flat key/value sequence. The functions here
//! layer fields ([`with`]), an ambient context ([`with_context`]) and
//! fan-out ([`multi_logger`]) on top of sinks without mutating anything:
//! each call returns a new node.
//!
//! Composing onto an existing [`LoggerNode`] reuses its sink list and only
//! grows the prefix, so repeated `with` calls on a hot path allocate one
//! node each instead of nesting wrappers.
//!
//! # Example
//!
//! ```
//! use rust_log_context::prelude::*;
//! use std::sync::Arc;
//!
//! let sink: SharedLogger = Arc::new(StdLogger::new(Vec::new()));
//! let logger = with(&sink, kv!["service", "billing", "ts", default_timestamp()]);
//! logger.log(Level::Info, &kv!["msg", "started"]).unwrap();
//! ```

use super::{
    error::Result,
    log_level::Level,
    value::{bind_values, contains_valuer, Value},
};
use crate::context::Context;
use std::fmt;
use std::sync::Arc;

pub(crate) const SOURCE_FILE: &str = file!();

/// Anything that can receive a record.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, keyvals: &[Value]) -> Result<()>;

    /// Composable node view of this logger. Only [`LoggerNode`] answers.
    fn as_node(&self) -> Option<&LoggerNode> {
        None
    }
}

pub type SharedLogger = Arc<dyn Logger>;

/// A logger built by [`with`], [`with_context`] or [`multi_logger`].
pub struct LoggerNode {
    sinks: Arc<[SharedLogger]>,
    prefix: Vec<Value>,
    has_valuer: bool,
    ctx: Context,
}

impl LoggerNode {
    fn wrap(logger: &SharedLogger, prefix: Vec<Value>, ctx: Context) -> Self {
        Self {
            sinks: Arc::from(vec![Arc::clone(logger)]),
            has_valuer: contains_valuer(&prefix),
            prefix,
            ctx,
        }
    }

    /// Fields prepended to every record
    pub fn prefix(&self) -> &[Value] {
        &self.prefix
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Whether the prefix holds deferred values resolved at emission
    pub fn has_valuer(&self) -> bool {
        self.has_valuer
    }
}

impl Logger for LoggerNode {
    /// Emit `prefix ++ keyvals` to each sink in order, stopping at the first
    /// failure.
    ///
    /// Only deferred values of the prefix are resolved here; deferred values
    /// passed in `keyvals` reach the sinks as they are.
    fn log(&self, level: Level, keyvals: &[Value]) -> Result<()> {
        let mut kvs = Vec::with_capacity(self.prefix.len() + keyvals.len());
        kvs.extend_from_slice(&self.prefix);
        if self.has_valuer {
            bind_values(&self.ctx, &mut kvs);
        }
        kvs.extend_from_slice(keyvals);
        for sink in self.sinks.iter() {
            sink.log(level, &kvs)?;
        }
        Ok(())
    }

    fn as_node(&self) -> Option<&LoggerNode> {
        Some(self)
    }
}

impl fmt::Debug for LoggerNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerNode")
            .field("sinks", &self.sinks.len())
            .field("prefix", &self.prefix)
            .field("has_valuer", &self.has_valuer)
            .finish()
    }
}

/// Return a logger that prepends `kv` to every record.
///
/// New fields go in front of the fields `logger` already carries; duplicate
/// keys are kept.
pub fn with<I>(logger: &SharedLogger, kv: I) -> SharedLogger
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let kv: Vec<Value> = kv.into_iter().map(Into::into).collect();
    match logger.as_node() {
        Some(node) => {
            let mut prefix = Vec::with_capacity(kv.len() + node.prefix.len());
            prefix.extend(kv);
            prefix.extend_from_slice(&node.prefix);
            let has_valuer = node.has_valuer || contains_valuer(&prefix);
            Arc::new(LoggerNode {
                sinks: Arc::clone(&node.sinks),
                prefix,
                has_valuer,
                ctx: node.ctx.clone(),
            })
        }
        None => Arc::new(LoggerNode::wrap(logger, kv, Context::background())),
    }
}

/// Return a logger that resolves deferred values against `ctx`.
pub fn with_context(ctx: &Context, logger: &SharedLogger) -> SharedLogger {
    match logger.as_node() {
        Some(node) => Arc::new(LoggerNode {
            sinks: Arc::clone(&node.sinks),
            prefix: node.prefix.clone(),
            has_valuer: node.has_valuer,
            ctx: ctx.clone(),
        }),
        None => Arc::new(LoggerNode::wrap(logger, Vec::new(), ctx.clone())),
    }
}

/// Fan every record out to `loggers`, in order.
pub fn multi_logger<I>(loggers: I) -> SharedLogger
where
    I: IntoIterator<Item = SharedLogger>,
{
    Arc::new(LoggerNode {
        sinks: loggers.into_iter().collect(),
        prefix: Vec::new(),
        has_valuer: false,
        ctx: Context::background(),
    })
}
