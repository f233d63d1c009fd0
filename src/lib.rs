//! # Rust Log Context
//!
//! Two cross-cutting primitives for service frameworks:
//!
//! - a structured, leveled logging facade whose loggers compose: field
//!   injection with [`with`], context binding with [`with_context`],
//!   fan-out with [`multi_logger`], filtering and redaction with [`Filter`],
//!   per-level convenience with [`Helper`], and values resolved lazily at
//!   emission time ([`Valuer`])
//! - a request-scoped, case-insensitive [`Metadata`] carrier that rides an
//!   explicit [`Context`] from servers to outgoing client calls
//!
//! ## Features
//!
//! - **Composable**: every composition returns a new immutable logger
//! - **Lazy values**: caller location and timestamps resolve per record
//! - **Redaction**: denylisted keys and values never reach a sink
//! - **Thread Safe**: loggers and contexts are `Send + Sync`

pub mod context;
pub mod core;
pub mod macros;
pub mod metadata;
pub mod sinks;

pub mod prelude {
    pub use crate::context::Context;
    pub use crate::core::{
        caller, default_caller, default_timestamp, multi_logger, parse_level, timestamp, with,
        with_context, FieldValue, Filter, FilterBuilder, FilterConfig, Helper, Level, Logger,
        LoggerError, Result, SharedLogger, TimestampFormat, Value, Valuer, DEFAULT_MESSAGE_KEY,
        REDACTED,
    };
    pub use crate::metadata::Metadata;
    #[cfg(feature = "console")]
    pub use crate::sinks::ConsoleLogger;
    pub use crate::sinks::{default_logger, JsonLogger, StdLogger};
    pub use crate::{debugf, errorf, fatalf, infof, kv, warnf};
}

pub use context::Context;
pub use self::core::{
    caller, default_caller, default_timestamp, multi_logger, parse_level, timestamp, value, with,
    with_context, FieldValue, Filter, FilterBuilder, FilterConfig, Helper, Level, Logger,
    LoggerError, LoggerNode, Result, SharedLogger, TimestampFormat, Value, Valuer,
    DEFAULT_MESSAGE_KEY, LEVEL_KEY, REDACTED,
};
pub use metadata::Metadata;
#[cfg(feature = "console")]
pub use sinks::ConsoleLogger;
pub use sinks::{default_logger, JsonLogger, StdLogger};
