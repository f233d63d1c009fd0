//! Core logging facade: levels, values, composable loggers and decorators

pub mod error;
pub mod filter;
pub mod helper;
pub mod log_level;
pub mod logger;
pub mod timestamp;
pub mod value;

pub use error::{LoggerError, Result};
pub use filter::{Filter, FilterBuilder, FilterConfig, FilterPredicate, REDACTED};
pub use helper::{ExitHook, Helper, DEFAULT_MESSAGE_KEY};
pub use log_level::{level_name, parse_level, Level, LEVEL_KEY};
pub use logger::{multi_logger, with, with_context, Logger, LoggerNode, SharedLogger};
pub use timestamp::{TimestampFormat, DEFAULT_TIMESTAMP_LAYOUT};
pub use value::{
    caller, default_caller, default_timestamp, timestamp, value, FieldValue, Value, Valuer,
    UNRESOLVED,
};
