//! Macros for building records and formatting helper messages.
//!
//! # Examples
//!
//! ```
//! use rust_log_context::prelude::*;
//! use rust_log_context::infof;
//! use std::sync::Arc;
//!
//! let sink: SharedLogger = Arc::new(StdLogger::new(Vec::new()));
//! let logger = with(&sink, kv!["service", "billing"]);
//! let helper = Helper::new(logger);
//!
//! let port = 8080;
//! infof!(helper, "listening on port {}", port);
//! helper.infow(&kv!["event", "ready", "port", port]);
//! ```

/// Build a `Vec<Value>` from alternating keys and values.
///
/// Every element goes through `Value::from`, so string slices, integers,
/// floats, booleans, `FieldValue`s and `Valuer`s can be mixed freely.
///
/// ```
/// use rust_log_context::kv;
/// use rust_log_context::core::{default_timestamp, Value};
///
/// let fields: Vec<Value> = kv!["user", "alice", "attempt", 3, "ts", default_timestamp()];
/// assert_eq!(fields.len(), 6);
/// assert!(fields[5].is_deferred());
/// ```
#[macro_export]
macro_rules! kv {
    () => {
        ::std::vec::Vec::<$crate::core::Value>::new()
    };
    ($($item:expr),+ $(,)?) => {
        ::std::vec![$($crate::core::Value::from($item)),+]
    };
}

/// Emit a formatted debug message through a `Helper`.
#[macro_export]
macro_rules! debugf {
    ($helper:expr, $($arg:tt)+) => {
        $helper.debugf(::std::format_args!($($arg)+))
    };
}

/// Emit a formatted info message through a `Helper`.
///
/// ```
/// # use rust_log_context::prelude::*;
/// # use std::sync::Arc;
/// # let helper = Helper::new(Arc::new(StdLogger::new(Vec::new())));
/// use rust_log_context::infof;
/// infof!(helper, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! infof {
    ($helper:expr, $($arg:tt)+) => {
        $helper.infof(::std::format_args!($($arg)+))
    };
}

/// Emit a formatted warning through a `Helper`.
#[macro_export]
macro_rules! warnf {
    ($helper:expr, $($arg:tt)+) => {
        $helper.warnf(::std::format_args!($($arg)+))
    };
}

/// Emit a formatted error message through a `Helper`.
#[macro_export]
macro_rules! errorf {
    ($helper:expr, $($arg:tt)+) => {
        $helper.errorf(::std::format_args!($($arg)+))
    };
}

/// Emit a formatted fatal message through a `Helper`, then run its exit
/// hook.
#[macro_export]
macro_rules! fatalf {
    ($helper:expr, $($arg:tt)+) => {
        $helper.fatalf(::std::format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::core::logger::tests::Recorder;
    use crate::core::{Helper, Level, Value};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn helper() -> (Arc<Recorder>, Helper) {
        let rec = Arc::new(Recorder::default());
        (rec.clone(), Helper::new(rec))
    }

    #[test]
    fn test_kv_macro() {
        let empty = kv![];
        assert!(empty.is_empty());

        let fields = kv!["a", 1, "b", 2.5, "c", true,];
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[0], Value::from("a"));
        assert_eq!(fields[3], Value::from(2.5));
    }

    #[test]
    fn test_level_macros() {
        let (rec, h) = helper();
        debugf!(h, "d{}", 1);
        infof!(h, "i{}", 2);
        warnf!(h, "w{}", 3);
        errorf!(h, "e{}", 4);

        let records = rec.records.lock();
        let levels: Vec<Level> = records.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            levels,
            vec![Level::Debug, Level::Info, Level::Warn, Level::Error]
        );
        assert_eq!(records[1].1, kv!["msg", "i2"]);
    }

    #[test]
    fn test_fatal_macro() {
        let exited = Arc::new(AtomicBool::new(false));
        let (rec, h) = helper();
        let h = {
            let exited = exited.clone();
            h.with_exit_hook(move |_| exited.store(true, Ordering::SeqCst))
        };

        fatalf!(h, "Critical failure: {}", "system");
        assert!(exited.load(Ordering::SeqCst));
        assert_eq!(
            rec.last().unwrap(),
            (Level::Fatal, kv!["msg", "Critical failure: system"])
        );
    }
}
