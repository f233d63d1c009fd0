//! Per-level convenience methods over a logger
//!
//! Each level has three forms:
//! - `info(&[..])` concatenates its arguments into one message, back to
//!   back with no separator: `info(&[&1, &2, &"a"])` emits `"12a"`
//! - `infof(format_args!(..))` formats a message (see the `infof!` macro)
//! - `infow(&kv![..])` emits raw key/value pairs
//!
//! Message forms emit the single pair `(message_key, text)`. Sink failures
//! are swallowed. Fatal forms call the exit hook with code 1 after emitting,
//! whatever the outcome.

use super::{
    log_level::Level,
    logger::{with_context, SharedLogger},
    value::Value,
};
use crate::context::Context;
use std::fmt::{self, Display};
use std::sync::Arc;

pub(crate) const SOURCE_FILE: &str = file!();

/// Key under which helper messages are emitted unless overridden
pub const DEFAULT_MESSAGE_KEY: &str = "msg";

/// Process termination primitive used by the fatal forms
pub type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

#[derive(Clone)]
pub struct Helper {
    logger: SharedLogger,
    msg_key: String,
    exit: ExitHook,
}

macro_rules! level_methods {
    ($level:expr, $concat:ident, $formatted:ident, $raw:ident) => {
        /// Emit the `Display` text of `args` joined with no separator.
        /// Spacing between operands is up to the caller.
        #[inline]
        pub fn $concat(&self, args: &[&dyn Display]) {
            self.message($level, concat(args));
        }

        #[inline]
        pub fn $formatted(&self, args: fmt::Arguments<'_>) {
            self.message($level, fmt::format(args));
        }

        #[inline]
        pub fn $raw(&self, keyvals: &[Value]) {
            self.log($level, keyvals);
        }
    };
}

impl Helper {
    pub fn new(logger: SharedLogger) -> Self {
        Self {
            logger,
            msg_key: DEFAULT_MESSAGE_KEY.to_string(),
            exit: Arc::new(exit_process),
        }
    }

    /// Emit messages under `key` instead of [`DEFAULT_MESSAGE_KEY`]
    #[must_use]
    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.msg_key = key.into();
        self
    }

    /// Replace the process termination used by the fatal forms
    #[must_use]
    pub fn with_exit_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.exit = Arc::new(hook);
        self
    }

    pub fn message_key(&self) -> &str {
        &self.msg_key
    }

    pub fn logger(&self) -> &SharedLogger {
        &self.logger
    }

    /// Helper with the same message key whose logger is bound to `ctx`
    #[must_use]
    pub fn with_context(&self, ctx: &Context) -> Helper {
        Helper {
            logger: with_context(ctx, &self.logger),
            msg_key: self.msg_key.clone(),
            exit: Arc::clone(&self.exit),
        }
    }

    /// Emit `keyvals` at `level`, discarding any sink error
    pub fn log(&self, level: Level, keyvals: &[Value]) {
        let _ = self.logger.log(level, keyvals);
    }

    fn message(&self, level: Level, text: String) {
        self.log(
            level,
            &[Value::from(self.msg_key.as_str()), Value::from(text)],
        );
    }

    level_methods!(Level::Debug, debug, debugf, debugw);
    level_methods!(Level::Info, info, infof, infow);
    level_methods!(Level::Warn, warn, warnf, warnw);
    level_methods!(Level::Error, error, errorf, errorw);

    pub fn fatal(&self, args: &[&dyn Display]) {
        self.message(Level::Fatal, concat(args));
        (self.exit)(1);
    }

    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.message(Level::Fatal, fmt::format(args));
        (self.exit)(1);
    }

    pub fn fatalw(&self, keyvals: &[Value]) {
        self.log(Level::Fatal, keyvals);
        (self.exit)(1);
    }
}

fn exit_process(code: i32) {
    std::process::exit(code)
}

fn concat(args: &[&dyn Display]) -> String {
    args.iter().map(|arg| arg.to_string()).collect()
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helper")
            .field("msg_key", &self.msg_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logger::tests::Recorder;
    use crate::core::logger::with;
    use crate::core::value::{FieldValue, Valuer};
    use crate::kv;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

    fn helper() -> (Arc<Recorder>, Helper) {
        let rec = Arc::new(Recorder::default());
        (rec.clone(), Helper::new(rec))
    }

    #[test]
    fn test_concat_form() {
        let (rec, h) = helper();
        h.info(&[&"listening on port ", &8080]);
        assert_eq!(
            rec.last().unwrap(),
            (Level::Info, kv!["msg", "listening on port 8080"])
        );
    }

    #[test]
    fn test_concat_form_adds_no_separators() {
        let (rec, h) = helper();
        h.info(&[&1, &2, &"a", &3]);
        assert_eq!(rec.last().unwrap(), (Level::Info, kv!["msg", "12a3"]));
    }

    #[test]
    fn test_formatted_form() {
        let (rec, h) = helper();
        h.warnf(format_args!("{} retries left", 3));
        assert_eq!(rec.last().unwrap(), (Level::Warn, kv!["msg", "3 retries left"]));
    }

    #[test]
    fn test_raw_form_has_no_message_key() {
        let (rec, h) = helper();
        h.errorw(&kv!["code", 500, "path", "/x"]);
        assert_eq!(rec.last().unwrap(), (Level::Error, kv!["code", 500, "path", "/x"]));
    }

    #[test]
    fn test_custom_message_key() {
        let (rec, h) = helper();
        let h = h.with_message_key("message");
        h.debug(&[&"hi"]);
        assert_eq!(rec.last().unwrap(), (Level::Debug, kv!["message", "hi"]));
    }

    #[test]
    fn test_errors_are_swallowed() {
        let rec = Arc::new(Recorder::failing());
        let h = Helper::new(rec.clone());
        h.info(&[&"ignored"]);
        h.log(Level::Error, &kv!["k", "v"]);
        assert_eq!(rec.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fatal_emits_once_then_exits() {
        let rec = Arc::new(Recorder::failing());
        let seen_at_exit = Arc::new(AtomicUsize::new(usize::MAX));
        let exit_code = Arc::new(AtomicI32::new(0));

        let h = {
            let rec = rec.clone();
            let seen_at_exit = seen_at_exit.clone();
            let exit_code = exit_code.clone();
            Helper::new(rec.clone()).with_exit_hook(move |code| {
                seen_at_exit.store(rec.calls.load(Ordering::SeqCst), Ordering::SeqCst);
                exit_code.store(code, Ordering::SeqCst);
            })
        };

        h.fatalf(format_args!("disk {} gone", "/dev/sda"));
        assert_eq!(seen_at_exit.load(Ordering::SeqCst), 1);
        assert_eq!(exit_code.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_every_fatal_form_exits() {
        let exits = Arc::new(AtomicUsize::new(0));
        let (rec, h) = helper();
        let h = {
            let exits = exits.clone();
            h.with_exit_hook(move |_| {
                exits.fetch_add(1, Ordering::SeqCst);
            })
        };

        h.fatal(&[&"a"]);
        h.fatalf(format_args!("b"));
        h.fatalw(&kv!["c", 1]);

        assert_eq!(exits.load(Ordering::SeqCst), 3);
        let levels: Vec<Level> = rec.records.lock().iter().map(|(l, _)| *l).collect();
        assert_eq!(levels, vec![Level::Fatal; 3]);
    }

    #[test]
    fn test_with_context_rebinds_logger() {
        struct Trace;
        let rec = Arc::new(Recorder::default());
        let trace = Valuer::new(|ctx| {
            ctx.value::<Trace, &'static str>()
                .map(|t| FieldValue::from(*t))
                .unwrap_or(FieldValue::Null)
        });
        let base = with(&(rec.clone() as SharedLogger), kv!["trace", trace]);
        let h = Helper::new(base).with_message_key("m");

        let scoped = h.with_context(&Context::background().with_value::<Trace, _>("t-1"));
        assert_eq!(scoped.message_key(), "m");

        scoped.info(&[&"ok"]);
        assert_eq!(rec.last().unwrap().1, kv!["trace", "t-1", "m", "ok"]);
    }
}
