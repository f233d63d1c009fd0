//! Record values and deferred value resolution
//!
//! This module provides:
//! - `FieldValue`: a concrete value carried in a record
//! - `Valuer`: a computation evaluated against the ambient [`Context`] at
//!   emission time
//! - `Value`: either of the two, the element type of every key/value record
//! - the built-in `caller` and `timestamp` resolvers

use super::timestamp::TimestampFormat;
use crate::context::Context;
use serde::{Deserialize, Serialize};
use std::backtrace::Backtrace;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Concrete value type for structured logging fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<usize> for FieldValue {
    fn from(i: usize) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// A value computed from the ambient context when a record is emitted.
#[derive(Clone)]
pub struct Valuer(Arc<dyn Fn(&Context) -> FieldValue + Send + Sync>);

impl Valuer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Context) -> FieldValue + Send + Sync + 'static,
    {
        Valuer(Arc::new(f))
    }

    pub fn call(&self, ctx: &Context) -> FieldValue {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Valuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Valuer(..)")
    }
}

/// One element of a key/value record.
#[derive(Debug, Clone)]
pub enum Value {
    Concrete(FieldValue),
    Deferred(Valuer),
}

impl Value {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Value::Deferred(_))
    }

    pub fn as_concrete(&self) -> Option<&FieldValue> {
        match self {
            Value::Concrete(v) => Some(v),
            Value::Deferred(_) => None,
        }
    }

    /// String payload of a concrete string value
    pub fn as_str(&self) -> Option<&str> {
        self.as_concrete().and_then(FieldValue::as_str)
    }
}

/// Placeholder printed for a deferred value that reached a sink unresolved
pub const UNRESOLVED: &str = "<deferred>";

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Concrete(v) => v.fmt(f),
            Value::Deferred(_) => f.write_str(UNRESOLVED),
        }
    }
}

impl PartialEq for Value {
    /// Concrete values compare by content; deferred values by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Concrete(a), Value::Concrete(b)) => a == b,
            (Value::Deferred(a), Value::Deferred(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl From<Valuer> for Value {
    fn from(v: Valuer) -> Self {
        Value::Deferred(v)
    }
}

impl From<FieldValue> for Value {
    fn from(v: FieldValue) -> Self {
        Value::Concrete(v)
    }
}

macro_rules! impl_from_concrete {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Concrete(FieldValue::from(v))
                }
            }
        )*
    };
}

impl_from_concrete!(String, &str, i64, i32, u32, usize, f64, bool);

/// Resolve `v` against `ctx`: deferred values are invoked, concrete values
/// pass through unchanged.
pub fn value(ctx: &Context, v: &Value) -> FieldValue {
    match v {
        Value::Concrete(v) => v.clone(),
        Value::Deferred(valuer) => valuer.call(ctx),
    }
}

/// Replace every deferred value at an odd position with its result.
pub(crate) fn bind_values(ctx: &Context, keyvals: &mut [Value]) {
    for slot in keyvals.iter_mut().skip(1).step_by(2) {
        if let Value::Deferred(valuer) = slot {
            *slot = Value::Concrete(valuer.call(ctx));
        }
    }
}

/// Whether any value position (odd index) holds a deferred value.
pub(crate) fn contains_valuer(keyvals: &[Value]) -> bool {
    keyvals.iter().skip(1).step_by(2).any(Value::is_deferred)
}

/// Resolves to the `file:line` of the code that issued the log call.
///
/// Frames of the logging machinery itself (node, filter, helper and this
/// module), the standard library and backtrace capture are never reported;
/// `depth` skips that many further frames above the first foreign one, for
/// callers that wrap the helper in their own logging functions.
pub fn caller(depth: usize) -> Valuer {
    Valuer::new(move |_ctx| {
        let backtrace = Backtrace::force_capture();
        let rendered = format!("{:#}", backtrace);
        let location = frame_locations(&rendered)
            .filter(|(file, _)| !is_internal_frame(file))
            .nth(depth);
        match location {
            Some((file, line)) => {
                let name = file.rsplit(['/', '\\']).next().unwrap_or(file);
                FieldValue::String(format!("{}:{}", name, line))
            }
            None => FieldValue::String("unknown:0".to_string()),
        }
    })
}

/// Caller resolver reporting the direct user call site
pub fn default_caller() -> Valuer {
    caller(0)
}

/// Resolves to the current wall-clock time rendered with `format`.
///
/// Unix layouts resolve to an integer field, every other layout to text.
pub fn timestamp(format: impl Into<TimestampFormat>) -> Valuer {
    let format = format.into();
    Valuer::new(move |_ctx| {
        let rendered = format.now();
        if format.is_numeric() {
            if let Ok(epoch) = rendered.parse::<i64>() {
                return FieldValue::Int(epoch);
            }
        }
        FieldValue::String(rendered)
    })
}

/// Timestamp resolver using [`TimestampFormat::Rfc3339`]
pub fn default_timestamp() -> Valuer {
    timestamp(TimestampFormat::default())
}

/// Extract `(file, line)` from every `at <file>:<line>:<col>` line of a
/// rendered backtrace, innermost frame first.
fn frame_locations(rendered: &str) -> impl Iterator<Item = (&str, u32)> {
    rendered.lines().filter_map(|line| {
        let location = line.trim_start().strip_prefix("at ")?;
        let (rest, last) = location.rsplit_once(':')?;
        let last: u32 = last.parse().ok()?;
        // The column is optional
        match rest.rsplit_once(':') {
            Some((file, line_no)) => match line_no.parse() {
                Ok(line_no) => Some((file, line_no)),
                Err(_) => Some((rest, last)),
            },
            None => Some((rest, last)),
        }
    })
}

fn is_internal_frame(file: &str) -> bool {
    let normalized = file.replace('\\', "/");
    normalized.contains("/rustc/")
        || normalized.contains("/library/std/")
        || normalized.contains("/library/core/")
        || normalized.contains("/library/alloc/")
        || normalized.contains("/backtrace/src/")
        || INTERNAL_SOURCES
            .iter()
            .any(|source| is_own_source(&normalized, source))
}

/// Whether `frame` is the crate's own `source` file.
///
/// `file!()` is either absolute or relative to the directory cargo ran
/// rustc from, which is this package or a workspace above it. A user file
/// that merely shares the relative path lives under another root and does
/// not match.
fn is_own_source(frame: &str, source: &str) -> bool {
    let source = source.replace('\\', "/");
    if frame == source {
        return true;
    }
    if Path::new(&source).is_absolute() {
        return false;
    }
    match frame
        .strip_suffix(source.as_str())
        .and_then(|root| root.strip_suffix('/'))
    {
        Some(root) => Path::new(&MANIFEST_DIR.replace('\\', "/")).starts_with(root),
        None => false,
    }
}

const MANIFEST_DIR: &str = env!("CARGO_MANIFEST_DIR");

/// Sources whose frames are never a meaningful call site.
const INTERNAL_SOURCES: [&str; 4] = [
    file!(),
    super::logger::SOURCE_FILE,
    super::filter::SOURCE_FILE,
    super::helper::SOURCE_FILE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_passes_concrete_through() {
        let ctx = Context::background();
        let v = Value::from("plain");
        assert_eq!(value(&ctx, &v), FieldValue::from("plain"));
    }

    #[test]
    fn test_value_invokes_deferred_with_context() {
        struct Tenant;
        let ctx = Context::background().with_value::<Tenant, _>("acme".to_string());
        let v = Value::from(Valuer::new(|ctx| {
            ctx.value::<Tenant, String>()
                .map(|t| FieldValue::from(t.as_str()))
                .unwrap_or(FieldValue::Null)
        }));

        assert_eq!(value(&ctx, &v), FieldValue::from("acme"));
        assert_eq!(value(&Context::background(), &v), FieldValue::Null);
    }

    #[test]
    fn test_bind_values_only_touches_value_positions() {
        let ctx = Context::background();
        let deferred = Valuer::new(|_| FieldValue::Int(7));
        let mut kvs = vec![
            Value::from(deferred.clone()),
            Value::from(deferred.clone()),
            Value::from("k"),
            Value::from("v"),
        ];

        assert!(contains_valuer(&kvs));
        bind_values(&ctx, &mut kvs);

        assert!(kvs[0].is_deferred());
        assert_eq!(kvs[1], Value::from(7i64));
        assert!(!contains_valuer(&kvs));
    }

    #[test]
    fn test_contains_valuer_ignores_key_positions() {
        let kvs = vec![Value::from(Valuer::new(|_| FieldValue::Null))];
        assert!(!contains_valuer(&kvs));
    }

    #[test]
    fn test_frame_locations_parsing() {
        let rendered = "   0: app::main\n             at /home/u/app/src/main.rs:12:5\n   1: std::rt::lang_start\n             at /rustc/abc/library/std/src/rt.rs:159:18\n";
        let frames: Vec<_> = frame_locations(rendered).collect();
        assert_eq!(
            frames,
            vec![
                ("/home/u/app/src/main.rs", 12),
                ("/rustc/abc/library/std/src/rt.rs", 159)
            ]
        );
        assert!(is_internal_frame(frames[1].0));
        assert!(!is_internal_frame(frames[0].0));
    }

    #[test]
    fn test_frame_locations_without_column() {
        let rendered = "   3: app::run\n             at /home/u/app/src/run.rs:40\n";
        let frames: Vec<_> = frame_locations(rendered).collect();
        assert_eq!(frames, vec![("/home/u/app/src/run.rs", 40)]);
    }

    fn own_path(source: &str) -> String {
        if Path::new(source).is_absolute() {
            source.replace('\\', "/")
        } else {
            format!("{}/{}", MANIFEST_DIR, source).replace('\\', "/")
        }
    }

    #[test]
    fn test_internal_sources_are_skipped() {
        assert!(is_internal_frame(&own_path(super::super::helper::SOURCE_FILE)));
        assert!(is_internal_frame(&own_path(super::super::filter::SOURCE_FILE)));
        assert!(is_internal_frame(&own_path(file!())));
    }

    #[test]
    fn test_user_file_with_same_relative_path_is_kept() {
        let source = "src/core/helper.rs";
        assert!(!is_own_source("/srv/app/src/core/helper.rs", source));
        let nested = format!("{}/tests/app/{}", MANIFEST_DIR, source);
        assert!(!is_own_source(&nested, source));
    }

    #[test]
    fn test_workspace_relative_source_matches() {
        let manifest = Path::new(MANIFEST_DIR);
        let package = manifest.file_name().and_then(|n| n.to_str()).unwrap();
        let Some(workspace) = manifest.parent().and_then(Path::to_str) else {
            return;
        };
        let source = format!("{}/src/core/helper.rs", package);
        let frame = format!("{}/{}", workspace, source).replace('\\', "/");
        assert!(is_own_source(&frame, &source));
    }

    #[test]
    fn test_numeric_timestamp_is_an_integer() {
        let resolved = timestamp(TimestampFormat::Unix).call(&Context::background());
        assert!(matches!(resolved, FieldValue::Int(secs) if secs > 1_700_000_000));
    }

    #[test]
    fn test_timestamp_valuer_uses_layout() {
        let ts = timestamp("%Y");
        let rendered = ts.call(&Context::background());
        let year: i32 = rendered.as_str().unwrap().parse().unwrap();
        assert!(year >= 2024);
    }

    #[test]
    fn test_default_caller_reports_file_and_line() {
        let resolved = default_caller().call(&Context::background());
        let rendered = resolved.as_str().unwrap().to_string();
        let (file, line) = rendered.rsplit_once(':').unwrap();
        assert!(!file.contains('/'));
        assert!(line.parse::<u32>().is_ok());
    }
}
