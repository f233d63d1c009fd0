//! Request-scoped metadata carried between services
//!
//! `Metadata` is a case-insensitive string map. Transport middleware decodes
//! incoming headers into it and attaches it to the request [`Context`] as
//! *server* metadata; code building outgoing calls accumulates *client*
//! metadata on its context, which the encoding middleware reads before
//! dispatch. The two slots are independent.
//!
//! # Example
//!
//! ```
//! use rust_log_context::metadata::{self, Metadata};
//! use rust_log_context::Context;
//!
//! let ctx = metadata::append_to_client_context(&Context::background(), &["X-Tenant", "acme"]);
//! let md = metadata::from_client_context(&ctx).unwrap();
//! assert_eq!(md.get("x-tenant"), "acme");
//! ```

use crate::context::Context;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::hash_map::{self, HashMap};

/// Mapping of lower-cased keys to values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(HashMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Build metadata from several maps, applying [`Metadata::set`] to each
    /// pair in order.
    pub fn from_maps<'a, I>(maps: I) -> Self
    where
        I: IntoIterator<Item = &'a HashMap<String, String>>,
    {
        let mut md = Self::new();
        for map in maps {
            for (k, v) in map {
                md.set(k, v);
            }
        }
        md
    }

    /// Value stored under `key`, or `""` when absent
    pub fn get(&self, key: &str) -> &str {
        self.0
            .get(&key.to_lowercase())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Store `value` under the lower-cased `key`. Empty keys or values are
    /// ignored.
    pub fn set(&mut self, key: &str, value: &str) {
        if key.is_empty() || value.is_empty() {
            return;
        }
        self.0.insert(key.to_lowercase(), value.to_string());
    }

    /// Visit every pair until `visit` returns `false`
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        for (k, v) in &self.0 {
            if !visit(k, v) {
                break;
            }
        }
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy every raw entry of `other` over this map
    fn overwrite_from(&mut self, other: &Metadata) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut md = Metadata::new();
        for (k, v) in iter {
            md.set(k.as_ref(), v.as_ref());
        }
        md
    }
}

impl From<HashMap<String, String>> for Metadata {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Metadata {
    /// Decoded pairs go through [`Metadata::set`], so keys come out
    /// lower-cased and empty entries are dropped.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        HashMap::<String, String>::deserialize(deserializer).map(Metadata::from)
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

struct ServerMetadataKey;
struct ClientMetadataKey;

/// Attach metadata received by a server
pub fn new_server_context(ctx: &Context, md: Metadata) -> Context {
    ctx.with_value::<ServerMetadataKey, _>(md)
}

/// Server metadata attached to `ctx`, if any
pub fn from_server_context(ctx: &Context) -> Option<&Metadata> {
    ctx.value::<ServerMetadataKey, Metadata>()
}

/// Attach metadata for outgoing calls, replacing any already attached
pub fn new_client_context(ctx: &Context, md: Metadata) -> Context {
    ctx.with_value::<ClientMetadataKey, _>(md)
}

/// Client metadata attached to `ctx`, if any
pub fn from_client_context(ctx: &Context) -> Option<&Metadata> {
    ctx.value::<ClientMetadataKey, Metadata>()
}

/// Derive a context whose client metadata is the existing one plus the
/// `kv` pairs, applied with [`Metadata::set`].
///
/// # Panics
///
/// Panics if `kv` has an odd number of elements.
pub fn append_to_client_context(ctx: &Context, kv: &[&str]) -> Context {
    if kv.len() % 2 == 1 {
        panic!(
            "metadata: append_to_client_context got an odd number of input pairs for metadata: {}",
            kv.len()
        );
    }
    let mut md = from_client_context(ctx).cloned().unwrap_or_default();
    for pair in kv.chunks_exact(2) {
        md.set(pair[0], pair[1]);
    }
    new_client_context(ctx, md)
}

/// Derive a context whose client metadata is the existing one overwritten
/// by every entry of `extra`.
pub fn merge_to_client_context(ctx: &Context, extra: &Metadata) -> Context {
    let mut md = from_client_context(ctx).cloned().unwrap_or_default();
    md.overwrite_from(extra);
    new_client_context(ctx, md)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(pairs: &[(&str, &str)]) -> Metadata {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_from_maps() {
        let a: HashMap<String, String> = [("Hello".to_string(), "nb".to_string())].into();
        let b: HashMap<String, String> = [("hello2".to_string(), "go-nb".to_string())].into();

        let got = Metadata::from_maps([&a, &b]);
        assert_eq!(got, md(&[("hello", "nb"), ("hello2", "go-nb")]));
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let mut m = Metadata::new();
        m.set("Foo", "bar");
        assert_eq!(m.get("fOO"), "bar");
        assert_eq!(m.get("missing"), "");
    }

    #[test]
    fn test_set_ignores_empty_key_or_value() {
        let mut m = md(&[("a", "1")]);
        m.set("X", "");
        m.set("", "X");
        assert_eq!(m, md(&[("a", "1")]));
    }

    #[test]
    fn test_set_overwrites() {
        let mut m = md(&[("env", "dev")]);
        m.set("ENV", "prod");
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("env"), "prod");
    }

    #[test]
    fn test_range_stops_early() {
        let m = md(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let mut visited = 0;
        m.range(|_, _| {
            visited += 1;
            false
        });
        assert_eq!(visited, 1);

        let mut all = Vec::new();
        m.range(|k, v| {
            all.push(format!("{}={}", k, v));
            true
        });
        all.sort();
        assert_eq!(all, vec!["a=1", "b=2", "c=3"]);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = md(&[("a", "1")]);
        let mut copy = original.clone();
        copy.set("b", "2");
        assert_eq!(original.len(), 1);

        let mut original = original;
        original.set("a", "changed");
        assert_eq!(copy.get("a"), "1");
    }

    #[test]
    fn test_server_and_client_slots_are_independent() {
        let ctx = new_server_context(&Context::background(), md(&[("from", "server")]));
        assert!(from_client_context(&ctx).is_none());
        assert_eq!(from_server_context(&ctx).unwrap().get("from"), "server");

        let ctx = new_client_context(&ctx, Metadata::new());
        assert!(from_client_context(&ctx).unwrap().is_empty());
        assert_eq!(from_server_context(&ctx).unwrap().get("from"), "server");
    }

    #[test]
    fn test_append_to_client_context() {
        let base = new_client_context(&Context::background(), md(&[("keep", "me")]));
        let ctx = append_to_client_context(&base, &["a", "1", "B", "2"]);

        assert_eq!(
            from_client_context(&ctx).unwrap(),
            &md(&[("keep", "me"), ("a", "1"), ("b", "2")])
        );
        assert_eq!(from_client_context(&base).unwrap(), &md(&[("keep", "me")]));
    }

    #[test]
    fn test_append_without_existing_metadata() {
        let ctx = append_to_client_context(&Context::background(), &["k", "v", "empty", ""]);
        assert_eq!(from_client_context(&ctx).unwrap(), &md(&[("k", "v")]));
    }

    #[test]
    #[should_panic(expected = "odd number of input pairs")]
    fn test_append_odd_arguments_panics() {
        let _ = append_to_client_context(&Context::background(), &["a", "1", "b"]);
    }

    #[test]
    fn test_merge_to_client_context() {
        let base = new_client_context(&Context::background(), md(&[("a", "1"), ("b", "2")]));
        let ctx = merge_to_client_context(&base, &md(&[("b", "20"), ("c", "30")]));

        assert_eq!(
            from_client_context(&ctx).unwrap(),
            &md(&[("a", "1"), ("b", "20"), ("c", "30")])
        );
        assert_eq!(from_client_context(&base).unwrap().get("b"), "2");
    }

    #[test]
    fn test_serde_as_plain_map() {
        let m = md(&[("trace-id", "abc")]);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"trace-id":"abc"}"#);

        let back: Metadata = serde_json::from_str(r#"{"Trace-ID":"abc","blank":""}"#).unwrap();
        assert_eq!(back, m);
    }
}
