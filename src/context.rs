//! Ambient, immutable key/value scope passed explicitly through call chains
//!
//! A `Context` is a persistent linked list of typed entries. Deriving a new
//! context with [`Context::with_value`] never touches the parent, so a
//! context can be shared freely between threads and cloned cheaply.
//!
//! Keys are marker types rather than strings. A module that keeps its key
//! type private owns that slot outright: nobody else can read or shadow it.
//!
//! # Example
//!
//! ```
//! use rust_log_context::Context;
//!
//! struct RequestId;
//!
//! let root = Context::background();
//! let ctx = root.with_value::<RequestId, _>("req-42".to_string());
//!
//! assert_eq!(ctx.value::<RequestId, String>().map(String::as_str), Some("req-42"));
//! assert!(root.value::<RequestId, String>().is_none());
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

struct Entry {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

impl Context {
    /// The empty root context
    pub fn background() -> Self {
        Self { head: None }
    }

    /// Derive a child context carrying `value` under the key type `K`.
    ///
    /// Lookups on the child see the new value; the receiver is unchanged.
    #[must_use]
    pub fn with_value<K, V>(&self, value: V) -> Context
    where
        K: 'static,
        V: Any + Send + Sync,
    {
        Context {
            head: Some(Arc::new(Entry {
                key: TypeId::of::<K>(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Nearest value stored under `K`, if it has type `V`.
    pub fn value<K, V>(&self) -> Option<&V>
    where
        K: 'static,
        V: Any,
    {
        let key = TypeId::of::<K>();
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            if entry.key == key {
                return entry.value.downcast_ref::<V>();
            }
            cursor = entry.parent.as_deref();
        }
        None
    }

    /// Number of entries visible from this context, shadowed ones included
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            depth += 1;
            cursor = entry.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("depth", &self.depth()).finish()
    }
}
