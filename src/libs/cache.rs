use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

/// A capacity-bounded memo table shared between callers.
///
/// Entries are immutable once stored. Lookups use `peek`, so reads never
/// reorder entries and the oldest insertion is the one discarded when the
/// cache is full.
pub struct BoundedCache<K: Hash + Eq, V> {
    inner: Mutex<LruCache<K, Arc<V>>>,
}

impl<K: Hash + Eq + Clone, V> BoundedCache<K, V> {
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.peek(key).cloned()
    }

    /// Returns the cached value for `key`, computing and storing it if absent.
    ///
    /// `make` runs without holding the lock. When two callers race on the
    /// same key, the value stored first wins and both get it back.
    pub fn get_or_try_insert<E, F>(&self, key: &K, make: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let value = Arc::new(make()?);

        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = guard.peek(key) {
            return Ok(existing.clone());
        }
        guard.put(key.clone(), value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
