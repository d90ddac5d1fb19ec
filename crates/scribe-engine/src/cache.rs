//! Keyed lazy cache for expensive process-wide singletons.
//!
//! Holds one initialized resource per key (acoustic model handles, auxiliary
//! NLP models). Entries live for the process lifetime: the key set is small
//! and bounded by the configured model variants, so there is no eviction.
//!
//! Initialization is double-checked: a fast unlocked read, then a per-key
//! lock, then a re-check under the lock before constructing. Concurrent
//! callers for one key serialize on that key's lock only — different keys
//! never contend. A failed construction leaves nothing behind, so the next
//! caller retries instead of observing a poisoned entry.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

/// Thread-safe, lazily initialized, keyed resource cache.
pub struct ResourceCache<T: ?Sized> {
    entries: RwLock<HashMap<String, Arc<T>>>,
    init_locks: Mutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl<T: ?Sized> ResourceCache<T> {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            init_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Fast lookup without initialization.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries.read().get(key).cloned()
    }

    /// Number of initialized entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no entry has been initialized yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Get the resource for `key`, constructing it with `init` on first use.
    ///
    /// At most one caller constructs per key at a time; the rest block on
    /// the key's lock and then observe the cached resource. `init` errors
    /// are returned to the caller and NOT cached — a later call runs `init`
    /// again. First access pays full construction latency by design.
    pub fn get_or_init<E>(
        &self,
        key: &str,
        init: impl FnOnce() -> Result<Arc<T>, E>,
    ) -> Result<Arc<T>, E> {
        if let Some(found) = self.get(key) {
            return Ok(found);
        }

        let key_lock = self.init_lock(key);
        let _guard = key_lock.lock();

        // Another caller may have finished while we waited for the lock.
        if let Some(found) = self.get(key) {
            return Ok(found);
        }

        let resource = init()?;
        let _ = self
            .entries
            .write()
            .insert(key.to_string(), Arc::clone(&resource));
        Ok(resource)
    }

    fn init_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.init_locks.lock();

        // Opportunistically prune dead weak refs when the map grows.
        if locks.len() > 32 {
            locks.retain(|_, weak| weak.strong_count() > 0);
        }

        if let Some(existing) = locks.get(key).and_then(Weak::upgrade) {
            return existing;
        }
        let lock = Arc::new(Mutex::new(()));
        let _ = locks.insert(key.to_string(), Arc::downgrade(&lock));
        lock
    }
}

impl<T: ?Sized> Default for ResourceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
