use serde::Serialize;
use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    hash::Hash,
    sync::{Mutex, MutexGuard},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Memoization bounded to `max_entries` values.
///
/// Eviction follows insertion order: once full, the entry inserted first is
/// dropped, however recently it was read. This is FIFO, not LRU.
pub struct BoundedCache<K, V> {
    name: String,
    max_entries: usize,
    inner: Mutex<Inner<K, V>>,
}

struct Inner<K, V> {
    entries: HashMap<K, V>,
    order: VecDeque<K>,
    hits: u64,
    misses: u64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(name: impl Into<String>, max_entries: usize) -> Self {
        Self {
            name: name.into(),
            max_entries,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        // A panic while holding the lock cannot leave the map half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        match inner.entries.get(key).cloned() {
            Some(value) => {
                inner.hits += 1;
                debug!("Cache hit for {}", self.name);
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.lock();

        if let Some(existing) = inner.entries.get_mut(&key) {
            *existing = value;
            return;
        }

        inner.entries.insert(key.clone(), value);
        inner.order.push_back(key);

        while inner.entries.len() > self.max_entries {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
            debug!("Evicted oldest cache entry for {}", self.name);
        }
    }

    /// Returns the stored value for `key`, or runs `op` and stores its
    /// successful result. Failures are returned and never stored.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, op: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        debug!("Cache miss for {}, computing...", self.name);
        let value = op().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn info(&self) -> CacheInfo {
        let inner = self.lock();
        CacheInfo {
            size: inner.entries.len(),
            max_size: self.max_entries,
            hits: inner.hits,
            misses: inner.misses,
        }
    }
}
