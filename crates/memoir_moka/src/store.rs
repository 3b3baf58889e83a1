// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Bounded store implementation using moka.

use std::hash::Hash;

use memoir_store::ComputeStore;
use moka::sync::Cache;

use crate::builder::BoundedStoreBuilder;

/// A bounded, evicting store backed by `moka::sync::Cache`.
///
/// Clones are handles onto the same cache. Concurrent misses on one key are coalesced by
/// moka: one caller runs the computation while the others wait for its result. If that
/// computation produces no value, nothing is stored and each waiting caller goes back to
/// the cache, so one of them runs its own computation next.
///
/// # Examples
///
/// ```
/// use memoir_moka::BoundedStore;
/// use memoir_store::ComputeStore;
///
/// let store = BoundedStore::<String, usize>::with_capacity(100);
///
/// let len = store.get_or_compute("hello".to_string(), |key| Some(key.len()));
/// assert_eq!(len, Some(5));
/// ```
#[derive(Debug, Clone)]
pub struct BoundedStore<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, V>,
}

impl<K, V> Default for BoundedStore<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> BoundedStore<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new store without a capacity limit or expiry.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new store holding at most `max_capacity` entries.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::builder().max_capacity(max_capacity).build()
    }

    /// Creates a new builder for configuring a bounded store.
    #[must_use]
    pub fn builder() -> BoundedStoreBuilder<K, V> {
        BoundedStoreBuilder::new()
    }

    pub(crate) fn from_builder(builder: &BoundedStoreBuilder<K, V>) -> Self {
        let mut moka_builder = Cache::builder();

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(ttl) = builder.time_to_live {
            moka_builder = moka_builder.time_to_live(ttl);
        }

        if let Some(tti) = builder.time_to_idle {
            moka_builder = moka_builder.time_to_idle(tti);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: moka_builder.build(),
        }
    }

    /// Returns the value stored for `key`, if present and not expired.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    /// Returns `true` if a live value is stored for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Removes the entry for `key`.
    pub fn invalidate(&self, key: &K) {
        self.inner.invalidate(key);
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    /// Runs moka's pending maintenance (evictions, expirations, count updates).
    ///
    /// Moka performs this work lazily; call it before reading
    /// [`entry_count`](Self::entry_count) when an exact figure matters.
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }

    /// Returns the approximate number of entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl<K, V> ComputeStore<K, V> for BoundedStore<K, V>
where
    K: Clone + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get_or_compute<F>(&self, key: K, compute: F) -> Option<V>
    where
        F: FnOnce(&K) -> Option<V>,
    {
        let mut compute = Some(compute);

        loop {
            let requested = key.clone();
            let value = self
                .inner
                .optionally_get_with(key.clone(), || compute.take().and_then(|compute| compute(&requested)));

            // Moka hands a leader's absent result to its waiters without running their
            // initializers. Nothing was inserted, so ask again until ours runs.
            if value.is_some() || compute.is_none() {
                return value;
            }
        }
    }

    fn len(&self) -> Option<u64> {
        Some(self.inner.entry_count())
    }
}
