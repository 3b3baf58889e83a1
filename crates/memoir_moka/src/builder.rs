// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring bounded stores.
//!
//! The builder forwards sizing and expiry settings to moka without putting moka's own
//! builder type in the public API.

use std::hash::Hash;
use std::marker::PhantomData;
use std::time::Duration;

use crate::store::BoundedStore;

/// Builder for configuring a [`BoundedStore`].
///
/// Every setting is optional. An unconfigured builder produces an unbounded store that never
/// expires entries.
///
/// # Examples
///
/// ```
/// use memoir_moka::BoundedStore;
/// use std::time::Duration;
///
/// let store = BoundedStore::<String, i32>::builder()
///     .max_capacity(1000)
///     .time_to_live(Duration::from_secs(300))
///     .time_to_idle(Duration::from_secs(60))
///     .initial_capacity(100)
///     .name("parsed-configs")
///     .build();
/// ```
#[derive(Debug)]
pub struct BoundedStoreBuilder<K, V> {
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) time_to_live: Option<Duration>,
    pub(crate) time_to_idle: Option<Duration>,
    pub(crate) name: Option<String>,
    _phantom: PhantomData<(K, V)>,
}

impl<K, V> Default for BoundedStoreBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> BoundedStoreBuilder<K, V> {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_capacity: None,
            initial_capacity: None,
            time_to_live: None,
            time_to_idle: None,
            name: None,
            _phantom: PhantomData,
        }
    }

    /// Sets the maximum number of entries.
    ///
    /// Once the capacity is reached, moka evicts entries using `TinyLFU` (LRU eviction
    /// combined with LFU admission). Eviction happens asynchronously with respect to
    /// inserts, so the entry count can briefly exceed the limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use memoir_moka::BoundedStore;
    ///
    /// let store = BoundedStore::<u64, u64>::builder().max_capacity(10_000).build();
    /// ```
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets the initial capacity (pre-allocation hint).
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets the time-to-live for all entries.
    ///
    /// Entries expire this long after they were computed, regardless of access. An expired
    /// key is absent again, so the next memoized call recomputes it.
    ///
    /// # Examples
    ///
    /// ```
    /// use memoir_moka::BoundedStore;
    /// use std::time::Duration;
    ///
    /// let store = BoundedStore::<u64, u64>::builder()
    ///     .time_to_live(Duration::from_secs(300))
    ///     .build();
    /// ```
    #[must_use]
    pub fn time_to_live(mut self, duration: Duration) -> Self {
        self.time_to_live = Some(duration);
        self
    }

    /// Sets the time-to-idle for all entries.
    ///
    /// Entries expire after this duration without a read or write.
    #[must_use]
    pub fn time_to_idle(mut self, duration: Duration) -> Self {
        self.time_to_idle = Some(duration);
        self
    }

    /// Sets a name for the store, visible in moka's own debugging output.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured store.
    #[must_use]
    pub fn build(self) -> BoundedStore<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        BoundedStore::from_builder(&self)
    }
}
