// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Recording store for tests.
//!
//! [`MockStore`] is a conforming store that records every operation and can be told to
//! answer absence for chosen keys, which lets tests reach paths a well-behaved store never
//! takes.

use std::{collections::HashMap, hash::Hash, sync::Arc};

use parking_lot::Mutex;

use crate::ComputeStore;

/// Recorded store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp<K> {
    /// `get_or_compute` found a stored value for the key.
    Hit(K),
    /// `get_or_compute` ran the closure and stored its value.
    Computed(K),
    /// `get_or_compute` ran the closure and it produced no value.
    Absent(K),
    /// `get_or_compute` answered absence without running the closure.
    Declined(K),
    /// A value was stored directly through [`MockStore::insert`].
    Insert(K),
    /// An entry was removed through [`MockStore::invalidate`].
    Invalidate(K),
}

type DeclinePredicate<K> = Box<dyn Fn(&K) -> bool + Send + Sync>;

/// A recording in-memory store for testing.
///
/// Entries live in a single map guarded by one mutex that is held while a closure runs, so
/// the store satisfies the get-or-compute contract (at the cost of serializing all keys).
/// Clones share entries, recorded operations and the decline predicate.
///
/// # Examples
///
/// ```
/// use memoir_store::ComputeStore;
/// use memoir_store::testing::{MockStore, StoreOp};
///
/// let store = MockStore::<&str, i32>::new();
///
/// assert_eq!(store.get_or_compute("a", |_| Some(1)), Some(1));
/// assert_eq!(store.get_or_compute("a", |_| Some(2)), Some(1));
///
/// assert_eq!(store.operations(), vec![StoreOp::Computed("a"), StoreOp::Hit("a")]);
/// ```
///
/// # Declining Keys
///
/// ```
/// use memoir_store::ComputeStore;
/// use memoir_store::testing::MockStore;
///
/// let store = MockStore::<&str, i32>::new();
/// store.decline_when(|key| *key == "forbidden");
///
/// assert_eq!(store.get_or_compute("forbidden", |_| Some(1)), None);
/// assert_eq!(store.get_or_compute("allowed", |_| Some(1)), Some(1));
/// ```
pub struct MockStore<K, V> {
    data: Arc<Mutex<HashMap<K, V>>>,
    operations: Arc<Mutex<Vec<StoreOp<K>>>>,
    decline_when: Arc<Mutex<Option<DeclinePredicate<K>>>>,
}

impl<K, V> std::fmt::Debug for MockStore<K, V>
where
    K: std::fmt::Debug,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("decline_when", &self.decline_when.lock().is_some())
            .finish()
    }
}

impl<K, V> Clone for MockStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            decline_when: Arc::clone(&self.decline_when),
        }
    }
}

impl<K, V> Default for MockStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MockStore<K, V> {
    /// Creates a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            decline_when: Arc::new(Mutex::new(None)),
        }
    }
}

impl<K, V> MockStore<K, V>
where
    K: Eq + Hash,
{
    /// Creates a mock store with pre-populated entries.
    #[must_use]
    pub fn with_data(data: HashMap<K, V>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            operations: Arc::new(Mutex::new(Vec::new())),
            decline_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the store contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Returns a clone of the value stored for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.data.lock().get(key).cloned()
    }
}

impl<K, V> MockStore<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Stores `value` under `key`, bypassing the get-or-compute path.
    pub fn insert(&self, key: K, value: V) {
        self.record(StoreOp::Insert(key.clone()));
        self.data.lock().insert(key, value);
    }

    /// Removes the entry for `key`.
    pub fn invalidate(&self, key: &K) {
        self.record(StoreOp::Invalidate(key.clone()));
        self.data.lock().remove(key);
    }

    /// Makes `get_or_compute` answer `None` without running the closure for matching keys.
    ///
    /// Keys that already hold a value are still answered from the store.
    pub fn decline_when<F>(&self, predicate: F)
    where
        F: Fn(&K) -> bool + Send + Sync + 'static,
    {
        *self.decline_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the decline predicate.
    pub fn clear_declines(&self) {
        *self.decline_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp<K>> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: StoreOp<K>) {
        self.operations.lock().push(op);
    }

    fn should_decline(&self, key: &K) -> bool {
        self.decline_when.lock().as_ref().is_some_and(|predicate| predicate(key))
    }
}

impl<K, V> ComputeStore<K, V> for MockStore<K, V>
where
    K: Clone + Eq + Hash + Send,
    V: Clone + Send,
{
    fn get_or_compute<F>(&self, key: K, compute: F) -> Option<V>
    where
        F: FnOnce(&K) -> Option<V>,
    {
        let mut data = self.data.lock();

        if let Some(value) = data.get(&key) {
            let value = value.clone();
            drop(data);
            self.record(StoreOp::Hit(key));
            return Some(value);
        }

        if self.should_decline(&key) {
            drop(data);
            self.record(StoreOp::Declined(key));
            return None;
        }

        match compute(&key) {
            Some(value) => {
                data.insert(key.clone(), value.clone());
                drop(data);
                self.record(StoreOp::Computed(key));
                Some(value)
            }
            None => {
                drop(data);
                self.record(StoreOp::Absent(key));
                None
            }
        }
    }

    fn len(&self) -> Option<u64> {
        u64::try_from(self.data.lock().len()).ok()
    }
}
