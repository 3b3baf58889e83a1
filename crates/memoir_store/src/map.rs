// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Process-local store backed by `DashMap`.

use std::{
    fmt::Debug,
    hash::Hash,
    sync::{Arc, OnceLock},
};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::ComputeStore;

/// One key's place in the map.
///
/// The value is written at most once. The first caller to find it empty takes the leader
/// lock and computes; callers for the same key queue on that lock and read the value it
/// left behind. Shard locks are never held across a computation.
#[derive(Debug)]
struct Slot<V> {
    value: OnceLock<V>,
    leader: Mutex<()>,
}

impl<V> Slot<V> {
    fn empty() -> Self {
        Self {
            value: OnceLock::new(),
            leader: Mutex::new(()),
        }
    }

    fn filled(value: V) -> Self {
        Self {
            value: OnceLock::from(value),
            leader: Mutex::new(()),
        }
    }
}

/// A process-local concurrent store backed by a sharded hash map.
///
/// `ConcurrentMap` is a cheap handle: clones share the same underlying map, so the caller
/// can keep one clone to pre-populate or inspect entries while a memoizer owns another.
///
/// [`get_or_compute`](ComputeStore::get_or_compute) gives every key its own slot. Callers
/// racing on one absent key queue behind the first, which computes while the others wait;
/// callers on other keys (including the computation itself) are never blocked by it. A
/// computation may therefore memoize recursively into the same map, as long as it does not
/// ask for the key it is computing.
///
/// When the computation produces no value, its slot is dropped and the next waiting caller
/// runs its own computation.
///
/// The map never evicts. Use a bounded store when the key space is unbounded.
///
/// # Examples
///
/// ```
/// use memoir_store::{ComputeStore, ConcurrentMap};
///
/// let map = ConcurrentMap::<u32, String>::new();
/// map.insert(1, "one".to_string());
///
/// let hit = map.get_or_compute(1, |_| unreachable!("value is present"));
/// assert_eq!(hit.as_deref(), Some("one"));
///
/// let miss = map.get_or_compute(2, |key| Some(format!("#{key}")));
/// assert_eq!(miss.as_deref(), Some("#2"));
/// assert_eq!(map.get(&2).as_deref(), Some("#2"));
/// ```
pub struct ConcurrentMap<K, V> {
    inner: Arc<DashMap<K, Arc<Slot<V>>>>,
}

impl<K, V> Clone for ConcurrentMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Debug for ConcurrentMap<K, V>
where
    K: Eq + Hash + Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries = f.debug_map();
        for entry in self.inner.iter() {
            if let Some(value) = entry.value().value.get() {
                entries.entry(entry.key(), value);
            }
        }
        entries.finish()
    }
}

impl<K, V> Default for ConcurrentMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ConcurrentMap<K, V>
where
    K: Eq + Hash,
{
    /// Creates a new, empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Creates a new, empty map with room for at least `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::with_capacity(capacity)),
        }
    }

    /// Returns a clone of the value stored for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.slot(key)?.value.get().cloned()
    }

    /// Returns `true` if a value is stored for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.slot(key).is_some_and(|slot| slot.value.get().is_some())
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// Replacing an entry whose key a memoizer is computing at the same moment is
    /// undefined with respect to which value callers observe.
    pub fn insert(&self, key: K, value: V) -> Option<V>
    where
        V: Clone,
    {
        let replaced = self.inner.insert(key, Arc::new(Slot::filled(value)))?;
        replaced.value.get().cloned()
    }

    /// Removes the entry for `key`, returning its value.
    pub fn invalidate(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let (_, slot) = self.inner.remove(key)?;
        slot.value.get().cloned()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Returns the number of stored entries. Keys still being computed are not counted.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        let stored = self.inner.iter().filter(|entry| entry.value().value.get().is_some()).count();
        u64::try_from(stored).unwrap_or(u64::MAX)
    }

    fn slot(&self, key: &K) -> Option<Arc<Slot<V>>> {
        self.inner.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn is_current(&self, key: &K, slot: &Arc<Slot<V>>) -> bool {
        self.inner.get(key).is_some_and(|entry| Arc::ptr_eq(entry.value(), slot))
    }

    fn retire(&self, key: &K, slot: &Arc<Slot<V>>) {
        self.inner.remove_if(key, |_, current| Arc::ptr_eq(current, slot));
    }
}

impl<K, V> ComputeStore<K, V> for ConcurrentMap<K, V>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get_or_compute<F>(&self, key: K, compute: F) -> Option<V>
    where
        F: FnOnce(&K) -> Option<V>,
    {
        loop {
            // The shard guard is dropped as soon as the slot handle is cloned.
            let slot = match self.slot(&key) {
                Some(slot) => slot,
                None => Arc::clone(self.inner.entry(key.clone()).or_insert_with(|| Arc::new(Slot::empty())).value()),
            };

            if let Some(value) = slot.value.get() {
                return Some(value.clone());
            }

            let _leader = slot.leader.lock();

            if let Some(value) = slot.value.get() {
                return Some(value.clone());
            }

            // The previous leader produced nothing and retired this slot, or the key was
            // invalidated or replaced while we waited.
            if !self.is_current(&key, &slot) {
                continue;
            }

            return match compute(&key) {
                Some(value) => Some(slot.value.get_or_init(|| value).clone()),
                None => {
                    self.retire(&key, &slot);
                    None
                }
            };
        }
    }

    fn len(&self) -> Option<u64> {
        Some(self.entry_count())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            mpsc,
        },
        thread,
        time::Duration,
    };

    use super::*;

    #[test]
    fn absent_result_is_not_inserted() {
        let map = ConcurrentMap::<&str, i32>::new();

        assert_eq!(map.get_or_compute("key", |_| None), None);
        assert!(!map.contains_key(&"key"));
        assert_eq!(map.len(), Some(0));
        assert!(map.inner.is_empty());
    }

    #[test]
    fn present_value_skips_compute() {
        let map = ConcurrentMap::new();
        map.insert("key", 1);
        let calls = AtomicUsize::new(0);

        let value = map.get_or_compute("key", |_| {
            calls.fetch_add(1, Ordering::Relaxed);
            Some(2)
        });

        assert_eq!(value, Some(1));
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn compute_receives_the_requested_key() {
        let map = ConcurrentMap::<u32, u32>::new();

        let value = map.get_or_compute(7, |key| Some(key * 10));

        assert_eq!(value, Some(70));
        assert_eq!(map.get(&7), Some(70));
    }

    #[test]
    fn insert_returns_replaced_value() {
        let map = ConcurrentMap::<u8, u8>::new();

        assert_eq!(map.insert(1, 10), None);
        assert_eq!(map.insert(1, 11), Some(10));
        assert_eq!(map.get(&1), Some(11));
    }

    #[test]
    fn clones_share_entries() {
        let map = ConcurrentMap::<u8, u8>::new();
        let other = map.clone();

        map.insert(1, 1);

        assert_eq!(other.get(&1), Some(1));
        assert_eq!(other.invalidate(&1), Some(1));
        assert!(map.is_empty().expect("map tracks its size"));
    }

    #[test]
    fn clear_removes_all_entries() {
        let map = ConcurrentMap::<u8, u8>::with_capacity(4);
        map.insert(1, 1);
        map.insert(2, 2);

        map.clear();

        assert_eq!(map.entry_count(), 0);
    }

    #[test]
    fn debug_lists_entries() {
        let map = ConcurrentMap::new();
        map.insert("answer", 42);

        let debug = format!("{map:?}");
        assert!(debug.contains("answer"));
        assert!(debug.contains("42"));
    }

    #[test]
    fn computation_may_use_other_keys_of_the_same_map() {
        let map = ConcurrentMap::<u32, u32>::new();

        let total = map.get_or_compute(0, |_| {
            let inner: u32 = (1..=64).filter_map(|key| map.get_or_compute(key, |k| Some(k * 2))).sum();
            Some(inner)
        });

        assert_eq!(total, Some((1..=64).map(|k| k * 2).sum::<u32>()));
        assert_eq!(map.entry_count(), 65);
    }

    #[test]
    fn pending_key_does_not_block_other_keys() {
        let map = ConcurrentMap::<u32, u32>::new();
        map.insert(2, 20);
        let (release, released) = mpsc::channel::<()>();

        thread::scope(|scope| {
            let shared = &map;
            let slow = scope.spawn(move || {
                shared.get_or_compute(1, move |_| {
                    let heard = released.recv_timeout(Duration::from_secs(5)).is_ok();
                    Some(u32::from(heard))
                })
            });

            // Wait until the slow computation has claimed key 1.
            while !map.inner.contains_key(&1) {
                thread::yield_now();
            }

            assert_eq!(map.get_or_compute(2, |_| None), Some(20));
            assert_eq!(map.get(&2), Some(20));
            assert!(!map.contains_key(&1));
            release.send(()).expect("slow computation is waiting");

            assert_eq!(slow.join().expect("slow caller panicked"), Some(1));
        });
    }

    #[test]
    fn panicking_computation_leaves_key_computable() {
        let map = ConcurrentMap::<u8, u8>::new();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            map.get_or_compute(1, |_| panic!("computation failed"))
        }));

        assert!(outcome.is_err());
        assert_eq!(map.get_or_compute(1, |_| Some(5)), Some(5));
    }
}
