// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for memoization backing stores.

use std::sync::Arc;

/// Trait for stores that can back a memoizer.
///
/// Only [`get_or_compute`](Self::get_or_compute) is required. `len` and `is_empty` have
/// default implementations:
/// - `len`: Returns `None` (not all stores track size)
/// - `is_empty`: Delegates to `len`
///
/// The trait is implemented for `&S` and `Arc<S>` so that a store can be shared by
/// reference between a memoizer and the code that pre-populates or inspects it.
pub trait ComputeStore<K, V>: Send + Sync {
    /// Returns the value stored for `key`, computing and inserting it if absent.
    ///
    /// When no value is present, `compute` is called with the key. A `Some` result is
    /// inserted and returned. A `None` result is returned as-is and nothing is inserted.
    ///
    /// Concurrent callers racing on the same absent key must observe `compute` running at
    /// most once; callers that lose the race wait for the winner and return its value.
    fn get_or_compute<F>(&self, key: K, compute: F) -> Option<V>
    where
        F: FnOnce(&K) -> Option<V>;

    /// Returns the number of entries, if supported.
    ///
    /// Returns `None` for implementations that don't track size.
    fn len(&self) -> Option<u64> {
        None
    }

    /// Returns `true` if the store contains no entries.
    ///
    /// Returns `None` for implementations that don't track size.
    fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}

impl<K, V, S> ComputeStore<K, V> for &S
where
    S: ComputeStore<K, V>,
{
    fn get_or_compute<F>(&self, key: K, compute: F) -> Option<V>
    where
        F: FnOnce(&K) -> Option<V>,
    {
        (**self).get_or_compute(key, compute)
    }

    fn len(&self) -> Option<u64> {
        (**self).len()
    }
}

impl<K, V, S> ComputeStore<K, V> for Arc<S>
where
    S: ComputeStore<K, V>,
{
    fn get_or_compute<F>(&self, key: K, compute: F) -> Option<V>
    where
        F: FnOnce(&K) -> Option<V>,
    {
        (**self).get_or_compute(key, compute)
    }

    fn len(&self) -> Option<u64> {
        (**self).len()
    }
}
