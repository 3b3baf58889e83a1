// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Backing store abstractions for the `memoir` memoization engine.
//!
//! This crate defines the [`ComputeStore`] trait that every store plugged into a memoizer
//! must satisfy, along with [`ConcurrentMap`], a process-local store backed by a sharded
//! concurrent hash map.
//!
//! # The Get-or-Compute Contract
//!
//! A store offers a single atomic operation: return the value for a key if present,
//! otherwise run the supplied closure, insert what it produced and return it. Callers that
//! race on the same absent key must see the closure run at most once, and all of them must
//! observe the same resulting value. A closure returning `None` produces no entry.
//!
//! Stores that cannot offer this atomicity (for example a `HashMap` behind separate read and
//! write steps) are out of contract and may compute a value more than once.
//!
//! # Implementing a Store
//!
//! ```
//! use memoir_store::ComputeStore;
//! use std::collections::HashMap;
//! use std::hash::Hash;
//! use std::sync::Mutex;
//!
//! struct LockedMap<K, V>(Mutex<HashMap<K, V>>);
//!
//! impl<K, V> ComputeStore<K, V> for LockedMap<K, V>
//! where
//!     K: Eq + Hash + Send,
//!     V: Clone + Send,
//! {
//!     fn get_or_compute<F>(&self, key: K, compute: F) -> Option<V>
//!     where
//!         F: FnOnce(&K) -> Option<V>,
//!     {
//!         let mut map = self.0.lock().unwrap();
//!         if let Some(value) = map.get(&key) {
//!             return Some(value.clone());
//!         }
//!         let value = compute(&key)?;
//!         map.insert(key, value.clone());
//!         Some(value)
//!     }
//! }
//! ```

mod map;
mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use map::ConcurrentMap;
#[doc(inline)]
pub use store::ComputeStore;
