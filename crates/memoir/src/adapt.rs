// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Ready-made memoizers for common call shapes.
//!
//! Each adapter pairs a computation with the key strategy that fits its shape and hands
//! back a plain [`Memoizer`]. Multi-argument computations take their arguments as a tuple,
//! so [`tuple_function`] covers every arity from 2 to 9.
//!
//! | Adapter | Computation | Key |
//! |---|---|---|
//! | [`function`] | `Fn(&A) -> V` | [`key::identity`] |
//! | [`try_function`] | `Fn(&A) -> Result<V, E>` | [`key::identity`] |
//! | [`tuple_function`] | `Fn(&(A1, ..., An)) -> V` | [`key::hash_combine`] |
//! | [`supplier`] | `Fn() -> V` | [`key::constant`] |
//! | [`keyed_supplier`] | `Fn() -> V` | [`key::supplied`] |
//! | [`predicate`] | `Fn(&A) -> bool` | [`key::identity`] |
//!
//! # Examples
//!
//! ```
//! use memoir::{ConcurrentMap, adapt};
//!
//! let concat = adapt::tuple_function(ConcurrentMap::new(), |(a, b): &(String, String)| format!("{a}{b}"));
//!
//! let args = ("x".to_string(), "y".to_string());
//! assert_eq!(concat.invoke(&args)?, "xy");
//! # Ok::<(), memoir::Error>(())
//! ```

use memoir_store::ComputeStore;

use crate::{
    Error, Memoizer,
    key::{self, CombineHash, ConstantKey, HashKey},
    memoizer::{DEFAULT_NAME, erase_compute, erase_key},
};

/// Memoizes a single-argument computation, keyed by the argument itself.
///
/// # Examples
///
/// ```
/// use memoir::{ConcurrentMap, adapt};
///
/// let square = adapt::function(ConcurrentMap::new(), |x: &u64| x * x);
/// assert_eq!(square.invoke(&4)?, 16);
/// # Ok::<(), memoir::Error>(())
/// ```
pub fn function<A, V, S, F>(store: S, compute: F) -> Memoizer<A, A, V, Error, S>
where
    A: Clone + 'static,
    V: 'static,
    S: ComputeStore<A, V>,
    F: Fn(&A) -> V + Send + Sync + 'static,
{
    Memoizer::from_parts(
        DEFAULT_NAME,
        erase_key(key::identity()),
        erase_compute(move |args: &A| Ok(Some(compute(args)))),
        store,
    )
}

/// Memoizes a fallible single-argument computation, keyed by the argument itself.
///
/// Failures are returned to the caller unchanged and never stored.
pub fn try_function<A, V, E, S, F>(store: S, compute: F) -> Memoizer<A, A, V, E, S>
where
    A: Clone + 'static,
    V: 'static,
    E: 'static,
    S: ComputeStore<A, V>,
    F: Fn(&A) -> Result<V, E> + Send + Sync + 'static,
{
    Memoizer::from_parts(
        DEFAULT_NAME,
        erase_key(key::identity()),
        erase_compute(move |args: &A| compute(args).map(Some)),
        store,
    )
}

/// Memoizes a computation over a tuple of 2 to 9 arguments, keyed by their combined hash.
///
/// Two different tuples whose hashes collide share one entry; see [`key`](crate::key).
pub fn tuple_function<A, V, S, F>(store: S, compute: F) -> Memoizer<A, HashKey, V, Error, S>
where
    A: CombineHash + 'static,
    V: 'static,
    S: ComputeStore<HashKey, V>,
    F: Fn(&A) -> V + Send + Sync + 'static,
{
    Memoizer::from_parts(
        DEFAULT_NAME,
        erase_key(key::hash_combine()),
        erase_compute(move |args: &A| Ok(Some(compute(args)))),
        store,
    )
}

/// Memoizes a zero-argument computation: it runs once and every later call returns its
/// value.
///
/// # Examples
///
/// ```
/// use memoir::{ConcurrentMap, adapt};
///
/// let config = adapt::supplier(ConcurrentMap::new(), || "loaded".to_string());
/// assert_eq!(config.invoke(&())?, "loaded");
/// # Ok::<(), memoir::Error>(())
/// ```
pub fn supplier<V, S, F>(store: S, compute: F) -> Memoizer<(), ConstantKey, V, Error, S>
where
    V: 'static,
    S: ComputeStore<ConstantKey, V>,
    F: Fn() -> V + Send + Sync + 'static,
{
    Memoizer::from_parts(
        DEFAULT_NAME,
        erase_key(key::constant()),
        erase_compute(move |_: &()| Ok(Some(compute()))),
        store,
    )
}

/// Memoizes a zero-argument computation under the key `key_supplier` returns at call time.
///
/// The computation runs again whenever the supplied key changes.
pub fn keyed_supplier<K, V, S, KF, F>(store: S, key_supplier: KF, compute: F) -> Memoizer<(), K, V, Error, S>
where
    K: 'static,
    V: 'static,
    S: ComputeStore<K, V>,
    KF: Fn() -> K + Send + Sync + 'static,
    F: Fn() -> V + Send + Sync + 'static,
{
    Memoizer::from_parts(
        DEFAULT_NAME,
        erase_key(key::supplied(key_supplier)),
        erase_compute(move |_: &()| Ok(Some(compute()))),
        store,
    )
}

/// Memoizes a single-argument test, keyed by the argument itself.
pub fn predicate<A, S, F>(store: S, test: F) -> Memoizer<A, A, bool, Error, S>
where
    A: Clone + 'static,
    S: ComputeStore<A, bool>,
    F: Fn(&A) -> bool + Send + Sync + 'static,
{
    function(store, test)
}
