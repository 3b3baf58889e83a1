// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The memoizer: one computation, one key function, one store.

use std::{fmt::Debug, panic, sync::Arc};

use memoir_store::{ComputeStore, ConcurrentMap};

use crate::{
    ComputedNull, Error,
    builder::MemoizerBuilder,
    carrier::Carrier,
    telemetry::{self, MemoActivity},
};

/// Type alias for memoizer names used in logs.
pub type MemoizerName = &'static str;

pub(crate) const DEFAULT_NAME: MemoizerName = "memoizer";

pub(crate) type KeyFn<A, K> = Arc<dyn Fn(&A) -> K + Send + Sync>;
pub(crate) type ComputeFn<A, V, E> = Arc<dyn Fn(&A) -> Result<Option<V>, E> + Send + Sync>;

pub(crate) fn erase_key<A, K, F>(key_fn: F) -> KeyFn<A, K>
where
    F: Fn(&A) -> K + Send + Sync + 'static,
{
    Arc::new(key_fn)
}

pub(crate) fn erase_compute<A, V, E, F>(compute: F) -> ComputeFn<A, V, E>
where
    F: Fn(&A) -> Result<Option<V>, E> + Send + Sync + 'static,
{
    Arc::new(compute)
}

/// A computation wrapped so that each distinct key is computed at most once.
///
/// A `Memoizer` binds a computation over arguments `A`, a key function from `A` to a key
/// `K`, and a store handle `S` holding `K → V` entries. It keeps no entries of its own:
/// the store owns them, and the caller may pre-populate or inspect the store through its
/// own handle.
///
/// All mutual exclusion is delegated to the store. With a store that honours the
/// [`ComputeStore`] contract, concurrent [`invoke`](Self::invoke) calls whose arguments map
/// to the same key run the computation once and all return its value.
///
/// Clones share the computation, the key function and (for the provided stores) the
/// entries.
///
/// # Examples
///
/// ```
/// use memoir::{ConcurrentMap, Memoizer, key};
///
/// let memo = Memoizer::builder()
///     .key(key::identity())
///     .store(ConcurrentMap::new())
///     .compute(|x: &u64| x * x)
///     .build()?;
///
/// assert_eq!(memo.invoke(&4)?, 16);
/// assert_eq!(memo.invoke(&4)?, 16);
/// # Ok::<(), memoir::Error>(())
/// ```
pub struct Memoizer<A, K, V, E = Error, S = ConcurrentMap<K, V>> {
    name: MemoizerName,
    key_fn: KeyFn<A, K>,
    compute: ComputeFn<A, V, E>,
    store: S,
}

impl Memoizer<(), (), ()> {
    /// Creates a new memoizer builder.
    ///
    /// The builder collects the key function, the store and the computation, and checks
    /// that all three were supplied when [`build`](MemoizerBuilder::build) is called.
    ///
    /// # Examples
    ///
    /// ```
    /// use memoir::{ConcurrentMap, Memoizer, key};
    ///
    /// let memo = Memoizer::builder()
    ///     .name("word-lengths")
    ///     .key(key::identity())
    ///     .store(ConcurrentMap::new())
    ///     .compute(|word: &String| word.len())
    ///     .build()?;
    ///
    /// assert_eq!(memo.name(), "word-lengths");
    /// # Ok::<(), memoir::Error>(())
    /// ```
    #[must_use]
    pub fn builder<A, K, V, S>() -> MemoizerBuilder<A, K, V, Error, S> {
        MemoizerBuilder::new()
    }
}

impl<A, K, V, E, S> Memoizer<A, K, V, E, S> {
    pub(crate) fn from_parts(name: MemoizerName, key_fn: KeyFn<A, K>, compute: ComputeFn<A, V, E>, store: S) -> Self {
        Self {
            name,
            key_fn,
            compute,
            store,
        }
    }

    /// Returns the name of this memoizer for log identification.
    #[must_use]
    pub fn name(&self) -> MemoizerName {
        self.name
    }

    /// Returns a reference to the store handle.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Derives the key `args` would be stored under, without touching the store.
    #[must_use]
    pub fn key_for(&self, args: &A) -> K {
        (self.key_fn)(args)
    }
}

impl<A, K, V, E, S> Memoizer<A, K, V, E, S>
where
    S: ComputeStore<K, V>,
    E: From<ComputedNull>,
{
    /// Returns the value for `args`, computing it only if its key has no stored value.
    ///
    /// # Errors
    ///
    /// - The computation's own error, exactly as it returned it. Nothing is stored, so the
    ///   next call for the key computes again.
    /// - `E::from(ComputedNull)` if the computation produced no value. Nothing is stored.
    ///
    /// # Panics
    ///
    /// If the computation panics, the panic is resumed on the calling thread with its
    /// original payload after the store call has returned. Nothing is stored.
    ///
    /// # Examples
    ///
    /// The caller's error type comes back unchanged:
    ///
    /// ```
    /// use memoir::{ConcurrentMap, Memoizer, key};
    /// use std::io;
    ///
    /// let memo = Memoizer::builder()
    ///     .key(key::identity())
    ///     .store(ConcurrentMap::new())
    ///     .try_compute(|text: &String| {
    ///         text.parse::<i64>()
    ///             .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))
    ///     })
    ///     .build()?;
    ///
    /// assert_eq!(memo.invoke(&"42".to_string())?, 42);
    ///
    /// let error = memo.invoke(&"forty-two".to_string()).unwrap_err();
    /// assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn invoke(&self, args: &A) -> Result<V, E> {
        let key = (self.key_fn)(args);
        let mut carrier = Carrier::new();

        let stored = self.store.get_or_compute(key, |_| carrier.capture(|| (self.compute)(args)));

        match (stored, carrier) {
            (Some(value), Carrier::Untouched) => {
                telemetry::record(self.name, MemoActivity::Hit);
                Ok(value)
            }
            (Some(value), carrier) => {
                debug_assert!(
                    matches!(carrier, Carrier::Computed),
                    "store returned a value although the computation produced none"
                );
                telemetry::record(self.name, MemoActivity::Computed);
                Ok(value)
            }
            (None, Carrier::Failed(error)) => {
                telemetry::record(self.name, MemoActivity::Failed);
                Err(error)
            }
            (None, Carrier::Panicked(payload)) => {
                telemetry::record(self.name, MemoActivity::Panicked(telemetry::panic_message(payload.as_ref())));
                panic::resume_unwind(payload)
            }
            // A conforming store only answers absence after the computation declined to
            // produce a value; anything else is reported the same way.
            (None, Carrier::Null | Carrier::Untouched | Carrier::Computed) => {
                telemetry::record(self.name, MemoActivity::ComputedNull);
                Err(E::from(ComputedNull))
            }
        }
    }
}

impl<A, K, V, E, S> Clone for Memoizer<A, K, V, E, S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            key_fn: Arc::clone(&self.key_fn),
            compute: Arc::clone(&self.compute),
            store: self.store.clone(),
        }
    }
}

impl<A, K, V, E, S> Debug for Memoizer<A, K, V, E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memoizer").field("name", &self.name).finish_non_exhaustive()
    }
}
