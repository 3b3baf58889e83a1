// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for constructing memoizers.
//!
//! A memoizer needs three collaborators: a key function, a store and a computation. The
//! builder collects them and [`build`](MemoizerBuilder::build) refuses to produce a memoizer
//! when any of them is missing, so misconfiguration surfaces at construction rather than at
//! the first call.

use memoir_store::ComputeStore;

use crate::{
    Error, Memoizer,
    key::{self, CombineHash, ConstantKey, HashKey},
    memoizer::{ComputeFn, DEFAULT_NAME, KeyFn, MemoizerName, erase_compute, erase_key},
};

/// Builder for a [`Memoizer`].
///
/// Created by [`Memoizer::builder`]. The error type starts as [`Error`]; the `try_*`
/// computation setters switch it to the computation's own error type.
///
/// The computation can be given in four shapes, all normalised to the same core:
///
/// | Setter | Computation returns |
/// |---|---|
/// | [`compute`](Self::compute) | `V` |
/// | [`compute_optional`](Self::compute_optional) | `Option<V>` |
/// | [`try_compute`](Self::try_compute) | `Result<V, E>` |
/// | [`try_compute_optional`](Self::try_compute_optional) | `Result<Option<V>, E>` |
///
/// A `None` from an optional computation is reported as
/// [`ComputedNull`](crate::ComputedNull) and never stored.
///
/// # Examples
///
/// ```
/// use memoir::{ConcurrentMap, Memoizer, key};
///
/// let memo = Memoizer::builder()
///     .name("squares")
///     .key(key::identity())
///     .store(ConcurrentMap::new())
///     .compute(|x: &i32| x * x)
///     .build()?;
///
/// assert_eq!(memo.invoke(&3)?, 9);
/// # Ok::<(), memoir::Error>(())
/// ```
pub struct MemoizerBuilder<A, K, V, E, S> {
    name: MemoizerName,
    key_fn: Option<KeyFn<A, K>>,
    compute: Option<ComputeFn<A, V, E>>,
    store: Option<S>,
}

impl<A, K, V, S> MemoizerBuilder<A, K, V, Error, S> {
    pub(crate) fn new() -> Self {
        Self {
            name: DEFAULT_NAME,
            key_fn: None,
            compute: None,
            store: None,
        }
    }
}

impl<A, K, V, E, S> MemoizerBuilder<A, K, V, E, S> {
    /// Sets the name used to identify this memoizer in logs.
    #[must_use]
    pub fn name(mut self, name: MemoizerName) -> Self {
        self.name = name;
        self
    }

    /// Sets the store that will hold computed values.
    ///
    /// Pass a clone of a store handle (or a reference to a store) to keep access to the
    /// entries from outside the memoizer.
    #[must_use]
    pub fn store(mut self, store: S) -> Self {
        self.store = Some(store);
        self
    }
}

impl<A, K, V, E, S> MemoizerBuilder<A, K, V, E, S>
where
    A: 'static,
    K: 'static,
    V: 'static,
    E: 'static,
{
    /// Sets the key function. See [`key`](crate::key) for the provided strategies.
    #[must_use]
    pub fn key<F>(mut self, key_fn: F) -> Self
    where
        F: Fn(&A) -> K + Send + Sync + 'static,
    {
        self.key_fn = Some(erase_key(key_fn));
        self
    }

    /// Sets a computation that always produces a value.
    #[must_use]
    pub fn compute<F>(mut self, compute: F) -> Self
    where
        F: Fn(&A) -> V + Send + Sync + 'static,
    {
        self.compute = Some(erase_compute(move |args: &A| Ok(Some(compute(args)))));
        self
    }

    /// Sets a computation that may produce no value.
    #[must_use]
    pub fn compute_optional<F>(mut self, compute: F) -> Self
    where
        F: Fn(&A) -> Option<V> + Send + Sync + 'static,
    {
        self.compute = Some(erase_compute(move |args: &A| Ok(compute(args))));
        self
    }

    /// Sets a computation that may fail, switching the memoizer's error type to `E2`.
    ///
    /// `E2` must absorb [`ComputedNull`](crate::ComputedNull) so that `invoke` can return
    /// exactly the computation's error type.
    #[must_use]
    pub fn try_compute<E2, F>(self, compute: F) -> MemoizerBuilder<A, K, V, E2, S>
    where
        E2: 'static,
        F: Fn(&A) -> Result<V, E2> + Send + Sync + 'static,
    {
        self.with_compute(erase_compute(move |args: &A| compute(args).map(Some)))
    }

    /// Sets a computation that may fail or produce no value, switching the error type to `E2`.
    #[must_use]
    pub fn try_compute_optional<E2, F>(self, compute: F) -> MemoizerBuilder<A, K, V, E2, S>
    where
        E2: 'static,
        F: Fn(&A) -> Result<Option<V>, E2> + Send + Sync + 'static,
    {
        self.with_compute(erase_compute(compute))
    }

    fn with_compute<E2>(self, compute: ComputeFn<A, V, E2>) -> MemoizerBuilder<A, K, V, E2, S> {
        MemoizerBuilder {
            name: self.name,
            key_fn: self.key_fn,
            compute: Some(compute),
            store: self.store,
        }
    }
}

impl<A, V, E, S> MemoizerBuilder<A, A, V, E, S>
where
    A: Clone + 'static,
{
    /// Uses the argument itself as the key. Shorthand for `.key(key::identity())`.
    #[must_use]
    pub fn identity_key(mut self) -> Self {
        self.key_fn = Some(erase_key(key::identity()));
        self
    }
}

impl<A, V, E, S> MemoizerBuilder<A, HashKey, V, E, S>
where
    A: CombineHash + 'static,
{
    /// Folds the hashes of a tuple argument into the key. Shorthand for
    /// `.key(key::hash_combine())`; subject to collisions.
    #[must_use]
    pub fn hash_key(mut self) -> Self {
        self.key_fn = Some(erase_key(key::hash_combine()));
        self
    }
}

impl<V, E, S> MemoizerBuilder<(), ConstantKey, V, E, S> {
    /// Maps every call to one key. Shorthand for `.key(key::constant())`.
    #[must_use]
    pub fn constant_key(mut self) -> Self {
        self.key_fn = Some(erase_key(key::constant()));
        self
    }
}

impl<A, K, V, E, S> MemoizerBuilder<A, K, V, E, S>
where
    S: ComputeStore<K, V>,
{
    /// Builds the memoizer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the first missing collaborator when the
    /// computation, the key function or the store was not supplied.
    pub fn build(self) -> Result<Memoizer<A, K, V, E, S>, Error> {
        let compute = self.compute.ok_or_else(|| Error::missing("computation"))?;
        let key_fn = self.key_fn.ok_or_else(|| Error::missing("key function"))?;
        let store = self.store.ok_or_else(|| Error::missing("store"))?;

        Ok(Memoizer::from_parts(self.name, key_fn, compute, store))
    }
}

impl<A, K, V, E, S> std::fmt::Debug for MemoizerBuilder<A, K, V, E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoizerBuilder")
            .field("name", &self.name)
            .field("key_fn", &self.key_fn.is_some())
            .field("compute", &self.compute.is_some())
            .field("store", &self.store.is_some())
            .finish()
    }
}
