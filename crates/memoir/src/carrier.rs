// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Carries a computation's failure across the store's closure boundary.
//!
//! [`ComputeStore::get_or_compute`](memoir_store::ComputeStore::get_or_compute) only lets
//! its closure answer "a value" or "no value". The memoizer runs the computation inside that
//! closure through a [`Carrier`], which keeps the failure (or the panic payload) on the
//! caller's side while the store sees plain absence. Once the store call returns, the
//! memoizer takes the failure back out and hands it to the caller untouched.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

/// What happened inside the closure handed to the store.
pub(crate) enum Carrier<E> {
    /// The store answered without running the closure.
    Untouched,
    /// The computation produced a value, which the store now owns.
    Computed,
    /// The computation produced no value.
    Null,
    /// The computation returned an error.
    Failed(E),
    /// The computation panicked.
    Panicked(Box<dyn Any + Send>),
}

impl<E> Carrier<E> {
    pub(crate) const fn new() -> Self {
        Self::Untouched
    }

    /// Runs `compute`, keeping anything other than a value in the carrier.
    ///
    /// Panics are caught so the store's locks are released through a normal return rather
    /// than an unwind.
    pub(crate) fn capture<V>(&mut self, compute: impl FnOnce() -> Result<Option<V>, E>) -> Option<V> {
        match panic::catch_unwind(AssertUnwindSafe(compute)) {
            Ok(Ok(Some(value))) => {
                *self = Self::Computed;
                Some(value)
            }
            Ok(Ok(None)) => {
                *self = Self::Null;
                None
            }
            Ok(Err(error)) => {
                *self = Self::Failed(error);
                None
            }
            Err(payload) => {
                *self = Self::Panicked(payload);
                None
            }
        }
    }
}
