// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Generic memoization: each distinct key is computed at most once.
//!
//! A [`Memoizer`] wraps a computation together with a key function and a backing store.
//! Calling [`invoke`](Memoizer::invoke) derives a key from the arguments and asks the store
//! for the value; only when the key is absent does the computation run, and its result is
//! stored for every later call.
//!
//! This crate provides:
//! - A single generic core over any argument type, with multi-argument calls expressed as
//!   tuples
//! - Default key strategies in [`key`] and ready-made call shapes in [`adapt`]
//! - Pluggable stores through [`ComputeStore`], with [`ConcurrentMap`] and (behind the
//!   `bounded` feature) the size- and time-bounded [`BoundedStore`]
//! - Failures and panics from the computation delivered to the caller unchanged, with
//!   nothing stored
//! - Structured `tracing` events for every call behind the `logs` feature
//!
//! # Examples
//!
//! ## Memoizing a Function
//!
//! ```
//! use memoir::{ConcurrentMap, Memoizer, key};
//!
//! let store = ConcurrentMap::new();
//! let square = Memoizer::builder()
//!     .name("square")
//!     .key(key::identity())
//!     .store(store.clone())
//!     .compute(|x: &u64| x * x)
//!     .build()?;
//!
//! assert_eq!(square.invoke(&4)?, 16);
//! assert_eq!(store.get(&4), Some(16));
//! # Ok::<(), memoir::Error>(())
//! ```
//!
//! ## Several Arguments
//!
//! Arguments are passed as a tuple. [`adapt::tuple_function`] keys the call by the combined
//! hash of the elements:
//!
//! ```
//! use memoir::{ConcurrentMap, adapt};
//!
//! let area = adapt::tuple_function(ConcurrentMap::new(), |(w, h): &(u32, u32)| w * h);
//! assert_eq!(area.invoke(&(3, 4))?, 12);
//! # Ok::<(), memoir::Error>(())
//! ```
//!
//! ## Fallible Computations
//!
//! A computation that can fail keeps its own error type. The error type must absorb
//! [`ComputedNull`], which is returned when an optional computation produces no value.
//!
//! ```
//! use memoir::{ComputedNull, ConcurrentMap, Memoizer, key};
//!
//! #[derive(Debug, PartialEq)]
//! enum LookupError {
//!     NotFound,
//!     Empty,
//! }
//!
//! impl From<ComputedNull> for LookupError {
//!     fn from(_: ComputedNull) -> Self {
//!         Self::Empty
//!     }
//! }
//!
//! let lookup = Memoizer::builder()
//!     .key(key::identity())
//!     .store(ConcurrentMap::new())
//!     .try_compute_optional(|id: &u32| match id {
//!         0 => Err(LookupError::NotFound),
//!         1 => Ok(None),
//!         _ => Ok(Some(format!("user-{id}"))),
//!     })
//!     .build()
//!     .expect("all collaborators supplied");
//!
//! assert_eq!(lookup.invoke(&0), Err(LookupError::NotFound));
//! assert_eq!(lookup.invoke(&1), Err(LookupError::Empty));
//! assert_eq!(lookup.invoke(&2), Ok("user-2".to_string()));
//! ```
//!
//! # Concurrency
//!
//! The memoizer holds no locks of its own. All mutual exclusion comes from the store, so the
//! at-most-once guarantee is exactly as strong as the store's `get_or_compute`. Both provided
//! stores block racing callers on one key until the first computation finishes.
//!
//! # Features
//!
//! - `bounded` (default): re-exports [`BoundedStore`] from `memoir_moka`.
//! - `logs` (default): emits `tracing` events for hits, computations and failures.
//! - `test-util`: re-exports the recording [`MockStore`].

pub mod adapt;
mod builder;
mod carrier;
mod error;
pub mod key;
mod memoizer;
mod telemetry;

#[doc(inline)]
pub use builder::MemoizerBuilder;
#[doc(inline)]
pub use error::{ComputedNull, Error, Result};
#[cfg(feature = "bounded")]
#[doc(inline)]
pub use memoir_moka::{BoundedStore, BoundedStoreBuilder};
#[doc(inline)]
pub use memoir_store::{ComputeStore, ConcurrentMap};
#[cfg(any(feature = "test-util", test))]
#[doc(inline)]
pub use memoir_store::testing::{MockStore, StoreOp};
#[doc(inline)]
pub use memoizer::{Memoizer, MemoizerName};
