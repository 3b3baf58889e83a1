// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Bounded memoization store backed by moka.
//!
//! This crate provides [`BoundedStore`], a concurrent store using moka's `TinyLFU`
//! eviction algorithm. Use [`BoundedStoreBuilder`] to configure capacity, TTL, and TTI
//! without exposing moka types directly.
//!
//! Eviction and expiry are entirely moka's business: an evicted or expired key simply
//! becomes absent again, and the next memoized call for it recomputes.
//!
//! # Quick Start
//!
//! ```
//! use memoir_moka::BoundedStoreBuilder;
//! use memoir_store::ComputeStore;
//! use std::time::Duration;
//!
//! let store = BoundedStoreBuilder::<String, i32>::new()
//!     .max_capacity(1000)
//!     .time_to_live(Duration::from_secs(300))
//!     .build();
//!
//! let value = store.get_or_compute("key".to_string(), |_| Some(42));
//! assert_eq!(value, Some(42));
//! assert_eq!(store.get(&"key".to_string()), Some(42));
//! ```
//!
//! # Features
//!
//! - **Capacity limits**: Set maximum entry count with automatic eviction
//! - **TTL/TTI**: Configure time-to-live and time-to-idle expiration
//! - **Coalesced computation**: Concurrent misses on one key run a single computation
//! - **Zero external types**: Builder API avoids exposing moka in your public API

pub mod builder;
pub mod store;

#[doc(inline)]
pub use builder::BoundedStoreBuilder;
#[doc(inline)]
pub use store::BoundedStore;
