// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Default key-derivation strategies.
//!
//! A key function turns the arguments of a call into the key a memoizer stores its result
//! under. It must be deterministic: equal arguments must produce equal keys, otherwise
//! repeated calls land in different entries and memoization silently stops working.
//!
//! The strategies here cover the common shapes:
//!
//! | Strategy | Arguments | Key |
//! |---|---|---|
//! | [`identity`] | one argument that is already a good key | the argument itself |
//! | [`hashed`] | one argument that is costly to clone | [`HashKey`] |
//! | [`hash_combine`] | a tuple of 2 to 9 arguments | [`HashKey`] |
//! | [`constant`] | none | [`ConstantKey`] |
//! | [`supplied`] | none | whatever the supplier returns |
//!
//! # Collisions
//!
//! [`hashed`] and [`hash_combine`] reduce arguments to 64 bits. Two different argument
//! tuples can produce the same [`HashKey`], and the memoizer then returns the first tuple's
//! result for the second. Supply a key function that returns the arguments themselves (or
//! another collision-free key) when that is not acceptable.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

const COMBINE_SEED: u64 = 1;
const COMBINE_MULTIPLIER: u64 = 31;

/// A key derived by hashing call arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashKey(u64);

impl HashKey {
    /// Wraps a precomputed hash.
    #[must_use]
    pub const fn new(hash: u64) -> Self {
        Self(hash)
    }

    /// Returns the hash value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// The single key shared by every call of a zero-argument memoizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ConstantKey;

/// Argument tuples whose element hashes can be folded into one [`HashKey`].
///
/// Implemented for tuples of 2 to 9 elements whose elements implement [`Hash`]. Each
/// element is hashed on its own with an unseeded hasher, so a given tuple produces the same
/// key in every process; the element hashes are then folded as `hash = 31 * hash + element`,
/// starting from 1.
pub trait CombineHash {
    /// Folds the hashes of all elements into one key.
    fn combine_hash(&self) -> HashKey;
}

fn element_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

macro_rules! impl_combine_hash {
    ($($name:ident $index:tt),+) => {
        impl<$($name: Hash),+> CombineHash for ($($name,)+) {
            fn combine_hash(&self) -> HashKey {
                let mut hash = COMBINE_SEED;
                $(
                    hash = hash.wrapping_mul(COMBINE_MULTIPLIER).wrapping_add(element_hash(&self.$index));
                )+
                HashKey(hash)
            }
        }
    };
}

impl_combine_hash!(A 0, B 1);
impl_combine_hash!(A 0, B 1, C 2);
impl_combine_hash!(A 0, B 1, C 2, D 3);
impl_combine_hash!(A 0, B 1, C 2, D 3, E 4);
impl_combine_hash!(A 0, B 1, C 2, D 3, E 4, F 5);
impl_combine_hash!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_combine_hash!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
impl_combine_hash!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);

/// Uses the argument itself as the key.
///
/// # Examples
///
/// ```
/// let key = memoir::key::identity::<String>();
/// assert_eq!(key(&"user:1".to_string()), "user:1");
/// ```
#[must_use]
pub fn identity<A>() -> impl Fn(&A) -> A + Copy + Send + Sync + 'static
where
    A: Clone + 'static,
{
    |args: &A| args.clone()
}

/// Hashes a single argument into a [`HashKey`].
///
/// Useful when the argument is large or costly to clone. Subject to collisions.
#[must_use]
pub fn hashed<A>() -> impl Fn(&A) -> HashKey + Copy + Send + Sync + 'static
where
    A: Hash + ?Sized + 'static,
{
    |args: &A| HashKey(element_hash(args))
}

/// Folds the hashes of a tuple of arguments into a [`HashKey`].
///
/// Subject to collisions; see the [module documentation](self).
///
/// # Examples
///
/// ```
/// use memoir::key;
///
/// let key = key::hash_combine::<(&str, u32)>();
/// assert_eq!(key(&("a", 1)), key(&("a", 1)));
/// assert_ne!(key(&("a", 1)), key(&("a", 2)));
/// ```
#[must_use]
pub fn hash_combine<A>() -> impl Fn(&A) -> HashKey + Copy + Send + Sync + 'static
where
    A: CombineHash + 'static,
{
    |args: &A| args.combine_hash()
}

/// Maps every zero-argument call to the same [`ConstantKey`], giving a single-slot cache.
#[must_use]
pub fn constant() -> impl Fn(&()) -> ConstantKey + Copy + Send + Sync + 'static {
    |_: &()| ConstantKey
}

/// Derives the key of a zero-argument call from `supplier`, invoked once per call.
///
/// # Examples
///
/// A key that changes every minute turns a supplier into a value refreshed at most once a
/// minute (older entries stay in the store until it evicts them):
///
/// ```
/// use std::time::{SystemTime, UNIX_EPOCH};
///
/// let key = memoir::key::supplied(|| {
///     SystemTime::now()
///         .duration_since(UNIX_EPOCH)
///         .map_or(0, |elapsed| elapsed.as_secs() / 60)
/// });
/// let _bucket: u64 = key(&());
/// ```
#[must_use]
pub fn supplied<K, F>(supplier: F) -> impl Fn(&()) -> K + Send + Sync + 'static
where
    K: 'static,
    F: Fn() -> K + Send + Sync + 'static,
{
    move |_: &()| supplier()
}
