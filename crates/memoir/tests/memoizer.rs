// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `Memoizer::invoke()`.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Barrier,
        atomic::{AtomicU32, Ordering},
    },
    thread,
    time::Duration,
};

use memoir::{ComputedNull, ConcurrentMap, Error, Memoizer, adapt, key};

static_assertions::assert_impl_all!(Memoizer<u64, u64, u64>: Send, Sync, Clone);
static_assertions::assert_impl_all!(Memoizer<String, String, String, std::io::Error, ConcurrentMap<String, String>>: Send, Sync);
static_assertions::assert_impl_all!(Error: Send, Sync, std::error::Error);

fn counter() -> (Arc<AtomicU32>, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    (Arc::clone(&calls), calls)
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
enum FetchError {
    #[error("resource {0} is unavailable")]
    Unavailable(u32),
    #[error("resource {0} is forbidden")]
    Forbidden(u32),
    #[error("resource had no content")]
    Empty,
}

impl From<ComputedNull> for FetchError {
    fn from(_: ComputedNull) -> Self {
        Self::Empty
    }
}

#[test]
fn square_computed_once() -> memoir::Result<()> {
    let (calls, counter) = counter();
    let square = Memoizer::builder()
        .name("square")
        .key(key::identity())
        .store(ConcurrentMap::new())
        .compute(move |x: &u64| {
            counter.fetch_add(1, Ordering::Relaxed);
            x * x
        })
        .build()?;

    assert_eq!(square.invoke(&4)?, 16);
    assert_eq!(square.invoke(&4)?, 16);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    Ok(())
}

#[test]
fn concat_with_hash_combined_key() -> memoir::Result<()> {
    let (calls, counter) = counter();
    let concat = adapt::tuple_function(ConcurrentMap::new(), move |(a, b): &(String, String)| {
        counter.fetch_add(1, Ordering::Relaxed);
        format!("{a}{b}")
    });

    let args = ("x".to_string(), "y".to_string());
    assert_eq!(concat.invoke(&args)?, "xy");
    assert_eq!(concat.invoke(&args.clone())?, "xy");
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    Ok(())
}

#[test]
fn racing_threads_share_one_computation() -> memoir::Result<()> {
    let (calls, counter) = counter();
    let memo = Memoizer::builder()
        .name("slow-random")
        .key(key::constant())
        .store(ConcurrentMap::new())
        .compute(move |_: &()| {
            counter.fetch_add(1, Ordering::Relaxed);
            thread::sleep(Duration::from_millis(50));
            fastrand::u64(..)
        })
        .build()?;

    let barrier = Barrier::new(2);
    let (first, second) = thread::scope(|scope| {
        let first = scope.spawn(|| {
            barrier.wait();
            memo.invoke(&())
        });
        let second = scope.spawn(|| {
            barrier.wait();
            memo.invoke(&())
        });
        (first.join(), second.join())
    });

    let first = first.expect("first caller panicked")?;
    let second = second.expect("second caller panicked")?;
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    Ok(())
}

#[test]
fn many_threads_many_keys_compute_each_key_once() {
    const THREADS: usize = 8;
    const KEYS: u32 = 16;

    let (calls, counter) = counter();
    let memo = adapt::function(ConcurrentMap::new(), move |x: &u32| {
        counter.fetch_add(1, Ordering::Relaxed);
        thread::sleep(Duration::from_millis(1));
        x + 1000
    });

    let barrier = Barrier::new(THREADS);
    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                barrier.wait();
                for _ in 0..4 {
                    let key = fastrand::u32(..KEYS);
                    assert_eq!(memo.invoke(&key).expect("value is always produced"), key + 1000);
                }
                for key in 0..KEYS {
                    assert_eq!(memo.invoke(&key).expect("value is always produced"), key + 1000);
                }
            });
        }
    });

    assert_eq!(calls.load(Ordering::Relaxed), KEYS);
}

#[test]
fn sequential_calls_are_idempotent() -> memoir::Result<()> {
    let (calls, counter) = counter();
    let memo = adapt::function(ConcurrentMap::new(), move |word: &String| {
        counter.fetch_add(1, Ordering::Relaxed);
        word.to_uppercase()
    });

    let word = "memo".to_string();
    let results: Vec<String> = (0..10).map(|_| memo.invoke(&word)).collect::<Result<_, _>>()?;

    assert!(results.iter().all(|result| result == "MEMO"));
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    Ok(())
}

#[test]
fn colliding_keys_return_first_result() -> memoir::Result<()> {
    // Keys only by parity, so 2 and 4 collide.
    let memo = Memoizer::builder()
        .key(|x: &u32| x % 2)
        .store(ConcurrentMap::new())
        .compute(|x: &u32| x * 10)
        .build()?;

    assert_eq!(memo.invoke(&2)?, 20);
    assert_eq!(memo.invoke(&4)?, 20);
    assert_eq!(memo.invoke(&3)?, 30);
    Ok(())
}

#[test]
fn absent_result_is_not_stored_and_retried() -> memoir::Result<()> {
    let (calls, counter) = counter();
    let store = ConcurrentMap::new();
    let memo = Memoizer::builder()
        .key(key::identity())
        .store(store.clone())
        .compute_optional(move |x: &u32| {
            // Produces nothing on the first attempt only.
            (counter.fetch_add(1, Ordering::Relaxed) > 0).then_some(x + 1)
        })
        .build()?;

    let error = memo.invoke(&1).unwrap_err();
    assert!(error.is_computed_null());
    assert!(!store.contains_key(&1));

    assert_eq!(memo.invoke(&1)?, 2);
    assert_eq!(memo.invoke(&1)?, 2);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
    Ok(())
}

#[test]
fn failures_reach_caller_unchanged() {
    let (calls, counter) = counter();
    let store = ConcurrentMap::new();
    let fetch = Memoizer::builder()
        .name("fetch")
        .key(key::identity())
        .store(store.clone())
        .try_compute_optional(move |id: &u32| {
            counter.fetch_add(1, Ordering::Relaxed);
            match id {
                0 => Ok(None),
                1 => Err(FetchError::Unavailable(*id)),
                2 => Err(FetchError::Forbidden(*id)),
                _ => Ok(Some(format!("resource-{id}"))),
            }
        })
        .build()
        .expect("all collaborators supplied");

    let error = fetch.invoke(&1).unwrap_err();
    assert_eq!(error, FetchError::Unavailable(1));
    assert_eq!(error.to_string(), "resource 1 is unavailable");

    assert_eq!(fetch.invoke(&2), Err(FetchError::Forbidden(2)));
    assert_eq!(fetch.invoke(&0), Err(FetchError::Empty));
    assert_eq!(fetch.invoke(&3), Ok("resource-3".to_string()));

    // Failures are retried, successes are not.
    assert_eq!(fetch.invoke(&1), Err(FetchError::Unavailable(1)));
    assert_eq!(fetch.invoke(&3), Ok("resource-3".to_string()));
    assert_eq!(calls.load(Ordering::Relaxed), 5);
    assert_eq!(store.entry_count(), 1);
}

#[test]
fn io_errors_keep_their_kind() {
    let memo = adapt::try_function(ConcurrentMap::new(), |path: &String| {
        Err::<u64, _>(std::io::Error::new(std::io::ErrorKind::NotFound, format!("{path} missing")))
    });

    let error = memo.invoke(&"config.toml".to_string()).unwrap_err();
    assert_eq!(error.kind(), std::io::ErrorKind::NotFound);
    assert_eq!(error.to_string(), "config.toml missing");
}

#[test]
fn panic_is_resumed_with_payload_and_key_recovers() {
    let (calls, counter) = counter();
    let memo = adapt::function(ConcurrentMap::new(), move |x: &u32| {
        assert!(counter.fetch_add(1, Ordering::Relaxed) > 0, "first attempt for {x} fails");
        x * 3
    });

    let payload = panic::catch_unwind(AssertUnwindSafe(|| memo.invoke(&7))).unwrap_err();
    let message = payload.downcast_ref::<String>().expect("formatted panic message");
    assert_eq!(message, "first attempt for 7 fails");

    // The store lock was released and nothing was stored.
    assert!(!memo.store().contains_key(&7));
    assert_eq!(memo.invoke(&7).expect("second attempt succeeds"), 21);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn prepopulated_entries_are_returned_without_computing() -> memoir::Result<()> {
    let (calls, counter) = counter();
    let store = ConcurrentMap::new();
    store.insert(5_u32, 500_u32);

    let memo = adapt::function(store, move |x: &u32| {
        counter.fetch_add(1, Ordering::Relaxed);
        x * 100
    });

    assert_eq!(memo.invoke(&5)?, 500);
    assert_eq!(memo.invoke(&6)?, 600);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    Ok(())
}

#[test]
fn key_for_allows_prepopulating_hashed_keys() -> memoir::Result<()> {
    let store = ConcurrentMap::new();
    let memo = adapt::tuple_function(store.clone(), |(a, b): &(u8, u8)| u16::from(*a) * u16::from(*b));

    store.insert(memo.key_for(&(3, 3)), 0);

    assert_eq!(memo.invoke(&(3, 3))?, 0);
    assert_eq!(memo.invoke(&(3, 4))?, 12);
    Ok(())
}

#[test]
fn clones_share_store() -> memoir::Result<()> {
    let (calls, counter) = counter();
    let memo = adapt::function(ConcurrentMap::new(), move |x: &i32| {
        counter.fetch_add(1, Ordering::Relaxed);
        -x
    });
    let clone = memo.clone();

    assert_eq!(memo.invoke(&1)?, -1);
    assert_eq!(clone.invoke(&1)?, -1);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    Ok(())
}

#[test]
fn memoizers_over_borrowed_and_shared_stores() -> memoir::Result<()> {
    let store = ConcurrentMap::new();

    let borrowed = adapt::function(&store, |x: &u8| u32::from(*x) + 1);
    assert_eq!(borrowed.invoke(&1)?, 2);

    let shared = Arc::new(store.clone());
    let arc_backed = adapt::function(Arc::clone(&shared), |x: &u8| u32::from(*x) + 100);
    assert_eq!(arc_backed.invoke(&1)?, 2);
    assert_eq!(arc_backed.invoke(&2)?, 102);

    assert_eq!(store.entry_count(), 2);
    Ok(())
}

#[test]
fn build_rejects_missing_collaborators() {
    let missing_compute = Memoizer::builder::<u32, u32, u32, ConcurrentMap<u32, u32>>()
        .key(key::identity())
        .store(ConcurrentMap::new())
        .build()
        .unwrap_err();
    assert!(missing_compute.is_configuration());
    assert!(missing_compute.to_string().contains("computation"));

    let missing_key = Memoizer::builder::<u32, u32, u32, ConcurrentMap<u32, u32>>()
        .store(ConcurrentMap::new())
        .compute(|x| *x)
        .build()
        .unwrap_err();
    assert!(missing_key.to_string().contains("key function"));

    let missing_store = Memoizer::builder::<u32, u32, u32, ConcurrentMap<u32, u32>>()
        .key(key::identity())
        .compute(|x| *x)
        .build()
        .unwrap_err();
    assert!(missing_store.to_string().contains("store"));
}
