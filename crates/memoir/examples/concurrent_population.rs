// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Concurrent Population Example
//!
//! Several threads ask for the same expensive values at once. The memoizer runs each
//! computation once; the other callers wait for it and receive the same value.

use std::{
    sync::{
        Arc, Barrier,
        atomic::{AtomicU32, Ordering},
    },
    thread,
    time::Duration,
};

use memoir::{ConcurrentMap, Memoizer, key};

const THREADS: usize = 8;

fn main() -> memoir::Result<()> {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let store = ConcurrentMap::new();

    let report = Memoizer::builder()
        .name("report")
        .key(key::hash_combine())
        .store(store.clone())
        .compute(move |(region, year): &(String, u16)| {
            counter.fetch_add(1, Ordering::Relaxed);
            thread::sleep(Duration::from_millis(100));
            format!("report for {region} in {year}: {}", fastrand::u32(..1000))
        })
        .build()?;

    let barrier = Barrier::new(THREADS);
    let regions = ["north", "south"];

    thread::scope(|scope| {
        for index in 0..THREADS {
            let report = &report;
            let barrier = &barrier;
            let region = regions[index % regions.len()].to_string();
            scope.spawn(move || {
                barrier.wait();
                match report.invoke(&(region, 2024)) {
                    Ok(text) => println!("thread {index}: {text}"),
                    Err(error) => println!("thread {index}: {error}"),
                }
            });
        }
    });

    println!("computations run: {}", calls.load(Ordering::Relaxed));
    println!("entries stored:   {}", store.entry_count());
    Ok(())
}
