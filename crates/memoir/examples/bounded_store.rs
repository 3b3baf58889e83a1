// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Bounded Store Example
//!
//! Memoizes a lookup in a store that keeps at most a fixed number of entries and forgets
//! them after a while, so stale values are eventually recomputed.

use std::{thread, time::Duration};

use memoir::{BoundedStore, Memoizer, key};

fn main() -> memoir::Result<()> {
    let store = BoundedStore::builder()
        .name("exchange-rates")
        .max_capacity(100)
        .time_to_live(Duration::from_millis(200))
        .build();

    let rate = Memoizer::builder()
        .name("exchange-rate")
        .key(key::identity())
        .store(store.clone())
        .compute(|currency: &String| {
            println!("fetching rate for {currency}");
            1.0 + f64::from(fastrand::u8(..)) / 100.0
        })
        .build()?;

    let eur = "EUR".to_string();
    println!("first:  {}", rate.invoke(&eur)?);
    println!("cached: {}", rate.invoke(&eur)?);

    thread::sleep(Duration::from_millis(300));
    println!("after expiry: {}", rate.invoke(&eur)?);

    store.run_pending_tasks();
    println!("entries stored: {}", store.entry_count());
    Ok(())
}
