//! Basic LRU usage: fill, promote, evict, and observe removals.
//!
//! Run with `cargo run --example basic_lru`.

use std::sync::Arc;

use lrukit::{Entry, LruCacheBuilder};
use parking_lot::Mutex;

fn main() {
    let evicted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&evicted);

    let mut cache = LruCacheBuilder::new(3)
        .on_evict(move |entry: &Entry<String, u32>| {
            sink.lock().push(entry.key.clone());
        })
        .build();

    for (key, value) in [("alpha", 1), ("beta", 2), ("gamma", 3)] {
        cache.put(key.to_string(), value);
    }
    println!("filled: {:?}", cache.iter().collect::<Vec<_>>());

    // Reading "alpha" makes "beta" the least recently used entry.
    if let Some(value) = cache.get("alpha") {
        println!("alpha -> {value}");
    }

    cache.put("delta".to_string(), 4);
    println!("after insert: {:?}", cache.iter().collect::<Vec<_>>());
    println!("lru entry: {:?}", cache.peek_lru());

    cache.delete("gamma");
    println!("removed so far: {:?}", evicted.lock());
}
