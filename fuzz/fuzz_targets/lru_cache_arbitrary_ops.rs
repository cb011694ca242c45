#![no_main]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use libfuzzer_sys::fuzz_target;
use lrukit::{Entry, LruCacheBuilder};

// Fuzz arbitrary put/get/delete/touch sequences on LruCache
//
// Checks the capacity bound, the index/list agreement and that the removal
// hook count matches the drop in length plus successful puts.
fuzz_target!(|data: &[u8]| {
    let Some((&cap_byte, ops)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(cap_byte % 16) + 1;
    let removals = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&removals);

    let mut cache = LruCacheBuilder::new(capacity)
        .on_evict(move |_: &Entry<String, u8>| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .build();
    let mut created = 0usize;

    for pair in ops.chunks_exact(2) {
        let key = match pair[1] % 9 {
            0 => String::new(),
            n => format!("k{n}"),
        };
        match pair[0] % 4 {
            0 => {
                if cache.put(key, pair[1]) {
                    created += 1;
                }
            }
            1 => {
                let _ = cache.get(key.as_str());
            }
            2 => {
                let _ = cache.delete(key.as_str());
            }
            3 => {
                let _ = cache.touch(key.as_str());
            }
            _ => unreachable!(),
        }

        assert!(cache.len() <= capacity);
        assert_eq!(created - removals.load(Ordering::Relaxed), cache.len());
        cache.check_invariants().unwrap();
    }
});
