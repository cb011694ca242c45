//! Compares the two `PutPolicy` variants on a repeated key.
//!
//! Run with `cargo run --example put_policy`.

use lrukit::{LruCacheBuilder, PutPolicy};

fn main() {
    for policy in [PutPolicy::RefreshOnly, PutPolicy::Overwrite] {
        let mut cache = LruCacheBuilder::<&str, u32>::new(2)
            .put_policy(policy)
            .build();

        let created = cache.put("session", 1);
        let created_again = cache.put("session", 2);

        println!(
            "{policy:?}: first put={created}, second put={created_again}, stored={:?}",
            cache.peek("session"),
        );
    }
}
