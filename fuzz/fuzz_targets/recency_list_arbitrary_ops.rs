#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::ds::RecencyList;

// Fuzz arbitrary operation sequences on RecencyList
//
// Replays push_front, move_to_front, remove, back and clear with ids that
// may be stale, checking that stale ids are always rejected.
fuzz_target!(|data: &[u8]| {
    let mut list: RecencyList<u32> = RecencyList::new();
    let mut all_ids = Vec::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 6;
        let value = u32::from(pair[1]);

        match op {
            0 => {
                let id = list.push_front(value);
                all_ids.push(id);
                assert_eq!(list.front(), Some(id));
                assert_eq!(list.get(id), Some(&value));
            }
            1 => {
                if !all_ids.is_empty() {
                    let id = all_ids[value as usize % all_ids.len()];
                    let was_valid = list.is_valid(id);
                    let old_len = list.len();
                    match list.move_to_front(id) {
                        Some(fresh) => {
                            assert!(was_valid);
                            assert!(!list.is_valid(id));
                            assert_eq!(list.front(), Some(fresh));
                            all_ids.push(fresh);
                        }
                        None => assert!(!was_valid),
                    }
                    assert_eq!(list.len(), old_len);
                }
            }
            2 => {
                if !all_ids.is_empty() {
                    let id = all_ids[value as usize % all_ids.len()];
                    let was_valid = list.is_valid(id);
                    let old_len = list.len();
                    let removed = list.remove(id);
                    assert_eq!(removed.is_some(), was_valid);
                    if removed.is_some() {
                        assert_eq!(list.len(), old_len - 1);
                    }
                    assert!(!list.is_valid(id));
                }
            }
            3 => {
                if let Some(back) = list.back() {
                    assert!(list.is_valid(back));
                } else {
                    assert!(list.is_empty());
                }
            }
            4 => {
                let forward: Vec<_> = list.iter().copied().collect();
                let mut backward: Vec<_> = list.iter_from_back().copied().collect();
                backward.reverse();
                assert_eq!(forward, backward);
                assert_eq!(forward.len(), list.len());
            }
            5 => {
                list.clear();
                assert!(list.is_empty());
                assert!(all_ids.iter().all(|&id| !list.is_valid(id)));
            }
            _ => unreachable!(),
        }
    }

    assert_eq!(list.iter_ids().count(), list.len());
    assert!(list.iter_ids().all(|id| list.is_valid(id)));
});
