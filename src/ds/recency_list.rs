//! Recency-ordered doubly linked list backed by `SlotArena`.
//!
//! Nodes live in a generational [`SlotArena`] and link to each other by
//! [`SlotId`]. The front is the most recently used node, the back the least.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌──────────┬──────────────────────────────────────────────┐
//!   │ SlotId   │ Node { value, prev, next }                   │
//!   ├──────────┼──────────────────────────────────────────────┤
//!   │ (0, g0)  │ { value: A, prev: None,     next: (1, g1) }  │
//!   │ (1, g1)  │ { value: B, prev: (0, g0),  next: (2, g2) }  │
//!   │ (2, g2)  │ { value: C, prev: (1, g1),  next: None }     │
//!   └──────────┴──────────────────────────────────────────────┘
//!
//!   front (MRU) ─► [A] ◄──► [B] ◄──► [C] ◄── back (LRU)
//! ```
//!
//! ## Handle refresh
//!
//! `move_to_front` re-issues the promoted node's id: the node stays in its
//! slot but the slot generation advances, so the id passed in goes stale and
//! the returned id must replace it wherever it was stored. Any stale id is
//! rejected by every operation instead of being followed.
//!
//! ## Performance
//! - `push_front`: O(1)
//! - `move_to_front`: O(1)
//! - `remove` / `back`: O(1)
//! - `iter`: O(n)
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Recency list that stores nodes in a `SlotArena` and links them via `SlotId`.
#[derive(Debug)]
pub struct RecencyList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> RecencyList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty list with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Returns the number of live nodes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the list holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns `true` if `id` refers to a live node of this list.
    pub fn is_valid(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    /// Returns the id of the most recently used node.
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Returns the id of the least recently used node.
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// Inserts a new node at the front and returns its id.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            prev: None,
            next: self.head,
        });
        if let Some(head) = self.head {
            if let Some(node) = self.arena.get_mut(head) {
                node.prev = Some(id);
            }
        } else {
            self.tail = Some(id);
        }
        self.head = Some(id);
        id
    }

    /// Moves the node `id` to the front and returns its new id.
    ///
    /// `id` is stale once this returns `Some`. Returns `None` without touching
    /// the list if `id` is not live.
    pub fn move_to_front(&mut self, id: SlotId) -> Option<SlotId> {
        if !self.arena.contains(id) {
            return None;
        }
        self.detach(id)?;
        let fresh = self.arena.reissue(id)?;
        self.attach_front(fresh)?;
        Some(fresh)
    }

    /// Unlinks the node `id` and returns its value; `None` if `id` is not live.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.detach(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    /// Clears the list and frees all nodes.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    /// Returns an iterator over values from front (MRU) to back (LRU).
    pub fn iter(&self) -> RecencyListIter<'_, T> {
        RecencyListIter {
            list: self,
            current: self.head,
            reverse: false,
        }
    }

    /// Returns an iterator over values from back (LRU) to front (MRU).
    pub fn iter_from_back(&self) -> RecencyListIter<'_, T> {
        RecencyListIter {
            list: self,
            current: self.tail,
            reverse: true,
        }
    }

    /// Returns an iterator of ids from front to back.
    pub fn iter_ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        std::iter::successors(self.head, move |&id| {
            self.arena.get(id).and_then(|node| node.next)
        })
    }

    fn detach(&mut self, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let node = self.arena.get(id)?;
            (node.prev, node.next)
        };

        if let Some(prev_id) = prev {
            if let Some(prev_node) = self.arena.get_mut(prev_id) {
                prev_node.next = next;
            }
        } else {
            self.head = next;
        }

        if let Some(next_id) = next {
            if let Some(next_node) = self.arena.get_mut(next_id) {
                next_node.prev = prev;
            }
        } else {
            self.tail = prev;
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = None;
        }

        Some(())
    }

    fn attach_front(&mut self, id: SlotId) -> Option<()> {
        let old_head = self.head;
        let node = self.arena.get_mut(id)?;
        node.prev = None;
        node.next = old_head;

        if let Some(old_head) = old_head {
            if let Some(head_node) = self.arena.get_mut(old_head) {
                head_node.prev = Some(id);
            }
        } else {
            self.tail = Some(id);
        }
        self.head = Some(id);
        Some(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            assert_eq!(self.len(), 0);
            return;
        }

        let mut seen = std::collections::HashSet::new();
        let mut count = 0usize;
        let mut current = self.head;
        let mut prev = None;

        while let Some(id) = current {
            assert!(seen.insert(id));
            let node = self.arena.get(id).expect("node missing");
            assert_eq!(node.prev, prev);
            if let Some(next_id) = node.next {
                let next_node = self.arena.get(next_id).expect("next node missing");
                assert_eq!(next_node.prev, Some(id));
            } else {
                assert_eq!(self.tail, Some(id));
            }

            prev = Some(id);
            current = node.next;
            count += 1;
            assert!(count <= self.len());
        }

        assert_eq!(count, self.len());
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over list values in recency order.
pub struct RecencyListIter<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<SlotId>,
    reverse: bool,
}

impl<'a, T> Iterator for RecencyListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.arena.get(id)?;
        self.current = if self.reverse { node.prev } else { node.next };
        Some(&node.value)
    }
}
