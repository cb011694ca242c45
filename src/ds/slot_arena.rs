//! Generational slot arena.
//!
//! Values live in a `Vec` of slots addressed by [`SlotId`]. Each slot carries a
//! generation counter that is bumped whenever its occupant is removed or
//! re-issued, so a `SlotId` taken before that point no longer resolves.
//!
//! ```text
//!   slots
//!   ┌───────┬────────────┬───────────────┐
//!   │ index │ generation │ value         │
//!   ├───────┼────────────┼───────────────┤
//!   │   0   │     3      │ Some(A)       │ ◄── SlotId { 0, 3 } live
//!   │   1   │     1      │ None          │ ◄── on free list
//!   │   2   │     0      │ Some(B)       │
//!   └───────┴────────────┴───────────────┘
//!
//!   SlotId { 0, 2 } ──► generation mismatch ──► None
//! ```
//!
//! Freed indices are recycled LIFO through `free_list`.
//!
//! Generations are 64-bit. A slot would need 2^64 removals or re-issues
//! before an old id could alias a live one.

/// Handle to a slot, valid until the slot's generation moves past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: usize,
    generation: u64,
}

impl SlotId {
    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    generation: u64,
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> SlotId {
        let id = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index];
            slot.value = Some(value);
            SlotId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                value: Some(value),
                generation: 0,
            });
            SlotId {
                index: self.slots.len() - 1,
                generation: 0,
            }
        };
        self.len += 1;
        id
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.live_slot_mut(id)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
        self.len -= 1;
        Some(value)
    }

    /// Invalidates `id` and returns a fresh id for the same occupant.
    ///
    /// The value stays in place; only handles issued before this call go stale.
    pub fn reissue(&mut self, id: SlotId) -> Option<SlotId> {
        let slot = self.live_slot_mut(id)?;
        slot.generation = slot.generation.wrapping_add(1);
        Some(SlotId {
            index: id.index,
            generation: slot.generation,
        })
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.live_slot_mut(id).and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every value. Slots are retained with bumped generations so ids
    /// issued before the clear cannot alias later insertions.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free_list.push(index);
        }
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    SlotId {
                        index,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    fn live_slot_mut(&mut self, id: SlotId) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation && slot.value.is_some())
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
