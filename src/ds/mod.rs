pub mod recency_list;
pub mod slot_arena;

pub use recency_list::{RecencyList, RecencyListIter};
pub use slot_arena::{SlotArena, SlotId};
