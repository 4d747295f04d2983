// Phase 3: Draft persistence. Slots hold opaque strings; the store owns the envelope,
// the JSON layout and the obfuscation pass.

pub mod obfuscation;
pub mod slot;
pub mod store;

pub use slot::{DraftSlot, FileSlot, MemorySlot, SlotError};
pub use store::{Draft, DraftLoad, DraftStore, DRAFT_KEY};
