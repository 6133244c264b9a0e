/// Directory tree node model.
pub mod entry;

pub use entry::{Entry, EntryKind};
