//! The pattern dictionary.

pub use persist::{load_state, save_state, SavedState};
pub use store::{DictionaryEntry, PatternStore};

mod persist;
mod store;
