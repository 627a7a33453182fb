//! Patterns and their canonical keys.

pub use canonical::{canonicalize, CanonicalKey};
pub use characteristic::Characteristic;
pub use graph::{LocalId, NeighborInfo, Pattern};

mod canonical;
mod characteristic;
mod graph;
