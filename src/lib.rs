//! Mining frequent labeled subgraph patterns from edge streams.
//!
//! Edges are consumed in batches of `alpha`. Every edge either extends the largest
//! pattern of the dictionary it is adjacent to, LZ style, or starts a new single-edge
//! pattern. Patterns are keyed by an isomorphism-invariant canonical key and the
//! dictionary is bounded to `theta` entries.

pub mod compressor;
pub mod dictionary;
pub mod error;
pub mod front_end;
pub mod output;
pub mod pattern;
pub mod types;

pub use error::{Error, Result};
