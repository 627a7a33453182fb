//! The stream compressor.

pub use config::Config;
pub use driver::{Compressor, Phase, Stats};
pub use matcher::BatchMatcher;
pub use registry::VertexRegistry;
pub use shard::{compress_shards, sweep};

mod config;
mod driver;
mod matcher;
mod registry;
mod shard;
