//! Running independent streams in parallel.

use super::{Compressor, Config, Stats};
use crate::{
    dictionary::{DictionaryEntry, PatternStore},
    error::{Error, Result},
    front_end::{Event, EventList, EventSource},
};
use log::info;
use rayon::prelude::*;

/// Compress every shard with its own store, then merge the stores in shard order.
///
/// Shards must not share vertices. The merged dictionary is evicted to `theta`.
pub fn compress_shards<S>(config: &Config, shards: Vec<S>) -> Result<(PatternStore, Stats)>
where
    S: EventSource + Send,
{
    config.validate()?;
    let num_shards = shards.len();
    let results: Vec<Result<(PatternStore, Stats)>> = shards
        .into_par_iter()
        .map(|mut shard| {
            let mut compressor = Compressor::new(config.clone())?;
            compressor.compress(&mut shard)?;
            Ok(compressor.into_parts())
        })
        .collect();
    let mut store = PatternStore::new();
    let mut stats = Stats::default();
    for result in results {
        let (shard_store, shard_stats) = result?;
        store.merge(shard_store);
        stats.merge(&shard_stats);
    }
    let theta = config.theta();
    stats.record_eviction(store.evict_to_capacity(theta));
    if store.len() > theta {
        return Err(Error::CapacityInvariantViolation {
            len: store.len(),
            theta,
        });
    }
    info!("merged {} shards into {} entries", num_shards, store.len());
    Ok((store, stats))
}

/// Compress the same events once per configuration.
///
/// Runs are independent and execute in parallel; results follow the order of `configs`.
pub fn sweep(configs: &[Config], events: &[Event]) -> Vec<Result<Vec<DictionaryEntry>>> {
    configs
        .par_iter()
        .map(|config| {
            let mut compressor = Compressor::new(config.clone())?;
            compressor.compress(&mut EventList::new("<sweep>", events.to_vec()))?;
            Ok(compressor.snapshot())
        })
        .collect()
}
