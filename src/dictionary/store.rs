use crate::{
    error::{Error, Result},
    pattern::{canonicalize, CanonicalKey, Pattern},
    types::BatchId,
};
use log::debug;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

/// A recurring pattern and how often it has been seen.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryEntry {
    key: CanonicalKey,
    representative: Arc<Pattern>,
    frequency: u64,
    first_seen_batch: BatchId,
}

impl DictionaryEntry {
    pub(crate) fn new(
        key: CanonicalKey,
        representative: Arc<Pattern>,
        frequency: u64,
        first_seen_batch: BatchId,
    ) -> Self {
        Self {
            key,
            representative,
            frequency,
            first_seen_batch,
        }
    }

    pub fn key(&self) -> &CanonicalKey {
        &self.key
    }

    /// The first pattern recorded under this key.
    pub fn representative(&self) -> &Pattern {
        &self.representative
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn first_seen_batch(&self) -> BatchId {
        self.first_seen_batch
    }

    /// The number of edges of the pattern.
    pub fn size(&self) -> usize {
        self.representative.size()
    }

    /// The compression score `(size - 1) * (frequency - 1)`.
    pub fn score(&self) -> u64 {
        (self.size() as u64).saturating_sub(1) * self.frequency.saturating_sub(1)
    }
}

/// The bounded dictionary of patterns, keyed by canonical key.
#[derive(Debug, Clone, Default)]
pub struct PatternStore {
    entries: HashMap<CanonicalKey, DictionaryEntry>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, key: &CanonicalKey) -> Option<&DictionaryEntry> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.values()
    }

    /// Count one occurrence of `pattern`, inserting it if its key is new.
    ///
    /// Only connected patterns with at least one edge are accepted.
    pub fn record(&mut self, pattern: Pattern, batch: BatchId) -> Result<&DictionaryEntry> {
        if pattern.is_empty() {
            return Err(Error::EmptyPattern);
        }
        if !pattern.is_connected() {
            return Err(Error::DisconnectedPattern);
        }
        let key = canonicalize(&pattern);
        Ok(self
            .entries
            .entry(key)
            .and_modify(|entry| entry.frequency += 1)
            .or_insert_with_key(|key| {
                DictionaryEntry::new(key.clone(), Arc::new(pattern), 1, batch)
            }))
    }

    /// Shrink the dictionary to `theta` entries.
    ///
    /// The least frequent entries go first; among equally frequent ones the oldest go
    /// first, then the ones with the greatest key. Returns the number of removed entries.
    pub fn evict_to_capacity(&mut self, theta: usize) -> usize {
        if self.entries.len() <= theta {
            return 0;
        }
        let excess = self.entries.len() - theta;
        let mut victims: Vec<_> = self.entries.values().collect();
        victims.sort_unstable_by(|a, b| {
            (a.frequency, a.first_seen_batch, Reverse(&a.key)).cmp(&(
                b.frequency,
                b.first_seen_batch,
                Reverse(&b.key),
            ))
        });
        let victims: Vec<CanonicalKey> = victims
            .into_iter()
            .take(excess)
            .map(|entry| entry.key.clone())
            .collect();
        for key in &victims {
            self.entries.remove(key);
        }
        debug!("evicted {} entries, {} left", excess, self.entries.len());
        excess
    }

    /// All entries by descending frequency, ties by ascending key.
    pub fn snapshot(&self) -> Vec<DictionaryEntry> {
        let mut entries: Vec<_> = self.entries.values().cloned().collect();
        entries.sort_unstable_by(|a, b| {
            (Reverse(a.frequency), &a.key).cmp(&(Reverse(b.frequency), &b.key))
        });
        entries
    }

    /// Fold another store into this one.
    ///
    /// Frequencies add up; a shared key keeps this store's representative and the
    /// earliest first-seen batch. No eviction takes place.
    pub fn merge(&mut self, other: PatternStore) {
        for (key, entry) in other.entries {
            self.entries
                .entry(key)
                .and_modify(|mine| {
                    mine.frequency += entry.frequency;
                    mine.first_seen_batch = mine.first_seen_batch.min(entry.first_seen_batch);
                })
                .or_insert(entry);
        }
    }

    pub(crate) fn insert_entry(&mut self, entry: DictionaryEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }
}
