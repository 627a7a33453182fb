use super::{BatchMatcher, Config, VertexRegistry};
use crate::{
    dictionary::{self, DictionaryEntry, PatternStore},
    error::{Error, Result},
    front_end::{Event, EventSource, LocatedEvent, Position},
    types::{Edge, ELabel, VId},
};
use derive_more::Display;
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::Path;

/// Where a [`Compressor`] is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    Idle,
    Streaming,
    Draining,
    Done,
    Aborted,
}

/// Counters of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Display)]
#[display(
    fmt = "files: {}, vertices: {}, edges: {} ({} duplicate), implicit vertices: {}, \
           batches: {}, evictions: {} ({} entries)",
    files,
    vertices_read,
    edges_read,
    duplicate_edges,
    implicit_vertices,
    batches,
    evictions,
    evicted_entries
)]
pub struct Stats {
    pub files: u64,
    pub vertices_read: u64,
    pub edges_read: u64,
    pub duplicate_edges: u64,
    pub implicit_vertices: u64,
    pub batches: u64,
    pub evictions: u64,
    pub evicted_entries: u64,
}

impl Stats {
    pub fn merge(&mut self, other: &Stats) {
        self.files += other.files;
        self.vertices_read += other.vertices_read;
        self.edges_read += other.edges_read;
        self.duplicate_edges += other.duplicate_edges;
        self.implicit_vertices += other.implicit_vertices;
        self.batches += other.batches;
        self.evictions += other.evictions;
        self.evicted_entries += other.evicted_entries;
    }

    pub(crate) fn record_eviction(&mut self, evicted: usize) {
        if evicted > 0 {
            self.evictions += 1;
            self.evicted_entries += evicted as u64;
        }
    }

    /// The counters as saved alongside a dictionary.
    pub fn counters(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("files", self.files),
            ("vertices_read", self.vertices_read),
            ("edges_read", self.edges_read),
            ("duplicate_edges", self.duplicate_edges),
            ("implicit_vertices", self.implicit_vertices),
            ("batches", self.batches),
            ("evictions", self.evictions),
            ("evicted_entries", self.evicted_entries),
        ]
    }

    fn from_counters(counters: &BTreeMap<String, u64>) -> Self {
        let get = |name: &str| counters.get(name).copied().unwrap_or(0);
        Self {
            files: get("files"),
            vertices_read: get("vertices_read"),
            edges_read: get("edges_read"),
            duplicate_edges: get("duplicate_edges"),
            implicit_vertices: get("implicit_vertices"),
            batches: get("batches"),
            evictions: get("evictions"),
            evicted_entries: get("evicted_entries"),
        }
    }
}

/// Streams edges through the batch matcher into a bounded pattern dictionary.
///
/// Edges are grouped in batches of `alpha`. After each batch the candidates found by the
/// matcher are recorded and the dictionary is evicted down to `theta` entries, so the
/// store can be snapshotted between any two batches.
///
/// ```
/// use graphzip::compressor::{Compressor, Config, Phase};
/// use graphzip::front_end::{Event, EventList};
///
/// let mut compressor = Compressor::new(Config::new().with_alpha(2)).unwrap();
/// let mut events = EventList::from(vec![
///     Event::VertexDeclared { id: 1, label: 7 },
///     Event::VertexDeclared { id: 2, label: 7 },
///     Event::EdgeDeclared { source: 1, target: 2, label: 0 },
/// ]);
/// compressor.compress(&mut events).unwrap();
/// assert_eq!(compressor.phase(), Phase::Done);
/// assert_eq!(compressor.snapshot()[0].frequency(), 1);
/// ```
pub struct Compressor {
    config: Config,
    phase: Phase,
    registry: VertexRegistry,
    store: PatternStore,
    batch: Vec<Edge>,
    stats: Stats,
}

impl Compressor {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            phase: Phase::Idle,
            registry: VertexRegistry::new(),
            store: PatternStore::new(),
            batch: vec![],
            stats: Stats::default(),
        })
    }

    /// An idle compressor starting from a dictionary saved with
    /// [`save_state`](Self::save_state).
    ///
    /// Batch numbering continues after the last batch of the saved run.
    pub fn import_state<P: AsRef<Path>>(config: Config, path: P) -> Result<Self> {
        let mut compressor = Compressor::new(config)?;
        let saved = dictionary::load_state(path)?;
        if saved.directed != compressor.config.directed() {
            return Err(Error::IncompatibleState {
                saved: saved.directed,
                run: compressor.config.directed(),
            });
        }
        let mut stats = Stats::from_counters(&saved.counters);
        let next_batch = saved
            .store
            .entries()
            .map(|entry| entry.first_seen_batch() + 1)
            .max()
            .unwrap_or(0);
        stats.batches = stats.batches.max(next_batch);
        compressor.stats = stats;
        compressor.store = saved.store;
        info!(
            "imported {} entries, continuing at batch {}",
            compressor.store.len(),
            compressor.stats.batches
        );
        Ok(compressor)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn store(&self) -> &PatternStore {
        &self.store
    }

    /// The dictionary by descending frequency.
    pub fn snapshot(&self) -> Vec<DictionaryEntry> {
        self.store.snapshot()
    }

    pub fn into_parts(self) -> (PatternStore, Stats) {
        (self.store, self.stats)
    }

    /// Pull events from `source` until the end of the stream.
    pub fn compress<S: EventSource>(&mut self, source: &mut S) -> Result<()> {
        loop {
            let located = match source.next_event() {
                Ok(located) => located,
                Err(e) => {
                    self.phase = Phase::Aborted;
                    return Err(e);
                }
            };
            let end = located.event == Event::EndOfStream;
            self.feed(located)?;
            if end {
                return Ok(());
            }
        }
    }

    /// Consume a single event.
    ///
    /// Any error aborts the run; an aborted or finished compressor rejects further events.
    pub fn feed(&mut self, located: LocatedEvent) -> Result<()> {
        match self.phase {
            Phase::Done | Phase::Aborted => return Err(Error::StreamClosed),
            Phase::Idle => self.phase = Phase::Streaming,
            Phase::Streaming | Phase::Draining => {}
        }
        let result = self.apply(located);
        if result.is_err() {
            self.phase = Phase::Aborted;
        }
        result
    }

    /// Process the pending edges and freeze the dictionary. Calling it again is a no-op.
    pub fn finish(&mut self) -> Result<()> {
        match self.phase {
            Phase::Done => return Ok(()),
            Phase::Aborted => return Err(Error::StreamClosed),
            _ => {}
        }
        let result = self.drain();
        self.phase = match result {
            Ok(()) => Phase::Done,
            Err(_) => Phase::Aborted,
        };
        result
    }

    /// Write the dictionary and the counters to an SQLite database.
    pub fn save_state<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        dictionary::save_state(
            path,
            &self.store,
            self.config.directed(),
            &self.stats.counters(),
        )
    }

    fn apply(&mut self, located: LocatedEvent) -> Result<()> {
        let LocatedEvent { position, event } = located;
        match event {
            Event::VertexDeclared { id, label } => {
                self.stats.vertices_read += 1;
                self.registry.declare(id, label, &position)
            }
            Event::EdgeDeclared {
                source,
                target,
                label,
            } => self.push_edge(source, target, label, &position),
            Event::EndOfFile => self.end_file(&position),
            Event::EndOfStream => self.finish(),
        }
    }

    fn push_edge(
        &mut self,
        source: VId,
        target: VId,
        label: ELabel,
        position: &Position,
    ) -> Result<()> {
        let add_implicit = self.config.add_implicit_vertices();
        let (source, created_source) = self.registry.resolve(source, add_implicit, position)?;
        let (target, created_target) = self.registry.resolve(target, add_implicit, position)?;
        self.stats.implicit_vertices += created_source as u64 + created_target as u64;
        self.stats.edges_read += 1;
        let edge = Edge {
            source,
            target,
            label,
            directed: self.config.directed(),
        };
        if self.batch.iter().any(|e| e.same_as(&edge)) {
            debug!("skipping duplicate edge at {}", position);
            self.stats.duplicate_edges += 1;
            return Ok(());
        }
        self.batch.push(edge);
        if self.batch.len() >= self.config.alpha() {
            self.process_batch()?;
        }
        Ok(())
    }

    fn end_file(&mut self, position: &Position) -> Result<()> {
        self.process_batch()?;
        self.stats.files += 1;
        if self.config.label_history_per_file() {
            info!(
                "end of {}: forgetting {} vertices",
                position.file,
                self.registry.len()
            );
            self.registry.reset();
        }
        Ok(())
    }

    fn process_batch(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let edges = std::mem::take(&mut self.batch);
        let batch_id = self.stats.batches;
        let candidates = BatchMatcher::new(&self.config, &self.store).match_batch(&edges);
        let num_candidates = candidates.len();
        for candidate in candidates {
            self.store.record(candidate, batch_id)?;
        }
        self.evict()?;
        self.stats.batches += 1;
        debug!(
            "batch {}: {} edges, {} candidates, {} entries",
            batch_id,
            edges.len(),
            num_candidates,
            self.store.len()
        );
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        self.process_batch()?;
        self.phase = Phase::Draining;
        self.evict()?;
        info!("{}", self.stats);
        Ok(())
    }

    fn evict(&mut self) -> Result<()> {
        let theta = self.config.theta();
        let evicted = self.store.evict_to_capacity(theta);
        self.stats.record_eviction(evicted);
        if self.store.len() > theta {
            return Err(Error::CapacityInvariantViolation {
                len: self.store.len(),
                theta,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front_end::EventList;

    fn vertex(id: VId, label: i64) -> Event {
        Event::VertexDeclared { id, label }
    }

    fn edge(source: VId, target: VId, label: ELabel) -> Event {
        Event::EdgeDeclared {
            source,
            target,
            label,
        }
    }

    fn at(line: usize) -> Position {
        Position::new("t", line)
    }

    fn feed(compressor: &mut Compressor, event: Event) -> Result<()> {
        compressor.feed(LocatedEvent {
            position: at(1),
            event,
        })
    }

    #[test]
    fn test_phases() {
        let mut compressor = Compressor::new(Config::new().with_alpha(2)).unwrap();
        assert_eq!(compressor.phase(), Phase::Idle);
        feed(&mut compressor, vertex(1, 0)).unwrap();
        assert_eq!(compressor.phase(), Phase::Streaming);
        feed(&mut compressor, edge(1, 1, 0)).unwrap();
        compressor.finish().unwrap();
        assert_eq!(compressor.phase(), Phase::Done);
        compressor.finish().unwrap();
        assert_eq!(compressor.snapshot(), compressor.snapshot());
        assert!(matches!(
            feed(&mut compressor, vertex(2, 0)),
            Err(Error::StreamClosed)
        ));
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(Compressor::new(Config::new().with_alpha(0)).is_err());
        assert!(Compressor::new(Config::new().with_theta(0)).is_err());
    }

    #[test]
    fn test_abort_on_error() {
        let config = Config::new().with_add_implicit_vertices(false);
        let mut compressor = Compressor::new(config).unwrap();
        assert!(matches!(
            feed(&mut compressor, edge(1, 2, 0)),
            Err(Error::UnknownVertex { vid: 1, .. })
        ));
        assert_eq!(compressor.phase(), Phase::Aborted);
        assert!(matches!(compressor.finish(), Err(Error::StreamClosed)));
    }

    #[test]
    fn test_partial_batch_and_duplicates() {
        let mut compressor = Compressor::new(Config::new().with_alpha(3)).unwrap();
        let mut events = EventList::from(vec![
            vertex(1, 5),
            vertex(2, 6),
            edge(1, 2, 0),
            edge(2, 1, 0),
            edge(1, 2, 1),
        ]);
        compressor.compress(&mut events).unwrap();
        let stats = compressor.stats();
        assert_eq!(stats.edges_read, 3);
        assert_eq!(stats.duplicate_edges, 1);
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.files, 1);
        assert_eq!(compressor.store().len(), 2);
    }

    #[test]
    fn test_directed_keeps_antiparallel_edges() {
        let config = Config::new().with_alpha(2).with_directed(true);
        let mut compressor = Compressor::new(config).unwrap();
        let mut events = EventList::from(vec![
            vertex(1, 5),
            vertex(2, 5),
            edge(1, 2, 0),
            edge(2, 1, 0),
        ]);
        compressor.compress(&mut events).unwrap();
        assert_eq!(compressor.stats().duplicate_edges, 0);
        assert_eq!(compressor.snapshot()[0].frequency(), 2);
    }

    #[test]
    fn test_implicit_vertices() {
        let mut compressor = Compressor::new(Config::new()).unwrap();
        let mut events = EventList::from(vec![edge(1, 2, 0), vertex(1, 4)]);
        compressor.compress(&mut events).unwrap();
        assert_eq!(compressor.stats().implicit_vertices, 2);
        assert_eq!(compressor.stats().vertices_read, 1);
    }

    #[test]
    fn test_stats_counters() {
        let stats = Stats {
            files: 1,
            vertices_read: 2,
            edges_read: 3,
            duplicate_edges: 4,
            implicit_vertices: 5,
            batches: 6,
            evictions: 7,
            evicted_entries: 8,
        };
        let counters: BTreeMap<String, u64> = stats
            .counters()
            .into_iter()
            .map(|(name, value)| (name.to_owned(), value))
            .collect();
        assert_eq!(Stats::from_counters(&counters), stats);
        let mut doubled = stats.clone();
        doubled.merge(&stats);
        assert_eq!(doubled.batches, 12);
        assert_eq!(
            stats.to_string(),
            "files: 1, vertices: 2, edges: 3 (4 duplicate), implicit vertices: 5, \
             batches: 6, evictions: 7 (8 entries)"
        );
    }
}
