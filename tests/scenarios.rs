use graphzip::{
    compressor::{Compressor, Config, Phase},
    dictionary::DictionaryEntry,
    front_end::{Event, EventList, LocatedEvent, Position},
    output::write_dictionary,
    pattern::CanonicalKey,
    types::VId,
    Error,
};
use std::collections::HashMap;

fn vertex(id: VId, label: i64) -> Event {
    Event::VertexDeclared { id, label }
}

fn edge(source: VId, target: VId, label: i64) -> Event {
    Event::EdgeDeclared {
        source,
        target,
        label,
    }
}

fn run(config: Config, events: Vec<Event>) -> Vec<DictionaryEntry> {
    let mut compressor = Compressor::new(config).unwrap();
    compressor.compress(&mut EventList::from(events)).unwrap();
    assert_eq!(compressor.phase(), Phase::Done);
    compressor.snapshot()
}

/// A reproducible pseudo random stream over a few labels.
fn random_stream(seed: u64, num_vertices: VId, num_edges: usize) -> Vec<Event> {
    let mut state = seed;
    let mut next = move |bound: u64| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) % bound
    };
    let mut events: Vec<Event> = (0..num_vertices)
        .map(|id| vertex(id, next(3) as i64))
        .collect();
    for _ in 0..num_edges {
        let source = next(num_vertices as u64) as VId;
        let target = next(num_vertices as u64) as VId;
        events.push(edge(source, target, next(2) as i64));
    }
    events
}

fn clique_3() -> Vec<Event> {
    vec![
        vertex(1, 100),
        vertex(2, 999),
        vertex(3, 100),
        edge(1, 2, 1),
        edge(1, 3, 2),
        edge(2, 3, 3),
    ]
}

fn triangle(offset: VId) -> Vec<Event> {
    vec![
        vertex(offset + 1, 100),
        vertex(offset + 2, 999),
        vertex(offset + 3, 100),
        edge(offset + 1, offset + 2, 1),
        edge(offset + 1, offset + 3, 2),
        edge(offset + 2, offset + 3, 3),
    ]
}

#[test]
fn test_single_edge_baseline() {
    let entries = run(Config::new(), vec![vertex(1, 0), vertex(2, 1), edge(1, 2, 5)]);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].frequency(), 1);
    assert_eq!(entries[0].size(), 1);
    assert_eq!(entries[0].representative().to_string(), "v 0 0 v 1 1 ; e 0 1 5");
}

#[test]
fn test_clique() {
    let entries = run(Config::new().with_alpha(3).with_theta(10), clique_3());
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.frequency() == 1 && e.size() == 1));
}

#[test]
fn test_repeated_pattern_in_one_batch() {
    let mut events = triangle(0);
    events.extend(triangle(10));
    let entries = run(Config::new().with_alpha(6), events);
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.frequency() == 2 && e.size() == 1));
}

#[test]
fn test_repeated_pattern_grows() {
    let mut events = triangle(0);
    events.extend(triangle(10));
    let entries = run(Config::new().with_alpha(3), events);
    // The second triangle extends the edges learned from the first one.
    assert_eq!(entries.len(), 5);
    assert_eq!(entries.iter().filter(|e| e.size() == 2).count(), 2);
    assert_eq!(entries.iter().map(|e| e.frequency()).sum::<u64>(), 8);
    assert_eq!(entries[0].size(), 1);
    assert!(entries[0].frequency() >= 3);
}

#[test]
fn test_eviction() {
    let events = vec![
        vertex(1, 1),
        vertex(2, 2),
        vertex(3, 3),
        vertex(4, 4),
        edge(1, 2, 0),
        edge(3, 4, 0),
        vertex(5, 5),
        vertex(6, 6),
        vertex(7, 5),
        vertex(8, 6),
        vertex(9, 5),
        vertex(10, 6),
        edge(5, 6, 0),
        edge(7, 8, 0),
        edge(9, 10, 0),
    ];
    let mut compressor = Compressor::new(Config::new().with_alpha(5).with_theta(2)).unwrap();
    compressor.compress(&mut EventList::from(events)).unwrap();
    let entries = compressor.snapshot();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].frequency(), 3);
    assert_eq!(entries[0].representative().vlabel(0), Some(5));
    assert_eq!(entries[1].frequency(), 1);
    assert_eq!(compressor.stats().evictions, 1);
    assert_eq!(compressor.stats().evicted_entries, 1);
}

#[test]
fn test_unknown_vertex() {
    let config = Config::new().with_add_implicit_vertices(false);
    let mut compressor = Compressor::new(config).unwrap();
    let mut events = EventList::new(
        "stream",
        vec![vertex(1, 0), vertex(2, 0), edge(1, 2, 0), edge(2, 99, 0)],
    );
    match compressor.compress(&mut events) {
        Err(Error::UnknownVertex { vid, position }) => {
            assert_eq!(vid, 99);
            assert_eq!(position.to_string(), "stream:4");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(compressor.phase(), Phase::Aborted);
}

#[test]
fn test_relabel_fails() {
    let mut compressor = Compressor::new(Config::new()).unwrap();
    let mut events = EventList::from(vec![vertex(1, 0), vertex(1, 0), vertex(1, 2)]);
    assert!(matches!(
        compressor.compress(&mut events),
        Err(Error::VertexRelabeled {
            vid: 1,
            old: 0,
            new: 2,
            ..
        })
    ));
}

#[test]
fn test_determinism() {
    let events = random_stream(7, 40, 300);
    let config = Config::new().with_alpha(8).with_theta(50);
    let render = |entries: &[DictionaryEntry]| {
        let mut out = vec![];
        write_dictionary(&mut out, entries, None).unwrap();
        out
    };
    let first = run(config.clone(), events.clone());
    let second = run(config, events);
    assert!(first.iter().any(|e| e.size() > 1));
    assert_eq!(render(&first), render(&second));
}

#[test]
fn test_isomorphism_invariance() {
    let events = random_stream(11, 30, 200);
    let relabeled: Vec<Event> = events
        .iter()
        .map(|event| match *event {
            Event::VertexDeclared { id, label } => vertex(7 * id + 1000, label),
            Event::EdgeDeclared {
                source,
                target,
                label,
            } => edge(7 * source + 1000, 7 * target + 1000, label),
            other => other,
        })
        .collect();
    for &directed in &[false, true] {
        let config = Config::new().with_alpha(6).with_directed(directed);
        let original = run(config.clone(), events.clone());
        let renamed = run(config, relabeled.clone());
        assert_eq!(original.len(), renamed.len());
        for (a, b) in original.iter().zip(&renamed) {
            assert_eq!(a.key(), b.key());
            assert_eq!(a.frequency(), b.frequency());
        }
    }
}

#[test]
fn test_capacity_and_monotonic_frequency() {
    let theta = 4;
    let mut compressor = Compressor::new(Config::new().with_alpha(3).with_theta(theta)).unwrap();
    let mut previous: HashMap<CanonicalKey, u64> = HashMap::new();
    for (line, event) in random_stream(3, 20, 150).into_iter().enumerate() {
        compressor
            .feed(LocatedEvent {
                position: Position::new("random", line + 1),
                event,
            })
            .unwrap();
        assert!(compressor.store().len() <= theta);
        let current: HashMap<_, _> = compressor
            .store()
            .entries()
            .map(|e| (e.key().clone(), e.frequency()))
            .collect();
        for (key, frequency) in &current {
            if let Some(before) = previous.get(key) {
                assert!(frequency >= before);
            }
        }
        previous = current;
    }
    compressor.finish().unwrap();
    assert!(compressor.store().len() <= theta);
}
