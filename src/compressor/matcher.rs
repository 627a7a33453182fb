use crate::{
    compressor::Config,
    dictionary::{DictionaryEntry, PatternStore},
    pattern::{LocalId, Pattern},
    types::{Edge, VId, VLabel},
};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::iter::once;

/// Search steps allowed per embedding attempt of one dictionary entry.
const MAX_EMBEDDING_STEPS: usize = 1 << 14;

/// Finds, for every edge of a batch, the largest known pattern it extends.
///
/// The matcher only reads the dictionary; the patterns it returns are to be recorded by
/// the caller. An edge is matched against the edges that arrived before it in the same
/// batch: every dictionary entry is tried, largest first, as a label and direction
/// preserving embedding into those edges that touches one of the edge's endpoints.
pub struct BatchMatcher<'a> {
    config: &'a Config,
    ranked: Vec<&'a DictionaryEntry>,
}

impl<'a> BatchMatcher<'a> {
    pub fn new(config: &'a Config, store: &'a PatternStore) -> Self {
        let mut ranked: Vec<_> = store.entries().collect();
        ranked.sort_unstable_by(|a, b| {
            (Reverse(a.size()), Reverse(a.frequency()), a.key()).cmp(&(
                Reverse(b.size()),
                Reverse(b.frequency()),
                b.key(),
            ))
        });
        Self { config, ranked }
    }

    /// The candidate patterns of a batch, in edge arrival order.
    ///
    /// An edge that extends a known pattern `p` yields `p + edge` followed by `p`;
    /// any other edge yields its single-edge pattern.
    pub fn match_batch(&self, edges: &[Edge]) -> Vec<Pattern> {
        let mut candidates = Vec::with_capacity(2 * edges.len());
        let mut incident = Incidence::default();
        for (i, edge) in edges.iter().enumerate() {
            match self.best_match(edges, &incident, edge) {
                Some(occurrence) => {
                    let directed = self.config.directed();
                    let prefix = occurrence.iter().map(|&j| &edges[j]);
                    candidates.push(Pattern::from_edges(directed, prefix.clone().chain(once(edge))));
                    candidates.push(Pattern::from_edges(directed, prefix));
                }
                None => candidates.push(Pattern::single_edge(edge)),
            }
            incident.add(i, edge);
        }
        candidates
    }

    /// The earlier edges forming an occurrence of the best entry touching `edge`.
    fn best_match(&self, edges: &[Edge], incident: &Incidence, edge: &Edge) -> Option<Vec<usize>> {
        let anchors: Vec<VId> = if edge.source.id == edge.target.id {
            vec![edge.source.id]
        } else {
            vec![edge.source.id, edge.target.id]
        };
        let anchors: Vec<VId> = anchors
            .into_iter()
            .filter(|&v| incident.degree(v) > 0)
            .collect();
        if anchors.is_empty() {
            return None;
        }
        let num_earlier = incident.num_edges;
        self.ranked
            .iter()
            .filter(|entry| entry.size() <= num_earlier)
            .find_map(|entry| {
                let mut embedding = Embedding::new(entry.representative(), edges, incident);
                anchors.iter().find_map(|&anchor| embedding.anchored_at(anchor))
            })
    }
}

/// The edges of the batch seen so far, by vertex.
#[derive(Default)]
struct Incidence {
    edges: HashMap<VId, Vec<usize>>,
    num_edges: usize,
}

impl Incidence {
    fn add(&mut self, index: usize, edge: &Edge) {
        self.edges.entry(edge.source.id).or_default().push(index);
        if edge.target.id != edge.source.id {
            self.edges.entry(edge.target.id).or_default().push(index);
        }
        self.num_edges += 1;
    }

    fn of(&self, vid: VId) -> &[usize] {
        self.edges.get(&vid).map_or(&[], |edges| edges.as_slice())
    }

    fn degree(&self, vid: VId) -> usize {
        self.of(vid).len()
    }
}

/// Backtracking search for an occurrence of a pattern among the batch edges.
struct Embedding<'p> {
    pattern: &'p Pattern,
    edges: &'p [Edge],
    incident: &'p Incidence,
    /// Pattern edges in an order where each one touches an already mapped vertex.
    order: Vec<(LocalId, LocalId, i64)>,
    vertex_map: Vec<Option<VId>>,
    images: HashSet<VId>,
    used: Vec<usize>,
    steps: usize,
}

impl<'p> Embedding<'p> {
    fn new(pattern: &'p Pattern, edges: &'p [Edge], incident: &'p Incidence) -> Self {
        Self {
            pattern,
            edges,
            incident,
            order: vec![],
            vertex_map: vec![None; pattern.num_vertices()],
            images: HashSet::new(),
            used: vec![],
            steps: 0,
        }
    }

    /// Try every pattern vertex as the image of `anchor`, in local id order.
    fn anchored_at(&mut self, anchor: VId) -> Option<Vec<usize>> {
        let label = self.label_of(anchor)?;
        for root in 0..self.pattern.num_vertices() {
            if self.pattern.vlabel(root) != Some(label) || !self.fits(root, anchor) {
                continue;
            }
            self.order = traversal_order(self.pattern, root);
            self.map(root, anchor);
            self.steps = 0;
            let found = self.extend(0);
            self.unmap(root, anchor);
            if found {
                let mut occurrence = std::mem::take(&mut self.used);
                occurrence.sort_unstable();
                return Some(occurrence);
            }
        }
        None
    }

    fn extend(&mut self, depth: usize) -> bool {
        if depth == self.order.len() {
            return true;
        }
        self.steps += 1;
        if self.steps > MAX_EMBEDDING_STEPS {
            return false;
        }
        let (u1, u2, elabel) = self.order[depth];
        let pivot = match (self.vertex_map[u1], self.vertex_map[u2]) {
            (Some(v), _) | (None, Some(v)) => v,
            (None, None) => return false,
        };
        let (incident, edges) = (self.incident, self.edges);
        for &j in incident.of(pivot) {
            let edge = edges[j];
            if edge.label != elabel || self.used.contains(&j) {
                continue;
            }
            let (s, t) = (edge.source, edge.target);
            let mut orientations = vec![(s, t)];
            if !edge.directed && s.id != t.id {
                orientations.push((t, s));
            }
            for (x, y) in orientations {
                let mut fresh = vec![];
                if !self.bind(u1, x.id, x.label, &mut fresh)
                    || !self.bind(u2, y.id, y.label, &mut fresh)
                {
                    self.release(fresh);
                    continue;
                }
                self.used.push(j);
                if self.extend(depth + 1) {
                    return true;
                }
                self.used.pop();
                self.release(fresh);
            }
        }
        false
    }

    /// Map `u` to `vid` unless it conflicts with the current mapping; newly mapped
    /// pattern vertices are pushed to `fresh`.
    fn bind(&mut self, u: LocalId, vid: VId, label: VLabel, fresh: &mut Vec<LocalId>) -> bool {
        match self.vertex_map[u] {
            Some(mapped) => mapped == vid,
            None => {
                if self.pattern.vlabel(u) != Some(label)
                    || self.images.contains(&vid)
                    || !self.fits(u, vid)
                {
                    return false;
                }
                self.map(u, vid);
                fresh.push(u);
                true
            }
        }
    }

    fn release(&mut self, fresh: Vec<LocalId>) {
        for u in fresh {
            if let Some(vid) = self.vertex_map[u] {
                self.unmap(u, vid);
            }
        }
    }

    /// A batch vertex needs at least as many earlier edges as the pattern vertex has.
    fn fits(&self, u: LocalId, vid: VId) -> bool {
        self.pattern.degree(u).unwrap_or(0) <= self.incident.degree(vid)
    }

    fn map(&mut self, u: LocalId, vid: VId) {
        self.vertex_map[u] = Some(vid);
        self.images.insert(vid);
    }

    fn unmap(&mut self, u: LocalId, vid: VId) {
        self.vertex_map[u] = None;
        self.images.remove(&vid);
    }

    fn label_of(&self, vid: VId) -> Option<VLabel> {
        let &j = self.incident.of(vid).first()?;
        let edge = &self.edges[j];
        Some(if edge.source.id == vid {
            edge.source.label
        } else {
            edge.target.label
        })
    }
}

/// The pattern edges ordered so that each one touches a vertex reached before it,
/// starting from `root`.
fn traversal_order(pattern: &Pattern, root: LocalId) -> Vec<(LocalId, LocalId, i64)> {
    let mut reached = vec![false; pattern.num_vertices()];
    reached[root] = true;
    let mut remaining: Vec<_> = pattern.edge_list().to_vec();
    let mut order = Vec::with_capacity(remaining.len());
    while let Some(i) = remaining
        .iter()
        .position(|&(u1, u2, _)| reached[u1] || reached[u2])
    {
        let (u1, u2, elabel) = remaining.remove(i);
        reached[u1] = true;
        reached[u2] = true;
        order.push((u1, u2, elabel));
    }
    order
}
