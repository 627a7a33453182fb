use crate::{
    pattern::{Characteristic, LocalId, Pattern},
    types::{ELabel, VLabel},
};
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt;

const OUT: u8 = 0;
const IN: u8 = 1;
const LOOP: u8 = 2;

/// One canonical position's connections to the positions before it (and to itself).
type Row = Vec<(usize, u8, ELabel)>;

/// An isomorphism-invariant encoding of a pattern.
///
/// Two patterns have equal keys iff they are isomorphic under label equality and the
/// pattern's directedness. Keys are totally ordered so they can be sorted and used as
/// tie-breakers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalKey {
    directed: bool,
    vlabels: Vec<VLabel>,
    rows: Vec<Row>,
}

impl CanonicalKey {
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn num_vertices(&self) -> usize {
        self.vlabels.len()
    }

    /// The number of edges of the encoded pattern.
    pub fn size(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.vlabels.iter().join(","))?;
        for (i, row) in self.rows.iter().enumerate() {
            for &(j, kind, elabel) in row {
                match kind {
                    IN => write!(f, " {}>{}:{}", j, i, elabel)?,
                    _ => write!(f, " {}-{}:{}", i, j, elabel)?,
                }
            }
        }
        Ok(())
    }
}

/// Compute the canonical key of a pattern.
///
/// Vertices are first partitioned by their star [`Characteristic`]; the classes fix which
/// block of canonical positions a vertex may take. Within the blocks every consistent
/// ordering is explored depth first, keeping the lexicographically smallest row encoding.
/// Branches whose prefix is already larger than the best one are cut, and of two
/// interchangeable (twin) vertices only one is tried at each position.
pub fn canonicalize(pattern: &Pattern) -> CanonicalKey {
    let n = pattern.num_vertices();
    let chars: Vec<Characteristic> = (0..n)
        .filter_map(|v| Characteristic::new(pattern, v))
        .collect();
    let classes: Vec<&Characteristic> = chars.iter().sorted().dedup().collect();
    let rank: Vec<usize> = chars
        .iter()
        .map(|c| classes.binary_search(&c).unwrap_or_default())
        .collect();
    let mut slots: Vec<usize> = rank.clone();
    slots.sort_unstable();
    let vlabels = slots.iter().map(|&r| classes[r].root_vlabel()).collect();
    let mut search = Search {
        pattern,
        rank: &rank,
        slots: &slots,
        incident: incident_edges(pattern),
        twins: twins(pattern, &rank),
        pos_of: vec![None; n],
        rows: Vec::with_capacity(n),
        best: None,
    };
    search.run();
    CanonicalKey {
        directed: pattern.is_directed(),
        vlabels,
        rows: search.best.unwrap_or_default(),
    }
}

struct Search<'a> {
    pattern: &'a Pattern,
    rank: &'a [usize],
    slots: &'a [usize],
    incident: Vec<Vec<(LocalId, LocalId, ELabel)>>,
    twins: Vec<Vec<bool>>,
    pos_of: Vec<Option<usize>>,
    rows: Vec<Row>,
    best: Option<Vec<Row>>,
}

impl<'a> Search<'a> {
    fn run(&mut self) {
        let depth = self.rows.len();
        if depth == self.slots.len() {
            if self.compare_prefix() == Ordering::Less {
                self.best = Some(self.rows.clone());
            }
            return;
        }
        let mut tried: Vec<LocalId> = vec![];
        for v in 0..self.pattern.num_vertices() {
            if self.pos_of[v].is_some() || self.rank[v] != self.slots[depth] {
                continue;
            }
            if tried.iter().any(|&u| self.twins[u][v]) {
                continue;
            }
            tried.push(v);
            self.pos_of[v] = Some(depth);
            let row = self.row(v, depth);
            self.rows.push(row);
            if self.compare_prefix() != Ordering::Greater {
                self.run();
            }
            self.rows.pop();
            self.pos_of[v] = None;
        }
    }

    /// Compare the rows assigned so far with the same prefix of the best encoding.
    fn compare_prefix(&self) -> Ordering {
        match &self.best {
            None => Ordering::Less,
            Some(best) => self.rows.as_slice().cmp(&best[..self.rows.len()]),
        }
    }

    fn row(&self, v: LocalId, pos: usize) -> Row {
        let mut row: Row = self.incident[v]
            .iter()
            .filter_map(|&(u1, u2, elabel)| {
                let (other, kind) = if u1 == u2 {
                    (u1, LOOP)
                } else if u1 == v {
                    (u2, OUT)
                } else {
                    (u1, IN)
                };
                let kind = if self.pattern.is_directed() || kind == LOOP {
                    kind
                } else {
                    OUT
                };
                self.pos_of[other]
                    .filter(|&j| j <= pos)
                    .map(|j| (j, kind, elabel))
            })
            .collect();
        row.sort_unstable();
        row
    }
}

fn incident_edges(pattern: &Pattern) -> Vec<Vec<(LocalId, LocalId, ELabel)>> {
    let mut incident = vec![vec![]; pattern.num_vertices()];
    for &(u1, u2, elabel) in pattern.edge_list() {
        incident[u1].push((u1, u2, elabel));
        if u1 != u2 {
            incident[u2].push((u1, u2, elabel));
        }
    }
    incident
}

/// `twins[u][w]` holds when swapping `u` and `w` is an automorphism of the pattern.
fn twins(pattern: &Pattern, rank: &[usize]) -> Vec<Vec<bool>> {
    let n = pattern.num_vertices();
    let edges = pattern.edges();
    let mut twins = vec![vec![false; n]; n];
    for u in 0..n {
        twins[u][u] = true;
        for w in (u + 1)..n {
            if rank[u] != rank[w] {
                continue;
            }
            let swap = |x: LocalId| {
                if x == u {
                    w
                } else if x == w {
                    u
                } else {
                    x
                }
            };
            let mut swapped: Vec<_> = edges
                .iter()
                .map(|&(a, b, e)| {
                    let (a, b) = (swap(a), swap(b));
                    if pattern.is_directed() || a <= b {
                        (a, b, e)
                    } else {
                        (b, a, e)
                    }
                })
                .collect();
            swapped.sort_unstable();
            if swapped == edges {
                twins[u][w] = true;
                twins[w][u] = true;
            }
        }
    }
    twins
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(directed: bool, vlabels: &[VLabel], edges: &[(LocalId, LocalId, ELabel)]) -> Pattern {
        let mut p = Pattern::new(directed);
        for &l in vlabels {
            p.add_vertex(l);
        }
        for &(u1, u2, e) in edges {
            p.add_edge(u1, u2, e);
        }
        p
    }

    /// Relabel `vlabels`/`edges` so that old vertex `i` becomes `perm[i]`.
    fn permuted(
        directed: bool,
        vlabels: &[VLabel],
        edges: &[(LocalId, LocalId, ELabel)],
        perm: &[LocalId],
    ) -> Pattern {
        let mut new_vlabels = vec![0; vlabels.len()];
        for (i, &l) in vlabels.iter().enumerate() {
            new_vlabels[perm[i]] = l;
        }
        let new_edges: Vec<_> = edges
            .iter()
            .rev()
            .map(|&(a, b, e)| (perm[a], perm[b], e))
            .collect();
        build(directed, &new_vlabels, &new_edges)
    }

    #[test]
    fn test_isomorphic_relabelings() {
        let vlabels = [1, 2, 1, 3, 2];
        let edges = [(0, 1, 5), (1, 2, 5), (2, 3, 6), (3, 4, 5), (4, 0, 7), (1, 3, 6)];
        for &directed in &[false, true] {
            let key = canonicalize(&build(directed, &vlabels, &edges));
            for perm in (0..5).permutations(5) {
                assert_eq!(canonicalize(&permuted(directed, &vlabels, &edges, &perm)), key);
            }
        }
    }

    #[test]
    fn test_label_triples_differ() {
        let a = canonicalize(&build(false, &[100, 999], &[(0, 1, 1)]));
        let b = canonicalize(&build(false, &[100, 100], &[(0, 1, 2)]));
        let c = canonicalize(&build(false, &[999, 100], &[(0, 1, 1)]));
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.size(), 1);
        assert_eq!(a.num_vertices(), 2);
    }

    #[test]
    fn test_direction() {
        let ab = canonicalize(&build(true, &[1, 2], &[(0, 1, 0)]));
        let ba = canonicalize(&build(true, &[1, 2], &[(1, 0, 0)]));
        assert_ne!(ab, ba);
        let undirected = canonicalize(&build(false, &[1, 2], &[(0, 1, 0)]));
        assert_ne!(ab, undirected);
        assert!(ab.is_directed());
    }

    #[test]
    fn test_self_loop_and_parallel_edges() {
        let plain = canonicalize(&build(false, &[1, 1], &[(0, 1, 0)]));
        let looped = canonicalize(&build(false, &[1, 1], &[(0, 1, 0), (0, 0, 0)]));
        let parallel = canonicalize(&build(false, &[1, 1], &[(0, 1, 0), (0, 1, 1)]));
        let parallel_same = canonicalize(&build(false, &[1, 1], &[(0, 1, 0), (1, 0, 0)]));
        assert_ne!(plain, looped);
        assert_ne!(plain, parallel);
        assert_ne!(looped, parallel);
        assert_eq!(plain, parallel_same);
        assert_eq!(looped.size(), 2);
    }

    #[test]
    fn test_cycle_and_path_differ() {
        let cycle = canonicalize(&build(
            false,
            &[0; 4],
            &[(0, 1, 0), (1, 2, 0), (2, 3, 0), (3, 0, 0)],
        ));
        let star = canonicalize(&build(false, &[0; 4], &[(0, 1, 0), (0, 2, 0), (0, 3, 0)]));
        let path = canonicalize(&build(false, &[0; 4], &[(0, 1, 0), (1, 2, 0), (2, 3, 0)]));
        assert_ne!(cycle, path);
        assert_ne!(star, path);
    }

    #[test]
    fn test_large_star() {
        let vlabels = vec![0; 13];
        let edges: Vec<_> = (1..13).map(|leaf| (0, leaf, 4)).collect();
        let key = canonicalize(&build(false, &vlabels, &edges));
        let reversed: Vec<_> = (0..12).map(|leaf| (12, leaf, 4)).collect();
        assert_eq!(canonicalize(&build(false, &vlabels, &reversed)), key);
        assert_eq!(key.size(), 12);
    }

    #[test]
    fn test_empty() {
        let key = canonicalize(&Pattern::new(false));
        assert_eq!(key.size(), 0);
        assert_eq!(key.num_vertices(), 0);
    }
}
