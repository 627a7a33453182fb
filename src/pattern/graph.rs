use crate::types::{ELabel, Edge, VId, VLabel};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Index of a vertex inside a pattern.
pub type LocalId = usize;

/// The neighbor's information of a vertex.
///
/// It stores the connection detail between a vertex and one of its neighbors:
/// the neighbor's label and the labels of the arcs (or undirected edges) between them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NeighborInfo {
    vlabel: VLabel,
    n_to_v_arcs: BTreeSet<ELabel>,
    v_to_n_arcs: BTreeSet<ELabel>,
    undirected_edges: BTreeSet<ELabel>,
}

impl NeighborInfo {
    fn new(vlabel: VLabel) -> Self {
        Self {
            vlabel,
            n_to_v_arcs: BTreeSet::new(),
            v_to_n_arcs: BTreeSet::new(),
            undirected_edges: BTreeSet::new(),
        }
    }

    fn add_predecessor(&mut self, elabel: ELabel) {
        self.n_to_v_arcs.insert(elabel);
    }

    fn add_successor(&mut self, elabel: ELabel) {
        self.v_to_n_arcs.insert(elabel);
    }

    fn add_neighbor(&mut self, elabel: ELabel) {
        self.undirected_edges.insert(elabel);
    }
}

#[derive(Debug, Clone, PartialEq)]
struct GraphNode {
    vlabel: VLabel,
    degree: usize,
    neighbors: BTreeMap<LocalId, NeighborInfo>,
}

impl GraphNode {
    fn new(vlabel: VLabel) -> GraphNode {
        GraphNode {
            vlabel,
            degree: 0,
            neighbors: BTreeMap::new(),
        }
    }

    fn add_predecessor(&mut self, u1: LocalId, vlabel: VLabel, elabel: ELabel) {
        self.neighbors
            .entry(u1)
            .or_insert_with(|| NeighborInfo::new(vlabel))
            .add_predecessor(elabel);
    }

    fn add_successor(&mut self, u2: LocalId, vlabel: VLabel, elabel: ELabel) {
        self.neighbors
            .entry(u2)
            .or_insert_with(|| NeighborInfo::new(vlabel))
            .add_successor(elabel);
    }

    fn add_neighbor(&mut self, n: LocalId, vlabel: VLabel, elabel: ELabel) {
        self.neighbors
            .entry(n)
            .or_insert_with(|| NeighborInfo::new(vlabel))
            .add_neighbor(elabel);
    }
}

/// A small connected labeled subgraph.
///
/// Vertices live in an arena and are addressed by their [`LocalId`], so a pattern never
/// refers to the concrete vertex ids of the stream it was cut from.
/// Whether the edges are arcs or undirected edges is decided once for the whole pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    directed: bool,
    vertices: Vec<GraphNode>,
    edges: Vec<(LocalId, LocalId, ELabel)>,
}

impl Pattern {
    /// Create a new empty pattern.
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            vertices: vec![],
            edges: vec![],
        }
    }

    /// The two-vertex pattern of a single stream edge (one vertex for a self-loop).
    pub fn single_edge(edge: &Edge) -> Self {
        Self::from_edges(edge.directed, std::iter::once(edge))
    }

    /// Cut a pattern out of concrete stream edges.
    ///
    /// Local ids are assigned in order of first appearance.
    pub fn from_edges<'a, I>(directed: bool, edges: I) -> Self
    where
        I: IntoIterator<Item = &'a Edge>,
    {
        let mut pattern = Pattern::new(directed);
        let mut local: HashMap<VId, LocalId> = HashMap::new();
        for edge in edges {
            let u1 = *local
                .entry(edge.source.id)
                .or_insert_with(|| pattern.add_vertex(edge.source.label));
            let u2 = *local
                .entry(edge.target.id)
                .or_insert_with(|| pattern.add_vertex(edge.target.label));
            pattern.add_edge(u1, u2, edge.label);
        }
        pattern
    }

    pub fn add_vertex(&mut self, vlabel: VLabel) -> LocalId {
        self.vertices.push(GraphNode::new(vlabel));
        self.vertices.len() - 1
    }

    /// Add an arc (directed pattern) or an undirected edge between two existing vertices.
    ///
    /// Returns `false` if a vertex is missing or the same connection already exists.
    pub fn add_edge(&mut self, u1: LocalId, u2: LocalId, elabel: ELabel) -> bool {
        if u1 >= self.vertices.len() || u2 >= self.vertices.len() || self.has_edge(u1, u2, elabel)
        {
            return false;
        }
        let (u1_vlabel, u2_vlabel) = (self.vertices[u1].vlabel, self.vertices[u2].vlabel);
        if self.directed {
            self.vertices[u1].add_successor(u2, u2_vlabel, elabel);
            self.vertices[u2].add_predecessor(u1, u1_vlabel, elabel);
        } else {
            self.vertices[u1].add_neighbor(u2, u2_vlabel, elabel);
            self.vertices[u2].add_neighbor(u1, u1_vlabel, elabel);
        }
        self.vertices[u1].degree += 1;
        if u1 != u2 {
            self.vertices[u2].degree += 1;
        }
        self.edges.push((u1, u2, elabel));
        true
    }

    pub fn has_edge(&self, u1: LocalId, u2: LocalId, elabel: ELabel) -> bool {
        self.vertices.get(u1).map_or(false, |node| {
            node.neighbors.get(&u2).map_or(false, |info| {
                if self.directed {
                    info.v_to_n_arcs.contains(&elabel)
                } else {
                    info.undirected_edges.contains(&elabel)
                }
            })
        })
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// The number of edges.
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn vlabel(&self, vid: LocalId) -> Option<VLabel> {
        self.vertices.get(vid).map(|node| node.vlabel)
    }

    /// The number of edges incident to `vid`, a self-loop counting once.
    pub fn degree(&self, vid: LocalId) -> Option<usize> {
        self.vertices.get(vid).map(|node| node.degree)
    }

    pub fn neighbors(&self, vid: LocalId) -> Option<&BTreeMap<LocalId, NeighborInfo>> {
        self.vertices.get(vid).map(|node| &node.neighbors)
    }

    pub fn vertices(&self) -> Vec<(LocalId, VLabel)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(v, node)| (v, node.vlabel))
            .collect()
    }

    /// The edges in insertion order.
    pub fn edge_list(&self) -> &[(LocalId, LocalId, ELabel)] {
        &self.edges
    }

    /// The sorted edges; undirected endpoints are given smaller id first.
    pub fn edges(&self) -> Vec<(LocalId, LocalId, ELabel)> {
        let mut edges: Vec<_> = self
            .edges
            .iter()
            .map(|&(u1, u2, e)| {
                if self.directed || u1 <= u2 {
                    (u1, u2, e)
                } else {
                    (u2, u1, e)
                }
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    pub fn is_connected(&self) -> bool {
        if self.vertices.is_empty() {
            return true;
        }
        let mut seen = vec![false; self.vertices.len()];
        let mut stack = vec![0];
        seen[0] = true;
        while let Some(v) = stack.pop() {
            for &n in self.vertices[v].neighbors.keys() {
                if !seen[n] {
                    seen[n] = true;
                    stack.push(n);
                }
            }
        }
        seen.into_iter().all(|x| x)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (v, vlabel) in self.vertices() {
            write!(f, "v {} {} ", v, vlabel)?;
        }
        write!(f, ";")?;
        let kind = if self.directed { 'd' } else { 'e' };
        for (u1, u2, elabel) in self.edges() {
            write!(f, " {} {} {} {}", kind, u1, u2, elabel)?;
        }
        Ok(())
    }
}
