//! Various types related to graph streams.

/// The vertex id type.
pub type VId = i64;

/// The vertex label type.
pub type VLabel = i64;

/// The edge label type.
pub type ELabel = i64;

/// The batch sequence number.
pub type BatchId = u64;

/// The label given to vertices that are referenced by an edge before being declared.
pub const IMPLICIT_VLABEL: VLabel = VLabel::MIN;

/// A vertex declared by the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vertex {
    pub id: VId,
    pub label: VLabel,
}

/// An edge whose endpoint labels have been resolved against the vertex registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: Vertex,
    pub target: Vertex,
    pub label: ELabel,
    pub directed: bool,
}

impl Edge {
    /// Whether both edges connect the same endpoints with the same label.
    pub fn same_as(&self, other: &Edge) -> bool {
        if self.label != other.label {
            return false;
        }
        let (s, t) = (self.source.id, self.target.id);
        let (os, ot) = (other.source.id, other.target.id);
        (s, t) == (os, ot) || (!self.directed && (s, t) == (ot, os))
    }

    pub fn touches(&self, vid: VId) -> bool {
        self.source.id == vid || self.target.id == vid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(s: VId, t: VId, label: ELabel, directed: bool) -> Edge {
        Edge {
            source: Vertex { id: s, label: 0 },
            target: Vertex { id: t, label: 0 },
            label,
            directed,
        }
    }

    #[test]
    fn test_same_as() {
        assert!(edge(1, 2, 0, false).same_as(&edge(2, 1, 0, false)));
        assert!(!edge(1, 2, 0, true).same_as(&edge(2, 1, 0, true)));
        assert!(edge(1, 2, 0, true).same_as(&edge(1, 2, 0, true)));
        assert!(!edge(1, 2, 0, false).same_as(&edge(1, 2, 1, false)));
    }
}
