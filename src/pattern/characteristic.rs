use crate::{
    pattern::{LocalId, NeighborInfo, Pattern},
    types::VLabel,
};

/// The characteristic of the star rooted at a pattern vertex.
///
/// Vertices that an isomorphism can map onto each other have the same characteristic,
/// so characteristics partition the vertices before canonical relabeling.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Characteristic {
    root_vlabel: VLabel,
    infos: Vec<NeighborInfo>,
}

impl Characteristic {
    pub fn new(pattern: &Pattern, root: LocalId) -> Option<Self> {
        let root_vlabel = pattern.vlabel(root)?;
        let mut infos: Vec<_> = pattern.neighbors(root)?.values().cloned().collect();
        infos.sort_unstable();
        Some(Self { root_vlabel, infos })
    }

    pub fn root_vlabel(&self) -> VLabel {
        self.root_vlabel
    }
}
