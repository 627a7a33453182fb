use crate::{
    error::{Error, Result},
    front_end::Position,
    types::{VId, VLabel, Vertex, IMPLICIT_VLABEL},
};
use log::debug;
use std::collections::{HashMap, HashSet};

/// The vertex id to label mapping learned from `v` records.
#[derive(Debug, Default)]
pub struct VertexRegistry {
    labels: HashMap<VId, VLabel>,
    implicit: HashSet<VId>,
}

impl VertexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, vid: VId) -> Option<VLabel> {
        self.labels.get(&vid).copied()
    }

    /// Register a declared vertex.
    ///
    /// Re-declaring a vertex with its current label is a no-op, and a vertex that was
    /// synthesized by [`resolve`](Self::resolve) takes the declared label. Any other label
    /// change fails.
    pub fn declare(&mut self, vid: VId, vlabel: VLabel, position: &Position) -> Result<()> {
        match self.labels.get(&vid).copied() {
            None => {
                self.labels.insert(vid, vlabel);
                Ok(())
            }
            Some(old) if old == vlabel => Ok(()),
            Some(_) if self.implicit.contains(&vid) => {
                self.implicit.remove(&vid);
                debug!("implicit vertex {} declared with label {}", vid, vlabel);
                self.labels.insert(vid, vlabel);
                Ok(())
            }
            Some(old) => Err(Error::VertexRelabeled {
                position: position.clone(),
                vid,
                old,
                new: vlabel,
            }),
        }
    }

    /// Look up an edge endpoint.
    ///
    /// Unknown vertices are created with [`IMPLICIT_VLABEL`] when `add_implicit` is set;
    /// the flag in the result tells whether that happened.
    pub fn resolve(
        &mut self,
        vid: VId,
        add_implicit: bool,
        position: &Position,
    ) -> Result<(Vertex, bool)> {
        if let Some(label) = self.label(vid) {
            return Ok((Vertex { id: vid, label }, false));
        }
        if !add_implicit {
            return Err(Error::UnknownVertex {
                position: position.clone(),
                vid,
            });
        }
        debug!("vertex {} used before declaration at {}", vid, position);
        self.labels.insert(vid, IMPLICIT_VLABEL);
        self.implicit.insert(vid);
        Ok((
            Vertex {
                id: vid,
                label: IMPLICIT_VLABEL,
            },
            true,
        ))
    }

    pub fn reset(&mut self) {
        self.labels.clear();
        self.implicit.clear();
    }
}
