//! Mapping of vertex ids of the source data to sequential ids.

use super::ImportError;
use crate::datastr::graph::NodeId;
use std::collections::{hash_map::Entry, HashMap};

/// Assigns sequential ids `0..n` to source vertex ids in the order they are registered.
///
/// Registration and resolution are two separate phases: ids can only be resolved
/// after `finish_vertices` was called, and no vertex can be registered afterwards.
#[derive(Debug, Default)]
pub struct VertexIdMapper {
    orig_to_new: HashMap<i64, NodeId>,
    vertices_finished: bool,
}

impl VertexIdMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next free id to `orig_id`.
    pub fn register(&mut self, orig_id: i64) -> Result<NodeId, ImportError> {
        if self.vertices_finished {
            return Err(ImportError::VerticesAlreadyFinished);
        }
        let next_id = self.orig_to_new.len() as NodeId;
        match self.orig_to_new.entry(orig_id) {
            Entry::Occupied(_) => Err(ImportError::DuplicateVertex(orig_id)),
            Entry::Vacant(entry) => Ok(*entry.insert(next_id)),
        }
    }

    pub fn finish_vertices(&mut self) {
        self.vertices_finished = true;
    }

    pub fn vertices_finished(&self) -> bool {
        self.vertices_finished
    }

    /// The sequential id of a registered vertex.
    pub fn resolve(&self, orig_id: i64) -> Result<NodeId, ImportError> {
        if !self.vertices_finished {
            return Err(ImportError::EdgesBeforeVertices);
        }
        self.orig_to_new.get(&orig_id).copied().ok_or(ImportError::UnknownEndpoint(orig_id))
    }

    pub fn len(&self) -> usize {
        self.orig_to_new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orig_to_new.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_assigned_in_registration_order() {
        let mut mapper = VertexIdMapper::new();
        assert_eq!(mapper.register(1000).unwrap(), 0);
        assert_eq!(mapper.register(-5).unwrap(), 1);
        assert_eq!(mapper.register(42).unwrap(), 2);
        mapper.finish_vertices();
        assert_eq!(mapper.resolve(42).unwrap(), 2);
        assert_eq!(mapper.resolve(1000).unwrap(), 0);
        assert_eq!(mapper.len(), 3);
    }

    #[test]
    fn duplicate_vertex() {
        let mut mapper = VertexIdMapper::new();
        mapper.register(7).unwrap();
        assert!(matches!(mapper.register(7), Err(ImportError::DuplicateVertex(7))));
    }

    #[test]
    fn unknown_endpoint() {
        let mut mapper = VertexIdMapper::new();
        mapper.register(7).unwrap();
        mapper.finish_vertices();
        assert!(matches!(mapper.resolve(8), Err(ImportError::UnknownEndpoint(8))));
    }

    #[test]
    fn phases_are_enforced() {
        let mut mapper = VertexIdMapper::new();
        mapper.register(7).unwrap();
        assert!(matches!(mapper.resolve(7), Err(ImportError::EdgesBeforeVertices)));
        mapper.finish_vertices();
        assert!(matches!(mapper.register(8), Err(ImportError::VerticesAlreadyFinished)));
    }
}
