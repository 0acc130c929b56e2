//! Several traits and structs for working with graphs.
//!
//! The only graph representation is the `AttributedGraph`, an adjacency array
//! with one vector per vertex and edge attribute. The `attributes` module holds
//! the catalog of attribute kinds importers can be asked for.

use std::ops::Range;

pub mod attributed_graph;
pub mod attributes;

pub use self::attributed_graph::{AttributedGraph, CapacityScalingError};
pub use self::attributes::{AttributeKind, AttributeValue};

/// Node ids are 32bit unsigned ints
pub type NodeId = u32;
/// Edge ids are 32bit unsigned ints
pub type EdgeId = u32;
/// Basic weights are 32bit unsigned ints
pub type Weight = u32;
/// A sufficiently large infinity constant.
/// Set to `u32::MAX / 2` so that `INFINITY + x` for `x <= INFINITY` does not overflow.
pub const INFINITY: Weight = u32::MAX / 2;

/// Base trait for graphs.
/// Interesting behaviour will be added through subtraits.
pub trait Graph {
    fn num_nodes(&self) -> usize;
    fn num_arcs(&self) -> usize;
    fn degree(&self, node: NodeId) -> usize;
}

/// Trait for graph data structures which allow iterating over outgoing links of a node.
pub trait LinkIterable<'a, Link>: Graph {
    /// Type of the outgoing neighbor iterator.
    type Iter: Iterator<Item = Link> + 'a;

    /// Get a iterator over the outgoing links of the given node.
    fn link_iter(&'a self, node: NodeId) -> Self::Iter;
}

/// Trait for graph types which store their outgoing edges as consecutive edge id ranges.
pub trait EdgeRangeGraph: Graph {
    /// Get the range of edge ids which make up the outgoing edges of `node`
    fn neighbor_edge_indices(&self, node: NodeId) -> Range<EdgeId>;

    /// Get the range of edge ids which make up the outgoing edges of `node` as a `Range<usize>`
    fn neighbor_edge_indices_usize(&self, node: NodeId) -> Range<usize> {
        let range = self.neighbor_edge_indices(node);
        Range {
            start: range.start as usize,
            end: range.end as usize,
        }
    }
}

/// Build a first_out array from an iterator of degrees
pub fn degrees_to_first_out<I: Iterator<Item = EdgeId>>(degrees: I) -> impl Iterator<Item = EdgeId> {
    std::iter::once(0).chain(degrees.scan(0, |state, degree| {
        *state += degree as EdgeId;
        Some(*state)
    }))
}
