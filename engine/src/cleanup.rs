//! Region specific preparation of imported networks.

use crate::{
    algo::strongly_connected_components::StronglyConnectedComponents,
    datastr::{graph::*, rank_select_map::BitVec},
    report::*,
};
use std::{error::Error, fmt};

const STUTTGART_NUM_VERTICES: usize = 134_663;
const STUTTGART_NUM_EDGES: usize = 307_759;
// ends of the highways towards Basle, Frankfurt, Zurich, Nuremberg and Munich
const STUTTGART_OUTLIERS: [usize; 5] = [121_490, 121_491, 121_492, 121_494, 121_510];

/// The network is not the one the cleanup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnrecognizedNetwork {
    pub num_vertices: usize,
    pub num_edges: usize,
}

impl fmt::Display for UnrecognizedNetwork {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unrecognized Stuttgart network -- {} vertices and {} edges, expected {} and {}",
            self.num_vertices, self.num_edges, STUTTGART_NUM_VERTICES, STUTTGART_NUM_EDGES
        )
    }
}

impl Error for UnrecognizedNetwork {}

/// Cut off the highways leaving the Stuttgart network and keep the largest strongly connected component of the rest.
/// Only works on the exact network snapshot the outlier vertices were determined for.
pub fn remove_stuttgart_outliers(graph: &AttributedGraph) -> Result<AttributedGraph, UnrecognizedNetwork> {
    if graph.num_nodes() != STUTTGART_NUM_VERTICES || graph.num_arcs() != STUTTGART_NUM_EDGES {
        return Err(UnrecognizedNetwork {
            num_vertices: graph.num_nodes(),
            num_edges: graph.num_arcs(),
        });
    }
    Ok(remove_outliers(graph, &STUTTGART_OUTLIERS))
}

/// Remove the vertices `outliers` and everything which is not in the largest strongly connected component afterwards.
pub fn remove_outliers(graph: &AttributedGraph, outliers: &[usize]) -> AttributedGraph {
    let mut keep = BitVec::new_set(graph.num_nodes());
    for &outlier in outliers {
        keep.unset(outlier);
    }
    let graph = graph.extract_vertex_induced_subgraph(&keep);

    let scc = StronglyConnectedComponents::new(&graph);
    let cleaned = graph.extract_vertex_induced_subgraph(&scc.largest_scc_as_bitmask());
    report!("cleanup", { "num_nodes": cleaned.num_nodes(), "num_arcs": cleaned.num_arcs() });
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::csv_source::CsvImporter;

    #[test]
    fn other_networks_are_rejected() {
        let mut importer = CsvImporter::from_readers("vert_id,xcoord,ycoord\n1,0,0\n".as_bytes(), "edge_tail,edge_head,length,capacity,speed\n".as_bytes(), 1.0).unwrap();
        let graph = AttributedGraph::import(&mut importer).unwrap();
        assert_eq!(
            remove_stuttgart_outliers(&graph),
            Err(UnrecognizedNetwork { num_vertices: 1, num_edges: 0 })
        );
    }

    #[test]
    fn outliers_and_their_dead_ends_are_removed() {
        // cycle 0 -> 1 -> 2 -> 0, vertex 3 connects 2 and 4, vertex 4 is only reachable through 3
        let vertices = "vert_id,xcoord,ycoord\n0,0,0\n1,0,1\n2,1,1\n3,1,2\n4,2,2\n";
        let edges = "edge_tail,edge_head,length,capacity,speed\n\
                     0,1,1,1,1\n1,2,1,1,1\n2,0,1,1,1\n2,3,1,1,1\n3,2,1,1,1\n3,4,1,1,1\n4,3,1,1,1\n";
        let mut importer = CsvImporter::from_readers(vertices.as_bytes(), edges.as_bytes(), 1.0).unwrap();
        let graph = AttributedGraph::import(&mut importer).unwrap();

        let cleaned = remove_outliers(&graph, &[3]);
        assert_eq!(cleaned.num_nodes(), 3);
        assert_eq!(cleaned.vertex_id(), &[0, 1, 2]);
        assert_eq!(cleaned.edge_id(), &[0, 1, 2]);

        let untouched = remove_outliers(&graph, &[]);
        assert_eq!(untouched.num_nodes(), 5);
        assert_eq!(untouched.num_arcs(), 7);
    }
}
