//! Classification of edges by the ratio of flow to capacity.
//!
//! Five levels of equal width cover ratios below one, every edge at or above capacity
//! falls into the top level.

use crate::datastr::graph::*;

/// Number of distinct congestion levels.
///
/// Overloaded edges are not split further, so there are six levels rather than eight
/// with extra levels for ratios of 1.2 and 1.4 and above.
pub const NUM_CONGESTION_LEVELS: usize = 6;

const TOP_LEVEL: usize = NUM_CONGESTION_LEVELS - 1;

/// `floor(5 * flow / capacity)`, clamped to the top level.
///
/// An edge without capacity is in the top level as soon as there is any flow on it.
pub fn congestion_level(flow: f64, capacity: Weight) -> usize {
    let level = (TOP_LEVEL as f64 * flow / f64::from(capacity)).floor();
    if level.is_nan() || level <= 0.0 {
        0
    } else if level >= TOP_LEVEL as f64 {
        TOP_LEVEL
    } else {
        level as usize
    }
}

/// Edges partitioned by congestion level. Within a level, edges are in graph order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CongestionLevels {
    levels: [Vec<(NodeId, EdgeId)>; NUM_CONGESTION_LEVELS],
}

impl CongestionLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition the edges of `graph` by the flows in `flows`, which is indexed by edge id.
    /// The vectors of a previous classification are reused.
    ///
    /// Panics if `flows` has no entry for some edge id of the graph.
    pub fn classify(&mut self, graph: &AttributedGraph, flows: &[f64]) {
        for level in &mut self.levels {
            level.clear();
        }
        for (tail, edge) in graph.edges() {
            let edge_idx = edge as usize;
            let flow = flows[graph.edge_id()[edge_idx] as usize];
            self.levels[congestion_level(flow, graph.capacity()[edge_idx])].push((tail, edge));
        }
    }

    /// `(tail, edge index)` pairs of all edges in `level`.
    pub fn level(&self, level: usize) -> &[(NodeId, EdgeId)] {
        &self.levels[level]
    }

    /// Levels from least to most congested.
    pub fn iter(&self) -> impl Iterator<Item = &[(NodeId, EdgeId)]> {
        self.levels.iter().map(Vec::as_slice)
    }

    pub fn counts(&self) -> [usize; NUM_CONGESTION_LEVELS] {
        let mut counts = [0; NUM_CONGESTION_LEVELS];
        for (count, level) in counts.iter_mut().zip(self.levels.iter()) {
            *count = level.len();
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::csv_source::CsvImporter;

    #[test]
    fn equal_width_levels_below_capacity() {
        assert_eq!(congestion_level(0.0, 100), 0);
        assert_eq!(congestion_level(19.9, 100), 0);
        assert_eq!(congestion_level(20.0, 100), 1);
        assert_eq!(congestion_level(50.0, 100), 2);
        assert_eq!(congestion_level(99.9, 100), 4);
    }

    #[test]
    fn at_and_above_capacity_is_top_level() {
        assert_eq!(congestion_level(100.0, 100), TOP_LEVEL);
        assert_eq!(congestion_level(250.0, 100), TOP_LEVEL);
        assert_eq!(congestion_level(1e12, 1), TOP_LEVEL);
    }

    #[test]
    fn overload_is_not_split() {
        assert_eq!(NUM_CONGESTION_LEVELS, 6);
        assert_eq!(congestion_level(120.0, 100), congestion_level(100.0, 100));
        assert_eq!(congestion_level(140.0, 100), congestion_level(100.0, 100));
    }

    #[test]
    fn zero_capacity() {
        assert_eq!(congestion_level(0.0, 0), 0);
        assert_eq!(congestion_level(0.1, 0), TOP_LEVEL);
    }

    #[test]
    fn monotone_in_flow() {
        let mut previous = 0;
        for flow in 0..400 {
            let level = congestion_level(f64::from(flow) * 0.7, 130);
            assert!(level >= previous);
            previous = level;
        }
        assert_eq!(previous, TOP_LEVEL);
    }

    #[test]
    fn partition_by_edge_id() {
        let vertices = "vert_id,xcoord,ycoord\n1,0,0\n2,0,1\n3,1,1\n";
        let edges = "edge_tail,edge_head,length,capacity,speed\n2,3,1,100,50\n1,2,1,100,50\n1,3,1,100,50\n3,1,1,10,50\n";
        let mut importer = CsvImporter::from_readers(vertices.as_bytes(), edges.as_bytes(), 1.0).unwrap();
        let graph = AttributedGraph::import(&mut importer).unwrap();

        let mut levels = CongestionLevels::new();
        levels.classify(&graph, &[0.0, 45.0, 10.0, 100.0]);
        assert_eq!(levels.level(0), &[(0, 0), (1, 2)]);
        assert_eq!(levels.level(2), &[(0, 1)]);
        assert_eq!(levels.level(TOP_LEVEL), &[(2, 3)]);
        assert_eq!(levels.counts(), [2, 0, 1, 0, 0, 1]);

        levels.classify(&graph, &[0.0; 4]);
        assert_eq!(levels.counts(), [4, 0, 0, 0, 0, 0]);
    }
}
