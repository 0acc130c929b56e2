//! Flow patterns computed by a traffic assignment.
//!
//! The file has the columns `iteration` and `edge_flow` and lists the flow on every edge,
//! ordered by edge id, for iteration 1, then iteration 2 and so on.
//! Lines starting with `#` are comments.

use super::{row_source::RowSource, ImportError};
use crate::datastr::graph::EdgeId;
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

#[derive(Debug, Deserialize)]
struct FlowRecord {
    iteration: i64,
    edge_flow: f64,
}

/// The flow on every edge after every iteration, stored as one flat `iterations x edges` array.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPatterns {
    num_edges: usize,
    num_iterations: usize,
    flows: Vec<f64>,
}

fn corrupt(reason: String, line: u64) -> ImportError {
    ImportError::CorruptFlowFile { reason, line }
}

impl FlowPatterns {
    pub fn read_from<P: AsRef<Path>>(path: P, num_edges: usize) -> Result<FlowPatterns, ImportError> {
        Self::from_reader(File::open(path)?, num_edges)
    }

    /// Read and validate the flow patterns of a network with `num_edges` edge ids.
    ///
    /// Iterations have to start at 1 and increase one by one, every iteration has to list exactly
    /// `num_edges` values and flows must not be negative.
    pub fn from_reader<R: Read>(reader: R, num_edges: usize) -> Result<FlowPatterns, ImportError> {
        let mut rows = RowSource::with_comments(reader, b'#')?;
        let mut flows = Vec::new();
        let mut current_iteration = 1;
        let mut last_line = 1;

        while let Some((record, line)) = rows.next_row::<FlowRecord>()? {
            let FlowRecord { iteration, edge_flow } = record;
            last_line = line;
            if iteration <= 0 {
                return Err(corrupt(format!("iteration must be positive, got {}", iteration), line));
            }
            if !(edge_flow >= 0.0 && edge_flow.is_finite()) {
                return Err(corrupt(format!("flow must be non-negative, got {}", edge_flow), line));
            }
            if iteration != current_iteration {
                if iteration != current_iteration + 1 {
                    return Err(corrupt(format!("iteration {} follows iteration {}", iteration, current_iteration), line));
                }
                if flows.len() != current_iteration as usize * num_edges {
                    return Err(corrupt(
                        format!(
                            "iteration {} has {} values, expected {}",
                            current_iteration,
                            flows.len() - (current_iteration as usize - 1) * num_edges,
                            num_edges
                        ),
                        line,
                    ));
                }
                current_iteration = iteration;
            }
            flows.push(edge_flow);
        }

        if flows.is_empty() {
            return Err(corrupt("no flow values".to_string(), last_line));
        }
        if flows.len() != current_iteration as usize * num_edges {
            return Err(corrupt(
                format!("{} values for {} iterations of {} edges", flows.len(), current_iteration, num_edges),
                last_line,
            ));
        }

        Ok(FlowPatterns {
            num_edges,
            num_iterations: current_iteration as usize,
            flows,
        })
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn num_iterations(&self) -> usize {
        self.num_iterations
    }

    /// Flows after iteration `iteration` (starting at 1), indexed by edge id.
    pub fn iteration(&self, iteration: usize) -> &[f64] {
        assert!(iteration >= 1 && iteration <= self.num_iterations, "no iteration {}", iteration);
        &self.flows[(iteration - 1) * self.num_edges..iteration * self.num_edges]
    }

    /// Flow on the edge with id `edge_id` after `iteration`.
    pub fn flow(&self, iteration: usize, edge_id: EdgeId) -> f64 {
        self.iteration(iteration)[edge_id as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str, num_edges: usize) -> Result<FlowPatterns, ImportError> {
        FlowPatterns::from_reader(text.as_bytes(), num_edges)
    }

    fn assert_corrupt(result: Result<FlowPatterns, ImportError>) {
        match result {
            Err(ImportError::CorruptFlowFile { .. }) => (),
            other => panic!("expected corrupt flow file, got {:?}", other),
        }
    }

    #[test]
    fn two_iterations() {
        let flows = read("iteration,edge_flow\n# first\n1,0.5\n1,1\n1,2\n2,3\n2,4\n2,5.25\n", 3).unwrap();
        assert_eq!(flows.num_iterations(), 2);
        assert_eq!(flows.iteration(1), &[0.5, 1.0, 2.0]);
        assert_eq!(flows.iteration(2), &[3.0, 4.0, 5.25]);
        assert_eq!(flows.flow(2, 1), 4.0);
    }

    #[test]
    fn extra_columns_and_whitespace() {
        let flows = read("iteration, edge_flow, congestion\n1, 7 ,x\n", 1).unwrap();
        assert_eq!(flows.iteration(1), &[7.0]);
    }

    #[test]
    fn iteration_gap() {
        assert_corrupt(read("iteration,edge_flow\n1,1\n1,1\n3,1\n3,1\n", 2));
    }

    #[test]
    fn wrong_block_size() {
        assert_corrupt(read("iteration,edge_flow\n1,1\n2,1\n2,1\n", 2));
        assert_corrupt(read("iteration,edge_flow\n1,1\n1,1\n2,1\n", 2));
        assert_corrupt(read("iteration,edge_flow\n1,1\n1,1\n1,1\n", 2));
    }

    #[test]
    fn negative_values() {
        assert_corrupt(read("iteration,edge_flow\n1,-0.5\n", 1));
        assert_corrupt(read("iteration,edge_flow\n0,1\n", 1));
        assert_corrupt(read("iteration,edge_flow\n-1,1\n", 1));
    }

    #[test]
    fn must_start_at_first_iteration() {
        assert_corrupt(read("iteration,edge_flow\n2,1\n", 1));
    }

    #[test]
    fn empty_file() {
        assert_corrupt(read("iteration,edge_flow\n", 3));
    }
}
