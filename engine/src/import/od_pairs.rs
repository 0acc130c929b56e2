//! Origin-destination pairs describing travel demand.

use super::{row_source::RowSource, ImportError};
use crate::datastr::graph::NodeId;
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

/// A trip from `origin` to `destination`, both vertex ids of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OriginDestination {
    pub origin: NodeId,
    pub destination: NodeId,
}

impl OriginDestination {
    pub fn new(origin: NodeId, destination: NodeId) -> Self {
        OriginDestination { origin, destination }
    }
}

/// Read OD pairs from a CSV file with the columns `origin` and `destination`.
pub fn read_od_pairs<P: AsRef<Path>>(path: P, num_vertices: usize) -> Result<Vec<OriginDestination>, ImportError> {
    od_pairs_from_reader(File::open(path)?, num_vertices)
}

/// Read OD pairs and check that all vertices are below `num_vertices`.
pub fn od_pairs_from_reader<R: Read>(reader: R, num_vertices: usize) -> Result<Vec<OriginDestination>, ImportError> {
    let mut rows = RowSource::with_comments(reader, b'#')?;
    let mut pairs = Vec::new();

    while let Some((pair, line)) = rows.next_row::<OriginDestination>()? {
        for &vertex in &[pair.origin, pair.destination] {
            if vertex as usize >= num_vertices {
                return Err(ImportError::VertexOutOfRange {
                    vertex: u64::from(vertex),
                    num_vertices,
                    line,
                });
            }
        }
        pairs.push(pair);
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_in_file_order() {
        let pairs = od_pairs_from_reader("origin,destination,dep_time\n0,2,100\n2,1,200\n".as_bytes(), 3).unwrap();
        assert_eq!(pairs, vec![OriginDestination::new(0, 2), OriginDestination::new(2, 1)]);
    }

    #[test]
    fn vertex_out_of_range() {
        match od_pairs_from_reader("origin,destination\n0,1\n3,1\n".as_bytes(), 3) {
            Err(ImportError::VertexOutOfRange { vertex, line, .. }) => {
                assert_eq!(vertex, 3);
                assert_eq!(line, 3);
            }
            other => panic!("expected out of range error, got {:?}", other),
        }
    }

    #[test]
    fn negative_vertex_is_a_format_error() {
        assert!(matches!(
            od_pairs_from_reader("origin,destination\n-1,1\n".as_bytes(), 3),
            Err(ImportError::Csv(_))
        ));
    }
}
