//! Reading networks, flow patterns and auxiliary data from text files.
//!
//! Network importers implement `Importer`: the graph builder first calls `next_vertex`
//! until it returns `false` and then `next_edge` until it returns `false`, asking for
//! the attributes of the current record through `AttributeSource::value_of` in between.

use crate::datastr::graph::*;
use std::{error::Error, fmt, io};

pub mod csv_source;
pub mod flow;
pub mod id_mapper;
pub mod od_pairs;
pub mod osm_poly;
pub mod row_source;

/// Everything that can go wrong while reading input files.
#[derive(Debug)]
pub enum ImportError {
    Io(io::Error),
    Csv(csv::Error),
    InvalidAnalysisPeriod(f64),
    DuplicateVertex(i64),
    UnknownEndpoint(i64),
    EdgesBeforeVertices,
    VerticesAlreadyFinished,
    FieldParse { field: &'static str, value: String, line: u64 },
    NegativeValue { field: &'static str, value: f64, line: u64 },
    AttributeTypeMismatch(AttributeKind),
    CorruptFlowFile { reason: String, line: u64 },
    VertexOutOfRange { vertex: u64, num_vertices: usize, line: u64 },
    MalformedPolyFile { reason: &'static str, line: u64 },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImportError::Io(e) => write!(f, "{}", e),
            ImportError::Csv(e) => write!(f, "{}", e),
            ImportError::InvalidAnalysisPeriod(period) => write!(f, "analysis period must be positive -- '{}'", period),
            ImportError::DuplicateVertex(id) => write!(f, "duplicate vertex -- '{}'", id),
            ImportError::UnknownEndpoint(id) => write!(f, "edge references unknown endpoint -- '{}'", id),
            ImportError::EdgesBeforeVertices => write!(f, "edges read before all vertices were read"),
            ImportError::VerticesAlreadyFinished => write!(f, "vertex registered after vertex loading was finished"),
            ImportError::FieldParse { field, value, line } => write!(f, "could not parse {:?} as {} in line {}", value, field, line),
            ImportError::NegativeValue { field, value, line } => write!(f, "negative {} in line {} -- '{}'", field, line, value),
            ImportError::AttributeTypeMismatch(kind) => write!(f, "importer returned a value of the wrong kind for {}", kind),
            ImportError::CorruptFlowFile { reason, line } => write!(f, "flow file corrupt in line {}: {}", line, reason),
            ImportError::VertexOutOfRange { vertex, num_vertices, line } => {
                write!(f, "vertex {} in line {} out of range, network has {} vertices", vertex, line, num_vertices)
            }
            ImportError::MalformedPolyFile { reason, line } => write!(f, "malformed poly file in line {}: {}", line, reason),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ImportError::Io(e) => Some(e),
            ImportError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ImportError {
    fn from(e: io::Error) -> Self {
        ImportError::Io(e)
    }
}

impl From<csv::Error> for ImportError {
    fn from(e: csv::Error) -> Self {
        ImportError::Csv(e)
    }
}

/// Answers attribute requests for the current vertex or edge record.
pub trait AttributeSource {
    /// The value of `kind` for the current record or `None` if the format does not contain `kind`.
    fn resolve(&self, kind: AttributeKind) -> Option<AttributeValue>;

    /// The value of `kind` for the current record, or the kind's default value if the format does not contain it.
    fn value_of(&self, kind: AttributeKind) -> AttributeValue {
        self.resolve(kind).unwrap_or_else(|| kind.default_value())
    }
}

/// A source of vertex and edge records. All vertices come before all edges.
pub trait Importer: AttributeSource {
    /// Advance to the next vertex. Returns `false` once there are no more vertices,
    /// which also marks the vertex loading as finished.
    fn next_vertex(&mut self) -> Result<bool, ImportError>;
    /// Sequential id of the current vertex.
    fn vertex_id(&self) -> NodeId;
    /// Advance to the next edge. Returns `false` once there are no more edges.
    fn next_edge(&mut self) -> Result<bool, ImportError>;
    /// Tail of the current edge.
    fn edge_tail(&self) -> NodeId;
    /// Head of the current edge.
    fn edge_head(&self) -> NodeId;
}
