//! Importer for networks given as a pair of CSV files.
//!
//! Input description:
//! - `vertices.csv`: `vert_id`, `xcoord` (latitude), `ycoord` (longitude)
//! - `edges.csv`: `edge_tail`, `edge_head`, `length` in meters, `capacity` in cars per hour,
//!   `speed` the free-flow speed in km/h
//!
//! Further columns are ignored. Capacities are converted to vehicles per analysis period
//! (given in hours) and the free-flow travel time is derived as `36 * length / speed`,
//! which is tenths of a second for the units above.

use super::{id_mapper::VertexIdMapper, row_source::RowSource, *};
use crate::datastr::geometry::LatLng;
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

#[derive(Debug, Deserialize)]
struct VertexRecord {
    vert_id: i64,
    xcoord: f64,
    ycoord: f64,
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    edge_tail: i64,
    edge_head: i64,
    length: String,
    capacity: i64,
    speed: String,
}

#[derive(Debug, Default, Clone, Copy)]
struct CurrentVertex {
    orig_id: i64,
    id: NodeId,
    lat_lng: LatLng,
}

#[derive(Debug, Default, Clone, Copy)]
struct CurrentEdge {
    tail: NodeId,
    head: NodeId,
    length: Weight,
    // cars per hour, as in the file
    capacity: Weight,
    free_flow_speed: Weight,
}

/// Reads vertices and edges from two CSV sources, see the module docs for the format.
pub struct CsvImporter<V: Read, E: Read> {
    vertices: RowSource<V>,
    edges: RowSource<E>,
    analysis_period: f64,
    id_mapper: VertexIdMapper,
    current_vertex: CurrentVertex,
    current_edge: CurrentEdge,
}

impl CsvImporter<File, File> {
    /// Open `vertices.csv` and `edges.csv` in `dir`.
    pub fn open<P: AsRef<Path>>(dir: P, analysis_period: f64) -> Result<Self, ImportError> {
        let dir = dir.as_ref();
        Self::from_readers(File::open(dir.join("vertices.csv"))?, File::open(dir.join("edges.csv"))?, analysis_period)
    }
}

impl<V: Read, E: Read> CsvImporter<V, E> {
    /// `analysis_period` is in hours and has to be positive.
    pub fn from_readers(vertices: V, edges: E, analysis_period: f64) -> Result<Self, ImportError> {
        if !(analysis_period > 0.0 && analysis_period.is_finite()) {
            return Err(ImportError::InvalidAnalysisPeriod(analysis_period));
        }

        Ok(CsvImporter {
            vertices: RowSource::new(vertices)?,
            edges: RowSource::new(edges)?,
            analysis_period,
            id_mapper: VertexIdMapper::new(),
            current_vertex: CurrentVertex::default(),
            current_edge: CurrentEdge::default(),
        })
    }

    /// Capacity of the current edge in vehicles per analysis period.
    fn capacity(&self) -> Weight {
        (f64::from(self.current_edge.capacity) / self.analysis_period).round() as Weight
    }

    /// Free-flow travel time of the current edge. Edges with a free-flow speed of zero cannot be traversed.
    fn travel_time(&self) -> Weight {
        travel_time(self.current_edge.length, self.current_edge.free_flow_speed)
    }
}

/// `round(36 * length / speed)`, `INFINITY` for a speed of zero.
pub fn travel_time(length: Weight, free_flow_speed: Weight) -> Weight {
    if free_flow_speed == 0 {
        return INFINITY;
    }
    let time = (36.0 * f64::from(length) / f64::from(free_flow_speed)).round();
    if time >= f64::from(INFINITY) {
        INFINITY
    } else {
        time as Weight
    }
}

fn parse_length(text: &str, line: u64) -> Result<Weight, ImportError> {
    let length: f64 = text.parse().map_err(|_| field_parse_error("length", text, line))?;
    if !length.is_finite() {
        return Err(field_parse_error("length", text, line));
    }
    let length = length.round();
    if length < 0.0 {
        return Err(ImportError::NegativeValue { field: "length", value: length, line });
    }
    Ok(length.min(f64::from(Weight::MAX)) as Weight)
}

fn parse_speed(text: &str, line: u64) -> Result<Weight, ImportError> {
    let speed: i64 = text.parse().map_err(|_| field_parse_error("speed", text, line))?;
    non_negative_weight("speed", speed, line)
}

fn non_negative_weight(field: &'static str, value: i64, line: u64) -> Result<Weight, ImportError> {
    if value < 0 {
        return Err(ImportError::NegativeValue { field, value: value as f64, line });
    }
    Weight::try_from(value).map_err(|_| field_parse_error(field, &value.to_string(), line))
}

fn field_parse_error(field: &'static str, text: &str, line: u64) -> ImportError {
    ImportError::FieldParse {
        field,
        value: text.to_string(),
        line,
    }
}

impl<V: Read, E: Read> AttributeSource for CsvImporter<V, E> {
    fn resolve(&self, kind: AttributeKind) -> Option<AttributeValue> {
        match kind {
            AttributeKind::LatLng => Some(AttributeValue::LatLng(self.current_vertex.lat_lng)),
            AttributeKind::VertexId => Some(AttributeValue::VertexId(self.current_vertex.orig_id)),
            AttributeKind::Capacity => Some(AttributeValue::Capacity(self.capacity())),
            AttributeKind::FreeFlowSpeed => Some(AttributeValue::FreeFlowSpeed(self.current_edge.free_flow_speed)),
            AttributeKind::Length => Some(AttributeValue::Length(self.current_edge.length)),
            AttributeKind::TravelTime => Some(AttributeValue::TravelTime(self.travel_time())),
            AttributeKind::Coordinate | AttributeKind::RoadGeometry | AttributeKind::NumLanes => None,
        }
    }
}

impl<V: Read, E: Read> Importer for CsvImporter<V, E> {
    fn next_vertex(&mut self) -> Result<bool, ImportError> {
        let record: VertexRecord = match self.vertices.next_row()? {
            Some((record, _line)) => record,
            None => {
                self.id_mapper.finish_vertices();
                return Ok(false);
            }
        };

        let id = self.id_mapper.register(record.vert_id)?;
        self.current_vertex = CurrentVertex {
            orig_id: record.vert_id,
            id,
            lat_lng: LatLng::new(record.xcoord, record.ycoord),
        };
        Ok(true)
    }

    fn vertex_id(&self) -> NodeId {
        self.current_vertex.id
    }

    fn next_edge(&mut self) -> Result<bool, ImportError> {
        if !self.id_mapper.vertices_finished() {
            return Err(ImportError::EdgesBeforeVertices);
        }

        let (record, line): (EdgeRecord, u64) = match self.edges.next_row()? {
            Some(row) => row,
            None => return Ok(false),
        };

        let capacity = non_negative_weight("capacity", record.capacity, line)?;
        let free_flow_speed = parse_speed(&record.speed, line)?;
        let tail = self.id_mapper.resolve(record.edge_tail)?;
        let head = self.id_mapper.resolve(record.edge_head)?;
        let length = parse_length(&record.length, line)?;

        self.current_edge = CurrentEdge {
            tail,
            head,
            length,
            capacity,
            free_flow_speed,
        };
        Ok(true)
    }

    fn edge_tail(&self) -> NodeId {
        self.current_edge.tail
    }

    fn edge_head(&self) -> NodeId {
        self.current_edge.head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTICES: &str = "vert_id,xcoord,ycoord,name\n100,48.70,9.10,a\n7,48.71,9.11,b\n55,48.72,9.12,c\n";

    fn importer<'a>(vertices: &'a str, edges: &'a str, period: f64) -> CsvImporter<&'a [u8], &'a [u8]> {
        CsvImporter::from_readers(vertices.as_bytes(), edges.as_bytes(), period).unwrap()
    }

    fn read_all_vertices<V: Read, E: Read>(importer: &mut CsvImporter<V, E>) -> Vec<NodeId> {
        let mut ids = Vec::new();
        while importer.next_vertex().unwrap() {
            ids.push(importer.vertex_id());
        }
        ids
    }

    #[test]
    fn vertices_get_sequential_ids_in_file_order() {
        let mut importer = importer(VERTICES, "edge_tail,edge_head,length,capacity,speed\n", 1.0);
        assert!(importer.next_vertex().unwrap());
        assert_eq!(importer.vertex_id(), 0);
        assert_eq!(importer.value_of(AttributeKind::VertexId), AttributeValue::VertexId(100));
        assert_eq!(importer.value_of(AttributeKind::LatLng), AttributeValue::LatLng(LatLng::new(48.70, 9.10)));
        assert_eq!(read_all_vertices(&mut importer), vec![1, 2]);
    }

    #[test]
    fn derived_edge_attributes() {
        let edges = "edge_tail,edge_head,length,capacity,speed\n7,55,123.4,100,50\n";
        let mut importer = importer(VERTICES, edges, 2.0);
        read_all_vertices(&mut importer);
        assert!(importer.next_edge().unwrap());
        assert_eq!(importer.edge_tail(), 1);
        assert_eq!(importer.edge_head(), 2);
        assert_eq!(importer.value_of(AttributeKind::Capacity), AttributeValue::Capacity(50));
        assert_eq!(importer.value_of(AttributeKind::Length), AttributeValue::Length(123));
        assert_eq!(importer.value_of(AttributeKind::FreeFlowSpeed), AttributeValue::FreeFlowSpeed(50));
        assert_eq!(importer.value_of(AttributeKind::TravelTime), AttributeValue::TravelTime(89));
        assert!(!importer.next_edge().unwrap());
    }

    #[test]
    fn unsupported_attributes_default() {
        let edges = "edge_tail,edge_head,length,capacity,speed\n7,55,10,100,50\n";
        let mut importer = importer(VERTICES, edges, 1.0);
        read_all_vertices(&mut importer);
        importer.next_edge().unwrap();
        assert_eq!(importer.resolve(AttributeKind::NumLanes), None);
        assert_eq!(importer.value_of(AttributeKind::NumLanes), AttributeValue::NumLanes(1));
        assert_eq!(importer.value_of(AttributeKind::RoadGeometry), AttributeValue::RoadGeometry(Vec::new()));
    }

    #[test]
    fn zero_speed_means_infinite_travel_time() {
        assert_eq!(travel_time(100, 0), INFINITY);
        assert_eq!(travel_time(0, 0), INFINITY);
        assert_eq!(travel_time(0, 30), 0);
    }

    #[test]
    fn invalid_analysis_period() {
        assert!(matches!(
            CsvImporter::from_readers(VERTICES.as_bytes(), "".as_bytes(), 0.0),
            Err(ImportError::InvalidAnalysisPeriod(_))
        ));
        assert!(matches!(
            CsvImporter::from_readers(VERTICES.as_bytes(), "".as_bytes(), -1.0),
            Err(ImportError::InvalidAnalysisPeriod(_))
        ));
    }

    #[test]
    fn duplicate_vertex() {
        let mut importer = importer("vert_id,xcoord,ycoord\n1,0,0\n1,1,1\n", "edge_tail,edge_head,length,capacity,speed\n", 1.0);
        assert!(importer.next_vertex().unwrap());
        assert!(matches!(importer.next_vertex(), Err(ImportError::DuplicateVertex(1))));
    }

    #[test]
    fn unknown_endpoint() {
        let edges = "edge_tail,edge_head,length,capacity,speed\n7,8,10,100,50\n";
        let mut importer = importer(VERTICES, edges, 1.0);
        read_all_vertices(&mut importer);
        assert!(matches!(importer.next_edge(), Err(ImportError::UnknownEndpoint(8))));
    }

    #[test]
    fn edges_before_vertices_are_rejected() {
        let edges = "edge_tail,edge_head,length,capacity,speed\n7,55,10,100,50\n";
        let mut importer = importer(VERTICES, edges, 1.0);
        assert!(importer.next_vertex().unwrap());
        assert!(matches!(importer.next_edge(), Err(ImportError::EdgesBeforeVertices)));
    }

    #[test]
    fn malformed_fields() {
        let cases = [
            ("7,55,ten,100,50\n", "length"),
            ("7,55,10,100,fast\n", "speed"),
            ("7,55,10,100,50.5\n", "speed"),
            ("7,55,NaN,100,50\n", "length"),
        ];
        for (row, expected_field) in cases.iter() {
            let edges = format!("edge_tail,edge_head,length,capacity,speed\n{}", row);
            let mut importer = importer(VERTICES, &edges, 1.0);
            read_all_vertices(&mut importer);
            match importer.next_edge() {
                Err(ImportError::FieldParse { field, line, .. }) => {
                    assert_eq!(field, *expected_field);
                    assert_eq!(line, 2);
                }
                other => panic!("expected parse error for {:?}, got {:?}", row, other.map_err(|e| e.to_string())),
            }
        }
    }

    #[test]
    fn negative_values() {
        for (row, expected_field) in [("7,55,-3,100,50\n", "length"), ("7,55,10,-1,50\n", "capacity"), ("7,55,10,100,-50\n", "speed")].iter() {
            let edges = format!("edge_tail,edge_head,length,capacity,speed\n{}", row);
            let mut importer = importer(VERTICES, &edges, 1.0);
            read_all_vertices(&mut importer);
            match importer.next_edge() {
                Err(ImportError::NegativeValue { field, .. }) => assert_eq!(field, *expected_field),
                other => panic!("expected negative value error for {:?}, got {:?}", row, other.map_err(|e| e.to_string())),
            }
        }
    }
}
