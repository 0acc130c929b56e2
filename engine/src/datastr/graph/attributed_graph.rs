//! Static road network with per-vertex and per-edge attributes.
//!
//! The topology is stored as an adjacency array: `first_out` has `n+1` elements,
//! `head[first_out[x]..first_out[x+1]]` are the heads of the outgoing edges of `x`.
//! Every attribute is one vector indexed by vertex or edge index.
//! Edge indices are positions in this layout and change when subgraphs are extracted,
//! edge ids are assigned once after the import and stay with their edge.

use super::*;
use crate::{
    datastr::{
        geometry::{LatLng, Point},
        rank_select_map::{BitVec, RankSelectMap},
    },
    import::{Importer, ImportError},
    io::*,
    report::*,
};
use std::{error::Error, fmt};

/// Rescaling capacities to an analysis period failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapacityScalingError {
    /// Capacities can only be converted once.
    AlreadyScaled,
    InvalidAnalysisPeriod(f64),
}

impl fmt::Display for CapacityScalingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CapacityScalingError::AlreadyScaled => write!(f, "capacities were already scaled to the analysis period"),
            CapacityScalingError::InvalidAnalysisPeriod(period) => write!(f, "analysis period must be positive -- '{}'", period),
        }
    }
}

impl Error for CapacityScalingError {}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributedGraph {
    // index of first edge of each node +1 entry in the end
    first_out: Vec<EdgeId>,
    // the node ids to which each edge points
    head: Vec<NodeId>,

    lat_lng: Vec<LatLng>,
    vertex_id: Vec<i64>,
    coordinate: Vec<Point>,

    capacity: Vec<Weight>,
    free_flow_speed: Vec<Weight>,
    length: Vec<Weight>,
    travel_time: Vec<Weight>,
    num_lanes: Vec<Weight>,
    road_geometry: Vec<Vec<LatLng>>,
    edge_id: Vec<EdgeId>,

    capacities_scaled: bool,
}

// edge as read from the importer, before the adjacency array is built
struct ImportedEdge {
    tail: NodeId,
    head: NodeId,
    capacity: Weight,
    free_flow_speed: Weight,
    length: Weight,
    travel_time: Weight,
    num_lanes: Weight,
    road_geometry: Vec<LatLng>,
}

fn weight_of<I: Importer>(importer: &I, kind: AttributeKind) -> Result<Weight, ImportError> {
    importer.value_of(kind).into_weight().ok_or(ImportError::AttributeTypeMismatch(kind))
}

impl AttributedGraph {
    /// Build the graph from all vertex and edge records of `importer`.
    ///
    /// Edges are grouped by tail, edges with the same tail keep the order in which they were read.
    /// Edge ids are assigned sequentially in the resulting edge order.
    pub fn import<I: Importer>(importer: &mut I) -> Result<AttributedGraph, ImportError> {
        let mut lat_lng = Vec::new();
        let mut vertex_id = Vec::new();
        let mut coordinate = Vec::new();

        while importer.next_vertex()? {
            debug_assert_eq!(importer.vertex_id() as usize, lat_lng.len());
            lat_lng.push(
                importer
                    .value_of(AttributeKind::LatLng)
                    .into_lat_lng()
                    .ok_or(ImportError::AttributeTypeMismatch(AttributeKind::LatLng))?,
            );
            vertex_id.push(
                importer
                    .value_of(AttributeKind::VertexId)
                    .into_vertex_id()
                    .ok_or(ImportError::AttributeTypeMismatch(AttributeKind::VertexId))?,
            );
            coordinate.push(
                importer
                    .value_of(AttributeKind::Coordinate)
                    .into_point()
                    .ok_or(ImportError::AttributeTypeMismatch(AttributeKind::Coordinate))?,
            );
        }

        let mut edges = Vec::new();
        while importer.next_edge()? {
            edges.push(ImportedEdge {
                tail: importer.edge_tail(),
                head: importer.edge_head(),
                capacity: weight_of(importer, AttributeKind::Capacity)?,
                free_flow_speed: weight_of(importer, AttributeKind::FreeFlowSpeed)?,
                length: weight_of(importer, AttributeKind::Length)?,
                travel_time: weight_of(importer, AttributeKind::TravelTime)?,
                num_lanes: weight_of(importer, AttributeKind::NumLanes)?,
                road_geometry: importer
                    .value_of(AttributeKind::RoadGeometry)
                    .into_road_geometry()
                    .ok_or(ImportError::AttributeTypeMismatch(AttributeKind::RoadGeometry))?,
            });
        }

        // stable, edges of the same tail stay in file order
        edges.sort_by_key(|edge| edge.tail);

        let mut degrees = vec![0; lat_lng.len()];
        for edge in &edges {
            degrees[edge.tail as usize] += 1;
        }
        let first_out = degrees_to_first_out(degrees.into_iter()).collect();

        let mut graph = AttributedGraph {
            first_out,
            head: Vec::with_capacity(edges.len()),
            lat_lng,
            vertex_id,
            coordinate,
            capacity: Vec::with_capacity(edges.len()),
            free_flow_speed: Vec::with_capacity(edges.len()),
            length: Vec::with_capacity(edges.len()),
            travel_time: Vec::with_capacity(edges.len()),
            num_lanes: Vec::with_capacity(edges.len()),
            road_geometry: Vec::with_capacity(edges.len()),
            edge_id: (0..edges.len() as EdgeId).collect(),
            capacities_scaled: false,
        };

        for edge in edges {
            graph.head.push(edge.head);
            graph.capacity.push(edge.capacity);
            graph.free_flow_speed.push(edge.free_flow_speed);
            graph.length.push(edge.length);
            graph.travel_time.push(edge.travel_time);
            graph.num_lanes.push(edge.num_lanes);
            graph.road_geometry.push(edge.road_geometry);
        }

        report!("graph", { "num_nodes": graph.num_nodes(), "num_arcs": graph.num_arcs() });

        Ok(graph)
    }

    pub fn first_out(&self) -> &[EdgeId] {
        &self.first_out
    }

    pub fn head(&self) -> &[NodeId] {
        &self.head
    }

    pub fn lat_lng(&self) -> &[LatLng] {
        &self.lat_lng
    }

    /// Ids of the vertices in the source data.
    pub fn vertex_id(&self) -> &[i64] {
        &self.vertex_id
    }

    /// Projected coordinates, all zero until `project_coordinates` was called.
    pub fn coordinate(&self) -> &[Point] {
        &self.coordinate
    }

    pub fn capacity(&self) -> &[Weight] {
        &self.capacity
    }

    pub fn free_flow_speed(&self) -> &[Weight] {
        &self.free_flow_speed
    }

    pub fn length(&self) -> &[Weight] {
        &self.length
    }

    pub fn travel_time(&self) -> &[Weight] {
        &self.travel_time
    }

    pub fn num_lanes(&self) -> &[Weight] {
        &self.num_lanes
    }

    pub fn road_geometry(&self) -> &[Vec<LatLng>] {
        &self.road_geometry
    }

    pub fn edge_id(&self) -> &[EdgeId] {
        &self.edge_id
    }

    pub fn capacities_scaled(&self) -> bool {
        self.capacities_scaled
    }

    /// All edges as `(tail, edge index)` pairs in adjacency array order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, EdgeId)> + '_ {
        (0..self.num_nodes() as NodeId).flat_map(move |tail| self.neighbor_edge_indices(tail).map(move |edge| (tail, edge)))
    }

    /// Set the projected coordinate of every vertex to the web mercator projection of its geographic coordinate.
    pub fn project_coordinates(&mut self) {
        for (coordinate, lat_lng) in self.coordinate.iter_mut().zip(self.lat_lng.iter()) {
            *coordinate = lat_lng.web_mercator_projection();
        }
    }

    /// Convert capacities in vehicles per hour into vehicles per analysis period of `period` hours.
    /// Every capacity is at least one afterwards. Can only be done once per graph.
    pub fn scale_capacities(&mut self, period: f64) -> Result<(), CapacityScalingError> {
        if self.capacities_scaled {
            return Err(CapacityScalingError::AlreadyScaled);
        }
        if !(period > 0.0 && period.is_finite()) {
            return Err(CapacityScalingError::InvalidAnalysisPeriod(period));
        }
        for capacity in &mut self.capacity {
            *capacity = (period * f64::from(*capacity)).round().clamp(1.0, f64::from(INFINITY)) as Weight;
        }
        self.capacities_scaled = true;
        Ok(())
    }

    /// The subgraph induced by the vertices whose bit is set in `keep`.
    /// Vertices are renumbered in order, edges keep their ids and their relative order.
    pub fn extract_vertex_induced_subgraph(&self, keep: &BitVec) -> AttributedGraph {
        assert_eq!(keep.len(), self.num_nodes());
        let new_ids = RankSelectMap::new(keep.clone());

        let mut sub = AttributedGraph {
            first_out: Vec::with_capacity(new_ids.len() + 1),
            head: Vec::new(),
            lat_lng: Vec::with_capacity(new_ids.len()),
            vertex_id: Vec::with_capacity(new_ids.len()),
            coordinate: Vec::with_capacity(new_ids.len()),
            capacity: Vec::new(),
            free_flow_speed: Vec::new(),
            length: Vec::new(),
            travel_time: Vec::new(),
            num_lanes: Vec::new(),
            road_geometry: Vec::new(),
            edge_id: Vec::new(),
            capacities_scaled: self.capacities_scaled,
        };
        sub.first_out.push(0);

        for node in (0..self.num_nodes()).filter(|&node| keep.get(node)) {
            sub.lat_lng.push(self.lat_lng[node]);
            sub.vertex_id.push(self.vertex_id[node]);
            sub.coordinate.push(self.coordinate[node]);

            for edge in self.neighbor_edge_indices_usize(node as NodeId) {
                if let Some(head) = new_ids.get(self.head[edge] as usize) {
                    sub.head.push(head as NodeId);
                    sub.capacity.push(self.capacity[edge]);
                    sub.free_flow_speed.push(self.free_flow_speed[edge]);
                    sub.length.push(self.length[edge]);
                    sub.travel_time.push(self.travel_time[edge]);
                    sub.num_lanes.push(self.num_lanes[edge]);
                    sub.road_geometry.push(self.road_geometry[edge].clone());
                    sub.edge_id.push(self.edge_id[edge]);
                }
            }
            sub.first_out.push(sub.head.len() as EdgeId);
        }

        sub
    }
}

impl Graph for AttributedGraph {
    fn num_nodes(&self) -> usize {
        self.first_out.len() - 1
    }

    fn num_arcs(&self) -> usize {
        self.head.len()
    }

    fn degree(&self, node: NodeId) -> usize {
        let node = node as usize;
        (self.first_out[node + 1] - self.first_out[node]) as usize
    }
}

impl EdgeRangeGraph for AttributedGraph {
    fn neighbor_edge_indices(&self, node: NodeId) -> std::ops::Range<EdgeId> {
        let node = node as usize;
        self.first_out[node]..self.first_out[node + 1]
    }
}

impl<'a> LinkIterable<'a, NodeId> for AttributedGraph {
    type Iter = std::iter::Cloned<std::slice::Iter<'a, NodeId>>;

    #[inline]
    fn link_iter(&'a self, node: NodeId) -> Self::Iter {
        self.head[self.neighbor_edge_indices_usize(node)].iter().cloned()
    }
}

impl Deconstruct for AttributedGraph {
    fn store_each(&self, store: &dyn Fn(&str, &dyn Store) -> std::io::Result<()>) -> std::io::Result<()> {
        store("first_out", &self.first_out)?;
        store("head", &self.head)?;
        store("latitude", &self.lat_lng.iter().map(LatLng::lat).collect::<Vec<f64>>())?;
        store("longitude", &self.lat_lng.iter().map(LatLng::lng).collect::<Vec<f64>>())?;
        store("vertex_id", &self.vertex_id)?;
        store("capacity", &self.capacity)?;
        store("free_flow_speed", &self.free_flow_speed)?;
        store("length", &self.length)?;
        store("travel_time", &self.travel_time)?;
        store("num_lanes", &self.num_lanes)?;

        let geometry_first_out: Vec<EdgeId> = degrees_to_first_out(self.road_geometry.iter().map(|points| points.len() as EdgeId)).collect();
        store("geometry_first_out", &geometry_first_out)?;
        store(
            "geometry_latitude",
            &self.road_geometry.iter().flatten().map(LatLng::lat).collect::<Vec<f64>>(),
        )?;
        store(
            "geometry_longitude",
            &self.road_geometry.iter().flatten().map(LatLng::lng).collect::<Vec<f64>>(),
        )?;
        Ok(())
    }
}

fn invalid_data(msg: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg)
}

fn check_len(name: &str, len: usize, expected: usize) -> std::io::Result<()> {
    if len != expected {
        return Err(invalid_data(format!("{} has {} elements, expected {}", name, len, expected)));
    }
    Ok(())
}

impl Reconstruct for AttributedGraph {
    fn reconstruct_with(loader: Loader) -> std::io::Result<Self> {
        let first_out: Vec<EdgeId> = loader.load("first_out")?;
        let head: Vec<NodeId> = loader.load("head")?;

        if first_out.first() != Some(&0) || first_out.last().map(|&m| m as usize) != Some(head.len()) || first_out.windows(2).any(|w| w[0] > w[1]) {
            return Err(invalid_data("first_out is not a valid adjacency array index".to_string()));
        }
        let n = first_out.len() - 1;
        let m = head.len();
        if head.iter().any(|&h| h as usize >= n) {
            return Err(invalid_data("head references a vertex out of range".to_string()));
        }

        let latitude: Vec<f64> = loader.load("latitude")?;
        let longitude: Vec<f64> = loader.load("longitude")?;
        let vertex_id: Vec<i64> = loader.load("vertex_id")?;
        check_len("latitude", latitude.len(), n)?;
        check_len("longitude", longitude.len(), n)?;
        check_len("vertex_id", vertex_id.len(), n)?;

        let capacity: Vec<Weight> = loader.load("capacity")?;
        let free_flow_speed: Vec<Weight> = loader.load("free_flow_speed")?;
        let length: Vec<Weight> = loader.load("length")?;
        let travel_time: Vec<Weight> = loader.load("travel_time")?;
        let num_lanes: Vec<Weight> = loader.load("num_lanes")?;
        check_len("capacity", capacity.len(), m)?;
        check_len("free_flow_speed", free_flow_speed.len(), m)?;
        check_len("length", length.len(), m)?;
        check_len("travel_time", travel_time.len(), m)?;
        check_len("num_lanes", num_lanes.len(), m)?;

        let geometry_first_out: Vec<EdgeId> = loader.load("geometry_first_out")?;
        let geometry_latitude: Vec<f64> = loader.load("geometry_latitude")?;
        let geometry_longitude: Vec<f64> = loader.load("geometry_longitude")?;
        check_len("geometry_first_out", geometry_first_out.len(), m + 1)?;
        check_len("geometry_longitude", geometry_longitude.len(), geometry_latitude.len())?;
        if geometry_first_out.windows(2).any(|w| w[0] > w[1]) || geometry_first_out.last().map(|&k| k as usize) != Some(geometry_latitude.len()) {
            return Err(invalid_data("geometry_first_out is not a valid index".to_string()));
        }

        let road_geometry = geometry_first_out
            .windows(2)
            .map(|w| {
                (w[0] as usize..w[1] as usize)
                    .map(|i| LatLng::new(geometry_latitude[i], geometry_longitude[i]))
                    .collect()
            })
            .collect();

        let graph = AttributedGraph {
            first_out,
            head,
            lat_lng: latitude.into_iter().zip(longitude).map(|(lat, lng)| LatLng::new(lat, lng)).collect(),
            vertex_id,
            coordinate: vec![Point::default(); n],
            capacity,
            free_flow_speed,
            length,
            travel_time,
            num_lanes,
            road_geometry,
            edge_id: (0..m as EdgeId).collect(),
            capacities_scaled: false,
        };

        report!("graph", { "num_nodes": graph.num_nodes(), "num_arcs": graph.num_arcs() });

        Ok(graph)
    }
}
