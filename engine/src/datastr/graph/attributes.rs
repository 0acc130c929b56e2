//! Catalog of vertex and edge attributes.
//!
//! Importers differ in which attributes their file formats contain.
//! Instead of one accessor per attribute, every importer answers requests for an
//! `AttributeKind` with an `AttributeValue`. Kinds a format does not know are answered
//! with the kind's default value from `AttributeKind::default_value`, so all importers
//! can feed the same graph building code.

use super::*;
use crate::datastr::geometry::{LatLng, Point};
use std::fmt;

/// The attributes a graph can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Planar coordinate of a vertex.
    Coordinate,
    /// Geographic coordinate of a vertex.
    LatLng,
    /// Capacity of an edge in vehicles per analysis period.
    Capacity,
    /// Free-flow speed of an edge in km/h.
    FreeFlowSpeed,
    /// Length of an edge in meters.
    Length,
    /// Free-flow travel time of an edge.
    TravelTime,
    /// Identifier of a vertex in the source data.
    VertexId,
    /// Intermediate points of an edge.
    RoadGeometry,
    /// Number of lanes of an edge.
    NumLanes,
}

impl AttributeKind {
    pub const VERTEX_ATTRIBUTES: [AttributeKind; 3] = [AttributeKind::Coordinate, AttributeKind::LatLng, AttributeKind::VertexId];
    pub const EDGE_ATTRIBUTES: [AttributeKind; 6] = [
        AttributeKind::Capacity,
        AttributeKind::FreeFlowSpeed,
        AttributeKind::Length,
        AttributeKind::TravelTime,
        AttributeKind::RoadGeometry,
        AttributeKind::NumLanes,
    ];

    /// The value of this attribute for formats which do not contain it.
    pub fn default_value(self) -> AttributeValue {
        match self {
            AttributeKind::Coordinate => AttributeValue::Coordinate(Point::default()),
            AttributeKind::LatLng => AttributeValue::LatLng(LatLng::default()),
            AttributeKind::Capacity => AttributeValue::Capacity(INFINITY),
            AttributeKind::FreeFlowSpeed => AttributeValue::FreeFlowSpeed(0),
            AttributeKind::Length => AttributeValue::Length(0),
            AttributeKind::TravelTime => AttributeValue::TravelTime(0),
            AttributeKind::VertexId => AttributeValue::VertexId(-1),
            AttributeKind::RoadGeometry => AttributeValue::RoadGeometry(Vec::new()),
            AttributeKind::NumLanes => AttributeValue::NumLanes(1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::Coordinate => "coordinate",
            AttributeKind::LatLng => "lat_lng",
            AttributeKind::Capacity => "capacity",
            AttributeKind::FreeFlowSpeed => "free_flow_speed",
            AttributeKind::Length => "length",
            AttributeKind::TravelTime => "travel_time",
            AttributeKind::VertexId => "vertex_id",
            AttributeKind::RoadGeometry => "road_geometry",
            AttributeKind::NumLanes => "num_lanes",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value of one attribute of one vertex or edge, tagged with its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Coordinate(Point),
    LatLng(LatLng),
    Capacity(Weight),
    FreeFlowSpeed(Weight),
    Length(Weight),
    TravelTime(Weight),
    VertexId(i64),
    RoadGeometry(Vec<LatLng>),
    NumLanes(Weight),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Coordinate(_) => AttributeKind::Coordinate,
            AttributeValue::LatLng(_) => AttributeKind::LatLng,
            AttributeValue::Capacity(_) => AttributeKind::Capacity,
            AttributeValue::FreeFlowSpeed(_) => AttributeKind::FreeFlowSpeed,
            AttributeValue::Length(_) => AttributeKind::Length,
            AttributeValue::TravelTime(_) => AttributeKind::TravelTime,
            AttributeValue::VertexId(_) => AttributeKind::VertexId,
            AttributeValue::RoadGeometry(_) => AttributeKind::RoadGeometry,
            AttributeValue::NumLanes(_) => AttributeKind::NumLanes,
        }
    }

    /// The numeric payload of capacity, speed, length, travel time and lane count values.
    pub fn into_weight(self) -> Option<Weight> {
        match self {
            AttributeValue::Capacity(w)
            | AttributeValue::FreeFlowSpeed(w)
            | AttributeValue::Length(w)
            | AttributeValue::TravelTime(w)
            | AttributeValue::NumLanes(w) => Some(w),
            _ => None,
        }
    }

    pub fn into_point(self) -> Option<Point> {
        match self {
            AttributeValue::Coordinate(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_lat_lng(self) -> Option<LatLng> {
        match self {
            AttributeValue::LatLng(l) => Some(l),
            _ => None,
        }
    }

    pub fn into_vertex_id(self) -> Option<i64> {
        match self {
            AttributeValue::VertexId(id) => Some(id),
            _ => None,
        }
    }

    pub fn into_road_geometry(self) -> Option<Vec<LatLng>> {
        match self {
            AttributeValue::RoadGeometry(geometry) => Some(geometry),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_tagged_with_their_kind() {
        for kind in AttributeKind::VERTEX_ATTRIBUTES.iter().chain(AttributeKind::EDGE_ATTRIBUTES.iter()) {
            assert_eq!(kind.default_value().kind(), *kind);
        }
    }

    #[test]
    fn unsupported_edge_attributes_default() {
        assert_eq!(AttributeKind::RoadGeometry.default_value().into_road_geometry(), Some(Vec::new()));
        assert_eq!(AttributeKind::NumLanes.default_value().into_weight(), Some(1));
        assert_eq!(AttributeKind::Coordinate.default_value().into_point(), Some(Point::default()));
    }

    #[test]
    fn payload_extraction_checks_the_tag() {
        assert_eq!(AttributeValue::Length(12).into_weight(), Some(12));
        assert_eq!(AttributeValue::Length(12).into_lat_lng(), None);
        assert_eq!(AttributeValue::VertexId(7).into_weight(), None);
    }
}
