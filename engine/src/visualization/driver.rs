//! Drawing passes over networks and flow patterns.

use super::*;
use crate::{
    algo::congestion::{CongestionLevels, NUM_CONGESTION_LEVELS},
    datastr::{geometry::Rectangle, graph::*},
    import::{flow::FlowPatterns, od_pairs::OriginDestination, osm_poly::Area},
    report::*,
};

// the lightest entries of the palette would vanish on a white page
const FIRST_CONGESTION_COLOR: usize = REDS_9CLASS.len() - NUM_CONGESTION_LEVELS;

/// Color of congestion level `level`.
pub fn congestion_color(level: usize) -> Color {
    REDS_9CLASS[FIRST_CONGESTION_COLOR + level]
}

/// The rectangle to draw: the bounding box of the clip area if there is one,
/// of all projected vertices otherwise.
pub fn drawing_area(graph: &AttributedGraph, clip: Option<&Area>) -> Rectangle {
    match clip {
        Some(area) => area.projected_bounding_box(),
        None => graph.coordinate().iter().copied().collect(),
    }
}

/// Draw edge `edge` with tail `tail` as the polyline from tail through its road geometry to its head.
/// The line gets wider with the number of lanes.
pub fn draw_edge<G: Graphic>(graphic: &mut G, graph: &AttributedGraph, width: f64, tail: NodeId, edge: EdgeId) {
    let edge = edge as usize;
    graphic.set_line_width(f64::from(graph.num_lanes()[edge]) * width);

    let geometry = &graph.road_geometry()[edge];
    let mut points = Vec::with_capacity(geometry.len() + 2);
    points.push(graph.coordinate()[tail as usize]);
    points.extend(geometry.iter().map(|lat_lng| lat_lng.web_mercator_projection()));
    points.push(graph.coordinate()[graph.head()[edge] as usize]);
    graphic.draw_polyline(&points);
}

/// Things to draw on top of the network.
#[derive(Debug, Default)]
pub struct Overlays<'a> {
    pub boundaries: Option<&'a Area>,
    /// OD pairs and the projected coordinates of the network they refer to.
    pub demand: Option<(&'a [OriginDestination], &'a [Point])>,
}

impl Overlays<'_> {
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_none() && self.demand.is_none()
    }
}

/// Draw every edge of the network, very thin. With overlays, the network is drawn in light gray
/// and the overlays on top of it.
pub fn draw_network<G: Graphic>(graphic: &mut G, graph: &AttributedGraph, overlays: &Overlays) {
    graphic.set_color(if overlays.is_empty() { KIT_BLACK } else { KIT_BLACK_15 });
    report_time("drawing network", || {
        for (tail, edge) in graph.edges() {
            draw_edge(graphic, graph, line_width::VERY_THIN, tail, edge);
        }
    });

    if let Some(area) = overlays.boundaries {
        report_time("drawing boundaries", || draw_boundaries(graphic, area));
    }
    if let Some((od_pairs, coordinates)) = overlays.demand {
        report_time("drawing travel demand", || draw_demand(graphic, od_pairs, coordinates));
    }
}

/// Draw every face of `area` as a black outline, holes included.
pub fn draw_boundaries<G: Graphic>(graphic: &mut G, area: &Area) {
    graphic.set_color(KIT_BLACK);
    graphic.set_line_width(line_width::THIN);
    for face in &area.faces {
        let polygon: Vec<Point> = face.lat_lngs().map(|lat_lng| lat_lng.web_mercator_projection()).collect();
        graphic.draw_polygon(&polygon);
    }
}

/// Draw every OD pair as a straight, almost transparent line.
/// `coordinates` are indexed by the vertex ids the OD pairs use.
pub fn draw_demand<G: Graphic>(graphic: &mut G, od_pairs: &[OriginDestination], coordinates: &[Point]) {
    graphic.set_color(KIT_GREEN.with_alpha(3));
    graphic.set_line_width(line_width::THIN);
    for od_pair in od_pairs {
        graphic.draw_line(coordinates[od_pair.origin as usize], coordinates[od_pair.destination as usize]);
    }
}

/// The iterations to draw: the first and the last, everything in between only if requested.
pub fn retained_iterations(num_iterations: usize, draw_intermediates: bool) -> impl Iterator<Item = usize> {
    (1..=num_iterations).filter(move |&i| draw_intermediates || i == 1 || i == num_iterations)
}

/// Draw the flow pattern after each retained iteration on a page of its own,
/// each edge colored by its congestion level, more congested edges on top.
///
/// Capacities are converted from vehicles per hour to vehicles per analysis period of `period` hours first,
/// which fails if they were already converted. Returns the iterations drawn.
pub fn draw_flow_patterns<G: Graphic>(
    graphic: &mut G,
    graph: &mut AttributedGraph,
    flows: &FlowPatterns,
    period: f64,
    draw_intermediates: bool,
) -> Result<Vec<usize>, RenderError> {
    if let Some(&edge_id) = graph.edge_id().iter().max() {
        if edge_id as usize >= flows.num_edges() {
            return Err(RenderError::MissingFlows {
                edge_id,
                num_edges: flows.num_edges(),
            });
        }
    }
    graph.scale_capacities(period)?;
    let graph = &*graph;

    let mut levels = CongestionLevels::new();
    let mut drawn = Vec::new();
    let mut passes = push_collection_context("passes".to_string());

    for iteration in retained_iterations(flows.num_iterations(), draw_intermediates) {
        let _pass = passes.push_collection_item();
        report!("iteration", iteration);

        report_time(&format!("drawing flow pattern after iteration {}", iteration), || {
            if !drawn.is_empty() {
                graphic.new_page();
            }
            levels.classify(graph, flows.iteration(iteration));
            for (level, edges) in levels.iter().enumerate() {
                graphic.set_color(congestion_color(level));
                for &(tail, edge) in edges {
                    draw_edge(graphic, graph, line_width::THIN, tail, edge);
                }
            }
        });

        report!("edges_per_congestion_level", levels.counts().to_vec());
        drawn.push(iteration);
    }

    Ok(drawn)
}
