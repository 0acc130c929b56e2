//! Computations on imported networks and flow patterns.

pub mod congestion;
pub mod strongly_connected_components;
