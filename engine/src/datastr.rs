//! Data structures for the network and everything drawn on top of it.

pub mod geometry;
pub mod graph;
pub mod rank_select_map;
