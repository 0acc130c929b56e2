//! Import of attributed road networks and rendering of congestion patterns.
//!
//! Networks are read from CSV sources into an `AttributedGraph` (see `import` and `datastr::graph`),
//! flow patterns produced by an external traffic assignment are read through `import::flow`
//! and drawn iteration by iteration, color coded by congestion level (see `visualization`).

#[macro_use]
pub mod report;

pub mod algo;
pub mod cleanup;
pub mod cli;
pub mod datastr;
pub mod import;
pub mod io;
pub mod visualization;

#[allow(dead_code)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
