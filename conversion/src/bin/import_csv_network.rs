// Convert a network given as vertices.csv and edges.csv into a binary graph directory.
// Usage: import_csv_network <csv dir> <output dir> [analysis period in hours, defaults to 1.0]

use std::{env, error::Error, fs, path::Path};

#[macro_use]
extern crate road_network_viz;
use road_network_viz::{
    cli::*,
    datastr::graph::*,
    import::{csv_source::CsvImporter, ImportError},
    io::*,
    report::*,
};

fn main() -> Result<(), Box<dyn Error>> {
    let _reporter = enable_reporting("import_csv_network");

    let mut args = env::args().skip(1);
    let arg = &args.next().ok_or(CliErr("No input directory arg given"))?;
    let input = Path::new(arg);
    let arg = &args.next().ok_or(CliErr("No output directory arg given"))?;
    let output = Path::new(arg);
    let period = parse_positive_or(args.next(), 1.0, "Invalid analysis period arg")?;
    report!("analysis_period", period);

    let graph = report_time("importing network", || -> Result<AttributedGraph, ImportError> {
        let mut importer = CsvImporter::open(input, period)?;
        AttributedGraph::import(&mut importer)
    })?;

    fs::create_dir_all(output)?;
    report_time("writing graph", || graph.deconstruct_to(&output))?;

    Ok(())
}
