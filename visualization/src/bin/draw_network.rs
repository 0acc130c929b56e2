// Visualizes networks, flow patterns throughout networks and travel demand data.

use getopts::Options;
use std::{env, error::Error, path::Path, process};

#[macro_use]
extern crate road_network_viz;
use road_network_viz::{
    cleanup,
    cli::*,
    datastr::graph::*,
    import::{csv_source::CsvImporter, flow::FlowPatterns, od_pairs::read_od_pairs, osm_poly::Area},
    io::*,
    report::*,
    visualization::{document::Document, driver::*, OutputFormat},
};

fn options() -> Options {
    let mut opts = Options::new();
    opts.long_only(true);
    opts.optflag("", "stuttgart", "remove outliers in the network of Stuttgart");
    opts.optflag("i", "", "draw all intermediate flow patterns");
    opts.optopt("p", "", "analysis period in hours (defaults to 1.0)", "<hrs>");
    opts.optopt("w", "", "width in centimeters of the graphic (defaults to 14.0)", "<cm>");
    opts.optopt("h", "", "height in centimeters of the graphic (defaults to 14.0)", "<cm>");
    opts.optopt("", "fmt", "file format of the graphic, possible values: PDF PNG (default) SVG", "<fmt>");
    opts.optopt("c", "", "clip the graphic to the specified OSM POLY file", "<file>");
    opts.optopt("g", "", "draw the network in <dir>, CSV files or a binary graph directory", "<dir>");
    opts.optopt("b", "", "draw the boundaries in the specified OSM POLY file", "<file>");
    opts.optopt("d", "", "draw the travel demand in <file>", "<file>");
    opts.optopt("f", "", "draw the flow patterns in <file>", "<file>");
    opts.optopt("o", "", "place output in <file>", "<file>");
    opts.optflag("", "help", "display this help and exit");
    opts
}

fn usage(program: &str, opts: &Options) -> String {
    let brief = format!(
        "Usage: {0} [-c <file>] -o <file> -g <dir>\n       \
         {0} [-c <file>] -o <file> -g <dir> -b <file>\n       \
         {0} [-c <file>] -o <file> -g <dir> -b <file> -d <file>\n       \
         {0} [-c <file>] -o <file> -g <dir> -f <file>\n\
         Visualizes networks, flow patterns throughout networks and travel demand data.",
        program
    );
    opts.usage(&brief)
}

#[derive(Debug, Clone, PartialEq)]
struct Settings {
    stuttgart: bool,
    draw_intermediates: bool,
    period: f64,
    width: f64,
    height: f64,
    format: OutputFormat,
    graph_dir: String,
    output: String,
    clip: Option<String>,
    boundaries: Option<String>,
    demand: Option<String>,
    flows: Option<String>,
}

/// `Ok(None)` if help was requested.
fn parse_args(opts: &Options, args: &[String]) -> Result<Option<Settings>, Box<dyn Error>> {
    let matches = opts.parse(args)?;
    if matches.opt_present("help") {
        return Ok(None);
    }

    let graph_dir = matches.opt_str("g").ok_or(CliErr("a network (-g) is required"))?;
    let output = matches.opt_str("o").ok_or(CliErr("an output file (-o) is required"))?;

    Ok(Some(Settings {
        stuttgart: matches.opt_present("stuttgart"),
        draw_intermediates: matches.opt_present("i"),
        period: parse_positive_or(matches.opt_str("p"), 1.0, "analysis period must be a positive number")?,
        width: parse_positive_or(matches.opt_str("w"), 14.0, "width must be a positive number")?,
        height: parse_positive_or(matches.opt_str("h"), 14.0, "height must be a positive number")?,
        format: matches.opt_str("fmt").as_deref().unwrap_or("PNG").parse()?,
        graph_dir,
        output,
        clip: matches.opt_str("c"),
        boundaries: matches.opt_str("b"),
        demand: matches.opt_str("d"),
        flows: matches.opt_str("f"),
    }))
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "draw_network".to_string());
    let opts = options();

    let settings = match parse_args(&opts, args.get(1..).unwrap_or_default()) {
        Ok(Some(settings)) => settings,
        Ok(None) => {
            print!("{}", usage(&program, &opts));
            return;
        }
        Err(e) => {
            eprintln!("{}: {}", program, e);
            eprint!("{}", usage(&program, &opts));
            process::exit(1);
        }
    };

    if let Err(e) = run(&settings) {
        eprintln!("{}: {}", program, e);
        eprintln!("Try '{} -help' for more information.", program);
        process::exit(1);
    }
}

fn read_network(dir: &Path) -> Result<AttributedGraph, Box<dyn Error>> {
    if dir.join("vertices.csv").exists() {
        // capacities stay in vehicles per hour, they are converted when drawing flow patterns
        let mut importer = CsvImporter::open(dir, 1.0)?;
        Ok(AttributedGraph::import(&mut importer)?)
    } else {
        Ok(AttributedGraph::reconstruct_from(&dir)?)
    }
}

fn run(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let _reporting = enable_reporting("draw_network");

    let mut graph = report_time("reading network", || read_network(Path::new(&settings.graph_dir)))?;
    graph.project_coordinates();
    // flows and OD pairs refer to the network before any cleanup
    let num_edge_ids = graph.num_arcs();
    let orig_coordinates = graph.coordinate().to_vec();

    if settings.stuttgart {
        graph = report_time("removing outliers", || cleanup::remove_stuttgart_outliers(&graph))?;
    }

    let clip = settings.clip.as_ref().map(Area::read_from).transpose()?;
    let mut document = Document::new(
        &settings.output,
        settings.format,
        settings.width,
        settings.height,
        drawing_area(&graph, clip.as_ref()),
    )?;

    match &settings.flows {
        None => {
            let boundaries = settings.boundaries.as_ref().map(Area::read_from).transpose()?;
            let od_pairs = settings
                .demand
                .as_ref()
                .map(|path| read_od_pairs(path, orig_coordinates.len()))
                .transpose()?;
            let overlays = Overlays {
                boundaries: boundaries.as_ref(),
                demand: od_pairs.as_deref().map(|od_pairs| (od_pairs, &orig_coordinates[..])),
            };
            draw_network(&mut document, &graph, &overlays);
        }
        Some(flow_file) => {
            let flows = report_time("reading flow patterns", || FlowPatterns::read_from(flow_file, num_edge_ids))?;
            report!("num_iterations", flows.num_iterations());
            draw_flow_patterns(&mut document, &mut graph, &flows, settings.period, settings.draw_intermediates)?;
        }
    }

    let written = report_time("writing graphic", || document.finish())?;
    report!("output_files", written.iter().map(|path| path.display().to_string()).collect::<Vec<String>>());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Settings>, Box<dyn Error>> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        parse_args(&options(), &args)
    }

    #[test]
    fn defaults() {
        let settings = parse(&["-g", "net", "-o", "out.png"]).unwrap().unwrap();
        assert_eq!(settings.format, OutputFormat::Png);
        assert_eq!((settings.width, settings.height, settings.period), (14.0, 14.0, 1.0));
        assert!(!settings.stuttgart && !settings.draw_intermediates);
        assert_eq!(settings.flows, None);
    }

    #[test]
    fn long_only_options() {
        let settings = parse(&["-stuttgart", "-i", "-fmt", "PDF", "-p", "0.5", "-g", "net", "-o", "out.pdf", "-f", "flows.csv"])
            .unwrap()
            .unwrap();
        assert!(settings.stuttgart && settings.draw_intermediates);
        assert_eq!(settings.format, OutputFormat::Pdf);
        assert_eq!(settings.period, 0.5);
        assert_eq!(settings.flows.as_deref(), Some("flows.csv"));
    }

    #[test]
    fn help_wins() {
        assert_eq!(parse(&["-help"]).unwrap(), None);
    }

    #[test]
    fn network_and_output_are_required() {
        assert!(parse(&["-o", "out.png"]).unwrap_err().to_string().contains("-g"));
        assert!(parse(&["-g", "net"]).unwrap_err().to_string().contains("-o"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = parse(&["-g", "net", "-o", "out.jpg", "-fmt", "JPG"]).unwrap_err();
        assert!(err.to_string().contains("JPG"));
        assert!(parse(&["-g", "net", "-o", "out.png", "-fmt", "png"]).is_err());
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(parse(&["-g", "net", "-o", "out.png", "-w", "wide"]).is_err());
        assert!(parse(&["-g", "net", "-o", "out.png", "-p", "0"]).is_err());
        assert!(parse(&["-g", "net", "-o", "out.png", "-x"]).is_err());
    }
}
