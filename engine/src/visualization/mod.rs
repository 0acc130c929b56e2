//! Drawing networks, boundaries, travel demand and flow patterns.
//!
//! Drawing code talks to a `Graphic`, a canvas in projected (web mercator) coordinates.
//! `document::Document` is the implementation writing SVG, PNG and PDF files,
//! `driver` contains the drawing passes.

use crate::datastr::{geometry::Point, graph::CapacityScalingError};
use std::{error::Error, fmt, io, str::FromStr};

pub mod document;
pub mod driver;

/// An RGB color with opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Color {
        Color { red, green, blue, alpha: 255 }
    }

    pub const fn with_alpha(self, alpha: u8) -> Color {
        Color { alpha, ..self }
    }

    /// `#rrggbb`, the opacity is not included.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    pub fn opacity(&self) -> f64 {
        f64::from(self.alpha) / 255.0
    }
}

pub const KIT_BLACK: Color = Color::new(0, 0, 0);
/// 15% black
pub const KIT_BLACK_15: Color = Color::new(217, 217, 217);
pub const KIT_GREEN: Color = Color::new(0, 150, 130);

/// The 9-class sequential "Reds" scheme from ColorBrewer, light to dark.
pub const REDS_9CLASS: [Color; 9] = [
    Color::new(255, 245, 240),
    Color::new(254, 224, 210),
    Color::new(252, 187, 161),
    Color::new(252, 146, 114),
    Color::new(251, 106, 74),
    Color::new(239, 59, 44),
    Color::new(203, 24, 29),
    Color::new(165, 15, 21),
    Color::new(103, 0, 13),
];

/// Line widths in points.
pub mod line_width {
    pub const VERY_THIN: f64 = 0.1;
    pub const THIN: f64 = 0.25;
}

/// A canvas with a current color and line width.
pub trait Graphic {
    fn set_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f64);
    /// Open polyline through `points`.
    fn draw_polyline(&mut self, points: &[Point]);
    /// Closed outline through `points`, not filled.
    fn draw_polygon(&mut self, points: &[Point]);
    /// Start drawing on a new page with the same drawing area.
    fn new_page(&mut self);

    fn draw_line(&mut self, from: Point, to: Point) {
        self.draw_polyline(&[from, to]);
    }
}

/// File formats graphics can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PDF" => Ok(OutputFormat::Pdf),
            "PNG" => Ok(OutputFormat::Png),
            "SVG" => Ok(OutputFormat::Svg),
            _ => Err(RenderError::UnknownFormat(s.to_string())),
        }
    }
}

/// Everything that can go wrong while drawing and writing graphics.
#[derive(Debug)]
pub enum RenderError {
    Io(io::Error),
    UnknownFormat(String),
    InvalidPageSize { width: f64, height: f64 },
    EmptyDrawingArea,
    CapacityScaling(CapacityScalingError),
    MissingFlows { edge_id: u32, num_edges: usize },
    Rasterization(String),
    PdfConversion(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RenderError::Io(e) => write!(f, "{}", e),
            RenderError::UnknownFormat(format) => write!(f, "unrecognized file format -- '{}'", format),
            RenderError::InvalidPageSize { width, height } => write!(f, "invalid page size {}cm x {}cm", width, height),
            RenderError::EmptyDrawingArea => write!(f, "nothing to draw, the drawing area is empty"),
            RenderError::CapacityScaling(e) => write!(f, "{}", e),
            RenderError::MissingFlows { edge_id, num_edges } => {
                write!(f, "flow file has values for {} edges, but the network has edge id {}", num_edges, edge_id)
            }
            RenderError::Rasterization(msg) => write!(f, "failed to rasterize graphic: {}", msg),
            RenderError::PdfConversion(msg) => write!(f, "failed to convert graphic to PDF: {}", msg),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RenderError::Io(e) => Some(e),
            RenderError::CapacityScaling(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RenderError {
    fn from(e: io::Error) -> Self {
        RenderError::Io(e)
    }
}

impl From<CapacityScalingError> for RenderError {
    fn from(e: CapacityScalingError) -> Self {
        RenderError::CapacityScaling(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("PDF".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!("SVG".parse::<OutputFormat>().unwrap().extension(), "svg");
        assert!(matches!("JPG".parse::<OutputFormat>(), Err(RenderError::UnknownFormat(f)) if f == "JPG"));
    }

    #[test]
    fn colors() {
        assert_eq!(KIT_GREEN.hex(), "#009682");
        assert_eq!(KIT_GREEN.with_alpha(3).alpha, 3);
        assert_eq!(REDS_9CLASS[8].hex(), "#67000d");
        assert_eq!(KIT_BLACK.opacity(), 1.0);
    }
}
