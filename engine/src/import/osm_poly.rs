//! Areas in the OSM POLY format.
//!
//! The first line is the name of the area. It is followed by any number of sections,
//! each starting with a name line (prefixed with `!` for holes), one `lon lat` pair per line
//! and a closing `END` line. The file ends with another `END` line.

use super::ImportError;
use crate::datastr::geometry::{LatLng, Point, Rectangle};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

/// One ring of an area, points are `(lon, lat)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub name: String,
    pub hole: bool,
    pub points: Vec<Point>,
}

impl Face {
    /// The corners of the face as geographic coordinates.
    pub fn lat_lngs(&self) -> impl Iterator<Item = LatLng> + '_ {
        self.points.iter().map(|p| LatLng::new(p.y, p.x))
    }
}

/// A possibly disconnected area with holes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Area {
    pub name: String,
    pub faces: Vec<Face>,
}

fn malformed(reason: &'static str, line: u64) -> ImportError {
    ImportError::MalformedPolyFile { reason, line }
}

impl Area {
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Area, ImportError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Area, ImportError> {
        let mut lines = BufReader::new(reader).lines().zip(1u64..).filter_map(|(line, number)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(Ok((line.trim().to_string(), number))),
            Err(e) => Some(Err(e)),
        });

        let name = match lines.next() {
            Some(line) => line?.0,
            None => return Err(malformed("missing area name", 1)),
        };
        let mut area = Area { name, faces: Vec::new() };
        let mut last_line = 1;

        loop {
            let (section, number) = match lines.next() {
                Some(line) => line?,
                None => return Err(malformed("missing END of file", last_line)),
            };
            last_line = number;
            if section == "END" {
                break;
            }

            let (hole, name) = match section.strip_prefix('!') {
                Some(name) => (true, name.to_string()),
                None => (false, section),
            };
            let mut face = Face { name, hole, points: Vec::new() };

            loop {
                let (line, number) = match lines.next() {
                    Some(line) => line?,
                    None => return Err(malformed("missing END of section", last_line)),
                };
                last_line = number;
                if line == "END" {
                    break;
                }
                let mut coordinates = line.split_whitespace().map(str::parse::<f64>);
                match (coordinates.next(), coordinates.next(), coordinates.next()) {
                    (Some(Ok(lon)), Some(Ok(lat)), None) => face.points.push(Point::new(lon, lat)),
                    _ => return Err(malformed("expected a longitude and a latitude", number)),
                }
            }

            if face.points.is_empty() {
                return Err(malformed("section without points", last_line));
            }
            area.faces.push(face);
        }

        Ok(area)
    }

    /// Bounding box in `(lon, lat)`.
    pub fn bounding_box(&self) -> Rectangle {
        self.faces.iter().flat_map(|face| face.points.iter().copied()).collect()
    }

    /// Bounding box of the web mercator projection of the area.
    pub fn projected_bounding_box(&self) -> Rectangle {
        let bounds = self.bounding_box();
        if bounds.is_empty() {
            return bounds;
        }
        let south_west = bounds.south_west();
        let north_east = bounds.north_east();
        vec![
            LatLng::new(south_west.y, south_west.x).web_mercator_projection(),
            LatLng::new(north_east.y, north_east.x).web_mercator_projection(),
        ]
        .into_iter()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUTTGART: &str = "stuttgart\n\
                             outer\n\
                             \t9.0   48.6\n\
                             \t9.4   48.6\n\
                             \t9.4   48.9\n\
                             \t9.0   48.9\n\
                             END\n\
                             !inner\n\
                             \t9.1   48.7\n\
                             \t9.2   48.7\n\
                             \t9.2   48.8\n\
                             END\n\
                             END\n";

    #[test]
    fn faces_and_holes() {
        let area = Area::from_reader(STUTTGART.as_bytes()).unwrap();
        assert_eq!(area.name, "stuttgart");
        assert_eq!(area.faces.len(), 2);
        assert!(!area.faces[0].hole);
        assert!(area.faces[1].hole);
        assert_eq!(area.faces[1].name, "inner");
        assert_eq!(area.faces[0].points[1], Point::new(9.4, 48.6));
        assert_eq!(area.faces[1].lat_lngs().next(), Some(LatLng::new(48.7, 9.1)));
    }

    #[test]
    fn bounding_box() {
        let area = Area::from_reader(STUTTGART.as_bytes()).unwrap();
        let bounds = area.bounding_box();
        assert_eq!(bounds.south_west(), Point::new(9.0, 48.6));
        assert_eq!(bounds.north_east(), Point::new(9.4, 48.9));

        let projected = area.projected_bounding_box();
        assert_eq!(projected.south_west(), LatLng::new(48.6, 9.0).web_mercator_projection());
    }

    #[test]
    fn malformed_files() {
        for text in ["", "name\nouter\n9.0 48.6\nEND\n", "name\nouter\n9.0 48.6\n", "name\nouter\n9.0\nEND\nEND\n", "name\nouter\nEND\nEND\n"].iter() {
            assert!(
                matches!(Area::from_reader(text.as_bytes()), Err(ImportError::MalformedPolyFile { .. })),
                "accepted {:?}",
                text
            );
        }
    }
}
