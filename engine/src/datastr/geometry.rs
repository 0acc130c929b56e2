//! Geographic and planar coordinates.

use std::f64::consts::PI;

/// The earth's mean radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

// web mercator is undefined at the poles, latitudes are clamped to the square map
const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

/// A point in the plane, e.g. a projected coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatLng {
    lat: f64,
    lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> LatLng {
        LatLng { lat, lng }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Spherical web mercator projection, x grows eastwards and y northwards, both in meters at the equator.
    pub fn web_mercator_projection(&self) -> Point {
        let lat = self.lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE).to_radians();
        let x = EARTH_RADIUS * self.lng.to_radians();
        let y = EARTH_RADIUS * (PI / 4.0 + lat / 2.0).tan().ln();
        Point::new(x, y)
    }
}

/// An axis aligned rectangle. Starts out empty and grows through `extend`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    min: Point,
    max: Point,
}

impl Default for Rectangle {
    fn default() -> Self {
        Rectangle {
            min: Point::new(f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }
}

impl Rectangle {
    pub fn new() -> Rectangle {
        Self::default()
    }

    pub fn extend(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Lower left corner
    pub fn south_west(&self) -> Point {
        self.min
    }

    /// Upper right corner
    pub fn north_east(&self) -> Point {
        self.max
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

impl FromIterator<Point> for Rectangle {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut rect = Rectangle::new();
        for p in iter {
            rect.extend(p);
        }
        rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_origin() {
        let p = LatLng::new(0.0, 0.0).web_mercator_projection();
        assert!(p.x.abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn projection_preserves_orientation() {
        let south_west = LatLng::new(48.7, 9.1).web_mercator_projection();
        let north_east = LatLng::new(48.8, 9.2).web_mercator_projection();
        assert!(south_west.x < north_east.x);
        assert!(south_west.y < north_east.y);
    }

    #[test]
    fn poles_are_clamped() {
        assert!(LatLng::new(90.0, 0.0).web_mercator_projection().y.is_finite());
    }

    #[test]
    fn rectangle_bounds() {
        let rect: Rectangle = vec![Point::new(1.0, 5.0), Point::new(-2.0, 3.0), Point::new(0.0, 7.0)].into_iter().collect();
        assert!(!rect.is_empty());
        assert_eq!(rect.south_west(), Point::new(-2.0, 3.0));
        assert_eq!(rect.north_east(), Point::new(1.0, 7.0));
        assert_eq!(rect.width(), 3.0);
        assert!(Rectangle::new().is_empty());
    }
}
