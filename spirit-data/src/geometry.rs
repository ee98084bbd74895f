//! Web Mercator geometry handed to the callback pipeline.
//!
//! Coordinates arrive as WGS84 longitude/latitude and are projected to
//! EPSG:3857 metres. Areas are measured in the projected plane.

use std::f64::consts::FRAC_PI_4;

use geo::{Area, Coord, InteriorPoint, LineString, MultiPolygon, Point, Polygon};
use spirit_core::GeometrySource;

const EARTH_RADIUS: f64 = 6_378_137.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project a WGS84 coordinate to Web Mercator.
///
/// Latitudes beyond the Mercator limit are clamped.
///
/// # Examples
/// ```
/// use spirit_data::project;
///
/// let origin = project(0.0, 0.0);
/// assert!(origin.x.abs() < 1e-9 && origin.y.abs() < 1e-9);
/// ```
pub fn project(lon: f64, lat: f64) -> Coord<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    Coord {
        x: EARTH_RADIUS * lon.to_radians(),
        y: EARTH_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
    }
}

/// Projected geometry of one OSM object.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectedGeometry {
    /// Node location.
    Point(Point<f64>),
    /// Way geometry that does not describe an area.
    Line(LineString<f64>),
    /// Closed way describing an area.
    Area(Polygon<f64>),
    /// No geometry could be built, as for relations.
    Empty,
}

impl ProjectedGeometry {
    /// Build from an already projected ring or path.
    ///
    /// Lines need two coordinates and areas need a closed ring of four.
    /// Anything shorter yields [`ProjectedGeometry::Empty`].
    pub fn from_coords(coords: Vec<Coord<f64>>, area: bool) -> Self {
        if area {
            if coords.len() < 4 || coords.first() != coords.last() {
                return Self::Empty;
            }
            return Self::Area(Polygon::new(LineString::new(coords), Vec::new()));
        }
        if coords.len() < 2 {
            return Self::Empty;
        }
        Self::Line(LineString::new(coords))
    }
}

impl GeometrySource for ProjectedGeometry {
    fn point(&self) -> Option<Point<f64>> {
        match self {
            Self::Point(point) => Some(*point),
            _ => None,
        }
    }

    fn line(&self) -> Option<LineString<f64>> {
        match self {
            Self::Line(line) => Some(line.clone()),
            _ => None,
        }
    }

    fn polygon(&self) -> Option<MultiPolygon<f64>> {
        match self {
            Self::Area(polygon) => Some(MultiPolygon::new(vec![polygon.clone()])),
            _ => None,
        }
    }

    fn area(&self) -> Option<f64> {
        match self {
            Self::Area(polygon) => Some(polygon.unsigned_area()),
            _ => None,
        }
    }

    fn label_point(&self) -> Option<Point<f64>> {
        match self {
            Self::Point(point) => Some(*point),
            Self::Area(polygon) => polygon.interior_point(),
            Self::Line(_) | Self::Empty => None,
        }
    }
}
