//! Fixed-value geometry used by unit and behaviour tests, and by callers
//! that need to push hand-built objects through a composed theme.

use geo::{LineString, MultiPolygon, Point, Polygon};

use crate::{GeometryClass, GeometrySource, InputObject, Tags};

/// [`GeometrySource`] returning precomputed values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticGeometry {
    point: Option<Point<f64>>,
    line: Option<LineString<f64>>,
    polygon: Option<MultiPolygon<f64>>,
    area: Option<f64>,
    label_point: Option<Point<f64>>,
}

impl StaticGeometry {
    /// A source that cannot produce any geometry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A point location.
    pub fn point(x: f64, y: f64) -> Self {
        Self {
            point: Some(Point::new(x, y)),
            ..Self::default()
        }
    }

    /// A linestring.
    pub fn line(line: LineString<f64>) -> Self {
        Self {
            line: Some(line),
            ..Self::default()
        }
    }

    /// A polygon with an explicit area and label point.
    pub fn polygon(polygon: Polygon<f64>, area: f64, label_point: Point<f64>) -> Self {
        Self {
            polygon: Some(MultiPolygon::new(vec![polygon])),
            area: Some(area),
            label_point: Some(label_point),
            ..Self::default()
        }
    }

    /// An axis-aligned square with its lower-left corner at the origin.
    ///
    /// The area and label point are filled in so tests need no geometry
    /// maths.
    pub fn square(side: f64) -> Self {
        let exterior = LineString::from(vec![
            (0.0, 0.0),
            (side, 0.0),
            (side, side),
            (0.0, side),
            (0.0, 0.0),
        ]);
        let half = side / 2.0;
        Self::polygon(
            Polygon::new(exterior, Vec::new()),
            side * side,
            Point::new(half, half),
        )
    }
}

impl GeometrySource for StaticGeometry {
    fn point(&self) -> Option<Point<f64>> {
        self.point
    }

    fn line(&self) -> Option<LineString<f64>> {
        self.line.clone()
    }

    fn polygon(&self) -> Option<MultiPolygon<f64>> {
        self.polygon.clone()
    }

    fn area(&self) -> Option<f64> {
        self.area
    }

    fn label_point(&self) -> Option<Point<f64>> {
        self.label_point
    }
}

/// Build a [`Tags`] map from string pairs.
pub fn tags<const N: usize>(pairs: [(&str, &str); N]) -> Tags {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

/// Build an object of `class` with the given tags and geometry.
pub fn object<const N: usize>(
    id: u64,
    class: GeometryClass,
    pairs: [(&str, &str); N],
    geometry: StaticGeometry,
) -> InputObject {
    InputObject::new(id, class, tags(pairs), geometry)
}
