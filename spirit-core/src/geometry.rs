//! Input objects and the geometry accessors the pipeline calls.
//!
//! The core never computes geometry itself. Ingestion sources implement
//! [`GeometrySource`] and wrap it in an [`InputObject`] together with the
//! object's tags and [`GeometryClass`].
//!
//! # Examples
//! ```
//! use spirit_core::GeometryClass;
//!
//! assert_eq!(GeometryClass::Area.as_str(), "area");
//! assert_eq!("line".parse::<GeometryClass>(), Ok(GeometryClass::Line));
//! ```

use std::collections::HashMap;
use std::fmt;

use geo::{LineString, MultiPolygon, Point};
use thiserror::Error;

/// OpenStreetMap-style tags attached to an input object.
pub type Tags = HashMap<String, String>;

/// Geometry class that selects which callbacks process an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryClass {
    /// Tagged nodes.
    Point,
    /// Open ways and closed ways that do not describe an area.
    Line,
    /// Closed ways describing an area.
    Area,
    /// Relations.
    Relation,
}

impl GeometryClass {
    /// Every class, in pipeline slot order.
    pub const ALL: [Self; 4] = [Self::Point, Self::Line, Self::Area, Self::Relation];

    /// Return the class as a lowercase `&str`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Area => "area",
            Self::Relation => "relation",
        }
    }

    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::Point => 0,
            Self::Line => 1,
            Self::Area => 2,
            Self::Relation => 3,
        }
    }
}

impl fmt::Display for GeometryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown geometry class name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown geometry class '{0}'")]
pub struct ParseGeometryClassError(String);

impl std::str::FromStr for GeometryClass {
    type Err = ParseGeometryClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "point" => Ok(Self::Point),
            "line" => Ok(Self::Line),
            "area" => Ok(Self::Area),
            "relation" => Ok(Self::Relation),
            _ => Err(ParseGeometryClassError(s.to_owned())),
        }
    }
}

/// Geometry accessors supplied by the ingestion source.
///
/// Each method returns `None` when the source cannot produce that form for
/// the object. Coordinates are in the output projection; `area` is measured
/// in the same projected units.
pub trait GeometrySource: fmt::Debug + Send + Sync {
    /// Location of a point object.
    fn point(&self) -> Option<Point<f64>>;
    /// Linestring of a line object.
    fn line(&self) -> Option<LineString<f64>>;
    /// Polygon geometry of an area object.
    fn polygon(&self) -> Option<MultiPolygon<f64>>;
    /// Area of the polygon geometry.
    fn area(&self) -> Option<f64>;
    /// A point guaranteed to lie inside the geometry, used for labels.
    fn label_point(&self) -> Option<Point<f64>>;
}

/// Errors raised by [`InputObject`] geometry accessors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeometryError {
    /// The accessor does not apply to the object's geometry class.
    #[error("object {object} is a {actual} object; {accessor} needs {expected}")]
    ClassMismatch {
        /// Identifier of the object.
        object: u64,
        /// Accessor that was called.
        accessor: &'static str,
        /// Class the accessor supports.
        expected: &'static str,
        /// Class the object actually has.
        actual: GeometryClass,
    },
    /// The source could not build the requested geometry.
    #[error("object {object} has no usable geometry for {accessor}")]
    Unavailable {
        /// Identifier of the object.
        object: u64,
        /// Accessor that was called.
        accessor: &'static str,
    },
}

/// One object delivered by the ingestion source.
///
/// # Examples
/// ```
/// use spirit_core::test_support::StaticGeometry;
/// use spirit_core::{GeometryClass, InputObject, Tags};
///
/// let tags = Tags::from([("amenity".to_owned(), "cafe".to_owned())]);
/// let object = InputObject::new(7, GeometryClass::Point, tags, StaticGeometry::point(1.0, 2.0));
/// assert_eq!(object.tag("amenity"), Some("cafe"));
/// assert!(object.as_point().is_ok());
/// assert!(object.as_polygon().is_err());
/// ```
#[derive(Debug)]
pub struct InputObject {
    id: u64,
    class: GeometryClass,
    tags: Tags,
    geometry: Box<dyn GeometrySource>,
}

impl InputObject {
    /// Wrap tags and a geometry source into an object of the given class.
    pub fn new(
        id: u64,
        class: GeometryClass,
        tags: Tags,
        geometry: impl GeometrySource + 'static,
    ) -> Self {
        Self {
            id,
            class,
            tags,
            geometry: Box::new(geometry),
        }
    }

    /// Identifier assigned by the ingestion source.
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Geometry class of the object.
    pub const fn class(&self) -> GeometryClass {
        self.class
    }

    /// All tags.
    pub const fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Value of a single tag, `None` when absent.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Location of a point object.
    pub fn as_point(&self) -> Result<Point<f64>, GeometryError> {
        self.require(GeometryClass::Point, "as_point")?;
        self.geometry
            .point()
            .ok_or_else(|| self.unavailable("as_point"))
    }

    /// Linestring of a line object.
    pub fn as_line(&self) -> Result<LineString<f64>, GeometryError> {
        self.require(GeometryClass::Line, "as_line")?;
        self.geometry.line().ok_or_else(|| self.unavailable("as_line"))
    }

    /// Polygon geometry of an area object.
    pub fn as_polygon(&self) -> Result<MultiPolygon<f64>, GeometryError> {
        self.require(GeometryClass::Area, "as_polygon")?;
        self.geometry
            .polygon()
            .ok_or_else(|| self.unavailable("as_polygon"))
    }

    /// Projected area of an area object.
    pub fn area(&self) -> Result<f64, GeometryError> {
        self.require(GeometryClass::Area, "area")?;
        self.geometry.area().ok_or_else(|| self.unavailable("area"))
    }

    /// Label point: the location for points, an interior point for areas.
    pub fn label_point(&self) -> Result<Point<f64>, GeometryError> {
        match self.class {
            GeometryClass::Point => self.as_point(),
            GeometryClass::Area => self
                .geometry
                .label_point()
                .ok_or_else(|| self.unavailable("label_point")),
            actual => Err(GeometryError::ClassMismatch {
                object: self.id,
                accessor: "label_point",
                expected: "a point or area",
                actual,
            }),
        }
    }

    fn require(&self, expected: GeometryClass, accessor: &'static str) -> Result<(), GeometryError> {
        if self.class == expected {
            Ok(())
        } else {
            Err(GeometryError::ClassMismatch {
                object: self.id,
                accessor,
                expected: expected.as_str(),
                actual: self.class,
            })
        }
    }

    const fn unavailable(&self, accessor: &'static str) -> GeometryError {
        GeometryError::Unavailable {
            object: self.id,
            accessor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StaticGeometry;
    use rstest::rstest;
    use std::str::FromStr;

    fn object(class: GeometryClass, geometry: StaticGeometry) -> InputObject {
        InputObject::new(1, class, Tags::new(), geometry)
    }

    #[rstest]
    #[case(GeometryClass::Point)]
    #[case(GeometryClass::Line)]
    #[case(GeometryClass::Area)]
    #[case(GeometryClass::Relation)]
    fn display_round_trips_through_from_str(#[case] class: GeometryClass) {
        assert_eq!(GeometryClass::from_str(&class.to_string()), Ok(class));
    }

    #[test]
    fn parsing_rejects_unknown_class() {
        let err = GeometryClass::from_str("polygon").unwrap_err();
        assert_eq!(err, ParseGeometryClassError("polygon".to_owned()));
        assert_eq!(err.to_string(), "unknown geometry class 'polygon'");
    }

    #[test]
    fn polygon_accessor_on_line_is_a_class_mismatch() {
        let line = object(GeometryClass::Line, StaticGeometry::empty());
        let err = line.as_polygon().unwrap_err();
        assert_eq!(
            err,
            GeometryError::ClassMismatch {
                object: 1,
                accessor: "as_polygon",
                expected: "area",
                actual: GeometryClass::Line,
            }
        );
    }

    #[test]
    fn missing_source_geometry_is_unavailable() {
        let area = object(GeometryClass::Area, StaticGeometry::empty());
        assert!(matches!(
            area.area(),
            Err(GeometryError::Unavailable { accessor: "area", .. })
        ));
    }

    #[test]
    fn label_point_of_point_object_is_its_location() {
        let point = object(GeometryClass::Point, StaticGeometry::point(3.0, 4.0));
        assert_eq!(point.label_point(), Ok(Point::new(3.0, 4.0)));
    }

    #[test]
    fn label_point_rejects_relations() {
        let relation = object(GeometryClass::Relation, StaticGeometry::empty());
        assert!(matches!(
            relation.label_point(),
            Err(GeometryError::ClassMismatch { .. })
        ));
    }

    #[test]
    fn absent_tags_read_as_none() {
        let point = object(GeometryClass::Point, StaticGeometry::point(0.0, 0.0));
        assert_eq!(point.tag("name"), None);
    }
}
