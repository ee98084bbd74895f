//! Column values and output rows.

use std::collections::BTreeMap;

use geo::{Geometry, LineString, MultiPolygon, Point, Polygon};

use crate::{ColumnType, GeometryKind, TableName, TopicName};

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 text.
    Text(String),
    /// Double-precision float.
    Real(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// Boolean flag.
    Boolean(bool),
    /// Projected geometry.
    Geometry(Geometry<f64>),
}

impl Value {
    /// Whether the value may be stored in a column of `column_type`.
    ///
    /// # Examples
    /// ```
    /// use geo::Point;
    /// use spirit_core::{ColumnType, GeometryKind, Value};
    ///
    /// let point = Value::from(Point::new(1.0, 2.0));
    /// assert!(point.matches(ColumnType::Geometry(GeometryKind::Point)));
    /// assert!(point.matches(ColumnType::Geometry(GeometryKind::Any)));
    /// assert!(!point.matches(ColumnType::Geometry(GeometryKind::MultiPolygon)));
    /// assert!(!Value::from("x").matches(ColumnType::Integer));
    /// ```
    pub fn matches(&self, column_type: ColumnType) -> bool {
        match (self, column_type) {
            (Self::Text(_), ColumnType::Text)
            | (Self::Real(_), ColumnType::Real)
            | (Self::Integer(_), ColumnType::Integer)
            | (Self::Boolean(_), ColumnType::Boolean) => true,
            (Self::Geometry(geometry), ColumnType::Geometry(kind)) => match kind {
                GeometryKind::Any => true,
                GeometryKind::Point => matches!(geometry, Geometry::Point(_)),
                GeometryKind::LineString => matches!(geometry, Geometry::LineString(_)),
                GeometryKind::MultiPolygon => {
                    matches!(geometry, Geometry::MultiPolygon(_) | Geometry::Polygon(_))
                }
            },
            _ => false,
        }
    }

    /// Short name of the value's type, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Real(_) => "real",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Geometry(_) => "geometry",
        }
    }

    /// Borrow the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Geometry<f64>> for Value {
    fn from(value: Geometry<f64>) -> Self {
        Self::Geometry(value)
    }
}

impl From<Point<f64>> for Value {
    fn from(value: Point<f64>) -> Self {
        Self::Geometry(Geometry::Point(value))
    }
}

impl From<LineString<f64>> for Value {
    fn from(value: LineString<f64>) -> Self {
        Self::Geometry(Geometry::LineString(value))
    }
}

impl From<Polygon<f64>> for Value {
    fn from(value: Polygon<f64>) -> Self {
        Self::Geometry(Geometry::Polygon(value))
    }
}

impl From<MultiPolygon<f64>> for Value {
    fn from(value: MultiPolygon<f64>) -> Self {
        Self::Geometry(Geometry::MultiPolygon(value))
    }
}

/// Column values collected by a callback before it emits a row.
///
/// Columns left unset are stored as nulls by sinks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowValues {
    values: BTreeMap<String, Value>,
}

impl RowValues {
    /// Start an empty set of values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column`, replacing any earlier value.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Set `column` only when `value` is present.
    #[must_use]
    pub fn set_opt<V: Into<Value>>(self, column: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(column, value),
            None => self,
        }
    }

    /// Value of `column`, if set.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Iterate over `(column, value)` pairs in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(column, value)| (column.as_str(), value))
    }

    /// Number of set columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no column is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One output row produced by a callback.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    table: TableName,
    object_id: u64,
    topic: TopicName,
    values: RowValues,
}

impl Row {
    pub(crate) const fn new(
        table: TableName,
        object_id: u64,
        topic: TopicName,
        values: RowValues,
    ) -> Self {
        Self {
            table,
            object_id,
            topic,
            values,
        }
    }

    /// Destination table.
    pub const fn table(&self) -> &TableName {
        &self.table
    }

    /// Identifier of the input object the row came from.
    pub const fn object_id(&self) -> u64 {
        self.object_id
    }

    /// Topic whose callback emitted the row.
    pub const fn topic(&self) -> &TopicName {
        &self.topic
    }

    /// Column values.
    pub const fn values(&self) -> &RowValues {
        &self.values
    }

    /// Shorthand for `values().get(column)`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::from("a"), ColumnType::Text, true)]
    #[case(Value::from(1.5), ColumnType::Real, true)]
    #[case(Value::from(3_i64), ColumnType::Real, false)]
    #[case(Value::from(true), ColumnType::Boolean, true)]
    #[case(Value::from(Point::new(0.0, 0.0)), ColumnType::Text, false)]
    #[case(
        Value::from(MultiPolygon::<f64>::new(Vec::new())),
        ColumnType::Geometry(GeometryKind::MultiPolygon),
        true
    )]
    #[case(
        Value::from(LineString::<f64>::new(Vec::new())),
        ColumnType::Geometry(GeometryKind::Point),
        false
    )]
    fn value_type_checks(#[case] value: Value, #[case] column_type: ColumnType, #[case] expected: bool) {
        assert_eq!(value.matches(column_type), expected);
    }

    #[test]
    fn set_opt_skips_missing_values() {
        let values = RowValues::new()
            .set("landuse", "forest")
            .set_opt("name", None::<&str>);
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("landuse").and_then(Value::as_text), Some("forest"));
        assert!(values.get("name").is_none());
    }
}
