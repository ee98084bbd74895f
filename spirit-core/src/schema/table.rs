//! Table, column and index definitions.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use serde::Serialize;

use super::SchemaError;

/// Longest identifier accepted for tables and columns.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Name of the implicit geometry column every table carries.
pub const GEOMETRY_COLUMN: &str = "geom";

/// Check that `value` is a lowercase SQL-safe identifier.
pub(crate) fn validate_identifier(value: &str) -> Result<(), SchemaError> {
    let reason = if value.is_empty() {
        Some("must not be empty")
    } else if value.len() > MAX_IDENTIFIER_LEN {
        Some("must be at most 63 characters")
    } else if value.starts_with(|c: char| c.is_ascii_digit()) {
        Some("must not start with a digit")
    } else if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        Some("may only contain lowercase ASCII letters, digits and '_'")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(SchemaError::InvalidIdentifier {
            value: value.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Validated table name.
///
/// # Examples
/// ```
/// use spirit_core::TableName;
///
/// let name = TableName::new("landuse").expect("valid table name");
/// assert_eq!(name.as_ref(), "landuse");
/// assert!(TableName::new("Land Use").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    /// Validate and wrap a table name.
    pub fn new(value: impl Into<String>) -> Result<Self, SchemaError> {
        let value = value.into();
        validate_identifier(&value)?;
        Ok(Self(value))
    }

    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TableName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Deref for TableName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for TableName {
    type Error = SchemaError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Which OSM object family the rows of a table come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    /// Nodes.
    Point,
    /// Ways rendered as lines.
    Line,
    /// Closed ways rendered as areas.
    Area,
    /// Rows derived from relations.
    Relation,
}

/// Shape stored in a geometry column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    /// A single point.
    Point,
    /// A single linestring.
    LineString,
    /// One or more polygons.
    MultiPolygon,
    /// Any geometry.
    Any,
}

impl GeometryKind {
    /// Return the kind as a lowercase `&str`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::LineString => "linestring",
            Self::MultiPolygon => "multipolygon",
            Self::Any => "geometry",
        }
    }
}

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// UTF-8 text.
    Text,
    /// Double-precision float.
    Real,
    /// 64-bit signed integer.
    Integer,
    /// Boolean flag.
    Boolean,
    /// Geometry of the given kind.
    Geometry(GeometryKind),
}

impl ColumnType {
    /// Whether the column stores geometry.
    pub const fn is_geometry(self) -> bool {
        matches!(self, Self::Geometry(_))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Real => f.write_str("real"),
            Self::Integer => f.write_str("integer"),
            Self::Boolean => f.write_str("boolean"),
            Self::Geometry(kind) => f.write_str(kind.as_str()),
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
}

impl ColumnDefinition {
    /// Validate the column name and build a definition.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Result<Self, SchemaError> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Self { name, column_type })
    }

    /// Shorthand for a text column.
    pub fn text(name: impl Into<String>) -> Result<Self, SchemaError> {
        Self::new(name, ColumnType::Text)
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column type.
    pub const fn column_type(&self) -> ColumnType {
        self.column_type
    }
}

/// Index access method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMethod {
    /// Spatial index over a geometry column.
    Spatial,
    /// Ordered index over scalar columns.
    BTree,
}

/// An index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDefinition {
    method: IndexMethod,
    columns: Vec<String>,
}

impl IndexDefinition {
    /// Index `columns` with `method`.
    pub fn new<I, S>(method: IndexMethod, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Spatial index over a single geometry column.
    pub fn spatial(column: impl Into<String>) -> Self {
        Self::new(IndexMethod::Spatial, [column])
    }

    /// Access method.
    pub const fn method(&self) -> IndexMethod {
        self.method
    }

    /// Target column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Full definition of an output table.
///
/// The geometry column [`GEOMETRY_COLUMN`] is created by [`TableDefinition::new`]
/// and always comes first.
///
/// # Examples
/// ```
/// use spirit_core::{ColumnDefinition, GeometryKind, IdKind, IndexDefinition, TableDefinition, TableName};
///
/// # fn main() -> Result<(), spirit_core::SchemaError> {
/// let table = TableDefinition::new(TableName::new("water")?, IdKind::Area, GeometryKind::MultiPolygon)
///     .with_column(ColumnDefinition::text("kind")?)
///     .with_index(IndexDefinition::spatial("geom"));
/// let names: Vec<_> = table.columns().iter().map(|c| c.name()).collect();
/// assert_eq!(names, ["geom", "kind"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDefinition {
    name: TableName,
    id_kind: IdKind,
    geometry: GeometryKind,
    columns: Vec<ColumnDefinition>,
    indexes: Vec<IndexDefinition>,
}

impl TableDefinition {
    /// Start a table definition holding only the geometry column.
    pub fn new(name: TableName, id_kind: IdKind, geometry: GeometryKind) -> Self {
        let geom = ColumnDefinition {
            name: GEOMETRY_COLUMN.to_owned(),
            column_type: ColumnType::Geometry(geometry),
        };
        Self {
            name,
            id_kind,
            geometry,
            columns: vec![geom],
            indexes: Vec::new(),
        }
    }

    /// Append a column. Uniqueness is checked when the table is declared.
    #[must_use]
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Append an index. Targets are checked when the table is declared.
    #[must_use]
    pub fn with_index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    /// Table name.
    pub const fn name(&self) -> &TableName {
        &self.name
    }

    /// Source object family.
    pub const fn id_kind(&self) -> IdKind {
        self.id_kind
    }

    /// Kind of the geometry column.
    pub const fn geometry(&self) -> GeometryKind {
        self.geometry
    }

    /// Columns in declaration order, geometry first.
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Indexes in declaration order.
    pub fn indexes(&self) -> &[IndexDefinition] {
        &self.indexes
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Check column uniqueness and index targets.
    pub(crate) fn validate(&self) -> Result<(), SchemaError> {
        for (position, column) in self.columns.iter().enumerate() {
            let mut earlier = self.columns.iter().take(position);
            if earlier.any(|other| other.name == column.name) {
                return Err(SchemaError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }
        self.indexes
            .iter()
            .try_for_each(|index| self.check_index_targets(index))
    }

    pub(crate) fn push_column(&mut self, column: ColumnDefinition) -> Result<(), SchemaError> {
        if self.column(&column.name).is_some() {
            return Err(SchemaError::DuplicateColumn {
                table: self.name.clone(),
                column: column.name,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub(crate) fn push_index(&mut self, index: IndexDefinition) -> Result<(), SchemaError> {
        self.check_index_targets(&index)?;
        self.indexes.push(index);
        Ok(())
    }

    fn check_index_targets(&self, index: &IndexDefinition) -> Result<(), SchemaError> {
        if index.columns.is_empty() {
            return Err(SchemaError::EmptyIndex {
                table: self.name.clone(),
            });
        }
        match index
            .columns
            .iter()
            .find(|target| self.column(target).is_none())
        {
            Some(missing) => Err(SchemaError::UnknownColumn {
                table: self.name.clone(),
                column: missing.clone(),
            }),
            None => Ok(()),
        }
    }
}
