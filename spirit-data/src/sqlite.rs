//! SQLite output for composed themes.
//!
//! Each schema table becomes a SQLite table with an `osm_id` column followed
//! by the declared columns. Geometries are stored as bincode BLOBs. Spatial
//! indexes become R*Tree virtual tables named `<table>_<column>_rtree`,
//! keyed by the row's `rowid` and fed as rows arrive. All writes share one
//! transaction that [`SqliteSink::finish`] commits.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use geo::BoundingRect;
use log::{debug, info};
use rusqlite::{Connection, Error as SqliteError, params, params_from_iter, types::Value as SqlValue};
use spirit_core::{
    ColumnType, IndexMethod, Row, RowSink, Schema, SchemaSink, SinkError, TableDefinition, Value,
};
use thiserror::Error;

use crate::ingest::storage_id;

/// Errors raised while writing a theme's output to SQLite.
#[derive(Debug, Error)]
pub enum SqliteSinkError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory for {path:?}")]
    CreateDirectory {
        /// Database path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the write transaction failed.
    #[error("failed to begin the output transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating a table or index failed.
    #[error("failed to create storage for table {table}")]
    CreateTable {
        /// Table being created.
        table: String,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A row named a table the schema never declared.
    #[error("table {table} was not materialised")]
    UnknownTable {
        /// Table named by the row.
        table: String,
    },
    /// Serialising a geometry value failed.
    #[error("failed to encode {column} of object {object} for table {table}")]
    EncodeGeometry {
        /// Destination table.
        table: String,
        /// Geometry column.
        column: String,
        /// Identifier of the object being written.
        object: u64,
        /// Source error produced by `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// Writing a row failed.
    #[error("failed to insert object {object} into {table}")]
    Insert {
        /// Destination table.
        table: String,
        /// Identifier of the object being written.
        object: u64,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit the output transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

#[derive(Debug)]
struct TablePlan {
    insert: String,
    columns: Vec<(String, ColumnType)>,
    rtrees: Vec<(String, String)>,
}

/// Sink writing rows into a SQLite database.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use spirit_core::{MemorySink, SchemaSink, TopicName, TopicRequest, compose};
/// use spirit_data::SqliteSink;
/// use spirit_topics::builtin_catalog;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = builtin_catalog()?;
/// let theme = compose(&catalog, &[TopicRequest::new(TopicName::new("shortbread_v1/ocean")?)])?;
/// let mut sink = SqliteSink::from_connection(Connection::open_in_memory()?)?;
/// sink.materialise(theme.schema())?;
/// assert_eq!(sink.finish()?, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SqliteSink {
    connection: Connection,
    tables: HashMap<String, TablePlan>,
    rows: u64,
}

impl SqliteSink {
    /// Open or create the database at `path` and begin the write transaction.
    pub fn create(path: &Utf8Path) -> Result<Self, SqliteSinkError> {
        spirit_fs::ensure_parent_dir(path).map_err(|source| {
            SqliteSinkError::CreateDirectory {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| SqliteSinkError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_connection(connection)
    }

    /// Wrap an existing connection and begin the write transaction.
    pub fn from_connection(connection: Connection) -> Result<Self, SqliteSinkError> {
        connection
            .execute_batch("BEGIN")
            .map_err(|source| SqliteSinkError::BeginTransaction { source })?;
        Ok(Self {
            connection,
            tables: HashMap::new(),
            rows: 0,
        })
    }

    /// Underlying connection, for inspection.
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Commit everything written so far and return the number of rows.
    ///
    /// Dropping the sink without calling `finish` rolls the writes back.
    pub fn finish(self) -> Result<u64, SqliteSinkError> {
        self.connection
            .execute_batch("COMMIT")
            .map_err(|source| SqliteSinkError::Commit { source })?;
        info!("committed {} rows", self.rows);
        Ok(self.rows)
    }

    fn create_table(&mut self, table: &TableDefinition) -> Result<(), SqliteSinkError> {
        let name = table.name().as_str();
        let failed = |source| SqliteSinkError::CreateTable {
            table: name.to_owned(),
            source,
        };

        let mut ddl = format!("DROP TABLE IF EXISTS \"{name}\";\n");
        let columns: Vec<String> = table
            .columns()
            .iter()
            .map(|column| format!("\"{}\" {}", column.name(), sql_type(column.column_type())))
            .collect();
        ddl.push_str(&format!(
            "CREATE TABLE \"{name}\" (osm_id INTEGER NOT NULL, {});\n",
            columns.join(", ")
        ));

        let mut rtrees = Vec::new();
        for index in table.indexes() {
            match index.method() {
                IndexMethod::BTree => {
                    let quoted: Vec<String> =
                        index.columns().iter().map(|column| format!("\"{column}\"")).collect();
                    ddl.push_str(&format!(
                        "CREATE INDEX \"{name}_{}_idx\" ON \"{name}\" ({});\n",
                        index.columns().join("_"),
                        quoted.join(", ")
                    ));
                }
                IndexMethod::Spatial => {
                    for column in index.columns() {
                        let rtree = format!("{name}_{column}_rtree");
                        ddl.push_str(&format!(
                            "DROP TABLE IF EXISTS \"{rtree}\";\n\
                             CREATE VIRTUAL TABLE \"{rtree}\" USING rtree(id, min_x, max_x, min_y, max_y);\n"
                        ));
                        rtrees.push((column.clone(), rtree));
                    }
                }
            }
        }
        self.connection.execute_batch(&ddl).map_err(failed)?;

        let names: Vec<&str> = table.columns().iter().map(|column| column.name()).collect();
        let placeholders = vec!["?"; names.len() + 1].join(", ");
        let quoted: Vec<String> = names.iter().map(|column| format!("\"{column}\"")).collect();
        let insert = format!(
            "INSERT INTO \"{name}\" (osm_id, {}) VALUES ({placeholders})",
            quoted.join(", ")
        );
        debug!("created table {name} with {} spatial indexes", rtrees.len());
        self.tables.insert(
            name.to_owned(),
            TablePlan {
                insert,
                columns: table
                    .columns()
                    .iter()
                    .map(|column| (column.name().to_owned(), column.column_type()))
                    .collect(),
                rtrees,
            },
        );
        Ok(())
    }

    fn insert_row(&mut self, row: &Row) -> Result<(), SqliteSinkError> {
        let table = row.table().as_str();
        let object = row.object_id();
        let plan = self
            .tables
            .get(table)
            .ok_or_else(|| SqliteSinkError::UnknownTable {
                table: table.to_owned(),
            })?;
        let insert_failed = |source| SqliteSinkError::Insert {
            table: table.to_owned(),
            object,
            source,
        };

        let mut values = Vec::with_capacity(plan.columns.len() + 1);
        values.push(SqlValue::Integer(storage_id(object)));
        for (column, _) in &plan.columns {
            let value = match row.get(column) {
                Some(value) => to_sql(value).map_err(|source| SqliteSinkError::EncodeGeometry {
                    table: table.to_owned(),
                    column: column.clone(),
                    object,
                    source,
                })?,
                None => SqlValue::Null,
            };
            values.push(value);
        }

        self.connection
            .prepare_cached(&plan.insert)
            .and_then(|mut statement| statement.execute(params_from_iter(values)))
            .map_err(insert_failed)?;
        let rowid = self.connection.last_insert_rowid();

        for (column, rtree) in &plan.rtrees {
            let Some(Value::Geometry(geometry)) = row.get(column) else {
                continue;
            };
            let Some(bounds) = geometry.bounding_rect() else {
                continue;
            };
            self.connection
                .prepare_cached(&format!(
                    "INSERT INTO \"{rtree}\" (id, min_x, max_x, min_y, max_y) VALUES (?1, ?2, ?3, ?4, ?5)"
                ))
                .and_then(|mut statement| {
                    statement.execute(params![
                        rowid,
                        bounds.min().x,
                        bounds.max().x,
                        bounds.min().y,
                        bounds.max().y
                    ])
                })
                .map_err(insert_failed)?;
        }
        self.rows += 1;
        Ok(())
    }
}

const fn sql_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Text => "TEXT",
        ColumnType::Real => "REAL",
        ColumnType::Integer | ColumnType::Boolean => "INTEGER",
        ColumnType::Geometry(_) => "BLOB",
    }
}

fn to_sql(value: &Value) -> Result<SqlValue, bincode::Error> {
    Ok(match value {
        Value::Text(text) => SqlValue::Text(text.clone()),
        Value::Real(real) => SqlValue::Real(*real),
        Value::Integer(integer) => SqlValue::Integer(*integer),
        Value::Boolean(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Geometry(geometry) => SqlValue::Blob(bincode::serialize(geometry)?),
    })
}

impl SchemaSink for SqliteSink {
    fn materialise(&mut self, schema: &Schema) -> Result<(), SinkError> {
        for table in schema.tables() {
            self.create_table(table)
                .map_err(|err| SinkError::new("sqlite schema", err))?;
        }
        info!("materialised {} tables", schema.len());
        Ok(())
    }
}

impl RowSink for SqliteSink {
    fn accept(&mut self, row: Row) -> Result<(), SinkError> {
        self.insert_row(&row)
            .map_err(|err| SinkError::new("sqlite insert", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, Point};
    use rstest::{fixture, rstest};
    use spirit_core::{
        GeometryClass, TopicConfig, TopicName, TopicRequest, compose,
        test_support::{StaticGeometry, object},
    };
    use spirit_topics::builtin_catalog;
    use tempfile::TempDir;

    #[fixture]
    fn theme() -> spirit_core::ComposedTheme {
        let catalog = builtin_catalog().expect("catalog builds");
        let requests = [
            TopicRequest::new(TopicName::new("core/name-with-fallback").expect("valid name")),
            TopicRequest::new(TopicName::new("shortbread_v1/pois").expect("valid name")),
            TopicRequest::new(TopicName::new("shortbread_v1/ocean").expect("valid name"))
                .with_config(TopicConfig::new().with("name", "sea")),
        ];
        compose(&catalog, &requests).expect("theme composes")
    }

    fn materialised(theme: &spirit_core::ComposedTheme) -> SqliteSink {
        let connection = Connection::open_in_memory().expect("in-memory database");
        let mut sink = SqliteSink::from_connection(connection).expect("transaction begins");
        sink.materialise(theme.schema()).expect("schema materialises");
        sink
    }

    fn count(sink: &SqliteSink, table: &str) -> i64 {
        sink.connection()
            .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| row.get(0))
            .expect("count query")
    }

    #[rstest]
    fn creates_tables_and_rtrees(theme: spirit_core::ComposedTheme) {
        let sink = materialised(&theme);
        assert_eq!(count(&sink, "pois"), 0);
        assert_eq!(count(&sink, "sea"), 0);
        assert_eq!(count(&sink, "sea_geom_rtree"), 0);
        assert_eq!(count(&sink, "pois_geom_rtree"), 0);
    }

    #[rstest]
    fn stores_rows_with_geometry_blobs_and_bounds(theme: spirit_core::ComposedTheme) {
        let mut sink = materialised(&theme);
        let cafe = object(
            12,
            GeometryClass::Point,
            [("amenity", "cafe"), ("name", "Kiosk")],
            StaticGeometry::point(3.0, 4.0),
        );
        assert_eq!(theme.process(&cafe, &mut sink).expect("processes"), 1);

        let (osm_id, name, blob): (i64, String, Vec<u8>) = sink
            .connection()
            .query_row("SELECT osm_id, name, geom FROM pois", [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .expect("row stored");
        assert_eq!(osm_id, 12);
        assert_eq!(name, "Kiosk");
        let geometry: Geometry<f64> = bincode::deserialize(&blob).expect("geometry decodes");
        assert_eq!(geometry, Geometry::Point(Point::new(3.0, 4.0)));

        let (min_x, max_y): (f64, f64) = sink
            .connection()
            .query_row("SELECT min_x, max_y FROM pois_geom_rtree", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .expect("rtree entry stored");
        assert!((min_x - 3.0).abs() < 1e-3);
        assert!((max_y - 4.0).abs() < 1e-3);
        assert_eq!(sink.finish().expect("commit succeeds"), 1);
    }

    #[rstest]
    fn rematerialising_replaces_tables(theme: spirit_core::ComposedTheme) {
        let dir = TempDir::new().expect("temporary directory");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("out/spirit.sqlite"))
            .expect("UTF-8 path");
        let cafe = object(
            1,
            GeometryClass::Point,
            [("amenity", "cafe")],
            StaticGeometry::point(0.0, 0.0),
        );
        for _ in 0..2 {
            let mut sink = SqliteSink::create(&path).expect("database opens");
            sink.materialise(theme.schema()).expect("schema materialises");
            theme.process(&cafe, &mut sink).expect("processes");
            sink.finish().expect("commit succeeds");
        }
        let connection = Connection::open(path.as_std_path()).expect("database reopens");
        let rows: i64 = connection
            .query_row("SELECT COUNT(*) FROM pois", [], |row| row.get(0))
            .expect("count query");
        assert_eq!(rows, 1);
    }

    #[rstest]
    fn dropping_without_finish_rolls_back(theme: spirit_core::ComposedTheme) {
        let dir = TempDir::new().expect("temporary directory");
        let path =
            Utf8PathBuf::from_path_buf(dir.path().join("spirit.sqlite")).expect("UTF-8 path");
        {
            let mut sink = SqliteSink::create(&path).expect("database opens");
            sink.materialise(theme.schema()).expect("schema materialises");
        }
        let connection = Connection::open(path.as_std_path()).expect("database reopens");
        let tables: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'pois'",
                [],
                |row| row.get(0),
            )
            .expect("catalogue query");
        assert_eq!(tables, 0);
    }
}
