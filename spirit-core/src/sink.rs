//! Destinations for the frozen schema and the rows it receives.

use std::error::Error as StdError;

use thiserror::Error;

use crate::{Row, Schema};

/// Failure reported by a sink implementation.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct SinkError {
    context: String,
    #[source]
    source: Box<dyn StdError + Send + Sync>,
}

impl SinkError {
    /// Wrap a backend error with a short description of the failed step.
    pub fn new(context: impl Into<String>, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Description of the failed step.
    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Receives the schema once, before any rows.
pub trait SchemaSink {
    /// Create whatever storage the schema describes.
    fn materialise(&mut self, schema: &Schema) -> Result<(), SinkError>;
}

/// Receives rows as callbacks emit them.
pub trait RowSink {
    /// Store one row.
    fn accept(&mut self, row: Row) -> Result<(), SinkError>;
}

/// In-memory sink that keeps every row in arrival order.
///
/// # Examples
/// ```
/// use spirit_core::{MemorySink, RowSink};
///
/// let sink = MemorySink::default();
/// assert!(sink.rows().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    schema: Option<Schema>,
    rows: Vec<Row>,
}

impl MemorySink {
    /// All rows received so far.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows destined for `table`.
    pub fn rows_for<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows
            .iter()
            .filter(move |row| row.table().as_str() == table)
    }

    /// Schema passed to [`SchemaSink::materialise`], if any.
    pub const fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Take ownership of the collected rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl SchemaSink for MemorySink {
    fn materialise(&mut self, schema: &Schema) -> Result<(), SinkError> {
        self.schema = Some(schema.clone());
        Ok(())
    }
}

impl RowSink for MemorySink {
    fn accept(&mut self, row: Row) -> Result<(), SinkError> {
        self.rows.push(row);
        Ok(())
    }
}
