//! Output schema contributed by topics.
//!
//! The module is split into three focused submodules:
//! - [`table`] defines tables, columns and indexes.
//! - [`registry`] accumulates definitions while topics load.
//! - [`snapshot`] is the frozen, read-only view handed to sinks.

mod registry;
mod snapshot;
mod table;

pub use registry::{SchemaRegistry, TableHandle};
pub use snapshot::{Schema, SchemaTable};
pub use table::{
    ColumnDefinition, ColumnType, GEOMETRY_COLUMN, GeometryKind, IdKind, IndexDefinition,
    IndexMethod, TableDefinition, TableName,
};

pub(crate) use table::validate_identifier;

use thiserror::Error;

use crate::TopicName;

/// Errors raised while declaring tables, columns and indexes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A table with the same name but a different definition exists.
    #[error("table '{table}' is already declared by topic '{owner}' with a different definition")]
    DuplicateTable {
        /// Conflicting table name.
        table: TableName,
        /// Topic that declared the existing table.
        owner: TopicName,
    },
    /// A column name collides with an existing column.
    #[error("column '{column}' already exists in table '{table}'")]
    DuplicateColumn {
        /// Table being modified.
        table: TableName,
        /// Colliding column name.
        column: String,
    },
    /// An index targets a column the table does not have.
    #[error("index on table '{table}' targets unknown column '{column}'")]
    UnknownColumn {
        /// Table being modified.
        table: TableName,
        /// Missing column name.
        column: String,
    },
    /// An index lists no target columns.
    #[error("index on table '{table}' has no target columns")]
    EmptyIndex {
        /// Table being modified.
        table: TableName,
    },
    /// The handle does not refer to a declared table.
    #[error("no table is registered under handle {handle}")]
    UnknownTable {
        /// Raw handle value.
        handle: usize,
    },
    /// A topic tried to modify a table declared by another topic.
    #[error("topic '{topic}' cannot modify table '{table}' owned by topic '{owner}'")]
    TableNotOwned {
        /// Table being modified.
        table: TableName,
        /// Topic that declared the table.
        owner: TopicName,
        /// Topic attempting the modification.
        topic: TopicName,
    },
    /// A key fallback lists no candidate tags.
    #[error("fallback for '{output}' lists no candidate keys")]
    EmptyFallback {
        /// Output key of the fallback.
        output: String,
    },
    /// A table or column name is not a valid identifier.
    #[error("invalid identifier '{value}': {reason}")]
    InvalidIdentifier {
        /// Rejected value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}
