//! Core composition model for the Spirit tile-schema pipeline.
//!
//! Topics are independently authored units that contribute tables to a
//! shared [`SchemaRegistry`] and processing callbacks to a
//! [`CallbackPipeline`]. The [`compose`] driver loads topics in the order a
//! theme lists them and freezes the result into a [`ComposedTheme`], which
//! then processes [`InputObject`]s one at a time.
//!
//! Responsibilities:
//! - Validate table, column and index declarations.
//! - Load each topic at most once and detect cyclic loads.
//! - Run callbacks per geometry class in declaration order.
//!
//! Boundaries:
//! - No geometry math: objects expose geometry through [`GeometrySource`].
//! - No storage: rows are handed to a [`RowSink`].
#![forbid(unsafe_code)]

pub mod compose;
pub mod error;
pub mod fallback;
pub mod geometry;
pub mod pipeline;
pub mod schema;
pub mod sink;
#[doc(hidden)]
pub mod test_support;
pub mod topic;
pub mod value;

pub use compose::{ComposedTheme, OrderingWarning, ThemeDefinition, TopicRequest, compose};
pub use error::{ComposeError, IngestError};
pub use fallback::{KeyFallbackResolver, KeyFallbackSpec};
pub use geometry::{
    GeometryClass, GeometryError, GeometrySource, InputObject, ParseGeometryClassError, Tags,
};
pub use pipeline::{Callback, CallbackPipeline, Emitter, PassData};
pub use schema::{
    ColumnDefinition, ColumnType, GEOMETRY_COLUMN, GeometryKind, IdKind, IndexDefinition,
    IndexMethod, Schema, SchemaError, SchemaRegistry, SchemaTable, TableDefinition, TableHandle,
    TableName,
};
pub use sink::{MemorySink, RowSink, SchemaSink, SinkError};
pub use topic::{
    CatalogError, Composer, LoadOutcome, TopicCatalog, TopicConfig, TopicContext,
    TopicDescriptor, TopicInit, TopicName,
};
pub use value::{Row, RowValues, Value};
