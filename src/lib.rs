//! Facade crate for the Spirit tile-schema pipeline.
//!
//! Re-exports the composition model from `spirit-core`, the built-in
//! Shortbread topics, and (behind the default `data` feature) the OSM,
//! SQLite and font adapters.
//!
//! # Examples
//! ```
//! use spirit::{TopicName, TopicRequest, builtin_catalog, compose};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = builtin_catalog()?;
//! let theme = compose(&catalog, &[TopicRequest::new(TopicName::new("shortbread_v1/pois")?)])?;
//! assert!(theme.schema().table("pois").is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub use spirit_core::{
    ComposeError, ComposedTheme, GeometryClass, GeometrySource, IngestError, InputObject,
    MemorySink, Row, RowSink, Schema, SchemaSink, TableDefinition, ThemeDefinition, TopicCatalog,
    TopicName, TopicRequest, Value, compose,
};
pub use spirit_topics::builtin_catalog;

#[cfg(feature = "data")]
pub use spirit_data::{
    OsmIngestError, OsmIngestSummary, SqliteSink, SqliteSinkError, fonts, ingest_osm_pbf,
};
