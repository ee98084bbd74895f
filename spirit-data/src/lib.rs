//! Data adapters for the Spirit pipeline.
//!
//! This crate connects a composed theme to the outside world: it streams
//! OpenStreetMap PBF extracts into [`spirit_core::RowSink`]s, persists rows
//! in SQLite with R*Tree spatial indexes, and fetches the fonts that map
//! styles reference.
#![forbid(unsafe_code)]

pub mod fonts;
mod geometry;
mod ingest;
mod sqlite;

pub use geometry::{ProjectedGeometry, project};
pub use ingest::{
    AREA_KEYS, OsmElementKind, OsmIngestError, OsmIngestSummary, decode_element_id,
    encode_element_id, ingest_osm_pbf, storage_id,
};
pub use sqlite::{SqliteSink, SqliteSinkError};
