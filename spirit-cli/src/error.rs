//! Error types emitted by the Spirit CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use spirit_core::{CatalogError, ComposeError, SinkError};
use spirit_data::fonts::{FontError, TransportError};
use spirit_data::{OsmIngestError, SqliteSinkError};
use thiserror::Error;

/// Errors emitted by the Spirit CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The output path names a directory.
    #[error("output path {path:?} is a directory")]
    OutputIsDirectory { path: Utf8PathBuf },
    /// Reading the theme file failed.
    #[error("failed to read theme {path:?}: {source}")]
    ReadTheme {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The theme file is not a valid theme definition.
    #[error("failed to parse theme {path:?}: {source}")]
    ParseTheme {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The built-in topic catalog could not be assembled.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Composing the theme's topics failed.
    #[error("failed to compose theme {path:?}: {source}")]
    Compose {
        path: Utf8PathBuf,
        #[source]
        source: ComposeError,
    },
    /// Serialising the schema failed.
    #[error("failed to write schema: {0}")]
    WriteSchema(#[source] serde_json::Error),
    /// Writing to standard output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Opening or committing the SQLite output failed.
    #[error("failed to store rows in {path:?}: {source}")]
    Store {
        path: Utf8PathBuf,
        #[source]
        source: SqliteSinkError,
    },
    /// Creating the output tables failed.
    #[error("failed to create tables in {path:?}: {source}")]
    Materialise {
        path: Utf8PathBuf,
        #[source]
        source: SinkError,
    },
    /// OSM ingestion failed.
    #[error("failed to ingest OSM data: {0}")]
    OsmIngest(#[from] OsmIngestError),
    /// Building the HTTP client for font downloads failed.
    #[error("failed to prepare font downloads: {0}")]
    FontClient(#[source] TransportError),
    /// Fetching or converting fonts failed.
    #[error("failed to fetch fonts: {0}")]
    Fonts(#[from] FontError),
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
