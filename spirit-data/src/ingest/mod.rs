//! OSM PBF ingestion feeding a composed theme.
use std::path::{Path, PathBuf};

use geo::{Coord, Rect};
use log::info;
use osmpbf::ElementReader;
use spirit_core::{ComposedTheme, IngestError, RowSink};
use thiserror::Error;

mod builder;
mod ids;
mod tags;

use builder::ObjectBuilder;

pub use ids::{OsmElementKind, decode_element_id, encode_element_id, storage_id};
pub use tags::AREA_KEYS;

/// Summary of an OSM ingestion run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OsmIngestSummary {
    /// Number of nodes discovered, including dense-node entries.
    pub nodes: u64,
    /// Number of ways discovered.
    pub ways: u64,
    /// Number of relations discovered.
    pub relations: u64,
    /// Tagged objects handed to the theme.
    pub objects: u64,
    /// Rows the theme emitted into the sink.
    pub rows: u64,
    /// Tagged ways dropped because their geometry could not be built.
    pub skipped: u64,
    /// Bounding box covering all node coordinates, if any nodes were present.
    /// Coordinates are WGS84 with `x = longitude`, `y = latitude`.
    pub bounds: Option<Rect<f64>>,
}

impl OsmIngestSummary {
    fn include_bounds(&mut self, bounds: Rect<f64>) {
        match &mut self.bounds {
            Some(existing) => {
                let min = Coord {
                    x: existing.min().x.min(bounds.min().x),
                    y: existing.min().y.min(bounds.min().y),
                };
                let max = Coord {
                    x: existing.max().x.max(bounds.max().x),
                    y: existing.max().y.max(bounds.max().y),
                };
                *existing = Rect::new(min, max);
            }
            None => self.bounds = Some(bounds),
        }
    }

    fn record_node(&mut self, lon: f64, lat: f64) {
        self.nodes += 1;
        if let Some(coordinate) = builder::validated_coord(lon, lat) {
            self.include_bounds(Rect::new(coordinate, coordinate));
        }
    }

    const fn record_way(&mut self) {
        self.ways += 1;
    }

    const fn record_relation(&mut self) {
        self.relations += 1;
    }
}

/// Errors returned when ingesting an OSM PBF file.
#[derive(Debug, Error)]
pub enum OsmIngestError {
    /// The file could not be opened.
    #[error("failed to open OSM PBF file at {path:?}")]
    Open {
        /// Underlying reader error.
        #[source]
        source: osmpbf::Error,
        /// Path that was opened.
        path: PathBuf,
    },
    /// The file is not valid PBF data.
    #[error("failed to decode OSM PBF data at {path:?}")]
    Decode {
        /// Underlying reader error.
        #[source]
        source: osmpbf::Error,
        /// Path being decoded.
        path: PathBuf,
    },
    /// The theme rejected an object.
    #[error("ingestion of {path:?} stopped")]
    Ingest {
        /// Error raised by the pipeline or the sink.
        #[source]
        source: IngestError,
        /// Path being ingested.
        path: PathBuf,
    },
}

/// Stream an OSM PBF file through `theme` into `sink`.
///
/// Elements are read in file order. Tagged nodes become point objects,
/// tagged ways become line or area objects and tagged relations become
/// relation objects without geometry. The first pipeline error stops the
/// run.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
/// use spirit_core::{MemorySink, TopicName, TopicRequest, compose};
/// use spirit_data::ingest_osm_pbf;
/// use spirit_topics::builtin_catalog;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = builtin_catalog()?;
/// let theme = compose(&catalog, &[TopicRequest::new(TopicName::new("shortbread_v1/pois")?)])?;
/// let mut sink = MemorySink::default();
/// let summary = ingest_osm_pbf(Path::new("berlin.osm.pbf"), &theme, &mut sink)?;
/// println!("{} rows from {} objects", summary.rows, summary.objects);
/// # Ok(())
/// # }
/// ```
pub fn ingest_osm_pbf(
    path: &Path,
    theme: &ComposedTheme,
    sink: &mut dyn RowSink,
) -> Result<OsmIngestSummary, OsmIngestError> {
    let reader = ElementReader::from_path(path).map_err(|source| OsmIngestError::Open {
        source,
        path: path.to_path_buf(),
    })?;

    let mut builder = ObjectBuilder::default();
    let mut failure: Option<IngestError> = None;
    reader
        .for_each(|element| {
            if failure.is_some() {
                return;
            }
            let Some(object) = builder.process_element(element) else {
                return;
            };
            match theme.process(&object, &mut *sink) {
                Ok(rows) => builder.record_rows(rows),
                Err(err) => failure = Some(err),
            }
        })
        .map_err(|source| OsmIngestError::Decode {
            source,
            path: path.to_path_buf(),
        })?;

    if let Some(source) = failure {
        return Err(OsmIngestError::Ingest {
            source,
            path: path.to_path_buf(),
        });
    }

    let summary = builder.into_summary();
    info!(
        "ingested {} nodes, {} ways, {} relations into {} rows ({} ways skipped)",
        summary.nodes, summary.ways, summary.relations, summary.rows, summary.skipped
    );
    Ok(summary)
}
