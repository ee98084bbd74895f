//! `ingest` command: load an OSM extract through a theme into SQLite.

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use spirit_core::SchemaSink;
use spirit_data::{OsmIngestSummary, SqliteSink, ingest_osm_pbf};

use crate::theme::load_theme;
use crate::{
    ARG_OSM_PBF, ARG_OUTPUT, ARG_THEME, CliError, ENV_INGEST_OSM_PBF, ENV_INGEST_THEME,
    require_file,
};

pub(crate) const DEFAULT_OUTPUT: &str = "spirit.db";

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compose a theme, then stream an OpenStreetMap PBF extract \
                 through it. Every table the theme declares is recreated in \
                 the output SQLite database. Paths can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Load an OSM extract into a SQLite database"
)]
#[ortho_config(prefix = "SPIRIT")]
pub(crate) struct IngestArgs {
    /// Path to the JSON theme file.
    #[arg(long = ARG_THEME, value_name = "path")]
    #[serde(default)]
    pub(crate) theme: Option<Utf8PathBuf>,
    /// Path to the OpenStreetMap PBF file.
    #[arg(long = ARG_OSM_PBF, value_name = "path")]
    #[serde(default)]
    pub(crate) osm_pbf: Option<Utf8PathBuf>,
    /// SQLite database to write (default `spirit.db`).
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl IngestArgs {
    pub(crate) fn into_config(self) -> Result<IngestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        IngestConfig::try_from(merged)
    }
}

/// Resolved `ingest` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngestConfig {
    pub(crate) theme: Utf8PathBuf,
    pub(crate) osm_pbf: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
}

impl IngestConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_file(&self.theme, ARG_THEME)?;
        require_file(&self.osm_pbf, ARG_OSM_PBF)?;
        let is_dir = spirit_fs::dir_exists(&self.output).map_err(|source| {
            CliError::InspectSourcePath {
                field: ARG_OUTPUT,
                path: self.output.clone(),
                source,
            }
        })?;
        if is_dir {
            return Err(CliError::OutputIsDirectory {
                path: self.output.clone(),
            });
        }
        Ok(())
    }
}

impl TryFrom<IngestArgs> for IngestConfig {
    type Error = CliError;

    fn try_from(args: IngestArgs) -> Result<Self, Self::Error> {
        let theme = args.theme.ok_or(CliError::MissingArgument {
            field: ARG_THEME,
            env: ENV_INGEST_THEME,
        })?;
        let osm_pbf = args.osm_pbf.ok_or(CliError::MissingArgument {
            field: ARG_OSM_PBF,
            env: ENV_INGEST_OSM_PBF,
        })?;
        let output = args
            .output
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT));
        Ok(Self {
            theme,
            osm_pbf,
            output,
        })
    }
}

/// What an ingest run wrote.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IngestReport {
    pub(crate) summary: OsmIngestSummary,
    pub(crate) stored_rows: u64,
}

pub(crate) fn run_ingest(args: IngestArgs) -> Result<IngestReport, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    execute_ingest(&config)
}

pub(crate) fn execute_ingest(config: &IngestConfig) -> Result<IngestReport, CliError> {
    let theme = load_theme(&config.theme)?;
    let store_error = |source| CliError::Store {
        path: config.output.clone(),
        source,
    };
    let mut sink = SqliteSink::create(&config.output).map_err(store_error)?;
    sink.materialise(theme.schema())
        .map_err(|source| CliError::Materialise {
            path: config.output.clone(),
            source,
        })?;
    let summary = ingest_osm_pbf(config.osm_pbf.as_std_path(), &theme, &mut sink)?;
    let stored_rows = sink.finish().map_err(store_error)?;
    info!(
        "wrote {stored_rows} rows across {} tables to {}",
        theme.schema().len(),
        config.output
    );
    Ok(IngestReport {
        summary,
        stored_rows,
    })
}
