//! Command-line interface for the Spirit tile-schema tooling.
//!
//! Subcommands:
//! - `schema` composes a theme and prints the resulting schema as JSON.
//! - `ingest` streams an OSM PBF extract through a theme into SQLite.
//! - `fonts` downloads map fonts and builds their glyph PBFs.
#![forbid(unsafe_code)]

use std::io;

use camino::Utf8Path;
use clap::{Parser, Subcommand};

mod error;
mod fonts;
mod ingest;
mod logging;
mod schema;
mod theme;

pub use error::CliError;

use fonts::FontsArgs;
use ingest::IngestArgs;
use logging::Verbosity;
use schema::SchemaArgs;

const ARG_THEME: &str = "theme";
const ARG_OSM_PBF: &str = "osm-pbf";
const ARG_OUTPUT: &str = "output";
const ARG_FONTS_CONFIG: &str = "config";
const ARG_FONTS_DATA: &str = "data";
const ENV_SCHEMA_THEME: &str = "SPIRIT_CMDS_SCHEMA_THEME";
const ENV_INGEST_THEME: &str = "SPIRIT_CMDS_INGEST_THEME";
const ENV_INGEST_OSM_PBF: &str = "SPIRIT_CMDS_INGEST_OSM_PBF";

/// Run the Spirit CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    logging::init_logging(Verbosity::from_flags(cli.verbose, cli.quiet));
    match cli.command {
        Command::Schema(args) => {
            let config = args.into_config()?;
            schema::run_schema(&config, &mut io::stdout().lock())
        }
        Command::Ingest(args) => ingest::run_ingest(args).map(drop),
        Command::Fonts(args) => fonts::run_fonts(args).map(drop),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "spirit",
    about = "Compose Shortbread tile schemas and prepare their data",
    version
)]
struct Cli {
    /// Log debug output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the schema a theme composes to.
    Schema(SchemaArgs),
    /// Load an OSM extract into a SQLite database.
    Ingest(IngestArgs),
    /// Download fonts and build glyphs for map styles.
    Fonts(FontsArgs),
}

/// Fail unless `path` names an existing regular file.
fn require_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match spirit_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
