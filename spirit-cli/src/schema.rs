//! `schema` command: print a composed theme's schema.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::theme::load_theme;
use crate::{ARG_THEME, CliError, ENV_SCHEMA_THEME, require_file};

/// CLI arguments for the `schema` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compose the topics listed in a theme file and print the \
                 frozen schema (tables, columns and indexes) as JSON.",
    about = "Print the schema a theme composes to"
)]
#[ortho_config(prefix = "SPIRIT")]
pub(crate) struct SchemaArgs {
    /// Path to the JSON theme file.
    #[arg(long = ARG_THEME, value_name = "path")]
    #[serde(default)]
    pub(crate) theme: Option<Utf8PathBuf>,
}

impl SchemaArgs {
    pub(crate) fn into_config(self) -> Result<SchemaConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SchemaConfig::try_from(merged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SchemaConfig {
    pub(crate) theme: Utf8PathBuf,
}

impl TryFrom<SchemaArgs> for SchemaConfig {
    type Error = CliError;

    fn try_from(args: SchemaArgs) -> Result<Self, Self::Error> {
        let theme = args.theme.ok_or(CliError::MissingArgument {
            field: ARG_THEME,
            env: ENV_SCHEMA_THEME,
        })?;
        Ok(Self { theme })
    }
}

pub(crate) fn run_schema(config: &SchemaConfig, out: &mut dyn Write) -> Result<(), CliError> {
    require_file(&config.theme, ARG_THEME)?;
    let theme = load_theme(&config.theme)?;
    serde_json::to_writer_pretty(&mut *out, theme.schema()).map_err(CliError::WriteSchema)?;
    writeln!(out).map_err(CliError::WriteOutput)
}
