//! `fonts` command: download map fonts and build their glyphs.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use spirit_data::fonts::{
    CommandGlyphBuilder, DefaultFontSource, FetchOptions, FetchReport, FontConfig, FontSource,
    GlyphBuilder, fetch_fonts,
};

use crate::{ARG_FONTS_CONFIG, ARG_FONTS_DATA, CliError, require_file};

pub(crate) const DEFAULT_FONTS_CONFIG: &str = "fonts.yml";

/// CLI arguments for the `fonts` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Download the fonts listed in a YAML configuration and build \
                 glyph PBFs for each. Downloads are cached next to the glyphs \
                 and only fetched again when the source reports a change.",
    about = "Download fonts and build glyphs for map styles"
)]
#[ortho_config(prefix = "SPIRIT")]
pub(crate) struct FontsArgs {
    /// Font configuration file (default `fonts.yml`).
    #[arg(short = 'c', long = ARG_FONTS_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) config: Option<Utf8PathBuf>,
    /// Override the fonts directory from the configuration.
    #[arg(short = 'D', long = ARG_FONTS_DATA, value_name = "dir")]
    #[serde(default)]
    pub(crate) data: Option<Utf8PathBuf>,
    /// Download and convert even when the cache is current.
    #[arg(short = 'f', long)]
    #[serde(default)]
    pub(crate) force: bool,
    /// Use cached downloads without checking for updates. Overridden by --force.
    #[arg(long)]
    #[serde(default)]
    pub(crate) no_update: bool,
    /// Delete cached downloads once their glyphs are built.
    #[arg(long)]
    #[serde(default)]
    pub(crate) delete_cache: bool,
}

impl FontsArgs {
    pub(crate) fn into_config(self) -> Result<FontsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(FontsConfig::from(merged))
    }
}

/// Resolved `fonts` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FontsConfig {
    pub(crate) config: Utf8PathBuf,
    pub(crate) data: Option<Utf8PathBuf>,
    pub(crate) options: FetchOptions,
}

impl From<FontsArgs> for FontsConfig {
    fn from(args: FontsArgs) -> Self {
        Self {
            config: args
                .config
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_FONTS_CONFIG)),
            data: args.data,
            options: FetchOptions {
                force: args.force,
                no_update: args.no_update,
                delete_cache: args.delete_cache,
            },
        }
    }
}

impl FontsConfig {
    /// `--data` wins over `settings.fonts_dir`.
    pub(crate) fn fonts_dir<'a>(&'a self, fonts: &'a FontConfig) -> &'a Utf8Path {
        self.data
            .as_deref()
            .unwrap_or(fonts.settings.fonts_dir.as_path())
    }
}

pub(crate) fn run_fonts(args: FontsArgs) -> Result<FetchReport, CliError> {
    let config = args.into_config()?;
    let source = DefaultFontSource::new().map_err(CliError::FontClient)?;
    execute_fonts(&config, &source, &CommandGlyphBuilder::default())
}

pub(crate) fn execute_fonts<S, G>(
    config: &FontsConfig,
    source: &S,
    glyphs: &G,
) -> Result<FetchReport, CliError>
where
    S: FontSource + ?Sized,
    G: GlyphBuilder + ?Sized,
{
    require_file(&config.config, ARG_FONTS_CONFIG)?;
    let fonts = FontConfig::load(&config.config)?;
    let fonts_dir = config.fonts_dir(&fonts);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let report = runtime.block_on(fetch_fonts(
        &fonts,
        fonts_dir,
        config.options,
        source,
        glyphs,
    ))?;
    info!(
        "{} fonts processed, {} converted, {} downloaded",
        report.fonts.len(),
        report.converted(),
        report.downloaded()
    );
    Ok(report)
}
