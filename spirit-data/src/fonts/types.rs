//! Font configuration, fetch options and the per-font report.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use super::FontError;

/// Parsed `fonts.yml`.
///
/// # Examples
/// ```
/// use spirit_data::fonts::FontConfig;
///
/// let config = FontConfig::from_yaml(
///     "settings:\n  fonts_dir: data/fonts\nsources:\n  noto:\n    url: https://example.org/noto.ttf\n",
/// )?;
/// assert_eq!(config.settings.fonts_dir.as_str(), "data/fonts");
/// assert_eq!(config.sources["noto"].url, "https://example.org/noto.ttf");
/// # Ok::<(), spirit_data::fonts::FontError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FontConfig {
    /// Global settings.
    pub settings: FontSettings,
    /// Fonts keyed by the name of their glyph directory.
    #[serde(default)]
    pub sources: BTreeMap<String, FontSourceSpec>,
}

impl FontConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, FontError> {
        serde_yaml::from_str(text).map_err(|source| FontError::ParseConfig { source })
    }

    /// Read and parse the configuration file at `path`.
    pub fn load(path: &Utf8Path) -> Result<Self, FontError> {
        let text = spirit_fs::read_to_string(path).map_err(|source| FontError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }
}

/// The `settings` block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FontSettings {
    /// Directory holding downloads and glyph output.
    pub fonts_dir: Utf8PathBuf,
}

/// One entry under `sources`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FontSourceSpec {
    /// `http`, `https` or `file` URL of the font.
    pub url: String,
    /// Members to extract when the download is an archive.
    #[serde(default)]
    pub archive: Option<ArchiveSpec>,
}

/// Archive extraction settings of a source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchiveSpec {
    /// Archive container format.
    pub format: ArchiveFormat,
    /// Member paths copied into the glyph directory.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// A zip file.
    Zip,
}

/// Switches controlling cache use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Download and convert even when the cache is current.
    pub force: bool,
    /// Use a complete cache without contacting the source.
    pub no_update: bool,
    /// Remove the cached download after a successful conversion.
    pub delete_cache: bool,
}

impl FetchOptions {
    /// Resolve conflicting switches: `force` wins over `no_update`.
    #[must_use]
    pub fn normalised(mut self) -> Self {
        if self.force && self.no_update {
            log::warn!("--force overrides --no-update");
            self.no_update = false;
        }
        self
    }
}

/// What happened to one font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStatus {
    /// Glyphs were rebuilt. `downloaded` is false when the cache was reused.
    Converted {
        /// Whether new bytes were fetched from the source.
        downloaded: bool,
    },
    /// The source was unchanged and glyphs already exist.
    UpToDate,
}

/// Outcome of one configured font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontOutcome {
    /// Source name.
    pub name: String,
    /// Result for that source.
    pub status: FontStatus,
}

/// Outcomes of a fetch run, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// One entry per configured source.
    pub fonts: Vec<FontOutcome>,
}

impl FetchReport {
    /// Number of fonts whose glyphs were rebuilt.
    pub fn converted(&self) -> usize {
        self.fonts
            .iter()
            .filter(|font| matches!(font.status, FontStatus::Converted { .. }))
            .count()
    }

    /// Number of fonts whose source delivered new bytes.
    pub fn downloaded(&self) -> usize {
        self.fonts
            .iter()
            .filter(|font| font.status == FontStatus::Converted { downloaded: true })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const CONFIG: &str = r"
settings:
  fonts_dir: fonts
sources:
  noto-sans:
    url: https://example.org/NotoSans.zip
    archive:
      format: zip
      files:
        - LICENSE.txt
  open-sans:
    url: file:///srv/OpenSans.ttf
";

    #[rstest]
    fn parses_sources_with_archives() {
        let config = FontConfig::from_yaml(CONFIG).expect("config parses");
        let noto = &config.sources["noto-sans"];
        let archive = noto.archive.as_ref().expect("archive settings");
        assert_eq!(archive.format, ArchiveFormat::Zip);
        assert_eq!(archive.files, ["LICENSE.txt"]);
        assert!(config.sources["open-sans"].archive.is_none());
    }

    #[rstest]
    #[case("sources: {}\n")]
    #[case("settings:\n  fonts_dir: f\nsources:\n  a:\n    url: x\n    archive:\n      format: rar\n")]
    fn rejects_invalid_configuration(#[case] text: &str) {
        assert!(matches!(
            FontConfig::from_yaml(text),
            Err(FontError::ParseConfig { .. })
        ));
    }

    #[rstest]
    #[case(FetchOptions { force: true, no_update: true, delete_cache: false }, false)]
    #[case(FetchOptions { force: false, no_update: true, delete_cache: false }, true)]
    fn force_overrides_no_update(#[case] options: FetchOptions, #[case] no_update: bool) {
        assert_eq!(options.normalised().no_update, no_update);
    }
}
