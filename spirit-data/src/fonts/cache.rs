//! Download cache layout.
//!
//! A font downloaded from `…/NotoSans.zip` is cached as
//! `<fonts_dir>/NotoSans.zip` with its validator in `NotoSans.zip.lastmod`.
//! Downloads stream into `NotoSans.zip.part` and replace the cache only once
//! complete. A cache entry counts only when both files exist.

use camino::{Utf8Path, Utf8PathBuf};
use url::Url;

use super::FontError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CachePaths {
    pub(crate) file: Utf8PathBuf,
    pub(crate) lastmod: Utf8PathBuf,
    pub(crate) partial: Utf8PathBuf,
}

impl CachePaths {
    pub(crate) fn for_url(fonts_dir: &Utf8Path, url: &Url) -> Option<Self> {
        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())?;
        let file = fonts_dir.join(file_name);
        Some(Self {
            lastmod: Utf8PathBuf::from(format!("{file}.lastmod")),
            partial: Utf8PathBuf::from(format!("{file}.part")),
            file,
        })
    }

    /// Validator of a complete cache entry; `Some("")` when none was recorded.
    pub(crate) fn cached_validator(&self) -> Result<Option<String>, FontError> {
        let complete = exists(&self.file)? && exists(&self.lastmod)?;
        if !complete {
            return Ok(None);
        }
        spirit_fs::read_to_string(&self.lastmod)
            .map(|validator| Some(validator.trim().to_owned()))
            .map_err(|source| filesystem(&self.lastmod, source))
    }

    /// Promote a finished download and record its validator.
    pub(crate) fn commit(&self, validator: Option<&str>) -> Result<(), FontError> {
        spirit_fs::rename(&self.partial, &self.file)
            .map_err(|source| filesystem(&self.file, source))?;
        spirit_fs::write(&self.lastmod, validator.unwrap_or_default())
            .map_err(|source| filesystem(&self.lastmod, source))
    }

    pub(crate) fn discard_partial(&self) -> Result<(), FontError> {
        spirit_fs::remove_file_if_exists(&self.partial)
            .map(drop)
            .map_err(|source| filesystem(&self.partial, source))
    }

    pub(crate) fn remove(&self) -> Result<(), FontError> {
        for path in [&self.file, &self.lastmod] {
            spirit_fs::remove_file_if_exists(path).map_err(|source| filesystem(path, source))?;
        }
        Ok(())
    }
}

pub(crate) fn exists(path: &Utf8Path) -> Result<bool, FontError> {
    spirit_fs::file_is_file(path).map_err(|source| filesystem(path, source))
}

pub(crate) fn filesystem(path: &Utf8Path, source: std::io::Error) -> FontError {
    FontError::Filesystem {
        path: path.to_path_buf(),
        source,
    }
}
