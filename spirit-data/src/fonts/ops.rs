//! Driver that fetches the configured fonts and turns them into glyphs.

use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use url::Url;

use super::cache::{CachePaths, filesystem};
use super::glyphs::GlyphBuilder;
use super::source::{FetchOutcome, FontSource};
use super::{
    ArchiveFormat, ArchiveSpec, FetchOptions, FetchReport, FontConfig, FontError, FontOutcome,
    FontSourceSpec, FontStatus,
};

/// Fetch and convert every font in `config`.
///
/// Downloads and glyph directories live under `fonts_dir`. Sources run in
/// name order and the first failure stops the run.
///
/// # Examples
/// ```
/// # use camino::Utf8PathBuf;
/// # use spirit_data::fonts::{
/// #     FetchOptions, FontConfig, FontError, block_on_for_tests, fetch_fonts,
/// #     test_support::{RecordingGlyphBuilder, StubFontSource},
/// # };
/// # fn example() -> Result<(), FontError> {
/// let temp = tempfile::tempdir().expect("create temp directory");
/// let fonts_dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 path");
/// let config = FontConfig::from_yaml(
///     "settings:\n  fonts_dir: unused\nsources:\n  noto:\n    url: https://example.org/noto.ttf\n",
/// )?;
/// let source = StubFontSource::new(b"font".to_vec(), "Tue, 01 Oct 2024 10:00:00 GMT");
/// let glyphs = RecordingGlyphBuilder::default();
/// let report = block_on_for_tests(fetch_fonts(
///     &config,
///     &fonts_dir,
///     FetchOptions::default(),
///     &source,
///     &glyphs,
/// ))?;
/// assert_eq!(report.downloaded(), 1);
/// # Ok(())
/// # }
/// # example().expect("fonts fetched");
/// ```
pub async fn fetch_fonts<S, G>(
    config: &FontConfig,
    fonts_dir: &Utf8Path,
    options: FetchOptions,
    source: &S,
    glyphs: &G,
) -> Result<FetchReport, FontError>
where
    S: FontSource + ?Sized,
    G: GlyphBuilder + ?Sized,
{
    let options = options.normalised();
    spirit_fs::ensure_dir(fonts_dir).map_err(|err| filesystem(fonts_dir, err))?;
    info!("starting load of {} fonts", config.sources.len());

    let mut report = FetchReport::default();
    for (name, spec) in &config.sources {
        info!("processing font {name}");
        let status = fetch_font(name, spec, fonts_dir, options, source, glyphs).await?;
        report.fonts.push(FontOutcome {
            name: name.clone(),
            status,
        });
    }
    Ok(report)
}

async fn fetch_font<S, G>(
    name: &str,
    spec: &FontSourceSpec,
    fonts_dir: &Utf8Path,
    options: FetchOptions,
    source: &S,
    glyphs: &G,
) -> Result<FontStatus, FontError>
where
    S: FontSource + ?Sized,
    G: GlyphBuilder + ?Sized,
{
    let url = Url::parse(&spec.url).map_err(|source| FontError::InvalidUrl {
        name: name.to_owned(),
        url: spec.url.clone(),
        source,
    })?;
    let paths = CachePaths::for_url(fonts_dir, &url).ok_or_else(|| FontError::MissingFileName {
        name: name.to_owned(),
        url: spec.url.clone(),
    })?;
    let glyph_dir = fonts_dir.join(name);
    let cached = paths.cached_validator()?;

    let downloaded = if options.no_update && cached.is_some() {
        debug!("  using cached {name} without contacting the source");
        false
    } else {
        let validator = if options.force {
            None
        } else {
            cached.as_deref().filter(|value| !value.is_empty())
        };
        download(name, &url, validator, &paths, source).await?
    };

    if !downloaded {
        if cached.is_none() {
            return Err(FontError::MissingCache {
                name: name.to_owned(),
            });
        }
        let built = spirit_fs::dir_exists(&glyph_dir).map_err(|err| filesystem(&glyph_dir, err))?;
        if built && !options.force {
            info!("  {name} did not require updating");
            return Ok(FontStatus::UpToDate);
        }
    }

    convert(name, spec, &paths, &glyph_dir, glyphs)?;
    info!("  import of {name} complete");

    if options.delete_cache {
        paths.remove()?;
        info!("  cache deleted");
    }
    Ok(FontStatus::Converted { downloaded })
}

async fn download<S>(
    name: &str,
    url: &Url,
    validator: Option<&str>,
    paths: &CachePaths,
    source: &S,
) -> Result<bool, FontError>
where
    S: FontSource + ?Sized,
{
    let mut file =
        spirit_fs::create_file(&paths.partial).map_err(|err| filesystem(&paths.partial, err))?;
    let outcome = source.fetch(url, validator, &mut file).await;
    let outcome = outcome.and_then(|fetched| {
        file.flush().map_err(|err| super::TransportError::Network {
            url: url.to_string(),
            source: err,
        })?;
        Ok(fetched)
    });
    drop(file);

    match outcome {
        Ok(FetchOutcome::Modified {
            bytes,
            last_modified,
        }) => {
            paths.commit(last_modified.as_deref())?;
            info!("  download complete ({bytes} bytes)");
            Ok(true)
        }
        Ok(FetchOutcome::NotModified) => {
            paths.discard_partial()?;
            debug!("  {name} not modified since {}", validator.unwrap_or("-"));
            Ok(false)
        }
        Err(failure) => {
            if let Err(err) = paths.discard_partial() {
                warn!("  failed to remove partial download of {name}: {err}");
            }
            Err(FontError::Download {
                name: name.to_owned(),
                source: failure,
            })
        }
    }
}

fn convert<G>(
    name: &str,
    spec: &FontSourceSpec,
    paths: &CachePaths,
    glyph_dir: &Utf8Path,
    glyphs: &G,
) -> Result<(), FontError>
where
    G: GlyphBuilder + ?Sized,
{
    spirit_fs::reset_dir(glyph_dir).map_err(|err| filesystem(glyph_dir, err))?;
    glyphs
        .build(&paths.file, glyph_dir)
        .map_err(|source| FontError::Glyphs {
            name: name.to_owned(),
            source,
        })?;
    if let Some(archive) = &spec.archive {
        info!("  decompressing {}", paths.file);
        extract(name, archive, &paths.file, glyph_dir)?;
    }
    Ok(())
}

fn extract(
    name: &str,
    archive: &ArchiveSpec,
    file: &Utf8Path,
    glyph_dir: &Utf8Path,
) -> Result<(), FontError> {
    match archive.format {
        ArchiveFormat::Zip => extract_zip(name, &archive.files, file, glyph_dir),
    }
}

fn extract_zip(
    name: &str,
    members: &[String],
    file: &Utf8Path,
    glyph_dir: &Utf8Path,
) -> Result<(), FontError> {
    let archive_error = |source| FontError::Archive {
        name: name.to_owned(),
        source,
    };
    let reader = spirit_fs::open_utf8_file(file).map_err(|err| filesystem(file, err))?;
    let mut zip = zip::ZipArchive::new(reader).map_err(archive_error)?;
    for member in members {
        let mut entry = zip.by_name(member).map_err(archive_error)?;
        let relative = entry
            .enclosed_name()
            .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
            .ok_or_else(|| FontError::UnsafeArchiveMember {
                name: name.to_owned(),
                member: member.clone(),
            })?;
        let target = glyph_dir.join(relative);
        if entry.is_dir() {
            spirit_fs::ensure_dir(&target).map_err(|err| filesystem(&target, err))?;
            continue;
        }
        let mut out = spirit_fs::create_file(&target).map_err(|err| filesystem(&target, err))?;
        io::copy(&mut entry, &mut out).map_err(|err| filesystem(&target, err))?;
        debug!("  extracted {member}");
    }
    Ok(())
}
