//! Error types produced by the font fetcher.

use std::{io, process::ExitStatus};

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors produced while fetching and converting fonts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FontError {
    /// The configuration file could not be read.
    #[error("failed to read font configuration {path}: {source}")]
    ReadConfig {
        /// Configuration path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The configuration file is not valid YAML for a font configuration.
    #[error("failed to parse font configuration: {source}")]
    ParseConfig {
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
    /// A source URL could not be parsed.
    #[error("font {name} has an invalid URL {url}: {source}")]
    InvalidUrl {
        /// Source name.
        name: String,
        /// URL as configured.
        url: String,
        /// Parse failure.
        source: url::ParseError,
    },
    /// A source URL has no file name to cache the download under.
    #[error("font {name} URL {url} does not name a file")]
    MissingFileName {
        /// Source name.
        name: String,
        /// URL as configured.
        url: String,
    },
    /// A filesystem operation on the cache or glyph directory failed.
    #[error("failed to access {path}: {source}")]
    Filesystem {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Downloading a font failed.
    #[error("failed to download font {name}: {source}")]
    Download {
        /// Source name.
        name: String,
        /// Transport failure.
        source: TransportError,
    },
    /// The source reported no change but nothing is cached.
    #[error("font {name} was reported unchanged but no cached copy exists")]
    MissingCache {
        /// Source name.
        name: String,
    },
    /// Building glyphs failed.
    #[error("failed to build glyphs for font {name}: {source}")]
    Glyphs {
        /// Source name.
        name: String,
        /// Builder failure.
        source: GlyphBuildError,
    },
    /// The downloaded archive could not be read.
    #[error("failed to read archive for font {name}: {source}")]
    Archive {
        /// Source name.
        name: String,
        /// Archive failure.
        source: zip::result::ZipError,
    },
    /// An archive member would be extracted outside the glyph directory.
    #[error("archive member {member} of font {name} has an unsafe path")]
    UnsafeArchiveMember {
        /// Source name.
        name: String,
        /// Member as configured.
        member: String,
    },
}

/// Transport-level errors encountered while contacting a font source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The HTTP client could not be configured.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// Error reported by `reqwest`.
        source: reqwest::Error,
    },
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description.
        message: String,
    },
    /// The request or the local copy failed with an I/O error.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the transport.
        source: io::Error,
    },
    /// No source handles the URL scheme.
    #[error("unsupported URL scheme {scheme} in {url}")]
    UnsupportedScheme {
        /// Fully qualified request URL.
        url: String,
        /// Scheme of the URL.
        scheme: String,
    },
}

/// Errors raised by a [`GlyphBuilder`](super::GlyphBuilder).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GlyphBuildError {
    /// The glyph tool could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that was run.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The glyph tool exited unsuccessfully.
    #[error("{program} exited with {status}")]
    Failed {
        /// Program that was run.
        program: String,
        /// Exit status of the tool.
        status: ExitStatus,
    },
}
