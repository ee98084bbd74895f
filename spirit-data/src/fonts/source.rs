//! Conditional font downloads over HTTP and from the local filesystem.

use std::io::{self, Write};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use futures_util::StreamExt;
use reqwest::header::{IF_MODIFIED_SINCE, LAST_MODIFIED, USER_AGENT};
use reqwest::{Client, StatusCode};
use url::Url;

use super::TransportError;

/// User agent sent with every HTTP request.
pub const DEFAULT_USER_AGENT: &str = concat!("spirit-fonts/", env!("CARGO_PKG_VERSION"));

/// Result of a conditional fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// New content was written to the sink.
    Modified {
        /// Number of bytes written.
        bytes: u64,
        /// Validator to send next time, if the source supplied one.
        last_modified: Option<String>,
    },
    /// The source still matches the validator; nothing was written.
    NotModified,
}

/// Conditional download of a font file.
#[async_trait(?Send)]
pub trait FontSource {
    /// Fetch `url` into `sink` unless it still matches `if_modified_since`.
    async fn fetch(
        &self,
        url: &Url,
        if_modified_since: Option<&str>,
        sink: &mut dyn Write,
    ) -> Result<FetchOutcome, TransportError>;
}

/// HTTP implementation of [`FontSource`].
#[derive(Debug)]
pub struct HttpFontSource {
    client: Client,
    user_agent: String,
}

impl HttpFontSource {
    /// Construct an HTTP-backed font source.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|source| TransportError::Client { source })?;
        Ok(Self {
            client,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }

    /// Override the default user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[async_trait(?Send)]
impl FontSource for HttpFontSource {
    async fn fetch(
        &self,
        url: &Url,
        if_modified_since: Option<&str>,
        sink: &mut dyn Write,
    ) -> Result<FetchOutcome, TransportError> {
        let mut request = self
            .client
            .get(url.as_str())
            .header(USER_AGENT, self.user_agent.as_str());
        if let Some(validator) = if_modified_since {
            request = request.header(IF_MODIFIED_SINCE, validator);
        }
        let response = request
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, url.as_str()))?;
        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }
        let response = response
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, url.as_str()))?;
        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let mut bytes = 0_u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| convert_reqwest_error(err, url.as_str()))?;
            sink.write_all(&chunk).map_err(|source| TransportError::Network {
                url: url.to_string(),
                source,
            })?;
            bytes += u64::try_from(chunk.len()).unwrap_or(u64::MAX);
        }
        Ok(FetchOutcome::Modified {
            bytes,
            last_modified,
        })
    }
}

/// `file://` implementation of [`FontSource`].
///
/// The validator is the file's modification time in seconds since the Unix
/// epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFontSource;

impl FileFontSource {
    fn path(url: &Url) -> Result<Utf8PathBuf, TransportError> {
        url.to_file_path()
            .ok()
            .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
            .ok_or_else(|| TransportError::Network {
                url: url.to_string(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a UTF-8 local file URL"),
            })
    }
}

#[async_trait(?Send)]
impl FontSource for FileFontSource {
    async fn fetch(
        &self,
        url: &Url,
        if_modified_since: Option<&str>,
        sink: &mut dyn Write,
    ) -> Result<FetchOutcome, TransportError> {
        let network = |source| TransportError::Network {
            url: url.to_string(),
            source,
        };
        let path = Self::path(url)?;
        let modified = spirit_fs::modified(&path).map_err(network)?;
        let stamp = modified
            .duration_since(UNIX_EPOCH)
            .map(|age| age.as_secs_f64().to_string())
            .map_err(|err| network(io::Error::other(err)))?;
        if if_modified_since == Some(stamp.as_str()) {
            return Ok(FetchOutcome::NotModified);
        }
        let content = spirit_fs::read(&path).map_err(network)?;
        sink.write_all(&content).map_err(network)?;
        Ok(FetchOutcome::Modified {
            bytes: u64::try_from(content.len()).unwrap_or(u64::MAX),
            last_modified: Some(stamp),
        })
    }
}

/// Source that picks [`HttpFontSource`] or [`FileFontSource`] by URL scheme.
#[derive(Debug)]
pub struct DefaultFontSource {
    http: HttpFontSource,
    file: FileFontSource,
}

impl DefaultFontSource {
    /// Construct the default source.
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self {
            http: HttpFontSource::new()?,
            file: FileFontSource,
        })
    }
}

#[async_trait(?Send)]
impl FontSource for DefaultFontSource {
    async fn fetch(
        &self,
        url: &Url,
        if_modified_since: Option<&str>,
        sink: &mut dyn Write,
    ) -> Result<FetchOutcome, TransportError> {
        match url.scheme() {
            "file" => self.file.fetch(url, if_modified_since, sink).await,
            "http" | "https" => self.http.fetch(url, if_modified_since, sink).await,
            other => Err(TransportError::UnsupportedScheme {
                url: url.to_string(),
                scheme: other.to_owned(),
            }),
        }
    }
}

fn convert_reqwest_error(error: reqwest::Error, url: &str) -> TransportError {
    if let Some(status) = error.status() {
        return TransportError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    TransportError::Network {
        url: url.to_owned(),
        source: io::Error::new(kind, error),
    }
}
