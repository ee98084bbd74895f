//! In-memory doubles for font fetching tests.
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::io::Write;

use async_trait::async_trait;
use camino::Utf8Path;
use url::Url;

use super::{FetchOutcome, FontSource, GlyphBuildError, GlyphBuilder, TransportError};

/// Stub [`FontSource`] serving fixed bytes behind a `Last-Modified` validator.
///
/// Requests carrying the current validator receive
/// [`FetchOutcome::NotModified`].
#[derive(Debug)]
pub struct StubFontSource {
    content: Vec<u8>,
    last_modified: RefCell<String>,
    fail_after: Option<usize>,
    requests: RefCell<Vec<Option<String>>>,
    served: Cell<usize>,
}

impl StubFontSource {
    /// Serve `content` with the validator `last_modified`.
    pub fn new(content: Vec<u8>, last_modified: impl Into<String>) -> Self {
        Self {
            content,
            last_modified: RefCell::new(last_modified.into()),
            fail_after: None,
            requests: RefCell::new(Vec::new()),
            served: Cell::new(0),
        }
    }

    /// Fail every download after writing the first `bytes` bytes.
    #[must_use]
    pub fn failing_after(mut self, bytes: usize) -> Self {
        self.fail_after = Some(bytes);
        self
    }

    /// Pretend the remote file changed.
    pub fn touch(&self, last_modified: impl Into<String>) {
        *self.last_modified.borrow_mut() = last_modified.into();
    }

    /// Validators received, one entry per request.
    pub fn requests(&self) -> Vec<Option<String>> {
        self.requests.borrow().clone()
    }

    /// Number of requests that transferred content.
    pub fn downloads(&self) -> usize {
        self.served.get()
    }
}

#[async_trait(?Send)]
impl FontSource for StubFontSource {
    async fn fetch(
        &self,
        url: &Url,
        if_modified_since: Option<&str>,
        sink: &mut dyn Write,
    ) -> Result<FetchOutcome, TransportError> {
        self.requests
            .borrow_mut()
            .push(if_modified_since.map(str::to_owned));
        let current = self.last_modified.borrow().clone();
        if if_modified_since == Some(current.as_str()) {
            return Ok(FetchOutcome::NotModified);
        }
        let network = |source| TransportError::Network {
            url: url.to_string(),
            source,
        };
        if let Some(limit) = self.fail_after {
            let partial = self.content.get(..limit).unwrap_or(&self.content);
            sink.write_all(partial).map_err(network)?;
            return Err(network(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by stub",
            )));
        }
        sink.write_all(&self.content).map_err(network)?;
        self.served.set(self.served.get() + 1);
        Ok(FetchOutcome::Modified {
            bytes: u64::try_from(self.content.len()).unwrap_or(u64::MAX),
            last_modified: Some(current),
        })
    }
}

/// [`GlyphBuilder`] that records its calls and writes one placeholder range.
#[derive(Debug, Default)]
pub struct RecordingGlyphBuilder {
    builds: Cell<usize>,
}

impl RecordingGlyphBuilder {
    /// Number of builds performed.
    pub fn builds(&self) -> usize {
        self.builds.get()
    }
}

impl GlyphBuilder for RecordingGlyphBuilder {
    fn build(&self, font: &Utf8Path, output_dir: &Utf8Path) -> Result<(), GlyphBuildError> {
        let placeholder = output_dir.join("0-255.pbf");
        spirit_fs::write(&placeholder, font.as_str()).map_err(|source| GlyphBuildError::Spawn {
            program: "recording".to_owned(),
            source,
        })?;
        self.builds.set(self.builds.get() + 1);
        Ok(())
    }
}

/// Drive a future to completion on a current-thread Tokio runtime.
///
/// # Panics
/// Panics when the runtime cannot be created.
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime.block_on(future),
        Err(err) => panic!("failed to create Tokio runtime: {err}"),
    }
}
