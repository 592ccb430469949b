//! HTTP retrieval of the build indicator and archive.
//!
//! Provides a trait-based abstraction over the two network fetches the
//! pipeline performs, enabling dependency injection for testing. The
//! production implementation uses `ureq` with a shared agent and a global
//! request timeout.

use crate::error::{FetchError, Result};
use crate::progress::ProgressReporter;
use camino::Utf8Path;
use std::io::{Read, Write};
use std::sync::OnceLock;
use std::time::Duration;

/// Default root URL of the WebKitGTK nightly build archive.
pub const DEFAULT_BASE_URL: &str = "https://webkitgtk-canary.igalia.com";

/// Network timeout applied to every request.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Chunk size for streaming the archive body to disk.
const CHUNK_SIZE: usize = 8192;

/// Trait for fetching nightly build resources.
///
/// Abstraction allows tests to exercise the pipeline without network
/// access.
#[cfg_attr(test, mockall::automock)]
pub trait BuildDownloader {
    /// Fetch a small text resource (the build indicator) and return its
    /// body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::BuildNotFound`] when the resource is absent
    /// and [`FetchError::Download`] for any other transfer failure.
    fn fetch_indicator(&self, url: &str) -> Result<String>;

    /// Download the archive at `url` into `dest`, overwriting any
    /// existing file and reporting progress after each chunk.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Download`] if the transfer cannot complete
    /// and [`FetchError::Io`] if the destination cannot be written.
    fn download_archive(
        &self,
        url: &str,
        dest: &Utf8Path,
        progress: &mut dyn ProgressReporter,
    ) -> Result<()>;
}

/// HTTP-based downloader using `ureq`.
pub struct HttpDownloader;

impl BuildDownloader for HttpDownloader {
    fn fetch_indicator(&self, url: &str) -> Result<String> {
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        response
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::Download {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    fn download_archive(
        &self,
        url: &str,
        dest: &Utf8Path,
        progress: &mut dyn ProgressReporter,
    ) -> Result<()> {
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let total = content_length(response.headers());

        let mut file = std::fs::File::create(dest.as_std_path())?;
        let mut body = response.into_body();
        let mut reader = body.as_reader();
        let mut buffer = [0u8; CHUNK_SIZE];
        let mut received: u64 = 0;

        progress.on_progress(0, total);
        loop {
            let bytes_read = reader.read(&mut buffer).map_err(|e| FetchError::Download {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
            if bytes_read == 0 {
                break;
            }
            file.write_all(&buffer[..bytes_read])?;
            received += bytes_read as u64;
            progress.on_progress(received, total);
        }
        Ok(())
    }
}

/// Join a base URL and path segments with single slashes.
#[must_use]
pub fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_owned();
    for segment in segments {
        url.push('/');
        url.push_str(segment);
    }
    url
}

/// Parse the `Content-Length` header when the server sent one.
fn content_length(headers: &ureq::http::HeaderMap) -> Option<u64> {
    headers
        .get(ureq::http::header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`FetchError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> FetchError {
    match err {
        ureq::Error::StatusCode(404) => FetchError::BuildNotFound {
            url: url.to_owned(),
        },
        other => FetchError::Download {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
