//! HTTP client wrapper for downloading documents.
//!
//! This module provides the `HttpClient` struct which handles streaming
//! downloads with skip-if-present semantics and atomic placement.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::engine::EngineError;
use super::error::DownloadError;
use super::filename::{filename_from_url, lowercase_sibling, partial_path};
use super::{Download, DownloadOutcome};
use crate::config::DownloadConfig;
use crate::user_agent;

/// HTTP client for downloading documents with streaming support.
///
/// This client is designed to be created once and shared across every
/// download in a batch, taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use harvester_core::download::{Download, HttpClient};
/// use harvester_core::config::DownloadConfig;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new(&DownloadConfig::default())?;
/// let outcome = client.download("https://example.com/file.pdf", Path::new("./PDFs")).await;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client using the configured per-download timeout.
    ///
    /// The timeout bounds both connection setup and every individual read,
    /// so a slow but steadily streaming body is not cut off.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(config: &DownloadConfig) -> Result<Self, EngineError> {
        Self::with_timeout(config.timeout_secs)
    }

    /// Creates a new HTTP client with an explicit timeout in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, EngineError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| EngineError::ClientBuild { source })?;
        Ok(Self { client })
    }

    /// Downloads `url` into `output_dir`, returning saved or skipped outcomes.
    ///
    /// Steps:
    /// 1. create `output_dir` (recursively, idempotent)
    /// 2. derive the target filename from the URL path
    /// 3. return [`DownloadOutcome::SkippedExisting`] if the target, or the
    ///    lowercase name reconciliation gives it, exists
    /// 4. stream the body into a private partial file, then rename it onto the target
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid or not HTTP(S)
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - Creating, writing or renaming on disk fails
    #[instrument(skip(self), fields(url = %url))]
    pub async fn try_download(
        &self,
        url: &str,
        output_dir: &Path,
    ) -> Result<DownloadOutcome, DownloadError> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| DownloadError::io(output_dir, e))?;

        let parsed_url = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
        if !matches!(parsed_url.scheme(), "http" | "https") {
            return Err(DownloadError::invalid_url(url));
        }

        let target = output_dir.join(filename_from_url(&parsed_url));
        if let Some(existing) = existing_copy(&target).await? {
            info!(path = %existing.display(), "skipped (already exists)");
            return Ok(DownloadOutcome::SkippedExisting {
                url: url.to_string(),
                path: existing,
            });
        }

        debug!(path = %target.display(), "starting download");

        let response = self
            .client
            .get(parsed_url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let partial = partial_path(&target);
        let bytes = match write_atomically(response, url, &partial, &target).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %partial.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };

        info!(path = %target.display(), bytes, "downloaded");
        Ok(DownloadOutcome::Saved {
            url: url.to_string(),
            path: target,
            bytes,
        })
    }
}

#[async_trait]
impl Download for HttpClient {
    async fn download(&self, url: &str, output_dir: &Path) -> DownloadOutcome {
        match self.try_download(url, output_dir).await {
            Ok(outcome) => outcome,
            Err(reason) => {
                warn!(url = %url, error = %reason, "download failed");
                DownloadOutcome::Failed {
                    url: url.to_string(),
                    reason,
                }
            }
        }
    }
}

/// Returns the path of an existing copy of `target`, if any.
///
/// Reconciliation lowercases document names after each run, so the lowercase
/// sibling counts as the same document.
async fn existing_copy(target: &Path) -> Result<Option<PathBuf>, DownloadError> {
    let candidates = std::iter::once(target.to_path_buf()).chain(lowercase_sibling(target));
    for candidate in candidates {
        let exists = tokio::fs::try_exists(&candidate)
            .await
            .map_err(|e| DownloadError::io(candidate.clone(), e))?;
        if exists {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

/// Streams the body into `partial`, then renames it onto `target`.
async fn write_atomically(
    response: reqwest::Response,
    url: &str,
    partial: &Path,
    target: &Path,
) -> Result<u64, DownloadError> {
    let mut file = File::create(partial)
        .await
        .map_err(|e| DownloadError::io(partial.to_path_buf(), e))?;

    let bytes = stream_to_file(&mut file, response, url, partial).await?;
    file.sync_all()
        .await
        .map_err(|e| DownloadError::io(partial.to_path_buf(), e))?;
    drop(file);

    tokio::fs::rename(partial, target)
        .await
        .map_err(|e| DownloadError::io(PathBuf::from(target), e))?;
    Ok(bytes)
}

/// Streams response body to file in chunks, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
