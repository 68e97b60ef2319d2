//! Concurrent document downloads streamed to disk.
//!
//! This module provides the per-URL downloader ([`HttpClient`]) and the
//! bounded coordinator that drives it across a batch ([`DownloadEngine`]).
//!
//! # Features
//!
//! - Streaming downloads (memory is bounded by chunk size, not file size)
//! - Skip-if-present: an existing target file means zero network I/O
//! - Atomic materialization: bodies stream into a private `*.part` file and are renamed
//!   into place only once complete
//! - Failures are values ([`DownloadOutcome::Failed`]), never batch-aborting errors
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use harvester_core::download::{DownloadEngine, HttpClient};
//! use harvester_core::config::DownloadConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DownloadConfig::default();
//! let client = Arc::new(HttpClient::new(&config)?);
//! let engine = DownloadEngine::new(config.concurrency)?;
//! let urls = vec!["https://example.com/sds/acetone.pdf".to_string()];
//! let outcomes = engine.run(client, urls, Path::new("./PDFs")).await?;
//! println!("{} outcomes", outcomes.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod engine;
mod error;
mod filename;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub use client::HttpClient;
pub use constants::{
    CANONICAL_EXTENSION, DEFAULT_CONCURRENCY, DOWNLOAD_TIMEOUT_SECS, MAX_CONCURRENCY,
    MIN_CONCURRENCY, PARTIAL_SUFFIX,
};
pub use engine::{DownloadEngine, DownloadStats, EngineError};
pub use error::DownloadError;
pub use filename::sanitize_filename;
pub(crate) use filename::lowercase_sibling;

// Note: no module-local Result alias. Use `Result<T, DownloadError>` explicitly.

/// Result of attempting one download.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The body was fetched and written to `path`.
    Saved {
        /// Source URL.
        url: String,
        /// Final file path.
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
    },
    /// A file already existed at `path`; nothing was fetched.
    SkippedExisting {
        /// Source URL.
        url: String,
        /// Existing file path.
        path: PathBuf,
    },
    /// The download failed; nothing was left at the target path.
    Failed {
        /// Source URL.
        url: String,
        /// Why it failed.
        reason: DownloadError,
    },
}

impl DownloadOutcome {
    /// Returns the source URL this outcome belongs to.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Saved { url, .. } | Self::SkippedExisting { url, .. } | Self::Failed { url, .. } => {
                url
            }
        }
    }

    /// Returns the local path for saved or skipped downloads.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Saved { path, .. } | Self::SkippedExisting { path, .. } => Some(path),
            Self::Failed { .. } => None,
        }
    }

    /// Returns true if this outcome is [`DownloadOutcome::Failed`].
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// A single-URL downloader that the coordinator can drive.
///
/// Implementations must fold every error into [`DownloadOutcome::Failed`]
/// instead of returning or panicking.
#[async_trait]
pub trait Download: Send + Sync {
    /// Materializes `url` as a file under `output_dir`.
    async fn download(&self, url: &str, output_dir: &Path) -> DownloadOutcome;
}
