//! Download engine for bounded-concurrency batch downloads.
//!
//! This module provides the `DownloadEngine` which fans a batch of URLs out
//! across Tokio tasks, using a semaphore to cap how many are in flight.
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::download::{DownloadEngine, HttpClient};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DownloadEngine::new(10)?;
//! let client = Arc::new(HttpClient::with_timeout(60)?);
//! let urls = vec!["https://example.com/a.pdf".to_string()];
//! let outcomes = engine.run(client, urls, Path::new("./PDFs")).await?;
//! let stats = harvester_core::download::DownloadStats::from_outcomes(&outcomes);
//! println!("Saved: {}, Skipped: {}, Failed: {}", stats.saved, stats.skipped, stats.failed);
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use super::constants::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use super::{Download, DownloadError, DownloadOutcome};

/// Error type for download engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,

    /// The download HTTP client could not be constructed.
    #[error("failed to build download HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

/// Aggregate counts for one batch of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Downloads that wrote a new file.
    pub saved: usize,
    /// Downloads skipped because the file already existed.
    pub skipped: usize,
    /// Downloads that failed.
    pub failed: usize,
}

impl DownloadStats {
    /// Tallies a batch of outcomes.
    #[must_use]
    pub fn from_outcomes(outcomes: &[DownloadOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut stats, outcome| {
            match outcome {
                DownloadOutcome::Saved { .. } => stats.saved += 1,
                DownloadOutcome::SkippedExisting { .. } => stats.skipped += 1,
                DownloadOutcome::Failed { .. } => stats.failed += 1,
            }
            stats
        })
    }

    /// Returns the total number of outcomes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.saved + self.skipped + self.failed
    }
}

/// Coordinator that runs a batch of downloads through a bounded worker pool.
///
/// # Concurrency Model
///
/// - Each download runs in its own Tokio task
/// - A semaphore permit is acquired before spawning each download
/// - Permits are released automatically when downloads complete (RAII)
/// - A failing or panicking download yields a `Failed` outcome and never
///   cancels its siblings
#[derive(Debug)]
pub struct DownloadEngine {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured concurrency limit.
    concurrency: usize,
}

impl DownloadEngine {
    /// Creates a new download engine with the specified concurrency limit.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    ///
    /// # Example
    ///
    /// ```
    /// use harvester_core::download::DownloadEngine;
    ///
    /// let engine = DownloadEngine::new(10).unwrap();
    /// assert_eq!(engine.concurrency(), 10);
    /// ```
    #[instrument(level = "debug")]
    pub fn new(concurrency: usize) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(EngineError::InvalidConcurrency { value: concurrency });
        }

        debug!(concurrency, "creating download engine");

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Downloads every URL into `output_dir`, at most `concurrency` at a time.
    ///
    /// Returns once every URL has an outcome. Exactly one outcome is produced
    /// per submitted URL; their order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    ///
    /// Note: Individual download failures do NOT cause this method to error.
    /// They are reported as [`DownloadOutcome::Failed`].
    #[instrument(skip(self, downloader, urls), fields(output_dir = %output_dir.display(), targets = urls.len()))]
    pub async fn run(
        &self,
        downloader: Arc<dyn Download>,
        urls: Vec<String>,
        output_dir: &Path,
    ) -> Result<Vec<DownloadOutcome>, EngineError> {
        info!(concurrency = self.concurrency, "starting downloads");

        let mut handles = Vec::with_capacity(urls.len());
        for url in urls {
            // Blocks while `concurrency` downloads are in flight
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let downloader = Arc::clone(&downloader);
            let output_dir = output_dir.to_path_buf();
            let task_url = url.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                downloader.download(&task_url, &output_dir).await
            });
            handles.push((url, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (url, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    warn!(url = %url, error = %join_error, "download task aborted");
                    DownloadOutcome::Failed {
                        reason: DownloadError::task_aborted(url.clone(), join_error.to_string()),
                        url,
                    }
                }
            };
            outcomes.push(outcome);
        }

        let stats = DownloadStats::from_outcomes(&outcomes);
        info!(
            saved = stats.saved,
            skipped = stats.skipped,
            failed = stats.failed,
            "downloads finished"
        );
        Ok(outcomes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    /// Fake downloader that records how many calls overlap.
    #[derive(Default)]
    struct TrackingDownloader {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Download for TrackingDownloader {
        async fn download(&self, url: &str, output_dir: &Path) -> DownloadOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(20)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if url.contains("fail") {
                DownloadOutcome::Failed {
                    url: url.to_string(),
                    reason: DownloadError::http_status(url, 500),
                }
            } else {
                DownloadOutcome::Saved {
                    url: url.to_string(),
                    path: output_dir.join("x.pdf"),
                    bytes: 1,
                }
            }
        }
    }

    struct PanickingDownloader;

    #[async_trait]
    impl Download for PanickingDownloader {
        async fn download(&self, url: &str, output_dir: &Path) -> DownloadOutcome {
            assert!(!url.contains("boom"), "simulated worker crash");
            DownloadOutcome::SkippedExisting {
                url: url.to_string(),
                path: output_dir.join("x.pdf"),
            }
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://example.com/{i}.pdf")).collect()
    }

    #[test]
    fn test_engine_new_accepts_bounds() {
        assert_eq!(DownloadEngine::new(1).unwrap().concurrency(), 1);
        assert_eq!(DownloadEngine::new(100).unwrap().concurrency(), 100);
    }

    #[test]
    fn test_engine_new_rejects_zero_and_over_max() {
        assert!(matches!(
            DownloadEngine::new(0),
            Err(EngineError::InvalidConcurrency { value: 0 })
        ));
        assert!(matches!(
            DownloadEngine::new(101),
            Err(EngineError::InvalidConcurrency { value: 101 })
        ));
    }

    #[tokio::test]
    async fn test_run_never_exceeds_concurrency_ceiling() {
        let engine = DownloadEngine::new(3).unwrap();
        let downloader = Arc::new(TrackingDownloader::default());

        let outcomes = engine
            .run(downloader.clone(), urls(20), Path::new("/unused"))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 20);
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 20);
        let max = downloader.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "observed {max} downloads in flight");
        assert!(max >= 1);
    }

    #[tokio::test]
    async fn test_run_attempts_every_url_exactly_once() {
        let engine = DownloadEngine::new(4).unwrap();
        let downloader = Arc::new(TrackingDownloader::default());
        let submitted = urls(10);

        let outcomes = engine
            .run(downloader, submitted.clone(), Path::new("/unused"))
            .await
            .unwrap();

        let mut seen: Vec<&str> = outcomes.iter().map(DownloadOutcome::url).collect();
        seen.sort_unstable();
        let mut expected: Vec<&str> = submitted.iter().map(String::as_str).collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_run_isolates_failures() {
        let engine = DownloadEngine::new(2).unwrap();
        let downloader = Arc::new(TrackingDownloader::default());
        let batch = vec![
            "https://example.com/ok-1.pdf".to_string(),
            "https://example.com/fail.pdf".to_string(),
            "https://example.com/ok-2.pdf".to_string(),
        ];

        let outcomes = engine
            .run(downloader, batch, Path::new("/unused"))
            .await
            .unwrap();

        let stats = DownloadStats::from_outcomes(&outcomes);
        assert_eq!(stats, DownloadStats { saved: 2, skipped: 0, failed: 1 });
        assert_eq!(stats.total(), 3);
    }

    #[tokio::test]
    async fn test_run_turns_panicking_task_into_failed_outcome() {
        let engine = DownloadEngine::new(2).unwrap();
        let batch = vec![
            "https://example.com/boom.pdf".to_string(),
            "https://example.com/fine.pdf".to_string(),
        ];

        let outcomes = engine
            .run(Arc::new(PanickingDownloader), batch, Path::new("/unused"))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        let failed: Vec<_> = outcomes.iter().filter(|o| o.is_failed()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].url(), "https://example.com/boom.pdf");
        assert!(matches!(
            failed[0],
            DownloadOutcome::Failed {
                reason: DownloadError::TaskAborted { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_run_empty_batch_returns_no_outcomes() {
        let engine = DownloadEngine::new(5).unwrap();
        let outcomes = engine
            .run(Arc::new(TrackingDownloader::default()), Vec::new(), Path::new("/unused"))
            .await
            .unwrap();
        assert!(outcomes.is_empty());
    }
}
