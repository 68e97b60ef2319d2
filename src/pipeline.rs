//! End-to-end acquisition and normalization run.
//!
//! Stages run strictly in sequence; only the download stage is concurrent:
//!
//! 1. [`Pipeline::acquire_links`] - fetch the catalog page through its on-disk
//!    artifact and extract document links
//! 2. [`Pipeline::download`] - drive the downloader over every link
//! 3. [`Pipeline::reconcile`] - delete invalid documents, lowercase names
//!
//! [`Pipeline::run`] chains all three.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::catalog::{CatalogClient, CatalogError, extract_links, resolve_link};
use crate::config::PipelineConfig;
use crate::download::{
    Download, DownloadEngine, DownloadOutcome, DownloadStats, EngineError, HttpClient,
};
use crate::normalize::{Normalizer, ReconcileReport};

/// Errors that abort a pipeline run.
///
/// Individual download failures are not errors; they are reported in
/// [`PipelineReport::outcomes`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The catalog could not be fetched, persisted or parsed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The download coordinator could not be set up.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The reconciliation worker terminated abnormally.
    #[error("reconciliation task failed: {0}")]
    Reconcile(#[from] tokio::task::JoinError),
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct PipelineReport {
    /// Links extracted from the catalog.
    pub links: usize,
    /// One outcome per link.
    pub outcomes: Vec<DownloadOutcome>,
    /// Tally of `outcomes`.
    pub downloads: DownloadStats,
    /// Result of the reconciliation pass.
    pub reconcile: ReconcileReport,
}

impl PipelineReport {
    /// Returns true if any download failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.downloads.failed > 0
    }
}

/// Catalog-to-directory pipeline.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    normalizer: Arc<Normalizer>,
}

impl Pipeline {
    /// Creates a pipeline that validates documents as PDFs.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_normalizer(config, Normalizer::default())
    }

    /// Creates a pipeline with a custom reconciliation step.
    #[must_use]
    pub fn with_normalizer(config: PipelineConfig, normalizer: Normalizer) -> Self {
        Self {
            config,
            normalizer: Arc::new(normalizer),
        }
    }

    /// Returns the run configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage with the default HTTP downloader.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the catalog stage fails or the download
    /// stage cannot be set up. Failed downloads do not make this fail.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let client = HttpClient::new(&self.config.download)?;
        self.run_with(Arc::new(client)).await
    }

    /// Runs every stage with the given downloader.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn run_with(
        &self,
        downloader: Arc<dyn Download>,
    ) -> Result<PipelineReport, PipelineError> {
        let urls = self.acquire_links().await?;
        let links = urls.len();
        let outcomes = self.download(downloader, urls).await?;
        let reconcile = self.reconcile().await?;

        Ok(PipelineReport {
            links,
            downloads: DownloadStats::from_outcomes(&outcomes),
            outcomes,
            reconcile,
        })
    }

    /// Fetches the configured catalog page and returns absolute document URLs.
    ///
    /// The previous catalog artifact is deleted first, so the links always
    /// come from a fresh response. Relative links are resolved against the
    /// catalog endpoint; links that cannot be resolved are passed through
    /// unchanged and fail individually at download time.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Catalog`] on any catalog failure.
    #[instrument(skip(self), fields(page = self.config.page))]
    pub async fn acquire_links(&self) -> Result<Vec<String>, PipelineError> {
        let catalog = CatalogClient::new(&self.config.catalog)?;
        let page = catalog
            .fetch_to_file(self.config.page, &self.config.catalog_file)
            .await?;
        let links = extract_links(&page.body)?;

        let urls: Vec<String> = links
            .into_iter()
            .map(|link| match resolve_link(catalog.endpoint(), &link) {
                Ok(resolved) => resolved.to_string(),
                Err(e) => {
                    debug!(link = %link, error = %e, "could not resolve link");
                    link
                }
            })
            .collect();

        info!(links = urls.len(), "catalog links extracted");
        Ok(urls)
    }

    /// Downloads `urls` into the output directory through the bounded pool.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Engine`] if the configured concurrency is invalid.
    pub async fn download(
        &self,
        downloader: Arc<dyn Download>,
        urls: Vec<String>,
    ) -> Result<Vec<DownloadOutcome>, PipelineError> {
        let engine = DownloadEngine::new(self.config.download.concurrency)?;
        let outcomes = engine
            .run(downloader, urls, &self.config.output_dir)
            .await?;
        Ok(outcomes)
    }

    /// Reconciles the output directory on a blocking worker.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Reconcile`] if the blocking task panics.
    pub async fn reconcile(&self) -> Result<ReconcileReport, PipelineError> {
        let normalizer = Arc::clone(&self.normalizer);
        let output_dir = self.config.output_dir.clone();
        let report = tokio::task::spawn_blocking(move || normalizer.reconcile(&output_dir)).await?;
        Ok(report)
    }
}
