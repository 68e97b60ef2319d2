//! Explicit run configuration.
//!
//! Every value that the external contract fixes (endpoint, page size,
//! concurrency ceiling, timeouts, artifact and output locations) lives here
//! with a documented default. Components receive the relevant struct at
//! construction time instead of reading module-level state.

use std::path::PathBuf;

use crate::download::{DEFAULT_CONCURRENCY, DOWNLOAD_TIMEOUT_SECS};

/// Default document-search endpoint.
pub const DEFAULT_CATALOG_ENDPOINT: &str =
    "https://api.cytivalifesciences.com/ap-doc-search/v1/sds-document";

/// Default number of catalog entries requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 5000;

/// Default catalog connect timeout (30 seconds).
pub const DEFAULT_CATALOG_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default catalog read timeout (60 seconds).
pub const DEFAULT_CATALOG_READ_TIMEOUT_SECS: u64 = 60;

/// Default file the raw catalog response is persisted to.
pub const DEFAULT_CATALOG_FILE: &str = "main.json";

/// Default destination directory for downloaded documents.
pub const DEFAULT_OUTPUT_DIR: &str = "./PDFs";

/// Settings for the catalog client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Absolute URL of the document-search endpoint.
    pub endpoint: String,
    /// Entries requested per page.
    pub page_size: u32,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CATALOG_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            connect_timeout_secs: DEFAULT_CATALOG_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_CATALOG_READ_TIMEOUT_SECS,
        }
    }
}

/// Settings for the download coordinator and the downloader it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Maximum number of downloads in flight (1-100).
    pub concurrency: usize,
    /// Per-download connect and per-read timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

/// Full configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Catalog client settings.
    pub catalog: CatalogConfig,
    /// Download settings.
    pub download: DownloadConfig,
    /// 1-based catalog page to request.
    pub page: u32,
    /// Destination directory for documents.
    pub output_dir: PathBuf,
    /// File the raw catalog response is persisted to.
    pub catalog_file: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            download: DownloadConfig::default(),
            page: 1,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            catalog_file: PathBuf::from(DEFAULT_CATALOG_FILE),
        }
    }
}
