//! Catalog acquisition and link extraction.
//!
//! The catalog is a single JSON search endpoint that lists document metadata.
//! [`CatalogClient`] sends the fixed-shape search request for one page and
//! returns the raw body; [`extract_links`] turns that body into the ordered
//! list of document links.
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::catalog::{CatalogClient, extract_links};
//! use harvester_core::config::CatalogConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CatalogClient::new(&CatalogConfig::default())?;
//! let page = client.fetch(1).await?;
//! let links = extract_links(&page.body)?;
//! println!("{} documents listed", links.len());
//! # Ok(())
//! # }
//! ```

mod error;

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use error::CatalogError;

use crate::config::CatalogConfig;
use crate::user_agent;

/// One page of raw catalog data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    /// The 1-based page number that was requested.
    pub page: u32,
    /// The raw response body.
    pub body: String,
}

/// Search request payload sent to the catalog endpoint.
///
/// Field names and the page size are part of the external contract; only
/// `current_page` varies between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRequest {
    /// Free-text search term (always empty).
    pub query: String,
    /// Entries per page.
    pub page_size: u32,
    /// 1-based page number.
    pub current_page: u32,
    /// Facet filters (always empty).
    pub filters: Vec<String>,
    /// Sort key (always empty).
    pub sorting: String,
}

impl CatalogRequest {
    /// Builds the fixed request for the given page.
    #[must_use]
    pub fn for_page(page: u32, page_size: u32) -> Self {
        Self {
            query: String::new(),
            page_size,
            current_page: page,
            filters: Vec::new(),
            sorting: String::new(),
        }
    }
}

/// HTTP client for the document-search endpoint.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    endpoint: Url,
    page_size: u32,
}

impl CatalogClient {
    /// Creates a catalog client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] if the endpoint is not an
    /// absolute URL, or [`CatalogError::ClientBuild`] if the HTTP client
    /// cannot be constructed.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|_| CatalogError::invalid_endpoint(config.endpoint.clone()))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| CatalogError::ClientBuild { source })?;

        debug!(endpoint = %endpoint, page_size = config.page_size, "created catalog client");

        Ok(Self {
            client,
            endpoint,
            page_size: config.page_size,
        })
    }

    /// Returns the endpoint requests are sent to.
    ///
    /// Relative document links are resolved against this URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Requests one catalog page and returns the raw body.
    ///
    /// Performs exactly one request; there is no retry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Network`] or [`CatalogError::Timeout`] on
    /// transport failure and [`CatalogError::HttpStatus`] on a non-success
    /// response.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn fetch(&self, page: u32) -> Result<CatalogPage, CatalogError> {
        let request = CatalogRequest::for_page(page, self.page_size);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| CatalogError::transport(self.endpoint.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::http_status(
                self.endpoint.as_str(),
                status.as_u16(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::transport(self.endpoint.as_str(), e))?;

        info!(page, bytes = body.len(), "catalog page fetched");
        Ok(CatalogPage { page, body })
    }

    /// Fetches a page through the on-disk catalog artifact.
    ///
    /// Any existing file at `path` is removed first so a run never works from
    /// a stale catalog. The fresh body is written to `path` and read back.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`fetch`](Self::fetch), plus [`CatalogError::Io`]
    /// if the artifact cannot be removed, written or read.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn fetch_to_file(&self, page: u32, path: &Path) -> Result<CatalogPage, CatalogError> {
        remove_stale_artifact(path).await?;

        let fetched = self.fetch(page).await?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CatalogError::io(parent, e))?;
        }
        tokio::fs::write(path, fetched.body.as_bytes())
            .await
            .map_err(|e| CatalogError::io(path, e))?;
        debug!("catalog artifact written");

        let body = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CatalogError::io(path, e))?;
        Ok(CatalogPage { page, body })
    }
}

async fn remove_stale_artifact(path: &Path) -> Result<(), CatalogError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale catalog artifact");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CatalogError::io(path, e)),
    }
}

/// Extracts document links from a raw catalog body, preserving order.
///
/// Entries of the top-level `items` array without a usable `link` string are
/// skipped; a missing `items` field yields an empty list.
///
/// # Errors
///
/// Returns [`CatalogError::Malformed`] if the body is not valid JSON or its
/// top-level value is not an object.
pub fn extract_links(body: &str) -> Result<Vec<String>, CatalogError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| CatalogError::malformed(e.to_string()))?;

    let Some(object) = value.as_object() else {
        return Err(CatalogError::malformed("top-level value is not an object"));
    };

    let items = match object.get("items") {
        Some(Value::Array(items)) => items.as_slice(),
        Some(other) => {
            warn!(kind = json_kind(other), "catalog `items` is not an array; ignoring");
            return Ok(Vec::new());
        }
        None => {
            debug!("catalog response has no `items` field");
            return Ok(Vec::new());
        }
    };

    let links: Vec<String> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item.get("link") {
            Some(Value::String(link)) if !link.trim().is_empty() => Some(link.clone()),
            Some(_) => {
                debug!(index, "skipping catalog item with unusable link");
                None
            }
            None => None,
        })
        .collect();

    debug!(items = items.len(), links = links.len(), "extracted catalog links");
    Ok(links)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Resolves a document link against the catalog endpoint.
///
/// Absolute links are returned unchanged (modulo URL normalization);
/// relative links are joined onto `base`.
///
/// # Errors
///
/// Returns the [`url::ParseError`] if the link cannot be resolved.
pub fn resolve_link(base: &Url, link: &str) -> Result<Url, url::ParseError> {
    base.join(link.trim())
}
