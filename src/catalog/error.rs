//! Error types for the catalog module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort catalog acquisition.
///
/// Any of these is fatal to a run: without a catalog there is no work to do.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network-level failure (DNS, connection refused, TLS).
    #[error("network error requesting catalog from {url}: {source}")]
    Network {
        /// The catalog endpoint.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The catalog request timed out.
    #[error("timeout requesting catalog from {url}")]
    Timeout {
        /// The catalog endpoint.
        url: String,
    },

    /// The service answered with a non-success status.
    #[error("HTTP {status} requesting catalog from {url}")]
    HttpStatus {
        /// The catalog endpoint.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body is not a JSON object.
    #[error("malformed catalog response: {reason}")]
    Malformed {
        /// What was wrong with the response.
        reason: String,
    },

    /// Reading, writing or removing the persisted catalog failed.
    #[error("IO error on catalog file {path}: {source}")]
    Io {
        /// The catalog artifact path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configured endpoint is not an absolute URL.
    #[error("invalid catalog endpoint: {url}")]
    InvalidEndpoint {
        /// The rejected endpoint string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build catalog HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl CatalogError {
    /// Creates a network error, promoting reqwest timeouts to [`CatalogError::Timeout`].
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Creates an IO error for the catalog artifact.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>) -> Self {
        Self::InvalidEndpoint { url: url.into() }
    }

    /// Returns true for connection-level failures (network or timeout).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }
}
