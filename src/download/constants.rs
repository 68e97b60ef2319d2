//! Constants for the download module (timeouts, concurrency, file naming).

/// Per-download connect and per-read timeout (60 seconds).
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;

/// Default concurrency: the contract ceiling.
pub const DEFAULT_CONCURRENCY: usize = MAX_CONCURRENCY;

/// Canonical extension every saved document carries.
pub const CANONICAL_EXTENSION: &str = ".pdf";

/// Suffix appended to a target path while its body is still streaming.
pub const PARTIAL_SUFFIX: &str = ".part";
