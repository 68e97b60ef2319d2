//! Harvester Core Library
//!
//! This library acquires a catalog of document links from a remote search
//! service, downloads every referenced document concurrently, and reconciles
//! the destination directory so only structurally valid, lowercase-named
//! documents remain.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Catalog request, artifact persistence and link extraction
//! - [`config`] - Explicit configuration with contract defaults
//! - [`download`] - Filename sanitizing, streaming downloader and bounded coordinator
//! - [`validate`] - Pluggable structural validity predicate
//! - [`normalize`] - Post-download directory reconciliation
//! - [`pipeline`] - End-to-end run wiring the stages together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod download;
pub mod normalize;
pub mod pipeline;
pub mod validate;
mod user_agent;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use catalog::{CatalogClient, CatalogError, CatalogPage, extract_links, resolve_link};
pub use config::{CatalogConfig, DownloadConfig, PipelineConfig};
pub use download::{
    DEFAULT_CONCURRENCY, Download, DownloadEngine, DownloadError, DownloadOutcome, DownloadStats,
    EngineError, HttpClient, sanitize_filename,
};
pub use normalize::{Normalizer, ReconcileReport};
pub use pipeline::{Pipeline, PipelineError, PipelineReport};
pub use validate::{DocumentValidator, PdfValidator};
