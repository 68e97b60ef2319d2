//! Structural validity checks for downloaded documents.
//!
//! Validation answers one question: does the file open as the target format
//! and contain at least one page? It is a total predicate; unreadable,
//! truncated or garbage files simply report `false`.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use lopdf::Document;
use tracing::debug;

/// Pluggable structural validity predicate.
///
/// Implementations must never panic or return errors; every failure to open
/// or inspect a file is a negative result.
pub trait DocumentValidator: Send + Sync {
    /// Returns true if `path` is a structurally valid document.
    fn is_valid(&self, path: &Path) -> bool;
}

/// Validates PDF files: the document must parse and report at least one page.
///
/// The parser reads the whole file into memory while checking it, so peak
/// memory during reconciliation is the size of the largest document. Files
/// are checked one at a time, never concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfValidator;

impl PdfValidator {
    /// Creates a PDF validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the number of pages, or `None` if the file cannot be opened.
    #[must_use]
    pub fn page_count(path: &Path) -> Option<usize> {
        // The parser can panic on some malformed inputs; treat that as unreadable.
        let loaded = catch_unwind(AssertUnwindSafe(|| Document::load(path)));
        match loaded {
            Ok(Ok(document)) => Some(document.get_pages().len()),
            Ok(Err(e)) => {
                debug!(path = %path.display(), error = %e, "failed to open PDF");
                None
            }
            Err(_) => {
                debug!(path = %path.display(), "PDF parser panicked");
                None
            }
        }
    }
}

impl DocumentValidator for PdfValidator {
    fn is_valid(&self, path: &Path) -> bool {
        match Self::page_count(path) {
            Some(0) => {
                debug!(path = %path.display(), "PDF has no pages");
                false
            }
            Some(_) => true,
            None => false,
        }
    }
}
