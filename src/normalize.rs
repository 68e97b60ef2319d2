//! Post-download reconciliation of the destination directory.
//!
//! After the concurrent phase, [`Normalizer::reconcile`] walks the directory
//! tree once and, for every document file:
//! 1. deletes it if the validator rejects it
//! 2. otherwise renames it to its lowercase basename if it has uppercase characters
//!
//! Leftover `*.part` files from an interrupted run are removed as well. A
//! directory that is already valid and lowercase is left untouched.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::download::{CANONICAL_EXTENSION, PARTIAL_SUFFIX, lowercase_sibling};
use crate::validate::{DocumentValidator, PdfValidator};

/// Counts produced by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Document files inspected by the validator.
    pub checked: usize,
    /// Invalid documents deleted.
    pub removed: usize,
    /// Documents renamed to lowercase.
    pub renamed: usize,
    /// Stale partial downloads deleted.
    pub partials_removed: usize,
    /// Delete or rename operations that failed.
    pub errors: usize,
}

/// Reconciles a directory against a validity predicate and lowercase naming.
pub struct Normalizer {
    validator: Box<dyn DocumentValidator>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(PdfValidator::new())
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

impl Normalizer {
    /// Creates a normalizer that uses `validator` to decide which files stay.
    pub fn new(validator: impl DocumentValidator + 'static) -> Self {
        Self {
            validator: Box::new(validator),
        }
    }

    /// Deletes invalid documents and lowercases the names of the rest.
    ///
    /// Recurses into subdirectories; directory names are never changed.
    /// Individual delete or rename failures are logged and counted in
    /// [`ReconcileReport::errors`], they do not stop the pass.
    ///
    /// This does blocking filesystem work; call it from a blocking context.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn reconcile(&self, dir: &Path) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for path in collect_files(dir) {
            if is_partial(&path) {
                match std::fs::remove_file(&path) {
                    Ok(()) => {
                        debug!(path = %path.display(), "removed stale partial download");
                        report.partials_removed += 1;
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to remove partial download");
                        report.errors += 1;
                    }
                }
                continue;
            }

            if !is_document(&path) {
                continue;
            }

            report.checked += 1;
            if !self.validator.is_valid(&path) {
                match std::fs::remove_file(&path) {
                    Ok(()) => {
                        info!(path = %path.display(), "removed invalid document");
                        report.removed += 1;
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to remove invalid document");
                        report.errors += 1;
                    }
                }
                continue;
            }

            let Some(lowercase) = lowercase_sibling(&path) else {
                continue;
            };
            if lowercase.exists() {
                // On case-insensitive filesystems this is the same file.
                warn!(from = %path.display(), to = %lowercase.display(), "lowercase name already taken; overwriting");
            }
            match std::fs::rename(&path, &lowercase) {
                Ok(()) => {
                    debug!(from = %path.display(), to = %lowercase.display(), "renamed to lowercase");
                    report.renamed += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to rename document");
                    report.errors += 1;
                }
            }
        }

        info!(
            checked = report.checked,
            removed = report.removed,
            renamed = report.renamed,
            partials_removed = report.partials_removed,
            "reconciliation finished"
        );
        report
    }
}

/// Lists regular files under `dir`, recursively. Unreadable entries are skipped.
fn collect_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn is_document(path: &Path) -> bool {
    let wanted = CANONICAL_EXTENSION.trim_start_matches('.');
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| name.ends_with(PARTIAL_SUFFIX))
}
