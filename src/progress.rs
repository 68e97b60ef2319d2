//! Progress bar decorator for download runs.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use harvester_core::{Download, DownloadOutcome};
use indicatif::{ProgressBar, ProgressStyle};

/// Wraps a downloader and advances a progress bar as each download finishes.
pub(crate) struct ProgressDownloader {
    inner: Arc<dyn Download>,
    bar: ProgressBar,
}

impl ProgressDownloader {
    /// Creates a decorator with a bar sized for `total` downloads.
    ///
    /// When `visible` is false the bar is hidden but still counts.
    pub(crate) fn new(inner: Arc<dyn Download>, total: usize, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { inner, bar }
    }

    /// Clears the bar from the terminal.
    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> u64 {
        self.bar.position()
    }
}

#[async_trait]
impl Download for ProgressDownloader {
    async fn download(&self, url: &str, output_dir: &Path) -> DownloadOutcome {
        let outcome = self.inner.download(url, output_dir).await;
        if let Some(name) = outcome.path().and_then(Path::file_name) {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }
        self.bar.inc(1);
        outcome
    }
}
