//! Filename derivation for downloaded documents.
//!
//! Every document lands on disk under a name derived only from its URL path:
//! percent-decoded, reduced to its last segment, scrubbed to
//! `[A-Za-z0-9_.-]`, and forced to the canonical `.pdf` extension. The mapping
//! is lossy on purpose; two URLs that scrub to the same name share one file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use url::Url;

use super::constants::{CANONICAL_EXTENSION, PARTIAL_SUFFIX};

/// Maps an arbitrary URL path segment to a safe local filename.
///
/// Steps, in order:
/// 1. percent-decode (invalid UTF-8 is replaced, not rejected)
/// 2. keep only the text after the last `/` or `\`
/// 3. drop everything from the last `.` onwards
/// 4. replace every character outside `[A-Za-z0-9_.-]` with `_`
/// 5. append `.pdf`
///
/// Never fails and never returns an empty base: an empty base becomes `_`.
/// Applying it to its own output is a no-op.
///
/// # Example
///
/// ```
/// use harvester_core::sanitize_filename;
///
/// assert_eq!(sanitize_filename("My%20File%20A.PDF"), "My_File_A.pdf");
/// assert_eq!(sanitize_filename("..%2F..%2Fetc%2Fpasswd"), "passwd.pdf");
/// ```
#[must_use]
pub fn sanitize_filename(raw: &str) -> String {
    let decoded = urlencoding::decode_binary(raw.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded);

    let name = decoded.rsplit(['/', '\\']).next().unwrap_or("");
    let base = name.rfind('.').map_or(name, |dot| &name[..dot]);

    let mut sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        sanitized.push('_');
    }
    sanitized.push_str(CANONICAL_EXTENSION);
    sanitized
}

/// Derives the local filename for a download URL from its last path segment.
pub(crate) fn filename_from_url(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");
    sanitize_filename(last)
}

/// Returns the lowercase sibling of `path` if its basename has uppercase characters.
///
/// Reconciliation renames documents to this path, so a download whose target
/// has uppercase characters is already present when the sibling exists.
pub(crate) fn lowercase_sibling(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    if !name.chars().any(char::is_uppercase) {
        return None;
    }
    Some(path.with_file_name(name.to_lowercase()))
}

static PARTIAL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Returns a fresh in-progress path for a body streaming to `target`.
///
/// Each call yields a distinct name (`<target>.<pid>.<n>.part`) so two
/// workers racing on the same target never write into one file; whichever
/// renames last wins.
pub(crate) fn partial_path(target: &Path) -> PathBuf {
    let n = PARTIAL_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = target.as_os_str().to_os_string();
    name.push(format!(".{}.{n}{PARTIAL_SUFFIX}", std::process::id()));
    PathBuf::from(name)
}
