//! Local file cache for direct download links
//!
//! Files live under `<cache_root>/files/`, named after the last path segment
//! of their URI. A cached file is served as-is unless the link is a local
//! `file:` URI or a `SNAPSHOT` artifact, which are fetched again on every
//! request.
//!
//! The cache itself holds no in-memory state; callers serialize access
//! through the resolution coordinator, and an advisory lock file next to
//! `files/` extends that exclusion to other processes sharing the root.

use crate::http::{self, DownloadError};
use depman_core::lock::{self, DEFAULT_LOCK_TIMEOUT};
use depman_core::{DepmanError, Result};
use percent_encoding::percent_decode_str;
use reqwest::blocking::Client;
use std::path::{Path, PathBuf};
use url::Url;

pub const FILES_CACHE_DIR: &str = "files";

const FILES_LOCK_NAME: &str = "files.lock";
const SNAPSHOT_MARKER: &str = "SNAPSHOT";

#[derive(Debug, Clone)]
pub struct FileCache {
    files_dir: PathBuf,
    lock_path: PathBuf,
    client: Client,
}

impl FileCache {
    pub fn new(cache_root: &Path, client: Client) -> Self {
        Self {
            files_dir: cache_root.join(FILES_CACHE_DIR),
            lock_path: cache_root.join(FILES_LOCK_NAME),
            client,
        }
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    /// Where `uri` is (or would be) cached.
    pub fn destination(&self, uri: &Url) -> Result<PathBuf> {
        Ok(self.files_dir.join(file_name(uri)?))
    }

    /// Returns the local path for `uri`, downloading it when it is not cached
    /// or must always be fetched fresh.
    pub fn resolve_direct(&self, uri: &Url) -> Result<PathBuf> {
        let dest = self.destination(uri)?;
        let fresh = must_fetch_fresh(uri);

        let _guard = lock::acquire_lock(
            &self.lock_path,
            DEFAULT_LOCK_TIMEOUT,
            &format!("fetch {uri}"),
        )?;

        if !fresh && dest.is_file() {
            tracing::debug!(%uri, path = %dest.display(), "file cache hit");
            return Ok(dest);
        }

        tracing::info!(%uri, path = %dest.display(), fresh, "downloading");
        let bytes = http::fetch_to_file(&self.client, uri, &dest).map_err(|e| download_failed(uri, e))?;
        tracing::debug!(%uri, bytes, "download complete");

        Ok(dest)
    }
}

fn download_failed(uri: &Url, error: DownloadError) -> DepmanError {
    DepmanError::DownloadFailed {
        uri: uri.to_string(),
        source: Box::new(error),
    }
}

/// Local files can change under the same name and snapshots are mutable by
/// definition, so neither is ever served from the cache.
pub fn must_fetch_fresh(uri: &Url) -> bool {
    uri.scheme().eq_ignore_ascii_case("file") || uri.path().contains(SNAPSHOT_MARKER)
}

/// Cache file name for `uri`: its decoded final path segment.
pub fn file_name(uri: &Url) -> Result<String> {
    let underivable = || DepmanError::FileNameUnderivable {
        uri: uri.to_string(),
    };

    let segment = uri
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .ok_or_else(underivable)?;

    let name = percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| underivable())?
        .into_owned();

    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(underivable());
    }

    Ok(name)
}
