//! HTTP and file transfer helpers
//!
//! - client construction with user-agent and timeouts
//! - single best-effort fetch of a URL into a destination file, written
//!   atomically (temp file in the destination directory, then persist)

pub mod client;
pub mod download;

pub use client::{DEFAULT_TIMEOUT, USER_AGENT, build_client};
pub use download::{DownloadError, fetch_to_file};
