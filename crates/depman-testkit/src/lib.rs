//! Test utilities for depman
//!
//! Shared helpers used by the test suites across the workspace.

mod env;

pub use env::{ENV_LOCK, with_config_env};

use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the current directory
///
/// Keeps scratch caches next to the crate under test so leftovers from an
/// aborted run are easy to find. Cleanup happens on drop.
///
/// # Panics
///
/// Panics if the current directory or the `.tmp/` directory is unavailable.
pub fn temp_dir_in_workspace() -> TempDir {
    let workspace_root = std::env::current_dir().expect("Failed to get current directory");
    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base).expect("Failed to create .tmp directory");
    TempDir::new_in(&tmp_base).expect("Failed to create temporary directory in .tmp/")
}

/// Writes `content` to `name` inside `dir` and returns the full path.
pub fn write_file(dir: &std::path::Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}
