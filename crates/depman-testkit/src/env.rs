//! Environment isolation for configuration tests
//!
//! Configuration is read from process-wide environment variables, so tests
//! that set them must not run concurrently with each other.

use std::path::Path;
use std::sync::Mutex;

/// Serializes tests that modify environment variables
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

const REPOSITORIES_CFG_ENV: &str = "DEPMAN_REPOSITORIES_CFG";
const VERSIONS_CFG_ENV: &str = "DEPMAN_VERSIONS_CFG";

/// Runs `f` with the depman configuration variables set to the given paths
/// (or removed when `None`), restoring the previous values afterwards.
///
/// # Examples
///
/// ```no_run
/// use depman_testkit::with_config_env;
/// use std::path::Path;
///
/// with_config_env(Some(Path::new("/tmp/repos.json")), None, || {
///     // code that calls RepositoryConfig::from_env()
/// });
/// ```
pub fn with_config_env<F, R>(repositories: Option<&Path>, versions: Option<&Path>, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let original_repositories = std::env::var_os(REPOSITORIES_CFG_ENV);
    let original_versions = std::env::var_os(VERSIONS_CFG_ENV);

    // SAFETY: ENV_LOCK is held, so no other helper touches the environment.
    unsafe {
        set_or_remove(REPOSITORIES_CFG_ENV, repositories.map(Path::as_os_str));
        set_or_remove(VERSIONS_CFG_ENV, versions.map(Path::as_os_str));
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    // SAFETY: ENV_LOCK is still held.
    unsafe {
        set_or_remove(REPOSITORIES_CFG_ENV, original_repositories.as_deref());
        set_or_remove(VERSIONS_CFG_ENV, original_versions.as_deref());
    }

    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

unsafe fn set_or_remove(key: &str, value: Option<&std::ffi::OsStr>) {
    // SAFETY: callers hold ENV_LOCK.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}
