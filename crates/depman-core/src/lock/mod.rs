//! Advisory file locks for a shared cache root
//!
//! The in-process mutex of the resolution coordinator only serializes callers
//! of one manager instance. A lock file under the cache root extends the same
//! exclusion to other processes pointed at the same directory.

use std::path::Path;
use std::time::Duration;

mod acquire;
mod error;
mod guard;

pub use error::LockError;
pub use guard::LockGuard;

#[cfg(test)]
mod tests;

/// Default time to wait for another process to release a cache lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(300);

/// Acquires an exclusive lock on `lock_path`, retrying with exponential
/// backoff until `timeout` elapses.
///
/// Parent directories are created as needed. The lock is released when the
/// returned guard is dropped.
///
/// # Examples
///
/// ```no_run
/// use depman_core::lock::acquire_lock;
/// use std::path::Path;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let guard = acquire_lock(Path::new("/tmp/depman-cache/files.lock"), Duration::from_secs(30), "fetch tool.jar")?;
/// // cache writes here
/// drop(guard);
/// # Ok(())
/// # }
/// ```
pub fn acquire_lock(
    lock_path: &Path,
    timeout: Duration,
    description: &str,
) -> Result<LockGuard, LockError> {
    acquire::acquire_with_retry(lock_path, timeout, description)
}
