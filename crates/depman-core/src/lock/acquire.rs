//! Lock acquisition with retry and timeout

use super::{LockError, LockGuard};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(10);
const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);
const WAIT_NOTICE_THRESHOLD: Duration = Duration::from_secs(2);

/// Doubling retry delay, capped at [`MAX_RETRY_DELAY`].
struct Backoff {
    started: Instant,
    delay: Duration,
    noticed: bool,
}

impl Backoff {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            delay: INITIAL_RETRY_DELAY,
            noticed: false,
        }
    }

    /// Sleeps for the current delay, never past `timeout` since start.
    /// Returns false once the deadline has passed.
    fn wait(&mut self, timeout: Duration) -> bool {
        let remaining = timeout.saturating_sub(self.started.elapsed());
        if remaining.is_zero() {
            return false;
        }
        thread::sleep(self.delay.min(remaining));
        self.delay = (self.delay * 2).min(MAX_RETRY_DELAY);
        self.started.elapsed() < timeout
    }
}

pub(crate) fn acquire_with_retry(
    lock_path: &Path,
    timeout: Duration,
    description: &str,
) -> Result<LockGuard, LockError> {
    let io_error = |operation: &str, source: io::Error| LockError::Io {
        source,
        path: lock_path.to_path_buf(),
        operation: operation.to_string(),
    };

    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("create parent directories", e))?;
    }

    let mut backoff = Backoff::new();
    loop {
        let file = open_lock_file(lock_path).map_err(|e| io_error("open lock file", e))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                if backoff.noticed {
                    tracing::info!(path = %lock_path.display(), "cache lock acquired");
                }
                return Ok(LockGuard {
                    file,
                    path: lock_path.to_path_buf(),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                let waited = backoff.started.elapsed();
                if !backoff.noticed && waited >= WAIT_NOTICE_THRESHOLD {
                    tracing::info!(
                        path = %lock_path.display(),
                        description,
                        "waiting for cache lock held by another process"
                    );
                    backoff.noticed = true;
                }

                if !backoff.wait(timeout) {
                    return Err(LockError::Timeout {
                        path: lock_path.to_path_buf(),
                        description: description.to_string(),
                    });
                }
            }
            Err(e) => return Err(io_error("acquire lock", e)),
        }
    }
}

fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
}
