//! Tests for cache lock files

use super::{LockError, acquire_lock};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[test]
fn test_acquire_creates_lock_file_and_parents() {
    let temp_dir = TempDir::new().unwrap();
    let lock_path = temp_dir.path().join("cache/files.lock");
    assert!(!lock_path.parent().unwrap().exists());

    let guard = acquire_lock(&lock_path, Duration::from_secs(5), "download").unwrap();

    assert!(lock_path.exists());
    assert_eq!(guard.path(), lock_path.as_path());
}

#[test]
fn test_held_lock_times_out_second_holder() {
    let temp_dir = TempDir::new().unwrap();
    let lock_path = temp_dir.path().join("files.lock");

    let holder_path = lock_path.clone();
    let barrier = Arc::new(Barrier::new(2));
    let holder_barrier = Arc::clone(&barrier);

    let holder = thread::spawn(move || {
        let _lock = acquire_lock(&holder_path, Duration::from_secs(5), "holder").unwrap();
        holder_barrier.wait();
        thread::sleep(Duration::from_millis(300));
    });

    barrier.wait();

    let start = Instant::now();
    let result = acquire_lock(&lock_path, Duration::from_millis(200), "waiter");

    assert!(
        matches!(result, Err(LockError::Timeout { .. })),
        "expected timeout, got {:?}",
        result
    );
    assert!(start.elapsed() >= Duration::from_millis(200));

    holder.join().unwrap();
}

#[test]
fn test_waiter_acquires_after_release() {
    let temp_dir = TempDir::new().unwrap();
    let lock_path = temp_dir.path().join("files.lock");

    let holder_path = lock_path.clone();
    let barrier = Arc::new(Barrier::new(2));
    let holder_barrier = Arc::clone(&barrier);

    let holder = thread::spawn(move || {
        let _lock = acquire_lock(&holder_path, Duration::from_secs(5), "holder").unwrap();
        holder_barrier.wait();
        thread::sleep(Duration::from_millis(150));
    });

    barrier.wait();

    let result = acquire_lock(&lock_path, Duration::from_secs(2), "waiter");
    assert!(result.is_ok(), "should acquire after holder releases: {:?}", result);

    holder.join().unwrap();
}

#[test]
fn test_lock_released_on_drop() {
    let temp_dir = TempDir::new().unwrap();
    let lock_path = temp_dir.path().join(".lock");

    {
        let _lock = acquire_lock(&lock_path, Duration::from_secs(5), "first").unwrap();
    }

    let result = acquire_lock(&lock_path, Duration::from_millis(50), "second");
    assert!(result.is_ok(), "lock should be free after drop: {:?}", result);
}

#[test]
fn test_timeout_message_names_description() {
    let temp_dir = TempDir::new().unwrap();
    let lock_path = temp_dir.path().join(".lock");

    let _held = acquire_lock(&lock_path, Duration::from_secs(5), "first").unwrap();
    let err = acquire_lock(&lock_path, Duration::from_millis(50), "fetch tool.jar").unwrap_err();

    assert!(err.to_string().contains("fetch tool.jar"));
}

#[test]
fn test_waiter_gives_up_at_deadline_not_after_backoff() {
    let temp_dir = TempDir::new().unwrap();
    let lock_path = temp_dir.path().join("files.lock");

    let holder_path = lock_path.clone();
    let barrier = Arc::new(Barrier::new(2));
    let holder_barrier = Arc::clone(&barrier);

    let holder = thread::spawn(move || {
        let _lock = acquire_lock(&holder_path, Duration::from_secs(5), "holder").unwrap();
        holder_barrier.wait();
        thread::sleep(Duration::from_millis(600));
    });

    barrier.wait();

    // 10+20+40+80 ms of backoff overshoots a 130 ms budget without a cap
    let start = Instant::now();
    let result = acquire_lock(&lock_path, Duration::from_millis(130), "waiter");
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(LockError::Timeout { .. })), "got {:?}", result);
    assert!(elapsed >= Duration::from_millis(130));
    assert!(elapsed < Duration::from_millis(450), "waited {:?}", elapsed);

    holder.join().unwrap();
}
