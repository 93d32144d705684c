//! Tests for the lock file protocol
//!
//! These tests verify:
//! - Free/Held transitions via acquire and release
//! - The record written on acquire (owner, operation, pid)
//! - Release of an absent lock is a no-op
//! - Unreadable records are reported, not panicked on

use std::fs;

use tempfile::TempDir;
use worsen::lock::{LockFile, LockRecord, INIT_OPERATION_ID, LOCK_FILENAME};
use worsen::StoreError;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_lock(owner: &str) -> (TempDir, LockFile) {
    let temp_dir = TempDir::new().unwrap();
    let lock = LockFile::new(temp_dir.path(), owner);
    (temp_dir, lock)
}

// =============================================================================
// State Transition Tests
// =============================================================================

#[test]
fn test_lock_starts_free() {
    let (temp, lock) = setup_temp_lock("worsen");

    assert!(lock.can_execute());
    assert_eq!(lock.path(), temp.path().join(LOCK_FILENAME));
}

#[test]
fn test_acquire_then_release() {
    let (_temp, lock) = setup_temp_lock("worsen");

    lock.acquire("some-uid").unwrap();
    assert!(!lock.can_execute());
    assert!(lock.path().exists());

    lock.release();
    assert!(lock.can_execute());
    assert!(!lock.path().exists());
}

#[test]
fn test_release_when_free_is_noop() {
    let (_temp, lock) = setup_temp_lock("worsen");

    lock.release();
    lock.release();

    assert!(lock.can_execute());
}

#[test]
fn test_lock_is_shared_per_directory() {
    let temp = TempDir::new().unwrap();
    let users = LockFile::new(temp.path(), "users");
    let sessions = LockFile::new(temp.path(), "sessions");

    users.acquire("u1").unwrap();

    assert!(!sessions.can_execute());
    assert_eq!(sessions.read_record().unwrap().owner_name, "users");

    sessions.release();
    assert!(users.can_execute());
}

#[test]
fn test_acquire_does_not_check_existing_lock() {
    let (_temp, lock) = setup_temp_lock("worsen");
    let other = LockFile::new(lock.path().parent().unwrap(), "other");

    other.acquire("first").unwrap();
    lock.acquire("second").unwrap();

    // Last writer wins: acquisition is advisory
    let record = lock.read_record().unwrap();
    assert_eq!(record.owner_name, "worsen");
    assert_eq!(record.operation_id, "second");
}

// =============================================================================
// Record Tests
// =============================================================================

#[test]
fn test_record_contents() {
    let (_temp, lock) = setup_temp_lock("sessions");

    lock.acquire(INIT_OPERATION_ID).unwrap();
    let record = lock.read_record().unwrap();

    assert_eq!(
        record,
        LockRecord {
            owner_name: "sessions".to_string(),
            operation_id: "init".to_string(),
            process_id: std::process::id(),
        }
    );
}

#[test]
fn test_record_is_json_with_expected_fields() {
    let (_temp, lock) = setup_temp_lock("sessions");

    lock.acquire("abc").unwrap();
    let raw: serde_json::Value = serde_json::from_slice(&fs::read(lock.path()).unwrap()).unwrap();

    assert_eq!(raw["owner_name"], "sessions");
    assert_eq!(raw["operation_id"], "abc");
    assert_eq!(raw["process_id"], std::process::id());
}

#[test]
fn test_read_record_when_free_fails() {
    let (_temp, lock) = setup_temp_lock("worsen");

    let result = lock.read_record();

    assert!(matches!(result, Err(StoreError::LockRecord(_))));
}

#[test]
fn test_read_record_garbage_fails() {
    let (_temp, lock) = setup_temp_lock("worsen");
    fs::write(lock.path(), b"\x00\x01 not json").unwrap();

    let result = lock.read_record();

    assert!(matches!(result, Err(StoreError::LockRecord(_))));
    assert!(!lock.can_execute());
}
