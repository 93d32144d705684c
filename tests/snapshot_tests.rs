//! Tests for the snapshot codec and snapshot files
//!
//! These tests verify:
//! - Round-trips of empty, ASCII and non-ASCII states
//! - Structured payloads survive encoding
//! - Corrupted, truncated and foreign input is rejected as a decode error
//! - Snapshot file naming and cache promotion

use std::fs;

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use worsen::snapshot::{decode, encode, SnapshotFiles};
use worsen::{StoreError, StoreState};

// =============================================================================
// Helper Functions
// =============================================================================

fn state_with(entries: &[(&str, &str)]) -> StoreState<String> {
    let mut state = StoreState::new();
    for (uid, value) in entries {
        state.data.insert(uid.to_string(), value.to_string());
    }
    state
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Access {
    root_access: bool,
    allowed_executions: Vec<String>,
}

// =============================================================================
// Codec Tests
// =============================================================================

#[test]
fn test_roundtrip_empty_state() {
    let state: StoreState<bool> = StoreState::new();

    let bytes = encode(&state).unwrap();
    let decoded: StoreState<bool> = decode(&bytes).unwrap();

    assert_eq!(decoded, state);
    assert!(decoded.is_empty());
}

#[test]
fn test_roundtrip_non_ascii_values() {
    let mut state = state_with(&[("greeting", "héllo wörld"), ("emoji", "🦀🔒"), ("日本", "東京")]);
    state.app_state.insert("locale".to_string(), "ja-JP".to_string());

    let decoded: StoreState<String> = decode(&encode(&state).unwrap()).unwrap();

    assert_eq!(decoded, state);
    assert_eq!(decoded.data.get("日本").map(String::as_str), Some("東京"));
}

#[test]
fn test_roundtrip_structured_payload() {
    let mut state = StoreState::new();
    state.data.insert(
        "admin".to_string(),
        Access {
            root_access: true,
            allowed_executions: vec!["Deploy".to_string(), "View Users".to_string()],
        },
    );

    let decoded: StoreState<Access> = decode(&encode(&state).unwrap()).unwrap();

    assert_eq!(decoded, state);
}

#[test]
fn test_encode_compresses_repetitive_state() {
    let mut state = StoreState::new();
    for i in 0..500 {
        state.data.insert(format!("key{:04}", i), "the same value every time".to_string());
    }
    let json_len = serde_json::to_vec(&state).unwrap().len();

    let bytes = encode(&state).unwrap();

    assert!(bytes.len() < json_len / 4);
}

#[test]
fn test_decode_accepts_missing_sections() {
    // A snapshot written without app_state still loads
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    std::io::Write::write_all(&mut encoder, br#"{"data":{"a":true}}"#).unwrap();
    let bytes = encoder.finish().unwrap();

    let decoded: StoreState<bool> = decode(&bytes).unwrap();

    assert!(decoded.app_state.is_empty());
    assert_eq!(decoded.data.get("a"), Some(&true));
}

// =============================================================================
// Decode Failure Tests
// =============================================================================

#[test]
fn test_decode_garbage_fails() {
    let result = decode::<bool>(b"definitely not a snapshot");

    assert!(matches!(result, Err(StoreError::Decode(_))));
}

#[test]
fn test_decode_empty_input_fails() {
    let result = decode::<bool>(&[]);

    assert!(matches!(result, Err(StoreError::Decode(_))));
}

#[test]
fn test_decode_truncated_snapshot_fails() {
    let state = state_with(&[("a", "1"), ("b", "2"), ("c", "3")]);
    let bytes = encode(&state).unwrap();

    let result = decode::<String>(&bytes[..bytes.len() / 2]);

    assert!(matches!(result, Err(StoreError::Decode(_))));
}

#[test]
fn test_decode_uncompressed_json_fails() {
    let json = serde_json::to_vec(&state_with(&[("a", "1")])).unwrap();

    let result = decode::<String>(&json);

    assert!(matches!(result, Err(StoreError::Decode(_))));
}

#[test]
fn test_decode_wrong_payload_type_fails() {
    let bytes = encode(&state_with(&[("a", "not a bool")])).unwrap();

    let result = decode::<bool>(&bytes);

    assert!(matches!(result, Err(StoreError::Decode(_))));
}

// =============================================================================
// Snapshot File Tests
// =============================================================================

#[test]
fn test_snapshot_file_names() {
    let temp = TempDir::new().unwrap();
    let files = SnapshotFiles::new(temp.path(), "sessions");

    assert_eq!(files.primary_path(), temp.path().join("sessions.store.db"));
    assert_eq!(files.cache_path(), temp.path().join("sessions.cache.store.db"));
    assert!(!files.primary_exists());
    assert!(!files.cache_exists());
}

#[test]
fn test_promote_cache_overwrites_primary() {
    let temp = TempDir::new().unwrap();
    let files = SnapshotFiles::new(temp.path(), "sessions");
    let state = state_with(&[("a", "cached")]);

    files.write_primary(b"garbage").unwrap();
    files.write_cache(&encode(&state).unwrap()).unwrap();
    files.promote_cache().unwrap();

    let restored: StoreState<String> = files.read_primary().unwrap();
    assert_eq!(restored, state);
    assert_eq!(fs::read(files.primary_path()).unwrap(), fs::read(files.cache_path()).unwrap());
}

#[test]
fn test_read_missing_primary_is_io_error() {
    let temp = TempDir::new().unwrap();
    let files = SnapshotFiles::new(temp.path(), "absent");

    let result = files.read_primary::<bool>();

    assert!(matches!(result, Err(StoreError::Io(_))));
}
