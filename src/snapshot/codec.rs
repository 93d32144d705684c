//! Snapshot codec
//!
//! `StoreState` ⇄ bytes. The state is serialized to JSON and the text is
//! compressed as a zlib stream. Decoding fails with
//! [`StoreError::Decode`] for anything that is not such a stream.

use std::io::{Read, Write};

use bytes::Bytes;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

use super::StoreState;

/// Encode a state into compressed snapshot bytes
pub fn encode<T: Serialize>(state: &StoreState<T>) -> Result<Bytes> {
    let json = serde_json::to_vec(state)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

    let mut encoder = ZlibEncoder::new(Vec::with_capacity(json.len() / 2), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    Ok(Bytes::from(compressed))
}

/// Decode compressed snapshot bytes back into a state
///
/// Truncated streams, foreign formats and invalid JSON all map to
/// `StoreError::Decode`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<StoreState<T>> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut json = Vec::new();
    decoder
        .read_to_end(&mut json)
        .map_err(|e| StoreError::Decode(format!("inflate failed: {}", e)))?;

    serde_json::from_slice(&json)
        .map_err(|e| StoreError::Decode(format!("invalid snapshot JSON: {}", e)))
}
