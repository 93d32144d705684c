//! Snapshot Module
//!
//! Whole-state persistence: the in-memory mapping is written to disk as a
//! single compressed blob.
//!
//! ## Responsibilities
//! - Define the persisted [`StoreState`]
//! - Encode/decode snapshots (JSON text, zlib-compressed)
//! - Locate and read/write the primary and cache snapshot files
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ zlib stream                            │
//! │ ┌────────────────────────────────────┐ │
//! │ │ {"app_state": {...},               │ │
//! │ │  "data": {"<uid>": <payload>, ...}}│ │
//! │ └────────────────────────────────────┘ │
//! └────────────────────────────────────────┘
//! ```

mod state;
mod codec;
mod files;

pub use state::StoreState;
pub use codec::{encode, decode};
pub use files::{SnapshotFiles, PRIMARY_SUFFIX, CACHE_SUFFIX};
