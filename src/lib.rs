//! # worsen
//!
//! A local, file-backed key-value store for single-machine, multi-process use:
//! - Compressed JSON snapshots with a cache copy for corruption recovery
//! - Lock-file coordination between processes sharing a directory
//! - Polling reconciliation of in-memory state with disk
//! - Bounded write retry with a stale-lock override
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Store Façade                          │
//! │            init / read / write / can_execute                │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │   Write Path    │                │   Poll Loop     │
//!   │ (retry/backoff) │                │ (reconcile)     │
//!   └────────┬────────┘                └────────┬────────┘
//!            │                                  │
//!            └──────────────┬───────────────────┘
//!                           │
//!          ┌────────────────┴────────────────┐
//!          ▼                                 ▼
//!   ┌─────────────┐                  ┌───────────────┐
//!   │  Lock File  │                  │   Snapshots   │
//!   │ store.lock  │                  │ (zlib + JSON) │
//!   └─────────────┘                  └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod snapshot;
pub mod lock;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{Config, RecoveryPolicy};
pub use snapshot::StoreState;
pub use store::{Payload, Seed, Store, STALE_LOCK_THRESHOLD};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of worsen
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
