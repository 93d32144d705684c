//! Lock Module
//!
//! File-existence mutual exclusion shared by every store in a directory.
//!
//! ## Protocol
//! ```text
//!   ┌────────┐  acquire(op)   ┌────────┐
//!   │  Free  │ ─────────────▶ │  Held  │
//!   │ (none) │ ◀───────────── │ record │
//!   └────────┘   release()    └────────┘
//! ```
//!
//! - **Free**: `store.lock` does not exist
//! - **Held**: `store.lock` exists and carries a [`LockRecord`]
//!
//! Acquisition is check-then-write, not create-exclusive: two processes that
//! both observe Free can both write the file, and the later write wins. The
//! lock is advisory. There is no expiry; a crashed holder leaves the lock
//! Held until a writer applies the stale-lock override.

mod record;
mod file_lock;

pub use record::LockRecord;
pub use file_lock::{LockFile, INIT_OPERATION_ID, LOCK_FILENAME};
