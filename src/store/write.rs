//! Write path
//!
//! Commit one entry under the lock, retrying with backoff while the lock is
//! held elsewhere.
//!
//! ## Retry State Machine
//! ```text
//!            ┌──────────────┐ entered  ┌──────────┐
//!   start ──▶│  try_commit  │─────────▶│  done    │
//!            └──────┬───────┘          └──────────┘
//!                   │ contended
//!                   ▼
//!        attempt > STALE_LOCK_THRESHOLD ?
//!           │ no                    │ yes
//!           ▼                       ▼
//!   sleep(interval / 2)      read lock record
//!   attempt += 1              ├─ same owner  → clear, attempt = 0
//!                             ├─ unreadable  → clear, attempt += 1
//!                             └─ other owner → sleep, attempt += 1
//! ```

use std::thread;
use std::time::Duration;

use crate::error::Result;
use crate::snapshot::encode;

use super::{Inner, Payload};

/// Contended attempts tolerated before the lock is presumed stale
pub const STALE_LOCK_THRESHOLD: u32 = 12;

impl<T: Payload> Inner<T> {
    /// Commit `data` under `uid`, waiting out contention
    ///
    /// Loops until the commit lands. A lock held by a live store with a
    /// different name keeps this waiting indefinitely.
    pub(crate) fn write(&self, uid: &str, data: &T) -> Result<()> {
        let mut attempt: u32 = 0;

        loop {
            if self.try_commit(uid, data)? {
                return Ok(());
            }

            store_debug!(self, uid, attempt, "retry write");

            if attempt > STALE_LOCK_THRESHOLD {
                match self.lock.read_record() {
                    Ok(record) if record.owner_name == self.config.name => {
                        tracing::warn!(
                            store = %self.config.name,
                            uid,
                            holder_pid = record.process_id,
                            holder_operation = %record.operation_id,
                            "Overriding stale lock held under this store's name"
                        );
                        self.force_release();
                        attempt = 0;
                        continue;
                    }
                    Ok(record) => {
                        store_debug!(
                            self,
                            uid,
                            holder = %record.owner_name,
                            holder_pid = record.process_id,
                            "lock held by another store, waiting"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            store = %self.config.name,
                            uid,
                            attempt,
                            error = %e,
                            "Starved on unreadable lock, overriding unsafely"
                        );
                        self.force_release();
                        attempt = attempt.saturating_add(1);
                        continue;
                    }
                }
            }

            thread::sleep(self.retry_backoff());
            attempt = attempt.saturating_add(1);
        }
    }

    /// One attempt: `Ok(false)` when the critical section is unavailable
    ///
    /// Order on disk: cache snapshot, primary snapshot, then the cache copied
    /// over the primary. If the primary write is torn the cache still holds
    /// the committed state.
    fn try_commit(&self, uid: &str, data: &T) -> Result<bool> {
        let Some(_section) = self.try_enter(uid)? else {
            return Ok(false);
        };
        store_debug!(self, uid, "write started");

        let encoded = {
            let mut state = self.state.write();
            state.data.insert(uid.to_string(), data.clone());
            encode(&*state)?
        };

        self.files.write_cache(&encoded)?;
        self.files.write_primary(&encoded)?;
        self.files.promote_cache()?;

        Ok(true)
    }

    /// Half the polling interval
    fn retry_backoff(&self) -> Duration {
        self.polling_interval() / 2
    }
}
