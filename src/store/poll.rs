//! Poll / reconciliation
//!
//! Brings the in-memory state in line with disk.
//!
//! ## Steps
//! 1. Primary snapshot present and store idle: enter the critical section as
//!    `"init"` and reload. An unreadable primary falls back to the cache
//!    snapshot (never on the first poll of a store), which is then copied
//!    over the primary.
//! 2. Primary absent: write the seed entries, if any.
//! 3. Failures: an unreadable primary and cache re-persist what is in
//!    memory; anything else applies the configured [`RecoveryPolicy`].
//! 4. Seed supplied and any seed uid missing: replay the whole seed list.

use crate::config::RecoveryPolicy;
use crate::error::{Result, StoreError};
use crate::lock::INIT_OPERATION_ID;
use crate::snapshot::{encode, StoreState};

use super::{CriticalSection, Inner, Payload, Seed};

impl<T: Payload> Inner<T> {
    /// One full reconciliation pass. Never fails; problems are logged and
    /// handled in place.
    pub(crate) fn poll(&self, seed: Option<&[Seed<T>]>) {
        store_debug!(self, "poll");

        let mut section = None;
        if let Err(e) = self.reconcile(seed, &mut section) {
            self.recover(e);
        }
        drop(section);

        if let Some(seed) = seed {
            self.ensure_seeded(seed);
        }
    }

    fn reconcile<'a>(
        &'a self,
        seed: Option<&[Seed<T>]>,
        section: &mut Option<CriticalSection<'a, T>>,
    ) -> Result<()> {
        if self.files.primary_exists() {
            match self.try_enter(INIT_OPERATION_ID)? {
                Some(entered) => {
                    *section = Some(entered);
                    if let Some(state) = self.load_snapshot()? {
                        *self.state.write() = state;
                    }
                }
                None => store_debug!(self, "store busy, skipping reload"),
            }
        } else if let Some(seed) = seed {
            store_debug!(self, entries = seed.len(), "no snapshot yet, seeding");
            for entry in seed {
                self.write(&entry.uid, &entry.data)?;
            }
        }

        Ok(())
    }

    /// Decode the primary snapshot, falling back to the cache
    ///
    /// `Ok(None)` keeps the current state: the primary is unreadable but no
    /// cache snapshot exists to fall back on.
    fn load_snapshot(&self) -> Result<Option<StoreState<T>>> {
        let primary_err = match self.files.read_primary::<T>() {
            Ok(state) => return Ok(Some(state)),
            Err(e) => e,
        };

        tracing::warn!(
            store = %self.config.name,
            path = %self.files.primary_path().display(),
            error = %primary_err,
            "Primary snapshot unreadable"
        );

        if !self.is_initialized() {
            return Err(StoreError::Decode(primary_err.to_string()));
        }

        if !self.files.cache_exists() {
            tracing::warn!(
                store = %self.config.name,
                "No cache snapshot to recover from, keeping in-memory state"
            );
            return Ok(None);
        }

        match self.files.read_cache::<T>() {
            Ok(state) => {
                self.files.promote_cache()?;
                tracing::info!(
                    store = %self.config.name,
                    entries = state.len(),
                    "Restored state from cache snapshot"
                );
                Ok(Some(state))
            }
            Err(cache_err) => Err(StoreError::Decode(format!(
                "primary: {}; cache: {}",
                primary_err, cache_err
            ))),
        }
    }

    fn recover(&self, err: StoreError) {
        if err.is_decode() {
            tracing::error!(
                store = %self.config.name,
                error = %err,
                "Snapshots unreadable, re-persisting in-memory state"
            );
            if let Err(e) = self.persist_primary() {
                tracing::error!(store = %self.config.name, error = %e, "Re-persist failed");
            }
            return;
        }

        let policy = self.config.recovery_policy;
        tracing::error!(
            store = %self.config.name,
            error = %err,
            policy = ?policy,
            "Poll failed"
        );

        match policy {
            RecoveryPolicy::ResetToEmpty => {
                *self.state.write() = StoreState::new();
            }
            RecoveryPolicy::ResetAndPersist => {
                *self.state.write() = StoreState::new();
                if let Err(e) = self.persist_primary() {
                    tracing::error!(store = %self.config.name, error = %e, "Persisting reset state failed");
                }
            }
            RecoveryPolicy::KeepCurrent => {}
        }
    }

    /// Replay every seed entry if any seed uid is missing
    fn ensure_seeded(&self, seed: &[Seed<T>]) {
        let missing = {
            let state = self.state.read();
            seed.iter().any(|entry| !state.data.contains_key(&entry.uid))
        };
        if !missing {
            return;
        }

        store_debug!(self, entries = seed.len(), "init data");
        for entry in seed {
            if let Err(e) = self.write(&entry.uid, &entry.data) {
                tracing::error!(
                    store = %self.config.name,
                    uid = %entry.uid,
                    error = %e,
                    "Seed write failed"
                );
            }
        }
    }

    /// Write the in-memory state straight to the primary file
    fn persist_primary(&self) -> Result<()> {
        let encoded = encode(&*self.state.read())?;
        self.files.write_primary(&encoded)
    }
}
