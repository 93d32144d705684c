//! Store Module
//!
//! The façade that owns the in-memory state and composes the lock file and
//! snapshot files into `init`, `read`, `write` and `can_execute`.
//!
//! ## Concurrency Model
//!
//! - **Reads** are served from memory under a `parking_lot::RwLock` and may
//!   lag disk by up to one polling interval.
//! - **Writes and reloads** run inside a critical section: the in-process
//!   `executing` flag (compare-exchange, at most one holder per process)
//!   plus the directory's lock file (advisory across processes).
//! - **Polling** runs on one background thread started by `init` and
//!   stopped by `shutdown` or drop.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::lock::{LockFile, LockRecord};
use crate::snapshot::{SnapshotFiles, StoreState};

/// Debug diagnostics, emitted only when the store's debug flag is set
macro_rules! store_debug {
    ($inner:expr, $($arg:tt)+) => {
        if $inner.config.debug {
            tracing::debug!(store = %$inner.config.name, $($arg)+);
        }
    };
}

mod poll;
mod poller;
mod write;

pub use write::STALE_LOCK_THRESHOLD;

use poller::Poller;

/// Values a store can hold
pub trait Payload: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Payload for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// An entry applied on first run when the store has no snapshot yet
#[derive(Debug, Clone, PartialEq)]
pub struct Seed<T> {
    pub uid: String,
    pub data: T,
}

impl<T> Seed<T> {
    pub fn new(uid: impl Into<String>, data: T) -> Self {
        Self {
            uid: uid.into(),
            data,
        }
    }
}

/// A file-backed key-value store
///
/// ```no_run
/// use worsen::{Config, Seed, Store};
///
/// let store: Store<bool> = Store::open(Config::builder().name("app").build())?;
/// store.init(None, Some(&[Seed::new("AppInit", true)]))?;
/// assert_eq!(store.read("AppInit"), Some(true));
/// # Ok::<(), worsen::StoreError>(())
/// ```
pub struct Store<T: Payload> {
    inner: Arc<Inner<T>>,

    /// Background poller, present between `init` and `shutdown`
    poller: Mutex<Option<Poller>>,
}

/// State shared between the façade and the poller thread
pub(crate) struct Inner<T> {
    config: Config,
    files: SnapshotFiles,
    lock: LockFile,
    state: RwLock<StoreState<T>>,

    /// Set while this process runs a write or reload
    executing: AtomicBool,

    /// Set once the first poll of `init` has completed
    initialized: AtomicBool,

    /// Effective polling interval; `init` may override the configured one
    polling_interval_ms: AtomicU64,
}

/// Exclusive section: the executing flag plus the lock file
///
/// Both are released on drop.
pub(crate) struct CriticalSection<'a, T> {
    inner: &'a Inner<T>,
}

impl<'a, T> Drop for CriticalSection<'a, T> {
    fn drop(&mut self) {
        self.inner.lock.release();
        self.inner.executing.store(false, Ordering::SeqCst);
        store_debug!(self.inner, "lock removed");
    }
}

impl<T: Payload> Inner<T> {
    /// Enter the critical section if both the lock file and this process are
    /// idle. `Ok(None)` means contention.
    pub(crate) fn try_enter(&self, operation_id: &str) -> Result<Option<CriticalSection<'_, T>>> {
        if !self.lock.can_execute() {
            return Ok(None);
        }
        if self
            .executing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(None);
        }

        if let Err(e) = self.lock.acquire(operation_id) {
            self.executing.store(false, Ordering::SeqCst);
            return Err(e);
        }
        store_debug!(self, operation = operation_id, "locking");

        Ok(Some(CriticalSection { inner: self }))
    }

    /// Clear the lock file and the executing flag regardless of who holds them
    pub(crate) fn force_release(&self) {
        self.lock.release();
        self.executing.store(false, Ordering::SeqCst);
    }

    pub(crate) fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms.load(Ordering::SeqCst))
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

impl<T: Payload> Store<T> {
    /// Open a store with the given config
    ///
    /// Creates the data directory if it does not exist. Nothing is read from
    /// disk until `init` or `poll`.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let files = SnapshotFiles::new(&config.data_dir, &config.name);
        let lock = LockFile::new(&config.data_dir, config.name.as_str());
        let polling_interval_ms = duration_to_ms(config.polling_interval);

        let inner = Inner {
            config,
            files,
            lock,
            state: RwLock::new(StoreState::new()),
            executing: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            polling_interval_ms: AtomicU64::new(polling_interval_ms),
        };
        store_debug!(inner, data_dir = %inner.config.data_dir.display(), "store opened");

        Ok(Self {
            inner: Arc::new(inner),
            poller: Mutex::new(None),
        })
    }

    /// Open with a directory (convenience method)
    ///
    /// Uses the default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Load persisted state and start polling
    ///
    /// The first call runs one poll synchronously (seeding `seed` when the
    /// store has no snapshot yet) and then schedules a poll every
    /// `polling_interval`, defaulting to the configured one. Later calls are
    /// no-ops.
    pub fn init(&self, polling_interval: Option<Duration>, seed: Option<&[Seed<T>]>) -> Result<()> {
        let mut poller = self.poller.lock();

        if self.inner.is_initialized() {
            store_debug!(self.inner, "already initialized");
            return Ok(());
        }

        if let Some(interval) = polling_interval {
            if interval.is_zero() {
                return Err(StoreError::Config(
                    "polling interval must be greater than zero".to_string(),
                ));
            }
            self.inner
                .polling_interval_ms
                .store(duration_to_ms(interval), Ordering::SeqCst);
        }

        store_debug!(self.inner, "init");
        self.inner.poll(seed);

        *poller = Some(Poller::spawn(Arc::clone(&self.inner))?);
        self.inner.initialized.store(true, Ordering::SeqCst);

        store_debug!(self.inner, entries = self.inner.state.read().len(), "initialized");
        Ok(())
    }

    /// Read a value from memory
    ///
    /// Eventually consistent: a write from another process becomes visible
    /// after the next poll.
    pub fn read(&self, uid: &str) -> Option<T> {
        store_debug!(self.inner, uid, "read");
        self.inner.state.read().data.get(uid).cloned()
    }

    /// Store `data` under `uid` (a random hex id when `None`) and flush it
    ///
    /// Blocks while another operation holds the lock, retrying every half
    /// polling interval. Returns the uid written.
    pub fn write(&self, uid: Option<&str>, data: T) -> Result<String> {
        let uid = uid.map(str::to_string).unwrap_or_else(generate_uid);
        self.inner.write(&uid, &data)?;
        Ok(uid)
    }

    /// True iff no lock file exists in the store directory
    pub fn can_execute(&self) -> bool {
        self.inner.lock.can_execute()
    }

    /// Run one reconciliation pass now
    pub fn poll(&self) {
        self.inner.poll(None);
    }

    /// Copy of the in-memory state
    pub fn snapshot(&self) -> StoreState<T> {
        self.inner.state.read().clone()
    }

    /// Stop the background poller
    ///
    /// Waits for an in-flight poll to finish. The store stays usable for
    /// reads and writes; `init` will not restart polling.
    pub fn shutdown(&self) {
        if let Some(poller) = self.poller.lock().take() {
            poller.stop();
            store_debug!(self.inner, "poller stopped");
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn is_executing(&self) -> bool {
        self.inner.executing.load(Ordering::SeqCst)
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    /// Effective polling interval
    pub fn polling_interval(&self) -> Duration {
        self.inner.polling_interval()
    }

    /// Current lock holder, if the lock file is readable
    pub fn lock_holder(&self) -> Option<LockRecord> {
        self.inner.lock.read_record().ok()
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn primary_path(&self) -> &Path {
        self.inner.files.primary_path()
    }

    pub fn cache_path(&self) -> &Path {
        self.inner.files.cache_path()
    }

    pub fn lock_path(&self) -> &Path {
        self.inner.lock.path()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}

impl<T: Payload> Drop for Store<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// 16 random bytes, hex-encoded
fn generate_uid() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

fn duration_to_ms(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX).max(1)
}
