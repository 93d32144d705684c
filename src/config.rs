//! Configuration for worsen
//!
//! Centralized configuration with sensible defaults. Everything here is
//! resolved once when a [`Store`](crate::Store) is opened; there is no
//! dynamic reconfiguration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Store name used when none is given
pub const DEFAULT_STORE_NAME: &str = "worsen";

/// Directory (relative to the working directory) used when none is given
pub const DEFAULT_DATA_DIR: &str = "db_dir";

/// Default period between reconciliation polls
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(10_000);

/// Environment variable that turns on debug diagnostics when set to `true`
pub const DEBUG_ENV_VAR: &str = "DEBUG_PERSISTENCE";

/// Main configuration for a store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Identity
    // -------------------------------------------------------------------------
    /// Logical store name. Distinguishes stores sharing a directory and is
    /// embedded in lock records as the owner.
    pub name: String,

    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the snapshot files and the shared lock file
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── {name}.store.db        (primary snapshot)
    ///     ├── {name}.cache.store.db  (cache snapshot)
    ///     └── store.lock             (one per directory)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Polling Configuration
    // -------------------------------------------------------------------------
    /// Period between reconciliation polls. Half of it is the write retry
    /// backoff.
    pub polling_interval: Duration,

    /// What a poll does with in-memory state after an unexpected failure
    pub recovery_policy: RecoveryPolicy,

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------
    /// Emit debug-level diagnostics for this store
    pub debug: bool,
}

/// Recovery applied when a poll fails for any reason other than an
/// unreadable snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryPolicy {
    /// Drop in-memory state, leave disk untouched
    #[default]
    ResetToEmpty,

    /// Drop in-memory state and write the empty state to the primary file
    ResetAndPersist,

    /// Keep whatever is in memory
    KeepCurrent,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: DEFAULT_STORE_NAME.to_string(),
            data_dir: default_data_dir(),
            polling_interval: DEFAULT_POLLING_INTERVAL,
            recovery_policy: RecoveryPolicy::default(),
            debug: debug_from_env(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the values a store cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(StoreError::Config("store name must not be empty".to_string()));
        }
        if self.name.contains(['/', '\\']) {
            return Err(StoreError::Config(format!(
                "store name must not contain path separators: {:?}",
                self.name
            )));
        }
        if self.polling_interval.is_zero() {
            return Err(StoreError::Config(
                "polling interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// `./db_dir`, resolved against the working directory when possible
fn default_data_dir() -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(DEFAULT_DATA_DIR))
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
}

fn debug_from_env() -> bool {
    std::env::var(DEBUG_ENV_VAR)
        .map(|value| value == "true")
        .unwrap_or(false)
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the polling interval
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.config.polling_interval = interval;
        self
    }

    /// Set the polling interval (in milliseconds)
    pub fn polling_interval_ms(mut self, ms: u64) -> Self {
        self.config.polling_interval = Duration::from_millis(ms);
        self
    }

    /// Set the recovery policy for unexpected poll failures
    pub fn recovery_policy(mut self, policy: RecoveryPolicy) -> Self {
        self.config.recovery_policy = policy;
        self
    }

    /// Override the debug flag (otherwise taken from `DEBUG_PERSISTENCE`)
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
