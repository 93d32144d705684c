//! Snapshot files
//!
//! Each store owns two files in its directory: the primary snapshot and a
//! cache copy that is written first on every commit.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::Result;

use super::{decode, StoreState};

/// Suffix of the primary snapshot file: `{name}.store.db`
pub const PRIMARY_SUFFIX: &str = "store.db";

/// Suffix of the cache snapshot file: `{name}.cache.store.db`
pub const CACHE_SUFFIX: &str = "cache.store.db";

/// Locations of one store's snapshot files
#[derive(Debug, Clone)]
pub struct SnapshotFiles {
    primary: PathBuf,
    cache: PathBuf,
}

impl SnapshotFiles {
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            primary: dir.join(format!("{}.{}", name, PRIMARY_SUFFIX)),
            cache: dir.join(format!("{}.{}", name, CACHE_SUFFIX)),
        }
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache
    }

    pub fn primary_exists(&self) -> bool {
        self.primary.exists()
    }

    pub fn cache_exists(&self) -> bool {
        self.cache.exists()
    }

    /// Read and decode the primary snapshot
    pub fn read_primary<T: DeserializeOwned>(&self) -> Result<StoreState<T>> {
        Self::read_from(&self.primary)
    }

    /// Read and decode the cache snapshot
    pub fn read_cache<T: DeserializeOwned>(&self) -> Result<StoreState<T>> {
        Self::read_from(&self.cache)
    }

    pub fn write_primary(&self, encoded: &[u8]) -> Result<()> {
        fs::write(&self.primary, encoded)?;
        Ok(())
    }

    pub fn write_cache(&self, encoded: &[u8]) -> Result<()> {
        fs::write(&self.cache, encoded)?;
        Ok(())
    }

    /// Copy the cache snapshot over the primary one
    pub fn promote_cache(&self) -> Result<()> {
        fs::copy(&self.cache, &self.primary)?;
        Ok(())
    }

    fn read_from<T: DeserializeOwned>(path: &Path) -> Result<StoreState<T>> {
        let bytes = fs::read(path)?;
        decode(&bytes)
    }
}
