//! Persisted store state

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The unit of persistence: everything a snapshot file holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreState<T> {
    /// Application-level string settings (reserved, may be empty)
    #[serde(default)]
    pub app_state: BTreeMap<String, String>,

    /// uid → payload
    #[serde(default = "empty_data")]
    pub data: BTreeMap<String, T>,
}

impl<T> StoreState<T> {
    /// Create an empty state
    pub fn new() -> Self {
        Self {
            app_state: BTreeMap::new(),
            data: BTreeMap::new(),
        }
    }

    /// Number of data entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when there are no data entries
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// `#[serde(default)]` here would demand `T: Default`
fn empty_data<T>() -> BTreeMap<String, T> {
    BTreeMap::new()
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self::new()
    }
}
