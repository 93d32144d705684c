//! Lock record definitions

use serde::{Deserialize, Serialize};

/// Identity of the operation holding the lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Name of the store that took the lock
    pub owner_name: String,

    /// uid being written, or `"init"` for a poll
    pub operation_id: String,

    /// OS process id of the holder
    pub process_id: u32,
}

impl LockRecord {
    /// Record for an operation of the current process
    pub fn for_current_process(owner_name: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self {
            owner_name: owner_name.into(),
            operation_id: operation_id.into(),
            process_id: std::process::id(),
        }
    }
}
