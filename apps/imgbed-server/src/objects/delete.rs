//! Object deletion
//!
//! The browser UI treats every delete as successful, so the default policy
//! logs store failures and carries on. `Strict` surfaces them instead.

use crate::storage::{ObjectStore, StorageResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Log store failures, report success
    #[default]
    BestEffort,
    /// Return the first store failure
    Strict,
}

impl DeletePolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            DeletePolicy::Strict
        } else {
            DeletePolicy::BestEffort
        }
    }
}

/// Split a comma-joined key list, dropping empty segments
pub fn split_keys(keys: &str) -> Vec<&str> {
    keys.split(',').filter(|key| !key.is_empty()).collect()
}

pub struct Deleter<'a> {
    store: &'a dyn ObjectStore,
    policy: DeletePolicy,
}

impl<'a> Deleter<'a> {
    pub fn new(store: &'a dyn ObjectStore, policy: DeletePolicy) -> Self {
        Self { store, policy }
    }

    pub async fn delete_one(&self, key: &str) -> StorageResult<()> {
        match self.store.delete(key).await {
            Ok(()) => {
                tracing::info!(key = %key, "Object deleted");
                Ok(())
            }
            Err(e) if self.policy == DeletePolicy::BestEffort => {
                tracing::warn!(key = %key, error = %e, "Image delete failed, ignoring");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Delete every key in a comma-joined list, one at a time.
    /// Returns how many keys were attempted.
    pub async fn delete_many(&self, keys: &str) -> StorageResult<usize> {
        let keys = split_keys(keys);
        for key in &keys {
            self.delete_one(key).await?;
        }
        Ok(keys.len())
    }
}
