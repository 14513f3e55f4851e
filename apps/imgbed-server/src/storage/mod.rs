//! Storage module for object-store backends
//!
//! Supports Cloudflare R2, MinIO, Backblaze B2 and AWS S3 through the S3 API,
//! plus a process-local store for development and tests.

mod memory;
mod s3_client;
mod types;

use std::sync::Arc;

use axum::body::Bytes;

use crate::config::{StorageConfig, StorageProvider};
use crate::error::{Result, StorageError};

pub use memory::MemoryStore;
pub use s3_client::S3Client;
pub use types::*;

/// Result type for store calls
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Largest page the stores hand out in one list call
pub const MAX_LIST_KEYS: i32 = 1000;

/// Trait for object-store backends.
///
/// Listing is forward-only: a continuation token is issued when the result
/// was truncated and is only meaningful for the same prefix and delimiter.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of objects
    async fn list(&self, options: ListOptions) -> StorageResult<ObjectList>;

    /// Read an object. `Ok(None)` when the key does not exist.
    async fn get(&self, key: &str, options: GetOptions) -> StorageResult<Option<StoredObject>>;

    /// Write an object, replacing any previous value
    async fn put(&self, key: &str, body: Bytes, options: PutOptions)
        -> StorageResult<ObjectMetadata>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}

/// Build the configured backend
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.provider {
        StorageProvider::Memory => {
            tracing::warn!("Using in-memory object store, uploads are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        _ => Ok(Arc::new(S3Client::new(config).await?)),
    }
}

/// Clamp a requested page size to what a backend accepts
pub(crate) fn effective_max_keys(max_keys: Option<i32>) -> i32 {
    match max_keys {
        Some(n) if n > 0 => n.min(MAX_LIST_KEYS),
        _ => MAX_LIST_KEYS,
    }
}
