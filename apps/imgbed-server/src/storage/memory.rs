//! In-memory object store
//!
//! Keeps objects in an ordered map and mimics the listing behaviour of an
//! S3-style bucket: lexicographic order, delimiter roll-up into common
//! prefixes, and opaque continuation tokens.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Bytes;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use super::{
    effective_max_keys, GetOptions, ListOptions, ObjectList, ObjectMetadata, ObjectStore,
    PutOptions, StorageResult, StoredObject,
};
use crate::error::StorageError;

#[derive(Debug, Clone)]
struct MemoryObject {
    metadata: ObjectMetadata,
    data: Bytes,
}

/// Process-local object store
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<String, MemoryObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Whether a key exists
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }
}

fn encode_cursor(name: &str) -> String {
    URL_SAFE_NO_PAD.encode(name.as_bytes())
}

fn decode_cursor(token: &str) -> StorageResult<String> {
    URL_SAFE_NO_PAD
        .decode(token)
        .ok()
        .and_then(|raw| String::from_utf8(raw).ok())
        .ok_or_else(|| StorageError::InvalidCursor(token.to_string()))
}

fn compute_etag(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(&digest[..16])
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, options: ListOptions) -> StorageResult<ObjectList> {
        let limit = effective_max_keys(options.max_keys) as usize;
        let prefix = options.prefix.unwrap_or_default();
        let delimiter = options.delimiter.filter(|d| !d.is_empty());
        let after = options
            .continuation_token
            .as_deref()
            .map(decode_cursor)
            .transpose()?;

        let objects = self.objects.read().await;

        // Entry name -> object (None for a rolled-up prefix), in key order
        let mut entries: BTreeMap<String, Option<&MemoryObject>> = BTreeMap::new();
        for (key, object) in objects.range(prefix.clone()..) {
            if !key.starts_with(&prefix) {
                break;
            }
            let rest = &key[prefix.len()..];
            match delimiter.as_deref().and_then(|d| rest.find(d).map(|idx| idx + d.len())) {
                Some(cut) => {
                    entries.entry(key[..prefix.len() + cut].to_string()).or_insert(None);
                }
                None => {
                    entries.insert(key.clone(), Some(object));
                }
            }
        }

        let mut remaining = entries
            .into_iter()
            .filter(|(name, _)| after.as_deref().map_or(true, |after| name.as_str() > after));

        let mut result = ObjectList::default();
        let mut last = None;
        for (name, entry) in remaining.by_ref().take(limit) {
            match entry {
                Some(object) => result.objects.push(object.metadata.clone()),
                None => result.prefixes.push(name.clone()),
            }
            last = Some(name);
        }

        result.is_truncated = remaining.next().is_some();
        if result.is_truncated {
            result.continuation_token = last.as_deref().map(encode_cursor);
        }

        Ok(result)
    }

    async fn get(&self, key: &str, options: GetOptions) -> StorageResult<Option<StoredObject>> {
        let objects = self.objects.read().await;
        let Some(object) = objects.get(key) else {
            return Ok(None);
        };

        if !options.conditions.allows_body(&object.metadata) {
            return Ok(Some(StoredObject {
                metadata: object.metadata.clone(),
                body: None,
                range: None,
            }));
        }

        let (body, range) = match options.range {
            Some(range) => {
                let (start, end) = range
                    .resolve(object.data.len() as u64)
                    .ok_or_else(|| StorageError::InvalidRange(key.to_string()))?;
                (
                    object.data.slice(start as usize..=end as usize),
                    Some((start, end)),
                )
            }
            None => (object.data.clone(), None),
        };

        Ok(Some(StoredObject {
            metadata: object.metadata.clone(),
            body: Some(body),
            range,
        }))
    }

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        options: PutOptions,
    ) -> StorageResult<ObjectMetadata> {
        let metadata = ObjectMetadata {
            key: key.to_string(),
            size: body.len() as i64,
            last_modified: Some(Utc::now()),
            content_type: options.content_type,
            etag: Some(compute_etag(&body)),
        };

        self.objects.write().await.insert(
            key.to_string(),
            MemoryObject {
                metadata: metadata.clone(),
                data: body,
            },
        );

        Ok(metadata)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }
}
