//! Batch upload into the object store

use chrono::Utc;

use crate::config::SiteConfig;
use crate::listing::ImageItem;
use crate::storage::{ObjectStore, PutOptions, StorageResult};

use super::types::{extension_for, object_key, UploadFile, UploadResult};

pub struct UploadService<'a> {
    store: &'a dyn ObjectStore,
    site: &'a SiteConfig,
}

impl<'a> UploadService<'a> {
    pub fn new(store: &'a dyn ObjectStore, site: &'a SiteConfig) -> Self {
        Self { store, site }
    }

    /// Store each supported file in order.
    ///
    /// Unsupported media types are reported in `errs` and skipped. A store
    /// failure aborts the remaining files; files written before it stay.
    pub async fn upload_batch(&self, files: Vec<UploadFile>) -> StorageResult<UploadResult> {
        let mut result = UploadResult::default();
        let mut errors = Vec::new();

        for file in files {
            let Some(extension) = extension_for(&file.content_type) else {
                tracing::debug!(
                    content_type = %file.content_type,
                    filename = ?file.filename,
                    "Rejecting unsupported upload"
                );
                errors.push(format!("{} not support.", file.content_type));
                continue;
            };

            let key = object_key(extension, Utc::now());
            let metadata = self
                .store
                .put(
                    &key,
                    file.data,
                    PutOptions {
                        content_type: Some(file.content_type.clone()),
                    },
                )
                .await?;

            tracing::info!(
                key = %metadata.key,
                size = metadata.size,
                filename = ?file.filename,
                "Image stored"
            );

            let mut item = ImageItem::from_metadata(&metadata, self.site);
            item.filename = file.filename;
            result.list.push(item);
        }

        result.errs = errors.join(",");
        Ok(result)
    }
}
