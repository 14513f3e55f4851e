//! S3-compatible storage client
//!
//! Wraps the AWS SDK for S3-compatible storage access.

use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{http::HttpResponse, Credentials, Region},
    error::SdkError,
    primitives::{ByteStream, DateTime as S3DateTime},
    Client,
};
use axum::body::Bytes;
use chrono::{DateTime, Utc};

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};

use super::{
    effective_max_keys, GetOptions, ListOptions, ObjectList, ObjectMetadata, ObjectStore,
    PutOptions, StorageResult, StoredObject,
};

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from configuration
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "imgbed",
        );

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| config.provider.default_region().to_string());

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO and other S3-compatible services
            .build();

        let client = Client::from_conf(s3_config);

        // Test connection by checking if bucket exists
        let bucket = config.bucket.clone();
        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    e
                );
            }
        }

        Ok(Self { client, bucket })
    }

    /// Get object metadata (HEAD request)
    pub async fn head_object(&self, key: &str) -> StorageResult<Option<ObjectMetadata>> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => Ok(Some(ObjectMetadata {
                key: key.to_string(),
                size: response.content_length().unwrap_or(0),
                last_modified: response.last_modified().and_then(to_chrono),
                content_type: response.content_type().map(|s| s.to_string()),
                etag: response.e_tag().map(unquote),
            })),
            Err(e) if http_status(&e) == Some(404) => Ok(None),
            Err(e) => Err(StorageError::SdkError(format!(
                "Failed to head object {}: {}",
                key, e
            ))),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Client {
    async fn list(&self, options: ListOptions) -> StorageResult<ObjectList> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(effective_max_keys(options.max_keys));

        if let Some(prefix) = options.prefix {
            request = request.prefix(prefix);
        }

        if let Some(delimiter) = options.delimiter {
            request = request.delimiter(delimiter);
        }

        if let Some(token) = options.continuation_token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to list objects: {}", e)))?;

        let objects: Vec<ObjectMetadata> = response
            .contents()
            .iter()
            .map(|obj| ObjectMetadata {
                key: obj.key().unwrap_or_default().to_string(),
                size: obj.size().unwrap_or(0),
                last_modified: obj.last_modified().and_then(to_chrono),
                content_type: None, // Not available in list response
                etag: obj.e_tag().map(unquote),
            })
            .collect();

        let prefixes: Vec<String> = response
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(|s| s.to_string()))
            .collect();

        let is_truncated = response.is_truncated().unwrap_or(false);

        Ok(ObjectList {
            objects,
            prefixes,
            continuation_token: response
                .next_continuation_token()
                .filter(|_| is_truncated)
                .map(|s| s.to_string()),
            is_truncated,
        })
    }

    async fn get(&self, key: &str, options: GetOptions) -> StorageResult<Option<StoredObject>> {
        let mut request = self.client.get_object().bucket(&self.bucket).key(key);

        if let Some(range) = &options.range {
            request = request.range(range.to_header());
        }

        let conditions = &options.conditions;
        if let Some(value) = &conditions.if_match {
            request = request.if_match(value);
        }
        if let Some(value) = &conditions.if_none_match {
            request = request.if_none_match(value);
        }
        if let Some(value) = conditions.if_modified_since {
            request = request.if_modified_since(S3DateTime::from_secs(value.timestamp()));
        }
        if let Some(value) = conditions.if_unmodified_since {
            request = request.if_unmodified_since(S3DateTime::from_secs(value.timestamp()));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return match http_status(&e) {
                    Some(404) => Ok(None),
                    // Precondition matched: the object exists, the body is withheld
                    Some(304) | Some(412) => Ok(self.head_object(key).await?.map(|metadata| {
                        StoredObject {
                            metadata,
                            body: None,
                            range: None,
                        }
                    })),
                    Some(416) => Err(StorageError::InvalidRange(key.to_string())),
                    _ => Err(StorageError::SdkError(format!(
                        "Failed to get object {}: {}",
                        key, e
                    ))),
                };
            }
        };

        let content_range = response.content_range().and_then(parse_content_range);
        let size = content_range
            .map(|(_, _, total)| total as i64)
            .or(response.content_length())
            .unwrap_or(0);

        let metadata = ObjectMetadata {
            key: key.to_string(),
            size,
            last_modified: response.last_modified().and_then(to_chrono),
            content_type: response.content_type().map(|s| s.to_string()),
            etag: response.e_tag().map(unquote),
        };

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to read object body: {}", e)))?
            .into_bytes();

        Ok(Some(StoredObject {
            metadata,
            body: Some(body),
            range: content_range.map(|(start, end, _)| (start, end)),
        }))
    }

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        options: PutOptions,
    ) -> StorageResult<ObjectMetadata> {
        let size = body.len() as i64;

        let response = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_length(size)
            .set_content_type(options.content_type.clone())
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to put object {}: {}", key, e)))?;

        Ok(ObjectMetadata {
            key: key.to_string(),
            size,
            last_modified: Some(Utc::now()),
            content_type: options.content_type,
            etag: response.e_tag().map(unquote),
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                StorageError::SdkError(format!("Failed to delete object {}: {}", key, e))
            })?;

        Ok(())
    }
}

fn http_status<E>(error: &SdkError<E, HttpResponse>) -> Option<u16> {
    error.raw_response().map(|response| response.status().as_u16())
}

fn to_chrono(dt: &S3DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

fn unquote(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

/// Parse `bytes 10-20/100` into `(10, 20, 100)`
fn parse_content_range(value: &str) -> Option<(u64, u64, u64)> {
    let rest = value.trim().strip_prefix("bytes ")?;
    let (span, total) = rest.split_once('/')?;
    let (start, end) = span.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()?, total.parse().ok()?))
}
