//! Byte-serving for stored objects
//!
//! Honors a single `Range` and the usual conditional headers. The status
//! follows the store's answer: a body for a honored range is 206, a full
//! body is 200, and an object whose body was withheld by a precondition is
//! 304 without `content-range`.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::{AppError, Result};
use crate::storage::{
    format_http_date, ByteRange, Conditions, GetOptions, ObjectStore, StoredObject,
};

/// A ready-to-send object response
#[derive(Debug)]
pub struct ObjectResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for ObjectResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, Body::from(self.body)).into_response()
    }
}

/// Read `key` using the range and preconditions found in `request_headers`
pub async fn fetch_object(
    store: &dyn ObjectStore,
    key: &str,
    request_headers: &HeaderMap,
) -> Result<ObjectResponse> {
    let range = request_headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(ByteRange::parse);

    let options = GetOptions {
        range,
        conditions: Conditions::from_headers(request_headers),
    };

    let object = store
        .get(key, options)
        .await?
        .ok_or_else(|| AppError::NotFound(key.to_string()))?;

    let response = shape_response(object);
    tracing::debug!(key = %key, status = %response.status, ?range, "Serving object");
    Ok(response)
}

fn shape_response(object: StoredObject) -> ObjectResponse {
    let metadata = &object.metadata;
    let mut headers = HeaderMap::new();

    let content_type = metadata.content_type.clone().unwrap_or_else(|| {
        mime_guess::from_path(&metadata.key)
            .first_or_octet_stream()
            .to_string()
    });
    insert(&mut headers, header::CONTENT_TYPE, &content_type);

    if let Some(etag) = metadata.http_etag() {
        insert(&mut headers, header::ETAG, &etag);
    }
    if let Some(modified) = &metadata.last_modified {
        insert(&mut headers, header::LAST_MODIFIED, &format_http_date(modified));
    }
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    let Some(body) = object.body else {
        return ObjectResponse {
            status: StatusCode::NOT_MODIFIED,
            headers,
            body: Bytes::new(),
        };
    };

    let status = match object.range {
        Some((start, end)) => {
            insert(
                &mut headers,
                header::CONTENT_RANGE,
                &format!("bytes {}-{}/{}", start, end, metadata.size),
            );
            StatusCode::PARTIAL_CONTENT
        }
        None => StatusCode::OK,
    };
    insert(&mut headers, header::CONTENT_LENGTH, &body.len().to_string());

    ObjectResponse {
        status,
        headers,
        body,
    }
}

fn insert(headers: &mut HeaderMap, name: header::HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, "Skipping header with invalid value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, PutOptions};

    async fn store_with_hundred_bytes() -> MemoryStore {
        let store = MemoryStore::new();
        let data: Vec<u8> = (0..100u8).collect();
        store
            .put(
                "pic.png",
                Bytes::from(data),
                PutOptions {
                    content_type: Some("image/png".to_string()),
                },
            )
            .await
            .unwrap();
        store
    }

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[tokio::test]
    async fn test_full_body() {
        let store = store_with_hundred_bytes().await;
        let response = fetch_object(&store, "pic.png", &HeaderMap::new()).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.len(), 100);
        assert_eq!(response.headers[header::CONTENT_TYPE], "image/png");
        assert!(response.headers.get(header::CONTENT_RANGE).is_none());
        assert!(response.headers.get(header::ETAG).is_some());
    }

    #[tokio::test]
    async fn test_range_request() {
        let store = store_with_hundred_bytes().await;
        let response = fetch_object(&store, "pic.png", &headers(&[(header::RANGE, "bytes=10-20")]))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers[header::CONTENT_RANGE], "bytes 10-20/100");
        assert_eq!(response.body.len(), 11);
        assert_eq!(response.body[0], 10);
    }

    #[tokio::test]
    async fn test_not_modified() {
        let store = store_with_hundred_bytes().await;
        let first = fetch_object(&store, "pic.png", &HeaderMap::new()).await.unwrap();
        let etag = first.headers[header::ETAG].to_str().unwrap().to_string();

        let response = fetch_object(
            &store,
            "pic.png",
            &headers(&[(header::IF_NONE_MATCH, etag.as_str()), (header::RANGE, "bytes=0-9")]),
        )
        .await
        .unwrap();

        assert_eq!(response.status, StatusCode::NOT_MODIFIED);
        assert!(response.body.is_empty());
        assert!(response.headers.get(header::CONTENT_RANGE).is_none());
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store = MemoryStore::new();
        let err = fetch_object(&store, "nope.png", &HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_range_serves_whole_object() {
        let store = store_with_hundred_bytes().await;
        let response = fetch_object(&store, "pic.png", &headers(&[(header::RANGE, "bytes=oops")]))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.len(), 100);
    }

    #[tokio::test]
    async fn test_guessed_content_type() {
        let store = MemoryStore::new();
        store
            .put("raw.jpg", Bytes::from_static(b"jpg"), PutOptions::default())
            .await
            .unwrap();
        let response = fetch_object(&store, "raw.jpg", &HeaderMap::new()).await.unwrap();
        assert_eq!(response.headers[header::CONTENT_TYPE], "image/jpeg");
    }
}
