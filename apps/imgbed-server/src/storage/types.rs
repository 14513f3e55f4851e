//! Storage types

use axum::body::Bytes;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about a storage object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    /// Entity tag without surrounding quotes
    pub etag: Option<String>,
}

impl ObjectMetadata {
    /// Quoted form suitable for the `ETag` header
    pub fn http_etag(&self) -> Option<String> {
        self.etag.as_ref().map(|e| format!("\"{}\"", e))
    }
}

/// An object returned by a get call.
///
/// `body` is `None` when a conditional header suppressed the payload
/// (the object exists but the client copy is current).
#[derive(Debug)]
pub struct StoredObject {
    pub metadata: ObjectMetadata,
    pub body: Option<Bytes>,
    /// Inclusive byte range actually served, when a range was honored
    pub range: Option<(u64, u64)>,
}

/// List of objects with optional continuation token
#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjectList {
    pub objects: Vec<ObjectMetadata>,
    pub prefixes: Vec<String>,
    pub continuation_token: Option<String>,
    pub is_truncated: bool,
}

impl ObjectList {
    /// Entries consumed from the enumeration: objects plus rolled-up prefixes
    pub fn entry_count(&self) -> usize {
        self.objects.len() + self.prefixes.len()
    }
}

/// Options for listing objects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub max_keys: Option<i32>,
    pub continuation_token: Option<String>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn with_max_keys(mut self, max_keys: i32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }

    pub fn with_continuation_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }
}

/// Options for writing an object
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub content_type: Option<String>,
}

/// Options for reading an object
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub range: Option<ByteRange>,
    pub conditions: Conditions,
}

// ============================================================================
// Byte ranges
// ============================================================================

/// A single HTTP byte range, parsed before the object size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=N-M`
    Bounded { offset: u64, end: u64 },
    /// `bytes=N-`
    From { offset: u64 },
    /// `bytes=-N`
    Suffix { length: u64 },
}

impl ByteRange {
    /// Parse a `Range` header value.
    ///
    /// Returns `None` for anything other than a single well-formed byte
    /// range; callers then serve the whole object.
    pub fn parse(value: &str) -> Option<Self> {
        let byte_set = value.trim().strip_prefix("bytes=")?.trim();
        if byte_set.contains(',') {
            return None;
        }

        let (start, end) = byte_set.split_once('-')?;
        let (start, end) = (start.trim(), end.trim());

        match (start.is_empty(), end.is_empty()) {
            (true, true) => None,
            (true, false) => {
                let length: u64 = end.parse().ok()?;
                (length > 0).then_some(ByteRange::Suffix { length })
            }
            (false, true) => Some(ByteRange::From {
                offset: start.parse().ok()?,
            }),
            (false, false) => {
                let offset: u64 = start.parse().ok()?;
                let end: u64 = end.parse().ok()?;
                (offset <= end).then_some(ByteRange::Bounded { offset, end })
            }
        }
    }

    /// Inclusive `(start, end)` within an object of `size` bytes, or `None`
    /// when the range cannot be satisfied.
    pub fn resolve(&self, size: u64) -> Option<(u64, u64)> {
        if size == 0 {
            return None;
        }
        match *self {
            ByteRange::Bounded { offset, end } if offset < size => Some((offset, end.min(size - 1))),
            ByteRange::From { offset } if offset < size => Some((offset, size - 1)),
            ByteRange::Suffix { length } => Some((size - length.min(size), size - 1)),
            _ => None,
        }
    }

    /// Header form, as sent to S3
    pub fn to_header(&self) -> String {
        match self {
            ByteRange::Bounded { offset, end } => format!("bytes={}-{}", offset, end),
            ByteRange::From { offset } => format!("bytes={}-", offset),
            ByteRange::Suffix { length } => format!("bytes=-{}", length),
        }
    }
}

// ============================================================================
// Conditional headers
// ============================================================================

/// Preconditions copied from the incoming request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<DateTime<Utc>>,
    pub if_unmodified_since: Option<DateTime<Utc>>,
}

impl Conditions {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let date = |name: header::HeaderName| text(name).and_then(|v| parse_http_date(&v));

        Self {
            if_match: text(header::IF_MATCH),
            if_none_match: text(header::IF_NONE_MATCH),
            if_modified_since: date(header::IF_MODIFIED_SINCE),
            if_unmodified_since: date(header::IF_UNMODIFIED_SINCE),
        }
    }

    /// Whether the body should be sent for an object with this metadata.
    /// A `false` result means the object exists but the payload is withheld.
    pub fn allows_body(&self, metadata: &ObjectMetadata) -> bool {
        let etag = metadata.etag.as_deref().unwrap_or_default();

        if let Some(if_match) = &self.if_match {
            if !etag_list_matches(if_match, etag) {
                return false;
            }
        }

        if let (Some(since), Some(modified)) = (self.if_unmodified_since, metadata.last_modified) {
            if modified.timestamp() > since.timestamp() {
                return false;
            }
        }

        if let Some(if_none_match) = &self.if_none_match {
            if etag_list_matches(if_none_match, etag) {
                return false;
            }
        } else if let (Some(since), Some(modified)) =
            (self.if_modified_since, metadata.last_modified)
        {
            if modified.timestamp() <= since.timestamp() {
                return false;
            }
        }

        true
    }
}

fn etag_list_matches(list: &str, etag: &str) -> bool {
    list.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.trim_start_matches("W/").trim_matches('"') == etag
    })
}

/// Parse an RFC 7231 HTTP-date such as `Wed, 21 Oct 2015 07:28:00 GMT`
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a timestamp as an HTTP-date
pub fn format_http_date(value: &DateTime<Utc>) -> String {
    value.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
