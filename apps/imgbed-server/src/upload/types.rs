//! Upload types and media-type allow-list

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::listing::ImageItem;

// ============================================================================
// Constants
// ============================================================================

/// Multipart field carrying the files
pub const FILES_FIELD: &str = "files";

/// Accepted media types and the extension their keys get
pub const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("image/bmp", "bmp"),
    ("image/x-icon", "ico"),
    ("image/vnd.microsoft.icon", "ico"),
    ("image/avif", "avif"),
    ("image/tiff", "tiff"),
];

// ============================================================================
// Types
// ============================================================================

/// One file taken from the multipart body
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Name the client gave the file
    pub filename: Option<String>,

    /// Declared media type, as sent
    pub content_type: String,

    pub data: Bytes,
}

/// Outcome of a batch upload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResult {
    /// Files that were stored
    pub list: Vec<ImageItem>,

    /// Comma-joined messages for rejected files, empty when all were stored
    pub errs: String,
}

// ============================================================================
// Helpers
// ============================================================================

/// Extension for an allowed media type, `None` when the type is rejected.
/// Parameters such as `; charset=` are ignored.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Storage key for a new upload: `<unix-millis>-<8 hex>.<ext>`
pub fn object_key(extension: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}.{}", now.timestamp_millis(), &suffix[..8], extension)
}
