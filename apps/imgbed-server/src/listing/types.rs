//! Listing request and response types

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::SiteConfig;
use crate::storage::{ListOptions, ObjectMetadata};

// ============================================================================
// Constants
// ============================================================================

/// Page size when the client sends none (or zero)
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest page size a client may request
pub const MAX_LIMIT: u32 = 100;

/// Delimiter that keeps its hierarchy meaning; anything else is a prefix filter
pub const ROOT_DELIMITER: &str = "/";

// ============================================================================
// Request
// ============================================================================

/// Listing request as sent by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default, deserialize_with = "lenient_int")]
    pub limit: Option<i64>,

    #[serde(default)]
    pub delimiter: Option<String>,

    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,

    #[serde(default)]
    pub cursor: Option<String>,
}

/// Accept integers, fractional numbers (truncated, saturating) and numeric
/// strings, the way the browser UI may send them
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))),
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid number: {}", text)))
        }
        Some(other) => Err(de::Error::custom(format!("expected a number, got {}", other))),
    }
}

/// A listing request with defaults and clamps applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: u32,
    pub delimiter: String,
    pub page: u64,
    pub cursor: Option<String>,
}

impl ListRequest {
    pub fn normalize(self) -> PageQuery {
        let limit = match self.limit {
            None | Some(0) => DEFAULT_LIMIT,
            Some(n) => n.clamp(1, MAX_LIMIT as i64) as u32,
        };

        let delimiter = self
            .delimiter
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| ROOT_DELIMITER.to_string());

        let page = self.page.filter(|p| *p >= 1).unwrap_or(1) as u64;

        PageQuery {
            limit,
            delimiter,
            page,
            cursor: self.cursor.filter(|c| !c.is_empty()),
        }
    }
}

impl PageQuery {
    /// Items that precede the requested page, saturating for absurd pages
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(u64::from(self.limit))
    }

    pub fn scope(&self) -> ListScope {
        ListScope::from_delimiter(&self.delimiter)
    }
}

/// The `(prefix, delimiter)` enumeration a cursor belongs to.
///
/// Every store call made for one request goes through the same scope, so a
/// cursor is never carried across filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListScope {
    pub prefix: Option<String>,
    pub delimiter: String,
}

impl ListScope {
    pub fn from_delimiter(delimiter: &str) -> Self {
        let prefix = (delimiter != ROOT_DELIMITER).then(|| delimiter.to_string());
        Self {
            prefix,
            delimiter: delimiter.to_string(),
        }
    }

    /// Store options for this scope, without a cursor or page size
    pub fn options(&self) -> ListOptions {
        let options = ListOptions::new().with_delimiter(self.delimiter.clone());
        match &self.prefix {
            Some(prefix) => options.with_prefix(prefix.clone()),
            None => options,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// Public view of a stored image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageItem {
    /// Retrieval path served by this backend
    pub url: String,

    /// Absolute URL meant for copy and paste
    pub copy_url: String,

    pub key: String,

    pub size: i64,

    /// Original file name, set for freshly uploaded items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ImageItem {
    pub fn from_metadata(metadata: &ObjectMetadata, site: &SiteConfig) -> Self {
        Self {
            url: format!("/rest/{}", metadata.key),
            copy_url: site.copy_url_for(&metadata.key),
            key: metadata.key.clone(),
            size: metadata.size,
            filename: None,
        }
    }
}

/// One page of a listing with page-number totals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    #[serde(rename = "list")]
    pub items: Vec<ImageItem>,

    /// More entries follow this page
    #[serde(rename = "next")]
    pub truncated: bool,

    #[serde(rename = "cursor", default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,

    pub prefixes: Vec<String>,

    pub total_items: u64,

    pub current_page: u64,

    pub total_pages: u64,
}
