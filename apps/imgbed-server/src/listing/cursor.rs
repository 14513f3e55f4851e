//! Page cursor resolution
//!
//! The store can only move forward through a listing with opaque cursors.
//! To serve page `N` we walk the enumeration from the start, in batches of
//! at most [`SCAN_BATCH`] entries, until `(N - 1) * limit` entries have been
//! passed, and hand back the cursor the store issued at that point.

use crate::storage::{ObjectStore, StorageResult};

use super::types::ListScope;

/// Entries requested per store call while scanning
pub const SCAN_BATCH: u64 = 1000;

/// Where a page begins in the store's enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStart {
    /// The page starts at the beginning; no cursor needed
    First,
    /// Resume from this store cursor
    Cursor(String),
    /// The enumeration ended before the requested offset
    PastEnd,
}

impl PageStart {
    pub fn cursor(&self) -> Option<&str> {
        match self {
            PageStart::Cursor(cursor) => Some(cursor),
            _ => None,
        }
    }
}

/// Translates an item offset into a store cursor by scanning forward
pub struct PageCursorResolver<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> PageCursorResolver<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Resolve the start of the page that follows `skip` entries in `scope`.
    ///
    /// Issues at most `ceil(skip / SCAN_BATCH)` list calls. Each call asks for
    /// no more than the entries still to be skipped, so the returned cursor
    /// sits exactly at the offset when the store fills its pages.
    pub async fn resolve(&self, skip: u64, scope: &ListScope) -> StorageResult<PageStart> {
        let mut cursor: Option<String> = None;
        let mut skipped = 0u64;

        while skipped < skip {
            let batch = (skip - skipped).min(SCAN_BATCH);
            let mut options = scope.options().with_max_keys(batch as i32);
            if let Some(token) = cursor.take() {
                options = options.with_continuation_token(token);
            }

            let page = self.store.list(options).await?;
            skipped += page.entry_count() as u64;

            match page.continuation_token {
                Some(token) => cursor = Some(token),
                None => {
                    tracing::debug!(skip, skipped, "Listing exhausted before page offset");
                    return Ok(PageStart::PastEnd);
                }
            }
        }

        Ok(cursor.map_or(PageStart::First, PageStart::Cursor))
    }
}
