//! Listing service
//!
//! Answers one page-numbered listing request on top of the store's
//! cursor-only API. The count pass, the cursor scan and the final list call
//! are separate store calls, not a snapshot: objects written or deleted in
//! between can shift page boundaries or leave `total_pages` off by one for
//! that response.

use crate::config::SiteConfig;
use crate::storage::{ObjectStore, StorageResult};

use super::cursor::{PageCursorResolver, PageStart, SCAN_BATCH};
use super::types::{ImageItem, ListPage, ListRequest, ListScope};

pub struct ListingService<'a> {
    store: &'a dyn ObjectStore,
    site: &'a SiteConfig,
}

impl<'a> ListingService<'a> {
    pub fn new(store: &'a dyn ObjectStore, site: &'a SiteConfig) -> Self {
        Self { store, site }
    }

    /// Count every entry in `scope` by scanning it to the end.
    ///
    /// Linear in the size of the scope; there is no cached count.
    pub async fn count(&self, scope: &ListScope) -> StorageResult<u64> {
        let mut total = 0u64;
        let mut cursor: Option<String> = None;

        loop {
            let mut options = scope.options().with_max_keys(SCAN_BATCH as i32);
            if let Some(token) = cursor.take() {
                options = options.with_continuation_token(token);
            }

            let page = self.store.list(options).await?;
            total += page.entry_count() as u64;

            match page.continuation_token {
                Some(token) => cursor = Some(token),
                None => break,
            }
        }

        Ok(total)
    }

    pub async fn list(&self, request: ListRequest) -> StorageResult<ListPage> {
        let query = request.normalize();
        let scope = query.scope();

        let total_items = self.count(&scope).await?;
        let total_pages = total_items.div_ceil(u64::from(query.limit));

        let start = match query.cursor.clone() {
            Some(cursor) => PageStart::Cursor(cursor),
            None if query.page > 1 => {
                PageCursorResolver::new(self.store)
                    .resolve(query.skip(), &scope)
                    .await?
            }
            None => PageStart::First,
        };

        tracing::debug!(
            page = query.page,
            limit = query.limit,
            prefix = ?scope.prefix,
            total_items,
            start = ?start,
            "Listing objects"
        );

        let mut page = ListPage {
            items: Vec::new(),
            truncated: false,
            next_cursor: None,
            prefixes: Vec::new(),
            total_items,
            current_page: query.page,
            total_pages,
        };

        if start == PageStart::PastEnd {
            return Ok(page);
        }

        let mut options = scope.options().with_max_keys(query.limit as i32);
        if let Some(cursor) = start.cursor() {
            options = options.with_continuation_token(cursor);
        }

        let list = self.store.list(options).await?;

        page.items = list
            .objects
            .iter()
            .map(|object| ImageItem::from_metadata(object, self.site))
            .collect();
        page.truncated = list.is_truncated;
        page.next_cursor = list.continuation_token;
        page.prefixes = list.prefixes;

        Ok(page)
    }
}
