//! Followed-artist listing
//!
//! Walks the cursor-paginated listing to the end and materializes it for the
//! run. Page order and order within each page are preserved; the resulting
//! index is what the scan cursors point into.

use super::{CatalogClient, RateLimitExecutor};
use crate::error::CatalogError;
use crate::models::FollowedEntity;
use tracing::{debug, info};

pub struct EntityLister<'a> {
    client: &'a dyn CatalogClient,
    executor: &'a RateLimitExecutor,
    page_size: u32,
}

impl<'a> EntityLister<'a> {
    pub fn new(client: &'a dyn CatalogClient, executor: &'a RateLimitExecutor, page_size: u32) -> Self {
        Self {
            client,
            executor,
            page_size,
        }
    }

    /// Every followed artist, in upstream order
    pub async fn list_followed(&self) -> Result<Vec<FollowedEntity>, CatalogError> {
        let client = self.client;
        let page_size = self.page_size;
        let mut entities = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let after = cursor.as_deref();
            let page = self
                .executor
                .execute("list_followed", move || client.list_followed(after, page_size))
                .await?;
            pages += 1;

            debug!(page = pages, items = page.items.len(), "Fetched followed-artist page");
            entities.extend(page.items);

            match page.next_cursor {
                // A repeated cursor would loop forever
                Some(next) if Some(next.as_str()) != cursor.as_deref() => cursor = Some(next),
                _ => break,
            }
        }

        info!(artists = entities.len(), pages, "Followed artists listed");
        Ok(entities)
    }
}
