//! Enumerates rendered list items.

use std::sync::Arc;

use async_trait::async_trait;
use listwalk_core::{InteractionError, ItemScanner};
use tracing::trace;

use super::{CdpListItem, ItemSelectors};
use crate::cdp::PageSession;

/// Object group holding the handles of the latest scan.
const SCAN_GROUP: &str = "listwalk-scan";

/// Scans the page for elements matching the item selector.
///
/// Each scan releases the handles of the previous one; the traversal never
/// holds a handle across scans.
pub struct CdpScanner {
    session: Arc<PageSession>,
    item_selector: String,
    selectors: Arc<ItemSelectors>,
}

impl CdpScanner {
    pub fn new(
        session: Arc<PageSession>,
        item_selector: impl Into<String>,
        selectors: ItemSelectors,
    ) -> Self {
        Self {
            session,
            item_selector: item_selector.into(),
            selectors: Arc::new(selectors),
        }
    }

    pub fn item_selector(&self) -> &str {
        &self.item_selector
    }
}

#[async_trait]
impl ItemScanner for CdpScanner {
    type Item = CdpListItem;

    async fn scan(&self) -> Result<Vec<CdpListItem>, InteractionError> {
        self.session.release_object_group(SCAN_GROUP).await;

        let ids = self
            .session
            .query_all_handles(&self.item_selector, Some(SCAN_GROUP))
            .await?;
        trace!("Scan found {} items for {}", ids.len(), self.item_selector);

        Ok(ids
            .into_iter()
            .map(|id| CdpListItem::new(self.session.clone(), id, self.selectors.clone()))
            .collect())
    }
}
