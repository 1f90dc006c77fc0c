//! BrowserManager page lookup and navigation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::cdp::{PageInfo, PageSession};
use super::{BrowserError, BrowserManager};

impl BrowserManager {
    /// Open `url`, reusing a tab that already shows the same site and path.
    pub async fn open_page(&self, url: &str) -> Result<Arc<PageSession>, BrowserError> {
        self.connect().await?;
        let client = self.client().await?;
        let target = Url::parse(url).map_err(|e| BrowserError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let existing = client.list_pages().await?;
        let session = match Self::find_matching_page(&existing, &target) {
            Some(page) => {
                info!("Reusing open tab {} ({})", page.id, page.url);
                let session = client.attach_page(&page.id).await?;
                session.wait_for_load().await?;
                session
            }
            None => {
                let session = client.new_page().await?;
                session.navigate(url).await?;
                debug!("Opened new tab for {}", url);
                session
            }
        };

        session
            .set_viewport(self.config.viewport_width, self.config.viewport_height)
            .await?;

        let session = Arc::new(session);
        self.pages.write().await.push(session.clone());
        Ok(session)
    }

    /// Wait for the first list item to render.
    pub async fn wait_for_list(
        &self,
        session: &PageSession,
        item_selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        session
            .wait_for_selector(item_selector, timeout)
            .await
            .map_err(|e| BrowserError::ListNotFound(format!("{}: {}", item_selector, e)))
    }

    /// First open tab on the same origin whose path starts with the target path.
    pub(super) fn find_matching_page<'p>(
        pages: &'p [PageInfo],
        target: &Url,
    ) -> Option<&'p PageInfo> {
        pages.iter().find(|page| {
            let Ok(open) = Url::parse(&page.url) else {
                return false;
            };
            open.scheme() == target.scheme()
                && open.host_str() == target.host_str()
                && open.port_or_known_default() == target.port_or_known_default()
                && open.path().starts_with(target.path())
        })
    }
}
