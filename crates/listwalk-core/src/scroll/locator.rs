//! Scroll container locator strategies, tried in priority order.

use async_trait::async_trait;

use super::{ContainerQuery, ScrollSurface};
use crate::error::InteractionError;

/// Explicit role and grid markers: cheap and accurate.
pub const DEFAULT_ROLE_SELECTORS: &[&str] = &[
    r#"[role="grid"]"#,
    r#"[role="listbox"]"#,
    r#"[role="list"]"#,
    r#"[role="feed"]"#,
];

/// Markers left by common virtualization libraries.
pub const DEFAULT_VIRTUALIZATION_SELECTORS: &[&str] = &[
    "[data-virtuoso-scroller]",
    r#"[data-testid="virtuoso-scroller"]"#,
    ".ReactVirtualized__Grid",
    ".ReactVirtualized__List",
    "[data-tanstack-virtual]",
    ".virtual-list",
];

/// One way of finding the scroll container.
#[async_trait]
pub trait ContainerLocator<S: ScrollSurface>: Send + Sync {
    fn name(&self) -> &str;

    async fn try_locate(&self, surface: &S) -> Result<Option<S::Container>, InteractionError>;
}

/// Matches a fixed list of selectors, first hit wins.
pub struct SelectorLocator {
    name: String,
    selectors: Vec<String>,
}

impl SelectorLocator {
    pub fn new(name: impl Into<String>, selectors: Vec<String>) -> Self {
        Self {
            name: name.into(),
            selectors,
        }
    }

    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }
}

#[async_trait]
impl<S: ScrollSurface> ContainerLocator<S> for SelectorLocator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn try_locate(&self, surface: &S) -> Result<Option<S::Container>, InteractionError> {
        for selector in &self.selectors {
            let query = ContainerQuery::Selector(selector.clone());
            if let Some(container) = surface.find_container(&query).await? {
                return Ok(Some(container));
            }
        }
        Ok(None)
    }
}

/// Generic scan for any overflowing element that contains list items.
/// Robust but slower, so it runs after the marker strategies.
pub struct OverflowScanLocator {
    item_selector: String,
}

impl OverflowScanLocator {
    pub fn new(item_selector: impl Into<String>) -> Self {
        Self {
            item_selector: item_selector.into(),
        }
    }
}

#[async_trait]
impl<S: ScrollSurface> ContainerLocator<S> for OverflowScanLocator {
    fn name(&self) -> &str {
        "overflow-scan"
    }

    async fn try_locate(&self, surface: &S) -> Result<Option<S::Container>, InteractionError> {
        surface
            .find_container(&ContainerQuery::OverflowScan {
                item_selector: self.item_selector.clone(),
            })
            .await
    }
}

/// The standard strategy order: configured markers, role markers,
/// virtualization markers, then the overflow scan.
pub fn default_locators<S: ScrollSurface + 'static>(
    configured: &[String],
    item_selector: &str,
) -> Vec<Box<dyn ContainerLocator<S>>> {
    let mut locators: Vec<Box<dyn ContainerLocator<S>>> = Vec::new();
    if !configured.is_empty() {
        locators.push(Box::new(SelectorLocator::new("configured", configured.to_vec())));
    }
    locators.push(Box::new(SelectorLocator::new(
        "role-marker",
        DEFAULT_ROLE_SELECTORS.iter().map(|s| s.to_string()).collect(),
    )));
    locators.push(Box::new(SelectorLocator::new(
        "virtualization-marker",
        DEFAULT_VIRTUALIZATION_SELECTORS
            .iter()
            .map(|s| s.to_string())
            .collect(),
    )));
    locators.push(Box::new(OverflowScanLocator::new(item_selector)));
    locators
}
