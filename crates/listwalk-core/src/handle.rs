//! Capability surface the traversal needs from a rendered list.
//!
//! Dynamic DOM query results are mapped onto these traits; any markup that
//! can satisfy them can be traversed.

use async_trait::async_trait;

use crate::error::InteractionError;

/// Simulated pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Enter,
    Leave,
}

/// Reference to a currently rendered list item.
///
/// Ephemeral: only valid until the next scroll or re-render. The controller
/// never keeps one beyond a single iteration.
#[async_trait]
pub trait ListItemHandle: Send + Sync {
    /// Text of the item, or of the first descendant matching `part`.
    /// `Ok(None)` when `part` matches nothing.
    async fn text(&self, part: Option<&str>) -> Result<Option<String>, InteractionError>;

    /// Read an attribute from the item node.
    async fn attribute(&self, name: &str) -> Result<Option<String>, InteractionError>;

    /// Write an attribute onto the item node.
    async fn set_attribute(&self, name: &str, value: &str) -> Result<(), InteractionError>;

    /// Bring the node into the visible viewport.
    async fn scroll_into_view(&self) -> Result<(), InteractionError>;

    /// Simulate a pointer event on `target` (a descendant) or the item itself.
    async fn pointer(&self, target: Option<&str>, event: PointerEvent)
        -> Result<(), InteractionError>;

    /// Text of the region around the item where transient reveals appear.
    async fn region_text(&self) -> Result<String, InteractionError>;

    /// Stable list position of the item, if the markup exposes one.
    async fn position(&self) -> Result<Option<u64>, InteractionError>;
}

/// Enumerates the currently rendered items of the list.
#[async_trait]
pub trait ItemScanner: Send + Sync {
    type Item: ListItemHandle;

    async fn scan(&self) -> Result<Vec<Self::Item>, InteractionError>;
}
