//! List item handle over a remote DOM element.

use std::sync::Arc;

use async_trait::async_trait;
use listwalk_core::{InteractionError, ListItemHandle, PointerEvent};
use serde::Deserialize;
use serde_json::{json, Value};

use super::scripts;
use super::{first_position, ItemSelectors};
use crate::cdp::PageSession;

#[derive(Debug, Deserialize)]
struct Point {
    x: f64,
    y: f64,
}

/// A rendered list item. Valid until the list re-renders it away.
#[derive(Clone)]
pub struct CdpListItem {
    session: Arc<PageSession>,
    object_id: String,
    selectors: Arc<ItemSelectors>,
}

impl CdpListItem {
    pub fn new(
        session: Arc<PageSession>,
        object_id: String,
        selectors: Arc<ItemSelectors>,
    ) -> Self {
        Self {
            session,
            object_id,
            selectors,
        }
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    async fn run(&self, function: &str, args: &[Value]) -> Result<Value, InteractionError> {
        Ok(self
            .session
            .call_function_on(&self.object_id, function, args)
            .await?)
    }
}

fn optional_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

#[async_trait]
impl ListItemHandle for CdpListItem {
    async fn text(&self, part: Option<&str>) -> Result<Option<String>, InteractionError> {
        let value = self.run(scripts::TEXT, &[json!(part)]).await?;
        Ok(optional_string(value))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, InteractionError> {
        let value = self.run(scripts::GET_ATTRIBUTE, &[json!(name)]).await?;
        Ok(optional_string(value))
    }

    async fn set_attribute(&self, name: &str, value: &str) -> Result<(), InteractionError> {
        self.run(scripts::SET_ATTRIBUTE, &[json!(name), json!(value)])
            .await?;
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<(), InteractionError> {
        self.run(scripts::SCROLL_INTO_VIEW, &[]).await?;
        Ok(())
    }

    async fn pointer(
        &self,
        target: Option<&str>,
        event: PointerEvent,
    ) -> Result<(), InteractionError> {
        let kind = match event {
            PointerEvent::Enter => "enter",
            PointerEvent::Leave => "leave",
        };
        let value = self.run(scripts::POINTER, &[json!(target), json!(kind)]).await?;
        let point: Point = serde_json::from_value(value)
            .map_err(|e| InteractionError::Browser(format!("pointer target: {}", e)))?;

        match event {
            PointerEvent::Enter => self.session.mouse_move(point.x, point.y).await?,
            // Park the real cursor in the corner so hover styles clear.
            PointerEvent::Leave => self.session.mouse_move(1.0, 1.0).await?,
        }
        Ok(())
    }

    async fn region_text(&self) -> Result<String, InteractionError> {
        let value = self
            .run(
                scripts::REGION_TEXT,
                &[json!(self.selectors.region), json!(self.selectors.tooltip)],
            )
            .await?;
        Ok(optional_string(value).unwrap_or_default())
    }

    async fn position(&self) -> Result<Option<u64>, InteractionError> {
        if self.selectors.position_attributes.is_empty() {
            return Ok(None);
        }
        let value = self
            .run(
                scripts::POSITION_CANDIDATES,
                &[json!(self.selectors.position_attributes)],
            )
            .await?;
        let candidates: Vec<String> = serde_json::from_value(value).unwrap_or_default();
        Ok(first_position(&candidates))
    }
}
