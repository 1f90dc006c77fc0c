//! Scroll containers located and driven over CDP.

use std::sync::Arc;

use async_trait::async_trait;
use listwalk_core::{ContainerQuery, InteractionError, ScrollContainer, ScrollSurface};
use serde_json::json;

use super::{scripts, Geometry};
use crate::cdp::{CdpError, PageSession, RemoteObject};

/// Object group holding located containers. Never released mid-run.
const CONTAINER_GROUP: &str = "listwalk-container";

/// A scrollable element on the page.
pub struct CdpContainer {
    session: Arc<PageSession>,
    object_id: String,
    label: String,
}

impl CdpContainer {
    fn from_remote(session: Arc<PageSession>, remote: RemoteObject) -> Option<Self> {
        let object_id = remote.node_id()?.to_string();
        let label = remote
            .description
            .clone()
            .unwrap_or_else(|| "element".to_string());
        Some(Self {
            session,
            object_id,
            label,
        })
    }
}

#[async_trait]
impl ScrollContainer for CdpContainer {
    async fn offset(&self) -> Result<f64, InteractionError> {
        let value = self
            .session
            .call_function_on(&self.object_id, scripts::SCROLL_TOP, &[])
            .await?;
        value
            .as_f64()
            .ok_or_else(|| InteractionError::Browser(format!("scrollTop was {}", value)))
    }

    async fn wheel(&self, delta: f64) -> Result<(), InteractionError> {
        let value = self
            .session
            .call_function_on(&self.object_id, scripts::GEOMETRY, &[])
            .await?;
        let geometry: Geometry = serde_json::from_value(value).map_err(CdpError::from)?;
        let (x, y) = geometry.wheel_point();
        self.session.scroll(x, y, 0.0, delta).await?;
        Ok(())
    }

    async fn scroll_to(&self, offset: f64) -> Result<(), InteractionError> {
        self.session
            .call_function_on(&self.object_id, scripts::SET_SCROLL_TOP, &[json!(offset)])
            .await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Page-side container lookups.
pub struct CdpSurface {
    session: Arc<PageSession>,
}

impl CdpSurface {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self { session }
    }

    async fn locate(&self, expression: &str) -> Result<Option<CdpContainer>, InteractionError> {
        let remote = self
            .session
            .evaluate_handle_in(expression, Some(CONTAINER_GROUP))
            .await?;
        Ok(CdpContainer::from_remote(self.session.clone(), remote))
    }
}

#[async_trait]
impl ScrollSurface for CdpSurface {
    type Container = CdpContainer;

    async fn find_container(
        &self,
        query: &ContainerQuery,
    ) -> Result<Option<CdpContainer>, InteractionError> {
        let expression = match query {
            ContainerQuery::Selector(selector) => {
                let encoded = serde_json::to_string(selector).map_err(CdpError::from)?;
                scripts::overflowing_match(&encoded)
            }
            ContainerQuery::OverflowScan { item_selector } => {
                let encoded = serde_json::to_string(item_selector).map_err(CdpError::from)?;
                scripts::overflow_scan(&encoded)
            }
        };
        self.locate(&expression).await
    }

    async fn document_scroller(&self) -> Result<CdpContainer, InteractionError> {
        self.locate(scripts::DOCUMENT_SCROLLER)
            .await?
            .ok_or_else(|| InteractionError::Browser("page has no scrolling element".to_string()))
    }
}
