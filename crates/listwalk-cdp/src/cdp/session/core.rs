//! Core session struct and CDP command dispatch.

use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

use crate::cdp::client::Channel;
use crate::cdp::error::CdpError;

/// Upper bound on a single CDP round trip.
pub(crate) const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// A session attached to a single page/target.
pub struct PageSession {
    /// Target ID.
    pub(super) target_id: String,
    /// Session ID for this target.
    pub(super) session_id: String,
    /// Connection shared with the client.
    pub(super) channel: Channel,
}

impl PageSession {
    /// Create a new page session.
    pub(crate) fn new(target_id: String, session_id: String, channel: Channel) -> Self {
        Self {
            target_id,
            session_id,
            channel,
        }
    }

    /// Get target ID.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Get session ID.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Whether the underlying connection is gone.
    pub fn is_closed(&self) -> bool {
        self.channel.closed.load(Ordering::SeqCst)
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.channel
            .call(method, params, Some(&self.session_id))
            .await
    }

    /// Enable required CDP domains.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Pin the page viewport so layout and wheel targets are stable.
    pub async fn set_viewport(&self, width: u32, height: u32) -> Result<(), CdpError> {
        self.call(
            "Emulation.setDeviceMetricsOverride",
            Some(json!({
                "width": width,
                "height": height,
                "deviceScaleFactor": 1,
                "mobile": false,
            })),
        )
        .await?;
        Ok(())
    }
}
