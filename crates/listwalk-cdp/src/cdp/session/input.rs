//! Mouse input for CDP page session.

use serde_json::json;
use tracing::trace;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::MouseEventType;

use super::core::PageSession;

impl PageSession {
    /// Move mouse to coordinates.
    pub async fn mouse_move(&self, x: f64, y: f64) -> Result<(), CdpError> {
        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({
                "type": MouseEventType::MouseMoved,
                "x": x,
                "y": y,
            })),
        )
        .await?;
        Ok(())
    }

    /// Dispatch a wheel event at `(x, y)`.
    pub async fn scroll(&self, x: f64, y: f64, delta_x: f64, delta_y: f64) -> Result<(), CdpError> {
        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({
                "type": MouseEventType::MouseWheel,
                "x": x,
                "y": y,
                "deltaX": delta_x,
                "deltaY": delta_y,
            })),
        )
        .await?;
        trace!("Wheel ({}, {}) at ({}, {})", delta_x, delta_y, x, y);
        Ok(())
    }
}
