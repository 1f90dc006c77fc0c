//! CDP error types.

use std::time::Duration;

use listwalk_core::InteractionError;
use thiserror::Error;

use super::session::CALL_TIMEOUT;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol error.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Navigation failed.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// JavaScript execution error.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Session closed.
    #[error("Session closed")]
    SessionClosed,

    /// Invalid response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// The remote object behind a handle no longer exists, typically because
    /// the list re-rendered and dropped the node.
    pub fn is_stale_object(&self) -> bool {
        let message = match self {
            CdpError::Protocol { message, .. } | CdpError::JavaScript(message) => message,
            _ => return false,
        };
        message.contains("Could not find object with given id")
            || message.contains("Cannot find context with specified id")
            || message.contains("Node is detached")
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for InteractionError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::SessionClosed | CdpError::WebSocket(_) => InteractionError::SessionClosed,
            CdpError::Timeout(what) => InteractionError::Timeout(CALL_TIMEOUT, what),
            ref stale if stale.is_stale_object() => InteractionError::Detached(stale.to_string()),
            other => InteractionError::Browser(other.to_string()),
        }
    }
}

/// Timeout error for a page-side wait that gave up.
pub(crate) fn wait_timeout(what: &str, waited: Duration) -> CdpError {
    CdpError::Timeout(format!("{} after {:?}", what, waited))
}
