//! Error taxonomy for list traversal.

use std::time::Duration;

use thiserror::Error;

use crate::types::PartialRecord;

/// Failure of a single browser interaction (read text, hover, wheel, ...).
#[derive(Debug, Clone, Error)]
pub enum InteractionError {
    /// The browser did not answer within the per-operation timeout.
    #[error("Browser interaction timed out after {0:?}: {1}")]
    Timeout(Duration, String),

    /// The node was detached or recycled before the interaction finished.
    #[error("Node detached: {0}")]
    Detached(String),

    /// The page session is gone. Nothing further can succeed.
    #[error("Browser session closed")]
    SessionClosed,

    /// Any other browser-side failure.
    #[error("Browser error: {0}")]
    Browser(String),
}

impl InteractionError {
    /// Whether the run must stop because of this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, InteractionError::SessionClosed)
    }

    /// Whether this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, InteractionError::Timeout(..))
    }
}

/// Why the extraction probe could not produce a keyed record.
#[derive(Debug, Clone, Error)]
pub enum ExtractionFailure {
    /// The visible label was blank. The item is skipped.
    #[error("Item label is empty")]
    EmptyLabel,

    /// The identifier never materialized. Carries what could be read so a
    /// fallback-keyed record can still be admitted.
    #[error("Identifier not found for '{}'", partial.display_name)]
    IdentifierNotFound { partial: PartialRecord },

    /// A browser interaction failed while probing.
    #[error(transparent)]
    Interaction(#[from] InteractionError),
}

impl ExtractionFailure {
    /// Whether the run must stop because of this failure.
    pub fn is_fatal(&self) -> bool {
        match self {
            ExtractionFailure::Interaction(e) => e.is_fatal(),
            _ => false,
        }
    }

    /// Whether a fresh attempt could turn out differently.
    ///
    /// Blank labels and missing identifiers read the same DOM again, and a
    /// fatal error will not clear, so only non-fatal interaction errors are.
    pub fn is_transient(&self) -> bool {
        matches!(self, ExtractionFailure::Interaction(e) if !e.is_fatal())
    }
}

/// Errors surfaced by traversal setup.
#[derive(Debug, Error)]
pub enum TraversalError {
    #[error("Invalid identifier pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Interaction(#[from] InteractionError),
}

/// Run a browser interaction under a hard timeout.
///
/// The timeout guarantees the caller proceeds even if the browser never
/// resolves the operation.
pub async fn with_timeout<T, F>(
    limit: Duration,
    what: &str,
    fut: F,
) -> Result<T, InteractionError>
where
    F: std::future::Future<Output = Result<T, InteractionError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(InteractionError::Timeout(limit, what.to_string())),
    }
}
