//! Records and traversal results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One logical list item, extracted and keyed.
///
/// Serialized as `{identifier, displayName, auxFields}` for the persistence
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecord {
    /// Durable dedup key: the platform identifier, or a name-derived fallback.
    #[serde(rename = "identifier")]
    pub canonical_key: String,
    pub display_name: String,
    #[serde(default)]
    pub aux_fields: BTreeMap<String, String>,
}

impl ExtractedRecord {
    pub fn new(canonical_key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            canonical_key: canonical_key.into(),
            display_name: display_name.into(),
            aux_fields: BTreeMap::new(),
        }
    }

    pub fn with_aux(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.aux_fields.insert(key.into(), value.into());
        self
    }
}

/// What the probe could read when the identifier never showed up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PartialRecord {
    pub display_name: String,
    pub aux_fields: BTreeMap<String, String>,
    /// Stable list position (row index), when the item exposes one.
    pub position: Option<u64>,
}

impl PartialRecord {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    /// Promote to a full record under the given fallback key.
    pub fn into_record(self, key: String) -> ExtractedRecord {
        ExtractedRecord {
            canonical_key: key,
            display_name: self.display_name,
            aux_fields: self.aux_fields,
        }
    }
}

/// Final status of a traversal run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalStatus {
    /// The list stopped moving or stalled: treated as exhausted (best effort).
    Complete,
    /// A ceiling (iterations or wall clock) cut the run short.
    Truncated,
    /// The browser session was lost mid-run.
    Failed,
}

/// Which condition ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The scroll driver reported no movement.
    ScrollExhausted,
    /// Too many consecutive scroll rounds without new items.
    Stalled,
    /// The hard iteration ceiling was reached.
    IterationCeiling,
    /// The wall-clock ceiling was reached.
    Deadline,
    /// A fatal interaction error.
    Fatal,
}

impl TerminationReason {
    pub fn status(self) -> TraversalStatus {
        match self {
            TerminationReason::ScrollExhausted | TerminationReason::Stalled => {
                TraversalStatus::Complete
            }
            TerminationReason::IterationCeiling | TerminationReason::Deadline => {
                TraversalStatus::Truncated
            }
            TerminationReason::Fatal => TraversalStatus::Failed,
        }
    }
}

/// Counters describing how the run went, so callers can tell a clean run
/// from a degraded one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalReport {
    pub termination: Option<TerminationReason>,
    /// Scanning passes performed.
    pub iterations: u32,
    /// Calls into the scroll driver.
    pub scroll_rounds: u32,
    /// Nodes handed to the probe.
    pub nodes_attempted: u32,
    pub duplicates_discarded: u32,
    pub empty_labels: u32,
    pub identifier_fallbacks: u32,
    pub interaction_timeouts: u32,
    pub interaction_failures: u32,
    /// Name of the locator strategy that found the scroll container.
    pub container_strategy: Option<String>,
    /// The whole-document scroller was used because no container matched.
    pub degraded_container: bool,
}

impl TraversalReport {
    /// Whether any recoverable degradation happened during the run.
    pub fn is_degraded(&self) -> bool {
        self.degraded_container
            || self.identifier_fallbacks > 0
            || self.interaction_timeouts > 0
            || self.interaction_failures > 0
    }
}

/// Terminal output of one traversal run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalResult {
    /// Records in discovery order.
    pub records: Vec<ExtractedRecord>,
    pub status: TraversalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub report: TraversalReport,
}

impl TraversalResult {
    pub fn is_complete(&self) -> bool {
        self.status == TraversalStatus::Complete
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
