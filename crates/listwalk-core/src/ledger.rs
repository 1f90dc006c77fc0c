//! Dedup ledger: keys already emitted plus per-node visited markers.
//!
//! Two independent layers. A recycled node can carry different content, and
//! the same key can show up on several recycled nodes, so neither layer alone
//! is enough. Append-only for the lifetime of one run.
//!
//! The visited marker value is a token unique to the ledger, so markers left
//! in the page by an earlier run do not hide nodes from a later one.

use std::collections::HashSet;

use tracing::trace;

use crate::error::InteractionError;
use crate::handle::ListItemHandle;
use crate::types::{ExtractedRecord, PartialRecord};

pub struct DedupLedger {
    keys: HashSet<String>,
    marker: String,
    token: String,
    fallback_seq: u64,
    /// Partial records read from nodes whose visited marker could not be set.
    unmarked: HashSet<PartialRecord>,
}

impl DedupLedger {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            keys: HashSet::new(),
            marker: marker.into(),
            token: uuid::Uuid::new_v4().simple().to_string(),
            fallback_seq: 0,
            unmarked: HashSet::new(),
        }
    }

    /// Attribute name used as the visited marker.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Marker value written by this ledger.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// False when the node carries this ledger's visited marker.
    pub async fn should_process<H: ListItemHandle>(
        &self,
        node: &H,
    ) -> Result<bool, InteractionError> {
        let value = node.attribute(&self.marker).await?;
        Ok(value.as_deref() != Some(self.token.as_str()))
    }

    /// Set the visited marker. Never cleared within a run.
    pub async fn mark_processed<H: ListItemHandle>(
        &self,
        node: &H,
    ) -> Result<(), InteractionError> {
        node.set_attribute(&self.marker, &self.token).await
    }

    /// Remember a partial record read from a node that could not be marked.
    ///
    /// Such a node shows up unvisited on every later scan. False when the
    /// same partial was already seen this way, so it is not keyed again.
    pub fn note_unmarked(&mut self, partial: &PartialRecord) -> bool {
        self.unmarked.insert(partial.clone())
    }

    /// Record the key; true iff it was not seen before.
    pub fn try_admit(&mut self, record: &ExtractedRecord) -> bool {
        let admitted = self.keys.insert(record.canonical_key.clone());
        if !admitted {
            trace!("Duplicate key {}", record.canonical_key);
        }
        admitted
    }

    /// Key for a record whose identifier could not be resolved.
    ///
    /// A stable list position collapses recycled copies of the same row.
    /// Without one, a per-run sequence keeps same-named rows apart.
    pub fn fallback_key(&mut self, partial: &PartialRecord) -> String {
        match partial.position {
            Some(pos) => format!("name:{}#{}", partial.display_name, pos),
            None => {
                self.fallback_seq += 1;
                format!("name:{}~{}", partial.display_name, self.fallback_seq)
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
