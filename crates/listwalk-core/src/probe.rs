//! Extraction probe: pull one record out of a rendered list item.

use std::collections::BTreeMap;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, trace, warn};

use crate::error::{with_timeout, ExtractionFailure, InteractionError, TraversalError};
use crate::handle::{ListItemHandle, PointerEvent};
use crate::options::ProbeOptions;
use crate::types::{ExtractedRecord, PartialRecord};

/// Turns a list item into a record.
#[async_trait]
pub trait Probe<H: ListItemHandle>: Send + Sync {
    async fn extract(&self, node: &H) -> Result<ExtractedRecord, ExtractionFailure>;

    /// Whether extraction touches the page's single hover/reveal state, in
    /// which case items must be extracted one at a time.
    fn needs_exclusive_hover(&self) -> bool {
        true
    }
}

/// Probe reading the label, auxiliary fields and identifier of an item,
/// hovering the reveal affordance when the identifier is not inline.
pub struct ExtractionProbe {
    opts: ProbeOptions,
    pattern: Regex,
    reveal: bool,
}

impl ExtractionProbe {
    /// Probe that hovers to reveal identifiers.
    pub fn reveal(opts: ProbeOptions) -> Result<Self, TraversalError> {
        Self::build(opts, true)
    }

    /// Probe that only reads what is rendered inline. Safe to run concurrently.
    pub fn inline(opts: ProbeOptions) -> Result<Self, TraversalError> {
        Self::build(opts, false)
    }

    fn build(opts: ProbeOptions, reveal: bool) -> Result<Self, TraversalError> {
        let pattern = Regex::new(&opts.identifier_pattern)?;
        Ok(Self {
            opts,
            pattern,
            reveal,
        })
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.opts
    }

    /// Find an identifier in `text`.
    pub fn match_identifier(&self, text: &str) -> Option<String> {
        let caps = self.pattern.captures(text)?;
        let raw = caps.get(1).or_else(|| caps.get(0))?.as_str();
        let id = raw.trim().trim_start_matches('@').trim();
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }

    /// Drop the identifier span from a label read off the whole item.
    ///
    /// Falls back to the label as read when nothing else is left.
    pub fn strip_identifier(&self, label: &str) -> String {
        let Some(found) = self.pattern.find(label) else {
            return label.to_string();
        };
        let stripped = format!("{} {}", &label[..found.start()], &label[found.end()..]);
        let stripped = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        if stripped.is_empty() {
            label.to_string()
        } else {
            stripped
        }
    }

    async fn read_label<H: ListItemHandle>(&self, node: &H) -> Result<String, ExtractionFailure> {
        let label = with_timeout(
            self.opts.interaction_timeout,
            "read label",
            node.text(self.opts.label_selector.as_deref()),
        )
        .await?;

        match label.map(|l| l.trim().to_string()) {
            Some(l) if !l.is_empty() => Ok(l),
            _ => Err(ExtractionFailure::EmptyLabel),
        }
    }

    async fn read_aux<H: ListItemHandle>(&self, node: &H) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        for (name, selector) in &self.opts.aux_fields {
            match with_timeout(
                self.opts.interaction_timeout,
                "read aux field",
                node.text(Some(selector)),
            )
            .await
            {
                Ok(Some(value)) if !value.trim().is_empty() => {
                    fields.insert(name.clone(), value.trim().to_string());
                }
                Ok(_) => {}
                Err(e) => debug!("Aux field '{}' unreadable: {}", name, e),
            }
        }
        fields
    }

    async fn poll_revealed<H: ListItemHandle>(
        &self,
        node: &H,
    ) -> Result<Option<String>, InteractionError> {
        with_timeout(
            self.opts.interaction_timeout,
            "pointer enter",
            node.pointer(self.opts.reveal_selector.as_deref(), PointerEvent::Enter),
        )
        .await?;

        for attempt in 1..=self.opts.poll_attempts {
            tokio::time::sleep(self.opts.poll_interval).await;
            let region = with_timeout(
                self.opts.interaction_timeout,
                "read reveal region",
                node.region_text(),
            )
            .await?;
            if let Some(id) = self.match_identifier(&region) {
                trace!("Identifier revealed after {} polls", attempt);
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    async fn reveal_identifier<H: ListItemHandle>(
        &self,
        node: &H,
    ) -> Result<Option<String>, InteractionError> {
        if let Err(e) = with_timeout(
            self.opts.interaction_timeout,
            "scroll into view",
            node.scroll_into_view(),
        )
        .await
        {
            if e.is_fatal() {
                return Err(e);
            }
            debug!("scroll_into_view failed, hovering anyway: {}", e);
        }

        let found = self.poll_revealed(node).await;

        // Leave must run whatever happened above so the next item starts clean.
        if let Err(e) = with_timeout(
            self.opts.interaction_timeout,
            "pointer leave",
            node.pointer(self.opts.reveal_selector.as_deref(), PointerEvent::Leave),
        )
        .await
        {
            warn!("Pointer leave failed: {}", e);
        }

        found
    }
}

#[async_trait]
impl<H: ListItemHandle> Probe<H> for ExtractionProbe {
    async fn extract(&self, node: &H) -> Result<ExtractedRecord, ExtractionFailure> {
        let mut display_name = self.read_label(node).await?;
        let aux_fields = self.read_aux(node).await;

        let inline = with_timeout(self.opts.interaction_timeout, "read item", node.text(None))
            .await?
            .and_then(|text| self.match_identifier(&text));

        let identifier = match inline {
            Some(id) => {
                // Without a label selector the label is the item text, identifier included.
                if self.opts.label_selector.is_none() {
                    display_name = self.strip_identifier(&display_name);
                }
                Some(id)
            }
            None if self.reveal => self.reveal_identifier(node).await?,
            None => None,
        };

        match identifier {
            Some(id) => {
                debug!("Extracted '{}' as {}", display_name, id);
                Ok(ExtractedRecord {
                    canonical_key: id,
                    display_name,
                    aux_fields,
                })
            }
            None => {
                let position =
                    with_timeout(self.opts.interaction_timeout, "read position", node.position())
                        .await
                        .ok()
                        .flatten();
                Err(ExtractionFailure::IdentifierNotFound {
                    partial: PartialRecord {
                        display_name,
                        aux_fields,
                        position,
                    },
                })
            }
        }
    }

    fn needs_exclusive_hover(&self) -> bool {
        self.reveal
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
