//! Runtime options for the traversal components.

use std::collections::BTreeMap;
use std::time::Duration;

/// Extraction probe options.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Descendant holding the display name. `None` reads the whole item.
    pub label_selector: Option<String>,
    /// Descendant that reveals the identifier on hover. `None` hovers the item.
    pub reveal_selector: Option<String>,
    /// Regex the identifier must match. First capture group wins when present.
    pub identifier_pattern: String,
    /// Auxiliary field name to descendant selector.
    pub aux_fields: BTreeMap<String, String>,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
    /// Upper bound for any single browser interaction.
    pub interaction_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            label_selector: None,
            reveal_selector: None,
            identifier_pattern: r"@([A-Za-z0-9_.\-]{2,64})".to_string(),
            aux_fields: BTreeMap::new(),
            poll_attempts: 20,
            poll_interval: Duration::from_millis(100),
            interaction_timeout: Duration::from_secs(5),
        }
    }
}

/// Scroll driver options.
#[derive(Debug, Clone)]
pub struct ScrollOptions {
    /// Total distance of one advance.
    pub step: f64,
    /// Number of wheel events the step is split into.
    pub sub_steps: u32,
    pub sub_step_delay: Duration,
    /// Offset change below which an advance counts as no movement.
    pub movement_threshold: f64,
    pub interaction_timeout: Duration,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            step: 600.0,
            sub_steps: 4,
            sub_step_delay: Duration::from_millis(60),
            movement_threshold: 20.0,
            interaction_timeout: Duration::from_secs(5),
        }
    }
}

impl ScrollOptions {
    /// Distance of each wheel sub-step.
    pub fn sub_step_delta(&self) -> f64 {
        self.step / f64::from(self.sub_steps.max(1))
    }
}

/// Concurrency-limited batch runner options.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub concurrency: usize,
    /// Extra attempts after the first failure.
    pub retry_budget: u32,
    /// Hard timeout for one attempt.
    pub task_timeout: Duration,
    /// Pause before a retry.
    pub retry_delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry_budget: 2,
            task_timeout: Duration::from_secs(10),
            retry_delay: Duration::from_millis(200),
        }
    }
}

/// How the visible set of items is extracted.
#[derive(Debug, Clone, Default)]
pub enum ExtractionMode {
    /// One item at a time; required when extraction hovers.
    #[default]
    Sequential,
    /// Through the batch runner; only for probes that do not hover.
    Batched(BatchOptions),
}

/// Traversal controller options.
#[derive(Debug, Clone)]
pub struct TraversalOptions {
    /// Hard ceiling on scanning passes.
    pub max_iterations: u32,
    /// Optional wall-clock ceiling.
    pub max_duration: Option<Duration>,
    /// Consecutive scroll rounds without new items before giving up.
    pub no_new_item_ceiling: u32,
    /// Wait after a scroll for the list to mount new nodes.
    pub settle_delay: Duration,
    /// Pause between sequential item extractions.
    pub item_delay: Duration,
    /// Attribute placed on attempted nodes.
    pub visited_attribute: String,
    pub interaction_timeout: Duration,
    pub mode: ExtractionMode,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            max_duration: None,
            no_new_item_ceiling: 8,
            settle_delay: Duration::from_millis(800),
            item_delay: Duration::from_millis(150),
            visited_attribute: "data-listwalk-visited".to_string(),
            interaction_timeout: Duration::from_secs(5),
            mode: ExtractionMode::Sequential,
        }
    }
}
