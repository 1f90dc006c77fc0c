//! Traversal tuning: controller ceilings, scrolling, probing and batch mode.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Traversal controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Hard ceiling on scanning passes.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Optional wall-clock ceiling for the whole run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration_secs: Option<u64>,

    /// Consecutive scroll rounds without new items before stopping.
    #[serde(default = "default_no_new_item_ceiling")]
    pub no_new_item_ceiling: u32,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,

    /// Upper bound for a single browser interaction.
    #[serde(default = "default_interaction_timeout_ms")]
    pub interaction_timeout_ms: u64,

    /// Attribute written onto attempted item nodes.
    #[serde(default = "default_visited_attribute")]
    pub visited_attribute: String,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_duration_secs: None,
            no_new_item_ceiling: default_no_new_item_ceiling(),
            settle_delay_ms: default_settle_delay_ms(),
            item_delay_ms: default_item_delay_ms(),
            interaction_timeout_ms: default_interaction_timeout_ms(),
            visited_attribute: default_visited_attribute(),
        }
    }
}

impl TraversalConfig {
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs.map(Duration::from_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }

    pub fn interaction_timeout(&self) -> Duration {
        Duration::from_millis(self.interaction_timeout_ms)
    }
}

fn default_max_iterations() -> u32 {
    200
}

fn default_no_new_item_ceiling() -> u32 {
    8
}

fn default_settle_delay_ms() -> u64 {
    800
}

fn default_item_delay_ms() -> u64 {
    150
}

fn default_interaction_timeout_ms() -> u64 {
    5000
}

fn default_visited_attribute() -> String {
    "data-listwalk-visited".to_string()
}

/// Scroll driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Distance of one scroll round.
    #[serde(default = "default_step_px")]
    pub step_px: f64,

    /// Wheel events per round.
    #[serde(default = "default_sub_steps")]
    pub sub_steps: u32,

    #[serde(default = "default_sub_step_delay_ms")]
    pub sub_step_delay_ms: u64,

    /// Minimum offset change that counts as movement.
    #[serde(default = "default_movement_threshold")]
    pub movement_threshold: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            step_px: default_step_px(),
            sub_steps: default_sub_steps(),
            sub_step_delay_ms: default_sub_step_delay_ms(),
            movement_threshold: default_movement_threshold(),
        }
    }
}

impl ScrollConfig {
    pub fn sub_step_delay(&self) -> Duration {
        Duration::from_millis(self.sub_step_delay_ms)
    }
}

fn default_step_px() -> f64 {
    600.0
}

fn default_sub_steps() -> u32 {
    4
}

fn default_sub_step_delay_ms() -> u64 {
    60
}

fn default_movement_threshold() -> f64 {
    20.0
}

/// Extraction probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Reads of the reveal region before giving up on the identifier.
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            poll_attempts: default_poll_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ProbeConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_poll_attempts() -> u32 {
    20
}

fn default_poll_interval_ms() -> u64 {
    100
}

/// Batch extraction configuration. Only used with inline identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Extra attempts after a failed extraction.
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,

    /// Hard timeout for one extraction attempt.
    #[serde(default = "default_task_timeout_ms")]
    pub task_timeout_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            concurrency: default_concurrency(),
            retry_budget: default_retry_budget(),
            task_timeout_ms: default_task_timeout_ms(),
        }
    }
}

impl BatchConfig {
    pub fn task_timeout(&self) -> Duration {
        Duration::from_millis(self.task_timeout_ms)
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_retry_budget() -> u32 {
    2
}

fn default_task_timeout_ms() -> u64 {
    10_000
}
