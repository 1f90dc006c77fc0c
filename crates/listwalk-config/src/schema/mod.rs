//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

mod schema_infra;
mod schema_traversal;

pub use schema_infra::*;
pub use schema_traversal::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub traversal: TraversalConfig,

    #[serde(default)]
    pub scroll: ScrollConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Browser connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default)]
    pub headless: bool,

    /// Chrome user data directory. Defaults to `~/.listwalk/browser-profile`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_dir: Option<PathBuf>,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Launch Chrome when nothing is listening on the debug port.
    #[serde(default = "default_true")]
    pub launch: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: false,
            profile_dir: None,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            launch: default_true(),
        }
    }
}

pub(crate) fn default_true() -> bool {
    true
}

fn default_debug_port() -> u16 {
    9222
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    900
}

/// What to traverse and how its items are marked up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Page holding the list. May also be given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Selector matching one rendered list item.
    #[serde(default = "default_item_selector")]
    pub item_selector: String,

    /// Descendant of an item holding its display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,

    /// Descendant to hover for the identifier. Unset hovers the item itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal_selector: Option<String>,

    /// Ancestor of an item whose text is searched for the revealed identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_selector: Option<String>,

    /// Floating popovers that may carry the revealed identifier.
    #[serde(default = "default_tooltip_selector")]
    pub tooltip_selector: String,

    #[serde(default = "default_identifier_pattern")]
    pub identifier_pattern: String,

    /// Attributes read, in order, for a stable row position.
    #[serde(default = "default_position_attributes")]
    pub position_attributes: Vec<String>,

    /// Scroll container selectors tried before the built-in markers.
    #[serde(default)]
    pub container_selectors: Vec<String>,

    /// Extra virtualization library markers.
    #[serde(default)]
    pub virtualization_selectors: Vec<String>,

    /// Auxiliary field name to item descendant selector.
    #[serde(default)]
    pub aux_fields: BTreeMap<String, String>,

    /// How long to wait for the first item to render.
    #[serde(default = "default_wait_for_list_ms")]
    pub wait_for_list_ms: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: None,
            item_selector: default_item_selector(),
            label_selector: None,
            reveal_selector: None,
            region_selector: None,
            tooltip_selector: default_tooltip_selector(),
            identifier_pattern: default_identifier_pattern(),
            position_attributes: default_position_attributes(),
            container_selectors: Vec::new(),
            virtualization_selectors: Vec::new(),
            aux_fields: BTreeMap::new(),
            wait_for_list_ms: default_wait_for_list_ms(),
        }
    }
}

fn default_item_selector() -> String {
    r#"[role="listitem"]"#.to_string()
}

fn default_tooltip_selector() -> String {
    r#"[role="tooltip"]"#.to_string()
}

pub fn default_identifier_pattern() -> String {
    r"@([A-Za-z0-9_.\-]{2,64})".to_string()
}

fn default_position_attributes() -> Vec<String> {
    vec![
        "aria-rowindex".to_string(),
        "aria-posinset".to_string(),
        "data-index".to_string(),
    ]
}

fn default_wait_for_list_ms() -> u64 {
    15_000
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
