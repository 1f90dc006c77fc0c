//! Mapping from the file configuration to component options.

use listwalk_cdp::{BrowserManagerConfig, ItemSelectors};
use listwalk_config::{BrowserConfig, Config, TargetConfig};
use listwalk_core::{BatchOptions, ExtractionMode, ProbeOptions, ScrollOptions, TraversalOptions};

pub(crate) fn browser_config(browser: &BrowserConfig) -> BrowserManagerConfig {
    BrowserManagerConfig {
        debug_port: browser.debug_port,
        viewport_width: browser.viewport_width,
        viewport_height: browser.viewport_height,
        profile_dir: browser.profile_dir.clone(),
        headless: browser.headless,
        launch: browser.launch,
    }
}

pub(crate) fn probe_options(config: &Config) -> ProbeOptions {
    ProbeOptions {
        label_selector: config.target.label_selector.clone(),
        reveal_selector: config.target.reveal_selector.clone(),
        identifier_pattern: config.target.identifier_pattern.clone(),
        aux_fields: config.target.aux_fields.clone(),
        poll_attempts: config.probe.poll_attempts,
        poll_interval: config.probe.poll_interval(),
        interaction_timeout: config.traversal.interaction_timeout(),
    }
}

pub(crate) fn scroll_options(config: &Config) -> ScrollOptions {
    ScrollOptions {
        step: config.scroll.step_px,
        sub_steps: config.scroll.sub_steps,
        sub_step_delay: config.scroll.sub_step_delay(),
        movement_threshold: config.scroll.movement_threshold,
        interaction_timeout: config.traversal.interaction_timeout(),
    }
}

pub(crate) fn traversal_options(config: &Config) -> TraversalOptions {
    let traversal = &config.traversal;
    let mode = if config.batch.enabled {
        ExtractionMode::Batched(BatchOptions {
            concurrency: config.batch.concurrency,
            retry_budget: config.batch.retry_budget,
            task_timeout: config.batch.task_timeout(),
            ..Default::default()
        })
    } else {
        ExtractionMode::Sequential
    };

    TraversalOptions {
        max_iterations: traversal.max_iterations,
        max_duration: traversal.max_duration(),
        no_new_item_ceiling: traversal.no_new_item_ceiling,
        settle_delay: traversal.settle_delay(),
        item_delay: traversal.item_delay(),
        visited_attribute: traversal.visited_attribute.clone(),
        interaction_timeout: traversal.interaction_timeout(),
        mode,
    }
}

pub(crate) fn item_selectors(target: &TargetConfig) -> ItemSelectors {
    ItemSelectors {
        region: target.region_selector.clone(),
        tooltip: Some(target.tooltip_selector.clone()).filter(|s| !s.trim().is_empty()),
        position_attributes: target.position_attributes.clone(),
    }
}

/// Explicit container selectors, tried before the built-in markers.
pub(crate) fn container_selectors(target: &TargetConfig) -> Vec<String> {
    target
        .container_selectors
        .iter()
        .chain(&target.virtualization_selectors)
        .cloned()
        .collect()
}
