//! Configuration validation.

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// First error as a `ConfigError`, if any.
    pub fn into_error(self) -> Option<ConfigError> {
        self.errors.into_iter().next().map(|e| ConfigError::InvalidValue {
            field: e.path,
            message: e.message,
        })
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_browser(config, &mut result);
        Self::validate_target(config, &mut result);
        Self::validate_traversal(config, &mut result);
        Self::validate_scroll(config, &mut result);
        Self::validate_probe(config, &mut result);
        Self::validate_batch(config, &mut result);

        Ok(result)
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        if config.browser.debug_port == 0 {
            result.add_error(ValidationError::new(
                "browser.debug_port",
                "Port cannot be 0",
            ));
        }

        if config.browser.viewport_width == 0 || config.browser.viewport_height == 0 {
            result.add_error(ValidationError::new(
                "browser.viewport",
                "Viewport dimensions must be greater than 0",
            ));
        }
    }

    fn validate_target(config: &Config, result: &mut ValidationResult) {
        let target = &config.target;

        match target.url {
            Some(ref url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                result.add_error(ValidationError::new(
                    "target.url",
                    "url must start with http:// or https://",
                ));
            }
            Some(_) => {}
            None => {
                result.add_warning(ValidationWarning::new(
                    "target.url",
                    "url is not set, it must be passed with --url",
                ));
            }
        }

        if target.item_selector.trim().is_empty() {
            result.add_error(ValidationError::new(
                "target.item_selector",
                "item_selector cannot be empty",
            ));
        }

        if let Err(e) = Regex::new(&target.identifier_pattern) {
            result.add_error(ValidationError::new(
                "target.identifier_pattern",
                format!("Invalid regex: {}", e),
            ));
        }

        for (name, selector) in &target.aux_fields {
            if selector.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("target.aux_fields.{}", name),
                    "Selector cannot be empty",
                ));
            }
        }
    }

    fn validate_traversal(config: &Config, result: &mut ValidationResult) {
        let traversal = &config.traversal;

        if traversal.max_iterations == 0 {
            result.add_error(ValidationError::new(
                "traversal.max_iterations",
                "max_iterations must be greater than 0",
            ));
        }

        if traversal.max_iterations > 10_000 {
            result.add_warning(ValidationWarning::new(
                "traversal.max_iterations",
                "max_iterations is very high (>10000), a stalled list may run for a long time",
            ));
        }

        if traversal.no_new_item_ceiling == 0 {
            result.add_error(ValidationError::new(
                "traversal.no_new_item_ceiling",
                "no_new_item_ceiling must be greater than 0",
            ));
        }

        if traversal.interaction_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "traversal.interaction_timeout_ms",
                "interaction_timeout_ms must be greater than 0",
            ));
        }

        if traversal.max_duration_secs == Some(0) {
            result.add_error(ValidationError::new(
                "traversal.max_duration_secs",
                "max_duration_secs must be greater than 0 when set",
            ));
        }

        if traversal.visited_attribute.trim().is_empty() {
            result.add_error(ValidationError::new(
                "traversal.visited_attribute",
                "visited_attribute cannot be empty",
            ));
        }
    }

    fn validate_scroll(config: &Config, result: &mut ValidationResult) {
        let scroll = &config.scroll;

        if scroll.step_px <= 0.0 {
            result.add_error(ValidationError::new(
                "scroll.step_px",
                "step_px must be greater than 0",
            ));
        }

        if scroll.sub_steps == 0 {
            result.add_error(ValidationError::new(
                "scroll.sub_steps",
                "sub_steps must be greater than 0",
            ));
        }

        if scroll.movement_threshold >= scroll.step_px {
            result.add_warning(ValidationWarning::new(
                "scroll.movement_threshold",
                "movement_threshold is not below step_px, every scroll will look like the end of the list",
            ));
        }
    }

    fn validate_probe(config: &Config, result: &mut ValidationResult) {
        if config.probe.poll_attempts == 0 {
            result.add_error(ValidationError::new(
                "probe.poll_attempts",
                "poll_attempts must be greater than 0",
            ));
        }
    }

    fn validate_batch(config: &Config, result: &mut ValidationResult) {
        let batch = &config.batch;
        if !batch.enabled {
            return;
        }

        if batch.concurrency == 0 {
            result.add_error(ValidationError::new(
                "batch.concurrency",
                "concurrency must be greater than 0",
            ));
        }

        if batch.task_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "batch.task_timeout_ms",
                "task_timeout_ms must be greater than 0",
            ));
        }

        if config.target.reveal_selector.is_some() {
            result.add_warning(ValidationWarning::new(
                "batch.enabled",
                "Batch mode only reads inline identifiers, reveal_selector will not be hovered",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
