//! Scroll driver: find the list's scroll container and advance it.

mod locator;

pub use locator::{
    default_locators, ContainerLocator, OverflowScanLocator, SelectorLocator,
    DEFAULT_ROLE_SELECTORS, DEFAULT_VIRTUALIZATION_SELECTORS,
};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{with_timeout, InteractionError};
use crate::options::ScrollOptions;

/// A scrollable element.
#[async_trait]
pub trait ScrollContainer: Send + Sync {
    /// Current vertical scroll offset.
    async fn offset(&self) -> Result<f64, InteractionError>;

    /// Simulate one wheel event of `delta` over the container.
    async fn wheel(&self, delta: f64) -> Result<(), InteractionError>;

    /// Jump straight to `offset`.
    async fn scroll_to(&self, offset: f64) -> Result<(), InteractionError>;

    /// Short human description for logs.
    fn describe(&self) -> String;
}

/// Structural query a locator strategy asks the page to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerQuery {
    /// First element matching the selector that actually overflows
    /// (`scrollHeight > clientHeight`).
    Selector(String),
    /// Any element with `overflow-y: auto|scroll`, scrollable overflow and
    /// at least one child matching `item_selector`.
    OverflowScan { item_selector: String },
}

/// Page-side operations needed to locate scroll containers.
#[async_trait]
pub trait ScrollSurface: Send + Sync {
    type Container: ScrollContainer;

    async fn find_container(
        &self,
        query: &ContainerQuery,
    ) -> Result<Option<Self::Container>, InteractionError>;

    /// The document's root scrolling element.
    async fn document_scroller(&self) -> Result<Self::Container, InteractionError>;
}

/// Which container the driver ended up using.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollReport {
    pub strategy: Option<String>,
    pub degraded: bool,
}

/// What the traversal controller drives.
#[async_trait]
pub trait Scroller: Send {
    /// Advance the list. True only when the visible offset actually moved.
    async fn advance(&mut self) -> Result<bool, InteractionError>;

    /// Return the list to its top before the first scan.
    async fn rewind(&mut self) -> Result<(), InteractionError> {
        Ok(())
    }

    fn report(&self) -> ScrollReport {
        ScrollReport::default()
    }
}

struct Located<C> {
    strategy: String,
    container: C,
}

/// Locates the container through an ordered strategy list, then scrolls it
/// in small wheel sub-steps.
pub struct ScrollDriver<S: ScrollSurface> {
    surface: S,
    locators: Vec<Box<dyn ContainerLocator<S>>>,
    opts: ScrollOptions,
    located: Option<Located<S::Container>>,
    report: ScrollReport,
}

impl<S: ScrollSurface + 'static> ScrollDriver<S> {
    pub fn new(
        surface: S,
        locators: Vec<Box<dyn ContainerLocator<S>>>,
        opts: ScrollOptions,
    ) -> Self {
        Self {
            surface,
            locators,
            opts,
            located: None,
            report: ScrollReport::default(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Try each strategy in priority order. `None` when nothing matched.
    pub async fn locate_container(
        &self,
    ) -> Result<Option<(String, S::Container)>, InteractionError> {
        for locator in &self.locators {
            let attempt = with_timeout(
                self.opts.interaction_timeout,
                "locate container",
                locator.try_locate(&self.surface),
            )
            .await;
            match attempt {
                Ok(Some(container)) => {
                    debug!("Locator '{}' matched {}", locator.name(), container.describe());
                    return Ok(Some((locator.name().to_string(), container)));
                }
                Ok(None) => debug!("Locator '{}' found nothing", locator.name()),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("Locator '{}' failed: {}", locator.name(), e),
            }
        }
        Ok(None)
    }

    async fn ensure_located(&mut self) -> Result<(), InteractionError> {
        if self.located.is_some() {
            return Ok(());
        }

        let located = match self.locate_container().await? {
            Some((strategy, container)) => {
                self.report.degraded = false;
                Located {
                    strategy,
                    container,
                }
            }
            None => {
                warn!("No scroll container matched, falling back to document scroller");
                let container = with_timeout(
                    self.opts.interaction_timeout,
                    "document scroller",
                    self.surface.document_scroller(),
                )
                .await?;
                self.report.degraded = true;
                Located {
                    strategy: "document".to_string(),
                    container,
                }
            }
        };

        info!(
            "Scrolling {} (strategy: {})",
            located.container.describe(),
            located.strategy
        );
        self.report.strategy = Some(located.strategy.clone());
        self.located = Some(located);
        Ok(())
    }

    /// Wheel `container` by one bounded step and compare offsets.
    pub async fn advance_container(
        &self,
        container: &S::Container,
    ) -> Result<bool, InteractionError> {
        let timeout = self.opts.interaction_timeout;
        let before = with_timeout(timeout, "read scroll offset", container.offset()).await?;

        let delta = self.opts.sub_step_delta();
        for _ in 0..self.opts.sub_steps.max(1) {
            with_timeout(timeout, "wheel", container.wheel(delta)).await?;
            tokio::time::sleep(self.opts.sub_step_delay).await;
        }

        let after = with_timeout(timeout, "read scroll offset", container.offset()).await?;
        let moved = (after - before).abs() > self.opts.movement_threshold;
        debug!("Scroll offset {} -> {} (moved: {})", before, after, moved);
        Ok(moved)
    }
}

#[async_trait]
impl<S: ScrollSurface + 'static> Scroller for ScrollDriver<S> {
    async fn advance(&mut self) -> Result<bool, InteractionError> {
        self.ensure_located().await?;
        let Some(located) = self.located.as_ref() else {
            return Ok(false);
        };

        match self.advance_container(&located.container).await {
            Ok(moved) => Ok(moved),
            Err(e) => {
                // The container may have been re-rendered; locate again next time.
                self.located = None;
                Err(e)
            }
        }
    }

    async fn rewind(&mut self) -> Result<(), InteractionError> {
        self.ensure_located().await?;
        let Some(located) = self.located.as_ref() else {
            return Ok(());
        };

        let timeout = self.opts.interaction_timeout;
        let container = &located.container;
        let rewound = async {
            let offset = with_timeout(timeout, "read scroll offset", container.offset()).await?;
            if offset > 0.0 {
                info!("List starts scrolled to {}, rewinding to the top", offset);
                with_timeout(timeout, "rewind", container.scroll_to(0.0)).await?;
                tokio::time::sleep(self.opts.sub_step_delay).await;
            }
            Ok::<_, InteractionError>(())
        }
        .await;

        if rewound.is_err() {
            self.located = None;
        }
        rewound
    }

    fn report(&self) -> ScrollReport {
        self.report.clone()
    }
}

#[cfg(test)]
#[path = "scroll_tests.rs"]
mod tests;
