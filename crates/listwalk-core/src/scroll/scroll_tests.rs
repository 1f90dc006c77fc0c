use super::*;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

#[derive(Clone)]
struct FakeContainer {
    name: String,
    offset: Arc<Mutex<f64>>,
    max: f64,
}

impl FakeContainer {
    fn new(name: &str, max: f64) -> Self {
        Self {
            name: name.to_string(),
            offset: Arc::new(Mutex::new(0.0)),
            max,
        }
    }
}

#[async_trait]
impl ScrollContainer for FakeContainer {
    async fn offset(&self) -> Result<f64, InteractionError> {
        Ok(*self.offset.lock())
    }

    async fn wheel(&self, delta: f64) -> Result<(), InteractionError> {
        let mut offset = self.offset.lock();
        *offset = (*offset + delta).clamp(0.0, self.max);
        Ok(())
    }

    async fn scroll_to(&self, offset: f64) -> Result<(), InteractionError> {
        *self.offset.lock() = offset.clamp(0.0, self.max);
        Ok(())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

#[derive(Default)]
struct FakeSurface {
    by_selector: HashMap<String, FakeContainer>,
    overflow: Option<FakeContainer>,
    queries: Mutex<Vec<ContainerQuery>>,
    fail_selector: Option<String>,
}

#[async_trait]
impl ScrollSurface for FakeSurface {
    type Container = FakeContainer;

    async fn find_container(
        &self,
        query: &ContainerQuery,
    ) -> Result<Option<FakeContainer>, InteractionError> {
        self.queries.lock().push(query.clone());
        match query {
            ContainerQuery::Selector(sel) => {
                if self.fail_selector.as_deref() == Some(sel.as_str()) {
                    return Err(InteractionError::Browser("bad selector".to_string()));
                }
                Ok(self.by_selector.get(sel).cloned())
            }
            ContainerQuery::OverflowScan { .. } => Ok(self.overflow.clone()),
        }
    }

    async fn document_scroller(&self) -> Result<FakeContainer, InteractionError> {
        Ok(FakeContainer::new("document", 100.0))
    }
}

fn opts() -> ScrollOptions {
    ScrollOptions {
        step: 400.0,
        sub_steps: 4,
        sub_step_delay: Duration::from_millis(0),
        movement_threshold: 20.0,
        interaction_timeout: Duration::from_secs(1),
    }
}

#[tokio::test]
async fn test_role_marker_preferred_over_overflow_scan() {
    let mut surface = FakeSurface::default();
    surface
        .by_selector
        .insert(r#"[role="grid"]"#.to_string(), FakeContainer::new("grid", 5000.0));
    surface.overflow = Some(FakeContainer::new("scan", 5000.0));

    let driver = ScrollDriver::new(surface, default_locators(&[], ".item"), opts());
    let (strategy, container) = driver.locate_container().await.unwrap().unwrap();
    assert_eq!(strategy, "role-marker");
    assert_eq!(container.describe(), "grid");
}

#[tokio::test]
async fn test_overflow_scan_is_last_resort() {
    let surface = FakeSurface {
        overflow: Some(FakeContainer::new("scan", 5000.0)),
        ..Default::default()
    };

    let driver = ScrollDriver::new(surface, default_locators(&[], ".item"), opts());
    let (strategy, _) = driver.locate_container().await.unwrap().unwrap();
    assert_eq!(strategy, "overflow-scan");
    let queries = driver.surface().queries.lock().clone();
    assert!(matches!(queries.last(), Some(ContainerQuery::OverflowScan { .. })));
}

#[tokio::test]
async fn test_configured_selectors_come_first() {
    let mut surface = FakeSurface::default();
    surface
        .by_selector
        .insert("#chats".to_string(), FakeContainer::new("chats", 5000.0));
    surface
        .by_selector
        .insert(r#"[role="grid"]"#.to_string(), FakeContainer::new("grid", 5000.0));

    let driver = ScrollDriver::new(
        surface,
        default_locators(&["#chats".to_string()], ".item"),
        opts(),
    );
    let (strategy, container) = driver.locate_container().await.unwrap().unwrap();
    assert_eq!(strategy, "configured");
    assert_eq!(container.describe(), "chats");
}

#[tokio::test]
async fn test_failing_locator_is_skipped() {
    let mut surface = FakeSurface {
        fail_selector: Some(r#"[role="grid"]"#.to_string()),
        ..Default::default()
    };
    surface
        .by_selector
        .insert("[data-virtuoso-scroller]".to_string(), FakeContainer::new("virtuoso", 5000.0));

    let driver = ScrollDriver::new(surface, default_locators(&[], ".item"), opts());
    let (strategy, _) = driver.locate_container().await.unwrap().unwrap();
    assert_eq!(strategy, "virtualization-marker");
}

#[tokio::test]
async fn test_falls_back_to_document_and_reports_degraded() {
    let mut driver =
        ScrollDriver::new(FakeSurface::default(), default_locators(&[], ".item"), opts());
    assert!(driver.advance().await.unwrap());
    let report = driver.report();
    assert!(report.degraded);
    assert_eq!(report.strategy.as_deref(), Some("document"));
}

#[tokio::test]
async fn test_advance_detects_end_of_list() {
    let mut surface = FakeSurface::default();
    let grid = FakeContainer::new("grid", 900.0);
    surface
        .by_selector
        .insert(r#"[role="grid"]"#.to_string(), grid.clone());

    let mut driver = ScrollDriver::new(surface, default_locators(&[], ".item"), opts());
    assert!(driver.advance().await.unwrap()); // 0 -> 400
    assert!(driver.advance().await.unwrap()); // 400 -> 800
    assert!(driver.advance().await.unwrap()); // 800 -> 900
    assert!(!driver.advance().await.unwrap()); // pinned at 900
    assert_eq!(*grid.offset.lock(), 900.0);
    assert!(!driver.report().degraded);
}

#[tokio::test]
async fn test_movement_below_threshold_counts_as_stopped() {
    let container = FakeContainer::new("grid", 10.0);
    let driver = ScrollDriver::new(FakeSurface::default(), Vec::new(), opts());
    assert!(!driver.advance_container(&container).await.unwrap());
    assert_eq!(*container.offset.lock(), 10.0);
}

#[tokio::test]
async fn test_rewind_returns_to_top() {
    let mut surface = FakeSurface::default();
    let grid = FakeContainer::new("grid", 900.0);
    *grid.offset.lock() = 650.0;
    surface
        .by_selector
        .insert(r#"[role="grid"]"#.to_string(), grid.clone());

    let mut driver = ScrollDriver::new(surface, default_locators(&[], ".item"), opts());
    driver.rewind().await.unwrap();
    assert_eq!(*grid.offset.lock(), 0.0);
    assert_eq!(driver.report().strategy.as_deref(), Some("role-marker"));
}
