use super::*;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::handle::{ListItemHandle, PointerEvent};
use crate::types::{PartialRecord, TraversalStatus};

#[derive(Default)]
struct NodeState {
    label: String,
    key: Option<String>,
    attrs: Mutex<HashMap<String, String>>,
    /// Rejects every attribute write.
    readonly: bool,
}

#[derive(Clone)]
struct Node(Arc<NodeState>);

impl Node {
    fn new(label: &str, key: Option<&str>) -> Self {
        Node(Arc::new(NodeState {
            label: label.to_string(),
            key: key.map(str::to_string),
            ..Default::default()
        }))
    }

    fn readonly(label: &str, key: Option<&str>) -> Self {
        Node(Arc::new(NodeState {
            label: label.to_string(),
            key: key.map(str::to_string),
            readonly: true,
            ..Default::default()
        }))
    }

    fn visited(&self) -> bool {
        self.0.attrs.lock().contains_key("data-listwalk-visited")
    }
}

#[async_trait]
impl ListItemHandle for Node {
    async fn text(&self, _part: Option<&str>) -> Result<Option<String>, InteractionError> {
        Ok(Some(self.0.label.clone()))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, InteractionError> {
        Ok(self.0.attrs.lock().get(name).cloned())
    }

    async fn set_attribute(&self, name: &str, value: &str) -> Result<(), InteractionError> {
        if self.0.readonly {
            return Err(InteractionError::Browser("readonly".to_string()));
        }
        self.0.attrs.lock().insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<(), InteractionError> {
        Ok(())
    }

    async fn pointer(
        &self,
        _target: Option<&str>,
        _event: PointerEvent,
    ) -> Result<(), InteractionError> {
        Ok(())
    }

    async fn region_text(&self) -> Result<String, InteractionError> {
        Ok(String::new())
    }

    async fn position(&self) -> Result<Option<u64>, InteractionError> {
        Ok(None)
    }
}

/// Returns queued scan results, then empty scans forever.
#[derive(Default)]
struct ScriptedScanner {
    pages: Mutex<VecDeque<Result<Vec<Node>, InteractionError>>>,
    calls: AtomicUsize,
}

impl ScriptedScanner {
    fn with(pages: Vec<Result<Vec<Node>, InteractionError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ItemScanner for ScriptedScanner {
    type Item = Node;

    async fn scan(&self) -> Result<Vec<Node>, InteractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Returns the same nodes on every scan.
struct FixedScanner {
    nodes: Vec<Node>,
}

#[async_trait]
impl ItemScanner for FixedScanner {
    type Item = Node;

    async fn scan(&self) -> Result<Vec<Node>, InteractionError> {
        Ok(self.nodes.clone())
    }
}

/// Reads the key straight off the node, tracking concurrent calls.
#[derive(Default)]
struct KeyProbe {
    exclusive: bool,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl Probe<Node> for KeyProbe {
    async fn extract(&self, node: &Node) -> Result<ExtractedRecord, ExtractionFailure> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if node.0.label.is_empty() {
            return Err(ExtractionFailure::EmptyLabel);
        }
        match &node.0.key {
            Some(key) if key == "!closed" => Err(InteractionError::SessionClosed.into()),
            Some(key) => Ok(ExtractedRecord::new(key.clone(), node.0.label.clone())),
            None => Err(ExtractionFailure::IdentifierNotFound {
                partial: PartialRecord::new(node.0.label.clone()),
            }),
        }
    }

    fn needs_exclusive_hover(&self) -> bool {
        self.exclusive
    }
}

struct StubScroller {
    moves: bool,
    calls: u32,
}

impl StubScroller {
    fn new(moves: bool) -> Self {
        Self { moves, calls: 0 }
    }
}

#[async_trait]
impl Scroller for StubScroller {
    async fn advance(&mut self) -> Result<bool, InteractionError> {
        self.calls += 1;
        Ok(self.moves)
    }
}

fn fast_opts() -> TraversalOptions {
    TraversalOptions {
        settle_delay: Duration::ZERO,
        item_delay: Duration::ZERO,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_scroll_without_movement_completes() {
    let mut traversal = Traversal::new(
        ScriptedScanner::default(),
        KeyProbe::default(),
        StubScroller::new(false),
        fast_opts(),
    );
    let result = traversal.run().await;

    assert_eq!(result.status, TraversalStatus::Complete);
    assert_eq!(result.report.termination, Some(TerminationReason::ScrollExhausted));
    assert_eq!(traversal.scroller().calls, 1);
    assert_eq!(result.report.iterations, 1);
}

#[tokio::test]
async fn test_iteration_ceiling_truncates() {
    let opts = TraversalOptions {
        max_iterations: 5,
        no_new_item_ceiling: 1000,
        ..fast_opts()
    };
    let mut traversal = Traversal::new(
        ScriptedScanner::default(),
        KeyProbe::default(),
        StubScroller::new(true),
        opts,
    );
    let result = traversal.run().await;

    assert_eq!(result.status, TraversalStatus::Truncated);
    assert_eq!(result.report.termination, Some(TerminationReason::IterationCeiling));
    assert_eq!(result.report.iterations, 5);
    assert_eq!(result.report.scroll_rounds, 5);
}

#[tokio::test]
async fn test_no_new_items_ceiling_stalls() {
    let opts = TraversalOptions {
        no_new_item_ceiling: 3,
        ..fast_opts()
    };
    let mut traversal = Traversal::new(
        ScriptedScanner::default(),
        KeyProbe::default(),
        StubScroller::new(true),
        opts,
    );
    let result = traversal.run().await;

    assert_eq!(result.status, TraversalStatus::Complete);
    assert_eq!(result.report.termination, Some(TerminationReason::Stalled));
    assert_eq!(result.report.scroll_rounds, 3);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_truncates() {
    let opts = TraversalOptions {
        max_duration: Some(Duration::from_secs(5)),
        no_new_item_ceiling: 1000,
        settle_delay: Duration::from_secs(1),
        ..fast_opts()
    };
    let mut traversal = Traversal::new(
        ScriptedScanner::default(),
        KeyProbe::default(),
        StubScroller::new(true),
        opts,
    );
    let result = traversal.run().await;

    assert_eq!(result.status, TraversalStatus::Truncated);
    assert_eq!(result.report.termination, Some(TerminationReason::Deadline));
    assert!(result.report.iterations <= 6);
}

#[tokio::test]
async fn test_recycled_duplicate_key_emitted_once() {
    let a = Node::new("Alice", Some("alice"));
    let a_again = Node::new("Alice (recycled)", Some("alice"));
    let b = Node::new("Bob", Some("bob"));
    let scanner = ScriptedScanner::with(vec![Ok(vec![a.clone(), a_again.clone()]), Ok(vec![b])]);

    let mut traversal =
        Traversal::new(scanner, KeyProbe::default(), StubScroller::new(false), fast_opts());
    let result = traversal.run().await;

    let keys: Vec<&str> = result.records.iter().map(|r| r.canonical_key.as_str()).collect();
    assert_eq!(keys, ["alice", "bob"]);
    assert_eq!(result.records[0].display_name, "Alice");
    assert_eq!(result.report.duplicates_discarded, 1);
    assert!(a.visited() && a_again.visited());
}

#[tokio::test]
async fn test_visited_node_is_not_probed_again() {
    let a = Node::new("Alice", Some("alice"));
    let scanner = ScriptedScanner::with(vec![Ok(vec![a.clone()]), Ok(vec![a.clone()])]);

    let mut traversal =
        Traversal::new(scanner, KeyProbe::default(), StubScroller::new(false), fast_opts());
    let result = traversal.run().await;

    assert_eq!(result.report.nodes_attempted, 1);
    assert_eq!(result.report.duplicates_discarded, 0);
    assert_eq!(result.len(), 1);
}

#[tokio::test]
async fn test_empty_label_skipped_and_fallback_kept() {
    let scanner = ScriptedScanner::with(vec![Ok(vec![
        Node::new("", Some("ghost")),
        Node::new("Sam", None),
        Node::new("Sam", None),
    ])]);

    let mut traversal =
        Traversal::new(scanner, KeyProbe::default(), StubScroller::new(false), fast_opts());
    let result = traversal.run().await;

    assert_eq!(result.report.empty_labels, 1);
    assert_eq!(result.report.identifier_fallbacks, 2);
    assert_eq!(result.len(), 2);
    assert_ne!(result.records[0].canonical_key, result.records[1].canonical_key);
    assert!(result.records.iter().all(|r| r.display_name == "Sam"));
    assert!(result.report.is_degraded());
}

#[tokio::test]
async fn test_session_loss_fails_but_keeps_records() {
    let scanner = ScriptedScanner::with(vec![
        Ok(vec![Node::new("Alice", Some("alice"))]),
        Err(InteractionError::SessionClosed),
    ]);

    let mut traversal =
        Traversal::new(scanner, KeyProbe::default(), StubScroller::new(true), fast_opts());
    let result = traversal.run().await;

    assert_eq!(result.status, TraversalStatus::Failed);
    assert_eq!(result.len(), 1);
    assert!(result.error.as_deref().is_some_and(|e| e.contains("closed")));
}

#[tokio::test]
async fn test_fatal_probe_error_stops_mid_set() {
    let scanner = ScriptedScanner::with(vec![Ok(vec![
        Node::new("Alice", Some("alice")),
        Node::new("Broken", Some("!closed")),
        Node::new("Carol", Some("carol")),
    ])]);

    let mut traversal =
        Traversal::new(scanner, KeyProbe::default(), StubScroller::new(true), fast_opts());
    let result = traversal.run().await;

    assert_eq!(result.status, TraversalStatus::Failed);
    assert_eq!(result.report.nodes_attempted, 2);
    assert_eq!(result.len(), 1);
}

#[tokio::test]
async fn test_non_fatal_scan_error_scrolls_on() {
    let scanner = ScriptedScanner::with(vec![
        Err(InteractionError::Browser("stale".to_string())),
        Ok(vec![Node::new("Alice", Some("alice"))]),
    ]);

    let opts = TraversalOptions {
        no_new_item_ceiling: 2,
        ..fast_opts()
    };
    let mut traversal = Traversal::new(scanner, KeyProbe::default(), StubScroller::new(true), opts);
    let result = traversal.run().await;

    assert_eq!(result.status, TraversalStatus::Complete);
    assert_eq!(result.report.interaction_failures, 1);
    assert_eq!(result.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_batched_mode_falls_back_for_hovering_probe() {
    let nodes: Vec<Node> = (0..6)
        .map(|i| Node::new(&format!("User {i}"), Some(&format!("u{i}"))))
        .collect();
    let probe = KeyProbe {
        exclusive: true,
        delay: Duration::from_millis(10),
        ..Default::default()
    };
    let opts = TraversalOptions {
        mode: ExtractionMode::Batched(BatchOptions::default()),
        ..fast_opts()
    };

    let scanner = ScriptedScanner::with(vec![Ok(nodes)]);
    let mut traversal = Traversal::new(scanner, probe, StubScroller::new(false), opts);
    let result = traversal.run().await;

    assert_eq!(result.len(), 6);
    assert_eq!(traversal.probe.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_batched_mode_runs_inline_probe_concurrently() {
    let nodes: Vec<Node> = (0..6)
        .map(|i| Node::new(&format!("User {i}"), Some(&format!("u{i}"))))
        .collect();
    let probe = KeyProbe {
        exclusive: false,
        delay: Duration::from_millis(10),
        ..Default::default()
    };
    let opts = TraversalOptions {
        mode: ExtractionMode::Batched(BatchOptions {
            concurrency: 3,
            ..Default::default()
        }),
        ..fast_opts()
    };

    let scanner = ScriptedScanner::with(vec![Ok(nodes)]);
    let mut traversal = Traversal::new(scanner, probe, StubScroller::new(false), opts);
    let result = traversal.run().await;

    let keys: Vec<&str> = result.records.iter().map(|r| r.canonical_key.as_str()).collect();
    assert_eq!(keys, ["u0", "u1", "u2", "u3", "u4", "u5"]);
    let peak = traversal.probe.peak.load(Ordering::SeqCst);
    assert!(peak > 1 && peak <= 3);
}

#[tokio::test]
async fn test_unmarkable_node_is_keyed_once() {
    let scanner = FixedScanner {
        nodes: vec![Node::readonly("Sam", None)],
    };
    let opts = TraversalOptions {
        no_new_item_ceiling: 3,
        ..fast_opts()
    };
    let mut traversal = Traversal::new(scanner, KeyProbe::default(), StubScroller::new(true), opts);
    let result = traversal.run().await;

    assert_eq!(result.len(), 1);
    assert_eq!(result.records[0].canonical_key, "name:Sam~1");
    assert_eq!(result.status, TraversalStatus::Complete);
    assert_eq!(result.report.termination, Some(TerminationReason::Stalled));
    assert_eq!(result.report.scroll_rounds, 3);
    assert_eq!(result.report.nodes_attempted, 4);
    assert_eq!(result.report.duplicates_discarded, 3);
}

#[tokio::test]
async fn test_unmarkable_node_with_frozen_scroller_completes() {
    let scanner = FixedScanner {
        nodes: vec![Node::readonly("Sam", None), Node::new("Alice", Some("alice"))],
    };
    let mut traversal =
        Traversal::new(scanner, KeyProbe::default(), StubScroller::new(false), fast_opts());
    let result = traversal.run().await;

    let keys: Vec<&str> = result.records.iter().map(|r| r.canonical_key.as_str()).collect();
    assert_eq!(keys, ["name:Sam~1", "alice"]);
    assert_eq!(result.report.termination, Some(TerminationReason::ScrollExhausted));
    assert_eq!(traversal.scroller().calls, 1);
}
