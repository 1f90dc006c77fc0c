//! Traversal controller: the Scanning → Extracting → Scrolling state machine.
//!
//! ```text
//!   ┌──────────┐ unvisited items ┌────────────┐
//!   │ Scanning │ ──────────────► │ Extracting │
//!   └──────────┘ ◄────────────── └────────────┘
//!     │    ▲        set done
//!     │    │ moved + settle
//!     ▼    │
//!   ┌───────────┐  no movement / stalled  ┌────────────┐
//!   │ Scrolling │ ──────────────────────► │ Terminated │
//!   └───────────┘                         └────────────┘
//! ```
//!
//! The controller is the only owner of the dedup ledger and scroll state.
//! DOM interactions are strictly sequential in the default mode because the
//! page has a single hover/reveal state.

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::batch::{BatchError, BatchRunner};
use crate::error::{with_timeout, ExtractionFailure, InteractionError};
use crate::handle::ItemScanner;
use crate::ledger::DedupLedger;
use crate::options::{BatchOptions, ExtractionMode, TraversalOptions};
use crate::probe::Probe;
use crate::scroll::Scroller;
use crate::types::{ExtractedRecord, TerminationReason, TraversalReport, TraversalResult};

/// Controller states.
enum Phase<H> {
    Scanning,
    Extracting(Vec<H>),
    Scrolling,
}

/// Scroll bookkeeping, mutated only by the controller.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrollState {
    pub consecutive_no_new_item_rounds: u32,
}

/// Per-run mutable state.
struct RunState {
    ledger: DedupLedger,
    records: Vec<ExtractedRecord>,
    scroll: ScrollState,
    report: TraversalReport,
    error: Option<String>,
    deadline: Option<Instant>,
}

impl RunState {
    fn past_deadline(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn admit(&mut self, record: ExtractedRecord) {
        if self.ledger.try_admit(&record) {
            debug!("Admitted {} ({})", record.canonical_key, record.display_name);
            self.records.push(record);
        } else {
            self.report.duplicates_discarded += 1;
        }
    }

    fn count_interaction(&mut self, e: &InteractionError) {
        if e.is_timeout() {
            self.report.interaction_timeouts += 1;
        } else {
            self.report.interaction_failures += 1;
        }
    }

    /// Fold one probe outcome into the run. Err only for fatal failures.
    ///
    /// `marked` is false when the node's visited marker could not be set.
    fn settle(
        &mut self,
        outcome: Result<ExtractedRecord, ExtractionFailure>,
        marked: bool,
    ) -> Result<(), InteractionError> {
        match outcome {
            Ok(record) => self.admit(record),
            Err(ExtractionFailure::EmptyLabel) => {
                self.report.empty_labels += 1;
            }
            Err(ExtractionFailure::IdentifierNotFound { partial })
                if !marked && !self.ledger.note_unmarked(&partial) =>
            {
                debug!("Unmarked node '{}' seen again, not keyed", partial.display_name);
                self.report.duplicates_discarded += 1;
            }
            Err(ExtractionFailure::IdentifierNotFound { partial }) => {
                self.report.identifier_fallbacks += 1;
                let key = self.ledger.fallback_key(&partial);
                debug!("No identifier for '{}', keyed as {}", partial.display_name, key);
                self.admit(partial.into_record(key));
            }
            Err(ExtractionFailure::Interaction(e)) if e.is_fatal() => return Err(e),
            Err(ExtractionFailure::Interaction(e)) => {
                warn!("Extraction interaction failed: {}", e);
                self.count_interaction(&e);
            }
        }
        Ok(())
    }
}

/// Drives a virtualized list to exhaustion.
pub struct Traversal<S, P, D>
where
    S: ItemScanner,
    P: Probe<S::Item>,
    D: Scroller,
{
    scanner: S,
    probe: P,
    scroller: D,
    opts: TraversalOptions,
}

impl<S, P, D> Traversal<S, P, D>
where
    S: ItemScanner,
    P: Probe<S::Item>,
    D: Scroller,
{
    pub fn new(scanner: S, probe: P, scroller: D, opts: TraversalOptions) -> Self {
        Self {
            scanner,
            probe,
            scroller,
            opts,
        }
    }

    pub fn options(&self) -> &TraversalOptions {
        &self.opts
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    pub fn scroller(&self) -> &D {
        &self.scroller
    }

    /// Batch options when batched extraction is both requested and safe.
    fn batch_options(&self) -> Option<BatchOptions> {
        match &self.opts.mode {
            ExtractionMode::Sequential => None,
            ExtractionMode::Batched(_) if self.probe.needs_exclusive_hover() => {
                warn!("Probe needs exclusive hover, extracting sequentially instead of batched");
                None
            }
            ExtractionMode::Batched(batch) => Some(batch.clone()),
        }
    }

    /// Run the state machine until it terminates.
    pub async fn run(&mut self) -> TraversalResult {
        let started = Instant::now();
        let batch = self.batch_options().map(BatchRunner::new);
        let mut state = RunState {
            ledger: DedupLedger::new(self.opts.visited_attribute.clone()),
            records: Vec::new(),
            scroll: ScrollState::default(),
            report: TraversalReport::default(),
            error: None,
            deadline: self.opts.max_duration.map(|d| started + d),
        };

        info!(
            "Traversal started (max_iterations: {}, no_new_item_ceiling: {}, batched: {})",
            self.opts.max_iterations,
            self.opts.no_new_item_ceiling,
            batch.is_some()
        );

        let reason = self.drive(&mut state, batch.as_ref()).await;

        let scroll_report = self.scroller.report();
        state.report.container_strategy = scroll_report.strategy;
        state.report.degraded_container = scroll_report.degraded;
        state.report.termination = Some(reason);

        let result = TraversalResult {
            records: state.records,
            status: reason.status(),
            error: state.error,
            report: state.report,
        };

        info!(
            "Traversal finished: {:?} ({:?}), {} records, {} iterations, {} scroll rounds in {:?}",
            result.status,
            reason,
            result.records.len(),
            result.report.iterations,
            result.report.scroll_rounds,
            started.elapsed()
        );
        if result.report.is_degraded() {
            warn!(
                "Degraded run: {} fallback keys, {} timeouts, {} failures, document scroller: {}",
                result.report.identifier_fallbacks,
                result.report.interaction_timeouts,
                result.report.interaction_failures,
                result.report.degraded_container
            );
        }

        result
    }

    /// Step the state machine until a termination reason comes up.
    async fn drive(
        &mut self,
        state: &mut RunState,
        batch: Option<&BatchRunner>,
    ) -> TerminationReason {
        // A reused tab can still sit where an earlier run left it.
        if let Err(e) = self.scroller.rewind().await {
            if e.is_fatal() {
                state.error = Some(e.to_string());
                return TerminationReason::Fatal;
            }
            warn!("Could not rewind list: {}", e);
            state.count_interaction(&e);
        }

        let mut phase = Phase::Scanning;
        loop {
            phase = match phase {
                Phase::Scanning => {
                    if state.report.iterations >= self.opts.max_iterations {
                        warn!("Iteration ceiling {} reached", self.opts.max_iterations);
                        return TerminationReason::IterationCeiling;
                    }
                    if state.past_deadline() {
                        warn!("Time ceiling reached");
                        return TerminationReason::Deadline;
                    }
                    state.report.iterations += 1;

                    match self.scan_unvisited(&state.ledger).await {
                        Ok(nodes) if !nodes.is_empty() => {
                            debug!(
                                "Scan {} found {} unvisited items",
                                state.report.iterations,
                                nodes.len()
                            );
                            Phase::Extracting(nodes)
                        }
                        Ok(_) => Phase::Scrolling,
                        Err(e) if e.is_fatal() => {
                            state.error = Some(e.to_string());
                            return TerminationReason::Fatal;
                        }
                        Err(e) => {
                            warn!("Scan failed: {}", e);
                            state.count_interaction(&e);
                            Phase::Scrolling
                        }
                    }
                }

                Phase::Extracting(nodes) => {
                    let extracted = match batch {
                        Some(runner) => self.extract_batched(runner, nodes, state).await,
                        None => self.extract_sequential(nodes, state).await,
                    };
                    match extracted {
                        Err(e) => {
                            state.error = Some(e.to_string());
                            return TerminationReason::Fatal;
                        }
                        // Extraction itself can mount new nodes, so rescan before scrolling.
                        Ok(true) => {
                            state.scroll.consecutive_no_new_item_rounds = 0;
                            Phase::Scanning
                        }
                        // Nothing could be marked, so a rescan would return the same nodes.
                        Ok(false) => {
                            debug!("No node in the set could be marked visited");
                            Phase::Scrolling
                        }
                    }
                }

                Phase::Scrolling => {
                    let rounds = state.scroll.consecutive_no_new_item_rounds;
                    if rounds >= self.opts.no_new_item_ceiling {
                        info!("No new items after {} scroll rounds", rounds);
                        return TerminationReason::Stalled;
                    }
                    state.report.scroll_rounds += 1;

                    match self.scroller.advance().await {
                        Ok(true) => {}
                        Ok(false) => {
                            info!("Scroll offset stopped moving, list exhausted");
                            return TerminationReason::ScrollExhausted;
                        }
                        Err(e) if e.is_fatal() => {
                            state.error = Some(e.to_string());
                            return TerminationReason::Fatal;
                        }
                        Err(e) => {
                            warn!("Scroll failed: {}", e);
                            state.count_interaction(&e);
                        }
                    }

                    state.scroll.consecutive_no_new_item_rounds += 1;
                    tokio::time::sleep(self.opts.settle_delay).await;
                    Phase::Scanning
                }
            };
        }
    }

    /// Rendered items not yet carrying the visited marker.
    async fn scan_unvisited(
        &self,
        ledger: &DedupLedger,
    ) -> Result<Vec<S::Item>, InteractionError> {
        let timeout = self.opts.interaction_timeout;
        let rendered = with_timeout(timeout, "scan items", self.scanner.scan()).await?;

        let mut fresh = Vec::with_capacity(rendered.len());
        for node in rendered {
            match with_timeout(timeout, "check visited", ledger.should_process(&node)).await {
                Ok(true) => fresh.push(node),
                Ok(false) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => debug!("Skipping unreadable node: {}", e),
            }
        }
        Ok(fresh)
    }

    /// Set the visited marker. Ok(false) when a non-fatal error prevented it.
    async fn mark(&self, ledger: &DedupLedger, node: &S::Item) -> Result<bool, InteractionError> {
        let marked = with_timeout(
            self.opts.interaction_timeout,
            "mark visited",
            ledger.mark_processed(node),
        )
        .await;
        match marked {
            Ok(()) => Ok(true),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!("Could not mark node visited: {}", e);
                Ok(false)
            }
        }
    }

    /// Extract the set one node at a time. Ok(true) when any node was marked.
    async fn extract_sequential(
        &self,
        nodes: Vec<S::Item>,
        state: &mut RunState,
    ) -> Result<bool, InteractionError> {
        let mut any_marked = false;
        for (i, node) in nodes.iter().enumerate() {
            if state.past_deadline() {
                debug!("Deadline hit mid-set, {} items left unattempted", nodes.len() - i);
                break;
            }
            if i > 0 {
                tokio::time::sleep(self.opts.item_delay).await;
            }

            state.report.nodes_attempted += 1;
            let outcome = self.probe.extract(node).await;
            // Marked whatever the outcome, so a failing node is not retried forever.
            let marked = self.mark(&state.ledger, node).await?;
            any_marked |= marked;
            state.settle(outcome, marked)?;
        }
        Ok(any_marked)
    }

    async fn extract_batched(
        &self,
        runner: &BatchRunner,
        nodes: Vec<S::Item>,
        state: &mut RunState,
    ) -> Result<bool, InteractionError> {
        let probe = &self.probe;
        let outcomes = runner
            .run_with(&nodes, |node| probe.extract(node), ExtractionFailure::is_transient)
            .await;

        let mut any_marked = false;
        for (node, outcome) in nodes.iter().zip(outcomes) {
            state.report.nodes_attempted += 1;
            let marked = self.mark(&state.ledger, node).await?;
            any_marked |= marked;
            match outcome.result {
                Ok(record) => state.settle(Ok(record), marked)?,
                Err(BatchError::Failed(failure)) => state.settle(Err(failure), marked)?,
                Err(BatchError::TimedOut(after)) => {
                    warn!("Extraction task {} timed out after {:?}", outcome.index, after);
                    state.report.interaction_timeouts += 1;
                }
            }
        }
        Ok(any_marked)
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
