//! Traversal and extraction engine for virtualized, infinitely scrolling lists.
//!
//! A virtualized list keeps only a small window of items mounted and recycles
//! DOM nodes as the user scrolls. This crate walks such a list end to end:
//!
//! - [`probe`]: pulls one [`ExtractedRecord`] out of a rendered item, hovering
//!   to reveal the identifier when it is not inline.
//! - [`ledger`]: dedup keys plus per-node visited markers.
//! - [`scroll`]: finds the real scroll container and advances it in small
//!   wheel sub-steps.
//! - [`controller`]: the scan/extract/scroll state machine.
//! - [`batch`]: concurrency-limited runner for probes that can run in parallel.
//!
//! Browser access is abstracted behind [`ListItemHandle`], [`ItemScanner`]
//! and [`ScrollSurface`].

pub mod batch;
pub mod controller;
pub mod error;
pub mod handle;
pub mod ledger;
pub mod options;
pub mod probe;
pub mod scroll;
pub mod types;

pub use batch::{BatchError, BatchOutcome, BatchRunner};
pub use controller::{ScrollState, Traversal};
pub use error::{with_timeout, ExtractionFailure, InteractionError, TraversalError};
pub use handle::{ItemScanner, ListItemHandle, PointerEvent};
pub use ledger::DedupLedger;
pub use options::{BatchOptions, ExtractionMode, ProbeOptions, ScrollOptions, TraversalOptions};
pub use probe::{ExtractionProbe, Probe};
pub use scroll::{
    default_locators, ContainerLocator, ContainerQuery, ScrollContainer, ScrollDriver,
    ScrollReport, ScrollSurface, Scroller,
};
pub use types::{
    ExtractedRecord, PartialRecord, TerminationReason, TraversalReport, TraversalResult,
    TraversalStatus,
};
