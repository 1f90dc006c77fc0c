//! Browser instance manager.
//!
//! Connects to a Chrome instance over CDP, launching one with a persistent
//! profile when none is listening, and opens the page that hosts the list.
//! Reusing an already-open tab keeps whatever login state the user has.

mod manager_core;
mod manager_pages;
mod manager_types;

pub use manager_core::BrowserManager;
pub use manager_types::{BrowserError, BrowserManagerConfig};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
