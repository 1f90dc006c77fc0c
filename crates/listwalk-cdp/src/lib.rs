//! Chrome DevTools Protocol backend for listwalk.
//!
//! Provides the browser connection, page sessions and the CDP implementations
//! of the list capability traits (`ListItemHandle`, `ItemScanner`,
//! `ScrollSurface`) consumed by `listwalk-core`.

pub mod cdp;
pub mod manager;
pub mod surface;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig};
pub use surface::{CdpContainer, CdpListItem, CdpScanner, CdpSurface, ItemSelectors};
