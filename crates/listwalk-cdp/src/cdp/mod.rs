//! Chrome DevTools Protocol (CDP) client.
//!
//! Connects to Chrome/Chromium over WebSocket and speaks the CDP JSON-RPC
//! protocol. Only the Page, Runtime and Input domains are used.
//!
//! ```bash
//! chrome --remote-debugging-port=9222
//! ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
