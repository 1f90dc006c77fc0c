//! CDP page session for interacting with a single page.

mod core;
mod input;
mod js;
mod navigation;

pub use self::core::PageSession;
pub(crate) use self::core::CALL_TIMEOUT;
