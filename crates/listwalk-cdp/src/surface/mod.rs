//! CDP-backed list surface: item handles, the item scanner and scroll
//! containers, all expressed as page-side functions on remote objects.

mod container;
mod item;
mod scanner;
mod scripts;

pub use container::{CdpContainer, CdpSurface};
pub use item::CdpListItem;
pub use scanner::CdpScanner;

use serde::Deserialize;

/// Selectors an item handle needs beyond what the probe passes in.
#[derive(Debug, Clone, Default)]
pub struct ItemSelectors {
    /// Ancestor whose text is searched for revealed identifiers.
    pub region: Option<String>,
    /// Floating popovers that may carry revealed identifiers.
    pub tooltip: Option<String>,
    /// Attributes holding a stable list position, most specific first.
    pub position_attributes: Vec<String>,
}

/// Element box plus viewport size, as reported by the page.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Geometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Geometry {
    /// Center of the element, clamped inside the viewport so wheel events
    /// land on a visible pixel of it.
    pub fn wheel_point(&self) -> (f64, f64) {
        let clamp = |v: f64, max: f64| v.min(max - 1.0).max(1.0);
        let x = self.left + self.width / 2.0;
        let y = self.top + self.height / 2.0;
        (
            clamp(x, self.viewport_width),
            clamp(y, self.viewport_height),
        )
    }
}

/// First candidate that parses as a non-negative integer.
pub(crate) fn first_position(candidates: &[String]) -> Option<u64> {
    candidates.iter().find_map(|v| v.trim().parse::<u64>().ok())
}
