//! Cycle-centering of a window between three placements.
//!
//! Each trigger advances Full -> Horizontal -> Vertical -> Full for the same
//! window. A window found somewhere other than where it was last put starts
//! over at Full and forgets its original position.

mod cycle;
mod store;

pub use cycle::{CycleCenterer, CycleOutcome, WindowAccessor};
pub use store::{FileStore, MemoryStore, PlacementStore};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a top-level window (the raw handle value on Windows).
pub type WindowId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Same size, top-left corner moved to `(x, y)`.
    pub fn moved_to(&self, x: i32, y: i32) -> Rect {
        Rect::new(x, y, x + self.width(), y + self.height())
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.left,
            self.top,
            self.width(),
            self.height()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CenterMode {
    /// Centered on both axes.
    Full,
    /// Centered horizontally, original vertical position.
    Horizontal,
    /// Centered vertically, original horizontal position.
    Vertical,
}

impl CenterMode {
    pub fn next(self) -> CenterMode {
        match self {
            CenterMode::Full => CenterMode::Horizontal,
            CenterMode::Horizontal => CenterMode::Vertical,
            CenterMode::Vertical => CenterMode::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementState {
    pub mode: CenterMode,
    pub last_applied: Rect,
    pub original: Rect,
}

/// Where `window` goes for `mode` inside `work_area`. Size never changes.
pub fn placement(mode: CenterMode, window: Rect, original: Rect, work_area: Rect) -> Rect {
    let center_x = work_area.left + (work_area.width() - window.width()) / 2;
    let center_y = work_area.top + (work_area.height() - window.height()) / 2;
    match mode {
        CenterMode::Full => window.moved_to(center_x, center_y),
        CenterMode::Horizontal => window.moved_to(center_x, original.top),
        CenterMode::Vertical => window.moved_to(original.left, center_y),
    }
}
