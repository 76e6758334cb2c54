use tracing::{debug, info};

use super::{placement, CenterMode, PlacementState, PlacementStore, Rect, WindowId};
use crate::error::Error;

/// Read and move windows. Implemented per platform and faked in tests.
pub trait WindowAccessor {
    fn window_rect(&self, id: WindowId) -> Result<Rect, Error>;

    /// Usable area of the monitor containing the window.
    fn work_area(&self, id: WindowId) -> Result<Rect, Error>;

    fn is_maximized(&self, id: WindowId) -> Result<bool, Error>;

    /// Move without resizing, reordering or activating.
    fn move_window(&self, id: WindowId, x: i32, y: i32) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Maximized windows are left alone.
    Maximized,
    Moved { mode: CenterMode, rect: Rect },
}

pub struct CycleCenterer<S: PlacementStore> {
    store: S,
}

impl<S: PlacementStore> CycleCenterer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Advance `id` to its next placement and move it there.
    pub fn cycle<A>(&self, id: WindowId, accessor: &A) -> Result<CycleOutcome, Error>
    where
        A: WindowAccessor + ?Sized,
    {
        if accessor.is_maximized(id)? {
            debug!("Window {:#x} is maximized, leaving it alone", id);
            return Ok(CycleOutcome::Maximized);
        }

        let current = accessor.window_rect(id)?;
        let work_area = accessor.work_area(id)?;

        let (mode, original) = match self.store.get(id) {
            Some(state) if state.last_applied == current => (state.mode.next(), state.original),
            Some(state) => {
                debug!(
                    "Window {:#x} drifted from {} to {}, starting over",
                    id, state.last_applied, current
                );
                self.store.evict(id);
                (CenterMode::Full, current)
            }
            None => (CenterMode::Full, current),
        };

        let target = placement(mode, current, original, work_area);
        accessor.move_window(id, target.left, target.top)?;

        // The window manager may adjust the position; remember what it really did.
        let applied = accessor.window_rect(id)?;
        self.store.update(
            id,
            PlacementState {
                mode,
                last_applied: applied,
                original,
            },
        );
        info!("Window {:#x} -> {:?} at {}", id, mode, applied);

        Ok(CycleOutcome::Moved {
            mode,
            rect: applied,
        })
    }
}
