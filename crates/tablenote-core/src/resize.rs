//! Column resize drag sessions.
//!
//! A drag starts on pointer-down over a column edge, follows every pointer-move, and ends on
//! pointer-up. The session captures the start width and start pointer position so each move is
//! computed from the origin (`max(MIN_COL_WIDTH, start_width + dx)`) instead of accumulating.
//!
//! Front ends attach their move/up listeners when the session starts and hand the matching
//! release action to [`ColumnResize::on_release`]. The release runs exactly once, when the
//! session is finished, cancelled, or dropped (including during unwinding).
//!
//! Sessions are driven through [`CommandExecutor`](crate::CommandExecutor):
//! `begin_column_resize`, `drag_column_resize`, `finish_column_resize`,
//! `cancel_column_resize`. A dropped session keeps the last dragged width and records nothing.

use crate::grid::MIN_COL_WIDTH;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

type ReleaseFn = Box<dyn FnOnce()>;

/// An in-progress column resize.
pub struct ColumnResize {
    col: usize,
    start_x: i32,
    start_width: u32,
    /// Whether finishing records a history entry.
    records_history: bool,
    release: Option<ReleaseFn>,
    /// Owner's "drag in progress" flag, cleared when the session ends.
    active: Option<Arc<AtomicBool>>,
}

impl ColumnResize {
    pub(crate) fn new(col: usize, start_x: i32, start_width: u32, records_history: bool) -> Self {
        Self {
            col,
            start_x,
            start_width,
            records_history,
            release: None,
            active: None,
        }
    }

    pub(crate) fn tracked_by(mut self, active: Arc<AtomicBool>) -> Self {
        self.active = Some(active);
        self
    }

    /// Register the action that detaches this session's pointer listeners.
    ///
    /// Replacing an earlier registration runs the earlier one immediately.
    pub fn on_release(mut self, release: impl FnOnce() + 'static) -> Self {
        if let Some(previous) = self.release.replace(Box::new(release)) {
            previous();
        }
        self
    }

    /// Column being resized.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Width when the drag started.
    pub fn start_width(&self) -> u32 {
        self.start_width
    }

    pub(crate) fn records_history(&self) -> bool {
        self.records_history
    }

    /// Pointer x-coordinate when the drag started.
    pub fn start_x(&self) -> i32 {
        self.start_x
    }

    /// Width for a pointer at `x`.
    pub fn width_at(&self, x: i32) -> u32 {
        let delta = i64::from(x) - i64::from(self.start_x);
        let width = i64::from(self.start_width) + delta;
        width.clamp(i64::from(MIN_COL_WIDTH), i64::from(u32::MAX)) as u32
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for ColumnResize {
    fn drop(&mut self) {
        self.release();
        if let Some(active) = self.active.take() {
            active.store(false, Ordering::Release);
        }
    }
}

impl fmt::Debug for ColumnResize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnResize")
            .field("col", &self.col)
            .field("start_x", &self.start_x)
            .field("start_width", &self.start_width)
            .field("records_history", &self.records_history)
            .field("listening", &self.release.is_some())
            .finish()
    }
}
