//! Grid State Interface
//!
//! Provides a structured state query interface over the grid, used for frontend rendering and
//! state synchronization.
//!
//! # Overview
//!
//! - **State Queries**: grid dimensions, selection, undo/redo and clipboard state
//! - **Version Tracking**: a version number incremented by every observable change
//! - **Change Notifications**: subscribers are called after each change
//! - **Export Tracking**: a background export marks the clean point when it succeeds
//!
//! # Example
//!
//! ```rust
//! use tablenote_core::{Command, EditCommand, GridStateManager, StateChangeType};
//!
//! let mut manager = GridStateManager::with_defaults();
//!
//! manager.subscribe(|change| {
//!     println!("State changed: {:?}", change.change_type);
//! });
//!
//! manager.execute(Command::Edit(EditCommand::InsertRow)).unwrap();
//! let grid_state = manager.get_grid_state();
//! assert_eq!(grid_state.row_count, 7);
//! assert_eq!(grid_state.version, 1);
//! ```

use crate::cell::CellFormat;
use crate::commands::{
    CellAddress, Command, CommandError, CommandExecutor, CommandResult, EditCommand,
    FormatCommand, SelectionCommand, ViewCommand,
};
use crate::export::{ExportAdapter, ExportError, ExportJob, ExportedImage};
use crate::resize::ColumnResize;
use crate::snapshot::Snapshot;

/// Grid state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    /// Header text
    pub header: String,
    /// Row count
    pub row_count: usize,
    /// Column count
    pub col_count: usize,
    /// Whether there are changes since the last successful export
    pub is_modified: bool,
    /// State version number (incremented after each change)
    pub version: u64,
}

/// Selection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    /// Active cell
    pub active_cell: Option<CellAddress>,
    /// Column currently being dragged
    pub resizing: bool,
}

/// Undo/redo stack state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoRedoState {
    /// Can undo
    pub can_undo: bool,
    /// Can redo
    pub can_redo: bool,
    /// Undo stack depth
    pub undo_depth: usize,
    /// Redo stack depth
    pub redo_depth: usize,
}

/// Format clipboard state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardState {
    /// Pending format, applied by the next cell click
    pub pending: Option<CellFormat>,
}

/// Complete state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullState {
    /// Grid state
    pub grid: GridState,
    /// Selection state
    pub selection: SelectionState,
    /// Undo/redo state
    pub undo_redo: UndoRedoState,
    /// Clipboard state
    pub clipboard: ClipboardState,
}

/// State change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeType {
    /// Cells, rows or columns changed
    GridModified,
    /// Header text changed
    HeaderModified,
    /// Active cell changed
    SelectionChanged,
    /// A column width changed
    ColumnResized,
    /// Format clipboard filled
    ClipboardChanged,
    /// Undo or redo restored an earlier state
    HistoryRestored,
}

/// State change record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// Change type
    pub change_type: StateChangeType,
    /// Old version number
    pub old_version: u64,
    /// New version number
    pub new_version: u64,
}

impl StateChange {
    /// Create a new state change record.
    pub fn new(change_type: StateChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
        }
    }
}

/// State change callback function type
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;

struct PendingExport {
    job: ExportJob,
    version: u64,
}

/// Grid state manager
///
/// Wraps a [`CommandExecutor`] and adds version tracking, change notifications and export
/// bookkeeping. Front ends execute commands through [`execute()`](GridStateManager::execute),
/// then re-read the state they render when the version moved.
///
/// Commands that end as [`CommandResult::Noop`] or only query state leave the version untouched.
///
/// # Example
///
/// ```rust
/// use tablenote_core::{Command, GridStateManager, SelectionCommand};
///
/// let mut manager = GridStateManager::with_defaults();
/// let before = manager.version();
///
/// manager.execute(Command::Selection(SelectionCommand::Select { row: 9, col: 9 })).unwrap();
/// assert!(!manager.has_changed_since(before));
///
/// manager.execute(Command::Selection(SelectionCommand::Select { row: 1, col: 1 })).unwrap();
/// assert!(manager.has_changed_since(before));
/// ```
pub struct GridStateManager {
    executor: CommandExecutor,
    /// State version number
    state_version: u64,
    /// State change callback list
    callbacks: Vec<StateChangeCallback>,
    pending_export: Option<PendingExport>,
}

impl GridStateManager {
    /// Create a new state manager around an executor.
    pub fn new(executor: CommandExecutor) -> Self {
        Self {
            executor,
            state_version: 0,
            callbacks: Vec::new(),
            pending_export: None,
        }
    }

    /// Default 6x6 grid.
    pub fn with_defaults() -> Self {
        Self::new(CommandExecutor::with_defaults())
    }

    /// Get a reference to the executor
    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        self.executor.snapshot()
    }

    /// Execute a command and trigger state change notifications when it changed state.
    ///
    /// A command that leaves the grid alone but consumes the format clipboard is reported as
    /// [`StateChangeType::ClipboardChanged`].
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        let change_type = match &command {
            // A click with a pending format applies it instead of selecting.
            Command::Selection(SelectionCommand::Click { .. })
                if self.executor.clipboard().is_filled() =>
            {
                Some(StateChangeType::GridModified)
            }
            _ => Self::change_type_for_command(&command),
        };
        let clipboard_before = self.executor.clipboard().peek().copied();
        let result = self.executor.execute(command)?;

        match change_type {
            Some(change_type) if result.is_success() => self.mark_modified(change_type),
            // A format applied to a cell that already had it still consumes the clipboard.
            _ if self.executor.clipboard().peek().copied() != clipboard_before => {
                self.mark_modified(StateChangeType::ClipboardChanged)
            }
            _ => {}
        }

        Ok(result)
    }

    fn change_type_for_command(command: &Command) -> Option<StateChangeType> {
        match command {
            Command::Edit(EditCommand::SetHeader { .. }) => Some(StateChangeType::HeaderModified),
            Command::Edit(EditCommand::Undo | EditCommand::Redo) => {
                Some(StateChangeType::HistoryRestored)
            }
            Command::Edit(_) => Some(StateChangeType::GridModified),
            Command::Format(FormatCommand::CopyFormat) => Some(StateChangeType::ClipboardChanged),
            Command::Format(_) => Some(StateChangeType::GridModified),
            Command::Selection(_) => Some(StateChangeType::SelectionChanged),
            Command::View(ViewCommand::SetColumnWidth { .. }) => {
                Some(StateChangeType::ColumnResized)
            }
            Command::View(ViewCommand::GetSnapshot | ViewCommand::GetVisibleSnapshot) => None,
        }
    }

    /// Click a cell: applies a pending format or selects the cell.
    pub fn click(&mut self, row: usize, col: usize) -> Result<CommandResult, CommandError> {
        self.execute(Command::Selection(SelectionCommand::Click { row, col }))
    }

    /// Start a column drag. See [`CommandExecutor::begin_column_resize`].
    pub fn begin_column_resize(&mut self, col: usize, pointer_x: i32) -> Option<ColumnResize> {
        self.executor.begin_column_resize(col, pointer_x)
    }

    /// Follow a pointer move during a column drag.
    pub fn drag_column_resize(&mut self, session: &ColumnResize, pointer_x: i32) -> Option<u32> {
        let before = self.executor.snapshot().grid().col_width(session.col());
        let width = self.executor.drag_column_resize(session, pointer_x)?;
        if before != Some(width) {
            self.mark_modified(StateChangeType::ColumnResized);
        }
        Some(width)
    }

    /// End a column drag, keeping the dragged width.
    pub fn finish_column_resize(&mut self, session: ColumnResize) -> CommandResult {
        let undo_depth = self.executor.undo_depth();
        let result = self.executor.finish_column_resize(session);
        // The width itself was already reported while dragging; only a new history entry is news.
        if self.executor.undo_depth() != undo_depth {
            self.mark_modified(StateChangeType::ColumnResized);
        }
        result
    }

    /// Abort a column drag, restoring the original width.
    pub fn cancel_column_resize(&mut self, session: ColumnResize) -> CommandResult {
        let result = self.executor.cancel_column_resize(session);
        if result.is_success() {
            self.mark_modified(StateChangeType::ColumnResized);
        }
        result
    }

    /// Start exporting the visible content on a worker thread.
    ///
    /// Replaces (and abandons) an export that is still running.
    pub fn start_export<A>(&mut self, adapter: A)
    where
        A: ExportAdapter + Send + 'static,
    {
        if self.pending_export.is_some() {
            log::warn!("abandoning unfinished export");
        }
        self.pending_export = Some(PendingExport {
            job: self.executor.spawn_export(adapter),
            version: self.state_version,
        });
    }

    /// Whether an export is running.
    pub fn is_exporting(&self) -> bool {
        self.pending_export.is_some()
    }

    /// Poll the running export.
    ///
    /// On success the clean point is moved to the current state, unless the state changed
    /// while the export was running.
    pub fn poll_export(&mut self) -> Option<Result<ExportedImage, ExportError>> {
        let pending = self.pending_export.as_mut()?;
        let result = pending.job.try_result()?;
        let started_at = pending.version;
        self.pending_export = None;

        if result.is_ok() && started_at == self.state_version {
            self.executor.mark_clean();
        }
        Some(result)
    }

    /// Get current version number
    pub fn version(&self) -> u64 {
        self.state_version
    }

    /// Whether there are changes since the last successful export.
    pub fn is_modified(&self) -> bool {
        !self.executor.is_clean()
    }

    /// Get the complete state
    pub fn get_full_state(&self) -> FullState {
        FullState {
            grid: self.get_grid_state(),
            selection: self.get_selection_state(),
            undo_redo: self.get_undo_redo_state(),
            clipboard: self.get_clipboard_state(),
        }
    }

    /// Get grid state
    pub fn get_grid_state(&self) -> GridState {
        let snapshot = self.executor.snapshot();
        GridState {
            header: snapshot.header().to_string(),
            row_count: snapshot.row_count(),
            col_count: snapshot.col_count(),
            is_modified: self.is_modified(),
            version: self.state_version,
        }
    }

    /// Get selection state
    pub fn get_selection_state(&self) -> SelectionState {
        SelectionState {
            active_cell: self.executor.active_cell(),
            resizing: self.executor.is_resizing(),
        }
    }

    /// Get undo/redo state
    pub fn get_undo_redo_state(&self) -> UndoRedoState {
        UndoRedoState {
            can_undo: self.executor.can_undo(),
            can_redo: self.executor.can_redo(),
            undo_depth: self.executor.undo_depth(),
            redo_depth: self.executor.redo_depth(),
        }
    }

    /// Get clipboard state
    pub fn get_clipboard_state(&self) -> ClipboardState {
        ClipboardState {
            pending: self.executor.clipboard().peek().copied(),
        }
    }

    /// Subscribe to state changes
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Check if state has changed since a version
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.state_version > version
    }

    /// Increment the version number and notify subscribers.
    pub fn mark_modified(&mut self, change_type: StateChangeType) {
        let old_version = self.state_version;
        self.state_version += 1;

        let change = StateChange::new(change_type, old_version, self.state_version);
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}
