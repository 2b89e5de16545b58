//! Command Interface Layer
//!
//! Provides a unified command interface for front ends.
//!
//! # Overview
//!
//! [`CommandExecutor`] owns the current [`Snapshot`], the undo/redo history, the format clipboard
//! and the active cell. Every user action is expressed as a [`Command`]:
//!
//! - **Edit**: cell text/format updates, row/column insertion, the templated block, header, undo/redo
//! - **Format**: toolbar actions on the active cell and the format clipboard
//! - **Selection**: selecting or clicking cells
//! - **View**: column widths and snapshot queries
//!
//! Each mutating command records the pre-mutation snapshot and clears the redo stack.
//! Commands that cannot apply (out-of-bounds address, nothing selected, empty clipboard, empty
//! history) are not errors: they return [`CommandResult::Noop`] and leave all state untouched.
//!
//! # Example
//!
//! ```rust
//! use tablenote_core::{CommandExecutor, Command, EditCommand};
//!
//! let mut executor = CommandExecutor::with_defaults();
//!
//! executor.execute(Command::Edit(EditCommand::SetText {
//!     row: 0,
//!     col: 0,
//!     text: "Hello".to_string(),
//! })).unwrap();
//! assert_eq!(executor.snapshot().cell(0, 0).unwrap().text, "Hello");
//!
//! executor.execute(Command::Edit(EditCommand::Undo)).unwrap();
//! assert_eq!(executor.snapshot().cell(0, 0).unwrap().text, "");
//! ```

use crate::autofit::TextMeasurer;
use crate::cell::{CellUpdate, Color};
use crate::clipboard::FormatClipboard;
use crate::config::{ConfigError, GridConfig, ResizeHistory};
use crate::export::{ExportAdapter, ExportError, ExportJob, ExportedImage, VisibleSnapshot, export_with};
use crate::grid::Grid;
use crate::header::{Clock, SystemClock, header_text};
use crate::history::HistoryManager;
use crate::mutation::MutationEngine;
use crate::resize::ColumnResize;
use crate::snapshot::Snapshot;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cell coordinates (zero-based row and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Zero-based row index.
    pub row: usize,
    /// Zero-based column index.
    pub col: usize,
}

impl CellAddress {
    /// Create a new address.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Grid and header editing commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Replace the text of a cell (auto-fits the column)
    SetText {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// New text.
        text: String,
    },
    /// Merge a partial update into a cell
    UpdateCell {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// Fields to replace.
        update: CellUpdate,
    },
    /// Append a row of default cells
    InsertRow,
    /// Append a column of default cells
    InsertColumn,
    /// Insert the "Daily Breakage" block (one undo step)
    InsertTemplatedBlock,
    /// Replace the header text
    SetHeader {
        /// New header text.
        text: String,
    },
    /// Undo the last mutation
    Undo,
    /// Redo the last undone mutation
    Redo,
}

/// Format toolbar commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    /// Flip bold on the active cell
    ToggleBold,
    /// Set the text color of the active cell
    SetTextColor {
        /// New color.
        color: Color,
    },
    /// Set the background color of the active cell
    SetBackgroundColor {
        /// New color.
        color: Color,
    },
    /// Copy the active cell's format into the clipboard
    CopyFormat,
    /// Apply (and consume) the clipboard format to a cell
    ApplyFormat {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },
}

/// Selection commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCommand {
    /// Make a cell the active cell
    Select {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },
    /// Click a cell: applies a pending clipboard format, otherwise selects it
    Click {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },
    /// Forget the active cell
    Clear,
}

/// View commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    /// Set a column width in one step (clamped to the minimum width)
    SetColumnWidth {
        /// Column index.
        col: usize,
        /// Width in pixels.
        width: u32,
    },
    /// Return a copy of the current snapshot
    GetSnapshot,
    /// Return the filtered content an export would render
    GetVisibleSnapshot,
}

/// Unified command enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Editing commands
    Edit(EditCommand),
    /// Format commands
    Format(FormatCommand),
    /// Selection commands
    Selection(SelectionCommand),
    /// View commands
    View(ViewCommand),
}

/// Why a command left the state untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoopReason {
    /// The address is outside the grid.
    OutOfBounds(CellAddress),
    /// The column is outside the grid.
    ColumnOutOfBounds(usize),
    /// The command would not change anything.
    Unchanged,
    /// The command needs an active cell and none is selected.
    NoActiveCell,
    /// The format clipboard is empty.
    EmptyClipboard,
    /// The undo stack is empty.
    NothingToUndo,
    /// The redo stack is empty.
    NothingToRedo,
}

/// Command execution result
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// State changed
    Success,
    /// Nothing happened
    Noop(NoopReason),
    /// Copy of the current snapshot
    Snapshot(Snapshot),
    /// Visible (export) content
    Visible(VisibleSnapshot),
}

impl CommandResult {
    /// Whether the command changed state.
    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success)
    }

    /// Whether the command was a no-op.
    pub fn is_noop(&self) -> bool {
        matches!(self, CommandResult::Noop(_))
    }
}

/// Command error type
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A column width of zero was requested.
    #[error("column {col}: width must be positive")]
    ZeroWidth {
        /// Target column.
        col: usize,
    },
    /// A column resize drag is in progress; the command would invalidate it.
    #[error("column {col} is being resized")]
    ResizeInProgress {
        /// Column being dragged.
        col: usize,
    },
    /// Export failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Grid command executor
///
/// # Example
///
/// ```rust
/// use tablenote_core::{Command, CommandExecutor, EditCommand};
///
/// let mut executor = CommandExecutor::with_defaults();
/// executor.execute(Command::Edit(EditCommand::InsertTemplatedBlock)).unwrap();
///
/// assert_eq!(executor.snapshot().row_count(), 8);
/// assert_eq!(executor.undo_depth(), 1);
/// ```
pub struct CommandExecutor {
    config: GridConfig,
    measurer: Box<dyn TextMeasurer + Send>,
    current: Snapshot,
    history: HistoryManager,
    clipboard: FormatClipboard,
    active_cell: Option<CellAddress>,
    /// Executed commands, oldest first
    command_history: Vec<Command>,
    /// Set while a [`ColumnResize`] session is alive
    resize_active: Arc<AtomicBool>,
    /// Column and start width of the most recent drag
    resize_origin: Option<(usize, u32)>,
}

impl CommandExecutor {
    /// Create an executor from a configuration, seeding the header from `clock`.
    pub fn new(config: GridConfig, clock: &dyn Clock) -> Result<Self, CommandError> {
        config.validate()?;
        Ok(Self::build(config, header_text(clock)))
    }

    /// Default 6x6 grid with a header seeded from the system clock.
    pub fn with_defaults() -> Self {
        Self::build(GridConfig::default(), header_text(&SystemClock))
    }

    fn build(config: GridConfig, header: String) -> Self {
        let grid = Grid::new(config.rows, config.cols, config.row_height, config.col_width);
        Self {
            measurer: Box::new(config.measurer()),
            history: HistoryManager::new(config.history_limit),
            current: Snapshot::new(header, grid),
            config,
            clipboard: FormatClipboard::new(),
            active_cell: None,
            command_history: Vec::new(),
            resize_active: Arc::new(AtomicBool::new(false)),
            resize_origin: None,
        }
    }

    /// Replace the text measurer used by auto-fit (e.g. with real font metrics).
    pub fn set_measurer(&mut self, measurer: impl TextMeasurer + Send + 'static) {
        self.measurer = Box::new(measurer);
    }

    /// Current configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Current state.
    pub fn snapshot(&self) -> &Snapshot {
        &self.current
    }

    /// Active (last selected) cell.
    pub fn active_cell(&self) -> Option<CellAddress> {
        self.active_cell
    }

    /// Format clipboard.
    pub fn clipboard(&self) -> &FormatClipboard {
        &self.clipboard
    }

    /// Visible content for export.
    pub fn visible_snapshot(&self) -> VisibleSnapshot {
        VisibleSnapshot::from_snapshot(&self.current)
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Whether the state matches the last clean point (last successful export).
    pub fn is_clean(&self) -> bool {
        self.history.is_clean()
    }

    /// Mark the current state as the clean point.
    pub fn mark_clean(&mut self) {
        self.history.mark_clean();
    }

    /// Drop all history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Get command history
    pub fn get_command_history(&self) -> &[Command] {
        &self.command_history
    }

    /// Whether a column resize session is alive.
    pub fn is_resizing(&self) -> bool {
        self.resize_active.load(Ordering::Acquire)
    }

    /// Execute command
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        if self.is_resizing() && Self::conflicts_with_resize(&command) {
            return Err(CommandError::ResizeInProgress {
                col: self.resize_origin.map(|(col, _)| col).unwrap_or_default(),
            });
        }

        if let Command::View(ViewCommand::SetColumnWidth { col, width: 0 }) = command {
            return Err(CommandError::ZeroWidth { col });
        }

        log::debug!("execute {command:?}");
        self.command_history.push(command.clone());

        let result = match command {
            Command::Edit(edit_cmd) => self.execute_edit(edit_cmd),
            Command::Format(format_cmd) => self.execute_format(format_cmd),
            Command::Selection(selection_cmd) => self.execute_selection(selection_cmd),
            Command::View(view_cmd) => self.execute_view(view_cmd),
        };

        if let CommandResult::Noop(reason) = &result {
            log::debug!("no-op: {reason:?}");
        }
        Ok(result)
    }

    /// Batch execute commands, stopping at the first error
    pub fn execute_batch(
        &mut self,
        commands: Vec<Command>,
    ) -> Result<Vec<CommandResult>, CommandError> {
        let mut results = Vec::new();

        for command in commands {
            let result = self.execute(command)?;
            results.push(result);
        }

        Ok(results)
    }

    fn conflicts_with_resize(command: &Command) -> bool {
        matches!(
            command,
            Command::Edit(
                EditCommand::InsertColumn
                    | EditCommand::InsertTemplatedBlock
                    | EditCommand::Undo
                    | EditCommand::Redo
            ) | Command::View(ViewCommand::SetColumnWidth { .. })
        )
    }

    fn engine(&self) -> MutationEngine<'_> {
        MutationEngine::new(&self.config, self.measurer.as_ref())
    }

    /// Make `next` current and record the previous state.
    ///
    /// While a recorded drag is alive, entries keep the dragged column at its start width so
    /// the drag stays one separate undo step.
    fn commit(&mut self, next: Snapshot) -> CommandResult {
        let mut previous = std::mem::replace(&mut self.current, next);
        if let Some((col, start_width)) = self.recorded_drag() {
            previous.grid_mut().set_col_width(col, start_width);
        }
        self.history.record(previous);
        CommandResult::Success
    }

    fn recorded_drag(&self) -> Option<(usize, u32)> {
        match self.config.resize_history {
            ResizeHistory::CommitOnRelease if self.is_resizing() => self.resize_origin,
            _ => None,
        }
    }

    fn commit_or(&mut self, next: Option<Snapshot>, reason: NoopReason) -> CommandResult {
        match next {
            Some(next) => self.commit(next),
            None => CommandResult::Noop(reason),
        }
    }

    fn update_cell(&mut self, row: usize, col: usize, update: &CellUpdate) -> CommandResult {
        if !self.current.grid().contains(row, col) {
            return CommandResult::Noop(NoopReason::OutOfBounds(CellAddress::new(row, col)));
        }
        let next = self.engine().edit_cell(&self.current, row, col, update);
        self.commit_or(next, NoopReason::Unchanged)
    }

    fn execute_edit(&mut self, command: EditCommand) -> CommandResult {
        match command {
            EditCommand::SetText { row, col, text } => {
                self.update_cell(row, col, &CellUpdate::text(text))
            }
            EditCommand::UpdateCell { row, col, update } => self.update_cell(row, col, &update),
            EditCommand::InsertRow => {
                let next = self.engine().insert_row(&self.current);
                self.commit(next)
            }
            EditCommand::InsertColumn => {
                let next = self.engine().insert_column(&self.current);
                self.commit(next)
            }
            EditCommand::InsertTemplatedBlock => {
                let next = self.engine().insert_templated_block(&self.current);
                self.commit(next)
            }
            EditCommand::SetHeader { text } => {
                let next = self.engine().set_header(&self.current, &text);
                self.commit_or(next, NoopReason::Unchanged)
            }
            EditCommand::Undo => self.execute_undo(),
            EditCommand::Redo => self.execute_redo(),
        }
    }

    fn execute_undo(&mut self) -> CommandResult {
        match self.history.undo(&self.current) {
            Some(previous) => {
                self.current = previous;
                self.clamp_active_cell();
                CommandResult::Success
            }
            None => CommandResult::Noop(NoopReason::NothingToUndo),
        }
    }

    fn execute_redo(&mut self) -> CommandResult {
        match self.history.redo(&self.current) {
            Some(next) => {
                self.current = next;
                self.clamp_active_cell();
                CommandResult::Success
            }
            None => CommandResult::Noop(NoopReason::NothingToRedo),
        }
    }

    fn clamp_active_cell(&mut self) {
        if let Some(address) = self.active_cell
            && !self.current.grid().contains(address.row, address.col)
        {
            self.active_cell = None;
        }
    }

    fn execute_format(&mut self, command: FormatCommand) -> CommandResult {
        match command {
            FormatCommand::ApplyFormat { row, col } => self.apply_format(row, col),
            FormatCommand::CopyFormat => {
                let Some(format) = self.active().map(|(_, cell)| cell.format()) else {
                    return CommandResult::Noop(NoopReason::NoActiveCell);
                };
                self.clipboard.copy(format);
                CommandResult::Success
            }
            FormatCommand::ToggleBold => {
                let Some((address, cell)) = self.active() else {
                    return CommandResult::Noop(NoopReason::NoActiveCell);
                };
                let update = CellUpdate::bold(!cell.bold);
                self.update_cell(address.row, address.col, &update)
            }
            FormatCommand::SetTextColor { color } => {
                self.update_active(CellUpdate::text_color(color))
            }
            FormatCommand::SetBackgroundColor { color } => {
                self.update_active(CellUpdate::bg_color(color))
            }
        }
    }

    fn active(&self) -> Option<(CellAddress, &crate::cell::Cell)> {
        let address = self.active_cell?;
        let cell = self.current.cell(address.row, address.col)?;
        Some((address, cell))
    }

    fn update_active(&mut self, update: CellUpdate) -> CommandResult {
        match self.active_cell {
            Some(address) => self.update_cell(address.row, address.col, &update),
            None => CommandResult::Noop(NoopReason::NoActiveCell),
        }
    }

    fn apply_format(&mut self, row: usize, col: usize) -> CommandResult {
        if !self.clipboard.is_filled() {
            return CommandResult::Noop(NoopReason::EmptyClipboard);
        }
        if !self.current.grid().contains(row, col) {
            return CommandResult::Noop(NoopReason::OutOfBounds(CellAddress::new(row, col)));
        }
        match self.clipboard.take() {
            Some(format) => self.update_cell(row, col, &CellUpdate::format(format)),
            None => CommandResult::Noop(NoopReason::EmptyClipboard),
        }
    }

    fn execute_selection(&mut self, command: SelectionCommand) -> CommandResult {
        match command {
            SelectionCommand::Select { row, col } => self.select(row, col),
            SelectionCommand::Click { row, col } => {
                if self.clipboard.is_filled() {
                    self.apply_format(row, col)
                } else {
                    self.select(row, col)
                }
            }
            SelectionCommand::Clear => match self.active_cell.take() {
                Some(_) => CommandResult::Success,
                None => CommandResult::Noop(NoopReason::Unchanged),
            },
        }
    }

    fn select(&mut self, row: usize, col: usize) -> CommandResult {
        let address = CellAddress::new(row, col);
        if !self.current.grid().contains(row, col) {
            return CommandResult::Noop(NoopReason::OutOfBounds(address));
        }
        if self.active_cell == Some(address) {
            return CommandResult::Noop(NoopReason::Unchanged);
        }
        self.active_cell = Some(address);
        CommandResult::Success
    }

    fn execute_view(&mut self, command: ViewCommand) -> CommandResult {
        match command {
            ViewCommand::SetColumnWidth { col, width } => {
                let Some(next) = self.engine().set_column_width(&self.current, col, width) else {
                    return if col < self.current.col_count() {
                        CommandResult::Noop(NoopReason::Unchanged)
                    } else {
                        CommandResult::Noop(NoopReason::ColumnOutOfBounds(col))
                    };
                };
                match self.config.resize_history {
                    ResizeHistory::Untracked => {
                        self.current = next;
                        CommandResult::Success
                    }
                    ResizeHistory::CommitOnRelease => self.commit(next),
                }
            }
            ViewCommand::GetSnapshot => CommandResult::Snapshot(self.current.clone()),
            ViewCommand::GetVisibleSnapshot => CommandResult::Visible(self.visible_snapshot()),
        }
    }

    /// Start dragging the right edge of column `col` from pointer position `pointer_x`.
    ///
    /// Returns `None` when the column does not exist or another drag is in progress.
    pub fn begin_column_resize(&mut self, col: usize, pointer_x: i32) -> Option<ColumnResize> {
        let start_width = self.current.grid().col_width(col)?;
        if self
            .resize_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }

        let records_history = self.config.resize_history == ResizeHistory::CommitOnRelease;
        log::debug!("begin resize of column {col} at x={pointer_x}, width {start_width}");
        self.resize_origin = Some((col, start_width));

        Some(
            ColumnResize::new(col, pointer_x, start_width, records_history)
                .tracked_by(self.resize_active.clone()),
        )
    }

    /// Follow a pointer move. Returns the new width.
    pub fn drag_column_resize(&mut self, session: &ColumnResize, pointer_x: i32) -> Option<u32> {
        let width = session.width_at(pointer_x);
        if !self.current.grid_mut().set_col_width(session.col(), width) {
            return None;
        }
        Some(width)
    }

    /// End a drag, keeping the dragged width.
    ///
    /// With [`ResizeHistory::CommitOnRelease`] one history entry is recorded when the width
    /// changed.
    pub fn finish_column_resize(&mut self, session: ColumnResize) -> CommandResult {
        self.resize_origin = None;
        let col = session.col();
        let changed = self.current.grid().col_width(col) != Some(session.start_width());
        log::debug!(
            "finish resize of column {col}: {} -> {:?}",
            session.start_width(),
            self.current.grid().col_width(col)
        );

        if !changed {
            return CommandResult::Noop(NoopReason::Unchanged);
        }
        if session.records_history() {
            // Only the dragged width differs, so edits made during the drag stay put.
            let mut before = self.current.clone();
            before.grid_mut().set_col_width(col, session.start_width());
            self.history.record(before);
        }
        CommandResult::Success
    }

    /// Abort a drag, restoring the width it started from.
    pub fn cancel_column_resize(&mut self, session: ColumnResize) -> CommandResult {
        self.resize_origin = None;
        let col = session.col();
        if self.current.grid().col_width(col) == Some(session.start_width()) {
            return CommandResult::Noop(NoopReason::Unchanged);
        }
        self.current.grid_mut().set_col_width(col, session.start_width());
        CommandResult::Success
    }

    /// Render the visible content with `adapter` on this thread; marks the clean point on success.
    pub fn export(&mut self, adapter: &dyn ExportAdapter) -> Result<ExportedImage, CommandError> {
        let image = export_with(adapter, &self.visible_snapshot())?;
        self.history.mark_clean();
        Ok(image)
    }

    /// Render the visible content on a worker thread.
    pub fn spawn_export<A>(&self, adapter: A) -> ExportJob
    where
        A: ExportAdapter + Send + 'static,
    {
        ExportJob::spawn(self.visible_snapshot(), adapter)
    }
}

impl fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("config", &self.config)
            .field("rows", &self.current.row_count())
            .field("cols", &self.current.col_count())
            .field("active_cell", &self.active_cell)
            .field("undo_depth", &self.history.undo_depth())
            .field("redo_depth", &self.history.redo_depth())
            .finish()
    }
}
