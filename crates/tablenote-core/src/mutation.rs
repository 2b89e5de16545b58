//! Mutation engine.
//!
//! Every operation takes the current [`Snapshot`] by reference and returns the next one; the
//! input is never modified. Operations that would change nothing (out-of-bounds address,
//! identical value) return `None` so callers can skip recording history.

use crate::autofit::{AutoFit, TextMeasurer};
use crate::cell::{Cell, CellFormat, CellUpdate, Color};
use crate::config::GridConfig;
use crate::snapshot::Snapshot;

/// Labels of the templated header row, left to right.
pub const TEMPLATE_HEADER_LABELS: [&str; 4] = ["Items", "Get", "Lost", "Total"];
/// Row labels inserted under the templated header row.
pub const TEMPLATE_ROW_LABELS: [&str; 2] = ["MB Qt (Pro)", "MB Qt (N)"];

/// Format of the templated header cells: bold white on blue.
pub const TEMPLATE_HEADER_FORMAT: CellFormat = CellFormat {
    bold: true,
    text_color: Color::WHITE,
    bg_color: Color::BLUE,
};

/// Computes successor snapshots.
pub struct MutationEngine<'a> {
    config: &'a GridConfig,
    measurer: &'a dyn TextMeasurer,
}

impl<'a> MutationEngine<'a> {
    /// Create an engine bound to a configuration and a text measurer.
    pub fn new(config: &'a GridConfig, measurer: &'a dyn TextMeasurer) -> Self {
        Self { config, measurer }
    }

    fn autofit(&self) -> AutoFit<'_> {
        AutoFit::new(self.measurer, self.config.autofit_padding, self.config.col_width)
    }

    /// Merge `update` into the cell at `(row, col)`.
    ///
    /// When the update carries text, the column is re-fitted from the value just written.
    pub fn edit_cell(
        &self,
        snapshot: &Snapshot,
        row: usize,
        col: usize,
        update: &CellUpdate,
    ) -> Option<Snapshot> {
        let before = snapshot.cell(row, col)?;
        let after = before.merged(update);
        if after == *before {
            return None;
        }

        let mut next = snapshot.clone();
        let text_changed = after.text != before.text;
        let before = before.clone();
        next.grid_mut().set_cell(row, col, after.clone());
        if text_changed {
            self.autofit().refit_after_edit(next.grid_mut(), col, &before, &after);
        }
        Some(next)
    }

    /// Append a row of default cells.
    pub fn insert_row(&self, snapshot: &Snapshot) -> Snapshot {
        let mut next = snapshot.clone();
        next.grid_mut().push_row(self.config.row_height);
        next
    }

    /// Append a column of default cells.
    pub fn insert_column(&self, snapshot: &Snapshot) -> Snapshot {
        let mut next = snapshot.clone();
        next.grid_mut().push_column(self.config.col_width);
        next
    }

    /// Insert the "Daily Breakage" block.
    ///
    /// Ensures four columns, writes the header labels into row 0 (cells past column 3 are kept),
    /// inserts two labelled rows at indices 1 and 2, then grows the touched columns to fit.
    pub fn insert_templated_block(&self, snapshot: &Snapshot) -> Snapshot {
        let mut next = snapshot.clone();
        let grid = next.grid_mut();

        while grid.col_count() < TEMPLATE_HEADER_LABELS.len() {
            grid.push_column(self.config.col_width);
        }
        if grid.row_count() == 0 {
            grid.push_row(self.config.row_height);
        }

        for (col, label) in TEMPLATE_HEADER_LABELS.iter().enumerate() {
            grid.set_cell(0, col, Cell::with_format(*label, TEMPLATE_HEADER_FORMAT));
        }

        for (offset, label) in TEMPLATE_ROW_LABELS.iter().enumerate() {
            let row = 1 + offset;
            grid.insert_row(row, self.config.row_height);
            grid.set_cell(row, 0, Cell::new(*label));
        }

        let fit = self.autofit();
        for col in 0..TEMPLATE_HEADER_LABELS.len() {
            fit.grow_to_fit(grid, col);
        }
        next
    }

    /// Replace the header text.
    pub fn set_header(&self, snapshot: &Snapshot, header: &str) -> Option<Snapshot> {
        if snapshot.header() == header {
            return None;
        }
        let mut next = snapshot.clone();
        next.set_header(header.to_string());
        Some(next)
    }

    /// Set a column width (clamped to the minimum).
    pub fn set_column_width(&self, snapshot: &Snapshot, col: usize, width: u32) -> Option<Snapshot> {
        let current = snapshot.grid().col_width(col)?;
        let mut next = snapshot.clone();
        next.grid_mut().set_col_width(col, width);
        if next.grid().col_width(col) == Some(current) {
            return None;
        }
        Some(next)
    }
}
